//! MolViewSpec scene builder.
//!
//! A scene is a tree of nodes rooted at `root`. The usual chain is
//! `download -> parse -> model_structure -> component -> representation ->
//! color`, with optional `coordinates` nodes feeding trajectory frames into a
//! structure, plus `canvas` and `primitives` nodes hanging off the root.
//!
//! The builder keeps nodes in an arena; handles such as [`Structure`] borrow
//! the builder mutably and append children to their own node. Call
//! [`Builder::get_state`] to obtain the serializable tree.

mod params;
mod primitives;

pub use params::*;
pub use primitives::*;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::ArchiveError;

/// MolViewSpec schema version written into scene metadata.
pub const MVS_VERSION: &str = "1.8.1";

/// Anything that can produce the JSON state snapshot stored as `index.mvsj`.
pub trait StateSnapshot {
    fn snapshot(&self) -> Result<serde_json::Value, ArchiveError>;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Download,
    Parse,
    Coordinates,
    Structure,
    Component,
    Representation,
    Color,
    Canvas,
    Primitives,
    Primitive,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NodeParams {
    Download(DownloadParams),
    Parse(ParseParams),
    Structure(StructureParams),
    Component(ComponentParams),
    Representation(RepresentationParams),
    Color(ColorParams),
    Canvas(CanvasParams),
    Primitives(PrimitivesParams),
    Primitive(Primitive),
}

/// One node of the serialized scene tree.
#[derive(Debug, Clone, Serialize)]
pub struct StateNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<NodeParams>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StateNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub version: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete scene state: the node tree plus global metadata.
#[derive(Debug, Clone, Serialize)]
pub struct State {
    pub root: StateNode,
    pub metadata: Metadata,
}

impl StateSnapshot for State {
    fn snapshot(&self) -> Result<serde_json::Value, ArchiveError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl StateSnapshot for serde_json::Value {
    fn snapshot(&self) -> Result<serde_json::Value, ArchiveError> {
        Ok(self.clone())
    }
}

struct Node {
    kind: NodeKind,
    params: Option<NodeParams>,
    node_ref: Option<String>,
    custom: Option<serde_json::Value>,
    children: Vec<usize>,
}

/// Arena-backed scene builder. Node 0 is the root.
pub struct Builder {
    nodes: Vec<Node>,
    timestamp: DateTime<Utc>,
    title: Option<String>,
    description: Option<String>,
}

/// Start a new, empty scene stamped with the current time.
pub fn create_builder() -> Builder {
    Builder::new()
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                params: None,
                node_ref: None,
                custom: None,
                children: Vec::new(),
            }],
            timestamp: Utc::now(),
            title: None,
            description: None,
        }
    }

    /// Pin the metadata timestamp so repeated builds serialize identically.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn download(&mut self, url: impl Into<String>) -> Download<'_> {
        let id = self.push_child(
            0,
            NodeKind::Download,
            Some(NodeParams::Download(DownloadParams { url: url.into() })),
        );
        Download { builder: self, id }
    }

    /// Attach canvas settings. `custom` carries viewer-specific extensions
    /// such as `molstar_postprocessing`.
    pub fn canvas(&mut self, params: CanvasParams, custom: Option<serde_json::Value>) -> &mut Self {
        let id = self.push_child(0, NodeKind::Canvas, Some(NodeParams::Canvas(params)));
        self.nodes[id].custom = custom;
        self
    }

    pub fn primitives(&mut self, params: PrimitivesParams) -> Primitives<'_> {
        let id = self.push_child(0, NodeKind::Primitives, Some(NodeParams::Primitives(params)));
        Primitives { builder: self, id }
    }

    pub fn get_state(&self) -> State {
        State {
            root: self.materialize(0),
            metadata: Metadata {
                version: MVS_VERSION.to_string(),
                timestamp: self
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
                title: self.title.clone(),
                description: self.description.clone(),
            },
        }
    }

    fn push_child(&mut self, parent: usize, kind: NodeKind, params: Option<NodeParams>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            params,
            node_ref: None,
            custom: None,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn materialize(&self, id: usize) -> StateNode {
        let node = &self.nodes[id];
        StateNode {
            kind: node.kind,
            params: node.params.clone(),
            node_ref: node.node_ref.clone(),
            custom: node.custom.clone(),
            children: node.children.iter().map(|&c| self.materialize(c)).collect(),
        }
    }
}

impl StateSnapshot for Builder {
    fn snapshot(&self) -> Result<serde_json::Value, ArchiveError> {
        self.get_state().snapshot()
    }
}

pub struct Download<'a> {
    builder: &'a mut Builder,
    id: usize,
}

impl<'a> Download<'a> {
    pub fn parse(self, format: ParseFormat) -> Parse<'a> {
        let id = self.builder.push_child(
            self.id,
            NodeKind::Parse,
            Some(NodeParams::Parse(ParseParams { format })),
        );
        Parse {
            builder: self.builder,
            id,
        }
    }
}

pub struct Parse<'a> {
    builder: &'a mut Builder,
    id: usize,
}

impl<'a> Parse<'a> {
    /// Expose the parsed frames as a coordinates source under `node_ref`.
    pub fn coordinates(self, node_ref: impl Into<String>) {
        let id = self.builder.push_child(self.id, NodeKind::Coordinates, None);
        self.builder.nodes[id].node_ref = Some(node_ref.into());
    }

    pub fn model_structure(self, params: StructureParams) -> Structure<'a> {
        let id = self.builder.push_child(
            self.id,
            NodeKind::Structure,
            Some(NodeParams::Structure(params)),
        );
        Structure {
            builder: self.builder,
            id,
        }
    }
}

pub struct Structure<'a> {
    builder: &'a mut Builder,
    id: usize,
}

impl Structure<'_> {
    pub fn component(&mut self, selector: impl Into<ComponentSelector>) -> Component<'_> {
        let id = self.builder.push_child(
            self.id,
            NodeKind::Component,
            Some(NodeParams::Component(ComponentParams {
                selector: selector.into(),
            })),
        );
        Component {
            builder: &mut *self.builder,
            id,
        }
    }
}

pub struct Component<'a> {
    builder: &'a mut Builder,
    id: usize,
}

impl<'a> Component<'a> {
    pub fn representation(self, params: RepresentationParams) -> Representation<'a> {
        let id = self.builder.push_child(
            self.id,
            NodeKind::Representation,
            Some(NodeParams::Representation(params)),
        );
        Representation {
            builder: self.builder,
            id,
        }
    }
}

pub struct Representation<'a> {
    builder: &'a mut Builder,
    id: usize,
}

impl Representation<'_> {
    pub fn color(self, color: impl Into<String>) -> Self {
        self.builder.push_child(
            self.id,
            NodeKind::Color,
            Some(NodeParams::Color(ColorParams {
                color: color.into(),
            })),
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(node: &serde_json::Value) -> Vec<String> {
        node["children"]
            .as_array()
            .map(|c| c.iter().map(|n| n["kind"].as_str().unwrap().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn empty_builder_has_only_root() {
        let state = create_builder().snapshot().unwrap();
        assert_eq!(state["root"], json!({ "kind": "root" }));
        assert_eq!(state["metadata"]["version"], MVS_VERSION);
    }

    #[test]
    fn parse_formats_serialize_lowercase() {
        let formats = [
            (ParseFormat::Mmcif, "mmcif"),
            (ParseFormat::Bcif, "bcif"),
            (ParseFormat::Pdb, "pdb"),
            (ParseFormat::Gro, "gro"),
            (ParseFormat::Sdf, "sdf"),
            (ParseFormat::Xtc, "xtc"),
        ];
        for (format, name) in formats {
            assert_eq!(serde_json::to_value(format).unwrap(), json!(name));
        }
    }

    #[test]
    fn trajectory_chain_produces_nested_nodes() {
        let mut builder = create_builder();
        builder
            .download("traj.xtc")
            .parse(ParseFormat::Xtc)
            .coordinates("traj");
        let mut structure = builder
            .download("traj.pdb")
            .parse(ParseFormat::Pdb)
            .model_structure(StructureParams::new().with_coordinates("traj"));
        structure
            .component(ComponentSelector::all())
            .representation(RepresentationParams::default())
            .color("white");

        let state = builder.snapshot().unwrap();
        let root = &state["root"];
        assert_eq!(kinds(root), vec!["download", "download"]);

        let coords = &root["children"][0]["children"][0]["children"][0];
        assert_eq!(coords["kind"], "coordinates");
        assert_eq!(coords["ref"], "traj");

        let structure = &root["children"][1]["children"][0]["children"][0];
        assert_eq!(structure["params"]["type"], "model");
        assert_eq!(structure["params"]["coordinates_ref"], "traj");
        let component = &structure["children"][0];
        assert_eq!(component["params"]["selector"], "all");
        let representation = &component["children"][0];
        assert_eq!(representation["params"], json!({ "type": "cartoon" }));
        assert_eq!(representation["children"][0]["params"]["color"], "white");
    }

    #[test]
    fn expression_selectors_omit_unset_fields() {
        let mut builder = create_builder();
        let mut structure = builder
            .download("1tmn.cif")
            .parse(ParseFormat::Mmcif)
            .model_structure(StructureParams::new());
        structure
            .component(vec![
                ComponentExpression::chain_range("A", 5, 15),
                ComponentExpression::residue_name("HIS"),
            ])
            .representation(
                RepresentationParams::ball_and_stick()
                    .with_size_factor(0.4)
                    .ignoring_hydrogens(false),
            );

        let state = builder.snapshot().unwrap();
        let component = &state["root"]["children"][0]["children"][0]["children"][0]["children"][0];
        assert_eq!(
            component["params"]["selector"],
            json!([
                { "label_asym_id": "A", "beg_label_seq_id": 5, "end_label_seq_id": 15 },
                { "label_comp_id": "HIS" }
            ])
        );
        assert_eq!(
            component["children"][0]["params"],
            json!({ "type": "ball_and_stick", "size_factor": 0.4, "ignore_hydrogens": false })
        );
    }

    #[test]
    fn canvas_keeps_custom_payload() {
        let mut builder = create_builder();
        builder.canvas(
            CanvasParams::default(),
            Some(json!({ "molstar_postprocessing": { "enable_outline": true } })),
        );

        let state = builder.snapshot().unwrap();
        let canvas = &state["root"]["children"][0];
        assert_eq!(canvas["kind"], "canvas");
        assert_eq!(canvas["custom"]["molstar_postprocessing"]["enable_outline"], true);
    }

    #[test]
    fn primitives_are_tagged_by_kind() {
        let mut builder = create_builder();
        let mut group = builder.primitives(PrimitivesParams {
            opacity: Some(0.8),
            ..Default::default()
        });
        group
            .add(Primitive::sphere([5.0, 0.0, 0.0], 1.5))
            .add(Primitive::label([-2.0, 1.0, 1.0], "Hello Mol*"));
        assert_eq!(group.len(), 2);

        let state = builder.snapshot().unwrap();
        let group = &state["root"]["children"][0];
        assert_eq!(group["params"], json!({ "opacity": 0.8 }));
        assert_eq!(group["children"][0]["params"]["kind"], "sphere");
        assert_eq!(group["children"][1]["params"]["text"], "Hello Mol*");
    }

    #[test]
    fn pinned_timestamp_is_stable() {
        let ts = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = Builder::new().with_timestamp(ts).snapshot().unwrap();
        let b = Builder::new().with_timestamp(ts).snapshot().unwrap();
        assert_eq!(a, b);
        assert_eq!(a["metadata"]["timestamp"], "2024-01-02T03:04:05.000000Z");
    }
}
