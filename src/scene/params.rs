use serde::Serialize;

/// Structure file formats understood by the `parse` node.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParseFormat {
    Mmcif,
    Bcif,
    Pdb,
    Gro,
    Sdf,
    Xtc,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadParams {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseParams {
    pub format: ParseFormat,
}

/// Parameters of a `structure` node created by `model_structure`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructureParams {
    #[serde(rename = "type")]
    kind: StructureType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates_ref: Option<String>,
}

impl StructureParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a coordinates node (e.g. a parsed trajectory) by its ref.
    pub fn with_coordinates(mut self, coordinates_ref: impl Into<String>) -> Self {
        self.coordinates_ref = Some(coordinates_ref.into());
        self
    }

    pub fn with_model_index(mut self, model_index: usize) -> Self {
        self.model_index = Some(model_index);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum StructureType {
    #[default]
    Model,
}

/// Predefined selectors accepted wherever a component selector is expected.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaticSelector {
    All,
    Polymer,
    Protein,
    Nucleic,
    Branched,
    Ligand,
    Ion,
    Water,
}

/// Atom/residue selection expression. Unset fields match anything.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ComponentExpression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_asym_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_asym_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_seq_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_seq_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "pdbx_PDB_ins_code")]
    pub pdbx_pdb_ins_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beg_label_seq_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_label_seq_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beg_auth_seq_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_auth_seq_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_comp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_atom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_atom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_index: Option<i64>,
}

impl ComponentExpression {
    /// Select every residue with the given component id (e.g. `UNK`, `HIS`).
    pub fn residue_name(comp_id: impl Into<String>) -> Self {
        Self {
            label_comp_id: Some(comp_id.into()),
            ..Self::default()
        }
    }

    /// Select a label-numbered residue range on one chain, inclusive.
    pub fn chain_range(asym_id: impl Into<String>, beg: i64, end: i64) -> Self {
        Self {
            label_asym_id: Some(asym_id.into()),
            beg_label_seq_id: Some(beg),
            end_label_seq_id: Some(end),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ComponentSelector {
    Static(StaticSelector),
    Expression(ComponentExpression),
    Union(Vec<ComponentExpression>),
}

impl ComponentSelector {
    pub fn all() -> Self {
        Self::Static(StaticSelector::All)
    }
}

impl From<StaticSelector> for ComponentSelector {
    fn from(selector: StaticSelector) -> Self {
        Self::Static(selector)
    }
}

impl From<ComponentExpression> for ComponentSelector {
    fn from(expression: ComponentExpression) -> Self {
        Self::Expression(expression)
    }
}

impl From<Vec<ComponentExpression>> for ComponentSelector {
    fn from(expressions: Vec<ComponentExpression>) -> Self {
        Self::Union(expressions)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentParams {
    pub selector: ComponentSelector,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationType {
    BallAndStick,
    Spacefill,
    #[default]
    Cartoon,
    Carbohydrate,
    Surface,
}

/// Parameters of a `representation` node. Defaults to a plain cartoon.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepresentationParams {
    #[serde(rename = "type")]
    pub kind: RepresentationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_hydrogens: Option<bool>,
}

impl RepresentationParams {
    pub fn ball_and_stick() -> Self {
        Self {
            kind: RepresentationType::BallAndStick,
            ..Self::default()
        }
    }

    pub fn with_size_factor(mut self, size_factor: f64) -> Self {
        self.size_factor = Some(size_factor);
        self
    }

    pub fn ignoring_hydrogens(mut self, ignore: bool) -> Self {
        self.ignore_hydrogens = Some(ignore);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorParams {
    /// Named color (`"blue"`) or hex string (`"#0000FF"`).
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CanvasParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}
