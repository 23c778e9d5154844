//! Geometric primitives (shapes, measurements, labels) drawn alongside
//! structures.

use serde::Serialize;

use super::{Builder, NodeKind, NodeParams};

type Vec3 = [f64; 3];

/// Options shared by every primitive in one `primitives` group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrimitivesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Sphere {
        center: Vec3,
        radius: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    Box {
        center: Vec3,
        extent: Vec3,
        #[serde(skip_serializing_if = "Option::is_none")]
        face_color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    Ellipsoid {
        center: Vec3,
        major_axis: Vec3,
        minor_axis: Vec3,
        radius: Vec3,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    Tube {
        start: Vec3,
        end: Vec3,
        radius: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        dash_length: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    Arrow {
        start: Vec3,
        end: Vec3,
        tube_radius: f64,
        show_end_cap: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_cap_radius: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_cap_length: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
    },
    DistanceMeasurement {
        start: Vec3,
        end: Vec3,
        #[serde(skip_serializing_if = "Option::is_none")]
        label_template: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    AngleMeasurement {
        a: Vec3,
        b: Vec3,
        c: Vec3,
        #[serde(skip_serializing_if = "Option::is_none")]
        label_template: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Label {
        position: Vec3,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label_size: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        label_color: Option<String>,
    },
}

impl Primitive {
    pub fn sphere(center: Vec3, radius: f64) -> Self {
        Self::Sphere {
            center,
            radius,
            color: None,
            tooltip: None,
        }
    }

    pub fn label(position: Vec3, text: impl Into<String>) -> Self {
        Self::Label {
            position,
            text: text.into(),
            label_size: None,
            label_color: None,
        }
    }
}

/// Handle on a `primitives` group node.
pub struct Primitives<'a> {
    pub(super) builder: &'a mut Builder,
    pub(super) id: usize,
}

impl Primitives<'_> {
    /// Append a primitive to this group.
    pub fn add(&mut self, primitive: Primitive) -> &mut Self {
        self.builder.push_child(
            self.id,
            NodeKind::Primitive,
            Some(NodeParams::Primitive(primitive)),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.builder.nodes[self.id].children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
