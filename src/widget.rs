//! Mol* notebook widget.
//!
//! The widget owns the state synchronized with the host component: the
//! base64-encoded MVSX archive, the viewer layout toggles, and the current
//! trajectory frame. The host side lives in `assets/molstar_widget.js`.
//! After the first render, [`MolstarWidget::update_html`] pushes changed
//! attributes to the viewer with the same element id.
//!
//! ```no_run
//! use molstar_mvsx::archive::ArchiveData;
//! use molstar_mvsx::scene::create_builder;
//! use molstar_mvsx::widget::MolstarWidget;
//!
//! let builder = create_builder();
//! let mut widget = MolstarWidget::from_scene(&builder, ArchiveData::new()).unwrap();
//! widget.set_frame_index(12);
//! widget.evcxr_display();
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::archive::{build_mvsx_base64, ArchiveData, MvsxContents};
use crate::error::WidgetError;
use crate::scene::StateSnapshot;

const HOST_SCRIPT: &str = include_str!("../assets/molstar_widget.js");

static NEXT_ELEMENT_ID: AtomicUsize = AtomicUsize::new(0);

/// Viewer layout and viewport toggles, passed straight to `Viewer.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    pub layout_show_controls: bool,
    pub layout_show_remote_state: bool,
    pub layout_show_log: bool,
    pub layout_is_expanded: bool,
    pub show_welcome_message: bool,
    pub viewport_show_expand: bool,
    pub viewport_show_controls: bool,
    pub collapse_left_panel: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            layout_show_controls: false,
            layout_show_remote_state: false,
            layout_show_log: true,
            layout_is_expanded: false,
            show_welcome_message: false,
            viewport_show_expand: true,
            viewport_show_controls: true,
            collapse_left_panel: true,
        }
    }
}

impl WidgetOptions {
    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "layout_show_controls" => &mut self.layout_show_controls,
            "layout_show_remote_state" => &mut self.layout_show_remote_state,
            "layout_show_log" => &mut self.layout_show_log,
            "layout_is_expanded" => &mut self.layout_is_expanded,
            "show_welcome_message" => &mut self.show_welcome_message,
            "viewport_show_expand" => &mut self.viewport_show_expand,
            "viewport_show_controls" => &mut self.viewport_show_controls,
            "collapse_left_panel" => &mut self.collapse_left_panel,
            _ => return None,
        })
    }
}

/// Names of every synchronized attribute.
pub const ATTRIBUTES: [&str; 10] = [
    "mvsx_base64",
    "layout_show_controls",
    "layout_show_remote_state",
    "layout_show_log",
    "layout_is_expanded",
    "show_welcome_message",
    "viewport_show_expand",
    "viewport_show_controls",
    "collapse_left_panel",
    "frame_index",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MolstarWidget {
    mvsx_base64: String,
    options: WidgetOptions,
    frame_index: i64,
    element_id: String,
}

fn next_element_id() -> String {
    format!(
        "molstar-widget-{}",
        NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed)
    )
}

/// Collects widget inputs. A widget is built either from a ready archive or
/// from a scene plus its payloads, never both.
#[derive(Default)]
pub struct WidgetBuilder<'a> {
    mvsx_base64: Option<String>,
    scene: Option<(&'a dyn StateSnapshot, ArchiveData)>,
    options: WidgetOptions,
    frame_index: i64,
}

impl<'a> WidgetBuilder<'a> {
    pub fn mvsx_base64(mut self, encoded: impl Into<String>) -> Self {
        self.mvsx_base64 = Some(encoded.into());
        self
    }

    pub fn scene(mut self, state: &'a dyn StateSnapshot, data: ArchiveData) -> Self {
        self.scene = Some((state, data));
        self
    }

    pub fn options(mut self, options: WidgetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn frame_index(mut self, frame_index: i64) -> Self {
        self.frame_index = frame_index;
        self
    }

    /// Packages the scene eagerly; any archive error aborts construction.
    pub fn build(self) -> Result<MolstarWidget, WidgetError> {
        let mvsx_base64 = match (self.mvsx_base64, self.scene) {
            (Some(_), Some(_)) => return Err(WidgetError::ConflictingSources),
            (Some(encoded), None) => encoded,
            (None, Some((state, data))) => build_mvsx_base64(state, &data)?,
            (None, None) => String::new(),
        };
        Ok(MolstarWidget {
            mvsx_base64,
            options: self.options,
            frame_index: self.frame_index,
            element_id: next_element_id(),
        })
    }
}

impl MolstarWidget {
    pub fn builder<'a>() -> WidgetBuilder<'a> {
        WidgetBuilder::default()
    }

    pub fn from_scene(state: &dyn StateSnapshot, data: ArchiveData) -> Result<Self, WidgetError> {
        Self::builder().scene(state, data).build()
    }

    pub fn from_mvsx_base64(encoded: impl Into<String>) -> Self {
        Self {
            mvsx_base64: encoded.into(),
            options: WidgetOptions::default(),
            frame_index: 0,
            element_id: next_element_id(),
        }
    }

    pub fn from_mvsx_bytes(bytes: &[u8]) -> Self {
        Self::from_mvsx_base64(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn mvsx_base64(&self) -> &str {
        &self.mvsx_base64
    }

    /// Decode and unpack the current archive.
    pub fn contents(&self) -> Result<MvsxContents, WidgetError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(&self.mvsx_base64)?;
        MvsxContents::read(&bytes).map_err(WidgetError::Archive)
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut WidgetOptions {
        &mut self.options
    }

    pub fn frame_index(&self) -> i64 {
        self.frame_index
    }

    pub fn set_frame_index(&mut self, frame_index: i64) {
        self.frame_index = frame_index;
    }

    /// Id of the container element emitted by [`Self::to_html`]. Fixed for
    /// the lifetime of the widget so updates can find the rendered viewer.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Flat object of every synchronized attribute, as sent to the host.
    pub fn sync_state(&self) -> Value {
        let o = &self.options;
        json!({
            "mvsx_base64": self.mvsx_base64,
            "layout_show_controls": o.layout_show_controls,
            "layout_show_remote_state": o.layout_show_remote_state,
            "layout_show_log": o.layout_show_log,
            "layout_is_expanded": o.layout_is_expanded,
            "show_welcome_message": o.show_welcome_message,
            "viewport_show_expand": o.viewport_show_expand,
            "viewport_show_controls": o.viewport_show_controls,
            "collapse_left_panel": o.collapse_left_panel,
            "frame_index": self.frame_index,
        })
    }

    /// Apply a partial update coming from the host component.
    ///
    /// The whole update is validated before anything is written. Returns the
    /// attributes whose value actually changed.
    pub fn apply_host_update(&mut self, update: &Value) -> Result<Vec<String>, WidgetError> {
        let fields = update.as_object().ok_or(WidgetError::NotAnObject)?;
        validate_update(fields)?;

        let mut changed = Vec::new();
        for (name, value) in fields {
            let differs = match name.as_str() {
                "mvsx_base64" => {
                    let next = value.as_str().unwrap_or_default();
                    let differs = self.mvsx_base64 != next;
                    self.mvsx_base64 = next.to_string();
                    differs
                }
                "frame_index" => {
                    let next = value.as_i64().unwrap_or_default();
                    let differs = self.frame_index != next;
                    self.frame_index = next;
                    differs
                }
                flag => match self.options.flag_mut(flag) {
                    Some(slot) => {
                        let next = value.as_bool().unwrap_or_default();
                        let differs = *slot != next;
                        *slot = next;
                        differs
                    }
                    None => false,
                },
            };
            if differs {
                changed.push(name.clone());
            }
        }
        Ok(changed)
    }

    /// Standalone HTML: a container element plus the host script bound to a
    /// snapshot of the synchronized state.
    pub fn to_html(&self) -> String {
        let element_id = &self.element_id;
        let state = script_json(&self.sync_state());
        format!(
            r#"<div id="{element_id}" class="molstar-widget" style="position:relative;width:100%;height:520px;"></div>
<script type="module">
{HOST_SCRIPT}
renderStatic(document.getElementById("{element_id}"), {state});
</script>"#
        )
    }

    /// Script pushing the current value of each named attribute to the
    /// already rendered viewer. Names that are not synchronized attributes
    /// are skipped.
    pub fn update_html(&self, names: &[&str]) -> String {
        let state = self.sync_state();
        let target = script_json(&Value::from(self.element_id.as_str()));
        let calls: String = names
            .iter()
            .filter_map(|name| {
                let value = state.get(*name)?;
                Some(format!(
                    "  widget.set({}, {});\n",
                    script_json(&Value::from(*name)),
                    script_json(value)
                ))
            })
            .collect();
        format!(
            "<script type=\"module\">\nconst widget = window.molstarWidgets?.[{target}];\nif (widget) {{\n{calls}}}\n</script>"
        )
    }

    pub fn frame_update_html(&self) -> String {
        self.update_html(&["frame_index"])
    }

    /// Render in an evcxr (Rust Jupyter kernel) cell.
    pub fn evcxr_display(&self) {
        println!(
            "EVCXR_BEGIN_CONTENT text/html\n{}\nEVCXR_END_CONTENT",
            self.to_html()
        );
    }

    /// Push the named attributes to a widget displayed in an earlier evcxr
    /// cell.
    pub fn evcxr_update(&self, names: &[&str]) {
        println!(
            "EVCXR_BEGIN_CONTENT text/html\n{}\nEVCXR_END_CONTENT",
            self.update_html(names)
        );
    }
}

// `</` inside an inline script would end it early.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn validate_update(fields: &Map<String, Value>) -> Result<(), WidgetError> {
    for (name, value) in fields {
        let (ok, expected) = match name.as_str() {
            "mvsx_base64" => (value.is_string(), "string"),
            "frame_index" => (value.is_i64(), "integer"),
            other if ATTRIBUTES.contains(&other) => (value.is_boolean(), "boolean"),
            other => return Err(WidgetError::UnknownAttribute(other.to_string())),
        };
        if !ok {
            return Err(WidgetError::InvalidValue {
                name: name.clone(),
                expected,
            });
        }
    }
    Ok(())
}
