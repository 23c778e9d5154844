//! Notebook walkthrough rendered to a static HTML page.
//!
//! Each section mirrors a notebook cell: a trajectory with a highlighted
//! ligand, a primitives gallery, and a selector gallery on a remote mmCIF.
//! In an evcxr kernel call `widget.evcxr_display()` instead of collecting
//! HTML, and `widget.evcxr_update(&["frame_index"])` from a later cell to move
//! the displayed trajectory.
//!
//! The trajectory section renders at frame 0, then a follow-up script moves
//! it to the requested frame. Its slider feeds page-side changes back in the
//! same JSON shape `apply_host_update` takes; they are logged to the console.
//!
//! ```text
//! cargo run --example notebook_demo -- testdata/unbinding_trajectory_results_0 [frame]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;

use molstar_mvsx::archive::ArchiveData;
use molstar_mvsx::catalog::{COORDINATES_SUFFIX, STRUCTURE_SUFFIX};
use molstar_mvsx::scene::{
    create_builder, Builder, CanvasParams, ComponentExpression, ComponentSelector, ParseFormat,
    Primitive, PrimitivesParams, RepresentationParams, StructureParams,
};
use molstar_mvsx::widget::MolstarWidget;

fn trajectory_widget(prefix: &str) -> anyhow::Result<MolstarWidget> {
    let pdb_path = PathBuf::from(format!("{prefix}{STRUCTURE_SUFFIX}"));
    let xtc_path = PathBuf::from(format!("{prefix}{COORDINATES_SUFFIX}"));

    let mut builder = create_builder();
    builder
        .download("my.xtc")
        .parse(ParseFormat::Xtc)
        .coordinates("traj");
    let mut structure = builder
        .download("my.pdb")
        .parse(ParseFormat::Pdb)
        .model_structure(StructureParams::new().with_coordinates("traj"));
    structure
        .component(ComponentExpression::residue_name("UNK"))
        .representation(
            RepresentationParams::ball_and_stick()
                .with_size_factor(0.7)
                .ignoring_hydrogens(true),
        )
        .color("blue");
    structure
        .component(ComponentSelector::all())
        .representation(RepresentationParams::default())
        .color("white");
    builder.canvas(
        CanvasParams::default(),
        Some(json!({
            "molstar_postprocessing": { "enable_outline": true, "enable_shadow": true }
        })),
    );

    let data: ArchiveData = [("my.pdb", pdb_path), ("my.xtc", xtc_path)]
        .into_iter()
        .collect();
    MolstarWidget::from_scene(&builder, data)
        .with_context(|| format!("Failed to package trajectory {prefix}"))
}

/// Rendered widget followed by a script moving it to `frame`, plus a slider
/// that drives the frame from the page.
fn trajectory_section(mut widget: MolstarWidget, frame: i64) -> anyhow::Result<String> {
    let html = widget.to_html();
    let changed = widget
        .apply_host_update(&json!({ "frame_index": frame }))
        .context("Invalid frame update")?;
    let update = if changed.is_empty() {
        String::new()
    } else {
        widget.frame_update_html()
    };

    let id = widget.element_id();
    let slider = format!(
        r#"<input type="range" min="0" max="200" value="{frame}" oninput="window.molstarWidgets['{id}']?.set('frame_index', Number(this.value), {{ fromHost: true }})">
<script>
document.getElementById('{id}').addEventListener('molstar-widget:change', (e) => console.log('host update', JSON.stringify(e.detail)));
</script>"#
    );
    Ok(format!("{html}\n{update}\n{slider}"))
}

fn primitives_scene() -> Builder {
    let mut builder = create_builder();
    let mut group = builder.primitives(PrimitivesParams {
        opacity: Some(0.8),
        tooltip: Some("Group Tooltip".into()),
        ..Default::default()
    });
    group
        .add(Primitive::Box {
            center: [2.0, 0.0, 0.0],
            extent: [1.0, 1.0, 1.0],
            face_color: Some("red".into()),
            tooltip: Some("I am a Box".into()),
        })
        .add(Primitive::Sphere {
            center: [5.0, 0.0, 0.0],
            radius: 1.5,
            color: Some("#0000FF".into()),
            tooltip: Some("I am a Sphere".into()),
        })
        .add(Primitive::Ellipsoid {
            center: [10.0, 0.0, 0.0],
            major_axis: [1.0, 0.0, 0.0],
            minor_axis: [0.0, 1.0, 0.0],
            radius: [1.5, 3.0, 1.0],
            color: Some("green".into()),
            tooltip: Some("I am an Ellipsoid".into()),
        })
        .add(Primitive::Tube {
            start: [0.0, 8.0, 0.0],
            end: [5.0, 8.0, 0.0],
            radius: 0.5,
            dash_length: Some(0.2),
            color: Some("cyan".into()),
            tooltip: Some("Dashed Tube".into()),
        })
        .add(Primitive::Arrow {
            start: [0.0, 12.0, 0.0],
            end: [10.0, 12.0, 5.0],
            tube_radius: 0.2,
            show_end_cap: true,
            end_cap_radius: Some(0.6),
            end_cap_length: Some(1.0),
            color: Some("magenta".into()),
            tooltip: Some("Direction Arrow".into()),
        })
        .add(Primitive::DistanceMeasurement {
            start: [0.0, 0.0, 0.0],
            end: [5.0, 0.0, 0.0],
            label_template: Some("Dist: {:.2f} A".into()),
            color: Some("yellow".into()),
        })
        .add(Primitive::AngleMeasurement {
            a: [5.0, 0.0, 0.0],
            b: [0.0, 0.0, 0.0],
            c: [0.0, 5.0, 0.0],
            label_template: Some("Angle: {:.1f} deg".into()),
            color: Some("white".into()),
        })
        .add(Primitive::Label {
            position: [-2.0, 1.0, 1.0],
            text: "Hello Mol*".into(),
            label_size: Some(2.0),
            label_color: Some("lime".into()),
        });
    builder
}

fn selector_scene() -> Builder {
    let selection = vec![
        ComponentExpression::chain_range("A", 5, 15),
        ComponentExpression {
            auth_asym_id: Some("A".into()),
            auth_seq_id: Some(102),
            ..Default::default()
        },
        ComponentExpression {
            label_atom_id: Some("ND2".into()),
            ..Default::default()
        },
        ComponentExpression {
            type_symbol: Some("CA".into()),
            ..Default::default()
        },
        ComponentExpression {
            atom_id: Some(10),
            ..Default::default()
        },
        ComponentExpression {
            atom_index: Some(13),
            ..Default::default()
        },
        ComponentExpression::residue_name("HIS"),
    ];

    let mut builder = create_builder();
    let mut structure = builder
        .download("https://files.rcsb.org/download/1TMN.cif")
        .parse(ParseFormat::Mmcif)
        .model_structure(StructureParams::new());
    structure
        .component(ComponentSelector::all())
        .representation(RepresentationParams::default())
        .color("white");
    structure
        .component(selection)
        .representation(
            RepresentationParams::ball_and_stick()
                .with_size_factor(0.4)
                .ignoring_hydrogens(false),
        )
        .color("blue");
    builder
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let prefix = args.next();
    let frame = args
        .next()
        .map(|f| f.parse::<i64>())
        .transpose()
        .context("Frame index must be an integer")?
        .unwrap_or(0);

    let mut sections = Vec::new();
    if let Some(prefix) = prefix {
        let widget = trajectory_widget(&prefix)?;
        sections.push(("Trajectory", trajectory_section(widget, frame)?));
    }
    sections.push((
        "Primitives",
        MolstarWidget::from_scene(&primitives_scene(), ArchiveData::new())?.to_html(),
    ));
    sections.push((
        "Selectors",
        MolstarWidget::from_scene(&selector_scene(), ArchiveData::new())?.to_html(),
    ));

    let body: String = sections
        .iter()
        .map(|(title, html)| format!("<h2>{title}</h2>\n{html}\n"))
        .collect();
    let page = format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Mol* widget demo</title></head>\n<body>\n{body}</body></html>\n"
    );

    let output = PathBuf::from("notebook_demo.html");
    std::fs::write(&output, page)?;
    println!("Wrote {}", output.display());
    Ok(())
}
