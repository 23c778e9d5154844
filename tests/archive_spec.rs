use molstar_mvsx::archive::{build_mvsx, ArchiveData, MvsxContents, MANIFEST_ENTRY};
use molstar_mvsx::error::{ArchiveError, WidgetError};
use molstar_mvsx::scene::{
    create_builder, ComponentSelector, ParseFormat, RepresentationParams, StateSnapshot,
    StructureParams,
};
use molstar_mvsx::widget::MolstarWidget;
use serde_json::json;
use speculate2::speculate;

speculate! {
    before {
        let mut builder = create_builder();
        builder
            .download("1cbs.pdb")
            .parse(ParseFormat::Pdb)
            .model_structure(StructureParams::new())
            .component(ComponentSelector::all())
            .representation(RepresentationParams::default())
            .color("white");
    }

    describe "build_mvsx" {
        it "holds only the manifest when there is no data" {
            let bytes = build_mvsx(&builder, &ArchiveData::new()).expect("Failed to build");
            let contents = MvsxContents::read(&bytes).expect("Failed to read");

            assert_eq!(contents.names(), vec![MANIFEST_ENTRY]);
            assert_eq!(
                contents.manifest_value().unwrap(),
                builder.snapshot().unwrap()
            );
        }

        it "writes one entry per unique name plus the manifest" {
            let data: ArchiveData = (0..5)
                .map(|i| (format!("frame_{i}.pdb"), format!("MODEL {i}").into_bytes()))
                .collect();

            let bytes = build_mvsx(&builder, &data).expect("Failed to build");
            let contents = MvsxContents::read(&bytes).expect("Failed to read");

            assert_eq!(contents.entries().len(), 6);
            assert_eq!(contents.names()[0], MANIFEST_ENTRY);
            assert_eq!(contents.get("frame_3.pdb"), Some(&b"MODEL 3"[..]));
        }

        it "collapses duplicate names to the last payload" {
            let data: ArchiveData = [
                ("model.pdb", b"first".to_vec()),
                ("model.pdb", b"second".to_vec()),
            ]
            .into_iter()
            .collect();

            let bytes = build_mvsx(&builder, &data).expect("Failed to build");
            let contents = MvsxContents::read(&bytes).expect("Failed to read");

            assert_eq!(contents.entries().len(), 2);
            assert_eq!(contents.get("model.pdb"), Some(&b"second"[..]));
        }

        it "reads payloads from paths" {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("1cbs.pdb");
            std::fs::write(&path, "HEADER 1CBS").unwrap();

            let mut data = ArchiveData::new();
            data.insert("1cbs.pdb", path.as_path());
            let bytes = build_mvsx(&builder, &data).expect("Failed to build");

            let contents = MvsxContents::read(&bytes).unwrap();
            assert_eq!(contents.get("1cbs.pdb"), Some(&b"HEADER 1CBS"[..]));
        }

        it "propagates a missing file" {
            let dir = tempfile::tempdir().unwrap();
            let mut data = ArchiveData::new();
            data.insert("1cbs.pdb", dir.path().join("absent.pdb"));

            let err = build_mvsx(&builder, &data).unwrap_err();
            assert!(matches!(err, ArchiveError::Read { .. }));
        }

        it "pretty-prints the manifest" {
            let bytes = build_mvsx(&builder, &ArchiveData::new()).unwrap();
            let contents = MvsxContents::read(&bytes).unwrap();

            let manifest = contents.manifest().unwrap();
            assert!(manifest.starts_with("{\n  "));
        }
    }

    describe "widget construction" {
        it "rejects an archive and a scene together" {
            let encoded = MolstarWidget::from_scene(&builder, ArchiveData::new())
                .unwrap()
                .mvsx_base64()
                .to_string();

            let err = MolstarWidget::builder()
                .mvsx_base64(encoded)
                .scene(&builder, ArchiveData::new())
                .build()
                .unwrap_err();
            assert!(matches!(err, WidgetError::ConflictingSources));
        }

        it "accepts a pre-built archive as is" {
            let bytes = build_mvsx(&json!({ "root": { "kind": "root" } }), &ArchiveData::new())
                .unwrap();
            let widget = MolstarWidget::from_mvsx_bytes(&bytes);

            let contents = widget.contents().unwrap();
            assert_eq!(contents.manifest_value().unwrap()["root"]["kind"], "root");
            assert_eq!(widget.frame_index(), 0);
        }
    }
}
