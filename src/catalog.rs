//! Trajectory catalog: discovers structure/trajectory file pairs in a data
//! directory and packages them as MVSX archives on demand.
//!
//! Nothing is cached. Every call rescans the directory, so files dropped into
//! it show up on the next request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::archive::{build_mvsx, ArchiveData};
use crate::error::{ArchiveError, CatalogError};
use crate::scene::{
    create_builder, Builder, ComponentExpression, ComponentSelector, ParseFormat,
    RepresentationParams, StructureParams,
};

/// Suffix of the topology/structure half of a pair.
pub const STRUCTURE_SUFFIX: &str = ".trajectory_system.pdb";
/// Suffix of the coordinates half of a pair.
pub const COORDINATES_SUFFIX: &str = ".trajectory.xtc";

/// Archive entry names the scene refers to.
pub const STRUCTURE_ENTRY: &str = "trajectory.pdb";
pub const COORDINATES_ENTRY: &str = "trajectory.xtc";

/// Residue highlighted as ball-and-stick when nothing else is configured.
pub const DEFAULT_HIGHLIGHT_RESIDUE: &str = "UNK";

type Result<T> = std::result::Result<T, CatalogError>;

/// A structure file and its trajectory, matched by file-name prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryEntry {
    pub id: String,
    pub label: String,
    pub structure_path: PathBuf,
    pub coordinates_path: PathBuf,
}

/// What the listing endpoint returns per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub id: String,
    pub label: String,
}

impl From<&TrajectoryEntry> for TrajectorySummary {
    fn from(entry: &TrajectoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label.clone(),
        }
    }
}

/// Turn an id such as `unbinding_results_0` into `unbinding results 0`.
pub fn label_for(id: &str) -> String {
    id.replace('_', " ")
}

/// Scan `dir` for pairs sharing a prefix. Only prefixes with both a
/// structure and a coordinates file are returned, sorted by id.
pub fn find_trajectory_pairs(dir: &Path) -> Result<Vec<TrajectoryEntry>> {
    if !dir.exists() {
        return Err(CatalogError::DirectoryMissing(dir.to_path_buf()));
    }

    let scan_err = |source: std::io::Error| CatalogError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut structures: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut coordinates: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(id) = name.strip_suffix(STRUCTURE_SUFFIX) {
            structures.insert(id.to_string(), path.clone());
        } else if let Some(id) = name.strip_suffix(COORDINATES_SUFFIX) {
            coordinates.insert(id.to_string(), path.clone());
        }
    }

    let entries = structures
        .into_iter()
        .filter_map(|(id, structure_path)| {
            let coordinates_path = coordinates.remove(&id)?;
            Some(TrajectoryEntry {
                label: label_for(&id),
                id,
                structure_path,
                coordinates_path,
            })
        })
        .collect();

    Ok(entries)
}

/// The fixed trajectory scene: coordinates from the xtc drive a pdb model,
/// the highlighted residue is drawn as blue ball-and-stick and everything
/// else as a white default representation.
pub fn trajectory_scene(highlight_residue: &str, timestamp: DateTime<Utc>) -> Builder {
    let mut builder = create_builder().with_timestamp(timestamp);
    builder
        .download(COORDINATES_ENTRY)
        .parse(ParseFormat::Xtc)
        .coordinates("traj");

    let mut structure = builder
        .download(STRUCTURE_ENTRY)
        .parse(ParseFormat::Pdb)
        .model_structure(StructureParams::new().with_coordinates("traj"));
    structure
        .component(ComponentExpression::residue_name(highlight_residue))
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

    builder
}

/// Build the archive for one pair. The manifest timestamp comes from the
/// structure file's modification time, so unchanged inputs produce the same
/// manifest.
pub fn build_trajectory_archive(
    entry: &TrajectoryEntry,
    highlight_residue: &str,
) -> std::result::Result<Vec<u8>, ArchiveError> {
    tracing::info!(
        "Building MVSX for {}",
        entry
            .structure_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );

    let modified = std::fs::metadata(&entry.structure_path)
        .and_then(|m| m.modified())
        .map_err(|source| ArchiveError::Read {
            path: entry.structure_path.clone(),
            source,
        })?;
    let builder = trajectory_scene(highlight_residue, DateTime::<Utc>::from(modified));

    let mut data = ArchiveData::new();
    data.insert(STRUCTURE_ENTRY, entry.structure_path.as_path())
        .insert(COORDINATES_ENTRY, entry.coordinates_path.as_path());

    build_mvsx(&builder, &data)
}

/// Read-only view over a data directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    dir: PathBuf,
    highlight_residue: String,
}

impl Catalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            highlight_residue: DEFAULT_HIGHLIGHT_RESIDUE.to_string(),
        }
    }

    pub fn with_highlight_residue(mut self, residue: impl Into<String>) -> Self {
        self.highlight_residue = residue.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn highlight_residue(&self) -> &str {
        &self.highlight_residue
    }

    pub fn list(&self) -> Result<Vec<TrajectorySummary>> {
        tracing::info!("Scanning trajectories in {}", self.dir.display());
        let entries = find_trajectory_pairs(&self.dir)?;
        Ok(entries.iter().map(TrajectorySummary::from).collect())
    }

    pub fn find(&self, id: &str) -> Result<TrajectoryEntry> {
        find_trajectory_pairs(&self.dir)?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Rescan, locate `id`, and build its archive.
    pub fn fetch_archive(&self, id: &str) -> Result<Vec<u8>> {
        let entry = self.find(id)?;
        build_trajectory_archive(&entry, &self.highlight_residue).map_err(|source| {
            CatalogError::Build {
                id: id.to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MvsxContents;
    use crate::scene::StateSnapshot;

    #[test]
    fn label_replaces_underscores() {
        assert_eq!(label_for("unbinding_results_0"), "unbinding results 0");
        assert_eq!(label_for("plain"), "plain");
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = find_trajectory_pairs(Path::new("/no/such/testdata")).unwrap_err();
        assert!(matches!(err, CatalogError::DirectoryMissing(_)));
        assert!(err.to_string().contains("/no/such/testdata"));
    }

    #[test]
    fn recipe_highlights_configured_residue() {
        let state = trajectory_scene("LIG", Utc::now()).snapshot().unwrap();
        let structure = &state["root"]["children"][1]["children"][0]["children"][0];
        assert_eq!(structure["params"]["coordinates_ref"], "traj");

        let highlight = &structure["children"][0];
        assert_eq!(highlight["params"]["selector"]["label_comp_id"], "LIG");
        let repr = &highlight["children"][0];
        assert_eq!(repr["params"]["type"], "ball_and_stick");
        assert_eq!(repr["params"]["size_factor"], 0.7);
        assert_eq!(repr["params"]["ignore_hydrogens"], true);
        assert_eq!(repr["children"][0]["params"]["color"], "blue");

        let rest = &structure["children"][1];
        assert_eq!(rest["params"]["selector"], "all");
        assert_eq!(rest["children"][0]["children"][0]["params"]["color"], "white");
    }

    #[test]
    fn fetch_archive_packages_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run_1.trajectory_system.pdb"), b"ATOM").unwrap();
        std::fs::write(dir.path().join("run_1.trajectory.xtc"), b"\x00\x01").unwrap();

        let bytes = Catalog::new(dir.path()).fetch_archive("run_1").unwrap();
        let contents = MvsxContents::read(&bytes).unwrap();
        assert_eq!(contents.get(STRUCTURE_ENTRY), Some(&b"ATOM"[..]));
        assert_eq!(contents.get(COORDINATES_ENTRY), Some(&b"\x00\x01"[..]));
    }
}
