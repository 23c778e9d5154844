//! MolViewSpec packaging for the Mol* viewer.
//!
//! - [`scene`]: builds MVS scene trees.
//! - [`archive`]: packs a scene and its data files into an MVSX zip.
//! - [`widget`]: notebook widget state around an MVSX archive.
//! - [`catalog`]: finds structure/trajectory pairs on disk.
//! - [`api`]: HTTP service listing pairs and serving their archives.

pub mod api;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod scene;
pub mod widget;
