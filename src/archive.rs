//! MVSX archive packaging.
//!
//! An MVSX archive is a deflate-compressed zip holding the scene manifest
//! (`index.mvsj`) followed by the binary payloads the manifest refers to by
//! relative URL, e.g. `trajectory.pdb` and `trajectory.xtc`.

use std::borrow::Cow;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use base64::Engine as _;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;
use crate::scene::StateSnapshot;

/// Entry name of the scene manifest inside an archive.
pub const MANIFEST_ENTRY: &str = "index.mvsj";

type Result<T> = std::result::Result<T, ArchiveError>;

/// Payload of an auxiliary archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxSource {
    Bytes(Vec<u8>),
    /// Read from disk when the archive is built.
    Path(PathBuf),
}

impl AuxSource {
    fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|source| ArchiveError::Read {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

impl From<Vec<u8>> for AuxSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for AuxSource {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for AuxSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for AuxSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Ordered mapping from entry name to payload.
///
/// Inserting a name that is already present replaces its payload but keeps
/// the original position, so the last write wins.
#[derive(Debug, Clone, Default)]
pub struct ArchiveData {
    entries: Vec<(String, AuxSource)>,
}

impl ArchiveData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<AuxSource>) -> &mut Self {
        let name = name.into();
        let source = source.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = source,
            None => self.entries.push((name, source)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AuxSource)> {
        self.entries.iter().map(|(name, source)| (name.as_str(), source))
    }
}

impl<K: Into<String>, V: Into<AuxSource>> FromIterator<(K, V)> for ArchiveData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        data.extend(iter);
        data
    }
}

impl<K: Into<String>, V: Into<AuxSource>> Extend<(K, V)> for ArchiveData {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, source) in iter {
            self.insert(name, source);
        }
    }
}

/// Serialize a scene snapshot as the pretty-printed manifest text.
///
/// `null` members are dropped so optional fields never reach the viewer.
pub fn manifest_json<S: StateSnapshot + ?Sized>(state: &S) -> Result<String> {
    let mut value = state.snapshot()?;
    match &value {
        serde_json::Value::Object(map) if !map.is_empty() => {}
        serde_json::Value::Object(_) => {
            return Err(ArchiveError::State("state snapshot is empty".to_string()))
        }
        _ => {
            return Err(ArchiveError::State(
                "state snapshot is not a JSON object".to_string(),
            ))
        }
    }
    strip_nulls(&mut value);
    Ok(serde_json::to_string_pretty(&value)?)
}

fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Build an MVSX archive: the manifest first, then every payload in order.
pub fn build_mvsx<S: StateSnapshot + ?Sized>(state: &S, data: &ArchiveData) -> Result<Vec<u8>> {
    if let Some(name) = data.names().find(|name| *name == MANIFEST_ENTRY) {
        return Err(ArchiveError::ReservedEntry(name.to_string()));
    }

    let mvsj = manifest_json(state)?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    writer.start_file(MANIFEST_ENTRY, options)?;
    writer.write_all(mvsj.as_bytes())?;

    for (name, source) in data.iter() {
        let payload = source.read()?;
        tracing::debug!("Adding {} ({} bytes) to MVSX", name, payload.len());
        writer.start_file(name, options)?;
        writer.write_all(&payload)?;
    }

    let bytes = writer.finish()?.into_inner();
    tracing::debug!(
        "Built MVSX with {} entries ({} bytes)",
        data.len() + 1,
        bytes.len()
    );
    Ok(bytes)
}

/// Same as [`build_mvsx`], encoded with the standard base64 alphabet.
pub fn build_mvsx_base64<S: StateSnapshot + ?Sized>(state: &S, data: &ArchiveData) -> Result<String> {
    let bytes = build_mvsx(state, data)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// One decompressed entry of an archive.
#[derive(Debug, Clone)]
pub struct MvsxEntry {
    pub name: String,
    pub compression: CompressionMethod,
    pub data: Vec<u8>,
}

/// Decompressed view of an MVSX archive, entries in archive order.
#[derive(Debug, Clone)]
pub struct MvsxContents {
    entries: Vec<MvsxEntry>,
}

impl MvsxContents {
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(MvsxEntry {
                name: file.name().to_string(),
                compression: file.compression(),
                data,
            });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MvsxEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// The manifest text.
    pub fn manifest(&self) -> Result<&str> {
        let bytes = self
            .get(MANIFEST_ENTRY)
            .ok_or(ArchiveError::MissingManifest(MANIFEST_ENTRY))?;
        std::str::from_utf8(bytes)
            .map_err(|e| ArchiveError::State(format!("manifest is not UTF-8: {}", e)))
    }

    pub fn manifest_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(self.manifest()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manifest_is_pretty_printed_without_nulls() {
        let state = json!({ "root": { "kind": "root", "params": null } });
        let text = manifest_json(&state).unwrap();
        assert!(text.contains("\n  \"root\""));
        assert!(!text.contains("null"));
    }

    #[test]
    fn manifest_rejects_non_object_state() {
        let err = manifest_json(&json!("just a string")).unwrap_err();
        assert!(matches!(err, ArchiveError::State(_)));
    }

    #[test]
    fn manifest_rejects_empty_state() {
        let err = manifest_json(&json!({})).unwrap_err();
        assert!(matches!(err, ArchiveError::State(_)));
    }

    #[test]
    fn duplicate_names_keep_first_position_and_last_payload() {
        let mut data = ArchiveData::new();
        data.insert("a.pdb", b"one".to_vec())
            .insert("b.xtc", b"two".to_vec())
            .insert("a.pdb", b"three".to_vec());

        let names: Vec<_> = data.names().collect();
        assert_eq!(names, vec!["a.pdb", "b.xtc"]);
        assert_eq!(data.iter().next().unwrap().1, &AuxSource::Bytes(b"three".to_vec()));
    }

    #[test]
    fn reserved_manifest_name_is_rejected() {
        let data: ArchiveData = [(MANIFEST_ENTRY, b"{}".to_vec())].into_iter().collect();
        let err = build_mvsx(&json!({ "root": {} }), &data).unwrap_err();
        assert!(matches!(err, ArchiveError::ReservedEntry(_)));
    }

    #[test]
    fn entries_are_deflated_in_order() {
        let data: ArchiveData = [("x.pdb", b"ATOM".to_vec()), ("y.xtc", vec![0u8; 64])]
            .into_iter()
            .collect();
        let bytes = build_mvsx(&json!({ "root": { "kind": "root" } }), &data).unwrap();

        let contents = MvsxContents::read(&bytes).unwrap();
        assert_eq!(contents.names(), vec![MANIFEST_ENTRY, "x.pdb", "y.xtc"]);
        assert!(contents
            .entries()
            .iter()
            .all(|e| e.compression == CompressionMethod::Deflated));
        assert_eq!(contents.get("x.pdb"), Some(&b"ATOM"[..]));
    }

    #[test]
    fn missing_path_propagates_read_error() {
        let data: ArchiveData = [("gone.pdb", PathBuf::from("/definitely/not/here.pdb"))]
            .into_iter()
            .collect();
        let err = build_mvsx(&json!({ "root": {} }), &data).unwrap_err();
        match err {
            ArchiveError::Read { path, source } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.pdb"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn base64_output_decodes_to_archive() {
        let encoded = build_mvsx_base64(&json!({ "root": {} }), &ArchiveData::new()).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let contents = MvsxContents::read(&bytes).unwrap();
        assert_eq!(contents.names(), vec![MANIFEST_ENTRY]);
    }
}
