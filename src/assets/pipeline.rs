//! Build-time variant computation and the asset route table.
//!
//! # Responsibilities
//! - Encode each artifact once (identity, plus gzip and brotli for text)
//! - Index every artifact by its public path
//!
//! # Design Decisions
//! - Any encode or read failure aborts the whole build
//! - Exactly one entry per public path; a repeated path replaces the earlier one

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::variant::{encode_brotli, encode_gzip, AssetKind, AssetVariant, Encoding};
use crate::compiler::path::to_route_token;
use crate::error::CompileError;

/// A finalized build output.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Request path the artifact is served under, with a leading slash.
    pub public_path: String,
    pub bytes: Vec<u8>,
    pub kind: AssetKind,
}

impl Artifact {
    pub fn new(public_path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let public_path = public_path.into();
        let kind = AssetKind::from_path(Path::new(&public_path));
        Self {
            public_path,
            bytes,
            kind,
        }
    }
}

/// Every variant available for one public path.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub identity: AssetVariant,
    pub gzip: Option<AssetVariant>,
    pub brotli: Option<AssetVariant>,
}

/// Compute the variants of `artifact`.
pub fn build_variants(artifact: &Artifact, cache_control: &str) -> Result<AssetEntry, CompileError> {
    let identity = AssetVariant::new(
        Encoding::Identity,
        artifact.bytes.clone(),
        artifact.kind,
        cache_control,
    );

    if !artifact.kind.is_text() {
        return Ok(AssetEntry {
            identity,
            gzip: None,
            brotli: None,
        });
    }

    let encode_err = |encoding| {
        move |source| CompileError::Encode {
            public_path: artifact.public_path.clone(),
            encoding,
            source,
        }
    };

    let brotli = encode_brotli(&artifact.bytes).map_err(encode_err(Encoding::Brotli))?;
    let gzip = encode_gzip(&artifact.bytes).map_err(encode_err(Encoding::Gzip))?;

    Ok(AssetEntry {
        identity,
        gzip: Some(AssetVariant::new(Encoding::Gzip, gzip, artifact.kind, cache_control)),
        brotli: Some(AssetVariant::new(Encoding::Brotli, brotli, artifact.kind, cache_control)),
    })
}

/// Public path → variants. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct AssetRouteTable {
    entries: HashMap<String, AssetEntry>,
}

impl AssetRouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and register `artifact`, replacing any entry at the same path.
    pub fn insert(&mut self, artifact: &Artifact, cache_control: &str) -> Result<(), CompileError> {
        let entry = build_variants(artifact, cache_control)?;
        if self.entries.insert(artifact.public_path.clone(), entry).is_some() {
            tracing::warn!(path = %artifact.public_path, "Asset emitted twice, keeping the later one");
        }
        Ok(())
    }

    pub fn from_artifacts<'a>(
        artifacts: impl IntoIterator<Item = &'a Artifact>,
        cache_control: &str,
    ) -> Result<Self, CompileError> {
        let mut table = Self::new();
        for artifact in artifacts {
            table.insert(artifact, cache_control)?;
        }
        Ok(table)
    }

    /// Build the table from every file under `out_dir`.
    pub fn from_out_dir(out_dir: &Path, cache_control: &str) -> Result<Self, CompileError> {
        let mut files = Vec::new();
        collect_files(out_dir, &mut files)?;
        files.sort();

        let mut table = Self::new();
        for file in files {
            let bytes = fs::read(&file).map_err(|source| CompileError::ReadArtifact {
                path: file.clone(),
                source,
            })?;
            let public_path = format!("/{}", to_route_token(file.strip_prefix(out_dir).unwrap_or(&file)));
            table.insert(&Artifact::new(public_path, bytes), cache_control)?;
        }

        tracing::info!(out_dir = ?out_dir, assets = table.len(), "Asset route table built");
        Ok(table)
    }

    pub fn get(&self, path: &str) -> Option<&AssetEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CompileError> {
    let read_err = |source| CompileError::ReadArtifact {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if entry.file_type().map_err(read_err)?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CACHE: &str = "public, max-age=86400";

    #[test]
    fn test_text_artifact_gets_all_variants() {
        let entry = build_variants(&Artifact::new("/index.css", b"body{margin:0}body{margin:0}".to_vec()), CACHE).unwrap();

        assert_eq!(&entry.identity.body[..], b"body{margin:0}body{margin:0}");
        assert_eq!(entry.identity.headers.content_type, "text/css");
        assert_eq!(entry.identity.headers.cache_control, CACHE);

        let gzip = entry.gzip.unwrap();
        let brotli = entry.brotli.unwrap();
        assert_eq!(gzip.headers.content_encoding, Encoding::Gzip);
        assert_eq!(brotli.headers.content_length, brotli.body.len());
        assert_ne!(gzip.etag(), brotli.etag());
        assert_ne!(gzip.etag(), entry.identity.etag());
    }

    #[test]
    fn test_binary_artifact_identity_only() {
        let entry = build_variants(&Artifact::new("/logo.png", vec![137, 80, 78, 71]), CACHE).unwrap();
        assert!(entry.gzip.is_none());
        assert!(entry.brotli.is_none());
        assert_eq!(entry.identity.headers.content_length, 4);
    }

    #[test]
    fn test_last_write_wins() {
        let first = Artifact::new("/app.js", b"first".to_vec());
        let second = Artifact::new("/app.js", b"second".to_vec());
        let table = AssetRouteTable::from_artifacts([&first, &second], CACHE).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(&table.get("/app.js").unwrap().identity.body[..], b"second");
    }

    #[test]
    fn test_from_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("a1b2c3.js"), "export{}").unwrap();
        fs::write(dir.path().join("assets/font.woff2"), [0u8, 1, 2]).unwrap();

        let table = AssetRouteTable::from_out_dir(dir.path(), CACHE).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("/a1b2c3.js").unwrap().brotli.is_some());
        assert!(table.get("/assets/font.woff2").unwrap().gzip.is_none());
        assert!(table.get("/missing.js").is_none());
    }

    #[test]
    fn test_missing_out_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AssetRouteTable::from_out_dir(&dir.path().join("nope"), CACHE);
        assert!(matches!(result, Err(CompileError::ReadArtifact { .. })));
    }
}
