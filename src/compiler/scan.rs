//! Route tree discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CompileError;

/// File-name filter for one route tree.
#[derive(Debug, Clone)]
pub struct TreeFilter {
    pub include: String,
    pub exclude: Option<String>,
}

impl TreeFilter {
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.ends_with(&self.include)
            && !self
                .exclude
                .as_deref()
                .is_some_and(|exclude| !exclude.is_empty() && name.ends_with(exclude))
    }
}

/// A discovered route file.
#[derive(Debug, Clone)]
pub struct RouteFile {
    pub path: PathBuf,
    /// True when the file holds only whitespace.
    pub is_blank: bool,
}

/// Recursively list the route files under `root` in lexical path order.
///
/// Every matching file is read; an unreadable file fails the scan.
pub fn scan_tree(root: &Path, filter: &TreeFilter) -> Result<Vec<RouteFile>, CompileError> {
    let mut paths = Vec::new();
    collect(root, filter, &mut paths)?;
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let bytes = fs::read(&path).map_err(|source| CompileError::ReadRoute {
                path: path.clone(),
                source,
            })?;
            let is_blank = bytes.iter().all(u8::is_ascii_whitespace);
            Ok(RouteFile { path, is_blank })
        })
        .collect()
}

fn collect(dir: &Path, filter: &TreeFilter, out: &mut Vec<PathBuf>) -> Result<(), CompileError> {
    let scan_err = |source| CompileError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(scan_err)?;

        if file_type.is_dir() {
            collect(&path, filter, out)?;
        } else if filter.matches(&path) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_filter() -> TreeFilter {
        TreeFilter {
            include: ".tsx".into(),
            exclude: Some(".client.tsx".into()),
        }
    }

    #[test]
    fn test_filter() {
        let filter = server_filter();
        assert!(filter.matches(Path::new("a/index.tsx")));
        assert!(!filter.matches(Path::new("a/index.client.tsx")));
        assert!(!filter.matches(Path::new("a/styles.css")));
    }

    #[test]
    fn test_scan_sorted_and_blank_detection() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("user")).unwrap();
        fs::write(dir.path().join("user/_id.tsx"), "  \n").unwrap();
        fs::write(dir.path().join("index.tsx"), "export default () => <div></div>").unwrap();
        fs::write(dir.path().join("index.client.tsx"), "").unwrap();

        let files = scan_tree(dir.path(), &server_filter()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with("index.tsx"));
        assert!(!files[0].is_blank);
        assert!(files[1].path.ends_with("user/_id.tsx"));
        assert!(files[1].is_blank);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_tree(&dir.path().join("missing"), &server_filter()).unwrap_err();
        assert!(matches!(err, CompileError::Scan { .. }));
    }
}
