//! On-disk layout of an export bundle
//!
//! ```text
//! <root>/
//! ├── Export.xml               # health records + workout shells
//! ├── electrocardiograms/      # one proprietary CSV per ECG
//! │   └── ecg_2021-05-01.csv
//! └── workout-routes/          # one GPX document per route
//!     └── route_2021-05-01_10.00am.gpx
//! ```

use crate::domain::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the main export document
pub const EXPORT_FILE: &str = "Export.xml";

/// Folder holding ECG recordings
pub const ECG_DIR: &str = "electrocardiograms";

/// Folder holding route documents
pub const ROUTES_DIR: &str = "workout-routes";

/// Paths of one export bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    /// Creates a layout rooted at the bundle directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bundle root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `Export.xml`
    pub fn export_file(&self) -> PathBuf {
        self.root.join(EXPORT_FILE)
    }

    /// Path of the ECG folder
    pub fn ecg_dir(&self) -> PathBuf {
        self.root.join(ECG_DIR)
    }

    /// Path of the route folder
    pub fn routes_dir(&self) -> PathBuf {
        self.root.join(ROUTES_DIR)
    }

    /// Resolves a route reference from the export document
    ///
    /// References are written bundle-absolute (`/workout-routes/x.gpx`), so the
    /// leading separator is dropped before joining onto the root.
    pub fn resolve(&self, reference: &Path) -> PathBuf {
        let relative = reference.strip_prefix("/").unwrap_or(reference);
        self.root.join(relative)
    }
}

/// Regular, non-hidden files directly inside `dir`, sorted by name
///
/// A missing directory yields an empty list.
pub fn visible_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File stem of a path as an owned string
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = ExportLayout::new("/data/export");
        assert_eq!(
            layout.export_file(),
            PathBuf::from("/data/export/Export.xml")
        );
        assert_eq!(
            layout.ecg_dir(),
            PathBuf::from("/data/export/electrocardiograms")
        );
        assert_eq!(
            layout.routes_dir(),
            PathBuf::from("/data/export/workout-routes")
        );
    }

    #[test]
    fn test_resolve_strips_leading_separator() {
        let layout = ExportLayout::new("/data/export");
        assert_eq!(
            layout.resolve(Path::new("/workout-routes/route_1.gpx")),
            PathBuf::from("/data/export/workout-routes/route_1.gpx")
        );
        assert_eq!(
            layout.resolve(Path::new("workout-routes/route_1.gpx")),
            PathBuf::from("/data/export/workout-routes/route_1.gpx")
        );
    }

    #[test]
    fn test_visible_files_skips_hidden_and_dirs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.csv"), "").unwrap();
        fs::write(temp.path().join("a.csv"), "").unwrap();
        fs::write(temp.path().join(".DS_Store"), "").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();

        let files = visible_files(temp.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| stem_of(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_visible_files_missing_dir() {
        let files = visible_files(Path::new("/definitely/not/here")).unwrap();
        assert!(files.is_empty());
    }
}
