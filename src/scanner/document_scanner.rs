use crate::error::{Office2MdError, Result};
use crate::scanner::file_type::FileType;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A regular file under the input tree whose extension the classifier accepts.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl DiscoveredFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
            size,
            modified,
        }
    }

    /// Builds an entry for a path that did not come out of a scan.
    ///
    /// The relative path is taken against `input_root` when the file lives
    /// beneath it, otherwise the bare file name is used. Missing files are
    /// accepted so the orchestrator can report them.
    pub fn from_path<P: AsRef<Path>, R: AsRef<Path>>(path: P, input_root: R) -> Self {
        let path = path.as_ref();
        let relative_path = match path.strip_prefix(input_root.as_ref()) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
        };

        let (size, modified) = match std::fs::metadata(path) {
            Ok(metadata) => (
                metadata.len(),
                metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            ),
            Err(_) => (0, SystemTime::UNIX_EPOCH),
        };

        Self::new(path.to_path_buf(), relative_path, size, modified)
    }

    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_path(&self.source_path)
    }

    /// Directory of the file relative to the input root, empty at the root.
    pub fn relative_dir(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

pub struct DocumentScanner {
    follow_links: bool,
}

impl DocumentScanner {
    pub fn new() -> Self {
        Self {
            follow_links: false,
        }
    }

    /// Recursively collects convertible files under `root`, sorted by relative path.
    ///
    /// Symbolic links and other non-regular entries are never returned.
    /// The root is not created here.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<DiscoveredFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(Office2MdError::NotFound {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(Office2MdError::Config {
                message: format!("{} is not a directory", root_path.display()),
            });
        }

        debug!(
            "Scanning {} for .{}",
            root_path.display(),
            FileType::all_extensions().join(", .")
        );

        let mut documents = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(self.follow_links)
            .into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Unreadable subtrees are skipped, the rest of the scan continues
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if let Some(document) = self.process_entry(&entry, root_path) {
                documents.push(document);
            }
        }

        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(
            "Scanned {}: {} convertible files",
            root_path.display(),
            documents.len()
        );

        Ok(documents)
    }

    fn process_entry(&self, entry: &DirEntry, root_path: &Path) -> Option<DiscoveredFile> {
        if !entry.file_type().is_file() {
            return None;
        }

        let path = entry.path();
        FileType::from_path(path)?;

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Cannot read metadata for {}: {}", path.display(), err);
                return None;
            }
        };

        let relative_path = calculate_relative_path(path, root_path)?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Some(DiscoveredFile::new(
            path.to_path_buf(),
            relative_path,
            metadata.len(),
            modified,
        ))
    }

    pub fn get_statistics(&self, documents: &[DiscoveredFile]) -> ScanStatistics {
        let mut files_by_type = std::collections::BTreeMap::new();
        for doc in documents {
            if let Some(file_type) = doc.file_type() {
                *files_by_type.entry(file_type.label()).or_insert(0) += 1;
            }
        }

        ScanStatistics {
            total_files: documents.len(),
            total_size: documents.iter().map(|d| d.size).sum(),
            files_by_type,
        }
    }
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn calculate_relative_path(file_path: &Path, root_path: &Path) -> Option<PathBuf> {
    let relative = file_path.strip_prefix(root_path).ok()?;

    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    Some(relative.to_path_buf())
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_type: std::collections::BTreeMap<&'static str, usize>,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        for (label, count) in &self.files_by_type {
            summary.push_str(&format!("    {}: {} files\n", label, count));
        }

        summary
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn relative_set(documents: &[DiscoveredFile]) -> HashSet<PathBuf> {
        documents.iter().map(|d| d.relative_path.clone()).collect()
    }

    #[test]
    fn test_discovered_file_creation() {
        let doc = DiscoveredFile::new(
            PathBuf::from("/in/sub/Report.PDF"),
            PathBuf::from("sub/Report.PDF"),
            100,
            SystemTime::UNIX_EPOCH,
        );

        assert_eq!(doc.filename, "Report.PDF");
        assert_eq!(doc.extension, "pdf");
        assert_eq!(doc.relative_dir(), Path::new("sub"));
        assert_eq!(doc.file_type(), Some(FileType::Pdf));
    }

    #[test]
    fn test_from_path_outside_root() {
        let doc = DiscoveredFile::from_path("/elsewhere/deep/a.docx", "/in");
        assert_eq!(doc.relative_path, PathBuf::from("a.docx"));
        assert_eq!(doc.relative_dir(), Path::new(""));

        let doc = DiscoveredFile::from_path("/in/x/y/b.xlsx", "/in");
        assert_eq!(doc.relative_path, PathBuf::from("x/y/b.xlsx"));
    }

    #[test]
    fn test_scanner_returns_only_supported_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("sub/deeper/deepest")).unwrap();
        fs::write(root.join("a.pdf"), "pdf").unwrap();
        fs::write(root.join("notes.txt"), "text").unwrap();
        fs::write(root.join("sub/b.docx"), "docx").unwrap();
        fs::write(root.join("sub/image.png"), "png").unwrap();
        fs::write(root.join("sub/deeper/c.XLSX"), "xlsx").unwrap();
        fs::write(root.join("sub/deeper/deepest/d.doc"), "doc").unwrap();
        fs::write(root.join("sub/deeper/deepest/e.xls"), "xls").unwrap();
        fs::write(root.join("sub/deeper/deepest/script.py"), "py").unwrap();

        let documents = DocumentScanner::new().scan_directory(root).unwrap();

        let expected: HashSet<PathBuf> = [
            "a.pdf",
            "sub/b.docx",
            "sub/deeper/c.XLSX",
            "sub/deeper/deepest/d.doc",
            "sub/deeper/deepest/e.xls",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        assert_eq!(documents.len(), 5);
        assert_eq!(relative_set(&documents), expected);
        assert!(documents.iter().all(|d| d.source_path.starts_with(root)));
    }

    #[test]
    fn test_directories_named_like_documents_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("folder.pdf")).unwrap();
        fs::write(root.join("folder.pdf/inner.pdf"), "pdf").unwrap();

        let documents = DocumentScanner::new().scan_directory(root).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].relative_path, PathBuf::from("folder.pdf/inner.pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let outside = TempDir::new().unwrap();

        fs::write(outside.path().join("real.pdf"), "pdf").unwrap();
        std::os::unix::fs::symlink(outside.path().join("real.pdf"), root.join("link.pdf"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("linked_dir")).unwrap();

        let documents = DocumentScanner::new().scan_directory(root).unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let documents = DocumentScanner::new().scan_directory(temp_dir.path()).unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_missing_root_is_not_created() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = DocumentScanner::new().scan_directory(&missing);
        assert!(matches!(result, Err(Office2MdError::NotFound { .. })));
        assert!(!missing.exists());
    }

    #[test]
    fn test_scan_statistics() {
        let documents = vec![
            DiscoveredFile::new(
                PathBuf::from("a.pdf"),
                PathBuf::from("a.pdf"),
                100,
                SystemTime::UNIX_EPOCH,
            ),
            DiscoveredFile::new(
                PathBuf::from("b.pdf"),
                PathBuf::from("b.pdf"),
                200,
                SystemTime::UNIX_EPOCH,
            ),
            DiscoveredFile::new(
                PathBuf::from("c.docx"),
                PathBuf::from("c.docx"),
                300,
                SystemTime::UNIX_EPOCH,
            ),
        ];

        let stats = DocumentScanner::new().get_statistics(&documents);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 600);
        assert_eq!(stats.files_by_type.get("PDF"), Some(&2));
        assert_eq!(stats.files_by_type.get("WORD"), Some(&1));
        assert!(stats.display_summary().contains("Total files: 3"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
