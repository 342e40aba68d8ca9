use std::fmt;
use std::path::Path;

/// Document categories the converter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Pdf,
    Spreadsheet,
    Document,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Pdf, FileType::Spreadsheet, FileType::Document];

    /// Lower-case extensions without the leading dot. No extension appears twice across types.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileType::Pdf => &["pdf"],
            FileType::Spreadsheet => &["xlsx", "xls"],
            FileType::Document => &["docx", "doc"],
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext_lower = extension.trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|file_type| file_type.extensions().contains(&ext_lower.as_str()))
    }

    /// Classifies by extension only. Unsupported paths yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }

    pub fn all_extensions() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .flat_map(|file_type| file_type.extensions().iter().copied())
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Spreadsheet => "EXCEL",
            FileType::Document => "WORD",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn is_convertible(path: &Path) -> bool {
    FileType::from_path(path).is_some()
}
