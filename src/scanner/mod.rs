pub mod document_scanner;
pub mod file_type;

pub use document_scanner::{DiscoveredFile, DocumentScanner, ScanStatistics};
pub use file_type::{is_convertible, FileType};
