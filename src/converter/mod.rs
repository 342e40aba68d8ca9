pub mod batch;
pub mod orchestrator;
pub mod output_layout;
pub mod service;

pub use batch::{BatchReport, BatchRunner, FailedFile, PlannedConversion};
pub use orchestrator::{ConversionResult, ConversionSettings, Converter};
pub use output_layout::{resolve_target_path, OutputRun, TargetLocation};
pub use service::{CommandService, ConversionRequest, ConversionService};
