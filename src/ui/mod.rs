pub mod progress;
pub mod output;
pub mod signals;

pub use progress::{ProgressLogWriter, ProgressManager};
pub use output::{OutputFormatter, OutputMode};
pub use signals::{GracefulShutdown, INTERRUPTED_EXIT_CODE};
