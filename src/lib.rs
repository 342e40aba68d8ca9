pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, PathConfig, ServiceConfig};
pub use error::{Office2MdError, Result, UserFriendlyError};

// Core functionality re-exports
pub use converter::{
    BatchReport, BatchRunner, CommandService, ConversionRequest, ConversionResult,
    ConversionService, ConversionSettings, Converter, OutputRun, PlannedConversion,
};
pub use scanner::{is_convertible, DiscoveredFile, DocumentScanner, FileType};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface: one configured batch converter.
pub struct Office2Md {
    config: Config,
    credential: String,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Office2Md {
    /// Create a new instance and install the Ctrl+C handler.
    pub fn new(
        config: Config,
        credential: String,
        output_mode: OutputMode,
        quiet: bool,
    ) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, credential, output_mode, quiet, shutdown))
    }

    /// Create an instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, credential: &str) -> Self {
        Self::with_shutdown(
            config,
            credential.to_string(),
            OutputMode::Plain,
            true,
            GracefulShutdown::new_for_test(),
        )
    }

    fn with_shutdown(
        config: Config,
        credential: String,
        output_mode: OutputMode,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            credential,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Loads configuration and the credential. Both failures are fatal and
    /// happen before any directory is touched.
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let credential = config.load_credential()?;

        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, credential, output_mode, cli_args.quiet)
    }

    pub fn build_runner(&self) -> BatchRunner<CommandService> {
        let service = CommandService::from_config(&self.config.service, self.credential.clone());
        let converter = Converter::new(service, ConversionSettings::from_config(&self.config));

        BatchRunner::new(converter, self.config.paths.base_directory.clone())
            .with_shutdown(self.shutdown.clone())
    }

    /// Converts the configured input directory and prints the summary.
    pub async fn run(&self) -> Result<BatchReport> {
        let input_dir = &self.config.paths.input_directory;
        self.output_formatter
            .start_operation(&format!("Converting documents in {}", input_dir.display()));

        let report = self
            .build_runner()
            .run_with_progress(input_dir, Some(&self.progress_manager))
            .await?;

        self.progress_manager.clear();
        self.output_formatter.print_batch_summary(&report);

        Ok(report)
    }

    /// Prints what [`Office2Md::run`] would do without writing anything.
    pub fn dry_run(&self) -> Result<Vec<PlannedConversion>> {
        let input_dir = &self.config.paths.input_directory;
        if !input_dir.exists() {
            self.output_formatter.warning(&format!(
                "Input directory {} does not exist yet; a real run creates it",
                input_dir.display()
            ));
        }

        let spinner = self
            .progress_manager
            .create_spinner(&format!("Scanning {}", input_dir.display()));
        let planned = self.build_runner().plan(input_dir);
        spinner.finish_and_clear();

        let (run, planned) = planned?;
        self.output_formatter.print_dry_run(&run, &planned);
        Ok(planned)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::sample().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &Office2MdError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
