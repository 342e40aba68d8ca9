use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "office2md")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert PDF, Excel and Word documents to Markdown")]
#[command(
    long_about = "Office2Md walks an input directory, hands every PDF, Excel and Word document \
                  to a document-AI converter and writes the resulting Markdown into a fresh \
                  timestamped directory, mirroring the input layout."
)]
#[command(after_help = "EXAMPLES:\n  \
    office2md\n  \
    office2md --input-dir ./documents\n  \
    office2md --input-dir ./documents --output-dir ./out --model gpt-4o\n  \
    office2md --generate-config --config office2md.toml")]
pub struct Cli {
    /// Directory containing the documents to convert
    #[arg(long, help = "Directory containing the documents to convert (default: ./target next to the executable)")]
    pub input_dir: Option<PathBuf>,

    /// Base directory receiving data/converted_<timestamp>
    #[arg(short, long, help = "Base directory for converted output (default: the executable's directory)")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Model passed to the converter
    #[arg(short, long, help = "Model identifier passed to the converter")]
    pub model: Option<String>,

    /// Mirror the input directory layout in the output
    #[arg(long, help = "Mirror the input directory layout in the output")]
    pub preserve_structure: Option<bool>,

    /// Output format for terminal messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (list planned conversions without calling the converter)
    #[arg(long, help = "Show what would be converted without doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input_dir.clone())
            .with_output_dir(self.output_dir.clone())
            .with_model(self.model.clone())
            .with_preserve_structure(self.preserve_structure)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_dir_flag() {
        let cli = Cli::try_parse_from(["office2md", "--input-dir", "/tmp/docs"]).unwrap();
        assert_eq!(cli.input_dir, Some(PathBuf::from("/tmp/docs")));
        assert!(!cli.dry_run);
        assert!(matches!(cli.output_format, OutputFormat::Human));
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["office2md"]).unwrap();
        assert!(cli.input_dir.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["office2md", "-q", "-v"]).is_err());

        let cli = Cli::try_parse_from(["office2md", "-q"]).unwrap();
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::try_parse_from(["office2md", "-vv"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
    }

    #[test]
    fn test_overrides_reach_config() {
        let cli = Cli::try_parse_from([
            "office2md",
            "--input-dir",
            "/in",
            "--output-dir",
            "/out",
            "--model",
            "gpt-4o",
            "--preserve-structure",
            "false",
        ])
        .unwrap();

        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());

        assert_eq!(config.paths.input_directory, PathBuf::from("/in"));
        assert_eq!(config.paths.base_directory, PathBuf::from("/out"));
        assert_eq!(config.service.model, "gpt-4o");
        assert!(!config.output.preserve_structure);
    }
}
