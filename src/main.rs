use clap::Parser;
use office2md::ui::INTERRUPTED_EXIT_CODE;
use office2md::{
    logging, BatchReport, Cli, Office2Md, Office2MdError, OutputFormat, OutputFormatter,
    OutputMode, UserFriendlyError,
};
use std::process;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    // Needs no credential
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let office2md = match Office2Md::from_cli(&cli) {
        Ok(office2md) => office2md,
        Err(e) => {
            print_startup_error(&cli, &e);
            return 1;
        }
    };

    let use_ansi = matches!(cli.output_format, OutputFormat::Human)
        && console::Term::stderr().features().colors_supported();
    logging::init(
        cli.verbosity_level(),
        cli.quiet,
        use_ansi,
        office2md.progress_manager().log_writer(),
    );

    if cli.dry_run {
        return match office2md.dry_run() {
            Ok(_) => 0,
            Err(e) => {
                office2md.handle_error(&e);
                1
            }
        };
    }

    match office2md.run().await {
        Ok(report) => exit_code_for(&report),
        Err(e) => {
            office2md.handle_error(&e);
            1
        }
    }
}

/// Per-file failures do not change the exit status.
fn exit_code_for(report: &BatchReport) -> i32 {
    if report.cancelled {
        INTERRUPTED_EXIT_CODE
    } else {
        0
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "office2md.toml".to_string());

    match Office2Md::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  office2md --config {}", config_path);
            println!("\nEdit the file to point at your converter and document folders.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(cli: &Cli, error: &Office2MdError) {
    let mode = match cli.output_format {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Plain => OutputMode::Plain,
    };
    let formatter = OutputFormatter::new(mode, false);
    formatter.print_user_friendly_error(error);
}
