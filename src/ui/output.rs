use crate::converter::{BatchReport, OutputRun, PlannedConversion};
use crate::error::{Office2MdError, UserFriendlyError};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            OutputMode::Plain => false,
        };

        Self {
            mode,
            use_colors,
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show() {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Prints the error and, when there is one, a hint on how to fix it.
    pub fn print_user_friendly_error(&self, error: &Office2MdError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
            }
        }
    }

    pub fn print_batch_summary(&self, report: &BatchReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_dry_run(&self, run: &OutputRun, planned: &[PlannedConversion]) {
        self.print_header("Dry run");

        if planned.is_empty() {
            println!("No convertible files found.");
            return;
        }

        for item in planned {
            let action = if item.already_exists { "skip" } else { "convert" };
            match self.mode {
                OutputMode::Human if self.use_colors => println!(
                    "  {} {} -> {}",
                    style(format!("{:<7}", action)).cyan(),
                    item.source.display_path(),
                    item.markdown_path.display()
                ),
                _ => println!(
                    "  {:<7} {} -> {}",
                    action,
                    item.source.display_path(),
                    item.markdown_path.display()
                ),
            }
        }

        println!();
        println!("{} files, output run {}", planned.len(), run.root().display());
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Plain => println!("=== {} ===", title),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn should_show(&self) -> bool {
        !self.quiet
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Error => "✗",
                MessageType::Warning => "!",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn highlight<T: std::fmt::Display>(&self, value: T) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }

    fn print_human_summary(&self, report: &BatchReport) {
        println!();
        self.print_separator();

        let headline = if report.cancelled {
            "Conversion interrupted"
        } else if report.failures.is_empty() {
            "Conversion completed!"
        } else {
            "Conversion completed with failures"
        };

        if self.use_colors {
            let styled = if report.failures.is_empty() && !report.cancelled {
                style(headline).green().bold()
            } else {
                style(headline).yellow().bold()
            };
            println!("{}{}", if report.cancelled { &WARNING } else { &CHECKMARK }, styled);
        } else {
            println!("{}", headline);
        }

        println!();
        println!(
            "  Succeeded:  {}/{}",
            self.highlight(report.success_count()),
            report.total_files
        );
        println!("  Converted:  {}", self.highlight(report.converted));
        println!("  Skipped:    {}", self.highlight(report.skipped));
        println!("  Failed:     {}", self.highlight(report.failure_count()));
        if report.cancelled {
            println!(
                "  Not tried:  {}",
                self.highlight(report.total_files - report.attempted())
            );
        }
        println!("  Output:     {}", report.output_dir.display());
        println!("  Time taken: {}", self.highlight(format_duration(report.duration)));

        if !report.failures.is_empty() {
            println!();
            println!("Failed files:");
            for failure in &report.failures {
                println!("  - {}: {}", failure.path.display(), failure.reason);
            }
        }

        self.print_separator();
    }

    fn print_plain_summary(&self, report: &BatchReport) {
        println!(
            "{}: {}",
            if report.cancelled { "INTERRUPTED" } else { "COMPLETED" },
            report.summary_line()
        );
        println!("Converted: {}", report.converted);
        println!("Skipped: {}", report.skipped);
        println!("Failed: {}", report.failure_count());
        println!("Output: {}", report.output_dir.display());
        println!("Duration: {:?}", report.duration);
        for failure in &report.failures {
            println!("FAILED: {}: {}", failure.path.display(), failure.reason);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Error,
    Warning,
}
