use crate::converter::orchestrator::{ConversionResult, Converter};
use crate::converter::output_layout::{resolve_target_path, OutputRun};
use crate::converter::service::ConversionService;
use crate::error::{Office2MdError, Result};
use crate::scanner::{DiscoveredFile, DocumentScanner};
use crate::ui::progress::{finish_progress_with_summary, update_file_progress};
use crate::ui::{GracefulShutdown, ProgressManager};
use chrono::Utc;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Tally of one batch invocation.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub total_files: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failures: Vec<FailedFile>,
    pub cancelled: bool,
    pub duration: Duration,
}

impl BatchReport {
    fn new(input_dir: &Path, output_dir: &Path) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            total_files: 0,
            converted: 0,
            skipped: 0,
            failures: Vec::new(),
            cancelled: false,
            duration: Duration::ZERO,
        }
    }

    fn record(&mut self, file: &DiscoveredFile, result: ConversionResult) {
        match result {
            ConversionResult::Converted { .. } => self.converted += 1,
            ConversionResult::SkippedAlreadyExists { .. } => self.skipped += 1,
            ConversionResult::Failed(error) => self.failures.push(FailedFile {
                path: file.source_path.clone(),
                reason: error.to_string(),
            }),
        }
    }

    /// Converted plus skipped.
    pub fn success_count(&self) -> usize {
        self.converted + self.skipped
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn attempted(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Successfully converted {}/{} files.",
            self.success_count(),
            self.total_files
        )
    }
}

/// What a dry run reports for one discovered file.
#[derive(Debug, Clone)]
pub struct PlannedConversion {
    pub source: DiscoveredFile,
    pub markdown_path: PathBuf,
    pub already_exists: bool,
}

/// Drives one sequential pass over an input tree.
pub struct BatchRunner<S> {
    converter: Converter<S>,
    base_dir: PathBuf,
    scanner: DocumentScanner,
    shutdown: Option<GracefulShutdown>,
}

impl<S: ConversionService> BatchRunner<S> {
    pub fn new<P: Into<PathBuf>>(converter: Converter<S>, base_dir: P) -> Self {
        Self {
            converter,
            base_dir: base_dir.into(),
            scanner: DocumentScanner::new(),
            shutdown: None,
        }
    }

    /// Stop between files once `shutdown` is triggered.
    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn converter(&self) -> &Converter<S> {
        &self.converter
    }

    pub async fn run<P: AsRef<Path>>(&self, input_dir: P) -> Result<BatchReport> {
        self.run_with_progress(input_dir, None).await
    }

    /// Converts every supported file under `input_dir` into a fresh output run.
    ///
    /// Individual failures are recorded in the report and never stop the batch.
    /// Only creating the input or output directories, or scanning, can fail.
    pub async fn run_with_progress<P: AsRef<Path>>(
        &self,
        input_dir: P,
        progress: Option<&ProgressManager>,
    ) -> Result<BatchReport> {
        let input_dir = input_dir.as_ref();

        if !input_dir.exists() {
            fs::create_dir_all(input_dir)
                .map_err(|e| Office2MdError::filesystem(input_dir, e))?;
            info!("Created input directory: {}", input_dir.display());
        }

        let run = OutputRun::create(&self.base_dir)?;
        self.run_in(input_dir, &run, progress).await
    }

    /// Converts every supported file under an existing `input_dir` into `run`.
    ///
    /// Markdown already present in `run` is skipped and counted as a success.
    pub async fn run_in(
        &self,
        input_dir: &Path,
        run: &OutputRun,
        progress: Option<&ProgressManager>,
    ) -> Result<BatchReport> {
        let start_time = Instant::now();
        let documents = self.scanner.scan_directory(input_dir)?;
        let mut report = BatchReport::new(input_dir, run.root());

        if documents.is_empty() {
            info!("No convertible files found in {}", input_dir.display());
            report.duration = start_time.elapsed();
            return Ok(report);
        }

        let total = documents.len();
        report.total_files = total;
        info!("Found {} files to process", total);
        debug!("{}", self.scanner.get_statistics(&documents).display_summary());

        let pb = progress
            .map(|manager| manager.create_file_progress(total as u64))
            .unwrap_or_else(ProgressBar::hidden);

        for (index, document) in documents.iter().enumerate() {
            if let Err(reason) = self.check_shutdown() {
                warn!(
                    "{}, {} of {} files were not attempted",
                    reason,
                    total - index,
                    total
                );
                report.cancelled = true;
                break;
            }

            info!(
                "Processing file {}/{}: {}",
                index + 1,
                total,
                document.source_path.display()
            );
            update_file_progress(&pb, &document.display_path());

            let result = self.converter.convert(document, run.root()).await;
            report.record(document, result);
            pb.inc(1);
        }

        report.duration = start_time.elapsed();

        if report.cancelled {
            pb.abandon_with_message("Interrupted");
        } else {
            finish_progress_with_summary(
                &pb,
                &format!("Processed {} files", report.attempted()),
                report.duration,
            );
        }

        info!("Conversion completed. {}", report.summary_line());

        Ok(report)
    }

    /// Lists what a run would do without creating directories or calling the service.
    pub fn plan<P: AsRef<Path>>(&self, input_dir: P) -> Result<(OutputRun, Vec<PlannedConversion>)> {
        let input_dir = input_dir.as_ref();
        let run = OutputRun::planned(&self.base_dir, Utc::now());

        if !input_dir.exists() {
            info!("Input directory does not exist yet: {}", input_dir.display());
            return Ok((run, Vec::new()));
        }

        let preserve_structure = self.converter.settings().preserve_structure;
        let mut planned = Vec::new();

        for document in self.scanner.scan_directory(input_dir)? {
            let target = resolve_target_path(&document, run.root(), preserve_structure)?;
            planned.push(PlannedConversion {
                already_exists: target.markdown_path.exists(),
                markdown_path: target.markdown_path,
                source: document,
            });
        }

        Ok((run, planned))
    }

    fn check_shutdown(&self) -> Result<()> {
        match self.shutdown {
            Some(ref shutdown) => shutdown.check_shutdown(),
            None => Ok(()),
        }
    }
}
