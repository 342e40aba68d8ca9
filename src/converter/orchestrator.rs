use crate::config::Config;
use crate::converter::output_layout::{resolve_target_path, TargetLocation};
use crate::converter::service::{ConversionRequest, ConversionService};
use crate::error::{Office2MdError, Result};
use crate::scanner::DiscoveredFile;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// Prefix of the private directory a conversion writes into before publishing.
pub const STAGING_PREFIX: &str = ".office2md-staging-";

/// Suffix of the directory holding additional Markdown files from one conversion.
pub const EXTRA_MARKDOWN_SUFFIX: &str = "_parts";

#[derive(Debug, Clone)]
pub struct ConversionSettings {
    pub model: String,
    pub system_prompt: Option<String>,
    pub select_pages: Option<Vec<u32>>,
    pub preserve_structure: bool,
}

impl ConversionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.service.model.clone(),
            system_prompt: config.service.system_prompt.clone(),
            select_pages: config.service.select_pages.clone(),
            preserve_structure: config.output.preserve_structure,
        }
    }
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of one file.
#[derive(Debug)]
pub enum ConversionResult {
    Converted { markdown_path: PathBuf },
    SkippedAlreadyExists { markdown_path: PathBuf },
    Failed(Office2MdError),
}

impl ConversionResult {
    /// Skips count as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, ConversionResult::Failed(_))
    }

    pub fn markdown_path(&self) -> Option<&Path> {
        match self {
            ConversionResult::Converted { markdown_path }
            | ConversionResult::SkippedAlreadyExists { markdown_path } => Some(markdown_path),
            ConversionResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Office2MdError> {
        match self {
            ConversionResult::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Converts single documents through a [`ConversionService`].
pub struct Converter<S> {
    service: S,
    settings: ConversionSettings,
}

impl<S: ConversionService> Converter<S> {
    pub fn new(service: S, settings: ConversionSettings) -> Self {
        Self { service, settings }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Converts `file` into the run directory. Never overwrites an existing Markdown file.
    pub async fn convert(&self, file: &DiscoveredFile, output_run_dir: &Path) -> ConversionResult {
        match self.try_convert(file, output_run_dir).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "Error converting file to Markdown: {}, Error: {}",
                    file.source_path.display(),
                    e
                );
                ConversionResult::Failed(e)
            }
        }
    }

    /// Converts an arbitrary path, mirroring it relative to `input_root` when it lives there.
    pub async fn convert_path<P: AsRef<Path>, R: AsRef<Path>>(
        &self,
        path: P,
        input_root: R,
        output_run_dir: &Path,
    ) -> ConversionResult {
        let file = DiscoveredFile::from_path(path, input_root);
        self.convert(&file, output_run_dir).await
    }

    async fn try_convert(
        &self,
        file: &DiscoveredFile,
        output_run_dir: &Path,
    ) -> Result<ConversionResult> {
        let source = &file.source_path;

        if !source.exists() {
            return Err(Office2MdError::NotFound {
                path: source.display().to_string(),
            });
        }

        let file_type = file
            .file_type()
            .ok_or_else(|| Office2MdError::UnsupportedType {
                path: source.display().to_string(),
            })?;

        let target = resolve_target_path(file, output_run_dir, self.settings.preserve_structure)?;

        if !target.directory.exists() {
            fs::create_dir_all(&target.directory)
                .map_err(|e| Office2MdError::filesystem(&target.directory, e))?;
        }

        if target.markdown_path.exists() {
            info!(
                "Markdown file already exists, skipping: {}",
                target.markdown_path.display()
            );
            return Ok(ConversionResult::SkippedAlreadyExists {
                markdown_path: target.markdown_path,
            });
        }

        info!("Converting {} to Markdown: {}", file_type, source.display());

        // Removed on drop whether or not the conversion succeeds
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&target.directory)
            .map_err(|e| Office2MdError::filesystem(&target.directory, e))?;

        let request = ConversionRequest {
            source_path: source.clone(),
            model: self.settings.model.clone(),
            output_dir: staging.path().to_path_buf(),
            system_prompt: self.settings.system_prompt.clone(),
            select_pages: self.settings.select_pages.clone(),
        };

        self.service.convert(&request).await?;
        publish_outputs(staging.path(), source, &target)?;

        info!(
            "Conversion completed: {} -> {}",
            source.display(),
            target.markdown_path.display()
        );

        Ok(ConversionResult::Converted {
            markdown_path: target.markdown_path,
        })
    }
}

/// Moves the converter's output from the staging directory into place.
///
/// The Markdown file is renamed into place last, so its presence at the
/// final path always means the assets next to it were delivered too.
fn publish_outputs(staging_dir: &Path, source: &Path, target: &TargetLocation) -> Result<()> {
    let produced = select_markdown(staging_dir, source)?.ok_or_else(|| Office2MdError::Service {
        message: format!("converter produced no Markdown for {}", source.display()),
    })?;

    let extra_markdown_dir = target.directory.join(extra_markdown_dir_name(source));
    move_assets(staging_dir, &target.directory, &produced, &extra_markdown_dir)?;

    fs::rename(&produced, &target.markdown_path)
        .map_err(|e| Office2MdError::filesystem(&target.markdown_path, e))
}

/// Directory receiving any additional Markdown files, e.g. `report_parts`.
fn extra_markdown_dir_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}{}", stem, EXTRA_MARKDOWN_SUFFIX)
}

fn is_markdown_file(entry: &fs::DirEntry) -> bool {
    let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
    is_file
        && entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Prefers the Markdown file named after the source, else the newest one.
fn select_markdown(staging_dir: &Path, source: &Path) -> Result<Option<PathBuf>> {
    let source_stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase());

    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();

    let entries = fs::read_dir(staging_dir).map_err(|e| Office2MdError::filesystem(staging_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Office2MdError::filesystem(staging_dir, e))?;
        if !is_markdown_file(&entry) {
            continue;
        }

        let path = entry.path();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase());
        if stem.is_some() && stem == source_stem {
            return Ok(Some(path));
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((modified, path));
    }

    Ok(candidates
        .into_iter()
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path))
}

/// Moves every staged entry except `produced` into `target_dir`.
///
/// Other top-level Markdown files go to `extra_markdown_dir` so they can
/// never occupy the path a sibling document's conversion checks.
fn move_assets(
    staging_dir: &Path,
    target_dir: &Path,
    produced: &Path,
    extra_markdown_dir: &Path,
) -> Result<()> {
    let entries = fs::read_dir(staging_dir).map_err(|e| Office2MdError::filesystem(staging_dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Office2MdError::filesystem(staging_dir, e))?;
        let path = entry.path();
        if path == produced {
            continue;
        }

        if is_markdown_file(&entry) {
            fs::create_dir_all(extra_markdown_dir)
                .map_err(|e| Office2MdError::filesystem(extra_markdown_dir, e))?;
            move_entry(&path, &extra_markdown_dir.join(entry.file_name()))?;
        } else {
            move_entry(&path, &target_dir.join(entry.file_name()))?;
        }
    }

    Ok(())
}

/// Merges directories into existing ones and leaves existing files untouched.
fn move_entry(from: &Path, to: &Path) -> Result<()> {
    if from.is_dir() && to.is_dir() {
        let entries = fs::read_dir(from).map_err(|e| Office2MdError::filesystem(from, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Office2MdError::filesystem(from, e))?;
            move_entry(&entry.path(), &to.join(entry.file_name()))?;
        }
        return Ok(());
    }

    if to.exists() {
        warn!("Keeping existing output, not replacing: {}", to.display());
        return Ok(());
    }

    fs::rename(from, to).map_err(|e| Office2MdError::filesystem(to, e))?;
    debug!("Moved asset to {}", to.display());

    Ok(())
}
