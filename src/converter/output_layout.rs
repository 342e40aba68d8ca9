use crate::error::{Office2MdError, Result};
use crate::scanner::DiscoveredFile;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

pub const DATA_DIR_NAME: &str = "data";
pub const RUN_DIR_PREFIX: &str = "converted_";

/// Run labels are computed in Japan Standard Time (UTC+09:00).
const RUN_UTC_OFFSET_SECS: i32 = 9 * 3600;

pub fn run_timezone() -> FixedOffset {
    FixedOffset::east_opt(RUN_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Minute-granularity label, e.g. `converted_202410171530`.
pub fn run_label(now: DateTime<Utc>) -> String {
    format!(
        "{}{}",
        RUN_DIR_PREFIX,
        now.with_timezone(&run_timezone()).format("%Y%m%d%H%M")
    )
}

/// One timestamped output root per batch invocation.
#[derive(Debug, Clone)]
pub struct OutputRun {
    root: PathBuf,
    label: String,
}

impl OutputRun {
    pub fn create<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        Self::create_at(base_dir, Utc::now())
    }

    /// Creates `base_dir/data/converted_<label>`, reusing directories that already exist.
    pub fn create_at<P: AsRef<Path>>(base_dir: P, now: DateTime<Utc>) -> Result<Self> {
        let data_dir = base_dir.as_ref().join(DATA_DIR_NAME);
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| Office2MdError::filesystem(&data_dir, e))?;
            info!("Created data directory: {}", data_dir.display());
        }

        let label = run_label(now);
        let root = data_dir.join(&label);
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| Office2MdError::filesystem(&root, e))?;
            info!("Created output directory: {}", root.display());
        }

        let root = fs::canonicalize(&root).map_err(|e| Office2MdError::filesystem(&root, e))?;

        Ok(Self { root, label })
    }

    /// Where a run started at `now` would live, without touching the filesystem.
    pub fn planned<P: AsRef<Path>>(base_dir: P, now: DateTime<Utc>) -> Self {
        let label = run_label(now);
        Self {
            root: base_dir.as_ref().join(DATA_DIR_NAME).join(&label),
            label,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Final location of one file's Markdown output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocation {
    pub directory: PathBuf,
    pub markdown_path: PathBuf,
}

/// Maps a discovered file to its output directory and Markdown path.
///
/// With `preserve_structure` the file's directory relative to the input
/// root is recreated under the run root at full depth; otherwise every
/// output lands directly in the run root.
pub fn resolve_target_path(
    file: &DiscoveredFile,
    output_run_dir: &Path,
    preserve_structure: bool,
) -> Result<TargetLocation> {
    let directory = if preserve_structure {
        let relative_dir = file.relative_dir();
        if relative_dir
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Office2MdError::Config {
                message: format!(
                    "Cannot mirror {} below the output directory",
                    file.relative_path.display()
                ),
            });
        }
        output_run_dir.join(relative_dir)
    } else {
        output_run_dir.to_path_buf()
    };

    let markdown_name = markdown_file_name(&file.source_path).ok_or_else(|| {
        Office2MdError::UnsupportedType {
            path: file.source_path.display().to_string(),
        }
    })?;

    Ok(TargetLocation {
        markdown_path: directory.join(markdown_name),
        directory,
    })
}

/// Source file name with its last extension replaced by `.md`.
pub fn markdown_file_name(source: &Path) -> Option<OsString> {
    let mut name = source.file_stem()?.to_os_string();
    name.push(".md");
    Some(name)
}
