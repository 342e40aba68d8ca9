use crate::config::ServiceConfig;
use crate::error::{Office2MdError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Everything the external converter needs for one document.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source_path: PathBuf,
    pub model: String,
    pub output_dir: PathBuf,
    pub system_prompt: Option<String>,
    pub select_pages: Option<Vec<u32>>,
}

/// Boundary to the document-AI converter.
///
/// Implementations write one or more Markdown files (plus any assets)
/// into `request.output_dir` and report failure through the error value.
#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn convert(&self, request: &ConversionRequest) -> Result<()>;
}

#[async_trait]
impl<T: ConversionService + ?Sized> ConversionService for Arc<T> {
    async fn convert(&self, request: &ConversionRequest) -> Result<()> {
        (**self).convert(request).await
    }
}

/// Runs an external converter executable once per document.
///
/// Invocation: `<program> [args..] --file <src> --model <model> --output-dir <dir>
/// [--system-prompt <text>] [--select-pages 1,2,..]`.
pub struct CommandService {
    program: String,
    leading_args: Vec<String>,
    credential: Option<(String, String)>,
    timeout: Option<Duration>,
}

impl CommandService {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            credential: None,
            timeout: None,
        }
    }

    pub fn from_config(config: &ServiceConfig, credential: String) -> Self {
        let service = Self::new(config.command.clone())
            .with_args(config.args.iter().cloned())
            .with_credential(config.api_key_env.clone(), credential);

        match config.timeout_duration() {
            Some(limit) => service.with_timeout(limit),
            None => service,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_credential<K: Into<String>, V: Into<String>>(mut self, variable: K, value: V) -> Self {
        self.credential = Some((variable.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn build_args(&self, request: &ConversionRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();

        args.push("--file".into());
        args.push(request.source_path.clone().into_os_string());
        args.push("--model".into());
        args.push(request.model.clone().into());
        args.push("--output-dir".into());
        args.push(request.output_dir.clone().into_os_string());

        if let Some(ref prompt) = request.system_prompt {
            args.push("--system-prompt".into());
            args.push(prompt.into());
        }

        if let Some(ref pages) = request.select_pages {
            let pages = pages
                .iter()
                .map(|page| page.to_string())
                .collect::<Vec<_>>()
                .join(",");
            args.push("--select-pages".into());
            args.push(pages.into());
        }

        args
    }
}

#[async_trait]
impl ConversionService for CommandService {
    async fn convert(&self, request: &ConversionRequest) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a terminal Ctrl+C reaches only office2md and
        // the file in flight can finish.
        #[cfg(unix)]
        command.process_group(0);

        if let Some((ref variable, ref value)) = self.credential {
            command.env(variable, value);
        }

        debug!(
            "Running {} for {}",
            self.program,
            request.source_path.display()
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| Office2MdError::Timeout { limit })?,
            None => command.output().await,
        }
        .map_err(|e| Office2MdError::Service {
            message: format!("Failed to start {}: {}", self.program, e),
        })?;

        if !output.status.success() {
            return Err(Office2MdError::Service {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr_tail(&output.stderr)
                ),
            });
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let mut lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .rev()
        .take(5)
        .collect();

    if lines.is_empty() {
        return "no error output".to_string();
    }

    lines.reverse();
    lines.join(" | ")
}
