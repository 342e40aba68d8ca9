use crate::error::{Office2MdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub paths: PathConfig,
    pub output: OutputConfig,
}

/// Settings for the external document-AI converter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub model: String,
    pub api_key_env: String,
    pub command: String,
    pub args: Vec<String>,
    pub system_prompt: Option<String>,
    pub select_pages: Option<Vec<u32>>,
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathConfig {
    pub input_directory: PathBuf,
    pub base_directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub preserve_structure: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            command: "zerox".to_string(),
            args: Vec::new(),
            system_prompt: None, // Converter's built-in prompt
            select_pages: None,  // All pages
            timeout: None,       // Left to the converter
        }
    }
}

impl ServiceConfig {
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let root = program_root();
        Self {
            input_directory: root.join("target"),
            base_directory: root,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            preserve_structure: true,
        }
    }
}

/// Directory holding the running executable.
pub fn program_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Office2MdError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Office2MdError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Office2MdError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["office2md.toml", ".office2md.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_dir) = cli_args.input_dir {
            self.paths.input_directory = input_dir.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.paths.base_directory = output_dir.clone();
        }

        if let Some(ref model) = cli_args.model {
            self.service.model = model.clone();
        }

        if let Some(preserve_structure) = cli_args.preserve_structure {
            self.output.preserve_structure = preserve_structure;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Office2MdError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| Office2MdError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.model.trim().is_empty() {
            return Err(Office2MdError::Config {
                message: "A model name must be specified".to_string(),
            });
        }

        if self.service.command.trim().is_empty() {
            return Err(Office2MdError::Config {
                message: "A converter command must be specified".to_string(),
            });
        }

        if self.service.api_key_env.trim().is_empty() {
            return Err(Office2MdError::Config {
                message: "The credential variable name must not be empty".to_string(),
            });
        }

        // Pages are 1-based
        if let Some(ref pages) = self.service.select_pages {
            if pages.iter().any(|&page| page == 0) {
                return Err(Office2MdError::Config {
                    message: "Page numbers in select_pages start at 1".to_string(),
                });
            }
        }

        if self.service.timeout == Some(0) {
            return Err(Office2MdError::Config {
                message: "Converter timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Reads the converter credential from the environment.
    pub fn load_credential(&self) -> Result<String> {
        let variable = &self.service.api_key_env;
        match std::env::var(variable) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(Office2MdError::MissingCredential {
                variable: variable.clone(),
            }),
        }
    }

    /// Defaults with paths relative to the working directory, for `--generate-config`.
    pub fn sample() -> Self {
        Self {
            paths: PathConfig {
                input_directory: PathBuf::from("./target"),
                base_directory: PathBuf::from("."),
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub preserve_structure: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, input_dir: Option<PathBuf>) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_preserve_structure(mut self, preserve: Option<bool>) -> Self {
        self.preserve_structure = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.model, "gpt-4o-mini");
        assert_eq!(config.service.api_key_env, "OPENAI_API_KEY");
        assert!(config.service.system_prompt.is_none());
        assert!(config.service.select_pages.is_none());
        assert!(config.output.preserve_structure);
        assert!(config.paths.input_directory.ends_with("target"));
        assert_eq!(
            config.paths.input_directory.parent(),
            Some(config.paths.base_directory.as_path())
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.service.model.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.select_pages = Some(vec![1, 0, 3]);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.timeout = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.service.select_pages = Some(vec![1, 2]);
        config.service.timeout = Some(120);
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.service.select_pages, Some(vec![1, 2]));
        assert_eq!(loaded_config.service.timeout_duration(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[service]\nmodel = \"gpt-4o\"\n").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.service.model, "gpt-4o");
        assert_eq!(config.service.command, "zerox");
        assert!(config.output.preserve_structure);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here/office2md.toml");
        assert!(matches!(result, Err(Office2MdError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_input_dir(Some(PathBuf::from("/docs/in")))
            .with_output_dir(Some(PathBuf::from("/docs")))
            .with_model(Some("gpt-4o".to_string()))
            .with_preserve_structure(Some(false));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.paths.input_directory, PathBuf::from("/docs/in"));
        assert_eq!(config.paths.base_directory, PathBuf::from("/docs"));
        assert_eq!(config.service.model, "gpt-4o");
        assert!(!config.output.preserve_structure);
    }

    #[test]
    fn test_missing_credential() {
        let mut config = Config::default();
        config.service.api_key_env = "OFFICE2MD_TEST_UNSET_CREDENTIAL".to_string();

        let result = config.load_credential();
        assert!(matches!(
            result,
            Err(Office2MdError::MissingCredential { ref variable })
                if variable == "OFFICE2MD_TEST_UNSET_CREDENTIAL"
        ));
    }

    #[test]
    fn test_present_credential() {
        std::env::set_var("OFFICE2MD_TEST_SET_CREDENTIAL", "sk-test");
        let mut config = Config::default();
        config.service.api_key_env = "OFFICE2MD_TEST_SET_CREDENTIAL".to_string();

        assert_eq!(config.load_credential().unwrap(), "sk-test");
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_file = NamedTempFile::new().unwrap();
        Config::sample().save_to_file(temp_file.path()).unwrap();

        let sample = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(sample.contains("[service]"));
        assert!(sample.contains("[paths]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("gpt-4o-mini"));
        assert!(sample.contains("./target"));

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert!(loaded.validate().is_ok());
    }
}
