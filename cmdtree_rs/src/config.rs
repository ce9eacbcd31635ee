//! Configuration file support for cmdtree.
//!
//! Loads optional `.cmdtree/config.toml` from the working directory.

use serde::Deserialize;
use std::path::Path;

use crate::cli::colors::ColorMode;

/// Root configuration structure
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CmdtreeConfig {
    /// Color mode used when `--color` is not given
    pub color: Option<ColorMode>,
    /// Show the full cause chain of execution failures
    pub debug: bool,
    /// Emit outcomes as JSON
    pub json: bool,
    /// `tracing` filter directive, e.g. `debug` or `cmdtree=trace`
    pub log_level: Option<String>,
    /// Greeting used by the demo `greet` module
    pub greeting: Option<String>,
}

impl CmdtreeConfig {
    /// Load config from `.cmdtree/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".cmdtree").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("[cmdtree][warn] Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[cmdtree][warn] Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Greeting for the demo module, falling back to "Hello".
    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or("Hello")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, body: &str) {
        let dir = temp.path().join(".cmdtree");
        std::fs::create_dir_all(&dir).expect("create .cmdtree");
        let mut file = std::fs::File::create(dir.join("config.toml")).expect("create config");
        writeln!(file, "{body}").expect("write config");
    }

    #[test]
    fn test_default_config() {
        let config = CmdtreeConfig::default();
        assert!(config.color.is_none());
        assert!(!config.debug);
        assert!(!config.json);
        assert_eq!(config.greeting(), "Hello");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        assert_eq!(CmdtreeConfig::load(temp.path()), CmdtreeConfig::default());
    }

    #[test]
    fn test_load_valid_config() {
        let temp = TempDir::new().expect("temp dir");
        write_config(
            &temp,
            r#"
color = "never"
debug = true
json = true
log_level = "debug"
greeting = "Ahoy"
"#,
        );

        let config = CmdtreeConfig::load(temp.path());
        assert_eq!(config.color, Some(ColorMode::Never));
        assert!(config.debug);
        assert!(config.json);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.greeting(), "Ahoy");
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().expect("temp dir");
        write_config(&temp, "json = true");

        let config = CmdtreeConfig::load(temp.path());
        assert!(config.json);
        assert!(!config.debug);
        assert!(config.color.is_none());
    }

    #[test]
    fn test_load_invalid_config_falls_back() {
        let temp = TempDir::new().expect("temp dir");
        write_config(&temp, "color = [not valid");

        assert_eq!(CmdtreeConfig::load(temp.path()), CmdtreeConfig::default());
    }

    #[test]
    fn test_unknown_color_mode_falls_back() {
        let temp = TempDir::new().expect("temp dir");
        write_config(&temp, "color = \"sometimes\"");

        assert!(CmdtreeConfig::load(temp.path()).color.is_none());
    }
}
