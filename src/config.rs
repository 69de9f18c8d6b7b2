use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::comparison::DEFAULT_TOLERANCE;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Rest,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Rest => write!(f, "rest"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_data_path")]
    pub path: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_path: Option<String>,
    pub base_url: Option<String>,
    pub tolerance: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/survey-analytics/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// A data path selects the file source and a base URL the REST source;
    /// when both are given the later one (base URL) wins.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.data_path {
            self.source.kind = SourceKind::File;
            self.source.path = path;
        }
        if let Some(base_url) = overrides.base_url {
            self.source.kind = SourceKind::Rest;
            self.source.base_url = base_url;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.comparison.tolerance = tolerance;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_tolerance(self.comparison.tolerance)?;
        if self.source.kind == SourceKind::Rest {
            if self.source.base_url.trim().is_empty() {
                bail!("source.kind is \"rest\" but source.base_url is empty");
            }
            if self.source.timeout_secs == 0 {
                bail!("source.timeout_secs must be at least 1");
            }
        }
        Ok(())
    }

    pub fn tolerance(&self) -> f64 {
        self.comparison.tolerance
    }

    pub fn resolved_data_path(&self) -> PathBuf {
        expand_tilde(&self.source.path)
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[source]
# "file" reads a JSON export, "rest" talks to the hosted backend
kind = "file"
path = "~/.local/share/survey-analytics/surveys.json"
base_url = ""
api_key = ""
timeout_secs = 12

[comparison]
tolerance = 0.2

[server]
host = "127.0.0.1"
port = 8080
"#;
        template.to_string()
    }
}

pub fn validate_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        bail!("comparison tolerance must be a finite, non-negative number (got {tolerance})");
    }
    Ok(())
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            path: default_data_path(),
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_data_path() -> String {
    "~/.local/share/survey-analytics/surveys.json".to_string()
}

fn default_timeout_secs() -> u64 {
    12
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{Config, ConfigOverrides, SourceKind};
    use crate::comparison::DEFAULT_TOLERANCE;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config =
            toml::from_str(&Config::default_template()).expect("failed to parse template");
        assert_eq!(parsed.source.kind, SourceKind::File);
        assert_eq!(parsed.comparison.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(parsed.server.port, 8080);
        parsed.validate().expect("template should validate");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[server]\nport = 9000\n").expect("failed to parse");
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.tolerance(), DEFAULT_TOLERANCE);
        assert_eq!(parsed.source.timeout_secs, 12);
    }

    #[test]
    fn overrides_switch_source_kind() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            data_path: Some("/tmp/export.json".to_string()),
            base_url: None,
            tolerance: Some(0.5),
        });
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.path, "/tmp/export.json");
        assert_eq!(config.tolerance(), 0.5);

        config.apply_overrides(ConfigOverrides {
            base_url: Some("https://example.supabase.co".to_string()),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.source.kind, SourceKind::Rest);
        config.validate().expect("rest config should validate");
    }

    #[test]
    fn rejects_negative_or_non_finite_tolerance() {
        let mut config = Config::default();
        config.comparison.tolerance = -0.1;
        assert!(config.validate().is_err());
        config.comparison.tolerance = f64::NAN;
        assert!(config.validate().is_err());
        config.comparison.tolerance = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rest_source_requires_base_url() {
        let parsed: Config =
            toml::from_str("[source]\nkind = \"rest\"\n").expect("failed to parse");
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn rest_source_rejects_zero_timeout() {
        let parsed: Config = toml::from_str(
            "[source]\nkind = \"rest\"\nbase_url = \"http://x\"\ntimeout_secs = 0\n",
        )
        .expect("failed to parse");
        let err = parsed.validate().expect_err("zero timeout should be rejected");
        assert!(err.to_string().contains("timeout_secs"));

        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[source]\nkind = \"rest\"\nbase_url = \"http://x\"\ntimeout_secs = 0\n",
        )
        .expect("failed to write config");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn load_reads_written_template() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("nested/config.toml");
        Config::write_template(&path).expect("failed to write template");
        assert!(fs::metadata(&path).is_ok());

        let loaded = Config::load(Some(&path)).expect("failed to load config");
        assert_eq!(loaded.server.host, "127.0.0.1");

        let missing = Config::load(Some(&dir.path().join("absent.toml")))
            .expect("missing config should load defaults");
        assert_eq!(missing.tolerance(), DEFAULT_TOLERANCE);
    }
}
