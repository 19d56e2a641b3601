//! Application configuration for gatecalc.
//!
//! User config lives at `~/.gatecalc/gatecalc.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GateCalcError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "gatecalc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".gatecalc";

// ---------------------------------------------------------------------------
// Config structs (matching gatecalc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Mark-scheme fallback policy.
    #[serde(default)]
    pub mark_scheme: MarkSchemeConfig,

    /// Response-sheet retrieval settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Output format: "text" or "json".
    #[serde(default = "default_format")]
    pub format: String,

    /// Print the per-question breakdown in text output.
    #[serde(default)]
    pub detailed: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            detailed: false,
        }
    }
}

fn default_format() -> String {
    "text".into()
}

/// An inclusive range of question numbers sharing one mark value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkBand {
    pub start: u32,
    pub end: u32,
    pub marks: f64,
}

impl MarkBand {
    pub fn contains(&self, q_no: u32) -> bool {
        (self.start..=self.end).contains(&q_no)
    }
}

/// `[mark_scheme]` section.
///
/// Used only for question numbers the question paper never declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkSchemeConfig {
    /// Bands tried in order; the first containing the question number wins.
    #[serde(default = "default_fallback_bands")]
    pub fallback_bands: Vec<MarkBand>,

    /// Mark for numbers outside every band.
    #[serde(default = "default_fallback_marks")]
    pub fallback_marks: f64,
}

impl Default for MarkSchemeConfig {
    fn default() -> Self {
        Self {
            fallback_bands: default_fallback_bands(),
            fallback_marks: default_fallback_marks(),
        }
    }
}

// General Aptitude 1-5 and the first core block 11-35 are one-mark questions.
fn default_fallback_bands() -> Vec<MarkBand> {
    vec![
        MarkBand {
            start: 1,
            end: 5,
            marks: 1.0,
        },
        MarkBand {
            start: 11,
            end: 35,
            marks: 1.0,
        },
    ]
}
fn default_fallback_marks() -> f64 {
    2.0
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent sent when downloading a response sheet.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

// Response-sheet hosts reject requests without a browser-like agent.
fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Runtime configs (derived from AppConfig + CLI flags)
// ---------------------------------------------------------------------------

/// Mark values for question numbers the question paper does not declare.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    /// Bands tried in order.
    pub bands: Vec<MarkBand>,
    /// Mark for numbers outside every band.
    pub default_marks: f64,
}

impl FallbackPolicy {
    /// Mark value for `q_no` under this policy.
    pub fn marks_for(&self, q_no: u32) -> f64 {
        self.bands
            .iter()
            .find(|band| band.contains(q_no))
            .map_or(self.default_marks, |band| band.marks)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::from(&MarkSchemeConfig::default())
    }
}

impl From<&MarkSchemeConfig> for FallbackPolicy {
    fn from(config: &MarkSchemeConfig) -> Self {
        Self {
            bands: config.fallback_bands.clone(),
            default_marks: config.fallback_marks,
        }
    }
}

impl From<&AppConfig> for FallbackPolicy {
    fn from(config: &AppConfig) -> Self {
        Self::from(&config.mark_scheme)
    }
}

/// Runtime HTTP options for retrieving a response sheet.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_redirects: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.fetch.user_agent.clone(),
            timeout_secs: config.fetch.timeout_secs,
            max_redirects: config.fetch.max_redirects,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.gatecalc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GateCalcError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.gatecalc/gatecalc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GateCalcError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        GateCalcError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GateCalcError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GateCalcError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GateCalcError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs the pipeline cannot honor.
fn validate(config: &AppConfig) -> Result<()> {
    for band in &config.mark_scheme.fallback_bands {
        if band.start > band.end {
            return Err(GateCalcError::config(format!(
                "fallback band {}-{} has start after end",
                band.start, band.end
            )));
        }
        if !band.marks.is_finite() || band.marks <= 0.0 {
            return Err(GateCalcError::config(format!(
                "fallback band {}-{} must carry a positive mark, got {}",
                band.start, band.end, band.marks
            )));
        }
    }

    let fallback = config.mark_scheme.fallback_marks;
    if !fallback.is_finite() || fallback <= 0.0 {
        return Err(GateCalcError::config(format!(
            "fallback_marks must be a positive mark, got {fallback}"
        )));
    }

    match config.defaults.format.as_str() {
        "text" | "json" => Ok(()),
        other => Err(GateCalcError::config(format!(
            "unknown output format '{other}' (expected \"text\" or \"json\")"
        ))),
    }
}
