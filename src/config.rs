//! Pipeline configuration.
//!
//! Loads, validates and merges `moodboard.toml`. Stock defaults are the base
//! layer; the user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [store]
//! data_dir = "data"             # moodboards.json + products.json live here
//!
//! [tokens]
//! max_attempts = 5              # share-token collision retries before giving up
//!
//! [render]
//! default_style = "magazine"    # magazine | catalog
//! base_url = "https://moodboards.example.com"
//! # asset_base_url = "https://cdn.example.com/products"
//! # asset_dir = "assets"        # resolve images from a local directory instead
//! placeholder_label = "Image unavailable"
//! page_columns = 3
//! page_rows = 4
//!
//! [colors.light]
//! background = "#fbfaf7"
//! text = "#1c1b19"
//! text_muted = "#6b6760"
//! border = "#e4e0d8"
//! accent = "#8a6a3b"
//! accent_strong = "#5c4524"
//! placeholder = "#ebe7df"
//!
//! [mail]
//! transport = "outbox"          # outbox | http
//! outbox_dir = "outbox"
//! # endpoint = "https://api.mail.example.com/v1/send"
//! api_key_env = "MOODBOARD_MAIL_API_KEY"
//! from_name = "Moodboards"
//! from_email = "moodboards@example.com"
//! reply_to_name = "Design Studio"
//! reply_to_email = "studio@example.com"
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"                # error | warn | info | debug | trace
//! format = "compact"            # compact | json
//!
//! [processing]
//! max_processes = 4             # asset resolution workers (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::render::LayoutStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

/// File name looked up inside the config directory.
pub const CONFIG_FILE: &str = "moodboard.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `moodboard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoodboardConfig {
    pub store: StoreConfig,
    pub tokens: TokenConfig,
    pub render: RenderConfig,
    /// Document color schemes for light and dark modes.
    pub colors: ColorConfig,
    pub mail: MailConfig,
    pub logging: LoggingConfig,
    pub processing: ProcessingConfig,
}

impl MoodboardConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "tokens.max_attempts must be at least 1".into(),
            ));
        }
        if LayoutStyle::parse(&self.render.default_style).is_none() {
            return Err(ConfigError::Validation(format!(
                "render.default_style must be one of: {}",
                style_names()
            )));
        }
        if !self.render.base_url.starts_with("https://")
            && !self.render.base_url.starts_with("http://")
        {
            return Err(ConfigError::Validation(
                "render.base_url must be an http(s) URL".into(),
            ));
        }
        // A landscape hero spans 3 columns and every hero spans 2 rows.
        if self.render.page_columns < 3 || self.render.page_rows < 2 {
            return Err(ConfigError::Validation(
                "render.page_columns must be >= 3 and render.page_rows >= 2".into(),
            ));
        }
        if self.render.page_columns > 12 || self.render.page_rows > 12 {
            return Err(ConfigError::Validation(
                "render.page_columns and render.page_rows must be <= 12".into(),
            ));
        }
        if !self.mail.from_email.contains('@') || !self.mail.reply_to_email.contains('@') {
            return Err(ConfigError::Validation(
                "mail.from_email and mail.reply_to_email must be email addresses".into(),
            ));
        }
        if self.mail.transport == MailTransport::Http && self.mail.endpoint.is_none() {
            return Err(ConfigError::Validation(
                "mail.endpoint is required when mail.transport = \"http\"".into(),
            ));
        }
        if self.mail.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "mail.timeout_secs must be at least 1".into(),
            ));
        }
        self.logging.level_filter()?;
        Ok(())
    }

    /// The configured default style. Falls back to magazine if unparseable;
    /// `validate` rejects that case on load.
    pub fn default_style(&self) -> LayoutStyle {
        LayoutStyle::parse(&self.render.default_style).unwrap_or_default()
    }
}

fn style_names() -> String {
    LayoutStyle::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where moodboards and the product catalog are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding `moodboards.json` and `products.json`.
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenConfig {
    /// Insert attempts before a share-token collision becomes fatal.
    pub max_attempts: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Style used when a request names none, or an unknown one.
    pub default_style: String,
    /// Public origin of the flipbook web view.
    pub base_url: String,
    /// Prefix joined onto relative image references.
    pub asset_base_url: Option<String>,
    /// Local image directory. When set, references must exist under it.
    pub asset_dir: Option<String>,
    /// Text shown in place of an image that could not be resolved.
    pub placeholder_label: String,
    /// Grid page width in cells.
    pub page_columns: u8,
    /// Grid page height in cells.
    pub page_rows: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_style: LayoutStyle::default().as_str().to_string(),
            base_url: "https://moodboards.example.com".to_string(),
            asset_base_url: None,
            asset_dir: None,
            placeholder_label: "Image unavailable".to_string(),
            page_columns: 3,
            page_rows: 4,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Captions, page numbers, placeholder labels.
    pub text_muted: String,
    pub border: String,
    /// Links and interest icons.
    pub accent: String,
    pub accent_strong: String,
    /// Hatch color behind missing images.
    pub placeholder: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fbfaf7".to_string(),
            text: "#1c1b19".to_string(),
            text_muted: "#6b6760".to_string(),
            border: "#e4e0d8".to_string(),
            accent: "#8a6a3b".to_string(),
            accent_strong: "#5c4524".to_string(),
            placeholder: "#ebe7df".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#141311".to_string(),
            text: "#ece9e2".to_string(),
            text_muted: "#9c978d".to_string(),
            border: "#34312c".to_string(),
            accent: "#d1ad74".to_string(),
            accent_strong: "#f0d19e".to_string(),
            placeholder: "#2a2824".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Write each message as JSON into `mail.outbox_dir`.
    #[default]
    Outbox,
    /// POST each message to `mail.endpoint`.
    Http,
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub outbox_dir: String,
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the API bearer token.
    pub api_key_env: String,
    pub from_name: String,
    pub from_email: String,
    pub reply_to_name: String,
    pub reply_to_email: String,
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Outbox,
            outbox_dir: "outbox".to_string(),
            endpoint: None,
            api_key_env: "MOODBOARD_MAIL_API_KEY".to_string(),
            from_name: "Moodboards".to_string(),
            from_email: "moodboards@example.com".to_string(),
            reply_to_name: "Design Studio".to_string(),
            reply_to_email: "studio@example.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "logging.level must be one of off, error, warn, info, debug, trace (got {:?})",
                self.level
            ))
        })
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel asset resolution workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(MoodboardConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Load `moodboard.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = config_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MoodboardConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MoodboardConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `moodboard.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<MoodboardConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `moodboard.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Moodboard Pipeline Configuration
# ================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Store
# ---------------------------------------------------------------------------
[store]
# Directory holding moodboards.json and products.json.
data_dir = "data"

# ---------------------------------------------------------------------------
# Share tokens
# ---------------------------------------------------------------------------
[tokens]
# Insert attempts before a share-token collision is reported as fatal.
max_attempts = 5

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Style used when a request names none or an unknown one: magazine | catalog
default_style = "magazine"

# Public origin of the flipbook view. Boards are served at
# {base_url}/moodboard/{share_token}.
base_url = "https://moodboards.example.com"

# Prefix joined onto relative product image references.
# asset_base_url = "https://cdn.example.com/products"

# Resolve images from a local directory; missing files become placeholders.
# asset_dir = "assets"

# Text shown in place of an image that could not be resolved.
placeholder_label = "Image unavailable"

# Grid page cell budget. A landscape hero needs 3 columns and 2 rows.
page_columns = 3
page_rows = 4

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fbfaf7"
text = "#1c1b19"
text_muted = "#6b6760"     # Captions, page numbers
border = "#e4e0d8"
accent = "#8a6a3b"         # Links, interest icons
accent_strong = "#5c4524"
placeholder = "#ebe7df"    # Hatch behind missing images

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#141311"
text = "#ece9e2"
text_muted = "#9c978d"
border = "#34312c"
accent = "#d1ad74"
accent_strong = "#f0d19e"
placeholder = "#2a2824"

# ---------------------------------------------------------------------------
# Mail
# ---------------------------------------------------------------------------
[mail]
# outbox: write each message as JSON into outbox_dir
# http:   POST each message to endpoint with a bearer token
transport = "outbox"
outbox_dir = "outbox"
# endpoint = "https://api.mail.example.com/v1/send"

# Environment variable holding the HTTP API key.
api_key_env = "MOODBOARD_MAIL_API_KEY"

from_name = "Moodboards"
from_email = "moodboards@example.com"
reply_to_name = "Design Studio"
reply_to_email = "studio@example.com"
timeout_secs = 30

# ---------------------------------------------------------------------------
# Logging (RUST_LOG and --log-level take precedence)
# ---------------------------------------------------------------------------
[logging]
level = "info"
format = "compact"         # compact | json

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel asset-resolution workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
    --color-accent-strong: {light_accent_strong};
    --color-placeholder: {light_placeholder};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
        --color-accent-strong: {dark_accent_strong};
        --color-placeholder: {dark_placeholder};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        light_accent_strong = colors.light.accent_strong,
        light_placeholder = colors.light.placeholder,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
        dark_accent_strong = colors.dark.accent_strong,
        dark_placeholder = colors.dark.placeholder,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) {
        fs::write(config_path(dir), body).unwrap();
    }

    #[test]
    fn defaults_are_valid() {
        let config = MoodboardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tokens.max_attempts, 5);
        assert_eq!(config.default_style(), LayoutStyle::Magazine);
        assert_eq!(config.render.page_columns, 3);
        assert_eq!(config.render.page_rows, 4);
        assert_eq!(config.mail.transport, MailTransport::Outbox);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn parse_partial_config() {
        let config: MoodboardConfig = toml::from_str(
            r##"
[render]
default_style = "catalog"

[colors.light]
background = "#ffffff"
"##,
        )
        .unwrap();
        assert_eq!(config.default_style(), LayoutStyle::Catalog);
        assert_eq!(config.colors.light.background, "#ffffff");
        assert_eq!(config.colors.light.text, "#1c1b19");
        assert_eq!(config.render.placeholder_label, "Image unavailable");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.store.data_dir, "data");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
[store]
data_dir = "/var/lib/moodboards"

[tokens]
max_attempts = 8

[mail]
transport = "http"
endpoint = "https://api.mail.test/send"
"#,
        );
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.store.data_dir, "/var/lib/moodboards");
        assert_eq!(config.tokens.max_attempts, 8);
        assert_eq!(config.mail.transport, MailTransport::Http);
        assert_eq!(config.mail.from_email, "moodboards@example.com");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[render\nbase_url = ");
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[render]\npage_colums = 4\n");
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(toml::from_str::<MoodboardConfig>("[smtp]\nhost = \"x\"\n").is_err());
    }

    // =========================================================================
    // validation
    // =========================================================================

    fn invalid(mutate: impl FnOnce(&mut MoodboardConfig)) -> String {
        let mut config = MoodboardConfig::default();
        mutate(&mut config);
        match config.validate() {
            Err(ConfigError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        assert!(invalid(|c| c.tokens.max_attempts = 0).contains("max_attempts"));
    }

    #[test]
    fn validate_rejects_unknown_default_style() {
        let msg = invalid(|c| c.render.default_style = "brochure".into());
        assert!(msg.contains("magazine, catalog"));
    }

    #[test]
    fn validate_rejects_narrow_grid() {
        assert!(invalid(|c| c.render.page_columns = 2).contains("page_columns"));
        assert!(invalid(|c| c.render.page_rows = 1).contains("page_rows"));
    }

    #[test]
    fn validate_requires_endpoint_for_http() {
        assert!(invalid(|c| c.mail.transport = MailTransport::Http).contains("endpoint"));
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        assert!(invalid(|c| c.render.base_url = "moodboards.example.com".into()).contains("base_url"));
    }

    #[test]
    fn validate_rejects_bad_log_level() {
        assert!(invalid(|c| c.logging.level = "loud".into()).contains("logging.level"));
    }

    #[test]
    fn log_level_parses() {
        let logging = LoggingConfig {
            level: "debug".into(),
            format: LogFormat::Json,
        };
        assert_eq!(logging.level_filter().unwrap(), LevelFilter::DEBUG);
    }

    // =========================================================================
    // merging
    // =========================================================================

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[tokens]\nmax_attempts = 0\n").unwrap();
        assert!(matches!(
            resolve_config(base, Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value().unwrap();
        let table = value.as_table().unwrap();
        for key in ["store", "tokens", "render", "colors", "mail", "logging", "processing"] {
            assert!(table.contains_key(key), "missing section {key}");
        }
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: MoodboardConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = MoodboardConfig::default();
        assert_eq!(config.store.data_dir, defaults.store.data_dir);
        assert_eq!(config.tokens.max_attempts, defaults.tokens.max_attempts);
        assert_eq!(config.render.base_url, defaults.render.base_url);
        assert_eq!(config.colors.dark.accent, defaults.colors.dark.accent);
        assert_eq!(config.mail.reply_to_email, defaults.mail.reply_to_email);
        assert_eq!(config.processing.max_processes, None);
    }

    // =========================================================================
    // CSS and threads
    // =========================================================================

    #[test]
    fn generate_css_includes_both_schemes() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();
        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("--color-placeholder"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let threads = effective_threads(&ProcessingConfig {
            max_processes: Some(1),
        });
        assert_eq!(threads, 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let threads = effective_threads(&ProcessingConfig {
            max_processes: Some(0),
        });
        assert_eq!(threads, 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let threads = effective_threads(&ProcessingConfig {
            max_processes: Some(99_999),
        });
        assert_eq!(threads, cores);
    }
}
