//! Roster configuration module.
//!
//! Handles loading, validating, and merging `qr-roster.toml`. The file is
//! optional: stock defaults cover a working setup, and a user file only needs
//! the keys it wants to change. Positional command-line arguments override
//! the merged result.
//!
//! ## Config File Location
//!
//! `qr-roster.toml` is looked up in the config directory (`--config-dir`,
//! default: the current directory):
//!
//! ```text
//! ./
//! ├── qr-roster.toml      # Optional, overrides stock defaults
//! ├── empleados.json      # Canonical store
//! └── qr_codes/           # One PNG credential per employee
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = "https://ramz0.github.io/credenciales-empleados"
//! store = "empleados.json"
//! credentials_dir = "qr_codes"
//!
//! [import]
//! layout = "master"          # master | roster | managers
//! default_role = "Asesor"    # Role when the sheet leaves puesto blank
//! header_names = ["DIRECTOR", "NOMBRE", "NOMBRE DEL GERENTE", "GERENCIA", "PUESTO", "NO DE CELULAR"]
//! header_units = []        # e.g. ["PUESTO", "GERENCIA"]; never applied to rows with an id
//!
//! [[overrides]]              # Ordered; first match wins
//! match = { exact = "JUAN PEREZ" }
//! puesto = "Director"
//! gerencia = "DIRECCION"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::import::ColumnLayout;
use crate::reconcile::ReconcileOptions;
use crate::rules::{OverrideRule, RowRules};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILENAME: &str = "qr-roster.toml";

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

/// Roster configuration loaded from `qr-roster.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// Prefix of every lookup URL; the record id is appended as `?id=<id>`.
    pub base_url: String,
    /// Path of the canonical JSON store.
    pub store: String,
    /// Directory holding one PNG credential per record.
    pub credentials_dir: String,
    /// Spreadsheet import settings.
    pub import: ImportConfig,
    /// Per-person corrections, evaluated in order.
    pub overrides: Vec<OverrideRule>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ramz0.github.io/credenciales-empleados".to_string(),
            store: "empleados.json".to_string(),
            credentials_dir: "qr_codes".to_string(),
            import: ImportConfig::default(),
            overrides: Vec::new(),
        }
    }
}

impl RosterConfig {
    /// Validate values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got '{url}'"
            )));
        }
        if self.store.trim().is_empty() {
            return Err(ConfigError::Validation("store must not be empty".into()));
        }
        if self.credentials_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "credentials_dir must not be empty".into(),
            ));
        }
        if self.import.default_role.trim().is_empty() {
            return Err(ConfigError::Validation(
                "import.default_role must not be empty".into(),
            ));
        }
        for (i, rule) in self.overrides.iter().enumerate() {
            if let Some(problem) = rule.problem() {
                return Err(ConfigError::Validation(format!(
                    "overrides[{i}]: {problem}"
                )));
            }
        }
        Ok(())
    }

    /// Reconciler options derived from the import section and overrides.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            default_role: self.import.default_role.trim().to_string(),
            rules: RowRules {
                header_names: self.import.header_names.clone(),
                header_units: self.import.header_units.clone(),
                overrides: self.overrides.clone(),
            },
        }
    }
}

/// Spreadsheet import settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Column contract of the spreadsheet being imported.
    pub layout: ColumnLayout,
    /// Role assigned when a row leaves `puesto` blank.
    pub default_role: String,
    /// Names that mark a row as a stray header line.
    pub header_names: Vec<String>,
    /// Organizational units that mark a row as a stray header line.
    pub header_units: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::Master,
            default_role: "Asesor".to_string(),
            header_names: [
                "DIRECTOR",
                "NOMBRE",
                "NOMBRE DEL GERENTE",
                "GERENCIA",
                "PUESTO",
                "NO DE CELULAR",
            ]
            .map(String::from)
            .to_vec(),
            header_units: Vec::new(),
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(RosterConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
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

/// Load `qr-roster.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RosterConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RosterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `qr-roster.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<RosterConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(dir = %dir.display(), ?config, "configuration loaded");
    Ok(config)
}

/// Returns a fully-commented stock `qr-roster.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# qr-roster Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as qr-roster.toml in the directory passed to --config-dir
# (default: the current directory). Positional command-line arguments win
# over the values set here.
# Unknown keys will cause an error.

# Lookup page encoded into every credential. The record id is appended as
# ?id=<uuid>, so changing this only affects credentials generated afterwards.
base_url = "https://ramz0.github.io/credenciales-empleados"

# Canonical employee store (JSON array).
store = "empleados.json"

# One <NAME>.png credential per employee lives here.
credentials_dir = "qr_codes"

# ---------------------------------------------------------------------------
# Spreadsheet import
# ---------------------------------------------------------------------------
[import]
# Column contract of the sheet being imported:
#   master   - row 1 headers, data from row 2: A=id B=nombre C=puesto D=gerencia E=celular
#   roster   - data from row 3: D=gerencia E=nombre F=celular (no ids)
#   managers - data from row 4: B=gerencia C=nombre D=celular, puesto "Gerente"
layout = "master"

# Role given to rows whose puesto cell is blank.
default_role = "Asesor"

# Rows whose name is one of these are stray header lines and are skipped.
# A row with a non-blank id is always kept.
header_names = ["DIRECTOR", "NOMBRE", "NOMBRE DEL GERENTE", "GERENCIA", "PUESTO", "NO DE CELULAR"]

# Rows whose gerencia is one of these are stray header lines and are skipped.
# Off by default: real units such as DIRECCION would match.
# header_units = ["PUESTO", "GERENCIA"]
header_units = []

# ---------------------------------------------------------------------------
# Overrides
# ---------------------------------------------------------------------------
# Per-person corrections applied after import. Evaluated top to bottom; the
# first rule whose name matches wins. Match on the whole normalized name
# (exact) or its beginning (prefix). Each rule sets puesto, gerencia, or both.
#
# [[overrides]]
# match = { exact = "JUAN PEREZ" }
# puesto = "Director"
# gerencia = "DIRECCION"
#
# [[overrides]]
# match = { prefix = "ASISTENTE" }
# puesto = "Asistente de Direccion"
"##
}
