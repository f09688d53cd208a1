//! Business exceptions applied during reconciliation, expressed as data.
//!
//! Hand-maintained spreadsheets need two kinds of correction:
//!
//! - **Stray header rows.** Sections get copy-pasted with their header line,
//!   so a "NOMBRE" or "DIRECTOR" row shows up in the middle of the data.
//!   [`RowRules::is_header`] recognizes them by name or by organizational unit.
//!   The reconciler only asks for rows without an id.
//! - **Per-person corrections.** A handful of people carry a role or unit the
//!   sheet gets wrong (directors, assistants). Each correction is an
//!   [`OverrideRule`]: a predicate over the normalized name plus the fields to
//!   force. Rules are evaluated in order and the first match wins.
//!
//! Both lists come from configuration; see [`crate::config::ImportConfig`].

use serde::{Deserialize, Serialize};

/// Predicate over a normalized (trimmed, upper-case) employee name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// Name equals the value after the same normalization.
    Exact(String),
    /// Name starts with the value after the same normalization.
    Prefix(String),
}

impl NameMatch {
    pub fn matches(&self, normalized_name: &str) -> bool {
        match self {
            NameMatch::Exact(name) => normalize_name(name) == normalized_name,
            NameMatch::Prefix(prefix) => normalized_name.starts_with(&normalize_name(prefix)),
        }
    }

    fn pattern(&self) -> &str {
        match self {
            NameMatch::Exact(s) | NameMatch::Prefix(s) => s,
        }
    }
}

/// One business exception: who it applies to and what it forces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideRule {
    #[serde(rename = "match")]
    pub matcher: NameMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puesto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gerencia: Option<String>,
}

impl OverrideRule {
    pub fn exact(name: &str) -> Self {
        Self {
            matcher: NameMatch::Exact(name.to_string()),
            puesto: None,
            gerencia: None,
        }
    }

    pub fn prefix(prefix: &str) -> Self {
        Self {
            matcher: NameMatch::Prefix(prefix.to_string()),
            puesto: None,
            gerencia: None,
        }
    }

    pub fn role(mut self, puesto: &str) -> Self {
        self.puesto = Some(puesto.to_string());
        self
    }

    pub fn unit(mut self, gerencia: &str) -> Self {
        self.gerencia = Some(gerencia.to_string());
        self
    }

    /// Problem with this rule, if any. Used by config validation.
    pub fn problem(&self) -> Option<String> {
        if self.matcher.pattern().trim().is_empty() {
            return Some("override match value must not be empty".into());
        }
        if self.puesto.is_none() && self.gerencia.is_none() {
            return Some(format!(
                "override for '{}' sets neither puesto nor gerencia",
                self.matcher.pattern()
            ));
        }
        None
    }
}

/// Fields an override forces onto a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrides<'a> {
    pub puesto: Option<&'a str>,
    pub gerencia: Option<&'a str>,
}

/// The full rule set consulted for each imported row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRules {
    pub header_names: Vec<String>,
    pub header_units: Vec<String>,
    pub overrides: Vec<OverrideRule>,
}

impl RowRules {
    /// Whether a row is a stray header rather than an employee.
    ///
    /// `unit` is compared trimmed and upper-cased.
    pub fn is_header(&self, normalized_name: &str, unit: &str) -> bool {
        let unit = unit.trim().to_uppercase();
        self.header_names
            .iter()
            .any(|h| normalize_name(h) == normalized_name)
            || self.header_units.iter().any(|h| normalize_name(h) == unit)
    }

    /// Overrides of the first rule matching `normalized_name`.
    pub fn overrides_for(&self, normalized_name: &str) -> Option<Overrides<'_>> {
        self.overrides
            .iter()
            .find(|rule| rule.matcher.matches(normalized_name))
            .map(|rule| Overrides {
                puesto: rule.puesto.as_deref(),
                gerencia: rule.gerencia.as_deref(),
            })
    }
}

/// Name normalization shared by import and rule matching: trim, upper-case.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}
