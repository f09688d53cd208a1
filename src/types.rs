//! The employee record shared by the store, the reconciler and the
//! credential manager.
//!
//! On disk the record keeps the field names of the published directory
//! (`id`, `nombre`, `puesto`, `gerencia`, `celular`) because the lookup site
//! reads the same JSON file.

use serde::{Deserialize, Deserializer, Serialize};

/// One canonical employee entry.
///
/// `id` is minted once and never changes: it is printed inside a physical
/// QR credential. `name` is the normalized (trimmed, upper-case) display name
/// and doubles as the credential filename key through [`crate::naming::slug`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "puesto", default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(rename = "gerencia", default, deserialize_with = "lenient_string")]
    pub unit: String,
    #[serde(rename = "celular", default, deserialize_with = "lenient_string")]
    pub phone: String,
}

impl Employee {
    /// Filename key for this record's credential.
    pub fn slug(&self) -> String {
        crate::naming::slug(&self.name)
    }
}

/// Accept any JSON scalar for a string field.
///
/// Hand-edited stores carry phone numbers as numbers and the occasional
/// `null`. Field contents are not validated, only coerced.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string value, found {other}"
        ))),
    }
}
