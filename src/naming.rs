//! Centralized name → filename mapping for credential images.
//!
//! A record and its credential file are joined by one key only: the slug of
//! the record's normalized display name. Every place that needs that key goes
//! through [`slug`], so the import, generate and check commands can never
//! disagree about which file belongs to which employee.
//!
//! ## Slug rules
//!
//! 1. Accented Latin letters from a fixed table become their ASCII base letter
//!    (`É` → `E`, `ñ` → `n`, `Ü` → `U`).
//! 2. Spaces become underscores.
//! 3. Anything outside `[A-Za-z0-9_]` is dropped.
//!
//! ```text
//! "JOSÉ LUIS"          → "JOSE_LUIS"
//! "MARÍA DE LA PEÑA"   → "MARIA_DE_LA_PENA"
//! "O'BRIEN, ANA"       → "OBRIEN_ANA"
//! ```
//!
//! Distinct names may produce the same slug. This module does not detect
//! that; the credential planner does.

/// Extension of every credential image.
pub const CREDENTIAL_EXTENSION: &str = "png";

/// Accented letters folded to ASCII before filtering.
const ACCENT_TABLE: &[(char, char)] = &[
    ('Á', 'A'),
    ('É', 'E'),
    ('Í', 'I'),
    ('Ó', 'O'),
    ('Ú', 'U'),
    ('á', 'a'),
    ('é', 'e'),
    ('í', 'i'),
    ('ó', 'o'),
    ('ú', 'u'),
    ('Ñ', 'N'),
    ('ñ', 'n'),
    ('Ü', 'U'),
    ('ü', 'u'),
];

fn fold_accent(c: char) -> char {
    ACCENT_TABLE
        .iter()
        .find(|(accented, _)| *accented == c)
        .map(|(_, plain)| *plain)
        .unwrap_or(c)
}

/// Map a display name to its filesystem-safe slug.
///
/// Pure and deterministic. Case is preserved; callers pass names already
/// normalized to trimmed upper case.
pub fn slug(name: &str) -> String {
    name.chars()
        .map(fold_accent)
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Credential filename for a slug: `<slug>.png`.
pub fn credential_filename(slug: &str) -> String {
    format!("{slug}.{CREDENTIAL_EXTENSION}")
}

/// Build the lookup URL encoded into a credential: `<base_url>?id=<id>`.
pub fn lookup_url(base_url: &str, id: &str) -> String {
    format!("{base_url}?id={id}")
}

/// Recover the identifier from a lookup URL.
///
/// Takes the run of hex digits and dashes following the last `?id=` or
/// `&id=`, which is what [`lookup_url`] appends for a UUID. Keys that merely
/// end in `id` (`grid=`) are not the parameter. Returns `None` when the URL
/// carries no `id` parameter or the value is empty.
pub fn extract_id(url: &str) -> Option<String> {
    let start = url
        .rmatch_indices("id=")
        .find(|(i, _)| matches!(url[..*i].chars().next_back(), Some('?' | '&')))
        .map(|(i, m)| i + m.len())?;
    let id: String = url[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit() || *c == '-')
        .collect();
    if id.is_empty() { None } else { Some(id) }
}
