//! Record of the credential files this tool has written.
//!
//! The credential directory is shared with people: files get copied in from
//! older runs, renamed by hand, or replaced with reprints. The ledger lets
//! the manager tell its own output apart from everything else.
//!
//! # Entries
//!
//! Keyed by slug, each entry stores the record id that went into the lookup
//! URL and the SHA-256 of the PNG bytes as written. An entry vouches for a
//! file only while the file's current hash still equals the recorded one; a
//! file touched since is treated as unknown provenance.
//!
//! # Storage
//!
//! `<credentials_dir>/.credential-ledger.json`, next to the images so it
//! travels with them. A missing, corrupt, or wrong-version ledger loads as
//! empty: the ledger is an aid, never a gate.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the ledger file within the credential directory.
const LEDGER_FILENAME: &str = ".credential-ledger.json";

/// Bump when the entry format or hash input changes.
const LEDGER_VERSION: u32 = 1;

/// One credential written by this tool.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: String,
    pub sha256: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Ledger {
    pub version: u32,
    pub entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    pub fn empty() -> Self {
        Self {
            version: LEDGER_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the credential directory, falling back to empty.
    pub fn load(dir: &Path) -> Self {
        let path = ledger_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(ledger) if ledger.version == LEDGER_VERSION => ledger,
            Ok(_) | Err(_) => {
                tracing::debug!(path = %path.display(), "ignoring unreadable ledger");
                Self::empty()
            }
        }
    }

    /// Save atomically into the credential directory.
    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::store::write_atomic(&ledger_path(dir), json.as_bytes())
    }

    /// Record a freshly written credential.
    pub fn record(&mut self, slug: &str, id: &str, bytes: &[u8]) {
        self.entries.insert(
            slug.to_string(),
            LedgerEntry {
                id: id.to_string(),
                sha256: hash_bytes(bytes),
            },
        );
    }

    /// Id this tool wrote into `file`, if the file is unchanged since.
    pub fn vouched_id(&self, slug: &str, file: &Path) -> Option<&str> {
        let entry = self.entries.get(slug)?;
        let current = hash_file(file).ok()?;
        (current == entry.sha256).then_some(entry.id.as_str())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }
}

/// SHA-256 of a byte slice, as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's contents, as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

pub fn ledger_path(dir: &Path) -> PathBuf {
    dir.join(LEDGER_FILENAME)
}
