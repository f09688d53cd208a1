//! Shared test utilities for the qr-roster test suite.
//!
//! Provides record and import-row builders plus temp-dir fixtures for the
//! credential directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = credential_dir(&["ANA.png", "ORPHAN.png"]);
//! let records = vec![employee("A", "ANA")];
//!
//! let r = reconcile(&[row(2, "", "beto", "", "VENTAS", "555")], None, &options);
//! assert_eq!(dir_listing(tmp.path()), vec!["ANA.png", "ORPHAN.png"]);
//! ```

use crate::import::{Cell, ImportRow};
use crate::types::Employee;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Builders
// =========================================================================

/// A store record with the default role and blank unit and phone.
pub fn employee(id: &str, name: &str) -> Employee {
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        role: "Asesor".to_string(),
        unit: String::new(),
        phone: String::new(),
    }
}

fn cell(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::text(value)
    }
}

/// An import row from raw strings; `""` stands for an empty cell.
pub fn row(number: usize, id: &str, name: &str, role: &str, unit: &str, phone: &str) -> ImportRow {
    ImportRow {
        number,
        id: cell(id),
        name: cell(name),
        role: cell(role),
        unit: cell(unit),
        phone: cell(phone),
    }
}

// =========================================================================
// Credential directory fixtures
// =========================================================================

/// Temp directory holding one placeholder file per name.
///
/// Files contain their own name, so tests can tell them apart from
/// anything the manager writes.
pub fn credential_dir(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in files {
        std::fs::write(tmp.path().join(name), name.as_bytes()).unwrap();
    }
    tmp
}

/// Sorted file names in a directory, dotfiles included.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
