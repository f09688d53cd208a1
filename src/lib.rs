//! # qr-roster
//!
//! Keeps a canonical employee directory and the printed QR credentials that
//! point into it in step. Records arrive as hand-edited spreadsheet exports;
//! each employee carries a UUID that never changes once minted, because it
//! is printed inside a physical credential.
//!
//! # Architecture: Import, Then Credentials
//!
//! ```text
//! 1. Import     sheet.xlsx + empleados.json  →  empleados.json   (reconcile)
//! 2. Generate   empleados.json + qr_codes/   →  qr_codes/*.png   (missing only)
//!    Check      empleados.json + qr_codes/   →  report            (read-only)
//! ```
//!
//! The two stages share nothing but the store file, so either can be run
//! on its own. Both return report values; printing is the binary's job.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`import`] | Spreadsheet reader and the fixed column layouts of each export variant |
//! | [`reconcile`] | Merges imported rows into a new record set, preserving ids |
//! | [`rules`] | Stray-header filter and ordered per-person override rules |
//! | [`store`] | Loads and atomically saves the JSON record store |
//! | [`credentials`] | QR encoding, optional decoding, ledger, and the credential lifecycle |
//! | [`naming`] | Name → slug mapping shared by every stage, lookup URL format |
//! | [`types`] | The `Employee` record |
//! | [`config`] | `qr-roster.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting for each command |
//!
//! # Design Decisions
//!
//! ## The Import Is The Whole Truth
//!
//! Reconciliation replaces the store with exactly what the current import
//! contains. A record missing from the sheet is gone from the store after the
//! import. This mirrors how the directory is maintained (the sheet is the
//! master list), but silent loss is dangerous, so every dropped record is
//! listed in the report before the store is written.
//!
//! ## Names Join Records To Files
//!
//! A credential is found by the slug of its record's name, not by id: the
//! printed file has to be recognizable by a person sorting a folder. Two
//! names can slug to the same file; that case is detected and reported, and
//! the credential is left for a person to sort out.
//!
//! ## Generate Never Destroys
//!
//! Credentials already exist on paper. The manager only ever adds files:
//! orphans are reported, existing files are never overwritten, and every
//! write lands through a temp file and an atomic rename.

pub mod config;
pub mod credentials;
pub mod import;
pub mod naming;
pub mod output;
pub mod reconcile;
pub mod rules;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
