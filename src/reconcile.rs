//! Reconciliation of an imported spreadsheet snapshot against the store.
//!
//! # Policy
//!
//! The import is the whole truth. The merged record set is exactly the
//! rows of the current import, in sheet order; records of the previous store
//! that the import no longer mentions are not carried over. They are listed
//! in [`ReconcileReport::dropped`] so the operator sees every removal before
//! the store is saved.
//!
//! Identity is carried by the spreadsheet itself:
//!
//! - **id cell filled** → update. The id is kept verbatim (trimmed) and every
//!   other field is taken from the row.
//! - **id cell blank** → create. A fresh version-4 UUID is minted.
//!
//! An id must never change once minted: it is printed inside a physical QR
//! credential.
//!
//! # Per-row faults
//!
//! Each row is processed to a `Result`. A bad row becomes a
//! [`RowError`] in the report and the batch moves on; nothing a single row
//! contains can abort the run.
//!
//! # Known gaps, surfaced rather than fixed
//!
//! - Two rows supplying the same id are both kept; the id shows up in
//!   [`ReconcileReport::duplicate_ids`].
//! - Dropped records are only reported; deciding whether a missing row is an
//!   offboarding or an accident is left to the operator.

use crate::import::{Cell, ImportRow};
use crate::rules::{RowRules, normalize_name};
use crate::types::Employee;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Row {row}: {reason}")]
    Malformed { row: usize, reason: String },
}

impl RowError {
    pub fn row(&self) -> usize {
        match self {
            RowError::Malformed { row, .. } => *row,
        }
    }
}

/// Knobs for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Role assigned when the row leaves `puesto` blank.
    pub default_role: String,
    pub rules: RowRules,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            default_role: "Asesor".to_string(),
            rules: RowRules::default(),
        }
    }
}

/// Counts and findings of one run. Callers format it however they like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub skipped_empty: usize,
    pub skipped_header: usize,
    pub error_rows: usize,
    /// Records that had at least one field forced by an override rule.
    pub overridden: usize,
    pub errors: Vec<RowError>,
    /// Ids supplied by more than one row, in first-seen order.
    pub duplicate_ids: Vec<String>,
    /// Prior records whose id is absent from the merged set.
    pub dropped: Vec<Employee>,
}

impl ReconcileReport {
    pub fn total_rows(&self) -> usize {
        self.created + self.updated + self.skipped_empty + self.skipped_header + self.error_rows
    }
}

/// Merged records plus the report describing how they were produced.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub records: Vec<Employee>,
    pub report: ReconcileReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Identity {
    Created,
    Updated,
}

#[derive(Debug)]
enum RowOutcome {
    Record {
        employee: Employee,
        identity: Identity,
        overridden: bool,
    },
    Empty,
    Header,
}

/// Merge imported rows into a new canonical record set.
///
/// `existing` is the store before this import, when there is one. It is
/// consulted for reporting only; see the module docs for why it never
/// contributes records.
pub fn reconcile(
    rows: &[ImportRow],
    existing: Option<&[Employee]>,
    options: &ReconcileOptions,
) -> Reconciliation {
    let mut records = Vec::with_capacity(rows.len());
    let mut report = ReconcileReport::default();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut duplicates: BTreeSet<String> = BTreeSet::new();

    for row in rows {
        match process_row(row, options, &seen_ids) {
            Ok(RowOutcome::Record {
                employee,
                identity,
                overridden,
            }) => {
                match identity {
                    Identity::Created => report.created += 1,
                    Identity::Updated => report.updated += 1,
                }
                if overridden {
                    report.overridden += 1;
                }
                let repeated = !seen_ids.insert(employee.id.clone());
                if repeated && duplicates.insert(employee.id.clone()) {
                    tracing::warn!(
                        row = row.number,
                        id = %employee.id,
                        "id supplied by more than one row"
                    );
                    report.duplicate_ids.push(employee.id.clone());
                }
                records.push(employee);
            }
            Ok(RowOutcome::Empty) => report.skipped_empty += 1,
            Ok(RowOutcome::Header) => {
                tracing::debug!(row = row.number, "stray header row skipped");
                report.skipped_header += 1;
            }
            Err(e) => {
                tracing::warn!(row = e.row(), error = %e, "row skipped");
                report.error_rows += 1;
                report.errors.push(e);
            }
        }
    }

    if let Some(previous) = existing {
        report.dropped = previous
            .iter()
            .filter(|old| !seen_ids.contains(&old.id))
            .cloned()
            .collect();
    }

    Reconciliation { records, report }
}

fn process_row(
    row: &ImportRow,
    options: &ReconcileOptions,
    seen_ids: &HashSet<String>,
) -> Result<RowOutcome, RowError> {
    let name = field(row, "nombre", &row.name)?;
    let name = normalize_name(&name);
    if name.is_empty() {
        return Ok(RowOutcome::Empty);
    }

    let supplied_id = field(row, "id", &row.id)?.trim().to_string();
    let unit = field(row, "gerencia", &row.unit)?.trim().to_string();
    // A row carrying an id is a stored employee, never a stray header.
    if supplied_id.is_empty() && options.rules.is_header(&name, &unit) {
        return Ok(RowOutcome::Header);
    }

    let role = field(row, "puesto", &row.role)?.trim().to_string();
    let phone = field(row, "celular", &row.phone)?.trim().to_string();

    let mut employee = Employee {
        id: String::new(),
        name,
        role: if role.is_empty() {
            options.default_role.clone()
        } else {
            role
        },
        unit,
        phone,
    };

    let overridden = match options.rules.overrides_for(&employee.name) {
        Some(overrides) => {
            if let Some(puesto) = overrides.puesto {
                employee.role = puesto.to_string();
            }
            if let Some(gerencia) = overrides.gerencia {
                employee.unit = gerencia.to_string();
            }
            true
        }
        None => false,
    };

    let identity = if supplied_id.is_empty() {
        employee.id = mint_id(seen_ids);
        Identity::Created
    } else {
        employee.id = supplied_id;
        Identity::Updated
    };

    Ok(RowOutcome::Record {
        employee,
        identity,
        overridden,
    })
}

/// Text of a cell, or a row fault when the sheet holds an error value.
fn field(row: &ImportRow, column: &str, cell: &Cell) -> Result<String, RowError> {
    match cell {
        Cell::Empty => Ok(String::new()),
        Cell::Text(s) => Ok(s.clone()),
        Cell::Invalid(value) => Err(RowError::Malformed {
            row: row.number,
            reason: format!("{column} cell holds an error value ({value})"),
        }),
    }
}

/// Mint a v4 UUID not already used in this run.
fn mint_id(seen: &HashSet<String>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !seen.contains(&id) {
            return id;
        }
    }
}
