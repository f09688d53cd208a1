//! CLI output formatting for every command.
//!
//! # Operator-First Display
//!
//! Each run ends with the counts an operator needs to decide what to do next
//! (re-import, generate, clean up orphans by hand), followed by the details
//! behind any non-zero count. Records are shown by name with their id in
//! brackets; credentials by file name.
//!
//! # Output Format
//!
//! ## Import
//!
//! ```text
//! Import
//!     Created: 2
//!     Updated: 40
//!     Skipped (blank name): 1
//!     Skipped (header row): 3
//!     Errors: 1
//! Row errors
//!     Row 17: id cell holds a spreadsheet error (#REF!)
//! Dropped (not in this import)
//!     001 BOB [5c6f...]
//! Saved 42 records to empleados.json
//! 2 new records: run `qr-roster generate` to create their credentials
//! ```
//!
//! ## Generate
//!
//! ```text
//! Credentials in qr_codes
//!     Records: 42
//!     Already present: 40
//!     Written: 2
//! 001 ANA → ANA.png
//! 002 BETO → BETO.png
//! Orphaned (left in place)
//!     OLD_NAME.png
//! ```
//!
//! ## Check
//!
//! ```text
//! Credentials in qr_codes: 40 complete, 2 missing, 1 orphaned
//! Verification (decoding available)
//!     ANA: match (decoded)
//!     CARLA: mismatch, file has 0f8f..., record has 7c9e... (ledger)
//!     DIEGO: unknown (no QR code found in image)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::credentials::{
    CheckOutcome, CredentialPlan, Evidence, SyncOutcome, Verdict, Verification,
};
use crate::naming::{credential_filename, lookup_url};
use crate::reconcile::ReconcileReport;
use crate::types::Employee;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// A record as operators know it: name, then id in brackets.
///
/// ```text
/// ANA LOPEZ [0f8fad5b-...]
/// (no name) [0f8fad5b-...]
/// ```
fn record_label(record: &Employee) -> String {
    let name = if record.name.trim().is_empty() {
        "(no name)"
    } else {
        record.name.as_str()
    };
    if record.id.is_empty() {
        name.to_string()
    } else {
        format!("{} [{}]", name, record.id)
    }
}

/// Section title followed by its indented items; nothing when empty.
fn section<I, S>(lines: &mut Vec<String>, title: &str, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return;
    }
    lines.push(title.to_string());
    for item in items {
        lines.push(format!("{}{}", indent(1), item.as_ref()));
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Plan findings shared by `generate` and `check`: orphans, collisions,
/// unnamed records.
fn plan_findings(lines: &mut Vec<String>, plan: &CredentialPlan, records: &[Employee]) {
    section(lines, "Orphaned (left in place)", &plan.orphaned);
    section(
        lines,
        "Name collisions (one file, several records)",
        plan.collisions.iter().map(|c| {
            let who: Vec<String> = c
                .records
                .iter()
                .filter_map(|&i| records.get(i))
                .map(record_label)
                .collect();
            format!("{}: {}", credential_filename(&c.slug), who.join(", "))
        }),
    );
    section(
        lines,
        "Unnamed (no credential possible)",
        plan.unnamed
            .iter()
            .filter_map(|&i| records.get(i))
            .map(record_label),
    );
}

// ============================================================================
// import
// ============================================================================

/// Format the outcome of an import: counts, row-level details, save target,
/// and a reminder when new records need credentials.
pub fn format_import_report(
    report: &ReconcileReport,
    ignored_rows: usize,
    store: &Path,
    saved: usize,
) -> Vec<String> {
    let mut lines = vec!["Import".to_string()];
    let counts = [
        ("Created", report.created),
        ("Updated", report.updated),
        ("Skipped (blank name)", report.skipped_empty),
        ("Skipped (header row)", report.skipped_header),
        ("Errors", report.error_rows),
        ("Overridden", report.overridden),
        ("Ignored by layout", ignored_rows),
    ];
    for (label, n) in counts {
        if n > 0 || matches!(label, "Created" | "Updated" | "Errors") {
            lines.push(format!("{}{}: {}", indent(1), label, n));
        }
    }

    section(&mut lines, "Row errors", report.errors.iter().map(|e| e.to_string()));
    section(
        &mut lines,
        "Duplicate ids (kept, fix in the sheet)",
        &report.duplicate_ids,
    );
    section(
        &mut lines,
        "Dropped (not in this import)",
        report
            .dropped
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{} {}", format_index(i + 1), record_label(r))),
    );

    lines.push(format!(
        "Saved {} to {}",
        plural(saved, "record", "records"),
        store.display()
    ));
    if report.created > 0 {
        lines.push(format!(
            "{}: run `qr-roster generate` to create their credentials",
            plural(report.created, "new record", "new records")
        ));
    }
    lines
}

pub fn print_import_report(
    report: &ReconcileReport,
    ignored_rows: usize,
    store: &Path,
    saved: usize,
) {
    for line in format_import_report(report, ignored_rows, store, saved) {
        println!("{}", line);
    }
}

// ============================================================================
// generate
// ============================================================================

/// Format a `generate` run: counts, written files, failures, plan findings.
pub fn format_generate_output(
    outcome: &SyncOutcome,
    records: &[Employee],
    dir: &Path,
) -> Vec<String> {
    let plan = &outcome.plan;
    let generation = &outcome.generation;
    let mut lines = vec![
        format!("Credentials in {}", dir.display()),
        format!("{}Records: {}", indent(1), records.len()),
        format!("{}Already present: {}", indent(1), plan.complete.len()),
        format!("{}Written: {}", indent(1), generation.written.len()),
    ];
    if !generation.failures.is_empty() {
        lines.push(format!("{}Failed: {}", indent(1), generation.failures.len()));
    }

    for (i, slug) in generation.written.iter().enumerate() {
        let name = plan
            .record(records, slug)
            .map(|r| r.name.as_str())
            .unwrap_or(slug.as_str());
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            name,
            credential_filename(slug)
        ));
    }

    section(
        &mut lines,
        "Failed",
        generation.failures.iter().map(|e| e.to_string()),
    );
    plan_findings(&mut lines, plan, records);

    if generation.written.is_empty() && generation.failures.is_empty() {
        lines.push("Nothing to generate".to_string());
    }
    lines
}

pub fn print_generate_output(outcome: &SyncOutcome, records: &[Employee], dir: &Path) {
    for line in format_generate_output(outcome, records, dir) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

fn evidence_label(evidence: Evidence) -> &'static str {
    match evidence {
        Evidence::Decoded => "decoded",
        Evidence::Ledger => "ledger",
    }
}

/// One verification as a display line.
///
/// ```text
/// ANA: match (decoded)
/// BETO: mismatch, file has X, record has Y (ledger)
/// CARLA: unknown (decoding not available)
/// ```
fn verification_line(v: &Verification) -> String {
    match &v.verdict {
        Verdict::Match(evidence) => format!("{}: match ({})", v.slug, evidence_label(*evidence)),
        Verdict::Mismatch { embedded, evidence } => format!(
            "{}: mismatch, file has {}, record has {} ({})",
            v.slug,
            embedded,
            v.expected,
            evidence_label(*evidence)
        ),
        Verdict::Unknown { reason } => format!("{}: unknown ({})", v.slug, reason),
    }
}

/// Format a read-only `check` run.
pub fn format_check_output(
    outcome: &CheckOutcome,
    records: &[Employee],
    dir: &Path,
) -> Vec<String> {
    let plan = &outcome.plan;
    let mut lines = vec![format!(
        "Credentials in {}: {} complete, {} missing, {} orphaned",
        dir.display(),
        plan.complete.len(),
        plan.missing.len(),
        plan.orphaned.len()
    )];

    section(
        &mut lines,
        "Missing (run generate)",
        plan.missing.iter().map(|s| credential_filename(s)),
    );
    plan_findings(&mut lines, plan, records);

    if !outcome.verifications.is_empty() {
        let mode = if outcome.decoding {
            "decoding available"
        } else {
            "decoding not available"
        };
        section(
            &mut lines,
            &format!("Verification ({mode})"),
            outcome.verifications.iter().map(verification_line),
        );
    }

    let mismatches = outcome
        .verifications
        .iter()
        .filter(|v| matches!(v.verdict, Verdict::Mismatch { .. }))
        .count();
    if mismatches > 0 {
        lines.push(format!("Id mismatches: {mismatches}"));
    }
    lines
}

pub fn print_check_output(outcome: &CheckOutcome, records: &[Employee], dir: &Path) {
    for line in format_check_output(outcome, records, dir) {
        println!("{}", line);
    }
}

// ============================================================================
// urls
// ============================================================================

/// Lookup URL per record, in store order.
///
/// ```text
/// 001 ANA → https://example.org/dir?id=0f8fad5b-...
/// ```
pub fn format_urls(records: &[Employee], base_url: &str) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let name = if r.name.trim().is_empty() {
                "(no name)"
            } else {
                r.name.as_str()
            };
            format!(
                "{} {} → {}",
                format_index(i + 1),
                name,
                lookup_url(base_url, &r.id)
            )
        })
        .collect()
}

pub fn print_urls(records: &[Employee], base_url: &str) {
    for line in format_urls(records, base_url) {
        println!("{}", line);
    }
}
