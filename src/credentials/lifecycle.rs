//! Keeping the credential directory consistent with the record set.
//!
//! # Classification
//!
//! Records and files meet on one key, the slug of the record's name:
//!
//! ```text
//! required = { slug(r.name) → first record with that slug }
//! existing = { stem of every *.png in the directory }
//!
//! missing  = required − existing     → generate
//! complete = required ∩ existing     → leave alone, optionally verify
//! orphaned = existing − required     → report only
//! ```
//!
//! Per slug the states move like this:
//!
//! ```text
//! (nothing) ──import──▶ RecordOnly ──generate──▶ Complete
//! Complete ──file removed by hand──▶ RecordOnly   (regenerable, same URL)
//! Complete ──record dropped by import──▶ Orphaned (file stays)
//! ```
//!
//! # Guarantees
//!
//! - Only missing credentials are written. A second run with nothing changed
//!   writes zero files.
//! - Existing files are never overwritten, renamed or deleted. Deleting
//!   orphans is the operator's call.
//! - One failed credential never stops the others; failures are collected in
//!   [`GenerationReport::failures`].
//! - A slug shared by several records is an ambiguity, not a race: it is
//!   reported as [`CredentialError::SlugCollision`] and its credential is not
//!   generated. Lookups by slug resolve to the first record in store order.

use super::decoder::CredentialDecoder;
use super::encoder::{CredentialEncoder, EncodeError};
use super::ledger::Ledger;
use crate::naming::{CREDENTIAL_EXTENSION, credential_filename, extract_id, lookup_url};
use crate::types::Employee;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Cannot read credential directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{slug}: encoding failed: {source}")]
    Encode {
        slug: String,
        #[source]
        source: EncodeError,
    },
    #[error("{slug}: cannot write {path}: {source}")]
    Write {
        slug: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{slug}: shared by {} records ({})", .names.len(), .names.join(", "))]
    SlugCollision { slug: String, names: Vec<String> },
}

impl CredentialError {
    /// Slug a recovered, per-credential error belongs to.
    pub fn slug(&self) -> Option<&str> {
        match self {
            CredentialError::Encode { slug, .. }
            | CredentialError::Write { slug, .. }
            | CredentialError::SlugCollision { slug, .. } => Some(slug),
            CredentialError::MissingDirectory(_) | CredentialError::Directory { .. } => None,
        }
    }
}

/// Where one slug stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    RecordOnly,
    Complete,
    Orphaned,
}

/// Several records mapping to the same credential filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    /// Indices into the record slice, in store order.
    pub records: Vec<usize>,
}

/// Classification of records against the files in a credential directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPlan {
    /// Slug → index of the first record carrying it.
    pub required: BTreeMap<String, usize>,
    /// Slugs lacking a file, in store order.
    pub missing: Vec<String>,
    /// Slugs with both a record and a file.
    pub complete: BTreeSet<String>,
    /// Filenames no current record maps to.
    pub orphaned: BTreeSet<String>,
    pub collisions: Vec<SlugCollision>,
    /// Indices of records whose name yields an empty slug.
    pub unnamed: Vec<usize>,
}

impl CredentialPlan {
    pub fn state(&self, slug: &str) -> Option<CredentialState> {
        if self.complete.contains(slug) {
            Some(CredentialState::Complete)
        } else if self.required.contains_key(slug) {
            Some(CredentialState::RecordOnly)
        } else if self.orphaned.contains(&credential_filename(slug)) {
            Some(CredentialState::Orphaned)
        } else {
            None
        }
    }

    /// First record mapped to `slug`.
    pub fn record<'a>(&self, records: &'a [Employee], slug: &str) -> Option<&'a Employee> {
        self.required.get(slug).and_then(|&i| records.get(i))
    }

    fn collision(&self, slug: &str) -> Option<&SlugCollision> {
        self.collisions.iter().find(|c| c.slug == slug)
    }
}

/// Stems of the credential images in `dir`. A missing directory is empty.
///
/// Only regular files with the credential extension count; subdirectories
/// and dotfiles (the ledger) are ignored.
pub fn list_existing(dir: &Path) -> Result<BTreeSet<String>, CredentialError> {
    if !dir.exists() {
        return Ok(BTreeSet::new());
    }
    let mut stems = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| CredentialError::Directory {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(CREDENTIAL_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            && !stem.starts_with('.')
        {
            stems.insert(stem.to_string());
        }
    }
    Ok(stems)
}

/// Classify `records` against the `existing` file stems.
pub fn plan(records: &[Employee], existing: &BTreeSet<String>) -> CredentialPlan {
    let mut plan = CredentialPlan::default();
    let mut by_slug: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (i, record) in records.iter().enumerate() {
        let slug = record.slug();
        if slug.is_empty() {
            plan.unnamed.push(i);
            continue;
        }
        by_slug.entry(slug.clone()).or_default().push(i);
        if plan.required.contains_key(&slug) {
            continue;
        }
        if existing.contains(&slug) {
            plan.complete.insert(slug.clone());
        } else {
            plan.missing.push(slug.clone());
        }
        plan.required.insert(slug, i);
    }

    plan.collisions = by_slug
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(slug, records)| SlugCollision { slug, records })
        .collect();

    plan.orphaned = existing
        .iter()
        .filter(|stem| !plan.required.contains_key(stem.as_str()))
        .map(|stem| credential_filename(stem))
        .collect();

    tracing::debug!(
        required = plan.required.len(),
        missing = plan.missing.len(),
        complete = plan.complete.len(),
        orphaned = plan.orphaned.len(),
        collisions = plan.collisions.len(),
        "credential plan"
    );
    plan
}

/// Outcome of generating the missing credentials.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Slugs whose credential was written, in store order.
    pub written: Vec<String>,
    pub failures: Vec<CredentialError>,
}

/// Write a credential for every missing, unambiguous slug in `plan`.
///
/// Each credential encodes `lookup_url(base_url, id)` and is written to
/// `<dir>/<slug>.png` without replacing anything already there. Successes
/// are recorded in `ledger`.
pub fn generate_missing(
    encoder: &impl CredentialEncoder,
    records: &[Employee],
    plan: &CredentialPlan,
    dir: &Path,
    base_url: &str,
    ledger: &mut Ledger,
) -> GenerationReport {
    let mut report = GenerationReport::default();

    for slug in &plan.missing {
        if let Some(collision) = plan.collision(slug) {
            let names = collision
                .records
                .iter()
                .filter_map(|&i| records.get(i))
                .map(|r| format!("{} [{}]", r.name, r.id))
                .collect();
            let err = CredentialError::SlugCollision {
                slug: slug.clone(),
                names,
            };
            tracing::warn!(%slug, error = %err, "credential not generated");
            report.failures.push(err);
            continue;
        }
        let Some(record) = plan.record(records, slug) else {
            continue;
        };

        match write_credential(encoder, record, slug, dir, base_url) {
            Ok(bytes) => {
                tracing::info!(%slug, id = %record.id, "credential written");
                ledger.record(slug, &record.id, &bytes);
                report.written.push(slug.clone());
            }
            Err(err) => {
                tracing::warn!(%slug, error = %err, "credential failed");
                report.failures.push(err);
            }
        }
    }
    report
}

fn write_credential(
    encoder: &impl CredentialEncoder,
    record: &Employee,
    slug: &str,
    dir: &Path,
    base_url: &str,
) -> Result<Vec<u8>, CredentialError> {
    let url = lookup_url(base_url, &record.id);
    let bytes = encoder
        .encode(&url)
        .map_err(|source| CredentialError::Encode {
            slug: slug.to_string(),
            source,
        })?;
    let path = dir.join(credential_filename(slug));
    crate::store::write_new_atomic(&path, &bytes).map_err(|source| CredentialError::Write {
        slug: slug.to_string(),
        path: path.clone(),
        source,
    })?;
    Ok(bytes)
}

/// Plan plus generation, for one `generate` run.
#[derive(Debug)]
pub struct SyncOutcome {
    pub plan: CredentialPlan,
    pub generation: GenerationReport,
}

/// Bring `dir` up to date with `records`: create it if needed, classify,
/// generate what is missing, and update the ledger.
///
/// Errors only when the directory itself cannot be created or listed.
pub fn sync(
    encoder: &impl CredentialEncoder,
    records: &[Employee],
    dir: &Path,
    base_url: &str,
) -> Result<SyncOutcome, CredentialError> {
    std::fs::create_dir_all(dir).map_err(|source| CredentialError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;
    let existing = list_existing(dir)?;
    let plan = plan(records, &existing);

    let mut ledger = Ledger::load(dir);
    let generation = generate_missing(encoder, records, &plan, dir, base_url, &mut ledger);
    if !generation.written.is_empty()
        && let Err(e) = ledger.save(dir)
    {
        tracing::warn!(error = %e, "could not update credential ledger");
    }

    Ok(SyncOutcome { plan, generation })
}

/// How the embedded id of an existing credential was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Decoded,
    Ledger,
}

/// Result of checking one complete credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match(Evidence),
    Mismatch { embedded: String, evidence: Evidence },
    Unknown { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub slug: String,
    /// Id of the record the slug resolves to.
    pub expected: String,
    pub verdict: Verdict,
}

/// Best-effort check that each complete credential embeds its record's id.
///
/// Decoding is tried first when the decoder is available. The ledger is
/// consulted next, and only vouches for files unchanged since this tool
/// wrote them. Anything else is `Unknown`; nothing here is an error.
pub fn verify(
    decoder: &dyn CredentialDecoder,
    records: &[Employee],
    plan: &CredentialPlan,
    dir: &Path,
    ledger: &Ledger,
) -> Vec<Verification> {
    plan.complete
        .iter()
        .filter_map(|slug| {
            let record = plan.record(records, slug)?;
            let path = dir.join(credential_filename(slug));
            let verdict = verdict_for(decoder, ledger, slug, &path, &record.id);
            if let Verdict::Mismatch { embedded, .. } = &verdict {
                tracing::warn!(%slug, expected = %record.id, %embedded, "credential id mismatch");
            }
            Some(Verification {
                slug: slug.clone(),
                expected: record.id.clone(),
                verdict,
            })
        })
        .collect()
}

fn verdict_for(
    decoder: &dyn CredentialDecoder,
    ledger: &Ledger,
    slug: &str,
    path: &Path,
    expected: &str,
) -> Verdict {
    let mut reason = if decoder.available() {
        match decoder.decode(path) {
            Ok(payload) => match extract_id(&payload) {
                Some(id) => return compare(id, expected, Evidence::Decoded),
                None => format!("payload carries no id: {payload}"),
            },
            Err(e) => e.to_string(),
        }
    } else {
        "decoding not available".to_string()
    };

    if let Some(id) = ledger.vouched_id(slug, path) {
        return compare(id.to_string(), expected, Evidence::Ledger);
    }
    if ledger.contains(slug) {
        reason.push_str("; file changed since it was generated");
    }
    Verdict::Unknown { reason }
}

fn compare(embedded: String, expected: &str, evidence: Evidence) -> Verdict {
    if embedded == expected {
        Verdict::Match(evidence)
    } else {
        Verdict::Mismatch { embedded, evidence }
    }
}

/// Plan plus verification, for one read-only `check` run.
#[derive(Debug)]
pub struct CheckOutcome {
    pub plan: CredentialPlan,
    pub verifications: Vec<Verification>,
    pub decoding: bool,
}

/// Classify and verify without writing anything.
pub fn check(
    decoder: &dyn CredentialDecoder,
    records: &[Employee],
    dir: &Path,
) -> Result<CheckOutcome, CredentialError> {
    if !dir.is_dir() {
        return Err(CredentialError::MissingDirectory(dir.to_path_buf()));
    }
    let existing = list_existing(dir)?;
    let plan = plan(records, &existing);
    let ledger = Ledger::load(dir);
    let verifications = verify(decoder, records, &plan, dir, &ledger);
    Ok(CheckOutcome {
        plan,
        verifications,
        decoding: decoder.available(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::decoder::NoDecoder;
    use crate::credentials::decoder::tests::MockDecoder;
    use crate::credentials::encoder::tests::MockEncoder;
    use crate::test_helpers::{credential_dir, dir_listing, employee};
    use std::fs;

    const BASE: &str = "https://example.org/dir";

    fn stems(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[test]
    fn complete_and_orphaned() {
        let records = vec![employee("A", "ANA")];
        let p = plan(&records, &stems(&["ANA", "ORPHAN"]));
        assert!(p.missing.is_empty());
        assert_eq!(p.orphaned, BTreeSet::from(["ORPHAN.png".to_string()]));
        assert_eq!(p.complete, BTreeSet::from(["ANA".to_string()]));
    }

    #[test]
    fn missing_in_store_order() {
        let records = vec![
            employee("C", "CARLA"),
            employee("A", "ANA"),
            employee("B", "BETO"),
        ];
        let p = plan(&records, &stems(&["ANA"]));
        assert_eq!(p.missing, vec!["CARLA".to_string(), "BETO".to_string()]);
    }

    #[test]
    fn accented_name_maps_to_folded_file() {
        let records = vec![employee("A", "JOSÉ LUIS")];
        let p = plan(&records, &stems(&["JOSE_LUIS"]));
        assert_eq!(p.state("JOSE_LUIS"), Some(CredentialState::Complete));
        assert!(p.missing.is_empty());
    }

    #[test]
    fn states_per_slug() {
        let records = vec![employee("A", "ANA"), employee("B", "BETO")];
        let p = plan(&records, &stems(&["ANA", "OLD"]));
        assert_eq!(p.state("ANA"), Some(CredentialState::Complete));
        assert_eq!(p.state("BETO"), Some(CredentialState::RecordOnly));
        assert_eq!(p.state("OLD"), Some(CredentialState::Orphaned));
        assert_eq!(p.state("NOBODY"), None);
    }

    #[test]
    fn collisions_are_detected_and_first_record_wins_lookup() {
        let records = vec![
            employee("A1", "ANA PÉREZ"),
            employee("B", "BETO"),
            employee("A2", "ANA PEREZ"),
        ];
        let p = plan(&records, &BTreeSet::new());
        assert_eq!(
            p.collisions,
            vec![SlugCollision {
                slug: "ANA_PEREZ".into(),
                records: vec![0, 2],
            }]
        );
        assert_eq!(p.record(&records, "ANA_PEREZ").unwrap().id, "A1");
        assert_eq!(p.missing, vec!["ANA_PEREZ".to_string(), "BETO".to_string()]);
    }

    #[test]
    fn unnamed_records_are_set_aside() {
        let records = vec![employee("A", ""), employee("B", "¿?"), employee("C", "CARLA")];
        let p = plan(&records, &BTreeSet::new());
        assert_eq!(p.unnamed, vec![0, 1]);
        assert_eq!(p.missing, vec!["CARLA".to_string()]);
    }

    #[test]
    fn list_existing_reads_png_stems_only() {
        let tmp = credential_dir(&["ANA.png", "BETO.png", "notes.txt", "CARLA.jpg"]);
        fs::create_dir(tmp.path().join("sub.png")).unwrap();
        fs::write(tmp.path().join(".credential-ledger.json"), "{}").unwrap();

        let existing = list_existing(tmp.path()).unwrap();
        assert_eq!(existing, stems(&["ANA", "BETO"]));
    }

    #[test]
    fn list_existing_missing_dir_is_empty() {
        let tmp = credential_dir(&[]);
        assert!(list_existing(&tmp.path().join("absent")).unwrap().is_empty());
    }

    // =========================================================================
    // Generation
    // =========================================================================

    #[test]
    fn sync_generates_only_missing() {
        let tmp = credential_dir(&["ANA.png"]);
        let records = vec![employee("A", "ANA"), employee("B", "BETO")];
        let enc = MockEncoder::new();

        let out = sync(&enc, &records, tmp.path(), BASE).unwrap();

        assert_eq!(out.generation.written, vec!["BETO".to_string()]);
        assert_eq!(enc.encoded(), vec![format!("{BASE}?id=B")]);
        assert_eq!(
            fs::read(tmp.path().join("BETO.png")).unwrap(),
            format!("{BASE}?id=B").into_bytes()
        );
    }

    #[test]
    fn sync_is_idempotent() {
        let tmp = credential_dir(&[]);
        let records = vec![employee("A", "ANA"), employee("B", "BETO")];

        let first = sync(&MockEncoder::new(), &records, tmp.path(), BASE).unwrap();
        assert_eq!(first.generation.written.len(), 2);

        let enc = MockEncoder::new();
        let second = sync(&enc, &records, tmp.path(), BASE).unwrap();
        assert!(second.generation.written.is_empty());
        assert!(enc.encoded().is_empty());
        assert_eq!(second.plan.complete.len(), 2);
    }

    #[test]
    fn sync_never_touches_existing_or_orphaned_files() {
        let tmp = credential_dir(&["ANA.png", "ORPHAN.png"]);
        fs::write(tmp.path().join("ANA.png"), b"hand made").unwrap();
        let records = vec![employee("A", "ANA")];

        let out = sync(&MockEncoder::new(), &records, tmp.path(), BASE).unwrap();

        assert_eq!(fs::read(tmp.path().join("ANA.png")).unwrap(), b"hand made");
        assert!(tmp.path().join("ORPHAN.png").exists());
        assert_eq!(out.plan.orphaned, BTreeSet::from(["ORPHAN.png".to_string()]));
    }

    #[test]
    fn sync_creates_missing_directory() {
        let tmp = credential_dir(&[]);
        let dir = tmp.path().join("qr_codes");
        let out = sync(&MockEncoder::new(), &[employee("A", "ANA")], &dir, BASE).unwrap();
        assert_eq!(out.generation.written, vec!["ANA".to_string()]);
        assert!(dir.join("ANA.png").exists());
    }

    #[test]
    fn encode_failure_does_not_stop_batch() {
        let tmp = credential_dir(&[]);
        let records = vec![
            employee("A", "ANA"),
            employee("BAD", "BETO"),
            employee("C", "CARLA"),
        ];
        let enc = MockEncoder::failing_on(&["id=BAD"]);

        let out = sync(&enc, &records, tmp.path(), BASE).unwrap();

        assert_eq!(
            out.generation.written,
            vec!["ANA".to_string(), "CARLA".to_string()]
        );
        assert_eq!(out.generation.failures.len(), 1);
        assert!(matches!(
            &out.generation.failures[0],
            CredentialError::Encode { slug, .. } if slug == "BETO"
        ));
        assert!(!tmp.path().join("BETO.png").exists());
    }

    #[test]
    fn write_failure_does_not_stop_batch() {
        let tmp = credential_dir(&[]);
        let records = vec![employee("A", "ANA"), employee("B", "BETO")];
        let p = plan(&records, &BTreeSet::new());
        // ANA.png appears between planning and writing
        fs::write(tmp.path().join("ANA.png"), b"someone else").unwrap();

        let mut ledger = Ledger::empty();
        let report = generate_missing(
            &MockEncoder::new(),
            &records,
            &p,
            tmp.path(),
            BASE,
            &mut ledger,
        );

        assert_eq!(report.written, vec!["BETO".to_string()]);
        assert!(matches!(
            &report.failures[0],
            CredentialError::Write { slug, .. } if slug == "ANA"
        ));
        assert_eq!(fs::read(tmp.path().join("ANA.png")).unwrap(), b"someone else");
        assert!(!ledger.contains("ANA"));
    }

    #[test]
    fn colliding_slug_is_not_generated() {
        let tmp = credential_dir(&[]);
        let records = vec![
            employee("A1", "ANA PÉREZ"),
            employee("A2", "ANA PEREZ"),
            employee("B", "BETO"),
        ];
        let enc = MockEncoder::new();

        let out = sync(&enc, &records, tmp.path(), BASE).unwrap();

        assert_eq!(out.generation.written, vec!["BETO".to_string()]);
        assert!(!tmp.path().join("ANA_PEREZ.png").exists());
        match &out.generation.failures[0] {
            CredentialError::SlugCollision { slug, names } => {
                assert_eq!(slug, "ANA_PEREZ");
                assert_eq!(names.len(), 2);
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn removed_file_is_regenerated_with_same_url() {
        let tmp = credential_dir(&[]);
        let records = vec![employee("A", "ANA")];
        sync(&MockEncoder::new(), &records, tmp.path(), BASE).unwrap();
        fs::remove_file(tmp.path().join("ANA.png")).unwrap();

        let enc = MockEncoder::new();
        let out = sync(&enc, &records, tmp.path(), BASE).unwrap();

        assert_eq!(out.generation.written, vec!["ANA".to_string()]);
        assert_eq!(enc.encoded(), vec![format!("{BASE}?id=A")]);
    }

    #[test]
    fn dropped_record_leaves_orphan() {
        let tmp = credential_dir(&[]);
        sync(
            &MockEncoder::new(),
            &[employee("A", "ANA"), employee("B", "BOB")],
            tmp.path(),
            BASE,
        )
        .unwrap();

        let out = sync(&MockEncoder::new(), &[employee("A", "ANA")], tmp.path(), BASE).unwrap();

        assert_eq!(out.plan.state("BOB"), Some(CredentialState::Orphaned));
        assert!(tmp.path().join("BOB.png").exists());
    }

    #[test]
    fn sync_records_ledger_entries() {
        let tmp = credential_dir(&[]);
        sync(&MockEncoder::new(), &[employee("A", "ANA")], tmp.path(), BASE).unwrap();

        let ledger = Ledger::load(tmp.path());
        assert_eq!(
            ledger.vouched_id("ANA", &tmp.path().join("ANA.png")),
            Some("A")
        );
        assert_eq!(dir_listing(tmp.path()), vec![".credential-ledger.json", "ANA.png"]);
    }

    // =========================================================================
    // Verification
    // =========================================================================

    #[test]
    fn decoded_id_matches() {
        let tmp = credential_dir(&["ANA.png"]);
        let records = vec![employee("A", "ANA")];
        let decoder = MockDecoder::with(&[("ANA.png", "https://example.org/dir?id=A")]);

        let out = check(&decoder, &records, tmp.path()).unwrap();

        assert_eq!(out.verifications.len(), 1);
        assert_eq!(out.verifications[0].verdict, Verdict::Match(Evidence::Decoded));
    }

    #[test]
    fn decoded_id_mismatch() {
        let tmp = credential_dir(&["ANA.png"]);
        let records = vec![employee("bbbb-2222", "ANA")];
        let decoder = MockDecoder::with(&[("ANA.png", "https://example.org/dir?id=aaaa-1111")]);

        let out = check(&decoder, &records, tmp.path()).unwrap();

        assert_eq!(
            out.verifications[0].verdict,
            Verdict::Mismatch {
                embedded: "aaaa-1111".into(),
                evidence: Evidence::Decoded
            }
        );
    }

    #[test]
    fn no_decoder_and_no_ledger_is_unknown() {
        let tmp = credential_dir(&["ANA.png"]);
        let out = check(&NoDecoder, &[employee("A", "ANA")], tmp.path()).unwrap();
        assert!(!out.decoding);
        assert!(matches!(
            &out.verifications[0].verdict,
            Verdict::Unknown { reason } if reason.contains("not available")
        ));
    }

    #[test]
    fn ledger_vouches_when_decoding_unavailable() {
        let tmp = credential_dir(&[]);
        let records = vec![employee("A", "ANA")];
        sync(&MockEncoder::new(), &records, tmp.path(), BASE).unwrap();

        let out = check(&NoDecoder, &records, tmp.path()).unwrap();
        assert_eq!(out.verifications[0].verdict, Verdict::Match(Evidence::Ledger));
    }

    #[test]
    fn ledger_detects_reassigned_id() {
        let tmp = credential_dir(&[]);
        sync(&MockEncoder::new(), &[employee("A", "ANA")], tmp.path(), BASE).unwrap();

        let out = check(&NoDecoder, &[employee("Z", "ANA")], tmp.path()).unwrap();
        assert_eq!(
            out.verifications[0].verdict,
            Verdict::Mismatch {
                embedded: "A".into(),
                evidence: Evidence::Ledger
            }
        );
    }

    #[test]
    fn ledger_ignores_replaced_file() {
        let tmp = credential_dir(&[]);
        let records = vec![employee("A", "ANA")];
        sync(&MockEncoder::new(), &records, tmp.path(), BASE).unwrap();
        fs::write(tmp.path().join("ANA.png"), b"reprint").unwrap();

        let out = check(&NoDecoder, &records, tmp.path()).unwrap();
        assert!(matches!(
            &out.verifications[0].verdict,
            Verdict::Unknown { reason } if reason.contains("changed")
        ));
    }

    #[test]
    fn unreadable_file_falls_back_to_unknown() {
        let tmp = credential_dir(&["ANA.png"]);
        let out = check(&MockDecoder::default(), &[employee("A", "ANA")], tmp.path()).unwrap();
        assert!(matches!(
            &out.verifications[0].verdict,
            Verdict::Unknown { .. }
        ));
    }

    #[test]
    fn check_only_verifies_complete_slugs() {
        let tmp = credential_dir(&["ANA.png", "ORPHAN.png"]);
        let records = vec![employee("A", "ANA"), employee("B", "BETO")];
        let out = check(&NoDecoder, &records, tmp.path()).unwrap();
        let slugs: Vec<&str> = out.verifications.iter().map(|v| v.slug.as_str()).collect();
        assert_eq!(slugs, vec!["ANA"]);
        assert_eq!(out.plan.missing, vec!["BETO".to_string()]);
    }

    #[test]
    fn check_writes_nothing() {
        let tmp = credential_dir(&["ANA.png"]);
        check(&NoDecoder, &[employee("A", "ANA"), employee("B", "BETO")], tmp.path()).unwrap();
        assert_eq!(dir_listing(tmp.path()), vec!["ANA.png"]);
    }

    #[test]
    fn check_missing_directory_is_fatal() {
        let tmp = credential_dir(&[]);
        let result = check(&NoDecoder, &[], &tmp.path().join("absent"));
        assert!(matches!(result, Err(CredentialError::MissingDirectory(_))));
    }
}
