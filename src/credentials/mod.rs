//! Credential images: encoding, optional decoding, provenance, lifecycle.
//!
//! # Architecture
//!
//! ```text
//! lifecycle: record/file classification, generation of missing files
//!   ├── encoder: CredentialEncoder trait; QrPngEncoder (qrcode + image)
//!   ├── decoder: CredentialDecoder trait; RqrrDecoder behind `decode`
//!   └── ledger: slug → (id, sha256) of every file this tool wrote
//! ```
//!
//! Encoding and decoding sit behind traits so the lifecycle logic is tested
//! with recording mocks instead of real pixels. Each trait module carries
//! its mock in a `pub mod tests`.

pub mod decoder;
pub mod encoder;
pub mod ledger;
pub mod lifecycle;

pub use decoder::{CredentialDecoder, DecodeError, NoDecoder, default_decoder};
pub use encoder::{CredentialEncoder, EncodeError, QrParams, QrPngEncoder};
pub use ledger::Ledger;
pub use lifecycle::{
    CheckOutcome, CredentialError, CredentialPlan, CredentialState, Evidence, GenerationReport,
    SlugCollision, SyncOutcome, Verdict, Verification, check, generate_missing, list_existing,
    plan, sync, verify,
};
