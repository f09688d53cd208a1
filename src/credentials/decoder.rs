//! Optional read-back of the payload embedded in a credential image.
//!
//! Decoding is a capability, not a requirement. With the `decode` feature the
//! [`RqrrDecoder`] reads PNGs through `image` and `rqrr`; without it,
//! [`default_decoder`] hands out [`NoDecoder`] and verification reports
//! "unknown" instead of failing.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Cannot open image: {0}")]
    Image(#[from] image::ImageError),
    #[error("No QR code found in image")]
    NoSymbol,
    #[error("QR code unreadable: {0}")]
    Unreadable(String),
}

/// Reads the payload of a credential image.
pub trait CredentialDecoder {
    /// Whether this decoder can read anything at all.
    fn available(&self) -> bool {
        true
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError>;
}

/// Stand-in used when no decoding capability is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecoder;

impl CredentialDecoder for NoDecoder {
    fn available(&self) -> bool {
        false
    }

    fn decode(&self, _path: &Path) -> Result<String, DecodeError> {
        Err(DecodeError::Unreadable("decoding not available".into()))
    }
}

/// `rqrr`-backed decoder. Returns the payload of the first readable symbol.
#[cfg(feature = "decode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

#[cfg(feature = "decode")]
impl CredentialDecoder for RqrrDecoder {
    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let img = image::open(path)?.to_luma8();
        let (width, height) = img.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                img.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        let mut last_error = None;
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(content),
                Err(e) => last_error = Some(format!("{e:?}")),
            }
        }
        Err(last_error
            .map(DecodeError::Unreadable)
            .unwrap_or(DecodeError::NoSymbol))
    }
}

/// The best decoder this build offers.
pub fn default_decoder() -> Box<dyn CredentialDecoder> {
    #[cfg(feature = "decode")]
    {
        Box::new(RqrrDecoder)
    }
    #[cfg(not(feature = "decode"))]
    {
        Box::new(NoDecoder)
    }
}
