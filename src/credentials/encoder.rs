//! QR encoding of a lookup URL into PNG bytes.
//!
//! The [`CredentialEncoder`] trait is the seam between the lifecycle manager
//! (which decides *which* credentials to produce) and the pixel work. The
//! production implementation is [`QrPngEncoder`]; tests use a recording mock.
//!
//! Every credential is rendered with the same [`QrParams`]: error correction
//! level H, 10 px modules and a 4-module white border. Printed credentials
//! get scuffed, and H tolerates roughly 30% damage.

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Payload does not fit in a QR code: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("Image too large: {0} px per side")]
    TooLarge(usize),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Rendering parameters shared by every credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrParams {
    /// Edge length of one QR module, in pixels.
    pub module_size: u32,
    /// Quiet zone around the symbol, in modules.
    pub border: u32,
}

impl QrParams {
    pub const CREDENTIAL: QrParams = QrParams {
        module_size: 10,
        border: 4,
    };

    /// Side length in pixels of a symbol `modules` wide.
    pub fn image_side(self, modules: usize) -> Option<u32> {
        let modules = u32::try_from(modules).ok()?;
        modules
            .checked_add(self.border.checked_mul(2)?)?
            .checked_mul(self.module_size)
    }
}

impl Default for QrParams {
    fn default() -> Self {
        Self::CREDENTIAL
    }
}

/// Turns a payload string into the bytes of a credential image.
pub trait CredentialEncoder {
    fn encode(&self, payload: &str) -> Result<Vec<u8>, EncodeError>;
}

/// Production encoder: `qrcode` for the symbol, `image` for the PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrPngEncoder {
    pub params: QrParams,
}

impl QrPngEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a payload to a black-on-white grayscale image.
    pub fn render(&self, payload: &str) -> Result<GrayImage, EncodeError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)?;
        let modules = code.width();
        let colors = code.to_colors();
        let side = self
            .params
            .image_side(modules)
            .ok_or(EncodeError::TooLarge(modules))?;
        let module = self.params.module_size;
        let border = self.params.border;

        let img = GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / module).checked_sub(border);
            let my = (y / module).checked_sub(border);
            let dark = match (mx, my) {
                (Some(mx), Some(my)) if (mx as usize) < modules && (my as usize) < modules => {
                    colors.get(my as usize * modules + mx as usize) == Some(&Color::Dark)
                }
                _ => false,
            };
            if dark { Luma([0]) } else { Luma([255]) }
        });
        Ok(img)
    }
}

impl CredentialEncoder for QrPngEncoder {
    fn encode(&self, payload: &str) -> Result<Vec<u8>, EncodeError> {
        let img = self.render(payload)?;
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Encoder that records payloads and returns them as the "image" bytes.
    ///
    /// Payloads containing any string in `fail_on` fail with a QR capacity
    /// error instead.
    #[derive(Default)]
    pub struct MockEncoder {
        pub payloads: RefCell<Vec<String>>,
        pub fail_on: Vec<String>,
    }

    impl MockEncoder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(needles: &[&str]) -> Self {
            Self {
                payloads: RefCell::new(Vec::new()),
                fail_on: needles.iter().map(|s| s.to_string()).collect(),
            }
        }

        pub fn encoded(&self) -> Vec<String> {
            self.payloads.borrow().clone()
        }
    }

    impl CredentialEncoder for MockEncoder {
        fn encode(&self, payload: &str) -> Result<Vec<u8>, EncodeError> {
            self.payloads.borrow_mut().push(payload.to_string());
            if self.fail_on.iter().any(|n| payload.contains(n.as_str())) {
                return Err(EncodeError::Qr(qrcode::types::QrError::DataTooLong));
            }
            Ok(payload.as_bytes().to_vec())
        }
    }

    const URL: &str =
        "https://ramz0.github.io/credenciales-empleados?id=0f8fad5b-d9cb-469f-a165-70867728950e";

    #[test]
    fn credential_params() {
        assert_eq!(QrParams::default().module_size, 10);
        assert_eq!(QrParams::default().border, 4);
    }

    #[test]
    fn image_side_includes_border() {
        // 21 modules + 2 * 4 border = 29 modules of 10 px
        assert_eq!(QrParams::CREDENTIAL.image_side(21), Some(290));
    }

    #[test]
    fn render_is_square_and_sized_by_modules() {
        let img = QrPngEncoder::new().render(URL).unwrap();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % 10, 0);
        let modules = img.width() / 10 - 8;
        // Valid QR sizes are 17 + 4 * version
        assert_eq!((modules - 17) % 4, 0);
    }

    #[test]
    fn border_is_white_and_finder_corner_is_dark() {
        let img = QrPngEncoder::new().render(URL).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Luma([255]));
        assert_eq!(img.get_pixel(39, 39), &Luma([255]));
        // Top-left module of the finder pattern starts right after the border
        assert_eq!(img.get_pixel(40, 40), &Luma([0]));
        assert_eq!(img.get_pixel(49, 49), &Luma([0]));
    }

    #[test]
    fn encode_produces_png() {
        let bytes = QrPngEncoder::new().encode(URL).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn encode_is_deterministic_for_same_payload() {
        let enc = QrPngEncoder::new();
        assert_eq!(enc.encode(URL).unwrap(), enc.encode(URL).unwrap());
    }

    #[test]
    fn oversized_payload_is_error() {
        let payload = "x".repeat(5000);
        assert!(matches!(
            QrPngEncoder::new().encode(&payload),
            Err(EncodeError::Qr(_))
        ));
    }

    #[test]
    fn mock_records_and_fails_on_request() {
        let enc = MockEncoder::failing_on(&["BAD"]);
        assert!(enc.encode("ok").is_ok());
        assert!(enc.encode("has BAD").is_err());
        assert_eq!(enc.encoded(), vec!["ok".to_string(), "has BAD".to_string()]);
    }
}
