//! Binary PPM (`P6`) codec.
//!
//! Header: magic `P6`, optional `#` comment lines, width, height and a max
//! component value that must be 255, then a single whitespace byte and raw RGB
//! triples, row-major from the top-left pixel.

use crate::errors::{EngineError, Result};

/// Decoded image: width, height and tightly packed RGB bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.bytes[start..self.pos])
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        let token = self
            .token()
            .ok_or_else(|| EngineError::InvalidImageHeader(format!("missing {what}")))?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                EngineError::InvalidImageHeader(format!(
                    "{what} is not a number: {:?}",
                    String::from_utf8_lossy(token)
                ))
            })
    }
}

/// Byte length of a tightly packed RGB raster.
///
/// `None` when the size overflows or exceeds the largest possible allocation.
#[must_use]
pub fn rgb_len(width: u32, height: u32) -> Option<usize> {
    let len = usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(3)?;
    (isize::try_from(len).is_ok()).then_some(len)
}

/// Parses a complete `P6` file.
pub fn decode(bytes: &[u8]) -> Result<RgbImage> {
    let mut reader = HeaderReader { bytes, pos: 0 };

    match reader.token() {
        Some(b"P6") => {}
        Some(other) => {
            return Err(EngineError::InvalidImageHeader(format!(
                "expected magic P6, found {:?}",
                String::from_utf8_lossy(other)
            )));
        }
        None => return Err(EngineError::InvalidImageHeader("empty file".into())),
    }

    let width = reader.number("width")?;
    let height = reader.number("height")?;
    let max_value = reader.number("max value")?;
    if max_value != 255 {
        return Err(EngineError::UnsupportedBitDepth(max_value));
    }
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidImageHeader(format!(
            "zero sized image {width}x{height}"
        )));
    }

    // exactly one whitespace byte separates the header from the raster
    match bytes.get(reader.pos) {
        Some(b) if b.is_ascii_whitespace() => reader.pos += 1,
        _ => {
            return Err(EngineError::InvalidImageHeader(
                "missing whitespace after max value".into(),
            ));
        }
    }

    let Some(expected) = rgb_len(width, height) else {
        return Err(EngineError::InvalidImageHeader(format!(
            "image size {width}x{height} overflows"
        )));
    };
    let payload = &bytes[reader.pos..];
    if payload.len() < expected {
        return Err(EngineError::TruncatedImage {
            expected,
            actual: payload.len(),
        });
    }

    Ok(RgbImage {
        width,
        height,
        data: payload[..expected].to_vec(),
    })
}

/// Serializes RGB data as `P6`.
#[must_use]
pub fn encode(width: u32, height: u32, data: &[u8]) -> Vec<u8> {
    let header = format!("P6\n{width} {height}\n255\n");
    let mut out = Vec::with_capacity(header.len() + data.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(data);
    out
}
