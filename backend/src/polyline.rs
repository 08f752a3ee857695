//! Decoder for the encoded polyline format (precision 5) used by directions
//! providers to ship step geometry.

use thiserror::Error;

use crate::models::Coordinate;

const PRECISION: f64 = 100_000.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolylineError {
    #[error("unexpected end of input at byte {0}")]
    Truncated(usize),
    #[error("invalid character {0:?} at byte {1}")]
    InvalidChar(char, usize),
    #[error("value starting at byte {0} overflows")]
    Overflow(usize),
}

pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let start = index;
        lat = lat
            .checked_add(next_delta(bytes, &mut index)?)
            .ok_or(PolylineError::Overflow(start))?;
        let start = index;
        lon = lon
            .checked_add(next_delta(bytes, &mut index)?)
            .ok_or(PolylineError::Overflow(start))?;
        points.push(Coordinate {
            lat: lat as f64 / PRECISION,
            lon: lon as f64 / PRECISION,
        });
    }

    Ok(points)
}

/// Reads one zig-zag encoded value made of 5-bit chunks, lowest chunk first.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or(PolylineError::Truncated(*index))?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidChar(byte as char, *index));
        }
        if shift > 60 {
            return Err(PolylineError::Overflow(start));
        }
        let chunk = i64::from(byte - 63);
        *index += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
