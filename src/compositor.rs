use crate::parser::{ColorTable, DecodingError};

pub const CHANNELS: usize = 4;
const OPAQUE: u8 = 255;

/// Decoded image as row-major RGBA bytes, origin top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }
}

/// Expands each color index into four bytes using `color_table`. Alpha is always opaque.
pub fn composite_rgba(indexes: &[u8], color_table: &ColorTable) -> Result<Vec<u8>, DecodingError> {
    let mut pixels = Vec::with_capacity(indexes.len() * CHANNELS);

    indexes.iter().try_for_each(|&index| -> Result<(), DecodingError> {
        let color = color_table
            .get(index)
            .ok_or(DecodingError::ColorIndexOutOfRange {
                index,
                table_size: color_table.len(),
            })?;

        pixels.extend_from_slice(&[color.r, color.g, color.b, OPAQUE]);
        Ok(())
    })?;

    Ok(pixels)
}
