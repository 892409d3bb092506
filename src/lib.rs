//! Decodes the first image of a GIF89a file into an RGBA raster.
//!
//! The container is parsed block by block: signature, logical screen descriptor, global color
//! table, extensions (the graphic control extension is kept, everything else is skipped) and the
//! first image descriptor. The LZW compressed color indexes that follow are then expanded and
//! mapped through the global color table.
//!
//! Interlacing, local color tables, transparency and animation are not handled.
//!
//! Only whole image data streams are exposed through [`lzw_decode`]; the bit reader and code
//! table behind it stay internal.
//!
//! ```compile_fail
//! use gifraster::BitReader;
//! ```
//!
//! ```compile_fail
//! use gifraster::CodeTable;
//! ```

mod compositor;
mod parser;

#[cfg(test)]
mod test_utils;

use std::io::prelude::*;

pub use compositor::{composite_rgba, Raster, CHANNELS};
pub use parser::{
    lzw_decode, ColorTable, Decoder, DecodingError, DisposalMethod, GraphicControlExtension,
    ImageDescriptor, LogicalScreenDescriptor, Rgb,
};

/// Decodes `inner` and returns just the raster. A file that ends at the trailer before any image
/// gives an empty 0x0 raster.
pub fn decode_rgba<T: Read>(inner: &mut T) -> Result<Raster, DecodingError> {
    let mut decoder = Decoder::new(inner);
    decoder.parse()?;

    Ok(decoder.into_raster().unwrap_or_else(Raster::empty))
}
