use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodingError {
    #[error("signature is not GIF89a")]
    NotAGifFile,

    #[error("minimum code size {0} is outside of 2..=8")]
    InvalidMinCodeSize(u8),

    #[error("stream ended unexpectedly")]
    UnexpectedEndOfStream,

    #[error("code {code} is not in the code table (table size {table_size})")]
    InvalidCode { code: u16, table_size: usize },

    #[error("color index {index} is out of range for a color table of {table_size} entries")]
    ColorIndexOutOfRange { index: u8, table_size: usize },

    #[error("encountered unexpected block label 0x{0:02x}")]
    MalformedBlock(u8),

    #[error("failed to read from source")]
    Io(#[source] io::Error),
}

impl From<io::Error> for DecodingError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodingError::UnexpectedEndOfStream,
            _ => DecodingError::Io(err),
        }
    }
}
