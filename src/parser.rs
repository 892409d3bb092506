mod bit_reader;
mod code_table;
mod decoder;
mod error;
mod lzw;

pub use decoder::{Decoder, GraphicControlExtension, ImageDescriptor, LogicalScreenDescriptor};
pub use error::DecodingError;
pub use lzw::lzw_decode;

/// What a viewer should do with an image once its delay has passed. Parsed from the 3 bit
/// field of the graphic control extension; values 4 to 7 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalMethod {
    Unspecified,
    DoNotDispose,
    RestoreToBackgroundColor,
    RestoreToPrevious,
    Reserved(u8),
}

impl From<u8> for DisposalMethod {
    fn from(value: u8) -> Self {
        match value & 0b00000111 {
            0 => DisposalMethod::Unspecified,
            1 => DisposalMethod::DoNotDispose,
            2 => DisposalMethod::RestoreToBackgroundColor,
            3 => DisposalMethod::RestoreToPrevious,
            reserved => DisposalMethod::Reserved(reserved),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Palette of RGB triples, read once and never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    entries: Box<[Rgb]>,
}

impl ColorTable {
    /// Builds a table from packed `r g b` bytes. A trailing partial triple is ignored.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        let entries = bytes
            .chunks_exact(3)
            .map(|rgb| Rgb {
                r: rgb[0],
                g: rgb[1],
                b: rgb[2],
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.entries.get(usize::from(index)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorTable, DisposalMethod, Rgb};

    #[test]
    fn disposal_method_from_bits() {
        assert_eq!(DisposalMethod::from(0), DisposalMethod::Unspecified);
        assert_eq!(DisposalMethod::from(1), DisposalMethod::DoNotDispose);
        assert_eq!(DisposalMethod::from(2), DisposalMethod::RestoreToBackgroundColor);
        assert_eq!(DisposalMethod::from(3), DisposalMethod::RestoreToPrevious);
        assert_eq!(DisposalMethod::from(6), DisposalMethod::Reserved(6));
    }

    #[test]
    fn color_table_from_bytes() {
        let table = ColorTable::from_rgb_bytes(&[1, 2, 3, 4, 5, 6, 7]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(Rgb { r: 4, g: 5, b: 6 }));
        assert_eq!(table.get(2), None);
    }
}
