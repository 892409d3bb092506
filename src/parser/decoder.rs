use super::error::DecodingError;
use super::lzw;
use super::{ColorTable, DisposalMethod};

use crate::compositor::{self, Raster};

use log::{debug, warn};

use std::io::{self, prelude::*};

const SIGNATURE: &[u8; 6] = b"GIF89a";

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_DESCRIPTOR_LABEL: u8 = 0x2c;
const TRAILER_LABEL: u8 = 0x3b;

// Extension labels
const APPLICATION_EXTENSION: u8 = 0xff;
const COMMENT_EXTENSION: u8 = 0xfe;
const GRAPHIC_CONTROL_EXTENSION: u8 = 0xf9;
const PLAIN_TEXT_EXTENSION: u8 = 0x01;

const GRAPHIC_CONTROL_BLOCK_SIZE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtensionType {
    Application,
    Comment,
    GraphicControl,
    PlainText,
    Unknown(u8),
}

impl From<u8> for ExtensionType {
    fn from(value: u8) -> Self {
        use ExtensionType::*;

        match value {
            APPLICATION_EXTENSION => Application,
            COMMENT_EXTENSION => Comment,
            GRAPHIC_CONTROL_EXTENSION => GraphicControl,
            PLAIN_TEXT_EXTENSION => PlainText,
            label => Unknown(label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControlExtension {
    pub disposal_method: DisposalMethod,
    pub user_input_flag: bool,
    pub transparent_color_flag: bool,

    /// In hundredths of a second.
    pub delay_time: u16,
    pub transparent_color_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub left_position: u16,
    pub top_position: u16,

    pub width: u16,
    pub height: u16,

    pub local_color_table_flag: bool,
    pub interlace_flag: bool,
    pub sort_flag: bool,
    /// Number of entries the local color table would have, whether or not it is present.
    pub local_color_table_size: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalScreenDescriptor {
    pub screen_width: u16,
    pub screen_height: u16,
    pub global_color_table_flag: bool,
    pub color_resolution: u8,
    pub sort_flag: bool,
    /// Number of entries, always a power of two from 2 to 256.
    pub global_color_table_size: u16,
    pub background_color_index: u8,
    pub pixel_aspect_ratio: u8,
}

#[derive(Debug)]
enum ParserState {
    ProcessMagic,
    ProcessLogicalScreenDescriptor,
    ProcessGlobalColorTable(u16),
    ProcessTrailer,

    DetermineNextBlock,
    ProcessExtension(u8),
    ProcessImageDescriptor,
    ProcessLocalColorTable(ImageDescriptor),
    ProcessImageData(ImageDescriptor),

    Done,
}

/// Decodes the first image of a GIF89a stream into RGBA.
///
/// ```
/// # fn main() -> Result<(), gifraster::DecodingError> {
/// let gif = [
///     0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00,
///     0xff, 0x00, 0x00, 0x00, 0x00, 0xff,
///     0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
///     0x02, 0x02, 0x4c, 0x01, 0x00, 0x3b,
/// ];
/// let mut source = &gif[..];
/// let mut decoder = gifraster::Decoder::new(&mut source);
/// decoder.parse()?;
///
/// let raster = decoder.raster().expect("gif has an image");
/// assert_eq!(raster.pixels, vec![0x00, 0x00, 0xff, 0xff]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Decoder<'a, T: Read> {
    inner: &'a mut T,
    logical_screen_descriptor: Option<LogicalScreenDescriptor>,
    global_color_table: Option<ColorTable>,
    graphic_control_extension: Option<GraphicControlExtension>,
    image_descriptor: Option<ImageDescriptor>,
    indexes: Option<Box<[u8]>>,
    raster: Option<Raster>,
}

impl<'a, T: Read> Decoder<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self {
            inner,
            logical_screen_descriptor: None,
            global_color_table: None,
            graphic_control_extension: None,
            image_descriptor: None,
            indexes: None,
            raster: None,
        }
    }

    pub fn parse(&mut self) -> Result<(), DecodingError> {
        let mut state = ParserState::ProcessMagic;

        loop {
            debug!("begin parsing state {:?}", state);

            state = self.process_next_state(state)?;
            if let ParserState::Done = state {
                break Ok(());
            }
        }
    }

    pub fn logical_screen_descriptor(&self) -> Option<&LogicalScreenDescriptor> {
        self.logical_screen_descriptor.as_ref()
    }

    pub fn global_color_table(&self) -> Option<&ColorTable> {
        self.global_color_table.as_ref()
    }

    pub fn graphic_control_extension(&self) -> Option<&GraphicControlExtension> {
        self.graphic_control_extension.as_ref()
    }

    pub fn image_descriptor(&self) -> Option<&ImageDescriptor> {
        self.image_descriptor.as_ref()
    }

    /// Color indexes of the decoded image, in stream order.
    pub fn indexes(&self) -> Option<&[u8]> {
        self.indexes.as_deref()
    }

    /// `None` until an image has been decoded, and stays `None` if the trailer came first.
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn into_raster(self) -> Option<Raster> {
        self.raster
    }

    fn process_next_state(&mut self, next_state: ParserState) -> Result<ParserState, DecodingError> {
        use ParserState::*;

        match next_state {
            ProcessMagic => {
                let mut signature = [0; 6];
                match self.inner.read_exact(&mut signature) {
                    Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                        return Err(DecodingError::NotAGifFile)
                    }
                    result => result?,
                }

                if &signature != SIGNATURE {
                    debug!("rejecting signature {:?}", String::from_utf8_lossy(&signature));
                    return Err(DecodingError::NotAGifFile);
                }
                debug!("processed signature, got GIF89a");

                Ok(ProcessLogicalScreenDescriptor)
            },
            ProcessLogicalScreenDescriptor => {
                let screen_width = self.read_u16()?;
                let screen_height = self.read_u16()?;

                let packed_fields = self.read_byte()?;

                // packed field start
                let global_color_table_flag = packed_fields & 0b10000000 != 0;
                let color_resolution = (packed_fields >> 4) & 0b00000111;
                let sort_flag = packed_fields & 0b00001000 != 0;
                let global_color_table_size = 2_u16 << (packed_fields & 0b00000111);
                // packed field end

                let background_color_index = self.read_byte()?;
                let pixel_aspect_ratio = self.read_byte()?;

                let descriptor = LogicalScreenDescriptor {
                    screen_width,
                    screen_height,
                    global_color_table_flag,
                    color_resolution,
                    sort_flag,
                    global_color_table_size,
                    background_color_index,
                    pixel_aspect_ratio,
                };
                debug!("processed logical screen descriptor, got: {:#?}", descriptor);
                self.logical_screen_descriptor = Some(descriptor);

                let next_state = if global_color_table_flag {
                    ProcessGlobalColorTable(global_color_table_size)
                } else {
                    DetermineNextBlock
                };

                Ok(next_state)
            },
            ProcessGlobalColorTable(size) => {
                let bytes = self.read_bytes(usize::from(size) * 3)?;
                self.global_color_table = Some(ColorTable::from_rgb_bytes(&bytes));
                debug!("processed global color table with {size} entries");

                Ok(DetermineNextBlock)
            },
            ProcessTrailer => {
                debug!("reached trailer before any image");
                Ok(Done)
            },
            DetermineNextBlock => {
                let introducer_or_label = self.read_byte()?;

                match introducer_or_label {
                    // extension introducer means that a label follows determining what exact type
                    // of extension it is.
                    EXTENSION_INTRODUCER => Ok(ProcessExtension(self.read_byte()?)),
                    IMAGE_DESCRIPTOR_LABEL => Ok(ProcessImageDescriptor),
                    TRAILER_LABEL => Ok(ProcessTrailer),
                    label => Err(DecodingError::MalformedBlock(label)),
                }
            },
            ProcessExtension(label) => self.process_extension(ExtensionType::from(label)),
            ProcessImageDescriptor => {
                let left_position = self.read_u16()?;
                let top_position = self.read_u16()?;

                let width = self.read_u16()?;
                let height = self.read_u16()?;

                let packed_fields = self.read_byte()?;

                let local_color_table_flag = packed_fields & 0b10000000 != 0;
                let interlace_flag = packed_fields & 0b01000000 != 0;
                let sort_flag = packed_fields & 0b00100000 != 0;
                let local_color_table_size = 2_u16 << (packed_fields & 0b00000111);

                let descriptor = ImageDescriptor {
                    left_position,
                    top_position,
                    width,
                    height,
                    local_color_table_flag,
                    interlace_flag,
                    sort_flag,
                    local_color_table_size,
                };
                debug!("processed image descriptor, got: {:#?}", descriptor);

                if interlace_flag {
                    warn!("interlaced images are not supported, rows are kept in stream order");
                }

                let next_state = if local_color_table_flag {
                    ProcessLocalColorTable(descriptor)
                } else {
                    ProcessImageData(descriptor)
                };

                Ok(next_state)
            },
            ProcessLocalColorTable(descriptor) => {
                warn!(
                    "local color tables are not supported, skipping {} entries",
                    descriptor.local_color_table_size
                );
                self.skip_bytes(usize::from(descriptor.local_color_table_size) * 3)?;

                Ok(ProcessImageData(descriptor))
            },
            ProcessImageData(descriptor) => {
                let indexes = lzw::lzw_decode(&mut *self.inner)?;

                let empty_table = ColorTable::default();
                let color_table = self.global_color_table.as_ref().unwrap_or(&empty_table);
                let pixels = compositor::composite_rgba(&indexes, color_table)?;

                self.image_descriptor = Some(descriptor);
                self.indexes = Some(indexes.into_boxed_slice());
                self.raster = Some(Raster {
                    width: descriptor.width,
                    height: descriptor.height,
                    pixels,
                });

                // only the first image is decoded
                Ok(Done)
            },
            Done => Ok(Done),
        }
    }

    fn process_extension(&mut self, label: ExtensionType) -> Result<ParserState, DecodingError> {
        use ExtensionType::*;

        debug!("processing extension type: {:?}", label);
        match label {
            GraphicControl => {
                let block_size = self.read_byte()?;
                if block_size != GRAPHIC_CONTROL_BLOCK_SIZE {
                    warn!("graphic control extension has block size {block_size}, expected 4, skipping it");
                    self.skip_bytes(block_size.into())?;
                    self.skip_data_sub_blocks()?;
                    return Ok(ParserState::DetermineNextBlock);
                }

                let packed_fields = self.read_byte()?;
                // packed fields definition
                // XXXYYYZW
                // XXX = reserved, not needed
                // YYY = disposal method, indicates what to do with graphic after displaying
                // Z = user input flag
                // W = transparent color flag

                let disposal_method = DisposalMethod::from((packed_fields >> 2) & 0b00000111);
                let user_input_flag = packed_fields & 0b00000010 != 0;
                let transparent_color_flag = packed_fields & 0b00000001 != 0;

                let delay_time = self.read_u16()?;
                let transparent_color_index = self.read_byte()?;

                // normally just the block terminator
                self.skip_data_sub_blocks()?;

                let graphic_control_extension = GraphicControlExtension {
                    disposal_method,
                    user_input_flag,
                    transparent_color_flag,

                    delay_time,
                    transparent_color_index,
                };

                debug!("processed GraphicControlExtension: {:#?}", graphic_control_extension);
                self.graphic_control_extension = Some(graphic_control_extension);

                Ok(ParserState::DetermineNextBlock)
            },
            Application | Comment | PlainText | Unknown(_) => {
                self.skip_data_sub_blocks()?;
                Ok(ParserState::DetermineNextBlock)
            },
        }
    }

    fn read_bytes(&mut self, count: usize) -> Result<Box<[u8]>, DecodingError> {
        let mut buffer = vec![0; count];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer.into_boxed_slice())
    }

    fn read_byte(&mut self) -> Result<u8, DecodingError> {
        let mut buffer: [u8; 1] = [0; 1];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer[0])
    }

    fn read_u16(&mut self) -> Result<u16, DecodingError> {
        // Unless otherwise stated, multi-byte numeric fields are ordered with the Least
        // Significant Byte first.

        let mut buffer: [u8; 2] = [0; 2];
        self.inner.read_exact(&mut buffer)?;
        Ok(u16::from_le_bytes(buffer))
    }

    fn skip_bytes(&mut self, mut count: usize) -> Result<(), DecodingError> {
        let mut buffer = [0; 255];
        while count > 0 {
            let chunk = count.min(buffer.len());
            self.inner.read_exact(&mut buffer[..chunk])?;
            count -= chunk;
        }
        Ok(())
    }

    fn skip_data_sub_blocks(&mut self) -> Result<(), DecodingError> {
        let mut block_size = self.read_byte()?;

        // a block size of zero is the block terminator
        while block_size != 0 {
            self.skip_bytes(block_size.into())?;
            block_size = self.read_byte()?;
        }

        Ok(())
    }
}
