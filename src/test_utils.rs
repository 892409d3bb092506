//! Byte-stream builders shared by the unit tests.

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Reference GIF LZW encoder. Returns packed codes, starting with a clear code and ending with
/// the end of information code, without sub-block framing.
pub fn lzw_encode(indexes: &[u8], minimum_code_size: u8) -> Vec<u8> {
    weezl::encode::Encoder::new(weezl::BitOrder::Lsb, minimum_code_size)
        .encode(indexes)
        .expect("indexes should fit the minimum code size")
}

/// Packs hand-assembled `(code, width)` pairs LSB first, for streams the reference encoder never
/// produces (missing end code, clear codes at chosen positions).
pub fn pack_codes(codes: &[(u16, u8)]) -> Vec<u8> {
    let mut accumulator: u32 = 0;
    let mut bit_count: u8 = 0;
    let mut bytes = Vec::new();

    for &(code, width) in codes {
        accumulator |= u32::from(code) << bit_count;
        bit_count += width;
        while bit_count >= 8 {
            bytes.push(accumulator as u8);
            accumulator >>= 8;
            bit_count -= 8;
        }
    }
    if bit_count > 0 {
        bytes.push(accumulator as u8);
    }

    bytes
}

/// Frames `data` into sub-blocks of at most 255 bytes followed by the terminator.
pub fn sub_blocks(data: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(data.len() + data.len() / 255 + 2);
    for chunk in data.chunks(255) {
        framed.push(chunk.len() as u8);
        framed.extend_from_slice(chunk);
    }
    framed.push(0);
    framed
}

/// Minimum code size byte followed by the framed LZW stream.
pub fn image_data(indexes: &[u8], minimum_code_size: u8) -> Vec<u8> {
    framed_image_data(&lzw_encode(indexes, minimum_code_size), minimum_code_size)
}

pub fn framed_image_data(codes: &[u8], minimum_code_size: u8) -> Vec<u8> {
    let mut data = vec![minimum_code_size];
    data.extend(sub_blocks(codes));
    data
}

/// Assembles GIF files block by block.
pub struct GifBuilder {
    bytes: Vec<u8>,
}

impl GifBuilder {
    /// Header plus logical screen descriptor, with a global color table when `palette` is not
    /// empty. The palette length must be a power of two between 2 and 256.
    pub fn new(width: u16, height: u16, palette: &[[u8; 3]]) -> Self {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());

        let packed_fields = if palette.is_empty() {
            0
        } else {
            0b1111_0000 | (palette.len().trailing_zeros() as u8 - 1)
        };
        bytes.extend_from_slice(&[packed_fields, 0, 0]);
        bytes.extend(palette.iter().flatten());

        Self { bytes }
    }

    pub fn graphic_control(mut self, packed_fields: u8, delay_time: u16, transparent_index: u8) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xf9, 4, packed_fields]);
        self.bytes.extend_from_slice(&delay_time.to_le_bytes());
        self.bytes.extend_from_slice(&[transparent_index, 0]);
        self
    }

    pub fn extension(mut self, label: u8, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&[0x21, label]);
        self.bytes.extend(sub_blocks(data));
        self
    }

    pub fn image(self, width: u16, height: u16, indexes: &[u8], minimum_code_size: u8) -> Self {
        let data = image_data(indexes, minimum_code_size);
        self.image_with_data(width, height, 0, &data)
    }

    pub fn image_with_data(mut self, width: u16, height: u16, packed_fields: u8, data: &[u8]) -> Self {
        self.bytes.push(0x2c);
        self.bytes.extend_from_slice(&[0, 0, 0, 0]);
        self.bytes.extend_from_slice(&width.to_le_bytes());
        self.bytes.extend_from_slice(&height.to_le_bytes());
        self.bytes.push(packed_fields);
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn trailer(mut self) -> Self {
        self.bytes.push(0x3b);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
