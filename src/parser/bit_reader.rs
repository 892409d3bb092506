use std::io::prelude::*;

use log::trace;

use super::error::DecodingError;

const MAX_SUB_BLOCK_SIZE: usize = 255;

/// Reads LSB-first codes out of a chain of GIF data sub-blocks.
///
/// Each sub-block is a length byte followed by that many bytes; a zero length ends the chain.
/// Codes are allowed to straddle sub-block boundaries.
pub(crate) struct BitReader<'a, T: Read> {
    inner: &'a mut T,

    block: [u8; MAX_SUB_BLOCK_SIZE],
    block_len: usize,
    block_position: usize,

    // pending bits, the lowest bit is the next one in the stream
    accumulator: u32,
    bit_count: u8,

    terminated: bool,
}

impl<'a, T: Read> BitReader<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self {
            inner,
            block: [0; MAX_SUB_BLOCK_SIZE],
            block_len: 0,
            block_position: 0,
            accumulator: 0,
            bit_count: 0,
            terminated: false,
        }
    }

    /// Reads the next `width` bit code. `Ok(None)` means the zero-length terminator was reached
    /// before enough bits were available.
    pub fn next_code(&mut self, width: u8) -> Result<Option<u16>, DecodingError> {
        debug_assert!((1..=12).contains(&width));

        while self.bit_count < width {
            match self.next_byte()? {
                Some(byte) => {
                    self.accumulator |= u32::from(byte) << self.bit_count;
                    self.bit_count += 8;
                }
                None => return Ok(None),
            }
        }

        let code = (self.accumulator & ((1 << width) - 1)) as u16;
        self.accumulator >>= width;
        self.bit_count -= width;

        Ok(Some(code))
    }

    /// Consumes whatever is left of the sub-block chain, up to and including the terminator.
    pub fn skip_remaining(&mut self) -> Result<(), DecodingError> {
        while !self.terminated {
            self.fill_block()?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn next_byte(&mut self) -> Result<Option<u8>, DecodingError> {
        if self.block_position == self.block_len {
            if self.terminated {
                return Ok(None);
            }
            self.fill_block()?;
            if self.terminated {
                return Ok(None);
            }
        }

        let byte = self.block[self.block_position];
        self.block_position += 1;
        Ok(Some(byte))
    }

    fn fill_block(&mut self) -> Result<(), DecodingError> {
        let mut length = [0; 1];
        self.inner.read_exact(&mut length)?;

        let block_len = usize::from(length[0]);
        if block_len == 0 {
            trace!("reached data sub-block terminator");
            self.terminated = true;
            self.block_len = 0;
            self.block_position = 0;
            return Ok(());
        }

        // a short sub-block surfaces as UnexpectedEof
        self.inner.read_exact(&mut self.block[..block_len])?;
        self.block_len = block_len;
        self.block_position = 0;

        Ok(())
    }
}
