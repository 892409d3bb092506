use std::io::prelude::*;

use log::{debug, trace, warn};

use super::bit_reader::BitReader;
use super::code_table::{CodeTable, MAX_CODE_SIZE};
use super::error::DecodingError;

const MIN_CODE_SIZE_RANGE: std::ops::RangeInclusive<u8> = 2..=8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    AwaitingFirstCode,
    Cleared,
    Decoding { previous: u16 },
    Done,
}

/// One LZW decode session for a single image's data stream.
#[derive(Debug)]
pub(crate) struct LzwDecoder {
    minimum_code_size: u8,
    clear_code: u16,
    end_of_information_code: u16,
    code_size: u8,
    code_table: CodeTable,
    state: DecoderState,
}

impl LzwDecoder {
    pub fn new(minimum_code_size: u8) -> Result<Self, DecodingError> {
        if !MIN_CODE_SIZE_RANGE.contains(&minimum_code_size) {
            return Err(DecodingError::InvalidMinCodeSize(minimum_code_size));
        }

        let clear_code: u16 = 1 << minimum_code_size;

        Ok(Self {
            minimum_code_size,
            clear_code,
            end_of_information_code: clear_code + 1,
            code_size: minimum_code_size + 1,
            code_table: CodeTable::new(minimum_code_size),
            state: DecoderState::AwaitingFirstCode,
        })
    }

    #[cfg(test)]
    pub fn code_size(&self) -> u8 {
        self.code_size
    }

    #[cfg(test)]
    pub fn table_len(&self) -> usize {
        self.code_table.len()
    }

    pub fn is_done(&self) -> bool {
        self.state == DecoderState::Done
    }

    /// Decodes codes from `reader` until End-of-Information or the sub-block terminator.
    pub fn decode<T: Read>(&mut self, reader: &mut BitReader<T>) -> Result<Vec<u8>, DecodingError> {
        let mut indexes = Vec::new();

        while !self.is_done() {
            match reader.next_code(self.code_size)? {
                Some(code) => self.process_code(code, &mut indexes)?,
                None => {
                    warn!("image data ended without an end of information code");
                    self.state = DecoderState::Done;
                }
            }
        }

        Ok(indexes)
    }

    /// Applies a single code, appending whatever it expands to onto `indexes`.
    pub fn process_code(&mut self, code: u16, indexes: &mut Vec<u8>) -> Result<(), DecodingError> {
        if code == self.clear_code {
            trace!("clear code, resetting code table");
            self.code_table.reset(self.minimum_code_size);
            self.code_size = self.minimum_code_size + 1;
            self.state = DecoderState::Cleared;
            return Ok(());
        }

        if code == self.end_of_information_code {
            trace!("end of information code");
            self.state = DecoderState::Done;
            return Ok(());
        }

        let previous = match self.state {
            DecoderState::Decoding { previous } => Some(previous),
            _ => None,
        };

        if self.code_table.contains(code) {
            // output {CODE}
            let current = self.code_table.get(code)?;
            indexes.extend_from_slice(current);

            if let Some(previous) = previous {
                // add {CODE-1}+K where K is the first index of {CODE}
                let first = self.code_table.first_index(code)?;
                let mut entry = self.code_table.get(previous)?.to_vec();
                entry.push(first);
                self.code_table.append(entry);
            }
        } else if usize::from(code) == self.code_table.len() {
            let previous = previous.ok_or(DecodingError::InvalidCode {
                code,
                table_size: self.code_table.len(),
            })?;

            // {CODE-1}+K where K is the first index of {CODE-1}
            let first = self.code_table.first_index(previous)?;
            let mut entry = self.code_table.get(previous)?.to_vec();
            entry.push(first);

            indexes.extend_from_slice(&entry);
            self.code_table.append(entry);
        } else {
            return Err(DecodingError::InvalidCode {
                code,
                table_size: self.code_table.len(),
            });
        }

        self.state = DecoderState::Decoding { previous: code };
        self.widen_if_full();

        Ok(())
    }

    fn widen_if_full(&mut self) {
        if self.code_table.len() == 1 << self.code_size && self.code_size < MAX_CODE_SIZE {
            self.code_size += 1;
            trace!("code size widened to {}", self.code_size);
        }
    }
}

/// Decodes an image data stream: the minimum code size byte followed by data sub-blocks.
///
/// An out of range minimum code size yields no indexes. The reader is left right after the
/// sub-block terminator when the stream allows it.
pub fn lzw_decode<T: Read>(inner: &mut T) -> Result<Vec<u8>, DecodingError> {
    let mut minimum_code_size = [0; 1];
    inner.read_exact(&mut minimum_code_size)?;
    let minimum_code_size = minimum_code_size[0];

    let mut reader = BitReader::new(inner);

    let indexes = match LzwDecoder::new(minimum_code_size) {
        Ok(mut decoder) => {
            debug!("decoding image data with minimum code size {minimum_code_size}");
            decoder.decode(&mut reader)?
        }
        Err(err @ DecodingError::InvalidMinCodeSize(_)) => {
            warn!("{err}, no pixels will be decoded");
            Vec::new()
        }
        Err(err) => return Err(err),
    };

    // the end code has been seen (or decoding was abandoned), running out of trailing data is fine
    match reader.skip_remaining() {
        Err(DecodingError::UnexpectedEndOfStream) => {
            debug!("stream ended while skipping trailing image data");
        }
        result => result?,
    }

    debug!("decoded {} color indexes", indexes.len());
    Ok(indexes)
}
