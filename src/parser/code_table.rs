use super::error::DecodingError;

pub(crate) const MAX_CODE_SIZE: u8 = 12;
pub(crate) const MAX_TABLE_SIZE: usize = 1 << MAX_CODE_SIZE;

/// LZW dictionary mapping codes to strings of color indexes.
///
/// The Clear and End-of-Information slots hold empty strings so that appended entries start at
/// `clear_code + 2`.
#[derive(Debug)]
pub(crate) struct CodeTable {
    entries: Vec<Vec<u8>>,
}

impl CodeTable {
    pub fn new(minimum_code_size: u8) -> Self {
        let mut table = Self {
            entries: Vec::with_capacity(MAX_TABLE_SIZE),
        };
        table.reset(minimum_code_size);
        table
    }

    pub fn reset(&mut self, minimum_code_size: u8) {
        let root_count: u16 = 1 << minimum_code_size;

        self.entries.clear();
        self.entries.extend((0..root_count).map(|i| vec![i as u8]));
        // clear and end of information
        self.entries.push(Vec::new());
        self.entries.push(Vec::new());
    }

    /// Adds `string` at the next free code. Does nothing once all 4096 codes are taken.
    pub fn append(&mut self, string: Vec<u8>) {
        if self.entries.len() < MAX_TABLE_SIZE {
            self.entries.push(string);
        }
    }

    pub fn get(&self, code: u16) -> Result<&[u8], DecodingError> {
        self.entries
            .get(usize::from(code))
            .map(Vec::as_slice)
            .ok_or(DecodingError::InvalidCode {
                code,
                table_size: self.entries.len(),
            })
    }

    pub fn first_index(&self, code: u16) -> Result<u8, DecodingError> {
        self.get(code)?
            .first()
            .copied()
            .ok_or(DecodingError::InvalidCode {
                code,
                table_size: self.entries.len(),
            })
    }

    pub fn contains(&self, code: u16) -> bool {
        usize::from(code) < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{CodeTable, MAX_TABLE_SIZE};
    use crate::parser::error::DecodingError;

    #[test]
    fn reset_holds_roots_and_control_codes() {
        let table = CodeTable::new(2);

        assert_eq!(table.len(), 6);
        assert_eq!(table.get(0).unwrap(), &[0]);
        assert_eq!(table.get(3).unwrap(), &[3]);
        assert!(table.get(4).unwrap().is_empty());
        assert!(table.get(5).unwrap().is_empty());
        assert!(matches!(
            table.get(6),
            Err(DecodingError::InvalidCode { code: 6, table_size: 6 })
        ));
    }

    #[test]
    fn eight_bit_roots_cover_every_index() {
        let table = CodeTable::new(8);

        assert_eq!(table.len(), 258);
        assert_eq!(table.get(255).unwrap(), &[255]);
    }

    #[test]
    fn append_then_reset() {
        let mut table = CodeTable::new(2);
        table.append(vec![1, 2]);

        assert_eq!(table.len(), 7);
        assert_eq!(table.get(6).unwrap(), &[1, 2]);
        assert_eq!(table.first_index(6).unwrap(), 1);

        table.reset(2);
        assert_eq!(table.len(), 6);
        assert!(!table.contains(6));
    }

    #[test]
    fn append_stops_silently_when_full() {
        let mut table = CodeTable::new(2);
        while table.len() < MAX_TABLE_SIZE {
            table.append(vec![0, 0]);
        }

        table.append(vec![1, 1]);
        assert_eq!(table.len(), MAX_TABLE_SIZE);
        assert_eq!(table.get(4095).unwrap(), &[0, 0]);
    }

    #[test]
    fn control_codes_have_no_first_index() {
        let table = CodeTable::new(3);
        assert!(table.first_index(8).is_err());
    }
}
