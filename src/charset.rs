use std::io::{Read, Seek, SeekFrom};

use crate::error::{QuizError, Result};

pub const REFERENCE_TABLE_SIZE: usize = 0xc0;

/// The game's 192-entry character reference table.
///
/// A zero entry marks a character the font can draw. The same bytes are read
/// backwards for proper-noun tokens: the token for dictionary entry `i` is the
/// position of the first byte equal to `i + 1`.
#[derive(Clone)]
pub struct ReferenceTable {
    table: [u8; REFERENCE_TABLE_SIZE],
}

impl ReferenceTable {
    pub fn new(bytes: &[u8]) -> Result<ReferenceTable> {
        if bytes.len() != REFERENCE_TABLE_SIZE {
            return Err(QuizError::InvalidConfig(format!(
                "reference table must be {} bytes, got {}",
                REFERENCE_TABLE_SIZE,
                bytes.len(),
            )));
        }
        let mut table = [0u8; REFERENCE_TABLE_SIZE];
        table.copy_from_slice(bytes);
        Ok(ReferenceTable { table })
    }

    /// Read the table out of a larger image, e.g. the combined program ROM.
    pub fn read_from<R: Read + Seek>(source: &mut R, offset: u64) -> Result<ReferenceTable> {
        let mut table = [0u8; REFERENCE_TABLE_SIZE];
        source.seek(SeekFrom::Start(offset))?;
        source.read_exact(&mut table)?;
        Ok(ReferenceTable { table })
    }

    pub fn is_allowed(&self, c: char) -> bool {
        let code = c as u32 as usize;
        code < REFERENCE_TABLE_SIZE && self.table[code] == 0
    }

    pub fn proper_token(&self, index: usize) -> Result<u8> {
        let wanted = index + 1;
        self.table
            .iter()
            .position(|&b| b as usize == wanted)
            .map(|pos| pos as u8)
            .ok_or(QuizError::UnmappedProperNoun { index })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }
}
