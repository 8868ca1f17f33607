use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{QuizError, Result};
use crate::serializer::DumpMetadata;

const QUESTION_COUNT_ADDRESSES: [usize; 4] = [0x6034, 0x604c, 0x60b8, 0x60c0];
const CATEGORY_OFFSET_TABLE: usize = 0x1dbe6;
const CATEGORY_NAME_TABLE: usize = 0x1dc1e;
const CATEGORY_COUNT_TABLE: usize = 0x1dc9a;
const PROPER_DICTIONARY_SIZE: usize = 0x5e09;
/// Question data offsets are stored relative to this base.
const QUESTION_DATA_BASE: u32 = 0x3c82;

pub const QUESTIONS_ADDRESS: usize = 0x29370;
pub const PROPER_DICTIONARY_ADDRESS: usize = 0x256ee;
pub const MAIN_DICTIONARY_ADDRESS: usize = 0x259fc;

/// Bytes to overwrite at one address of the combined program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub address: usize,
    pub bytes: Vec<u8>,
    pub label: String,
}

/// A generated file that is copied whole into the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub address: usize,
    pub len: usize,
    pub file: &'static str,
}

/// Everything the image patcher needs besides the generated files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchList {
    pub patches: Vec<Patch>,
    pub placements: Vec<Placement>,
}

impl PatchList {
    /// `proper_entries` counts real and filler words of the proper noun dictionary.
    pub fn new(metadata: &DumpMetadata, proper_entries: usize, max_categories: usize) -> Result<PatchList> {
        let mut list = PatchList::default();

        let question_count = u16::try_from(metadata.question_count)
            .map_err(|_| out_of_range("question count", metadata.question_count))?;
        for &address in &QUESTION_COUNT_ADDRESSES {
            let mut bytes: Vec<u8> = vec![];
            bytes.write_u16::<BigEndian>(question_count)?;
            list.push(address, bytes, "question count");
        }

        let mut name_address = CATEGORY_NAME_TABLE;
        for category in &metadata.categories {
            let offset = u32::try_from(category.offset)
                .map_err(|_| out_of_range("category offset", category.offset))?;
            let count = u16::try_from(category.count).map_err(|_| out_of_range("category count", category.count))?;

            let mut bytes: Vec<u8> = vec![];
            bytes.write_u32::<BigEndian>(offset + QUESTION_DATA_BASE)?;
            list.push(CATEGORY_OFFSET_TABLE + 4 * category.index, bytes, &format!("{} offset", category.name));

            let mut bytes: Vec<u8> = vec![];
            bytes.write_u16::<BigEndian>(count)?;
            list.push(CATEGORY_COUNT_TABLE + 2 * category.index, bytes, &format!("{} count", category.name));

            let mut bytes = category.name.as_bytes().to_vec();
            bytes.push(0x00);
            let name_len = bytes.len();
            list.push(name_address, bytes, &format!("{} name", category.name));
            name_address += name_len;
        }
        for index in metadata.categories.len()..max_categories {
            list.push(CATEGORY_COUNT_TABLE + 2 * index, vec![0x00, 0x00], "unused category count");
        }

        let proper_size = u8::try_from(proper_entries + 1)
            .map_err(|_| out_of_range("proper noun dictionary size", proper_entries + 1))?;
        list.push(PROPER_DICTIONARY_SIZE, vec![proper_size], "proper noun dictionary size");
        Ok(list)
    }

    pub fn place(&mut self, address: usize, len: usize, file: &'static str) {
        self.placements.push(Placement { address, len, file });
    }

    /// One line per write: address, hex bytes, label.
    pub fn write_listing(&self, target: &mut dyn Write) -> std::io::Result<()> {
        for placement in &self.placements {
            writeln!(target, "{:#08x}  <{} bytes of {}>", placement.address, placement.len, placement.file)?;
        }
        for patch in &self.patches {
            let hex = patch.bytes.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ");
            writeln!(target, "{:#08x}  {}  ; {}", patch.address, hex, patch.label)?;
        }
        target.flush()
    }

    fn push(&mut self, address: usize, bytes: Vec<u8>, label: &str) {
        self.patches.push(Patch { address, bytes, label: label.to_owned() });
    }
}

fn out_of_range(what: &str, value: usize) -> QuizError {
    QuizError::InvalidConfig(format!("{} {} does not fit its patch field", what, value))
}
