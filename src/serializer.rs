use crate::encoder::SubstitutionEncoder;
use crate::error::{QuizError, Result};
use crate::question::{QuestionList, QuizQuestion};

pub const CATEGORY_TERMINATOR: u8 = 0x00;
pub const PROMPT_TERMINATOR: u8 = 0x00;
pub const ANSWER_TERMINATOR: u8 = 0x01;

/// Where a category's questions start in the question data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMetadata {
    pub name: String,
    pub offset: usize,
    pub count: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpMetadata {
    pub question_count: usize,
    pub categories: Vec<CategoryMetadata>,
}

pub struct SerializedQuestions {
    pub bytes: Vec<u8>,
    pub metadata: DumpMetadata,
    /// Set when the capacity ran out before every question was written.
    pub truncated: bool,
}

/// Lays out encoded questions, grouped by category, in a fixed-size region.
pub struct BlockSerializer {
    capacity: usize,
}

impl BlockSerializer {
    pub fn new(capacity: usize) -> BlockSerializer {
        BlockSerializer { capacity }
    }

    pub fn serialize(&self, questions: &QuestionList, encoder: &SubstitutionEncoder) -> Result<SerializedQuestions> {
        let mut sorted = questions.questions().iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| a.category.cmp(&b.category));

        let mut bytes = Vec::with_capacity(self.capacity);
        let mut metadata = DumpMetadata::default();
        let mut truncated = false;

        for (written, question) in sorted.iter().enumerate() {
            log::debug!("encoding question {:?}", question.question_text);

            if metadata.categories.last().map(|c| &c.name) != Some(&question.category) {
                if !metadata.categories.is_empty() {
                    bytes.push(CATEGORY_TERMINATOR);
                }
                metadata.categories.push(CategoryMetadata {
                    name: question.category.clone(),
                    offset: bytes.len(),
                    count: 0,
                    index: metadata.categories.len(),
                });
            }

            let block = encode_block(question, encoder)?;
            let prefix = u8::try_from(block.len() + 1).map_err(|_| QuizError::BlockTooLong { length: block.len() + 1 })?;
            if bytes.len() + 1 + block.len() > self.capacity {
                log::warn!(
                    "question data full at {:#x} bytes, dropping the last {} questions",
                    bytes.len().min(self.capacity),
                    sorted.len() - written,
                );
                truncated = true;
                break;
            }

            bytes.push(prefix);
            bytes.extend_from_slice(&block);
            if let Some(category) = metadata.categories.last_mut() {
                category.count += 1;
            }
            metadata.question_count += 1;
        }

        bytes.resize(self.capacity, 0);
        Ok(SerializedQuestions { bytes, metadata, truncated })
    }
}

/// `prompt 00 (answer 01)*`, without the length prefix.
fn encode_block(question: &QuizQuestion, encoder: &SubstitutionEncoder) -> Result<Vec<u8>> {
    let mut block = encoder.encode(&question.prompt_for_storage()?)?;
    block.push(PROMPT_TERMINATOR);
    for answer in &question.answers {
        block.extend(encoder.encode(answer)?);
        block.push(ANSWER_TERMINATOR);
    }
    Ok(block)
}
