use serde::{Deserialize, Serialize};

use crate::charset::ReferenceTable;
use crate::error::{QuizError, Result, TooLong};

pub const WRAP_COLUMNS: usize = 34;
pub const MAX_PROMPT_LINES: usize = 4;
pub const MAX_ANSWER_LEN: usize = 22;
pub const ANSWER_COUNT: usize = 4;
/// A block's length prefix is one byte and counts itself.
pub const MAX_BLOCK_LEN: usize = u8::MAX as usize;

/// One quiz question. The first answer is always the correct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub category: String,
    #[serde(rename = "question")]
    pub question_text: String,
    pub answers: Vec<String>,
}

impl QuizQuestion {
    pub fn new(category: &str, question_text: &str, answers: &[&str]) -> QuizQuestion {
        QuizQuestion {
            category: category.to_owned(),
            question_text: question_text.to_owned(),
            answers: answers.iter().map(|&a| a.to_owned()).collect(),
        }
    }

    /// Check characters and geometry against what the quiz screen can show.
    pub fn validate(&self, table: &ReferenceTable) -> Result<()> {
        check_chars(&self.question_text, table)?;
        wrap(&self.question_text)?;

        if self.answers.len() != ANSWER_COUNT {
            return Err(QuizError::AnswerCount {
                expected: ANSWER_COUNT,
                found: self.answers.len(),
            });
        }
        for answer in &self.answers {
            check_chars(answer, table)?;
            let length = answer.chars().count();
            if length > MAX_ANSWER_LEN {
                return Err(QuizError::TextTooLong(TooLong::Answer { length, max: MAX_ANSWER_LEN }));
            }
        }

        // substitution only shrinks text, so the raw size bounds the encoded block
        let length = self.stored_len()?;
        if length > MAX_BLOCK_LEN {
            return Err(QuizError::TextTooLong(TooLong::Block { length, max: MAX_BLOCK_LEN }));
        }
        Ok(())
    }

    /// Block size before substitution: prefix, prompt, answers and terminators.
    fn stored_len(&self) -> Result<usize> {
        let prompt = self.prompt_for_storage()?.len();
        Ok(1 + prompt + 1 + self.answers.iter().map(|a| a.len() + 1).sum::<usize>())
    }

    /// The prompt as it is stored: wrapped, with the trailing `?` dropped.
    pub fn prompt_for_storage(&self) -> Result<String> {
        let wrapped = wrap(&self.question_text)?.join("\n");
        Ok(wrapped.trim_end().trim_end_matches('?').trim_end().to_owned())
    }
}

fn check_chars(s: &str, table: &ReferenceTable) -> Result<()> {
    for c in s.chars() {
        let reason = match c {
            _ if !table.is_allowed(c) => "not in the game font",
            '>' => "decodes to a star glyph",
            '<' => "decodes to a heart glyph",
            _ => continue,
        };
        return Err(QuizError::DisallowedCharacter { character: c, reason });
    }
    Ok(())
}

/// Greedy word wrap at [`WRAP_COLUMNS`], failing past [`MAX_PROMPT_LINES`].
///
/// Words are separated by single spaces. A word joins the current line when
/// the line so far (counting one separator after each word) plus the word
/// fits the width; otherwise the line is closed. A word wider than the whole
/// line still gets a line to itself.
pub fn wrap(text: &str) -> Result<Vec<String>> {
    let mut lines = vec![];
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split(' ') {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + word_len > WRAP_COLUMNS {
            lines.push(line.trim_end_matches(' ').to_owned());
            if lines.len() == MAX_PROMPT_LINES {
                return Err(QuizError::TextTooLong(TooLong::PromptLines { max: MAX_PROMPT_LINES }));
            }
            line.clear();
            line_len = 0;
        }
        line.push_str(word);
        line.push(' ');
        line_len += word_len + 1;
    }
    lines.push(line.trim_end_matches(' ').to_owned());
    Ok(lines)
}

/// The validated question set of one build.
pub struct QuestionList {
    table: ReferenceTable,
    questions: Vec<QuizQuestion>,
}

impl QuestionList {
    pub fn new(table: ReferenceTable) -> QuestionList {
        QuestionList { table, questions: vec![] }
    }

    /// Append `question` if it passes validation.
    pub fn add(&mut self, question: QuizQuestion) -> Result<()> {
        question.validate(&self.table)?;
        self.questions.push(question);
        Ok(())
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn category_count(&self) -> usize {
        let mut categories: Vec<&str> = vec![];
        for q in &self.questions {
            if !categories.contains(&q.category.as_str()) {
                categories.push(&q.category);
            }
        }
        categories.len()
    }
}
