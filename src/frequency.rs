use std::collections::HashMap;

use regex::Regex;

use crate::error::Result;
use crate::question::QuestionList;

const SEPARATORS: &str = r#"[\s"!#$%&'()+,\-./:;<=>?{}]+"#;
const DICTIONARY_WORD: &str = r"^[A-Za-z.\-'*]+$";
const MIN_WORD_LEN: usize = 2;

/// Splits question text into words that are worth counting.
pub struct Tokenizer {
    separators: Regex,
    dictionary_word: Regex,
}

impl Tokenizer {
    pub fn new() -> Result<Tokenizer> {
        Ok(Tokenizer {
            separators: Regex::new(SEPARATORS)?,
            dictionary_word: Regex::new(DICTIONARY_WORD)?,
        })
    }

    pub fn words<'a>(&'a self, s: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.separators
            .split(s)
            .map(|word| word.trim_matches(|c: char| c == '{' || c == '}')) // italic markers
            .filter(move |word| word.len() >= MIN_WORD_LEN && self.dictionary_word.is_match(word))
    }
}

/// Case-sensitive word counts over every prompt and answer of a question set.
#[derive(Debug, Clone, Default)]
pub struct WordFrequency {
    counts: HashMap<String, u32>,
}

impl WordFrequency {
    pub fn from_questions(questions: &QuestionList) -> Result<WordFrequency> {
        let tokenizer = Tokenizer::new()?;
        let mut frequency = WordFrequency::default();
        for question in questions.questions() {
            frequency.add_text(&tokenizer, &question.question_text);
            for answer in &question.answers {
                frequency.add_text(&tokenizer, answer);
            }
        }
        Ok(frequency)
    }

    pub fn add_text(&mut self, tokenizer: &Tokenizer, s: &str) {
        for word in tokenizer.words(s) {
            *self.counts.entry(word.to_owned()).or_insert(0) += 1;
        }
    }

    pub fn count(&self, word: &str) -> u32 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Words by descending count, ties by descending word.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut ranked = self
            .counts
            .iter()
            .map(|(word, &count)| (word.as_str(), count))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| (b.1, b.0).cmp(&(a.1, a.0)));
        ranked
    }
}

impl<'a> FromIterator<(&'a str, u32)> for WordFrequency {
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        WordFrequency {
            counts: iter.into_iter().map(|(word, count)| (word.to_owned(), count)).collect(),
        }
    }
}
