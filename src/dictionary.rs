use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::error::{QuizError, Result};
use crate::frequency::WordFrequency;

/// How many oversized candidates are skipped before the build gives up.
const MAX_OVERSIZE_ATTEMPTS: usize = 10;
const MIN_PROPER_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryCfg {
    pub max_bytes: usize,
    pub max_words: usize,
    pub proper: bool,
}

/// A word table stored in the game as `[len][bytes]` entries.
///
/// Lookup index is insertion order. `flipped[i]` is `words[i]` with the case
/// of its first letter toggled.
#[derive(Debug, Clone)]
pub struct WordDictionary {
    cfg: DictionaryCfg,
    words: Vec<String>,
    flipped: Vec<String>,
    serialized_len: usize,
}

/// A dictionary padded with filler entries to exactly its byte budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryImage {
    pub bytes: Vec<u8>,
    pub dummy_words: usize,
}

impl DictionaryImage {
    pub fn write_to(&self, target: &mut dyn Write) -> std::io::Result<()> {
        target.write_all(&self.bytes)?;
        target.flush()
    }
}

impl WordDictionary {
    fn empty(cfg: DictionaryCfg) -> WordDictionary {
        WordDictionary {
            cfg,
            words: vec![],
            flipped: vec![],
            serialized_len: 0,
        }
    }

    /// Greedily fill a dictionary from the most frequent words.
    pub fn build(frequency: &WordFrequency, cfg: &DictionaryCfg, exclusions: &HashSet<String>) -> WordDictionary {
        let mut dictionary = WordDictionary::empty(*cfg);
        let mut attempts = MAX_OVERSIZE_ATTEMPTS;

        for (word, count) in frequency.ranked() {
            if count <= 1 || exclusions.contains(word) {
                continue;
            }
            if cfg.proper && !is_proper_noun(word) {
                continue;
            }
            if dictionary.words.len() >= cfg.max_words {
                break;
            }
            if dictionary.contains_either_case(word) {
                continue;
            }
            if !dictionary.fits(word) {
                attempts -= 1;
                if attempts == 0 {
                    log::debug!("giving up after {} oversized words", MAX_OVERSIZE_ATTEMPTS);
                    break;
                }
                continue;
            }
            dictionary.push(word);
        }

        log::info!(
            "built {} dictionary: {} words, {} of {} bytes",
            if cfg.proper { "proper noun" } else { "main" },
            dictionary.words.len(),
            dictionary.serialized_len,
            cfg.max_bytes,
        );
        dictionary
    }

    /// Load words back from their serialized form.
    pub fn deserialize(bytes: &[u8], cfg: DictionaryCfg) -> Result<WordDictionary> {
        let mut dictionary = WordDictionary::empty(cfg);
        let mut pos = 0;
        while pos < bytes.len() {
            let len = bytes[pos] as usize;
            let word = bytes.get(pos + 1..pos + 1 + len).ok_or_else(|| {
                QuizError::InvalidConfig(format!("dictionary entry at {:#x} runs past the end", pos))
            })?;
            let word = std::str::from_utf8(word).map_err(|e| {
                QuizError::InvalidConfig(format!("dictionary entry at {:#x} is not utf-8: {}", pos, e))
            })?;
            dictionary.push(word);
            pos += len + 1;
        }
        Ok(dictionary)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<WordDictionary> {
        let bytes = std::fs::read(path)?;
        let cfg = DictionaryCfg {
            max_bytes: bytes.len(),
            max_words: usize::MAX,
            proper: false,
        };
        WordDictionary::deserialize(&bytes, cfg)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len);
        for word in &self.words {
            out.push(word.len() as u8);
            out.extend_from_slice(word.as_bytes());
        }
        out
    }

    /// Serialize and pad with `"a"` entries (one `"ab"` to land on an odd
    /// remainder) up to the byte budget.
    pub fn dump(&self) -> Result<DictionaryImage> {
        let mut bytes = self.serialize();
        let mut dummy_words = 0;
        while bytes.len() < self.cfg.max_bytes {
            match self.cfg.max_bytes - bytes.len() {
                1 => {
                    return Err(QuizError::InvalidConfig(format!(
                        "a {} byte dictionary cannot be padded from {} bytes",
                        self.cfg.max_bytes,
                        self.serialized_len,
                    )))
                }
                3 => bytes.extend_from_slice(b"\x02ab"),
                _ => bytes.extend_from_slice(b"\x01a"),
            }
            dummy_words += 1;
        }
        Ok(DictionaryImage { bytes, dummy_words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn flipped(&self) -> &[String] {
        &self.flipped
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn cfg(&self) -> &DictionaryCfg {
        &self.cfg
    }

    fn contains_either_case(&self, word: &str) -> bool {
        self.words.iter().chain(&self.flipped).any(|w| w == word)
    }

    fn fits(&self, word: &str) -> bool {
        if word.len() > u8::MAX as usize {
            return false;
        }
        let size = self.serialized_len + 1 + word.len();
        // a single spare byte cannot hold a filler entry
        size <= self.cfg.max_bytes && self.cfg.max_bytes - size != 1
    }

    fn push(&mut self, word: &str) {
        self.serialized_len += 1 + word.len();
        self.words.push(word.to_owned());
        self.flipped.push(flip_case(word));
    }
}

fn is_proper_noun(word: &str) -> bool {
    word.chars().next().map_or(false, char::is_uppercase) && word.chars().count() >= MIN_PROPER_LEN
}

/// Toggle the case of the first character only.
pub fn flip_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cfg(max_bytes: usize, max_words: usize, proper: bool) -> DictionaryCfg {
        DictionaryCfg { max_bytes, max_words, proper }
    }

    fn frequency(entries: &[(&str, u32)]) -> WordFrequency {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_flip_case() {
        assert_eq!(flip_case("The"), "the");
        assert_eq!(flip_case("the"), "The");
        assert_eq!(flip_case("'tis"), "'tis");
        assert_eq!(flip_case(""), "");
    }

    #[test]
    fn test_tie_break_and_word_cap() {
        let frequency = frequency(&[("the", 5), ("a", 5), ("quiz", 3)]);
        let dictionary = WordDictionary::build(&frequency, &cfg(100, 2, false), &HashSet::new());
        assert_eq!(dictionary.words(), &["the", "a"]);
    }

    #[test]
    fn test_skips_single_use_and_exclusions() {
        let frequency = frequency(&[("once", 1), ("twice", 2), ("often", 9), ("skip", 4)]);
        let exclusions: HashSet<String> = ["skip".to_owned()].into_iter().collect();
        let dictionary = WordDictionary::build(&frequency, &cfg(100, 10, false), &exclusions);
        assert_eq!(dictionary.words(), &["often", "twice"]);
    }

    #[test]
    fn test_proper_nouns_only() {
        let frequency = frequency(&[("london", 5), ("Ox", 4), ("Paris", 3), ("Rome", 2)]);
        let dictionary = WordDictionary::build(&frequency, &cfg(100, 10, true), &HashSet::new());
        assert_eq!(dictionary.words(), &["Paris", "Rome"]);
    }

    #[test]
    fn test_one_case_per_word() {
        let frequency = frequency(&[("The", 6), ("the", 5), ("and", 4)]);
        let dictionary = WordDictionary::build(&frequency, &cfg(100, 10, false), &HashSet::new());
        assert_eq!(dictionary.words(), &["The", "and"]);
        assert_eq!(dictionary.flipped(), &["the", "And"]);
    }

    #[test]
    fn test_retry_budget() {
        let long_words = (b'a'..=b'j').map(|c| format!("oversized{}", c as char)).collect::<Vec<_>>();

        // nine oversized candidates leave one attempt for "ok"
        let mut entries = long_words[..9].iter().map(|w| (w.as_str(), 100)).collect::<Vec<_>>();
        entries.push(("ok", 2));
        let dictionary = WordDictionary::build(&frequency(&entries), &cfg(8, 10, false), &HashSet::new());
        assert_eq!(dictionary.words(), &["ok"]);

        // the tenth one exhausts the budget
        let mut entries = long_words.iter().map(|w| (w.as_str(), 100)).collect::<Vec<_>>();
        entries.push(("ok", 2));
        let dictionary = WordDictionary::build(&frequency(&entries), &cfg(8, 10, false), &HashSet::new());
        assert!(dictionary.is_empty());
    }

    #[test]
    fn test_never_leaves_one_spare_byte() {
        let frequency = frequency(&[("abcd", 3), ("abc", 2)]);
        let dictionary = WordDictionary::build(&frequency, &cfg(6, 10, false), &HashSet::new());
        assert_eq!(dictionary.words(), &["abc"]);

        let image = dictionary.dump().unwrap();
        assert_eq!(image.bytes, b"\x03abc\x01a");
        assert_eq!(image.dummy_words, 1);
    }

    #[test]
    fn test_dump_padding() {
        let frequency = frequency(&[("the", 3)]);
        let dictionary = WordDictionary::build(&frequency, &cfg(9, 10, false), &HashSet::new());
        let image = dictionary.dump().unwrap();
        assert_eq!(image.bytes, b"\x03the\x01a\x02ab");
        assert_eq!(image.dummy_words, 2);
    }

    #[test]
    fn test_dump_fills_budget_exactly() {
        let words = [
            "the", "of", "and", "capital", "which", "what", "city", "country", "largest", "river",
            "world", "famous", "first", "known", "planet", "ocean", "mountain", "written", "invented",
        ];
        let entries = words.iter().enumerate().map(|(i, &w)| (w, 50 - i as u32)).collect::<Vec<_>>();
        let frequency = frequency(&entries);

        for max_bytes in 2..80 {
            let dictionary = WordDictionary::build(&frequency, &cfg(max_bytes, 100, false), &HashSet::new());
            let image = dictionary.dump().unwrap();
            assert_eq!(image.bytes.len(), max_bytes);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let frequency = frequency(&[("alpha", 4), ("beta", 4), ("gamma", 4), ("Delta", 3), ("delta", 3)]);
        let a = WordDictionary::build(&frequency, &cfg(20, 10, false), &HashSet::new());
        let b = WordDictionary::build(&frequency, &cfg(20, 10, false), &HashSet::new());
        assert_eq!(a.serialize(), b.serialize());
        assert_eq!(a.dump().unwrap(), b.dump().unwrap());
    }

    #[test]
    fn test_deserialize() {
        let frequency = frequency(&[("The", 9), ("capital", 7), ("of", 6)]);
        let dictionary = WordDictionary::build(&frequency, &cfg(64, 10, false), &HashSet::new());

        let loaded = WordDictionary::deserialize(&dictionary.serialize(), *dictionary.cfg()).unwrap();
        assert_eq!(loaded.words(), dictionary.words());
        assert_eq!(loaded.flipped(), &["the", "Capital", "Of"]);

        assert!(WordDictionary::deserialize(b"\x05abc", *dictionary.cfg()).is_err());
    }
}
