use modular_bitfield::prelude::*;

use crate::charset::ReferenceTable;
use crate::dictionary::WordDictionary;
use crate::error::{QuizError, Result};

/// Newlines are stored as this control byte.
pub const NEWLINE_BYTE: u8 = 0x01;
/// Main tokens carry 2 high index bits plus a full low byte.
pub const MAIN_TOKEN_INDEX_LIMIT: usize = 1 << 10;

/// First byte of a two-byte main dictionary token.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct MainTokenHeader {
    pub index_high: B2,
    #[skip]
    __: B1,
    pub flip: bool,
    pub space_after: bool,
    pub space_before: bool,
    pub marker: B2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(Vec<u8>),
    Token(Vec<u8>),
}

impl Segment {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Segment::Literal(bytes) | Segment::Token(bytes) => bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    ProperNoun,
    Main,
    MainFlipped,
}

pub const PASSES: [Pass; 3] = [Pass::ProperNoun, Pass::Main, Pass::MainFlipped];

/// Replaces dictionary words in question text with one or two byte tokens.
pub struct SubstitutionEncoder<'a> {
    table: &'a ReferenceTable,
    proper: &'a WordDictionary,
    main: &'a WordDictionary,
}

impl<'a> SubstitutionEncoder<'a> {
    pub fn new(table: &'a ReferenceTable, proper: &'a WordDictionary, main: &'a WordDictionary) -> Self {
        SubstitutionEncoder { table, proper, main }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self
            .segments(text)?
            .iter()
            .flat_map(|segment| segment.bytes().iter().copied())
            .collect())
    }

    pub fn segments(&self, text: &str) -> Result<Vec<Segment>> {
        let bytes = text
            .bytes()
            .map(|b| if b == b'\n' { NEWLINE_BYTE } else { b })
            .collect();
        let mut segments = vec![Segment::Literal(bytes)];
        for pass in PASSES {
            segments = self.reduce(segments, pass)?;
        }
        Ok(segments)
    }

    /// Apply `pass` one substitution at a time until nothing changes.
    pub fn reduce(&self, mut segments: Vec<Segment>, pass: Pass) -> Result<Vec<Segment>> {
        while let Some(next) = self.substitute_once(&segments, pass)? {
            segments = next;
        }
        Ok(segments)
    }

    /// The first literal segment holding any candidate word gets that word's
    /// leftmost occurrence replaced. Candidates are tried in dictionary order.
    fn substitute_once(&self, segments: &[Segment], pass: Pass) -> Result<Option<Vec<Segment>>> {
        let candidates = match pass {
            Pass::ProperNoun => self.proper.words(),
            Pass::Main => self.main.words(),
            Pass::MainFlipped => self.main.flipped(),
        };

        for (i, segment) in segments.iter().enumerate() {
            let data = match segment {
                Segment::Literal(data) => data,
                Segment::Token(_) => continue,
            };
            let hit = candidates.iter().enumerate().find_map(|(index, word)| {
                find(data, word.as_bytes()).map(|pos| (index, pos, word.len()))
            });

            if let Some((index, pos, len)) = hit {
                let token = match pass {
                    Pass::ProperNoun => vec![self.table.proper_token(index)?],
                    Pass::Main | Pass::MainFlipped => {
                        let space_before = pos > 0 && data[pos - 1] == b' ';
                        let space_after = data.get(pos + len) == Some(&b' ');
                        main_token(index, space_before, space_after, pass == Pass::MainFlipped)?.to_vec()
                    }
                };

                let mut next = Vec::with_capacity(segments.len() + 2);
                next.extend_from_slice(&segments[..i]);
                if pos > 0 {
                    next.push(Segment::Literal(data[..pos].to_vec()));
                }
                next.push(Segment::Token(token));
                if pos + len < data.len() {
                    next.push(Segment::Literal(data[pos + len..].to_vec()));
                }
                next.extend_from_slice(&segments[i + 1..]);
                return Ok(Some(next));
            }
        }
        Ok(None)
    }
}

pub fn main_token(index: usize, space_before: bool, space_after: bool, flip: bool) -> Result<[u8; 2]> {
    if index >= MAIN_TOKEN_INDEX_LIMIT {
        return Err(QuizError::TokenIndexOutOfRange { index });
    }
    let header = MainTokenHeader::new()
        .with_marker(0b11)
        .with_space_before(space_before)
        .with_space_after(space_after)
        .with_flip(flip)
        .with_index_high((index >> 8) as u8);
    Ok([header.into_bytes()[0], index as u8])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::charset::test::sample_table;
    use crate::dictionary::DictionaryCfg;

    fn dictionary(words: &[&str]) -> WordDictionary {
        let mut bytes = vec![];
        for word in words {
            bytes.push(word.len() as u8);
            bytes.extend_from_slice(word.as_bytes());
        }
        let cfg = DictionaryCfg {
            max_bytes: bytes.len(),
            max_words: words.len(),
            proper: false,
        };
        WordDictionary::deserialize(&bytes, cfg).unwrap()
    }

    fn concat(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn test_main_token_layout() {
        assert_eq!(main_token(3, false, false, false).unwrap(), [0xc0, 0x03]);
        assert_eq!(main_token(3, true, true, false).unwrap(), [0xf0, 0x03]);
        assert_eq!(main_token(0x1ff, false, false, true).unwrap(), [0xc9, 0xff]);
        assert_eq!(main_token(0x3ff, true, false, false).unwrap(), [0xe3, 0xff]);
        assert!(matches!(
            main_token(1024, false, false, false),
            Err(QuizError::TokenIndexOutOfRange { index: 1024 })
        ));
    }

    #[test]
    fn test_encode_capital() {
        let table = sample_table();
        let proper = dictionary(&[]);
        let main = dictionary(&["zzz", "yyy", "xxx", "capital"]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        let encoded = encoder.encode("What is the capital of France").unwrap();
        assert_eq!(encoded, concat(&[b"What is the ", &[0xf0, 0x03], b" of France"]));
    }

    #[test]
    fn test_proper_nouns_use_reference_table() {
        let table = sample_table();
        let proper = dictionary(&["France", "Paris"]);
        let main = dictionary(&[]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        let encoded = encoder.encode("Paris is in France").unwrap();
        assert_eq!(encoded, concat(&[&[0x81], b" is in ", &[0x80]]));
    }

    #[test]
    fn test_one_substitution_per_step() {
        let table = sample_table();
        let proper = dictionary(&[]);
        let main = dictionary(&["the"]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        let segments = vec![Segment::Literal(b"the cat the".to_vec())];
        let once = encoder.substitute_once(&segments, Pass::Main).unwrap().unwrap();
        assert_eq!(
            once,
            vec![Segment::Token(vec![0xd0, 0x00]), Segment::Literal(b" cat the".to_vec())]
        );

        let encoded = encoder.encode("the cat the").unwrap();
        assert_eq!(encoded, concat(&[&[0xd0, 0x00], b" cat ", &[0xe0, 0x00]]));
    }

    #[test]
    fn test_dictionary_order_wins() {
        let table = sample_table();
        let proper = dictionary(&[]);
        let main = dictionary(&["at", "cat"]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        assert_eq!(encoder.encode("cat").unwrap(), concat(&[b"c", &[0xc0, 0x00]]));
        assert_eq!(encoder.encode("other").unwrap(), b"other".to_vec());
    }

    #[test]
    fn test_matches_inside_words() {
        let table = sample_table();
        let proper = dictionary(&[]);
        let main = dictionary(&["the"]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        assert_eq!(encoder.encode("other").unwrap(), concat(&[b"o", &[0xc0, 0x00], b"r"]));
    }

    #[test]
    fn test_flipped_pass() {
        let table = sample_table();
        let proper = dictionary(&[]);
        let main = dictionary(&["the", "end"]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        let encoded = encoder.encode("The end").unwrap();
        assert_eq!(encoded, concat(&[&[0xd8, 0x00], b" ", &[0xe0, 0x01]]));
    }

    #[test]
    fn test_newline_byte() {
        let table = sample_table();
        let proper = dictionary(&[]);
        let main = dictionary(&[]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        assert_eq!(encoder.encode("ab\ncd").unwrap(), b"ab\x01cd".to_vec());
    }

    #[test]
    fn test_passes_reach_fixed_point() {
        let table = sample_table();
        let proper = dictionary(&["Paris", "France"]);
        let main = dictionary(&["capital", "of", "the", "is"]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        let segments = encoder.segments("Is Paris the capital of France\nor is it Lyon").unwrap();
        let mut again = segments.clone();
        for pass in PASSES {
            again = encoder.reduce(again, pass).unwrap();
        }
        assert_eq!(again, segments);
    }

    #[test]
    fn test_unmapped_proper_noun() {
        let table = ReferenceTable::new(&[0; crate::charset::REFERENCE_TABLE_SIZE]).unwrap();
        let proper = dictionary(&["Paris"]);
        let main = dictionary(&[]);
        let encoder = SubstitutionEncoder::new(&table, &proper, &main);

        assert!(matches!(
            encoder.encode("Paris"),
            Err(QuizError::UnmappedProperNoun { index: 0 })
        ));
    }
}
