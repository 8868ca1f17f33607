//! Packs quiz questions into the fixed-size question region of a quiz game's
//! program image, compressing repeated vocabulary through two word
//! dictionaries.

pub mod charset;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod patch;
pub mod question;
pub mod serializer;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use self::charset::ReferenceTable;
use self::dictionary::{DictionaryCfg, DictionaryImage, WordDictionary};
use self::encoder::{SubstitutionEncoder, MAIN_TOKEN_INDEX_LIMIT};
use self::error::{QuizError, Result};
use self::frequency::WordFrequency;
use self::patch::PatchList;
use self::question::{QuestionList, QuizQuestion};
use self::serializer::{BlockSerializer, SerializedQuestions};

pub const QUESTION_DATA_SIZE: usize = 0x56c90;
pub const MAIN_DICTIONARY_SIZE: usize = 0x3973;
pub const MAIN_DICTIONARY_WORDS: usize = 2048;
pub const PROPER_DICTIONARY_SIZE: usize = 0x30e;
pub const PROPER_DICTIONARY_WORDS: usize = 88;
pub const PROPER_EXCLUDED_MAIN_WORDS: usize = 100;
pub const MAX_CATEGORIES: usize = 14;

pub const QUESTIONS_FILE: &str = "questions.bin";
pub const MAIN_DICTIONARY_FILE: &str = "main_dict.bin";
pub const PROPER_DICTIONARY_FILE: &str = "proper_noun_dict.bin";
pub const PATCHES_FILE: &str = "patches.txt";

/// Sizes and limits of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCfg {
    pub capacity: usize,
    pub main: DictionaryCfg,
    pub proper: DictionaryCfg,
    /// The most frequent main dictionary words are kept out of the proper
    /// noun dictionary.
    pub excluded_main_words: usize,
    pub max_categories: usize,
}

impl Default for BuildCfg {
    fn default() -> Self {
        BuildCfg {
            capacity: QUESTION_DATA_SIZE,
            main: DictionaryCfg {
                max_bytes: MAIN_DICTIONARY_SIZE,
                max_words: MAIN_DICTIONARY_WORDS,
                proper: false,
            },
            proper: DictionaryCfg {
                max_bytes: PROPER_DICTIONARY_SIZE,
                max_words: PROPER_DICTIONARY_WORDS,
                proper: true,
            },
            excluded_main_words: PROPER_EXCLUDED_MAIN_WORDS,
            max_categories: MAX_CATEGORIES,
        }
    }
}

impl BuildCfg {
    /// Check the parameters and cap the main dictionary at what its tokens
    /// can address.
    pub fn validated(&self) -> Result<BuildCfg> {
        let mut cfg = self.clone();
        if cfg.capacity == 0 {
            return Err(QuizError::InvalidConfig("question capacity must not be zero".to_owned()));
        }
        if cfg.main.proper || !cfg.proper.proper {
            return Err(QuizError::InvalidConfig("dictionary kinds are swapped".to_owned()));
        }
        for (name, dictionary) in [("main", &cfg.main), ("proper noun", &cfg.proper)] {
            if dictionary.max_bytes <= 1 {
                return Err(QuizError::InvalidConfig(format!(
                    "{} dictionary budget of {} bytes cannot hold an entry",
                    name, dictionary.max_bytes,
                )));
            }
            if dictionary.max_words == 0 {
                return Err(QuizError::InvalidConfig(format!("{} dictionary word cap is zero", name)));
            }
        }
        if cfg.main.max_words > MAIN_TOKEN_INDEX_LIMIT {
            log::warn!(
                "main dictionary limited to {} words, tokens cannot address {}",
                MAIN_TOKEN_INDEX_LIMIT,
                cfg.main.max_words,
            );
            cfg.main.max_words = MAIN_TOKEN_INDEX_LIMIT;
        }
        Ok(cfg)
    }
}

/// Everything one build produces.
pub struct BuildOutput {
    pub questions: SerializedQuestions,
    pub main: WordDictionary,
    pub proper: WordDictionary,
    pub main_image: DictionaryImage,
    pub proper_image: DictionaryImage,
    pub patches: PatchList,
}

impl BuildOutput {
    /// Write the question data, both dictionaries and the patch listing.
    pub fn write_to_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let mut questions = BufWriter::new(File::create(dir.join(QUESTIONS_FILE))?);
        questions.write_all(&self.questions.bytes)?;
        questions.flush()?;

        self.main_image.write_to(&mut BufWriter::new(File::create(dir.join(MAIN_DICTIONARY_FILE))?))?;
        self.proper_image.write_to(&mut BufWriter::new(File::create(dir.join(PROPER_DICTIONARY_FILE))?))?;
        self.patches.write_listing(&mut BufWriter::new(File::create(dir.join(PATCHES_FILE))?))?;
        Ok(())
    }
}

pub fn read_questions<R: Read>(source: R) -> Result<Vec<QuizQuestion>> {
    Ok(serde_json::from_reader(source)?)
}

/// Validate, build both dictionaries, encode and lay out the questions.
pub fn build(records: Vec<QuizQuestion>, table: ReferenceTable, cfg: &BuildCfg) -> Result<BuildOutput> {
    let cfg = cfg.validated()?;

    log::info!("validating {} questions", records.len());
    let mut questions = QuestionList::new(table);
    for record in records {
        let text = record.question_text.clone();
        match questions.add(record) {
            Ok(()) => {}
            Err(e @ QuizError::DisallowedCharacter { character, .. }) => {
                log::warn!("skipping question {:?}: {} ({:#x})", text, e, character as u32)
            }
            Err(e) => log::warn!("skipping question {:?}: {}", text, e),
        }
    }

    let categories = questions.category_count();
    if categories > cfg.max_categories {
        return Err(QuizError::TooManyCategories {
            count: categories,
            max: cfg.max_categories,
        });
    }

    log::info!("building main dictionary");
    let frequency = WordFrequency::from_questions(&questions)?;
    let main = WordDictionary::build(&frequency, &cfg.main, &HashSet::new());

    log::info!("building proper noun dictionary");
    let exclusions: HashSet<String> = main.words().iter().take(cfg.excluded_main_words).cloned().collect();
    let proper = WordDictionary::build(&frequency, &cfg.proper, &exclusions);

    log::info!("encoding {} questions", questions.len());
    let encoder = SubstitutionEncoder::new(questions.table(), &proper, &main);
    let serialized = BlockSerializer::new(cfg.capacity).serialize(&questions, &encoder)?;

    let main_image = main.dump()?;
    let proper_image = proper.dump()?;
    let mut patches = PatchList::new(
        &serialized.metadata,
        proper.len() + proper_image.dummy_words,
        cfg.max_categories,
    )?;
    patches.place(patch::QUESTIONS_ADDRESS, serialized.bytes.len(), QUESTIONS_FILE);
    patches.place(patch::PROPER_DICTIONARY_ADDRESS, proper_image.bytes.len(), PROPER_DICTIONARY_FILE);
    patches.place(patch::MAIN_DICTIONARY_ADDRESS, main_image.bytes.len(), MAIN_DICTIONARY_FILE);

    Ok(BuildOutput {
        questions: serialized,
        main,
        proper,
        main_image,
        proper_image,
        patches,
    })
}
