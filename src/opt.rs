use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quizpack::BuildCfg;

#[derive(Parser, Debug)]
#[clap(name = "quizpack", version, about = "packs quiz questions into a game's question region")]
pub struct Opt {
    #[clap(short, long, global = true, help = "Log debug output")]
    pub verbose: bool,

    #[clap(short, long, global = true, conflicts_with = "verbose", help = "Only log warnings and errors")]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[clap(name = "build", about = "Build question data, dictionaries and patch listing")]
    Build(Build),
    #[clap(name = "dict", about = "List the words of a dictionary file")]
    Dict(Dict),
}

#[derive(Args, Debug)]
pub struct Build {
    #[clap(long, value_parser, help = "Question records as a JSON array")]
    pub questions: PathBuf,

    #[clap(long, value_parser, help = "File holding the character reference table")]
    pub table: PathBuf,

    #[clap(long, default_value = "0", value_parser = parse_number, help = "Offset of the reference table in its file")]
    pub table_offset: u64,

    #[clap(long, value_parser, help = "Directory for the generated files")]
    pub out_dir: PathBuf,

    #[clap(long, value_parser = parse_size, help = "Size of the question data region")]
    pub capacity: Option<usize>,

    #[clap(long, value_parser = parse_size, help = "Byte budget of the main dictionary")]
    pub main_bytes: Option<usize>,

    #[clap(long, value_parser = parse_size, help = "Word limit of the main dictionary")]
    pub main_words: Option<usize>,

    #[clap(long, value_parser = parse_size, help = "Byte budget of the proper noun dictionary")]
    pub proper_bytes: Option<usize>,

    #[clap(long, value_parser = parse_size, help = "Word limit of the proper noun dictionary")]
    pub proper_words: Option<usize>,

    #[clap(long, value_parser = parse_size, help = "Top main dictionary words kept out of the proper noun dictionary")]
    pub exclude_top: Option<usize>,

    #[clap(long, value_parser = parse_size, help = "Number of category slots in the game")]
    pub max_categories: Option<usize>,
}

#[derive(Args, Debug)]
pub struct Dict {
    #[clap(value_parser, help = "Dictionary file, as written by build")]
    pub path: PathBuf,
}

impl Opt {
    pub fn log_level(&self) -> log::LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => log::LevelFilter::Debug,
            (_, true) => log::LevelFilter::Warn,
            _ => log::LevelFilter::Info,
        }
    }
}

impl Build {
    pub fn config(&self) -> BuildCfg {
        let mut cfg = BuildCfg::default();
        if let Some(capacity) = self.capacity {
            cfg.capacity = capacity;
        }
        if let Some(max_bytes) = self.main_bytes {
            cfg.main.max_bytes = max_bytes;
        }
        if let Some(max_words) = self.main_words {
            cfg.main.max_words = max_words;
        }
        if let Some(max_bytes) = self.proper_bytes {
            cfg.proper.max_bytes = max_bytes;
        }
        if let Some(max_words) = self.proper_words {
            cfg.proper.max_words = max_words;
        }
        if let Some(excluded) = self.exclude_top {
            cfg.excluded_main_words = excluded;
        }
        if let Some(max_categories) = self.max_categories {
            cfg.max_categories = max_categories;
        }
        cfg
    }
}

/// Decimal, or hex with a `0x` prefix.
fn parse_number(s: &str) -> Result<u64, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e| format!("invalid number {:?}: {}", s, e))
}

fn parse_size(s: &str) -> Result<usize, String> {
    usize::try_from(parse_number(s)?).map_err(|_| format!("number out of range: {}", s))
}
