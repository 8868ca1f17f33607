mod opt;

use std::fs::File;
use std::io::BufReader;

use clap::Parser;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use quizpack::charset::ReferenceTable;
use quizpack::dictionary::WordDictionary;
use self::opt::{Build, Command, Dict, Opt};

fn build(args: &Build) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = std::time::Instant::now();
    let table = ReferenceTable::read_from(&mut File::open(&args.table)?, args.table_offset)?;
    let records = quizpack::read_questions(BufReader::new(File::open(&args.questions)?))?;

    let output = quizpack::build(records, table, &args.config())
        .map_err(|e| format!("build failed: {}", e))?;
    output.write_to_dir(&args.out_dir)?;

    let metadata = &output.questions.metadata;
    if output.questions.truncated {
        log::warn!("question data is full, some questions were left out");
    }
    eprintln!(
        "Build complete. Inserted {} questions from {} categories",
        metadata.question_count,
        metadata.categories.len(),
    );
    eprintln!("statistics:");
    eprintln!("  main dictionary:        {} words", output.main.len());
    eprintln!("  proper noun dictionary: {} words", output.proper.len());
    eprintln!("  time:  {:.3} sec", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn dict(args: &Dict) -> Result<(), Box<dyn std::error::Error>> {
    let dictionary = WordDictionary::from_file(&args.path)?;
    for (index, word) in dictionary.words().iter().enumerate() {
        println!("{:4}  {}", index, word);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Opt::parse();
    TermLogger::init(args.log_level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    match &args.command {
        Command::Build(build_args) => build(build_args),
        Command::Dict(dict_args) => dict(dict_args),
    }
}
