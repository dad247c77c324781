//! Command-line entry point for a word corpus.
//!
//! # Responsibility
//! - Admit words given on the command line and report every violation.
//! - Keep output line-oriented and deterministic for scripting.
//!
//! Configuration comes from an optional `--config <file.json>` plus
//! `WORDCORPUS_*` environment overrides.

use std::error::Error;
use std::process::ExitCode;
use wordcorpus_core::{
    core_version, CorpusConfig, SqliteWordRepository, WordEntry, WordListQuery, WordService,
    WordServiceError,
};

const USAGE: &str = "usage: wordcorpus_cli [--config <file.json>] <add <word>...|list|version>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<ExitCode, Box<dyn Error>> {
    let (config_path, command) = match args {
        [flag, path, rest @ ..] if flag == "--config" => (Some(path), rest),
        rest => (None, rest),
    };

    let config = match config_path {
        Some(path) => {
            CorpusConfig::from_json_file(path)?.with_overrides(|key| std::env::var(key).ok())?
        }
        None => CorpusConfig::from_env()?,
    };

    match command.split_first() {
        Some((name, [])) if name == "version" => {
            println!("wordcorpus_core version={}", core_version());
            Ok(ExitCode::SUCCESS)
        }
        Some((name, words)) if name == "add" && !words.is_empty() => {
            with_service(&config, |service| add_words(service, words))
        }
        Some((name, [])) if name == "list" => with_service(&config, |service| {
            for entry in service.list_words(&WordListQuery::default())? {
                print_entry(&entry);
            }
            Ok(ExitCode::SUCCESS)
        }),
        _ => {
            eprintln!("{USAGE}");
            Ok(ExitCode::from(2))
        }
    }
}

fn with_service<T>(
    config: &CorpusConfig,
    body: impl FnOnce(&WordService<SqliteWordRepository<'_>>) -> Result<T, Box<dyn Error>>,
) -> Result<T, Box<dyn Error>> {
    config.init_logging()?;
    if !config.is_persistent() {
        eprintln!(
            "warning: no database path configured (set db_path or WORDCORPUS_DB_PATH); \
             corpus is in memory and will not be saved"
        );
    }
    let conn = config.open_database()?;
    let repo = SqliteWordRepository::try_new(&conn)?;
    body(&WordService::with_scope(repo, config.uniqueness_scope))
}

fn add_words(
    service: &WordService<SqliteWordRepository<'_>>,
    words: &[String],
) -> Result<ExitCode, Box<dyn Error>> {
    let mut rejected = false;
    for word in words {
        match service.add_word(word.as_str()) {
            Ok(entry) => print_entry(&entry),
            Err(WordServiceError::Rejected(errors)) => {
                rejected = true;
                println!("rejected name={word:?} reason={errors}");
            }
            Err(other) => return Err(other.into()),
        }
    }

    Ok(if rejected {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_entry(entry: &WordEntry) {
    println!(
        "word id={} name={:?} characters={} proper_noun={}",
        entry.id(),
        entry.name(),
        entry.characters(),
        entry.proper_noun()
    );
}
