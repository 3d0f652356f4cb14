use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use serde::Serialize;

use rs_gram_core::MultiGramModel;
use rs_gram_core::io::{list_files, normalize_folder};
use rs_gram_core::model::generator::Strategy;
use rs_gram_core::model::prediction_input::PredictionInput;
use rs_gram_core::model::tokenizer;

#[derive(Parser, Debug)]
#[command(name = "rs-gram", about = "Learn word n-grams from text files and generate new text")]
struct Args {
    /// Word list used to seed the vocabulary (one word per line)
    #[arg(short, long)]
    wordlist: Option<PathBuf>,

    /// Training text file, or folder whose .txt files are all ingested
    #[arg(short, long, required = true)]
    corpus: Vec<String>,

    /// Longest context used for prediction (n-grams up to step_max + 1 words)
    #[arg(long, default_value = "4")]
    step_max: usize,

    /// JSON file holding generation parameters, flags below override it
    #[arg(long)]
    input: Option<PathBuf>,

    /// Seed words to start from
    #[arg(short, long)]
    seed: Option<String>,

    /// Start from a random observed n-gram of this many words
    #[arg(long, conflicts_with = "seed")]
    random_seed: Option<usize>,

    /// Number of words to generate
    #[arg(short, long)]
    n: Option<usize>,

    /// Sample continuations instead of always taking the most likely one
    #[arg(long)]
    softmax: bool,

    /// Fixed RNG seed, for reproducible output
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Print how often these words were seen in sequence, instead of generating
    #[arg(long)]
    count: Option<String>,

    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Generated<'a> {
    words: &'a [String],
    text: String,
}

#[derive(Serialize)]
struct Counted<'a> {
    ngram: &'a [String],
    count: u64,
}

/// Expands folders into the .txt files they contain.
fn corpus_files(entries: &[String]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    for entry in entries {
        let path = normalize_folder(entry);
        if path.is_dir() {
            files.extend(list_files(&path, "txt")?);
        } else {
            files.push(path);
        }
    }
    Ok(files)
}

/// Builds the generation parameters from the JSON file and the flags.
fn prediction_input(args: &Args) -> Result<PredictionInput, Box<dyn Error>> {
    let mut input = match &args.input {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PredictionInput::new(),
    };

    if let Some(n) = args.n {
        input.nb_words = n;
    }
    if args.softmax {
        input.strategy = Strategy::Softmax;
    }
    if args.rng_seed.is_some() {
        input.rng_seed = args.rng_seed;
    }
    if let Some(seed) = &args.seed {
        let words: Vec<String> = tokenizer::words(seed).collect();
        input.set_custom_seed(&words)?;
    }
    if let Some(len) = args.random_seed {
        input.set_random_seed(len)?;
    }

    Ok(input)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut model = match &args.wordlist {
        Some(path) => MultiGramModel::with_word_list(path, args.step_max)?,
        None => MultiGramModel::new(args.step_max),
    };

    for file in corpus_files(&args.corpus)? {
        model.ingest(&file)?;
    }
    model.compute_proba()?;
    info!(
        "model ready: {} words in vocabulary, {} tokens read",
        model.vocabulary().len(),
        model.counts().total_tokens()
    );

    if let Some(words) = &args.count {
        let ngram: Vec<String> = tokenizer::words(words).collect();
        let count = model.count_of(&ngram)?;
        if args.json {
            println!("{}", serde_json::to_string(&Counted { ngram: &ngram, count })?);
        } else {
            println!("{}: {}", ngram.join(" "), count);
        }
        return Ok(());
    }

    let input = prediction_input(&args)?;
    let words = model.generate(&input)?;
    let text = words.join(" ");
    if args.json {
        println!("{}", serde_json::to_string(&Generated { words: &words, text })?);
    } else {
        println!("{}", text);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("input.json");
        fs::write(&json, r#"{ "nb_words": 5, "strategy": "softmax", "rng_seed": 1 }"#).unwrap();

        let args = Args::parse_from([
            "rs-gram",
            "--corpus",
            "data",
            "--input",
            json.to_str().unwrap(),
            "-n",
            "9",
            "--seed",
            "the cat.",
        ]);
        let input = prediction_input(&args).unwrap();
        assert_eq!(input.nb_words, 9);
        assert_eq!(input.strategy, Strategy::Softmax);
        assert_eq!(input.rng_seed, Some(1));
        assert_eq!(
            input.start_seed(),
            &rs_gram_core::model::prediction_input::StartSeed::Custom(vec![
                "the".to_owned(),
                "cat".to_owned(),
                ".".to_owned()
            ])
        );
    }

    #[test]
    fn folders_expand_to_text_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("skip.md"), "c").unwrap();
        let single = dir.path().join("a.txt").to_string_lossy().to_string();

        let files = corpus_files(&[dir.path().to_string_lossy().to_string(), single]).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.txt"));
        assert!(files[1].ends_with("b.txt"));
    }

    #[test]
    fn seed_and_random_seed_conflict() {
        let parsed = Args::try_parse_from(["rs-gram", "-c", "x", "--seed", "a", "--random-seed", "2"]);
        assert!(parsed.is_err());
    }
}
