use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use cvscout::{
    similarity, Algorithm, CliOverrides, Corpus, EncodingMode, SearchConfig, SearchOutcome,
    Searcher,
};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Keyword to search for (repeatable; commas also separate keywords)
    #[arg(short = 'k', long = "keyword", value_delimiter = ',')]
    keywords: Vec<String>,

    /// Directory containing extracted CV text files
    #[arg(short = 'd', long = "dir")]
    corpus_dir: Option<PathBuf>,

    /// Exact matching algorithm (kmp|boyer-moore|aho-corasick)
    #[arg(short = 'a', long)]
    algorithm: Option<String>,

    /// Maximum number of CVs to show
    #[arg(short = 'n', long)]
    top: Option<NonZeroUsize>,

    /// Minimum similarity (0-100) for fuzzy matches of unmatched keywords
    #[arg(short = 't', long)]
    threshold: Option<f64>,

    /// Disable the fuzzy fallback
    #[arg(long, conflicts_with = "threshold")]
    no_fuzzy: bool,

    /// File extensions to load (e.g. txt,text)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// How to handle invalid UTF-8 sequences
    #[arg(long, value_parser = ["failfast", "lossy"], ignore_case = true)]
    encoding: Option<String>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,
}

impl CliSearchConfig {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            keywords: self.keywords.clone(),
            algorithm: self.algorithm.clone(),
            top_n: self.top,
            fuzzy_threshold: self.threshold,
            disable_fuzzy: self.no_fuzzy,
            corpus_dir: self.corpus_dir.clone(),
            file_extensions: self.extensions.as_ref().map(|e| {
                e.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            ignore_patterns: self.ignore.clone(),
            encoding_mode: self.encoding.as_deref().map(|e| match e.to_lowercase().as_str() {
                "lossy" => EncodingMode::Lossy,
                _ => EncodingMode::FailFast,
            }),
            thread_count: self.threads,
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank CVs by keyword matches
    Search(Box<CliSearchConfig>),

    /// Show the edit distance and similarity of two words
    Similarity {
        /// First word
        first: String,
        /// Second word
        second: String,
    },
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            let config = SearchConfig::load_from(args.config.as_deref())
                .context("failed to load configuration")?
                .merge_with_cli(args.overrides());
            init_logging(&config.log_level);

            if config.keywords.is_empty() {
                anyhow::bail!("at least one keyword is required (-k)");
            }

            let corpus = Corpus::load_dir(
                &config.corpus_dir,
                &config.file_extensions,
                &config.ignore_patterns,
                config.encoding_mode,
            )
            .with_context(|| format!("failed to load CVs from {}", config.corpus_dir.display()))?;

            let searcher = Searcher::from_config(&config);
            let outcome = searcher.search_named(
                &corpus,
                &config.keywords,
                &config.algorithm,
                config.top_n,
                config.fuzzy_threshold,
            );
            searcher.metrics().log_stats();

            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                let algorithm = Algorithm::parse_or_default(&config.algorithm);
                let fuzzy_enabled = config.fuzzy_threshold.is_some_and(|t| !t.is_nan());
                print_search_results(&outcome, algorithm, fuzzy_enabled);
            }
            Ok(())
        }
        Commands::Similarity { first, second } => {
            let (first, second) = (first.to_lowercase(), second.to_lowercase());
            println!(
                "Distance: {}\nSimilarity: {:.2}%",
                similarity::distance(&first, &second),
                similarity::similarity_percentage(&first, &second)
            );
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_search_results(outcome: &SearchOutcome, algorithm: Algorithm, fuzzy_enabled: bool) {
    println!(
        "Exact match ({}): {} CVs scanned in {:.3} ms",
        algorithm, outcome.documents_scanned, outcome.exact_time_ms
    );
    if !fuzzy_enabled {
        println!("Fuzzy match: disabled");
    } else if outcome.unmatched_keywords.is_empty() {
        println!("Fuzzy match: not needed");
    } else {
        println!(
            "Fuzzy match for [{}]: {:.3} ms",
            outcome.unmatched_keywords.join(", "),
            outcome.fuzzy_time_ms
        );
    }

    if outcome.results.is_empty() {
        println!("\nNo matching CVs found");
        return;
    }

    for (rank, result) in outcome.results.iter().enumerate() {
        println!("\n{}. {}", rank + 1, result.doc_id.blue());
        if result.total_exact > 0 {
            println!("   {} {} occurrences", "exact:".green(), result.total_exact);
            for (keyword, count) in &result.exact_counts {
                println!("     {}: {}", keyword, count);
            }
        }
        if !result.fuzzy_scores.is_empty() {
            println!(
                "   {} best {:.1}%",
                "fuzzy:".yellow(),
                result.highest_fuzzy
            );
            for (keyword, score) in &result.fuzzy_scores {
                println!("     {}: {:.1}%", keyword, score);
            }
        }
    }
}
