use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::corpus::EncodingMode;
use crate::errors::SearchResult;

/// Configuration for a CV search.
///
/// # Configuration Locations
///
/// Values are layered, later sources overriding earlier ones:
/// 1. Global `$HOME/.config/cvscout/config.yaml`
/// 2. Local `.cvscout.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// Command-line flags are applied last through [`SearchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// keywords: ["java", "sql"]
/// algorithm: "aho-corasick"   # kmp | boyer-moore | aho-corasick
/// top_n: 10
/// fuzzy_threshold: 80.0       # null disables the fuzzy fallback
/// corpus_dir: "data/cv_text"
/// file_extensions: ["txt"]
/// ignore_patterns: ["archive/**"]
/// encoding_mode: "lossy"      # failfast | lossy
/// thread_count: 4
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Keywords to search for; case-folded before use
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Exact matching algorithm selector. Unknown names fall back to KMP.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Maximum number of documents returned
    #[serde(default = "default_top_n")]
    pub top_n: NonZeroUsize,

    /// Minimum similarity (0-100) for a fuzzy match; `None` disables fuzzy
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: Option<f64>,

    /// Directory holding the extracted CV texts
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// File extensions treated as corpus documents; empty accepts all
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,

    /// Patterns to ignore under the corpus directory (glob syntax)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// How to handle corpus files with invalid UTF-8
    #[serde(default)]
    pub encoding_mode: EncodingMode,

    /// Number of worker threads used to scan documents
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_algorithm() -> String {
    "kmp".to_string()
}

fn default_top_n() -> NonZeroUsize {
    NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN)
}

fn default_fuzzy_threshold() -> Option<f64> {
    Some(80.0)
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            algorithm: default_algorithm(),
            top_n: default_top_n(),
            fuzzy_threshold: default_fuzzy_threshold(),
            corpus_dir: default_corpus_dir(),
            file_extensions: default_file_extensions(),
            ignore_patterns: Vec::new(),
            encoding_mode: EncodingMode::default(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

/// Command-line overrides; `None`/empty fields leave the file value alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub keywords: Vec<String>,
    pub algorithm: Option<String>,
    pub top_n: Option<NonZeroUsize>,
    pub fuzzy_threshold: Option<f64>,
    pub disable_fuzzy: bool,
    pub corpus_dir: Option<PathBuf>,
    pub file_extensions: Option<Vec<String>>,
    pub ignore_patterns: Vec<String>,
    pub encoding_mode: Option<EncodingMode>,
    pub thread_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file.
    ///
    /// An explicitly named file that does not exist is an error; missing
    /// default files are skipped.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("cvscout/config.yaml")),
            Some(PathBuf::from(".cvscout.yaml")),
        ];
        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Applies command-line values on top of the loaded configuration
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if !cli.keywords.is_empty() {
            self.keywords = cli.keywords;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(top_n) = cli.top_n {
            self.top_n = top_n;
        }
        if cli.disable_fuzzy {
            self.fuzzy_threshold = None;
        } else if cli.fuzzy_threshold.is_some() {
            self.fuzzy_threshold = cli.fuzzy_threshold;
        }
        if let Some(dir) = cli.corpus_dir {
            self.corpus_dir = dir;
        }
        if let Some(extensions) = cli.file_extensions {
            self.file_extensions = extensions;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if let Some(mode) = cli.encoding_mode {
            self.encoding_mode = mode;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        config_path
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            &dir,
            r#"
            keywords: ["java", "sql"]
            algorithm: "aho-corasick"
            top_n: 5
            fuzzy_threshold: 75.5
            corpus_dir: "data"
            file_extensions: ["txt", "text"]
            ignore_patterns: ["archive/**"]
            encoding_mode: "lossy"
            thread_count: 2
            log_level: "debug"
        "#,
        );

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.keywords, vec!["java", "sql"]);
        assert_eq!(config.algorithm, "aho-corasick");
        assert_eq!(config.top_n.get(), 5);
        assert_eq!(config.fuzzy_threshold, Some(75.5));
        assert_eq!(config.corpus_dir, PathBuf::from("data"));
        assert_eq!(config.file_extensions, vec!["txt", "text"]);
        assert_eq!(config.ignore_patterns, vec!["archive/**"]);
        assert_eq!(config.encoding_mode, EncodingMode::Lossy);
        assert_eq!(config.thread_count.get(), 2);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config(&dir, "keywords: [\"python\"]\n");

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.keywords, vec!["python"]);
        assert_eq!(config.algorithm, "kmp");
        assert_eq!(config.top_n.get(), 10);
        assert_eq!(config.fuzzy_threshold, Some(80.0));
        assert_eq!(config.file_extensions, vec!["txt"]);
        assert_eq!(config.encoding_mode, EncodingMode::FailFast);
        assert_eq!(config.thread_count, default_thread_count());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = SearchConfig {
            keywords: vec!["java".to_string()],
            algorithm: "kmp".to_string(),
            file_extensions: vec!["txt".to_string()],
            ..SearchConfig::default()
        };

        let merged = file_config.clone().merge_with_cli(CliOverrides {
            keywords: vec!["rust".to_string()],
            algorithm: Some("boyer-moore".to_string()),
            top_n: NonZeroUsize::new(3),
            fuzzy_threshold: Some(90.0),
            thread_count: NonZeroUsize::new(8),
            ..CliOverrides::default()
        });
        assert_eq!(merged.keywords, vec!["rust"]);
        assert_eq!(merged.algorithm, "boyer-moore");
        assert_eq!(merged.top_n.get(), 3);
        assert_eq!(merged.fuzzy_threshold, Some(90.0));
        assert_eq!(merged.thread_count.get(), 8);
        assert_eq!(merged.file_extensions, vec!["txt"]); // file value kept

        let merged = file_config.merge_with_cli(CliOverrides {
            disable_fuzzy: true,
            fuzzy_threshold: Some(50.0),
            ..CliOverrides::default()
        });
        assert_eq!(merged.fuzzy_threshold, None);
        assert_eq!(merged.keywords, vec!["java"]);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            &dir,
            r#"
            top_n: 0
            thread_count: "invalid"
        "#,
        );

        let result = SearchConfig::load_from(Some(&config_path));
        assert!(matches!(result, Err(SearchError::ConfigError(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
