use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{SearchError, SearchResult};

/// How to handle corpus files that are not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Reject the file with [`SearchError::EncodingError`]
    #[default]
    FailFast,
    /// Replace invalid sequences with U+FFFD
    Lossy,
}

/// One extracted CV text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Document id to extracted text, in insertion order.
///
/// Ranking ties are broken by this order, so it must be deterministic for
/// a given input.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, replacing the text of an existing id in place
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        let id = id.into();
        let text = text.into();
        match self.index.get(&id) {
            Some(&position) => self.documents[position].text = text,
            None => {
                self.index.insert(id.clone(), self.documents.len());
                self.documents.push(Document { id, text });
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.index
            .get(id)
            .map(|&position| self.documents[position].text.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Loads every matching file under `root` as one document keyed by its
    /// path.
    ///
    /// `extensions` filters by file extension (case-insensitive); an empty
    /// list accepts every file. `ignore_patterns` use gitignore glob syntax.
    pub fn load_dir(
        root: &Path,
        extensions: &[String],
        ignore_patterns: &[String],
        encoding_mode: EncodingMode,
    ) -> SearchResult<Self> {
        if !root.exists() {
            return Err(SearchError::file_not_found(root));
        }

        let mut overrides = OverrideBuilder::new(root);
        for pattern in ignore_patterns {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| SearchError::config_error(format!("ignore pattern {pattern}: {e}")))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| SearchError::config_error(e.to_string()))?;

        let mut paths: Vec<PathBuf> = WalkBuilder::new(root)
            .hidden(true)
            .ignore(true)
            .git_ignore(true)
            .overrides(overrides)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| has_extension(path, extensions))
            .collect();
        paths.sort();

        debug!("Found {} corpus files under {}", paths.len(), root.display());

        let mut corpus = Self::new();
        for path in paths {
            let text = read_text(&path, encoding_mode)?;
            corpus.insert(path.display().to_string(), text);
        }

        info!("Loaded {} documents into memory", corpus.len());
        Ok(corpus)
    }
}

impl<K, V> FromIterator<(K, V)> for Corpus
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for (id, text) in iter {
            corpus.insert(id, text);
        }
        corpus
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

fn read_text(path: &Path, encoding_mode: EncodingMode) -> SearchResult<String> {
    let bytes = std::fs::read(path).map_err(|e| SearchError::from_io(path, e))?;

    match encoding_mode {
        EncodingMode::FailFast => {
            String::from_utf8(bytes).map_err(|e| SearchError::encoding_error(path, e))
        }
        EncodingMode::Lossy => {
            let text = String::from_utf8_lossy(&bytes);
            if let std::borrow::Cow::Owned(_) = text {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            Ok(text.into_owned())
        }
    }
}
