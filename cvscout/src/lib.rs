pub mod cache;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod matching;
pub mod metrics;
pub mod results;
pub mod search;
pub mod similarity;

pub use cache::AutomatonCache;
pub use config::{CliOverrides, SearchConfig};
pub use corpus::{Corpus, Document, EncodingMode};
pub use errors::{SearchError, SearchResult};
pub use results::{DocumentMatch, SearchOutcome};
pub use search::{Algorithm, Searcher};
