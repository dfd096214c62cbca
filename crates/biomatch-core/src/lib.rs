use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("invalid tag selector: {0}")]
    InvalidSelector(String),
    #[error("no bio links found with prefix {0:?}")]
    NoLinks(String),
    #[error("corpus load failed: {0}")]
    CorpusLoad(String),
    #[error("corpus save failed: {0}")]
    CorpusSave(String),
    #[error("corpus is empty; nothing to rank")]
    EmptyCorpus,
    #[error("stopwords: {0}")]
    Stopwords(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Timeout for the operation (network + body read).
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            max_bytes: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub elapsed_ms: u128,
}

impl FetchResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

/// One scraped biography.
///
/// `url` is the corpus key; it is not repeated inside the persisted record.
/// `bio`/`data` aliases accept stores written by older tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioRecord {
    #[serde(skip)]
    pub url: String,
    pub name: String,
    #[serde(alias = "bio")]
    pub paragraphs: Vec<String>,
    #[serde(alias = "data")]
    pub tokens: Vec<String>,
}

impl BioRecord {
    /// Tokens joined by single spaces: the document string fed to vectorization.
    pub fn document(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn is_degenerate(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Ordered `url -> BioRecord` mapping.
///
/// Iteration order is insertion order. Re-inserting an existing url replaces the
/// record in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, BioRecord>", into = "IndexMap<String, BioRecord>")]
pub struct Corpus {
    records: IndexMap<String, BioRecord>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: BioRecord) -> Option<BioRecord> {
        self.records.insert(record.url.clone(), record)
    }

    pub fn get(&self, url: &str) -> Option<&BioRecord> {
        self.records.get(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &BioRecord> {
        self.records.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.records.values().map(|r| r.name.clone()).collect()
    }
}

impl From<IndexMap<String, BioRecord>> for Corpus {
    fn from(mut records: IndexMap<String, BioRecord>) -> Self {
        // The key is the source of truth for `url`.
        for (url, rec) in records.iter_mut() {
            rec.url = url.clone();
        }
        Self { records }
    }
}

impl From<Corpus> for IndexMap<String, BioRecord> {
    fn from(c: Corpus) -> Self {
        c.records
    }
}

impl FromIterator<BioRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = BioRecord>>(iter: I) -> Self {
        let mut c = Corpus::new();
        for rec in iter {
            c.insert(rec);
        }
        c
    }
}

/// Similarity of every corpus record to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Record names, in corpus order.
    pub names: Vec<String>,
    /// Record urls, in corpus order.
    pub urls: Vec<String>,
    /// Cosine similarity per record, in corpus order.
    pub scores: Vec<f64>,
    /// Corpus indices by descending score; ties keep corpus order.
    pub ranking: Vec<usize>,
}

impl QueryResult {
    pub fn new(names: Vec<String>, urls: Vec<String>, scores: Vec<f64>) -> Self {
        let mut ranking: Vec<usize> = (0..scores.len()).collect();
        // `sort_by` is stable, so equal scores stay in corpus order.
        ranking.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            names,
            urls,
            scores,
            ranking,
        }
    }

    /// `(index, name, score)` in rank order, at most `k` entries.
    pub fn top(&self, k: usize) -> impl Iterator<Item = (usize, &str, f64)> {
        self.ranking
            .iter()
            .take(k)
            .map(|&i| (i, self.names[i].as_str(), self.scores[i]))
    }
}
