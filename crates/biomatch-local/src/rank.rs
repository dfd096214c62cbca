//! Rank corpus bios by TF-IDF cosine similarity to a query.
//!
//! The vectorizer is refit on corpus + query for every call: the query row
//! changes the document count and therefore every IDF weight.

use crate::textprep::{normalize_query, Stopwords};
use crate::tfidf::TfidfMatrix;
use biomatch_core::{Corpus, Error, QueryResult, Result};

pub const DEFAULT_TOP_K: usize = 10;

pub fn rank(corpus: &Corpus, query: &str, stopwords: &Stopwords) -> Result<QueryResult> {
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let mut docs: Vec<String> = corpus.records().map(|r| r.document()).collect();
    docs.push(normalize_query(query, stopwords));

    let m = TfidfMatrix::fit_transform(&docs);
    let q = m.n_docs() - 1;
    let scores: Vec<f64> = (0..q).map(|i| m.dot(q, i)).collect();
    tracing::debug!(
        docs = m.n_docs(),
        vocabulary = m.vocabulary_len(),
        "vectorized corpus + query"
    );

    Ok(QueryResult::new(
        corpus.names(),
        corpus.urls().map(str::to_string).collect(),
        scores,
    ))
}

/// Top-`k` listing: rank, name padded to the longest shown name, score to 4 places.
pub fn format_top(result: &QueryResult, k: usize) -> String {
    let width = result
        .top(k)
        .map(|(_, name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    let mut s = String::new();
    for (pos, (_, name, score)) in result.top(k).enumerate() {
        let num = format!("{}.", pos + 1);
        s.push_str(&format!(
            "      {num:<3} {name:<width$} (Score: {score:.4})\n"
        ));
    }
    s
}
