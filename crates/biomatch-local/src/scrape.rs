//! The scrape pipeline: directory page -> bio links -> bio records.
//!
//! Everything here is sequential: one fetch at a time, in link order.

use crate::extract::{extract_bio, TagPair};
use crate::links::{extract_bio_links, resolve_link, url_tail};
use crate::probe::{probe_tags, TagPreview};
use crate::textprep::Stopwords;
use biomatch_core::{Corpus, Error, FetchBackend, FetchRequest, Result};
use std::collections::BTreeSet;

/// A page dropped from the corpus because extraction failed.
#[derive(Debug, Clone)]
pub struct SkippedPage {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub corpus: Corpus,
    pub skipped: Vec<SkippedPage>,
}

/// Fetch `url` and return its body as text; non-2xx statuses are network errors.
pub async fn fetch_html<F: FetchBackend + ?Sized>(
    fetcher: &F,
    url: &str,
    timeout_ms: Option<u64>,
) -> Result<String> {
    let req = FetchRequest {
        timeout_ms,
        ..FetchRequest::new(url)
    };
    let resp = fetcher.fetch(&req).await?;
    if !resp.is_success() {
        return Err(Error::Network(format!("{url}: HTTP {}", resp.status)));
    }
    tracing::debug!(url, status = resp.status, bytes = resp.bytes.len(), elapsed_ms = %resp.elapsed_ms, "fetched");
    Ok(resp.text_lossy())
}

/// Fetch the directory page and return the bio links starting with `slug`.
pub async fn discover_links<F: FetchBackend + ?Sized>(
    fetcher: &F,
    directory: &str,
    slug: &str,
    timeout_ms: Option<u64>,
) -> Result<Vec<String>> {
    tracing::info!(directory, "scraping bio links from staff directory");
    let html = fetch_html(fetcher, directory, timeout_ms).await?;
    let links = extract_bio_links(&html, slug);
    tracing::info!(count = links.len(), slug, "found bio links");
    Ok(links)
}

/// Probe the first link's page for candidate name/bio tags.
pub async fn probe_first<F: FetchBackend + ?Sized>(
    fetcher: &F,
    directory: &str,
    links: &[String],
    slug: &str,
    timeout_ms: Option<u64>,
) -> Result<Vec<TagPreview>> {
    let first = links.first().ok_or_else(|| Error::NoLinks(slug.to_string()))?;
    let url = resolve_link(directory, first)?;
    tracing::info!(url = %url, "testing html tags on bio page");
    let html = fetch_html(fetcher, &url, timeout_ms).await?;
    Ok(probe_tags(&html))
}

/// Fetch and extract every link into a fresh corpus.
///
/// Pages whose name tag is missing are skipped and reported; a fetch failure
/// aborts the whole build. Repeated links are fetched once.
pub async fn build_corpus<F: FetchBackend + ?Sized>(
    fetcher: &F,
    directory: &str,
    links: &[String],
    tags: &TagPair,
    stopwords: &Stopwords,
    timeout_ms: Option<u64>,
) -> Result<BuildReport> {
    tracing::info!(
        name_tag = tags.name_tag(),
        bio_tag = tags.bio_tag(),
        "extracting bios"
    );
    let mut corpus = Corpus::new();
    let mut skipped = Vec::new();
    let mut seen = BTreeSet::new();
    let total = links.len();

    for (ix, link) in links.iter().enumerate() {
        if !seen.insert(link.as_str()) {
            continue;
        }
        tracing::info!("scraping .../{}/ ({}/{})", url_tail(link), ix + 1, total);
        let url = resolve_link(directory, link)?;
        let html = fetch_html(fetcher, &url, timeout_ms).await?;
        match extract_bio(link, &html, tags, stopwords) {
            Ok(rec) => {
                corpus.insert(rec);
            }
            Err(Error::Extraction(reason)) => {
                tracing::warn!(url = %link, %reason, "skipping page");
                skipped.push(SkippedPage {
                    url: link.clone(),
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        records = corpus.len(),
        skipped = skipped.len(),
        "corpus built"
    );
    Ok(BuildReport { corpus, skipped })
}
