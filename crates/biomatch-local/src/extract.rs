use crate::textprep::{normalize_paragraph, tokenize_paragraphs, Stopwords};
use biomatch_core::{BioRecord, Error, Result};

/// The pair of tag selectors used to pull a name and bio paragraphs from a page.
#[derive(Debug, Clone)]
pub struct TagPair {
    name_tag: String,
    bio_tag: String,
    name_sel: html_scraper::Selector,
    bio_sel: html_scraper::Selector,
}

pub const DEFAULT_NAME_TAG: &str = "h2";
pub const DEFAULT_BIO_TAG: &str = "p";

impl TagPair {
    pub fn new(name_tag: &str, bio_tag: &str) -> Result<Self> {
        let parse = |tag: &str| {
            html_scraper::Selector::parse(tag)
                .map_err(|e| Error::InvalidSelector(format!("{tag:?}: {e}")))
        };
        Ok(Self {
            name_sel: parse(name_tag)?,
            bio_sel: parse(bio_tag)?,
            name_tag: name_tag.to_string(),
            bio_tag: bio_tag.to_string(),
        })
    }

    pub fn name_tag(&self) -> &str {
        &self.name_tag
    }

    pub fn bio_tag(&self) -> &str {
        &self.bio_tag
    }
}

fn element_text(el: &html_scraper::ElementRef) -> String {
    el.text().collect::<String>()
}

/// Extract one bio record from a page.
///
/// The first `name_tag` element is the name; a page without one fails with
/// [`Error::Extraction`]. Every `bio_tag` element becomes a paragraph; zero
/// matches yield an empty (but valid) record.
pub fn extract_bio(url: &str, html: &str, tags: &TagPair, stopwords: &Stopwords) -> Result<BioRecord> {
    let doc = html_scraper::Html::parse_document(html);

    let name = doc
        .select(&tags.name_sel)
        .next()
        .map(|el| element_text(&el).trim().to_string())
        .ok_or_else(|| Error::Extraction(format!("{url}: no <{}> element", tags.name_tag)))?;

    let paragraphs: Vec<String> = doc
        .select(&tags.bio_sel)
        .map(|el| normalize_paragraph(&element_text(&el)))
        .collect();

    let tokens = tokenize_paragraphs(&paragraphs, stopwords);

    Ok(BioRecord {
        url: url.to_string(),
        name,
        paragraphs,
        tokens,
    })
}
