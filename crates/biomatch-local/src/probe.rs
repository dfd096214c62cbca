//! Tag probing: show which heading/paragraph tags a sample bio page uses so an
//! operator can pick the name and bio tags before scraping.

use serde::Serialize;

pub const PROBE_TAGS: [&str; 7] = ["h1", "h2", "h3", "h4", "h5", "h6", "p"];

const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPreview {
    pub tag: &'static str,
    /// Full text of the first element with this tag.
    pub text: String,
}

/// First-element text for every probe tag present in `html`, in probe order.
pub fn probe_tags(html: &str) -> Vec<TagPreview> {
    let doc = html_scraper::Html::parse_document(html);
    let mut out = Vec::new();
    for tag in PROBE_TAGS {
        let Ok(sel) = html_scraper::Selector::parse(tag) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            out.push(TagPreview {
                tag,
                text: el.text().collect::<String>(),
            });
        }
    }
    out
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

pub fn format_probe(previews: &[TagPreview]) -> String {
    let mut s = String::new();
    for p in previews {
        s.push_str(&format!("      -- {:>2}: {}\n", p.tag, preview(&p.text)));
    }
    s
}
