use biomatch_core::{Error, Result};

/// Extract candidate bio links from a directory page.
///
/// - Returns raw `href` values of `<a>` elements, in document order.
/// - Anchors without an `href` are dropped.
/// - Only targets starting with `prefix` are kept. Duplicates are not removed.
pub fn extract_bio_links(html: &str, prefix: &str) -> Vec<String> {
    let doc = html_scraper::Html::parse_document(html);
    let sel = match html_scraper::Selector::parse("a") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::new();
    for el in doc.select(&sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.starts_with(prefix) {
            out.push(href.to_string());
        }
    }
    out
}

/// Resolve a discovered link against the directory page it came from.
///
/// Absolute links are returned unchanged (minus the fragment); relative links are
/// joined onto `base_url`.
pub fn resolve_link(base_url: &str, href: &str) -> Result<String> {
    let mut u = match url::Url::parse(href) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = url::Url::parse(base_url)
                .map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
            base.join(href)
                .map_err(|e| Error::InvalidUrl(format!("{href}: {e}")))?
        }
        Err(e) => return Err(Error::InvalidUrl(format!("{href}: {e}"))),
    };
    u.set_fragment(None);
    Ok(u.to_string())
}

/// Last two path segments of a bio url, for progress lines (`.../staff/jane-doe/`).
pub fn url_tail(url: &str) -> String {
    let parts: Vec<&str> = url.split('/').collect();
    let n = parts.len();
    if n < 3 {
        return url.to_string();
    }
    parts[n - 3..n - 1].join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_only_prefixed_links_in_document_order() {
        let html = r#"
        <html><body>
          <a href="https://example.com/staff/zoe/">Zoe</a>
          <a name="anchor-only">no target</a>
          <a href="https://example.com/news/">News</a>
          <a href="https://example.com/staff/adam/">Adam</a>
          <a href="mailto:staff@example.com">mail</a>
          <a href="https://example.com/staff/zoe/">Zoe again</a>
        </body></html>
        "#;
        let links = extract_bio_links(html, "https://example.com/staff/");
        assert_eq!(
            links,
            vec![
                "https://example.com/staff/zoe/",
                "https://example.com/staff/adam/",
                "https://example.com/staff/zoe/",
            ]
        );
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let html = "<html><body><a href='/about'>About</a><p>nobody here</p></body></html>";
        assert!(extract_bio_links(html, "/staff/").is_empty());
        assert!(extract_bio_links("", "/staff/").is_empty());
    }

    #[test]
    fn relative_prefix_matches_raw_href() {
        let html = r#"<a href="/staff/jane/">Jane</a><a href="https://example.com/staff/bob/">Bob</a>"#;
        assert_eq!(extract_bio_links(html, "/staff/"), vec!["/staff/jane/"]);
    }

    #[test]
    fn resolves_relative_and_drops_fragment() {
        assert_eq!(
            resolve_link("https://example.com/people/", "/staff/jane/#bio").unwrap(),
            "https://example.com/staff/jane/"
        );
        assert_eq!(
            resolve_link("https://example.com/people/", "https://other.test/x").unwrap(),
            "https://other.test/x"
        );
        assert!(matches!(
            resolve_link("not a url", "/staff/jane/"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn url_tail_takes_last_two_segments() {
        assert_eq!(url_tail("https://idss.mit.edu/staff/jane-doe/"), "staff/jane-doe");
        assert_eq!(url_tail("x"), "x");
    }

    proptest! {
        #[test]
        fn output_always_starts_with_prefix(paths in proptest::collection::vec("[a-z/]{0,12}", 0..12)) {
            let prefix = "/staff/";
            let html: String = paths
                .iter()
                .map(|p| format!("<a href=\"{p}\">x</a><a>no href</a>"))
                .collect();
            let links = extract_bio_links(&html, prefix);
            prop_assert!(links.iter().all(|l| l.starts_with(prefix)));
            let expected = paths.iter().filter(|p| p.starts_with(prefix)).count();
            prop_assert_eq!(links.len(), expected);
        }
    }
}
