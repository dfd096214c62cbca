//! Smoothed TF-IDF with L2-normalized rows.
//!
//! Weights are `tf * (ln((1 + n) / (1 + df)) + 1)` with raw term counts for
//! `tf`. Terms are runs of two or more word characters (alphanumeric or `_`),
//! lower-cased. Rows are sparse and sorted by term index.

use std::collections::BTreeMap;

/// Split a document into vectorizer terms.
pub fn analyze(doc: &str) -> Vec<String> {
    fn flush(cur: &mut String, out: &mut Vec<String>) {
        if cur.chars().count() >= 2 {
            out.push(std::mem::take(cur));
        } else {
            cur.clear();
        }
    }

    let mut out = Vec::new();
    let mut cur = String::new();
    for ch in doc.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            for lc in ch.to_lowercase() {
                cur.push(lc);
            }
        } else if !cur.is_empty() {
            flush(&mut cur, &mut out);
        }
    }
    if !cur.is_empty() {
        flush(&mut cur, &mut out);
    }
    out
}

#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<Vec<(usize, f64)>>,
}

impl TfidfMatrix {
    /// Fit the vocabulary and IDF on `docs` and transform them in one pass.
    pub fn fit_transform<S: AsRef<str>>(docs: &[S]) -> Self {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|d| analyze(d.as_ref())).collect();

        // Sorted vocabulary gives stable column indices.
        let mut vocabulary: BTreeMap<String, usize> = analyzed
            .iter()
            .flatten()
            .map(|t| (t.clone(), 0))
            .collect();
        for (i, v) in vocabulary.values_mut().enumerate() {
            *v = i;
        }

        let counts: Vec<BTreeMap<usize, f64>> = analyzed
            .iter()
            .map(|terms| {
                let mut tf = BTreeMap::new();
                for t in terms {
                    if let Some(&col) = vocabulary.get(t) {
                        *tf.entry(col).or_insert(0.0) += 1.0;
                    }
                }
                tf
            })
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for row in &counts {
            for &col in row.keys() {
                df[col] += 1;
            }
        }
        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|tf| {
                let mut row: Vec<(usize, f64)> =
                    tf.into_iter().map(|(col, c)| (col, c * idf[col])).collect();
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        Self {
            vocabulary,
            idf,
            rows,
        }
    }

    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&col| self.idf[col])
    }

    pub fn row(&self, i: usize) -> &[(usize, f64)] {
        &self.rows[i]
    }

    /// Dot product of two rows; cosine similarity since rows are unit length.
    pub fn dot(&self, a: usize, b: usize) -> f64 {
        let (ra, rb) = (&self.rows[a], &self.rows[b]);
        let (mut i, mut j) = (0usize, 0usize);
        let mut sum = 0.0;
        while i < ra.len() && j < rb.len() {
            match ra[i].0.cmp(&rb[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += ra[i].1 * rb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}
