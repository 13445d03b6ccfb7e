use crate::config::{BM25_B, BM25_K1};

/// BM25 score for one (term, document) pair.
///
/// An empty corpus, an unknown term, or a zero average length all score 0 —
/// "no match" rather than a NaN or a division by zero.
pub fn bm25(
    term_frequency: u32,
    document_frequency: u32,
    doc_count: u64,
    doc_length: u32,
    avg_doc_length: f32,
) -> f32 {
    if doc_count == 0 || document_frequency == 0 || avg_doc_length <= 0.0 {
        return 0.0;
    }
    let n = doc_count as f32;
    let df = document_frequency as f32;
    let tf = term_frequency as f32;
    let dl = doc_length as f32;

    let idf = ((n - df + 0.5) / (df + 0.5)).ln();
    let saturation =
        (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * dl / avg_doc_length));
    idf * saturation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_monotonic_in_term_frequency() {
        let low = bm25(1, 2, 100, 10, 10.0);
        let mid = bm25(3, 2, 100, 10, 10.0);
        let high = bm25(10, 2, 100, 10, 10.0);
        assert!(low < mid);
        assert!(mid < high);
    }

    #[test]
    fn longer_documents_never_score_higher() {
        let short = bm25(2, 2, 100, 5, 10.0);
        let long = bm25(2, 2, 100, 50, 10.0);
        assert!(long < short);
    }

    #[test]
    fn rare_terms_outscore_common_ones() {
        let rare = bm25(1, 1, 100, 10, 10.0);
        let common = bm25(1, 40, 100, 10, 10.0);
        assert!(rare > common);
    }

    #[test]
    fn empty_corpus_scores_zero() {
        assert_eq!(bm25(1, 1, 0, 10, 10.0), 0.0);
    }

    #[test]
    fn unknown_term_scores_zero() {
        assert_eq!(bm25(1, 0, 100, 10, 10.0), 0.0);
    }

    #[test]
    fn zero_average_length_scores_zero() {
        assert_eq!(bm25(1, 1, 100, 0, 0.0), 0.0);
    }

    #[test]
    fn idf_goes_negative_for_majority_terms() {
        // a term in more than half the corpus is penalized, not dropped
        let score = bm25(1, 80, 100, 10, 10.0);
        assert!(score < 0.0);
        assert!(score.is_finite());
    }
}
