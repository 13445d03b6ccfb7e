use crate::store::{ListingDoc, ListingId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry in a term's postings list: frequency of the term in that
/// listing's title+description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub listing_id: ListingId,
    pub term_frequency: u32,
}

/// Inverted index partitioned by category, then subcategory.
///
/// Written only through [`InvertedIndex::insert`] (the loader's batch apply
/// holds the single write lock); read concurrently by query execution.
/// Append-only: there is no removal or update path, and a listing id is
/// indexed at most once.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    /// term -> category -> subcategory -> postings
    postings: HashMap<String, HashMap<String, HashMap<String, Vec<Posting>>>>,
    /// listing id -> (term -> frequency); doubles as the already-indexed guard
    doc_terms: HashMap<ListingId, HashMap<String, u32>>,
    /// listing id -> (category, subcategory); one bucket per listing
    doc_buckets: HashMap<ListingId, (String, String)>,
    /// term -> number of distinct listings containing it
    doc_frequencies: HashMap<String, u32>,
    doc_count: u64,
    corpus_len: u64,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one listing's term frequencies. Returns `false` (and changes
    /// nothing) when the id is already indexed, so checkpoint-overlap
    /// re-fetches are no-ops.
    pub fn insert(&mut self, doc: &ListingDoc, term_frequencies: HashMap<String, u32>) -> bool {
        if self.doc_terms.contains_key(&doc.id) {
            return false;
        }
        let token_count: u32 = term_frequencies.values().sum();
        for (term, tf) in &term_frequencies {
            *self.doc_frequencies.entry(term.clone()).or_insert(0) += 1;
            self.postings
                .entry(term.clone())
                .or_default()
                .entry(doc.category.clone())
                .or_default()
                .entry(doc.sub_category.clone())
                .or_default()
                .push(Posting {
                    listing_id: doc.id.clone(),
                    term_frequency: *tf,
                });
        }
        self.doc_buckets
            .insert(doc.id.clone(), (doc.category.clone(), doc.sub_category.clone()));
        self.doc_terms.insert(doc.id.clone(), term_frequencies);
        self.doc_count += 1;
        self.corpus_len += u64::from(token_count);
        true
    }

    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    pub fn average_doc_length(&self) -> f32 {
        if self.doc_count == 0 {
            return 0.0;
        }
        self.corpus_len as f32 / self.doc_count as f32
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.doc_frequencies.get(term).copied().unwrap_or(0)
    }

    /// A listing's own length: the sum of its term frequencies.
    pub fn doc_length(&self, id: &ListingId) -> u32 {
        self.doc_terms
            .get(id)
            .map(|terms| terms.values().sum())
            .unwrap_or(0)
    }

    /// Postings for `term` inside the filter scope. An absent category means
    /// the union across all categories; an absent subcategory the union
    /// within the category.
    pub fn postings_in_scope(
        &self,
        term: &str,
        category: Option<&str>,
        sub_category: Option<&str>,
    ) -> Vec<&Posting> {
        let mut matches = Vec::new();
        if let Some(by_category) = self.postings.get(term) {
            for (cat, by_sub) in by_category {
                if category.is_some_and(|c| c != cat.as_str()) {
                    continue;
                }
                for (sub, postings) in by_sub {
                    if sub_category.is_some_and(|s| s != sub.as_str()) {
                        continue;
                    }
                    matches.extend(postings.iter());
                }
            }
        }
        matches
    }

    /// Every indexed id inside the filter scope, in no particular order.
    pub fn ids_in_scope(&self, category: Option<&str>, sub_category: Option<&str>) -> Vec<ListingId> {
        self.doc_buckets
            .iter()
            .filter(|(_, (cat, sub))| {
                !category.is_some_and(|c| c != cat.as_str())
                    && !sub_category.is_some_and(|s| s != sub.as_str())
            })
            .map(|(id, _)| id.clone())
            .collect()
    }
}
