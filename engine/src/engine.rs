use crate::cache::QueryCache;
use crate::config::EngineConfig;
use crate::index::InvertedIndex;
use crate::score::bm25;
use crate::sort::{paginate, sort_listings, Order, SortKey};
use crate::store::{Listing, ListingDoc, ListingId, ListingStore};
use crate::tokenizer::{tokenize, Token, TokenStream};
use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Full parameter tuple of one search call; also the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pub query: Option<String>,
    pub offset: i64,
    pub limit: i64,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub sort: Option<SortKey>,
    pub order: Order,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// Hydrated result count before pagination.
    pub total: usize,
    pub took_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_query: Option<String>,
    pub listings: Vec<Listing>,
}

/// The listing search engine: an in-memory inverted index fed by the
/// background loader, queried by request handlers.
///
/// All index mutations funnel through [`SearchEngine::apply_batch`], which
/// takes the single write lock once per batch — queries observe a whole
/// batch or none of it.
pub struct SearchEngine<S> {
    pub(crate) store: Arc<S>,
    index: RwLock<InvertedIndex>,
    cache: QueryCache,
    config: EngineConfig,
}

impl<S: ListingStore> SearchEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            cache: QueryCache::new(config.cache_ttl, config.cache_capacity),
            index: RwLock::new(InvertedIndex::new()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of listings indexed so far.
    pub fn doc_count(&self) -> u64 {
        self.index.read().doc_count()
    }

    /// Tokenize and index a batch of listings. Returns how many were newly
    /// indexed; ids the index already knows are skipped.
    pub fn apply_batch(&self, docs: &[ListingDoc]) -> usize {
        if docs.is_empty() {
            return 0;
        }
        // documents are independent: tokenize on the worker pool outside the
        // lock, mutate inside it
        let prepared: Vec<(&ListingDoc, HashMap<String, u32>)> = docs
            .par_iter()
            .map(|doc| {
                let text = format!("{} {}", doc.title, doc.description);
                (doc, tokenize(&text, false).term_frequencies())
            })
            .collect();
        let mut index = self.index.write();
        let mut added = 0;
        for (doc, term_frequencies) in prepared {
            if index.insert(doc, term_frequencies) {
                added += 1;
            }
        }
        added
    }

    /// Execute a search: cache lookup, BM25 ranking, hydration, sort and
    /// pagination. Empty or unmatchable query text degrades to an unranked
    /// listing of the filter scope.
    pub async fn query(&self, params: QueryParams) -> Result<SearchResults> {
        if params.offset < 0 || params.limit < 0 {
            bail!("offset and limit must be non-negative");
        }
        if let Some(hit) = self.cache.get(&params) {
            return Ok(hit);
        }
        let start = Instant::now();

        let text = params.query.as_deref().unwrap_or("").trim();
        let stream = tokenize(text, true);
        let (ranked, suggested_query) = {
            let index = self.index.read();
            if stream.words.is_empty() {
                (scope_listing(&index, &params), None)
            } else {
                self.rank(&index, &stream, &params)
            }
        };

        let ids: Vec<ListingId> = ranked.into_iter().map(|(id, _)| id).collect();
        let mut listings = self.hydrate(&ids).await?;
        sort_listings(
            &mut listings,
            params.sort.unwrap_or(SortKey::Relevance),
            params.order,
            unix_now(),
        );
        let total = listings.len();
        let listings = paginate(listings, params.offset as usize, params.limit as usize);

        let results = SearchResults {
            total,
            took_s: start.elapsed().as_secs_f64(),
            suggested_query,
            listings,
        };
        self.cache.insert(params, results.clone());
        Ok(results)
    }

    /// Score the token stream against the index and detect a better-known
    /// spelling to suggest.
    fn rank(
        &self,
        index: &InvertedIndex,
        stream: &TokenStream,
        params: &QueryParams,
    ) -> (Vec<(ListingId, f32)>, Option<String>) {
        let category = params.category.as_deref();
        let sub_category = params.sub_category.as_deref();

        // dedupe terms; a genuine reading of a term wins over a variant one
        let mut seen: HashSet<&str> = HashSet::new();
        let mut genuine: Vec<&Token> = Vec::new();
        let mut variants: Vec<&Token> = Vec::new();
        for token in stream.tokens.iter().filter(|t| t.variant_of.is_none()) {
            if seen.insert(token.term.as_str()) {
                genuine.push(token);
            }
        }
        for token in stream.tokens.iter().filter(|t| t.variant_of.is_some()) {
            if seen.insert(token.term.as_str()) {
                variants.push(token);
            }
        }

        let terms: Vec<&str> = genuine
            .iter()
            .chain(variants.iter())
            .map(|t| t.term.as_str())
            .collect();
        let partials: Vec<HashMap<ListingId, f32>> =
            if genuine.len() > self.config.parallel_min_terms {
                terms
                    .par_iter()
                    .map(|term| score_term(index, term, category, sub_category))
                    .collect()
            } else {
                terms
                    .iter()
                    .map(|term| score_term(index, term, category, sub_category))
                    .collect()
            };
        let mut scores: HashMap<ListingId, f32> = HashMap::new();
        for partial in partials {
            for (id, score) in partial {
                *scores.entry(id).or_insert(0.0) += score;
            }
        }

        let suggested_query = suggest(index, stream, &variants);

        let mut ranked: Vec<(ListingId, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        (ranked, suggested_query)
    }

    async fn hydrate(&self, ids: &[ListingId]) -> Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let fetched = tokio::time::timeout(
            self.config.hydrate_timeout,
            self.store.listings_by_ids(ids),
        )
        .await
        .context("listing hydration timed out")??;
        let mut by_id: HashMap<ListingId, Listing> =
            fetched.into_iter().map(|l| (l.id.clone(), l)).collect();
        // ranked order preserved; ids the store no longer knows are dropped
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

/// Unranked listing of the filter scope: every indexed id, uniform score 1,
/// deterministic id order.
fn scope_listing(index: &InvertedIndex, params: &QueryParams) -> Vec<(ListingId, f32)> {
    let mut ids = index.ids_in_scope(params.category.as_deref(), params.sub_category.as_deref());
    ids.sort_unstable();
    ids.into_iter().map(|id| (id, 1.0)).collect()
}

/// Per-term score map. Unknown terms contribute nothing.
fn score_term(
    index: &InvertedIndex,
    term: &str,
    category: Option<&str>,
    sub_category: Option<&str>,
) -> HashMap<ListingId, f32> {
    let mut scores = HashMap::new();
    let document_frequency = index.document_frequency(term);
    if document_frequency == 0 {
        return scores;
    }
    let doc_count = index.doc_count();
    let avg_doc_length = index.average_doc_length();
    for posting in index.postings_in_scope(term, category, sub_category) {
        let doc_length = index.doc_length(&posting.listing_id);
        let score = bm25(
            posting.term_frequency,
            document_frequency,
            doc_count,
            doc_length,
            avg_doc_length,
        );
        *scores.entry(posting.listing_id.clone()).or_insert(0.0) += score;
    }
    scores
}

/// If a typo variant is known to more documents than the word it mutates,
/// rebuild the query string with that spelling and offer it back.
fn suggest(index: &InvertedIndex, stream: &TokenStream, variants: &[&Token]) -> Option<String> {
    // genuine term per word position
    let position_terms: Vec<&str> = stream
        .tokens
        .iter()
        .filter(|t| t.variant_of.is_none())
        .map(|t| t.term.as_str())
        .collect();

    let mut replacements: HashMap<usize, (&str, u32)> = HashMap::new();
    for variant in variants {
        let variant_df = index.document_frequency(&variant.term);
        if variant_df == 0 {
            continue;
        }
        let original_df = index.document_frequency(position_terms[variant.position]);
        if variant_df <= original_df {
            continue;
        }
        let best = replacements
            .entry(variant.position)
            .or_insert((variant.term.as_str(), variant_df));
        if variant_df > best.1 {
            *best = (variant.term.as_str(), variant_df);
        }
    }
    if replacements.is_empty() {
        return None;
    }
    let words: Vec<&str> = stream
        .words
        .iter()
        .enumerate()
        .map(|(position, word)| {
            replacements
                .get(&position)
                .map(|(term, _)| *term)
                .unwrap_or(word.as_str())
        })
        .collect();
    Some(words.join(" "))
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
