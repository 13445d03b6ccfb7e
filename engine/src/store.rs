use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Opaque listing primary key, owned by the backing store.
pub type ListingId = String;

/// The slice of a listing row the loader indexes. `added_at` (unix seconds)
/// drives checkpointing only and never influences scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDoc {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub added_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    pub id: String,
    pub title: String,
    pub price: f64,
}

/// Fully hydrated listing as returned to callers. Typed once at the
/// data-layer boundary; nothing downstream sees raw rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    #[serde(default)]
    pub skus: Vec<Sku>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub views: u64,
    pub added_at: i64,
}

impl Listing {
    /// Lowest current SKU price; a listing with no SKUs sorts as 0.
    pub fn lowest_price(&self) -> f64 {
        self.skus
            .iter()
            .map(|sku| sku.price)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Projection consumed by the indexing path.
    pub fn doc(&self) -> ListingDoc {
        ListingDoc {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            sub_category: self.sub_category.clone(),
            added_at: self.added_at,
        }
    }
}

/// The backing store the engine polls and hydrates from. Real deployments
/// put the SQL data layer behind this; tests and the demo server use
/// [`MemoryStore`].
#[async_trait]
pub trait ListingStore: Send + Sync + 'static {
    /// Rows added strictly after `checkpoint`.
    async fn listings_since(&self, checkpoint: i64) -> Result<Vec<ListingDoc>>;

    /// Hydrate ids into full listings. Unknown ids are simply absent from
    /// the result, not errors.
    async fn listings_by_ids(&self, ids: &[ListingId]) -> Result<Vec<Listing>>;
}

/// In-memory [`ListingStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing: Listing) {
        self.rows.write().push(listing);
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn listings_since(&self, checkpoint: i64) -> Result<Vec<ListingDoc>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|listing| listing.added_at > checkpoint)
            .map(Listing::doc)
            .collect())
    }

    async fn listings_by_ids(&self, ids: &[ListingId]) -> Result<Vec<Listing>> {
        let rows = self.rows.read();
        Ok(ids
            .iter()
            .filter_map(|id| rows.iter().find(|listing| &listing.id == id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, added_at: i64, prices: &[f64]) -> Listing {
        Listing {
            id: id.into(),
            title: "t".into(),
            description: "d".into(),
            category: "c".into(),
            sub_category: "s".into(),
            skus: prices
                .iter()
                .enumerate()
                .map(|(i, &price)| Sku {
                    id: format!("{id}-{i}"),
                    title: "sku".into(),
                    price,
                })
                .collect(),
            rating: 0.0,
            views: 0,
            added_at,
        }
    }

    #[test]
    fn lowest_price_picks_the_cheapest_sku() {
        assert_eq!(listing("a", 0, &[9.5, 3.0, 7.25]).lowest_price(), 3.0);
    }

    #[test]
    fn lowest_price_defaults_to_zero_without_skus() {
        assert_eq!(listing("a", 0, &[]).lowest_price(), 0.0);
    }

    #[tokio::test]
    async fn listings_since_is_strictly_greater_than() {
        let store = MemoryStore::new();
        store.insert(listing("a", 10, &[]));
        store.insert(listing("b", 11, &[]));
        let docs = store.listings_since(10).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "b");
    }

    #[tokio::test]
    async fn unknown_ids_are_absent_not_errors() {
        let store = MemoryStore::new();
        store.insert(listing("a", 1, &[]));
        let hydrated = store
            .listings_by_ids(&["ghost".into(), "a".into()])
            .await
            .unwrap();
        assert_eq!(hydrated.len(), 1);
        assert_eq!(hydrated[0].id, "a");
    }

    #[test]
    fn listing_json_uses_camel_case() {
        let json = serde_json::to_value(listing("a", 5, &[])).unwrap();
        assert!(json.get("subCategory").is_some());
        assert!(json.get("addedAt").is_some());
    }
}
