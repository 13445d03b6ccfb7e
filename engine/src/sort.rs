use crate::store::Listing;
use serde::{Deserialize, Serialize};

/// Sort key for hydrated results. `Relevance` keeps the BM25 ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Relevance,
    Price,
    Rating,
    Views,
    /// Age per view: `(now - addedAt) / max(views, 1)`. Smaller is hotter,
    /// so `asc` lists trending listings first.
    Trending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

/// Stable comparison sort over hydrated listings.
pub fn sort_listings(listings: &mut [Listing], sort: SortKey, order: Order, now: i64) {
    if sort == SortKey::Relevance {
        return;
    }
    listings.sort_by(|a, b| {
        let (ka, kb) = (sort_value(a, sort, now), sort_value(b, sort, now));
        match order {
            Order::Asc => ka.total_cmp(&kb),
            Order::Desc => kb.total_cmp(&ka),
        }
    });
}

fn sort_value(listing: &Listing, sort: SortKey, now: i64) -> f64 {
    match sort {
        SortKey::Relevance => 0.0,
        SortKey::Price => listing.lowest_price(),
        SortKey::Rating => f64::from(listing.rating),
        SortKey::Views => listing.views as f64,
        SortKey::Trending => (now - listing.added_at) as f64 / listing.views.max(1) as f64,
    }
}

/// Offset/limit slice applied after sorting. Out-of-range offsets yield an
/// empty page, not an error.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Sku;

    fn listing(id: &str, price: Option<f64>, rating: f32, views: u64, added_at: i64) -> Listing {
        Listing {
            id: id.into(),
            title: "t".into(),
            description: "d".into(),
            category: "c".into(),
            sub_category: "s".into(),
            skus: price
                .map(|p| {
                    vec![Sku {
                        id: format!("{id}-sku"),
                        title: "sku".into(),
                        price: p,
                    }]
                })
                .unwrap_or_default(),
            rating,
            views,
            added_at,
        }
    }

    fn ids(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_price_both_ways() {
        let mut listings = vec![
            listing("a", Some(30.0), 0.0, 0, 0),
            listing("b", Some(10.0), 0.0, 0, 0),
            listing("c", Some(20.0), 0.0, 0, 0),
        ];
        sort_listings(&mut listings, SortKey::Price, Order::Asc, 0);
        assert_eq!(ids(&listings), vec!["b", "c", "a"]);
        sort_listings(&mut listings, SortKey::Price, Order::Desc, 0);
        assert_eq!(ids(&listings), vec!["a", "c", "b"]);
    }

    #[test]
    fn missing_price_sorts_as_zero() {
        let mut listings = vec![
            listing("a", Some(5.0), 0.0, 0, 0),
            listing("b", None, 0.0, 0, 0),
        ];
        sort_listings(&mut listings, SortKey::Price, Order::Asc, 0);
        assert_eq!(ids(&listings), vec!["b", "a"]);
    }

    #[test]
    fn sorts_by_rating_and_views() {
        let mut listings = vec![
            listing("a", None, 2.5, 10, 0),
            listing("b", None, 4.5, 5, 0),
        ];
        sort_listings(&mut listings, SortKey::Rating, Order::Desc, 0);
        assert_eq!(ids(&listings), vec!["b", "a"]);
        sort_listings(&mut listings, SortKey::Views, Order::Desc, 0);
        assert_eq!(ids(&listings), vec!["a", "b"]);
    }

    #[test]
    fn trending_prefers_young_heavily_viewed_listings() {
        // "a": 10s old, 100 views -> 0.1 ; "b": 1000s old, 10 views -> 100
        let mut listings = vec![
            listing("b", None, 0.0, 10, 0),
            listing("a", None, 0.0, 100, 990),
        ];
        sort_listings(&mut listings, SortKey::Trending, Order::Asc, 1000);
        assert_eq!(ids(&listings), vec!["a", "b"]);
    }

    #[test]
    fn trending_guards_zero_views() {
        let mut listings = vec![listing("a", None, 0.0, 0, 500)];
        sort_listings(&mut listings, SortKey::Trending, Order::Asc, 1000);
        assert_eq!(ids(&listings), vec!["a"]);
    }

    #[test]
    fn relevance_keeps_the_incoming_order() {
        let mut listings = vec![
            listing("z", Some(1.0), 0.0, 0, 0),
            listing("a", Some(2.0), 0.0, 0, 0),
        ];
        sort_listings(&mut listings, SortKey::Relevance, Order::Desc, 0);
        assert_eq!(ids(&listings), vec!["z", "a"]);
    }

    #[test]
    fn pagination_slices_after_sorting() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(paginate(items.clone(), 1, 2), vec![2, 3]);
        assert_eq!(paginate(items.clone(), 10, 2), Vec::<i32>::new());
        assert_eq!(paginate(items, 0, 0), Vec::<i32>::new());
    }
}
