pub mod cache;
pub mod config;
pub mod engine;
pub mod index;
pub mod loader;
pub mod score;
pub mod sort;
pub mod store;
pub mod tokenizer;

pub use config::EngineConfig;
pub use engine::{QueryParams, SearchEngine, SearchResults};
pub use loader::{run_cycle, spawn_loader, LoaderHandle};
pub use sort::{Order, SortKey};
pub use store::{Listing, ListingDoc, ListingId, ListingStore, MemoryStore, Sku};
