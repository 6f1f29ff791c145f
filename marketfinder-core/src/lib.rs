//! Core domain for the marketfinder listing directory.
//!
//! Listings are discovered through two equivalent access paths: a structured
//! [`FacetSelection`] (one value per [`Category`]) or a readable URL [`Slug`]
//! encoding the same selection. The [`SlugCodec`] converts between the two,
//! the [`QueryPredicateBuilder`] turns a selection into a [`ListingPredicate`]
//! for a [`ListingStore`], and [`within_radius`] filters listings by
//! great-circle distance. [`ListingDirectory`] composes these into the
//! operations exposed to callers.

#![forbid(unsafe_code)]

mod catalog;
pub mod content;
mod directory;
mod listing;
mod predicate;
mod radius;
mod selection;
mod slug;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod title;

pub use catalog::{
    CatalogError, CatalogSpec, Category, CategorySpec, EntrySpec, FacetCatalog, FacetCategory,
    FacetEntry, FacetError,
};
pub use directory::{
    DescribeOutcome, DirectoryError, FilterGroup, FilterOptions, FilterParam, ListingDetail,
    ListingDirectory, NotFound, QueryParams, Resolution, ResolveRequest, SeoTitle, SimilarQuery,
};
pub use listing::{Listing, ListingProfile, ListingSummary, RadiusHit};
pub use predicate::{Condition, ListingPredicate, QueryPredicateBuilder, normalize_address};
pub use radius::{DistanceUnit, GeoError, GeoPoint, Radius, haversine_km, within_radius};
pub use selection::FacetSelection;
pub use slug::{DEFAULT_SLUG, Slug, SlugCodec, SlugGrammar, SlugGrammarError, slugify};
pub use store::ListingStore;
#[cfg(feature = "store-sqlite")]
pub use store::{
    PersistListingsError, SqliteListingStore, SqliteListingStoreError, persist_listings_to_sqlite,
};
pub use title::{TitleFormatter, TitleStyle};
