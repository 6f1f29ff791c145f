//! Facade crate for the marketfinder listing directory.
//!
//! This crate re-exports the facet catalog, slug codec, predicate builder,
//! radius filter and directory service, and exposes the SQLite store behind a
//! feature flag.

#![forbid(unsafe_code)]

pub use marketfinder_core::{
    Category, DescribeOutcome, DirectoryError, DistanceUnit, FacetCatalog, FacetError,
    FacetSelection, GeoError, GeoPoint, Listing, ListingDirectory, ListingPredicate,
    ListingStore, QueryPredicateBuilder, Radius, ResolveRequest, Slug, SlugCodec,
    TitleFormatter, within_radius,
};

#[cfg(feature = "store-sqlite")]
pub use marketfinder_core::{
    PersistListingsError, SqliteListingStore, SqliteListingStoreError, persist_listings_to_sqlite,
};
