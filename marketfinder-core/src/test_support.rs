//! Test-only, in-memory `ListingStore` implementation used by unit and
//! behaviour tests.

use std::convert::Infallible;

use crate::{Listing, ListingPredicate, ListingStore};

/// In-memory `ListingStore` implementation used in tests.
///
/// The store performs a linear scan and is intended only for small datasets.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    listings: Vec<Listing>,
}

impl MemoryStore {
    /// Create a store containing a single listing.
    #[must_use]
    pub fn with_listing(listing: Listing) -> Self {
        Self::with_listings(std::iter::once(listing))
    }

    /// Create a store from a collection of listings, kept in identifier order.
    pub fn with_listings<I>(listings: I) -> Self
    where
        I: IntoIterator<Item = Listing>,
    {
        let mut listings: Vec<Listing> = listings.into_iter().collect();
        listings.sort_by_key(|listing| listing.id);
        Self { listings }
    }
}

impl ListingStore for MemoryStore {
    type Error = Infallible;

    fn find(&self, predicate: &ListingPredicate) -> Result<Vec<Listing>, Self::Error> {
        Ok(self
            .listings
            .iter()
            .filter(|listing| predicate.matches(listing))
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Listing>, Self::Error> {
        Ok(self.listings.clone())
    }

    fn get(&self, id: u64) -> Result<Option<Listing>, Self::Error> {
        Ok(self.listings.iter().find(|listing| listing.id == id).cloned())
    }

    fn distinct_addresses(&self) -> Result<Vec<String>, Self::Error> {
        let mut addresses: Vec<String> = self
            .listings
            .iter()
            .filter_map(|listing| listing.address.as_deref())
            .filter(|address| !address.trim().is_empty())
            .map(str::to_lowercase)
            .collect();
        addresses.sort_unstable();
        addresses.dedup();
        Ok(addresses)
    }
}

/// Store whose every call fails, for exercising error propagation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

/// Error raised by [`FailingStore`].
#[derive(Debug, thiserror::Error)]
#[error("listing store is unavailable")]
pub struct StoreUnavailable;

impl ListingStore for FailingStore {
    type Error = StoreUnavailable;

    fn find(&self, _predicate: &ListingPredicate) -> Result<Vec<Listing>, Self::Error> {
        Err(StoreUnavailable)
    }

    fn all(&self) -> Result<Vec<Listing>, Self::Error> {
        Err(StoreUnavailable)
    }

    fn get(&self, _id: u64) -> Result<Option<Listing>, Self::Error> {
        Err(StoreUnavailable)
    }

    fn distinct_addresses(&self) -> Result<Vec<String>, Self::Error> {
        Err(StoreUnavailable)
    }
}
