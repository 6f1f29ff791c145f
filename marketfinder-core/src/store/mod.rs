//! Data access traits for listings.
//!
//! The `ListingStore` trait is the seam between the directory and whatever
//! persists listings. Stores evaluate a [`ListingPredicate`] however suits
//! them; the SQLite store renders it to SQL, the test store calls
//! [`ListingPredicate::matches`].

use rand::seq::SliceRandom;

use crate::{Listing, ListingPredicate};

#[cfg(feature = "store-sqlite")]
mod persist;
#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use persist::{PersistListingsError, persist_listings_to_sqlite};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteListingStore, SqliteListingStoreError};

/// Read-only access to persisted listings.
///
/// Failures are reported through [`ListingStore::Error`] and must never be
/// turned into empty results.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use marketfinder_core::{Listing, ListingPredicate, ListingStore};
///
/// struct VecStore(Vec<Listing>);
///
/// impl ListingStore for VecStore {
///     type Error = Infallible;
///
///     fn find(&self, predicate: &ListingPredicate) -> Result<Vec<Listing>, Infallible> {
///         Ok(self.0.iter().filter(|l| predicate.matches(l)).cloned().collect())
///     }
///
///     fn all(&self) -> Result<Vec<Listing>, Infallible> {
///         Ok(self.0.clone())
///     }
///
///     fn get(&self, id: u64) -> Result<Option<Listing>, Infallible> {
///         Ok(self.0.iter().find(|l| l.id == id).cloned())
///     }
///
///     fn distinct_addresses(&self) -> Result<Vec<String>, Infallible> {
///         Ok(Vec::new())
///     }
/// }
///
/// let store = VecStore(vec![Listing::new(1, "Downtown")]);
/// assert_eq!(store.sample(5).map(|found| found.len()), Ok(1));
/// ```
pub trait ListingStore {
    /// Error raised by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Listings matching the predicate, ordered by identifier.
    fn find(&self, predicate: &ListingPredicate) -> Result<Vec<Listing>, Self::Error>;

    /// Every listing, ordered by identifier.
    fn all(&self) -> Result<Vec<Listing>, Self::Error>;

    /// The listing with this identifier, if any.
    fn get(&self, id: u64) -> Result<Option<Listing>, Self::Error>;

    /// Distinct lowercased addresses, sorted, without blanks.
    fn distinct_addresses(&self) -> Result<Vec<String>, Self::Error>;

    /// Up to `count` listings chosen at random.
    fn sample(&self, count: usize) -> Result<Vec<Listing>, Self::Error> {
        let listings = self.all()?;
        Ok(listings
            .choose_multiple(&mut rand::thread_rng(), count)
            .cloned()
            .collect())
    }
}
