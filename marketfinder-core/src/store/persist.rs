//! Writing listings into the SQLite layout read by [`super::SqliteListingStore`].

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use rusqlite::{Connection, Error as SqliteError, Transaction, params_from_iter, types::Value};
use thiserror::Error;

use crate::{FacetCatalog, Listing};

use super::schema::{BASE_COLUMNS, TABLE, profile_values, quote};

/// Errors raised when persisting listings to SQLite.
#[derive(Debug, Error)]
pub enum PersistListingsError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin listing persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating or extending the `listings` table failed.
    #[error("failed to prepare listings table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A listing identifier could not be represented as an SQLite integer.
    #[error("listing id {listing_id} exceeds SQLite i64 range")]
    ListingIdOutOfRange {
        /// Identifier that failed the conversion.
        listing_id: u64,
    },
    /// Preparing the insert statement failed.
    #[error("failed to prepare listing insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a listing row failed.
    #[error("failed to persist listing {listing_id}")]
    PersistRow {
        /// Identifier of the listing being persisted.
        listing_id: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit listing persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Persist listings to a SQLite database on disk.
///
/// Rows are replaced when identifiers already exist. The `listings` table is
/// created if missing, and flag columns for catalog codes it lacks are added.
/// Flags outside the catalog are skipped with a warning.
pub fn persist_listings_to_sqlite(
    path: &Path,
    catalog: &FacetCatalog,
    listings: &[Listing],
) -> Result<(), PersistListingsError> {
    let mut connection = Connection::open(path).map_err(|source| PersistListingsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let transaction = connection
        .transaction()
        .map_err(|source| PersistListingsError::BeginTransaction { source })?;

    let flag_columns: Vec<&str> = catalog.codes().collect();
    create_schema(&transaction, &flag_columns)?;
    persist_rows(&transaction, &flag_columns, listings)?;

    transaction
        .commit()
        .map_err(|source| PersistListingsError::Commit { source })?;
    debug!("persisted {} listings to {}", listings.len(), path.display());
    Ok(())
}

fn create_schema(
    transaction: &Transaction<'_>,
    flag_columns: &[&str],
) -> Result<(), PersistListingsError> {
    let columns: Vec<String> = BASE_COLUMNS
        .iter()
        .map(|(name, kind)| format!("{} {kind}", quote(name)))
        .chain(
            flag_columns
                .iter()
                .map(|code| format!("{} INTEGER NOT NULL DEFAULT 0", quote(code))),
        )
        .collect();
    transaction
        .execute(
            &format!("CREATE TABLE IF NOT EXISTS {TABLE} ({})", columns.join(", ")),
            [],
        )
        .map_err(|source| PersistListingsError::CreateSchema { source })?;

    let existing = existing_columns(transaction)
        .map_err(|source| PersistListingsError::CreateSchema { source })?;
    for code in flag_columns.iter().filter(|code| !existing.contains(**code)) {
        debug!("adding flag column {code}");
        transaction
            .execute(
                &format!(
                    "ALTER TABLE {TABLE} ADD COLUMN {} INTEGER NOT NULL DEFAULT 0",
                    quote(code)
                ),
                [],
            )
            .map_err(|source| PersistListingsError::CreateSchema { source })?;
    }
    Ok(())
}

fn existing_columns(transaction: &Transaction<'_>) -> Result<HashSet<String>, SqliteError> {
    let mut statement = transaction.prepare(&format!("PRAGMA table_info({TABLE})"))?;
    let rows = statement.query_map([], |row| row.get::<_, String>(1))?;
    rows.collect()
}

fn persist_rows(
    transaction: &Transaction<'_>,
    flag_columns: &[&str],
    listings: &[Listing],
) -> Result<(), PersistListingsError> {
    if listings.is_empty() {
        return Ok(());
    }

    let names: Vec<String> = BASE_COLUMNS
        .iter()
        .map(|(name, _)| quote(name))
        .chain(flag_columns.iter().map(|code| quote(code)))
        .collect();
    let placeholders = vec!["?"; names.len()].join(", ");
    let mut statement = transaction
        .prepare(&format!(
            "INSERT OR REPLACE INTO {TABLE} ({}) VALUES ({placeholders})",
            names.join(", ")
        ))
        .map_err(|source| PersistListingsError::PrepareInsert { source })?;

    for listing in listings {
        let listing_id = i64::try_from(listing.id).map_err(|_| {
            PersistListingsError::ListingIdOutOfRange {
                listing_id: listing.id,
            }
        })?;
        for flag in listing
            .flags
            .iter()
            .filter(|flag| !flag_columns.contains(&flag.as_str()))
        {
            warn!("listing {} has flag {flag} outside the catalog", listing.id);
        }

        let mut values = Vec::with_capacity(names.len());
        values.push(Value::Integer(listing_id));
        values.push(Value::Text(listing.name.clone()));
        values.push(optional_text(listing.address.as_deref()));
        values.push(optional_real(listing.location.map(|point| point.x)));
        values.push(optional_real(listing.location.map(|point| point.y)));
        values.extend(profile_values(&listing.profile).into_iter().map(optional_text));
        values.extend(
            flag_columns
                .iter()
                .map(|code| Value::Integer(i64::from(listing.has_flag(code)))),
        );

        statement
            .execute(params_from_iter(values))
            .map_err(|source| PersistListingsError::PersistRow {
                listing_id: listing.id,
                source,
            })?;
    }

    Ok(())
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_owned()))
}

fn optional_real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Category, CatalogSpec, EntrySpec, ListingProfile, ListingStore,
        SqliteListingStore,
    };
    use rstest::rstest;
    use tempfile::TempDir;

    fn count_rows(path: &Path) -> i64 {
        let conn = Connection::open(path).expect("open db");
        conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))
            .expect("count rows")
    }

    #[rstest]
    fn persisting_twice_replaces_rows() {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("markets.db");
        let catalog = FacetCatalog::farmers_markets();
        let first = Listing::new(7, "Old Name").with_flag("FNAP_1");
        let second = Listing::new(7, "New Name").with_profile(ListingProfile {
            organization: Some("Parks Department".to_owned()),
            ..ListingProfile::default()
        });

        persist_listings_to_sqlite(&db_path, &catalog, &[first]).expect("first write");
        persist_listings_to_sqlite(&db_path, &catalog, &[second.clone()]).expect("second write");

        assert_eq!(count_rows(&db_path), 1);
        let store = SqliteListingStore::open(&db_path, &catalog).expect("open store");
        assert_eq!(store.get(7).expect("query"), Some(second));
    }

    #[rstest]
    fn flags_outside_the_catalog_are_skipped() {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("markets.db");
        let catalog = FacetCatalog::farmers_markets();
        let listing = Listing::new(1, "Market")
            .with_flag("FNAP_2")
            .with_flag("not_a_code");

        persist_listings_to_sqlite(&db_path, &catalog, &[listing]).expect("persist");

        let store = SqliteListingStore::open(&db_path, &catalog).expect("open store");
        let stored = store.get(1).expect("query").expect("listing present");
        assert!(stored.has_flag("FNAP_2"));
        assert!(!stored.has_flag("not_a_code"));
    }

    #[rstest]
    fn larger_catalog_adds_missing_flag_columns() {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("markets.db");
        let builtin = FacetCatalog::farmers_markets();
        persist_listings_to_sqlite(&db_path, &builtin, &[Listing::new(1, "Market")])
            .expect("persist with builtin catalog");

        let mut spec = CatalogSpec::farmers_markets();
        let payments = spec
            .categories
            .iter_mut()
            .find(|category| category.id == Category::Payments)
            .expect("payments category");
        payments.entries.push(EntrySpec {
            code: "acceptedpayment_7".to_owned(),
            label: "Mobile Wallet".to_owned(),
            aliases: Vec::new(),
        });
        let extended = FacetCatalog::from_spec(spec).expect("valid catalog");
        let listing = Listing::new(2, "Wallet Market").with_flag("acceptedpayment_7");
        persist_listings_to_sqlite(&db_path, &extended, &[listing]).expect("persist extended");

        let store = SqliteListingStore::open(&db_path, &extended).expect("open store");
        let ids: Vec<_> = store
            .all()
            .expect("query")
            .iter()
            .filter(|listing| listing.has_flag("acceptedpayment_7"))
            .map(|listing| listing.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[rstest]
    fn out_of_range_identifiers_are_rejected() {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("markets.db");
        let catalog = FacetCatalog::farmers_markets();
        persist_listings_to_sqlite(&db_path, &catalog, &[Listing::new(1, "Small")])
            .expect("persist valid listing");
        let batch = [Listing::new(2, "Fine"), Listing::new(u64::MAX, "Huge")];
        let err = persist_listings_to_sqlite(&db_path, &catalog, &batch)
            .expect_err("id exceeds i64");
        assert!(matches!(
            err,
            PersistListingsError::ListingIdOutOfRange { listing_id } if listing_id == u64::MAX
        ));
        assert_eq!(count_rows(&db_path), 1);
    }
}
