//! SQLite-backed store implementation for persisted listings.

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use log::debug;
use rusqlite::{
    Connection, OpenFlags, functions::FunctionFlags, params_from_iter, types::Value,
};
use thiserror::Error;

use crate::{Condition, FacetCatalog, Listing, ListingPredicate, normalize_address};

use super::ListingStore;
use super::schema::{BASE_COLUMNS, ID_COLUMN, TABLE, quote, read_listing, select_list};

/// SQL function applying [`normalize_address`] so address matching folds
/// case exactly as in-memory evaluation does.
const NORMALIZE_FUNCTION: &str = "normalize_address";

/// Error raised when opening or querying the SQLite listing store.
#[derive(Debug, Error)]
pub enum SqliteListingStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database has no `listings` table.
    #[error("SQLite database at {path} has no `{table}` table")]
    MissingTable {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Expected table name.
        table: &'static str,
    },
    /// A required column, fixed or flag, is absent.
    #[error("`{table}` table is missing column `{column}`")]
    MissingColumn {
        /// Table that was inspected.
        table: &'static str,
        /// Missing column name.
        column: String,
    },
    /// A predicate referenced a flag the store was not opened with.
    #[error("predicate references unknown flag `{code}`")]
    UnknownFlag {
        /// Flag code from the predicate.
        code: String,
    },
    /// Generic SQLite error when reading listing rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only listing store backed by a SQLite database.
///
/// The store checks at open time that the table has a flag column for every
/// code in the catalog, so predicate conditions map onto known columns only.
pub struct SqliteListingStore {
    connection: Connection,
    flag_columns: Vec<String>,
    select: String,
}

impl fmt::Debug for SqliteListingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteListingStore")
            .field("flag_columns", &self.flag_columns.len())
            .finish_non_exhaustive()
    }
}

impl SqliteListingStore {
    /// Open the database read-only and validate its columns against the catalog.
    pub fn open<P>(database_path: P, catalog: &FacetCatalog) -> Result<Self, SqliteListingStoreError>
    where
        P: AsRef<Path>,
    {
        let database_path = database_path.as_ref();
        let connection =
            Connection::open_with_flags(database_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
                |source| SqliteListingStoreError::OpenDatabase {
                    path: database_path.to_path_buf(),
                    source,
                },
            )?;

        register_functions(&connection)?;
        let columns = table_columns(&connection)?;
        if columns.is_empty() {
            return Err(SqliteListingStoreError::MissingTable {
                path: database_path.to_path_buf(),
                table: TABLE,
            });
        }
        let flag_columns: Vec<String> = catalog.codes().map(str::to_owned).collect();
        let required = BASE_COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .chain(flag_columns.iter().map(String::as_str));
        for column in required {
            if !columns.contains(column) {
                return Err(SqliteListingStoreError::MissingColumn {
                    table: TABLE,
                    column: column.to_owned(),
                });
            }
        }

        let select = select_list(&flag_columns);
        Ok(Self {
            connection,
            flag_columns,
            select,
        })
    }

    fn query(
        &self,
        clause: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Listing>, SqliteListingStoreError> {
        let sql = format!("SELECT {} FROM {TABLE} {clause}", self.select);
        debug!("querying listings: {sql}");
        let mut statement = self.connection.prepare(&sql)?;
        let rows = statement.query_map(params_from_iter(params), |row| {
            read_listing(row, &self.flag_columns)
        })?;
        let listings = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    fn render(
        &self,
        predicate: &ListingPredicate,
    ) -> Result<(String, Vec<Value>), SqliteListingStoreError> {
        let mut clauses = Vec::with_capacity(predicate.conditions().len());
        let mut params = Vec::new();
        for condition in predicate.conditions() {
            match condition {
                Condition::AddressContains(needle) => {
                    clauses.push(format!(
                        "\"location_address\" IS NOT NULL \
                         AND instr({NORMALIZE_FUNCTION}(\"location_address\"), ?) > 0"
                    ));
                    params.push(Value::Text(needle.clone()));
                }
                Condition::FlagSet(code) => {
                    if !self.flag_columns.contains(code) {
                        return Err(SqliteListingStoreError::UnknownFlag { code: code.clone() });
                    }
                    clauses.push(format!("{} = 1", quote(code)));
                }
            }
        }
        let clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        Ok((clause, params))
    }
}

impl ListingStore for SqliteListingStore {
    type Error = SqliteListingStoreError;

    fn find(&self, predicate: &ListingPredicate) -> Result<Vec<Listing>, Self::Error> {
        let (clause, params) = self.render(predicate)?;
        self.query(&format!("{clause} ORDER BY {ID_COLUMN}"), params)
    }

    fn all(&self) -> Result<Vec<Listing>, Self::Error> {
        self.query(&format!("ORDER BY {ID_COLUMN}"), Vec::new())
    }

    fn get(&self, id: u64) -> Result<Option<Listing>, Self::Error> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        let mut found = self.query(
            &format!("WHERE {ID_COLUMN} = ?"),
            vec![Value::Integer(id)],
        )?;
        Ok(found.pop())
    }

    fn distinct_addresses(&self) -> Result<Vec<String>, Self::Error> {
        let sql = format!("SELECT location_address FROM {TABLE} WHERE location_address IS NOT NULL");
        let mut statement = self.connection.prepare(&sql)?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
        let mut addresses = Vec::new();
        for row in rows {
            let address = row?;
            if !address.trim().is_empty() {
                addresses.push(address.to_lowercase());
            }
        }
        addresses.sort_unstable();
        addresses.dedup();
        Ok(addresses)
    }

    fn sample(&self, count: usize) -> Result<Vec<Listing>, Self::Error> {
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        self.query("ORDER BY random() LIMIT ?", vec![Value::Integer(limit)])
    }
}

fn table_columns(connection: &Connection) -> Result<HashSet<String>, SqliteListingStoreError> {
    let mut statement = connection.prepare(&format!("PRAGMA table_info({TABLE})"))?;
    let rows = statement.query_map([], |row| row.get::<_, String>(1))?;
    let columns = rows.collect::<Result<HashSet<_>, _>>()?;
    Ok(columns)
}

fn register_functions(connection: &Connection) -> Result<(), SqliteListingStoreError> {
    connection.create_scalar_function(
        NORMALIZE_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let address: Option<String> = context.get(0)?;
            Ok(address.as_deref().map(normalize_address))
        },
    )?;
    Ok(())
}
