//! Opening the catalog and listing store named by command arguments.

use std::{io::BufReader, sync::Arc};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use marketfinder_core::{FacetCatalog, ListingDirectory, SqliteListingStore};

use crate::{
    ARG_CATALOG, ARG_DATABASE, CliError, DEFAULT_DATABASE,
    paths::{open_utf8_file, require_existing},
};

/// Where listings and the facet catalog come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceConfig {
    /// SQLite database holding the `listings` table.
    pub(crate) database: Utf8PathBuf,
    /// Optional JSON catalog replacing the built-in farmers-market catalog.
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl SourceConfig {
    pub(crate) fn new(database: Option<Utf8PathBuf>, catalog: Option<Utf8PathBuf>) -> Self {
        Self {
            database: database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            catalog,
        }
    }

    /// Load the configured catalog.
    pub(crate) fn load_catalog(&self) -> Result<Arc<FacetCatalog>, CliError> {
        let Some(path) = self.catalog.as_deref() else {
            return Ok(Arc::new(FacetCatalog::farmers_markets()));
        };
        load_catalog_file(path).map(Arc::new)
    }

    /// Open the database read-only behind a directory.
    pub(crate) fn open_directory(
        &self,
    ) -> Result<ListingDirectory<SqliteListingStore>, CliError> {
        require_existing(&self.database, ARG_DATABASE)?;
        let catalog = self.load_catalog()?;
        let store = SqliteListingStore::open(self.database.as_std_path(), &catalog)?;
        debug!("opened listing store at {}", self.database);
        Ok(ListingDirectory::new(store, catalog)?)
    }
}

fn load_catalog_file(path: &Utf8Path) -> Result<FacetCatalog, CliError> {
    require_existing(path, ARG_CATALOG)?;
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field: ARG_CATALOG,
        path: path.to_path_buf(),
        source,
    })?;
    FacetCatalog::from_json_reader(BufReader::new(file)).map_err(|source| {
        CliError::InvalidCatalog {
            path: path.to_path_buf(),
            source,
        }
    })
}
