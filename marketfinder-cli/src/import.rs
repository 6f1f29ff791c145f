//! `import` command: load listings from JSON into the SQLite store.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use marketfinder_core::{Listing, persist_listings_to_sqlite};

use crate::{
    ARG_CATALOG, ARG_DATABASE, ARG_LISTINGS, CliError, ENV_IMPORT_LISTINGS,
    output::write_json,
    paths::{ensure_parent_dir, open_utf8_file, require_existing},
    source::SourceConfig,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "import",
    long_about = "Read a JSON array of listings and write them to the SQLite \
                 database, creating the table and any missing flag columns. \
                 Rows with an existing identifier are replaced.",
    about = "Load listings from JSON into the SQLite store"
)]
#[ortho_config(prefix = "MARKETFINDER")]
pub(crate) struct ImportArgs {
    /// Path to a JSON file holding an array of listings.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) listings: Option<Utf8PathBuf>,
    /// Path to the SQLite listings database to write.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON facet catalog naming the flag columns.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl ImportArgs {
    fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) listings: Utf8PathBuf,
    pub(crate) target: SourceConfig,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let listings = args.listings.ok_or(CliError::MissingArgument {
            field: ARG_LISTINGS,
            env: ENV_IMPORT_LISTINGS,
        })?;
        Ok(Self {
            listings,
            target: SourceConfig::new(args.database, args.catalog),
        })
    }
}

/// Summary printed after a successful import.
#[derive(Debug, Serialize)]
struct ImportSummary<'a> {
    imported: usize,
    database: &'a Utf8Path,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_import_with(
    config: ImportConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let listings = read_listings(&config.listings)?;
    let catalog = config.target.load_catalog()?;
    let database = config.target.database.as_path();

    ensure_parent_dir(database).map_err(|source| CliError::CreateDirectory {
        path: database.to_path_buf(),
        source,
    })?;
    persist_listings_to_sqlite(database.as_std_path(), &catalog, &listings).map_err(
        |source| CliError::PersistListings {
            path: database.to_path_buf(),
            source,
        },
    )?;
    info!("imported {} listings into {database}", listings.len());

    write_json(
        writer,
        &ImportSummary {
            imported: listings.len(),
            database,
        },
    )
}

fn read_listings(path: &Utf8Path) -> Result<Vec<Listing>, CliError> {
    require_existing(path, ARG_LISTINGS)?;
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field: ARG_LISTINGS,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseListings {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportConfig, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportConfig::try_from(merged)
}
