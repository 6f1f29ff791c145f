//! `filters` command: every selectable value, grouped by category.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_CATALOG, ARG_DATABASE, CliError, output::write_json, source::SourceConfig};

/// CLI arguments for the `filters` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "filters",
    about = "List filter groups with their selectable values"
)]
#[ortho_config(prefix = "MARKETFINDER")]
pub(crate) struct FiltersArgs {
    /// Path to the SQLite listings database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON facet catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl FiltersArgs {
    fn into_config(self) -> Result<SourceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(SourceConfig::from(merged))
    }
}

impl From<FiltersArgs> for SourceConfig {
    fn from(args: FiltersArgs) -> Self {
        Self::new(args.database, args.catalog)
    }
}

pub(crate) fn run_filters(args: FiltersArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_filters_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_filters_with(
    source: SourceConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let directory = source.open_directory()?;
    let options = directory.filters()?;
    write_json(writer, &options)
}
