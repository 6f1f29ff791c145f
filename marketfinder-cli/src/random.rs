//! `random` command: a handful of listings picked at random.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CATALOG, ARG_COUNT, ARG_DATABASE, CliError, output::write_json, source::SourceConfig,
};

/// Listings sampled when no count is configured.
pub(crate) const DEFAULT_RANDOM_COUNT: usize = 3;

/// CLI arguments for the `random` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "random", about = "Sample listings at random")]
#[ortho_config(prefix = "MARKETFINDER")]
pub(crate) struct RandomArgs {
    /// Number of listings to return.
    #[arg(long = ARG_COUNT, value_name = "n")]
    #[serde(default)]
    pub(crate) count: Option<usize>,
    /// Path to the SQLite listings database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON facet catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl RandomArgs {
    fn into_config(self) -> Result<RandomConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(RandomConfig::from(merged))
    }
}

/// Resolved `random` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RandomConfig {
    pub(crate) count: usize,
    pub(crate) source: SourceConfig,
}

impl From<RandomArgs> for RandomConfig {
    fn from(args: RandomArgs) -> Self {
        Self {
            count: args.count.unwrap_or(DEFAULT_RANDOM_COUNT),
            source: SourceConfig::new(args.database, args.catalog),
        }
    }
}

pub(crate) fn run_random(args: RandomArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_random_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_random_with(
    config: RandomConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let directory = config.source.open_directory()?;
    let listings = directory.random_listings(config.count)?;
    write_json(writer, &listings)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RandomConfig, CliError> {
    let merged = RandomArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Ok(RandomConfig::from(merged))
}
