//! `describe` command: detail page for a single listing.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use marketfinder_core::DescribeOutcome;

use crate::{
    ARG_CATALOG, ARG_DATABASE, ARG_LISTING_ID, CliError, ENV_DESCRIBE_LISTING_ID,
    output::write_json, source::SourceConfig,
};

/// CLI arguments for the `describe` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "describe",
    long_about = "Describe one listing: overview and FAQ content, location, \
                 a few random listings and a query for similar listings. An \
                 unknown identifier yields a not-found document rather than \
                 an error.",
    about = "Describe a single listing"
)]
#[ortho_config(prefix = "MARKETFINDER")]
pub(crate) struct DescribeArgs {
    /// Identifier of the listing to describe.
    #[arg(value_name = "id")]
    #[serde(default)]
    pub(crate) listing_id: Option<u64>,
    /// Path to the SQLite listings database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON facet catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl DescribeArgs {
    fn into_config(self) -> Result<DescribeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DescribeConfig::try_from(merged)
    }
}

/// Resolved `describe` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DescribeConfig {
    pub(crate) listing_id: u64,
    pub(crate) source: SourceConfig,
}

impl TryFrom<DescribeArgs> for DescribeConfig {
    type Error = CliError;

    fn try_from(args: DescribeArgs) -> Result<Self, Self::Error> {
        let listing_id = args.listing_id.ok_or(CliError::MissingArgument {
            field: ARG_LISTING_ID,
            env: ENV_DESCRIBE_LISTING_ID,
        })?;
        Ok(Self {
            listing_id,
            source: SourceConfig::new(args.database, args.catalog),
        })
    }
}

pub(crate) fn run_describe(args: DescribeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_describe_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_describe_with(
    config: DescribeConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let directory = config.source.open_directory()?;
    let outcome = directory.describe(config.listing_id)?;
    if let DescribeOutcome::NotFound(_) = &outcome {
        info!("listing {} not found", config.listing_id);
    }
    write_json(writer, &outcome)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<DescribeConfig, CliError> {
    let merged = DescribeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    DescribeConfig::try_from(merged)
}
