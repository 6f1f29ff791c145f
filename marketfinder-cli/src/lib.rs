//! Command-line interface for the marketfinder listing directory.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod describe;
mod error;
mod filters;
mod import;
mod logging;
mod nearby;
mod output;
mod paths;
mod random;
mod resolve;
mod source;

pub use error::CliError;

use describe::{DescribeArgs, run_describe};
use filters::{FiltersArgs, run_filters};
use import::{ImportArgs, run_import};
use nearby::{NearbyArgs, run_nearby};
use random::{RandomArgs, run_random};
use resolve::{ResolveArgs, run_resolve};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_CATALOG: &str = "catalog";
pub(crate) const ARG_SLUG: &str = "slug";
pub(crate) const ARG_DIVERSITY: &str = "diversity";
pub(crate) const ARG_PRODUCTION: &str = "production";
pub(crate) const ARG_PAYMENTS: &str = "payments";
pub(crate) const ARG_FNAP: &str = "fnap";
pub(crate) const ARG_CITY_STATE: &str = "city-state";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const ARG_RADIUS: &str = "radius";
pub(crate) const ARG_UNIT: &str = "unit";
pub(crate) const ARG_LISTING_ID: &str = "listing-id";
pub(crate) const ARG_COUNT: &str = "count";
pub(crate) const ARG_LISTINGS: &str = "listings";
pub(crate) const ENV_NEARBY_LAT: &str = "MARKETFINDER_CMDS_NEARBY_LAT";
pub(crate) const ENV_NEARBY_LON: &str = "MARKETFINDER_CMDS_NEARBY_LON";
pub(crate) const ENV_NEARBY_RADIUS: &str = "MARKETFINDER_CMDS_NEARBY_RADIUS";
pub(crate) const ENV_DESCRIBE_LISTING_ID: &str = "MARKETFINDER_CMDS_DESCRIBE_LISTING_ID";
pub(crate) const ENV_IMPORT_LISTINGS: &str = "MARKETFINDER_CMDS_IMPORT_LISTINGS";

/// Database path used when none is configured.
pub(crate) const DEFAULT_DATABASE: &str = "markets.db";

/// Run the marketfinder CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    logging::init();
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Filters(args) => run_filters(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Nearby(args) => run_nearby(args),
        Command::Describe(args) => run_describe(args),
        Command::Random(args) => run_random(args),
        Command::Import(args) => run_import(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "marketfinder",
    about = "Discover farmers-market listings by facet, slug or distance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every selectable filter value.
    Filters(FiltersArgs),
    /// Resolve a selection or slug into matching listings.
    Resolve(ResolveArgs),
    /// Find listings within a radius of a point.
    Nearby(NearbyArgs),
    /// Describe a single listing.
    Describe(DescribeArgs),
    /// Sample random listings.
    Random(RandomArgs),
    /// Load listings from JSON into the SQLite store.
    Import(ImportArgs),
}

#[cfg(test)]
mod tests;
