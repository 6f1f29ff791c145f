//! `nearby` command: listings within a radius of a point.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use marketfinder_core::{DistanceUnit, GeoPoint, Radius};

use crate::{
    ARG_CATALOG, ARG_DATABASE, ARG_LAT, ARG_LON, ARG_RADIUS, ARG_UNIT, CliError, ENV_NEARBY_LAT,
    ENV_NEARBY_LON, ENV_NEARBY_RADIUS, output::write_json, source::SourceConfig,
};

/// CLI arguments for the `nearby` subcommand.
///
/// Numbers are kept as text until conversion so malformed values surface as
/// invalid-argument errors naming the field.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nearby",
    long_about = "Find listings whose coordinates lie within a great-circle \
                 radius of a point. The radius is in miles unless --unit km \
                 is given.",
    about = "Find listings within a radius"
)]
#[ortho_config(prefix = "MARKETFINDER")]
pub(crate) struct NearbyArgs {
    /// Latitude of the centre in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<String>,
    /// Longitude of the centre in degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lon: Option<String>,
    /// Search radius.
    #[arg(long = ARG_RADIUS, value_name = "distance", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) radius: Option<String>,
    /// Radius unit: `mi` (default) or `km`.
    #[arg(long = ARG_UNIT, value_name = "unit")]
    #[serde(default)]
    pub(crate) unit: Option<String>,
    /// Path to the SQLite listings database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON facet catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl NearbyArgs {
    fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

/// Resolved `nearby` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) center: GeoPoint,
    pub(crate) radius: Radius,
    pub(crate) source: SourceConfig,
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_NEARBY_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_NEARBY_LON,
        })?;
        let radius = args.radius.ok_or(CliError::MissingArgument {
            field: ARG_RADIUS,
            env: ENV_NEARBY_RADIUS,
        })?;
        let unit = match args.unit.as_deref() {
            Some(unit) => unit.parse::<DistanceUnit>()?,
            None => DistanceUnit::Miles,
        };
        Ok(Self {
            center: GeoPoint::parse(&lat, &lon)?,
            radius: Radius::parse(&radius, unit)?,
            source: SourceConfig::new(args.database, args.catalog),
        })
    }
}

pub(crate) fn run_nearby(args: NearbyArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_nearby_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_nearby_with(
    config: NearbyConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let directory = config.source.open_directory()?;
    let hits = directory.find_within_radius(config.center, config.radius)?;
    write_json(writer, &hits)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NearbyConfig, CliError> {
    let merged = NearbyArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NearbyConfig::try_from(merged)
}
