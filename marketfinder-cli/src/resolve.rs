//! `resolve` command: listings for a selection or slug.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use marketfinder_core::{Category, FacetSelection, ResolveRequest};

use crate::{
    ARG_CATALOG, ARG_CITY_STATE, ARG_DATABASE, ARG_DIVERSITY, ARG_FNAP, ARG_PAYMENTS,
    ARG_PRODUCTION, ARG_SLUG, CliError, output::write_json, source::SourceConfig,
};

/// CLI arguments for the `resolve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "resolve",
    long_about = "Resolve either a readable slug or a set of facet codes into \
                 matching listings, the canonical slug and its title. Pass \
                 --slug or any of the facet flags, not both.",
    about = "Resolve a selection or slug into listings"
)]
#[ortho_config(prefix = "MARKETFINDER")]
pub(crate) struct ResolveArgs {
    /// Slug to decode, e.g. `farmers-markets-that-accept-snap`.
    #[arg(long = ARG_SLUG, value_name = "slug")]
    #[serde(default)]
    pub(crate) slug: Option<String>,
    /// Diversity code, e.g. `diversegroup_3`.
    #[arg(long = ARG_DIVERSITY, value_name = "code")]
    #[serde(default)]
    pub(crate) diversity: Option<String>,
    /// Production method code.
    #[arg(long = ARG_PRODUCTION, value_name = "code")]
    #[serde(default)]
    pub(crate) production: Option<String>,
    /// Accepted payment code.
    #[arg(long = ARG_PAYMENTS, value_name = "code")]
    #[serde(default)]
    pub(crate) payments: Option<String>,
    /// Assistance program code.
    #[arg(long = ARG_FNAP, value_name = "code")]
    #[serde(default)]
    pub(crate) fnap: Option<String>,
    /// Free-text location, e.g. `Austin, TX`.
    #[arg(long = ARG_CITY_STATE, value_name = "text")]
    #[serde(default)]
    pub(crate) city_state: Option<String>,
    /// Path to the SQLite listings database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON facet catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

impl ResolveArgs {
    fn into_config(self) -> Result<ResolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ResolveConfig::try_from(merged)
    }
}

/// Resolved `resolve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolveConfig {
    pub(crate) request: ResolveRequest,
    pub(crate) source: SourceConfig,
}

impl TryFrom<ResolveArgs> for ResolveConfig {
    type Error = CliError;

    fn try_from(args: ResolveArgs) -> Result<Self, Self::Error> {
        let selection: FacetSelection = [
            (Category::Diversity, args.diversity),
            (Category::Production, args.production),
            (Category::Payments, args.payments),
            (Category::Fnap, args.fnap),
            (Category::Location, args.city_state),
        ]
        .into_iter()
        .filter_map(|(category, value)| value.map(|value| (category, value)))
        .collect();

        let request = match args.slug {
            Some(_) if !selection.is_empty() => {
                return Err(CliError::ConflictingArguments {
                    message: "--slug cannot be combined with facet flags",
                });
            }
            Some(slug_input) => ResolveRequest::Slug { slug_input },
            None => ResolveRequest::Selection {
                filter_params: selection,
            },
        };
        Ok(Self {
            request,
            source: SourceConfig::new(args.database, args.catalog),
        })
    }
}

pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_resolve_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_resolve_with(
    config: ResolveConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let directory = config.source.open_directory()?;
    let resolution = directory.resolve(&config.request)?;
    write_json(writer, &resolution)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ResolveConfig, CliError> {
    let merged = ResolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ResolveConfig::try_from(merged)
}
