//! Argument conversion and configuration layering.

use camino::Utf8PathBuf;
use clap::Parser;
use marketfinder_core::{Category, DistanceUnit, GeoPoint, Radius, ResolveRequest};
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::{
    describe::{DescribeConfig, config_from_layers_for_test as describe_layers},
    import::{ImportConfig, config_from_layers_for_test as import_layers},
    nearby::{NearbyConfig, config_from_layers_for_test as nearby_layers},
    random::{DEFAULT_RANDOM_COUNT, RandomConfig, config_from_layers_for_test as random_layers},
    resolve::{ResolveConfig, config_from_layers_for_test as resolve_layers},
    source::SourceConfig,
};

fn nearby_args(lat: &str, lon: &str, radius: &str) -> NearbyArgs {
    NearbyArgs {
        lat: Some(lat.to_owned()),
        lon: Some(lon.to_owned()),
        radius: Some(radius.to_owned()),
        ..NearbyArgs::default()
    }
}

#[rstest]
fn source_defaults_to_local_database() {
    let source = SourceConfig::new(None, None);
    assert_eq!(source.database, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(source.catalog, None);
}

#[rstest]
fn resolve_flags_build_a_selection() {
    let args = ResolveArgs {
        payments: Some("acceptedpayment_3".to_owned()),
        city_state: Some("Austin, TX".to_owned()),
        ..ResolveArgs::default()
    };
    let config = ResolveConfig::try_from(args).expect("config should build");
    let ResolveRequest::Selection { filter_params } = config.request else {
        panic!("expected a selection request");
    };
    assert_eq!(filter_params.len(), 2);
    assert_eq!(filter_params.get(Category::Payments), Some("acceptedpayment_3"));
    assert_eq!(filter_params.get(Category::Location), Some("Austin, TX"));
}

#[rstest]
fn resolve_without_flags_is_the_empty_selection() {
    let config = ResolveConfig::try_from(ResolveArgs::default()).expect("config should build");
    match config.request {
        ResolveRequest::Selection { filter_params } => assert!(filter_params.is_empty()),
        other => panic!("expected empty selection, found {other:?}"),
    }
}

#[rstest]
fn resolve_slug_is_passed_through() {
    let args = ResolveArgs {
        slug: Some("farmers-markets-that-accept-cash".to_owned()),
        ..ResolveArgs::default()
    };
    let config = ResolveConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.request,
        ResolveRequest::Slug {
            slug_input: "farmers-markets-that-accept-cash".to_owned()
        }
    );
}

#[rstest]
fn resolve_rejects_slug_with_flags() {
    let args = ResolveArgs {
        slug: Some("farmers-markets".to_owned()),
        fnap: Some("FNAP_1".to_owned()),
        ..ResolveArgs::default()
    };
    let err = ResolveConfig::try_from(args).expect_err("slug and flags should conflict");
    assert!(matches!(err, CliError::ConflictingArguments { .. }));
}

#[rstest]
#[case::latitude(NearbyArgs { lat: None, ..nearby_args("0", "0", "1") }, ARG_LAT, ENV_NEARBY_LAT)]
#[case::longitude(NearbyArgs { lon: None, ..nearby_args("0", "0", "1") }, ARG_LON, ENV_NEARBY_LON)]
#[case::radius(NearbyArgs { radius: None, ..nearby_args("0", "0", "1") }, ARG_RADIUS, ENV_NEARBY_RADIUS)]
fn nearby_reports_missing_arguments(
    #[case] args: NearbyArgs,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let err = NearbyConfig::try_from(args).expect_err("missing argument should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn nearby_defaults_to_miles() {
    let config =
        NearbyConfig::try_from(nearby_args("30.27", "-97.74", "10")).expect("config should build");
    assert_eq!(
        config.center,
        GeoPoint::new(30.27, -97.74).expect("valid point")
    );
    assert_eq!(
        config.radius,
        Radius::new(10.0, DistanceUnit::Miles).expect("valid radius")
    );
}

#[rstest]
#[case::not_a_number(nearby_args("north", "0", "1"))]
#[case::latitude_range(nearby_args("91", "0", "1"))]
#[case::longitude_range(nearby_args("0", "181", "1"))]
#[case::negative_radius(nearby_args("0", "0", "-5"))]
#[case::unknown_unit(NearbyArgs { unit: Some("furlongs".to_owned()), ..nearby_args("0", "0", "1") })]
fn nearby_rejects_invalid_values(#[case] args: NearbyArgs) {
    let err = NearbyConfig::try_from(args).expect_err("invalid value should error");
    assert!(
        matches!(err, CliError::InvalidArgument(_)),
        "expected InvalidArgument, found {err:?}"
    );
}

#[rstest]
fn describe_requires_listing_id() {
    let err = DescribeConfig::try_from(DescribeArgs::default()).expect_err("missing id");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_LISTING_ID);
            assert_eq!(env, ENV_DESCRIBE_LISTING_ID);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn import_requires_listings_path() {
    let err = ImportConfig::try_from(ImportArgs::default()).expect_err("missing listings");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_LISTINGS);
            assert_eq!(env, ENV_IMPORT_LISTINGS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn random_defaults_count() {
    let config = RandomConfig::from(RandomArgs::default());
    assert_eq!(config.count, DEFAULT_RANDOM_COUNT);
}

#[rstest]
fn nearby_layers_honour_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "lat": "10", "lon": "20", "radius": "5", "unit": "km" }),
        None,
    );
    composer.push_environment(json!({ "lat": "11", "lon": "21" }));
    composer.push_cli(json!({ "lat": "12" }));

    let config = nearby_layers(composer.layers()).expect("merged config should build");
    assert_eq!(config.center, GeoPoint::new(12.0, 21.0).expect("valid point"));
    assert_eq!(config.radius, Radius::kilometres(5.0).expect("valid radius"));
}

#[rstest]
fn resolve_layers_merge_database_and_flags() {
    let mut composer = MergeComposer::new();
    composer.push_file(json!({ "database": "from-file.db", "fnap": "FNAP_1" }), None);
    composer.push_environment(json!({ "database": "from-env.db" }));

    let config = resolve_layers(composer.layers()).expect("merged config should build");
    assert_eq!(config.source.database, Utf8PathBuf::from("from-env.db"));
    match config.request {
        ResolveRequest::Selection { filter_params } => {
            assert_eq!(filter_params.get(Category::Fnap), Some("FNAP_1"));
        }
        other => panic!("expected selection, found {other:?}"),
    }
}

#[rstest]
fn describe_layers_read_listing_id_from_environment() {
    let mut composer = MergeComposer::new();
    composer.push_environment(json!({ "listing_id": 7 }));
    let config = describe_layers(composer.layers()).expect("merged config should build");
    assert_eq!(config.listing_id, 7);
}

#[rstest]
fn import_layers_keep_catalog_from_file() {
    let mut composer = MergeComposer::new();
    composer.push_file(json!({ "catalog": "catalog.json" }), None);
    composer.push_cli(json!({ "listings": "listings.json" }));
    let config = import_layers(composer.layers()).expect("merged config should build");
    assert_eq!(config.listings, Utf8PathBuf::from("listings.json"));
    assert_eq!(config.target.catalog, Some(Utf8PathBuf::from("catalog.json")));
}

#[rstest]
fn invalid_layer_maps_to_configuration_error() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "count": "many" }));
    let err = random_layers(composer.layers()).expect_err("invalid layer should error");
    assert!(
        matches!(err, CliError::Configuration(_)),
        "expected Configuration, found {err:?}"
    );
}

#[rstest]
fn cli_parses_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "marketfinder",
        "nearby",
        "--lat",
        "30.27",
        "--lon",
        "-97.74",
        "--radius",
        "5",
    ])
    .expect("arguments should parse");
    match cli.command {
        Command::Nearby(args) => assert_eq!(args.lon.as_deref(), Some("-97.74")),
        other => panic!("expected nearby command, found {other:?}"),
    }
}
