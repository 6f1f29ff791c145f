//! Fixture databases and output decoding shared by the CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use marketfinder_core::{
    FacetCatalog, GeoPoint, Listing, ListingProfile, persist_listings_to_sqlite,
};
use serde_json::Value;
use tempfile::TempDir;

use crate::source::SourceConfig;

/// Temporary workspace holding a listings database.
#[derive(Debug)]
pub(super) struct MarketFixture {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) database: Utf8PathBuf,
}

impl MarketFixture {
    pub(super) fn new() -> Self {
        let fixture = Self::empty();
        fixture.populate();
        fixture
    }

    /// Workspace whose database path does not exist yet.
    pub(super) fn empty() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let database = root.join("markets.db");
        Self {
            _dir: dir,
            root,
            database,
        }
    }

    pub(super) fn populate(&self) {
        persist_listings_to_sqlite(
            self.database.as_std_path(),
            &FacetCatalog::farmers_markets(),
            &sample_listings(),
        )
        .expect("persist sample listings");
    }

    pub(super) fn source(&self) -> SourceConfig {
        SourceConfig::new(Some(self.database.clone()), None)
    }
}

/// Two Austin markets close together and one in Dallas.
pub(super) fn sample_listings() -> Vec<Listing> {
    vec![
        Listing::new(1, "Downtown Market")
            .with_address("123 Main St, Austin, TX")
            .with_location(GeoPoint {
                x: 30.2672,
                y: -97.7431,
            })
            .with_flag("specialproductionmethods_6")
            .with_flag("acceptedpayment_3")
            .with_profile(ListingProfile {
                fnap: Some("SNAP".to_owned()),
                description: Some("Saturday morning market".to_owned()),
                ..ListingProfile::default()
            }),
        Listing::new(2, "Eastside Market")
            .with_address("5 Oak St, Austin, TX")
            .with_location(GeoPoint {
                x: 30.2620,
                y: -97.7100,
            })
            .with_flag("acceptedpayment_3"),
        Listing::new(3, "Dallas Farmers Market")
            .with_address("1 Elm St, Dallas, TX")
            .with_location(GeoPoint {
                x: 32.7767,
                y: -96.7970,
            })
            .with_flag("specialproductionmethods_6")
            .with_flag("acceptedpayment_3"),
    ]
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}

pub(super) fn output_json(buffer: &[u8]) -> Value {
    serde_json::from_slice(buffer).expect("command output should be JSON")
}

/// Listing identifiers from a JSON array of listing summaries.
pub(super) fn listing_ids(markets: &Value) -> Vec<u64> {
    markets
        .as_array()
        .expect("markets array")
        .iter()
        .map(|market| market["listing_id"].as_u64().expect("numeric listing id"))
        .collect()
}
