//! Layout of the `listings` table shared by the SQLite reader and writer.
//!
//! Column names follow the USDA local food directory export so existing
//! dumps can be queried in place. Every facet code adds one
//! `INTEGER NOT NULL DEFAULT 0` flag column named after the code.

use rusqlite::Row;

use crate::{GeoPoint, Listing, ListingProfile};

pub(super) const TABLE: &str = "listings";

pub(super) const ID_COLUMN: &str = "listing_id";

/// Fixed columns with their SQL types, in select order.
pub(super) const BASE_COLUMNS: [(&str, &str); 15] = [
    (ID_COLUMN, "INTEGER PRIMARY KEY"),
    ("listing_name", "TEXT NOT NULL"),
    ("location_address", "TEXT"),
    ("location_x", "REAL"),
    ("location_y", "REAL"),
    ("orgnization", "TEXT"),
    ("diversegroup", "TEXT"),
    ("specialproductionmethods", "TEXT"),
    ("acceptedpayment", "TEXT"),
    ("FNAP", "TEXT"),
    ("listing_desc", "TEXT"),
    ("location_desc", "TEXT"),
    ("location_site", "TEXT"),
    ("location_indoor", "TEXT"),
    ("saleschannel_onlineorder", "TEXT"),
];

/// Quote an identifier for SQL. Codes are validated by the catalog, so this
/// only guards against keywords.
pub(super) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Comma-separated select list: base columns followed by flag columns.
pub(super) fn select_list(flag_columns: &[String]) -> String {
    BASE_COLUMNS
        .iter()
        .map(|(name, _)| quote(name))
        .chain(flag_columns.iter().map(|code| quote(code)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a row produced by [`select_list`].
pub(super) fn read_listing(row: &Row<'_>, flag_columns: &[String]) -> rusqlite::Result<Listing> {
    let latitude: Option<f64> = row.get(3)?;
    let longitude: Option<f64> = row.get(4)?;
    let location = latitude
        .zip(longitude)
        .map(|(x, y)| GeoPoint { x, y });
    let profile = ListingProfile {
        organization: row.get(5)?,
        diversity: row.get(6)?,
        production: row.get(7)?,
        payments: row.get(8)?,
        fnap: row.get(9)?,
        description: row.get(10)?,
        location_description: row.get(11)?,
        site: row.get(12)?,
        indoor: row.get(13)?,
        online_ordering: row.get(14)?,
    };
    let mut flags = std::collections::BTreeSet::new();
    for (offset, code) in flag_columns.iter().enumerate() {
        let value: Option<i64> = row.get(BASE_COLUMNS.len() + offset)?;
        if value == Some(1) {
            flags.insert(code.clone());
        }
    }
    Ok(Listing {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        location,
        flags,
        profile,
    })
}

/// Profile values in [`BASE_COLUMNS`] order, starting at `orgnization`.
pub(super) fn profile_values(profile: &ListingProfile) -> [Option<&str>; 10] {
    [
        profile.organization.as_deref(),
        profile.diversity.as_deref(),
        profile.production.as_deref(),
        profile.payments.as_deref(),
        profile.fnap.as_deref(),
        profile.description.as_deref(),
        profile.location_description.as_deref(),
        profile.site.as_deref(),
        profile.indoor.as_deref(),
        profile.online_ordering.as_deref(),
    ]
}
