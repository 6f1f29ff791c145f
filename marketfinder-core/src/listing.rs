//! Listing records and the summaries returned to callers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Category, GeoPoint};

/// A facility listing as read from the store.
///
/// `flags` holds every facet code stored as true for the listing. Listings
/// are never mutated by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Store identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Coordinates, when known.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Facet codes set for the listing.
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Free-text details used for the detail payload.
    #[serde(default)]
    pub profile: ListingProfile,
}

impl Listing {
    /// Create a listing with only an identifier and a name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the coordinates.
    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Mark a facet code as set.
    #[must_use]
    pub fn with_flag(mut self, code: impl Into<String>) -> Self {
        self.flags.insert(code.into());
        self
    }

    /// Replace the free-text details.
    #[must_use]
    pub fn with_profile(mut self, profile: ListingProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Whether the facet code is set.
    #[must_use]
    pub fn has_flag(&self, code: &str) -> bool {
        self.flags.contains(code)
    }

    /// Compact form used in result lists.
    #[must_use]
    pub fn summary(&self) -> ListingSummary {
        ListingSummary {
            listing_id: self.id,
            listing_name: self.name.clone(),
            location_address: self.address.clone(),
        }
    }
}

/// Free-text fields of a listing. Multi-valued fields separate values
/// with `;`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingProfile {
    /// Organizations the listing belongs to.
    pub organization: Option<String>,
    /// Diversity groups, as text.
    pub diversity: Option<String>,
    /// Production methods, as text.
    pub production: Option<String>,
    /// Accepted payments, as text.
    pub payments: Option<String>,
    /// Assistance programs, as text.
    pub fnap: Option<String>,
    /// Listing description.
    pub description: Option<String>,
    /// Location description.
    pub location_description: Option<String>,
    /// Kind of site the listing operates on.
    pub site: Option<String>,
    /// Indoor arrangements.
    pub indoor: Option<String>,
    /// Online ordering channel.
    pub online_ordering: Option<String>,
}

impl ListingProfile {
    /// Text field describing the values of a coded category.
    #[must_use]
    pub fn facet_text(&self, category: Category) -> Option<&str> {
        let text = match category {
            Category::Diversity => &self.diversity,
            Category::Production => &self.production,
            Category::Payments => &self.payments,
            Category::Fnap => &self.fnap,
            Category::Location => return None,
        };
        text.as_deref()
    }
}

/// Listing reference returned in result lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSummary {
    /// Store identifier.
    pub listing_id: u64,
    /// Display name.
    pub listing_name: String,
    /// Postal address.
    pub location_address: Option<String>,
}

/// Listing found by a radius search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusHit {
    /// Store identifier.
    pub listing_id: u64,
    /// Display name.
    pub listing_name: String,
    /// Postal address.
    pub location_address: Option<String>,
    /// Latitude in degrees.
    pub location_x: f64,
    /// Longitude in degrees.
    pub location_y: f64,
}

impl RadiusHit {
    pub(crate) fn from_listing(listing: &Listing, location: GeoPoint) -> Self {
        Self {
            listing_id: listing.id,
            listing_name: listing.name.clone(),
            location_address: listing.address.clone(),
            location_x: location.x,
            location_y: location.y,
        }
    }
}
