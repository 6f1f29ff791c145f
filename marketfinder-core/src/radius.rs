//! Great-circle radius filtering over listing coordinates.
//!
//! Distances use the haversine formula on a sphere with the mean Earth radius
//! (6371.0088 km), as provided by `geo`'s [`Haversine`] metric. Radii are
//! converted to kilometres once, when a [`Radius`] is built, so comparisons
//! never mix units.

use std::{fmt, str::FromStr};

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Listing;

const KILOMETRES_PER_MILE: f64 = 1.609_344;

/// Errors raised for malformed coordinates, radii or units.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// The value could not be parsed as a number.
    #[error("{field} must be a number, got `{value}`")]
    NotANumber {
        /// Name of the offending input.
        field: &'static str,
        /// Text that failed to parse.
        value: String,
    },
    /// The value parsed to NaN or infinity.
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending input.
        field: &'static str,
    },
    /// The radius is below zero.
    #[error("radius must not be negative, got {value}")]
    NegativeRadius {
        /// Rejected radius in the caller's unit.
        value: f64,
    },
    /// Latitude outside `[-90, 90]`.
    #[error("latitude {value} is outside [-90, 90]")]
    LatitudeOutOfRange {
        /// Rejected latitude.
        value: f64,
    },
    /// Longitude outside `[-180, 180]`.
    #[error("longitude {value} is outside [-180, 180]")]
    LongitudeOutOfRange {
        /// Rejected longitude.
        value: f64,
    },
    /// The distance unit is not recognised.
    #[error("unknown distance unit `{value}` (use km or mi)")]
    UnknownUnit {
        /// Rejected unit text.
        value: String,
    },
}

/// A coordinate pair with `x` as latitude and `y` as longitude, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub x: f64,
    /// Longitude in degrees.
    pub y: f64,
}

impl GeoPoint {
    /// Validate and construct a point.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let point = Self {
            x: latitude,
            y: longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Parse latitude and longitude text.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, GeoError> {
        Self::new(
            parse_number("latitude", latitude)?,
            parse_number("longitude", longitude)?,
        )
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.x
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.y
    }

    fn validate(&self) -> Result<(), GeoError> {
        if !self.x.is_finite() {
            return Err(GeoError::NonFinite { field: "latitude" });
        }
        if !self.y.is_finite() {
            return Err(GeoError::NonFinite { field: "longitude" });
        }
        if !(-90.0..=90.0).contains(&self.x) {
            return Err(GeoError::LatitudeOutOfRange { value: self.x });
        }
        if !(-180.0..=180.0).contains(&self.y) {
            return Err(GeoError::LongitudeOutOfRange { value: self.y });
        }
        Ok(())
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.y, self.x)
    }
}

/// Unit of a caller-supplied radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    /// Kilometres.
    #[default]
    #[serde(alias = "km")]
    Kilometres,
    /// Statute miles.
    #[serde(alias = "mi")]
    Miles,
}

impl DistanceUnit {
    const fn to_kilometres(self, value: f64) -> f64 {
        match self {
            Self::Kilometres => value,
            Self::Miles => value * KILOMETRES_PER_MILE,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kilometres => "km",
            Self::Miles => "mi",
        })
    }
}

impl FromStr for DistanceUnit {
    type Err = GeoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometre" | "kilometres" | "kilometer" | "kilometers" => Ok(Self::Kilometres),
            "mi" | "mile" | "miles" => Ok(Self::Miles),
            _ => Err(GeoError::UnknownUnit {
                value: value.to_owned(),
            }),
        }
    }
}

/// A validated, non-negative search radius held in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radius {
    kilometres: f64,
}

impl Radius {
    /// Validate a radius in the given unit.
    pub fn new(value: f64, unit: DistanceUnit) -> Result<Self, GeoError> {
        validate_radius(value)?;
        Ok(Self {
            kilometres: unit.to_kilometres(value),
        })
    }

    /// Validate a radius in kilometres.
    pub fn kilometres(value: f64) -> Result<Self, GeoError> {
        Self::new(value, DistanceUnit::Kilometres)
    }

    /// Parse radius text in the given unit.
    pub fn parse(value: &str, unit: DistanceUnit) -> Result<Self, GeoError> {
        Self::new(parse_number("radius", value)?, unit)
    }

    /// Radius in kilometres.
    #[must_use]
    pub const fn as_km(&self) -> f64 {
        self.kilometres
    }
}

/// Haversine distance between two points in kilometres.
///
/// # Examples
///
/// ```
/// use marketfinder_core::{GeoPoint, haversine_km};
///
/// let austin = GeoPoint { x: 30.27, y: -97.74 };
/// let nearby = GeoPoint { x: 30.28, y: -97.75 };
/// let distance = haversine_km(austin, nearby);
/// assert!((distance - 1.47).abs() < 0.01);
/// ```
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    Haversine.distance(from.to_point(), to.to_point()) / 1000.0
}

/// Listings within `radius_km` of `center`, in input order.
///
/// The boundary is inclusive and listings without coordinates never match.
/// Fails when the radius is negative or not finite, or the centre lies
/// outside valid latitude/longitude ranges.
pub fn within_radius<'a>(
    center: GeoPoint,
    radius_km: f64,
    listings: &'a [Listing],
) -> Result<Vec<&'a Listing>, GeoError> {
    center.validate()?;
    validate_radius(radius_km)?;
    Ok(listings
        .iter()
        .filter(|listing| {
            listing
                .location
                .is_some_and(|location| haversine_km(center, location) <= radius_km)
        })
        .collect())
}

fn validate_radius(value: f64) -> Result<(), GeoError> {
    if !value.is_finite() {
        return Err(GeoError::NonFinite { field: "radius" });
    }
    if value < 0.0 {
        return Err(GeoError::NegativeRadius { value });
    }
    Ok(())
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, GeoError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| GeoError::NotANumber {
            field,
            value: value.to_owned(),
        })
}
