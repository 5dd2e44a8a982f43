//! Geographic point and bounding-box types.
//!
//! Coordinates are WGS84 decimal degrees. Bounding boxes do not wrap the
//! antimeridian.

use super::validation::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// A single latitude/longitude position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> ValidationResult<Self> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate("location")?;
        Ok(point)
    }

    pub fn validate(&self, field: &'static str) -> ValidationResult<()> {
        let latitude_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let longitude_ok =
            self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if latitude_ok && longitude_ok {
            return Ok(());
        }

        Err(ValidationError::InvalidCoordinate {
            field,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Axis-aligned latitude/longitude rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl BoundingBox {
    /// Builds a box from any two opposite corners.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            south_west: GeoPoint {
                latitude: a.latitude.min(b.latitude),
                longitude: a.longitude.min(b.longitude),
            },
            north_east: GeoPoint {
                latitude: a.latitude.max(b.latitude),
                longitude: a.longitude.max(b.longitude),
            },
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&point.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&point.longitude)
    }
}
