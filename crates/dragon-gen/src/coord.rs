/// Coordinate types and utilities.
use std::ops::RangeInclusive;

use crate::{Error, TGResult};

//  _____
// |_   _|   _ _ __   ___  ___
//   | || | | | '_ \ / _ \/ __|
//   | || |_| | |_) |  __/\__ \
//   |_| \__, | .__/ \___||___/
//       |___/|_|

/// (latitude, longitude) in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point2d(pub f64, pub f64);

/// Bounding box rectangle with corners in WGS 84 coordinates. All generated positions fall
/// inside one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct BBoxWGS {
    pub upper_left: Point2d,
    pub lower_right: Point2d,
}

impl BBoxWGS {
    pub fn new(upper_left: Point2d, lower_right: Point2d) -> TGResult<Self> {
        Self::validate_lat_lon(upper_left)?;
        Self::validate_lat_lon(lower_right)?;
        if upper_left.0 < lower_right.0 || upper_left.1 > lower_right.1 {
            return Err(Error::InvalidCoord(format!(
                "upper left {upper_left:?} is not north-west of lower right {lower_right:?}"
            )));
        }
        Ok(Self {
            upper_left,
            lower_right,
        })
    }

    /// Rough outline of the continental United States. Default generation area.
    pub fn continental_us() -> Self {
        Self {
            upper_left: Point2d(49.0, -125.0),
            lower_right: Point2d(25.0, -67.0),
        }
    }

    pub fn lat_range(&self) -> RangeInclusive<f64> {
        self.lower_right.0..=self.upper_left.0
    }

    pub fn lon_range(&self) -> RangeInclusive<f64> {
        self.upper_left.1..=self.lower_right.1
    }

    pub fn contains(&self, point: Point2d) -> bool {
        self.lat_range().contains(&point.0) && self.lon_range().contains(&point.1)
    }

    pub fn midpoint(&self) -> Point2d {
        Point2d(
            (self.upper_left.0 + self.lower_right.0) / 2.0,
            (self.upper_left.1 + self.lower_right.1) / 2.0,
        )
    }

    fn validate_lat_lon(coord: Point2d) -> TGResult<()> {
        Self::validate_lat(coord.0)?;
        Self::validate_lon(coord.1)?;
        Ok(())
    }

    fn validate_lat(lat: f64) -> TGResult<()> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoord(format!("latitude {lat}")));
        }
        Ok(())
    }

    fn validate_lon(lon: f64) -> TGResult<()> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoord(format!("longitude {lon}")));
        }
        Ok(())
    }
}

impl Default for BBoxWGS {
    fn default() -> Self {
        Self::continental_us()
    }
}
