//! Defines the query parameters for a gridded OISST request: the variable of
//! interest, the spatial window, and the overall date range.

use crate::error::OisstError;
use bon::bon;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive numeric range along one axis of the grid.
///
/// The minimum is the first element (index 0), the maximum the second (index 1).
///
/// # Examples
///
/// ```
/// use oisst::Extent;
///
/// let agulhas_lat = Extent(-40.0, -35.0);
/// assert_eq!(agulhas_lat.0, -40.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent(pub f64, pub f64);

impl Extent {
    fn validate(&self) -> Result<(), OisstError> {
        if !self.0.is_finite() || !self.1.is_finite() {
            return Err(OisstError::ExtentFinite {
                min: self.0,
                max: self.1,
            });
        }
        if self.0 > self.1 {
            return Err(OisstError::ExtentOrder {
                min: self.0,
                max: self.1,
            });
        }
        Ok(())
    }

    fn within(&self, lo: f64, hi: f64) -> bool {
        self.0 >= lo && self.1 <= hi
    }
}

/// A validated description of what to download: one variable at one depth
/// extent, over a latitude/longitude window and an overall date range.
///
/// Construct via the builder; validation happens in `build()`:
/// start must not be after end, latitude must lie within [-90, 90] and
/// longitude within [-180, 180] (the dataset uses ±180 longitudes).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use oisst::{Extent, QuerySpec};
///
/// let spec = QuerySpec::builder()
///     .latitude(Extent(-40.0, -35.0))
///     .longitude(Extent(15.0, 21.0))
///     .start(NaiveDate::from_ymd_opt(1982, 1, 1).unwrap())
///     .end(NaiveDate::from_ymd_opt(1998, 12, 31).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(spec.variable(), "sst");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    variable: String,
    depth: Extent,
    latitude: Extent,
    longitude: Extent,
    start: NaiveDate,
    end: NaiveDate,
}

#[bon]
impl QuerySpec {
    /// Builds a `QuerySpec`, validating its invariants.
    ///
    /// # Arguments
    ///
    /// * `.variable(impl Into<String>)`: Optional. Grid variable name. Defaults to `"sst"`.
    /// * `.depth(Extent)`: Optional. Depth (zlev) extent in meters. Defaults to the surface, `Extent(0.0, 0.0)`.
    /// * `.latitude(Extent)`: **Required.** Latitude window in degrees north.
    /// * `.longitude(Extent)`: **Required.** Longitude window in degrees east, ±180 convention.
    /// * `.start(NaiveDate)`: **Required.** First date of the overall range (inclusive).
    /// * `.end(NaiveDate)`: **Required.** Last date of the overall range (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`OisstError::QueryRange`] if `start > end`,
    /// [`OisstError::ExtentFinite`] if any extent holds a NaN or infinity,
    /// [`OisstError::ExtentOrder`] if any extent is reversed, and
    /// [`OisstError::LatitudeBounds`] / [`OisstError::LongitudeBounds`] if the
    /// window leaves the valid global grid.
    #[builder]
    pub fn new(
        #[builder(into, default = String::from("sst"))] variable: String,
        #[builder(default = Extent(0.0, 0.0))] depth: Extent,
        latitude: Extent,
        longitude: Extent,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, OisstError> {
        if start > end {
            return Err(OisstError::QueryRange { start, end });
        }
        depth.validate()?;
        latitude.validate()?;
        longitude.validate()?;
        if !latitude.within(-90.0, 90.0) {
            return Err(OisstError::LatitudeBounds {
                min: latitude.0,
                max: latitude.1,
            });
        }
        if !longitude.within(-180.0, 180.0) {
            return Err(OisstError::LongitudeBounds {
                min: longitude.0,
                max: longitude.1,
            });
        }
        Ok(Self {
            variable,
            depth,
            latitude,
            longitude,
            start,
            end,
        })
    }
}

impl QuerySpec {
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn depth(&self) -> Extent {
        self.depth
    }

    pub fn latitude(&self) -> Extent {
        self.latitude
    }

    pub fn longitude(&self) -> Extent {
        self.longitude
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_builder() -> Result<QuerySpec, OisstError> {
        QuerySpec::builder()
            .latitude(Extent(-40.0, -35.0))
            .longitude(Extent(15.0, 21.0))
            .start(date(1982, 1, 1))
            .end(date(1998, 12, 31))
            .build()
    }

    #[test]
    fn defaults_to_surface_sst() {
        let spec = base_builder().unwrap();
        assert_eq!(spec.variable(), "sst");
        assert_eq!(spec.depth(), Extent(0.0, 0.0));
    }

    #[test]
    fn rejects_reversed_date_range() {
        let err = QuerySpec::builder()
            .latitude(Extent(-40.0, -35.0))
            .longitude(Extent(15.0, 21.0))
            .start(date(1999, 1, 1))
            .end(date(1998, 12, 31))
            .build()
            .unwrap_err();
        assert!(matches!(err, OisstError::QueryRange { .. }));
    }

    #[test]
    fn rejects_latitude_out_of_bounds() {
        let err = QuerySpec::builder()
            .latitude(Extent(-95.0, -35.0))
            .longitude(Extent(15.0, 21.0))
            .start(date(1982, 1, 1))
            .end(date(1998, 12, 31))
            .build()
            .unwrap_err();
        assert!(matches!(err, OisstError::LatitudeBounds { .. }));
    }

    #[test]
    fn rejects_longitude_out_of_bounds() {
        let err = QuerySpec::builder()
            .latitude(Extent(-40.0, -35.0))
            .longitude(Extent(170.0, 190.0))
            .start(date(1982, 1, 1))
            .end(date(1998, 12, 31))
            .build()
            .unwrap_err();
        assert!(matches!(err, OisstError::LongitudeBounds { .. }));
    }

    #[test]
    fn rejects_reversed_extent() {
        let err = QuerySpec::builder()
            .latitude(Extent(-35.0, -40.0))
            .longitude(Extent(15.0, 21.0))
            .start(date(1982, 1, 1))
            .end(date(1998, 12, 31))
            .build()
            .unwrap_err();
        assert!(matches!(err, OisstError::ExtentOrder { .. }));
    }

    #[test]
    fn rejects_non_finite_depth() {
        let err = QuerySpec::builder()
            .depth(Extent(f64::NAN, f64::NAN))
            .latitude(Extent(-40.0, -35.0))
            .longitude(Extent(15.0, 21.0))
            .start(date(1982, 1, 1))
            .end(date(1998, 12, 31))
            .build()
            .unwrap_err();
        assert!(matches!(err, OisstError::ExtentFinite { .. }));
    }

    #[test]
    fn rejects_infinite_longitude() {
        let err = QuerySpec::builder()
            .latitude(Extent(-40.0, -35.0))
            .longitude(Extent(15.0, f64::INFINITY))
            .start(date(1982, 1, 1))
            .end(date(1998, 12, 31))
            .build()
            .unwrap_err();
        assert!(matches!(err, OisstError::ExtentFinite { .. }));
    }

    #[test]
    fn single_day_range_is_valid() {
        let spec = QuerySpec::builder()
            .variable("anom")
            .latitude(Extent(-40.0, -35.0))
            .longitude(Extent(15.0, 21.0))
            .start(date(1982, 1, 1))
            .end(date(1982, 1, 1))
            .build()
            .unwrap();
        assert_eq!(spec.variable(), "anom");
        assert_eq!(spec.start(), spec.end());
    }
}
