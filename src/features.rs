use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Longitude,
    Latitude,
    HousingMedianAge,
    TotalRooms,
    TotalBedrooms,
    Population,
    Households,
    MedianIncome,
    OceanProximity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    Integer,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
    pub kind: NumericKind,
}

impl FieldRange {
    const fn new(min: f64, max: f64, kind: NumericKind) -> Self {
        FieldRange { min, max, kind }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Longitude,
        Field::Latitude,
        Field::HousingMedianAge,
        Field::TotalRooms,
        Field::TotalBedrooms,
        Field::Population,
        Field::Households,
        Field::MedianIncome,
        Field::OceanProximity,
    ];

    pub const NUMERIC: [Field; 8] = [
        Field::Longitude,
        Field::Latitude,
        Field::HousingMedianAge,
        Field::TotalRooms,
        Field::TotalBedrooms,
        Field::Population,
        Field::Households,
        Field::MedianIncome,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Longitude => "longitude",
            Field::Latitude => "latitude",
            Field::HousingMedianAge => "housing_median_age",
            Field::TotalRooms => "total_rooms",
            Field::TotalBedrooms => "total_bedrooms",
            Field::Population => "population",
            Field::Households => "households",
            Field::MedianIncome => "median_income",
            Field::OceanProximity => "ocean_proximity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Longitude => "Longitude",
            Field::Latitude => "Latitude",
            Field::HousingMedianAge => "Housing Median Age",
            Field::TotalRooms => "Total Rooms",
            Field::TotalBedrooms => "Total Bedrooms",
            Field::Population => "Population",
            Field::Households => "Households",
            Field::MedianIncome => "Median Income",
            Field::OceanProximity => "Ocean Proximity",
        }
    }

    /// Declared bounds for numeric fields; `None` for the categorical one.
    pub fn range(self) -> Option<FieldRange> {
        use NumericKind::*;
        let range = match self {
            Field::Longitude => FieldRange::new(-124.35, -114.31, Float),
            Field::Latitude => FieldRange::new(32.54, 41.95, Float),
            Field::HousingMedianAge => FieldRange::new(1.0, 52.0, Integer),
            Field::TotalRooms => FieldRange::new(2.0, 39320.0, Integer),
            Field::TotalBedrooms => FieldRange::new(1.0, 6445.0, Integer),
            Field::Population => FieldRange::new(3.0, 35682.0, Integer),
            Field::Households => FieldRange::new(1.0, 6082.0, Integer),
            Field::MedianIncome => FieldRange::new(0.4999, 15.0001, Float),
            Field::OceanProximity => return None,
        };
        Some(range)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OceanProximity {
    #[default]
    #[serde(rename = "<1H OCEAN")]
    LessThanHourToOcean,
    #[serde(rename = "INLAND")]
    Inland,
    #[serde(rename = "ISLAND")]
    Island,
    #[serde(rename = "NEAR BAY")]
    NearBay,
    #[serde(rename = "NEAR OCEAN")]
    NearOcean,
}

impl OceanProximity {
    pub const ALL: [OceanProximity; 5] = [
        OceanProximity::LessThanHourToOcean,
        OceanProximity::Inland,
        OceanProximity::Island,
        OceanProximity::NearBay,
        OceanProximity::NearOcean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OceanProximity::LessThanHourToOcean => "<1H OCEAN",
            OceanProximity::Inland => "INLAND",
            OceanProximity::Island => "ISLAND",
            OceanProximity::NearBay => "NEAR BAY",
            OceanProximity::NearOcean => "NEAR OCEAN",
        }
    }
}

impl fmt::Display for OceanProximity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OceanProximity {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OceanProximity::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| FormError::UnknownOption(s.to_string()))
    }
}

// Map surface defaults, lat/lon order.
pub const MAP_CENTER: (f64, f64) = (36.7783, -119.4179);
pub const MAP_BOUNDS: [(f64, f64); 2] = [(32.5, -124.5), (42.0, -114.0)];
pub const MAP_ZOOM: u8 = 6;
pub const MAP_MIN_ZOOM: u8 = 6;
pub const MAP_MAX_ZOOM: u8 = 12;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SampleRow {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: u32,
    pub total_rooms: u32,
    pub total_bedrooms: u32,
    pub population: u32,
    pub households: u32,
    pub median_income: f64,
    pub ocean_proximity: OceanProximity,
}

const fn sample(
    longitude: f64,
    latitude: f64,
    counts: [u32; 5],
    median_income: f64,
) -> SampleRow {
    SampleRow {
        longitude,
        latitude,
        housing_median_age: counts[0],
        total_rooms: counts[1],
        total_bedrooms: counts[2],
        population: counts[3],
        households: counts[4],
        median_income,
        ocean_proximity: OceanProximity::NearBay,
    }
}

// First rows of the California housing dataset.
pub const SAMPLE_DATA: [SampleRow; 5] = [
    sample(-122.23, 37.88, [41, 880, 129, 322, 126], 8.3252),
    sample(-122.22, 37.86, [21, 7099, 1106, 2401, 1138], 8.3014),
    sample(-122.24, 37.85, [52, 1467, 190, 496, 177], 7.2574),
    sample(-122.25, 37.85, [52, 1274, 235, 558, 219], 5.6431),
    sample(-122.25, 37.85, [52, 1627, 280, 565, 259], 3.8462),
];
