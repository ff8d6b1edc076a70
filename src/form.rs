use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FormError, PredictError};
use crate::features::{Field, NumericKind, OceanProximity, MAP_CENTER};
use crate::predict::PredictionClient;

// Longest numeric prefix, the way browser number parsing reads form input.
// Decimal only: "0x1A" reads as 0, hex prefixes are not honoured.
static INTEGER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("integer prefix pattern"));
static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:Infinity|(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?))")
        .expect("float prefix pattern")
});

/// Reads a raw input value as `kind`. `None` means the field becomes unset.
pub fn parse_numeric(raw: &str, kind: NumericKind) -> Option<f64> {
    let pattern = match kind {
        NumericKind::Integer => &*INTEGER_PREFIX,
        NumericKind::Float => &*FLOAT_PREFIX,
    };
    let text = pattern.captures(raw)?.get(1)?.as_str();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = if body == "Infinity" {
        f64::INFINITY
    } else {
        body.parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub housing_median_age: Option<f64>,
    pub total_rooms: Option<f64>,
    pub total_bedrooms: Option<f64>,
    pub population: Option<f64>,
    pub households: Option<f64>,
    pub median_income: Option<f64>,
    pub ocean_proximity: OceanProximity,
}

impl FeatureRecord {
    /// Numeric value of `field`; always `None` for `ocean_proximity`.
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Longitude => self.longitude,
            Field::Latitude => self.latitude,
            Field::HousingMedianAge => self.housing_median_age,
            Field::TotalRooms => self.total_rooms,
            Field::TotalBedrooms => self.total_bedrooms,
            Field::Population => self.population,
            Field::Households => self.households,
            Field::MedianIncome => self.median_income,
            Field::OceanProximity => None,
        }
    }

    fn slot_mut(&mut self, field: Field) -> Option<&mut Option<f64>> {
        let slot = match field {
            Field::Longitude => &mut self.longitude,
            Field::Latitude => &mut self.latitude,
            Field::HousingMedianAge => &mut self.housing_median_age,
            Field::TotalRooms => &mut self.total_rooms,
            Field::TotalBedrooms => &mut self.total_bedrooms,
            Field::Population => &mut self.population,
            Field::Households => &mut self.households,
            Field::MedianIncome => &mut self.median_income,
            Field::OceanProximity => return None,
        };
        Some(slot)
    }

    pub fn unset_fields(&self) -> Vec<Field> {
        Field::NUMERIC
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }
}

/// Wire payload for `POST /predict`. Unset fields carry NaN, which
/// serde_json writes as `null`.
#[derive(Clone, Debug, Serialize)]
pub struct PredictionRequest {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: f64,
    pub total_rooms: f64,
    pub total_bedrooms: f64,
    pub population: f64,
    pub households: f64,
    pub median_income: f64,
    pub ocean_proximity: OceanProximity,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PredictionResult {
    #[default]
    Empty,
    Price(f64),
    Error(String),
}

impl PredictionResult {
    pub fn prediction(&self) -> Option<f64> {
        match self {
            PredictionResult::Price(value) => Some(*value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PredictionResult::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn display(&self) -> Option<String> {
        match self {
            PredictionResult::Empty => None,
            PredictionResult::Price(value) => {
                Some(format!("Predicted Price: ${}", format_price(*value)))
            }
            PredictionResult::Error(message) => Some(message.clone()),
        }
    }
}

/// Whole dollars with thousands separators, e.g. `452,600`.
pub fn format_price(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormPolicy {
    /// Clamp map selections to the latitude/longitude ranges. Off by default:
    /// map clicks and marker drags are stored as the surface reports them.
    pub clamp_geo_select: bool,
    /// Refuse to call the service while any numeric field is unset.
    pub require_complete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoSource {
    MapClick,
    MarkerDrag,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormEvent {
    FieldEdit { field: Field, raw: String },
    GeoSelect { lat: f64, lon: f64, source: GeoSource },
}

/// Owns the canonical record. Every input surface goes through `dispatch`.
#[derive(Debug, Default)]
pub struct FormStateController {
    record: FeatureRecord,
    result: PredictionResult,
    policy: FormPolicy,
}

impl FormStateController {
    pub fn new(policy: FormPolicy) -> Self {
        FormStateController {
            policy,
            ..Default::default()
        }
    }

    pub fn record(&self) -> &FeatureRecord {
        &self.record
    }

    pub fn result(&self) -> &PredictionResult {
        &self.result
    }

    pub fn policy(&self) -> FormPolicy {
        self.policy
    }

    pub fn dispatch(&mut self, event: FormEvent) -> Result<(), FormError> {
        match event {
            FormEvent::FieldEdit { field, raw } => self.apply_field_edit(field, &raw),
            FormEvent::GeoSelect { lat, lon, source } => {
                debug!(?source, lat, lon, "geo select");
                self.apply_geo_select(lat, lon);
                Ok(())
            }
        }
    }

    /// Stores a slider or number-box edit. Numeric input is clamped into range
    /// or, when unparseable, leaves the field unset. Only `field` changes.
    pub fn apply_field_edit(&mut self, field: Field, raw: &str) -> Result<(), FormError> {
        let Some(range) = field.range() else {
            self.record.ocean_proximity = raw.parse()?;
            return Ok(());
        };
        let value = parse_numeric(raw, range.kind).map(|v| range.clamp(v));
        if let Some(slot) = self.record.slot_mut(field) {
            *slot = value;
        }
        debug!(%field, raw, ?value, "field edit");
        Ok(())
    }

    /// Overwrites latitude and longitude together.
    pub fn apply_geo_select(&mut self, lat: f64, lon: f64) {
        let (mut lat, mut lon) = (lat, lon);
        if self.policy.clamp_geo_select {
            if let Some(range) = Field::Latitude.range() {
                lat = range.clamp(lat);
            }
            if let Some(range) = Field::Longitude.range() {
                lon = range.clamp(lon);
            }
        }
        self.record.latitude = Some(lat);
        self.record.longitude = Some(lon);
    }

    pub fn build_request(&self) -> PredictionRequest {
        let r = &self.record;
        let num = |value: Option<f64>| value.unwrap_or(f64::NAN);
        PredictionRequest {
            longitude: num(r.longitude),
            latitude: num(r.latitude),
            housing_median_age: num(r.housing_median_age),
            total_rooms: num(r.total_rooms),
            total_bedrooms: num(r.total_bedrooms),
            population: num(r.population),
            households: num(r.households),
            median_income: num(r.median_income),
            ocean_proximity: r.ocean_proximity,
        }
    }

    /// Clears the previous result and returns the payload to send, or `None`
    /// when the policy refuses an incomplete record.
    pub fn begin_submission(&mut self) -> Option<PredictionRequest> {
        self.result = PredictionResult::Empty;
        if self.policy.require_complete {
            let missing = self.record.unset_fields();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
                warn!(missing = ?names, "submission blocked");
                self.result = PredictionResult::Error(format!("Missing values: {}", names.join(", ")));
                return None;
            }
        }
        Some(self.build_request())
    }

    /// Last caller wins; there is no sequencing between overlapping submissions.
    pub fn finish_submission(&mut self, outcome: Result<f64, PredictError>) {
        self.result = match outcome {
            Ok(price) => {
                info!(price, "prediction received");
                PredictionResult::Price(price)
            }
            Err(err) => {
                warn!(error = %err, "prediction failed");
                PredictionResult::Error(err.user_message().to_string())
            }
        };
    }

    pub async fn submit(&mut self, client: &PredictionClient) -> &PredictionResult {
        if let Some(request) = self.begin_submission() {
            let outcome = client.predict(&request).await;
            self.finish_submission(outcome);
        }
        &self.result
    }

    /// Where the map marker sits; unset coordinates fall back to the map centre.
    pub fn marker_position(&self) -> (f64, f64) {
        (
            self.record.latitude.unwrap_or(MAP_CENTER.0),
            self.record.longitude.unwrap_or(MAP_CENTER.1),
        )
    }

    pub fn reset(&mut self) {
        self.record = FeatureRecord::default();
        self.result = PredictionResult::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::COULD_NOT_CONNECT;

    fn filled() -> FormStateController {
        let mut form = FormStateController::default();
        for (field, raw) in [
            (Field::Longitude, "-122.23"),
            (Field::Latitude, "37.88"),
            (Field::HousingMedianAge, "41"),
            (Field::TotalRooms, "880"),
            (Field::TotalBedrooms, "129"),
            (Field::Population, "322"),
            (Field::Households, "126"),
            (Field::MedianIncome, "8.3252"),
            (Field::OceanProximity, "NEAR BAY"),
        ] {
            form.apply_field_edit(field, raw).unwrap();
        }
        form
    }

    #[test]
    fn parse_reads_numeric_prefix() {
        use NumericKind::*;
        assert_eq!(parse_numeric("42", Integer), Some(42.0));
        assert_eq!(parse_numeric("  7.9", Integer), Some(7.0));
        assert_eq!(parse_numeric("12abc", Integer), Some(12.0));
        assert_eq!(parse_numeric("-3", Integer), Some(-3.0));
        assert_eq!(parse_numeric("0x1A", Integer), Some(0.0));
        assert_eq!(parse_numeric("8.3252", Float), Some(8.3252));
        assert_eq!(parse_numeric(".5", Float), Some(0.5));
        assert_eq!(parse_numeric("1e3x", Float), Some(1000.0));
        assert_eq!(parse_numeric("2e", Float), Some(2.0));
        assert_eq!(parse_numeric("-Infinity", Float), Some(f64::NEG_INFINITY));
        assert_eq!(parse_numeric("Infinity", Integer), None);
        assert_eq!(parse_numeric("abc", Float), None);
        assert_eq!(parse_numeric("", Integer), None);
        assert_eq!(parse_numeric("-", Float), None);
    }

    #[test]
    fn field_edit_clamps_to_bounds() {
        let mut form = FormStateController::default();
        form.apply_field_edit(Field::Households, "99999").unwrap();
        assert_eq!(form.record().households, Some(6082.0));
        form.apply_field_edit(Field::Longitude, "-125").unwrap();
        assert_eq!(form.record().longitude, Some(-124.35));
        form.apply_field_edit(Field::MedianIncome, "0").unwrap();
        assert_eq!(form.record().median_income, Some(0.4999));
        form.apply_field_edit(Field::Population, "1e9").unwrap();
        assert_eq!(form.record().population, Some(3.0));
        form.apply_field_edit(Field::Latitude, "Infinity").unwrap();
        assert_eq!(form.record().latitude, Some(41.95));
    }

    #[test]
    fn unparseable_edit_unsets_field() {
        let mut form = filled();
        form.apply_field_edit(Field::Households, "abc").unwrap();
        assert_eq!(form.record().households, None);
        form.apply_field_edit(Field::MedianIncome, "").unwrap();
        assert_eq!(form.record().median_income, None);
    }

    #[test]
    fn field_edit_touches_only_its_field() {
        let mut form = filled();
        let before = form.record().clone();
        form.apply_field_edit(Field::TotalRooms, "5000").unwrap();
        let after = form.record();
        for field in Field::NUMERIC {
            if field != Field::TotalRooms {
                assert_eq!(after.get(field), before.get(field), "{field}");
            }
        }
        assert_eq!(after.ocean_proximity, before.ocean_proximity);
        assert_eq!(after.total_rooms, Some(5000.0));
    }

    #[test]
    fn every_numeric_edit_lands_in_range_or_unset() {
        let raws = [
            "-1e12", "-125", "-1", "0", "0.3", "1", "33.3", "52", "53", "999999", "1e30", "x", "",
            " 17", "-Infinity",
        ];
        let mut form = FormStateController::default();
        for field in Field::NUMERIC {
            let range = field.range().unwrap();
            for raw in raws {
                form.apply_field_edit(field, raw).unwrap();
                if let Some(v) = form.record().get(field) {
                    assert!(range.contains(v), "{field} <- {raw:?} gave {v}");
                }
            }
        }
    }

    #[test]
    fn ocean_proximity_edit_stores_option() {
        let mut form = FormStateController::default();
        assert_eq!(form.record().ocean_proximity, OceanProximity::LessThanHourToOcean);
        form.apply_field_edit(Field::OceanProximity, "INLAND").unwrap();
        assert_eq!(form.record().ocean_proximity, OceanProximity::Inland);

        let err = form.apply_field_edit(Field::OceanProximity, "DESERT").unwrap_err();
        assert_eq!(err, FormError::UnknownOption("DESERT".into()));
        assert_eq!(form.record().ocean_proximity, OceanProximity::Inland);
    }

    #[test]
    fn geo_select_updates_pair_without_clamping() {
        let mut form = FormStateController::default();
        form.dispatch(FormEvent::GeoSelect {
            lat: 45.123456789,
            lon: -130.5,
            source: GeoSource::MapClick,
        })
        .unwrap();
        assert_eq!(form.record().latitude, Some(45.123456789));
        assert_eq!(form.record().longitude, Some(-130.5));

        form.dispatch(FormEvent::GeoSelect {
            lat: 34.05,
            lon: -118.24,
            source: GeoSource::MarkerDrag,
        })
        .unwrap();
        assert_eq!(form.marker_position(), (34.05, -118.24));
    }

    #[test]
    fn geo_select_clamps_when_policy_asks() {
        let mut form = FormStateController::new(FormPolicy {
            clamp_geo_select: true,
            ..Default::default()
        });
        form.apply_geo_select(45.0, -130.0);
        assert_eq!(form.record().latitude, Some(41.95));
        assert_eq!(form.record().longitude, Some(-124.35));
    }

    #[test]
    fn marker_falls_back_to_map_centre() {
        let mut form = FormStateController::default();
        assert_eq!(form.marker_position(), MAP_CENTER);
        form.apply_field_edit(Field::Latitude, "35").unwrap();
        assert_eq!(form.marker_position(), (35.0, MAP_CENTER.1));
    }

    #[test]
    fn build_request_is_idempotent() {
        let mut form = filled();
        form.apply_field_edit(Field::TotalBedrooms, "").unwrap();
        let first = serde_json::to_value(form.build_request()).unwrap();
        let second = serde_json::to_value(form.build_request()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn build_request_emits_numbers_and_option() {
        let form = filled();
        let payload = serde_json::to_value(form.build_request()).unwrap();
        for field in Field::NUMERIC {
            assert!(payload[field.as_str()].is_number(), "{field}");
        }
        assert_eq!(payload["housing_median_age"].as_f64(), Some(41.0));
        assert_eq!(payload["ocean_proximity"], "NEAR BAY");
    }

    #[test]
    fn unset_field_becomes_null_sentinel() {
        let mut form = filled();
        form.apply_field_edit(Field::MedianIncome, "n/a").unwrap();
        let request = form.build_request();
        assert!(request.median_income.is_nan());
        let payload = serde_json::to_value(&request).unwrap();
        assert!(payload["median_income"].is_null());
    }

    #[test]
    fn begin_submission_clears_previous_result() {
        let mut form = filled();
        form.finish_submission(Err(PredictError::Transport("refused".into())));
        assert_eq!(form.result().error(), Some(COULD_NOT_CONNECT));
        assert!(form.begin_submission().is_some());
        assert_eq!(form.result(), &PredictionResult::Empty);
        form.finish_submission(Ok(452600.0));
        assert_eq!(form.result().prediction(), Some(452600.0));
        assert_eq!(form.result().error(), None);
    }

    #[test]
    fn require_complete_blocks_unset_fields() {
        let mut form = FormStateController::new(FormPolicy {
            require_complete: true,
            ..Default::default()
        });
        form.apply_field_edit(Field::Longitude, "-120").unwrap();
        assert!(form.begin_submission().is_none());
        let message = form.result().error().unwrap();
        assert!(message.starts_with("Missing values: latitude, housing_median_age"));
        assert!(!message.contains("longitude"));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut form = filled();
        form.finish_submission(Ok(1.0));
        form.reset();
        assert_eq!(form.record(), &FeatureRecord::default());
        assert_eq!(form.result(), &PredictionResult::Empty);
        assert_eq!(form.record().unset_fields().len(), 8);
    }

    #[test]
    fn price_display_groups_thousands() {
        assert_eq!(format_price(452600.0), "452,600");
        assert_eq!(format_price(999.5), "1,000");
        assert_eq!(format_price(1234567.4), "1,234,567");
        assert_eq!(format_price(12.0), "12");
        assert_eq!(format_price(-4500.0), "-4,500");
        assert_eq!(
            PredictionResult::Price(452600.0).display().as_deref(),
            Some("Predicted Price: $452,600")
        );
        assert_eq!(PredictionResult::Empty.display(), None);
    }
}
