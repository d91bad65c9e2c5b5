//! Flat daily-report record in the ECDC tabular layout

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

use crate::error::ConvertError;

/// One row of the flat COVID-19 dataset.
///
/// Only `dateRep`, `cases` and `deaths` are required. Every other column is
/// carried through with whatever JSON value the input gives it (`null` when
/// absent).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CovidRecord {
    /// Report date as `DD/MM/YYYY`
    pub date_rep: String,

    #[serde(default)]
    pub day: JsonValue,

    #[serde(default)]
    pub month: JsonValue,

    #[serde(default)]
    pub year: JsonValue,

    pub cases: Number,

    pub deaths: Number,

    #[serde(default)]
    pub countries_and_territories: JsonValue,

    #[serde(default)]
    pub geo_id: JsonValue,

    #[serde(default)]
    pub countryterritory_code: JsonValue,

    #[serde(rename = "popData2019", default)]
    pub pop_data_2019: JsonValue,

    #[serde(default)]
    pub continent_exp: JsonValue,

    #[serde(
        rename = "Cumulative_number_for_14_days_of_COVID-19_cases_per_100000",
        default
    )]
    pub cumulative_14_day_rate: JsonValue,
}

impl CovidRecord {
    /// Record with only the required columns set
    pub fn new(
        date_rep: impl Into<String>,
        cases: impl Into<Number>,
        deaths: impl Into<Number>,
    ) -> Self {
        Self {
            date_rep: date_rep.into(),
            day: JsonValue::Null,
            month: JsonValue::Null,
            year: JsonValue::Null,
            cases: cases.into(),
            deaths: deaths.into(),
            countries_and_territories: JsonValue::Null,
            geo_id: JsonValue::Null,
            countryterritory_code: JsonValue::Null,
            pop_data_2019: JsonValue::Null,
            continent_exp: JsonValue::Null,
            cumulative_14_day_rate: JsonValue::Null,
        }
    }

    /// Parse an uploaded JSON array of records.
    ///
    /// Each element is decoded on its own so that the first bad one is
    /// reported by position and aborts the whole batch.
    pub fn list_from_slice(bytes: &[u8]) -> Result<Vec<Self>, ConvertError> {
        let document: JsonValue = serde_json::from_slice(bytes)?;
        let JsonValue::Array(items) = document else {
            return Err(ConvertError::UnexpectedShape(
                "expected an array of records".to_string(),
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<CovidRecord>(item)
                    .map_err(|e| ConvertError::malformed(index, e))
            })
            .collect()
    }
}
