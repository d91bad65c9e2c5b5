//! Mapping between flat daily-report records and FHIR Observation bundles

use chrono::NaiveDate;
use serde_json::{Number, Value as JsonValue};

use crate::bundle::{Bundle, BundleEntry};
use crate::error::ConvertError;
use crate::observation::{Observation, codes};
use crate::record::CovidRecord;

/// `dateRep` layout in the flat dataset
pub const FLAT_DATE_FORMAT: &str = "%d/%m/%Y";

/// `effectiveDateTime` layout in generated Observations
pub const FHIR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert flat records into a collection Bundle, one Observation per record.
///
/// Counts are copied through unchanged. Fails on the first record whose
/// `dateRep` is not `DD/MM/YYYY`.
pub fn records_to_bundle(records: &[CovidRecord]) -> Result<Bundle, ConvertError> {
    let entries = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let date = NaiveDate::parse_from_str(&record.date_rep, FLAT_DATE_FORMAT).map_err(
                |e| ConvertError::malformed(index, format!("dateRep '{}': {}", record.date_rep, e)),
            )?;

            let observation = Observation::daily_report(
                format!("observation-{}", record.date_rep),
                date.format(FHIR_DATE_FORMAT).to_string(),
                record.cases.clone(),
                record.deaths.clone(),
            );
            Ok(BundleEntry::new(observation))
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    Ok(Bundle::collection(entries))
}

/// Convert a Bundle of daily-report Observations back into flat records.
///
/// Columns the Observation does not carry are filled with placeholders, and
/// all three country columns take the subject reference's last segment.
pub fn bundle_to_records(bundle: &Bundle) -> Result<Vec<CovidRecord>, ConvertError> {
    bundle
        .entry
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let observation = entry
                .resource
                .as_ref()
                .ok_or_else(|| ConvertError::malformed(index, "entry has no resource"))?;
            observation_to_record(index, observation)
        })
        .collect()
}

fn observation_to_record(
    index: usize,
    observation: &Observation,
) -> Result<CovidRecord, ConvertError> {
    if observation.resource_type != "Observation" {
        return Err(ConvertError::malformed(
            index,
            format!("expected an Observation, got {}", observation.resource_type),
        ));
    }

    let effective = observation
        .effective_date_time
        .as_deref()
        .ok_or_else(|| ConvertError::malformed(index, "missing effectiveDateTime"))?;
    let date = NaiveDate::parse_from_str(effective, FHIR_DATE_FORMAT).map_err(|e| {
        ConvertError::malformed(index, format!("effectiveDateTime '{}': {}", effective, e))
    })?;

    let count_for = |code: &str| {
        observation
            .component_with_code(code)
            .and_then(|c| c.value())
            .cloned()
            .unwrap_or_else(|| Number::from(0))
    };
    let country = JsonValue::String(observation.subject_id().to_string());
    let date_part = |format: &str| JsonValue::String(date.format(format).to_string());

    Ok(CovidRecord {
        date_rep: date.format(FLAT_DATE_FORMAT).to_string(),
        day: date_part("%d"),
        month: date_part("%m"),
        year: date_part("%Y"),
        cases: count_for(codes::CASES_CODE),
        deaths: count_for(codes::DEATHS_CODE),
        countries_and_territories: country.clone(),
        geo_id: country.clone(),
        countryterritory_code: country,
        pop_data_2019: JsonValue::from(0),
        continent_exp: JsonValue::String(String::new()),
        cumulative_14_day_rate: JsonValue::String(String::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleType;
    use serde_json::json;

    fn bundle_from(value: JsonValue) -> Bundle {
        Bundle::from_slice(value.to_string().as_bytes()).unwrap()
    }

    fn observation_at(date: &str) -> JsonValue {
        json!({"resource": {"resourceType": "Observation", "effectiveDateTime": date}})
    }

    #[test]
    fn test_forward_maps_date_and_counts() {
        let bundle = records_to_bundle(&[CovidRecord::new("31/12/2020", 100, 5)]).unwrap();
        let body = serde_json::to_value(&bundle).unwrap();

        assert_eq!(body["resourceType"], "Bundle");
        assert_eq!(body["type"], "collection");

        let obs = &body["entry"][0]["resource"];
        assert_eq!(obs["resourceType"], "Observation");
        assert_eq!(obs["id"], "observation-31/12/2020");
        assert_eq!(obs["effectiveDateTime"], "2020-12-31");
        assert_eq!(obs["subject"]["reference"], "Patient/afghanistan");
        assert_eq!(obs["meta"]["profile"][0], codes::CASE_DAILY_PROFILE);
        assert_eq!(obs["component"][0]["code"]["coding"][0]["code"], "confirmed");
        assert_eq!(obs["component"][0]["valueQuantity"]["value"], 100);
        assert_eq!(obs["component"][0]["valueQuantity"]["unit"], "1");
        assert_eq!(obs["component"][1]["code"]["coding"][0]["code"], "reported");
        assert_eq!(obs["component"][1]["valueQuantity"]["value"], 5);
    }

    #[test]
    fn test_forward_serializes_only_collection_fields() {
        let bundle = records_to_bundle(&[CovidRecord::new("31/12/2020", 1, 0)]).unwrap();
        let body = serde_json::to_value(&bundle).unwrap();

        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(body.get("total").is_none());
        let entry = body["entry"][0].as_object().unwrap();
        assert_eq!(entry.keys().collect::<Vec<_>>(), vec!["resource"]);
    }

    #[test]
    fn test_forward_keeps_input_order() {
        let records = vec![
            CovidRecord::new("02/01/2021", 1, 0),
            CovidRecord::new("01/01/2021", 2, 0),
        ];
        let bundle = records_to_bundle(&records).unwrap();
        let dates: Vec<_> = bundle
            .entry
            .iter()
            .map(|e| e.resource.as_ref().unwrap().effective_date_time.clone().unwrap())
            .collect();
        assert_eq!(dates, vec!["2021-01-02", "2021-01-01"]);
    }

    #[test]
    fn test_forward_rejects_malformed_date() {
        let records = vec![
            CovidRecord::new("01/01/2021", 1, 0),
            CovidRecord::new("2021-01-02", 1, 0),
        ];
        let err = records_to_bundle(&records).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedRecord { index: 1, .. }));
        assert!(err.to_string().contains("malformed record at index 1"));
    }

    #[test]
    fn test_forward_accepts_unpadded_date() {
        let bundle = records_to_bundle(&[CovidRecord::new("1/2/2020", 3, 0)]).unwrap();
        let obs = bundle.entry[0].resource.as_ref().unwrap();
        assert_eq!(obs.effective_date_time.as_deref(), Some("2020-02-01"));
        assert_eq!(obs.id.as_deref(), Some("observation-1/2/2020"));
    }

    #[test]
    fn test_forward_passes_decimal_cases_through() {
        let upload = br#"[{"dateRep": "31/12/2020", "cases": 100.5, "deaths": 5}]"#;
        let records = CovidRecord::list_from_slice(upload).unwrap();
        let body = serde_json::to_value(records_to_bundle(&records).unwrap()).unwrap();

        let component = &body["entry"][0]["resource"]["component"];
        assert_eq!(component[0]["valueQuantity"]["value"], 100.5);
        assert_eq!(component[1]["valueQuantity"]["value"], 5);
    }

    #[test]
    fn test_forward_ignores_types_of_unused_columns() {
        let upload = json!([{
            "dateRep": "31/12/2020",
            "cases": 100,
            "deaths": 5,
            "day": 31,
            "countryterritoryCode": null,
            "popData2019": "unknown",
            "Cumulative_number_for_14_days_of_COVID-19_cases_per_100000": 9.01
        }]);
        let records = CovidRecord::list_from_slice(upload.to_string().as_bytes()).unwrap();

        assert_eq!(records[0].day, json!(31));
        assert_eq!(records[0].countryterritory_code, JsonValue::Null);
        assert_eq!(records[0].pop_data_2019, json!("unknown"));
        assert_eq!(records_to_bundle(&records).unwrap().entry.len(), 1);
    }

    #[test]
    fn test_missing_date_rep_fails_conversion() {
        let upload = json!([
            {"dateRep": "01/01/2021", "cases": 1, "deaths": 0},
            {"cases": 4, "deaths": 1}
        ]);
        let err = CovidRecord::list_from_slice(upload.to_string().as_bytes()).unwrap_err();
        match err {
            ConvertError::MalformedRecord { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("dateRep"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_round_trip_preserves_date_and_counts() {
        let original = vec![
            CovidRecord::new("14/12/2020", 746, 6),
            CovidRecord::new("13/12/2020", 298, 9),
        ];
        let bundle = records_to_bundle(&original).unwrap();
        let restored = bundle_to_records(&bundle).unwrap();

        assert_eq!(restored.len(), original.len());
        for (before, after) in original.iter().zip(&restored) {
            assert_eq!(before.date_rep, after.date_rep);
            assert_eq!(before.cases, after.cases);
            assert_eq!(before.deaths, after.deaths);
        }
        assert_eq!(restored[0].day, json!("14"));
        assert_eq!(restored[0].month, json!("12"));
        assert_eq!(restored[0].year, json!("2020"));
    }

    #[test]
    fn test_round_trip_drops_demographics() {
        let mut full = CovidRecord::new("14/12/2020", 746, 6);
        full.countries_and_territories = json!("Afghanistan");
        full.geo_id = json!("AF");
        full.pop_data_2019 = json!(38041757);
        full.continent_exp = json!("Asia");
        full.cumulative_14_day_rate = json!("9.01377925");

        let restored = bundle_to_records(&records_to_bundle(&[full]).unwrap()).unwrap();
        let row = &restored[0];
        assert_eq!(row.countries_and_territories, json!("afghanistan"));
        assert_eq!(row.geo_id, json!("afghanistan"));
        assert_eq!(row.countryterritory_code, json!("afghanistan"));
        assert_eq!(row.pop_data_2019, json!(0));
        assert_eq!(row.continent_exp, json!(""));
        assert_eq!(row.cumulative_14_day_rate, json!(""));
    }

    #[test]
    fn test_reverse_bundle_without_entry_is_empty() {
        let bundle = bundle_from(json!({"resourceType": "Bundle", "type": "collection"}));
        assert!(bundle_to_records(&bundle).unwrap().is_empty());

        let bare = Bundle::from_slice(b"{}").unwrap();
        assert!(bundle_to_records(&bare).unwrap().is_empty());
    }

    #[test]
    fn test_reverse_reads_any_bundle_type_as_collection() {
        let bundle = bundle_from(json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 1,
            "entry": [{"fullUrl": "urn:uuid:1", "resource": {"effectiveDateTime": "2021-03-04"}}]
        }));
        assert_eq!(bundle.bundle_type, BundleType::Collection);
        assert_eq!(bundle_to_records(&bundle).unwrap().len(), 1);
    }

    #[test]
    fn test_reverse_derives_country_from_last_segment() {
        let bundle = bundle_from(json!({
            "entry": [{
                "resource": {
                    "resourceType": "Observation",
                    "subject": {"reference": "Group/eu/Patient/france"},
                    "effectiveDateTime": "2021-03-04"
                }
            }]
        }));
        let rows = bundle_to_records(&bundle).unwrap();

        assert_eq!(rows[0].countries_and_territories, json!("france"));
        assert_eq!(rows[0].geo_id, json!("france"));
        assert_eq!(rows[0].countryterritory_code, json!("france"));
        assert_eq!(rows[0].date_rep, "04/03/2021");
        // no components: counts default to zero
        assert_eq!(rows[0].cases, Number::from(0));
        assert_eq!(rows[0].deaths, Number::from(0));
    }

    #[test]
    fn test_reverse_first_matching_component_wins() {
        let component = |code: JsonValue, value: i64| {
            json!({"code": {"coding": code}, "valueQuantity": {"value": value}})
        };
        let bundle = bundle_from(json!({
            "entry": [{
                "resource": {
                    "resourceType": "Observation",
                    "effectiveDateTime": "2021-03-04",
                    "component": [
                        component(json!([{"code": "reported"}]), 7),
                        component(json!([{"code": "other"}, {"code": "confirmed"}]), 99),
                        component(json!([{"code": "confirmed"}]), 40),
                        component(json!([{"code": "confirmed"}]), 41),
                        component(json!([{"code": "reported"}]), 8)
                    ]
                }
            }]
        }));
        let rows = bundle_to_records(&bundle).unwrap();

        assert_eq!(rows[0].cases, Number::from(40));
        assert_eq!(rows[0].deaths, Number::from(7));
        assert_eq!(rows[0].countries_and_territories, json!(""));
    }

    #[test]
    fn test_reverse_keeps_decimal_quantities() {
        let bundle = bundle_from(json!({
            "entry": [{
                "resource": {
                    "resourceType": "Observation",
                    "effectiveDateTime": "2020-12-31",
                    "component": [
                        {"code": {"coding": [{"code": "confirmed"}]},
                         "valueQuantity": {"value": 100.0}},
                        {"code": {"coding": [{"code": "reported"}]},
                         "valueQuantity": {"value": 5.5}}
                    ]
                }
            }]
        }));
        let rows = bundle_to_records(&bundle).unwrap();
        let body = serde_json::to_value(&rows).unwrap();

        assert_eq!(body[0]["cases"], 100.0);
        assert_eq!(body[0]["deaths"], 5.5);
    }

    #[test]
    fn test_reverse_rejects_bad_effective_date() {
        let bundle = bundle_from(json!({
            "entry": [observation_at("2021-03-04"), observation_at("2021-03-04T10:00:00Z")]
        }));
        let err = bundle_to_records(&bundle).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn test_reverse_rejects_missing_resource_and_date() {
        let no_resource = Bundle::from_slice(br#"{"entry": [{}]}"#).unwrap();
        assert!(matches!(
            bundle_to_records(&no_resource).unwrap_err(),
            ConvertError::MalformedRecord { index: 0, .. }
        ));

        let no_date = bundle_from(json!({
            "entry": [{"resource": {"resourceType": "Observation"}}]
        }));
        let err = bundle_to_records(&no_date).unwrap_err();
        assert!(err.to_string().contains("effectiveDateTime"));
    }

    #[test]
    fn test_reverse_rejects_other_resource_types() {
        let bundle = bundle_from(json!({
            "entry": [{"resource": {"resourceType": "Patient", "effectiveDateTime": "2021-03-04"}}]
        }));
        assert!(bundle_to_records(&bundle).is_err());
    }

    #[test]
    fn test_document_shape_errors() {
        assert!(matches!(
            CovidRecord::list_from_slice(b"{}").unwrap_err(),
            ConvertError::UnexpectedShape(_)
        ));
        assert!(matches!(
            Bundle::from_slice(b"[]").unwrap_err(),
            ConvertError::UnexpectedShape(_)
        ));
        assert!(matches!(
            Bundle::from_slice(br#"{"entry": 3}"#).unwrap_err(),
            ConvertError::UnexpectedShape(_)
        ));
        assert!(matches!(
            Bundle::from_slice(b"not json").unwrap_err(),
            ConvertError::Json(_)
        ));
    }
}
