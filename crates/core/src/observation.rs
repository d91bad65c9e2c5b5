//! Typed FHIR Observation used for the WHO COVID-19 daily case report

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Canonical URLs and codes stamped on every generated Observation
pub mod codes {
    /// WHO daily case report profile
    pub const CASE_DAILY_PROFILE: &str =
        "http://hl7.org/fhir/StructureDefinition/who-covid19-case-daily";

    /// Subject every generated Observation is attached to
    pub const SUBJECT_REFERENCE: &str = "Patient/afghanistan";

    pub const CASES_SYSTEM: &str =
        "http://terminology.hl7.org/CodeSystem/who-covid19-case-reported-type";
    pub const CASES_CODE: &str = "confirmed";

    pub const DEATHS_SYSTEM: &str =
        "http://terminology.hl7.org/CodeSystem/who-case-reported-deaths";
    pub const DEATHS_CODE: &str = "reported";

    /// UCUM, with the dimensionless unit "1"
    pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";
    pub const UCUM_COUNT: &str = "1";
}

/// FHIR Observation resource (the subset the daily report uses)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default = "observation_resource_type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component: Vec<ObservationComponent>,
}

fn observation_resource_type() -> String {
    "Observation".to_string()
}

impl Observation {
    /// Build a daily report Observation with a cases and a deaths component
    pub fn daily_report(
        id: String,
        effective_date: String,
        cases: Number,
        deaths: Number,
    ) -> Self {
        Self {
            resource_type: observation_resource_type(),
            id: Some(id),
            meta: Some(Meta {
                profile: vec![codes::CASE_DAILY_PROFILE.to_string()],
            }),
            subject: Some(Reference {
                reference: Some(codes::SUBJECT_REFERENCE.to_string()),
            }),
            effective_date_time: Some(effective_date),
            component: vec![
                ObservationComponent::count(codes::CASES_SYSTEM, codes::CASES_CODE, cases),
                ObservationComponent::count(codes::DEATHS_SYSTEM, codes::DEATHS_CODE, deaths),
            ],
        }
    }

    /// First component whose first coding carries `code`
    pub fn component_with_code(&self, code: &str) -> Option<&ObservationComponent> {
        self.component
            .iter()
            .find(|c| c.code.first_code() == Some(code))
    }

    /// Last `/`-separated segment of the subject reference, or "" without one
    pub fn subject_id(&self) -> &str {
        self.subject
            .as_ref()
            .and_then(|s| s.reference.as_deref())
            .and_then(|r| r.rsplit('/').next())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    #[serde(default)]
    pub profile: Vec<String>,
}

/// FHIR Reference (literal reference only)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Observation.component
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservationComponent {
    #[serde(default)]
    pub code: CodeableConcept,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
}

impl ObservationComponent {
    /// Component counting something in dimensionless UCUM units
    pub fn count(system: &str, code: &str, value: Number) -> Self {
        Self {
            code: CodeableConcept {
                coding: vec![Coding {
                    system: Some(system.to_string()),
                    code: Some(code.to_string()),
                }],
            },
            value_quantity: Some(Quantity {
                value: Some(value),
                unit: Some(codes::UCUM_COUNT.to_string()),
                system: Some(codes::UCUM_SYSTEM.to_string()),
                code: Some(codes::UCUM_COUNT.to_string()),
            }),
        }
    }

    /// Quantity value, if the component carries one
    pub fn value(&self) -> Option<&Number> {
        self.value_quantity.as_ref().and_then(|q| q.value.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,
}

impl CodeableConcept {
    /// Only the first coding is consulted when matching components
    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
