use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ConvertError;
use crate::observation::Observation;

/// FHIR Bundle types (only collections are produced)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    #[default]
    Collection,
}

/// FHIR Bundle resource (simplified to Observation entries)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Create a collection bundle wrapping the given entries in order
    pub fn collection(entries: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type: BundleType::Collection,
            entry: entries,
        }
    }

    /// Parse an uploaded bundle document.
    ///
    /// Anything shaped like a JSON object is accepted and read as a
    /// collection; only `entry` is consulted, and a missing `entry` is
    /// treated as empty. Entries are decoded one by one so that a bad entry
    /// is reported with its position.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConvertError> {
        let document: JsonValue = serde_json::from_slice(bytes)?;
        let JsonValue::Object(mut object) = document else {
            return Err(ConvertError::UnexpectedShape(
                "expected a Bundle object".to_string(),
            ));
        };

        let entries = match object.remove("entry") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    serde_json::from_value::<BundleEntry>(item)
                        .map_err(|e| ConvertError::malformed(index, e))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ConvertError::UnexpectedShape(
                    "Bundle.entry must be an array".to_string(),
                ));
            }
        };

        Ok(Self::collection(entries))
    }
}

/// A single entry in a Bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Observation>,
}

impl BundleEntry {
    pub fn new(resource: Observation) -> Self {
        Self {
            resource: Some(resource),
        }
    }
}
