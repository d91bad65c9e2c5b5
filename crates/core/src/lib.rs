//! covid-fhir-core: COVID-19 daily report types and FHIR mapping
//!
//! This crate provides the flat `CovidRecord`, the typed FHIR Bundle and
//! Observation structures, the two mappers between them, and the
//! OperationOutcome used in error responses.

pub mod bundle;
pub mod convert;
pub mod error;
pub mod observation;
pub mod outcome;
pub mod record;

pub use bundle::{Bundle, BundleEntry, BundleType};
pub use convert::{bundle_to_records, records_to_bundle};
pub use error::ConvertError;
pub use observation::{
    CodeableConcept, Coding, Meta, Observation, ObservationComponent, Quantity, Reference,
};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use record::CovidRecord;
