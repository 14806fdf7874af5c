#![deny(missing_docs)]
#![doc = "Core error, provenance, and canonical serialization types for the gcb benchmark harness."]

pub mod canonical;
pub mod errors;
pub mod hash;
pub mod provenance;

pub use canonical::{from_json_slice, from_yaml_slice, to_canonical_json_bytes};
pub use errors::{ErrorInfo, HarnessError};
pub use hash::stable_hash_string;
pub use provenance::{RunProvenance, SchemaVersion};
