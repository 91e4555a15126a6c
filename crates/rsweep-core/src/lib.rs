#![deny(missing_docs)]
#![doc = "Core error, sanitization and provenance types shared by the rsweep launcher."]

pub mod errors;
pub mod provenance;
pub mod sanitize;

pub use errors::{ErrorInfo, LaunchError};
pub use provenance::{make_unique_timestamp, unique_timestamp_at, RunProvenance, SchemaVersion};
pub use sanitize::{is_sanitized, sanitize_all, sanitize_identifier, SanitizedPair};
