//! Data-source layer: raw record shapes, local-file loading, and
//! HTTP fetching from the two SECOP endpoints.

pub mod fetch;
pub mod loader;
pub mod records;

pub use fetch::{FetchOptions, SourceClient, SourceError};
pub use records::{ProcurementProcess, SignedContract};
