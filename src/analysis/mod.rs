//! Contract analysis core: merge/dedup, lifecycle classification,
//! alert generation, and KPI aggregation.

pub mod alerts;
pub mod dedup;
pub mod kpis;
pub mod lifecycle;

pub use alerts::{generate_alerts, sort_alerts_by_severity};
pub use dedup::merge;
pub use kpis::compute_kpis;
