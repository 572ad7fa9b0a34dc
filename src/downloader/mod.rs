pub mod pending;
pub mod status;
pub mod store;

pub use pending::PendingMarkers;
pub use status::{DerivedDownloadState, DisplayStatus, StatusStyle};
pub use store::{DEFAULT_POLL_INTERVAL, JobStore, JobsApi, JobsSnapshot};
