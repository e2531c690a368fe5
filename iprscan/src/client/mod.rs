//! Remote job service client.
//!
//! [`JobApi`] is the seam between the scheduler and the wire. The
//! production [`EbiClient`] talks to the EBI job dispatcher over REST;
//! tests script the trait directly.

mod api;
mod rest;
mod status;

pub use api::{ClientError, JobApi, JobId};
pub use rest::{EbiClient, DEFAULT_BASE_URL, RESULT_FORMAT_XML};
pub use status::RemoteStatus;
