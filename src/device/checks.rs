//! Readiness checks backed by the device job queue and license store.

use super::{ApiRequest, DeviceSession, LICENSE_INFO_COMMAND, response};
use crate::error::TransportError;
use crate::poller::ReadinessCheck;
use crate::status::StatusRecord;

/// Lists device jobs and reports one status record per job.
///
/// With [`JobsCheck::all`] the device is ready once every job in its queue
/// has finished; with [`JobsCheck::id`] once that single job has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsCheck {
    cmd: String,
}

impl JobsCheck {
    /// Check every job on the device.
    #[must_use]
    pub fn all() -> Self {
        Self {
            cmd: String::from("<show><jobs><all/></jobs></show>"),
        }
    }

    /// Check a single job by id.
    #[must_use]
    pub fn id(job_id: u64) -> Self {
        Self {
            cmd: format!("<show><jobs><id>{job_id}</id></jobs></show>"),
        }
    }

    /// The operational command this check sends.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.cmd
    }
}

impl<S: DeviceSession + ?Sized> ReadinessCheck<S> for JobsCheck {
    fn check(&self, session: &S) -> Result<Vec<StatusRecord>, TransportError> {
        let body = session.request(&ApiRequest::op(self.cmd.as_str()))?;
        response::job_records(&body)
    }
}

/// Reports one status record per installed license.
///
/// The device is ready once it reports at least one license and none of them
/// has expired, e.g. after licenses were fetched from the update server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LicenseCheck;

impl<S: DeviceSession + ?Sized> ReadinessCheck<S> for LicenseCheck {
    fn check(&self, session: &S) -> Result<Vec<StatusRecord>, TransportError> {
        let body = session.request(&ApiRequest::op(LICENSE_INFO_COMMAND))?;
        response::license_records(&body)
    }
}
