//! A scripted device that answers XML API requests from memory.
//!
//! Shared by the behavioural test binaries.

use std::cell::Cell;

use panpoll::device::{ApiRequest, DeviceSession, LICENSE_INFO_COMMAND, RESTART_COMMAND};
use panpoll::error::TransportError;

/// How the scripted device behaves.
#[derive(Clone, Debug)]
pub struct DeviceScript {
    /// Job queries that fail as unreachable before the device answers.
    pub unreachable_checks: u32,
    /// Answered job queries that report the job as pending. `None` never
    /// finishes.
    pub pending_checks: Option<u32>,
    /// The result reported once the job finishes.
    pub job_result: String,
    /// The job a commit enqueues; `None` means there is nothing to commit.
    pub commit_job: Option<u64>,
    /// Answer job queries with an empty listing.
    pub empty_queue: bool,
    /// Licensed features reported by license queries.
    pub licenses: Vec<String>,
    /// The restart request is answered instead of dropping the connection.
    pub restart_answered: bool,
}

impl Default for DeviceScript {
    fn default() -> Self {
        Self {
            unreachable_checks: 0,
            pending_checks: Some(0),
            job_result: String::from("OK"),
            commit_job: None,
            empty_queue: false,
            licenses: Vec::new(),
            restart_answered: false,
        }
    }
}

/// A device session driven by a [`DeviceScript`].
pub struct FakeDevice {
    script: DeviceScript,
    job_queries: Cell<u32>,
}

impl FakeDevice {
    pub const fn new(script: DeviceScript) -> Self {
        Self {
            script,
            job_queries: Cell::new(0),
        }
    }

    fn job_id(&self) -> u64 {
        self.script.commit_job.unwrap_or(1)
    }

    fn license_listing(&self) -> String {
        let entries: String = self
            .script
            .licenses
            .iter()
            .map(|feature| {
                format!("<entry><feature>{feature}</feature><expired>no</expired></entry>")
            })
            .collect();
        format!(
            r#"<response status="success"><result><licenses>{entries}</licenses></result></response>"#
        )
    }

    fn answer_job_query(&self) -> Result<String, TransportError> {
        let query = self.job_queries.get() + 1;
        self.job_queries.set(query);

        if query <= self.script.unreachable_checks {
            return Err(unreachable());
        }
        if self.script.empty_queue {
            return Ok(String::from(
                r#"<response status="success"><result/></response>"#,
            ));
        }

        let answered = query - self.script.unreachable_checks;
        let finished = self
            .script
            .pending_checks
            .is_some_and(|pending| answered > pending);
        let (status, result) = if finished {
            ("FIN", self.script.job_result.as_str())
        } else {
            ("ACT", "PEND")
        };
        Ok(format!(
            r#"<response status="success"><result><job><id>{}</id><type>Commit</type><status>{status}</status><result>{result}</result></job></result></response>"#,
            self.job_id()
        ))
    }
}

impl DeviceSession for FakeDevice {
    fn request(&self, request: &ApiRequest) -> Result<String, TransportError> {
        match request {
            ApiRequest::Commit { .. } => Ok(self.script.commit_job.map_or_else(
                || {
                    String::from(
                        r#"<response status="success" code="19"><msg>There are no changes to commit.</msg></response>"#,
                    )
                },
                |job_id| {
                    format!(
                        r#"<response status="success" code="19"><result><msg><line>Commit job enqueued with jobid {job_id}</line></msg><job>{job_id}</job></result></response>"#
                    )
                },
            )),
            ApiRequest::Op { cmd } if cmd == RESTART_COMMAND => {
                if self.script.restart_answered {
                    Ok(String::from(
                        r#"<response status="success"><result>Command succeeded with no output</result></response>"#,
                    ))
                } else {
                    Err(unreachable())
                }
            }
            ApiRequest::Op { cmd } if cmd == LICENSE_INFO_COMMAND => Ok(self.license_listing()),
            ApiRequest::Op { .. } => self.answer_job_query(),
            ApiRequest::Keygen { .. } => Err(TransportError::MalformedResponse {
                message: String::from("keygen is not scripted"),
            }),
        }
    }
}

fn unreachable() -> TransportError {
    TransportError::Unreachable {
        host: String::from("fw01"),
        message: String::from("connection refused"),
    }
}
