//! Decoding of XML API `<response>` envelopes.
//!
//! Every response is checked in two passes: the envelope attributes first,
//! so error responses surface as `TransportError::Api` whatever their body
//! looks like, then the typed `<result>` payload.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::status::{Completion, JobResult, StatusRecord};

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "@status")]
    status: String,
    #[serde(rename = "@code", default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<R> {
    result: Option<R>,
}

#[derive(Debug, Default, Deserialize)]
struct JobList {
    #[serde(default)]
    job: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    progress: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CommitResult {
    #[serde(default)]
    job: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LicenseInfo {
    #[serde(default)]
    licenses: Option<LicenseList>,
}

#[derive(Debug, Default, Deserialize)]
struct LicenseList {
    #[serde(default)]
    entry: Vec<LicenseEntry>,
}

#[derive(Debug, Deserialize)]
struct LicenseEntry {
    #[serde(default)]
    feature: Option<String>,
    #[serde(default)]
    expired: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeygenResult {
    key: String,
}

fn malformed(message: impl Into<String>) -> TransportError {
    TransportError::MalformedResponse {
        message: message.into(),
    }
}

/// Trimmed text of an optional element, with empty text treated as absent.
fn text(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|trimmed| !trimmed.is_empty())
}

/// Check that a response reports success.
///
/// # Errors
///
/// Returns `TransportError::Api` for a non-success envelope and
/// `TransportError::MalformedResponse` if the body is not a `<response>`.
pub fn expect_success(body: &str) -> Result<(), TransportError> {
    let header: Header = quick_xml::de::from_str(body)
        .map_err(|error| malformed(format!("invalid response envelope: {error}")))?;
    if header.status == SUCCESS {
        Ok(())
    } else {
        Err(TransportError::Api {
            status: header.status,
            code: header.code.unwrap_or_else(|| String::from("none")),
        })
    }
}

fn decode_result<R: DeserializeOwned>(body: &str) -> Result<Option<R>, TransportError> {
    expect_success(body)?;
    let envelope: Envelope<R> = quick_xml::de::from_str(body)
        .map_err(|error| malformed(format!("invalid response result: {error}")))?;
    Ok(envelope.result)
}

fn job_record(entry: &JobEntry) -> Result<StatusRecord, TransportError> {
    let status = text(entry.status.as_ref())
        .ok_or_else(|| malformed("job entry is missing its status"))?;
    let job_id = text(entry.id.as_ref())
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| malformed(format!("job id '{raw}' is not a number")))
        })
        .transpose()?;

    Ok(StatusRecord {
        completion: Completion::from_job_status(status)?,
        job_id,
        kind: text(entry.kind.as_ref()).map(str::to_owned),
        result: text(entry.result.as_ref()).map(JobResult::parse),
        progress: text(entry.progress.as_ref()).and_then(|raw| raw.parse::<u8>().ok()),
    })
}

/// Decode a `show jobs` response into status records.
///
/// A response with no `<job>` entries yields an empty list.
///
/// # Errors
///
/// Returns a [`TransportError`] for error envelopes, undecodable XML, or a
/// job entry without a status.
pub fn job_records(body: &str) -> Result<Vec<StatusRecord>, TransportError> {
    let jobs: JobList = decode_result(body)?.unwrap_or_default();
    jobs.job.iter().map(job_record).collect()
}

fn license_record(entry: &LicenseEntry) -> Result<StatusRecord, TransportError> {
    let expired = text(entry.expired.as_ref())
        .ok_or_else(|| malformed("license entry is missing its expiry flag"))?;
    Ok(StatusRecord {
        kind: text(entry.feature.as_ref()).map(str::to_owned),
        ..StatusRecord::new(Completion::from_license_expired(expired)?)
    })
}

/// Decode a `request license info` response into one record per license.
///
/// Unexpired licenses are complete. A device without licenses yields an
/// empty list.
///
/// # Errors
///
/// Returns a [`TransportError`] for error envelopes, undecodable XML, or an
/// entry without a valid expiry flag.
pub fn license_records(body: &str) -> Result<Vec<StatusRecord>, TransportError> {
    let info: LicenseInfo = decode_result(body)?.unwrap_or_default();
    info.licenses
        .unwrap_or_default()
        .entry
        .iter()
        .map(license_record)
        .collect()
}

/// Decode a commit response into the enqueued job id.
///
/// Returns `None` when the device had nothing to commit.
///
/// # Errors
///
/// Returns a [`TransportError`] for error envelopes, undecodable XML, or a
/// non-numeric job id.
pub fn commit_job_id(body: &str) -> Result<Option<u64>, TransportError> {
    let commit: CommitResult = decode_result(body)?.unwrap_or_default();
    text(commit.job.as_ref())
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| malformed(format!("commit job id '{raw}' is not a number")))
        })
        .transpose()
}

/// Decode a keygen response into the API key.
///
/// # Errors
///
/// Returns a [`TransportError`] for error envelopes or a response without a key.
pub fn api_key(body: &str) -> Result<String, TransportError> {
    let keygen: Option<KeygenResult> = decode_result(body)?;
    keygen
        .and_then(|result| text(Some(&result.key)).map(str::to_owned))
        .ok_or_else(|| malformed("keygen response did not include a key"))
}
