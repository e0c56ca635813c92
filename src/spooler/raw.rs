//! Raw backend payloads.
//!
//! The native backend reports printers and jobs as JSON projections of the
//! platform spooler objects. Field names arrive in the vendor's PascalCase;
//! snake_case aliases are accepted too so platform shims that pre-normalize
//! keys keep working.

use serde::{Deserialize, Deserializer};

/// Accept a JSON number or string as an optional string value.
///
/// Job ids in particular arrive as numbers from one platform and strings
/// from another.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Number(i64),
        Text(String),
    }

    let opt: Option<Value> = Option::deserialize(deserializer)?;
    Ok(opt.map(|v| match v {
        Value::Number(n) => n.to_string(),
        Value::Text(s) => s,
    }))
}

/// One installed printer, as the backend reports it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPrinter {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "DriverName")]
    pub driver_name: Option<String>,
    #[serde(alias = "JobCount")]
    pub job_count: Option<u32>,
    #[serde(alias = "PrintProcessor")]
    pub print_processor: Option<String>,
    #[serde(alias = "PortName")]
    pub port_name: Option<String>,
    #[serde(alias = "ShareName")]
    pub share_name: Option<String>,
    #[serde(alias = "ComputerName")]
    pub computer_name: Option<String>,
    #[serde(alias = "PrinterStatus")]
    pub printer_status: Option<i64>,
    #[serde(alias = "Shared")]
    pub shared: Option<bool>,
    #[serde(alias = "Type", rename = "type")]
    pub printer_type: Option<i64>,
    #[serde(alias = "Priority")]
    pub priority: Option<i64>,
}

/// One queued job, as the backend reports it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawJob {
    #[serde(alias = "Id", deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(alias = "JobStatus")]
    pub job_status: Option<i64>,
    #[serde(alias = "ComputerName")]
    pub computer_name: Option<String>,
    #[serde(alias = "Datatype")]
    pub data_type: Option<String>,
    #[serde(alias = "DocumentName")]
    pub document_name: Option<String>,
    #[serde(alias = "JobTime")]
    pub job_time: Option<i64>,
    #[serde(alias = "PagesPrinted")]
    pub pages_printed: Option<i64>,
    #[serde(alias = "Position")]
    pub position: Option<i64>,
    #[serde(alias = "PrinterName")]
    pub printer_name: Option<String>,
    #[serde(alias = "Priority")]
    pub priority: Option<i64>,
    #[serde(alias = "Size")]
    pub size: Option<i64>,
    /// Vendor date wrapper, e.g. `"/Date(1700000000000)/"`.
    #[serde(alias = "SubmittedTime")]
    pub submitted_time: Option<String>,
    #[serde(alias = "TotalPages")]
    pub total_pages: Option<i64>,
    #[serde(alias = "UserName", alias = "user")]
    pub user_name: Option<String>,
}

/// Job listing payload: an array, or a bare object when exactly one job is
/// queued.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobListing {
    Many(Vec<RawJob>),
    One(RawJob),
}

impl JobListing {
    /// An empty listing.
    pub fn empty() -> Self {
        JobListing::Many(Vec::new())
    }

    /// Normalize to a vector, whatever shape the backend produced.
    pub fn into_vec(self) -> Vec<RawJob> {
        match self {
            JobListing::Many(jobs) => jobs,
            JobListing::One(job) => vec![job],
        }
    }
}

impl Default for JobListing {
    fn default() -> Self {
        Self::empty()
    }
}
