//! # Printer and Job Records
//!
//! Public views over the raw backend payloads. Both are built fresh per
//! query; nothing here is cached or mutated after construction.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::spooler::{RawJob, RawPrinter};
use crate::status::{JobStatus, normalize_status, parse_vendor_time};
use crate::token;

/// One installed printer with its minted identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Printer {
    /// Opaque reversible token naming this printer.
    pub id: String,
    pub name: String,
    pub driver_name: Option<String>,
    pub job_count: Option<u32>,
    pub print_processor: Option<String>,
    pub port_name: Option<String>,
    pub share_name: Option<String>,
    pub computer_name: Option<String>,
    pub printer_status: Option<i64>,
    pub shared: Option<bool>,
    #[serde(rename = "type")]
    pub printer_type: Option<i64>,
    pub priority: Option<i64>,
}

impl Printer {
    /// Build a printer record from a raw backend payload, minting its token.
    pub fn from_raw(raw: RawPrinter) -> Self {
        Self {
            id: token::encode_printer(&raw.name),
            name: raw.name,
            driver_name: raw.driver_name,
            job_count: raw.job_count,
            print_processor: raw.print_processor,
            port_name: raw.port_name,
            share_name: raw.share_name,
            computer_name: raw.computer_name,
            printer_status: raw.printer_status,
            shared: raw.shared,
            printer_type: raw.printer_type,
            priority: raw.priority,
        }
    }
}

/// One queued job with normalized status and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque reversible token naming the (printer, job) pair.
    pub id: String,
    /// Backend job id within its printer's queue.
    pub job_id: String,
    pub job_status: JobStatus,
    pub computer_name: Option<String>,
    pub data_type: Option<String>,
    pub document_name: Option<String>,
    pub job_time: Option<i64>,
    pub pages_printed: Option<i64>,
    pub position: Option<i64>,
    pub printer_name: String,
    pub priority: Option<i64>,
    pub size: Option<i64>,
    /// Submission time in epoch milliseconds, when the backend reported one.
    pub submitted_time: Option<i64>,
    pub total_pages: Option<i64>,
    pub username: Option<String>,
}

impl Job {
    /// Build a job record from a raw backend payload.
    ///
    /// `printer_name` is the queue the job was listed from; it wins over
    /// the payload's own field only when the payload omits one.
    pub fn from_raw(printer_name: &str, raw: RawJob) -> Self {
        let job_id = raw.id.unwrap_or_default();
        Self {
            id: token::encode_job(printer_name, &job_id),
            job_id,
            job_status: normalize_status(raw.job_status),
            computer_name: raw.computer_name,
            data_type: raw.data_type,
            document_name: raw.document_name,
            job_time: raw.job_time,
            pages_printed: raw.pages_printed,
            position: raw.position,
            printer_name: raw
                .printer_name
                .unwrap_or_else(|| printer_name.to_string()),
            priority: raw.priority,
            size: raw.size,
            submitted_time: parse_vendor_time(raw.submitted_time.as_deref()),
            total_pages: raw.total_pages,
            username: raw.user_name,
        }
    }

    /// Submission time as a UTC datetime, when one was reported.
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_time
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }
}
