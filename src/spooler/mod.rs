//! # Spooler Backend
//!
//! The seam to the native printer enumeration and job-control backend.
//!
//! Everything behind [`PrintBackend`] is one opaque remote call per method:
//! printer listing, job listing, job control verbs, spool-file creation and
//! PDF spooling. The library never talks to a driver or spooler protocol
//! itself; it only shapes requests and decodes the raw payloads defined in
//! [`raw`].

pub mod raw;

pub use raw::{JobListing, RawJob, RawPrinter};

use async_trait::async_trait;

use crate::error::ImprentaError;

/// Job-control verbs the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlVerb {
    Restart,
    Resume,
    Pause,
    Remove,
}

impl ControlVerb {
    /// Wire name of the verb.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlVerb::Restart => "restart",
            ControlVerb::Resume => "resume",
            ControlVerb::Pause => "pause",
            ControlVerb::Remove => "remove",
        }
    }

    /// Verb-specific fallback message for errors without text of their own.
    pub fn fallback_message(self) -> &'static str {
        match self {
            ControlVerb::Restart => "Fail to restart job",
            ControlVerb::Resume => "Fail to resume job",
            ControlVerb::Pause => "Fail to pause job",
            ControlVerb::Remove => "Fail to remove job",
        }
    }
}

impl std::fmt::Display for ControlVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native printing backend, one round trip per method.
///
/// Implementations translate these calls into whatever the platform offers
/// (a spooler cmdlet, a privileged helper process, a test double). Failures
/// surface as [`ImprentaError::ExternalCall`].
#[async_trait]
pub trait PrintBackend: Send + Sync {
    /// Enumerate all installed printers.
    async fn list_printers(&self) -> Result<Vec<RawPrinter>, ImprentaError>;

    /// Look up a single printer by its exact name.
    async fn printer_by_name(&self, name: &str) -> Result<Option<RawPrinter>, ImprentaError>;

    /// List the queued jobs of one printer.
    ///
    /// Vendors report a bare object when exactly one job is queued; the
    /// [`JobListing`] wrapper absorbs that quirk.
    async fn list_jobs(&self, printer_name: &str) -> Result<JobListing, ImprentaError>;

    /// Fetch one job of one printer.
    async fn job_by_id(
        &self,
        printer_name: &str,
        job_id: &str,
    ) -> Result<Option<RawJob>, ImprentaError>;

    /// Apply a control verb to one job of one printer.
    async fn control_job(
        &self,
        verb: ControlVerb,
        printer_name: &str,
        job_id: &str,
    ) -> Result<(), ImprentaError>;

    /// Write base64 payload bytes to a spool file, returning its path.
    ///
    /// An empty returned path means the file was not created; callers treat
    /// that as [`ImprentaError::EmptyTempFile`].
    async fn create_temp_file(
        &self,
        base64_data: &str,
        filename: &str,
    ) -> Result<String, ImprentaError>;

    /// Hand a finished PDF to the native spooler.
    ///
    /// `printer_setting` is the fixed argument string produced by
    /// [`crate::settings::PrintSettings::spool_arguments`].
    async fn spool_pdf(
        &self,
        id: &str,
        path: &str,
        printer_setting: &str,
        remove_after_print: bool,
    ) -> Result<(), ImprentaError>;
}
