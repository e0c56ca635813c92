//! # Print Manager
//!
//! The public operation surface: printer/job listings, document printing,
//! and job-control verbs, all speaking tokens at the boundary.
//!
//! Control verbs fan out when no token is given: every job of every
//! printer is attempted sequentially, printer-then-job order, and each
//! item's outcome is recorded, so one bad job does not stop the sweep. An
//! optional wall-clock timeout bounds the whole batch, since there is no
//! other way to abandon a long fan-out once it starts.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::document::{
    ComposeOutcome, ContentBlock, ImageFetcher, PreviewSurface, compose::compose,
};
use crate::error::ImprentaError;
use crate::jobs::{Job, Printer};
use crate::settings::{PrintSettings, PrintSettingsOverrides};
use crate::spooler::{ControlVerb, PrintBackend};
use crate::token;

/// Options accompanying a print request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Target printer token. Decoded to the printer name.
    pub id: Option<String>,
    /// Target printer by verbatim name; wins over `id` when both are set.
    pub name: Option<String>,
    /// Open the interactive preview instead of spooling.
    pub preview: bool,
    /// Sparse settings merged over the defaults.
    pub print_setting: PrintSettingsOverrides,
    /// Delete the spool file after printing. Defaults to true.
    pub remove_temp: Option<bool>,
}

/// Uniform result of a print request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOutcome {
    pub success: bool,
    pub message: String,
}

/// Outcome of one (printer, job) control attempt within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobControlItem {
    pub printer_name: String,
    pub job_id: String,
    pub success: bool,
    pub message: String,
}

/// Aggregate result of a control verb.
///
/// `success` is true only when every attempted item succeeded. For
/// single-token calls `items` holds exactly one entry; for batch calls,
/// one entry per (printer, job) pair attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlOutcome {
    pub success: bool,
    pub message: String,
    pub items: Vec<JobControlItem>,
}

impl ControlOutcome {
    fn ok(items: Vec<JobControlItem>) -> Self {
        Self {
            success: true,
            message: "OK".into(),
            items,
        }
    }

    fn failure(verb: ControlVerb, err: &ImprentaError) -> Self {
        let text = err.to_string();
        Self {
            success: false,
            message: if text.is_empty() {
                verb.fallback_message().into()
            } else {
                text
            },
            items: Vec::new(),
        }
    }
}

/// Printer and job lifecycle front end over an opaque backend.
///
/// Holds no mutable state: every call works on a freshly fetched snapshot,
/// so instances are cheap to share and calls never interfere. No
/// consistency is guaranteed between listing jobs and later acting on
/// them.
pub struct PrintManager {
    backend: Arc<dyn PrintBackend>,
    fetcher: Arc<dyn ImageFetcher>,
    previewer: Option<Arc<dyn PreviewSurface>>,
    batch_timeout: Option<Duration>,
}

impl PrintManager {
    /// Create a manager over a backend and an image fetcher.
    pub fn new(backend: Arc<dyn PrintBackend>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            backend,
            fetcher,
            previewer: None,
            batch_timeout: None,
        }
    }

    /// Attach an interactive preview surface for `preview: true` requests.
    pub fn with_previewer(mut self, previewer: Arc<dyn PreviewSurface>) -> Self {
        self.previewer = Some(previewer);
        self
    }

    /// Bound batch fan-out operations by a wall-clock timeout.
    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }

    // -- Listings -----------------------------------------------------------

    /// List installed printers, or the one printer a token names.
    pub async fn printers(&self, token: Option<&str>) -> Result<Vec<Printer>, ImprentaError> {
        match token {
            Some(token) => {
                let name = token::decode_printer(token)?;
                let found = self.backend.printer_by_name(&name).await?;
                Ok(found.map(Printer::from_raw).into_iter().collect())
            }
            None => Ok(self
                .backend
                .list_printers()
                .await?
                .into_iter()
                .map(Printer::from_raw)
                .collect()),
        }
    }

    /// List queued jobs across all printers, or one printer's queue.
    ///
    /// Printers are enumerated first and walked sequentially; job order
    /// within the result follows printer order, then queue order.
    pub async fn jobs(&self, printer_token: Option<&str>) -> Result<Vec<Job>, ImprentaError> {
        let printers = self.printers(None).await?;
        let mut all_jobs = Vec::new();
        match printer_token {
            Some(token) => {
                let Some(printer) = printers.iter().find(|p| p.id == token) else {
                    return Ok(all_jobs);
                };
                all_jobs.extend(self.fetch_jobs(&printer.name).await?);
            }
            None => {
                for printer in &printers {
                    all_jobs.extend(self.fetch_jobs(&printer.name).await?);
                }
            }
        }
        Ok(all_jobs)
    }

    /// Fetch one job by its token. `Ok(None)` when the backend no longer
    /// knows the job; `Err` when the token itself is malformed.
    pub async fn job(&self, job_token: &str) -> Result<Option<Job>, ImprentaError> {
        let (printer_name, job_id) = token::decode_job(job_token)?;
        let found = self.backend.job_by_id(&printer_name, &job_id).await?;
        Ok(found.map(|raw| Job::from_raw(&printer_name, raw)))
    }

    async fn fetch_jobs(&self, printer_name: &str) -> Result<Vec<Job>, ImprentaError> {
        Ok(self
            .backend
            .list_jobs(printer_name)
            .await?
            .into_vec()
            .into_iter()
            .map(|raw| Job::from_raw(printer_name, raw))
            .collect())
    }

    // -- Printing -----------------------------------------------------------

    /// Compose the block list and hand it to the spooler.
    ///
    /// Never panics or leaks an error: every failure mode (fetch, codec,
    /// layout, token, backend) is normalized into the returned outcome.
    #[instrument(skip_all, fields(blocks = blocks.len()))]
    pub async fn print(&self, blocks: &[ContentBlock], options: &PrintOptions) -> PrintOutcome {
        match self.try_print(blocks, options).await {
            Ok(message) => PrintOutcome {
                success: true,
                message,
            },
            Err(err) => {
                warn!(error = %err, "print request failed");
                PrintOutcome {
                    success: false,
                    message: err.to_string(),
                }
            }
        }
    }

    async fn try_print(
        &self,
        blocks: &[ContentBlock],
        options: &PrintOptions,
    ) -> Result<String, ImprentaError> {
        let settings = PrintSettings::resolve(&options.print_setting);

        let outcome = compose(
            blocks,
            options.preview,
            self.fetcher.as_ref(),
            self.previewer.as_deref(),
        )
        .await?;

        let composition = match outcome {
            ComposeOutcome::Preview => return Ok("OK".into()),
            ComposeOutcome::Document(composition) => composition,
        };

        let mut printer_name = String::new();
        if let Some(id) = &options.id {
            printer_name = token::decode_printer(id)?;
        }
        if let Some(name) = &options.name {
            printer_name = name.clone();
        }

        let filename = format!("{}.pdf", Uuid::new_v4().simple());
        let payload = STANDARD.encode(&composition.pdf);
        let path = self.backend.create_temp_file(&payload, &filename).await?;
        if path.is_empty() {
            return Err(ImprentaError::EmptyTempFile);
        }

        debug!(
            printer = %printer_name,
            path = %path,
            page_width = composition.page_width,
            page_height = composition.page_height,
            "spooling composed document"
        );
        self.backend
            .spool_pdf(
                &printer_name,
                &path,
                &settings.spool_arguments(),
                options.remove_temp.unwrap_or(true),
            )
            .await?;

        Ok("OK".into())
    }

    // -- Job control --------------------------------------------------------

    /// Restart one job, or every job of every printer.
    pub async fn restart_job(&self, job_token: Option<&str>) -> ControlOutcome {
        self.control(ControlVerb::Restart, job_token).await
    }

    /// Resume one job, or every job of every printer.
    pub async fn resume_job(&self, job_token: Option<&str>) -> ControlOutcome {
        self.control(ControlVerb::Resume, job_token).await
    }

    /// Pause one job, or every job of every printer.
    pub async fn pause_job(&self, job_token: Option<&str>) -> ControlOutcome {
        self.control(ControlVerb::Pause, job_token).await
    }

    /// Remove one job, or every job of every printer.
    pub async fn remove_job(&self, job_token: Option<&str>) -> ControlOutcome {
        self.control(ControlVerb::Remove, job_token).await
    }

    #[instrument(skip(self), fields(verb = %verb))]
    async fn control(&self, verb: ControlVerb, job_token: Option<&str>) -> ControlOutcome {
        match self.try_control(verb, job_token).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "control operation failed");
                ControlOutcome::failure(verb, &err)
            }
        }
    }

    async fn try_control(
        &self,
        verb: ControlVerb,
        job_token: Option<&str>,
    ) -> Result<ControlOutcome, ImprentaError> {
        if let Some(job_token) = job_token {
            // Fail fast on a malformed token before touching the backend.
            let (printer_name, job_id) = token::decode_job(job_token)?;
            self.backend
                .control_job(verb, &printer_name, &job_id)
                .await?;
            return Ok(ControlOutcome::ok(vec![JobControlItem {
                printer_name,
                job_id,
                success: true,
                message: "OK".into(),
            }]));
        }

        match self.batch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fan_out(verb))
                .await
                .map_err(|_| {
                    ImprentaError::ExternalCall(format!(
                        "{verb} batch timed out after {}s",
                        limit.as_secs()
                    ))
                })?,
            None => self.fan_out(verb).await,
        }
    }

    /// Apply `verb` to every job of every printer, sequentially.
    ///
    /// Enumeration failures abort the batch; control failures do not:
    /// each one is recorded and the sweep continues.
    async fn fan_out(&self, verb: ControlVerb) -> Result<ControlOutcome, ImprentaError> {
        let printers = self.backend.list_printers().await?;
        let mut items = Vec::new();

        for printer in &printers {
            let jobs = self.backend.list_jobs(&printer.name).await?.into_vec();
            for job in jobs {
                let Some(job_id) = job.id.filter(|id| !id.is_empty()) else {
                    items.push(JobControlItem {
                        printer_name: printer.name.clone(),
                        job_id: String::new(),
                        success: false,
                        message: "job has no id".into(),
                    });
                    continue;
                };
                let result = self.backend.control_job(verb, &printer.name, &job_id).await;
                items.push(JobControlItem {
                    printer_name: printer.name.clone(),
                    job_id,
                    success: result.is_ok(),
                    message: match result {
                        Ok(()) => "OK".into(),
                        Err(err) => err.to_string(),
                    },
                });
            }
        }

        let failed = items.iter().filter(|item| !item.success).count();
        debug!(attempted = items.len(), failed, "fan-out finished");
        if failed == 0 {
            Ok(ControlOutcome::ok(items))
        } else {
            Ok(ControlOutcome {
                success: false,
                message: format!("{failed} of {} jobs failed", items.len()),
                items,
            })
        }
    }
}
