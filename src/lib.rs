//! # Imprenta - Print Composition & Job Control Library
//!
//! Imprenta turns a structured, multi-block print request (text, images,
//! tables, QR and bar codes) into a single paginated PDF, and manages the
//! lifecycle of submitted printer jobs against the installed printers. It
//! provides:
//!
//! - **Document composition**: ordered blocks → owned layout tree → 5×
//!   raster → single-page PDF
//! - **Identity tokens**: reversible opaque ids for printers and
//!   (printer, job) pairs
//! - **Status normalization**: vendor status codes → a stable vocabulary
//! - **Job control**: pause/resume/restart/remove, one job or a full
//!   fan-out with per-item results
//!
//! The native spooler, the image network, and the interactive preview are
//! collaborator traits ([`spooler::PrintBackend`],
//! [`document::ImageFetcher`], [`document::PreviewSurface`]); the library
//! itself never talks to a driver.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use imprenta::{PrintManager, PrintOptions};
//! use imprenta::document::{ContentBlock, HttpImageFetcher};
//! # use imprenta::spooler::PrintBackend;
//!
//! # async fn demo(backend: Arc<dyn PrintBackend>) -> Result<(), imprenta::ImprentaError> {
//! let manager = PrintManager::new(backend, Arc::new(HttpImageFetcher::new()?));
//!
//! // Compose and spool a receipt
//! let blocks: Vec<ContentBlock> = serde_json::from_str(
//!     r##"[{"type":"text","value":"# Hello"},
//!         {"type":"barCode","value":"ORDER-0001","displayValue":true}]"##,
//! )?;
//! let outcome = manager.print(&blocks, &PrintOptions::default()).await;
//! assert!(outcome.success);
//!
//! // Inspect and pause the queue
//! let jobs = manager.jobs(None).await?;
//! if let Some(job) = jobs.first() {
//!     manager.pause_job(Some(&job.id)).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Block model, rendering and composition |
//! | [`layout`] | Owned visual tree, measurement, rasterization |
//! | [`manager`] | Public operations and job fan-out |
//! | [`spooler`] | Native backend seam and raw payloads |
//! | [`settings`] | Print settings resolution |
//! | [`token`] | Printer/job identity codec |
//! | [`status`] | Status and timestamp normalization |
//! | [`jobs`] | Printer and job records |
//! | [`pdf`] | Single-page PDF emission |
//! | [`error`] | Error types |

pub mod document;
pub mod error;
pub mod jobs;
pub mod layout;
pub mod manager;
pub mod pdf;
pub mod settings;
pub mod spooler;
pub mod status;
pub mod token;

// Re-exports for convenience
pub use error::ImprentaError;
pub use jobs::{Job, Printer};
pub use manager::{ControlOutcome, JobControlItem, PrintManager, PrintOptions, PrintOutcome};
pub use settings::{PrintSettings, PrintSettingsOverrides};
pub use status::JobStatus;
