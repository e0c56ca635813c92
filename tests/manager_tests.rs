//! # Manager Integration Tests
//!
//! Exercise the public operation surface against an in-memory backend that
//! records every call, covering the listing/token round trips, the print
//! spool handshake, and batch fan-out semantics.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;

use imprenta::document::{ContentBlock, ImageFetcher};
use imprenta::spooler::{ControlVerb, JobListing, PrintBackend, RawJob, RawPrinter};
use imprenta::{ImprentaError, PrintManager, PrintOptions, PrintSettingsOverrides, token};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Control(&'static str, String, String),
    TempFile(String),
    Spool {
        id: String,
        path: String,
        setting: String,
        remove: bool,
    },
}

/// In-memory backend over a fixed printer/job fixture.
#[derive(Default)]
struct MockBackend {
    /// (printer, jobs) in listing order.
    queues: Vec<(String, Vec<&'static str>)>,
    /// Job ids whose control calls must fail.
    failing_jobs: Vec<&'static str>,
    /// Return an empty path from create_temp_file.
    empty_temp_file: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    fn with_queues(queues: &[(&str, &[&'static str])]) -> Self {
        Self {
            queues: queues
                .iter()
                .map(|(p, jobs)| (p.to_string(), jobs.to_vec()))
                .collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn raw_job(id: &str) -> RawJob {
        serde_json::from_str(&format!(
            r#"{{"Id":{id},"JobStatus":16,"DocumentName":"doc-{id}","SubmittedTime":"/Date(1700000000000)/"}}"#
        ))
        .unwrap()
    }
}

#[async_trait]
impl PrintBackend for MockBackend {
    async fn list_printers(&self) -> Result<Vec<RawPrinter>, ImprentaError> {
        Ok(self
            .queues
            .iter()
            .map(|(name, _)| {
                serde_json::from_str(&format!(r#"{{"Name":"{name}","JobCount":0}}"#)).unwrap()
            })
            .collect())
    }

    async fn printer_by_name(&self, name: &str) -> Result<Option<RawPrinter>, ImprentaError> {
        Ok(self
            .queues
            .iter()
            .find(|(p, _)| p == name)
            .map(|(p, _)| serde_json::from_str(&format!(r#"{{"Name":"{p}"}}"#)).unwrap()))
    }

    async fn list_jobs(&self, printer_name: &str) -> Result<JobListing, ImprentaError> {
        let Some((_, jobs)) = self.queues.iter().find(|(p, _)| p == printer_name) else {
            return Ok(JobListing::empty());
        };
        // One queued job arrives as a bare object, mirroring the vendor.
        if let [only] = jobs.as_slice() {
            return Ok(JobListing::One(Self::raw_job(only)));
        }
        Ok(JobListing::Many(
            jobs.iter().map(|id| Self::raw_job(id)).collect(),
        ))
    }

    async fn job_by_id(
        &self,
        printer_name: &str,
        job_id: &str,
    ) -> Result<Option<RawJob>, ImprentaError> {
        let Some((_, jobs)) = self.queues.iter().find(|(p, _)| p == printer_name) else {
            return Ok(None);
        };
        Ok(jobs
            .iter()
            .find(|id| **id == job_id)
            .map(|id| Self::raw_job(id)))
    }

    async fn control_job(
        &self,
        verb: ControlVerb,
        printer_name: &str,
        job_id: &str,
    ) -> Result<(), ImprentaError> {
        self.calls.lock().unwrap().push(Call::Control(
            verb.as_str(),
            printer_name.to_string(),
            job_id.to_string(),
        ));
        if self.failing_jobs.iter().any(|id| *id == job_id) {
            return Err(ImprentaError::ExternalCall(format!(
                "spooler refused job {job_id}"
            )));
        }
        Ok(())
    }

    async fn create_temp_file(
        &self,
        base64_data: &str,
        filename: &str,
    ) -> Result<String, ImprentaError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::TempFile(base64_data.to_string()));
        if self.empty_temp_file {
            return Ok(String::new());
        }
        Ok(format!("/tmp/{filename}"))
    }

    async fn spool_pdf(
        &self,
        id: &str,
        path: &str,
        printer_setting: &str,
        remove_after_print: bool,
    ) -> Result<(), ImprentaError> {
        self.calls.lock().unwrap().push(Call::Spool {
            id: id.to_string(),
            path: path.to_string(),
            setting: printer_setting.to_string(),
            remove: remove_after_print,
        });
        Ok(())
    }
}

/// Fetcher that never resolves; the tests print fetch-free blocks.
struct NoFetch;

#[async_trait]
impl ImageFetcher for NoFetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImprentaError> {
        Err(ImprentaError::ExternalCall(format!("no network for {url}")))
    }
}

fn manager(backend: Arc<MockBackend>) -> PrintManager {
    PrintManager::new(backend, Arc::new(NoFetch))
}

fn receipt_blocks() -> Vec<ContentBlock> {
    serde_json::from_str(
        r##"[
            {"type":"text","value":"# Receipt\n\nthanks for coming"},
            {"type":"table","tableHeader":["item","price"],"tableBody":[["espresso",4.5]]},
            {"type":"qrCode","value":"https://example.invalid/r/1"},
            {"type":"barCode","value":"0001","displayValue":true}
        ]"##,
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_printers_mint_reversible_tokens() {
    let backend = Arc::new(MockBackend::with_queues(&[
        ("Front Desk", &[]),
        ("Warehouse", &[]),
    ]));
    let printers = manager(backend).printers(None).await.unwrap();
    assert_eq!(printers.len(), 2);
    for printer in &printers {
        assert_eq!(token::decode_printer(&printer.id).unwrap(), printer.name);
    }
}

#[tokio::test]
async fn test_printers_by_token_returns_single_match() {
    let backend = Arc::new(MockBackend::with_queues(&[("Front Desk", &[])]));
    let mgr = manager(backend);
    let all = mgr.printers(None).await.unwrap();
    let found = mgr.printers(Some(&all[0].id)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Front Desk");
}

#[tokio::test]
async fn test_jobs_walk_printers_in_order() {
    let backend = Arc::new(MockBackend::with_queues(&[
        ("P1", &["1", "2"]),
        ("P2", &["3"]),
    ]));
    let jobs = manager(backend).jobs(None).await.unwrap();
    let pairs: Vec<(String, String)> = jobs
        .iter()
        .map(|j| (j.printer_name.clone(), j.job_id.clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("P1".to_string(), "1".to_string()),
            ("P1".to_string(), "2".to_string()),
            ("P2".to_string(), "3".to_string()),
        ]
    );
    // Single-object listings (P2) normalize like arrays, and statuses and
    // timestamps come back normalized.
    assert_eq!(jobs[2].job_status.name, "Printing");
    assert_eq!(jobs[2].submitted_time, Some(1700000000000));
}

#[tokio::test]
async fn test_jobs_filtered_by_printer_token() {
    let backend = Arc::new(MockBackend::with_queues(&[
        ("P1", &["1", "2"]),
        ("P2", &["3"]),
    ]));
    let mgr = manager(backend);
    let jobs = mgr
        .jobs(Some(&token::encode_printer("P2")))
        .await
        .unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].printer_name, "P2");

    let none = mgr
        .jobs(Some(&token::encode_printer("P9")))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_job_round_trips_through_its_token() {
    let backend = Arc::new(MockBackend::with_queues(&[("P1", &["1", "2"])]));
    let mgr = manager(backend);
    let listed = mgr.jobs(None).await.unwrap();
    let fetched = mgr.job(&listed[1].id).await.unwrap().unwrap();
    assert_eq!(fetched.job_id, "2");
    assert_eq!(fetched.printer_name, "P1");
}

#[tokio::test]
async fn test_job_with_malformed_token_errors() {
    let backend = Arc::new(MockBackend::with_queues(&[("P1", &["1"])]));
    let err = manager(backend).job("not-a-valid-token").await.unwrap_err();
    assert!(matches!(err, ImprentaError::MalformedToken(_)));
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_print_spools_composed_pdf() {
    let backend = Arc::new(MockBackend::with_queues(&[("Front Desk", &[])]));
    let mgr = manager(backend.clone());
    let options = PrintOptions {
        id: Some(token::encode_printer("Front Desk")),
        print_setting: PrintSettingsOverrides {
            paper: Some("Letter".into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let outcome = mgr.print(&receipt_blocks(), &options).await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "OK");

    let calls = backend.calls();
    let Call::TempFile(payload) = &calls[0] else {
        panic!("expected temp file first, got {calls:?}");
    };
    // The spool payload is base64 of a real PDF.
    let decoded = STANDARD.decode(payload).unwrap();
    assert_eq!(&decoded[0..5], b"%PDF-");

    let Call::Spool {
        id,
        path,
        setting,
        remove,
    } = &calls[1]
    else {
        panic!("expected spool second, got {calls:?}");
    };
    assert_eq!(id, "Front Desk");
    assert!(path.ends_with(".pdf"));
    assert_eq!(setting, "-print-settings Letter,simplex,fit,color,1x");
    assert!(*remove);
}

#[tokio::test]
async fn test_print_name_wins_over_token() {
    let backend = Arc::new(MockBackend::with_queues(&[("Front Desk", &[])]));
    let mgr = manager(backend.clone());
    let options = PrintOptions {
        id: Some(token::encode_printer("Front Desk")),
        name: Some("Warehouse".into()),
        ..Default::default()
    };
    let outcome = mgr.print(&receipt_blocks(), &options).await;
    assert!(outcome.success);
    let calls = backend.calls();
    let Call::Spool { id, .. } = &calls[1] else {
        panic!("expected spool call");
    };
    assert_eq!(id, "Warehouse");
}

#[tokio::test]
async fn test_print_empty_temp_path_fails_cleanly() {
    let backend = Arc::new(MockBackend {
        queues: vec![("Front Desk".into(), vec![])],
        empty_temp_file: true,
        ..Default::default()
    });
    let outcome = manager(backend.clone())
        .print(&receipt_blocks(), &PrintOptions::default())
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Fail to create temp file");
    // Nothing was spooled.
    assert!(
        !backend
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Spool { .. }))
    );
}

#[tokio::test]
async fn test_print_normalizes_block_failures() {
    let backend = Arc::new(MockBackend::with_queues(&[("Front Desk", &[])]));
    let blocks: Vec<ContentBlock> =
        serde_json::from_str(r#"[{"type":"image","url":"https://example.invalid/x.png"}]"#)
            .unwrap();
    let outcome = manager(backend.clone())
        .print(&blocks, &PrintOptions::default())
        .await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("no network"));
    // The failed composition never reached the backend.
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_print_rejects_unsupported_block() {
    let backend = Arc::new(MockBackend::with_queues(&[("Front Desk", &[])]));
    let blocks: Vec<ContentBlock> = serde_json::from_str(r#"[{"type":"vinyl"}]"#).unwrap();
    let outcome = manager(backend)
        .print(&blocks, &PrintOptions::default())
        .await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("Unsupported block"));
}

// ---------------------------------------------------------------------------
// Job control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_single_job_control_targets_exact_pair() {
    let backend = Arc::new(MockBackend::with_queues(&[("P1", &["1", "2"])]));
    let mgr = manager(backend.clone());
    let outcome = mgr
        .pause_job(Some(&token::encode_job("P1", "2")))
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(
        backend.calls(),
        vec![Call::Control("pause", "P1".into(), "2".into())]
    );
}

#[tokio::test]
async fn test_control_with_malformed_token_fails_fast() {
    let backend = Arc::new(MockBackend::with_queues(&[("P1", &["1"])]));
    let mgr = manager(backend.clone());
    let outcome = mgr.restart_job(Some("not-a-valid-token")).await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("Malformed token"));
    // The backend was never touched.
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_fan_out_attempts_every_job_in_order() {
    let backend = Arc::new(MockBackend::with_queues(&[
        ("P1", &["1", "2"]),
        ("P2", &["3"]),
    ]));
    let outcome = manager(backend.clone()).restart_job(None).await;
    assert!(outcome.success);
    assert_eq!(
        backend.calls(),
        vec![
            Call::Control("restart", "P1".into(), "1".into()),
            Call::Control("restart", "P1".into(), "2".into()),
            Call::Control("restart", "P2".into(), "3".into()),
        ]
    );
}

#[tokio::test]
async fn test_fan_out_failure_does_not_stop_the_sweep() {
    let backend = Arc::new(MockBackend {
        queues: vec![
            ("P1".into(), vec!["1", "2"]),
            ("P2".into(), vec!["3"]),
        ],
        failing_jobs: vec!["2"],
        ..Default::default()
    });
    let outcome = manager(backend.clone()).remove_job(None).await;

    // All three jobs were attempted despite the failure on job 2.
    assert_eq!(backend.calls().len(), 3);
    assert!(!outcome.success);
    assert_eq!(outcome.message, "1 of 3 jobs failed");
    assert_eq!(outcome.items.len(), 3);
    assert!(outcome.items[0].success);
    assert!(!outcome.items[1].success);
    assert!(outcome.items[1].message.contains("spooler refused"));
    assert!(outcome.items[2].success);
}

#[tokio::test]
async fn test_batch_timeout_bounds_fan_out() {
    /// Backend whose job listing hangs forever.
    struct StallingBackend(MockBackend);

    #[async_trait]
    impl PrintBackend for StallingBackend {
        async fn list_printers(&self) -> Result<Vec<RawPrinter>, ImprentaError> {
            self.0.list_printers().await
        }
        async fn printer_by_name(&self, name: &str) -> Result<Option<RawPrinter>, ImprentaError> {
            self.0.printer_by_name(name).await
        }
        async fn list_jobs(&self, _printer_name: &str) -> Result<JobListing, ImprentaError> {
            std::future::pending().await
        }
        async fn job_by_id(
            &self,
            printer_name: &str,
            job_id: &str,
        ) -> Result<Option<RawJob>, ImprentaError> {
            self.0.job_by_id(printer_name, job_id).await
        }
        async fn control_job(
            &self,
            verb: ControlVerb,
            printer_name: &str,
            job_id: &str,
        ) -> Result<(), ImprentaError> {
            self.0.control_job(verb, printer_name, job_id).await
        }
        async fn create_temp_file(
            &self,
            base64_data: &str,
            filename: &str,
        ) -> Result<String, ImprentaError> {
            self.0.create_temp_file(base64_data, filename).await
        }
        async fn spool_pdf(
            &self,
            id: &str,
            path: &str,
            printer_setting: &str,
            remove_after_print: bool,
        ) -> Result<(), ImprentaError> {
            self.0.spool_pdf(id, path, printer_setting, remove_after_print).await
        }
    }

    let backend = Arc::new(StallingBackend(MockBackend::with_queues(&[("P1", &["1"])])));
    let mgr = PrintManager::new(backend, Arc::new(NoFetch))
        .with_batch_timeout(std::time::Duration::from_millis(50));
    let outcome = mgr.pause_job(None).await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("timed out"));
}
