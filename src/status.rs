//! # Job Status Normalization
//!
//! Maps vendor-specific numeric job status codes onto a stable vocabulary,
//! and parses the vendor's wrapped timestamp format.
//!
//! Status codes follow the spooler's bitfield values. Codes outside the
//! table (including absent ones) normalize to `Unknown` rather than
//! erroring, so callers always get a usable record.

use serde::{Deserialize, Serialize};

/// Canonical job status: the raw code plus a stable label and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Raw vendor code. `None` when the backend omitted it.
    pub code: Option<i64>,
    /// Short stable label, e.g. "Printing".
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

/// Vendor code table: (code, label, description).
const STATUS_TABLE: &[(i64, &str, &str)] = &[
    (1, "Paused", "The print job is paused"),
    (2, "Error", "The print job has an error"),
    (4, "Deleting", "The print job is being deleted"),
    (8, "Spooling", "The print job is spooling"),
    (16, "Printing", "The print job is printing"),
    (32, "Offline", "The printer is offline"),
    (64, "Paper Out", "The printer is out of paper"),
    (128, "Printed", "The print job has printed"),
    (256, "Deleted", "The print job was deleted"),
    (512, "Blocked", "The print job is blocked by the device queue"),
    (1024, "User Intervention", "The printer requires user intervention"),
    (2048, "Restart", "The print job was restarted"),
    (4096, "Complete", "The print job is complete"),
    (8192, "Retained", "The print job is retained in the queue"),
    (16384, "Rendering Locally", "The print job is rendering on the client"),
];

/// Normalize a raw status code to a [`JobStatus`].
///
/// Total function: every input maps to a record. Codes absent from the
/// table (negative values, combined bitmasks, `None`) yield the `Unknown`
/// status. Never errors.
pub fn normalize_status(code: Option<i64>) -> JobStatus {
    if let Some(raw) = code
        && let Some((_, name, description)) = STATUS_TABLE.iter().find(|(c, _, _)| *c == raw)
    {
        return JobStatus {
            code,
            name: (*name).to_string(),
            description: (*description).to_string(),
        };
    }
    JobStatus {
        code,
        name: "Unknown".to_string(),
        description: "Unknown Job Status".to_string(),
    }
}

/// Parse a vendor-wrapped timestamp like `"/Date(1700000000000)/"` into
/// epoch milliseconds.
///
/// `None` in yields `None` out. A string without the exact wrapper, or with
/// a non-integer interior, also yields `None`; the parse never errors.
pub fn parse_vendor_time(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    let interior = raw.strip_prefix("/Date(")?.strip_suffix(")/")?;
    interior.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_codes_map_to_labels() {
        assert_eq!(normalize_status(Some(1)).name, "Paused");
        assert_eq!(normalize_status(Some(16)).name, "Printing");
        assert_eq!(normalize_status(Some(16384)).name, "Rendering Locally");
        assert_eq!(normalize_status(Some(128)).code, Some(128));
    }

    #[test]
    fn test_unknown_codes_never_error() {
        for code in [Some(3), Some(-1), Some(0), Some(99999), None] {
            let status = normalize_status(code);
            assert_eq!(status.name, "Unknown");
            assert_eq!(status.description, "Unknown Job Status");
            assert_eq!(status.code, code);
        }
    }

    #[test]
    fn test_parse_vendor_time() {
        assert_eq!(
            parse_vendor_time(Some("/Date(1700000000000)/")),
            Some(1700000000000)
        );
        assert_eq!(parse_vendor_time(Some("/Date(-1000)/")), Some(-1000));
        assert_eq!(parse_vendor_time(None), None);
    }

    #[test]
    fn test_parse_vendor_time_malformed_is_none() {
        for bad in ["", "1700000000000", "/Date()/", "/Date(abc)/", "Date(1)/", "/Date(1)"] {
            assert_eq!(parse_vendor_time(Some(bad)), None, "input {bad:?}");
        }
    }
}
