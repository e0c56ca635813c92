//! # Identity Tokens
//!
//! Reversible, opaque identifiers for printers and (printer, job) pairs.
//!
//! Printer tokens are URL-safe base64 over the printer's UTF-8 name, not a
//! hash, so `decode(encode(name)) == name` holds for every name. Job tokens
//! wrap a length-prefixed `(printer, job id)` record in the same envelope,
//! which makes the pairing unambiguous for arbitrary printer names. Tokens
//! minted by older installations joined the halves with a literal `"_@_"`;
//! those still decode.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::ImprentaError;

/// Delimiter used by legacy job tokens.
const LEGACY_DELIMITER: &str = "_@_";

/// Encode a printer name as an opaque token.
pub fn encode_printer(name: &str) -> String {
    URL_SAFE_NO_PAD.encode(name.as_bytes())
}

/// Decode a printer token back to the printer name.
pub fn decode_printer(token: &str) -> Result<String, ImprentaError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| ImprentaError::MalformedToken(format!("{token:?}: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| ImprentaError::MalformedToken(format!("{token:?}: not valid UTF-8")))
}

/// Encode a (printer, job id) pair as an opaque job token.
///
/// The printer name's byte length is written ahead of the content, so no
/// character sequence in either half can confuse the decoder.
pub fn encode_job(printer: &str, job_id: &str) -> String {
    encode_printer(&format!("{}:{}{}", printer.len(), printer, job_id))
}

/// Decode a job token back to its (printer, job id) pair.
///
/// Fails with [`ImprentaError::MalformedToken`] when the envelope does not
/// decode, the record is not length-prefixed (and not a legacy delimiter
/// join), or either half is empty.
pub fn decode_job(token: &str) -> Result<(String, String), ImprentaError> {
    let record = decode_printer(token)?;

    if let Some(pair) = split_length_prefixed(&record) {
        return Ok(pair);
    }

    // Legacy format: "{printer}_@_{job_id}", split at the rightmost delimiter.
    if let Some((printer, job_id)) = record.rsplit_once(LEGACY_DELIMITER)
        && !printer.is_empty()
        && !job_id.is_empty()
    {
        return Ok((printer.to_string(), job_id.to_string()));
    }

    Err(ImprentaError::MalformedToken(format!(
        "{token:?}: not a job token"
    )))
}

/// Parse a `"{len}:{printer}{job_id}"` record. Both halves must be
/// non-empty and the prefix must account for a whole number of characters.
fn split_length_prefixed(record: &str) -> Option<(String, String)> {
    let (prefix, rest) = record.split_once(':')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let printer_len: usize = prefix.parse().ok()?;
    if printer_len == 0 || printer_len >= rest.len() || !rest.is_char_boundary(printer_len) {
        return None;
    }
    let (printer, job_id) = rest.split_at(printer_len);
    Some((printer.to_string(), job_id.to_string()))
}
