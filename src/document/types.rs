//! Content block types for the print request model.
//!
//! All types derive `Serialize + Deserialize` so the same structs work for
//! Rust construction and JSON print requests. Field names follow the wire
//! format (camelCase); block order in a request is significant and is
//! preserved top-to-bottom in the composed document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual-property overrides applied verbatim to a rendered node.
///
/// Keys the layout engine recognizes (`width`, `height`) override the
/// node's resolved dimensions; everything else is carried through for the
/// preview surface. Values keep their JSON shape (numbers stay numbers).
pub type StyleMap = BTreeMap<String, serde_json::Value>;

/// Horizontal placement of a rendered block inside the page column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Left,
    Center,
}

/// Fields shared by every block variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockCommon {
    /// Explicit width in logical units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Explicit height in logical units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMap>,
}

/// Text block: a markup (Markdown) string rendered full-width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub value: String,
    #[serde(flatten)]
    pub common: BlockCommon,
}

/// Image block: bytes fetched from `url` and embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub url: String,
    #[serde(flatten)]
    pub common: BlockCommon,
}

/// Table block: an ordered header row plus ordered body rows.
///
/// Cell values are arbitrary JSON scalars and are stringified per cell.
/// Missing sections render empty rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_header: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_body: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(flatten)]
    pub common: BlockCommon,
}

/// QR code block: `value` is the encoded payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QrCodeBlock {
    #[serde(default)]
    pub value: String,
    #[serde(flatten)]
    pub common: BlockCommon,
}

fn default_true() -> bool {
    true
}

/// One-dimensional barcode block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarCodeBlock {
    #[serde(default)]
    pub value: String,
    /// Render the payload as human-readable text under the bars.
    #[serde(default = "default_true")]
    pub display_value: bool,
    #[serde(flatten)]
    pub common: BlockCommon,
}

impl Default for BarCodeBlock {
    fn default() -> Self {
        Self {
            value: String::new(),
            display_value: true,
            common: BlockCommon::default(),
        }
    }
}

/// One renderable unit of a print request.
///
/// The tag set is closed: anything outside it deserializes into
/// [`ContentBlock::Unsupported`], which the renderer rejects explicitly
/// instead of skipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Text(TextBlock),
    Image(ImageBlock),
    Table(TableBlock),
    QrCode(QrCodeBlock),
    BarCode(BarCodeBlock),
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    /// Wire name of the block's type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ContentBlock::Text(_) => "text",
            ContentBlock::Image(_) => "image",
            ContentBlock::Table(_) => "table",
            ContentBlock::QrCode(_) => "qrCode",
            ContentBlock::BarCode(_) => "barCode",
            ContentBlock::Unsupported => "unsupported",
        }
    }

    /// The fields shared by every supported variant.
    pub fn common(&self) -> Option<&BlockCommon> {
        match self {
            ContentBlock::Text(b) => Some(&b.common),
            ContentBlock::Image(b) => Some(&b.common),
            ContentBlock::Table(b) => Some(&b.common),
            ContentBlock::QrCode(b) => Some(&b.common),
            ContentBlock::BarCode(b) => Some(&b.common),
            ContentBlock::Unsupported => None,
        }
    }
}

/// Stringify one table cell value the way the wire format expects:
/// strings verbatim, every other scalar via its JSON rendering.
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
