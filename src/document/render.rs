//! Block rendering: one content block in, one positioned visual node out.
//!
//! Style application order is fixed for every variant: structural defaults,
//! then explicit `width`/`height`, then the style map, so style entries
//! always win on conflicting keys. Fetch and codec failures propagate
//! unchanged; a single bad block aborts the whole composition.

use barcoders::sym::code128::Code128;
use image::{DynamicImage, GrayImage, Luma};
use qrcode::QrCode;

use crate::error::ImprentaError;
use crate::layout::{BarSymbol, NodeKind, TableGrid, VisualNode};

use super::markup::parse_markup;
use super::resolve::ImageFetcher;
use super::types::{BlockCommon, ContentBlock, Position, cell_text};

/// Renderer default for images without explicit dimensions.
const DEFAULT_IMAGE_SIZE: u32 = 100;
/// Logical pixels per QR module.
const QR_MODULE_PX: u32 = 4;
/// Quiet-zone width around a QR symbol, in modules.
const QR_QUIET_MODULES: u32 = 4;
/// Default barcode module width.
const BAR_MODULE_WIDTH: u32 = 4;
/// Default barcode height.
const BAR_HEIGHT: u32 = 40;

/// Render one content block to a visual node.
pub async fn render_block(
    block: &ContentBlock,
    fetcher: &dyn ImageFetcher,
) -> Result<VisualNode, ImprentaError> {
    match block {
        ContentBlock::Text(text) => {
            let node = VisualNode::new(NodeKind::Text(parse_markup(&text.value)));
            Ok(apply_common(node, &text.common, true))
        }
        ContentBlock::Image(image) => {
            let bytes = fetcher.fetch(&image.url).await?;
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| ImprentaError::Image(format!("Failed to decode image: {e}")))?;
            let mut node = VisualNode::new(NodeKind::Raster(decoded));
            node.width = Some(DEFAULT_IMAGE_SIZE);
            node.height = Some(DEFAULT_IMAGE_SIZE);
            Ok(apply_common(node, &image.common, true))
        }
        ContentBlock::Table(table) => {
            let grid = TableGrid {
                header: table
                    .table_header
                    .iter()
                    .flatten()
                    .map(cell_text)
                    .collect(),
                rows: table
                    .table_body
                    .iter()
                    .flatten()
                    .map(|row| row.iter().map(cell_text).collect())
                    .collect(),
            };
            let node = VisualNode::new(NodeKind::Table(grid));
            Ok(apply_common(node, &table.common, true))
        }
        ContentBlock::QrCode(qr) => {
            let symbol = encode_qr(&qr.value)?;
            let node = VisualNode::new(NodeKind::Raster(symbol));
            Ok(apply_common(node, &qr.common, true))
        }
        ContentBlock::BarCode(bar) => {
            let modules = encode_code128(&bar.value)?;
            let symbol = BarSymbol {
                modules,
                // For barcodes, `width` configures the module width, not
                // the node box; the node always stretches to container
                // width with contain semantics.
                module_width: bar.common.width.unwrap_or(BAR_MODULE_WIDTH),
                bar_height: bar.common.height.unwrap_or(BAR_HEIGHT),
                label: bar.display_value.then(|| bar.value.clone()),
            };
            let node = VisualNode::new(NodeKind::Bars(symbol));
            Ok(apply_common(node, &bar.common, false))
        }
        ContentBlock::Unsupported => Err(ImprentaError::UnsupportedBlock(
            "expected one of text, image, table, qrCode, barCode".into(),
        )),
    }
}

/// Apply the shared block fields in their fixed order: explicit dimensions
/// over the node's structural defaults, then the style map over everything.
///
/// `apply_width` is false for barcode nodes, whose `width` field was
/// already consumed as the module width.
fn apply_common(mut node: VisualNode, common: &BlockCommon, apply_width: bool) -> VisualNode {
    if apply_width && let Some(width) = common.width {
        node.width = Some(width);
    }
    if let Some(height) = common.height {
        node.height = Some(height);
    }
    if common.position == Some(Position::Center) {
        node.centered = true;
    }
    if let Some(style) = &common.style {
        for (key, value) in style {
            match (key.as_str(), value.as_u64()) {
                ("width", Some(n)) => node.width = Some(n as u32),
                ("height", Some(n)) => node.height = Some(n as u32),
                _ => {}
            }
            node.styles.insert(key.clone(), value.clone());
        }
    }
    node
}

/// Encode a payload as a QR symbol rendered dark-on-light.
fn encode_qr(value: &str) -> Result<DynamicImage, ImprentaError> {
    let code = QrCode::new(value.as_bytes())
        .map_err(|e| ImprentaError::ExternalCall(format!("QR encode failed: {e}")))?;

    let modules = code.width() as u32;
    let size = (modules + 2 * QR_QUIET_MODULES) * QR_MODULE_PX;
    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));

    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != qrcode::Color::Dark {
                continue;
            }
            let base_x = (QR_QUIET_MODULES + qx) * QR_MODULE_PX;
            let base_y = (QR_QUIET_MODULES + qy) * QR_MODULE_PX;
            for dy in 0..QR_MODULE_PX {
                for dx in 0..QR_MODULE_PX {
                    img.put_pixel(base_x + dx, base_y + dy, Luma([0u8]));
                }
            }
        }
    }

    Ok(DynamicImage::ImageLuma8(img))
}

/// Encode a payload as Code 128 bar/space modules.
///
/// Character Set B is selected: it covers upper/lowercase, digits and
/// punctuation, matching what callers put in `barCode.value`.
fn encode_code128(value: &str) -> Result<Vec<u8>, ImprentaError> {
    let prefixed = format!("\u{0181}{value}");
    let barcode = Code128::new(&prefixed)
        .map_err(|e| ImprentaError::ExternalCall(format!("Barcode encode failed: {e}")))?;
    Ok(barcode.encode())
}
