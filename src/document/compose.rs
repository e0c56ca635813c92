//! Document composition: an ordered block list in, one paginated page out.
//!
//! Each call owns its whole layout world. The context is created fresh,
//! measured, and dropped when the call returns, on success, preview and
//! error paths alike, so concurrent compositions cannot observe each
//! other (no shared rendering surface exists to attach to).

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::ImprentaError;
use crate::layout::{CONTAINER_WIDTH, LayoutContext, VisualNode, rasterize};
use crate::pdf::emit_single_page;

use super::render::render_block;
use super::resolve::ImageFetcher;
use super::types::ContentBlock;

/// Upscale factor applied when rasterizing for print sharpness.
pub const RASTER_UPSCALE: u32 = 5;
/// Page height used when the measured geometry is degenerate.
pub const FALLBACK_PAGE_HEIGHT: u32 = 300;

/// A composed, paginated document.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Single-page PDF bytes.
    pub pdf: Vec<u8>,
    /// Page width in logical units.
    pub page_width: u32,
    /// Page height in logical units.
    pub page_height: u32,
}

/// Result of a composition call.
#[derive(Debug)]
pub enum ComposeOutcome {
    /// A document was rasterized and emitted.
    Document(Composition),
    /// Preview mode: the tree was handed to the preview surface instead.
    Preview,
}

/// Interactive viewer collaborator used in preview mode.
///
/// Receives the composed tree and its measured extent; what it does with
/// them (a window, a web view, a test probe) is its own business.
#[async_trait]
pub trait PreviewSurface: Send + Sync {
    async fn open(
        &self,
        document: &VisualNode,
        width: u32,
        height: u32,
    ) -> Result<(), ImprentaError>;
}

/// Compose an ordered block list into a single paginated document.
///
/// Blocks are rendered and appended strictly in array order: append order
/// is document order. With `preview` set, the measured tree goes to the
/// preview surface and no document buffer is produced.
#[instrument(skip_all, fields(blocks = blocks.len(), preview))]
pub async fn compose(
    blocks: &[ContentBlock],
    preview: bool,
    fetcher: &dyn ImageFetcher,
    previewer: Option<&dyn PreviewSurface>,
) -> Result<ComposeOutcome, ImprentaError> {
    let mut ctx = LayoutContext::new(CONTAINER_WIDTH);
    for block in blocks {
        let node = render_block(block, fetcher).await?;
        ctx.push(node);
    }

    let (width, height) = ctx.measure();
    debug!(width, height, "container measured");

    if preview {
        if let Some(surface) = previewer {
            surface.open(ctx.root(), width, height.max(1)).await?;
        }
        return Ok(ComposeOutcome::Preview);
    }

    // Zero-extent geometry cannot form a page; fall back to the fixed
    // height and let the (blank) raster ride along.
    let page_height = if width == 0 || height == 0 {
        FALLBACK_PAGE_HEIGHT
    } else {
        height
    };

    let raster = rasterize(ctx.root(), width, RASTER_UPSCALE)?;
    let pdf = emit_single_page(&raster, width, page_height, RASTER_UPSCALE)?;

    Ok(ComposeOutcome::Document(Composition {
        pdf,
        page_width: width,
        page_height,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::TextBlock;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct NoFetch;

    #[async_trait]
    impl ImageFetcher for NoFetch {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImprentaError> {
            Err(ImprentaError::ExternalCall(format!("no network for {url}")))
        }
    }

    /// Records the extent it was opened with.
    #[derive(Default)]
    struct RecordingSurface {
        opened: Mutex<Option<(u32, u32)>>,
    }

    #[async_trait]
    impl PreviewSurface for RecordingSurface {
        async fn open(
            &self,
            _document: &VisualNode,
            width: u32,
            height: u32,
        ) -> Result<(), ImprentaError> {
            *self.opened.lock().unwrap() = Some((width, height));
            Ok(())
        }
    }

    fn text_block(value: &str) -> ContentBlock {
        ContentBlock::Text(TextBlock {
            value: value.into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_compose_emits_single_page_pdf() {
        let blocks = vec![text_block("hello"), text_block("world")];
        let outcome = compose(&blocks, false, &NoFetch, None).await.unwrap();
        match outcome {
            ComposeOutcome::Document(doc) => {
                assert_eq!(doc.page_width, CONTAINER_WIDTH);
                assert!(doc.page_height > 0);
                assert_eq!(&doc.pdf[0..5], b"%PDF-");
            }
            ComposeOutcome::Preview => panic!("expected a document"),
        }
    }

    #[tokio::test]
    async fn test_empty_document_falls_back_to_fixed_height() {
        let outcome = compose(&[], false, &NoFetch, None).await.unwrap();
        match outcome {
            ComposeOutcome::Document(doc) => {
                assert_eq!(doc.page_height, FALLBACK_PAGE_HEIGHT);
            }
            ComposeOutcome::Preview => panic!("expected a document"),
        }
    }

    #[tokio::test]
    async fn test_preview_skips_rasterization() {
        let surface = RecordingSurface::default();
        let blocks = vec![text_block("preview me")];
        let outcome = compose(&blocks, true, &NoFetch, Some(&surface))
            .await
            .unwrap();
        assert!(matches!(outcome, ComposeOutcome::Preview));
        let (width, height) = surface.opened.lock().unwrap().unwrap();
        assert_eq!(width, CONTAINER_WIDTH);
        assert!(height > 0);
    }

    #[tokio::test]
    async fn test_block_failure_aborts_whole_composition() {
        let blocks = vec![
            text_block("fine"),
            serde_json::from_str(r#"{"type":"image","url":"https://example.invalid/x"}"#).unwrap(),
        ];
        let err = compose(&blocks, false, &NoFetch, None).await.unwrap_err();
        assert!(matches!(err, ImprentaError::ExternalCall(_)));
    }

    #[tokio::test]
    async fn test_table_and_text_compose_together() {
        let table: ContentBlock = serde_json::from_str(
            r#"{"type":"table","tableHeader":["item"],"tableBody":[["espresso"],["muffin"]]}"#,
        )
        .unwrap();
        let blocks = vec![text_block("# Order"), table];
        let outcome = compose(&blocks, false, &NoFetch, None).await.unwrap();
        let ComposeOutcome::Document(doc) = outcome else {
            panic!("expected a document");
        };
        // Header (scaled) + spacing + three table rows.
        assert!(doc.page_height > 3 * crate::layout::TABLE_ROW_HEIGHT);
    }

    #[tokio::test]
    async fn test_unsupported_block_fails_composition() {
        let bad: ContentBlock = serde_json::from_str(r#"{"type":"sticker"}"#).unwrap();
        let err = compose(&[bad], false, &NoFetch, None).await.unwrap_err();
        assert!(matches!(err, ImprentaError::UnsupportedBlock(_)));
    }

    #[tokio::test]
    async fn test_blocks_render_in_array_order() {
        // Three blocks of known heights: their sum is the page height, which
        // only holds when every block landed exactly once, in order.
        let table: ContentBlock =
            serde_json::from_str(r#"{"type":"table","tableBody":[["a"]]}"#).unwrap();
        let blocks = vec![text_block("one"), text_block("two"), table];
        let ComposeOutcome::Document(doc) = compose(&blocks, false, &NoFetch, None).await.unwrap()
        else {
            panic!("expected a document");
        };
        let expected = crate::layout::LINE_HEIGHT * 2 + crate::layout::TABLE_ROW_HEIGHT;
        assert_eq!(doc.page_height, expected);
    }
}
