//! # Document Model & Composition
//!
//! Everything between a print request's block list and a paginated page:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Content block model (the wire format) |
//! | [`markup`] | Markdown parsing for text blocks |
//! | [`render`] | Block → visual node rendering |
//! | [`resolve`] | Binary fetch collaborator for image blocks |
//! | [`compose`] | Ordered blocks → single-page PDF |
//!
//! ```no_run
//! use imprenta::document::{compose, types::ContentBlock, resolve::HttpImageFetcher};
//!
//! # async fn demo() -> Result<(), imprenta::ImprentaError> {
//! let blocks: Vec<ContentBlock> = serde_json::from_str(
//!     r##"[{"type":"text","value":"# Receipt"},
//!         {"type":"qrCode","value":"https://example.invalid/r/42"}]"##,
//! )?;
//! let fetcher = HttpImageFetcher::new()?;
//! let outcome = compose::compose(&blocks, false, &fetcher, None).await?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod markup;
pub mod render;
pub mod resolve;
pub mod types;

pub use compose::{ComposeOutcome, Composition, PreviewSurface, compose};
pub use render::render_block;
pub use resolve::{HttpImageFetcher, ImageFetcher};
pub use types::{
    BarCodeBlock, BlockCommon, ContentBlock, ImageBlock, Position, QrCodeBlock, StyleMap,
    TableBlock, TextBlock,
};
