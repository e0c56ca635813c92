//! # Paginated Document Emitter
//!
//! Wraps a composed page raster in a single-page PDF.
//!
//! printpdf 0.8 uses a data-oriented API: the page is a `PdfPage` holding a
//! `Vec<Op>` operation list, serialized via `PdfDocument::save()`. The
//! raster is registered as an image XObject and placed at full page extent.

use image::RgbImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};

use crate::error::ImprentaError;

/// CSS reference pixel density: 96 logical units per inch.
const LOGICAL_DPI: f32 = 96.0;
/// Millimetres per logical unit.
const MM_PER_UNIT: f32 = 25.4 / LOGICAL_DPI;

/// Emit a single-page PDF embedding `raster` at full page extent.
///
/// `page_width` / `page_height` are logical units; the raster is expected
/// to be an integer `upscale` of that geometry (extra sharpness collapses
/// back to page size through the placement DPI).
pub fn emit_single_page(
    raster: &RgbImage,
    page_width: u32,
    page_height: u32,
    upscale: u32,
) -> Result<Vec<u8>, ImprentaError> {
    if page_width == 0 || page_height == 0 {
        return Err(ImprentaError::Pdf(format!(
            "degenerate page geometry: {page_width}x{page_height}"
        )));
    }

    let page_w = Mm(page_width as f32 * MM_PER_UNIT);
    let page_h = Mm(page_height as f32 * MM_PER_UNIT);

    let image = RawImage {
        pixels: RawImageData::U8(raster.as_raw().clone()),
        width: raster.width() as usize,
        height: raster.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new("imprenta document");
    let xobject_id = doc.add_image(&image);

    // Placing at LOGICAL_DPI * upscale maps raster pixels back onto the
    // logical grid, so scale 1.0 fills the page exactly.
    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            scale_x: Some(1.0),
            scale_y: Some(1.0),
            dpi: Some(LOGICAL_DPI * upscale.max(1) as f32),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if output.is_empty() {
        return Err(ImprentaError::Pdf("serializer produced no bytes".into()));
    }
    Ok(output)
}
