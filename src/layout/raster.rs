//! Visual tree rasterization.
//!
//! Walks a composed [`VisualNode`] flow and paints it onto an RGB canvas at
//! an integer upscale factor. Text is drawn with the Spleen 6×12 bitmap
//! font, one font pixel per `scale × line-scale` square; images and QR
//! rasters are resampled with Lanczos3; barcodes are painted directly from
//! their module runs with `object-fit: contain` semantics.

use std::collections::HashMap;

use image::{DynamicImage, Rgb, RgbImage, imageops::FilterType};
use spleen_font::{FONT_6X12, PSF2Font};

use crate::error::ImprentaError;

use super::{
    BarSymbol, CHAR_WIDTH, LINE_HEIGHT, NodeKind, TableGrid, TableRowMetrics, TextLine,
    VisualNode,
};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
/// Background shade behind inline-code spans.
const CODE_SHADE: Rgb<u8> = Rgb([230, 230, 230]);

/// Rasterize a composed container to an RGB image.
///
/// `container_width` and the tree's measured height are logical units; the
/// canvas is `scale` times larger in both directions. Pure function of its
/// inputs; no shared surface is touched.
pub fn rasterize(
    root: &VisualNode,
    container_width: u32,
    scale: u32,
) -> Result<RgbImage, ImprentaError> {
    if container_width == 0 || scale == 0 {
        return Err(ImprentaError::Layout(format!(
            "degenerate raster geometry: width {container_width}, scale {scale}"
        )));
    }

    let (_, height) = root.measure(container_width);
    let mut canvas = Canvas::new(container_width, height.max(1), scale);

    let NodeKind::Flow(children) = &root.kind else {
        return Err(ImprentaError::Layout("root node is not a flow".into()));
    };

    let mut y = 0u32;
    for child in children {
        y += draw_node(&mut canvas, child, y, container_width)?;
    }

    Ok(canvas.into_image())
}

/// Draw one node at logical `y`; returns the logical height consumed.
fn draw_node(
    canvas: &mut Canvas,
    node: &VisualNode,
    y: u32,
    container_width: u32,
) -> Result<u32, ImprentaError> {
    let (node_width, node_height) = node.measure(container_width);
    let x = if node.centered {
        (container_width.saturating_sub(node_width)) / 2
    } else {
        0
    };

    match &node.kind {
        NodeKind::Flow(children) => {
            let mut cursor = y;
            for child in children {
                cursor += draw_node(canvas, child, cursor, container_width)?;
            }
            Ok(cursor - y)
        }
        NodeKind::Text(lines) => {
            draw_text(canvas, lines, x, y, container_width);
            Ok(node_height)
        }
        NodeKind::Raster(img) => {
            canvas.blit(img, x, y, node_width, node_height);
            Ok(node_height)
        }
        NodeKind::Bars(symbol) => {
            draw_bars(canvas, symbol, node, y, container_width);
            Ok(node_height)
        }
        NodeKind::Table(grid) => {
            draw_table(canvas, grid, y, container_width);
            Ok(node_height)
        }
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Per-character style resolved from its span.
#[derive(Clone, Copy)]
struct CharStyle {
    bold: bool,
    underline: bool,
    code: bool,
}

/// Wrap a line's characters at `per_line` columns.
fn wrap_chars(line: &TextLine, per_line: usize) -> Vec<Vec<(char, CharStyle)>> {
    let chars: Vec<(char, CharStyle)> = line
        .spans
        .iter()
        .flat_map(|span| {
            let style = CharStyle {
                bold: span.bold,
                underline: span.underline,
                code: span.code,
            };
            span.text.chars().map(move |ch| (ch, style))
        })
        .collect();

    if chars.is_empty() {
        return vec![Vec::new()];
    }
    chars.chunks(per_line.max(1)).map(<[_]>::to_vec).collect()
}

fn draw_text(canvas: &mut Canvas, lines: &[TextLine], x: u32, y: u32, container_width: u32) {
    let mut cursor = y;
    for line in lines {
        let text_scale = line.scale.max(1);
        let per_line = (container_width / (text_scale * CHAR_WIDTH)).max(1) as usize;
        for row in wrap_chars(line, per_line) {
            for (column, (ch, style)) in row.iter().enumerate() {
                let cx = x + column as u32 * text_scale * CHAR_WIDTH;
                canvas.draw_glyph(*ch, cx, cursor, text_scale, *style);
            }
            cursor += text_scale * LINE_HEIGHT;
        }
    }
}

// ---------------------------------------------------------------------------
// Barcode
// ---------------------------------------------------------------------------

fn draw_bars(canvas: &mut Canvas, symbol: &BarSymbol, node: &VisualNode, y: u32, container_width: u32) {
    let natural_width = (symbol.modules.len() as u32 * symbol.module_width).max(1);
    let box_height = node.height.unwrap_or(symbol.bar_height).max(1);

    // object-fit: contain. Scale to the box preserving aspect, centered.
    let fit = (container_width as f32 / natural_width as f32)
        .min(box_height as f32 / symbol.bar_height as f32);
    let displayed_width = natural_width as f32 * fit;
    let displayed_height = (symbol.bar_height as f32 * fit).round().max(1.0) as u32;
    let x0 = (container_width as f32 - displayed_width) / 2.0;
    let y0 = y + (box_height - displayed_height.min(box_height)) / 2;

    let module_px = symbol.module_width as f32 * fit;
    for (index, module) in symbol.modules.iter().enumerate() {
        if *module != 1 {
            continue;
        }
        let start = x0 + index as f32 * module_px;
        canvas.fill_rect_f(start, y0, module_px, displayed_height, BLACK);
    }

    if let Some(label) = &symbol.label {
        let label_width = label.chars().count() as u32 * CHAR_WIDTH;
        let lx = (container_width.saturating_sub(label_width)) / 2;
        let line = TextLine::plain(label.clone(), 1);
        draw_text(canvas, &[line], lx, y + box_height, container_width);
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

fn draw_table(canvas: &mut Canvas, grid: &TableGrid, y: u32, container_width: u32) {
    let columns = grid.column_count();
    let row_count = grid.row_count();
    if columns == 0 || row_count == 0 {
        return;
    }

    let metrics = TableRowMetrics::default();
    let column_width = container_width / columns as u32;
    let table_height = row_count as u32 * metrics.row_height;

    // Grid rules: outer frame plus row and column separators.
    canvas.h_line(0, container_width, y, BLACK);
    for row in 1..=row_count as u32 {
        canvas.h_line(0, container_width, y + row * metrics.row_height, BLACK);
    }
    for col in 0..=columns as u32 {
        let cx = (col * column_width).min(container_width - 1);
        canvas.v_line(cx, y, y + table_height, BLACK);
    }

    let cells_per_column = ((column_width.saturating_sub(2 * metrics.cell_pad_x)) / CHAR_WIDTH)
        .max(1) as usize;
    let header_rows = usize::from(!grid.header.is_empty());

    let mut draw_row = |cells: &[String], row_index: usize, bold: bool| {
        let row_y = y + row_index as u32 * metrics.row_height + metrics.cell_pad_y;
        for (col, cell) in cells.iter().enumerate().take(columns) {
            let text: String = cell.chars().take(cells_per_column).collect();
            let mut line = TextLine::plain(text, 1);
            line.spans[0].bold = bold;
            let cell_x = col as u32 * column_width + metrics.cell_pad_x;
            draw_text(canvas, &[line], cell_x, row_y, container_width);
        }
    };

    if header_rows == 1 {
        draw_row(&grid.header, 0, true);
    }
    for (index, row) in grid.rows.iter().enumerate() {
        draw_row(row, header_rows + index, false);
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// The paint target: logical coordinates in, raster pixels out.
struct Canvas {
    img: RgbImage,
    scale: u32,
    glyphs: GlyphCache,
}

impl Canvas {
    fn new(width: u32, height: u32, scale: u32) -> Self {
        Self {
            img: RgbImage::from_pixel(width * scale, height * scale, WHITE),
            scale,
            glyphs: GlyphCache::default(),
        }
    }

    fn into_image(self) -> RgbImage {
        self.img
    }

    /// Fill a logical-coordinate rectangle.
    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        self.fill_rect_px(
            x * self.scale,
            y * self.scale,
            w * self.scale,
            h * self.scale,
            color,
        );
    }

    /// Fill a rectangle given in fractional logical coordinates.
    fn fill_rect_f(&mut self, x: f32, y: u32, w: f32, h: u32, color: Rgb<u8>) {
        let s = self.scale as f32;
        let x0 = (x * s).round().max(0.0) as u32;
        let x1 = ((x + w) * s).round().max(0.0) as u32;
        self.fill_rect_px(x0, y * self.scale, x1.saturating_sub(x0), h * self.scale, color);
    }

    fn fill_rect_px(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let (max_x, max_y) = self.img.dimensions();
        for py in y..(y + h).min(max_y) {
            for px in x..(x + w).min(max_x) {
                self.img.put_pixel(px, py, color);
            }
        }
    }

    /// One-logical-pixel horizontal rule from `x0` to `x1`.
    fn h_line(&mut self, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
        self.fill_rect(x0, y, x1.saturating_sub(x0), 1, color);
    }

    /// One-logical-pixel vertical rule from `y0` to `y1`.
    fn v_line(&mut self, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
        self.fill_rect(x, y0, 1, y1.saturating_sub(y0), color);
    }

    /// Resample and copy a raster onto the canvas at logical coordinates.
    fn blit(&mut self, source: &DynamicImage, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        let resized = source
            .resize_exact(w * self.scale, h * self.scale, FilterType::Lanczos3)
            .to_rgb8();
        let (max_x, max_y) = self.img.dimensions();
        for (sx, sy, pixel) in resized.enumerate_pixels() {
            let px = x * self.scale + sx;
            let py = y * self.scale + sy;
            if px < max_x && py < max_y {
                self.img.put_pixel(px, py, *pixel);
            }
        }
    }

    /// Draw one glyph cell at logical coordinates.
    ///
    /// Each font pixel becomes a `scale × text_scale` square. Bold is
    /// synthesized by a one-raster-pixel double strike.
    fn draw_glyph(&mut self, ch: char, x: u32, y: u32, text_scale: u32, style: CharStyle) {
        let cell = text_scale * self.scale;
        if style.code {
            self.fill_rect(x, y, CHAR_WIDTH * text_scale, LINE_HEIGHT * text_scale, CODE_SHADE);
        }

        let bitmap = self.glyphs.get(ch);
        // Vertically center the 12-row glyph inside the 14-unit line.
        let base_x = x * self.scale;
        let base_y = y * self.scale + (LINE_HEIGHT - GlyphCache::HEIGHT) / 2 * cell;

        for (row, column) in bitmap {
            let px = base_x + column * cell;
            let py = base_y + row * cell;
            self.fill_rect_px(px, py, cell, cell, BLACK);
            if style.bold {
                self.fill_rect_px(px + 1, py, cell, cell, BLACK);
            }
        }

        if style.underline {
            let underline_y = y * self.scale + (LINE_HEIGHT * text_scale - 1) * self.scale;
            self.fill_rect_px(
                base_x,
                underline_y,
                CHAR_WIDTH * text_scale * self.scale,
                self.scale,
                BLACK,
            );
        }
    }
}

/// Lazily decoded Spleen 6×12 glyph bitmaps, keyed by character.
///
/// Stored as the list of set (row, column) pairs: glyph cells are sparse
/// and the draw loop only cares about set pixels.
#[derive(Default)]
struct GlyphCache {
    cache: HashMap<char, Vec<(u32, u32)>>,
}

impl GlyphCache {
    const WIDTH: u32 = CHAR_WIDTH;
    const HEIGHT: u32 = 12;

    fn get(&mut self, ch: char) -> Vec<(u32, u32)> {
        if let Some(hit) = self.cache.get(&ch) {
            return hit.clone();
        }
        let pixels = Self::decode(ch);
        self.cache.insert(ch, pixels.clone());
        pixels
    }

    fn decode(ch: char) -> Vec<(u32, u32)> {
        let mut font = match PSF2Font::new(FONT_6X12) {
            Ok(font) => font,
            Err(_) => return Self::fallback_box(),
        };
        let utf8 = ch.to_string();
        match font.glyph_for_utf8(utf8.as_bytes()) {
            Some(glyph) => {
                let mut pixels = Vec::new();
                for (row, bits) in glyph.enumerate() {
                    for (column, on) in bits.enumerate() {
                        if on && (column as u32) < Self::WIDTH && (row as u32) < Self::HEIGHT {
                            pixels.push((row as u32, column as u32));
                        }
                    }
                }
                pixels
            }
            None if ch.is_whitespace() => Vec::new(),
            // Unknown glyph: draw its cell outline.
            None => Self::fallback_box(),
        }
    }

    fn fallback_box() -> Vec<(u32, u32)> {
        let mut pixels = Vec::new();
        for column in 0..Self::WIDTH {
            pixels.push((1, column));
            pixels.push((Self::HEIGHT - 2, column));
        }
        for row in 1..Self::HEIGHT - 1 {
            pixels.push((row, 0));
            pixels.push((row, Self::WIDTH - 1));
        }
        pixels
    }
}
