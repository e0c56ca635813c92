//! # Virtual Layout
//!
//! An isolated, explicitly-owned visual tree for composing one document.
//!
//! The composer builds a [`LayoutContext`] per request: a vertical flow
//! container of fixed logical width that children are appended to in
//! document order. Measurement and rasterization read the tree without
//! touching any process-wide state, so concurrent compositions never
//! interfere; teardown is by ownership when the context drops, on the
//! error path included.
//!
//! Logical units match the wire model: the container is 300 units wide and
//! text at scale 1 uses a 6×12 glyph cell.

pub mod raster;

pub use raster::rasterize;

use std::collections::BTreeMap;

use image::DynamicImage;

use crate::document::types::StyleMap;

/// Fixed logical width of the composition container.
pub const CONTAINER_WIDTH: u32 = 300;

/// Logical glyph cell at text scale 1.
pub const CHAR_WIDTH: u32 = 6;
/// Logical line advance at text scale 1.
pub const LINE_HEIGHT: u32 = 14;
/// Logical height of one table row (text line plus padding and rule).
pub const TABLE_ROW_HEIGHT: u32 = 18;

/// Table cell geometry in logical units.
#[derive(Debug, Clone, Copy)]
pub struct TableRowMetrics {
    pub row_height: u32,
    pub cell_pad_x: u32,
    pub cell_pad_y: u32,
}

impl Default for TableRowMetrics {
    fn default() -> Self {
        Self {
            row_height: TABLE_ROW_HEIGHT,
            cell_pad_x: 2,
            cell_pad_y: 2,
        }
    }
}

/// One styled run of characters within a text line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    /// Inline code: rendered over a shaded background.
    pub code: bool,
}

/// One logical line of text. `scale` multiplies the glyph cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub scale: u32,
}

impl TextLine {
    /// A plain single-span line at the given scale.
    pub fn plain(text: impl Into<String>, scale: u32) -> Self {
        Self {
            spans: vec![TextSpan {
                text: text.into(),
                ..Default::default()
            }],
            scale,
        }
    }

    /// An empty spacer line.
    pub fn blank() -> Self {
        Self {
            spans: Vec::new(),
            scale: 1,
        }
    }

    /// Total character count across spans.
    pub fn char_count(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }
}

/// A one-dimensional barcode symbol: encoded modules plus rendering knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarSymbol {
    /// Bar/space modules, 1 = bar.
    pub modules: Vec<u8>,
    /// Logical width of one module.
    pub module_width: u32,
    /// Logical height of the bars.
    pub bar_height: u32,
    /// Human-readable payload rendered under the bars, when requested.
    pub label: Option<String>,
}

/// A table grid with stringified cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGrid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// Number of columns: the widest of header and body rows.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    /// Number of rendered rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + usize::from(!self.header.is_empty())
    }
}

/// Content of a visual node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Vertical flow of children, appended in document order.
    Flow(Vec<VisualNode>),
    /// Styled text lines.
    Text(Vec<TextLine>),
    /// A decoded raster (image or QR matrix).
    Raster(DynamicImage),
    /// A one-dimensional barcode stretched to the container width.
    Bars(BarSymbol),
    /// A bordered grid.
    Table(TableGrid),
}

/// One positioned element of the composed document.
#[derive(Debug, Clone)]
pub struct VisualNode {
    pub kind: NodeKind,
    /// Requested logical width; `None` means the kind's natural width.
    pub width: Option<u32>,
    /// Requested logical height; `None` means the kind's natural height.
    pub height: Option<u32>,
    /// Center horizontally inside the container.
    pub centered: bool,
    /// Verbatim style entries carried for the preview surface. Recognized
    /// keys have already been folded into `width`/`height`.
    pub styles: StyleMap,
}

impl VisualNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            width: None,
            height: None,
            centered: false,
            styles: BTreeMap::new(),
        }
    }

    /// Resolved logical size inside a container of the given width.
    pub fn measure(&self, container_width: u32) -> (u32, u32) {
        match &self.kind {
            NodeKind::Flow(children) => {
                let height = children
                    .iter()
                    .map(|child| child.measure(container_width).1)
                    .sum();
                (container_width, height)
            }
            NodeKind::Text(lines) => (container_width, text_height(lines, container_width)),
            NodeKind::Raster(img) => {
                let width = self.width.unwrap_or(img.width()).min(container_width.max(1));
                let height = self.height.unwrap_or_else(|| {
                    // Keep the source aspect when only width was given.
                    if self.width.is_some() && img.width() > 0 {
                        (img.height() as f32 * width as f32 / img.width() as f32).round() as u32
                    } else {
                        img.height()
                    }
                });
                (width, height)
            }
            NodeKind::Bars(symbol) => {
                let label_height = if symbol.label.is_some() { LINE_HEIGHT } else { 0 };
                let height = self.height.unwrap_or(symbol.bar_height) + label_height;
                // The symbol stretches to the full container width.
                (container_width, height)
            }
            NodeKind::Table(grid) => {
                let height = grid.row_count() as u32 * TABLE_ROW_HEIGHT;
                (container_width, height)
            }
        }
    }
}

/// Height of wrapped text lines at the given container width.
fn text_height(lines: &[TextLine], container_width: u32) -> u32 {
    lines
        .iter()
        .map(|line| {
            let advance = line.scale.max(1) * LINE_HEIGHT;
            let per_line = (container_width / (line.scale.max(1) * CHAR_WIDTH)).max(1) as usize;
            let rows = line.char_count().div_ceil(per_line).max(1);
            rows as u32 * advance
        })
        .sum()
}

/// The owned composition container: fixed width, natural height.
#[derive(Debug)]
pub struct LayoutContext {
    width: u32,
    root: VisualNode,
}

impl LayoutContext {
    /// Create an empty container of the given logical width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            root: VisualNode::new(NodeKind::Flow(Vec::new())),
        }
    }

    /// Append a child node. Append order is document order.
    pub fn push(&mut self, node: VisualNode) {
        if let NodeKind::Flow(children) = &mut self.root.kind {
            children.push(node);
        }
    }

    /// Measure the realized container: (width, natural height).
    pub fn measure(&self) -> (u32, u32) {
        let (_, height) = self.root.measure(self.width);
        (self.width, height)
    }

    /// The container's logical width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Borrow the composed tree.
    pub fn root(&self) -> &VisualNode {
        &self.root
    }
}
