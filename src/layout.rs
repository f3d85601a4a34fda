use crate::data::Error;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A4 portrait, in millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const LEFT_MARGIN: f32 = 5.0;
pub const TOP_MARGIN: f32 = 2.0;

pub const ROW_HEIGHT: f32 = 6.0;
const TITLE_HEIGHT: f32 = 2.0;
/// Space between a title and its header, and after each table.
const GAP: f32 = 10.0;
const CELL_MARGIN: f32 = 1.0;

pub const TITLE_SIZE: f32 = 10.0;
pub const HEADER_SIZE: f32 = 8.0;
pub const DATA_SIZE: f32 = 7.0;
/// Column widths are measured with the title font still selected.
const MEASURE_SIZE: f32 = TITLE_SIZE;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Helvetica advance widths (1/1000 em) for ' ' through '~'.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];
const FALLBACK_WIDTH: u16 = 556;

/// Rendered width of `text` in Helvetica at `size` points, in millimetres.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let width = (c as usize)
                .checked_sub(' ' as usize)
                .and_then(|i| HELVETICA_WIDTHS.get(i))
                .copied()
                .unwrap_or(FALLBACK_WIDTH);
            u32::from(width)
        })
        .sum();
    units as f32 * size / 1000.0 * MM_PER_PT
}

const DEFAULT_PADDING: [(&str, f32); 9] = [
    ("Name", 25.0),
    ("Comments", 40.0),
    ("Notes", 25.0),
    ("Place", 10.0),
    ("Income Name", 10.0),
    ("Expense Name", 10.0),
    ("Date", 5.0),
    ("Time", 5.0),
    ("Day", 5.0),
];

/// Extra room (mm) given to a column on top of its header text, keyed by the
/// header. Headers that aren't listed are exactly as wide as their text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StyleMap {
    padding: HashMap<String, f32>,
}

impl Default for StyleMap {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING
                .iter()
                .map(|&(header, extra)| (header.to_owned(), extra))
                .collect(),
        }
    }
}

impl StyleMap {
    pub fn with_padding(mut self, header: impl Into<String>, extra: f32) -> Self {
        self.padding.insert(header.into(), extra);
        self
    }

    pub fn padding(&self, header: &str) -> f32 {
        self.padding.get(header).copied().unwrap_or_default()
    }

    pub fn column_widths(&self, headers: &[&str]) -> Vec<f32> {
        headers
            .iter()
            .map(|header| text_width(header, MEASURE_SIZE) + self.padding(header))
            .collect()
    }
}

/// Drawing primitives the layout needs. Coordinates are millimetres from the
/// top-left corner of the page; `y` of a text is its baseline.
pub(crate) trait Canvas {
    fn text(&mut self, text: &str, size: f32, x: f32, y: f32);
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32);
}

/// Lays tables out one below the other, keeping track of the vertical cursor.
pub(crate) struct Layout<'a, C> {
    canvas: &'a mut C,
    style: &'a StyleMap,
    y: f32,
}

impl<'a, C: Canvas> Layout<'a, C> {
    pub fn new(canvas: &'a mut C, style: &'a StyleMap) -> Self {
        Self {
            canvas,
            style,
            y: TOP_MARGIN,
        }
    }

    pub fn cursor(&self) -> f32 {
        self.y
    }

    /// Title, header, then whatever `rows` returns, every cell bordered. `rows`
    /// is only called once the header is down, and each of its rows must have
    /// one cell per header.
    pub fn render_table<F>(&mut self, title: &str, headers: &[&str], rows: F) -> Result<(), Error>
    where
        F: FnOnce() -> Vec<Vec<String>>,
    {
        self.canvas.text(
            title,
            TITLE_SIZE,
            LEFT_MARGIN + CELL_MARGIN,
            baseline(self.y, TITLE_HEIGHT, TITLE_SIZE),
        );
        self.y += TITLE_HEIGHT + GAP;

        let widths = self.style.column_widths(headers);
        self.row(headers, &widths, HEADER_SIZE);

        let rows = rows();
        for row in &rows {
            if row.len() != headers.len() {
                return Err(Error::RowShape {
                    table: title.to_owned(),
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            self.row(row.as_slice(), &widths, DATA_SIZE);
        }
        self.y += GAP;
        debug!("Table {title:?}: {} rows, ends at {:.1}mm", rows.len(), self.y);
        if self.y > PAGE_HEIGHT {
            warn!("Table {title:?} runs past the bottom of the page");
        }
        Ok(())
    }

    fn row<S: AsRef<str>>(&mut self, cells: &[S], widths: &[f32], size: f32) {
        let mut x = LEFT_MARGIN;
        for (cell, &width) in cells.iter().zip(widths) {
            let cell = cell.as_ref();
            self.canvas.rect(x, self.y, width, ROW_HEIGHT);
            self.canvas.text(
                cell,
                size,
                x + (width - text_width(cell, size)) / 2.0,
                baseline(self.y, ROW_HEIGHT, size),
            );
            x += width;
        }
        self.y += ROW_HEIGHT;
    }
}

/// Text sits vertically centred in a cell of `height` starting at `top`.
fn baseline(top: f32, height: f32, size: f32) -> f32 {
    top + height / 2.0 + 0.3 * size * MM_PER_PT
}
