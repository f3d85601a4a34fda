use crate::{
    compute::{sum, AccountSummary, EntryTotals, Totals},
    data::{Amount, Entry, Error, Expense, Income, Records, Stamp},
    layout::{Canvas, Layout, StyleMap, PAGE_HEIGHT, PAGE_WIDTH},
};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::{io::BufWriter, path::Path};
use tracing::{debug, info};

pub const LOAD_HEADERS: [&str; 8] = [
    "SN",
    "Name",
    "Place",
    "Quantity",
    "Paid",
    "To Paid",
    "Collection",
    "Comments",
];
pub const EXPENSE_HEADERS: [&str; 4] = ["SN", "Expense Name", "Amount", "Notes"];
pub const INCOME_HEADERS: [&str; 4] = ["SN", "Income Name", "Amount", "Notes"];
pub const ACCOUNT_HEADERS: [&str; 8] = [
    "Date",
    "Time",
    "Day",
    "Paid + Collection",
    "Total Income",
    "Total Expense",
    "Profit",
    "Not paid",
];

const TOTAL: &str = "Total";

/// The last row of a table. It is laid out cell for cell against the table's
/// header, so the timestamp fills columns that hold names or notes above it.
#[derive(Debug, Clone, Copy)]
enum TotalsRow<'a> {
    Load(&'a Stamp, EntryTotals),
    Ledger(&'a Stamp, Amount),
    Account(&'a Stamp, AccountSummary),
}

impl TotalsRow<'_> {
    fn cells(self) -> Vec<String> {
        match self {
            Self::Load(stamp, totals) => vec![
                TOTAL.to_owned(),
                stamp.date.clone(),
                stamp.time.clone(),
                totals.quantity.to_string(),
                totals.paid.to_string(),
                totals.to_paid.to_string(),
                totals.collection.to_string(),
                String::new(),
            ],
            Self::Ledger(stamp, sum) => vec![
                TOTAL.to_owned(),
                stamp.date.clone(),
                sum.to_string(),
                stamp.time.clone(),
            ],
            Self::Account(stamp, account) => vec![
                stamp.date.clone(),
                stamp.time.clone(),
                stamp.day.clone(),
                account.paid_plus_collection.to_string(),
                account.total_income.to_string(),
                account.total_expense.to_string(),
                account.profit.to_string(),
                account.not_paid.to_string(),
            ],
        }
    }
}

/// Load rows numbered from 1, then the totals.
fn load_rows(entries: &[Entry], stamp: &Stamp) -> Vec<Vec<String>> {
    let mut totals = EntryTotals::default();
    let mut rows: Vec<Vec<String>> = entries
        .iter()
        .zip(1..)
        .map(|(entry, serial): (&Entry, u32)| {
            totals.add(entry);
            vec![
                serial.to_string(),
                entry.name.clone(),
                entry.place.clone(),
                entry.quantity.to_string(),
                entry.paid.to_string(),
                entry.to_paid.to_string(),
                entry.collection.to_string(),
                entry.comments.clone(),
            ]
        })
        .collect();
    rows.push(TotalsRow::Load(stamp, totals).cells());
    rows
}

fn expense_rows(expenses: &[Expense], stamp: &Stamp) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = expenses
        .iter()
        .map(|expense| {
            vec![
                expense.serial.to_string(),
                expense.name.clone(),
                expense.amount.to_string(),
                expense.comments.clone(),
            ]
        })
        .collect();
    let total = sum(expenses.iter().map(|expense| expense.amount));
    rows.push(TotalsRow::Ledger(stamp, total).cells());
    rows
}

fn income_rows(incomes: &[Income], stamp: &Stamp) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = incomes
        .iter()
        .map(|income| {
            vec![
                income.serial.to_string(),
                income.name.clone(),
                income.amount.to_string(),
                income.comments.clone(),
            ]
        })
        .collect();
    let total = sum(incomes.iter().map(|income| income.amount));
    rows.push(TotalsRow::Ledger(stamp, total).cells());
    rows
}

/// Lays the whole report out on `canvas`: Load, Expenses, Incomes, then the
/// one-row Account summary.
pub(crate) fn write_report<C: Canvas>(
    canvas: &mut C,
    style: &StyleMap,
    stamp: &Stamp,
    records: &Records,
) -> Result<(), Error> {
    let mut layout = Layout::new(canvas, style);
    layout.render_table("Load", &LOAD_HEADERS, || load_rows(&records.entries, stamp))?;
    layout.render_table("Expenses", &EXPENSE_HEADERS, || {
        expense_rows(&records.expenses, stamp)
    })?;
    layout.render_table("Incomes", &INCOME_HEADERS, || {
        income_rows(&records.incomes, stamp)
    })?;
    layout.render_table("Account", &ACCOUNT_HEADERS, || {
        vec![TotalsRow::Account(stamp, Totals::of(records).account()).cells()]
    })?;
    debug!("Report laid out down to {:.1}mm", layout.cursor());
    Ok(())
}

/// Single A4 page drawn with the Helvetica base font.
pub(crate) struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<Self, printpdf::Error> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let layer = doc.get_page(page).get_layer(layer);
        // 0.2mm borders
        layer.set_outline_thickness(0.567);
        Ok(Self { doc, layer, font })
    }

    pub fn save(self, path: &Path) -> Result<(), Error> {
        let file = std::fs::File::create(path).map_err(|source| Error::FileAccess {
            path: path.to_owned(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        self.doc.save(&mut out).map_err(|source| Error::Pdf {
            path: path.to_owned(),
            source,
        })?;
        // printpdf doesn't flush, and dropping the writer would swallow the error
        out.into_inner().map_err(|e| Error::FileAccess {
            path: path.to_owned(),
            source: e.into_error(),
        })?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

/// PDF space starts at the bottom-left corner, layout space at the top-left.
fn point(x: f32, y: f32) -> (Point, bool) {
    (Point::new(Mm(x), Mm(PAGE_HEIGHT - y)), false)
}

impl Canvas for PdfCanvas {
    fn text(&mut self, text: &str, size: f32, x: f32, y: f32) {
        if !text.is_empty() {
            self.layer
                .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - y), &self.font);
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.layer.add_line(Line {
            points: vec![
                point(x, y),
                point(x + width, y),
                point(x + width, y + height),
                point(x, y + height),
            ],
            is_closed: true,
        });
    }
}
