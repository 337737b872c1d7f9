use std::io::BufWriter;

use printpdf::*;

use crate::error::{Result, TitheError};
use crate::fmt::money_ascii;
use crate::reports::PeriodReport;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 15.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 24.0;
const SUBTITLE_SIZE: f32 = 12.0;

const DEPARTMENT: &str = "The Tithe Department";

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| TitheError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| TitheError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn centered(&self, s: &str, size: f32, bold: bool) {
        let x = (PAGE_W - approx_text_width(s, size)) / 2.0;
        self.text(s, x.max(MARGIN_LEFT), size, bold);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, subtitle: &str) {
        self.centered(DEPARTMENT, FONT_SIZE, true);
        self.y += 10.0;
        self.centered("FINANCIAL REPORT", TITLE_SIZE, true);
        self.y += 8.0;
        self.centered(&subtitle.to_uppercase(), SUBTITLE_SIZE, false);
        self.y += 6.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 6.0;
    }

    fn footer(&mut self) {
        self.y = PAGE_H - MARGIN_BOTTOM + 10.0;
        let ts = chrono::Local::now()
            .format("Generated on: %Y-%m-%d %H:%M")
            .to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        let right = PAGE_W - MARGIN_RIGHT - approx_text_width(DEPARTMENT, 8.0);
        self.text(DEPARTMENT, right, 8.0, false);
    }

    fn row_cells(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.row_cells(cols, headers, true);
        self.y += ROW_H / 2.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += ROW_H;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        self.row_cells(cols, values, bold);
        self.y += ROW_H;
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H * 2.0);
        self.text(label, MARGIN_LEFT, 14.0, true);
        self.y += ROW_H * 1.5;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.y -= ROW_H / 2.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += ROW_H / 2.0 + 1.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| TitheError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| TitheError::Pdf(e.to_string()))
    }
}

/// Fellowship table with a TOTAL row, the best/lowest summary, then the weekly
/// trends on a second page.
pub fn render_period_report(report: &PeriodReport) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Financial Report")?;
    pdf.header(&report.period.title());

    let cols = &[
        Col { width: 65.0, align: Align::Left },
        Col { width: 65.0, align: Align::Left },
        Col { width: 50.0, align: Align::Right },
    ];
    pdf.table_header(cols, &["FELLOWSHIP", "PASTOR", "AMOUNT"]);
    for f in &report.breakdown {
        let amt = money_ascii(f.amount);
        pdf.table_row(cols, &[f.fellowship.name(), f.fellowship.pastor(), &amt], false);
    }
    pdf.separator();
    pdf.table_row(cols, &["TOTAL", "", &money_ascii(report.total)], true);
    pdf.blank_row();

    let summary = &[
        Col { width: 100.0, align: Align::Left },
        Col { width: 80.0, align: Align::Left },
    ];
    pdf.table_header(summary, &["METRIC", "VALUE"]);
    pdf.table_row(
        summary,
        &["Best Performing Fellowship", &report.best.names.to_uppercase()],
        false,
    );
    pdf.table_row(
        summary,
        &["Lowest Performing Fellowship", &report.worst.names.to_uppercase()],
        false,
    );
    pdf.table_row(summary, &["Gifts Recorded", &report.stats.gifts.to_string()], false);
    pdf.table_row(summary, &["Distinct Givers", &report.stats.givers.to_string()], false);
    pdf.table_row(summary, &["Average Gift", &money_ascii(report.stats.average_gift)], false);
    pdf.footer();

    pdf.new_page();
    pdf.section_label("Weekly Trends");
    let weekly = &[
        Col { width: 40.0, align: Align::Left },
        Col { width: 23.0, align: Align::Right },
        Col { width: 23.0, align: Align::Right },
        Col { width: 23.0, align: Align::Right },
        Col { width: 23.0, align: Align::Right },
        Col { width: 23.0, align: Align::Right },
        Col { width: 25.0, align: Align::Right },
    ];
    pdf.table_header(
        weekly,
        &["FELLOWSHIP", "WEEK 1", "WEEK 2", "WEEK 3", "WEEK 4", "WEEK 5", "TOTAL"],
    );
    let mut week_totals = [0.0f64; 5];
    for row in &report.weekly {
        let cells: Vec<String> = row
            .weeks
            .iter()
            .map(|v| format!("{v:.2}"))
            .chain(std::iter::once(format!("{:.2}", row.total())))
            .collect();
        let mut values: Vec<&str> = vec![row.fellowship.name()];
        values.extend(cells.iter().map(String::as_str));
        pdf.table_row(weekly, &values, false);
        for (t, v) in week_totals.iter_mut().zip(row.weeks) {
            *t += v;
        }
    }
    pdf.separator();
    let totals: Vec<String> = week_totals
        .iter()
        .map(|v| format!("{v:.2}"))
        .chain(std::iter::once(format!("{:.2}", week_totals.iter().sum::<f64>())))
        .collect();
    let mut values: Vec<&str> = vec!["TOTAL"];
    values.extend(totals.iter().map(String::as_str));
    pdf.table_row(weekly, &values, true);
    pdf.footer();

    pdf.to_bytes()
}
