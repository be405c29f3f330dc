// Telemetry PDF builder - plans a page layout, then renders it with printpdf
use crate::domain::telemetry::DeviceSection;
use crate::infrastructure::config::ReportLabels;
use anyhow::anyhow;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb};

// A4 portrait, millimetres
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 14.0;
const MARGIN_RIGHT: f32 = 14.0;
const MARGIN_TOP: f32 = 16.0;
const MARGIN_BOTTOM: f32 = 14.0;

const TEXT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

const HEADER_ROW_HEIGHT: f32 = 8.0;
const BODY_ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 1.8;
const CELL_PADDING_Y: f32 = 1.2;
const TABLE_FONT_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 12.0;
const HEADING_ADVANCE: f32 = 6.0;
const SECTION_SPACING: f32 = 5.0;

const HEADER_FILL: Rgb8 = Rgb8(66, 139, 202);
const BLACK: Rgb8 = Rgb8(0, 0, 0);
const WHITE: Rgb8 = Rgb8(255, 255, 255);

/// Relative widths of entity name, unit, last, min, max, avg.
const COLUMN_WEIGHTS: [f32; 6] = [52.0, 20.0, 27.5, 27.5, 27.5, 27.5];

const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// One drawing instruction. Coordinates are millimetres from the top-left
/// corner; `y` of a text op is its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Rgb8,
    },
    Cell {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb8>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportLayout {
    pub pages: Vec<Vec<LayoutOp>>,
}

impl ReportLayout {
    /// Text of every text op in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flatten()
            .filter_map(|op| match op {
                LayoutOp::Text { text, .. } => Some(text.as_str()),
                LayoutOp::Cell { .. } => None,
            })
            .collect()
    }
}

pub struct PdfReportOptions<'a> {
    pub title: &'a str,
    pub company_name: Option<&'a str>,
    pub dashboard_name: Option<&'a str>,
    pub date_range: &'a str,
    pub sections: &'a [DeviceSection],
    pub generated_at: &'a str,
    pub labels: &'a ReportLabels,
}

impl PdfReportOptions<'_> {
    fn report_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            &self.labels.default_title
        } else {
            title
        }
    }
}

/// Build the report and return the encoded PDF.
pub fn build_telemetry_pdf(options: &PdfReportOptions) -> anyhow::Result<Vec<u8>> {
    let layout = plan_layout(options);
    render(options.report_title(), &layout)
}

struct Cursor {
    pages: Vec<Vec<LayoutOp>>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: MARGIN_TOP,
        }
    }

    fn push(&mut self, op: LayoutOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    fn text(&mut self, text: impl Into<String>, size: f32, style: FontStyle, color: Rgb8) {
        let y = self.y;
        self.push(LayoutOp::Text {
            text: text.into(),
            x: MARGIN_LEFT,
            y,
            size,
            style,
            color,
        });
    }

    /// Write wrapped lines `advance` apart and leave the cursor `advance`
    /// below the last one.
    fn paragraph(&mut self, lines: Vec<String>, size: f32, style: FontStyle, advance: f32) {
        for line in lines {
            self.text(line, size, style, BLACK);
            self.y += advance;
        }
    }

    /// Start a new page when `height` does not fit above the bottom margin.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y + height <= PAGE_HEIGHT - MARGIN_BOTTOM {
            return false;
        }
        self.pages.push(Vec::new());
        self.y = MARGIN_TOP;
        true
    }
}

/// A table row with every cell already wrapped to its column.
struct TableRow {
    cells: Vec<Vec<String>>,
    height: f32,
}

impl TableRow {
    fn new(cells: &[String; 6], min_height: f32, style: FontStyle) -> Self {
        let cells: Vec<Vec<String>> = cells
            .iter()
            .zip(column_widths())
            .map(|(cell, width)| wrap_to_width(cell, width - 2.0 * CELL_PADDING, TABLE_FONT_SIZE, style))
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
        let height = (lines as f32 * line_height(TABLE_FONT_SIZE) + 2.0 * CELL_PADDING_Y).max(min_height);

        Self { cells, height }
    }
}

/// Plan every page of the report. Pure; identical input gives an identical
/// layout.
pub fn plan_layout(options: &PdfReportOptions) -> ReportLayout {
    let mut cursor = Cursor::new();

    let title = wrap_to_width(options.report_title(), TEXT_WIDTH, 16.0, FontStyle::Regular);
    cursor.paragraph(title, 16.0, FontStyle::Regular, 10.0);

    if let Some(company) = non_blank(options.company_name) {
        cursor.paragraph(wrap_to_width(company, TEXT_WIDTH, 11.0, FontStyle::Regular), 11.0, FontStyle::Regular, 6.0);
    }

    if let Some(dashboard) = non_blank(options.dashboard_name) {
        let line = format!("{}: {}", options.labels.dashboard, dashboard);
        cursor.paragraph(wrap_to_width(&line, TEXT_WIDTH, 11.0, FontStyle::Regular), 11.0, FontStyle::Regular, 6.0);
    }

    cursor.text(options.date_range, 10.0, FontStyle::Regular, BLACK);
    cursor.y += 8.0;

    let header = TableRow::new(&options.labels.table_headers(), HEADER_ROW_HEIGHT, FontStyle::Bold);
    let sections: Vec<&DeviceSection> = options.sections.iter().filter(|s| !s.rows.is_empty()).collect();

    for (index, section) in sections.iter().enumerate() {
        let rows: Vec<TableRow> = section
            .rows
            .iter()
            .map(|row| TableRow::new(&row.cells(), BODY_ROW_HEIGHT, FontStyle::Regular))
            .collect();

        let heading = format!("{}: {}", options.labels.device, section.device_name);
        let heading = wrap_to_width(&heading, TEXT_WIDTH, HEADING_SIZE, FontStyle::Bold);

        // keep the heading together with the table header and first row
        let first_row = rows.first().map_or(BODY_ROW_HEIGHT, |r| r.height);
        cursor.ensure_space(heading.len() as f32 * HEADING_ADVANCE + header.height + first_row);
        cursor.paragraph(heading, HEADING_SIZE, FontStyle::Bold, HEADING_ADVANCE);

        draw_row(&mut cursor, &header, Some(HEADER_FILL), FontStyle::Bold, WHITE);
        for row in &rows {
            if cursor.ensure_space(row.height) {
                draw_row(&mut cursor, &header, Some(HEADER_FILL), FontStyle::Bold, WHITE);
            }
            draw_row(&mut cursor, row, None, FontStyle::Regular, BLACK);
        }

        if index + 1 < sections.len() {
            cursor.y += SECTION_SPACING;
        }
    }

    cursor.y += 10.0;
    cursor.ensure_space(5.0);
    let generated = format!("{} {}", options.labels.generated_at, options.generated_at);
    cursor.text(generated, 9.0, FontStyle::Regular, BLACK);
    cursor.y += 5.0;
    cursor.ensure_space(0.0);
    cursor.text(options.labels.attribution.as_str(), 9.0, FontStyle::Regular, BLACK);

    ReportLayout { pages: cursor.pages }
}

/// Draw one row; each cell's lines are centred vertically in the row.
fn draw_row(cursor: &mut Cursor, row: &TableRow, fill: Option<Rgb8>, style: FontStyle, color: Rgb8) {
    let line = line_height(TABLE_FONT_SIZE);
    let mut x = MARGIN_LEFT;
    for (lines, width) in row.cells.iter().zip(column_widths()) {
        cursor.push(LayoutOp::Cell {
            x,
            y: cursor.y,
            width,
            height: row.height,
            fill,
        });

        let top = cursor.y + (row.height - lines.len() as f32 * line) / 2.0;
        for (i, text) in lines.iter().enumerate() {
            cursor.push(LayoutOp::Text {
                text: text.clone(),
                x: x + CELL_PADDING,
                y: top + line * i as f32 + line / 2.0 + TABLE_FONT_SIZE * PT_TO_MM / 3.0,
                size: TABLE_FONT_SIZE,
                style,
                color,
            });
        }
        x += width;
    }
    cursor.y += row.height;
}

fn column_widths() -> [f32; 6] {
    let total: f32 = COLUMN_WEIGHTS.iter().sum();
    COLUMN_WEIGHTS.map(|w| w / total * TEXT_WIDTH)
}

fn line_height(font_size: f32) -> f32 {
    font_size * PT_TO_MM * LINE_SPACING
}

/// Estimated Helvetica advance per character in mm. Digits are 0.556 em,
/// which also covers average lower-case text.
fn glyph_width(font_size: f32, style: FontStyle) -> f32 {
    let em = match style {
        FontStyle::Regular => 0.56,
        FontStyle::Bold => 0.61,
    };
    font_size * em * PT_TO_MM
}

/// Break `text` into lines that fit in `width` mm. Lines break between words;
/// a word longer than a line is split across lines, so no character is lost.
fn wrap_to_width(text: &str, width: f32, font_size: f32, style: FontStyle) -> Vec<String> {
    let max_chars = ((width / glyph_width(font_size, style)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(max_chars) {
            if current_len > 0 && current_len + 1 + chunk.len() <= max_chars {
                current.push(' ');
                current_len += 1;
            } else if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.extend(chunk);
            current_len += chunk.len();
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn render(title: &str, layout: &ReportLayout) -> anyhow::Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("failed to load Helvetica: {:?}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("failed to load Helvetica-Bold: {:?}", e))?;

    for (index, ops) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        for op in ops {
            draw(&layer, op, &regular, &bold);
        }
    }

    doc.save_to_bytes().map_err(|e| anyhow!("failed to encode PDF: {:?}", e))
}

fn draw(layer: &PdfLayerReference, op: &LayoutOp, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    match op {
        LayoutOp::Text {
            text,
            x,
            y,
            size,
            style,
            color,
        } => {
            let font = match style {
                FontStyle::Regular => regular,
                FontStyle::Bold => bold,
            };
            layer.set_fill_color(to_color(*color));
            layer.use_text(text.as_str(), *size, Mm(*x), Mm(PAGE_HEIGHT - *y), font);
        }
        LayoutOp::Cell {
            x,
            y,
            width,
            height,
            fill,
        } => {
            let top = PAGE_HEIGHT - *y;
            let bottom = top - *height;
            let corners = vec![
                (Point::new(Mm(*x), Mm(bottom)), false),
                (Point::new(Mm(*x + *width), Mm(bottom)), false),
                (Point::new(Mm(*x + *width), Mm(top)), false),
                (Point::new(Mm(*x), Mm(top)), false),
            ];
            let mode = match fill {
                Some(color) => {
                    layer.set_fill_color(to_color(*color));
                    PaintMode::FillStroke
                }
                None => PaintMode::Stroke,
            };
            layer.set_outline_color(to_color(Rgb8(200, 200, 200)));
            layer.set_outline_thickness(0.5);
            layer.add_polygon(Polygon {
                rings: vec![corners],
                mode,
                winding_order: WindingOrder::NonZero,
            });
        }
    }
}

fn to_color(Rgb8(r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::{AggregateValues, ReportRow};

    fn row(name: &str, last: Option<f64>) -> ReportRow {
        ReportRow::new(
            name.to_string(),
            "°C".to_string(),
            AggregateValues {
                last,
                min: Some(f64::NAN),
                max: None,
                avg: Some(42.0),
            },
        )
    }

    fn options<'a>(sections: &'a [DeviceSection], labels: &'a ReportLabels) -> PdfReportOptions<'a> {
        PdfReportOptions {
            title: "Weekly",
            company_name: Some("Acme"),
            dashboard_name: Some("Greenhouse"),
            date_range: "2026-10-01 – 2026-10-07",
            sections,
            generated_at: "2026-10-08 09:00:00",
            labels,
        }
    }

    #[test]
    fn test_layout_order_and_headings() {
        let labels = ReportLabels::default();
        let sections = vec![
            DeviceSection::new("Sensor A".to_string(), vec![row("Temperature", Some(10.0))]),
            DeviceSection::new("Sensor B".to_string(), Vec::new()),
        ];
        let layout = plan_layout(&options(&sections, &labels));
        let texts = layout.texts();

        assert_eq!(texts[0], "Weekly");
        assert_eq!(texts[1], "Acme");
        assert_eq!(texts[2], "Dashboard: Greenhouse");
        assert_eq!(texts[3], "2026-10-01 – 2026-10-07");
        assert_eq!(texts[4], "Device: Sensor A");
        assert_eq!(&texts[5..11], &["Entity", "Unit", "Last", "Min", "Max", "Avg"]);
        assert_eq!(&texts[11..17], &["Temperature", "°C", "10", "—", "—", "42"]);
        assert_eq!(texts[17], "Generated at: 2026-10-08 09:00:00");
        assert_eq!(texts[18], "Generated by the IoT console");
        assert!(!texts.iter().any(|t| t.contains("Sensor B")));
    }

    #[test]
    fn test_header_cells_are_filled() {
        let labels = ReportLabels::default();
        let sections = vec![DeviceSection::new("A".to_string(), vec![row("T", None)])];
        let layout = plan_layout(&options(&sections, &labels));

        let fills: Vec<Option<Rgb8>> = layout.pages[0]
            .iter()
            .filter_map(|op| match op {
                LayoutOp::Cell { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 12);
        assert!(fills[..6].iter().all(|f| *f == Some(HEADER_FILL)));
        assert!(fills[6..].iter().all(|f| f.is_none()));
    }

    #[test]
    fn test_blank_optional_lines_are_skipped() {
        let labels = ReportLabels::default();
        let sections = vec![DeviceSection::new("A".to_string(), vec![row("T", None)])];
        let opts = PdfReportOptions {
            title: "  ",
            company_name: Some(" "),
            dashboard_name: None,
            ..options(&sections, &labels)
        };
        let layout = plan_layout(&opts);
        let texts = layout.texts();

        assert_eq!(texts[0], "Telemetry Report");
        assert_eq!(texts[1], "2026-10-01 – 2026-10-07");
        assert_eq!(texts[2], "Device: A");
    }

    #[test]
    fn test_long_tables_break_pages_and_repeat_header() {
        let labels = ReportLabels::default();
        let rows: Vec<ReportRow> = (0..60).map(|i| row(&format!("Sensor {}", i), Some(i as f64))).collect();
        let sections = vec![DeviceSection::new("A".to_string(), rows)];
        let layout = plan_layout(&options(&sections, &labels));

        assert!(layout.pages.len() >= 2);
        let second_page_texts: Vec<&str> = layout.pages[1]
            .iter()
            .filter_map(|op| match op {
                LayoutOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(&second_page_texts[..6], &["Entity", "Unit", "Last", "Min", "Max", "Avg"]);

        for op in layout.pages.iter().flatten() {
            if let LayoutOp::Cell { y, height, .. } = op {
                assert!(y + height <= PAGE_HEIGHT - MARGIN_BOTTOM);
            }
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let labels = ReportLabels::default();
        let sections = vec![
            DeviceSection::new("A".to_string(), vec![row("T", Some(1.5)), row("H", None)]),
            DeviceSection::new("B".to_string(), vec![row("P", Some(3.0))]),
        ];
        let first = plan_layout(&options(&sections, &labels));
        let second = plan_layout(&options(&sections, &labels));
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrap_to_width() {
        assert_eq!(wrap_to_width("short", 40.0, 10.0, FontStyle::Regular), vec!["short"]);
        assert_eq!(wrap_to_width("", 40.0, 10.0, FontStyle::Regular), vec![""]);

        let lines = wrap_to_width("north hall supply air temperature", 20.0, 10.0, FontStyle::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "north hall supply air temperature");

        let long = "x".repeat(40);
        let lines = wrap_to_width(&long, 20.0, 10.0, FontStyle::Regular);
        assert_eq!(lines.concat(), long);
        assert!(lines.iter().all(|l| l.chars().count() as f32 * glyph_width(10.0, FontStyle::Regular) <= 20.0));
    }

    #[test]
    fn test_long_values_wrap_instead_of_truncating() {
        let labels = ReportLabels::default();
        let values = AggregateValues {
            last: Some(123456789012.25),
            min: Some(1.2345678e-9),
            max: Some(-98765432109876.5),
            avg: Some(2.0),
        };
        let long = ReportRow::new("Flow".to_string(), "m³/h".to_string(), values);
        let sections = vec![DeviceSection::new("A".to_string(), vec![long, row("T", Some(1.0))])];
        let layout = plan_layout(&options(&sections, &labels));

        let texts = layout.texts();
        assert!(!texts.iter().any(|t| t.ends_with("...")));
        let joined = texts.concat();
        for literal in ["123456789012.25", "0.0000000012345678", "-98765432109876.5"] {
            assert!(joined.contains(literal), "{} missing from {:?}", literal, texts);
        }

        let widths = column_widths();
        let stat_column = widths[2] - 2.0 * CELL_PADDING;
        assert!(texts
            .iter()
            .all(|t| t.chars().count() as f32 * glyph_width(TABLE_FONT_SIZE, FontStyle::Regular) <= TEXT_WIDTH));
        assert!(texts
            .iter()
            .filter(|t| t.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-'))
            .all(|t| t.chars().count() as f32 * glyph_width(TABLE_FONT_SIZE, FontStyle::Regular) <= stat_column));

        let heights: Vec<f32> = layout.pages[0]
            .iter()
            .filter_map(|op| match op {
                LayoutOp::Cell { height, fill: None, .. } => Some(*height),
                _ => None,
            })
            .collect();
        assert_eq!(heights.len(), 12);
        assert!(heights[..6].iter().all(|h| *h > BODY_ROW_HEIGHT));
        assert!(heights[6..].iter().all(|h| *h == BODY_ROW_HEIGHT));
    }

    #[test]
    fn test_long_device_names_wrap_within_page() {
        let labels = ReportLabels::default();
        let name = "Rooftop air handling unit number seven serving the north laboratory wing and the adjacent clean rooms";
        let sections = vec![DeviceSection::new(name.to_string(), vec![row("T", Some(1.0))])];
        let layout = plan_layout(&options(&sections, &labels));

        let heading: Vec<&str> = layout.pages[0]
            .iter()
            .filter_map(|op| match op {
                LayoutOp::Text {
                    text,
                    size,
                    style: FontStyle::Bold,
                    ..
                } if *size == HEADING_SIZE => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert!(heading.len() > 1);
        assert_eq!(heading.join(" "), format!("Device: {}", name));
        assert!(heading
            .iter()
            .all(|line| line.chars().count() as f32 * glyph_width(HEADING_SIZE, FontStyle::Bold) <= TEXT_WIDTH));
    }

    #[test]
    fn test_build_produces_pdf_bytes() {
        let labels = ReportLabels::default();
        let sections = vec![DeviceSection::new("A".to_string(), vec![row("T", Some(1.0))])];
        let bytes = build_telemetry_pdf(&options(&sections, &labels)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
