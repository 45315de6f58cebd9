//! Page flow and PDF object assembly with `lopdf`.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::layout::{CertificateLayout, Field, SectionBlock, Tone};
use super::metrics::{Font, encode_win_ansi, text_width, wrap};
use crate::error::Result;

// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

const MARGIN_LEFT: f32 = 40.0;
const MARGIN_RIGHT: f32 = 40.0;
const MARGIN_TOP: f32 = 40.0;
pub(crate) const MARGIN_BOTTOM: f32 = 30.0;

const INCH: f32 = 72.0;

const TITLE_SIZE: f32 = 22.0;
const TITLE_LEADING: f32 = 24.0;
const TITLE_SPACE_AFTER: f32 = 12.0;

const HEADING_SIZE: f32 = 12.0;
const HEADING_LEADING: f32 = 14.4;
const HEADING_SPACE_BEFORE: f32 = 12.0;
const HEADING_SPACE_AFTER: f32 = 8.0;

const CELL_SIZE: f32 = 9.0;
const CELL_LEADING: f32 = 11.0;
const CELL_PAD_RIGHT: f32 = 5.0;
const CELL_PAD_BOTTOM: f32 = 2.0;

const RULE_WIDTH: f32 = 2.0;
const SECTION_GAP: f32 = 4.0;

/// Label, value, label, value.
const COLUMNS: [f32; 4] = [1.3 * INCH, 2.0 * INCH, 1.3 * INCH, 2.0 * INCH];

type Rgb = (f32, f32, f32);
const BLACK: Rgb = (0.0, 0.0, 0.0);
const GREEN: Rgb = (0.0, 0.5, 0.0);

const fn frame_width() -> f32 {
    PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

/// Left edge of a block of `width` centred in the frame.
fn centred(width: f32) -> f32 {
    MARGIN_LEFT + (frame_width() - width).max(0.0) / 2.0
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

/// Accumulates drawing operations page by page, top to bottom.
struct Flow {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl Flow {
    const fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    /// Start a new page unless `height` still fits on this one.
    fn reserve(&mut self, height: f32) {
        let fresh = self.y >= PAGE_HEIGHT - MARGIN_TOP;
        if self.y - height < MARGIN_BOTTOM && !fresh {
            self.pages.push(std::mem::take(&mut self.ops));
            self.y = PAGE_HEIGHT - MARGIN_TOP;
        }
    }

    fn space(&mut self, height: f32) {
        self.y -= height;
    }

    fn text(&mut self, x: f32, baseline: f32, font: Font, size: f32, color: Rgb, text: &str) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![real(color.0), real(color.1), real(color.2)]),
            Operation::new("Tf", vec![font.resource_name().into(), real(size)]),
            Operation::new("Td", vec![real(x), real(baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rule(&mut self, x: f32, width: f32, y: f32) {
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![real(RULE_WIDTH)]),
            Operation::new("RG", vec![real(0.0), real(0.0), real(0.0)]),
            Operation::new("m", vec![real(x), real(y)]),
            Operation::new("l", vec![real(x + width), real(y)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Draw `lines` from the current cursor with the given leading.
    fn paragraph(&mut self, x: f32, lines: &[String], font: Font, size: f32, leading: f32, color: Rgb) {
        let mut baseline = self.y - size;
        for line in lines {
            self.text(x, baseline, font, size, color, line);
            baseline -= leading;
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        self.pages
    }
}

fn draw_title(flow: &mut Flow, title: &str) {
    flow.reserve(TITLE_LEADING);
    let width = text_width(title, Font::Bold, TITLE_SIZE);
    let x = MARGIN_LEFT + (frame_width() - width) / 2.0;
    flow.paragraph(x, &[title.to_string()], Font::Bold, TITLE_SIZE, TITLE_LEADING, BLACK);
    flow.space(TITLE_LEADING + TITLE_SPACE_AFTER);

    let rule_width = 7.0 * INCH;
    flow.reserve(RULE_WIDTH);
    flow.rule(centred(rule_width), rule_width, flow.y);
    flow.space(RULE_WIDTH + 15.0);
}

/// Wrapped lines of every cell of a row, in column order.
fn row_cells(row: &[Field]) -> Vec<(Vec<String>, Font, Rgb)> {
    let mut cells = Vec::with_capacity(4);
    for (i, field) in row.iter().enumerate().take(2) {
        let label_width = COLUMNS[i * 2] - CELL_PAD_RIGHT;
        let value_width = COLUMNS[i * 2 + 1] - CELL_PAD_RIGHT;
        let color = match field.tone {
            Tone::Normal => BLACK,
            Tone::Success => GREEN,
        };
        cells.push((wrap(field.label, Font::Bold, CELL_SIZE, label_width), Font::Bold, BLACK));
        cells.push((wrap(&field.value, Font::Regular, CELL_SIZE, value_width), Font::Regular, color));
    }
    cells
}

#[allow(clippy::cast_precision_loss)]
fn draw_section(flow: &mut Flow, block: &SectionBlock) {
    flow.space(HEADING_SPACE_BEFORE);
    flow.reserve(HEADING_LEADING + HEADING_SPACE_AFTER + CELL_LEADING);
    flow.paragraph(
        MARGIN_LEFT,
        &[block.title().to_string()],
        Font::Bold,
        HEADING_SIZE,
        HEADING_LEADING,
        BLACK,
    );
    flow.space(HEADING_LEADING + HEADING_SPACE_AFTER);

    let grid_width: f32 = COLUMNS.iter().sum();
    let left = centred(grid_width);
    let usable = PAGE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    for row in &block.rows {
        let cells = row_cells(row);
        let line_count = cells.iter().map(|(lines, _, _)| lines.len()).max().unwrap_or(1);
        let height = line_count as f32 * CELL_LEADING + CELL_PAD_BOTTOM;
        // Rows that fit a page stay together; taller rows break between lines.
        if height <= usable {
            flow.reserve(height);
        }
        for index in 0..line_count {
            flow.reserve(CELL_LEADING);
            let baseline = flow.y - CELL_SIZE;
            let mut x = left;
            for (column, (lines, font, color)) in cells.iter().enumerate() {
                if let Some(line) = lines.get(index) {
                    flow.text(x, baseline, *font, CELL_SIZE, *color, line);
                }
                x += COLUMNS[column];
            }
            flow.space(CELL_LEADING);
        }
        flow.space(CELL_PAD_BOTTOM);
    }
}

/// Lay out and serialize the certificate as a PDF document.
pub fn write_pdf(layout: &CertificateLayout, document_title: &str) -> Result<Vec<u8>> {
    let mut flow = Flow::new();
    draw_title(&mut flow, layout.title);
    for (i, block) in layout.sections.iter().enumerate() {
        draw_section(&mut flow, block);
        if i + 1 < layout.sections.len() {
            flow.space(SECTION_GAP);
        }
    }
    assemble(flow.finish(), document_title)
}

fn font_object(font: Font) -> Object {
    Object::Dictionary(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

fn assemble(pages: Vec<Vec<Operation>>, document_title: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font_object(Font::Regular));
    let bold = doc.add_object(font_object(Font::Bold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular,
            Font::Bold.resource_name() => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(document_title),
        "Producer" => Object::string_literal(concat!("sancert ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
