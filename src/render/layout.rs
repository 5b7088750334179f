//! Page layout for battlecard documents.
//!
//! Positions are in millimetres from the top-left corner of an A4 page.
//! The layout follows a simple flowing-cell model: a header band on every
//! page, then for each section a separator, a filled title cell and a
//! wrapped body, with a page number footer.

use super::fonts::BaseFont;
use super::sections::{Section, strip_bold_tags};
use super::template::{FontStyle, Rgb, Template};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 10.0;
/// Distance from the page bottom that forces a new page.
pub const BREAK_MARGIN: f32 = 15.0;
const CELL_PADDING: f32 = 1.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

const HEADER_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const BANNER_HEIGHT: f32 = 10.0;
const BODY_LINE_HEIGHT: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        font: BaseFont,
        size: f32,
        color: Rgb,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

struct Layout<'a> {
    template: &'a Template,
    title: String,
    pages: Vec<Page>,
    y: f32,
    font: BaseFont,
    size: f32,
}

/// Lays out a battlecard's sections into pages.
pub fn layout(competitor: &str, sections: &[Section], template: &Template) -> Vec<Page> {
    let mut doc = Layout {
        template,
        title: format!("Battlecard - {competitor}"),
        pages: Vec::new(),
        y: MARGIN,
        font: template.font.base_font(FontStyle::Regular),
        size: template.font_size,
    };
    doc.add_page();

    for section in sections {
        doc.separator();
        doc.section_title(&section.title);
        doc.section_body(&strip_bold_tags(&section.body));
    }

    doc.finish()
}

impl Layout<'_> {
    fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn set_font(&mut self, style: FontStyle, size: f32) {
        self.font = self.template.font.base_font(style);
        self.size = size;
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn add_page(&mut self) {
        if !self.pages.is_empty() {
            self.footer();
        }
        self.pages.push(Page::default());
        self.y = MARGIN;
        self.header();
    }

    fn finish(mut self) -> Vec<Page> {
        self.footer();
        self.pages
    }

    fn header(&mut self) {
        // Restored afterwards so a break in the middle of a body keeps its font.
        let (font, size) = (self.font, self.size);
        self.set_font(FontStyle::Bold, HEADER_SIZE);
        let title = self.title.clone();
        self.draw_cell(BANNER_HEIGHT, &title, Align::Center, Some(self.template.bg_color));
        self.y += BANNER_HEIGHT + 5.0;
        self.font = font;
        self.size = size;
    }

    fn footer(&mut self) {
        let number = self.pages.len();
        self.y = PAGE_HEIGHT - 15.0;
        self.set_font(FontStyle::Italic, FOOTER_SIZE);
        self.draw_cell(BANNER_HEIGHT, &format!("Page {number}"), Align::Center, None);
    }

    fn separator(&mut self) {
        self.y += 5.0;
        if self.template.border_width > 0.0 {
            let op = DrawOp::Line {
                x1: MARGIN,
                y1: self.y,
                x2: PAGE_WIDTH - MARGIN,
                y2: self.y,
                width: self.template.border_width,
                color: self.template.border_color,
            };
            self.current_page().ops.push(op);
        }
        self.y += 5.0;
    }

    fn section_title(&mut self, title: &str) {
        self.set_font(FontStyle::Bold, TITLE_SIZE);
        self.cell(BANNER_HEIGHT, title, Align::Left, Some(self.template.section_color));
        self.y += 4.0;
    }

    fn section_body(&mut self, body: &str) {
        self.set_font(FontStyle::Regular, self.template.font_size);
        let max_width = self.content_width() - 2.0 * CELL_PADDING;
        for line in wrap(body, self.font, self.size, max_width) {
            self.cell(BODY_LINE_HEIGHT, &line, Align::Left, None);
        }
        self.y += 4.0;
    }

    /// Draws a full-width cell at the cursor and moves to the next line,
    /// starting a new page first when the cell would cross the break margin.
    fn cell(&mut self, h: f32, text: &str, align: Align, fill: Option<Rgb>) {
        if self.y + h > PAGE_HEIGHT - BREAK_MARGIN {
            self.add_page();
        }
        self.draw_cell(h, text, align, fill);
        self.y += h;
    }

    fn draw_cell(&mut self, h: f32, text: &str, align: Align, fill: Option<Rgb>) {
        let w = self.content_width();
        let y = self.y;
        let mut ops = Vec::with_capacity(2);

        if let Some(fill) = fill {
            ops.push(DrawOp::Rect {
                x: MARGIN,
                y,
                w,
                h,
                fill,
            });
        }

        if !text.is_empty() {
            let text_width = self.font.text_width(text, self.size) / PT_PER_MM;
            let x = match align {
                Align::Left => MARGIN + CELL_PADDING,
                Align::Center => MARGIN + (w - text_width) / 2.0,
            };
            ops.push(DrawOp::Text {
                x,
                y: y + 0.5 * h + 0.3 * self.size / PT_PER_MM,
                font: self.font,
                size: self.size,
                color: self.template.header_color,
                text: text.to_string(),
            });
        }

        self.current_page().ops.extend(ops);
    }
}

fn width_mm(font: BaseFont, size: f32, text: &str) -> f32 {
    font.text_width(text, size) / PT_PER_MM
}

/// Breaks text into lines no wider than `max_width` millimetres. Explicit
/// newlines are kept; words wider than a line are split by character.
pub fn wrap(text: &str, font: BaseFont, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if width_mm(font, size, &candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                current.push(ch);
                if current.chars().count() > 1 && width_mm(font, size, &current) > max_width {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }

        lines.push(current);
    }

    lines
}
