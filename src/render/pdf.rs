use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::fonts::{BaseFont, encode};
use super::layout::{DrawOp, PAGE_HEIGHT, PAGE_WIDTH, Page};
use super::template::Rgb;
use crate::error::{AppError, AppResult};

const PT_PER_MM: f32 = 72.0 / 25.4;

fn num(value: f32) -> Object {
    ((value * 100.0).round() / 100.0).into()
}

fn pt(mm: f32) -> Object {
    num(mm * PT_PER_MM)
}

/// Page y (from the top, in mm) to PDF user space (from the bottom, in pt).
fn flip(y: f32) -> Object {
    pt(PAGE_HEIGHT - y)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color.components().into_iter().map(num).collect()
}

fn font_resource_names(pages: &[Page]) -> BTreeMap<BaseFont, String> {
    let mut fonts: Vec<BaseFont> = pages
        .iter()
        .flat_map(|p| &p.ops)
        .filter_map(|op| match op {
            DrawOp::Text { font, .. } => Some(*font),
            _ => None,
        })
        .collect();
    fonts.sort();
    fonts.dedup();
    fonts
        .into_iter()
        .enumerate()
        .map(|(i, font)| (font, format!("F{}", i + 1)))
        .collect()
}

fn page_content(page: &Page, fonts: &BTreeMap<BaseFont, String>) -> Content {
    let mut operations = Vec::new();

    for op in &page.ops {
        match op {
            DrawOp::Rect { x, y, w, h, fill } => {
                operations.push(Operation::new("rg", color_operands(*fill)));
                operations.push(Operation::new(
                    "re",
                    vec![pt(*x), flip(y + h), pt(*w), pt(*h)],
                ));
                operations.push(Operation::new("f", vec![]));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                operations.push(Operation::new("RG", color_operands(*color)));
                operations.push(Operation::new("w", vec![pt(*width)]));
                operations.push(Operation::new("m", vec![pt(*x1), flip(*y1)]));
                operations.push(Operation::new("l", vec![pt(*x2), flip(*y2)]));
                operations.push(Operation::new("S", vec![]));
            }
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                let name = fonts.get(font).cloned().unwrap_or_else(|| "F1".to_string());
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(name.into_bytes()), num(*size)],
                ));
                operations.push(Operation::new("Td", vec![pt(*x), flip(*y)]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode(text), StringFormat::Hexadecimal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
        }
    }

    Content { operations }
}

/// Serializes laid-out pages as a PDF using the standard Type 1 fonts.
///
/// No creation date or document id is written, so identical pages always
/// produce identical bytes.
pub fn write_pdf(pages: &[Page]) -> AppResult<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let fonts = font_resource_names(pages);
    let mut font_dict = Dictionary::new();
    for (font, name) in &fonts {
        let font_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.pdf_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(name.as_str(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => font_dict,
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page, &fonts)
            .encode()
            .map_err(|e| AppError::Render(format!("failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                pt(PAGE_WIDTH),
                pt(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::Render(format!("failed to write PDF: {e}")))?;
    Ok(bytes)
}
