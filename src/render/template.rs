use serde::Serialize;

use super::fonts::BaseFont;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn components(self) -> [f32; 3] {
        [
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontFamily {
    Helvetica,
    /// Rendered with the Helvetica standard font; PDF has no built-in Arial.
    Arial,
    Times,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontFamily {
    pub fn base_font(self, style: FontStyle) -> BaseFont {
        match (self, style) {
            (FontFamily::Helvetica | FontFamily::Arial, FontStyle::Regular) => BaseFont::Helvetica,
            (FontFamily::Helvetica | FontFamily::Arial, FontStyle::Bold) => BaseFont::HelveticaBold,
            (FontFamily::Helvetica | FontFamily::Arial, FontStyle::Italic) => {
                BaseFont::HelveticaOblique
            }
            (FontFamily::Times, FontStyle::Regular) => BaseFont::TimesRoman,
            (FontFamily::Times, FontStyle::Bold) => BaseFont::TimesBold,
            (FontFamily::Times, FontStyle::Italic) => BaseFont::TimesItalic,
        }
    }
}

/// Visual style applied to every battlecard in a design run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Template {
    pub name: &'static str,
    pub font: FontFamily,
    /// Body text size in points.
    pub font_size: f32,
    pub header_color: Rgb,
    pub bg_color: Rgb,
    pub section_color: Rgb,
    pub border_color: Rgb,
    /// Separator line width in millimetres; zero disables separators.
    pub border_width: f32,
}

pub const DEFAULT_TEMPLATE: &str = "classic";

pub static TEMPLATES: [Template; 3] = [
    Template {
        name: "modern",
        font: FontFamily::Helvetica,
        font_size: 10.0,
        header_color: Rgb(0, 0, 0),
        bg_color: Rgb(0, 102, 204),
        section_color: Rgb(200, 200, 255),
        border_color: Rgb(0, 102, 204),
        border_width: 0.5,
    },
    Template {
        name: "classic",
        font: FontFamily::Arial,
        font_size: 11.0,
        header_color: Rgb(0, 0, 0),
        bg_color: Rgb(255, 255, 255),
        section_color: Rgb(255, 255, 255),
        border_color: Rgb(0, 0, 0),
        border_width: 0.0,
    },
    Template {
        name: "professional",
        font: FontFamily::Times,
        font_size: 9.0,
        header_color: Rgb(0, 0, 0),
        bg_color: Rgb(255, 255, 255),
        section_color: Rgb(220, 220, 220),
        border_color: Rgb(200, 200, 200),
        border_width: 0.5,
    },
];

impl Template {
    pub fn by_name(name: &str) -> Option<&'static Template> {
        let name = name.trim();
        TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a template, falling back to the default for unknown names.
    pub fn resolve(name: &str) -> &'static Template {
        Self::by_name(name).unwrap_or_else(|| {
            tracing::warn!(
                template = name,
                fallback = DEFAULT_TEMPLATE,
                "Unknown template, using default"
            );
            &TEMPLATES[1]
        })
    }

    pub fn names() -> Vec<&'static str> {
        TEMPLATES.iter().map(|t| t.name).collect()
    }
}
