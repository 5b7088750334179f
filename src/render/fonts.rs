//! Metrics and encoding for the PDF standard Type 1 fonts.
//!
//! Standard fonts are not embedded, so line wrapping and centering depend
//! on the published glyph widths (thousandths of the font size) for the
//! printable ASCII range. Everything else is encoded as WinAnsi.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BaseFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
}

const FIRST_CHAR: u8 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

impl BaseFont {
    pub fn pdf_name(self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helvetica",
            BaseFont::HelveticaBold => "Helvetica-Bold",
            BaseFont::HelveticaOblique => "Helvetica-Oblique",
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::TimesBold => "Times-Bold",
            BaseFont::TimesItalic => "Times-Italic",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            BaseFont::Helvetica | BaseFont::HelveticaOblique => &HELVETICA,
            BaseFont::HelveticaBold => &HELVETICA_BOLD,
            BaseFont::TimesRoman => &TIMES_ROMAN,
            BaseFont::TimesBold => &TIMES_BOLD,
            BaseFont::TimesItalic => &TIMES_ITALIC,
        }
    }

    /// Width used for bytes outside the ASCII table.
    fn fallback_width(self) -> u16 {
        match self {
            BaseFont::HelveticaBold => 611,
            BaseFont::Helvetica | BaseFont::HelveticaOblique => 556,
            _ => 500,
        }
    }

    pub fn byte_width(self, byte: u8) -> u16 {
        match byte.checked_sub(FIRST_CHAR) {
            Some(index) if usize::from(index) < 95 => self.widths()[usize::from(index)],
            _ => self.fallback_width(),
        }
    }

    /// Rendered width of `text` at `size` points, in points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = encode(text)
            .into_iter()
            .map(|b| u32::from(self.byte_width(b)))
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Encodes text as WinAnsi (CP1252). Characters with no code point there
/// become `?`; tabs become spaces.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(encode("Page 1"), b"Page 1".to_vec());
    }

    #[test]
    fn test_typographic_punctuation_maps_to_winansi() {
        assert_eq!(encode("“Pro” – •"), vec![0x93, b'P', b'r', b'o', 0x94, b' ', 0x96, b' ', 0x95]);
        assert_eq!(encode("café"), vec![b'c', b'a', b'f', 0xe9]);
    }

    #[test]
    fn test_unmappable_characters_become_question_marks() {
        assert_eq!(encode("日本\t"), b"?? ".to_vec());
    }

    #[test]
    fn test_text_width_uses_font_metrics() {
        // H=722 e=556 l=222 l=222 o=556
        let width = BaseFont::Helvetica.text_width("Hello", 10.0);
        assert!((width - 22.78).abs() < 1e-3);

        assert!(
            BaseFont::HelveticaBold.text_width("Hello", 10.0)
                > BaseFont::Helvetica.text_width("Hello", 10.0)
        );
        assert!(
            BaseFont::TimesRoman.text_width("Hello", 10.0)
                < BaseFont::Helvetica.text_width("Hello", 10.0)
        );
    }

    #[test]
    fn test_byte_width_bounds() {
        assert_eq!(BaseFont::TimesRoman.byte_width(b' '), 250);
        assert_eq!(BaseFont::TimesRoman.byte_width(b'~'), 541);
        assert_eq!(BaseFont::TimesRoman.byte_width(0x95), 500);
        assert_eq!(BaseFont::Helvetica.byte_width(0x0a), 556);
    }
}
