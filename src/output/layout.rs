//! Paginated layout shared by the document backends
//!
//! The layout is computed once, in PDF points with the origin at the bottom
//! left of an A4 sheet, and every backend only has to draw the placed lines.
//! Wrapping is done here with `textwrap` so the backends never auto-wrap.

use crate::crawler::PageContent;

/// A4 width in points
pub const PAGE_WIDTH: f32 = 595.28;

/// A4 height in points
pub const PAGE_HEIGHT: f32 = 841.89;

/// 15 mm
pub const MARGIN: f32 = 42.52;

pub const TITLE_SIZE: f32 = 14.0;
pub const URL_SIZE: f32 = 9.0;
pub const BODY_SIZE: f32 = 10.0;

pub const TITLE_WRAP: usize = 60;
pub const URL_WRAP: usize = 95;
pub const BODY_WRAP: usize = 95;

/// Line height as a multiple of the font size
const LEADING: f32 = 1.4;

/// Extra space after the title block and after the URL block
const BLOCK_GAP: f32 = 6.0;

/// One of the two standard Type1 fonts used by the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

/// A single line positioned on a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub font: Font,
    pub size: f32,
    /// Baseline start, in points from the left edge
    pub x: f32,
    /// Baseline, in points from the bottom edge
    pub y: f32,
    pub text: String,
}

/// One physical document page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Index of the source page this sheet belongs to
    pub source: usize,
    pub lines: Vec<PlacedLine>,
}

/// Lays out every page, each starting on a fresh sheet
pub fn layout(pages: &[PageContent]) -> Vec<Sheet> {
    let mut sheets = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        let mut cursor = Cursor::new(index);

        for line in wrap_paragraph(&page.title, TITLE_WRAP) {
            cursor.place(&mut sheets, Font::Bold, TITLE_SIZE, line);
        }
        cursor.gap(BLOCK_GAP);

        for line in wrap_paragraph(&page.url, URL_WRAP) {
            cursor.place(&mut sheets, Font::Regular, URL_SIZE, line);
        }
        cursor.gap(BLOCK_GAP);

        for line in wrap_text(&page.text, BODY_WRAP) {
            cursor.place(&mut sheets, Font::Regular, BODY_SIZE, line);
        }

        sheets.push(cursor.finish());
    }

    sheets
}

/// Splits text into newline-separated paragraphs and wraps each one
///
/// Empty paragraphs are kept as empty lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(wrap_paragraph(paragraph, width));
    }
    lines
}

/// Wraps a single paragraph, breaking words longer than `width`
fn wrap_paragraph(paragraph: &str, width: usize) -> Vec<String> {
    let cleaned = to_printable_ascii(paragraph.trim());
    let wrapped: Vec<String> = textwrap::wrap(&cleaned, width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect();

    if wrapped.is_empty() {
        vec![cleaned]
    } else {
        wrapped
    }
}

/// Maps text onto the characters the standard Type1 fonts can show
pub fn to_printable_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' | '\u{a0}' | '\u{2002}'..='\u{200a}' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{00b7}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\u{200b}' | '\u{feff}' | '\u{ad}' => {}
            _ => out.push('?'),
        }
    }
    out
}

/// Vertical position on the sheet being filled
struct Cursor {
    source: usize,
    y: f32,
    current: Sheet,
}

impl Cursor {
    fn new(source: usize) -> Self {
        Self {
            source,
            y: PAGE_HEIGHT - MARGIN,
            current: Sheet {
                source,
                lines: Vec::new(),
            },
        }
    }

    /// Places a line, moving to a continuation sheet when out of room
    fn place(&mut self, sheets: &mut Vec<Sheet>, font: Font, size: f32, text: String) {
        let advance = size * LEADING;
        if self.y - advance < MARGIN {
            let full = std::mem::replace(
                &mut self.current,
                Sheet {
                    source: self.source,
                    lines: Vec::new(),
                },
            );
            sheets.push(full);
            self.y = PAGE_HEIGHT - MARGIN;
        }

        self.y -= advance;
        if !text.is_empty() {
            self.current.lines.push(PlacedLine {
                font,
                size,
                x: MARGIN,
                y: self.y,
                text,
            });
        }
    }

    fn gap(&mut self, points: f32) {
        self.y -= points;
    }

    fn finish(self) -> Sheet {
        self.current
    }
}
