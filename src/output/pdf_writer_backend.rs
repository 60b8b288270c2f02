use crate::output::document::DocumentBackend;
use crate::output::layout::{Font, Sheet, PAGE_HEIGHT, PAGE_WIDTH};
use crate::BackendError;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

/// Lightweight backend writing PDF objects directly
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriterBackend;

impl PdfWriterBackend {
    pub const NAME: &'static str = "pdf-writer";
}

fn font_resource(font: Font) -> Name<'static> {
    match font {
        Font::Regular => REGULAR_FONT,
        Font::Bold => BOLD_FONT,
    }
}

impl DocumentBackend for PdfWriterBackend {
    fn render(&self, sheets: &[Sheet], title: &str) -> Result<Vec<u8>, BackendError> {
        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let info_id = Ref::new(3);
        let regular_id = Ref::new(4);
        let bold_id = Ref::new(5);

        // Every sheet needs a page object and a content stream
        let first_free = 6;
        let page_refs: Vec<(Ref, Ref)> = (0..sheets.len())
            .map(|i| {
                let base = first_free + 2 * i as i32;
                (Ref::new(base), Ref::new(base + 1))
            })
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_refs.iter().map(|(page_id, _)| *page_id))
            .count(page_refs.len() as i32);
        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr("website-scraper"));
        pdf.type1_font(regular_id)
            .base_font(Name(Font::Regular.base_name().as_bytes()));
        pdf.type1_font(bold_id)
            .base_font(Name(Font::Bold.base_name().as_bytes()));

        for (sheet, (page_id, content_id)) in sheets.iter().zip(&page_refs) {
            {
                let mut page = pdf.page(*page_id);
                page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
                page.parent(tree_id);
                page.contents(*content_id);
                page.resources()
                    .fonts()
                    .pair(REGULAR_FONT, regular_id)
                    .pair(BOLD_FONT, bold_id);
            }

            let mut content = Content::new();
            for line in &sheet.lines {
                content.begin_text();
                content.set_font(font_resource(line.font), line.size);
                content.next_line(line.x, line.y);
                content.show(Str(line.text.as_bytes()));
                content.end_text();
            }
            pdf.stream(*content_id, &content.finish());
        }

        Ok(pdf.finish())
    }
}
