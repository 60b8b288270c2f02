use crate::output::document::DocumentBackend;
use crate::output::layout::{Font, Sheet, PAGE_HEIGHT, PAGE_WIDTH};
use crate::BackendError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

const MM_PER_POINT: f32 = 0.352_778;
const LAYER_NAME: &str = "Text";

fn mm(points: f32) -> Mm {
    Mm(points * MM_PER_POINT)
}

/// Full-featured backend built on `printpdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintPdfBackend;

impl PrintPdfBackend {
    pub const NAME: &'static str = "printpdf";
}

impl DocumentBackend for PrintPdfBackend {
    fn render(&self, sheets: &[Sheet], title: &str) -> Result<Vec<u8>, BackendError> {
        let (doc, first_page, first_layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| BackendError::Render(format!("{:?}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| BackendError::Render(format!("{:?}", e)))?;

        for (index, sheet) in sheets.iter().enumerate() {
            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME)
            };
            let layer = doc.get_page(page).get_layer(layer);

            for line in &sheet.lines {
                let font: &IndirectFontRef = match line.font {
                    Font::Regular => &regular,
                    Font::Bold => &bold,
                };
                layer.use_text(line.text.as_str(), line.size, mm(line.x), mm(line.y), font);
            }
        }

        doc.save_to_bytes()
            .map_err(|e| BackendError::Render(format!("{:?}", e)))
    }
}
