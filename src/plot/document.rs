use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfPageIndex, Pt,
};

use super::pdf_backend::PdfBackend;
use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Multi-page results document
// ---------------------------------------------------------------------------

/// An in-memory PDF with one page per figure. Nothing touches the disk
/// until [`ResultsPdf::save`].
pub struct ResultsPdf {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    pages: Vec<(PdfPageIndex, PdfLayerIndex, (u32, u32))>,
}

fn mm(points: u32) -> Mm {
    Mm::from(Pt(points as f32))
}

impl ResultsPdf {
    /// Create a document with one page per entry of `sizes` (in points).
    pub fn new(title: &str, sizes: &[(u32, u32)]) -> Result<Self> {
        let (&first, rest) = sizes
            .split_first()
            .ok_or_else(|| PlotError::Render("a document needs at least one page".into()))?;

        let (doc, page, layer) = PdfDocument::new(title, mm(first.0), mm(first.1), "figure");
        let mut pages = vec![(page, layer, first)];
        for &size in rest {
            let (page, layer) = doc.add_page(mm(size.0), mm(size.1), "figure");
            pages.push((page, layer, size));
        }

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PlotError::Render(format!("embedding font: {e:?}")))?;

        Ok(ResultsPdf { doc, font, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// A drawing backend for page `index`.
    pub fn page(&self, index: usize) -> Result<PdfBackend> {
        let &(page, layer, size) = self
            .pages
            .get(index)
            .ok_or_else(|| PlotError::Render(format!("no page {index}")))?;
        let layer = self.doc.get_page(page).get_layer(layer);
        Ok(PdfBackend::new(layer, self.font.clone(), size))
    }

    /// Serialize the whole document to `path` in one go.
    pub fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| PlotError::from_io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|e| PlotError::Render(format!("writing {}: {e:?}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_follow_requested_sizes() {
        let pdf = ResultsPdf::new("test", &[(100, 50), (80, 50)]).unwrap();
        assert_eq!(pdf.page_count(), 2);
        assert!(pdf.page(1).is_ok());
        assert!(pdf.page(2).is_err());
    }

    #[test]
    fn no_pages_is_an_error() {
        assert!(ResultsPdf::new("empty", &[]).is_err());
    }

    #[test]
    fn save_writes_a_pdf_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        ResultsPdf::new("test", &[(100, 50)]).unwrap().save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
