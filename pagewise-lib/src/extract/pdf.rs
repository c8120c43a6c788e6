use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use tracing::{debug, warn};

use crate::extract::{Page, Pages, TextExtractor};
use crate::{Error, Result};

/// PDF extractor backed by lopdf.
///
/// The document structure is parsed up front; text is decoded one page at a
/// time as the stream is consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn pages(&self, path: &Path) -> Result<Pages> {
        let file = match File::open(path) {
            Ok(file) if file.metadata().is_ok_and(|meta| meta.is_file()) => file,
            Ok(_) => return Err(Error::NotFound(path.to_path_buf())),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot open document");
                return Err(Error::NotFound(path.to_path_buf()));
            }
        };

        let document = Document::load_from(BufReader::new(file)).map_err(|e| {
            Error::CorruptDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let pages: Vec<(u32, ObjectId)> = document.get_pages().into_iter().collect();
        debug!(path = %path.display(), pages = pages.len(), "opened pdf");

        Ok(Box::new(PdfPages {
            path: path.to_path_buf(),
            document,
            pages: pages.into_iter().enumerate(),
        }))
    }
}

struct PdfPages {
    path: PathBuf,
    document: Document,
    pages: std::iter::Enumerate<std::vec::IntoIter<(u32, ObjectId)>>,
}

impl Iterator for PdfPages {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, (number, id)) = self.pages.next()?;
        let text = match self.document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                return Some(Err(Error::CorruptDocument {
                    path: self.path.clone(),
                    reason: format!("page {}: {e}", index + 1),
                }))
            }
        };

        // Undecodable fonts yield blank text rather than an error
        if text.trim().is_empty() {
            let content = self.document.get_page_content(id).unwrap_or_default();
            if !content.iter().all(u8::is_ascii_whitespace) {
                warn!(
                    path = %self.path.display(),
                    page = index + 1,
                    "page has content but no extractable text"
                );
            }
        }
        Some(Ok(Page { index, text }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pages.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a minimal PDF with one Helvetica text line per page.
    fn write_pdf(path: &Path, pages: &[&str]) {
        let pages: Vec<(&str, &str)> = pages.iter().map(|text| ("F1", *text)).collect();
        write_pdf_with_fonts(path, &pages);
    }

    /// Like `write_pdf`, with the font resource name chosen per page.
    /// Only `F1` is defined.
    fn write_pdf_with_fonts(path: &Path, pages: &[(&str, &str)]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for (font, text) in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![(*font).into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = PdfExtractor.pages(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfExtractor.pages(dir.path());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        write_pdf(&path, &["secret"]);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&path).is_ok() {
            // running as root, permissions are not enforced
            return;
        }

        let result = PdfExtractor.pages(&path);
        assert!(matches!(result, Err(Error::NotFound(p)) if p == path));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let result = PdfExtractor.pages(&path);
        assert!(matches!(result, Err(Error::CorruptDocument { .. })));
    }

    #[test]
    fn test_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, &["Hello first page", "Second page here"]);

        let pages: Vec<Page> = PdfExtractor
            .pages(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[1].index, 1);
        assert!(pages[0].text.contains("Hello"));
        assert!(pages[1].text.contains("Second"));
    }

    #[test]
    fn test_undecodable_page_is_blank_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fonts.pdf");
        write_pdf_with_fonts(&path, &[("F1", "good page"), ("F9", "lost page"), ("F1", "third page")]);

        let pages: Vec<Page> = PdfExtractor
            .pages(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert!(pages[0].text.contains("good"));
        assert!(!pages[1].text.contains("lost"));
        assert!(pages[2].text.contains("third"));
    }
}
