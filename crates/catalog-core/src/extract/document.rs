use super::{Extraction, Extractor, Origin, ReadSeek};
use crate::summary::Failure;
use lopdf::{dictionary, Document, Object, ObjectId};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("document has no pages")]
    NoPages,
}

/// Text annotation rectangle placed on the first page.
const ANNOTATION_RECT: [i64; 4] = [20, 100, 60, 150];

/// Cuts a PDF down to its first page, stamps a text annotation carrying
/// `tag@path` on it and re-serializes the result as the thumbnail artifact.
pub struct DocumentExtractor;

impl Extractor for DocumentExtractor {
    fn extract(&self, stream: &mut dyn ReadSeek, origin: &Origin<'_>) -> Extraction {
        match first_page(stream, origin) {
            Ok(bytes) => Extraction {
                thumbnail: Some(bytes),
                ..Extraction::default()
            },
            Err(err) => {
                trace!("{}: pdf thumbnail: {}", origin.path, err);
                Extraction::failed(Failure::Document)
            }
        }
    }
}

fn first_page(stream: &mut dyn ReadSeek, origin: &Origin<'_>) -> Result<Vec<u8>, DocumentError> {
    stream.rewind()?;
    let mut document = Document::load_from(&mut *stream)?;

    let pages = document.get_pages();
    let (&first, &page_id) = pages.iter().next().ok_or(DocumentError::NoPages)?;
    let rest: Vec<u32> = pages.keys().copied().filter(|n| *n != first).collect();
    if !rest.is_empty() {
        document.delete_pages(&rest);
    }

    let annotation = document.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Contents" => Object::string_literal(format!("{}@{}", origin.tag, origin.path)),
        "Rect" => ANNOTATION_RECT.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
    });
    attach_annotation(&mut document, page_id, annotation)?;

    document.prune_objects();
    let mut out = Vec::new();
    document.save_to(&mut out)?;
    Ok(out)
}

fn attach_annotation(
    document: &mut Document,
    page_id: ObjectId,
    annotation: ObjectId,
) -> Result<(), DocumentError> {
    let existing = document.get_dictionary(page_id)?.get(b"Annots").ok().cloned();
    let mut annots = match existing {
        Some(Object::Array(items)) => items,
        Some(Object::Reference(id)) => document.get_object(id)?.as_array()?.clone(),
        _ => Vec::new(),
    };
    annots.push(Object::Reference(annotation));

    document
        .get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Annots", annots);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;
    use std::io::Cursor;

    /// How the first page of a fixture carries an annotation it already has.
    enum ExistingAnnots {
        None,
        Inline,
        Indirect,
    }

    fn pdf_with_pages(count: usize) -> Vec<u8> {
        build_pdf(count, ExistingAnnots::None)
    }

    fn build_pdf(count: usize, existing: ExistingAnnots) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for n in 0..count {
            let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            };
            if n == 0 {
                let note = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Text",
                    "Contents" => Object::string_literal("existing note"),
                    "Rect" => vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(10),
                        Object::Integer(10),
                    ],
                });
                match existing {
                    ExistingAnnots::None => {}
                    ExistingAnnots::Inline => page.set("Annots", vec![Object::Reference(note)]),
                    ExistingAnnots::Indirect => {
                        let array_id = doc.add_object(vec![Object::Reference(note)]);
                        page.set("Annots", array_id);
                    }
                }
            }
            kids.push(doc.add_object(page).into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count as i64),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn first_page_annotations(pdf: Vec<u8>) -> Vec<String> {
        let origin = Origin {
            tag: "t1",
            path: "docs/report.pdf",
        };
        let out = DocumentExtractor.extract(&mut Cursor::new(pdf), &origin);
        assert!(out.failure.is_none());

        let doc = Document::load_mem(&out.thumbnail.unwrap()).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        annotation_contents(&doc, *pages.values().next().unwrap())
    }

    fn annotation_contents(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let page = doc.get_dictionary(page_id).unwrap();
        page.get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|item| {
                let id = item.as_reference().unwrap();
                let contents = doc.get_dictionary(id).unwrap().get(b"Contents").unwrap();
                String::from_utf8(contents.as_str().unwrap().to_vec()).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_first_page_is_kept_and_annotated() {
        let origin = Origin {
            tag: "t1",
            path: "docs/report.pdf",
        };
        let out = DocumentExtractor.extract(&mut Cursor::new(pdf_with_pages(3)), &origin);

        assert!(out.failure.is_none());
        let thumb = out.thumbnail.unwrap();
        assert!(thumb.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&thumb).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        assert_eq!(annotation_contents(&doc, page_id), vec!["t1@docs/report.pdf"]);
    }

    #[test]
    fn test_existing_annotation_array_is_extended() {
        assert_eq!(
            first_page_annotations(build_pdf(2, ExistingAnnots::Inline)),
            vec!["existing note", "t1@docs/report.pdf"]
        );
    }

    #[test]
    fn test_indirect_annotation_array_is_extended() {
        assert_eq!(
            first_page_annotations(build_pdf(2, ExistingAnnots::Indirect)),
            vec!["existing note", "t1@docs/report.pdf"]
        );
    }

    #[test]
    fn test_not_a_pdf_is_a_document_failure() {
        let origin = Origin { tag: "t1", path: "x.pdf" };
        let out = DocumentExtractor.extract(
            &mut Cursor::new(b"%PDF-1.4\nthis is not really a pdf".to_vec()),
            &origin,
        );
        assert_eq!(out.failure, Some(Failure::Document));
        assert!(out.thumbnail.is_none());
        assert!(out.capture_time.is_none());
    }
}
