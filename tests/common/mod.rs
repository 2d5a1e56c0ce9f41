#![allow(dead_code)]

pub mod fixtures;

use lopdf::Document as LopdfDocument;
use lopdf::Object;
use lopdf::content::Content;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Every `Tj` string on a page, one per line, decoded as WinAnsi.
    pub fn page_text(&self, page: u32) -> String {
        let Some(page_id) = self.doc.get_pages().get(&page).copied() else {
            return String::new();
        };
        let Ok(data) = self.doc.get_page_content(page_id) else {
            return String::new();
        };
        let Ok(content) = Content::decode(&data) else {
            return String::new();
        };
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.iter().map(|&b| b as char).collect::<String>()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn text(&self) -> String {
        (1..=self.page_count() as u32)
            .map(|page| self.page_text(page))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of image XObjects in the file.
    pub fn image_count(&self) -> usize {
        self.doc
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| {
                stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .is_ok_and(|name| name == b"Image")
            })
            .count()
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Assert that PDF contains specific text
#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $pdf.text();
        assert!(
            extracted.contains($text),
            "PDF should contain '{}', but extracted text was:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert that PDF does NOT contain specific text
#[macro_export]
macro_rules! assert_pdf_not_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $pdf.text();
        assert!(
            !extracted.contains($text),
            "PDF should NOT contain '{}', but it was found in:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Nodes anywhere under `value` whose metadata carries `class`.
pub fn count_class<T: serde::Serialize>(value: &T, class: &str) -> usize {
    fn walk(value: &serde_json::Value, class: &str) -> usize {
        match value {
            serde_json::Value::Object(map) => {
                let own = map
                    .get("meta")
                    .and_then(|meta| meta.get("classes"))
                    .and_then(|classes| classes.as_array())
                    .is_some_and(|classes| classes.iter().any(|c| c == class));
                usize::from(own) + map.values().map(|v| walk(v, class)).sum::<usize>()
            }
            serde_json::Value::Array(items) => items.iter().map(|v| walk(v, class)).sum(),
            _ => 0,
        }
    }
    serde_json::to_value(value).map_or(0, |v| walk(&v, class))
}
