//! The output document model and its validator.
//!
//! The orchestrator accumulates blocks into a [`DocumentDraft`] while it walks
//! the pages. Once every page is done the draft is validated as a whole and
//! becomes an immutable [`Document`]; a draft that fails validation never
//! becomes a document, partially or otherwise.
//!
//! Serde derives define the JSON shape: field declaration order is the
//! emitted key order, absent `title`/`url` serialise as `null`, and a
//! [`BBox`] is a plain four-element array.

use crate::error::{FieldIssue, ValidationError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One non-blank line of page text, kept exactly as extracted (not trimmed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A detected table split into its first row and the rows after it.
///
/// Rows are **not** rectangular: any row may be shorter or longer than
/// `headers`. Cells are kept verbatim, including numeric-looking ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Split raw detector output: row 0 becomes `headers`, the rest `rows`.
    ///
    /// An empty detection yields an empty table rather than an error.
    pub fn from_detected(mut detected: Vec<Vec<String>>) -> Self {
        if detected.is_empty() {
            return Self::default();
        }
        let rows = detected.split_off(1);
        let headers = detected.pop().unwrap_or_default();
        Self { headers, rows }
    }
}

/// Region of a page: left, top, right, bottom in PDF points with the origin
/// at the top-left corner (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    pub fn height(&self) -> f64 {
        (self.bottom - self.top).abs()
    }

    pub fn is_finite(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

/// An embedded image that was cropped, encoded and (optionally) persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// 1-indexed page number.
    pub page_number: usize,
    /// 0-based detection order within the page.
    pub image_index: usize,
    pub bbox: BBox,
    /// Base64 (standard alphabet, padded) PNG bytes.
    pub image_data: String,
    /// Locator of the persisted copy; `None` when persistence was skipped.
    pub url: Option<String>,
}

impl ImageBlock {
    /// Decode `image_data` back to the PNG bytes.
    pub fn decode_image(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.image_data)
    }
}

/// Mutable accumulator filled page by page, then validated into a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub title: Option<String>,
    pub text_blocks: Vec<TextBlock>,
    pub tables: Vec<Table>,
    pub images: Vec<ImageBlock>,
}

impl DocumentDraft {
    /// Check every field and either accept the draft as a whole or reject it
    /// with all issues found.
    pub fn validate(self) -> Result<Document, ValidationError> {
        let mut issues = Vec::new();

        for (i, block) in self.text_blocks.iter().enumerate() {
            if block.text.trim().is_empty() {
                issues.push(issue(
                    format!("text_blocks[{i}].text"),
                    "must contain non-whitespace text",
                ));
            }
        }

        for (i, img) in self.images.iter().enumerate() {
            if img.page_number == 0 {
                issues.push(issue(
                    format!("images[{i}].page_number"),
                    "must be >= 1 (pages are 1-indexed)",
                ));
            }
            if !img.bbox.is_finite() {
                issues.push(issue(
                    format!("images[{i}].bbox"),
                    "coordinates must be finite numbers",
                ));
            }
            if img.image_data.is_empty() {
                issues.push(issue(format!("images[{i}].image_data"), "is empty"));
            } else if STANDARD.decode(&img.image_data).is_err() {
                issues.push(issue(
                    format!("images[{i}].image_data"),
                    "is not valid base64",
                ));
            }
            if img.url.as_deref().is_some_and(str::is_empty) {
                issues.push(issue(
                    format!("images[{i}].url"),
                    "must be null or a non-empty locator",
                ));
            }
        }

        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }

        Ok(Document {
            title: self.title,
            text_blocks: self.text_blocks,
            tables: self.tables,
            images: self.images,
        })
    }
}

fn issue(field: String, problem: &str) -> FieldIssue {
    FieldIssue {
        field,
        problem: problem.to_string(),
    }
}

fn shape_field<T: DeserializeOwned>(
    root: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<T> {
    let value = root.get(key).cloned().unwrap_or(Value::Null);
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            issues.push(issue(key.to_string(), &e.to_string()));
            None
        }
    }
}

fn shape_items<T: DeserializeOwned>(
    root: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<FieldIssue>,
) -> Vec<T> {
    let items = match root.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            issues.push(issue(key.to_string(), "must be an array"));
            return Vec::new();
        }
        None => {
            issues.push(issue(key.to_string(), "is missing"));
            return Vec::new();
        }
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                issues.push(issue(format!("{key}[{i}]"), &e.to_string()));
                None
            }
        })
        .collect()
}

/// The validated, immutable extraction result.
///
/// Only obtainable through [`DocumentDraft::validate`] or
/// [`Document::from_json`], so every `Document` in hand has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    title: Option<String>,
    text_blocks: Vec<TextBlock>,
    tables: Vec<Table>,
    images: Vec<ImageBlock>,
}

impl Document {
    /// Title taken from the first line of page 1, if page 1 has text.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn text_blocks(&self) -> &[TextBlock] {
        &self.text_blocks
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn images(&self) -> &[ImageBlock] {
        &self.images
    }

    /// Parse a JSON artifact and validate it.
    ///
    /// Malformed JSON is reported as one issue located by line and column.
    /// Otherwise each top-level field and each array element is checked on
    /// its own, so every shape mismatch is listed (`title`, `images[3]`, …)
    /// before the usual validation runs.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(json).map_err(|e| ValidationError {
            issues: vec![issue(
                format!("line {}, column {}", e.line(), e.column()),
                &e.to_string(),
            )],
        })?;
        let Some(root) = value.as_object() else {
            return Err(ValidationError {
                issues: vec![issue("$".to_string(), "must be a JSON object")],
            });
        };

        let mut issues = Vec::new();
        let draft = DocumentDraft {
            title: shape_field::<Option<String>>(root, "title", &mut issues).flatten(),
            text_blocks: shape_items(root, "text_blocks", &mut issues),
            tables: shape_items(root, "tables", &mut issues),
            images: shape_items(root, "images", &mut issues),
        };
        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }
        draft.validate()
    }

    /// Give up immutability, e.g. to post-process and re-validate.
    pub fn into_draft(self) -> DocumentDraft {
        DocumentDraft {
            title: self.title,
            text_blocks: self.text_blocks,
            tables: self.tables,
            images: self.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(page_number: usize, data: &str) -> ImageBlock {
        ImageBlock {
            page_number,
            image_index: 0,
            bbox: BBox::new(10.0, 20.0, 110.0, 220.0),
            image_data: data.to_string(),
            url: None,
        }
    }

    #[test]
    fn table_split_keeps_ragged_rows() {
        let t = Table::from_detected(vec![
            vec!["A".into(), "B".into()],
            vec!["1".into()],
            vec!["2".into(), "3".into(), "4".into()],
        ]);
        assert_eq!(t.headers, vec!["A", "B"]);
        assert_eq!(t.rows, vec![vec!["1"], vec!["2", "3", "4"]]);
    }

    #[test]
    fn table_split_header_only_and_empty() {
        let t = Table::from_detected(vec![vec!["only".into()]]);
        assert_eq!(t.headers, vec!["only"]);
        assert!(t.rows.is_empty());

        assert_eq!(Table::from_detected(vec![]), Table::default());
    }

    #[test]
    fn bbox_serialises_as_array() {
        let b = BBox::new(1.0, 2.5, 3.0, 4.0);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1.0,2.5,3.0,4.0]");
        let back: BBox = serde_json::from_str("[1, 2.5, 3, 4]").unwrap();
        assert_eq!(back, b);
        assert_eq!(b.width(), 2.0);
        assert_eq!(b.height(), 1.5);
    }

    #[test]
    fn valid_draft_becomes_document() {
        let draft = DocumentDraft {
            title: Some("  Raw Title ".into()),
            text_blocks: vec![TextBlock::new("  indented line")],
            tables: vec![Table::default()],
            images: vec![image(1, "aGVsbG8=")],
        };
        let doc = draft.validate().expect("valid");
        assert_eq!(doc.title(), Some("  Raw Title "));
        assert_eq!(doc.text_blocks()[0].text, "  indented line");
        assert_eq!(doc.images()[0].decode_image().unwrap(), b"hello");
    }

    #[test]
    fn validation_reports_every_issue() {
        let mut bad = image(0, "not base64!!");
        bad.bbox.left = f64::NAN;
        bad.url = Some(String::new());
        let draft = DocumentDraft {
            title: None,
            text_blocks: vec![TextBlock::new("ok"), TextBlock::new("   ")],
            tables: vec![],
            images: vec![image(2, ""), bad],
        };
        let err = draft.validate().unwrap_err();
        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "text_blocks[1].text",
                "images[0].image_data",
                "images[1].page_number",
                "images[1].bbox",
                "images[1].image_data",
                "images[1].url",
            ]
        );
    }

    #[test]
    fn from_json_lists_every_shape_mismatch() {
        let json = r#"{
            "title": 5,
            "text_blocks": [{"text": "ok"}, {"txt": "typo"}],
            "tables": [],
            "images": "none"
        }"#;
        let err = Document::from_json(json).unwrap_err();
        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "text_blocks[1]", "images"]);
    }

    #[test]
    fn from_json_reports_missing_arrays() {
        let err = Document::from_json(r#"{"title": null}"#).unwrap_err();
        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["text_blocks", "tables", "images"]);
    }

    #[test]
    fn from_json_locates_syntax_errors() {
        let err = Document::from_json("{\n  \"title\": ,\n}").unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].field.starts_with("line 2, column"), "{err}");
    }

    #[test]
    fn from_json_accepts_null_title_and_url() {
        let json = r#"{
            "title": null,
            "text_blocks": [{"text": "x"}],
            "tables": [{"headers": ["h"], "rows": []}],
            "images": [{"page_number": 1, "image_index": 0, "bbox": [0, 0, 1, 1],
                        "image_data": "aGk=", "url": null}]
        }"#;
        let doc = Document::from_json(json).expect("valid");
        assert_eq!(doc.title(), None);
        assert_eq!(doc.images()[0].url, None);
        assert_eq!(doc.tables()[0].headers, vec!["h"]);
    }
}
