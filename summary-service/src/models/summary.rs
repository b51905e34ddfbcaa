use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// A book to summarise, as submitted by the client.
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SummaryRequest {
    #[validate(length(min = 1, message = "book_name cannot be empty"))]
    pub book_name: String,
    #[validate(length(min = 1, message = "author cannot be empty"))]
    pub author: String,
    /// Free text; the format is not checked.
    #[validate(length(min = 1, message = "publication_date cannot be empty"))]
    pub publication_date: String,
}

impl SummaryRequest {
    pub fn new(
        book_name: impl Into<String>,
        author: impl Into<String>,
        publication_date: impl Into<String>,
    ) -> Self {
        Self {
            book_name: book_name.into(),
            author: author.into(),
            publication_date: publication_date.into(),
        }
    }
}

/// Result of looking for a text field in a downstream JSON body.
///
/// `Text("")` means the backend sent an empty string; `Missing` means it
/// sent nothing usable at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    Text(String),
    Missing,
}

impl ExtractedText {
    fn from_field(body: &Value, field: &str) -> Self {
        match body.get(field).and_then(Value::as_str) {
            Some(text) => ExtractedText::Text(text.to_string()),
            None => ExtractedText::Missing,
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            ExtractedText::Text(text) => text.trim().is_empty(),
            ExtractedText::Missing => true,
        }
    }
}

/// Reads `summary` from a `/summarize` response.
pub fn extract_summary(body: &Value) -> ExtractedText {
    ExtractedText::from_field(body, "summary")
}

/// Reads `text`, then `report`, from an `/api/research` response.
///
/// A blank `text` gives way to `report`. When neither has content the
/// blank `text` is kept, so the caller still sees that one was sent.
pub fn extract_report(body: &Value) -> ExtractedText {
    let text = ExtractedText::from_field(body, "text");
    if !text.is_blank() {
        return text;
    }
    match ExtractedText::from_field(body, "report") {
        ExtractedText::Missing => text,
        report => report,
    }
}
