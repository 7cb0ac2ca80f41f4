//! Structured error types for crossdoc.
//!
//! Configuration errors abort the whole operation and leave the input
//! untouched. Degenerate input (an empty page, content that already fits)
//! is never an error.

use thiserror::Error;

/// The unified error type returned by all public crossdoc functions.
#[derive(Debug, Error)]
pub enum CrossdocError {
    /// JSON input failed to parse as a crossdoc document or builder tree.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A font could not be parsed or registered.
    #[error("Font error: {0}")]
    Font(String),

    /// A horizontal block has children but their weights sum to zero.
    #[error("Horizontal block <{tag}> has children with a total weight of zero")]
    ZeroWeight { tag: String },

    /// Pagination only works on a document with exactly one page.
    #[error("Attempting to paginate a document with {0} pages, it only works with one page")]
    PageCount(usize),

    /// Pagination needs a positive page height.
    #[error("Documents need a positive page_height to be paginated, got {0}")]
    PageHeight(f64),

    /// A pagination knob is out of range.
    #[error("Invalid pagination policy: {0}")]
    InvalidPolicy(String),

    /// A length string such as `0.75in` could not be parsed.
    #[error("Invalid length '{0}'")]
    InvalidLength(String),

    /// A page size name that isn't one of the known sizes.
    #[error("Unknown page size '{0}'")]
    InvalidPageSize(String),

    /// A border shorthand such as `1px solid #000` could not be parsed.
    #[error("Invalid border '{0}'")]
    InvalidBorder(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for CrossdocError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the crossdoc schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CrossdocError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, CrossdocError>;
