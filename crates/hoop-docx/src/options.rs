//! Render options

use serde::Deserialize;

/// How template commands are recognised and values inserted
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocxRenderOptions {
    /// Opening command delimiter (default `{{`)
    pub open_delimiter: String,

    /// Closing command delimiter (default `}}`)
    pub close_delimiter: String,

    /// Turn `\n` in inserted values into line breaks (default true)
    pub line_breaks: bool,
}

impl Default for DocxRenderOptions {
    fn default() -> Self {
        Self {
            open_delimiter: "{{".to_string(),
            close_delimiter: "}}".to_string(),
            line_breaks: true,
        }
    }
}

impl DocxRenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom command delimiters
    pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.open_delimiter = open.into();
        self.close_delimiter = close.into();
        self
    }

    /// Insert values with `\n` kept as literal text
    pub fn without_line_breaks(mut self) -> Self {
        self.line_breaks = false;
        self
    }
}
