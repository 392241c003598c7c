//! Template command syntax

use crate::error::{DocxError, DocxResult};

/// A parsed command body (the text between the delimiters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// `FOR var IN expr`
    For { var: String, source: String },
    /// `END-FOR var`
    EndFor(String),
    /// `INS expr`, `= expr` or a bare expression
    Insert(String),
}

impl Command {
    pub fn parse(body: &str) -> DocxResult<Self> {
        let body = body.trim();
        if body.is_empty() {
            return Err(DocxError::InvalidCommand(body.to_string()));
        }

        if let Some(expr) = body.strip_prefix('=') {
            return insert(expr, body);
        }

        let (keyword, rest) = match body.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (body, ""),
        };

        match keyword {
            "FOR" => {
                let mut words = rest.split_whitespace();
                match (words.next(), words.next(), words.next(), words.next()) {
                    (Some(var), Some("IN"), Some(source), None) => Ok(Command::For {
                        var: var.to_string(),
                        source: source.to_string(),
                    }),
                    _ => Err(DocxError::InvalidCommand(body.to_string())),
                }
            }
            "END-FOR" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    Err(DocxError::InvalidCommand(body.to_string()))
                } else {
                    Ok(Command::EndFor(rest.to_string()))
                }
            }
            "INS" => insert(rest, body),
            _ if is_keyword(keyword) => Err(DocxError::UnsupportedCommand(keyword.to_string())),
            _ => insert(body, body),
        }
    }
}

fn insert(expr: &str, body: &str) -> DocxResult<Command> {
    let expr = expr.trim();
    if expr.is_empty() || expr.contains(char::is_whitespace) {
        return Err(DocxError::InvalidCommand(body.to_string()));
    }
    Ok(Command::Insert(expr.to_string()))
}

// IF, END-IF, EXEC, EXEC!, IMAGE, LINK, HTML, ALIAS ...
fn is_keyword(word: &str) -> bool {
    word.len() >= 2
        && word.starts_with(|c: char| c.is_ascii_uppercase())
        && word
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '-' || c == '!')
}

/// A piece of `w:t` text: literal, or a whole command including delimiters
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Command(&'a str),
}

/// Byte spans `[start, end)` of every complete command in `text`
pub(crate) fn command_spans(text: &str, open: &str, close: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(start) = text[from..].find(open).map(|i| from + i) {
        let body = start + open.len();
        let Some(end) = text[body..].find(close).map(|i| body + i + close.len()) else {
            break;
        };
        spans.push((start, end));
        from = end;
    }
    spans
}

pub(crate) fn segments<'a>(text: &'a str, open: &str, close: &str) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut last = 0;
    for (start, end) in command_spans(text, open, close) {
        if start > last {
            out.push(Segment::Literal(&text[last..start]));
        }
        out.push(Segment::Command(&text[start..end]));
        last = end;
    }
    if last < text.len() {
        out.push(Segment::Literal(&text[last..]));
    }
    out
}
