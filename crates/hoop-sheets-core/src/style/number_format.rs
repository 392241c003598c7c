//! Number formats, as far as templates care about them

/// Number format of a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    #[default]
    General,
    /// One of the ids every spreadsheet application knows without a code
    BuiltIn(u32),
    /// A format code declared in the styles part (id 164 and up)
    Custom(String),
}

impl NumberFormat {
    /// Whether a number in this format displays as a date or time
    ///
    /// Built-ins 14-22 and 45-47 are dates and times. A custom code counts
    /// when its first section has a date or time letter outside brackets
    /// (`[Red]`, `[$-40C]`), quotes and escapes.
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => has_date_token(code),
        }
    }
}

fn has_date_token(code: &str) -> bool {
    let mut chars = code.chars().take_while(|&c| c != ';');
    while let Some(c) = chars.next() {
        let closing = match c {
            '[' => ']',
            '"' => '"',
            '\\' | '_' | '*' => {
                chars.next();
                continue;
            }
            _ if "yYdDmMhHsS".contains(c) => return true,
            _ => continue,
        };
        chars.by_ref().find(|&c| c == closing);
    }
    false
}
