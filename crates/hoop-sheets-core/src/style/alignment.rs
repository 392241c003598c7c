//! Cell text alignment

/// Placement of text inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub wrap_text: bool,
    pub indent: u8,
    /// Degrees (0-180); 255 stacks the text
    pub rotation: u8,
}

impl Alignment {
    pub fn is_default(&self) -> bool {
        *self == Alignment::default()
    }
}

/// An enum backed by the OOXML keywords of one attribute
///
/// `parse` maps unknown keywords to the default variant.
macro_rules! ooxml_keyword {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (default $default:ident) {
            $($variant:ident = $word:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $word,)+
                }
            }

            pub fn parse(s: &str) -> Self {
                match s {
                    $($word => $name::$variant,)+
                    _ => $name::$default,
                }
            }
        }
    };
}

ooxml_keyword! {
    /// `horizontal` attribute of `<alignment>`; `General` puts text left and numbers right
    pub enum HorizontalAlignment (default General) {
        General = "general",
        Left = "left",
        Center = "center",
        Right = "right",
        Fill = "fill",
        Justify = "justify",
        CenterContinuous = "centerContinuous",
        Distributed = "distributed",
    }
}

ooxml_keyword! {
    /// `vertical` attribute of `<alignment>`
    pub enum VerticalAlignment (default Bottom) {
        Top = "top",
        Center = "center",
        Bottom = "bottom",
        Justify = "justify",
        Distributed = "distributed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keywords() {
        assert_eq!(HorizontalAlignment::parse("centerContinuous"), HorizontalAlignment::CenterContinuous);
        assert_eq!(HorizontalAlignment::parse("middle"), HorizontalAlignment::General);
        assert_eq!(VerticalAlignment::parse(""), VerticalAlignment::Bottom);
        assert_eq!(VerticalAlignment::Top.as_str(), "top");
        assert!(Alignment::default().is_default());
    }
}
