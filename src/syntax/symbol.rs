//! Splitting symbol text into sigil, twigil and base name.

/// `$`, `@` or `%`.
pub fn is_sigil(c: char) -> bool {
    matches!(c, '$' | '@' | '%')
}

/// `.` (public accessor) or `!` (private attribute).
pub fn is_twigil(c: char) -> bool {
    matches!(c, '.' | '!')
}

/// A symbol as written: `$x`, `$.name`, `@items`, `foo`, `Foo::bar`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SymbolName<'a> {
    pub sigil: Option<char>,
    pub twigil: Option<char>,
    pub base: &'a str,
}

impl<'a> SymbolName<'a> {
    pub fn parse(text: &'a str) -> Self {
        let mut chars = text.chars();
        let Some(sigil) = chars.next().filter(|&c| is_sigil(c)) else {
            return Self {
                sigil: None,
                twigil: None,
                base: text,
            };
        };
        let rest = chars.as_str();
        let mut rest_chars = rest.chars();
        match rest_chars.next() {
            Some(twigil) if is_twigil(twigil) && !rest_chars.as_str().is_empty() => Self {
                sigil: Some(sigil),
                twigil: Some(twigil),
                base: rest_chars.as_str(),
            },
            _ => Self {
                sigil: Some(sigil),
                twigil: None,
                base: rest,
            },
        }
    }

    pub fn has_sigil(&self) -> bool {
        self.sigil.is_some()
    }

    /// `Foo::Bar::baz` → `("Foo::Bar", "baz")`.
    pub fn split_qualified(&self) -> Option<(&'a str, &'a str)> {
        self.base.rsplit_once("::")
    }
}
