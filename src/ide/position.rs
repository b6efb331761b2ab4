//! Finding the symbol under the cursor.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

use crate::base::{LineCol, LineColRange};

/// A sigil with an optional twigil, then identifier segments joined by
/// inner hyphens or `::`.
static SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[$@%][.!]?)?[\p{L}_]\w*(?:(?:-|::)[\p{L}_]\w*)*").expect("invalid symbol regex")
});

/// A symbol as written at some position, and where it was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolAt {
    pub text: SmolStr,
    pub range: LineColRange,
}

/// The symbol covering `position.col` (a byte offset) in `line_text`.
///
/// A cursor right after the last character still selects the symbol.
pub fn symbol_at(line_text: &str, position: LineCol) -> Option<SymbolAt> {
    let col = position.col as usize;
    let mut touching = None;
    for found in SYMBOL.find_iter(line_text) {
        if found.start() > col {
            break;
        }
        if col < found.end() {
            touching = Some(found);
            break;
        }
        if col == found.end() {
            touching = Some(found);
        }
    }
    let found = touching?;
    Some(SymbolAt {
        text: SmolStr::new(found.as_str()),
        range: LineColRange::on_line(position.line, found.start() as u32, found.end() as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("my $foo = 1;", 4, "$foo")]
    #[case("my $foo = 1;", 3, "$foo")]
    #[case("my $foo = 1;", 7, "$foo")]
    #[case("say $.name;", 6, "$.name")]
    #[case("openai-request(:$model);", 3, "openai-request")]
    #[case("Foo::Bar.new", 5, "Foo::Bar")]
    #[case("Foo::Bar.new", 10, "new")]
    #[case("$x-1", 1, "$x")]
    fn test_symbol_at(#[case] line: &str, #[case] col: u32, #[case] expected: &str) {
        let found = symbol_at(line, LineCol::new(0, col)).unwrap();
        assert_eq!(found.text, expected);
    }

    #[test]
    fn test_symbol_range() {
        let found = symbol_at("  foo();", LineCol::new(3, 3)).unwrap();
        assert_eq!(found.range, LineColRange::on_line(3, 2, 5));
    }

    #[test]
    fn test_no_symbol_on_punctuation() {
        assert_eq!(symbol_at("a = (1);", LineCol::new(0, 5)), None);
        assert_eq!(symbol_at("", LineCol::new(0, 0)), None);
    }
}
