//! End-line scans and signature lookahead over prepared lines.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

/// `= {}` default arguments must not count as block openers.
static EMPTY_HASH_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\s*\{\s*\}").expect("invalid empty hash regex"));

static SIBLING_SCOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:my|our|unit)\s+)?(?:proto\s+)?(?:package|class|role|grammar|module)\s+")
        .expect("invalid sibling scope regex")
});

static UNIT_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^unit\s+").expect("invalid unit regex"));

static CLOSING_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^{])\}").expect("invalid closing brace regex"));

/// `my ($a, $b) = @_;`
static ARGS_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"my\s*\(([^)]*)\)\s*=\s*@_").expect("invalid args list regex"));

/// `my $x = shift;` and `my ($x) = shift;`
static SHIFT_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"my\s*\(?\s*(\$[\w\-]+)\s*\)?\s*=\s*shift\b").expect("invalid shift regex")
});

/// Everything from the start of a body or the end of a parameter list.
static BODY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:\{[^}]|\)).*$").expect("invalid body start regex"));

static DEFAULT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\s*[^,)]*").expect("invalid default value regex"));

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$@%][.!]?\w+(?:-[\p{L}_]\w*|::\w+)*").expect("invalid variable regex")
});

/// Lines after a callable header searched for more parameters.
const LOOKAHEAD_DEPTH: usize = 4;

/// Every sigil-prefixed identifier in `text`, in order.
pub(super) fn variables_in(text: &str) -> impl Iterator<Item = SmolStr> + '_ {
    VARIABLE.find_iter(text).map(|m| SmolStr::new(m.as_str()))
}

/// Parameter variables in signature text, ignoring default values.
pub(super) fn signature_params(signature: &str) -> Vec<SmolStr> {
    let signature = EMPTY_HASH_DEFAULT.replace_all(signature, "");
    let signature = DEFAULT_VALUE.replace_all(&signature, "");
    variables_in(&signature).collect()
}

/// Line on which the block opened at or after `start` closes.
///
/// Gives up (returning `None`) when `give_up` says so before any brace
/// has been seen, or at end of input.
fn closing_line(
    lines: &[String],
    start: usize,
    give_up: impl Fn(usize, &str) -> bool,
) -> Option<usize> {
    let mut depth: i64 = 0;
    let mut opened = false;
    for (index, line) in lines.iter().enumerate().skip(start) {
        let stmt = EMPTY_HASH_DEFAULT.replace_all(line, "");
        for c in stmt.chars() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return Some(index);
        }
        if !opened && give_up(index, &stmt) {
            return None;
        }
    }
    None
}

/// Last line of a package/class/role/grammar/module declared at `start`.
///
/// A `;`-terminated header without a block is a forward declaration, unless
/// it is a `unit` declaration. A declaration that never opens a block runs
/// to the line before the next sibling scope declaration, else to the end.
pub(super) fn scope_end(lines: &[String], start: usize) -> u32 {
    let first = lines[start].as_str();
    let unit = UNIT_DECLARATION.is_match(first);
    if !unit && first.ends_with(';') && !first.contains('{') {
        return start as u32;
    }
    if !unit {
        let block = closing_line(lines, start, |index, stmt| {
            stmt.contains(';') || index - start > 1
        });
        if let Some(end) = block {
            return end as u32;
        }
    }
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| SIBLING_SCOPE.is_match(line))
        .map(|(index, _)| index - 1)
        .unwrap_or(lines.len().saturating_sub(1));
    end.max(start) as u32
}

/// Last line of a callable, production or phaser declared at `start`.
pub(super) fn block_end(lines: &[String], start: usize) -> u32 {
    if lines[start].ends_with(';') {
        return start as u32;
    }
    closing_line(lines, start, |_, _| false).unwrap_or(start) as u32
}

/// Parameters that only show up after the header line: multi-line
/// signatures and `my (...) = @_` / `my $x = shift` bodies.
pub(super) fn lookahead_params(lines: &[String], start: usize) -> Vec<SmolStr> {
    let mut params = Vec::new();
    let mut signature_continues = true;
    for (offset, stmt) in lines[start..].iter().enumerate() {
        if signature_continues {
            signature_continues = !(stmt.ends_with(';') || stmt.contains([')', '}', '{']));
            if offset > 0 {
                let head = BODY_START.replace(stmt, "");
                params.extend(signature_params(&head));
            }
        }
        if let Some(caps) = ARGS_LIST.captures(stmt) {
            params.extend(variables_in(&caps[1]));
        } else if let Some(caps) = SHIFT_ARG.captures(stmt) {
            params.push(SmolStr::new(&caps[1]));
        }
        if offset >= LOOKAHEAD_DEPTH || CLOSING_BRACE.is_match(stmt) {
            break;
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn test_scope_end_follows_braces() {
        let src = lines("class A {\n  method m { }\n}\nsub after { }");
        assert_eq!(scope_end(&src, 0), 2);
    }

    #[test]
    fn test_forward_declaration_ends_immediately() {
        let src = lines("class A;\nsub f { }");
        assert_eq!(scope_end(&src, 0), 0);
    }

    #[test]
    fn test_unit_declaration_runs_to_next_sibling_or_eof() {
        let src = lines("unit class A;\nmethod m { }\nclass B { }\nsub x { }");
        assert_eq!(scope_end(&src, 0), 1);

        let src = lines("unit module M;\nsub a { }\nsub b { }");
        assert_eq!(scope_end(&src, 0), 2);
    }

    #[test]
    fn test_brace_on_following_line() {
        let src = lines("class A\n  is B\n{\n}\n");
        assert_eq!(scope_end(&src, 0), 3);
    }

    #[test]
    fn test_empty_hash_default_is_not_a_block() {
        let src = lines("sub f(%opts = {}) {\n  say 1;\n}");
        assert_eq!(block_end(&src, 0), 2);
    }

    #[test]
    fn test_block_end_forward_and_unclosed() {
        assert_eq!(block_end(&lines("sub stub($x);"), 0), 0);
        assert_eq!(block_end(&lines("sub open {\n say 1;"), 0), 0);
    }

    #[test]
    fn test_signature_params_drop_defaults() {
        assert_eq!(
            signature_params("(Str :$model!, :$json = False, *@rest, %opts = {})"),
            vec!["$model", "$json", "@rest", "%opts"]
        );
    }

    #[test]
    fn test_lookahead_multi_line_signature() {
        let src = lines(
            "multi sub openai-request\n(\n:$model!,\n:$json = False,\n) is export {\n}",
        );
        assert_eq!(lookahead_params(&src, 0), vec!["$model", "$json"]);
    }

    #[test]
    fn test_lookahead_stops_after_depth() {
        let src = lines("sub wide(\n$a,\n$b,\n$c,\n$d,\n$e,\n) { }");
        assert_eq!(lookahead_params(&src, 0), vec!["$a", "$b", "$c", "$d"]);
    }

    #[test]
    fn test_lookahead_shift_and_args_idioms() {
        let src = lines("sub old {\nmy ($a, $b) = @_;\n}");
        assert_eq!(lookahead_params(&src, 0), vec!["$a", "$b"]);

        let src = lines("sub old {\nmy $self = shift;\n}");
        assert_eq!(lookahead_params(&src, 0), vec!["$self"]);
    }
}
