//! Removing comments and literal bodies before declarations are recognized.
//!
//! Braces and keywords inside strings, patterns and comments would otherwise
//! confuse both the recognizers and the brace-counting extent scans.

use crate::syntax::lexer::{LexState, LineClassifier, ClassifyError};

/// Stands in for a string or pattern literal that opens on a line.
pub const LITERAL_PLACEHOLDER: &str = "___";

/// Strip every line, threading the classifier state from the top.
///
/// Comments vanish. A literal opening on the line becomes
/// [`LITERAL_PLACEHOLDER`]; the continuation of a literal from an earlier
/// line vanishes. Results are trimmed.
pub fn strip_literals<S: AsRef<str>>(
    lines: &[S],
    classifier: &dyn LineClassifier,
) -> Result<Vec<String>, ClassifyError> {
    let mut state = LexState::new();
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.as_ref();
        let continuing = state.in_literal();
        let (spans, next) = classifier.classify(line, &state)?;
        let mut stripped = String::with_capacity(line.len());
        for span in &spans {
            if span.class.is_code() {
                stripped.push_str(&line[span.range]);
            } else if span.class.is_literal()
                && !(continuing && u32::from(span.range.start()) == 0)
            {
                stripped.push_str(LITERAL_PLACEHOLDER);
            }
        }
        out.push(stripped.trim().to_owned());
        state = next;
    }
    Ok(out)
}
