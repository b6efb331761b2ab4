//! Lexical classification and declaration recognition for Raku source.
//!
//! ```text
//! text ─► lexer (classify) ─► strip (remove literals) ─► parser (recognizers)
//! ```

pub mod keywords;
pub mod lexer;
pub mod parser;
pub mod strip;
pub mod symbol;

pub use lexer::{
    classify_lines, ClassifiedSpan, ClassifyError, LexState, LineClassifier, RakuClassifier,
    SpanClass,
};
pub use parser::{
    parse_lines, CallableKind, Declaration, ParseMode, ParserContext, ProductionKind,
    RecognizedForm, ScopeKind,
};
pub use strip::{strip_literals, LITERAL_PLACEHOLDER};
pub use symbol::SymbolName;
