//! Raku words that must never be renamed.
//!
//! Language keywords, phaser names and built-in type names. Kept sorted so
//! lookups can binary-search.

pub const RESERVED_WORDS: &[&str] = &[
    "Any", "Array", "Associative", "BEGIN", "Bag", "Block", "Bool", "CATCH", "CHECK", "CLOSE",
    "CONTROL", "Callable", "Capture", "Channel", "Code", "Complex", "DateTime", "Duration", "END",
    "ENTER", "Exception", "FIRST", "Failure", "Grammar", "Hash", "INIT", "IO", "Instant", "Int",
    "Junction", "KEEP", "LAST", "LEAVE", "List", "Map", "Match", "Method", "Mix", "Mu", "NEXT",
    "Nil", "Num", "POST", "PRE", "Pair", "Positional", "Promise", "QUIT", "Range", "Rat", "Regex",
    "Routine", "START", "Scalar", "Seq", "Set", "Slip", "Str", "Sub", "Supply", "UNDO", "Whatever",
    "but", "class", "constant", "default", "die", "does", "else", "elsif", "enum", "fail", "for",
    "given", "grammar", "has", "if", "import", "is", "last", "let", "loop", "method", "module",
    "multi", "my", "need", "next", "only", "our", "package", "proceed", "proto", "redo", "repeat",
    "require", "return", "role", "state", "sub", "succeed", "temp", "trusts", "try", "unless",
    "until", "use", "warn", "when", "while",
];

/// Whether `word` (without sigil or twigil) is reserved.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.binary_search(&word).is_ok()
}
