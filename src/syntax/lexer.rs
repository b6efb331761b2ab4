//! Lexical classification of Raku source lines.
//!
//! The classifier works one line at a time and threads a [`LexState`]
//! between lines, so multi-line strings, embedded comments, POD blocks and
//! heredocs keep their classification on continuation lines. Each line is
//! split into [`ClassifiedSpan`]s whose byte ranges cover the whole line.
//!
//! Code is tokenized with `logos`; quoted constructs are then scanned
//! delimiter by delimiter, because their extent depends on nesting and on
//! state carried across lines.

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

// ============================================================================
// PUBLIC TYPES
// ============================================================================

/// What a span of source text is, lexically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpanClass {
    Code,
    String,
    Comment,
    /// A regex/pattern literal (`/.../`, `rx{...}`, `s/a/b/`, ...).
    Pattern,
}

impl SpanClass {
    pub fn is_code(self) -> bool {
        self == SpanClass::Code
    }

    /// Strings and patterns, as opposed to comments and code.
    pub fn is_literal(self) -> bool {
        matches!(self, SpanClass::String | SpanClass::Pattern)
    }
}

/// A classified byte range within one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedSpan {
    pub range: TextRange,
    pub class: SpanClass,
}

impl ClassifiedSpan {
    fn new(start: usize, end: usize, class: SpanClass) -> Self {
        Self {
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            class,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("lexical classifier unavailable: {0}")]
    Unavailable(String),
}

/// Lexical state carried from the end of one line to the start of the next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexState {
    mode: Mode,
    /// Heredoc terminators still to be consumed, in order of appearance.
    heredocs: Vec<SmolStr>,
}

impl LexState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the next line starts as plain code.
    pub fn is_code(&self) -> bool {
        self.mode == Mode::Code
    }

    /// True when the next line starts inside a string or pattern literal.
    pub fn in_literal(&self) -> bool {
        match &self.mode {
            Mode::Quoted(quote) => quote.class.is_literal(),
            Mode::Heredoc => true,
            Mode::Code | Mode::Pod(_) => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Code,
    Quoted(Quote),
    Pod(PodBlock),
    Heredoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Quote {
    class: SpanClass,
    /// Opening bracket, for delimiters that nest.
    open: Option<char>,
    close: char,
    depth: u32,
    /// Delimited parts still to close (2 for `s/a/b/` and `tr/a/b/`).
    parts: u8,
    escapes: bool,
}

impl Quote {
    fn new(class: SpanClass, delimiter: char) -> Self {
        let (open, close) = match closing_bracket(delimiter) {
            Some(close) => (Some(delimiter), close),
            None => (None, delimiter),
        };
        Self {
            class,
            open,
            close,
            depth: 0,
            parts: 1,
            escapes: true,
        }
    }

    fn with_parts(mut self, parts: u8) -> Self {
        self.parts = parts;
        self
    }

    fn without_escapes(mut self) -> Self {
        self.escapes = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PodBlock {
    /// `=begin NAME` ... `=end NAME`
    Delimited(SmolStr),
    /// `=head1`, `=item`, `=for` ...: runs until a blank line.
    Paragraph,
    /// `=finish` / `=END`: the rest of the file.
    Finish,
}

/// Splits one line into classified spans, given the state at its start.
pub trait LineClassifier {
    fn classify(
        &self,
        line: &str,
        state: &LexState,
    ) -> Result<(Vec<ClassifiedSpan>, LexState), ClassifyError>;
}

/// Classify a sequence of lines from the top of a document.
pub fn classify_lines<I>(
    classifier: &dyn LineClassifier,
    lines: I,
) -> Result<Vec<Vec<ClassifiedSpan>>, ClassifyError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut state = LexState::new();
    let mut out = Vec::new();
    for line in lines {
        let (spans, next) = classifier.classify(line.as_ref(), &state)?;
        out.push(spans);
        state = next;
    }
    Ok(out)
}

/// The built-in Raku classifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct RakuClassifier;

impl LineClassifier for RakuClassifier {
    fn classify(
        &self,
        line: &str,
        state: &LexState,
    ) -> Result<(Vec<ClassifiedSpan>, LexState), ClassifyError> {
        let mut scanner = LineScanner {
            line,
            state: state.clone(),
            spans: Vec::new(),
        };
        scanner.run();
        Ok(scanner.finish())
    }
}

// ============================================================================
// CODE TOKENS
// ============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
enum CodeToken {
    #[token("#")]
    Hash,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    #[token("｢")]
    CornerQuote,

    #[token("/")]
    Slash,

    #[token("//")]
    DoubleSlash,

    #[regex(r#"(Q|q|qq|qw|qqw|qx|qqx)(:[a-z]+)*[/|!{\[<«'"]"#)]
    QuoteOp,

    #[regex(r"(rx|m|ms|s|ss|tr|S|TR)(:[a-z]+)*[/|!{\[<«]")]
    PatternOp,

    #[regex(r"[$@%&][.!*^?:=~]?[\p{L}_][\p{L}\p{N}_]*(-[\p{L}_][\p{L}\p{N}_]*)*")]
    #[regex(r"\$[/!¢]")]
    Variable,

    #[regex(r"[\p{L}_][\p{L}\p{N}_]*(-[\p{L}_][\p{L}\p{N}_]*)*(::[\p{L}_][\p{L}\p{N}_]*(-[\p{L}_][\p{L}\p{N}_]*)*)*")]
    Identifier,

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?")]
    Number,

    #[token(")")]
    #[token("]")]
    #[token("}")]
    Closer,

    #[token(".")]
    Dot,
}

/// The previous significant token, used to tell `/` division from a pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Prev {
    Start,
    Operator,
    Term,
    Dot,
    /// A keyword after which a term is expected (`if /x/`).
    Keyword,
    /// A plain identifier, possibly a list operator call (`grep /x/, @a`).
    Ident,
}

const TERM_KEYWORDS: &[&str] = &[
    "and", "elsif", "first", "given", "grep", "if", "not", "or", "return", "unless", "until",
    "when", "where", "while", "with", "without", "xor",
];

fn closing_bracket(c: char) -> Option<char> {
    Some(match c {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        '«' => '»',
        '｢' => '｣',
        _ => return None,
    })
}

// ============================================================================
// LINE SCANNER
// ============================================================================

struct LineScanner<'a> {
    line: &'a str,
    state: LexState,
    spans: Vec<ClassifiedSpan>,
}

impl<'a> LineScanner<'a> {
    fn run(&mut self) {
        let len = self.line.len();
        let start = match std::mem::take(&mut self.state.mode) {
            Mode::Code => {
                if self.pod_directive() {
                    return;
                }
                0
            }
            Mode::Pod(block) => {
                self.pod_line(block);
                return;
            }
            Mode::Heredoc => {
                self.heredoc_line();
                return;
            }
            Mode::Quoted(mut quote) => match scan_quoted(self.line, 0, &mut quote) {
                Some(end) => {
                    self.push(0, end, quote.class);
                    end
                }
                None => {
                    self.push(0, len, quote.class);
                    self.state.mode = Mode::Quoted(quote);
                    return;
                }
            },
        };
        self.lex_code(start);
        if self.state.mode == Mode::Code && !self.state.heredocs.is_empty() {
            self.state.mode = Mode::Heredoc;
        }
    }

    fn finish(self) -> (Vec<ClassifiedSpan>, LexState) {
        let mut out = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in self.spans {
            let start = usize::from(span.range.start());
            if start > cursor {
                out.push(ClassifiedSpan::new(cursor, start, SpanClass::Code));
            }
            cursor = usize::from(span.range.end());
            out.push(span);
        }
        if cursor < self.line.len() {
            out.push(ClassifiedSpan::new(cursor, self.line.len(), SpanClass::Code));
        }
        (out, self.state)
    }

    fn push(&mut self, start: usize, end: usize, class: SpanClass) {
        if end > start {
            self.spans.push(ClassifiedSpan::new(start, end, class));
        }
    }

    /// Handle a line starting a POD block. Returns true if it did.
    fn pod_directive(&mut self) -> bool {
        let Some(rest) = self.line.trim_start().strip_prefix('=') else {
            return false;
        };
        if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return false;
        }
        let mut words = rest.split_whitespace();
        self.state.mode = match words.next().unwrap_or_default() {
            "begin" => Mode::Pod(PodBlock::Delimited(SmolStr::new(
                words.next().unwrap_or_default(),
            ))),
            "finish" | "END" => Mode::Pod(PodBlock::Finish),
            "end" => Mode::Code,
            _ => Mode::Pod(PodBlock::Paragraph),
        };
        self.push(0, self.line.len(), SpanClass::Comment);
        true
    }

    fn pod_line(&mut self, block: PodBlock) {
        let trimmed = self.line.trim();
        self.state.mode = match block {
            PodBlock::Paragraph if trimmed.is_empty() => Mode::Code,
            PodBlock::Delimited(ref name) => {
                let mut words = trimmed.split_whitespace();
                let closes = words.next() == Some("=end")
                    && (name.is_empty() || words.next() == Some(name.as_str()));
                if closes { Mode::Code } else { Mode::Pod(block) }
            }
            block => Mode::Pod(block),
        };
        self.push(0, self.line.len(), SpanClass::Comment);
    }

    fn heredoc_line(&mut self) {
        self.push(0, self.line.len(), SpanClass::String);
        if self
            .state
            .heredocs
            .first()
            .is_some_and(|term| self.line.trim() == term.as_str())
        {
            self.state.heredocs.remove(0);
        }
        self.state.mode = if self.state.heredocs.is_empty() {
            Mode::Code
        } else {
            Mode::Heredoc
        };
    }

    /// Open a quoted construct whose body starts at `body`. Returns the
    /// position after it, or `None` if it runs past the end of the line.
    fn open(&mut self, start: usize, body: usize, mut quote: Quote) -> Option<usize> {
        match scan_quoted(self.line, body, &mut quote) {
            Some(end) => {
                self.push(start, end, quote.class);
                Some(end)
            }
            None => {
                self.push(start, self.line.len(), quote.class);
                self.state.mode = Mode::Quoted(quote);
                None
            }
        }
    }

    fn lex_code(&mut self, mut pos: usize) {
        let line = self.line;
        let mut prev = Prev::Start;
        'restart: while pos < line.len() {
            let mut lexer = CodeToken::lexer(&line[pos..]);
            while let Some(token) = lexer.next() {
                let span = lexer.span();
                let (start, end) = (pos + span.start, pos + span.end);
                let Ok(token) = token else {
                    prev = Prev::Operator;
                    continue;
                };
                let resumed = match token {
                    CodeToken::Hash => match self.embedded_comment(end) {
                        Some((body, quote)) => self.open(start, body, quote),
                        None => {
                            self.push(start, line.len(), SpanClass::Comment);
                            return;
                        }
                    },
                    CodeToken::DoubleQuote => {
                        self.open(start, end, Quote::new(SpanClass::String, '"'))
                    }
                    CodeToken::SingleQuote => {
                        self.open(start, end, Quote::new(SpanClass::String, '\''))
                    }
                    CodeToken::CornerQuote => self.open(
                        start,
                        end,
                        Quote::new(SpanClass::String, '｢').without_escapes(),
                    ),
                    CodeToken::QuoteOp => self.quote_op(start, end, lexer.slice()),
                    CodeToken::PatternOp => {
                        let slice = lexer.slice();
                        let op = slice.split([':', '/', '|', '!', '{', '[', '<', '«']).next();
                        let parts = if matches!(op, Some("s" | "ss" | "S" | "tr" | "TR")) {
                            2
                        } else {
                            1
                        };
                        let delimiter = slice.chars().last().unwrap_or('/');
                        self.open(
                            start,
                            end,
                            Quote::new(SpanClass::Pattern, delimiter).with_parts(parts),
                        )
                    }
                    CodeToken::Slash if self.slash_starts_pattern(prev, start) => {
                        self.open(start, end, Quote::new(SpanClass::Pattern, '/'))
                    }
                    CodeToken::Slash | CodeToken::DoubleSlash => {
                        prev = Prev::Operator;
                        continue;
                    }
                    CodeToken::Variable | CodeToken::Number | CodeToken::Closer => {
                        prev = Prev::Term;
                        continue;
                    }
                    CodeToken::Dot => {
                        prev = Prev::Dot;
                        continue;
                    }
                    CodeToken::Identifier => {
                        prev = if prev == Prev::Dot {
                            Prev::Term
                        } else if TERM_KEYWORDS.contains(&lexer.slice()) {
                            Prev::Keyword
                        } else {
                            Prev::Ident
                        };
                        continue;
                    }
                };
                match resumed {
                    Some(next) => {
                        pos = next;
                        prev = Prev::Term;
                        continue 'restart;
                    }
                    None => return,
                }
            }
            return;
        }
    }

    /// `` #`( ``, `#|{` and `#={` open a bracketed comment.
    fn embedded_comment(&self, after_hash: usize) -> Option<(usize, Quote)> {
        let mut chars = self.line[after_hash..].chars();
        let marker = chars.next()?;
        if !matches!(marker, '`' | '|' | '=') {
            return None;
        }
        let bracket = chars.next()?;
        closing_bracket(bracket)?;
        let body = after_hash + marker.len_utf8() + bracket.len_utf8();
        Some((
            body,
            Quote::new(SpanClass::Comment, bracket).without_escapes(),
        ))
    }

    fn quote_op(&mut self, start: usize, end: usize, slice: &str) -> Option<usize> {
        let delimiter = slice.chars().last().unwrap_or('"');
        if slice.contains(":to") || slice.contains(":heredoc") {
            let close = closing_bracket(delimiter).unwrap_or(delimiter);
            let Some(offset) = self.line[end..].find(close) else {
                self.push(start, self.line.len(), SpanClass::String);
                return Some(self.line.len());
            };
            let terminator = self.line[end..end + offset].trim();
            self.state.heredocs.push(SmolStr::new(terminator));
            let after = end + offset + close.len_utf8();
            self.push(start, after, SpanClass::String);
            return Some(after);
        }
        let mut quote = Quote::new(SpanClass::String, delimiter);
        if slice.starts_with('Q') {
            quote = quote.without_escapes();
        }
        self.open(start, end, quote)
    }

    fn slash_starts_pattern(&self, prev: Prev, start: usize) -> bool {
        match prev {
            Prev::Start | Prev::Operator | Prev::Keyword => true,
            Prev::Term | Prev::Dot => false,
            Prev::Ident => {
                let spaced_before = self.line[..start].ends_with(char::is_whitespace);
                let tight_after = self.line[start + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| !c.is_whitespace());
                spaced_before && tight_after
            }
        }
    }
}

/// Scan a quoted construct from `from`; returns the position just past its
/// final closing delimiter, or `None` if the line ends first.
fn scan_quoted(line: &str, from: usize, quote: &mut Quote) -> Option<usize> {
    let mut chars = line[from..].char_indices().peekable();
    let mut escaped = false;
    while let Some((offset, c)) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        if quote.escapes && c == '\\' {
            escaped = true;
            continue;
        }
        if quote.open == Some(c) {
            quote.depth += 1;
            continue;
        }
        if c != quote.close {
            continue;
        }
        if quote.depth > 0 {
            quote.depth -= 1;
            continue;
        }
        let after = from + offset + c.len_utf8();
        quote.parts = quote.parts.saturating_sub(1);
        if quote.parts == 0 {
            return Some(after);
        }
        // Same-char delimiters: the second part starts right here.
        let Some(open) = quote.open else {
            continue;
        };
        // Bracketed second part, `s{a}{b}`; anything else ends the construct.
        let rest = &line[after..];
        let trimmed = rest.trim_start();
        if !trimmed.starts_with(open) {
            quote.parts = 0;
            return Some(after);
        }
        let resume = after + (rest.len() - trimmed.len()) + open.len_utf8();
        while chars.peek().is_some_and(|&(o, _)| from + o < resume) {
            chars.next();
        }
    }
    None
}
