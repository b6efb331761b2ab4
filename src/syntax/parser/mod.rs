//! Line-cascade declaration parser.
//!
//! Raku has no cheap embeddable parser, so declarations are found one
//! statement line at a time: every line is offered to an ordered list of
//! recognizers and the first that matches wins. Recognizers are pure
//! functions of the line and a [`ParserContext`]; the driver threads the
//! context they return into the next step.
//!
//! The parser produces [`Declaration`]s. Turning those into symbol tables is
//! the job of [`crate::hir::parse_document`].

mod extent;
mod recognize;

use smol_str::SmolStr;
use tracing::{trace, warn};

use crate::syntax::lexer::LineClassifier;
use crate::syntax::strip::strip_literals;
use recognize::{
    callable, field, import, local_variables, phaser, production, scope_declaration,
    typed_object,
};

// ============================================================================
// MODES
// ============================================================================

/// Which recognizer set runs, and how much work is done per declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseMode {
    /// Declarations with block end lines, for outlines and folding.
    Outline,
    /// Declarations plus local variables and typed objects, for resolution.
    Navigation,
    /// Declarations only, on raw (unstripped) text.
    Refinement,
    /// Indexable declarations with end lines, for the workspace index.
    WorkspaceIndex,
}

impl ParseMode {
    pub fn strips_literals(self) -> bool {
        self != ParseMode::Refinement
    }

    /// Callable/production/phaser end lines are only computed when asked for.
    /// Scope declarations always get an end line since it drives scoping.
    pub fn computes_callable_extents(self) -> bool {
        matches!(self, ParseMode::Outline | ParseMode::WorkspaceIndex)
    }

    fn recognizers(self) -> &'static [Recognizer] {
        match self {
            ParseMode::Outline => OUTLINE,
            ParseMode::Navigation => NAVIGATION,
            ParseMode::Refinement => REFINEMENT,
            ParseMode::WorkspaceIndex => WORKSPACE_INDEX,
        }
    }
}

const OUTLINE: &[Recognizer] = &[scope_declaration, callable, production, field, phaser, import];
const NAVIGATION: &[Recognizer] = &[
    scope_declaration,
    callable,
    production,
    field,
    phaser,
    typed_object,
    local_variables,
    import,
];
const REFINEMENT: &[Recognizer] = &[scope_declaration, callable, production, field];
const WORKSPACE_INDEX: &[Recognizer] = &[scope_declaration, callable, production, phaser, import];

// ============================================================================
// RECOGNIZED FORMS
// ============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Package,
    Class,
    Role,
    Grammar,
    Module,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Sub,
    Method,
    Submethod,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProductionKind {
    /// `token` and `regex`
    Token,
    Rule,
}

/// What a recognizer found on one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognizedForm {
    Scope {
        kind: ScopeKind,
        name: SmolStr,
        end: u32,
    },
    Callable {
        kind: CallableKind,
        name: SmolStr,
        end: u32,
        params: Vec<SmolStr>,
    },
    Production {
        kind: ProductionKind,
        name: SmolStr,
        end: u32,
    },
    Field {
        name: SmolStr,
    },
    Phaser {
        name: SmolStr,
        end: u32,
    },
    /// One or more local variables; `type_name` is set for `Foo.new` objects.
    Variables {
        names: Vec<SmolStr>,
        type_name: Option<SmolStr>,
    },
    Import {
        module: SmolStr,
    },
}

/// A recognized form with the line and enclosing scope it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub line: u32,
    pub scope: SmolStr,
    pub form: RecognizedForm,
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Parser state between lines. Recognizers never mutate it in place; they
/// return the context for the next line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserContext {
    /// Enclosing package/class/role/grammar/module, empty at top level.
    pub scope: SmolStr,
    /// Last line of `scope`.
    pub scope_end: Option<u32>,
    /// The previous line left a variable or parameter list open.
    pub decl_continues: bool,
}

impl ParserContext {
    pub fn with_scope(mut self, scope: SmolStr, end: u32) -> Self {
        self.scope = scope;
        self.scope_end = Some(end);
        self
    }

    pub fn with_decl_continues(mut self, continues: bool) -> Self {
        self.decl_continues = continues;
        self
    }

    /// The context at the start of `line`: a scope whose block has ended is
    /// dropped.
    fn enter_line(self, line: u32) -> Self {
        match self.scope_end {
            Some(end) if line > end => Self {
                scope: SmolStr::default(),
                scope_end: None,
                ..self
            },
            _ => self,
        }
    }
}

/// A recognizer's result: the form and the context for the next line.
#[derive(Clone, Debug)]
pub struct Recognized {
    pub form: RecognizedForm,
    pub context: ParserContext,
}

/// The prepared lines of a document and the line being looked at.
#[derive(Copy, Clone, Debug)]
pub struct LineCursor<'a> {
    pub lines: &'a [String],
    pub index: usize,
    pub mode: ParseMode,
}

impl<'a> LineCursor<'a> {
    pub fn stmt(&self) -> &'a str {
        &self.lines[self.index]
    }

    pub fn line(&self) -> u32 {
        self.index as u32
    }
}

type Recognizer = fn(&LineCursor<'_>, &ParserContext) -> Option<Recognized>;

// ============================================================================
// DRIVER
// ============================================================================

/// Run the recognizer cascade for `mode` over `lines`.
///
/// With no classifier (or one that fails) literals are not stripped and the
/// parse proceeds on trimmed raw lines.
pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    mode: ParseMode,
    classifier: Option<&dyn LineClassifier>,
) -> Vec<Declaration> {
    let prepared = prepare_lines(lines, mode, classifier);
    let recognizers = mode.recognizers();
    let mut context = ParserContext::default();
    let mut out = Vec::new();

    for index in 0..prepared.len() {
        let line = index as u32;
        context = context.enter_line(line);
        if prepared[index].is_empty() {
            continue;
        }
        let cursor = LineCursor {
            lines: &prepared,
            index,
            mode,
        };
        if let Some(Recognized { form, context: next }) =
            recognizers.iter().find_map(|recognize| recognize(&cursor, &context))
        {
            trace!(line, ?form, "recognized");
            out.push(Declaration {
                line,
                scope: context.scope.clone(),
                form,
            });
            context = next;
        }
    }
    out
}

fn prepare_lines<S: AsRef<str>>(
    lines: &[S],
    mode: ParseMode,
    classifier: Option<&dyn LineClassifier>,
) -> Vec<String> {
    if mode.strips_literals() {
        if let Some(classifier) = classifier {
            match strip_literals(lines, classifier) {
                Ok(stripped) => return stripped,
                Err(err) => warn!(%err, "parsing without literal stripping"),
            }
        }
    }
    lines.iter().map(|l| l.as_ref().trim().to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::RakuClassifier;

    fn parse(text: &str, mode: ParseMode) -> Vec<Declaration> {
        let lines: Vec<&str> = text.split('\n').collect();
        parse_lines(&lines, mode, Some(&RakuClassifier))
    }

    fn names(decls: &[Declaration]) -> Vec<(u32, &str, &str)> {
        decls
            .iter()
            .filter_map(|d| {
                let name = match &d.form {
                    RecognizedForm::Scope { name, .. }
                    | RecognizedForm::Callable { name, .. }
                    | RecognizedForm::Production { name, .. }
                    | RecognizedForm::Field { name }
                    | RecognizedForm::Phaser { name, .. } => name.as_str(),
                    _ => return None,
                };
                Some((d.line, name, d.scope.as_str()))
            })
            .collect()
    }

    #[test]
    fn test_scope_ends_with_its_block() {
        let decls = parse(
            "class Foo{\n has $.x;\n}\n\nsub bar{\n return 1;\n}",
            ParseMode::Outline,
        );
        assert_eq!(
            names(&decls),
            vec![(0, "Foo", ""), (1, "$.x", "Foo"), (4, "bar", "")]
        );
    }

    #[test]
    fn test_scope_without_space_before_brace() {
        let decls = parse(
            "class FooNoSpace{\n  method m() { }\n}\nsub bar-no-space{\n}",
            ParseMode::Navigation,
        );
        assert_eq!(
            names(&decls),
            vec![(0, "FooNoSpace", ""), (1, "m", "FooNoSpace"), (3, "bar-no-space", "")]
        );
    }

    #[test]
    fn test_first_match_wins() {
        // `my sub` is a callable, not a local variable declaration.
        let decls = parse("my sub helper($x) { }", ParseMode::Navigation);
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0].form, RecognizedForm::Callable { .. }));
    }

    #[test]
    fn test_brace_in_string_does_not_open_block() {
        let decls = parse(
            "class A {\n  method m { say \"}\" }\n}\nsub top { }",
            ParseMode::Outline,
        );
        assert_eq!(names(&decls).last(), Some(&(3, "top", "")));
        assert!(matches!(
            decls[0].form,
            RecognizedForm::Scope { end: 2, .. }
        ));
    }

    #[test]
    fn test_refinement_mode_skips_locals_and_imports() {
        let decls = parse("use JSON::Fast;\nmy $x = 1;\nsub f { }", ParseMode::Refinement);
        assert_eq!(names(&decls), vec![(2, "f", "")]);
    }

    #[test]
    fn test_navigation_mode_records_variables() {
        let decls = parse("my ($a, $b) = 1, 2;", ParseMode::Navigation);
        assert_eq!(
            decls[0].form,
            RecognizedForm::Variables {
                names: vec!["$a".into(), "$b".into()],
                type_name: None
            }
        );
    }

    #[test]
    fn test_context_drops_expired_scope() {
        let ctx = ParserContext::default().with_scope("Foo".into(), 2);
        assert_eq!(ctx.clone().enter_line(2).scope, "Foo");
        assert_eq!(ctx.enter_line(3).scope, "");
    }
}
