//! The statement recognizers, one per declaration form.
//!
//! Each recognizer looks at the prepared (trimmed, usually stripped) line
//! under the cursor and either declines or returns the recognized form and
//! the context for the next line.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

use super::extent::{block_end, lookahead_params, scope_end, signature_params, variables_in};
use super::{
    CallableKind, LineCursor, ParserContext, ProductionKind, Recognized, RecognizedForm,
    ScopeKind,
};

// ============================================================================
// PATTERNS
// ============================================================================

static SCOPE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:my|our|unit)\s+)?(?:proto\s+)?(package|class|role|grammar|module)\s+(\w(?:[\w\-]|::)*)",
    )
    .expect("invalid scope declaration regex")
});

static CALLABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:my|our)\s+)?(?:(?:multi|proto|only)\s+)?(sub|method|submethod)\s+!?([\p{L}_][\w\-]*)(.*)$",
    )
    .expect("invalid callable regex")
});

/// `multi foo(...)`: a multi without an explicit routine keyword.
static BARE_MULTI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:my|our)\s+)?(?:multi|proto|only)\s+!?([\p{L}_][\w\-]*)(.*)$")
        .expect("invalid bare multi regex")
});

static PRODUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:my|our)\s+)?(?:(?:proto|multi)\s+)?(token|rule|regex)\s+([\p{L}_][\w\-]*)")
        .expect("invalid production regex")
});

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:has|HAS)\s+(?:[\w:\[\]]+\s+)?([$@%&][.!][\w\-]+)")
        .expect("invalid field regex")
});

static PHASER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(BEGIN|CHECK|INIT|END|ENTER|LEAVE|KEEP|UNDO|FIRST|NEXT|LAST|PRE|POST|CATCH|CONTROL|QUIT|CLOSE)\s*\{",
    )
    .expect("invalid phaser regex")
});

/// `my $x = Foo::Bar.new(...)`
static CONSTRUCTED_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:my|our|state|let)\s+(\$[\w\-]+)\s*=\s*(\w(?:[\w\-]|::)*)\.new\b")
        .expect("invalid constructed object regex")
});

/// `my Foo $x .= new(...)`
static TYPED_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:my|our|state|let)\s+(\w(?:[\w\-]|::)*)\s+(\$[\w\-]+)\s*\.=\s*new\b")
        .expect("invalid typed object regex")
});

static DECLARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:my|our|let|state)\b\s*").expect("invalid declarator regex"));

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*=.*$").expect("invalid assignment regex"));

static BLOCK_OR_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:\{[^}]|\)).*$").expect("invalid block regex"));

/// `if (my $x = ...)`, `} elsif (my $y ...`, `for (my $i = 0; ...)`
static LOOP_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\}\s*elsif|if|unless|while|until|for|with)?\s*\(\s*my\b([^)]*)")
        .expect("invalid loop declaration regex")
});

/// `for @xs -> $x, $y {`
static POINTY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^-])->\s*((?:[$@%][\w\-]+\s*,?\s*)+)").expect("invalid pointy block regex")
});

static CATCH_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\}?\s*catch\s*\(\s*(\$\w+)\s*\)\s*\{?$").expect("invalid catch regex")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:use|need|require)\s+(\w(?:[\w\-]|::)*)").expect("invalid import regex")
});

static VERSION_PRAGMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d").expect("invalid version regex"));

// ============================================================================
// RECOGNIZERS
// ============================================================================

fn recognized(form: RecognizedForm, context: ParserContext) -> Option<Recognized> {
    Some(Recognized { form, context })
}

pub(super) fn scope_declaration(
    cursor: &LineCursor<'_>,
    ctx: &ParserContext,
) -> Option<Recognized> {
    let caps = SCOPE_DECLARATION.captures(cursor.stmt())?;
    let kind = match &caps[1] {
        "package" => ScopeKind::Package,
        "class" => ScopeKind::Class,
        "role" => ScopeKind::Role,
        "grammar" => ScopeKind::Grammar,
        _ => ScopeKind::Module,
    };
    let name = SmolStr::new(caps[2].trim_end_matches('-'));
    let end = scope_end(cursor.lines, cursor.index);
    recognized(
        RecognizedForm::Scope {
            kind,
            name: name.clone(),
            end,
        },
        ctx.clone().with_scope(name, end),
    )
}

pub(super) fn callable(cursor: &LineCursor<'_>, ctx: &ParserContext) -> Option<Recognized> {
    let stmt = cursor.stmt();
    let (kind, name, rest) = match CALLABLE.captures(stmt) {
        Some(caps) => {
            let kind = match &caps[1] {
                "sub" => CallableKind::Sub,
                "method" => CallableKind::Method,
                _ => CallableKind::Submethod,
            };
            (kind, caps.get(2)?, caps.get(3)?)
        }
        None => {
            let caps = BARE_MULTI.captures(stmt)?;
            let name = caps.get(1)?;
            if matches!(name.as_str(), "token" | "rule" | "regex") {
                return None;
            }
            (CallableKind::Sub, name, caps.get(2)?)
        }
    };
    let name = SmolStr::new(name.as_str().trim_end_matches('-'));
    let header = rest.as_str().split('{').next().unwrap_or_default();

    let mut params = signature_params(header);
    for param in lookahead_params(cursor.lines, cursor.index) {
        if !params.contains(&param) {
            params.push(param);
        }
    }

    let end = if cursor.mode.computes_callable_extents() {
        block_end(cursor.lines, cursor.index)
    } else {
        cursor.line()
    };
    let continues = !(stmt.ends_with(';') || stmt.contains([')', '}', '{']));
    recognized(
        RecognizedForm::Callable {
            kind,
            name,
            end,
            params,
        },
        ctx.clone().with_decl_continues(continues),
    )
}

pub(super) fn production(cursor: &LineCursor<'_>, ctx: &ParserContext) -> Option<Recognized> {
    let caps = PRODUCTION.captures(cursor.stmt())?;
    let kind = match &caps[1] {
        "rule" => ProductionKind::Rule,
        _ => ProductionKind::Token,
    };
    let end = if cursor.mode.computes_callable_extents() {
        block_end(cursor.lines, cursor.index)
    } else {
        cursor.line()
    };
    recognized(
        RecognizedForm::Production {
            kind,
            name: SmolStr::new(caps[2].trim_end_matches('-')),
            end,
        },
        ctx.clone(),
    )
}

pub(super) fn field(cursor: &LineCursor<'_>, ctx: &ParserContext) -> Option<Recognized> {
    let caps = FIELD.captures(cursor.stmt())?;
    recognized(
        RecognizedForm::Field {
            name: SmolStr::new(&caps[1]),
        },
        ctx.clone(),
    )
}

pub(super) fn phaser(cursor: &LineCursor<'_>, ctx: &ParserContext) -> Option<Recognized> {
    let caps = PHASER.captures(cursor.stmt())?;
    let end = if cursor.mode.computes_callable_extents() {
        block_end(cursor.lines, cursor.index)
    } else {
        cursor.line()
    };
    recognized(
        RecognizedForm::Phaser {
            name: SmolStr::new(&caps[1]),
            end,
        },
        ctx.clone(),
    )
}

pub(super) fn typed_object(cursor: &LineCursor<'_>, ctx: &ParserContext) -> Option<Recognized> {
    let stmt = cursor.stmt();
    let (var, type_name) = if let Some(caps) = CONSTRUCTED_OBJECT.captures(stmt) {
        (SmolStr::new(&caps[1]), SmolStr::new(&caps[2]))
    } else {
        let caps = TYPED_OBJECT.captures(stmt)?;
        (SmolStr::new(&caps[2]), SmolStr::new(&caps[1]))
    };
    recognized(
        RecognizedForm::Variables {
            names: vec![var],
            type_name: Some(type_name),
        },
        ctx.clone().with_decl_continues(false),
    )
}

pub(super) fn local_variables(
    cursor: &LineCursor<'_>,
    ctx: &ParserContext,
) -> Option<Recognized> {
    let stmt = cursor.stmt();
    let variables = |names: Vec<SmolStr>, continues: bool| {
        recognized(
            RecognizedForm::Variables {
                names,
                type_name: None,
            },
            ctx.clone().with_decl_continues(continues),
        )
    };

    // A declaration, or the rest of one, consumes the line even when it
    // names nothing so the continuation flag is always cleared.
    if ctx.decl_continues || DECLARATOR.is_match(stmt) {
        let continues = !stmt.contains([')', '=', '}', '{', ';']);
        let declared = DECLARATOR.replace(stmt, "");
        let declared = ASSIGNMENT.replace(&declared, "");
        let declared = BLOCK_OR_CLOSE.replace(&declared, "");
        return variables(variables_in(&declared).collect(), continues);
    }
    let some_names = |names: Vec<SmolStr>| {
        if names.is_empty() {
            None
        } else {
            variables(names, false)
        }
    };
    if let Some(caps) = LOOP_DECLARATION.captures(stmt) {
        let declared = ASSIGNMENT.replace(&caps[1], "");
        return some_names(variables_in(&declared).collect());
    }
    if let Some(caps) = POINTY_BLOCK.captures(stmt) {
        return some_names(variables_in(&caps[1]).collect());
    }
    let caps = CATCH_BINDING.captures(stmt)?;
    some_names(vec![SmolStr::new(&caps[1])])
}

pub(super) fn import(cursor: &LineCursor<'_>, ctx: &ParserContext) -> Option<Recognized> {
    let caps = IMPORT.captures(cursor.stmt())?;
    let module = caps.get(1)?.as_str();
    if VERSION_PRAGMA.is_match(module) {
        return None;
    }
    recognized(
        RecognizedForm::Import {
            module: SmolStr::new(module),
        },
        ctx.clone(),
    )
}
