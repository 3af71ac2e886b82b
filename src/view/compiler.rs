//! Nixs directive compiler.
//!
//! [`compile`] rewrites a Nixs source into minijinja template text through a fixed sequence
//! of whole-document regex passes:
//!
//! 1. `{{ expr }}` → `{{ escape_html(expr) }}`
//! 2. control directives (`@if`, `@elseif`, `@else`, `@endif`, `@foreach`, `@endforeach`,
//!    `@for`, `@endfor`, `@while`, `@endwhile`, `@php ... @endphp`)
//! 3. `@extends('name')` → recorded as the pending layout, no output
//! 4. `@section('name') ... @endsection` and `@yield('name')`, resolved in a single
//!    left-to-right pass: a section is recorded where it appears and a yield sees only the
//!    sections recorded before it
//! 5. `@include('name')` → the raw, uncompiled partial, or nothing if it does not exist
//! 6. `<form method="PUT|DELETE|PATCH">` → a POST form with a hidden `_method` field
//!
//! Variables assigned inside `@php` blocks live in a template-wide `namespace()` called
//! `__nixs`, declared at the top of the compiled output. Plain `{% set %}` is scoped to a
//! single loop iteration in minijinja, so a counter updated in a `@while` body would never
//! reach the loop condition otherwise.
//!
//! The passes are not a parser. Directive syntax inside string literals or comments is
//! rewritten like any other, and parenthesised arguments end at the first `)`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::context::RenderContext;
use super::source::ViewSource;
use crate::server::METHOD_OVERRIDE_FIELD;

/// Upper bound on `@while` iterations.
pub const WHILE_ITERATION_LIMIT: usize = 10_000;

/// Name of the namespace holding `@php` state.
const STATE: &str = "__nixs";

type Lowering = fn(&Captures<'_>, &Scope) -> String;

static INTERPOLATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(.+?)\s*\}\}").expect("invalid interpolation pattern"));

static DIRECTIVES: Lazy<Vec<(Regex, Lowering)>> = Lazy::new(|| {
    let table: [(&str, Lowering); 11] = [
        (r"@if\s*\((.*?)\)", |c, s| format!("{{% if {} %}}", php_expr(&c[1], s))),
        (r"@elseif\s*\((.*?)\)", |c, s| format!("{{% elif {} %}}", php_expr(&c[1], s))),
        (r"@else", |_, _| "{% else %}".to_string()),
        (r"@endif", |_, _| "{% endif %}".to_string()),
        (r"@foreach\s*\((.*?)\)", |c, s| lower_foreach(&c[1], s)),
        (r"@endforeach", |_, _| "{% endfor %}".to_string()),
        (r"@for\s*\((.*?)\)", |c, s| lower_for(&c[1], s)),
        (r"@endfor", |_, _| "{% endfor %}".to_string()),
        (r"@while\s*\((.*?)\)", |c, s| lower_while(&c[1], s)),
        (r"@endwhile", |_, _| "{% endfor %}".to_string()),
        (r"(?s)@php(.*?)@endphp", |c, s| lower_php(&c[1], s)),
    ];
    table
        .into_iter()
        .map(|(pattern, lower)| (Regex::new(pattern).expect("invalid directive pattern"), lower))
        .collect()
});

static PHP_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)@php(.*?)@endphp").expect("invalid php pattern"));

static STATE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b__nixs\.(\w+)").expect("invalid state pattern"));

static RAW_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{%[-+]?\s*endraw\s*[-+]?%\}").expect("invalid endraw pattern")
});

static EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@extends\(\s*['"](.*?)['"]\s*\)"#).expect("invalid extends pattern")
});

static SECTION_OR_YIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)@section\(\s*['"](.*?)['"]\s*\)(.*?)@endsection|@yield\(\s*['"](.*?)['"]\s*\)"#,
    )
    .expect("invalid section pattern")
});

static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@include\(\s*['"](.*?)['"]\s*\)"#).expect("invalid include pattern")
});

static SPOOFED_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<form([^>]*?)method=["'](PUT|DELETE|PATCH)["'](.*?)>"#)
        .expect("invalid form pattern")
});

static FOREACH_AS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.+?)\s+as\s+\$?(\w+)(?:\s*=>\s*\$?(\w+))?$").expect("invalid foreach pattern")
});

static FOR_INIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?(\w+)\s*=\s*(.+)$").expect("invalid for-init pattern"));

static FOR_COND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?(\w+)\s*(<=|<|>=|>)\s*(.+)$").expect("invalid for-condition pattern")
});

static PHP_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\$?(\w+)\s*(\+=|-=|\*=|\.=|=)\s*([^=].*)$").expect("invalid assignment pattern")
});

/// Compile `source`, recording `@extends` and `@section` into `ctx` and reading `@include`
/// partials from `views`.
pub fn compile(source: &str, ctx: &mut RenderContext, views: &dyn ViewSource) -> String {
    let scope = Scope::scan(source);
    let mut content = INTERPOLATION
        .replace_all(source, |c: &Captures<'_>| {
            format!("{{{{ escape_html({}) }}}}", php_expr(&c[1], &scope))
        })
        .into_owned();

    for (pattern, lower) in DIRECTIVES.iter() {
        content = pattern
            .replace_all(&content, |c: &Captures<'_>| lower(c, &scope))
            .into_owned();
    }

    content = EXTENDS
        .replace_all(&content, |c: &Captures<'_>| {
            debug!(layout = &c[1], "Layout declared");
            ctx.set_layout(&c[1]);
            String::new()
        })
        .into_owned();

    content = SECTION_OR_YIELD
        .replace_all(&content, |c: &Captures<'_>| match (c.get(1), c.get(2), c.get(3)) {
            (Some(name), Some(body), _) => {
                ctx.set_section(name.as_str(), body.as_str());
                String::new()
            }
            (_, _, Some(name)) => ctx.section(name.as_str()).unwrap_or_default().to_string(),
            _ => String::new(),
        })
        .into_owned();

    content = INCLUDE
        .replace_all(&content, |c: &Captures<'_>| match views.read(&c[1]) {
            Some(partial) => raw_block(&partial),
            None => {
                warn!(partial = &c[1], "Included view not found, substituting nothing");
                String::new()
            }
        })
        .into_owned();

    content = SPOOFED_FORM
        .replace_all(&content, |c: &Captures<'_>| {
            format!(
                "<form{}{} method=\"POST\">\n    {}",
                &c[1],
                &c[3],
                method_field(&c[2])
            )
        })
        .into_owned();

    declare_state(content)
}

/// Names assigned by the `@php` blocks of one source.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    state: BTreeSet<String>,
}

impl Scope {
    fn scan(source: &str) -> Self {
        let state = PHP_BLOCK
            .captures_iter(source)
            .flat_map(|c| {
                statements(c.get(1).map_or("", |m| m.as_str()))
                    .filter_map(assignment_target)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { state }
    }

    fn holds(&self, name: &str) -> bool {
        self.state.contains(name)
    }

    /// Assignable path for `name`: a namespace attribute for `@php` state.
    fn target(&self, name: &str) -> String {
        if self.holds(name) {
            format!("{STATE}.{name}")
        } else {
            name.to_string()
        }
    }
}

/// Prepend the namespace declaration for every state attribute the output touches,
/// seeding each from the render data of the same name.
fn declare_state(content: String) -> String {
    let names: BTreeSet<&str> = STATE_REF
        .captures_iter(&content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if names.is_empty() {
        return content;
    }
    let seeds: Vec<String> = names.iter().map(|n| format!("{n}={n}")).collect();
    format!("{{% set {STATE} = namespace({}) %}}{content}", seeds.join(", "))
}

/// Wrap an included partial so minijinja leaves it verbatim. End-of-raw tags inside the
/// partial are emitted as string literals between two raw blocks.
fn raw_block(partial: &str) -> String {
    let mut out = String::from("{% raw %}");
    let mut last = 0;
    for tag in RAW_END.find_iter(partial) {
        out.push_str(&partial[last..tag.start()]);
        out.push_str("{% endraw %}{{ \"");
        out.push_str(tag.as_str());
        out.push_str("\" }}{% raw %}");
        last = tag.end();
    }
    out.push_str(&partial[last..]);
    out.push_str("{% endraw %}");
    out
}

/// Hidden input carrying a spoofed form method.
#[must_use]
pub fn method_field(method: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{METHOD_OVERRIDE_FIELD}\" value=\"{}\">",
        method.to_ascii_uppercase()
    )
}

/// Translate a PHP-flavoured expression into minijinja syntax.
///
/// Outside string literals: `$` sigils are dropped, `&&`/`||`/`!` become
/// `and`/`or`/`not`, `===`/`!==` collapse to `==`/`!=` and `->` becomes `.`. Bare
/// identifiers naming `@php` state read from the state namespace.
pub(crate) fn php_expr(expr: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.trim().chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            '$' if chars.peek().is_some_and(|n| n.is_alphabetic() || *n == '_') => {}
            '&' if chars.peek() == Some(&'&') => {
                chars.next();
                push_keyword(&mut out, "and");
                skip_spaces(&mut chars);
            }
            '|' if chars.peek() == Some(&'|') => {
                chars.next();
                push_keyword(&mut out, "or");
                skip_spaces(&mut chars);
            }
            '!' | '=' if chars.peek() == Some(&'=') => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                }
                out.push(c);
                out.push('=');
            }
            '!' => {
                push_keyword(&mut out, "not");
                skip_spaces(&mut chars);
            }
            '-' if chars.peek() == Some(&'>') => {
                chars.next();
                out.push('.');
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(n) = chars.next_if(|n| n.is_alphanumeric() || *n == '_') {
                    ident.push(n);
                }
                let attribute = out.ends_with(|p: char| p == '.' || p.is_alphanumeric());
                let call = chars.peek() == Some(&'(');
                if !attribute && !call && scope.holds(&ident) {
                    out.push_str(STATE);
                    out.push('.');
                }
                out.push_str(&ident);
            }
            _ => out.push(c),
        }
    }
    out.trim_end().to_string()
}

fn push_keyword(out: &mut String, keyword: &str) {
    if out.ends_with(|c: char| !c.is_whitespace() && c != '(') {
        out.push(' ');
    }
    out.push_str(keyword);
    out.push(' ');
}

fn skip_spaces(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn lower_foreach(inner: &str, scope: &Scope) -> String {
    let inner = inner.trim();
    let Some(c) = FOREACH_AS.captures(inner) else {
        return format!("{{% for {} %}}", php_expr(inner, scope));
    };
    let iterable = php_expr(&c[1], scope);
    let vars: Vec<&str> = [c.get(2), c.get(3)].into_iter().flatten().map(|m| m.as_str()).collect();
    let mut header = match vars.as_slice() {
        [key, value] => format!("{{% for {key}, {value} in pairs({iterable}) %}}"),
        _ => format!("{{% for {} in {iterable} %}}", vars.join(", ")),
    };
    for var in vars.iter().filter(|v| scope.holds(v)) {
        header.push_str(&format!("{{% set {STATE}.{var} = {var} %}}"));
    }
    header
}

/// `@for(i = a; i < b; i++)` becomes a counted loop that assigns `i` on every iteration.
/// Anything that is not a recognisable counter loop passes through as a for-in header.
fn lower_for(inner: &str, scope: &Scope) -> String {
    counted_loop(inner, scope).unwrap_or_else(|| format!("{{% for {} %}}", php_expr(inner, scope)))
}

fn counted_loop(inner: &str, scope: &Scope) -> Option<String> {
    let mut clauses = inner.split(';').map(str::trim);
    let (init, cond, step) = (clauses.next()?, clauses.next()?, clauses.next()?);
    if clauses.next().is_some() {
        return None;
    }
    let init = FOR_INIT.captures(init)?;
    let cond = FOR_COND.captures(cond)?;
    let (var, ascending, amount) = parse_step(step)?;
    if init[1] != *var || cond[1] != *var {
        return None;
    }

    let start = php_expr(&init[2], scope);
    let bound = php_expr(&cond[3], scope);
    let amount = php_expr(amount, scope);
    let target = scope.target(var);
    let span = match (&cond[2], ascending) {
        ("<", true) => format!("({bound}) - ({start})"),
        ("<=", true) => format!("({bound}) - ({start}) + 1"),
        (">", false) => format!("({start}) - ({bound})"),
        (">=", false) => format!("({start}) - ({bound}) + 1"),
        _ => return None,
    };
    let sign = if ascending { '+' } else { '-' };
    Some(format!(
        "{{% for __nixs_i in range([({span} + ({amount}) - 1) // ({amount}), 0]|max) %}}\
         {{% set {target} = ({start}) {sign} __nixs_i * ({amount}) %}}"
    ))
}

/// Parse `i++`, `++i`, `i--`, `--i`, `i += n` or `i -= n` into (variable, ascending, amount).
fn parse_step(step: &str) -> Option<(&str, bool, &str)> {
    fn var(s: &str) -> &str {
        s.trim().trim_start_matches('$')
    }
    if let Some(v) = step.strip_suffix("++").or_else(|| step.strip_prefix("++")) {
        return Some((var(v), true, "1"));
    }
    if let Some(v) = step.strip_suffix("--").or_else(|| step.strip_prefix("--")) {
        return Some((var(v), false, "1"));
    }
    if let Some((v, n)) = step.split_once("+=") {
        return Some((var(v), true, n.trim()));
    }
    if let Some((v, n)) = step.split_once("-=") {
        return Some((var(v), false, n.trim()));
    }
    None
}

fn lower_while(cond: &str, scope: &Scope) -> String {
    format!(
        "{{% for __nixs_while in range({WHILE_ITERATION_LIMIT}) %}}\
         {{% if not ({}) %}}{{% break %}}{{% endif %}}",
        php_expr(cond, scope)
    )
}

/// Lower the statements of a `@php` block into `{% set %}` tags.
///
/// `echo`/`print` statements emit their value; statements that are not assignments are
/// evaluated for their side effects into a throwaway variable.
fn lower_php(body: &str, scope: &Scope) -> String {
    statements(body).map(|stmt| lower_statement(stmt, scope)).collect()
}

fn statements(body: &str) -> impl Iterator<Item = &str> {
    body.split(|c| c == ';' || c == '\n')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !stmt.starts_with("//") && !stmt.starts_with('#'))
}

fn is_ident(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn is_output(stmt: &str) -> bool {
    stmt.starts_with("echo ") || stmt.starts_with("print ")
}

/// Variable written by a `@php` statement, if any.
fn assignment_target(stmt: &str) -> Option<&str> {
    if is_output(stmt) {
        return None;
    }
    if let Some((var, _, _)) = parse_step(stmt).filter(|(var, _, _)| is_ident(var)) {
        return Some(var);
    }
    PHP_ASSIGN.captures(stmt).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn lower_statement(stmt: &str, scope: &Scope) -> String {
    if let Some(value) = stmt
        .strip_prefix("echo ")
        .or_else(|| stmt.strip_prefix("print "))
    {
        return format!("{{{{ {} }}}}", php_expr(value, scope));
    }
    if let Some((var, ascending, amount)) = parse_step(stmt).filter(|(var, _, _)| is_ident(var)) {
        let op = if ascending { '+' } else { '-' };
        let target = scope.target(var);
        return format!("{{% set {target} = {target} {op} ({}) %}}", php_expr(amount, scope));
    }
    if let Some(c) = PHP_ASSIGN.captures(stmt) {
        let (target, value) = (scope.target(&c[1]), php_expr(&c[3], scope));
        return match &c[2] {
            "*=" => format!("{{% set {target} = {target} * ({value}) %}}"),
            ".=" => format!("{{% set {target} = {target} ~ ({value}) %}}"),
            _ => format!("{{% set {target} = {value} %}}"),
        };
    }
    format!("{{% set __nixs_discard = {} %}}", php_expr(stmt, scope))
}
