//! Path pattern compilation and matching.
//!
//! A route pattern is literal text interspersed with `{name}` placeholders, e.g.
//! `users/{id}/posts/{slug}`. Each placeholder becomes a capturing group that accepts one or
//! more non-`/` characters; the literal text between placeholders is matched verbatim. The
//! compiled expression is anchored at both ends.
//!
//! Placeholder names are not retained: a successful match yields the captured substrings in
//! left-to-right order of appearance.

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

/// Maximum number of captured parameters before heap allocation.
/// Most routes carry ≤4 placeholders (e.g. `users/{id}/posts/{slug}`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Positional path parameters captured by a match, in placeholder order.
pub type ParamVec = SmallVec<[String; MAX_INLINE_PARAMS]>;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^/{}]+\}").expect("Failed to compile placeholder regex"));

/// Compiled form of one route pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    regex: Regex,
    arity: usize,
}

impl PathMatcher {
    /// Compile a raw route pattern.
    ///
    /// Leading and trailing `/` are trimmed so that `/users/{id}` and `users/{id}` compile to
    /// the same matcher; candidate paths are trimmed the same way by the dispatcher.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let (source, arity) = Self::pattern_to_regex(pattern.trim_matches('/'));
        let regex = Regex::new(&source).expect("Failed to compile path regex");
        Self { regex, arity }
    }

    /// Number of placeholders in the pattern.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Test `path` and return the captured segments on success.
    ///
    /// `path` is expected without leading/trailing `/` and without a query string.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Returns `true` when `path` matches without collecting captures.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Convert a trimmed pattern to an anchored regex source and its placeholder count.
    pub(crate) fn pattern_to_regex(pattern: &str) -> (String, usize) {
        let mut source = String::with_capacity(pattern.len() + 16);
        source.push('^');
        let mut arity = 0;
        let mut last = 0;
        for placeholder in PLACEHOLDER.find_iter(pattern) {
            source.push_str(&regex::escape(&pattern[last..placeholder.start()]));
            source.push_str("([^/]+)");
            last = placeholder.end();
            arity += 1;
        }
        source.push_str(&regex::escape(&pattern[last..]));
        source.push('$');
        (source, arity)
    }
}
