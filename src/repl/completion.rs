//! # Tab Completion
//!
//! The engine runs in another process, so its namespace cannot be
//! inspected. The completer works from a static vocabulary (keywords,
//! builtins, the `math` module) plus names it learns from submitted lines.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use unicode_width::UnicodeWidthStr;

use super::highlight::KEYWORDS;

pub const BUILTINS: &[&str] = &[
    "abs", "all", "any", "ascii", "bin", "bool", "bytearray", "bytes", "callable", "chr",
    "complex", "dict", "dir", "divmod", "enumerate", "eval", "exec", "filter", "float", "format",
    "frozenset", "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input", "int",
    "isinstance", "issubclass", "iter", "len", "list", "locals", "map", "max", "min", "next",
    "object", "oct", "open", "ord", "pow", "print", "range", "repr", "reversed", "round", "set",
    "setattr", "slice", "sorted", "str", "sum", "tuple", "type", "vars", "zip", "__import__",
];

pub const MATH_NAMES: &[&str] = &[
    "math.acos", "math.acosh", "math.asin", "math.asinh", "math.atan", "math.atan2",
    "math.atanh", "math.ceil", "math.comb", "math.copysign", "math.cos", "math.cosh",
    "math.degrees", "math.dist", "math.e", "math.exp", "math.expm1", "math.fabs",
    "math.factorial", "math.floor", "math.fmod", "math.frexp", "math.fsum", "math.gamma",
    "math.gcd", "math.hypot", "math.inf", "math.isclose", "math.isfinite", "math.isinf",
    "math.isnan", "math.isqrt", "math.lcm", "math.ldexp", "math.lgamma", "math.log",
    "math.log10", "math.log1p", "math.log2", "math.modf", "math.nan", "math.perm", "math.pi",
    "math.pow", "math.prod", "math.radians", "math.remainder", "math.sin", "math.sinh",
    "math.sqrt", "math.tan", "math.tanh", "math.tau", "math.trunc",
];

struct LearnPatterns {
    assignment: Regex,
    definition: Regex,
    import: Regex,
}

fn learn_patterns() -> Option<&'static LearnPatterns> {
    static PATTERNS: OnceLock<Option<LearnPatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(LearnPatterns {
                assignment: Regex::new(r"^\s*([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*=[^=]").ok()?,
                definition: Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s+([A-Za-z_]\w*)").ok()?,
                import: Regex::new(
                    r"^\s*(?:from\s+[\w.]+\s+)?import\s+([\w.]+(?:\s+as\s+\w+)?(?:\s*,\s*[\w.]+(?:\s+as\s+\w+)?)*)",
                )
                .ok()?,
            })
        })
        .as_ref()
}

/// Result of a completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The word being completed
    pub prefix: String,
    /// Sorted, de-duplicated matches
    pub candidates: Vec<String>,
}

impl Completion {
    /// Text to insert at the cursor: the rest of the single match, or the
    /// longest common prefix of all of them
    pub fn insertion(&self) -> String {
        let common = longest_common_prefix(&self.candidates);
        common
            .chars()
            .skip(self.prefix.chars().count())
            .collect()
    }

    pub fn is_unique(&self) -> bool {
        self.candidates.len() == 1
    }
}

fn longest_common_prefix(words: &[String]) -> String {
    let Some(first) = words.first() else {
        return String::new();
    };
    let mut len = first.chars().count();
    for word in &words[1..] {
        len = first
            .chars()
            .zip(word.chars())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    first.chars().take(len).collect()
}

#[derive(Debug, Default)]
pub struct Completer {
    learned: BTreeSet<String>,
}

impl Completer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up names defined by a submitted line
    pub fn learn(&mut self, line: &str) {
        let Some(patterns) = learn_patterns() else {
            return;
        };
        let mut names = Vec::new();

        if let Some(caps) = patterns.definition.captures(line) {
            names.push(caps[1].to_string());
        } else if let Some(caps) = patterns.import.captures(line) {
            for part in caps[1].split(',') {
                let part = part.trim();
                let name = match part.split_once(" as ") {
                    Some((_, alias)) => alias.trim(),
                    None => part.split('.').next().unwrap_or(part),
                };
                names.push(name.to_string());
            }
        } else if let Some(caps) = patterns.assignment.captures(line) {
            names.extend(caps[1].split(',').map(|n| n.trim().to_string()));
        }

        for name in names.into_iter().filter(|n| !n.is_empty()) {
            if self.learned.insert(name.clone()) {
                tracing::debug!("Completer learned '{}'", name);
            }
        }
    }

    pub fn learned(&self) -> impl Iterator<Item = &str> {
        self.learned.iter().map(String::as_str)
    }

    /// Complete the last whitespace-delimited word of `before_cursor`
    pub fn complete(&self, before_cursor: &str) -> Option<Completion> {
        let prefix = if before_cursor.ends_with(char::is_whitespace) {
            ""
        } else {
            before_cursor.split_whitespace().last().unwrap_or("")
        };
        // Only the identifier-ish tail of e.g. `(math.sq` is completed
        let prefix = prefix
            .rsplit(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .next()
            .unwrap_or("");

        let show_private = prefix.starts_with('_');
        let candidates: BTreeSet<&str> = if prefix.is_empty() {
            self.learned
                .iter()
                .map(String::as_str)
                .filter(|n| !n.starts_with('_'))
                .collect()
        } else {
            KEYWORDS
                .iter()
                .chain(BUILTINS)
                .chain(MATH_NAMES)
                .copied()
                .chain(self.learned.iter().map(String::as_str))
                .filter(|n| n.starts_with(prefix))
                .filter(|n| show_private || !n.starts_with('_'))
                .collect()
        };

        if candidates.is_empty() {
            return None;
        }
        Some(Completion {
            prefix: prefix.to_string(),
            candidates: candidates.into_iter().map(str::to_string).collect(),
        })
    }
}

/// Lay candidates out in columns for a listing `width` cells wide
pub fn format_columns(candidates: &[String], width: usize) -> Vec<String> {
    let max_width = candidates.iter().map(|c| c.width()).max().unwrap_or(0);
    let cell = max_width + 2;
    let cols = (width / cell).max(1);

    candidates
        .chunks(cols)
        .map(|row| {
            let mut line = String::new();
            for candidate in row {
                line.push_str(candidate);
                line.push_str(&" ".repeat(cell - candidate.width()));
            }
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_match_inserts_remaining_suffix() {
        let completer = Completer::new();
        let completion = completer.complete("x = math.fact").unwrap();
        assert!(completion.is_unique());
        assert_eq!(completion.prefix, "math.fact");
        assert_eq!(completion.insertion(), "orial");
    }

    #[test]
    fn many_matches_insert_common_prefix() {
        let completer = Completer::new();
        let completion = completer.complete("math.as").unwrap();
        assert_eq!(completion.candidates, vec!["math.asin", "math.asinh"]);
        assert_eq!(completion.insertion(), "in");
    }

    #[test]
    fn no_match_returns_none() {
        let completer = Completer::new();
        assert_eq!(completer.complete("zzqx"), None);
    }

    #[test]
    fn empty_prefix_lists_only_learned_names() {
        let mut completer = Completer::new();
        assert_eq!(completer.complete(""), None);

        completer.learn("rate = 0.07");
        completer.learn("def grow(x): return x * (1 + rate)");
        completer.learn("_hidden = 1");
        let completion = completer.complete("print(1) ").unwrap();
        assert_eq!(completion.candidates, vec!["grow", "rate"]);
    }

    #[test]
    fn private_names_need_an_underscore_prefix() {
        let mut completer = Completer::new();
        completer.learn("_cache = {}");
        assert_eq!(completer.complete("_ca").unwrap().candidates, vec!["_cache"]);
        assert!(completer
            .complete("__im")
            .unwrap()
            .candidates
            .contains(&"__import__".to_string()));
    }

    #[test]
    fn learn_understands_imports_and_tuple_assignments() {
        let mut completer = Completer::new();
        completer.learn("import numpy as np, os.path");
        completer.learn("from fractions import Fraction");
        completer.learn("a, b = 1, 2");
        completer.learn("a == b");
        let learned: Vec<&str> = completer.learned().collect();
        assert_eq!(learned, vec!["Fraction", "a", "b", "np", "os"]);
    }

    #[test]
    fn completion_uses_word_after_open_paren() {
        let completer = Completer::new();
        let completion = completer.complete("print(ro").unwrap();
        assert_eq!(completion.prefix, "ro");
        assert_eq!(completion.candidates, vec!["round"]);
    }

    #[test]
    fn columns_follow_widest_candidate() {
        let names: Vec<String> = ["abs", "all", "any", "ascii"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // cell = 5 + 2 = 7; 16 / 7 = 2 columns
        assert_eq!(
            format_columns(&names, 16),
            vec!["abs    all".to_string(), "any    ascii".to_string()]
        );
        // Narrower than one cell still gets one column
        assert_eq!(format_columns(&names, 3).len(), 4);
    }
}
