//! Chapter definitions and the pattern-matching checks behind "Check answer".
//!
//! A check never parses Move. Each chapter lists the constructs it insists on as
//! regex rules; when every rule is satisfied the buffer must still equal the
//! chapter's expected code once comments and whitespace are stripped.

mod chapters;
mod session;
pub mod terminal;

pub use chapters::chapters;
pub use session::{render_verdict, LessonSession, Phase};

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Line used when no rule applies but the buffer still differs from the answer.
pub const SYNTAX_ERROR_LINE: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn fail(errors: Vec<Diagnostic>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

pub type Validator = fn(&str) -> Verdict;

/// A construct the learner's code must contain.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Regex tested against the comment-stripped buffer.
    pub pattern: &'static str,
    pub message: &'static str,
    /// Substring whose first occurrence in the raw buffer locates the diagnostic.
    pub anchor: &'static str,
    pub fallback_line: usize,
}

pub struct Chapter {
    pub id: u32,
    pub title: &'static str,
    pub content: &'static str,
    pub initial_code: &'static str,
    pub expected_code: &'static str,
    pub rules: &'static [Rule],
    pub validate: Validator,
}

/// What the chapter index shows; no starter or expected code.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub id: u32,
    pub title: &'static str,
}

impl Chapter {
    pub fn check(&self, code: &str) -> Verdict {
        (self.validate)(code)
    }

    pub fn summary(&self) -> ChapterSummary {
        ChapterSummary {
            id: self.id,
            title: self.title,
        }
    }
}

impl std::fmt::Debug for Chapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chapter")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish()
    }
}

pub fn find_chapter(id: u32) -> Option<&'static Chapter> {
    chapters().iter().find(|c| c.id == id)
}

/// Removes `//` and `/* */` comments, leaving string contents alone.
pub fn strip_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let lookahead = chars.peek().copied();
        match (c, lookahead) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Comment- and whitespace-free form used for the structural comparison.
pub fn normalize(code: &str) -> String {
    strip_comments(code)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// 1-based line of the first line containing `anchor`, or `fallback`.
pub fn anchor_line(code: &str, anchor: &str, fallback: usize) -> usize {
    if anchor.is_empty() {
        return fallback;
    }
    code.lines()
        .position(|line| line.contains(anchor))
        .map(|idx| idx + 1)
        .unwrap_or(fallback)
}

fn todo_marker() -> &'static Regex {
    static TODO: OnceLock<Regex> = OnceLock::new();
    TODO.get_or_init(|| Regex::new(r"//\s*TODO").expect("valid TODO regex"))
}

/// Runs `rules` against `code`, then falls back to comparing with `expected`.
pub fn check_rules(code: &str, rules: &[Rule], expected: &str) -> Verdict {
    let stripped = strip_comments(code);

    let errors: Vec<Diagnostic> = rules
        .iter()
        .filter(|rule| {
            !Regex::new(rule.pattern)
                .map(|re| re.is_match(&stripped))
                .unwrap_or(false)
        })
        .map(|rule| Diagnostic {
            line: anchor_line(code, rule.anchor, rule.fallback_line),
            message: rule.message.to_string(),
        })
        .collect();

    if !errors.is_empty() {
        return Verdict::fail(errors);
    }

    if normalize(code) == normalize(expected) {
        return Verdict::pass();
    }

    let message = if todo_marker().is_match(code) {
        "Syntax error: finish the TODO and match the expected structure"
    } else {
        "Syntax error: code does not match the expected structure"
    };
    Verdict::fail(vec![Diagnostic {
        line: SYNTAX_ERROR_LINE,
        message: message.to_string(),
    }])
}
