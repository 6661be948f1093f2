use std::collections::BTreeMap;
use thiserror::Error;

use super::{Chapter, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Passed,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LessonError {
    #[error("check your answer before moving on")]
    Locked,
    #[error("already at the last chapter")]
    AtLastChapter,
    #[error("already at the first chapter")]
    AtFirstChapter,
    #[error("the lesson has no chapters")]
    Empty,
}

/// One learner working through the chapters. Nothing here outlives the session.
#[derive(Debug)]
pub struct LessonSession<'a> {
    chapters: &'a [Chapter],
    current: usize,
    code: String,
    last_result: Option<Verdict>,
    has_checked: bool,
    phase: Phase,
}

impl<'a> LessonSession<'a> {
    pub fn new(chapters: &'a [Chapter]) -> Result<Self, LessonError> {
        let first = chapters.first().ok_or(LessonError::Empty)?;
        Ok(Self {
            chapters,
            current: 0,
            code: first.initial_code.to_string(),
            last_result: None,
            has_checked: false,
            phase: Phase::Editing,
        })
    }

    pub fn chapter(&self) -> &'a Chapter {
        let chapters = self.chapters;
        &chapters[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_checked(&self) -> bool {
        self.has_checked
    }

    pub fn last_result(&self) -> Option<&Verdict> {
        self.last_result.as_ref()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.chapters.len()
    }

    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Passed && !self.is_last()
    }

    /// Replaces the buffer. Any earlier pass has to be earned again.
    pub fn edit(&mut self, code: impl Into<String>) {
        self.code = code.into();
        self.phase = Phase::Editing;
    }

    pub fn check_answer(&mut self) -> &Verdict {
        let verdict = self.chapter().check(&self.code);
        self.phase = if verdict.is_valid {
            Phase::Passed
        } else {
            Phase::Failed
        };
        self.has_checked = true;
        tracing::debug!(
            chapter = self.chapter().id,
            valid = verdict.is_valid,
            errors = verdict.errors.len(),
            "checked answer"
        );
        self.last_result.insert(verdict)
    }

    /// Loads the expected code and marks the chapter as passed without checking.
    pub fn show_answer(&mut self) {
        self.code = self.chapter().expected_code.to_string();
        self.last_result = Some(Verdict::pass());
        self.has_checked = true;
        self.phase = Phase::Passed;
    }

    pub fn try_again(&mut self) {
        self.reset_to(self.current);
    }

    pub fn advance(&mut self) -> Result<&'a Chapter, LessonError> {
        if self.is_last() {
            return Err(LessonError::AtLastChapter);
        }
        if self.phase != Phase::Passed {
            return Err(LessonError::Locked);
        }
        self.reset_to(self.current + 1);
        Ok(self.chapter())
    }

    pub fn retreat(&mut self) -> Result<&'a Chapter, LessonError> {
        if self.current == 0 {
            return Err(LessonError::AtFirstChapter);
        }
        self.reset_to(self.current - 1);
        Ok(self.chapter())
    }

    /// Editor markers keyed by 1-based line.
    pub fn markers(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut markers: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        if let Some(verdict) = &self.last_result {
            for diagnostic in &verdict.errors {
                markers
                    .entry(diagnostic.line)
                    .or_default()
                    .push(diagnostic.message.as_str());
            }
        }
        markers
    }

    pub fn terminal_output(&self) -> String {
        match &self.last_result {
            None => String::new(),
            Some(verdict) => render_verdict(self.chapter(), verdict),
        }
    }

    fn reset_to(&mut self, index: usize) {
        self.current = index;
        self.code = self.chapters[index].initial_code.to_string();
        self.last_result = None;
        self.has_checked = false;
        self.phase = Phase::Editing;
    }
}

/// Terminal-style text for a verdict, as shown under the editor.
pub fn render_verdict(chapter: &Chapter, verdict: &Verdict) -> String {
    let mut out = format!("$ sui move build  # chapter {}: {}\n", chapter.id, chapter.title);
    if verdict.is_valid {
        out.push_str("BUILDING garage\n");
        out.push_str("Success! All checks passed.\n");
        return out;
    }
    for diagnostic in &verdict.errors {
        out.push_str(&format!(
            "error[line {}]: {}\n",
            diagnostic.line, diagnostic.message
        ));
    }
    out.push_str(&format!(
        "Failed: {} problem{} found.\n",
        verdict.errors.len(),
        if verdict.errors.len() == 1 { "" } else { "s" }
    ));
    out
}
