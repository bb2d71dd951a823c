//! Splitting markdown feedback into titled sections.
//!
//! Feedback is scanned line by line. A line starting with `"## "` or `"### "`
//! opens a new fragment; text before the first heading forms a fragment of
//! its own. Each fragment becomes a [`Section`] whose title is its first line
//! and whose body is the rest. When fewer than two fragments are found the
//! whole text is returned as a single section titled [`DEFAULT_SECTION_TITLE`].
//!
//! With [`BoundaryPolicy::FenceAware`] heading lines inside fenced code
//! blocks stay part of the current section. [`BoundaryPolicy::Literal`]
//! splits on every heading line, fenced or not.

use serde::{Deserialize, Serialize};

/// Title used when the feedback cannot be split.
pub const DEFAULT_SECTION_TITLE: &str = "Review";

/// Heading markers that start a new section.
const HEADING_MARKERS: [&str; 2] = ["## ", "### "];

/// A titled block of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Which heading lines count as section boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Headings inside fenced code blocks are not boundaries.
    #[default]
    FenceAware,
    /// Every heading line is a boundary.
    Literal,
}

impl BoundaryPolicy {
    pub fn from_fence_aware(fence_aware: bool) -> Self {
        if fence_aware {
            BoundaryPolicy::FenceAware
        } else {
            BoundaryPolicy::Literal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// Heading marker followed by the heading text.
    Heading(&'a str),
    /// Opening or closing code fence, carrying its marker character.
    Fence(char),
    Plain,
}

fn classify(line: &str) -> LineKind<'_> {
    for marker in HEADING_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return LineKind::Heading(rest);
        }
    }

    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        LineKind::Fence('`')
    } else if trimmed.starts_with("~~~") {
        LineKind::Fence('~')
    } else {
        LineKind::Plain
    }
}

/// Lines collected between two boundaries.
#[derive(Debug, Default)]
struct Fragment<'a> {
    /// Heading text, `None` for the preamble before the first heading.
    heading: Option<&'a str>,
    lines: Vec<&'a str>,
}

impl<'a> Fragment<'a> {
    fn headed(heading: &'a str) -> Self {
        Self {
            heading: Some(heading),
            lines: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        match self.heading {
            Some(heading) => heading.is_empty() && self.lines.is_empty(),
            None => self.lines.iter().all(|l| l.is_empty()) && self.lines.len() <= 1,
        }
    }

    fn into_section(self) -> Section {
        let (title, rest) = match self.heading {
            Some(heading) => (heading, &self.lines[..]),
            None => match self.lines.split_first() {
                Some((first, rest)) => (*first, rest),
                None => ("", &self.lines[..]),
            },
        };

        Section {
            title: title.trim().to_string(),
            body: rest.join("\n").trim().to_string(),
        }
    }
}

/// Split feedback into sections using the default boundary policy.
pub fn partition(raw: &str) -> Vec<Section> {
    partition_with(raw, BoundaryPolicy::default())
}

/// Split feedback into sections.
///
/// Always returns at least one section.
pub fn partition_with(raw: &str, policy: BoundaryPolicy) -> Vec<Section> {
    let mut fragments = Vec::new();
    let mut current = Fragment::default();
    let mut open_fence: Option<char> = None;

    for line in raw.split('\n') {
        match classify(line) {
            LineKind::Heading(text)
                if open_fence.is_none() || policy == BoundaryPolicy::Literal =>
            {
                fragments.push(std::mem::replace(&mut current, Fragment::headed(text)));
            }
            LineKind::Fence(marker) => {
                open_fence = match open_fence {
                    None => Some(marker),
                    Some(open) if open == marker => None,
                    Some(open) => Some(open),
                };
                current.lines.push(line);
            }
            _ => current.lines.push(line),
        }
    }
    fragments.push(current);

    let fragments: Vec<Fragment<'_>> = fragments.into_iter().filter(|f| !f.is_empty()).collect();

    if fragments.len() <= 1 {
        return vec![Section::new(DEFAULT_SECTION_TITLE, raw)];
    }

    fragments.into_iter().map(Fragment::into_section).collect()
}
