//! # Paragraph Parser
//!
//! Canonical text → [`ParagraphTree`]. A single pass over non-empty lines,
//! carrying the current category, chapter, and paragraph number. Each line
//! is tried, in order, as:
//!
//! 1. a chapter header (`<marker> <digits> [- title]`), which opens a new
//!    category and its root node;
//! 2. a numbered heading (`4.6.3 ...`), canonicalized against the current
//!    chapter, which becomes the current paragraph and receives the whole
//!    line as text;
//! 3. continuation text, appended to the current paragraph.
//!
//! Lines before any header or heading carry no context and are dropped.

use regex::Regex;
use tracing::{debug, info};

use regmap_core::{canonicalize_number, ParagraphNumber, ParagraphTree, MAX_PARAGRAPH_DEPTH};

use crate::error::IngestResult;
use crate::markers::ChapterMarkers;

/// A recognized chapter header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterHeader {
    /// Chapter id digits.
    pub chapter: String,
    /// Category name: the header title, or `"<marker> <digits>"`.
    pub category: String,
}

/// Line-oriented paragraph parser.
#[derive(Debug, Clone)]
pub struct ParagraphParser {
    header: Regex,
    markers: ChapterMarkers,
}

impl ParagraphParser {
    pub fn new(markers: &ChapterMarkers) -> IngestResult<Self> {
        let header = Regex::new(&format!(
            r"^\s*(?i:(?P<marker>{}))\s*(?P<chapter>[0-9]+)\s*(?:[-–—:]\s*(?P<title>.*?))?\s*$",
            markers.alternation()
        ))?;
        Ok(Self {
            header,
            markers: markers.clone(),
        })
    }

    /// Match a chapter header line.
    pub fn chapter_header(&self, line: &str) -> Option<ChapterHeader> {
        let caps = self.header.captures(line)?;
        let chapter = caps.name("chapter")?.as_str().to_string();
        let title = caps
            .name("title")
            .map(|t| t.as_str().trim())
            .filter(|t| !t.is_empty());
        let category = match title {
            Some(title) => title.to_string(),
            None => {
                let marker = caps.name("marker").map(|m| m.as_str()).unwrap_or_default();
                format!("{} {chapter}", self.markers.configured_spelling(marker))
            }
        };
        Some(ChapterHeader { chapter, category })
    }

    /// Parse canonical text into a paragraph tree.
    pub fn parse(&self, text: &str) -> ParagraphTree {
        let mut tree = ParagraphTree::new();
        let mut category: Option<String> = None;
        let mut chapter: Option<String> = None;
        let mut current: Option<ParagraphNumber> = None;

        for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(header) = self.chapter_header(line) {
                match ParagraphNumber::parse(&header.chapter) {
                    Ok(root) => {
                        tree.ensure_node(&header.category, &root);
                        category = Some(header.category);
                        chapter = Some(header.chapter);
                        current = Some(root);
                        continue;
                    }
                    Err(e) => debug!(line, error = %e, "chapter header rejected"),
                }
            }

            if let Some(raw) = leading_number(line) {
                let canonical = canonicalize_number(raw, chapter.as_deref());
                match ParagraphNumber::parse(&canonical) {
                    Ok(number) => {
                        let cat = match category.clone() {
                            Some(cat) => cat,
                            None => {
                                let ch = number.chapter().to_string();
                                let cat = self.markers.implicit_category(&ch);
                                if let Ok(root) = ParagraphNumber::parse(&ch) {
                                    tree.ensure_node(&cat, &root);
                                }
                                chapter = Some(ch);
                                category = Some(cat.clone());
                                cat
                            }
                        };
                        tree.add_text(&cat, &number, line);
                        current = Some(number);
                        continue;
                    }
                    Err(e) => debug!(
                        line,
                        max_depth = MAX_PARAGRAPH_DEPTH,
                        error = %e,
                        "numbered heading treated as text"
                    ),
                }
            }

            if let (Some(cat), Some(number)) = (&category, &current) {
                tree.add_text(cat, number, line);
            }
        }

        info!(
            categories = tree.category_count(),
            paragraphs = tree.paragraph_count(),
            "document parsed"
        );
        tree
    }
}

/// Leading dotted number of a line, if it is a numbered heading.
///
/// Up to [`MAX_PARAGRAPH_DEPTH`] segments are read. The number must be
/// followed by whitespace, `.`, `-` or `)`. When the longest candidate is
/// not, the last segment is dropped, which leaves a `.` as the follower; a
/// single-segment number has no shorter candidate.
pub fn leading_number(line: &str) -> Option<&str> {
    let s = line.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let first = digits_from(0);
    if first == 0 {
        return None;
    }
    let mut ends = vec![first];
    let mut pos = first;
    while ends.len() < MAX_PARAGRAPH_DEPTH && bytes.get(pos) == Some(&b'.') {
        let run = digits_from(pos + 1);
        if run == 0 {
            break;
        }
        pos += 1 + run;
        ends.push(pos);
    }

    let qualifies = |end: usize| {
        s[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || matches!(c, '.' | '-' | ')'))
    };
    if qualifies(pos) {
        return Some(&s[..pos]);
    }
    if ends.len() >= 2 {
        return Some(&s[..ends[ends.len() - 2]]);
    }
    None
}
