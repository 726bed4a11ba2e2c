//! # Normalizer
//!
//! Raw extracted text → canonical text. Two stages, always in this order:
//!
//! 1. **Artifact cleanup** ([`Normalizer::cleanup_artifacts`]): drop page
//!    numbers, trim dotted leaders, repair chapter headers mangled by PDF
//!    extraction (`'פרק1 ......... הגדרות3'` → `פרק 1 - הגדרות`).
//! 2. **Canonicalization** ([`Normalizer::normalize`]): unify spaces, dashes
//!    and quotes, rejoin words broken across lines, collapse whitespace.
//!
//! Output is a pure function of the input: identical input always yields
//! byte-identical output.

use regex::Regex;

use crate::error::IngestResult;
use crate::markers::ChapterMarkers;

/// Characters that become an ASCII hyphen.
const DASHES: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
];

/// Characters that become `"`.
const DOUBLE_QUOTES: &[char] = &['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{00AB}', '\u{00BB}'];

/// Characters that become `'`.
const SINGLE_QUOTES: &[char] = &['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{2039}', '\u{203A}'];

/// Marks that join a word broken across a line end: hyphen, Hebrew maqaf,
/// soft hyphen.
const WORD_JOINERS: &[char] = &['-', '\u{05BE}', '\u{00AD}'];

/// Compiled cleanup and canonicalization patterns for one marker set.
#[derive(Debug, Clone)]
pub struct Normalizer {
    page_number: Regex,
    trailing_leader: Regex,
    leader_only: Regex,
    has_marker: Regex,
    marker_digits: Regex,
    leader_title: Regex,
    dangling_dash: Regex,
    dash_spacing: Regex,
    horizontal_ws: Regex,
    blank_runs: Regex,
}

impl Normalizer {
    /// Compile the patterns for `markers`.
    pub fn new(markers: &ChapterMarkers) -> IngestResult<Self> {
        let alternation = markers.alternation();
        Ok(Self {
            page_number: Regex::new(r"^\s*\d+\s*$")?,
            trailing_leader: Regex::new(r"\.{3,}\s*$")?,
            leader_only: Regex::new(r"^\s*\.{3,}\s*$")?,
            has_marker: Regex::new(&format!(r#"(?i)^\s*['"]*\s*(?:{alternation})"#))?,
            marker_digits: Regex::new(&format!("(?i)({alternation})([0-9]+)"))?,
            leader_title: Regex::new(r"([0-9]+)\s*\.{3,}\s*([^.\d]+?)[0-9]*\s*$")?,
            dangling_dash: Regex::new(r#"([0-9]+)\s*[-–—]\s*['"]*\s*$"#)?,
            dash_spacing: Regex::new(r"([0-9]+)\s*[-–—]\s*(\S)")?,
            horizontal_ws: Regex::new(r"[ \t\x0C\r\x0B]+")?,
            blank_runs: Regex::new(r"\n{3,}")?,
        })
    }

    /// Stage 1: strip layout artifacts line by line.
    pub fn cleanup_artifacts(&self, text: &str) -> String {
        let mut cleaned: Vec<String> = Vec::new();
        for line in text.lines() {
            if self.page_number.is_match(line) {
                continue;
            }
            let mut line = line.to_string();
            if self.trailing_leader.is_match(&line) {
                if self.leader_only.is_match(&line) {
                    continue;
                }
                line = self.trailing_leader.replace(&line, "").into_owned();
            }
            if self.has_marker.is_match(&line) {
                line = self.repair_chapter_header(&line);
            }
            cleaned.push(line);
        }
        cleaned.join("\n")
    }

    fn repair_chapter_header(&self, line: &str) -> String {
        let line = line.trim_matches(|c| c == '\'' || c == '"');
        let line = self.marker_digits.replace_all(line, "${1} ${2}");
        let line = self.leader_title.replace_all(&line, "${1} - ${2}");
        let line = self.dangling_dash.replace_all(&line, "${1} -");
        self.dash_spacing
            .replace_all(&line, "${1} - ${2}")
            .into_owned()
    }

    /// Stage 2: unify characters, reflow broken words, collapse whitespace.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let unified: String = text
            .chars()
            .map(|c| match c {
                '\u{00A0}' | '_' => ' ',
                c if DASHES.contains(&c) => '-',
                c if DOUBLE_QUOTES.contains(&c) => '"',
                c if SINGLE_QUOTES.contains(&c) => '\'',
                c => c,
            })
            .collect();
        let reflowed = reflow_broken_words(&unified);
        let collapsed = self.horizontal_ws.replace_all(&reflowed, " ");
        let trimmed = collapsed.lines().map(str::trim).collect::<Vec<_>>().join("\n");
        self.blank_runs.replace_all(&trimmed, "\n\n").into_owned()
    }

    /// Both stages. Empty input yields empty output.
    pub fn normalize_pipeline(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        self.normalize(&self.cleanup_artifacts(raw))
    }
}

/// Remove `<joiner>\n` when the next character is not whitespace.
fn reflow_broken_words(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let breaks_word = WORD_JOINERS.contains(&c)
            && chars.get(i + 1) == Some(&'\n')
            && chars.get(i + 2).is_some_and(|next| !next.is_whitespace());
        if breaks_word {
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&ChapterMarkers::default()).unwrap()
    }

    #[test]
    fn page_numbers_are_dropped() {
        let out = normalizer().cleanup_artifacts("4.1 text\n  12  \nmore");
        assert_eq!(out, "4.1 text\nmore");
    }

    #[test]
    fn dotted_leaders_are_trimmed_or_dropped() {
        let out = normalizer().cleanup_artifacts("Definitions ........\n   .....   \nbody");
        assert_eq!(out, "Definitions \nbody");
    }

    #[test]
    fn short_dot_runs_are_kept() {
        let out = normalizer().cleanup_artifacts("see 4.1..");
        assert_eq!(out, "see 4.1..");
    }

    #[test]
    fn chapter_header_repair_inserts_space_and_dash() {
        let n = normalizer();
        assert_eq!(n.cleanup_artifacts("'פרק1 - '"), "פרק 1 -");
        assert_eq!(n.cleanup_artifacts("פרק 1 -הגדרות"), "פרק 1 - הגדרות");
        assert_eq!(n.cleanup_artifacts("chapter3—Fire"), "chapter 3 - Fire");
    }

    #[test]
    fn chapter_header_leader_becomes_dash() {
        let out = normalizer().cleanup_artifacts("פרק 1 ......... הגדרות כלליות3");
        assert_eq!(out, "פרק 1 - הגדרות כלליות");
    }

    #[test]
    fn lines_without_marker_are_not_repaired() {
        let out = normalizer().cleanup_artifacts("4.1-text");
        assert_eq!(out, "4.1-text");
    }

    #[test]
    fn mid_sentence_marker_is_not_repaired() {
        let n = normalizer();
        assert_eq!(
            n.cleanup_artifacts("see chapter 5-7 of the code"),
            "see chapter 5-7 of the code"
        );
        assert_eq!(n.cleanup_artifacts("כמפורט בפרק3-4"), "כמפורט בפרק3-4");
        assert_eq!(n.cleanup_artifacts("  Chapter2-Exits"), "  Chapter 2 - Exits");
    }

    #[test]
    fn unicode_is_unified() {
        let out = normalizer().normalize("a\u{00A0}b – c — d “q” ‘s’ snake_case");
        assert_eq!(out, "a b - c - d \"q\" 's' snake case");
    }

    #[test]
    fn hyphenated_breaks_are_reflowed() {
        let n = normalizer();
        assert_eq!(n.normalize("מ-\nשה"), "משה");
        assert_eq!(n.normalize("fire\u{05BE}\nfighters"), "firefighters");
        assert_eq!(n.normalize("ends with -\n next"), "ends with -\nnext");
    }

    #[test]
    fn chained_joiners_reflow_fully() {
        assert_eq!(reflow_broken_words("-\n-\nx"), "x");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let out = normalizer().normalize("  a \t  b  \n\n\n\n  c\r\n");
        assert_eq!(out, "a b\n\nc");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(normalizer().normalize_pipeline(""), "");
        assert_eq!(normalizer().normalize(""), "");
    }

    #[test]
    fn pipeline_runs_cleanup_then_normalize() {
        let raw = "'פרק4 – משרד הבריאות'\n7\n4.1 חובת   רחי-\nצת ידיים .....";
        let out = normalizer().normalize_pipeline(raw);
        assert_eq!(out, "פרק 4 - משרד הבריאות\n4.1 חובת רחיצת ידיים");
    }
}
