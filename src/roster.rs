use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub const ROLE_STUDENT: &str = "Student";
pub const ROLE_TEACHER: &str = "Teacher";

/// Course code followed somewhere by a "Block N" section descriptor,
/// e.g. `CS350 - Software Engineering - 1 - Block 4`.
pub const DEFAULT_METADATA_PATTERN: &str =
    r"(?i)\b[a-z]{2,5}\s?\d{2,4}[a-z]?\b.*\bblock\s+[0-9a-z]+\b";

static DEFAULT_PARSER: Lazy<RosterParser> = Lazy::new(RosterParser::default);

/// Turns pasted roster exports into clean student names.
///
/// Exports typically repeat a 4-line record per person (name, the same name
/// with trailing tab, a course/section line, a role marker), but nothing here
/// depends on that shape holding.
#[derive(Debug, Clone)]
pub struct RosterParser {
    metadata: Vec<Regex>,
}

impl Default for RosterParser {
    fn default() -> Self {
        let re = Regex::new(DEFAULT_METADATA_PATTERN).expect("valid default metadata regex");
        Self { metadata: vec![re] }
    }
}

impl RosterParser {
    /// Builds a parser from a list of metadata regexes. An empty list keeps
    /// the default pattern.
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let metadata = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { metadata })
    }

    pub fn patterns(&self) -> Vec<String> {
        self.metadata.iter().map(|r| r.as_str().to_string()).collect()
    }

    pub fn is_metadata(&self, line: &str) -> bool {
        self.metadata.iter().any(|re| re.is_match(line))
    }

    pub fn parse(&self, text: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut teachers: HashSet<String> = HashSet::new();
        // Most recent candidate still waiting for a role marker.
        let mut pending: Option<String> = None;
        let mut prev_line: Option<String> = None;

        for raw in text.lines() {
            let t = raw.trim();
            if t.is_empty() {
                continue;
            }

            if t == ROLE_TEACHER {
                if let Some(name) = pending.take() {
                    if seen.remove(&name) {
                        out.retain(|n| *n != name);
                    }
                    teachers.insert(name);
                }
                prev_line = Some(t.to_string());
                continue;
            }
            if t == ROLE_STUDENT {
                pending = None;
                prev_line = Some(t.to_string());
                continue;
            }
            if self.is_metadata(t) {
                prev_line = Some(t.to_string());
                continue;
            }

            // Doubled-name paste artifact: the same name again on the next line.
            if prev_line.as_deref() == Some(t) {
                continue;
            }
            prev_line = Some(t.to_string());

            let name = t.to_string();
            if !teachers.contains(&name) && seen.insert(name.clone()) {
                out.push(name.clone());
            }
            pending = Some(name);
        }

        out
    }
}

pub fn default_parser() -> &'static RosterParser {
    &DEFAULT_PARSER
}

/// Parses with the default metadata pattern.
pub fn parse_student_names(text: &str) -> Vec<String> {
    DEFAULT_PARSER.parse(text)
}

/// Empties a roster in place. Already-empty rosters are left alone.
pub fn clear_roster(roster: &mut Vec<String>) -> usize {
    let removed = roster.len();
    if removed > 0 {
        roster.clear();
    }
    removed
}

/// Adds one trimmed name to the class roster, then to the global list if it
/// is new there too. Returns whether the roster changed.
pub fn add_student(roster: &mut Vec<String>, all_students: &mut Vec<String>, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || roster.iter().any(|n| n == name) {
        return false;
    }
    roster.push(name.to_string());
    if !all_students.iter().any(|n| n == name) {
        all_students.push(name.to_string());
    }
    true
}

/// Adds each name in order; returns how many actually landed on the roster.
pub fn add_students<S: AsRef<str>>(
    roster: &mut Vec<String>,
    all_students: &mut Vec<String>,
    names: &[S],
) -> usize {
    let mut added = 0usize;
    for name in names {
        if add_student(roster, all_students, name.as_ref()) {
            added += 1;
        }
    }
    added
}

pub fn remove_student(roster: &mut Vec<String>, name: &str) -> bool {
    let before = roster.len();
    roster.retain(|n| n != name);
    roster.len() != before
}
