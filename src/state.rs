use crate::roster::{self, RosterParser, ROLE_STUDENT, ROLE_TEACHER};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_USER_NAME: &str = "Teacher";
pub const DEFAULT_NOTES_LIMIT: usize = 25;
pub const TILE_COLORS: [&str; 4] = [
    "var(--tile1)",
    "var(--tile2)",
    "var(--tile3)",
    "var(--tile4)",
];

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

/// The whole persisted document. Field names match what the browser build
/// kept in local storage so dumps can be imported as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDoc {
    #[serde(default = "default_user_name")]
    pub user_name: String,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub quick_adds: Vec<NoteEntry>,
}

impl Default for StoreDoc {
    fn default() -> Self {
        Self {
            user_name: default_user_name(),
            classes: Vec::new(),
            students: Vec::new(),
            quick_adds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub block: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub roster: Vec<String>,
}

impl ClassRecord {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.block)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl StoreDoc {
    pub fn set_user_name(&mut self, name: &str) -> &str {
        let name = name.trim();
        self.user_name = if name.is_empty() {
            default_user_name()
        } else {
            name.to_string()
        };
        &self.user_name
    }

    pub fn class(&self, class_id: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    pub fn class_mut(&mut self, class_id: &str) -> Option<&mut ClassRecord> {
        self.classes.iter_mut().find(|c| c.id == class_id)
    }

    /// Appends a new empty class. Returns `None` when the trimmed name is empty.
    pub fn create_class(&mut self, name: &str, block: &str) -> Option<&ClassRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let color = TILE_COLORS[self.classes.len() % TILE_COLORS.len()];
        self.classes.push(ClassRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            block: block.trim().to_string(),
            color: color.to_string(),
            roster: Vec::new(),
        });
        self.classes.last()
    }

    /// Removes the class and every note filed under it. Returns the number of
    /// notes dropped, or `None` if the class does not exist.
    pub fn delete_class(&mut self, class_id: &str) -> Option<usize> {
        let idx = self.classes.iter().position(|c| c.id == class_id)?;
        let before = self.quick_adds.len();
        self.quick_adds.retain(|n| n.class_id != class_id);
        self.classes.remove(idx);
        Some(before - self.quick_adds.len())
    }

    /// Splits the borrow so roster helpers can update one class roster and
    /// the global student list together.
    pub fn roster_and_students(
        &mut self,
        class_id: &str,
    ) -> Option<(&mut Vec<String>, &mut Vec<String>)> {
        let class = self.classes.iter_mut().find(|c| c.id == class_id)?;
        Some((&mut class.roster, &mut self.students))
    }

    /// Files a note for a class, newest first. Returns `None` for an unknown class.
    pub fn add_note(
        &mut self,
        class_id: &str,
        students: Vec<String>,
        note: &str,
        ts: i64,
    ) -> Option<&NoteEntry> {
        self.class(class_id)?;
        self.quick_adds.insert(
            0,
            NoteEntry {
                id: Uuid::new_v4().to_string(),
                ts,
                class_id: class_id.to_string(),
                students,
                note: note.trim().to_string(),
            },
        );
        self.quick_adds.first()
    }

    /// Brings rosters from an outside dump to the shape the roster helpers
    /// keep: trimmed, non-empty, no exact duplicates, and no role markers or
    /// metadata lines. Every roster name also ends up in the global list.
    /// Returns how many roster entries were dropped.
    pub fn normalize_rosters(&mut self, parser: &RosterParser) -> usize {
        let is_name = |name: &String| {
            let t = name.trim();
            t != ROLE_STUDENT && t != ROLE_TEACHER && !parser.is_metadata(t)
        };

        let mut students: Vec<String> = Vec::new();
        for name in self.students.iter().filter(|n| is_name(*n)) {
            let name = name.trim();
            if !name.is_empty() && !students.iter().any(|n| n == name) {
                students.push(name.to_string());
            }
        }

        let mut dropped = 0usize;
        for class in &mut self.classes {
            let imported = std::mem::take(&mut class.roster);
            let names: Vec<&String> = imported.iter().filter(|n| is_name(*n)).collect();
            roster::add_students(&mut class.roster, &mut students, &names);
            dropped += imported.len() - class.roster.len();
        }
        self.students = students;
        dropped
    }

    pub fn notes_for_class(&self, class_id: &str, limit: usize) -> Vec<&NoteEntry> {
        self.quick_adds
            .iter()
            .filter(|n| n.class_id == class_id)
            .take(limit)
            .collect()
    }

    pub fn note_count(&self, class_id: &str) -> usize {
        self.quick_adds
            .iter()
            .filter(|n| n.class_id == class_id)
            .count()
    }
}

/// Roster copy ordered the way the note checklists show it.
pub fn sorted_roster(roster: &[String]) -> Vec<String> {
    let mut names = roster.to_vec();
    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    names
}
