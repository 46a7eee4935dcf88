use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::roster::{self, RosterParser};
use crate::state::StoreDoc;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Session state owned by the request loop. `doc` is loaded once when a
/// workspace is selected and written back wholesale after every mutation.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub doc: StoreDoc,
    /// Workspace-specific metadata patterns; `None` uses the built-in one.
    pub parser: Option<RosterParser>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            doc: StoreDoc::default(),
            parser: None,
        }
    }

    pub fn roster_parser(&self) -> &RosterParser {
        self.parser.as_ref().unwrap_or_else(|| roster::default_parser())
    }

    pub fn parse_roster(&self, text: &str) -> Vec<String> {
        match self.parser.as_ref() {
            Some(parser) => parser.parse(text),
            None => roster::parse_student_names(text),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
