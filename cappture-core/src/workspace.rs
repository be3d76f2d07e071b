//! Mock file workspace the agent creates and deletes files in.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkspaceError;

/// A mock source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFile {
    /// Unique identifier.
    pub id: String,
    /// Display name, including extension.
    pub name: String,
    /// Language tag (`js`, `html`, `css`, `json`, `markdown`, `text`, ...).
    #[serde(rename = "type")]
    pub file_type: String,
    /// File body.
    pub content: String,
}

/// Map a filename to the language tag used for new files.
#[must_use]
pub fn file_type_for_name(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or(name);
    match extension {
        "js" => "js",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        _ => "text",
    }
}

/// The set of files open in the editor plus the active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    files: Vec<WorkspaceFile>,
    active_file: Option<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        let seed = |name: &str, file_type: &str, content: &str| WorkspaceFile {
            id: name.to_string(),
            name: name.to_string(),
            file_type: file_type.to_string(),
            content: content.to_string(),
        };
        Self {
            files: vec![
                seed(
                    "index.html",
                    "html",
                    "<!DOCTYPE html>\n<html>\n<head>\n  <title>My App</title>\n</head>\n<body>\n  <h1>Hello World</h1>\n</body>\n</html>",
                ),
                seed("style.css", "css", "body {\n  font-family: sans-serif;\n}"),
                seed("script.js", "js", "console.log(\"Hello World\");"),
            ],
            active_file: Some("index.html".to_string()),
        }
    }
}

/// Workspace shared between the chat panel and agent strategies.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

impl Workspace {
    /// Wrap the workspace for sharing.
    #[must_use]
    pub fn into_shared(self) -> SharedWorkspace {
        Arc::new(Mutex::new(self))
    }

    /// A workspace with no files.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            active_file: None,
        }
    }

    /// All files in creation order.
    #[must_use]
    pub fn files(&self) -> &[WorkspaceFile] {
        &self.files
    }

    /// Look up a file by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WorkspaceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Look up a file by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&WorkspaceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Id of the file open in the editor.
    #[must_use]
    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether there are no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Add a file and make it active. Returns the new file's id.
    pub fn create_file(
        &mut self,
        name: impl Into<String>,
        file_type: impl Into<String>,
        content: impl Into<String>,
    ) -> String {
        let file = WorkspaceFile {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            file_type: file_type.into(),
            content: content.into(),
        };
        let id = file.id.clone();
        tracing::info!("File {} created", file.name);
        self.files.push(file);
        self.active_file = Some(id.clone());
        id
    }

    /// Remove a file. If it was active, the first remaining file becomes
    /// active.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::FileNotFound`] if no file has this id.
    pub fn delete_file(&mut self, id: &str) -> Result<WorkspaceFile, WorkspaceError> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| WorkspaceError::FileNotFound(id.to_string()))?;
        let removed = self.files.remove(index);
        if self.active_file.as_deref() == Some(id) {
            self.active_file = self.files.first().map(|f| f.id.clone());
        }
        tracing::warn!("File {id} deleted");
        Ok(removed)
    }

    /// Open a file in the editor.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::FileNotFound`] if no file has this id.
    pub fn select_file(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if self.get(id).is_none() {
            return Err(WorkspaceError::FileNotFound(id.to_string()));
        }
        self.active_file = Some(id.to_string());
        tracing::info!("File {id} selected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_three_files() {
        let ws = Workspace::default();
        assert_eq!(ws.len(), 3);
        assert_eq!(ws.active_file(), Some("index.html"));
        assert!(ws.find_by_name("script.js").is_some());
    }

    #[test]
    fn create_appends_and_activates() {
        let mut ws = Workspace::default();
        let id = ws.create_file("test.js", "js", "console.log(\"test\");");

        assert_eq!(ws.len(), 4);
        assert_eq!(ws.active_file(), Some(id.as_str()));
        assert_eq!(ws.get(&id).expect("exists").name, "test.js");
    }

    #[test]
    fn create_gives_unique_ids_for_same_name() {
        let mut ws = Workspace::empty();
        let a = ws.create_file("a.js", "js", "");
        let b = ws.create_file("a.js", "js", "");
        assert_ne!(a, b);
    }

    #[test]
    fn delete_active_selects_first_remaining() {
        let mut ws = Workspace::default();
        ws.select_file("style.css").expect("select");

        ws.delete_file("style.css").expect("delete");

        assert_eq!(ws.len(), 2);
        assert_eq!(ws.active_file(), Some("index.html"));
    }

    #[test]
    fn delete_inactive_keeps_active() {
        let mut ws = Workspace::default();
        ws.delete_file("script.js").expect("delete");
        assert_eq!(ws.active_file(), Some("index.html"));
    }

    #[test]
    fn delete_last_file_clears_active() {
        let mut ws = Workspace::empty();
        let id = ws.create_file("only.md", "markdown", "");
        ws.delete_file(&id).expect("delete");
        assert!(ws.is_empty());
        assert!(ws.active_file().is_none());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut ws = Workspace::default();
        assert_eq!(
            ws.delete_file("nope"),
            Err(WorkspaceError::FileNotFound("nope".into()))
        );
        assert!(ws.select_file("nope").is_err());
        assert_eq!(ws.active_file(), Some("index.html"));
    }

    #[test]
    fn file_types_from_extension() {
        assert_eq!(file_type_for_name("app.js"), "js");
        assert_eq!(file_type_for_name("README.md"), "markdown");
        assert_eq!(file_type_for_name("data.json"), "json");
        assert_eq!(file_type_for_name("notes.txt"), "text");
        assert_eq!(file_type_for_name("Makefile"), "text");
    }
}
