//! Static reference documents, keyed by agent identifier.
//!
//! Loaded once at startup from `DOCUMENTS_PATH` and never mutated afterwards,
//! so lookups are safe to share across requests without locking.
//!
//! File format:
//!
//! ```json
//! { "agents": [ { "id": "informations_generales",
//!                 "documents": [ { "title": "...", "content": "..." } ] } ] }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("Failed to read documents file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid documents file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A titled reference text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
}

/// An agent and the documents that ground it, in stored order.
#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct DocumentsFile {
    #[serde(default)]
    agents: Vec<Agent>,
}

/// Read-only mapping from agent id to its documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    agents: HashMap<String, Vec<Document>>,
}

impl DocumentStore {
    /// Build a store from already-parsed agents.
    ///
    /// If the same id appears twice, the later entry's documents are appended.
    pub fn from_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let mut map: HashMap<String, Vec<Document>> = HashMap::new();
        for agent in agents {
            map.entry(agent.id).or_default().extend(agent.documents);
        }
        Self { agents: map }
    }

    /// Parse a store from JSON text.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let file: DocumentsFile = serde_json::from_str(contents)?;
        Ok(Self::from_agents(file.agents))
    }

    /// Load the store from disk.
    ///
    /// A missing file yields an empty store; an unreadable or malformed file
    /// is an error.
    pub async fn load(path: &Path) -> Result<Self, DocumentStoreError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "No documents file found at {}, grounding disabled",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(DocumentStoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let store = Self::from_json(&contents).map_err(|source| DocumentStoreError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(
            agents = store.agents.len(),
            "Loaded reference documents from {}",
            path.display()
        );
        Ok(store)
    }

    /// Concatenate an agent's documents into one grounding text.
    ///
    /// Each document renders as its title, a blank line, then its content;
    /// documents are joined by a blank line. Unknown ids give an empty string.
    pub fn lookup(&self, agent_id: &str) -> String {
        self.agents
            .get(agent_id)
            .map(|docs| {
                docs.iter()
                    .map(|d| format!("{}\n\n{}", d.title, d.content))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .unwrap_or_default()
    }

    /// Number of configured agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Configured agent ids, sorted.
    pub fn agent_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Shared document store wrapped in Arc for concurrent access.
pub type SharedDocumentStore = Arc<DocumentStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "agents": [
            {
                "id": "informations_generales",
                "documents": [
                    { "title": "Campus", "content": "Le campus est à Pessac." },
                    { "title": "Bibliothèque", "content": "Ouverte de 8h à 20h." }
                ]
            },
            { "id": "salles" }
        ]
    }"#;

    #[test]
    fn lookup_concatenates_in_stored_order() {
        let store = DocumentStore::from_json(SAMPLE).expect("parse");
        assert_eq!(
            store.lookup("informations_generales"),
            "Campus\n\nLe campus est à Pessac.\n\nBibliothèque\n\nOuverte de 8h à 20h."
        );
    }

    #[test]
    fn lookup_of_unknown_or_empty_agent_is_empty() {
        let store = DocumentStore::from_json(SAMPLE).expect("parse");
        assert_eq!(store.lookup("inconnu"), "");
        assert_eq!(store.lookup("salles"), "");
        assert_eq!(store.agent_ids(), vec!["informations_generales", "salles"]);
    }

    #[test]
    fn duplicate_agent_ids_are_merged() {
        let store = DocumentStore::from_agents(vec![
            Agent {
                id: "a".to_string(),
                documents: vec![Document {
                    title: "T1".to_string(),
                    content: "C1".to_string(),
                }],
            },
            Agent {
                id: "a".to_string(),
                documents: vec![Document {
                    title: "T2".to_string(),
                    content: "C2".to_string(),
                }],
            },
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("a"), "T1\n\nC1\n\nT2\n\nC2");
    }

    #[tokio::test]
    async fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(SAMPLE.as_bytes()).expect("write");

        let store = DocumentStore::load(file.path()).await.expect("load");
        assert_eq!(store.len(), 2);
        assert!(store.lookup("informations_generales").contains("Pessac"));
    }

    #[tokio::test]
    async fn load_missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocumentStore::load(&dir.path().join("absent.json"))
            .await
            .expect("missing file is not an error");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn load_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"{ not json").expect("write");

        let err = DocumentStore::load(file.path()).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::Parse { .. }));
    }
}
