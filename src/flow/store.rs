use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::document::GraphDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read diagram file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("diagram file {path} is not a valid graph document")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize graph document for {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write diagram file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Wholesale load/save boundary for the graph document.
pub trait DocumentStore: Send + Sync {
    fn load(&self) -> Result<GraphDocument, StoreError>;

    /// Replaces the stored document with `document`; last write wins.
    fn save(&self, document: &GraphDocument) -> Result<(), StoreError>;

    fn describe(&self) -> String;
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<GraphDocument, StoreError> {
        debug!(path = %self.path.display(), "reading graph document");
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let document: GraphDocument =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        info!(
            path = %self.path.display(),
            nodes = document.nodes.len(),
            links = document.links.len(),
            "loaded graph document"
        );
        Ok(document)
    }

    fn save(&self, document: &GraphDocument) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string_pretty(document).map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, raw).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            nodes = document.nodes.len(),
            links = document.links.len(),
            "saved graph document"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::flow::document::{Link, Node, NodeType};

    fn sample_document() -> GraphDocument {
        GraphDocument {
            nodes: vec![
                Node {
                    node_name: "User".to_owned(),
                    x: Some(100.0),
                    y: Some(80.0),
                    ..Node::default()
                },
                Node {
                    node_name: "Farm Contract".to_owned(),
                    node_type: NodeType::Contract,
                    ..Node::default()
                },
            ],
            links: vec![Link {
                name: "User_Farm Contract".to_owned(),
                from: "User".to_owned(),
                to: "Farm Contract".to_owned(),
                description: Some("[1] deposit".to_owned()),
                ..Link::default()
            }],
            ..GraphDocument::default()
        }
    }

    #[test]
    fn save_then_load_returns_same_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("diagram.json"));
        let document = sample_document();

        store.save(&document).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, document);
    }

    #[test]
    fn save_writes_two_space_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("diagram.json"));

        store.save(&sample_document()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();

        assert!(raw.starts_with("{\n  \"nodes\": ["));
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("diagram.json"));
        let mut document = sample_document();

        store.save(&document).unwrap();
        document.nodes[0].set_position(300.0, 200.0);
        store.save(&document).unwrap();

        assert_eq!(store.load().unwrap().nodes[0].position(), (300.0, 200.0));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        assert!(matches!(store.load(), Err(StoreError::Read { .. })));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.json");
        fs::write(&path, "{ \"nodes\": [ { \"x\": 1 } ] }").unwrap();

        let error = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(error, StoreError::Parse { .. }));
        assert!(error.to_string().contains("not a valid graph document"));
    }

    #[test]
    fn save_into_missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("diagram.json"));

        assert!(matches!(
            store.save(&sample_document()),
            Err(StoreError::Write { .. })
        ));
    }
}
