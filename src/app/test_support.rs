use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::ViewerConfig;
use crate::flow::{DocumentStore, GraphDocument, Link, Node, NodeType, StoreError};

use super::ViewModel;

/// In-memory store that records every saved document, or fails every save.
#[derive(Default)]
pub(in crate::app) struct RecordingStore {
    saved: Mutex<Vec<GraphDocument>>,
    fail_saves: bool,
}

impl RecordingStore {
    pub(in crate::app) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(in crate::app) fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_saves: true,
            ..Self::default()
        })
    }

    pub(in crate::app) fn saved(&self) -> Vec<GraphDocument> {
        self.saved.lock().unwrap().clone()
    }
}

impl DocumentStore for RecordingStore {
    fn load(&self) -> Result<GraphDocument, StoreError> {
        Ok(sample_document())
    }

    fn save(&self, document: &GraphDocument) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Write {
                path: PathBuf::from("memory.json"),
                source: io::Error::other("disk full"),
            });
        }
        self.saved.lock().unwrap().push(document.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory.json".to_owned()
    }
}

pub(in crate::app) fn sample_document() -> GraphDocument {
    GraphDocument {
        nodes: vec![
            Node {
                node_name: "User".to_owned(),
                x: Some(200.0),
                y: Some(200.0),
                ..Node::default()
            },
            Node {
                node_name: "Farm Contract".to_owned(),
                node_type: NodeType::Contract,
                x: Some(500.0),
                y: Some(200.0),
                ..Node::default()
            },
        ],
        links: vec![Link {
            name: "User_Farm Contract".to_owned(),
            from: "User".to_owned(),
            to: "Farm Contract".to_owned(),
            description: Some("[1] User deposits".to_owned()),
            ..Link::default()
        }],
        ..GraphDocument::default()
    }
}

pub(in crate::app) fn view_model(store: &Arc<RecordingStore>, document: GraphDocument) -> ViewModel {
    let store: Arc<dyn DocumentStore> = Arc::clone(store) as Arc<dyn DocumentStore>;
    ViewModel::new(document, store, ViewerConfig::default())
}

/// Polls until no save is in flight or queued.
pub(in crate::app) fn settle_saves(model: &mut ViewModel) {
    for _ in 0..1_000 {
        model.poll_save();
        if model.save.rx.is_none() && !model.save.queued {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("background save did not finish");
}
