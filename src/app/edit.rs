use anyhow::{Context as _, Result};
use tracing::{info, warn};

use crate::flow::{AddressRecord, Link, Node, NodeType};

use super::ViewModel;
use super::animation::PlaybackState;
use super::events::Selection;

/// Form contents for a node; addresses are edited as a JSON array.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct NodeDraft {
    pub(in crate::app) name: String,
    pub(in crate::app) node_type: String,
    pub(in crate::app) description: String,
    pub(in crate::app) addresses: String,
}

impl NodeDraft {
    pub(in crate::app) fn blank() -> Self {
        Self {
            node_type: NodeType::Address.label().to_owned(),
            addresses: "[]".to_owned(),
            ..Self::default()
        }
    }

    fn from_node(node: &Node) -> Self {
        Self {
            name: node.node_name.clone(),
            node_type: node.node_type.label().to_owned(),
            description: node.description.clone().unwrap_or_default(),
            addresses: serde_json::to_string_pretty(&node.addresses)
                .unwrap_or_else(|_| "[]".to_owned()),
        }
    }

    /// Builds the node on top of `base`, keeping its position and any fields
    /// the form does not show.
    fn to_node(&self, base: Option<&Node>) -> Result<Node> {
        let addresses: Vec<AddressRecord> = if self.addresses.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.addresses)
                .context("addresses must be a JSON array of address records")?
        };

        let mut node = base.cloned().unwrap_or_default();
        node.node_name = self.name.trim().to_owned();
        node.node_type = match self.node_type.trim() {
            "" => NodeType::Address,
            raw => NodeType::from(raw.to_owned()),
        };
        node.description = non_empty(&self.description);
        node.addresses = addresses;
        Ok(node)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct LinkDraft {
    pub(in crate::app) from: String,
    pub(in crate::app) to: String,
    pub(in crate::app) description: String,
    pub(in crate::app) curve_offset: f32,
    pub(in crate::app) link_type: String,
    pub(in crate::app) line_style: String,
}

impl LinkDraft {
    fn from_link(link: &Link) -> Self {
        Self {
            from: link.from.clone(),
            to: link.to.clone(),
            description: link.description().to_owned(),
            curve_offset: link.offset(),
            link_type: link.link_type.clone().unwrap_or_default(),
            line_style: link.line_style.clone().unwrap_or_default(),
        }
    }

    fn to_link(&self, base: Option<&Link>) -> Link {
        let mut link = base.cloned().unwrap_or_default();
        link.from.clone_from(&self.from);
        link.to.clone_from(&self.to);
        link.description = non_empty(&self.description);
        link.curve_offset = (self.curve_offset != 0.0 || link.curve_offset.is_some())
            .then_some(self.curve_offset);
        link.link_type = non_empty(&self.link_type);
        link.line_style = non_empty(&self.line_style);
        link
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Edit forms for the selected item plus the "add" forms. The selected-item
/// draft is refreshed whenever the selection or the document changes.
#[derive(Debug)]
pub(in crate::app) struct EditDrafts {
    loaded_for: Option<(Selection, u64)>,
    pub(in crate::app) node: NodeDraft,
    pub(in crate::app) link: LinkDraft,
    pub(in crate::app) new_node: NodeDraft,
    pub(in crate::app) new_link: LinkDraft,
    pub(in crate::app) confirm_delete: Option<Selection>,
    pub(in crate::app) error: Option<String>,
}

impl Default for EditDrafts {
    fn default() -> Self {
        Self {
            loaded_for: None,
            node: NodeDraft::blank(),
            link: LinkDraft::default(),
            new_node: NodeDraft::blank(),
            new_link: LinkDraft::default(),
            confirm_delete: None,
            error: None,
        }
    }
}

impl ViewModel {
    /// Reloads the selected-item draft if it was taken from another item or
    /// an older revision of the document.
    pub(in crate::app) fn sync_edit_drafts(&mut self) {
        let Some(selection) = self.selected else {
            self.edit.loaded_for = None;
            return;
        };
        let key = (selection, self.document_revision);
        if self.edit.loaded_for == Some(key) {
            return;
        }

        match selection {
            Selection::Node(index) => {
                if let Some(node) = self.document.nodes.get(index) {
                    self.edit.node = NodeDraft::from_node(node);
                }
            }
            Selection::Link(index) => {
                if let Some(link) = self.document.links.get(index) {
                    self.edit.link = LinkDraft::from_link(link);
                }
            }
        }
        self.edit.loaded_for = Some(key);
        self.edit.confirm_delete = None;
        self.edit.error = None;
    }

    /// Common tail of every document edit: playback and drags end, the scene
    /// is rebuilt and the whole document is saved.
    pub(in crate::app) fn commit_edit(&mut self, what: &str) {
        if self.sequencer.state() != PlaybackState::Idle {
            self.sequencer.stop(&mut self.events);
        }
        self.drag.cancel();

        if let Some(size) = self.canvas_size {
            let (min, max) = self.config.canvas.center_bounds((size.x, size.y));
            self.document.place_missing(min, max);
        }

        self.document_revision += 1;
        self.scene_dirty = true;
        self.hovered_link = None;
        self.overlay = None;
        self.edit.error = None;
        self.edit.confirm_delete = None;
        info!(
            edit = what,
            nodes = self.document.nodes.len(),
            links = self.document.links.len(),
            "diagram edited"
        );
        self.request_save();
    }

    fn reject_edit(&mut self, error: anyhow::Error) {
        warn!("{error:#}");
        self.edit.error = Some(format!("{error:#}"));
    }

    pub(in crate::app) fn apply_node_edit(&mut self, index: usize) {
        let result = self
            .edit
            .node
            .to_node(self.document.nodes.get(index))
            .and_then(|node| self.document.update_node(index, node).map_err(Into::into));
        match result {
            Ok(()) => self.commit_edit("update node"),
            Err(error) => self.reject_edit(error),
        }
    }

    pub(in crate::app) fn apply_link_edit(&mut self, index: usize) {
        let link = self.edit.link.to_link(self.document.links.get(index));
        match self.document.update_link(index, link) {
            Ok(()) => self.commit_edit("update link"),
            Err(error) => self.reject_edit(error.into()),
        }
    }

    pub(in crate::app) fn add_node_from_draft(&mut self) {
        let result = self
            .edit
            .new_node
            .to_node(None)
            .and_then(|node| self.document.add_node(node).map_err(Into::into));
        match result {
            Ok(index) => {
                self.edit.new_node = NodeDraft::blank();
                self.selected = Some(Selection::Node(index));
                self.commit_edit("add node");
            }
            Err(error) => self.reject_edit(error),
        }
    }

    pub(in crate::app) fn add_link_from_draft(&mut self) {
        let link = self.edit.new_link.to_link(None);
        match self.document.add_link(link) {
            Ok(index) => {
                self.edit.new_link.description.clear();
                self.selected = Some(Selection::Link(index));
                self.commit_edit("add link");
            }
            Err(error) => self.reject_edit(error.into()),
        }
    }

    /// Deletes `selection`; deleting a node also deletes its links.
    pub(in crate::app) fn delete_item(&mut self, selection: Selection) {
        let result = match selection {
            Selection::Node(index) => self.document.remove_node(index).map(|(node, links)| {
                info!(node = %node.node_name, links, "node deleted");
            }),
            Selection::Link(index) => self.document.remove_link(index).map(|link| {
                info!(link = %link.display_name(), "link deleted");
            }),
        };
        match result {
            Ok(()) => {
                self.selected = None;
                self.commit_edit("delete");
            }
            Err(error) => self.reject_edit(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::events::{DiagramEvent, PlaybackStatus};
    use crate::app::test_support::{RecordingStore, sample_document, settle_saves, view_model};

    #[test]
    fn node_draft_keeps_position_and_parses_addresses() {
        let base = Node {
            node_name: "Vault".to_owned(),
            x: Some(10.0),
            y: Some(20.0),
            ..Node::default()
        };
        let mut draft = NodeDraft::from_node(&base);
        draft.node_type = "contract".to_owned();
        draft.addresses = r#"[{ "address": "0xabc", "label": "Main" }]"#.to_owned();

        let node = draft.to_node(Some(&base)).unwrap();
        assert_eq!(node.position(), (10.0, 20.0));
        assert_eq!(node.node_type, NodeType::Contract);
        assert_eq!(node.addresses[0].label.as_deref(), Some("Main"));

        draft.addresses = "{ not json".to_owned();
        let error = draft.to_node(Some(&base)).unwrap_err();
        assert!(format!("{error:#}").contains("JSON array"));
    }

    #[test]
    fn link_draft_round_trips_optional_fields() {
        let link = Link {
            name: "A_B".to_owned(),
            from: "A".to_owned(),
            to: "B".to_owned(),
            description: Some("[2] swap".to_owned()),
            ..Link::default()
        };
        let mut draft = LinkDraft::from_link(&link);
        assert_eq!(draft.to_link(Some(&link)), link);

        draft.curve_offset = 25.0;
        draft.line_style = "dashed".to_owned();
        let edited = draft.to_link(Some(&link));
        assert_eq!(edited.curve_offset, Some(25.0));
        assert_eq!(edited.line_style.as_deref(), Some("dashed"));
    }

    #[test]
    fn editing_a_link_stops_playback_rerenders_and_saves() {
        let store = RecordingStore::new();
        let mut model = view_model(&store, sample_document());
        model
            .sequencer
            .start(&model.document.links, 0.0, &mut model.events);
        model.events.clear();
        model.scene_dirty = false;
        model.selected = Some(Selection::Link(0));
        model.sync_edit_drafts();

        model.edit.link.description = "[5] moved later".to_owned();
        model.edit.link.curve_offset = 30.0;
        model.apply_link_edit(0);
        settle_saves(&mut model);

        assert_eq!(
            model.events,
            vec![DiagramEvent::AnimationState(PlaybackStatus::Stopped)]
        );
        assert_eq!(model.sequencer.state(), PlaybackState::Idle);
        assert_eq!(model.document_revision, 1);
        assert!(model.scene_dirty);
        assert_eq!(model.document.links[0].description(), "[5] moved later");
        assert_eq!(model.document.links[0].offset(), 30.0);
        assert_eq!(store.saved(), vec![model.document.clone()]);
    }

    #[test]
    fn rejected_edit_keeps_document_and_reports_error() {
        let store = RecordingStore::new();
        let mut model = view_model(&store, sample_document());
        let before = model.document.clone();
        model.selected = Some(Selection::Link(0));
        model.sync_edit_drafts();

        model.edit.link.to = "Nowhere".to_owned();
        model.apply_link_edit(0);

        assert_eq!(model.document, before);
        assert_eq!(model.document_revision, 0);
        assert!(model.edit.error.as_deref().is_some_and(|error| error.contains("Nowhere")));
        assert!(model.save.rx.is_none());
        assert!(store.saved().is_empty());
    }

    #[test]
    fn adding_then_deleting_a_node_removes_its_links() {
        let store = RecordingStore::new();
        let mut model = view_model(&store, sample_document());

        model.edit.new_node.name = "Treasury".to_owned();
        model.add_node_from_draft();
        assert_eq!(model.selected, Some(Selection::Node(2)));

        model.edit.new_link.from = "Treasury".to_owned();
        model.edit.new_link.to = "User".to_owned();
        model.edit.new_link.description = "[3] refund".to_owned();
        model.add_link_from_draft();
        assert_eq!(model.selected, Some(Selection::Link(1)));
        assert_eq!(model.document.links[1].name, "Treasury_User");

        model.delete_item(Selection::Node(2));
        settle_saves(&mut model);

        assert_eq!(model.selected, None);
        assert_eq!(model.document.nodes.len(), 2);
        assert_eq!(model.document.links.len(), 1);
        assert_eq!(model.document_revision, 3);
        assert_eq!(store.saved().last(), Some(&model.document));
    }

    #[test]
    fn drafts_follow_selection_and_revision() {
        let store = RecordingStore::new();
        let mut model = view_model(&store, sample_document());

        model.selected = Some(Selection::Node(1));
        model.sync_edit_drafts();
        assert_eq!(model.edit.node.name, "Farm Contract");

        model.edit.node.name = "typing...".to_owned();
        model.sync_edit_drafts();
        assert_eq!(model.edit.node.name, "typing...");

        model.document_revision += 1;
        model.sync_edit_drafts();
        assert_eq!(model.edit.node.name, "Farm Contract");
    }
}
