use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::util::stable_pair;

/// Node kind. Anything other than `address` or `contract` is kept verbatim
/// and drawn like an address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    #[default]
    Address,
    Contract,
    Other(String),
}

impl NodeType {
    pub fn label(&self) -> &str {
        match self {
            Self::Address => "address",
            Self::Contract => "contract",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Contract)
    }
}

impl From<String> for NodeType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "address" => Self::Address,
            "contract" => Self::Contract,
            _ => Self::Other(raw),
        }
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Other(raw) => raw,
            known => known.label().to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "inAmount", skip_serializing_if = "Option::is_none")]
    pub in_amount: Option<Value>,
    #[serde(default, rename = "outAmount", skip_serializing_if = "Option::is_none")]
    pub out_amount: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<PairRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AddressRecord {
    /// Every free-text field a search query is matched against.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.address.as_str()),
            self.label.as_deref(),
            self.token0.as_deref(),
            self.token1.as_deref(),
            self.pool.as_deref(),
            self.farm.as_deref(),
            self.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|field| !field.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_name: String,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default)]
    pub addresses: Vec<AddressRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Canvas position; unplaced coordinates read as zero.
    pub fn position(&self) -> (f32, f32) {
        (
            self.x.filter(|x| x.is_finite()).unwrap_or(0.0),
            self.y.filter(|y| y.is_finite()).unwrap_or(0.0),
        )
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = Some(x);
        self.y = Some(y);
    }

    pub fn is_placed(&self) -> bool {
        self.x.is_some_and(f32::is_finite) && self.y.is_some_and(f32::is_finite)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_offset: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("{}_{}", self.from, self.to)
        } else {
            self.name.clone()
        }
    }

    pub fn offset(&self) -> f32 {
        self.curve_offset.filter(|offset| offset.is_finite()).unwrap_or(0.0)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, rename = "relatedNodes")]
    pub related_nodes: Vec<String>,
    #[serde(default, rename = "relatedLinks")]
    pub related_links: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    pub fn title(&self) -> String {
        ["title", "name", "label"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| "Untitled resource".to_owned())
    }

    pub fn url(&self) -> Option<&str> {
        ["url", "link", "href"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
    }
}

/// Rejected edit; the document is left as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("node name must not be empty")]
    EmptyName,
    #[error("a node named {0:?} already exists")]
    DuplicateNode(String),
    #[error("no node named {0:?}")]
    UnknownNode(String),
    #[error("no item at index {0}")]
    OutOfRange(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphDocument {
    pub fn node_index(&self, node_name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.node_name == node_name)
    }

    pub fn node(&self, node_name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.node_name == node_name)
    }

    pub fn unplaced_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_placed()).count()
    }

    /// Gives every node without finite coordinates a position inside
    /// `[min, max]`, derived from a hash of its name so reloads stay put.
    pub fn place_missing(&mut self, min: (f32, f32), max: (f32, f32)) -> usize {
        let mut placed = 0;
        for node in &mut self.nodes {
            if node.is_placed() {
                continue;
            }
            let (fx, fy) = stable_pair(&node.node_name);
            let x = min.0 + (max.0 - min.0).max(0.0) * fx;
            let y = min.1 + (max.1 - min.1).max(0.0) * fy;
            node.set_position(x, y);
            placed += 1;
        }
        placed
    }

    /// Pulls placed nodes back inside `[min, max]`. Returns how many moved.
    pub fn clamp_positions(&mut self, min: (f32, f32), max: (f32, f32)) -> usize {
        let mut moved = 0;
        for node in self.nodes.iter_mut().filter(|node| node.is_placed()) {
            let (x, y) = node.position();
            let clamped_x = x.max(min.0).min(max.0.max(min.0));
            let clamped_y = y.max(min.1).min(max.1.max(min.1));
            if clamped_x != x || clamped_y != y {
                node.set_position(clamped_x, clamped_y);
                moved += 1;
            }
        }
        moved
    }

    pub fn resources_for_node(&self, node_name: &str) -> Vec<&Resource> {
        self.resources
            .iter()
            .flatten()
            .filter(|resource| resource.related_nodes.iter().any(|name| name == node_name))
            .collect()
    }

    pub fn resources_for_link(&self, link: &Link) -> Vec<&Resource> {
        let name = link.display_name();
        self.resources
            .iter()
            .flatten()
            .filter(|resource| resource.related_links.iter().any(|related| related == &name))
            .collect()
    }

    fn check_new_name(&self, name: &str, skip: Option<usize>) -> Result<(), EditError> {
        if name.trim().is_empty() {
            return Err(EditError::EmptyName);
        }
        let taken = self
            .nodes
            .iter()
            .enumerate()
            .any(|(index, node)| Some(index) != skip && node.node_name == name);
        if taken {
            return Err(EditError::DuplicateNode(name.to_owned()));
        }
        Ok(())
    }

    fn check_endpoints(&self, from: &str, to: &str) -> Result<(), EditError> {
        for name in [from, to] {
            if self.node_index(name).is_none() {
                return Err(EditError::UnknownNode(name.to_owned()));
            }
        }
        Ok(())
    }

    /// Appends `node`, keeping node names unique. Returns its index.
    pub fn add_node(&mut self, node: Node) -> Result<usize, EditError> {
        self.check_new_name(&node.node_name, None)?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Replaces the node at `index`. A rename is carried into every link
    /// endpoint, conventional link name and resource reference.
    pub fn update_node(&mut self, index: usize, node: Node) -> Result<(), EditError> {
        let old_name = self
            .nodes
            .get(index)
            .map(|existing| existing.node_name.clone())
            .ok_or(EditError::OutOfRange(index))?;
        self.check_new_name(&node.node_name, Some(index))?;

        let new_name = node.node_name.clone();
        self.nodes[index] = node;
        if new_name == old_name {
            return Ok(());
        }

        for link in &mut self.links {
            if link.from != old_name && link.to != old_name {
                continue;
            }
            let old_link_name = link.display_name();
            let conventional = old_link_name == format!("{}_{}", link.from, link.to);
            if link.from == old_name {
                link.from.clone_from(&new_name);
            }
            if link.to == old_name {
                link.to.clone_from(&new_name);
            }
            if conventional {
                if !link.name.is_empty() {
                    link.name = format!("{}_{}", link.from, link.to);
                }
                let new_link_name = link.display_name();
                for resource in self.resources.iter_mut().flatten() {
                    for related in &mut resource.related_links {
                        if *related == old_link_name {
                            related.clone_from(&new_link_name);
                        }
                    }
                }
            }
        }
        for resource in self.resources.iter_mut().flatten() {
            for related in &mut resource.related_nodes {
                if *related == old_name {
                    related.clone_from(&new_name);
                }
            }
        }
        Ok(())
    }

    /// Removes the node at `index` and every link touching it. Returns the
    /// removed node and how many links went with it.
    pub fn remove_node(&mut self, index: usize) -> Result<(Node, usize), EditError> {
        if index >= self.nodes.len() {
            return Err(EditError::OutOfRange(index));
        }
        let node = self.nodes.remove(index);
        let before = self.links.len();
        self.links
            .retain(|link| link.from != node.node_name && link.to != node.node_name);
        let removed = before - self.links.len();
        Ok((node, removed))
    }

    /// Appends `link` between existing nodes, naming it `{from}_{to}` when it
    /// has no name. Returns its index.
    pub fn add_link(&mut self, mut link: Link) -> Result<usize, EditError> {
        self.check_endpoints(&link.from, &link.to)?;
        if link.name.is_empty() {
            link.name = format!("{}_{}", link.from, link.to);
        }
        self.links.push(link);
        Ok(self.links.len() - 1)
    }

    /// Replaces the link at `index`; the name follows new endpoints.
    pub fn update_link(&mut self, index: usize, mut link: Link) -> Result<(), EditError> {
        let existing = self.links.get(index).ok_or(EditError::OutOfRange(index))?;
        self.check_endpoints(&link.from, &link.to)?;
        if existing.from != link.from || existing.to != link.to || link.name.is_empty() {
            link.name = format!("{}_{}", link.from, link.to);
        }
        self.links[index] = link;
        Ok(())
    }

    pub fn remove_link(&mut self, index: usize) -> Result<Link, EditError> {
        if index >= self.links.len() {
            return Err(EditError::OutOfRange(index));
        }
        Ok(self.links.remove(index))
    }

    pub fn incident_links(&self, node_name: &str) -> Vec<usize> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.from == node_name || link.to == node_name)
            .map(|(index, _)| index)
            .collect()
    }
}
