use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use tracing::warn;

use crate::config::CanvasConfig;
use crate::flow::{GraphDocument, NodeType};
use crate::geometry::{LinkEndpoints, link_endpoints};
use crate::util::label_lines;

pub(in crate::app) struct NodeVisual {
    pub(in crate::app) node_type: NodeType,
    pub(in crate::app) center: Pos2,
    pub(in crate::app) label_lines: Vec<String>,
}

pub(in crate::app) struct LinkVisual {
    pub(in crate::app) from: Option<usize>,
    pub(in crate::app) to: Option<usize>,
    pub(in crate::app) offset: f32,
    pub(in crate::app) endpoints: LinkEndpoints,
}

impl LinkVisual {
    pub(in crate::app) fn is_dangling(&self) -> bool {
        self.from.is_none() || self.to.is_none()
    }
}

/// Node and link visuals in canvas coordinates, rebuilt from the document and
/// never holding a copy of it.
#[derive(Default)]
pub(in crate::app) struct Scene {
    nodes: Vec<NodeVisual>,
    links: Vec<LinkVisual>,
    paint_order: Vec<usize>,
    index_by_name: HashMap<String, usize>,
    node_size: Vec2,
    hit_width: f32,
}

impl Scene {
    /// Full rebuild; identical input yields identical geometry.
    pub(in crate::app) fn render(&mut self, document: &GraphDocument, canvas: &CanvasConfig) {
        self.nodes.clear();
        self.links.clear();
        self.index_by_name.clear();
        self.node_size = vec2(canvas.node_width, canvas.node_height);
        self.hit_width = canvas.hit_width;

        for (index, node) in document.nodes.iter().enumerate() {
            let (x, y) = node.position();
            self.nodes.push(NodeVisual {
                node_type: node.node_type.clone(),
                center: pos2(x, y),
                label_lines: label_lines(&node.node_name),
            });
            self.index_by_name
                .entry(node.node_name.clone())
                .or_insert(index);
        }
        self.paint_order = (0..self.nodes.len()).collect();

        let mut dangling = 0usize;
        for link in &document.links {
            let from = self.index_by_name.get(&link.from).copied();
            let to = self.index_by_name.get(&link.to).copied();
            if from.is_none() || to.is_none() {
                dangling += 1;
            }
            self.links.push(LinkVisual {
                from,
                to,
                offset: link.offset(),
                endpoints: LinkEndpoints::default(),
            });
        }
        if dangling > 0 {
            warn!(
                dangling,
                "links reference missing nodes; drawing them from the origin"
            );
        }

        self.update_links();
    }

    /// Recomputes link endpoints from the current node centers.
    pub(in crate::app) fn update_links(&mut self) {
        for link in &mut self.links {
            let from = node_center(&self.nodes, link.from);
            let to = node_center(&self.nodes, link.to);
            link.endpoints = link_endpoints(from, to, self.node_size, link.offset);
        }
    }

    pub(in crate::app) fn move_node(&mut self, index: usize, center: Pos2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.center = center;
        }
    }

    /// Moves `index` to the top of the paint order.
    pub(in crate::app) fn raise(&mut self, index: usize) {
        if let Some(position) = self.paint_order.iter().position(|&node| node == index) {
            self.paint_order.remove(position);
            self.paint_order.push(index);
        }
    }

    pub(in crate::app) fn links(&self) -> &[LinkVisual] {
        &self.links
    }

    pub(in crate::app) fn node(&self, index: usize) -> Option<&NodeVisual> {
        self.nodes.get(index)
    }

    pub(in crate::app) fn link(&self, index: usize) -> Option<&LinkVisual> {
        self.links.get(index)
    }

    pub(in crate::app) fn paint_order(&self) -> &[usize] {
        &self.paint_order
    }

    pub(in crate::app) fn node_rect(&self, index: usize) -> Option<Rect> {
        self.nodes
            .get(index)
            .map(|node| Rect::from_center_size(node.center, self.node_size))
    }

    /// Topmost node under `point`.
    pub(in crate::app) fn node_at(&self, point: Pos2) -> Option<usize> {
        self.paint_order.iter().rev().copied().find(|&index| {
            self.node_rect(index)
                .is_some_and(|rect| rect.contains(point))
        })
    }

    /// Nearest link whose hit area contains `point`.
    pub(in crate::app) fn link_at(&self, point: Pos2) -> Option<usize> {
        let reach = self.hit_width / 2.0;
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| !link.is_dangling())
            .map(|(index, link)| (index, link.endpoints.distance_to(point)))
            .filter(|(_, distance)| *distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

fn node_center(nodes: &[NodeVisual], index: Option<usize>) -> Pos2 {
    index
        .and_then(|index| nodes.get(index))
        .map_or(Pos2::ZERO, |node| node.center)
}
