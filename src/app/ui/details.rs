use eframe::egui::{self, RichText, Ui};
use serde_json::Value;

use crate::flow::{AddressRecord, Resource, step_marker};
use crate::util::short_address;

use super::super::ViewModel;
use super::super::events::{DiagramEvent, Selection};

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn optional_row(ui: &mut Ui, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        ui.label(format!("{label}: {value}"));
    }
}

fn draw_address(ui: &mut Ui, index: usize, record: &AddressRecord) {
    let title = match &record.label {
        Some(label) if !label.is_empty() => format!("{label}  {}", short_address(&record.address)),
        _ => short_address(&record.address),
    };

    egui::CollapsingHeader::new(title)
        .id_salt(("address_record", index))
        .default_open(index == 0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Address: {}", short_address(&record.address)))
                    .on_hover_text(record.address.as_str());
                if ui.small_button("Copy").clicked() {
                    ui.ctx().copy_text(record.address.clone());
                }
            });
            optional_row(ui, "Network", record.network.as_deref());
            optional_row(ui, "Type", record.kind.as_deref());
            optional_row(ui, "Token 0", record.token0.as_deref());
            optional_row(ui, "Token 1", record.token1.as_deref());
            optional_row(ui, "Pool", record.pool.as_deref());
            optional_row(ui, "Farm", record.farm.as_deref());
            if let Some(fee) = &record.fee {
                ui.label(format!("Fee: {}", value_text(fee)));
            }
            optional_row(ui, "Description", record.description.as_deref());

            if !record.pairs.is_empty() {
                ui.add_space(4.0);
                ui.label(RichText::new("Pairs").strong());
                egui::Grid::new(("address_pairs", index))
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("name");
                        ui.label("in");
                        ui.label("out");
                        ui.end_row();
                        for pair in &record.pairs {
                            ui.label(pair.name.as_str());
                            ui.label(pair.in_amount.as_ref().map(value_text).unwrap_or_default());
                            ui.label(pair.out_amount.as_ref().map(value_text).unwrap_or_default());
                            ui.end_row();
                        }
                    });
            }
        });
}

fn draw_resources(ui: &mut Ui, resources: &[&Resource]) {
    if resources.is_empty() {
        return;
    }

    ui.separator();
    ui.label(RichText::new("Resources").strong());
    for resource in resources {
        match resource.url() {
            Some(url) => {
                ui.hyperlink_to(resource.title(), url);
            }
            None => {
                ui.label(resource.title());
            }
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                match self.selected {
                    Some(Selection::Node(index)) => self.draw_node_details(ui, index),
                    Some(Selection::Link(index)) => self.draw_link_details(ui, index),
                    None => {
                        ui.label("Click a node or link on the canvas, or play the flow.");
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                self.draw_edit(ui);
            });
    }

    fn draw_node_details(&mut self, ui: &mut Ui, index: usize) {
        let Some(node) = self.document.nodes.get(index) else {
            ui.label("Selected node no longer exists in the diagram.");
            return;
        };

        ui.label(RichText::new(node.node_name.as_str()).strong());
        ui.small(node.node_type.label());
        let (x, y) = node.position();
        ui.small(format!("position: {x:.0}, {y:.0}"));
        ui.add_space(6.0);

        if let Some(description) = node.description.as_deref().filter(|text| !text.is_empty()) {
            ui.label(description);
            ui.add_space(6.0);
        }

        ui.separator();
        ui.label(RichText::new(format!("Addresses ({})", node.addresses.len())).strong());
        if node.addresses.is_empty() {
            ui.label("No addresses recorded.");
        }
        for (address_index, record) in node.addresses.iter().enumerate() {
            draw_address(ui, address_index, record);
        }

        let incident = self.document.incident_links(&node.node_name);
        if !incident.is_empty() {
            ui.separator();
            ui.label(RichText::new("Links").strong());
            for link_index in incident {
                let Some(link) = self.document.links.get(link_index) else {
                    continue;
                };
                let text = format!("{} -> {}", link.from, link.to);
                if ui.link(text).clicked() {
                    self.events
                        .push(DiagramEvent::ItemClicked(Selection::Link(link_index)));
                }
            }
        }

        draw_resources(ui, &self.document.resources_for_node(&node.node_name));
    }

    fn draw_link_details(&mut self, ui: &mut Ui, index: usize) {
        let Some(link) = self.document.links.get(index) else {
            ui.label("Selected link no longer exists in the diagram.");
            return;
        };

        ui.label(RichText::new(link.display_name()).strong());
        ui.small(self.config.summaries.phrase(&link.from, &link.to));
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            for (endpoint, prefix) in [(&link.from, "from"), (&link.to, "to")] {
                ui.label(format!("{prefix}:"));
                match self.document.node_index(endpoint) {
                    Some(node_index) => {
                        if ui.link(endpoint.as_str()).clicked() {
                            self.events
                                .push(DiagramEvent::ItemClicked(Selection::Node(node_index)));
                        }
                    }
                    None => {
                        ui.label(RichText::new(format!("{endpoint} (missing)")).weak());
                    }
                }
            }
        });

        match step_marker(link) {
            Some(key) => ui.label(format!("Step: [{}]", key.token)),
            None => ui.label("Step: unordered"),
        };
        if let Some(offset) = link.curve_offset {
            ui.label(format!("Curve offset: {offset}"));
        }
        optional_row(ui, "Link type", link.link_type.as_deref());
        optional_row(ui, "Line style", link.line_style.as_deref());

        if !link.description().is_empty() {
            ui.separator();
            ui.label(link.description());
        }

        if let Some(source) = self.document.node(&link.from)
            && !source.addresses.is_empty()
        {
            ui.separator();
            ui.label(RichText::new(format!("{} addresses", source.node_name)).strong());
            for (address_index, record) in source.addresses.iter().enumerate() {
                draw_address(ui, address_index, record);
            }
        }

        draw_resources(ui, &self.document.resources_for_link(link));
    }
}
