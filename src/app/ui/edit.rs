use eframe::egui::{self, Button, Color32, ComboBox, DragValue, RichText, TextEdit, Ui};

use super::super::ViewModel;
use super::super::edit::{LinkDraft, NodeDraft};
use super::super::events::Selection;

const KNOWN_NODE_TYPES: [&str; 2] = ["address", "contract"];

enum EditAction {
    ApplyNode(usize),
    ApplyLink(usize),
    Delete(Selection),
    AddNode,
    AddLink,
}

fn node_form(ui: &mut Ui, id: &str, draft: &mut NodeDraft) {
    egui::Grid::new((id, "node_form"))
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut draft.name);
            ui.end_row();

            ui.label("Type");
            ComboBox::from_id_salt((id, "node_type"))
                .selected_text(draft.node_type.as_str())
                .show_ui(ui, |ui| {
                    for kind in KNOWN_NODE_TYPES {
                        ui.selectable_value(&mut draft.node_type, kind.to_owned(), kind);
                    }
                });
            ui.end_row();

            ui.label("Description");
            ui.text_edit_singleline(&mut draft.description);
            ui.end_row();
        });

    ui.label("Addresses (JSON)");
    ui.add(
        TextEdit::multiline(&mut draft.addresses)
            .code_editor()
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
}

fn endpoint_combo(ui: &mut Ui, id: (&str, &str), value: &mut String, names: &[String]) {
    ComboBox::from_id_salt(id)
        .selected_text(value.as_str())
        .width(180.0)
        .show_ui(ui, |ui| {
            for name in names {
                ui.selectable_value(value, name.clone(), name.as_str());
            }
        });
}

fn link_form(ui: &mut Ui, id: &str, draft: &mut LinkDraft, names: &[String]) {
    egui::Grid::new((id, "link_form"))
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("From");
            endpoint_combo(ui, (id, "from"), &mut draft.from, names);
            ui.end_row();

            ui.label("To");
            endpoint_combo(ui, (id, "to"), &mut draft.to, names);
            ui.end_row();

            ui.label("Curve offset");
            ui.add(DragValue::new(&mut draft.curve_offset).speed(1.0).range(-200.0..=200.0));
            ui.end_row();

            ui.label("Link type");
            ui.text_edit_singleline(&mut draft.link_type);
            ui.end_row();

            ui.label("Line style");
            ui.text_edit_singleline(&mut draft.line_style);
            ui.end_row();
        });

    ui.label("Description (lead with [n] to order the step)");
    ui.add(
        TextEdit::multiline(&mut draft.description)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
}

impl ViewModel {
    pub(in crate::app) fn draw_edit(&mut self, ui: &mut Ui) {
        self.sync_edit_drafts();
        let names = self
            .document
            .nodes
            .iter()
            .map(|node| node.node_name.clone())
            .collect::<Vec<_>>();
        let mut action = None;

        if let Some(selection) = self.selected {
            egui::CollapsingHeader::new(format!("Edit {}", selection.kind()))
                .id_salt("edit_selection")
                .default_open(false)
                .show(ui, |ui| {
                    let apply = match selection {
                        Selection::Node(index) => {
                            node_form(ui, "selected", &mut self.edit.node);
                            EditAction::ApplyNode(index)
                        }
                        Selection::Link(index) => {
                            link_form(ui, "selected", &mut self.edit.link, &names);
                            EditAction::ApplyLink(index)
                        }
                    };

                    ui.horizontal(|ui| {
                        if ui.button("Apply").clicked() {
                            action = Some(apply);
                        }
                        if self.edit.confirm_delete == Some(selection) {
                            let prompt = match selection {
                                Selection::Node(_) => "Delete node and its links?",
                                Selection::Link(_) => "Delete link?",
                            };
                            ui.label(prompt);
                            if ui
                                .add(Button::new(RichText::new("Delete").color(Color32::WHITE)).fill(
                                    Color32::from_rgb(220, 38, 38),
                                ))
                                .clicked()
                            {
                                action = Some(EditAction::Delete(selection));
                            }
                            if ui.button("Cancel").clicked() {
                                self.edit.confirm_delete = None;
                            }
                        } else if ui.button("Delete...").clicked() {
                            self.edit.confirm_delete = Some(selection);
                        }
                    });
                });
        }

        egui::CollapsingHeader::new("Add node")
            .id_salt("add_node")
            .show(ui, |ui| {
                node_form(ui, "new", &mut self.edit.new_node);
                if ui.button("Add node").clicked() {
                    action = Some(EditAction::AddNode);
                }
            });

        egui::CollapsingHeader::new("Add link")
            .id_salt("add_link")
            .show(ui, |ui| {
                if names.is_empty() {
                    ui.label("Add a node first.");
                    return;
                }
                link_form(ui, "new", &mut self.edit.new_link, &names);
                if ui.button("Add link").clicked() {
                    action = Some(EditAction::AddLink);
                }
            });

        if let Some(error) = &self.edit.error {
            ui.label(RichText::new(error.as_str()).color(Color32::from_rgb(220, 38, 38)));
        }

        match action {
            Some(EditAction::ApplyNode(index)) => self.apply_node_edit(index),
            Some(EditAction::ApplyLink(index)) => self.apply_link_edit(index),
            Some(EditAction::Delete(selection)) => self.delete_item(selection),
            Some(EditAction::AddNode) => self.add_node_from_draft(),
            Some(EditAction::AddLink) => self.add_link_from_draft(),
            None => {}
        }
    }
}
