use eframe::egui::{self, Button, RichText, Slider, Ui};

use crate::flow::{flow_order, step_marker};
use crate::util::short_address;

use super::super::ViewModel;
use super::super::animation::PlaybackState;
use super::super::events::{DiagramEvent, PlaybackStatus, Selection};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Flow Controls");
        ui.separator();
        ui.add_space(4.0);

        let now = ui.input(|input| input.time);
        self.draw_playback(ui, now);

        ui.separator();
        self.draw_timing(ui);

        ui.separator();
        self.draw_search(ui);

        ui.separator();
        self.draw_step_list(ui);
    }

    fn draw_playback(&mut self, ui: &mut Ui, now: f64) {
        ui.horizontal(|ui| {
            let play_label = match self.playback {
                PlaybackStatus::Playing => "Pause",
                PlaybackStatus::Paused => "Resume",
                PlaybackStatus::Stopped => "Play flow",
            };
            if ui
                .button(play_label)
                .on_hover_text("Walk through the links in step-marker order.")
                .clicked()
            {
                self.sequencer
                    .toggle(&self.document.links, now, &mut self.events);
            }

            let running = self.sequencer.state() != PlaybackState::Idle;
            if ui.add_enabled(running, Button::new("Stop")).clicked() {
                self.sequencer.stop(&mut self.events);
            }
        });

        ui.horizontal(|ui| {
            let can_go_back = self.sequencer.current_step().is_some_and(|step| step > 0);
            if ui.add_enabled(can_go_back, Button::new("Prev step")).clicked() {
                self.sequencer.prev_step(now, &mut self.events);
            }
            if ui.button("Next step").clicked() {
                self.sequencer
                    .next_step(&self.document.links, now, &mut self.events);
            }
        });

        let status = match self.sequencer.announced_step() {
            Some((step, _)) => format!(
                "{}: step {}/{}",
                self.playback.label(),
                step + 1,
                self.sequencer.total_steps()
            ),
            None => self.playback.label().to_owned(),
        };
        ui.label(status);
        if self.sequencer.is_playing() {
            ui.small("Nodes are locked while the flow is playing.");
        }
    }

    fn draw_timing(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Timing").strong());

        let mut animation = self.sequencer.config().clone();
        let mut changed = false;
        changed |= ui
            .add(Slider::new(&mut animation.draw_duration_ms, 100..=5_000).text("draw (ms)"))
            .on_hover_text("How long the active link takes to draw.")
            .changed();
        changed |= ui
            .add(Slider::new(&mut animation.step_duration_ms, 0..=10_000).text("pause (ms)"))
            .on_hover_text("Delay between a finished step and the next one.")
            .changed();
        changed |= ui
            .add(Slider::new(&mut animation.lead_in_ms, 0..=3_000).text("lead-in (ms)"))
            .on_hover_text("Dimmed interval before the first step draws.")
            .changed();

        if changed {
            self.sequencer.set_config(animation);
        }
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (node name or address field)")
            .on_hover_text("Fuzzy-highlight nodes by name, address, label, token, pool or farm.");
        ui.text_edit_singleline(&mut self.search);

        let Some(results) =
            self.search_cache
                .results(&self.document, self.document_revision, &self.search)
        else {
            return;
        };

        if results.hits.is_empty() {
            ui.label("No nodes match.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(180.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for hit in &results.hits {
                    let Some(node) = self.document.nodes.get(hit.node) else {
                        continue;
                    };
                    let label = if hit.matched == node.node_name {
                        node.node_name.clone()
                    } else {
                        format!("{}  ({})", node.node_name, short_address(&hit.matched))
                    };
                    let selected = self.selected == Some(Selection::Node(hit.node));
                    if ui.selectable_label(selected, label).clicked() {
                        self.events
                            .push(DiagramEvent::ItemClicked(Selection::Node(hit.node)));
                    }
                }
            });
    }

    fn draw_step_list(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Flow steps").strong());

        let order = flow_order(&self.document.links);
        if order.is_empty() {
            ui.label("The diagram has no links.");
            return;
        }

        let announced = self.sequencer.announced_step().map(|(_, link)| link);
        egui::ScrollArea::vertical()
            .id_salt("flow_steps_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (position, &link_index) in order.iter().enumerate() {
                    let Some(link) = self.document.links.get(link_index) else {
                        continue;
                    };
                    let marker = match step_marker(link) {
                        Some(key) => format!("[{}]", key.token),
                        None => "[-]".to_owned(),
                    };
                    let text = format!("{}. {marker} {} -> {}", position + 1, link.from, link.to);
                    let selected = announced == Some(link_index)
                        || self.selected == Some(Selection::Link(link_index));

                    let response = ui
                        .selectable_label(selected, text)
                        .on_hover_text(self.config.summaries.phrase(&link.from, &link.to));
                    if response.clicked() {
                        self.events
                            .push(DiagramEvent::ItemClicked(Selection::Link(link_index)));
                    }
                }
            });
    }
}
