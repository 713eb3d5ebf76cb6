use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use eframe::egui::{self, Align, Align2, Context, Layout, RichText};
use tracing::{debug, error, info};

use crate::config::ViewerConfig;
use crate::flow::{DocumentStore, GraphDocument};

use super::super::animation::{PlaybackState, Sequencer};
use super::super::drag::DragController;
use super::super::edit::EditDrafts;
use super::super::events::{DiagramEvent, PlaybackStatus, Selection};
use super::super::overlay::StepOverlay;
use super::super::scene::Scene;
use super::super::search::SearchCache;
use super::super::{SaveState, ViewModel};

fn spawn_save(store: Arc<dyn DocumentStore>, document: GraphDocument) -> Receiver<Result<(), String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = store
            .save(&document)
            .with_context(|| format!("failed to save diagram to {}", store.describe()))
            .map_err(|error| {
                error!("{error:#}");
                format!("{error:#}")
            });
        let _ = tx.send(result);
    });

    rx
}

impl ViewModel {
    pub(in crate::app) fn new(
        document: GraphDocument,
        store: Arc<dyn DocumentStore>,
        config: ViewerConfig,
    ) -> Self {
        info!(
            nodes = document.nodes.len(),
            links = document.links.len(),
            unplaced = document.unplaced_count(),
            summaries = config.summaries.len(),
            "diagram ready"
        );

        Self {
            sequencer: Sequencer::new(config.animation.clone()),
            document,
            store,
            config,
            document_revision: 0,
            scene: Scene::default(),
            scene_dirty: true,
            canvas_size: None,
            drag: DragController::default(),
            events: Vec::new(),
            hovered_link: None,
            selected: None,
            search: String::new(),
            search_cache: SearchCache::default(),
            overlay: None,
            playback: PlaybackStatus::Stopped,
            save: SaveState::default(),
            edit: EditDrafts::default(),
            alert: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.poll_save();
        if self.save.rx.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("fundflow");
                    ui.separator();
                    ui.label(format!("source: {}", self.store.describe()));
                    ui.label(format!("nodes: {}", self.document.nodes.len()));
                    ui.label(format!("links: {}", self.document.links.len()));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload diagram"));
                    if reload_button
                        .on_hover_text("Re-read the diagram file; stops the flow animation.")
                        .clicked()
                    {
                        *reload_requested = true;
                    }
                    if ui.button("Save").clicked() {
                        self.request_save();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.save.rx.is_some() {
                            ui.spinner();
                            ui.label("saving...");
                        }
                        if is_reloading {
                            ui.spinner();
                            ui.label("reloading...");
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));

        self.draw_alert(ctx);

        if self.dispatch_events() {
            ctx.request_repaint();
        }
    }

    fn draw_alert(&mut self, ctx: &Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Something went wrong")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(egui::Color32::from_rgb(220, 38, 38)));
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alert = None;
        }
    }

    pub(in crate::app) fn alert(&mut self, message: String) {
        self.alert = Some(message);
    }

    /// Routes queued canvas and sequencer notifications to the panels.
    /// Returns whether anything was delivered.
    fn dispatch_events(&mut self) -> bool {
        let events = std::mem::take(&mut self.events);
        let delivered = !events.is_empty();

        for event in events {
            match event {
                DiagramEvent::ItemClicked(selection) => {
                    debug!(kind = selection.kind(), "diagram item clicked");
                    self.selected = Some(selection);
                }
                DiagramEvent::AnimationState(status) => {
                    info!(state = status.label(), "flow animation state changed");
                    self.playback = status;
                    if status == PlaybackStatus::Stopped {
                        self.overlay = None;
                    }
                }
                DiagramEvent::StepChanged { step, link } => {
                    let total = self.sequencer.total_steps();
                    self.overlay = self.document.links.get(link).map(|flow_link| {
                        StepOverlay::build(step, total, link, flow_link, &self.config.summaries)
                    });
                    self.selected = Some(Selection::Link(link));
                }
            }
        }

        delivered
    }

    /// Persists the whole document in the background. A request made while a
    /// save is running is coalesced into one follow-up save.
    pub(in crate::app) fn request_save(&mut self) {
        if self.save.rx.is_some() {
            self.save.queued = true;
            return;
        }

        debug!("saving diagram");
        self.save.rx = Some(spawn_save(Arc::clone(&self.store), self.document.clone()));
    }

    pub(in crate::app) fn poll_save(&mut self) {
        let Some(rx) = self.save.rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(())) => info!(store = %self.store.describe(), "diagram saved"),
            Ok(Err(error)) => self.alert(error),
            Err(TryRecvError::Empty) => {
                self.save.rx = Some(rx);
                return;
            }
            Err(TryRecvError::Disconnected) => {
                self.alert("Background save worker disconnected".to_owned());
            }
        }

        if std::mem::take(&mut self.save.queued) {
            self.request_save();
        }
    }

    /// Swaps in a freshly loaded document: playback stops, any drag is
    /// dropped and the scene is rebuilt on the next frame.
    pub(in crate::app) fn replace_document(&mut self, document: GraphDocument) {
        if self.sequencer.state() != PlaybackState::Idle {
            self.sequencer.stop(&mut self.events);
        }
        self.drag.cancel();

        info!(
            nodes = document.nodes.len(),
            links = document.links.len(),
            "diagram replaced"
        );
        self.document = document;
        self.document_revision += 1;
        self.selected = None;
        self.hovered_link = None;
        self.overlay = None;
        self.edit = EditDrafts::default();
        self.canvas_size = None;
        self.scene_dirty = true;
    }
}
