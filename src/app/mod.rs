use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use eframe::egui::{self, Context, Vec2};
use tracing::{error, info};

use crate::config::ViewerConfig;
use crate::flow::{DocumentStore, GraphDocument};

mod animation;
mod drag;
mod edit;
mod events;
mod graph;
mod overlay;
mod scene;
mod search;
mod style;
#[cfg(test)]
mod test_support;
mod ui;

use self::animation::Sequencer;
use self::drag::DragController;
use self::edit::EditDrafts;
use self::events::{DiagramEvent, PlaybackStatus, Selection};
use self::overlay::StepOverlay;
use self::scene::Scene;
use self::search::SearchCache;

type LoadResult = Result<GraphDocument, String>;

pub struct FlowViewerApp {
    store: Arc<dyn DocumentStore>,
    config: ViewerConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    document: GraphDocument,
    store: Arc<dyn DocumentStore>,
    config: ViewerConfig,
    document_revision: u64,
    scene: Scene,
    scene_dirty: bool,
    canvas_size: Option<Vec2>,
    drag: DragController,
    sequencer: Sequencer,
    events: Vec<DiagramEvent>,
    hovered_link: Option<usize>,
    selected: Option<Selection>,
    search: String,
    search_cache: SearchCache,
    overlay: Option<StepOverlay>,
    playback: PlaybackStatus,
    save: SaveState,
    edit: EditDrafts,
    alert: Option<String>,
}

/// One save in flight at most; requests made meanwhile collapse into a single
/// follow-up save of the latest document.
#[derive(Default)]
struct SaveState {
    rx: Option<Receiver<Result<(), String>>>,
    queued: bool,
}

impl FlowViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        store: Arc<dyn DocumentStore>,
        config: ViewerConfig,
    ) -> Self {
        let state = Self::start_load(Arc::clone(&store));
        Self {
            store,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(store: Arc<dyn DocumentStore>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = store
                .load()
                .with_context(|| format!("failed to load diagram from {}", store.describe()))
                .map_err(|error| {
                    error!("{error:#}");
                    format!("{error:#}")
                });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(store: Arc<dyn DocumentStore>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(store),
        }
    }
}

impl eframe::App for FlowViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(document)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            document,
                            Arc::clone(&self.store),
                            self.config.clone(),
                        ))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading fund-flow diagram...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the fund-flow diagram");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(Arc::clone(&self.store)));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    info!(store = %self.store.describe(), "reloading diagram");
                    self.reload_rx = Some(Self::spawn_load(Arc::clone(&self.store)));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(document)) => {
                            model.replace_document(document);
                            ctx.request_repaint();
                        }
                        Ok(Err(error)) => model.alert(error),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint_after(Duration::from_millis(100));
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.alert("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
