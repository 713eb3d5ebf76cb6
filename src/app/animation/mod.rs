use std::collections::BTreeSet;

use tracing::debug;

use crate::config::AnimationConfig;
use crate::flow::{Link, flow_order};

use super::events::{DiagramEvent, PlaybackStatus};

mod timer;

use self::timer::{TimerHandle, TimerQueue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// How a link is drawn at a given moment of the walkthrough.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum LinkPhase {
    Default,
    Dimmed,
    /// Current step; `reveal` is the drawn fraction from start to end.
    Active { reveal: f32 },
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SequenceTask {
    BeginStep,
    FinishDraw,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum StepPhase {
    /// Lead-in or inter-step delay; the current step is not drawn yet.
    Waiting,
    Drawing { started_at: f64 },
    /// Draw interrupted by a pause at `progress`.
    Held { progress: f32 },
    /// Shown fully drawn by manual stepping.
    Static,
}

struct FlowRun {
    order: Vec<usize>,
    current: usize,
    completed: BTreeSet<usize>,
    phase: StepPhase,
    announced: Option<usize>,
}

impl FlowRun {
    fn is_finished(&self) -> bool {
        self.current >= self.order.len()
    }
}

/// Timed walkthrough over the links in step-marker order.
pub(in crate::app) struct Sequencer {
    config: AnimationConfig,
    state: PlaybackState,
    run: Option<FlowRun>,
    timers: TimerQueue<SequenceTask>,
    pending: Option<TimerHandle>,
}

fn ease_quad_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

impl Sequencer {
    pub(in crate::app) fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: PlaybackState::Idle,
            run: None,
            timers: TimerQueue::new(),
            pending: None,
        }
    }

    pub(in crate::app) fn state(&self) -> PlaybackState {
        self.state
    }

    pub(in crate::app) fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub(in crate::app) fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// New timings apply from the next scheduled step.
    pub(in crate::app) fn set_config(&mut self, config: AnimationConfig) {
        self.config = config;
    }

    pub(in crate::app) fn total_steps(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.order.len())
    }

    pub(in crate::app) fn current_step(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.current)
    }

    /// Step most recently announced through `StepChanged`, with its link.
    pub(in crate::app) fn announced_step(&self) -> Option<(usize, usize)> {
        let run = self.run.as_ref()?;
        let step = run.announced?;
        run.order.get(step).map(|&link| (step, link))
    }

    pub(in crate::app) fn start(&mut self, links: &[Link], now: f64, events: &mut Vec<DiagramEvent>) {
        match self.state {
            PlaybackState::Playing => return,
            PlaybackState::Paused => {
                if self.run.as_ref().is_some_and(FlowRun::is_finished) {
                    self.stop(events);
                } else {
                    self.resume(now, events);
                    return;
                }
            }
            PlaybackState::Idle => {}
        }

        let order = flow_order(links);
        debug!(steps = order.len(), "flow animation started");
        self.run = Some(FlowRun {
            order,
            current: 0,
            completed: BTreeSet::new(),
            phase: StepPhase::Waiting,
            announced: None,
        });
        self.state = PlaybackState::Playing;
        events.push(DiagramEvent::AnimationState(PlaybackStatus::Playing));
        self.pending = Some(self.timers.schedule_after(
            now,
            self.config.lead_in(),
            SequenceTask::BeginStep,
        ));
    }

    /// Play/pause button semantics.
    pub(in crate::app) fn toggle(&mut self, links: &[Link], now: f64, events: &mut Vec<DiagramEvent>) {
        if self.is_playing() {
            self.pause(now, events);
        } else {
            self.start(links, now, events);
        }
    }

    pub(in crate::app) fn pause(&mut self, now: f64, events: &mut Vec<DiagramEvent>) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.cancel_pending();
        let draw_progress = self.draw_progress(now);
        if let Some(run) = self.run.as_mut()
            && let StepPhase::Drawing { .. } = run.phase
        {
            run.phase = StepPhase::Held {
                progress: draw_progress,
            };
        }

        self.state = PlaybackState::Paused;
        debug!(step = ?self.current_step(), "flow animation paused");
        events.push(DiagramEvent::AnimationState(PlaybackStatus::Paused));
    }

    /// Continues from the current step, replaying its draw.
    pub(in crate::app) fn resume(&mut self, now: f64, events: &mut Vec<DiagramEvent>) {
        if self.state != PlaybackState::Paused {
            return;
        }

        self.state = PlaybackState::Playing;
        debug!(step = ?self.current_step(), "flow animation resumed");
        events.push(DiagramEvent::AnimationState(PlaybackStatus::Playing));
        self.begin_step(now, events);
    }

    /// Safe from any state; always reports exactly one `Stopped`.
    pub(in crate::app) fn stop(&mut self, events: &mut Vec<DiagramEvent>) {
        self.timers.cancel_all();
        self.pending = None;
        self.run = None;
        self.state = PlaybackState::Idle;
        debug!("flow animation stopped");
        events.push(DiagramEvent::AnimationState(PlaybackStatus::Stopped));
    }

    pub(in crate::app) fn next_step(&mut self, links: &[Link], now: f64, events: &mut Vec<DiagramEvent>) {
        if self.state == PlaybackState::Idle {
            self.start(links, now, events);
        }
        self.pause(now, events);

        let Some(run) = self.run.as_mut() else {
            return;
        };
        if !run.is_finished() {
            run.completed.insert(run.current);
            run.current += 1;
        }
        if run.is_finished() {
            self.stop(events);
            return;
        }

        run.phase = StepPhase::Static;
        self.announce(events);
    }

    pub(in crate::app) fn prev_step(&mut self, now: f64, events: &mut Vec<DiagramEvent>) {
        if self.run.as_ref().is_none_or(|run| run.current == 0) {
            return;
        }
        self.pause(now, events);

        let Some(run) = self.run.as_mut() else {
            return;
        };
        run.current -= 1;
        run.completed.remove(&run.current);
        run.phase = StepPhase::Static;
        self.announce(events);
    }

    /// Fires every timer due at `now`, including chains of timers that became
    /// due while catching up.
    pub(in crate::app) fn tick(&mut self, now: f64, events: &mut Vec<DiagramEvent>) {
        while let Some((due_at, task)) = self.timers.pop_due(now) {
            self.pending = None;
            match task {
                SequenceTask::BeginStep => self.begin_step(due_at, events),
                SequenceTask::FinishDraw => self.finish_draw(due_at),
            }
        }
    }

    pub(in crate::app) fn next_wakeup(&self) -> Option<f64> {
        self.timers.next_due()
    }

    pub(in crate::app) fn is_drawing(&self) -> bool {
        self.is_playing()
            && self
                .run
                .as_ref()
                .is_some_and(|run| matches!(run.phase, StepPhase::Drawing { .. }))
    }

    /// Per-link appearance, derived only from the current step, the completed
    /// set and the step phase.
    pub(in crate::app) fn link_phases(&self, link_count: usize, now: f64) -> Vec<LinkPhase> {
        let Some(run) = self.run.as_ref() else {
            return vec![LinkPhase::Default; link_count];
        };

        let mut phases = vec![LinkPhase::Dimmed; link_count];
        for &step in &run.completed {
            if let Some(&link) = run.order.get(step)
                && let Some(phase) = phases.get_mut(link)
            {
                *phase = LinkPhase::Completed;
            }
        }

        let reveal = match run.phase {
            StepPhase::Waiting => None,
            StepPhase::Drawing { .. } => Some(ease_quad_out(self.draw_progress(now))),
            StepPhase::Held { progress } => Some(ease_quad_out(progress)),
            StepPhase::Static => Some(1.0),
        };
        if let Some(reveal) = reveal
            && let Some(&link) = run.order.get(run.current)
            && let Some(phase) = phases.get_mut(link)
        {
            *phase = LinkPhase::Active { reveal };
        }

        phases
    }

    fn draw_progress(&self, now: f64) -> f32 {
        let Some(StepPhase::Drawing { started_at }) = self.run.as_ref().map(|run| run.phase) else {
            return 0.0;
        };
        let duration = self.config.draw_duration().as_secs_f64();
        if duration <= 0.0 {
            return 1.0;
        }
        ((now - started_at) / duration).clamp(0.0, 1.0) as f32
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
    }

    fn announce(&mut self, events: &mut Vec<DiagramEvent>) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let Some(&link) = run.order.get(run.current) else {
            return;
        };
        run.announced = Some(run.current);
        events.push(DiagramEvent::StepChanged {
            step: run.current,
            link,
        });
    }

    fn begin_step(&mut self, at: f64, events: &mut Vec<DiagramEvent>) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if run.is_finished() {
            self.stop(events);
            return;
        }

        run.phase = StepPhase::Drawing { started_at: at };
        debug!(step = run.current, "flow step drawing");
        self.announce(events);
        self.pending = Some(self.timers.schedule_after(
            at,
            self.config.draw_duration(),
            SequenceTask::FinishDraw,
        ));
    }

    fn finish_draw(&mut self, at: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };

        run.completed.insert(run.current);
        run.current += 1;
        run.phase = StepPhase::Waiting;
        self.pending = Some(self.timers.schedule_after(
            at,
            self.config.step_duration(),
            SequenceTask::BeginStep,
        ));
    }
}
