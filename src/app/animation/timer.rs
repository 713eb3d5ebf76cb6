use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) struct TimerHandle(u64);

struct TimerEntry<T> {
    handle: TimerHandle,
    due_at: f64,
    task: T,
}

/// Deadline queue driven by the frame clock; nothing fires until `pop_due`
/// is called with a time at or past the deadline.
pub(in crate::app) struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<TimerEntry<T>>,
}

impl<T> TimerQueue<T> {
    pub(in crate::app) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(in crate::app) fn schedule_at(&mut self, due_at: f64, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(TimerEntry {
            handle,
            due_at,
            task,
        });
        handle
    }

    pub(in crate::app) fn schedule_after(&mut self, now: f64, delay: Duration, task: T) -> TimerHandle {
        self.schedule_at(now + delay.as_secs_f64(), task)
    }

    pub(in crate::app) fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    pub(in crate::app) fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Removes and returns the earliest task due at `now`, with its deadline.
    /// Equal deadlines fire in scheduling order.
    pub(in crate::app) fn pop_due(&mut self, now: f64) -> Option<(f64, T)> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_at <= now)
            .min_by(|(_, a), (_, b)| {
                a.due_at
                    .total_cmp(&b.due_at)
                    .then_with(|| a.handle.0.cmp(&b.handle.0))
            })
            .map(|(position, _)| position)?;

        let entry = self.entries.remove(position);
        Some((entry.due_at, entry.task))
    }

    pub(in crate::app) fn next_due(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|entry| entry.due_at)
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule_after(1.0, Duration::from_millis(500), "step");

        assert_eq!(timers.pop_due(1.49), None);
        assert_eq!(timers.next_due(), Some(1.5));
        assert_eq!(timers.pop_due(1.5), Some((1.5, "step")));
        assert_eq!(timers.next_due(), None);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule_at(2.0, "draw");
        let kept = timers.schedule_at(3.0, "next");

        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert_eq!(timers.pop_due(10.0), Some((3.0, "next")));
        assert!(!timers.cancel(kept));
        assert_eq!(timers.pop_due(10.0), None);
    }

    #[test]
    fn due_tasks_fire_in_deadline_then_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule_at(5.0, "late");
        timers.schedule_at(1.0, "first");
        timers.schedule_at(1.0, "second");

        assert_eq!(timers.pop_due(6.0).map(|(_, task)| task), Some("first"));
        assert_eq!(timers.pop_due(6.0).map(|(_, task)| task), Some("second"));
        assert_eq!(timers.pop_due(6.0).map(|(_, task)| task), Some("late"));
    }

    #[test]
    fn cancel_all_clears_every_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule_at(1.0, 1);
        timers.schedule_at(2.0, 2);
        timers.cancel_all();

        assert_eq!(timers.pop_due(10.0), None);
        assert_eq!(timers.next_due(), None);
    }
}
