/// A clicked diagram element, by index into the document's node or link list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) enum Selection {
    Node(usize),
    Link(usize),
}

impl Selection {
    pub(in crate::app) fn kind(self) -> &'static str {
        match self {
            Self::Node(_) => "node",
            Self::Link(_) => "link",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

/// Notifications from the canvas and the sequencer, drained once per frame by
/// the view model and routed to the panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum DiagramEvent {
    ItemClicked(Selection),
    AnimationState(PlaybackStatus),
    StepChanged { step: usize, link: usize },
}
