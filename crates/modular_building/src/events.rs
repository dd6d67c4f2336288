//! Event types and sinks for observing assembly edits and rebuilds.
//!
//! This module defines [`AssemblyEvent`] and a set of sinks to emit, collect, or
//! forward events while editing an [`crate::assembly::Assembly`] through
//! [`crate::assembly::Assembly::add_part_with_events`],
//! [`crate::assembly::Assembly::remove_part_with_events`] and
//! [`crate::assembly::Assembly::rebuild_with_events`]. A rendering layer can mirror
//! the parts list by listening to `PartAdded` / `PartRemoved`.
use crate::assembly::{AmbiguousAdjacency, Part, PartIndex, RebuildSummary};

/// Describes events emitted by assembly operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum AssemblyEvent {
    /// A part was appended to the parts list.
    PartAdded {
        /// Index of the new part.
        index: PartIndex,
        /// The new part.
        part: Part,
    },

    /// A part was removed by swapping the last part into its index.
    PartRemoved {
        /// Index that was removed (and now holds the relocated part, if any).
        index: PartIndex,
        /// The removed part.
        part: Part,
        /// Previous index of the part moved into `index`, if one was moved.
        relocated_from: Option<PartIndex>,
    },

    /// Emitted when a rebuild starts.
    RebuildStarted {
        /// Number of parts being rebuilt.
        part_count: usize,
    },

    /// Emitted after a successful rebuild.
    RebuildFinished {
        /// Counts and anomalies of the rebuild.
        summary: RebuildSummary,
    },

    /// Several sockets matched one slot; the adjacency table holds `chosen`.
    AmbiguousAdjacency(AmbiguousAdjacency),

    /// Non-fatal warning generated during an operation.
    Warning {
        /// Context string (e.g. operation name, part index).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

impl AssemblyEvent {
    pub fn kind(&self) -> AssemblyEventKind {
        match self {
            AssemblyEvent::PartAdded { .. } => AssemblyEventKind::PartAdded,
            AssemblyEvent::PartRemoved { .. } => AssemblyEventKind::PartRemoved,
            AssemblyEvent::RebuildStarted { .. } => AssemblyEventKind::RebuildStarted,
            AssemblyEvent::RebuildFinished { .. } => AssemblyEventKind::RebuildFinished,
            AssemblyEvent::AmbiguousAdjacency(_) => AssemblyEventKind::AmbiguousAdjacency,
            AssemblyEvent::Warning { .. } => AssemblyEventKind::Warning,
        }
    }
}

/// Discriminant of [`AssemblyEvent`] used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssemblyEventKind {
    PartAdded,
    PartRemoved,
    RebuildStarted,
    RebuildFinished,
    AmbiguousAdjacency,
    Warning,
}

/// Receives [`AssemblyEvent`]s from the `_with_events` operations.
pub trait EventSink {
    fn send(&mut self, event: AssemblyEvent);

    /// Returns `false` to let emitters skip building events of this kind.
    #[inline]
    fn wants(&self, _kind: AssemblyEventKind) -> bool {
        true
    }
}

/// Discards everything; the plain operations pass this.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: AssemblyEvent) {}

    #[inline]
    fn wants(&self, _kind: AssemblyEventKind) -> bool {
        false
    }
}

fn kind_allowed(only: &Option<Vec<AssemblyEventKind>>, kind: AssemblyEventKind) -> bool {
    only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
}

/// Calls a closure per event, optionally restricted to some kinds.
pub struct FnSink<F>
where
    F: FnMut(AssemblyEvent),
{
    f: F,
    only: Option<Vec<AssemblyEventKind>>,
}

impl<F> FnSink<F>
where
    F: FnMut(AssemblyEvent),
{
    pub fn new(f: F) -> Self {
        Self { f, only: None }
    }

    /// Restricts the closure to events of the given kinds.
    pub fn only(mut self, kinds: impl IntoIterator<Item = AssemblyEventKind>) -> Self {
        self.only = Some(kinds.into_iter().collect());
        self
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(AssemblyEvent),
{
    #[inline]
    fn send(&mut self, event: AssemblyEvent) {
        if self.wants(event.kind()) {
            (self.f)(event);
        }
    }

    fn wants(&self, kind: AssemblyEventKind) -> bool {
        kind_allowed(&self.only, kind)
    }
}

/// Collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<AssemblyEvent>,
    only: Option<Vec<AssemblyEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the given kinds.
    pub fn filtered(kinds: impl IntoIterator<Item = AssemblyEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<AssemblyEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[AssemblyEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: AssemblyEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: AssemblyEventKind) -> bool {
        kind_allowed(&self.only, kind)
    }
}
