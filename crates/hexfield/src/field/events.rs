//! Event types and sinks for observing field builds.
//!
//! Builders report progress as [`FieldEvent`]s to an [`EventSink`] passed to the
//! `*_with_events` functions of [`crate::field::builder`]. Sinks can discard, collect,
//! forward or fan out events.

/// Describes events emitted while building a field.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// Emitted when a build starts.
    BuildStarted {
        /// Field label.
        label: String,
        /// Grid resolution.
        resolution: u8,
    },

    /// Emitted once the region's cell set is known.
    RegionTiled {
        label: String,
        /// Number of cells in the region.
        cells: usize,
        /// Whether the cell set came from the tiling cache.
        cached: bool,
    },

    /// Emitted after the model was sampled at every centroid.
    RawFieldBuilt { label: String, min: f64, max: f64 },

    /// Emitted when the raw field is flat and the degenerate policy applied.
    DegenerateRange { label: String, value: f64 },

    /// Emitted when the scored field is complete.
    BuildFinished {
        label: String,
        cells: usize,
        mean_score: f64,
    },

    /// Non-fatal warning generated during a build.
    Warning {
        /// Context string (e.g. the field label).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of a [`FieldEvent`], used by [`EventSink::wants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEventKind {
    BuildStarted,
    RegionTiled,
    RawFieldBuilt,
    DegenerateRange,
    BuildFinished,
    Warning,
}

impl FieldEvent {
    pub fn kind(&self) -> FieldEventKind {
        match self {
            FieldEvent::BuildStarted { .. } => FieldEventKind::BuildStarted,
            FieldEvent::RegionTiled { .. } => FieldEventKind::RegionTiled,
            FieldEvent::RawFieldBuilt { .. } => FieldEventKind::RawFieldBuilt,
            FieldEvent::DegenerateRange { .. } => FieldEventKind::DegenerateRange,
            FieldEvent::BuildFinished { .. } => FieldEventKind::BuildFinished,
            FieldEvent::Warning { .. } => FieldEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`FieldEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: FieldEvent);

    /// Whether the sink is interested in events of `kind`. Builders skip constructing
    /// events nobody wants.
    fn wants(&self, _kind: FieldEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = FieldEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: FieldEvent) {}

    #[inline]
    fn wants(&self, _kind: FieldEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(FieldEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(FieldEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(FieldEvent),
{
    #[inline]
    fn send(&mut self, event: FieldEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<FieldEvent>,
    only: Option<Vec<FieldEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events whose kind is listed.
    pub fn only(kinds: impl IntoIterator<Item = FieldEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<FieldEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[FieldEvent] {
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
    fn send(&mut self, event: FieldEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: FieldEventKind) -> bool {
        self.only.as_ref().is_none_or(|k| k.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn sinks(&self) -> &[S] {
        &self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: FieldEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: FieldEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
