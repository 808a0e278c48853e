//! Resource governor for one capture call.
//!
//! Every unit of work (element, pseudo element, text leaf) asks the governor
//! for admission first. The first limit to trip halts admission for the rest
//! of the walk; the partial tree built so far is still returned.

use std::time::{Duration, Instant};

/// Depth is clamped to this no matter what a [`Budget`] asks for. The walk
/// recurses once per level and must fit a 2 MiB thread in debug builds.
pub const HARD_DEPTH_CEILING: usize = 256;

/// Limits for one capture call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_nodes: usize,
    pub max_depth: usize,
    pub max_duration: Duration,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_depth: 128,
            max_duration: Duration::from_secs(30),
        }
    }
}

impl Budget {
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    #[inline]
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(HARD_DEPTH_CEILING)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    Nodes,
    Depth,
    Duration,
}

impl LimitKind {
    pub fn label(self) -> &'static str {
        match self {
            LimitKind::Nodes => "node count",
            LimitKind::Depth => "depth",
            LimitKind::Duration => "duration",
        }
    }
}

/// Admission state. Created per call and dropped with it.
#[derive(Debug)]
pub struct Governor {
    budget: Budget,
    started: Instant,
    visited: usize,
    tripped: Vec<LimitKind>,
}

impl Governor {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            started: Instant::now(),
            visited: 0,
            tripped: Vec::new(),
        }
    }

    /// Admits one unit of work at `depth` (root = 0).
    ///
    /// The unit that brings the count to `max_nodes` is admitted and trips
    /// the node limit, so `visited() == max_nodes` exactly when it trips.
    pub fn admit(&mut self, depth: usize) -> bool {
        if self.is_halted() {
            return false;
        }
        if self.visited >= self.budget.max_nodes {
            self.trip(LimitKind::Nodes);
            return false;
        }
        if depth >= self.budget.effective_max_depth() {
            self.trip(LimitKind::Depth);
            return false;
        }
        if self.started.elapsed() >= self.budget.max_duration {
            self.trip(LimitKind::Duration);
            return false;
        }

        self.visited += 1;
        if self.visited == self.budget.max_nodes {
            self.trip(LimitKind::Nodes);
        }
        true
    }

    fn trip(&mut self, kind: LimitKind) {
        if self.tripped.contains(&kind) {
            return;
        }
        log::warn!(
            "capture budget exceeded: {} (after {} nodes)",
            kind.label(),
            self.visited
        );
        self.tripped.push(kind);
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        !self.tripped.is_empty()
    }

    #[inline]
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Limits tripped so far, in trip order, each at most once.
    #[inline]
    pub fn tripped(&self) -> &[LimitKind] {
        &self.tripped
    }

    #[inline]
    pub fn budget(&self) -> &Budget {
        &self.budget
    }
}
