use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::render::{RenderedView, ViewMessage};

/// Monotonic counter identifying one rendering of the results area
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of one diagram mount: the generation it was rendered in and the
/// card it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountId {
    pub generation: Generation,
    pub index: usize,
}

impl MountId {
    pub fn new(generation: Generation, index: usize) -> Self {
        Self { generation, index }
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.generation, self.index)
    }
}

/// View-model for the results area.
///
/// Each call to [`ResultsView::begin`] starts a new generation and cancels the
/// token handed out for the previous one, so every task tied to old mounts
/// stops at its next step.
#[derive(Debug)]
pub struct ResultsView {
    generation: Generation,
    root: CancellationToken,
    current: CancellationToken,
    content: RenderedView,
}

impl ResultsView {
    /// Tokens handed out are children of `root`, so shutdown stops them too
    pub fn new(root: CancellationToken) -> Self {
        let current = root.child_token();
        Self {
            generation: Generation::default(),
            root,
            current,
            content: RenderedView::Empty,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn content(&self) -> &RenderedView {
        &self.content
    }

    /// Clear the results area and start a new generation
    pub fn begin(&mut self) -> Generation {
        self.current.cancel();
        self.current = self.root.child_token();
        self.generation = self.generation.next();
        self.content = RenderedView::Message(ViewMessage::Searching);

        tracing::debug!("Results view cleared, generation {}", self.generation);
        self.generation
    }

    /// Replace the content, ignored when `generation` is no longer current
    pub fn show(&mut self, generation: Generation, view: RenderedView) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping view for stale generation {} (current {})",
                generation,
                self.generation
            );
            return false;
        }

        self.content = view;
        true
    }

    pub fn is_current(&self, mount: MountId) -> bool {
        mount.generation == self.generation && !self.current.is_cancelled()
    }

    /// Token cancelled when the current generation ends
    pub fn token(&self) -> CancellationToken {
        self.current.child_token()
    }

    /// Cancellation token for a task bound to `mount`, `None` for stale mounts
    pub fn mount_token(&self, mount: MountId) -> Option<CancellationToken> {
        self.is_current(mount).then(|| self.current.child_token())
    }
}
