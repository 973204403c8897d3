use std::fmt;

use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// A native rendering surface. Dropping the value does not free it;
/// `destroy` must be called.
pub trait RenderContext: Send {
    fn id(&self) -> ContextId;
    fn destroy(&mut self);
    fn is_destroyed(&self) -> bool;
}

/// Owns a [`RenderContext`] and destroys it when dropped.
pub struct ContextGuard {
    inner: Box<dyn RenderContext>,
}

impl ContextGuard {
    pub fn new(inner: Box<dyn RenderContext>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> ContextId {
        self.inner.id()
    }

    pub fn context_mut(&mut self) -> &mut dyn RenderContext {
        self.inner.as_mut()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if !self.inner.is_destroyed() {
            debug!("destroying rendering context {}", self.inner.id());
            self.inner.destroy();
        }
    }
}

impl fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextGuard").field(&self.inner.id()).finish()
    }
}
