use std::cmp::Reverse;

use super::traits::PlatformHandler;

/// Registry of platform handlers.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn PlatformHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler.
    pub fn register(&mut self, handler: Box<dyn PlatformHandler>) {
        self.handlers.push(handler);
        // Sort by priority (highest first)
        self.handlers.sort_by_key(|h| Reverse(h.priority()));
    }

    /// Find the best handler for a URL.
    #[must_use]
    pub fn find_handler(&self, url: &str) -> Option<&dyn PlatformHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(url))
            .map(AsRef::as_ref)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
