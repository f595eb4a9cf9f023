//! Named render containers
//!
//! A `Canvas` plays the part of the document an engine draws into: views create
//! containers by id, engines mount SVG markup into them by selector (`#id`),
//! and exports read the markup back. Handles are cheap clones of one shared,
//! single-threaded store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    containers: Rc<RefCell<HashMap<String, Option<String>>>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container. An existing container with the same id is
    /// emptied.
    pub fn create_container(&self, id: &str) {
        self.containers.borrow_mut().insert(id.to_string(), None);
    }

    /// Remove a container and whatever it holds
    pub fn remove_container(&self, id: &str) {
        self.containers.borrow_mut().remove(id);
    }

    /// Whether a selector (`#id` or bare `id`) names an existing container
    pub fn exists(&self, selector: &str) -> bool {
        self.containers.borrow().contains_key(container_id(selector))
    }

    /// Replace the container's content. Returns false when the container is gone.
    pub fn mount(&self, selector: &str, svg: String) -> bool {
        match self.containers.borrow_mut().get_mut(container_id(selector)) {
            Some(slot) => {
                *slot = Some(svg);
                true
            }
            None => false,
        }
    }

    /// Empty the container, keeping it
    pub fn clear(&self, selector: &str) {
        if let Some(slot) = self.containers.borrow_mut().get_mut(container_id(selector)) {
            *slot = None;
        }
    }

    /// The SVG element currently mounted in the container, if any
    pub fn svg(&self, selector: &str) -> Option<String> {
        self.containers
            .borrow()
            .get(container_id(selector))
            .and_then(|content| content.clone())
            .filter(|content| content.contains("<svg"))
    }

    pub fn container_count(&self) -> usize {
        self.containers.borrow().len()
    }
}

/// Strip the `#` of an id selector
pub fn container_id(selector: &str) -> &str {
    selector.strip_prefix('#').unwrap_or(selector)
}

/// Selector for a container id
pub fn selector(id: &str) -> String {
    format!("#{}", id)
}
