//! Scoped ownership of one render instance per container

use super::{EngineError, RenderInstance};

/// Holds at most one live instance for a container.
///
/// Acquiring a new instance destroys the previous one first; dropping the slot
/// destroys whatever is live.
pub struct InstanceSlot {
    container: String,
    live: Option<Box<dyn RenderInstance>>,
}

impl InstanceSlot {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            live: None,
        }
    }

    /// Container id this slot is bound to
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Destroy the live instance, if any
    pub fn release(&mut self) {
        if let Some(mut instance) = self.live.take() {
            instance.destroy();
        }
    }

    /// Destroy the previous instance, then construct and keep a new one.
    ///
    /// If construction fails the slot stays empty.
    pub fn replace<F>(&mut self, create: F) -> Result<&mut dyn RenderInstance, EngineError>
    where
        F: FnOnce() -> Result<Box<dyn RenderInstance>, EngineError>,
    {
        self.release();
        let instance = create()?;
        Ok(self.live.insert(instance).as_mut())
    }

    pub fn get(&self) -> Option<&dyn RenderInstance> {
        self.live.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }
}

impl Drop for InstanceSlot {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for InstanceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceSlot")
            .field("container", &self.container)
            .field("live", &self.live.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::{EngineOptions, EventKind, ImageType, Listener};
    use crate::model::{InfographicData, RenderConfiguration, Stylize, Theme};

    struct Probe {
        id: usize,
        log: Rc<RefCell<Vec<String>>>,
        options: EngineOptions,
        destroyed: bool,
    }

    impl RenderInstance for Probe {
        fn on(&mut self, _kind: EventKind, _listener: Listener) {}
        fn render(&mut self) -> Result<(), EngineError> {
            Ok(())
        }
        fn destroy(&mut self) {
            if !self.destroyed {
                self.destroyed = true;
                self.log.borrow_mut().push(format!("destroy {}", self.id));
            }
        }
        fn is_destroyed(&self) -> bool {
            self.destroyed
        }
        fn to_data_url(&self, _image: ImageType) -> Result<String, EngineError> {
            Err(EngineError::NotRendered)
        }
        fn options(&self) -> &EngineOptions {
            &self.options
        }
    }

    fn probe(id: usize, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn RenderInstance> {
        log.borrow_mut().push(format!("create {}", id));
        let config = RenderConfiguration::new("list-a", InfographicData::default());
        Box::new(Probe {
            id,
            log: Rc::clone(log),
            options: EngineOptions::new("#c", &config, Theme::Light, Stylize::None),
            destroyed: false,
        })
    }

    #[test]
    fn test_replace_destroys_before_create() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut slot = InstanceSlot::new("c");
        slot.replace(|| Ok(probe(1, &log))).unwrap();
        slot.replace(|| Ok(probe(2, &log))).unwrap();
        assert_eq!(*log.borrow(), vec!["create 1", "destroy 1", "create 2"]);
        assert!(slot.is_live());
    }

    #[test]
    fn test_failed_create_leaves_slot_empty() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut slot = InstanceSlot::new("c");
        slot.replace(|| Ok(probe(1, &log))).unwrap();
        let result = slot.replace(|| Err(EngineError::Destroyed));
        assert!(result.is_err());
        assert!(!slot.is_live());
        assert_eq!(*log.borrow(), vec!["create 1", "destroy 1"]);
    }

    #[test]
    fn test_drop_destroys_live_instance() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut slot = InstanceSlot::new("c");
            slot.replace(|| Ok(probe(7, &log))).unwrap();
        }
        assert_eq!(log.borrow().last().map(String::as_str), Some("destroy 7"));
    }
}
