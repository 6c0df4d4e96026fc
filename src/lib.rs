pub mod behaviors;
pub mod common;
pub mod config;
pub mod control;
pub mod lifecycle;
pub mod perception;
pub mod sim;
pub mod telemetry;

use crate::behaviors::CombatStack;
use crate::lifecycle::LifecycleNode;

/// Core functionality for the Ares robot
pub struct AresCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl AresCore {
    /// Create a new instance of AresCore
    pub fn new() -> Self {
        AresCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Initialize all registered components
    pub fn init(&mut self) -> Result<(), String> {
        for component in &mut self.components {
            component.on_configure()?;
            component.on_activate()?;
        }
        Ok(())
    }

    /// Shutdown all registered components
    pub fn shutdown(&mut self) -> Result<(), String> {
        for component in &mut self.components {
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        Ok(())
    }

    /// Get a reference to the combat stack
    pub fn combat_stack_mut(&mut self) -> Option<&mut CombatStack> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<CombatStack>())
    }
}

impl Default for AresCore {
    fn default() -> Self {
        AresCore::new()
    }
}
