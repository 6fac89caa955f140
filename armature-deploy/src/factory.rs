//! Component construction at install time.

use armature_core::{ComponentConfiguration, ComponentServiceNames, Result};

/// A constructed component: its identity plus the computed service names the
/// install stage wires into the service target.
#[derive(Debug, Clone)]
pub struct ConstructedComponent {
    pub component_name: String,
    pub service_names: ComponentServiceNames,
}

/// Constructs the runtime component for a fully configured description.
pub trait ComponentFactory: Send + Sync {
    fn create(&self, configuration: &ComponentConfiguration) -> Result<ConstructedComponent>;
}

/// Default factory: derives the service names from the component's
/// application/module/component coordinates.
#[derive(Debug, Default)]
pub struct BasicComponentFactory;

impl ComponentFactory for BasicComponentFactory {
    fn create(&self, configuration: &ComponentConfiguration) -> Result<ConstructedComponent> {
        // the type must have been resolved by the class-loading stage
        configuration.component_type()?;
        Ok(ConstructedComponent {
            component_name: configuration.component_name().to_string(),
            service_names: configuration.service_names(),
        })
    }
}
