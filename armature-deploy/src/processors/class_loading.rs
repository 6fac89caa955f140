//! Stage 1: resolve each component's class in the type registry.

use crate::processors::DeploymentUnitProcessor;
use crate::unit::DeploymentPhaseContext;
use armature_core::{ComponentState, Result, TypeResolver};

/// Resolves the declared bean class name and attaches the resolved type.
///
/// An unresolvable name is a configuration error and fails the deployment;
/// there is no retry and never a silent null attachment.
#[derive(Debug, Default)]
pub struct ComponentClassLoadingProcessor;

impl DeploymentUnitProcessor for ComponentClassLoadingProcessor {
    fn name(&self) -> &'static str {
        "component-class-loading"
    }

    fn deploy(&self, ctx: &mut DeploymentPhaseContext<'_>) -> Result<()> {
        let registry = ctx.type_registry()?;
        for component in ctx.components_mut()?.iter_mut() {
            let ty = registry.resolve(component.class_name())?;
            tracing::debug!(
                "Resolved class '{}' for component '{}'",
                ty.name(),
                component.component_name()
            );
            component.attach_type(ty)?;
            component.advance(ComponentState::Discovered, ComponentState::ClassLoaded)?;
        }
        Ok(())
    }
}
