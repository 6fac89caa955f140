//! Stage 5: emit the component's runtime services into the service target.

use crate::factory::{BasicComponentFactory, ComponentFactory};
use crate::processors::DeploymentUnitProcessor;
use crate::unit::DeploymentPhaseContext;
use armature_core::{
    ActivationMode, ComponentState, Result, ServiceKind, ServiceName, ServiceTarget,
};
use std::sync::Arc;

/// The terminal stage: constructs each component through the component
/// factory and installs its service graph.
///
/// Per component it installs the env naming context, an on-demand reference
/// binder publishing the component reference, and the eagerly activated
/// component service wired to the reference binder, the three scope naming
/// contexts, every queued resource dependency, and a link binder per
/// resource that requires a bind operation. Duplicate names or unmet
/// dependencies are the service runtime's errors to report; the pipeline
/// only constructs the requests.
pub struct ComponentInstallProcessor {
    component_factory: Arc<dyn ComponentFactory>,
}

impl ComponentInstallProcessor {
    pub fn new(component_factory: Arc<dyn ComponentFactory>) -> Self {
        Self { component_factory }
    }

    /// Installs a naming context service once per target.
    ///
    /// Application and module contexts are shared by every component in the
    /// unit, so later components find them already installed.
    fn ensure_context(
        target: &ServiceTarget,
        name: &ServiceName,
        parent: Option<&ServiceName>,
    ) -> Result<()> {
        if target.contains(name) {
            return Ok(());
        }
        let mut builder = target.service(name.clone(), ServiceKind::NamingContext);
        if let Some(parent) = parent {
            builder = builder.depends_on(parent.clone());
        }
        builder.install()
    }
}

impl Default for ComponentInstallProcessor {
    fn default() -> Self {
        Self::new(Arc::new(BasicComponentFactory))
    }
}

impl DeploymentUnitProcessor for ComponentInstallProcessor {
    fn name(&self) -> &'static str {
        "component-install"
    }

    fn deploy(&self, ctx: &mut DeploymentPhaseContext<'_>) -> Result<()> {
        let target = ctx.service_target();
        for component in ctx.components_mut()?.iter_mut() {
            let constructed = self.component_factory.create(component)?;
            let names = &constructed.service_names;

            // scope naming contexts, shared across the unit
            Self::ensure_context(target, &names.application_context, None)?;
            Self::ensure_context(target, &names.module_context, Some(&names.application_context))?;
            Self::ensure_context(target, &names.module_env_context, Some(&names.module_context))?;
            Self::ensure_context(target, &names.component_context, Some(&names.module_context))?;

            // the component's env context, under its own sub-name, backed by
            // the module-wide environment context
            target
                .service(names.env_context.clone(), ServiceKind::NamingContext)
                .depends_on(names.module_env_context.clone())
                .install()?;

            // reference binder: publishes the component reference, started
            // only when something demands it
            target
                .service(
                    names.bind_context.clone(),
                    ServiceKind::ReferenceBinder {
                        target: names.component_service.clone(),
                    },
                )
                .mode(ActivationMode::OnDemand)
                .install()?;

            // the component service itself, eagerly activated; the reference
            // binder dependency makes publication happen before activation
            let mut builder = target
                .service(
                    names.component_service.clone(),
                    ServiceKind::Component {
                        component_name: constructed.component_name.clone(),
                    },
                )
                .mode(ActivationMode::Active)
                .depends_on(names.bind_context.clone())
                .depends_on(names.component_context.clone())
                .depends_on(names.module_context.clone())
                .depends_on(names.application_context.clone());

            for dependency in component.dependencies() {
                builder = builder.add_dependency(dependency.clone());
            }

            // link binders alias module-scoped bind names to their resolved
            // targets; ordering-only edges on the component
            for configuration in component.resource_injections() {
                if !configuration.requires_bind {
                    continue;
                }
                let link_name = names.module_env_context.append(&configuration.bind_name);
                target
                    .service(
                        link_name.clone(),
                        ServiceKind::LinkBinder {
                            target: configuration.bind_target_name.clone(),
                        },
                    )
                    .mode(ActivationMode::OnDemand)
                    .depends_on(names.module_env_context.clone())
                    .install()?;
                builder = builder.depends_on(link_name);
            }

            builder.install()?;
            component.advance(ComponentState::InterceptorsBuilt, ComponentState::Installed)?;
            tracing::info!(
                "Installed component '{}' as '{}'",
                component.component_name(),
                names.component_service
            );
        }
        Ok(())
    }
}
