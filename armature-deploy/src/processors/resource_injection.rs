//! Stage 3: turn resource-injection configurations into lookups, bound
//! injections, and binder services.

use crate::processors::DeploymentUnitProcessor;
use crate::unit::DeploymentPhaseContext;
use armature_core::{
    ActivationMode, ComponentState, InjectionFactory, LookupValue, MemberInjectionFactory,
    Result, ServiceDependency, ServiceKind,
};
use std::sync::Arc;

/// For every resource-injection configuration on a component:
///
/// - build a deferred lookup value under the component's env context;
/// - ask the injection factory for a concrete injection; `None` means the
///   target member could not be resolved, which skips the injection but
///   still registers the naming dependency;
/// - when an injection was produced, install a binder service named
///   `<env-context>.<bind-name>` and queue a typed dependency on it,
///   carrying the injection point;
/// - always queue one dependency on the env context per configuration, so
///   the backing context is up before the component starts, plus the
///   configuration's own upstream dependencies.
pub struct ResourceInjectionInstallProcessor {
    injection_factory: Arc<dyn InjectionFactory>,
}

impl ResourceInjectionInstallProcessor {
    pub fn new(injection_factory: Arc<dyn InjectionFactory>) -> Self {
        Self { injection_factory }
    }
}

impl Default for ResourceInjectionInstallProcessor {
    fn default() -> Self {
        Self::new(Arc::new(MemberInjectionFactory))
    }
}

impl DeploymentUnitProcessor for ResourceInjectionInstallProcessor {
    fn name(&self) -> &'static str {
        "resource-injection-install"
    }

    fn deploy(&self, ctx: &mut DeploymentPhaseContext<'_>) -> Result<()> {
        let target = ctx.service_target();
        for component in ctx.components_mut()?.iter_mut() {
            let ty = Arc::clone(component.component_type()?);
            let env_context = component.service_names().env_context;

            let configurations = component.resource_injections().to_vec();
            for configuration in &configurations {
                let lookup = LookupValue {
                    context: env_context.clone(),
                    local_name: configuration.local_name.clone(),
                };

                if let Some(bound) =
                    self.injection_factory.create(&ty, configuration, lookup.clone())
                {
                    let binder_name = env_context.append(&configuration.bind_name);
                    target
                        .service(binder_name.clone(), ServiceKind::Binder { lookup })
                        .mode(ActivationMode::OnDemand)
                        .depends_on(env_context.clone())
                        .install()?;
                    // typed edge: the runtime injects the bound value into
                    // the member when it wires the component service
                    component.add_dependency(ServiceDependency::injected(
                        binder_name,
                        bound.target_member.clone(),
                    ));
                    component.add_bound_injection(bound);
                    tracing::debug!(
                        "Component '{}': bound resource '{}'",
                        component.component_name(),
                        configuration.bind_name
                    );
                }

                // the env context must exist before the component starts,
                // whether or not the injection itself was produced
                component.add_dependency(ServiceDependency::on(env_context.clone()));
                for dependency in &configuration.dependencies {
                    component.add_dependency(dependency.clone());
                }
            }

            component.advance(
                ComponentState::LifecycleResolved,
                ComponentState::ResourcesResolved,
            )?;
        }
        Ok(())
    }
}
