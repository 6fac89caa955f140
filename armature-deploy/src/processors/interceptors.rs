//! Stage 4: build the ordered per-method interceptor chains.

use crate::processors::DeploymentUnitProcessor;
use crate::unit::DeploymentPhaseContext;
use armature_core::{
    AnnotationIndex, AnnotationKind, ComponentInterceptorChains, ComponentState, DeployError,
    InstanceStrategy, InterceptorConfiguration, InterceptorFactory, MethodIndex, MethodRef,
    Result, ServiceDependency, TypeRegistry, TypeResolver,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterceptorScope {
    Class,
    Method,
    Component,
}

/// Builds each component's interceptor chains in three fixed passes (class
/// scope, then method scope, then component scope) and seals every chain
/// with the invoking link.
///
/// Interceptor misconfiguration (unknown class, missing or ambiguous
/// designated method, wrong signature) aborts the whole deployment.
#[derive(Debug, Default)]
pub struct InterceptorInstallProcessor;

impl InterceptorInstallProcessor {
    /// Resolves the designated interceptor method for one configuration.
    ///
    /// An explicit method name is looked up directly; otherwise the single
    /// around-invoke annotated method on the interceptor class is used.
    fn designated_method(
        registry: &TypeRegistry,
        configuration: &InterceptorConfiguration,
    ) -> Result<MethodRef> {
        let class_name = configuration.interceptor_class.as_str();
        let ty = registry
            .resolve(class_name)
            .map_err(|_| DeployError::InterceptorClassNotFound(class_name.to_string()))?;

        let method = match &configuration.method_name {
            Some(name) => {
                let hits = registry.named_methods(ty.name(), name)?;
                if hits.is_empty() {
                    return Err(DeployError::InterceptorMethodNotFound {
                        class_name: class_name.to_string(),
                        method_name: name.clone(),
                    });
                }
                // overloads are legal; the designated method is the overload
                // taking the single invocation-context argument
                let mut matching: Vec<MethodRef> =
                    hits.into_iter().filter(|m| m.param_count == 1).collect();
                match matching.len() {
                    0 => {
                        return Err(DeployError::InvalidInterceptorMethod {
                            class_name: class_name.to_string(),
                            method_name: name.clone(),
                        })
                    }
                    1 => matching.remove(0),
                    _ => {
                        return Err(DeployError::AmbiguousInterceptorMethod(
                            class_name.to_string(),
                        ))
                    }
                }
            }
            None => {
                let mut hits =
                    registry.annotated_methods(ty.name(), AnnotationKind::AroundInvoke)?;
                match hits.len() {
                    0 => {
                        return Err(DeployError::InterceptorMethodNotFound {
                            class_name: class_name.to_string(),
                            method_name: "@AroundInvoke".to_string(),
                        })
                    }
                    1 => hits.remove(0),
                    _ => {
                        return Err(DeployError::AmbiguousInterceptorMethod(
                            class_name.to_string(),
                        ))
                    }
                }
            }
        };

        // single invocation-context argument
        if method.param_count != 1 {
            return Err(DeployError::InvalidInterceptorMethod {
                class_name: class_name.to_string(),
                method_name: method.name,
            });
        }
        Ok(method)
    }

    /// The component's method table: every method declared on the class or
    /// an ancestor, most-derived declaration winning on override collisions.
    /// Overloads differ in parameter count and each keep their own entry.
    fn component_methods(registry: &TypeRegistry, class_name: &str) -> Result<Vec<MethodRef>> {
        let mut methods = Vec::new();
        let mut seen = HashSet::new();
        for class in registry.hierarchy(class_name)? {
            for method in registry.declared_methods(class.name())? {
                if seen.insert((method.name.clone(), method.param_count)) {
                    methods.push(method);
                }
            }
        }
        Ok(methods)
    }
}

impl DeploymentUnitProcessor for InterceptorInstallProcessor {
    fn name(&self) -> &'static str {
        "interceptor-install"
    }

    fn deploy(&self, ctx: &mut DeploymentPhaseContext<'_>) -> Result<()> {
        let registry = ctx.type_registry()?;
        for component in ctx.components_mut()?.iter_mut() {
            let class_name = component.component_type()?.name().to_string();
            let methods = Self::component_methods(&registry, &class_name)?;
            let env_context = component.service_names().env_context;

            let mut chains = ComponentInterceptorChains::new(component.component_name());
            for method in &methods {
                chains.register_method(method.clone())?;
            }

            let passes = [
                (InterceptorScope::Class, component.class_interceptors().to_vec()),
                (InterceptorScope::Method, component.method_interceptors().to_vec()),
                (
                    InterceptorScope::Component,
                    component.component_interceptors().to_vec(),
                ),
            ];

            for (scope, configurations) in passes {
                for configuration in &configurations {
                    let method = Self::designated_method(&registry, configuration)?;

                    let strategy = if configuration.interceptor_class == class_name {
                        // self-interception reuses the component's own
                        // instance factory
                        InstanceStrategy::SelfInstance
                    } else if configuration.injections.is_empty() {
                        InstanceStrategy::PlainConstructed
                    } else {
                        InstanceStrategy::InjectingConstructed(configuration.injections.clone())
                    };

                    // each interceptor injection needs the naming context up
                    // before the component starts
                    for _injection in &configuration.injections {
                        component.add_dependency(ServiceDependency::on(env_context.clone()));
                    }

                    let factory = InterceptorFactory {
                        interceptor_class: configuration.interceptor_class.clone(),
                        method,
                        strategy,
                    };

                    let mut matched = 0usize;
                    for target_method in &methods {
                        if scope == InterceptorScope::Class
                            && component.is_class_interceptors_excluded(&target_method.name)
                        {
                            continue;
                        }
                        if configuration.filter.matches(target_method) {
                            chains.append(target_method, factory.clone())?;
                            matched += 1;
                        }
                    }
                    tracing::debug!(
                        "Component '{}': {:?}-scope interceptor '{}' matched {} method(s)",
                        component.component_name(),
                        scope,
                        configuration.interceptor_class,
                        matched
                    );
                }
            }

            chains.seal()?;
            component.attach_interceptor_chains(chains)?;
            component.advance(
                ComponentState::ResourcesResolved,
                ComponentState::InterceptorsBuilt,
            )?;
        }
        Ok(())
    }
}
