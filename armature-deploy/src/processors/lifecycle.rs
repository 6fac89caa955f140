//! Stage 2: discover lifecycle callbacks across the class hierarchy.

use crate::processors::DeploymentUnitProcessor;
use crate::unit::DeploymentPhaseContext;
use armature_core::{
    AnnotationIndex, AnnotationKind, CallbackKind, ComponentState, DeployError,
    LifecycleConfiguration, Result,
};

/// Walks each component's class and ancestor chain, most-derived first, and
/// records post-construct and pre-destroy callbacks per class.
///
/// Per class and classification: zero hits is fine, one no-arg hit is
/// recorded, anything else is fatal. Callbacks accumulate across the
/// hierarchy in discovery order; the invocation order at runtime is the
/// consuming component runtime's contract, not decided here.
#[derive(Debug, Default)]
pub struct LifecycleAnnotationParsingProcessor;

const CLASSIFICATIONS: [(CallbackKind, AnnotationKind); 2] = [
    (CallbackKind::PostConstruct, AnnotationKind::PostConstruct),
    (CallbackKind::PreDestroy, AnnotationKind::PreDestroy),
];

impl DeploymentUnitProcessor for LifecycleAnnotationParsingProcessor {
    fn name(&self) -> &'static str {
        "lifecycle-annotation-parsing"
    }

    fn deploy(&self, ctx: &mut DeploymentPhaseContext<'_>) -> Result<()> {
        let registry = ctx.type_registry()?;
        for component in ctx.components_mut()?.iter_mut() {
            let class_name = component.component_type()?.name().to_string();
            for class in registry.hierarchy(&class_name)? {
                for (kind, annotation) in CLASSIFICATIONS {
                    let mut hits = registry.annotated_methods(class.name(), annotation)?;
                    match hits.len() {
                        0 => continue,
                        1 => {
                            let method = hits.remove(0);
                            if method.param_count != 0 {
                                return Err(DeployError::LifecycleCallbackHasParameters {
                                    class_name: class.name().to_string(),
                                    method_name: method.name,
                                });
                            }
                            tracing::debug!(
                                "Component '{}': {} callback '{}' on '{}'",
                                component.component_name(),
                                kind,
                                method.name,
                                class.name()
                            );
                            component.add_lifecycle(
                                kind,
                                LifecycleConfiguration {
                                    declaring_type: method.declaring_type,
                                    method_name: method.name,
                                },
                            );
                        }
                        _ => {
                            return Err(DeployError::AmbiguousLifecycleCallback {
                                class_name: class.name().to_string(),
                                kind,
                            });
                        }
                    }
                }
            }
            component.advance(ComponentState::ClassLoaded, ComponentState::LifecycleResolved)?;
        }
        Ok(())
    }
}
