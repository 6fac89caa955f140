//! The per-component configuration accumulated across the pipeline.
//!
//! One [`ComponentConfiguration`] exists per declared component in a
//! deployment unit. It is created during discovery, mutated additively by
//! each stage, and consumed by the install stage. Derived attachments (the
//! resolved type, the sealed interceptor chains) are monotonic: set once,
//! read-only afterwards, enforced by the set-once setters.

use crate::error::{DeployError, Result};
use crate::injection::{BoundInjection, ResourceInjectionConfiguration};
use crate::interceptor::{ComponentInterceptorChains, InterceptorConfiguration};
use crate::name::{ComponentServiceNames, ContextNames};
use crate::service::ServiceDependency;
use crate::types::ComponentType;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Lifecycle callback classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    PostConstruct,
    PreDestroy,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackKind::PostConstruct => write!(f, "post-construct"),
            CallbackKind::PreDestroy => write!(f, "pre-destroy"),
        }
    }
}

/// A recorded lifecycle callback method.
///
/// Accumulated most-derived-class-first during discovery; invocation order
/// is the consuming runtime's contract, not this record's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfiguration {
    pub declaring_type: String,
    pub method_name: String,
}

/// Pipeline position of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComponentState {
    Discovered,
    ClassLoaded,
    LifecycleResolved,
    ResourcesResolved,
    InterceptorsBuilt,
    Installed,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentState::Discovered => "DISCOVERED",
            ComponentState::ClassLoaded => "CLASS_LOADED",
            ComponentState::LifecycleResolved => "LIFECYCLE_RESOLVED",
            ComponentState::ResourcesResolved => "RESOURCES_RESOLVED",
            ComponentState::InterceptorsBuilt => "INTERCEPTORS_BUILT",
            ComponentState::Installed => "INSTALLED",
        };
        write!(f, "{}", label)
    }
}

/// Accumulating configuration for one deployable component.
pub struct ComponentConfiguration {
    component_name: String,
    class_name: String,
    context_names: ContextNames,

    component_type: Option<Arc<ComponentType>>,

    post_construct: Vec<LifecycleConfiguration>,
    pre_destroy: Vec<LifecycleConfiguration>,

    class_interceptors: Vec<InterceptorConfiguration>,
    class_interceptor_names: HashSet<String>,
    method_interceptors: Vec<InterceptorConfiguration>,
    component_interceptors: Vec<InterceptorConfiguration>,
    excluded_class_interceptor_methods: HashSet<String>,

    resource_injections: Vec<ResourceInjectionConfiguration>,
    bound_injections: Vec<BoundInjection>,

    dependencies: Vec<ServiceDependency>,

    interceptor_chains: Option<ComponentInterceptorChains>,

    state: ComponentState,
}

impl ComponentConfiguration {
    pub fn new(
        component_name: impl Into<String>,
        class_name: impl Into<String>,
        application_name: impl Into<String>,
        module_name: impl Into<String>,
    ) -> Self {
        let component_name = component_name.into();
        let context_names = ContextNames::new(application_name, module_name, &component_name);
        Self {
            component_name,
            class_name: class_name.into(),
            context_names,
            component_type: None,
            post_construct: Vec::new(),
            pre_destroy: Vec::new(),
            class_interceptors: Vec::new(),
            class_interceptor_names: HashSet::new(),
            method_interceptors: Vec::new(),
            component_interceptors: Vec::new(),
            excluded_class_interceptor_methods: HashSet::new(),
            resource_injections: Vec::new(),
            bound_injections: Vec::new(),
            dependencies: Vec::new(),
            interceptor_chains: None,
            state: ComponentState::Discovered,
        }
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn context_names(&self) -> &ContextNames {
        &self.context_names
    }

    /// The canonical service names for this component.
    pub fn service_names(&self) -> ComponentServiceNames {
        self.context_names.service_names()
    }

    // -- resolved type (monotonic) -------------------------------------

    pub fn attach_type(&mut self, ty: Arc<ComponentType>) -> Result<()> {
        if self.component_type.is_some() {
            return Err(DeployError::AttachmentAlreadySet("component type"));
        }
        self.component_type = Some(ty);
        Ok(())
    }

    pub fn component_type(&self) -> Result<&Arc<ComponentType>> {
        self.component_type
            .as_ref()
            .ok_or(DeployError::AttachmentMissing("component type"))
    }

    // -- lifecycle callbacks -------------------------------------------

    /// Appends a callback; never replaces earlier hits from more-derived
    /// classes.
    pub fn add_lifecycle(&mut self, kind: CallbackKind, configuration: LifecycleConfiguration) {
        match kind {
            CallbackKind::PostConstruct => self.post_construct.push(configuration),
            CallbackKind::PreDestroy => self.pre_destroy.push(configuration),
        }
    }

    pub fn post_construct(&self) -> &[LifecycleConfiguration] {
        &self.post_construct
    }

    pub fn pre_destroy(&self) -> &[LifecycleConfiguration] {
        &self.pre_destroy
    }

    // -- interceptor configurations ------------------------------------

    /// Adds a class-level interceptor. Returns `false` (and keeps the
    /// original) when the class was already registered at this scope.
    pub fn add_class_interceptor(&mut self, configuration: InterceptorConfiguration) -> bool {
        if !self
            .class_interceptor_names
            .insert(configuration.interceptor_class.clone())
        {
            return false;
        }
        self.class_interceptors.push(configuration);
        true
    }

    pub fn add_method_interceptor(&mut self, configuration: InterceptorConfiguration) {
        self.method_interceptors.push(configuration);
    }

    pub fn add_component_interceptor(&mut self, configuration: InterceptorConfiguration) {
        self.component_interceptors.push(configuration);
    }

    pub fn class_interceptors(&self) -> &[InterceptorConfiguration] {
        &self.class_interceptors
    }

    pub fn method_interceptors(&self) -> &[InterceptorConfiguration] {
        &self.method_interceptors
    }

    pub fn component_interceptors(&self) -> &[InterceptorConfiguration] {
        &self.component_interceptors
    }

    /// Marks a method as opted out of class-level interceptors.
    pub fn exclude_class_interceptors(&mut self, method_name: impl Into<String>) {
        self.excluded_class_interceptor_methods
            .insert(method_name.into());
    }

    pub fn is_class_interceptors_excluded(&self, method_name: &str) -> bool {
        self.excluded_class_interceptor_methods.contains(method_name)
    }

    // -- resource injections -------------------------------------------

    pub fn add_resource_injection(&mut self, configuration: ResourceInjectionConfiguration) {
        self.resource_injections.push(configuration);
    }

    pub fn resource_injections(&self) -> &[ResourceInjectionConfiguration] {
        &self.resource_injections
    }

    pub fn add_bound_injection(&mut self, injection: BoundInjection) {
        self.bound_injections.push(injection);
    }

    pub fn bound_injections(&self) -> &[BoundInjection] {
        &self.bound_injections
    }

    // -- accumulated service dependencies ------------------------------

    pub fn add_dependency(&mut self, dependency: ServiceDependency) {
        self.dependencies.push(dependency);
    }

    pub fn dependencies(&self) -> &[ServiceDependency] {
        &self.dependencies
    }

    // -- interceptor chains (monotonic) --------------------------------

    pub fn attach_interceptor_chains(
        &mut self,
        chains: ComponentInterceptorChains,
    ) -> Result<()> {
        if self.interceptor_chains.is_some() {
            return Err(DeployError::AttachmentAlreadySet("interceptor chains"));
        }
        self.interceptor_chains = Some(chains);
        Ok(())
    }

    pub fn interceptor_chains(&self) -> Result<&ComponentInterceptorChains> {
        self.interceptor_chains
            .as_ref()
            .ok_or(DeployError::AttachmentMissing("interceptor chains"))
    }

    // -- state machine -------------------------------------------------

    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// Moves the component one stage forward, verifying the origin state.
    pub fn advance(&mut self, from: ComponentState, to: ComponentState) -> Result<()> {
        if self.state != from {
            return Err(DeployError::InvalidComponentState {
                component: self.component_name.clone(),
                expected: from,
                actual: self.state,
            });
        }
        tracing::trace!(
            "Component '{}': {} -> {}",
            self.component_name,
            from,
            to
        );
        self.state = to;
        Ok(())
    }
}

impl fmt::Debug for ComponentConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfiguration")
            .field("component_name", &self.component_name)
            .field("class_name", &self.class_name)
            .field("state", &self.state)
            .field("post_construct", &self.post_construct.len())
            .field("pre_destroy", &self.pre_destroy.len())
            .field("resource_injections", &self.resource_injections.len())
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MethodFilter;

    fn configuration() -> ComponentConfiguration {
        ComponentConfiguration::new("OrderBean", "com.acme.Foo", "shop", "orders")
    }

    #[test]
    fn test_attach_type_is_set_once() {
        let mut config = configuration();
        let ty = Arc::new(ComponentType::builder("com.acme.Foo").build());
        assert!(matches!(
            config.component_type(),
            Err(DeployError::AttachmentMissing(_))
        ));

        config.attach_type(Arc::clone(&ty)).unwrap();
        assert_eq!(config.component_type().unwrap().name(), "com.acme.Foo");

        let err = config.attach_type(ty).unwrap_err();
        assert!(matches!(err, DeployError::AttachmentAlreadySet(_)));
    }

    #[test]
    fn test_class_interceptor_dedup() {
        let mut config = configuration();
        let first =
            InterceptorConfiguration::new("com.acme.Audit", MethodFilter::All);
        let duplicate =
            InterceptorConfiguration::new("com.acme.Audit", MethodFilter::Named("save".into()));

        assert!(config.add_class_interceptor(first));
        assert!(!config.add_class_interceptor(duplicate));
        assert_eq!(config.class_interceptors().len(), 1);
        assert!(matches!(
            config.class_interceptors()[0].filter,
            MethodFilter::All
        ));
    }

    #[test]
    fn test_state_machine_rejects_skips() {
        let mut config = configuration();
        assert_eq!(config.state(), ComponentState::Discovered);

        let err = config
            .advance(ComponentState::ClassLoaded, ComponentState::LifecycleResolved)
            .unwrap_err();
        assert!(matches!(err, DeployError::InvalidComponentState { .. }));

        config
            .advance(ComponentState::Discovered, ComponentState::ClassLoaded)
            .unwrap();
        assert_eq!(config.state(), ComponentState::ClassLoaded);
    }

    #[test]
    fn test_lifecycle_accumulates_in_discovery_order() {
        let mut config = configuration();
        config.add_lifecycle(
            CallbackKind::PostConstruct,
            LifecycleConfiguration {
                declaring_type: "com.acme.Foo".to_string(),
                method_name: "init".to_string(),
            },
        );
        config.add_lifecycle(
            CallbackKind::PostConstruct,
            LifecycleConfiguration {
                declaring_type: "com.acme.Base".to_string(),
                method_name: "base_init".to_string(),
            },
        );

        let names: Vec<_> = config
            .post_construct()
            .iter()
            .map(|l| l.method_name.as_str())
            .collect();
        assert_eq!(names, ["init", "base_init"]);
    }
}
