// armature-core: component model and service plan for the deployment pipeline
//
// Provides the data model a deployment pipeline accumulates into:
// - per-component configurations with a monotonic attachment discipline
// - a build-time type registry standing in for reflective class loading
// - interceptor configurations and sealed per-method chains
// - resource injection configurations and deferred naming lookups
// - a service target collecting dependency-ordered installation requests

pub mod component;
pub mod error;
pub mod filter;
pub mod injection;
pub mod interceptor;
pub mod logging;
pub mod name;
pub mod service;
pub mod settings;
pub mod types;

pub use component::{
    CallbackKind, ComponentConfiguration, ComponentState, LifecycleConfiguration,
};
pub use error::{DeployError, Result};
pub use filter::MethodFilter;
pub use injection::{
    BoundInjection, InjectionFactory, LookupValue, MemberInjectionFactory,
    ResourceInjectionConfiguration,
};
pub use interceptor::{
    ChainLink, ComponentInterceptorChains, InstanceStrategy, InterceptorConfiguration,
    InterceptorFactory,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use name::{ComponentServiceNames, ContextNames, ServiceName};
pub use service::{
    ActivationMode, InjectionPoint, ServiceBuilder, ServiceDependency, ServiceInstallation,
    ServiceKind, ServiceTarget,
};
pub use settings::DeploymentSettings;
pub use types::{
    AnnotationIndex, AnnotationKind, ComponentType, ComponentTypeBuilder, MethodDescriptor,
    MethodIndex, MethodRef, TypeRegistration, TypeRegistry, TypeResolver,
};

// re-export inventory so downstream type registrations can use
// `armature_core::inventory::submit!` without a direct dependency
pub use inventory;
