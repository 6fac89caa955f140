// armature-deploy: the staged deployment-unit processor pipeline
//
// Transforms declarative component configurations into wired service
// installation requests, one stage at a time:
//
//   DISCOVERED -> CLASS_LOADED -> LIFECYCLE_RESOLVED
//              -> RESOURCES_RESOLVED -> INTERCEPTORS_BUILT -> INSTALLED
//
// Processing is single-threaded and sequential per deployment unit; a
// failure at any stage aborts the unit.

pub mod factory;
pub mod pipeline;
pub mod processors;
pub mod unit;

pub use factory::{BasicComponentFactory, ComponentFactory, ConstructedComponent};
pub use pipeline::ProcessorPipeline;
pub use processors::{
    ComponentClassLoadingProcessor, ComponentInstallProcessor, DeploymentUnitProcessor,
    InterceptorInstallProcessor, LifecycleAnnotationParsingProcessor,
    ResourceInjectionInstallProcessor,
};
pub use unit::{
    AttachmentKey, Attachments, DeploymentPhaseContext, DeploymentUnit, COMPONENTS,
    TYPE_REGISTRY,
};
