//! Deployment error taxonomy.
//!
//! Every stage of the pipeline either succeeds or fails fatally for the whole
//! deployment unit; there is no partial-success state. `DeployError::Other`
//! keeps an `anyhow` escape hatch for callers layering their own context.

use crate::component::{CallbackKind, ComponentState};
use crate::name::ServiceName;
use thiserror::Error;

/// Unified result type for the deployment pipeline.
pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Debug, Error)]
pub enum DeployError {
    /// The component class name could not be resolved in the type registry.
    #[error("Failed to load component class {0}")]
    ClassNotFound(String),

    /// An interceptor class name could not be resolved in the type registry.
    #[error("Failed to load interceptor class {0}")]
    InterceptorClassNotFound(String),

    /// More than one callback of the same classification on a single class.
    #[error("Only one {kind} callback allowed per class: {class_name}")]
    AmbiguousLifecycleCallback {
        class_name: String,
        kind: CallbackKind,
    },

    /// Lifecycle callbacks must take no parameters.
    #[error("Lifecycle callback {class_name}#{method_name} must take no parameters")]
    LifecycleCallbackHasParameters {
        class_name: String,
        method_name: String,
    },

    /// The designated interceptor method does not exist on the interceptor class.
    #[error("Unable to find interceptor method {method_name} on interceptor class {class_name}")]
    InterceptorMethodNotFound {
        class_name: String,
        method_name: String,
    },

    /// More than one around-invoke method declared on a single class.
    #[error("Only one around-invoke method allowed per class: {0}")]
    AmbiguousInterceptorMethod(String),

    /// Interceptor methods take exactly one invocation-context argument.
    #[error("Interceptor method {class_name}#{method_name} must take a single invocation context argument")]
    InvalidInterceptorMethod {
        class_name: String,
        method_name: String,
    },

    /// A service with the same name was already installed into the target.
    #[error("Service {0} is already installed")]
    DuplicateService(ServiceName),

    /// An installed service depends on a service that was never installed.
    #[error("Service {service} depends on {missing} which is not installed")]
    MissingDependency {
        service: ServiceName,
        missing: ServiceName,
    },

    /// The installed service graph contains a dependency cycle.
    #[error("Service dependency cycle detected: {0}")]
    DependencyCycle(String),

    /// A monotonic attachment was written twice.
    #[error("Attachment {0} has already been set")]
    AttachmentAlreadySet(&'static str),

    /// A stage read an attachment that an earlier stage never produced.
    #[error("Required attachment {0} is missing")]
    AttachmentMissing(&'static str),

    /// A stage ran against a component in an unexpected pipeline state.
    #[error("Component {component} is in state {actual}, expected {expected}")]
    InvalidComponentState {
        component: String,
        expected: ComponentState,
        actual: ComponentState,
    },

    /// Interceptor chains were modified after being sealed.
    #[error("Interceptor chains for component {0} are already sealed")]
    ChainsSealed(String),

    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Invalid deployment settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
