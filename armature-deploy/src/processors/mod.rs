//! The ordered processor stages.
//!
//! Each processor runs once per deployment unit and iterates the unit's
//! components sequentially. A processor either attaches data to the
//! component configurations for later stages or, in the terminal stage,
//! emits installation requests into the service target. Any failure aborts
//! the whole unit; there is no rollback path inside the pipeline.

use crate::unit::DeploymentPhaseContext;
use armature_core::Result;

mod class_loading;
mod install;
mod interceptors;
mod lifecycle;
mod resource_injection;

pub use class_loading::ComponentClassLoadingProcessor;
pub use install::ComponentInstallProcessor;
pub use interceptors::InterceptorInstallProcessor;
pub use lifecycle::LifecycleAnnotationParsingProcessor;
pub use resource_injection::ResourceInjectionInstallProcessor;

/// One stage of the deployment pipeline.
pub trait DeploymentUnitProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn deploy(&self, ctx: &mut DeploymentPhaseContext<'_>) -> Result<()>;
}
