//! Resource injection model.
//!
//! A [`ResourceInjectionConfiguration`] is produced by an earlier resolution
//! phase and describes one named resource the component wants bound into its
//! environment context. The injection-install stage turns it into a deferred
//! [`LookupValue`] and, when the declared target member actually exists on
//! the resolved type, a concrete [`BoundInjection`].

use crate::name::ServiceName;
use crate::service::ServiceDependency;
use crate::types::ComponentType;

/// One named resource to inject, as resolved by the upstream phase.
#[derive(Debug, Clone)]
pub struct ResourceInjectionConfiguration {
    /// Name the component looks the resource up under, relative to its
    /// environment context.
    pub local_name: String,

    /// Name the resource is bound under.
    pub bind_name: String,

    /// The binding's resolved target (what a link alias points at).
    pub bind_target_name: String,

    /// Upstream services that must be up before the resource is usable.
    pub dependencies: Vec<ServiceDependency>,

    /// Whether the install stage must create a link-reference bind
    /// operation aliasing `bind_name` to `bind_target_name`.
    pub requires_bind: bool,

    /// The member on the component class the resource is injected into,
    /// if the resolution phase identified one.
    pub target_member: Option<String>,
}

impl ResourceInjectionConfiguration {
    pub fn new(
        local_name: impl Into<String>,
        bind_name: impl Into<String>,
        bind_target_name: impl Into<String>,
    ) -> Self {
        Self {
            local_name: local_name.into(),
            bind_name: bind_name.into(),
            bind_target_name: bind_target_name.into(),
            dependencies: Vec::new(),
            requires_bind: false,
            target_member: None,
        }
    }

    pub fn with_dependency(mut self, dependency: ServiceDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_bind(mut self) -> Self {
        self.requires_bind = true;
        self
    }

    pub fn with_target_member(mut self, member: impl Into<String>) -> Self {
        self.target_member = Some(member.into());
        self
    }
}

/// A deferred naming lookup: resolved only when the backing context service
/// is up, never during pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupValue {
    pub context: ServiceName,
    pub local_name: String,
}

/// A concrete injection into one member of the component instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundInjection {
    pub target_member: String,
    pub lookup: LookupValue,
}

/// Builds [`BoundInjection`]s from configurations.
///
/// Returning `None` is not an error: the resource's naming dependency is
/// still registered, only the instance-level injection is skipped.
pub trait InjectionFactory: Send + Sync {
    fn create(
        &self,
        ty: &ComponentType,
        configuration: &ResourceInjectionConfiguration,
        lookup: LookupValue,
    ) -> Option<BoundInjection>;
}

/// Default factory: injects only when the configuration names a target
/// member the type actually declares.
#[derive(Debug, Default)]
pub struct MemberInjectionFactory;

impl InjectionFactory for MemberInjectionFactory {
    fn create(
        &self,
        ty: &ComponentType,
        configuration: &ResourceInjectionConfiguration,
        lookup: LookupValue,
    ) -> Option<BoundInjection> {
        let member = configuration.target_member.as_deref()?;
        if !ty.has_injection_target(member) {
            tracing::debug!(
                "Type '{}' has no injection target '{}', skipping injection of '{}'",
                ty.name(),
                member,
                configuration.local_name
            );
            return None;
        }
        Some(BoundInjection {
            target_member: member.to_string(),
            lookup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComponentType;

    fn lookup() -> LookupValue {
        LookupValue {
            context: ServiceName::of(["ctx", "env"]),
            local_name: "jdbc/main".to_string(),
        }
    }

    #[test]
    fn test_member_factory_binds_known_target() {
        let ty = ComponentType::builder("com.acme.Foo")
            .injection_target("data_source")
            .build();
        let cfg = ResourceInjectionConfiguration::new("jdbc/main", "jdbc/main", "global/jdbc")
            .with_target_member("data_source");

        let bound = MemberInjectionFactory.create(&ty, &cfg, lookup()).unwrap();
        assert_eq!(bound.target_member, "data_source");
        assert_eq!(bound.lookup.local_name, "jdbc/main");
    }

    #[test]
    fn test_member_factory_skips_unknown_target() {
        let ty = ComponentType::builder("com.acme.Foo").build();
        let cfg = ResourceInjectionConfiguration::new("jdbc/main", "jdbc/main", "global/jdbc")
            .with_target_member("data_source");
        assert!(MemberInjectionFactory.create(&ty, &cfg, lookup()).is_none());
    }

    #[test]
    fn test_member_factory_skips_without_target() {
        let ty = ComponentType::builder("com.acme.Foo")
            .injection_target("data_source")
            .build();
        let cfg = ResourceInjectionConfiguration::new("jdbc/main", "jdbc/main", "global/jdbc");
        assert!(MemberInjectionFactory.create(&ty, &cfg, lookup()).is_none());
    }
}
