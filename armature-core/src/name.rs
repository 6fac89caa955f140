//! Hierarchical service names and the canonical per-component name set.

use std::fmt;

/// A hierarchical service name, displayed as dot-joined segments.
///
/// Names are cheap value objects; the installed service graph is keyed by
/// them, so equality and ordering are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName {
    segments: Vec<String>,
}

impl ServiceName {
    /// Creates a name from an ordered list of segments.
    pub fn of<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new name with one more trailing segment.
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The parent name, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// The application/module/component coordinates of a deployed component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextNames {
    pub application: String,
    pub module: String,
    pub component: String,
}

impl ContextNames {
    pub fn new(
        application: impl Into<String>,
        module: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            module: module.into(),
            component: component.into(),
        }
    }

    fn context_root() -> ServiceName {
        ServiceName::of(["armature", "naming", "context"])
    }

    /// Naming context shared by everything in the application.
    pub fn application_context(&self) -> ServiceName {
        Self::context_root()
            .append("application")
            .append(&self.application)
    }

    /// Naming context shared by everything in the module.
    pub fn module_context(&self) -> ServiceName {
        Self::context_root()
            .append("module")
            .append(&self.application)
            .append(&self.module)
    }

    /// The module-wide environment context; component env contexts hang off it.
    pub fn module_env_context(&self) -> ServiceName {
        self.module_context().append("env")
    }

    /// Naming context private to the component.
    pub fn component_context(&self) -> ServiceName {
        Self::context_root()
            .append("component")
            .append(&self.application)
            .append(&self.module)
            .append(&self.component)
    }

    /// The component's environment context, backing its resource lookups.
    pub fn env_context(&self) -> ServiceName {
        self.component_context().append("env")
    }

    /// The context under which the component's reference binder is installed.
    pub fn bind_context(&self) -> ServiceName {
        self.component_context().append("binder")
    }

    /// The component service itself.
    pub fn component_service(&self) -> ServiceName {
        ServiceName::of(["armature", "component"])
            .append(&self.application)
            .append(&self.module)
            .append(&self.component)
    }

    /// The JNDI-style name the component reference is published under.
    pub fn bind_name(&self) -> String {
        format!(
            "{}/{}/{}",
            self.application, self.module, self.component
        )
    }

    /// Computes the full name set consumed by the install stage.
    pub fn service_names(&self) -> ComponentServiceNames {
        ComponentServiceNames {
            application_context: self.application_context(),
            module_context: self.module_context(),
            module_env_context: self.module_env_context(),
            component_context: self.component_context(),
            env_context: self.env_context(),
            bind_context: self.bind_context(),
            component_service: self.component_service(),
            bind_name: self.bind_name(),
        }
    }
}

/// The resolved service names for one component, as produced by the
/// component factory and wired by the install stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentServiceNames {
    pub application_context: ServiceName,
    pub module_context: ServiceName,
    pub module_env_context: ServiceName,
    pub component_context: ServiceName,
    pub env_context: ServiceName,
    pub bind_context: ServiceName,
    pub component_service: ServiceName,
    pub bind_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_display() {
        let name = ServiceName::of(["armature", "naming", "context"]).append("env");
        assert_eq!(name.to_string(), "armature.naming.context.env");
        assert_eq!(name.segments().len(), 4);
    }

    #[test]
    fn test_service_name_parent() {
        let name = ServiceName::of(["a", "b", "c"]);
        let parent = name.parent().unwrap();
        assert_eq!(parent.to_string(), "a.b");
        assert!(ServiceName::of(["root"]).parent().is_none());
    }

    #[test]
    fn test_context_names() {
        let names = ContextNames::new("shop", "orders", "OrderBean").service_names();
        assert_eq!(
            names.env_context.to_string(),
            "armature.naming.context.component.shop.orders.OrderBean.env"
        );
        assert_eq!(
            names.module_env_context.to_string(),
            "armature.naming.context.module.shop.orders.env"
        );
        assert_eq!(
            names.component_service.to_string(),
            "armature.component.shop.orders.OrderBean"
        );
        assert_eq!(names.bind_name, "shop/orders/OrderBean");
    }
}
