//! The service plan: installation requests collected for the external
//! service runtime.
//!
//! The pipeline is a pure producer of installation requests; activation
//! ordering, restart, and failure propagation belong to the runtime that
//! consumes the plan. The target does detect duplicate names at install
//! time and can validate the collected graph for missing edges and cycles.

use crate::error::{DeployError, Result};
use crate::injection::LookupValue;
use crate::name::ServiceName;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// How eagerly the runtime should start a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMode {
    /// Started as soon as its dependencies are satisfied.
    Active,
    /// Started only when something demands it.
    OnDemand,
}

/// What an installed service does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceKind {
    /// A naming context (application, module, component, or env scope).
    NamingContext,

    /// Binds a deferred lookup value into a naming context.
    Binder { lookup: LookupValue },

    /// Aliases a bind name to another binding.
    LinkBinder { target: String },

    /// Publishes an object-factory reference pointing at another service.
    ReferenceBinder { target: ServiceName },

    /// The component service itself.
    Component { component_name: String },
}

/// Typed injection point carried by a dependency edge.
///
/// A dependency without one is a pure ordering edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    pub target_member: String,
}

/// One dependency edge of an installation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDependency {
    pub name: ServiceName,
    pub injection: Option<InjectionPoint>,
}

impl ServiceDependency {
    /// An untyped ordering-only dependency.
    pub fn on(name: ServiceName) -> Self {
        Self {
            name,
            injection: None,
        }
    }

    /// A typed dependency injected into the named member.
    pub fn injected(name: ServiceName, target_member: impl Into<String>) -> Self {
        Self {
            name,
            injection: Some(InjectionPoint {
                target_member: target_member.into(),
            }),
        }
    }
}

/// A fully wired installation request.
#[derive(Debug, Clone)]
pub struct ServiceInstallation {
    pub name: ServiceName,
    pub kind: ServiceKind,
    pub mode: ActivationMode,
    pub dependencies: Vec<ServiceDependency>,
}

/// Fluent builder for one installation request.
#[must_use = "a service builder does nothing until install() is called"]
pub struct ServiceBuilder<'a> {
    target: &'a ServiceTarget,
    name: ServiceName,
    kind: ServiceKind,
    mode: ActivationMode,
    dependencies: Vec<ServiceDependency>,
}

impl<'a> ServiceBuilder<'a> {
    pub fn mode(mut self, mode: ActivationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn depends_on(mut self, name: ServiceName) -> Self {
        self.dependencies.push(ServiceDependency::on(name));
        self
    }

    pub fn depends_on_injected(
        mut self,
        name: ServiceName,
        target_member: impl Into<String>,
    ) -> Self {
        self.dependencies
            .push(ServiceDependency::injected(name, target_member));
        self
    }

    pub fn add_dependency(mut self, dependency: ServiceDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn install(self) -> Result<()> {
        self.target.install(ServiceInstallation {
            name: self.name,
            kind: self.kind,
            mode: self.mode,
            dependencies: self.dependencies,
        })
    }
}

/// Collects installation requests for one deployment unit.
#[derive(Debug, Default)]
pub struct ServiceTarget {
    installations: RwLock<Vec<ServiceInstallation>>,
    names: RwLock<HashSet<ServiceName>>,
}

impl ServiceTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder for a service, in `Active` mode by default.
    pub fn service(&self, name: ServiceName, kind: ServiceKind) -> ServiceBuilder<'_> {
        ServiceBuilder {
            target: self,
            name,
            kind,
            mode: ActivationMode::Active,
            dependencies: Vec::new(),
        }
    }

    /// Accepts one installation request; duplicate names are fatal.
    pub fn install(&self, installation: ServiceInstallation) -> Result<()> {
        {
            let mut names = self.names.write();
            if !names.insert(installation.name.clone()) {
                tracing::warn!("Duplicate service installation: '{}'", installation.name);
                return Err(DeployError::DuplicateService(installation.name));
            }
        }
        tracing::debug!(
            "Installed service '{}' ({:?}, {} dependencies)",
            installation.name,
            installation.mode,
            installation.dependencies.len()
        );
        self.installations.write().push(installation);
        Ok(())
    }

    pub fn contains(&self, name: &ServiceName) -> bool {
        self.names.read().contains(name)
    }

    pub fn len(&self) -> usize {
        self.installations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.installations.read().is_empty()
    }

    /// Snapshot of the collected plan, in installation order.
    pub fn installations(&self) -> Vec<ServiceInstallation> {
        self.installations.read().clone()
    }

    pub fn find(&self, name: &ServiceName) -> Option<ServiceInstallation> {
        self.installations
            .read()
            .iter()
            .find(|i| &i.name == name)
            .cloned()
    }

    /// Checks the collected graph for missing dependencies and cycles.
    ///
    /// Edges pointing outside the plan are only an error when the runtime
    /// would have nothing to satisfy them with, so a dependency on a name
    /// the plan never installs is reported as missing.
    pub fn validate(&self) -> Result<()> {
        let graph = self.dependency_graph();
        for (service, deps) in &graph {
            for dep in deps {
                if !graph.contains_key(dep) {
                    return Err(DeployError::MissingDependency {
                        service: service.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        for service in graph.keys() {
            if !visited.contains(service) {
                if let Some(cycle) = detect_cycle(service, &graph, &mut visited, &mut stack) {
                    let rendered: Vec<String> =
                        cycle.iter().map(ToString::to_string).collect();
                    return Err(DeployError::DependencyCycle(rendered.join(" -> ")));
                }
            }
        }
        Ok(())
    }

    /// Topologically sorts the plan: dependencies before dependents.
    pub fn installation_order(&self) -> Result<Vec<ServiceName>> {
        let installations = self.installations.read();
        let by_name: HashMap<String, &ServiceInstallation> = installations
            .iter()
            .map(|i| (i.name.to_string(), i))
            .collect();

        let mut in_degree: HashMap<String, usize> = HashMap::new();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for installation in installations.iter() {
            let name = installation.name.to_string();
            let entry = in_degree.entry(name.clone()).or_insert(0);
            *entry += installation.dependencies.len();
            for dep in &installation.dependencies {
                let dep_name = dep.name.to_string();
                in_degree.entry(dep_name.clone()).or_insert(0);
                dependents.entry(dep_name).or_default().push(name.clone());
            }
        }

        let mut queue: Vec<String> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(name, _)| name.clone())
            .collect();
        let mut sorted = Vec::new();

        while let Some(name) = queue.pop() {
            if let Some(installation) = by_name.get(&name) {
                sorted.push(installation.name.clone());
            }
            if let Some(next) = dependents.get(&name) {
                for dependent in next {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push(dependent.clone());
                        }
                    }
                }
            }
        }

        if sorted.len() != installations.len() {
            return Err(DeployError::DependencyCycle(
                "not all services could be ordered".to_string(),
            ));
        }
        Ok(sorted)
    }

    fn dependency_graph(&self) -> HashMap<ServiceName, Vec<ServiceName>> {
        self.installations
            .read()
            .iter()
            .map(|i| {
                (
                    i.name.clone(),
                    i.dependencies.iter().map(|d| d.name.clone()).collect(),
                )
            })
            .collect()
    }
}

/// DFS cycle detection over the name graph.
fn detect_cycle(
    node: &ServiceName,
    graph: &HashMap<ServiceName, Vec<ServiceName>>,
    visited: &mut HashSet<ServiceName>,
    stack: &mut Vec<ServiceName>,
) -> Option<Vec<ServiceName>> {
    visited.insert(node.clone());
    stack.push(node.clone());

    if let Some(deps) = graph.get(node) {
        for dep in deps {
            if !visited.contains(dep) {
                if let Some(cycle) = detect_cycle(dep, graph, visited, stack) {
                    return Some(cycle);
                }
            } else if stack.contains(dep) {
                let start = stack.iter().position(|n| n == dep).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(dep.clone());
                return Some(cycle);
            }
        }
    }

    stack.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ServiceName {
        ServiceName::of(s.split('.'))
    }

    #[test]
    fn test_duplicate_service_is_fatal() {
        let target = ServiceTarget::new();
        target
            .service(name("a.b"), ServiceKind::NamingContext)
            .install()
            .unwrap();
        let err = target
            .service(name("a.b"), ServiceKind::NamingContext)
            .install()
            .unwrap_err();
        assert!(matches!(err, DeployError::DuplicateService(_)));
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn test_builder_collects_dependencies_and_mode() {
        let target = ServiceTarget::new();
        target
            .service(name("comp"), ServiceKind::Component {
                component_name: "Foo".to_string(),
            })
            .mode(ActivationMode::OnDemand)
            .depends_on(name("ctx"))
            .depends_on_injected(name("jdbc"), "data_source")
            .install()
            .unwrap();

        let installed = target.find(&name("comp")).unwrap();
        assert_eq!(installed.mode, ActivationMode::OnDemand);
        assert_eq!(installed.dependencies.len(), 2);
        assert!(installed.dependencies[0].injection.is_none());
        assert_eq!(
            installed.dependencies[1].injection.as_ref().unwrap().target_member,
            "data_source"
        );
    }

    #[test]
    fn test_validate_missing_dependency() {
        let target = ServiceTarget::new();
        target
            .service(name("comp"), ServiceKind::NamingContext)
            .depends_on(name("gone"))
            .install()
            .unwrap();
        let err = target.validate().unwrap_err();
        assert!(matches!(
            err,
            DeployError::MissingDependency { service, missing }
                if service == name("comp") && missing == name("gone")
        ));
    }

    #[test]
    fn test_validate_cycle() {
        let target = ServiceTarget::new();
        target
            .service(name("a"), ServiceKind::NamingContext)
            .depends_on(name("b"))
            .install()
            .unwrap();
        target
            .service(name("b"), ServiceKind::NamingContext)
            .depends_on(name("a"))
            .install()
            .unwrap();
        assert!(matches!(
            target.validate().unwrap_err(),
            DeployError::DependencyCycle(_)
        ));
    }

    #[test]
    fn test_installation_order() {
        let target = ServiceTarget::new();
        target
            .service(name("app"), ServiceKind::NamingContext)
            .install()
            .unwrap();
        target
            .service(name("module"), ServiceKind::NamingContext)
            .depends_on(name("app"))
            .install()
            .unwrap();
        target
            .service(name("comp"), ServiceKind::NamingContext)
            .depends_on(name("module"))
            .install()
            .unwrap();

        let order = target.installation_order().unwrap();
        let position = |n: &str| order.iter().position(|s| s.to_string() == n).unwrap();
        assert!(position("app") < position("module"));
        assert!(position("module") < position("comp"));
    }
}
