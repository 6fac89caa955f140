//! Deploys a two-component unit and prints the resulting service plan.
//!
//! Run with `cargo run --example deploy_unit`.

use armature_core::{
    AnnotationKind, ComponentConfiguration, ComponentType, DeploymentSettings,
    InterceptorConfiguration, LoggingConfig, MethodFilter, ResourceInjectionConfiguration,
    ServiceTarget, TypeRegistry,
};
use armature_deploy::{DeploymentUnit, ProcessorPipeline, COMPONENTS, TYPE_REGISTRY};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    LoggingConfig::default().init()?;

    let mut registry = TypeRegistry::new();
    registry.register(
        ComponentType::builder("com.acme.shop.OrderService")
            .annotated_method("init", 0, AnnotationKind::PostConstruct)
            .annotated_method("shutdown", 0, AnnotationKind::PreDestroy)
            .method("place_order", 1)
            .method("cancel_order", 1)
            .injection_target("data_source")
            .build(),
    );
    registry.register(
        ComponentType::builder("com.acme.shop.AuditInterceptor")
            .annotated_method("audit", 1, AnnotationKind::AroundInvoke)
            .build(),
    );
    registry.register(
        ComponentType::builder("com.acme.shop.InventoryService")
            .method("reserve", 2)
            .build(),
    );

    let mut orders = ComponentConfiguration::new(
        "OrderService",
        "com.acme.shop.OrderService",
        "shop",
        "orders",
    );
    orders.add_class_interceptor(InterceptorConfiguration::new(
        "com.acme.shop.AuditInterceptor",
        MethodFilter::Pattern("*_order".to_string()),
    ));
    orders.add_resource_injection(
        ResourceInjectionConfiguration::new("jdbc/main", "jdbc/main", "java:global/jdbc/main")
            .with_target_member("data_source")
            .with_bind(),
    );

    let inventory = ComponentConfiguration::new(
        "InventoryService",
        "com.acme.shop.InventoryService",
        "shop",
        "orders",
    );

    let mut unit = DeploymentUnit::new("shop.ear");
    unit.attach(&TYPE_REGISTRY, Arc::new(registry))?;
    unit.attach(&COMPONENTS, vec![orders, inventory])?;

    let target = ServiceTarget::new();
    let pipeline = ProcessorPipeline::with_settings(DeploymentSettings {
        eager_validation: true,
        ..Default::default()
    });
    pipeline.run(&mut unit, &target)?;

    println!("\nservice plan ({} services):", target.len());
    for name in target.installation_order()? {
        if let Some(installation) = target.find(&name) {
            println!(
                "  {:<9} {:<70} ({} deps)",
                format!("{:?}", installation.mode).to_lowercase(),
                installation.name.to_string(),
                installation.dependencies.len()
            );
        }
    }

    for component in unit.components()? {
        let chains = component.interceptor_chains()?;
        println!(
            "\n{}: {} method chain(s), state {}",
            component.component_name(),
            chains.len(),
            component.state()
        );
    }
    Ok(())
}
