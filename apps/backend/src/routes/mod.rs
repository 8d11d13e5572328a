use actix_web::web;

pub mod health;
pub mod tasks;

/// Register every route. `main.rs` and the test app builder share this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Liveness and readiness: /health, /health/ready
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Task CRUD: /api/tasks/**
    cfg.service(
        web::scope("/api/tasks")
            .app_data(tasks::query_config())
            .configure(tasks::configure_routes),
    );
}
