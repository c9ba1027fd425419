//! Web server module
//!
//! Configures and starts the Actix-Web HTTP server with all routes,
//! middleware, and static file serving (spec §6's REST surface).

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{middleware, web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use std::sync::Arc;
use tracing::info;

use crate::application::context::SchedulerConfig;
use crate::web::{auth, config::WebConfig, handlers, repository::AppState, ws};

pub async fn start_web_server(config: WebConfig) -> std::io::Result<()> {
    info!("Starting web server on {}:{}", config.host, config.port);
    info!("Database: {}", config.database_path);

    let app_state = Arc::new(
        AppState::new(&config.database_path, SchedulerConfig::default()).expect("Failed to open scheduler database"),
    );

    let user_store = Arc::new(auth::UserStore::new(config.auth_username.clone(), config.auth_password.clone()));

    let login_tracker = Arc::new(auth::LoginAttemptTracker::new(config.max_login_attempts, config.lockout_duration_minutes));

    let config_data = web::Data::new(config.clone());
    let app_state_data = web::Data::new(app_state);
    let user_store_data = web::Data::new(user_store);
    let login_tracker_data = web::Data::new(login_tracker);

    let server = HttpServer::new(move || {
        let cors = Cors::default().allow_any_origin().allow_any_method().allow_any_header().max_age(3600);

        let auth_middleware = HttpAuthentication::bearer(auth::validator);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(config_data.clone())
            .app_data(app_state_data.clone())
            .app_data(user_store_data.clone())
            .app_data(login_tracker_data.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health_check))
                    .route("/auth/login", web::post().to(handlers::login))
                    .route("/auth/entra-callback", web::post().to(handlers::entra_id_callback))
                    .service(
                        web::scope("")
                            .wrap(auth_middleware)
                            .route("/auth/me", web::get().to(handlers::get_current_user))
                            .route("/jobs", web::get().to(handlers::list_jobs))
                            .route("/jobs", web::post().to(handlers::create_job))
                            .route("/jobs", web::delete().to(handlers::delete_all_jobs))
                            .route("/jobs/import", web::post().to(handlers::import_jobs))
                            .route("/jobs/schedule-all", web::post().to(handlers::schedule_all))
                            .route("/jobs/{id}", web::put().to(handlers::update_job))
                            .route("/jobs/{id}", web::delete().to(handlers::delete_job))
                            .route("/jobs/{id}/auto-schedule", web::post().to(handlers::auto_schedule_job))
                            .route("/jobs/{id}/manual-schedule", web::post().to(handlers::manual_schedule_job))
                            .route("/jobs/{id}/drag-schedule", web::post().to(handlers::drag_schedule_job))
                            .route("/schedule/all", web::delete().to(handlers::clear_all_schedule_entries))
                            .route("/reschedule/unavailability", web::post().to(handlers::reschedule_unavailability))
                            .route("/resources/{id}/mark-unavailable", web::post().to(handlers::mark_resource_unavailable))
                            .route("/resources/bulk-unavailable", web::post().to(handlers::bulk_mark_unavailable))
                            .route("/resources/unavailable/{id}", web::delete().to(handlers::delete_unavailability)),
                    ),
            )
            .route("/ws", web::get().to(ws::ws_handler))
            .service(fs::Files::new("/", "./static").index_file("index.html"))
    })
    .bind((config.host.as_str(), config.port))?;

    info!("Web server started successfully");
    info!("Open http://{}:{} in your browser", config.host, config.port);

    server.run().await
}
