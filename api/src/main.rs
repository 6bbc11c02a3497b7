use std::net::SocketAddr;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod airtable;
mod error;
mod fanout;
mod identity;
mod middleware;
mod routes;
mod schedule;
mod sessions;
mod state;
mod wise;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SagePilot Schedule API",
        version = "0.1.0",
        description = "Unified 'what's scheduled next' view for teachers and students, \
                       reconciled across the operational store, the Wise platform, and \
                       the scheduling sheet."
    ),
    paths(
        routes::health::health_check,
        routes::schedules::schedules_by_id,
        routes::schedules::schedules_by_phone,
        routes::schedules::all_schedules,
        routes::students::students_by_phone,
        routes::availability::teacher_availability,
        routes::homework::homework_by_phone,
        routes::sessions::upcoming_sessions,
        routes::airtable_students::search_students,
    ),
    components(schemas(
        sagepilot_core::error::ApiError,
        sagepilot_core::sessions::Session,
        sagepilot_core::schedule::ScheduledRecord,
        sagepilot_core::content::TestLink,
        routes::health::HealthResponse,
        routes::schedules::ScheduleCounts,
        routes::schedules::TeacherSummary,
        routes::schedules::SchedulesByIdResponse,
        routes::schedules::SchedulesByPhoneRequest,
        routes::schedules::SchedulesByPhoneResponse,
        routes::schedules::AllSchedulesResponse,
        routes::students::StudentsByPhoneRequest,
        routes::students::StudentsByPhoneResponse,
        routes::availability::AvailabilityResponse,
        routes::homework::HomeworkByPhoneRequest,
        routes::homework::HomeworkByPhoneResponse,
        routes::homework::StudentSummary,
        routes::sessions::UpcomingSessionsResponse,
        routes::airtable_students::AirtableSearchRequest,
        routes::airtable_students::AirtableSearchResponse,
        crate::identity::StudentAccount,
        crate::wise::AvailabilitySlot,
        crate::airtable::AirtableRecord,
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sagepilot_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Fail deploys, not requests, on sheet-mapping drift
    sagepilot_core::schedule::DEMO_SCHEDULED
        .validate()
        .expect("demo_scheduled profile must be internally consistent");
    sagepilot_core::schedule::MEETING_LINKS
        .validate()
        .expect("meeting_links profile must be internally consistent");

    // Database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let app_state = state::AppState {
        db: pool,
        wise: wise::WiseClient::from_env(),
        airtable: airtable::AirtableClient::from_env(),
        schedule_id_mode: state::ScheduleIdMode::from_env(),
    };

    // CORS
    let cors_layer = middleware::cors::build_cors_layer();

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::schedules::router())
        .merge(routes::students::router())
        .merge(routes::availability::router())
        .merge(routes::homework::router())
        .merge(routes::sessions::router())
        .merge(routes::airtable_students::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("SagePilot schedule API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server exited");
}
