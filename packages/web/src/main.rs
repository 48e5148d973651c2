use dioxus::prelude::*;

use ui::{AccessGate, AuthProvider};
use views::{
    AdminDashboard, AdminLayout, AdminRounds, AdminTasks, AdminUsers, Login, RoundDetail,
    StaffDashboard, StaffLayout,
};

mod views;

#[cfg(feature = "server")]
mod photos;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Gate)]
        #[route("/")]
        Root {},
        #[route("/login")]
        Login {},
        #[layout(AdminLayout)]
            #[route("/dashboard/admin")]
            AdminDashboard {},
            #[route("/dashboard/admin/rounds")]
            AdminRounds {},
            #[route("/dashboard/admin/tasks")]
            AdminTasks {},
            #[route("/dashboard/admin/users")]
            AdminUsers {},
        #[end_layout]
        #[layout(StaffLayout)]
            #[route("/dashboard/staff")]
            StaffDashboard {},
            #[route("/dashboard/staff/round/:assignment_id")]
            RoundDetail { assignment_id: String },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(launch_server()),
            Err(e) => {
                eprintln!("Failed to start the tokio runtime: {e}");
                std::process::exit(1);
            }
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
fn fatal(context: &str, e: impl std::fmt::Display) -> ! {
    tracing::error!("{}: {}", context, e);
    std::process::exit(1);
}

#[cfg(feature = "server")]
async fn launch_server() {
    use axum::extract::DefaultBodyLimit;
    use axum::routing::get;
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tower::ServiceBuilder;
    use tower_sessions::cookie::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;
    use tracing_subscriber::EnvFilter;

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = api::settings::settings();

    let pool = match api::db::get_pool().await {
        Ok(pool) => pool,
        Err(e) => fatal("Failed to connect to database", e),
    };

    if let Err(e) = sqlx::migrate!("../api/migrations").run(pool).await {
        fatal("Failed to run migrations", e);
    }

    let session_store = PostgresStore::new(pool.clone());
    if let Err(e) = session_store.migrate().await {
        fatal("Failed to prepare the session table", e);
    }

    let store = api::db::PgStore::new(pool.clone());
    match api::auth::bootstrap_admin(&store, &settings.bootstrap).await {
        Ok(true) => tracing::info!("Created bootstrap administrator {}", settings.bootstrap.email),
        Ok(false) => {}
        Err(e) => tracing::warn!("Bootstrap administrator not created: {}", e),
    }

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(settings.session.expiry_days)));

    let body_limit = settings.storage.max_upload_mb * 1024 * 1024;

    let router = axum::Router::new()
        .route(
            &format!("{}/{{*path}}", api::storage::PHOTO_ROUTE),
            get(photos::serve_photo),
        )
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(session_layer),
        );

    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => fatal("Failed to bind", e),
    };
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router.into_make_service()).await {
        fatal("Server error", e);
    }
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            Router::<Route> {}
        }
    }
}

/// Applies the role rules to every page before it renders.
#[component]
fn Gate() -> Element {
    let route = use_route::<Route>();
    rsx! {
        AccessGate {
            path: route.to_string(),
            Outlet::<Route> {}
        }
    }
}

/// `/` only ever redirects; the gate sends each role to its dashboard.
#[component]
fn Root() -> Element {
    rsx! {}
}
