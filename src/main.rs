mod config;
mod routes;
mod services;
mod state;
mod views;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let addr = std::net::SocketAddr::new(config.bind_addr, config.port);

    let state = state::AppState::new(config);

    // Spawn background idle-session sweeper.
    let _sweeper = services::session::spawn_session_sweeper(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");

    tracing::info!(%addr, "belongings listening");
    axum::serve(listener, app).await.expect("server failed");
}
