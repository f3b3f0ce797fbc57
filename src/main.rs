use dotenvy::dotenv;
use storefront_service::{build_server, create_pool, run_migrations, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().expect("configuration error");

    let pool = create_pool(&config.database_url);
    run_migrations(&pool);

    let state = AppState::build(pool, &config).expect("failed to wire application state");

    log::info!(
        "Starting server at http://{}:{}",
        config.host,
        config.port
    );

    build_server(state, &config.host, config.port)?.await
}
