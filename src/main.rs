use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use lionlink::config::Settings;
use lionlink::core::Matcher;
use lionlink::models::{PartnerWeights, SessionWeights};
use lionlink::routes::{self, AppState, FeedLimits};
use lionlink::services::{
    AppwriteClient, CacheManager, DocumentStore, IdentityVerifier, InterestLedger, MemoryLedger,
    MemoryStore, PostgresClient, ProfileService, SessionService,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(settings: &Settings) {
    let log_format =
        std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

async fn build_state(settings: &Settings) -> std::io::Result<AppState> {
    // Document store (in-memory when no endpoint is configured)
    let store: Arc<dyn DocumentStore> = if settings.appwrite.endpoint.is_empty() {
        warn!("No Appwrite endpoint configured, using the in-memory document store");
        Arc::new(MemoryStore::new())
    } else {
        let client = AppwriteClient::new(
            settings.appwrite.endpoint.clone(),
            settings.appwrite.api_key.clone(),
            settings.appwrite.project_id.clone(),
            settings.appwrite.database_id.clone(),
        )
        .map_err(|e| {
            error!("Failed to build Appwrite client: {}", e);
            std::io::Error::other(e.to_string())
        })?;
        info!("Appwrite client initialized");
        Arc::new(client)
    };

    // Profile cache (optional - app can work without it)
    let cache = if settings.cache.redis_url.is_empty() {
        info!("No Redis URL configured, profile cache disabled");
        None
    } else {
        let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
        let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

        match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                Some(Arc::new(c))
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running without cache", e);
                None
            }
        }
    };

    // Interest ledger
    let ledger: Arc<dyn InterestLedger> = if settings.database.url.is_empty() {
        warn!("No database URL configured, interest state is kept in memory");
        Arc::new(MemoryLedger::new())
    } else {
        let postgres = PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::other(e.to_string())
        })?;
        info!("PostgreSQL interest ledger initialized");
        Arc::new(postgres)
    };

    let verifier = Arc::new(IdentityVerifier::new(
        &settings.auth.jwt_secret,
        &settings.auth.university_domain,
        settings.auth.require_verified_email,
    ));

    let partner_weights = PartnerWeights::from(&settings.scoring.partner);
    let session_weights = SessionWeights::from(&settings.scoring.session);
    let matcher = Matcher::new(
        partner_weights,
        session_weights,
        settings.matching.recommended_threshold,
    );

    info!(
        "Matcher initialized with weights: {:?} / {:?}",
        partner_weights, session_weights
    );

    Ok(AppState {
        profiles: ProfileService::new(store.clone(), settings.collection.users.clone(), cache),
        sessions: SessionService::new(store.clone(), settings.collection.sessions.clone()),
        store,
        ledger,
        verifier,
        matcher,
        limits: FeedLimits {
            partner_default: settings.matching.partner_feed_limit,
            partner_max: settings.matching.max_partner_feed_limit,
            sessions: settings.matching.session_feed_limit,
        },
        users_collection: settings.collection.users.clone(),
        debug_routes: settings.server.enable_debug_routes,
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    init_logging(&settings);

    info!("Starting LionLink matching service...");

    let app_state = build_state(&settings).await?;

    if app_state.debug_routes {
        warn!("Debug routes are enabled");
    }

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
