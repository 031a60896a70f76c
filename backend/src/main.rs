use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::auth::{AuthMiddleware, TokenService};
use backend::config::Config;
use backend::profile::otp::RedisOtpStore;
use backend::profile::usecase::ProfileUseCaseImpl;
use backend::registration::repository::RegistrationRepositoryImpl;
use backend::third_party::{
    CloudinaryService, Fast2SmsService, GoogleOAuthService, IdentityProvider, MediaStorage, SmsSender, Unconfigured,
};
use backend::tournament::repository::TournamentRepositoryImpl;
use backend::user::rate_limit::RedisLoginRateLimiter;
use backend::user::repository::UserRepositoryImpl;
use backend::user::usecase::AuthUseCaseImpl;
use log::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn identity_provider(config: &Config) -> Arc<dyn IdentityProvider> {
    match (&config.google_oauth.client_id, &config.google_oauth.client_secret) {
        (Some(id), Some(secret)) => Arc::new(GoogleOAuthService::new(
            id.clone(),
            secret.clone(),
            config.google_oauth.callback_url.clone(),
        )),
        _ => Arc::new(Unconfigured("Google sign-in")),
    }
}

fn media_storage(config: &Config) -> Arc<dyn MediaStorage> {
    let c = &config.cloudinary;
    match (&c.cloud_name, &c.api_key, &c.api_secret) {
        (Some(cloud), Some(key), Some(secret)) => {
            Arc::new(CloudinaryService::new(cloud.clone(), key.clone(), secret.clone()))
        }
        _ => Arc::new(Unconfigured("Cloudinary")),
    }
}

fn sms_sender(config: &Config) -> Arc<dyn SmsSender> {
    match &config.sms.api_key {
        Some(key) => Arc::new(Fast2SmsService::new(config.sms.api_url.clone(), key.clone())),
        None => Arc::new(Unconfigured("SMS gateway")),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let redis_client = match redis::Client::open(config.redis.url.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Redis client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()));
        }
    };

    let conn = match arangors::Connection::establish_basic_auth(
        &config.database.url,
        &config.database.username,
        &config.database.password,
    )
    .await
    {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to connect to ArangoDB: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()));
        }
    };

    let db = match conn.db(&config.database.name).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open ArangoDB database '{}': {}", config.database.name, e);
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()));
        }
    };

    if let Err(e) = backend::db::ensure_collections(&db).await {
        error!("Failed to prepare collections: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }

    let tokens = Arc::new(TokenService::new(&config.jwt.secret, config.jwt.expires_in_secs));

    let user_repo = UserRepositoryImpl { db: db.clone() };
    let tournament_repo = TournamentRepositoryImpl { db: db.clone() };
    let registration_repo = RegistrationRepositoryImpl { db: db.clone() };

    let auth_usecase = web::Data::new(AuthUseCaseImpl {
        users: user_repo.clone(),
        identity: identity_provider(&config),
        tokens: tokens.clone(),
    });
    let profile_usecase = web::Data::new(ProfileUseCaseImpl {
        users: user_repo.clone(),
        media: media_storage(&config),
        otp: Arc::new(RedisOtpStore { client: redis_client.clone() }),
        sms: sms_sender(&config),
    });
    let login_limiter = web::Data::new(RedisLoginRateLimiter { client: redis_client.clone() });

    let db_data = web::Data::new(db);
    let redis_data = web::Data::new(redis_client);
    let user_repo = web::Data::new(user_repo);
    let tournament_repo = web::Data::new(tournament_repo);
    let registration_repo = web::Data::new(registration_repo);
    let openapi = backend::openapi::ApiDoc::openapi();

    let workers = config.server.workers;
    log::info!("Starting server on {}:{} with {} workers", config.server.host, config.server.port, workers);

    HttpServer::new(move || {
        App::new()
            .wrap(backend::middleware::Logger)
            .wrap(backend::middleware::cors_middleware())
            .app_data(web::JsonConfig::default().limit(256 * 1024))
            .app_data(db_data.clone())
            .app_data(redis_data.clone())
            .app_data(user_repo.clone())
            .app_data(tournament_repo.clone())
            .app_data(registration_repo.clone())
            .app_data(auth_usecase.clone())
            .app_data(profile_usecase.clone())
            .app_data(login_limiter.clone())
            .service(backend::health::health_check)
            .service(backend::health::detailed_health_check)
            .service(
                web::scope("/auth")
                    .service(backend::user::controller::signup_handler)
                    .service(backend::user::controller::login_handler)
                    .service(backend::user::controller::google_redirect_handler)
                    .service(backend::user::controller::google_callback_handler),
            )
            .service(
                web::scope("/profile")
                    .wrap(AuthMiddleware { tokens: tokens.clone() })
                    .service(backend::profile::controller::get_profile_handler)
                    .service(backend::profile::controller::update_profile_handler)
                    .service(backend::profile::controller::delete_profile_handler)
                    .service(backend::profile::controller::upload_profile_picture_handler)
                    .service(backend::profile::controller::upload_portfolio_handler)
                    .service(backend::profile::controller::upload_document_handler)
                    .service(backend::profile::controller::request_phone_verification_handler)
                    .service(backend::profile::controller::verify_phone_handler),
            )
            .service(
                web::scope("/tournaments")
                    .service(backend::tournament::controller::create_tournament_handler)
                    .service(backend::tournament::controller::list_tournaments_handler)
                    .service(backend::tournament::controller::get_tournament_handler),
            )
            // Public; must be registered ahead of the authenticated scope sharing its prefix
            .service(backend::registration::controller::participants_handler)
            .service(
                web::scope("/tournament-registrations")
                    .wrap(AuthMiddleware { tokens: tokens.clone() })
                    .service(backend::registration::controller::register_handler)
                    .service(backend::registration::controller::my_tournaments_handler)
                    .service(backend::registration::controller::update_status_handler),
            )
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .workers(workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
