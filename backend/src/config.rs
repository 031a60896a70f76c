use std::env;
use dotenv::dotenv;
use serde::Deserialize;
use log::{info, warn};

type ConfigResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEFAULT_JWT_SECRET: &str = "dev-only-change-me";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub google_oauth: GoogleOAuthConfig,
    pub cloudinary: CloudinaryConfig,
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub callback_url: String,
}

impl GoogleOAuthConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl CloudinaryConfig {
    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

fn required(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| format!("{} must be set in production", name).into())
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    fn parse_backend_url(url: &str) -> (String, u16) {
        // BACKEND_URL like "http://0.0.0.0:3000"
        if let Ok(parsed_url) = url::Url::parse(url) {
            let host = parsed_url.host_str().unwrap_or("127.0.0.1").to_string();
            let port = parsed_url.port().unwrap_or(3000);
            (host, port)
        } else {
            ("127.0.0.1".to_string(), 3000)
        }
    }

    fn load_env_files() {
        if let Some(env_file_path) = optional("ENV_FILE_PATH") {
            info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
            dotenv::from_filename(&env_file_path).ok();
            return;
        }

        dotenv().ok();
        // .env.<environment> overrides the base file outside development
        let environment_hint = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);
        let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
        if env_file != ".env.development" {
            let _ = dotenv::from_filename(&env_file);
        }
    }

    pub fn load() -> ConfigResult<Self> {
        Self::load_env_files();

        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);

        info!("Loading configuration for environment: {:?}", environment);

        let config = Config {
            environment: environment.clone(),
            server: Self::load_server_config(&environment),
            database: Self::load_database_config(&environment)?,
            redis: Self::load_redis_config(&environment)?,
            jwt: Self::load_jwt_config(&environment)?,
            google_oauth: Self::load_google_oauth_config(),
            cloudinary: Self::load_cloudinary_config(),
            sms: Self::load_sms_config(),
        };

        config.validate()?;
        config.log_configuration();

        Ok(config)
    }

    fn load_server_config(env: &Environment) -> ServerConfig {
        let backend_url = env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://0.0.0.0:3000".to_string());
        let (host, port) = Self::parse_backend_url(&backend_url);
        let default_workers = match env {
            Environment::Production => 8,
            Environment::Development | Environment::Test => 1,
        };

        ServerConfig {
            // SERVER_HOST takes precedence over the BACKEND_URL host
            host: env::var("SERVER_HOST").unwrap_or(host),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(port),
            workers: env::var("BACKEND_WORKERS")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(default_workers),
        }
    }

    fn load_database_config(env: &Environment) -> ConfigResult<DatabaseConfig> {
        Ok(match env {
            Environment::Development => DatabaseConfig {
                url: env::var("ARANGO_URL").unwrap_or_else(|_| {
                    warn!("ARANGO_URL not found in environment, using default");
                    "http://localhost:8529".to_string()
                }),
                name: env::var("ARANGO_DB").unwrap_or_else(|_| "arena_dev".to_string()),
                username: env::var("ARANGO_USERNAME").unwrap_or_else(|_| "root".to_string()),
                password: env::var("ARANGO_PASSWORD").unwrap_or_else(|_| "test".to_string()),
            },
            Environment::Production => DatabaseConfig {
                url: required("ARANGO_URL")?,
                name: required("ARANGO_DB")?,
                username: required("ARANGO_USERNAME")?,
                password: required("ARANGO_PASSWORD")?,
            },
            Environment::Test => DatabaseConfig {
                url: env::var("ARANGO_URL").unwrap_or_else(|_| "http://test-arangodb:8529".to_string()),
                name: env::var("ARANGO_DB").unwrap_or_else(|_| "arena_test".to_string()),
                username: env::var("ARANGO_USERNAME").unwrap_or_else(|_| "root".to_string()),
                password: env::var("ARANGO_PASSWORD").unwrap_or_else(|_| "test".to_string()),
            },
        })
    }

    fn load_redis_config(env: &Environment) -> ConfigResult<RedisConfig> {
        let url = match env {
            Environment::Development => {
                env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string())
            }
            Environment::Production => required("REDIS_URL")?,
            Environment::Test => {
                env::var("REDIS_URL").unwrap_or_else(|_| "redis://test-redis:6379/".to_string())
            }
        };
        Ok(RedisConfig { url })
    }

    fn load_jwt_config(env: &Environment) -> ConfigResult<JwtConfig> {
        let secret = match env {
            Environment::Production => required("JWT_SECRET")?,
            Environment::Development | Environment::Test => {
                env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string())
            }
        };
        Ok(JwtConfig {
            secret,
            expires_in_secs: env::var("JWT_EXPIRES_IN_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86_400),
        })
    }

    fn load_google_oauth_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: optional("GOOGLE_CLIENT_ID"),
            client_secret: optional("GOOGLE_CLIENT_SECRET"),
            callback_url: env::var("GOOGLE_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/google/callback".to_string()),
        }
    }

    fn load_cloudinary_config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: optional("CLOUDINARY_CLOUD_NAME"),
            api_key: optional("CLOUDINARY_API_KEY"),
            api_secret: optional("CLOUDINARY_API_SECRET"),
        }
    }

    fn load_sms_config() -> SmsConfig {
        SmsConfig {
            api_url: env::var("FAST2SMS_API_URL")
                .unwrap_or_else(|_| "https://www.fast2sms.com/dev/bulkV2".to_string()),
            api_key: optional("FAST2SMS_API_KEY"),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.environment == Environment::Production {
            if self.database.password == "test" {
                return Err("Production database password cannot be 'test'".into());
            }
            if self.jwt.secret.is_empty() || self.jwt.secret == DEFAULT_JWT_SECRET {
                return Err("Production JWT_SECRET must be set to a non-default value".into());
            }
        }

        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }

        if self.jwt.expires_in_secs <= 0 {
            return Err("JWT_EXPIRES_IN_SECS must be positive".into());
        }

        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!("Server: {}:{} (workers: {})", self.server.host, self.server.port, self.server.workers);
        info!("Database: {} at {}", self.database.name, self.database.url);
        info!("Redis: {}", self.redis.url);

        if !self.google_oauth.is_configured() {
            warn!("Google OAuth not configured - /auth/google will be unavailable");
        }
        if !self.cloudinary.is_configured() {
            warn!("Cloudinary not configured - profile uploads will be unavailable");
        }
        if self.sms.api_key.is_none() {
            warn!("FAST2SMS_API_KEY not configured - phone verification codes cannot be sent");
        }
        if self.environment == Environment::Development {
            warn!("Running in development mode - some security features are disabled");
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
