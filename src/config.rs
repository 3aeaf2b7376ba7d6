use std::env;

/// Session secret used when `APP_ENV=local` and no `SESSION_SECRET` is set.
pub const LOCAL_SESSION_SECRET: &str = "recipebook-local-session-secret";

/// AppConfig
///
/// Holds the application's configuration, loaded once at startup and immutable afterwards.
/// It is pulled out of the application state via `FromRef` by the session extractor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local mode only).
    pub db_url: Option<String>,
    pub db_max_connections: u32,
    // Runtime environment marker. Controls the dev bypass, cookie flags and log format.
    pub env: Env,
    // HMAC secret used to verify session tokens.
    pub session_secret: String,
    // Name of the cookie carrying the session token.
    pub session_cookie: String,
    pub bind_addr: String,
    // Entry point of the external identity provider, linked from the login page.
    // `None` until `LOGIN_URL` is set; the login page then says sign-in is not configured.
    pub login_url: Option<String>,
}

/// Env
///
/// Runtime context: `Local` enables development conveniences, `Production` demands every secret.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            db_url: None,
            db_max_connections: 5,
            env: Env::Local,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_cookie: "session".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            login_url: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production if `DATABASE_URL` or `SESSION_SECRET` is missing, and in any
    /// environment if `DATABASE_MAX_CONNECTIONS` is not a number.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };
        let defaults = Self::default();

        let (db_url, session_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("SESSION_SECRET").expect("FATAL: SESSION_SECRET must be set in production."),
            ),
            // Locally the database is optional (in-memory store) and the secret has a fallback.
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            ),
        };

        let db_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .map(|raw| {
                raw.parse()
                    .expect("FATAL: DATABASE_MAX_CONNECTIONS must be a positive integer")
            })
            .unwrap_or(defaults.db_max_connections);

        Self {
            db_url,
            db_max_connections,
            env,
            session_secret,
            session_cookie: env::var("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            login_url: env::var("LOGIN_URL").ok().filter(|url| !url.is_empty()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == Env::Production
    }
}
