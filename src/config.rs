use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::DEFAULT_RECOMMENDED_THRESHOLD;
use crate::models::{PartnerWeights, SessionWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub appwrite: AppwriteSettings,
    #[serde(default)]
    pub collection: CollectionSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default)]
    pub enable_debug_routes: bool,
}

/// Document store connection; an empty endpoint selects the in-memory store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppwriteSettings {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_users_collection")]
    pub users: String,
    #[serde(default = "default_sessions_collection")]
    pub sessions: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            users: default_users_collection(),
            sessions: default_sessions_collection(),
        }
    }
}

fn default_users_collection() -> String { "users".to_string() }
fn default_sessions_collection() -> String { "sessions".to_string() }

/// Interest ledger database; an empty url selects the in-memory ledger
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Profile cache; an empty redis url disables caching
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_university_domain")]
    pub university_domain: String,
    #[serde(default = "default_true")]
    pub require_verified_email: bool,
}

fn default_university_domain() -> String { "columbia.edu".to_string() }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_partner_feed_limit")]
    pub partner_feed_limit: usize,
    #[serde(default = "default_max_partner_feed_limit")]
    pub max_partner_feed_limit: usize,
    #[serde(default = "default_session_feed_limit")]
    pub session_feed_limit: usize,
    #[serde(default = "default_recommended_threshold")]
    pub recommended_threshold: u8,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            partner_feed_limit: default_partner_feed_limit(),
            max_partner_feed_limit: default_max_partner_feed_limit(),
            session_feed_limit: default_session_feed_limit(),
            recommended_threshold: default_recommended_threshold(),
        }
    }
}

fn default_partner_feed_limit() -> usize { 25 }
fn default_max_partner_feed_limit() -> usize { 50 }
fn default_session_feed_limit() -> usize { 50 }
fn default_recommended_threshold() -> u8 { DEFAULT_RECOMMENDED_THRESHOLD }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub partner: PartnerWeightsConfig,
    #[serde(default)]
    pub session: SessionWeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerWeightsConfig {
    #[serde(default = "default_partner_baseline")]
    pub baseline: i32,
    #[serde(default = "default_shared_course_bonus")]
    pub shared_course_bonus: i32,
    #[serde(default = "default_per_shared_tag")]
    pub per_shared_tag: i32,
    #[serde(default = "default_max_tag_bonus")]
    pub max_tag_bonus: i32,
}

impl Default for PartnerWeightsConfig {
    fn default() -> Self {
        Self {
            baseline: default_partner_baseline(),
            shared_course_bonus: default_shared_course_bonus(),
            per_shared_tag: default_per_shared_tag(),
            max_tag_bonus: default_max_tag_bonus(),
        }
    }
}

impl From<&PartnerWeightsConfig> for PartnerWeights {
    fn from(config: &PartnerWeightsConfig) -> Self {
        Self {
            baseline: config.baseline,
            shared_course_bonus: config.shared_course_bonus,
            per_shared_tag: config.per_shared_tag,
            max_tag_bonus: config.max_tag_bonus,
        }
    }
}

fn default_partner_baseline() -> i32 { 35 }
fn default_shared_course_bonus() -> i32 { 45 }
fn default_per_shared_tag() -> i32 { 7 }
fn default_max_tag_bonus() -> i32 { 20 }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionWeightsConfig {
    #[serde(default)]
    pub baseline: i32,
    #[serde(default = "default_course_match_bonus")]
    pub course_match_bonus: i32,
    #[serde(default = "default_per_shared_goal")]
    pub per_shared_goal: i32,
    #[serde(default = "default_max_goal_bonus")]
    pub max_goal_bonus: i32,
    #[serde(default = "default_availability_bonus")]
    pub availability_bonus: i32,
}

impl Default for SessionWeightsConfig {
    fn default() -> Self {
        Self {
            baseline: 0,
            course_match_bonus: default_course_match_bonus(),
            per_shared_goal: default_per_shared_goal(),
            max_goal_bonus: default_max_goal_bonus(),
            availability_bonus: default_availability_bonus(),
        }
    }
}

impl From<&SessionWeightsConfig> for SessionWeights {
    fn from(config: &SessionWeightsConfig) -> Self {
        Self {
            baseline: config.baseline,
            course_match_bonus: config.course_match_bonus,
            per_shared_goal: config.per_shared_goal,
            max_goal_bonus: config.max_goal_bonus,
            availability_bonus: config.availability_bonus,
        }
    }
}

fn default_course_match_bonus() -> i32 { 70 }
fn default_per_shared_goal() -> i32 { 10 }
fn default_max_goal_bonus() -> i32 { 20 }
fn default_availability_bonus() -> i32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LIONLINK__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LIONLINK__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("LIONLINK")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
