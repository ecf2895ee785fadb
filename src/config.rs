use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_mutation_per_min: u32,
    pub rate_read_per_min: u32,

    // Attendance thresholds (see core::rules for the fixed shift hours)
    pub grace_minutes: i64,
    pub retard_threshold_minutes: i64,
    pub infraction_penalty: f64,
    pub punch_dedup_minutes: i64,
    pub chef_department: String,

    // Read cache
    pub cache_ttl_current_secs: u64,
    pub cache_ttl_closed_secs: u64,

    // Background sync
    pub sync_interval_secs: u64,
    pub sync_min_gap_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            database_url: var_or("DATABASE_URL", "sqlite://pointage.db?mode=rwc"),
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            api_prefix: var_or("API_PREFIX", "/api/v1"),

            rate_mutation_per_min: var_or("RATE_MUTATION_PER_MIN", "120").parse().unwrap(),
            rate_read_per_min: var_or("RATE_READ_PER_MIN", "1000").parse().unwrap(),

            grace_minutes: var_or("GRACE_MINUTES", "30").parse().unwrap(),
            retard_threshold_minutes: var_or("RETARD_THRESHOLD_MINUTES", "10").parse().unwrap(),
            infraction_penalty: var_or("INFRACTION_PENALTY", "30").parse().unwrap(),
            punch_dedup_minutes: var_or("PUNCH_DEDUP_MINUTES", "5").parse().unwrap(),
            chef_department: var_or("CHEF_DEPARTMENT", "Chef_Cuisine"),

            cache_ttl_current_secs: var_or("CACHE_TTL_CURRENT_SECS", "30").parse().unwrap(),
            cache_ttl_closed_secs: var_or("CACHE_TTL_CLOSED_SECS", "300").parse().unwrap(),

            sync_interval_secs: var_or("SYNC_INTERVAL_SECS", "120").parse().unwrap(),
            sync_min_gap_secs: var_or("SYNC_MIN_GAP_SECS", "60").parse().unwrap(),
        }
    }
}
