#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Mistral API key. Only the ingest commands need it.
    pub mistral_api_key: Option<String>,
    pub classifier_base_url: String,
    pub classifier_model: String,
    pub classifier_timeout_secs: u64,
    /// Upper bound on the number of items accepted from one uploaded file.
    pub max_upload_items: usize,
    pub fetch_url: String,
    pub fetch_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "mistral_api_key",
                &self.mistral_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_base_url", &self.classifier_base_url)
            .field("classifier_model", &self.classifier_model)
            .field("classifier_timeout_secs", &self.classifier_timeout_secs)
            .field("max_upload_items", &self.max_upload_items)
            .field("fetch_url", &self.fetch_url)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}
