use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Staging,
    Production,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "staging" | "stage" => Ok(AppEnv::Staging),
            "production" | "prod" => Ok(AppEnv::Production),
            other => anyhow::bail!(
                "APP_ENV must be development, staging or production, got '{}'",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: AppEnv,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub sales_email_address: String,
    pub mail_from_address: String,
    /// Relay endpoint for outgoing mail; mail is only logged when unset.
    pub mail_webhook_url: Option<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            env: var("APP_ENV")
                .map(|env| env.parse::<AppEnv>())
                .transpose()?
                .unwrap_or(AppEnv::Development),
            database_url: var("DB_URL")
                .or_else(|| var("DATABASE_URL"))
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive number"))?,
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            sales_email_address: var("SALES_EMAIL_ADDRESS")
                .unwrap_or_else(|| "vendas@test.com".to_string()),
            mail_from_address: var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|| "local.system@email.com".to_string()),
            mail_webhook_url: var("MAIL_WEBHOOK_URL")
                .map(|url| {
                    if url::Url::parse(&url).is_err()
                        || (!url.starts_with("http://") && !url.starts_with("https://"))
                    {
                        anyhow::bail!("MAIL_WEBHOOK_URL must be an http:// or https:// URL");
                    }
                    Ok(url)
                })
                .transpose()?,
            rate_limit_per_second: var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a number"))?,
            rate_limit_burst: var("RATE_LIMIT_BURST")
                .unwrap_or_else(|| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a number"))?,
        };

        if config.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if config.rate_limit_per_second == 0 || config.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be at least 1");
        }
        if !crate::validation::is_valid_email(&config.sales_email_address) {
            anyhow::bail!("SALES_EMAIL_ADDRESS must be a valid email address");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded for {:?}", config.env);
        match &config.database_url {
            Some(url) => tracing::debug!("Database URL: {}...", redacted_prefix(url)),
            None => tracing::warn!("No DATABASE_URL set, leads are kept in memory"),
        }
        if let Some(ref relay) = config.mail_webhook_url {
            tracing::info!("Mail relay configured: {}", relay);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Swagger UI and the OpenAPI document are not exposed in production.
    pub fn docs_enabled(&self) -> bool {
        self.env != AppEnv::Production
    }
}

/// First characters of a connection string, enough to tell databases apart in the log.
fn redacted_prefix(url: &str) -> String {
    url.chars().take(20).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.env, AppEnv::Development);
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 3000);
        assert_eq!(config.sales_email_address, "vendas@test.com");
        assert_eq!(config.mail_from_address, "local.system@email.com");
        assert_eq!(config.rate_limit_burst, 20);
        assert!(config.docs_enabled());
    }

    #[test]
    fn test_database_url_must_be_postgres() {
        assert!(load(&[("DATABASE_URL", "mysql://localhost/leads")]).is_err());

        let config = load(&[("DATABASE_URL", "postgres://localhost/leads")]).unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/leads")
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("PORT", "  "), ("DATABASE_URL", "")]).unwrap();

        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&[("PORT", "seventy")]).is_err());
        assert!(load(&[("APP_ENV", "qa")]).is_err());
        assert!(load(&[("MAIL_WEBHOOK_URL", "ftp://relay")]).is_err());
        assert!(load(&[("RATE_LIMIT_BURST", "0")]).is_err());
        assert!(load(&[("SALES_EMAIL_ADDRESS", "sales")]).is_err());
    }

    #[test]
    fn test_logged_url_prefix_respects_multibyte_chars() {
        // The first 'ã' of the password spans bytes 19 and 20
        let url = "postgres://joão:ssãã@db/leads";
        let config = load(&[("DATABASE_URL", url)]).unwrap();

        assert_eq!(config.database_url.as_deref(), Some(url));
        assert_eq!(redacted_prefix(url), "postgres://joão:ssãã");
        assert_eq!(redacted_prefix("postgres://db"), "postgres://db");
    }

    #[test]
    fn test_production_hides_docs() {
        let config = load(&[("APP_ENV", "prod")]).unwrap();
        assert!(!config.docs_enabled());
    }
}
