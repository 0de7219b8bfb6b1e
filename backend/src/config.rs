use anyhow::{bail, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_user: String,
    pub db_pass: String,
    pub db_cluster: String,
    pub db_name: String,
    pub db_collection: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let db_user = lookup("DB_USER").filter(|v| !v.is_empty());
        let db_pass = lookup("DB_PASS").filter(|v| !v.is_empty());
        let (Some(db_user), Some(db_pass)) = (db_user, db_pass) else {
            bail!("database credentials are missing: DB_USER and DB_PASS must be set");
        };

        Ok(Self {
            db_user,
            db_pass,
            db_cluster: var("DB_CLUSTER", "cluster0.q9gvb.mongodb.net"),
            db_name: var("DB_NAME", "ProductsKingDB"),
            db_collection: var("DB_COLLECTION", "product"),
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "5000")
                .parse()
                .context("PORT must be a valid number")?,
        })
    }

    pub fn mongodb_uri(&self) -> String {
        format!(
            "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
            self.db_user, self.db_pass, self.db_cluster
        )
    }
}
