use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Flat delivery fee in cents, charged on delivery orders at checkout.
    pub delivery_fee: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let delivery_fee = env::var("DELIVERY_FEE")
            .ok()
            .and_then(|f| f.parse::<i64>().ok())
            .unwrap_or(2500);
        Ok(Self {
            port,
            database_url,
            host,
            delivery_fee,
        })
    }
}
