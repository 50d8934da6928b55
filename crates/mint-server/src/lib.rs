use actix_web::http::header::HeaderValue;
use db::config::DbConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    pubkey::Pubkey,
    signer::{Signer, keypair::Keypair},
};
use std::path::PathBuf;
use url::Url;

pub mod api;
pub mod error;
pub mod mint_worker;

fn match_wildcard(pat: &str, origin: &HeaderValue) -> bool {
    let Ok(mut origin_str) = origin.to_str() else {
        return false;
    };

    let mut segments = pat.split('*');

    let Some(first) = segments.next() else {
        return false;
    };
    origin_str = match origin_str.strip_prefix(first) {
        Some(s) => s,
        None => return false,
    };

    for s in segments {
        if s.is_empty() {
            continue;
        }
        match origin_str.find(s) {
            Some(pos) => {
                let wildcard = &origin_str[..pos];
                if !wildcard.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return false;
                }
                origin_str = &origin_str[pos..];
            }
            None => {
                return false;
            }
        }
    }

    true
}

#[derive(Deserialize, Clone)]
pub struct SolanaConfig {
    #[serde(default = "SolanaConfig::default_url")]
    pub url: String,
    #[serde(default = "SolanaConfig::default_cluster")]
    pub cluster: String,
    /// Secret key of the wallet that signs mints, transfers and royalty
    /// updates. Either bs58 or a JSON array of 64 bytes.
    pub creator_keypair: String,
    /// Wallet order payments are sent to.
    #[serde(default, with = "solana_nft::pubkey::opt")]
    pub backend_wallet: Option<Pubkey>,
    #[serde(default = "SolanaConfig::default_priority_fee")]
    pub priority_fee_micro_lamports: u64,
}

impl SolanaConfig {
    pub fn default_url() -> String {
        "https://api.devnet.solana.com".to_owned()
    }

    pub fn default_cluster() -> String {
        "devnet".to_owned()
    }

    pub fn default_priority_fee() -> u64 {
        10_000
    }
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            cluster: Self::default_cluster(),
            creator_keypair: String::new(),
            backend_wallet: None,
            priority_fee_micro_lamports: Self::default_priority_fee(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct PinataConfig {
    pub api_key: String,
    pub secret_api_key: String,
    /// Short-lived token handed out to browser clients for direct uploads.
    pub jwt: Option<String>,
    #[serde(default = "PinataConfig::default_gateway")]
    pub gateway: String,
}

impl PinataConfig {
    pub fn default_gateway() -> String {
        pinata_api::DEFAULT_GATEWAY_URL.to_owned()
    }

    pub fn client(&self) -> pinata_api::Pinata {
        pinata_api::Pinata::new(
            reqwest::Client::new(),
            self.api_key.clone(),
            self.secret_api_key.clone(),
        )
        .with_gateway(self.gateway.clone())
    }
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_api_key: String::new(),
            jwt: None,
            gateway: Self::default_gateway(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct OrdersConfig {
    /// Fee in SOL an order must pay before its NFT is minted.
    #[serde(
        default = "OrdersConfig::default_mint_fee_sol",
        with = "rust_decimal::serde::float"
    )]
    pub mint_fee_sol: Decimal,
    /// How long an order may sit unpaid before it expires.
    #[serde(default = "OrdersConfig::default_timeout_minutes")]
    pub timeout_minutes: i64,
    #[serde(default = "OrdersConfig::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl OrdersConfig {
    pub fn default_mint_fee_sol() -> Decimal {
        Decimal::new(5, 2)
    }

    pub fn default_timeout_minutes() -> i64 {
        10
    }

    pub fn default_sweep_interval_secs() -> u64 {
        3600
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            mint_fee_sol: Self::default_mint_fee_sol(),
            timeout_minutes: Self::default_timeout_minutes(),
            sweep_interval_secs: Self::default_sweep_interval_secs(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: String,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub solana: SolanaConfig,
    pub pinata: PinataConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub db: Option<DbConfig>,
    #[serde(default = "Config::default_local_storage")]
    pub local_storage: PathBuf,
    /// Site identified to wallets in Phantom deep links.
    #[serde(default)]
    pub frontend_url: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            cors_origins: Vec::new(),
            solana: SolanaConfig::default(),
            pinata: PinataConfig::default(),
            orders: OrdersConfig::default(),
            db: None,
            local_storage: Self::default_local_storage(),
            frontend_url: None,
        }
    }
}

impl Config {
    pub fn default_host() -> String {
        "127.0.0.1".to_owned()
    }

    pub fn default_port() -> u16 {
        8080
    }

    pub fn default_local_storage() -> PathBuf {
        PathBuf::from("./local_storage")
    }

    pub fn get_config() -> Self {
        match std::env::args().nth(1) {
            Some(s) => if s == "-" {
                use std::io::Read;
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|error| {
                        tracing::error!("Error reading STDIN: {}", error);
                    })
                    .map(move |_| buf)
            } else {
                std::fs::read_to_string(s).map_err(|error| {
                    tracing::error!("Error reading config: {}", error);
                })
            }
            .and_then(|s| {
                toml::from_str(&s).map_err(|error| {
                    tracing::error!("Error parsing config: {}", error);
                })
            })
            .map_err(|_| {
                tracing::warn!("Invalid config file, using default");
            })
            .unwrap_or_default(),
            None => {
                tracing::info!("No config specified, using default");
                Config::default()
            }
        }
    }

    pub fn order_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.orders.timeout_minutes)
    }

    /// Origin reported to wallets in deep links, the frontend if one is
    /// configured, otherwise this server.
    pub fn frontend_origin(&self) -> String {
        match &self.frontend_url {
            Some(url) => url.as_str().trim_end_matches('/').to_owned(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    /// Build a CORS middleware.
    pub fn cors(&self) -> actix_cors::Cors {
        let mut cors = actix_cors::Cors::default()
            .allow_any_header()
            .allow_any_method()
            .supports_credentials();
        for origin in &self.cors_origins {
            if origin.contains('*') {
                let pattern = origin.clone();
                cors = cors.allowed_origin_fn(move |origin, _| match_wildcard(&pattern, origin));
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors
    }
}

/// RPC connection and signing key shared by request handlers and the mint
/// worker.
pub struct SolanaContext {
    pub client: RpcClient,
    pub creator: Keypair,
    backend_wallet: Option<Pubkey>,
    pub cluster: String,
    pub priority_fee_micro_lamports: u64,
}

impl SolanaContext {
    pub fn new(config: &SolanaConfig) -> crate::error::Result<Self> {
        let creator = solana_nft::keypair::load_keypair(&config.creator_keypair)
            .map_err(crate::error::Error::Solana)?;
        Ok(Self {
            client: RpcClient::new(config.url.clone()),
            creator,
            backend_wallet: config.backend_wallet,
            cluster: config.cluster.clone(),
            priority_fee_micro_lamports: config.priority_fee_micro_lamports,
        })
    }

    pub fn creator_pubkey(&self) -> Pubkey {
        self.creator.pubkey()
    }

    pub fn backend_wallet(&self) -> crate::error::Result<Pubkey> {
        self.backend_wallet
            .ok_or_else(|| crate::error::Error::not_configured("solana.backend_wallet"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_wildcard() {
        assert!(match_wildcard(
            "https://mint-git-*-acme.vercel.app",
            &HeaderValue::from_static("https://mint-git-master-acme.vercel.app"),
        ));
        assert!(match_wildcard(
            "https://mint-git-*-acme.vercel.app",
            &HeaderValue::from_static("https://mint-git-orders-acme.vercel.app"),
        ));
        assert!(match_wildcard(
            "https://mint-*-acme.vercel.app",
            &HeaderValue::from_static("https://mint-qv9tx6vxs-acme.vercel.app"),
        ));
        assert!(!match_wildcard(
            "https://mint-*-acme.vercel.app",
            &HeaderValue::from_static("https://mint-qv9tx6vxs-fake-acme.vercel.app"),
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str(
            r#"
            [solana]
            creator_keypair = "key"

            [pinata]
            api_key = "k"
            secret_api_key = "s"
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.solana.cluster, "devnet");
        assert_eq!(config.solana.priority_fee_micro_lamports, 10_000);
        assert_eq!(config.orders.mint_fee_sol, Decimal::new(5, 2));
        assert_eq!(config.orders.timeout_minutes, 10);
        assert_eq!(config.orders.sweep_interval_secs, 3600);
        assert_eq!(config.pinata.gateway, pinata_api::DEFAULT_GATEWAY_URL);
        assert!(config.db.is_none());
    }

    #[test]
    fn test_config_sections() {
        let config: Config = toml::from_str(
            r#"
            port = 9000
            cors_origins = ["https://mint.acme.app"]
            frontend_url = "https://mint.acme.app/"

            [solana]
            url = "https://api.mainnet-beta.solana.com"
            cluster = "mainnet-beta"
            creator_keypair = "key"
            backend_wallet = "11111111111111111111111111111111"

            [pinata]
            api_key = "k"
            secret_api_key = "s"
            gateway = "https://my.gateway"

            [orders]
            mint_fee_sol = 0.1
            timeout_minutes = 30

            [db]
            user = "postgres"
            password = "password"
            dbname = "nfts"
            host = "127.0.0.1"
            port = 5432
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.solana.cluster, "mainnet-beta");
        assert!(config.solana.backend_wallet.is_some());
        assert_eq!(config.orders.mint_fee_sol, Decimal::new(1, 1));
        assert_eq!(config.order_ttl(), chrono::Duration::minutes(30));
        assert_eq!(config.frontend_origin(), "https://mint.acme.app");
        assert!(config.db.is_some());
    }

    #[test]
    fn test_config_requires_solana_section() {
        assert!(toml::from_str::<Config>("port = 8080").is_err());
    }
}
