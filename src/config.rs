use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub swap: SwapConfig,
    #[serde(default)]
    pub referral: ReferralConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// 多语言设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub main_language: String,
    pub languages: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            main_language: "en".to_string(),
            languages: vec!["en".to_string(), "vi".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// 奖品为抽奖券时延迟发放（秒）
    pub ticket_prize_delay_secs: u64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            ticket_prize_delay_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    /// 兑换合约地址（链上交易抓取对象）
    pub contract_address: String,
    /// POINT 兑换时写入签名载荷的 jetton 钱包地址
    pub jetton_wallet_address: String,
    /// base64 编码的 ed25519 私钥（32 字节）
    pub signing_key: String,
    pub ton_api_url: String,
    #[serde(default)]
    pub ton_api_key: Option<String>,
    pub daily_limit: u64,
    pub max_checks: i32,
    pub crawl_interval_secs: u64,
    pub settle_interval_secs: u64,
    pub settle_batch_size: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            jetton_wallet_address: String::new(),
            signing_key: String::new(),
            ton_api_url: "https://tonapi.io".to_string(),
            ton_api_key: None,
            daily_limit: 400,
            max_checks: 5,
            crawl_interval_secs: 5,
            settle_interval_secs: 30,
            settle_batch_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    pub referrer_reward: i64,
    pub referred_reward: i64,
    pub referrer_tickets: u32,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            referrer_reward: 1000,
            referred_reward: 500,
            referrer_tickets: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: String,
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

macro_rules! override_parse {
    ($target:expr, $name:literal) => {
        if let Ok(v) = env::var($name)
            && let Ok(p) = v.parse()
        {
            $target = p;
        }
    };
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("解析配置文件失败: {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow!("缺少 DATABASE_URL 环境变量，且未找到配置文件 {config_path}")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    app: AppConfig::default(),
                    wheel: WheelConfig::default(),
                    swap: SwapConfig::default(),
                    referral: ReferralConfig::default(),
                    seed: SeedConfig::default(),
                }
            }
            Err(e) => {
                return Err(anyhow!("无法读取配置文件 {config_path}: {e}"));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        override_parse!(self.server.port, "SERVER_PORT");
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        override_parse!(self.database.max_connections, "DB_MAX_CONNECTIONS");
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        override_parse!(self.jwt.access_token_expires_in, "JWT_ACCESS_EXPIRES_IN");
        override_parse!(self.jwt.refresh_token_expires_in, "JWT_REFRESH_EXPIRES_IN");

        if let Ok(v) = env::var("APP_MAIN_LANGUAGE") {
            self.app.main_language = v;
        }
        if let Ok(v) = env::var("APP_LANGUAGES") {
            self.app.languages = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        override_parse!(self.wheel.ticket_prize_delay_secs, "WHEEL_TICKET_PRIZE_DELAY_SECS");

        if let Ok(v) = env::var("SWAP_CONTRACT_ADDRESS") {
            self.swap.contract_address = v;
        }
        if let Ok(v) = env::var("SWAP_JETTON_WALLET_ADDRESS") {
            self.swap.jetton_wallet_address = v;
        }
        if let Ok(v) = env::var("SWAP_SIGNING_KEY") {
            self.swap.signing_key = v;
        }
        if let Ok(v) = env::var("TON_API_URL") {
            self.swap.ton_api_url = v;
        }
        if let Ok(v) = env::var("TON_API_KEY") {
            self.swap.ton_api_key = Some(v);
        }
        override_parse!(self.swap.daily_limit, "SWAP_DAILY_LIMIT");
        override_parse!(self.swap.max_checks, "SWAP_MAX_CHECKS");
        override_parse!(self.swap.crawl_interval_secs, "SWAP_CRAWL_INTERVAL_SECS");
        override_parse!(self.swap.settle_interval_secs, "SWAP_SETTLE_INTERVAL_SECS");
        override_parse!(self.swap.settle_batch_size, "SWAP_SETTLE_BATCH_SIZE");

        override_parse!(self.referral.referrer_reward, "REFERRAL_REFERRER_REWARD");
        override_parse!(self.referral.referred_reward, "REFERRAL_REFERRED_REWARD");
        override_parse!(self.referral.referrer_tickets, "REFERRAL_REFERRER_TICKETS");

        if let Ok(v) = env::var("SEED_ADMIN_EMAIL") {
            self.seed.admin_email = v;
        }
        if let Ok(v) = env::var("SEED_ADMIN_PASSWORD") {
            self.seed.admin_password = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_section_defaults() {
        let raw = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "postgres://localhost/points"
max_connections = 5

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.app.main_language, "en");
        assert_eq!(config.swap.max_checks, 5);
        assert_eq!(config.swap.daily_limit, 400);
        assert_eq!(config.wheel.ticket_prize_delay_secs, 3);
        assert!(config.seed.admin_email.is_empty());
    }

    #[test]
    fn test_swap_section_parses() {
        let raw = r#"
[server]
host = "0.0.0.0"
port = 8080

[database]
url = "postgres://localhost/points"
max_connections = 5

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120

[swap]
contract_address = "EQcontract"
jetton_wallet_address = "EQwallet"
signing_key = ""
ton_api_url = "https://testnet.tonapi.io"
daily_limit = 10
max_checks = 3
crawl_interval_secs = 5
settle_interval_secs = 30
settle_batch_size = 20
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.swap.contract_address, "EQcontract");
        assert_eq!(config.swap.ton_api_key, None);
        assert_eq!(config.swap.max_checks, 3);
    }
}
