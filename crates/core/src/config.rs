use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::policy::{CommissionSettings, PricingPolicy, ReferralReward, StudioSettings};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub settings_version: u32,
    pub policy: PricingPolicy,
    pub commission: CommissionSettings,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Percentage,
    Fixed,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_version: 1,
            policy: PricingPolicy {
                profit_percent: Decimal::from(30),
                commission_percent: Decimal::from(10),
                overprice_percent: Decimal::from(15),
            },
            commission: CommissionSettings {
                sales_commission_rate: Decimal::new(5, 2),
                referral_reward: ReferralReward::Percentage(Decimal::new(5, 1)),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for RewardKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(ConfigError::Validation(format!(
                "unsupported referral reward kind `{other}` (expected percentage|fixed)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("atelier.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The versioned settings record the engines accept.
    pub fn studio_settings(&self) -> StudioSettings {
        StudioSettings {
            version: self.settings_version,
            policy: self.policy,
            commission: self.commission.clone(),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(version) = patch.version {
            self.settings_version = version;
        }

        if let Some(policy) = patch.policy {
            if let Some(profit_percent) = policy.profit_percent {
                self.policy.profit_percent = profit_percent;
            }
            if let Some(commission_percent) = policy.commission_percent {
                self.policy.commission_percent = commission_percent;
            }
            if let Some(overprice_percent) = policy.overprice_percent {
                self.policy.overprice_percent = overprice_percent;
            }
        }

        if let Some(commission) = patch.commission {
            if let Some(rate) = commission.sales_commission_rate {
                self.commission.sales_commission_rate = rate;
            }
            self.patch_reward(commission.referral_reward_kind, commission.referral_reward_value);
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn patch_reward(&mut self, kind: Option<RewardKind>, value: Option<Decimal>) {
        let current_value = match self.commission.referral_reward {
            ReferralReward::Percentage(value) | ReferralReward::Fixed(value) => value,
        };
        let current_kind = match self.commission.referral_reward {
            ReferralReward::Percentage(_) => RewardKind::Percentage,
            ReferralReward::Fixed(_) => RewardKind::Fixed,
        };

        let kind = kind.unwrap_or(current_kind);
        let value = value.unwrap_or(current_value);
        self.commission.referral_reward = match kind {
            RewardKind::Percentage => ReferralReward::Percentage(value),
            RewardKind::Fixed => ReferralReward::Fixed(value),
        };
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ATELIER_SETTINGS_VERSION") {
            self.settings_version = parse_u32("ATELIER_SETTINGS_VERSION", &value)?;
        }

        if let Some(value) = read_env("ATELIER_POLICY_PROFIT_PERCENT") {
            self.policy.profit_percent = parse_decimal("ATELIER_POLICY_PROFIT_PERCENT", &value)?;
        }
        if let Some(value) = read_env("ATELIER_POLICY_COMMISSION_PERCENT") {
            self.policy.commission_percent =
                parse_decimal("ATELIER_POLICY_COMMISSION_PERCENT", &value)?;
        }
        if let Some(value) = read_env("ATELIER_POLICY_OVERPRICE_PERCENT") {
            self.policy.overprice_percent =
                parse_decimal("ATELIER_POLICY_OVERPRICE_PERCENT", &value)?;
        }

        if let Some(value) = read_env("ATELIER_COMMISSION_SALES_RATE") {
            self.commission.sales_commission_rate =
                parse_decimal("ATELIER_COMMISSION_SALES_RATE", &value)?;
        }
        let reward_kind = read_env("ATELIER_COMMISSION_REFERRAL_REWARD_KIND")
            .map(|value| value.parse::<RewardKind>())
            .transpose()?;
        let reward_value = read_env("ATELIER_COMMISSION_REFERRAL_REWARD_VALUE")
            .map(|value| parse_decimal("ATELIER_COMMISSION_REFERRAL_REWARD_VALUE", &value))
            .transpose()?;
        if reward_kind.is_some() || reward_value.is_some() {
            self.patch_reward(reward_kind, reward_value);
        }

        let log_level =
            read_env("ATELIER_LOGGING_LEVEL").or_else(|| read_env("ATELIER_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ATELIER_LOGGING_FORMAT").or_else(|| read_env("ATELIER_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings_version == 0 {
            return Err(ConfigError::Validation(
                "version must be greater than zero".to_string(),
            ));
        }

        self.policy.validate().map_err(|error| ConfigError::Validation(error.to_string()))?;

        let rate = self.commission.sales_commission_rate;
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ConfigError::Validation(
                "commission.sales_commission_rate must be in range 0..=1".to_string(),
            ));
        }

        match self.commission.referral_reward {
            ReferralReward::Percentage(share) => {
                if share < Decimal::ZERO || share > Decimal::ONE {
                    return Err(ConfigError::Validation(
                        "commission.referral_reward_value must be in range 0..=1 for the percentage kind".to_string(),
                    ));
                }
            }
            ReferralReward::Fixed(amount) => {
                if amount < Decimal::ZERO {
                    return Err(ConfigError::Validation(
                        "commission.referral_reward_value must be non-negative for the fixed kind"
                            .to_string(),
                    ));
                }
            }
        }

        validate_logging(&self.logging)
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("atelier.toml"), PathBuf::from("config/atelier.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    version: Option<u32>,
    policy: Option<PolicyPatch>,
    commission: Option<CommissionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyPatch {
    profit_percent: Option<Decimal>,
    commission_percent: Option<Decimal>,
    overprice_percent: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct CommissionPatch {
    sales_commission_rate: Option<Decimal>,
    referral_reward_kind: Option<RewardKind>,
    referral_reward_value: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
