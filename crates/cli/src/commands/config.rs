use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use atelier_core::config::AppConfig;
use atelier_core::ReferralReward;
use toml::Value;

/// Renders the effective configuration with per-field source attribution
/// (env > file > default).
pub fn run(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let (reward_kind, reward_value) = match config.commission.referral_reward {
        ReferralReward::Percentage(value) => ("percentage", value),
        ReferralReward::Fixed(value) => ("fixed", value),
    };

    let fields: Vec<(&str, String, Option<&str>)> = vec![
        ("version", config.settings_version.to_string(), Some("ATELIER_SETTINGS_VERSION")),
        (
            "policy.profit_percent",
            config.policy.profit_percent.to_string(),
            Some("ATELIER_POLICY_PROFIT_PERCENT"),
        ),
        (
            "policy.commission_percent",
            config.policy.commission_percent.to_string(),
            Some("ATELIER_POLICY_COMMISSION_PERCENT"),
        ),
        (
            "policy.overprice_percent",
            config.policy.overprice_percent.to_string(),
            Some("ATELIER_POLICY_OVERPRICE_PERCENT"),
        ),
        (
            "commission.sales_commission_rate",
            config.commission.sales_commission_rate.to_string(),
            Some("ATELIER_COMMISSION_SALES_RATE"),
        ),
        (
            "commission.referral_reward_kind",
            reward_kind.to_string(),
            Some("ATELIER_COMMISSION_REFERRAL_REWARD_KIND"),
        ),
        (
            "commission.referral_reward_value",
            reward_value.to_string(),
            Some("ATELIER_COMMISSION_REFERRAL_REWARD_VALUE"),
        ),
        ("logging.level", config.logging.level.clone(), Some("ATELIER_LOGGING_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format).to_lowercase(), None),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_var) in fields {
        let source =
            field_source(key, env_var, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(format!("  {key} = {value}  [{source}]"));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("atelier.toml"), PathBuf::from("config/atelier.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key: &str,
    env_var: Option<&str>,
    doc: Option<&Value>,
    path: Option<&Path>,
) -> String {
    if let Some(var) = env_var {
        if env::var(var).map(|value| !value.trim().is_empty()).unwrap_or(false) {
            return format!("env {var}");
        }
    }

    if let (Some(doc), Some(path)) = (doc, path) {
        if doc_has_key(doc, key) {
            return format!("file {}", path.display());
        }
    }

    "default".to_string()
}

fn doc_has_key(doc: &Value, dotted_key: &str) -> bool {
    let mut current = doc;
    for part in dotted_key.split('.') {
        match current.get(part) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}
