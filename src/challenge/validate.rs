use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

use super::SubmissionRules;

fn vercel_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://[a-zA-Z0-9-]+\.vercel\.app(/.*)?$").expect("valid vercel regex")
    })
}

fn explorer_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^https://(suiscan\.xyz|suivision\.xyz|suiexplorer\.com)/(testnet|mainnet)/(tx|object|account)/0x[a-fA-F0-9]+/?$",
        )
        .expect("valid explorer regex")
    })
}

/// Raw POST body; every field optional so missing ones get a named message.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitChallengeRequest {
    pub wallet_address: Option<Value>,
    pub chapter_id: Option<Value>,
    pub vercel_url: Option<Value>,
    pub suiscan_url: Option<Value>,
}

/// A submission that passed every format check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub wallet_address: String,
    pub chapter_id: i32,
    pub vercel_url: String,
    pub suiscan_url: String,
}

pub fn is_wallet_address(address: &str, hex_len: usize) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == hex_len && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn is_vercel_url(url: &str) -> bool {
    vercel_url_regex().is_match(url)
}

pub fn is_explorer_url(url: &str) -> bool {
    explorer_url_regex().is_match(url)
}

/// Missing and `null` are the same; anything but a string names the field.
pub fn string_field<'a>(raw: Option<&'a Value>, field: &str) -> Result<Option<&'a str>, String> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(format!("{} must be a string", field)),
    }
}

/// Addresses are stored lowercased so one wallet maps to one user row.
pub fn check_wallet_address(
    raw: Option<&str>,
    field: &str,
    rules: &SubmissionRules,
) -> Result<String, String> {
    let address = raw
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| format!("{} is required", field))?;
    if !is_wallet_address(address, rules.address_hex_len) {
        return Err(format!(
            "Invalid {}: expected 0x followed by {} hex characters",
            field, rules.address_hex_len
        ));
    }
    Ok(address.to_lowercase())
}

/// Accepts a JSON number or a numeric string, like a form field would send.
pub fn parse_chapter_id(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn check_chapter_id(raw: Option<i64>, rules: &SubmissionRules) -> Result<i32, String> {
    let id = raw.ok_or("chapter_id is required")?;
    if id < 1 || id > i64::from(rules.max_chapter) {
        return Err(format!(
            "chapter_id must be an integer between 1 and {}",
            rules.max_chapter
        ));
    }
    Ok(id as i32)
}

impl SubmitChallengeRequest {
    pub fn validate(&self, rules: &SubmissionRules) -> Result<ValidSubmission, String> {
        let wallet_address = check_wallet_address(
            string_field(self.wallet_address.as_ref(), "wallet_address")?,
            "wallet_address",
            rules,
        )?;

        let chapter_id = match &self.chapter_id {
            None | Some(Value::Null) => check_chapter_id(None, rules)?,
            Some(raw) => {
                let parsed = parse_chapter_id(raw).ok_or_else(|| {
                    format!(
                        "chapter_id must be an integer between 1 and {}",
                        rules.max_chapter
                    )
                })?;
                check_chapter_id(Some(parsed), rules)?
            }
        };

        let vercel_url = string_field(self.vercel_url.as_ref(), "vercel_url")?
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or("vercel_url is required")?;
        if !is_vercel_url(vercel_url) {
            return Err(
                "Invalid vercel_url: expected https://<project>.vercel.app".to_string(),
            );
        }

        let suiscan_url = string_field(self.suiscan_url.as_ref(), "suiscan_url")?
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or("suiscan_url is required")?;
        if !is_explorer_url(suiscan_url) {
            return Err("Invalid suiscan_url: expected a suiscan.xyz, suivision.xyz or suiexplorer.com link to a testnet or mainnet tx, object or account".to_string());
        }

        Ok(ValidSubmission {
            wallet_address,
            chapter_id,
            vercel_url: vercel_url.to_string(),
            suiscan_url: suiscan_url.to_string(),
        })
    }
}
