//! Typed views over the JSON payloads of each resource.
//!
//! The endpoints are loose about types (numbers as strings, `null` where a
//! value is missing), so every field is decoded leniently and defaulted
//! here instead of in the rendering code.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::shared::types::ResourceState;

/// Below this share of remaining budget the dashboard warns.
pub const LOW_BUDGET_PERCENT: f64 = 10.0;
/// Included premium requests assumed when the plan does not say.
pub const DEFAULT_MONTHLY_LIMIT: f64 = 300.0;

pub trait ResourceData: DeserializeOwned + Default {
    fn decode(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Decodes the data held by `state`, if any.
    fn from_state(state: &ResourceState) -> Option<Self> {
        state.data.as_ref().and_then(|v| Self::decode(v).ok())
    }
}

// ---------- balance ----------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceData {
    #[serde(deserialize_with = "lenient_f64")]
    pub total_limit: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub remaining: f64,
    pub reset_period: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub usage: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub usage_daily: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub usage_weekly: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub usage_monthly: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub percent_remaining: f64,
    #[serde(deserialize_with = "lenient_bool")]
    pub warning_low_budget: bool,
    pub fetched_at: Option<String>,
}

impl ResourceData for BalanceData {}

impl BalanceData {
    pub fn low_budget_warning(&self) -> bool {
        self.warning_low_budget || self.percent_remaining < LOW_BUDGET_PERCENT
    }

    /// Progress bar tone: green above half, yellow above the warning line.
    pub fn budget_tone(&self) -> &'static str {
        if self.percent_remaining > 50.0 {
            "green"
        } else if self.percent_remaining > LOW_BUDGET_PERCENT {
            "yellow"
        } else {
            "red"
        }
    }

    pub fn reset_label(&self) -> &str {
        match self.reset_period.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => "N/A",
        }
    }
}

// ---------- premium usage ----------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PremiumUsageData {
    #[serde(deserialize_with = "null_as_default")]
    pub plan: PlanInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub totals: UsageTotals,
    #[serde(deserialize_with = "lenient_items")]
    pub usage_items: Vec<UsageItem>,
    pub time_period: Option<TimePeriod>,
    pub fetched_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanInfo {
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub monthly_limit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageTotals {
    #[serde(deserialize_with = "lenient_f64")]
    pub included_used: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub included_remaining: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub gross_used: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub net_overage: f64,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub billed_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageItem {
    #[serde(deserialize_with = "lenient_f64")]
    pub net_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimePeriod {
    #[serde(deserialize_with = "lenient_f64")]
    pub month: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub year: f64,
}

impl ResourceData for PremiumUsageData {}

impl PremiumUsageData {
    pub fn monthly_limit(&self) -> f64 {
        self.plan.monthly_limit.unwrap_or(DEFAULT_MONTHLY_LIMIT)
    }

    /// Billed amount from the totals, else the sum of the per-item amounts.
    pub fn billed_amount(&self) -> f64 {
        self.totals
            .billed_amount
            .unwrap_or_else(|| self.usage_items.iter().map(|i| i.net_amount).sum())
    }

    pub fn percent_included_remaining(&self) -> f64 {
        let limit = self.monthly_limit();
        if limit > 0.0 {
            self.totals.included_remaining / limit * 100.0
        } else {
            0.0
        }
    }
}

// ---------- rate limits ----------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitData {
    pub plan_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub limits: RateLimits,
    pub fetched_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    pub primary: Option<LimitWindow>,
    pub secondary: Option<LimitWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitWindow {
    #[serde(rename = "usedPercent", deserialize_with = "lenient_f64")]
    pub raw_used_percent: f64,
    pub reset_at_iso: Option<String>,
}

impl ResourceData for RateLimitData {}

impl RateLimitData {
    pub fn plan_label(&self) -> String {
        match self.plan_type.as_deref() {
            Some(p) if !p.is_empty() => p.to_uppercase(),
            _ => "—".to_string(),
        }
    }
}

impl LimitWindow {
    pub fn used_percent(&self) -> f64 {
        clamp_percent(self.raw_used_percent)
    }

    pub fn remaining_percent(&self) -> f64 {
        clamp_percent(100.0 - self.used_percent())
    }
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Low-budget flag for the dashboard banner. No data means no warning.
pub fn low_budget_warning(state: &ResourceState) -> bool {
    BalanceData::from_state(state)
        .map(|b| b.low_budget_warning())
        .unwrap_or(false)
}

// ---------- lenient field decoding ----------

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(number_from(&v).unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(number_from(&v))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn lenient_items<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<UsageItem>, D::Error> {
    let v = Value::deserialize(d)?;
    let Value::Array(items) = v else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .map(|item| UsageItem::deserialize(item).unwrap_or_default())
        .collect())
}
