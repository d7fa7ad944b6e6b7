// Health and service info DTOs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// A value this client does not know yet, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Offline,
    Error,
    /// A value this client does not know yet, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceState>,
    pub last_check: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceStatuses {
    pub plant: ServiceStatus,
    pub work: ServiceStatus,
    pub harvest: ServiceStatus,
    pub wallet: ServiceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HealthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<HealthStatus>,
    pub services: ServiceStatuses,
    pub uptime: f64,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NetworkInfo {
    pub name: String,
    pub horizon_url: String,
    pub passphrase: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PoolSettings {
    pub max_farmers_per_pool: u64,
    pub default_harvest_interval: u64,
    pub min_stake_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InfoResponse {
    pub service: String,
    pub version: String,
    pub network: NetworkInfo,
    pub config: PoolSettings,
}
