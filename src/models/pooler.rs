// Pooler discovery, membership and console DTOs

use super::common::{PaginatedResponse, Pagination};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolerSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub reward_percentage: f64,
    pub max_farmers: u64,
    pub current_farmers: u64,
    pub total_staked: String,
    pub total_staked_human: String,
    pub average_reward: String,
    pub average_reward_human: String,
    pub success_rate: f64,
    pub created_at: String,
    pub last_seen: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolerTerms {
    pub minimum_stake: String,
    pub harvest_policy: String,
    pub exit_delay: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolerPerformance {
    pub success_rate: f64,
    pub average_block_time: f64,
    pub total_blocks_mined: u64,
    pub uptime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolerStatistics {
    pub total_staked: String,
    pub total_rewards: String,
    pub average_reward_per_block: String,
    pub farmers_joined: u64,
    pub farmers_active: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PoolerDetails {
    #[serde(flatten)]
    pub summary: PoolerSummary,
    pub terms: PoolerTerms,
    pub performance: PoolerPerformance,
    pub statistics: PoolerStatistics,
}

/// Raw page shape returned by `GET /poolers`; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolerPage {
    #[serde(default)]
    pub items: Option<Vec<PoolerSummary>>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl PoolerPage {
    const DEFAULT_PAGE: u64 = 1;
    const DEFAULT_LIMIT: u64 = 10;

    /// Fill the gaps (page 1, limit 10, total 0) and derive `total_pages`.
    /// Zero page or limit count as missing.
    pub fn into_paginated(self) -> PaginatedResponse<PoolerSummary> {
        let page = self.page.filter(|p| *p > 0).unwrap_or(Self::DEFAULT_PAGE);
        let limit = self.limit.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LIMIT);
        let total = self.total.unwrap_or(0);

        PaginatedResponse {
            data: self.items.unwrap_or_default(),
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPoolRequest {
    pub user_id: String,
    pub pooler_id: String,
    pub stake_percentage: f64,
    pub harvest_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinPoolResponse {
    pub contract_id: String,
    pub pooler_id: String,
    pub user_id: String,
    pub stake_percentage: f64,
    pub harvest_interval: u64,
    pub estimated_rewards: f64,
    pub requires_confirmation: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmJoinRequest {
    pub contract_id: String,
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    ActiveInPool,
    Pending,
    Rejected,
    /// A value this client does not know yet, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmJoinResponse {
    pub success: bool,
    pub contract_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MembershipStatus>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FarmerConnections {
    pub farmers: u64,
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LastNotification {
    pub block_index: u64,
    pub timestamp: String,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BlocksDiscovered {
    pub total: u64,
    pub last24h: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsolePerformance {
    pub uptime: f64,
    pub avg_response_time: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolerStatusResponse {
    pub pooler_id: String,
    pub connections: FarmerConnections,
    pub last_notification: LastNotification,
    pub blocks_discovered: BlocksDiscovered,
    pub performance: ConsolePerformance,
}
