// Block discovery and Plant / Work / Harvest DTOs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    pub hash: String,
    pub difficulty: String,
    pub timestamp: u64,
    pub entropy: String,
    pub age: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonceRange {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub plantable: bool,
    pub estimated_reward: f64,
    pub ranges: Vec<NonceRange>,
}

/// Pooler → backend notification that a new block is open for planting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDiscoveredEvent {
    /// Always `new_block_discovered`.
    pub event: String,
    pub pooler_id: String,
    pub block_index: u64,
    pub block_data: BlockData,
    pub metadata: BlockMetadata,
}

impl BlockDiscoveredEvent {
    pub const EVENT_NAME: &'static str = "new_block_discovered";

    pub fn new(pooler_id: impl Into<String>, block_index: u64, block_data: BlockData, metadata: BlockMetadata) -> Self {
        Self {
            event: Self::EVENT_NAME.to_string(),
            pooler_id: pooler_id.into(),
            block_index,
            block_data,
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlockDiscoveredResponse {
    pub success: bool,
    pub message: String,
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRequest {
    pub block_index: u64,
    pub pooler_id: String,
    pub max_farmers_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmerPlantResult {
    pub farmer_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlantResponse {
    pub block_index: u64,
    pub pooler_id: String,
    pub total_requested: u64,
    pub successful_plants: Vec<FarmerPlantResult>,
    pub failed_plants: Vec<FarmerPlantResult>,
    pub total_staked: f64,
    pub processing_time_ms: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSubmission {
    pub farmer_id: String,
    pub nonce: String,
    pub block_index: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub block_index: u64,
    pub pooler_id: String,
    pub submissions: Vec<WorkSubmission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkResult {
    pub farmer_id: String,
    pub nonce: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkResponse {
    pub block_index: u64,
    pub pooler_id: String,
    pub total_submissions: u64,
    pub valid_nonces: Vec<WorkResult>,
    pub invalid_nonces: Vec<WorkResult>,
    pub submitted_work: Vec<WorkResult>,
    pub total_rewards: f64,
    pub processing_time_ms: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRequest {
    pub block_index: u64,
    pub pooler_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HarvestResult {
    pub farmer_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HarvestResponse {
    pub block_index: u64,
    pub pooler_id: String,
    pub total_eligible: u64,
    pub successful_harvests: Vec<HarvestResult>,
    pub failed_harvests: Vec<HarvestResult>,
    pub total_rewards: f64,
    pub processing_time_ms: u64,
    pub timestamp: String,
}
