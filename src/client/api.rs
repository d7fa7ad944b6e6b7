// Typed endpoint methods for the KALE pool backend

use super::query::{segment, Query};
use super::{ApiClient, RequestOptions, Service};
use crate::error::ApiResult;
use crate::models::*;
use reqwest::Method;
use serde_json::Value;

impl ApiClient {
    // ==================== Health & Info ====================

    pub async fn health(&self) -> ApiResult<HealthResponse> {
        self.get("/health").await
    }

    pub async fn info(&self) -> ApiResult<InfoResponse> {
        self.get("/info").await
    }

    // ==================== Registration ====================

    /// Create a user with a custodial wallet. Unlike
    /// [`register_farmer`](ApiClient::register_farmer), no token is stored.
    pub async fn register_user(&self, request: &RegisterUserRequest) -> ApiResult<RegisterUserResponse> {
        self.post("/register-farmer", request).await
    }

    pub async fn check_funding(&self, request: &CheckFundingRequest) -> ApiResult<CheckFundingResponse> {
        self.post("/check-funding", request).await
    }

    pub async fn user_status(&self, user_id: &str) -> ApiResult<UserStatusResponse> {
        self.get(&format!("/user/{}/status", segment(user_id))).await
    }

    // ==================== Farmer Analytics ====================

    /// Farmer summary over `window`. `farmer_id` defaults to the logged-in farmer.
    pub async fn farmer_summary(&self, farmer_id: Option<&str>, window: Option<TimeWindow>) -> ApiResult<Value> {
        let farmer_id = self.resolve_farmer_id(farmer_id)?;
        let path = Query::new()
            .push_opt("window", window.map(|w| w.as_str()))
            .append_to(&format!("/farmers/{}/summary", segment(&farmer_id)));
        self.get(&path).await
    }

    pub async fn farmer_plantings(&self, farmer_id: Option<&str>, filters: &ActivityFilters) -> ApiResult<Value> {
        let farmer_id = self.resolve_farmer_id(farmer_id)?;
        let path = activity_query(filters).append_to(&format!("/farmers/{}/plantings", segment(&farmer_id)));
        self.get(&path).await
    }

    pub async fn farmer_harvests(&self, farmer_id: Option<&str>, filters: &ActivityFilters) -> ApiResult<Value> {
        let farmer_id = self.resolve_farmer_id(farmer_id)?;
        let path = activity_query(filters).append_to(&format!("/farmers/{}/harvests", segment(&farmer_id)));
        self.get(&path).await
    }

    pub async fn current_farmer(&self) -> ApiResult<Value> {
        self.get("/farmers/current").await
    }

    pub async fn farmer_blockchain_data(&self) -> ApiResult<Value> {
        self.get("/farmers/blockchain-data").await
    }

    // ==================== Contracts ====================

    pub async fn farmer_active_contract(&self, farmer_id: Option<&str>) -> ApiResult<Value> {
        let farmer_id = self.resolve_farmer_id(farmer_id)?;
        self.get(&format!("/contracts/farmers/{}/contracts/active", segment(&farmer_id)))
            .await
    }

    /// Contract listing. The farmer id is passed through as a filter and not
    /// checked against the stored one; the backend scopes it.
    pub async fn farmer_contracts(&self, farmer_id: Option<&str>, filters: &ContractFilters) -> ApiResult<Value> {
        let path = Query::new()
            .push_opt("farmerId", farmer_id)
            .push_opt("status", filters.status.map(|s| s.as_str()))
            .push_opt("page", filters.page)
            .push_opt("limit", filters.limit)
            .append_to("/contracts");
        self.get(&path).await
    }

    pub async fn contract(&self, contract_id: &str) -> ApiResult<Value> {
        self.get(&format!("/contracts/{}", segment(contract_id))).await
    }

    pub async fn exit_contract(&self, contract_id: &str) -> ApiResult<Value> {
        self.post(&format!("/contracts/{}/exit", segment(contract_id)), &serde_json::json!({}))
            .await
    }

    // ==================== Wallet ====================

    pub async fn wallet_balance(&self, address: &str) -> ApiResult<Value> {
        self.get(&format!("/wallet/balance/{}", segment(address))).await
    }

    pub async fn my_wallet_balance(&self) -> ApiResult<Value> {
        self.get("/wallet/my-balance").await
    }

    pub async fn wallet_info(&self, address: &str) -> ApiResult<Value> {
        self.get(&format!("/wallet/info/{}", segment(address))).await
    }

    pub async fn xlm_balance(&self, address: &str) -> ApiResult<Value> {
        self.get(&format!("/wallet/xlm/{}", segment(address))).await
    }

    // ==================== Poolers ====================

    /// One page of poolers, reshaped into [`PaginatedResponse`].
    pub async fn poolers(&self, user_id: Option<&str>, filters: &FilterParams) -> ApiResult<PaginatedResponse<PoolerSummary>> {
        let path = Query::new()
            .push_opt("userId", user_id)
            .push_opt("page", filters.page)
            .push_opt("limit", filters.limit)
            .push_opt("search", filters.search.as_deref())
            .append_to("/poolers");
        let page: PoolerPage = self.get(&path).await?;
        Ok(page.into_paginated())
    }

    pub async fn pooler_details(&self, pooler_id: &str, user_id: Option<&str>) -> ApiResult<PoolerDetails> {
        let path = Query::new()
            .push_opt("userId", user_id)
            .append_to(&format!("/pooler/{}/details", segment(pooler_id)));
        self.get(&path).await
    }

    pub async fn join_pool(&self, request: &JoinPoolRequest) -> ApiResult<JoinPoolResponse> {
        self.post("/join-pool", request).await
    }

    pub async fn confirm_join(&self, request: &ConfirmJoinRequest) -> ApiResult<ConfirmJoinResponse> {
        self.post("/confirm-pool-join", request).await
    }

    pub async fn register_pooler(&self, registration: &Value) -> ApiResult<Value> {
        self.post("/registerPooler", registration).await
    }

    // ==================== Pooler Console ====================

    pub async fn notify_block_discovered(&self, event: &BlockDiscoveredEvent) -> ApiResult<BlockDiscoveredResponse> {
        self.post("/pooler/block-discovered", event).await
    }

    /// Status of the pooler service itself. Served by the pooler, not the
    /// primary backend, and unauthenticated.
    pub async fn pooler_status(&self) -> ApiResult<PoolerStatusResponse> {
        let options = RequestOptions::new().service(Service::Pooler).skip_auth();
        self.request::<_, ()>(Method::GET, "/pooler/status", None, options)
            .await
    }

    pub async fn notify_work_completed(&self, report: &Value) -> ApiResult<Value> {
        self.post("/pooler/work-completed", report).await
    }

    // ==================== Block Operations ====================

    pub async fn plant(&self, request: &PlantRequest) -> ApiResult<PlantResponse> {
        self.post("/plant", request).await
    }

    pub async fn work(&self, request: &WorkRequest) -> ApiResult<WorkResponse> {
        self.post("/work", request).await
    }

    pub async fn harvest(&self, request: &HarvestRequest) -> ApiResult<HarvestResponse> {
        self.post("/harvest", request).await
    }

    // ==================== Harvest Service ====================

    pub async fn start_harvest_service(&self) -> ApiResult<Value> {
        self.post_empty("/harvest/start").await
    }

    pub async fn stop_harvest_service(&self) -> ApiResult<Value> {
        self.post_empty("/harvest/stop").await
    }

    pub async fn harvest_status(&self) -> ApiResult<Value> {
        self.get("/harvest/status").await
    }

    pub async fn trigger_harvest(&self) -> ApiResult<Value> {
        self.post_empty("/harvest/trigger").await
    }
}

fn activity_query(filters: &ActivityFilters) -> Query {
    Query::new()
        .push_opt("poolerId", filters.pooler_id.as_deref())
        .push_opt("from", filters.from.as_deref())
        .push_opt("to", filters.to.as_deref())
        .push_opt("page", filters.page)
        .push_opt("limit", filters.limit)
        .push_opt("status", filters.status.map(|s| s.as_str()))
}
