// ==========================================
// SAP 成本核算批处理 - RFC 桥接客户端
// ==========================================
// 握手流程（同一 API_URL，POST JSON）:
// 1. {apitype: "accesstoken"}          → {token}
// 2. {apitype: "login", client: "RPS"} + Bearer → 登录状态
// 3. {apitype: "call", bapi, parameters} + Bearer → {PULLOUT: [...]}
// 步骤 1/2 任一失败视为认证失败（致命）
// ==========================================

use crate::config::job_config::BridgeSettings;
use crate::domain::pullout::PulloutRecord;
use crate::error::{JobError, JobResult};
use crate::sources::{PulloutQuery, PulloutSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

pub const LOGIN_CLIENT: &str = "RPS";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    #[serde(rename = "PULLOUT", default)]
    pullout: Vec<PulloutRecord>,
}

pub fn access_token_body() -> Value {
    json!({ "apitype": "accesstoken" })
}

pub fn login_body() -> Value {
    json!({ "apitype": "login", "client": LOGIN_CLIENT })
}

pub fn call_body(bapi: &str, query: &PulloutQuery) -> Value {
    json!({
        "apitype": "call",
        "bapi": bapi,
        "parameters": {
            "INV_DT": { "FROM_DATE": query.from_date, "TO_DATE": query.to_date },
            "CUS_CODE": { "SOLD_FROM": query.customer_code },
        }
    })
}

/// 解析远程函数返回体
pub fn parse_call_response(body: &str) -> JobResult<Vec<PulloutRecord>> {
    let response: CallResponse = serde_json::from_str(body)
        .map_err(|e| JobError::DataShape(format!("PULLOUT 返回体解析失败: {}", e)))?;
    Ok(response.pullout)
}

// ==========================================
// RestBridgeClient
// ==========================================
pub struct RestBridgeClient {
    client: Client,
    settings: BridgeSettings,
}

impl RestBridgeClient {
    pub fn new(settings: BridgeSettings, timeout: Duration) -> JobResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JobError::Io(format!("HTTP 客户端初始化失败: {}", e)))?;
        Ok(Self { client, settings })
    }

    /// 获取访问令牌
    async fn access_token(&self) -> JobResult<String> {
        let response = self
            .client
            .post(&self.settings.api_url)
            .json(&access_token_body())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| JobError::Auth(format!("令牌请求失败: {}", e)))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| JobError::Auth(format!("令牌响应解析失败: {}", e)))?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| JobError::Auth("响应中无 token".to_string()))
    }

    /// 登录
    async fn login(&self, token: &str) -> JobResult<()> {
        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(token)
            .json(&login_body())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| JobError::Auth(format!("登录失败: {}", e)))?;

        let status: Value = response
            .json()
            .await
            .map_err(|e| JobError::Auth(format!("登录响应解析失败: {}", e)))?;
        debug!(keys = ?status.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()), "登录成功");
        Ok(())
    }
}

#[async_trait]
impl PulloutSource for RestBridgeClient {
    #[instrument(skip(self), fields(bapi = %self.settings.bapi))]
    async fn fetch_pullouts(&self, query: &PulloutQuery) -> JobResult<Vec<PulloutRecord>> {
        let token = self.access_token().await.map_err(|e| {
            error!(error = %e, "获取访问令牌失败");
            e
        })?;
        self.login(&token).await.map_err(|e| {
            error!(error = %e, "登录失败");
            e
        })?;

        let body = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&token)
            .json(&call_body(&self.settings.bapi, query))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let records = parse_call_response(&body)?;
        info!(count = records.len(), "拉料记录获取完成");
        Ok(records)
    }
}
