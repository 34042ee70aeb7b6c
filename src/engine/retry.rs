// ==========================================
// SAP 成本核算批处理 - 逐项抓取重试
// ==========================================
// 仅对可重试错误（Io）重试，最多 max_retries 次额外尝试
// 其他错误立即返回
// ==========================================

use crate::error::JobResult;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 执行异步操作，失败时按固定间隔重试
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    delay: Duration,
    label: &str,
    mut op: F,
) -> JobResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = JobResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    label = label,
                    attempt = attempt,
                    max_retries = max_retries,
                    error = %err,
                    "操作失败，准备重试"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
