// ==========================================
// SAP 成本核算批处理 - 作业错误类型
// ==========================================
// 职责: 封闭的错误分类（IO / 数据形态 / 认证 / 持久化）
// 工具: thiserror 派生宏
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 批处理作业错误类型
///
/// 调用方据此区分可重试与致命错误：
/// - Io: 网络调用 / 界面抓取失败，可重试
/// - DataShape: 列缺失、空表、非数值，跳过当前物料
/// - Auth: 令牌 / 登录失败，终止本次运行
/// - Persistence: 单条记录写入失败，记录后继续
#[derive(Error, Debug)]
pub enum JobError {
    #[error("I/O 失败: {0}")]
    Io(String),

    #[error("数据形态异常: {0}")]
    DataShape(String),

    #[error("认证失败: {0}")]
    Auth(String),

    #[error("持久化失败: {0}")]
    Persistence(String),
}

impl JobError {
    /// 是否允许重试（仅瞬时 I/O 失败）
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::Io(_))
    }

    /// 是否需要终止整个运行
    pub fn is_fatal(&self) -> bool {
        matches!(self, JobError::Auth(_))
    }
}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        JobError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for JobError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status)
                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN =>
            {
                JobError::Auth(err.to_string())
            }
            _ if err.is_decode() => JobError::DataShape(err.to_string()),
            _ => JobError::Io(err.to_string()),
        }
    }
}

impl From<RepositoryError> for JobError {
    fn from(err: RepositoryError) -> Self {
        JobError::Persistence(err.to_string())
    }
}

impl From<ImportError> for JobError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(_) | ImportError::FileReadError(_) => {
                JobError::Io(err.to_string())
            }
            _ => JobError::DataShape(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type JobResult<T> = Result<T, JobError>;
