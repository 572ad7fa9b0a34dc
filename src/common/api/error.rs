use thiserror::Error;

/// 后端返回 409 时默认的冲突说明
pub const DEFAULT_CONFLICT_MESSAGE: &str = "已有其他任务正在运行";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("响应解析失败: {0}")]
    InvalidResponse(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error(
        "{message}{}",
        .active_job_id.as_ref().map(|id| format!(" (当前任务: {id})")).unwrap_or_default()
    )]
    Conflict {
        message: String,
        active_job_id: Option<String>,
    },

    #[error("服务端错误 ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("无效的地址: {0}")]
    InvalidUrl(String),
}

/// 错误分类，决定界面上如何展示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 用户可以修正的输入错误
    Validation,
    /// 资源被其他操作占用
    Conflict,
    /// 网络或服务端故障
    Transport,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Transport,
        }
    }

    /// 冲突时占用资源的任务ID
    pub fn active_job_id(&self) -> Option<&str> {
        match self {
            Self::Conflict { active_job_id, .. } => active_job_id.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}
