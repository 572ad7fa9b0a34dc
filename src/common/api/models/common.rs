use serde::Deserialize;

use super::job::Job;
use super::search::{SearchResult, Suggestion};
use super::subscription::Subscription;

/// GET /jobs
#[derive(Debug, Deserialize)]
pub struct JobListResponse {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// GET /search
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// GET /search/suggestions
#[derive(Debug, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

/// GET /subscriptions，兼容裸数组和包装对象两种写法
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionListResponse {
    List(Vec<Subscription>),
    Wrapped {
        #[serde(default)]
        subscriptions: Vec<Subscription>,
    },
}

impl SubscriptionListResponse {
    pub fn into_vec(self) -> Vec<Subscription> {
        match self {
            Self::List(subs) => subs,
            Self::Wrapped { subscriptions } => subscriptions,
        }
    }
}

/// 409 响应体
#[derive(Debug, Default, Deserialize)]
pub struct ConflictBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub active_job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidationItem {
    #[serde(default)]
    pub msg: String,
}

/// 422 响应体的 detail 可能是列表也可能是字符串
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ValidationDetail {
    Items(Vec<ValidationItem>),
    Message(String),
}

#[derive(Debug, Deserialize)]
pub struct ValidationBody {
    pub detail: ValidationDetail,
}

impl ValidationBody {
    /// 取第一条校验信息
    pub fn first_message(&self) -> Option<&str> {
        match &self.detail {
            ValidationDetail::Items(items) => items.first().map(|item| item.msg.as_str()),
            ValidationDetail::Message(msg) => Some(msg.as_str()),
        }
    }
}

/// 其他错误响应里常见的字段
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        if let Some(message) = &self.message {
            return Some(message.clone());
        }
        match &self.detail {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_takes_first_message() {
        let body: ValidationBody = serde_json::from_str(
            r#"{"detail":[{"loc":["body","url"],"msg":"invalid url"},{"msg":"second"}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_message(), Some("invalid url"));

        let body: ValidationBody = serde_json::from_str(r#"{"detail":"bad"}"#).unwrap();
        assert_eq!(body.first_message(), Some("bad"));
    }

    #[test]
    fn error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"nope","detail":"ignored"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("nope"));
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"not found"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("not found"));
    }
}
