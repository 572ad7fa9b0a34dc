use serde::{Deserialize, Serialize};

/// 歌单订阅，由调度器定期同步
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub max_items: Option<u32>,
    #[serde(default)]
    pub last_synced_at: Option<String>,
    #[serde(default)]
    pub last_job_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Subscription {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscriptionRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

/// PATCH 时只发送需要修改的字段
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSubscriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

impl UpdateSubscriptionRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.enabled.is_none() && self.max_items.is_none()
    }
}

/// 同步接口的返回：触发了哪些任务
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job_ids: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SyncResponse {
    pub fn triggered_jobs(&self) -> Vec<&str> {
        self.job_id
            .iter()
            .chain(self.job_ids.iter())
            .map(String::as_str)
            .collect()
    }
}

/// GET /scheduler
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchedulerStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub interval_minutes: Option<u32>,
    #[serde(default)]
    pub next_run_at: Option<String>,
    #[serde(default)]
    pub last_run_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriptions_default_to_enabled() {
        let sub: Subscription =
            serde_json::from_str(r#"{"id":"s1","url":"https://music.youtube.com/playlist?list=PL1"}"#)
                .unwrap();
        assert!(sub.enabled);
        assert_eq!(sub.display_name(), "https://music.youtube.com/playlist?list=PL1");
    }

    #[test]
    fn sync_response_collects_single_and_many() {
        let resp: SyncResponse = serde_json::from_str(r#"{"job_id":"a","job_ids":["b","c"]}"#).unwrap();
        assert_eq!(resp.triggered_jobs(), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateSubscriptionRequest::default().is_empty());
        let update = UpdateSubscriptionRequest {
            enabled: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"enabled":false}"#);
    }
}
