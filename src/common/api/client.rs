use std::time::Duration;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use reqwest::{
    Client, ClientBuilder, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::error::{ApiError, DEFAULT_CONFLICT_MESSAGE};
use super::models::album::{Album, RelatedSection};
use super::models::common::{
    ConflictBody, ErrorBody, JobListResponse, SearchResponse, SubscriptionListResponse,
    SuggestionResponse, ValidationBody,
};
use super::models::job::{CreateJobRequest, CreatedJob, Job};
use super::models::search::{SearchParams, SearchResult, Suggestion};
use super::models::subscription::{
    CreateSubscriptionRequest, SchedulerStatus, Subscription, SyncResponse,
    UpdateSubscriptionRequest,
};
use crate::console::sse::SseDecoder;

/// 推送流里的一条原始消息
pub type MessageStream = BoxStream<'static, Result<String, ApiError>>;

// 下载管理器后端的客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    // 创建客户端，base_url 形如 http://localhost:8000/api
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // 保证以 / 结尾，否则 join 会丢掉最后一段路径
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)?;

        // 日志流是长连接，整体超时只加在普通请求上
        let inner = ClientBuilder::new()
            .connect_timeout(timeout)
            .default_headers(Self::get_default_headers())
            .build()?;

        Ok(Self {
            inner,
            base_url,
            timeout,
        })
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ytmdl/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn encode(id: &str) -> String {
        urlencoding::encode(id).into_owned()
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.timeout(self.timeout).send().await.map_err(|e| {
            error!("请求失败: {}", e);
            ApiError::Reqwest(e)
        })
    }

    // 通用 GET
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let resp = self.send(self.inner.get(url)).await?;
        Self::handle_response::<T>(resp).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let resp = self.send(self.inner.get(url).query(query)).await?;
        Self::handle_response::<T>(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let resp = self.send(self.inner.post(url).json(body)).await?;
        Self::handle_response::<T>(resp).await
    }

    // 没有请求体也不关心响应体的 POST/DELETE
    async fn call(&self, method: reqwest::Method, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let resp = self.send(self.inner.request(method, url)).await?;
        Self::handle_empty(resp).await
    }

    // 处理响应
    async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        let url = resp.url().to_string();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(Self::error_from_status(status, &text));
        }

        match serde_json::from_str::<T>(&text) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!("失败的请求的URL: {}", url);
                error!("JSON 结构匹配失败: {}", e);
                error!("期望的结构 可能是: {}", std::any::type_name::<T>());
                Err(ApiError::InvalidResponse(format!(
                    "结构匹配失败: {}. 响应: {}",
                    e, text
                )))
            }
        }
    }

    async fn handle_empty(resp: Response) -> Result<(), ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await?;
        Err(Self::error_from_status(status, &text))
    }

    // 把非 2xx 响应转换成带类型的错误
    fn error_from_status(status: StatusCode, text: &str) -> ApiError {
        match status {
            StatusCode::UNPROCESSABLE_ENTITY => {
                let message = serde_json::from_str::<ValidationBody>(text)
                    .ok()
                    .and_then(|body| body.first_message().map(str::to_string))
                    .unwrap_or_else(|| "请求参数无效".to_string());
                ApiError::Validation(message)
            }
            StatusCode::CONFLICT => {
                let body = serde_json::from_str::<ConflictBody>(text).unwrap_or_default();
                ApiError::Conflict {
                    message: body
                        .error
                        .or(body.detail)
                        .unwrap_or_else(|| DEFAULT_CONFLICT_MESSAGE.to_string()),
                    active_job_id: body.active_job_id,
                }
            }
            _ => {
                let message = serde_json::from_str::<ErrorBody>(text)
                    .ok()
                    .and_then(|body| body.message())
                    .unwrap_or_else(|| {
                        if text.trim().is_empty() {
                            status.canonical_reason().unwrap_or("未知错误").to_string()
                        } else {
                            text.trim().to_string()
                        }
                    });
                ApiError::Http {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    // ---------------------------------------------------------------- 任务

    pub async fn create_job(&self, url: &str, max_items: Option<u32>) -> Result<CreatedJob, ApiError> {
        let body = CreateJobRequest {
            url: url.to_string(),
            max_items,
        };
        self.post("jobs", &body).await
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let resp: JobListResponse = self.get("jobs").await?;
        Ok(resp.jobs)
    }

    pub async fn cancel_job(&self, id: &str) -> Result<(), ApiError> {
        self.call(reqwest::Method::POST, &format!("jobs/{}/cancel", Self::encode(id)))
            .await
    }

    pub async fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        self.call(reqwest::Method::DELETE, &format!("jobs/{}", Self::encode(id)))
            .await
    }

    // ---------------------------------------------------------------- 搜索与浏览

    pub async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>, ApiError> {
        let resp: SearchResponse = self.get_with_query("search", params).await?;
        Ok(resp.results)
    }

    /// 搜索建议失败时返回空列表
    pub async fn search_suggestions(&self, query: &str) -> Vec<Suggestion> {
        let query = [("query", query), ("detailed_runs", "true")];
        match self
            .get_with_query::<SuggestionResponse, _>("search/suggestions", &query)
            .await
        {
            Ok(resp) => resp.suggestions,
            Err(e) => {
                warn!("获取搜索建议失败: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get_album(&self, browse_id: &str) -> Result<Album, ApiError> {
        self.get(&format!("albums/{}", Self::encode(browse_id))).await
    }

    pub async fn get_related(&self, video_id: &str) -> Result<Vec<RelatedSection>, ApiError> {
        self.get(&format!("songs/{}/related", Self::encode(video_id)))
            .await
    }

    // ---------------------------------------------------------------- 订阅

    /// 订阅列表失败时返回空列表
    pub async fn list_subscriptions(&self) -> Vec<Subscription> {
        match self.get::<SubscriptionListResponse>("subscriptions").await {
            Ok(resp) => resp.into_vec(),
            Err(e) => {
                warn!("获取订阅列表失败: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<Subscription, ApiError> {
        self.post("subscriptions", request).await
    }

    pub async fn update_subscription(
        &self,
        id: &str,
        request: &UpdateSubscriptionRequest,
    ) -> Result<Subscription, ApiError> {
        let url = self.endpoint(&format!("subscriptions/{}", Self::encode(id)))?;
        debug!("PATCH {}", url);
        let resp = self.send(self.inner.patch(url).json(request)).await?;
        Self::handle_response(resp).await
    }

    pub async fn delete_subscription(&self, id: &str) -> Result<(), ApiError> {
        self.call(
            reqwest::Method::DELETE,
            &format!("subscriptions/{}", Self::encode(id)),
        )
        .await
    }

    pub async fn sync_subscription(&self, id: &str) -> Result<SyncResponse, ApiError> {
        self.post(
            &format!("subscriptions/{}/sync", Self::encode(id)),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn sync_all_subscriptions(&self) -> Result<SyncResponse, ApiError> {
        self.post("subscriptions/sync", &serde_json::json!({})).await
    }

    pub async fn scheduler_status(&self) -> Result<SchedulerStatus, ApiError> {
        self.get("scheduler").await
    }

    // ---------------------------------------------------------------- 日志

    // 打开 SSE 日志流，返回解码后的消息
    pub async fn open_log_stream(&self) -> Result<MessageStream, ApiError> {
        let url = self.endpoint("logs/sse")?;
        debug!("打开日志流 {}", url);
        let resp = self
            .inner
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::error_from_status(status, &text));
        }

        let messages = resp
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, chunk| {
                let batch: Vec<Result<String, ApiError>> = match chunk {
                    Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(ApiError::Reqwest(e))],
                };
                futures::future::ready(Some(stream::iter(batch)))
            })
            .flatten()
            .boxed();

        Ok(messages)
    }
}
