use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::pending::PendingMarkers;
use super::status::{DerivedDownloadState, derive, find_job};
use crate::common::api::client::ApiClient;
use crate::common::api::error::ApiError;
use crate::common::api::models::job::{CreatedJob, Job};
use crate::parser::entity::{ContentUrls, Downloadable};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// 任务相关的后端操作
#[async_trait]
pub trait JobsApi: Send + Sync + 'static {
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;
    async fn create_job(&self, url: &str, max_items: Option<u32>) -> Result<CreatedJob, ApiError>;
    async fn cancel_job(&self, id: &str) -> Result<(), ApiError>;
    async fn delete_job(&self, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl JobsApi for ApiClient {
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        ApiClient::list_jobs(self).await
    }

    async fn create_job(&self, url: &str, max_items: Option<u32>) -> Result<CreatedJob, ApiError> {
        ApiClient::create_job(self, url, max_items).await
    }

    async fn cancel_job(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::cancel_job(self, id).await
    }

    async fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_job(self, id).await
    }
}

/// 某一时刻的任务列表视图
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobsSnapshot {
    /// 最新的任务在最前
    pub jobs: Vec<Job>,
    pub pending: PendingMarkers,
    pub polling: bool,
    /// 是否至少成功拉取过一次
    pub loaded: bool,
}

impl JobsSnapshot {
    /// 有等待标记时跳过标记之前就存在的同链接任务
    pub fn job_for(&self, url: &str) -> Option<&Job> {
        match self.pending.known_ids(url) {
            Some(known) => self
                .jobs
                .iter()
                .find(|job| job.url == url && !known.contains(&job.id)),
            None => find_job(&self.jobs, url),
        }
    }

    pub fn derive(&self, url: &str) -> DerivedDownloadState {
        derive(self.job_for(url), self.pending.contains(url))
    }

    /// 没有可用链接的实体视为未下载
    pub fn derive_entity(
        &self,
        urls: &ContentUrls,
        entity: &impl Downloadable,
    ) -> DerivedDownloadState {
        match entity.content_url(urls) {
            Some(url) => self.derive(&url),
            None => DerivedDownloadState::IDLE,
        }
    }

    pub fn active_count(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_active()).count()
    }

    pub fn has_active(&self) -> bool {
        self.jobs.iter().any(Job::is_active)
    }
}

struct Inner {
    api: Arc<dyn JobsApi>,
    state: watch::Sender<JobsSnapshot>,
    poller: Mutex<Option<JoinHandle<()>>>,
    /// 每次拉取列表前分配的序号
    next_fetch: AtomicU64,
    /// 已经应用到状态里的最大序号
    applied: Mutex<u64>,
    interval: Duration,
    cancel: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn poller(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        lock(&self.poller)
    }

    fn next_fetch(&self) -> u64 {
        self.next_fetch.fetch_add(1, Ordering::Relaxed) + 1
    }

    // 用服务端的列表替换本地状态，返回是否还有进行中的任务。
    // 比已应用的结果更早发出的拉取会被丢弃，返回 None。
    fn apply_jobs(&self, fetch: u64, mut jobs: Vec<Job>) -> Option<bool> {
        let mut applied = lock(&self.applied);
        if self.cancel.is_cancelled() {
            return None;
        }
        if fetch <= *applied {
            debug!("丢弃过期的任务列表 (#{} <= #{})", fetch, *applied);
            return None;
        }
        *applied = fetch;

        jobs.reverse();
        let has_active = jobs.iter().any(Job::is_active);
        self.state.send_modify(|snapshot| {
            let cleared = snapshot.pending.reconcile(&jobs);
            if cleared > 0 {
                debug!("{} 个等待标记已出现在任务列表中", cleared);
            }
            snapshot.jobs = jobs;
            snapshot.loaded = true;
        });
        Some(has_active)
    }

    // 一次轮询的收尾；返回 true 表示轮询结束
    fn finish_tick(&self, fetch: u64, jobs: Vec<Job>) -> bool {
        let mut poller = self.poller();
        if self.cancel.is_cancelled() {
            return true;
        }
        match self.apply_jobs(fetch, jobs) {
            // 过期的结果不能决定是否停止
            None | Some(true) => false,
            Some(false) => {
                poller.take();
                self.state.send_modify(|snapshot| snapshot.polling = false);
                info!("没有进行中的任务，停止轮询");
                true
            }
        }
    }

    fn modify(&self, f: impl FnOnce(&mut JobsSnapshot)) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.state.send_modify(f);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.poller().take() {
            handle.abort();
        }
    }
}

/// 任务轮询仓库：有进行中的任务时按固定间隔拉取列表，全部结束后自动停止。
///
/// 克隆出的实例共享同一份状态和同一个轮询任务。
#[derive(Clone)]
pub struct JobStore {
    inner: Arc<Inner>,
}

impl JobStore {
    pub fn new(api: Arc<dyn JobsApi>, interval: Duration) -> Self {
        let (state, _) = watch::channel(JobsSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                poller: Mutex::new(None),
                next_fetch: AtomicU64::new(0),
                applied: Mutex::new(0),
                interval,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobsSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> JobsSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.state.borrow().polling
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    pub fn derive(&self, url: &str) -> DerivedDownloadState {
        self.inner.state.borrow().derive(url)
    }

    /// 首次加载，和 refresh 相同
    pub async fn load(&self) -> Result<(), ApiError> {
        self.refresh().await
    }

    /// 拉取一次列表；发现进行中的任务时开始轮询
    pub async fn refresh(&self) -> Result<(), ApiError> {
        if self.sync_once().await? {
            self.start_polling();
        }
        Ok(())
    }

    // 拉取并应用，不改变轮询状态
    async fn sync_once(&self) -> Result<bool, ApiError> {
        let fetch = self.inner.next_fetch();
        let jobs = self.inner.api.list_jobs().await.map_err(|e| {
            warn!("获取任务列表失败: {}", e);
            e
        })?;
        Ok(self.inner.apply_jobs(fetch, jobs).unwrap_or(false))
    }

    async fn resync(&self) {
        // 失败时保留旧列表，下一次轮询会纠正
        let _ = self.sync_once().await;
    }

    /// 开始轮询，已经在轮询时什么也不做
    pub fn start_polling(&self) {
        if self.is_disposed() {
            return;
        }
        let mut poller = self.inner.poller();
        if poller.is_some() {
            return;
        }

        self.inner
            .state
            .send_modify(|snapshot| snapshot.polling = true);
        debug!("开始轮询任务列表，间隔 {:?}", self.inner.interval);

        let handle = tokio::spawn(Self::poll_loop(
            Arc::downgrade(&self.inner),
            self.inner.interval,
            self.inner.cancel.clone(),
        ));
        *poller = Some(handle);
    }

    async fn poll_loop(inner: Weak<Inner>, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            // 仓库已经被释放
            let Some(store) = inner.upgrade() else {
                return;
            };

            let fetch = store.next_fetch();
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return,
                fetched = store.api.list_jobs() => fetched,
            };

            match fetched {
                Ok(jobs) => {
                    if store.finish_tick(fetch, jobs) {
                        return;
                    }
                }
                Err(e) => warn!("轮询任务列表失败: {}", e),
            }
        }
    }

    /// 创建任务。成功后立即刷新并开始轮询，期间被并发的轮询停掉也会重新开始；
    /// 失败时只同步一次服务端状态，不会开始轮询。
    pub async fn create(&self, url: &str, max_items: Option<u32>) -> Result<CreatedJob, ApiError> {
        match self.inner.api.create_job(url, max_items).await {
            Ok(created) => {
                info!("任务已创建: {} ({})", created.id, url);
                self.resync().await;
                self.start_polling();
                Ok(created)
            }
            Err(e) => {
                warn!("创建任务失败: {}", e);
                self.resync().await;
                Err(e)
            }
        }
    }

    /// 从搜索、专辑等视图发起下载：先打上等待标记，失败时撤销
    pub async fn request(&self, url: &str, max_items: Option<u32>) -> Result<CreatedJob, ApiError> {
        self.inner.modify(|snapshot| {
            snapshot.pending.mark(url, &snapshot.jobs);
        });

        let result = self.create(url, max_items).await;
        if result.is_err() {
            self.inner.modify(|snapshot| {
                snapshot.pending.unmark(url);
            });
        }
        result
    }

    /// 取消任务。请求失败只记录日志，随后总是重新拉取列表；返回服务端是否接受
    pub async fn cancel(&self, id: &str) -> bool {
        let accepted = match self.inner.api.cancel_job(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("取消任务 {} 失败: {}", id, e);
                false
            }
        };
        self.resync().await;
        accepted
    }

    /// 删除任务，规则同 cancel
    pub async fn delete(&self, id: &str) -> bool {
        let accepted = match self.inner.api.delete_job(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("删除任务 {} 失败: {}", id, e);
                false
            }
        };
        self.resync().await;
        accepted
    }

    /// 停止轮询并丢弃之后的所有更新
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        if let Some(handle) = self.inner.poller().take() {
            handle.abort();
        }
        self.inner
            .state
            .send_modify(|snapshot| snapshot.polling = false);
        self.inner.cancel.cancel();
        debug!("任务仓库已销毁");
    }
}
