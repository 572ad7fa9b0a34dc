//! 子命令实现，每个面板一个文件

mod album;
mod console;
mod download;
mod jobs;
mod prefs;
mod search;
mod subs;

pub use album::{run_album, run_related};
pub use console::run_console;
pub use download::run_download;
pub use jobs::{run_cancel, run_delete, run_jobs};
pub use prefs::run_prefs;
pub use search::{run_search, run_suggest};
pub use subs::{run_scheduler, run_subs};

use anyhow::Result;
use std::sync::Arc;

use ytmusic_dl::common::api::client::ApiClient;
use ytmusic_dl::common::config::AppConfig;
use ytmusic_dl::common::prefs::PreferenceStore;
use ytmusic_dl::downloader::JobStore;
use ytmusic_dl::parser::ContentUrls;

/// 各命令共用的客户端和状态
pub struct App {
    pub config: AppConfig,
    pub client: Arc<ApiClient>,
    pub jobs: JobStore,
    pub urls: ContentUrls,
    pub prefs: PreferenceStore,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Arc::new(ApiClient::new(
            &config.api_base_url,
            config.request_timeout(),
        )?);
        let jobs = JobStore::new(client.clone(), config.poll_interval());
        let urls = ContentUrls::new(config.content_base_url.clone());
        let prefs = PreferenceStore::new(config.preferences_path.clone());
        Ok(Self {
            config,
            client,
            jobs,
            urls,
            prefs,
        })
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.jobs.dispose();
    }
}
