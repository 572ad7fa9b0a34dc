use std::collections::{BTreeMap, BTreeSet};

use crate::common::api::models::job::Job;

/// 已经发出下载请求、但任务列表里还没出现的内容链接。
///
/// 每个标记记住打标记时列表里已有的同链接任务，只有新出现的任务才能清掉它，
/// 重新下载时旧的已完成任务不会盖过等待状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMarkers {
    urls: BTreeMap<String, BTreeSet<String>>,
}

impl PendingMarkers {
    /// `existing` 是当前的任务列表；已经有标记时保持原样
    pub fn mark(&mut self, url: &str, existing: &[Job]) -> bool {
        if self.urls.contains_key(url) {
            return false;
        }
        let known = existing
            .iter()
            .filter(|job| job.url == url)
            .map(|job| job.id.clone())
            .collect();
        self.urls.insert(url.to_string(), known);
        true
    }

    pub fn unmark(&mut self, url: &str) -> bool {
        self.urls.remove(url).is_some()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains_key(url)
    }

    /// 打标记时已经存在的同链接任务 id
    pub fn known_ids(&self, url: &str) -> Option<&BTreeSet<String>> {
        self.urls.get(url)
    }

    /// 任务列表里出现新任务的标记可以去掉，返回去掉的数量
    pub fn reconcile(&mut self, jobs: &[Job]) -> usize {
        let before = self.urls.len();
        self.urls.retain(|url, known| {
            !jobs
                .iter()
                .any(|job| job.url == *url && !known.contains(&job.id))
        });
        before - self.urls.len()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }
}
