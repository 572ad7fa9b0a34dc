use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ytmusic_dl::common::api::models::search::SearchFilter;
use ytmusic_dl::common::prefs::Theme;

/// YouTube Music 下载管理器的命令行客户端
#[derive(Parser, Debug)]
#[command(name = "ytmdl")]
#[command(version)]
#[command(about = "管理下载任务、搜索内容、查看实时日志", long_about = None)]
pub struct Cli {
    /// 配置文件路径 (默认读取当前目录的 ytmdl.toml)
    #[arg(long, global = true, value_name = "FILE")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// 覆盖配置中的后端地址
    #[arg(long, global = true, value_name = "URL")]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub api_url: Option<String>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 下载链接；输入不是链接时改为搜索
    Download {
        /// 内容链接或搜索关键词
        input: String,

        /// 歌单最多下载的条目数
        #[arg(long, value_name = "N")]
        max_items: Option<u32>,

        /// 提交后持续显示进度直到任务结束
        #[arg(long)]
        watch: bool,
    },

    /// 搜索内容
    Search {
        query: String,

        #[arg(long, value_enum)]
        filter: Option<SearchFilter>,

        #[arg(long)]
        scope: Option<String>,

        #[arg(long, value_name = "N")]
        limit: Option<u32>,

        /// 不自动纠正拼写
        #[arg(long)]
        ignore_spelling: bool,

        /// 下载第 N 个结果 (从 1 开始)
        #[arg(long, value_name = "N")]
        download: Option<usize>,
    },

    /// 获取搜索建议
    Suggest { query: String },

    /// 查看专辑及曲目的下载状态
    Album {
        browse_id: String,

        /// 下载整张专辑
        #[arg(long, conflicts_with = "track")]
        download: bool,

        /// 下载第 N 首曲目 (从 1 开始)
        #[arg(long, value_name = "N")]
        track: Option<usize>,
    },

    /// 查看歌曲的相关内容
    Related { video_id: String },

    /// 列出下载任务
    Jobs {
        /// 有进行中的任务时持续刷新
        #[arg(long)]
        watch: bool,
    },

    /// 取消任务
    Cancel { id: String },

    /// 删除任务
    Delete { id: String },

    /// 查看实时日志，Ctrl-C 退出
    Console {
        /// 显示全部日志，默认取决于 console-expanded 偏好
        #[arg(long, conflicts_with = "compact")]
        all: bool,

        /// 只显示标题、阶段、状态和统计
        #[arg(long)]
        compact: bool,
    },

    /// 管理歌单订阅
    Subs {
        #[command(subcommand)]
        command: SubsCommand,
    },

    /// 查看订阅调度器状态
    Scheduler,

    /// 查看或修改本地偏好
    Prefs {
        #[command(subcommand)]
        command: Option<PrefsCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubsCommand {
    /// 列出订阅
    List,

    /// 添加订阅
    Add {
        url: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_name = "N")]
        max_items: Option<u32>,
    },

    /// 修改订阅
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        #[arg(long)]
        disable: bool,

        #[arg(long, value_name = "N")]
        max_items: Option<u32>,
    },

    /// 删除订阅
    Remove { id: String },

    /// 立即同步一个订阅
    Sync { id: String },

    /// 立即同步所有订阅
    SyncAll,
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// 显示当前偏好
    Show,

    /// 设置主题
    Theme {
        #[arg(value_enum)]
        theme: Theme,
    },

    /// 设置日志面板是否默认展开
    ConsoleExpanded {
        #[arg(action = clap::ArgAction::Set)]
        expanded: bool,
    },
}
