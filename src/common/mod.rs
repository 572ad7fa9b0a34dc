pub mod api {
    pub mod models {
        pub mod album;
        pub mod common;
        pub mod job;
        pub mod log;
        pub mod search;
        pub mod subscription;
    }
    pub mod client;
    pub mod error;
}

pub mod config;
pub mod logger;
pub mod prefs;
