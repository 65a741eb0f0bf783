pub mod config;
pub mod logging;

pub mod coordinator;
pub mod fetch;
pub mod host_policy;
pub mod info;
pub mod media;
pub mod merge;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod segmenter;
pub mod storage;
