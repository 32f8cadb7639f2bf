pub mod config;
pub mod constants;
pub mod media;
pub mod session;
pub mod storage;
