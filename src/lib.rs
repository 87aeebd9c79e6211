pub mod cache;
pub mod config;
pub mod error;
pub mod markdown;
pub mod resume;
pub mod service;
pub mod source;
pub mod template;
