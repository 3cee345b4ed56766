//! 配置管理
//!
//! 配置来源（优先级从低到高）：内置默认值、`config.toml`、`config.{APP_ENV}.toml`、
//! `HWSYSTEM__*` 环境变量，以及少量常用环境变量覆盖。

mod r#impl;
mod structs;

pub use structs::*;
