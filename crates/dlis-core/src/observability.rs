//! 日志安装入口。
//!
//! # 教案定位（Why）
//! - 解码器通过 `tracing` 宏输出事件（记录级 `debug`、帧号异常 `warn`），库本身不安装 Subscriber；
//!   可执行程序或集成测试调用 [`install`] 一次即可获得 `fmt + EnvFilter` 输出。
//!
//! # 契约说明（What）
//! - 过滤规则读取 `RUST_LOG`，缺省为 `info`；
//! - 重复调用返回 [`InstallError::AlreadyInstalled`]；外部已设置全局 Subscriber 时返回
//!   [`InstallError::SubscriberAlreadySet`]，不会覆盖。

use std::sync::OnceLock;

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// 安装过程中的失败路径。
#[derive(Debug, Error)]
pub enum InstallError {
    /// [`install`] 已成功执行过。
    #[error("dlis observability is already installed")]
    AlreadyInstalled,
    /// 进程内已存在其他全局 Subscriber。
    #[error("a global tracing subscriber has already been set")]
    SubscriberAlreadySet,
    /// 设置全局 Subscriber 的底层错误。
    #[error("failed to set the global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 安装 `fmt + EnvFilter` 全局 Subscriber。
pub fn install() -> Result<(), InstallError> {
    if INSTALLED.get().is_some() {
        return Err(InstallError::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(InstallError::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    INSTALLED
        .set(())
        .map_err(|_| InstallError::AlreadyInstalled)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
