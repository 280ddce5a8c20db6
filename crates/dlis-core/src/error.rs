//! dlis-core 的错误类型定义。
//!
//! # 教案定位（Why）
//! - 原语层只有四类失败：读越界、记录不可用、身份值参数非法、配置非法；
//! - 与上层的帧解码错误解耦，帧解码器在包装时补充记录索引与读取上下文。
//!
//! # 使用契约（What）
//! - 所有错误均实现 `Clone`/`PartialEq`，便于测试直接断言；
//! - 通过 `thiserror` 派生 `std::error::Error`，可直接接入常规错误栈。

use thiserror::Error;

/// 读取请求超出记录字节区间。
///
/// - `offset`：发起读取时游标所在的字节偏移（相对记录起点）；
/// - `needed`：本次读取声明的字节数；
/// - `available`：游标之后剩余的字节数。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("read of {needed} bytes at offset {offset} exceeds the {available} bytes left in the record")]
pub struct OutOfBounds {
    /// 读取起点。
    pub offset: usize,
    /// 声明的读取宽度。
    pub needed: usize,
    /// 剩余可读字节数。
    pub available: usize,
}

/// 记录来源返回的错误。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordError {
    /// 索引不在记录表范围内。
    #[error("no logical record at index {index}")]
    NotFound {
        /// 调用方请求的索引。
        index: usize,
    },
}

/// 构造身份值时的参数错误。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// copy number 超出 USHORT（0..=255）范围。
    #[error("invalid argument, copy out of range: {copy}")]
    CopyOutOfRange {
        /// 调用方传入的 copy number。
        copy: i32,
    },
}

/// 解码器配置错误。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// TOML 文本无法解析为配置结构。
    #[error("failed to parse decoder configuration: {0}")]
    Parse(String),
    /// 标识符槽位容量不在 1..=255。
    #[error("ident capacity {capacity} is outside 1..=255")]
    IdentCapacity {
        /// 配置的容量（单位：码元）。
        capacity: usize,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
