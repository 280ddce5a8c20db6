#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # dlis-core
//!
//! ## 教案目的（Why）
//! - **定位**：RP66 v1（DLIS）逻辑记录解码的公共基座，为帧数据解码器（`dlis-codec-frame`）以及未来的对象集合解析提供统一原语。
//! - **架构角色**：位于依赖图最底层，只负责「字节 → 值」的纯函数映射、越界守卫、身份值与记录契约，不涉及任何文件 I/O。
//! - **设计策略**：原语编解码以定长数组为入参，将「读取前必须完成边界检查」的约束交给类型系统；变长编码统一经由 [`ByteCursor`] 读取。
//!
//! ## 交互契约（What）
//! - [`RepresentationCode`]：27 个表示码的封闭枚举，提供编号、名称、格式符号三种查找方式；
//! - [`primitive`]：每个表示码一个解码函数，永不分配、永不越界；
//! - [`ByteCursor`]：边界守卫 + 只进游标，越界统一返回 [`OutOfBounds`]；
//! - [`identity`]：`OBNAME` / `OBJREF` / `ATTREF` 三类身份值及其指纹；
//! - [`record`]：逻辑记录模型与 [`RecordSource`] 抽象；
//! - [`config`]：解码器配置（serde + toml）；
//! - [`observability`]：基于 `tracing-subscriber` 的日志安装入口。
//!
//! ## 风险提示（Trade-offs）
//! - 浮点原语（IBM/VAX/FSHORT）通过 `f64` 中间值换算，极端指数下可能与硬件实现存在最后一位差异；
//! - 文本原语只返回借用切片，字符集解释留给上层决定。

pub mod bounds;
pub mod config;
pub mod error;
pub mod identity;
pub mod observability;
pub mod primitive;
pub mod record;
pub mod repcode;

pub use crate::{
    bounds::ByteCursor,
    config::{DecoderConfig, DecoderConfigBuilder, SequencePolicy},
    error::{ConfigError, IdentityError, OutOfBounds, RecordError},
    identity::{AttRef, ObName, ObjRef, fingerprint},
    record::{MemoryRecordSource, Record, RecordFlags, RecordSource},
    repcode::RepresentationCode,
};
