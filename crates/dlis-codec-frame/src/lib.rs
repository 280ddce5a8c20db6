#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # dlis-codec-frame
//!
//! ## 教案目的（Why）
//! - **定位**：DLIS 帧数据（FDATA）行解码器，把一组逻辑记录解码为定长行的列式缓冲。
//! - **架构角色**：位于 `dlis-core` 之上，消费其原语、身份值与记录来源抽象；不关心记录如何从文件中定位。
//! - **设计策略**：读取与写入分离。分派层只读源字节并产出值，槽位写入器只负责提交；
//!   一行在记录耗尽校验通过之后才整体落入目标缓冲。
//!
//! ## 交互契约（What）
//! - [`FrameFormat`]：`pre` / `fields` / `post` 三段格式串；
//! - [`RowLayout`] / [`FrameBuffer`]：由字段格式导出的行布局与目标缓冲，堆对象存放在 [`ObjectCell`]；
//! - [`FrameDecoder::decode`] / [`decode_frame_rows`]：入口，返回 [`DecodeReport`] 或 [`DecodeError`]；
//! - 帧号异常通过 `tracing::warn!` 输出并累积在报告中，不中止解码。
//!
//! ## 风险提示（Trade-offs）
//! - 一条记录只支持一行，多行记录返回 [`DecodeErrorKind::NotImplemented`]；
//! - DTIME 的时区信息不保留。

pub mod buffer;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod layout;
pub mod slot;

pub use crate::{
    buffer::{FieldObject, FieldValue, FrameBuffer, ObjectCell, TextValue},
    decoder::{DecodeReport, FrameDecoder, SequenceAnomaly, decode_frame_rows},
    error::{DecodeError, DecodeErrorKind, ReadContext, Result},
    format::{FormatSpan, FrameFormat},
    layout::{Column, RowLayout, Storage},
};
