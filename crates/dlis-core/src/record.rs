//! 逻辑记录模型与记录来源抽象。
//!
//! # 教案定位（Why）
//! - 帧解码器不负责物理记录的定位与拼接；它只需要「按索引取得一条已拼好的逻辑记录」。
//!   [`RecordSource`] 把这一能力抽象成 trait，文件读取器、内存映射或测试桩都可以实现。
//!
//! # 契约说明（What）
//! - [`Record::bytes`] 为逻辑记录正文（不含段头/段尾）；
//! - 加密标志为真时正文不可解释，调用方不得解码；
//! - `consistent` 为假表示拼接过程中发现了段属性不一致，正文仍可尝试解码。

use bytes::Bytes;

use crate::error::RecordError;

/// 逻辑记录的属性标志。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordFlags {
    /// 显式格式逻辑记录（EFLR）；帧数据属于间接格式（IFLR），此位为假。
    pub explicit: bool,
    /// 正文已加密。
    pub encrypted: bool,
    /// 各段属性一致。
    pub consistent: bool,
}

impl RecordFlags {
    /// 间接格式、未加密、一致的记录，即常规 FDATA 记录的标志。
    #[must_use]
    pub const fn indirect() -> Self {
        Self {
            explicit: false,
            encrypted: false,
            consistent: true,
        }
    }
}

/// 一条已拼接完成的逻辑记录。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    record_type: u8,
    flags: RecordFlags,
    data: Bytes,
}

/// FDATA 在间接格式逻辑记录中的类型编号。
pub const FDATA_RECORD_TYPE: u8 = 0;

impl Record {
    /// 构造记录。
    #[must_use]
    pub fn new(record_type: u8, flags: RecordFlags, data: impl Into<Bytes>) -> Self {
        Self {
            record_type,
            flags,
            data: data.into(),
        }
    }

    /// 以常规 FDATA 标志构造记录。
    #[must_use]
    pub fn fdata(data: impl Into<Bytes>) -> Self {
        Self::new(FDATA_RECORD_TYPE, RecordFlags::indirect(), data)
    }

    /// 记录正文。
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// 逻辑记录类型编号。
    #[must_use]
    pub const fn record_type(&self) -> u8 {
        self.record_type
    }

    /// 属性标志。
    #[must_use]
    pub const fn flags(&self) -> RecordFlags {
        self.flags
    }

    /// 是否为显式格式记录。
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.flags.explicit
    }

    /// 是否加密。
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.flags.encrypted
    }

    /// 段属性是否一致。
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.flags.consistent
    }
}

/// 按索引提供逻辑记录的来源。
///
/// - **前置条件**：实现方在返回前完成段拼接，正文必须完整；
/// - **后置条件**：无效索引返回 [`RecordError::NotFound`]，不得 panic。
pub trait RecordSource {
    /// 取得第 `index` 条逻辑记录。
    fn record(&self, index: usize) -> Result<Record, RecordError>;

    /// 按给定顺序批量取出记录。
    fn extract(&self, indices: &[usize]) -> Result<Vec<Record>, RecordError> {
        indices.iter().map(|&index| self.record(index)).collect()
    }
}

/// 内存中的记录表。
#[derive(Clone, Debug, Default)]
pub struct MemoryRecordSource {
    records: Vec<Record>,
}

impl MemoryRecordSource {
    /// 由记录列表构造。
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// 追加一条记录并返回其索引。
    pub fn push(&mut self, record: Record) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    /// 记录条数。
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for MemoryRecordSource {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl RecordSource for MemoryRecordSource {
    fn record(&self, index: usize) -> Result<Record, RecordError> {
        // `Bytes` 克隆只增加引用计数。
        self.records
            .get(index)
            .cloned()
            .ok_or(RecordError::NotFound { index })
    }
}
