//! 帧解码错误。
//!
//! # 教案定位（Why）
//! - 帧解码失败时调用方需要知道三件事：出了什么错（[`DecodeErrorKind`]）、在哪条记录（`record_index`）、
//!   在记录的哪个字节偏移（`offset`）。原语层的 [`OutOfBounds`] 只携带偏移与宽度，由解码器补齐其余上下文。
//!
//! # 契约说明（What）
//! - 前置条件类错误（格式非法、布局不匹配）在读取任何记录之前返回，`record_index` 为 `None`；
//! - `offset` 指向失败读取所属单元（字段、行号、前缀或跳过段）的起始偏移；
//! - 任何错误都终止整次调用，已经提交的行保留在目标缓冲中。

use core::fmt;

use dlis_core::{OutOfBounds, RecordError, RepresentationCode};
use thiserror::Error;

/// 解码结果别名。
pub type Result<T, E = DecodeError> = core::result::Result<T, E>;

/// 越界发生时解码器所处的读取阶段。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadContext {
    /// 记录开头的 OBNAME 前缀。
    FramePrefix,
    /// 行首的 UVARI 帧号。
    RowIndex,
    /// 选中字段之前需要跳过的字段。
    PreSpan,
    /// 第 `column` 个选中字段。
    Field {
        /// 列序号（从 0 开始）。
        column: usize,
        /// 该列的表示码。
        code: RepresentationCode,
    },
    /// 选中字段之后需要跳过的字段。
    PostSpan,
}

impl fmt::Display for ReadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FramePrefix => f.write_str("frame prefix"),
            Self::RowIndex => f.write_str("row index"),
            Self::PreSpan => f.write_str("leading skipped fields"),
            Self::Field { column, code } => write!(f, "column {column} ({code})"),
            Self::PostSpan => f.write_str("trailing skipped fields"),
        }
    }
}

/// 失败类别。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// 读取越过记录末尾。
    #[error("corrupt record: reading {context} needs {needed} bytes, {available} left")]
    CorruptRecord {
        /// 越界时的读取阶段。
        context: ReadContext,
        /// 声明的读取宽度。
        needed: usize,
        /// 剩余字节数。
        available: usize,
    },
    /// 记录已加密。
    #[error("unable to decode encrypted record")]
    EncryptedRecord,
    /// 一条记录包含多于一行。
    #[error("multiple frames in one record are not supported ({trailing} trailing bytes)")]
    NotImplemented {
        /// 首行之后剩余的字节数。
        trailing: usize,
    },
    /// 标识符长度超过槽位容量。
    #[error("identifier of {length} characters exceeds the slot capacity of {capacity}")]
    FieldTooLong {
        /// 标识符长度。
        length: usize,
        /// 槽位容量。
        capacity: usize,
    },
    /// 记录来源无法提供记录。
    #[error("record unavailable: {0}")]
    RecordUnavailable(#[source] RecordError),
    /// DTIME 分量不构成合法的日期时间。
    #[error("date/time components do not form a valid timestamp")]
    InvalidTimestamp,
    /// 格式串中出现未知符号。
    #[error("invalid format symbol {symbol:?} at position {position}")]
    InvalidFormat {
        /// 非法符号。
        symbol: char,
        /// 符号在格式串中的字符位置。
        position: usize,
    },
    /// 选中字段格式为空。
    #[error("field format must select at least one column")]
    EmptyFieldFormat,
    /// 目标缓冲的列布局与字段格式不一致。
    #[error("destination layout does not match the field format")]
    LayoutMismatch,
    /// 目标缓冲的行数与记录索引数量不一致。
    #[error("destination holds {capacity} rows but {requested} records were requested")]
    RowCountMismatch {
        /// 目标缓冲行数。
        capacity: usize,
        /// 请求的记录数。
        requested: usize,
    },
}

/// 带定位信息的解码错误。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    record_index: Option<usize>,
    offset: Option<usize>,
}

impl DecodeError {
    /// 构造不带定位信息的错误。
    #[must_use]
    pub fn new(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            record_index: None,
            offset: None,
        }
    }

    /// 由越界信息构造 `CorruptRecord`，偏移取读取单元的起点。
    #[must_use]
    pub fn corrupt(context: ReadContext, start: usize, err: OutOfBounds) -> Self {
        Self::new(DecodeErrorKind::CorruptRecord {
            context,
            needed: err.needed,
            available: err.available,
        })
        .at_offset(start)
    }

    /// 附加记录索引。
    #[must_use]
    pub fn in_record(mut self, index: usize) -> Self {
        self.record_index = Some(index);
        self
    }

    /// 附加字节偏移。
    #[must_use]
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 失败类别。
    #[must_use]
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// 出错记录的索引（调用方传入的记录编号）。
    #[must_use]
    pub fn record_index(&self) -> Option<usize> {
        self.record_index
    }

    /// 出错读取单元在记录内的起始偏移。
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        match (self.record_index, self.offset) {
            (Some(record), Some(offset)) => write!(f, " (record {record}, offset {offset})"),
            (Some(record), None) => write!(f, " (record {record})"),
            (None, Some(offset)) => write!(f, " (offset {offset})"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            DecodeErrorKind::RecordUnavailable(err) => Some(err),
            _ => None,
        }
    }
}
