//! 帧行解码器。
//!
//! # 教案定位（Why）
//! - FDATA 记录的结构是固定的：OBNAME 前缀，随后一个 UVARI 帧号加一行字段值。解码器按调用方给出的
//!   记录顺序逐条处理，把每一行写入目标缓冲的下一行。
//!
//! # 契约说明（What）
//! - **前置条件**：目标缓冲行数等于记录索引数，布局由同一字段格式与配置导出；违反时在读取任何记录前失败；
//! - **行的原子性**：一行先完整读入暂存区，确认记录恰好耗尽后才提交，失败的记录不会留下半行；
//! - **失败语义**：任何错误终止整次调用，之前提交的行保留，不回滚；
//! - **帧号**：与期望值不符时记录 [`SequenceAnomaly`] 并按 [`SequencePolicy`] 推进，不中止解码。
//!
//! # 实现策略（How）
//! - 每条记录走一个显式状态机：`ExpectPrefix → ExpectRow → RecordExhausted`，
//!   前缀之后即耗尽的记录直接进入 `RecordExhausted`，计为空记录；
//! - 跳过段 `pre` 位于帧号之后、选中字段之前，`post` 位于选中字段之后。

use dlis_core::{
    ByteCursor, ConfigError, DecoderConfig, ObName, Record, RecordSource, SequencePolicy,
};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
    buffer::FrameBuffer,
    dispatch::{self, ColumnValue, FieldError},
    error::{DecodeError, DecodeErrorKind, ReadContext, Result},
    format::{FormatSpan, FrameFormat},
    layout::RowLayout,
    slot,
};

/// 帧号与期望值不一致。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceAnomaly {
    /// 出现异常的记录索引。
    pub record_index: usize,
    /// 期望帧号。
    pub expected: u32,
    /// 实际帧号。
    pub found: u32,
}

/// 一次解码调用的结果摘要。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// 提交到目标缓冲的行数。
    pub rows_written: usize,
    /// 只有前缀、没有行的记录数。
    pub empty_records: usize,
    /// 下一行的期望帧号。
    pub next_expected: u32,
    /// 帧号异常。
    pub anomalies: SmallVec<[SequenceAnomaly; 4]>,
}

/// 帧行解码器。
#[derive(Clone, Debug, Default)]
pub struct FrameDecoder {
    config: DecoderConfig,
}

/// 单条记录的处理阶段。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecordState {
    ExpectPrefix,
    ExpectRow,
    RecordExhausted,
}

/// 已读入、尚未提交的一行。
struct StagedRow<'a> {
    found: u32,
    values: Vec<ColumnValue<'a>>,
}

impl FrameDecoder {
    /// 以校验过的配置构造解码器。
    pub fn new(config: DecoderConfig) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 当前配置。
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// 按本解码器配置为 `format` 分配 `rows` 行的目标缓冲。
    #[must_use]
    pub fn buffer_for(&self, format: &FrameFormat, rows: usize) -> FrameBuffer {
        FrameBuffer::for_format(format, &self.config, rows)
    }

    /// 依次解码 `indices` 指向的记录，第 k 个产出的行写入目标第 k 行。
    pub fn decode(
        &self,
        format: &FrameFormat,
        source: &dyn RecordSource,
        indices: &[usize],
        dst: &mut FrameBuffer,
    ) -> Result<DecodeReport> {
        self.check_destination(format, indices, dst)?;

        let mut report = DecodeReport {
            next_expected: self.config.first_row_index,
            ..DecodeReport::default()
        };
        for &index in indices {
            let record = source.record(index).map_err(|err| {
                DecodeError::new(DecodeErrorKind::RecordUnavailable(err)).in_record(index)
            })?;
            self.decode_record(index, &record, format, dst, &mut report)
                .map_err(|err| err.in_record(index))?;
        }

        debug!(
            records = indices.len(),
            rows = report.rows_written,
            empty = report.empty_records,
            anomalies = report.anomalies.len(),
            "frame data decoded"
        );
        Ok(report)
    }

    fn check_destination(
        &self,
        format: &FrameFormat,
        indices: &[usize],
        dst: &FrameBuffer,
    ) -> Result<()> {
        if dst.rows() != indices.len() {
            return Err(DecodeErrorKind::RowCountMismatch {
                capacity: dst.rows(),
                requested: indices.len(),
            }
            .into());
        }
        if *dst.layout() != RowLayout::for_format(format, &self.config) {
            return Err(DecodeErrorKind::LayoutMismatch.into());
        }
        Ok(())
    }

    fn decode_record(
        &self,
        index: usize,
        record: &Record,
        format: &FrameFormat,
        dst: &mut FrameBuffer,
        report: &mut DecodeReport,
    ) -> Result<()> {
        if record.is_encrypted() {
            return Err(DecodeErrorKind::EncryptedRecord.into());
        }

        let mut cursor = ByteCursor::new(record.bytes());
        let mut state = RecordState::ExpectPrefix;
        loop {
            state = match state {
                RecordState::ExpectPrefix => {
                    let start = cursor.position();
                    let (origin, copy) = ObName::read_without_id(&mut cursor)
                        .map_err(|err| DecodeError::corrupt(ReadContext::FramePrefix, start, err))?;
                    debug!(
                        record = index,
                        origin,
                        copy,
                        len = cursor.end(),
                        consistent = record.is_consistent(),
                        "frame data record"
                    );
                    if cursor.is_exhausted() {
                        report.empty_records += 1;
                        RecordState::RecordExhausted
                    } else {
                        RecordState::ExpectRow
                    }
                }
                RecordState::ExpectRow => {
                    let row = self.read_row(&mut cursor, format)?;
                    if !cursor.is_exhausted() {
                        return Err(DecodeError::new(DecodeErrorKind::NotImplemented {
                            trailing: cursor.remaining(),
                        })
                        .at_offset(cursor.position()));
                    }
                    slot::commit_row(dst, report.rows_written, row.values)?;
                    report.rows_written += 1;
                    self.advance_sequence(index, row.found, report);
                    trace!(record = index, row = row.found, "frame row committed");
                    RecordState::RecordExhausted
                }
                RecordState::RecordExhausted => return Ok(()),
            };
        }
    }

    fn read_row<'a>(
        &self,
        cursor: &mut ByteCursor<'a>,
        format: &FrameFormat,
    ) -> Result<StagedRow<'a>> {
        let start = cursor.position();
        let found = cursor
            .uvari()
            .map_err(|err| DecodeError::corrupt(ReadContext::RowIndex, start, err))?;

        skip_span(cursor, format.pre(), ReadContext::PreSpan)?;

        let fields = format.fields().codes();
        let mut values = Vec::with_capacity(fields.len());
        for (column, &code) in fields.iter().enumerate() {
            let start = cursor.position();
            let value = dispatch::read_field(cursor, code, self.config.ident_capacity)
                .map_err(|err| field_error(err, ReadContext::Field { column, code }, start))?;
            values.push(value);
        }

        skip_span(cursor, format.post(), ReadContext::PostSpan)?;
        Ok(StagedRow { found, values })
    }

    fn advance_sequence(&self, index: usize, found: u32, report: &mut DecodeReport) {
        let expected = report.next_expected;
        if found != expected {
            if self.config.log_anomalies {
                warn!(record = index, expected, found, "non-sequential frame row");
            }
            report.anomalies.push(SequenceAnomaly {
                record_index: index,
                expected,
                found,
            });
        }
        let base = match self.config.sequence_policy {
            SequencePolicy::Reset => found,
            SequencePolicy::KeepExpecting => expected,
        };
        report.next_expected = base.saturating_add(1);
    }
}

fn skip_span(cursor: &mut ByteCursor<'_>, span: &FormatSpan, context: ReadContext) -> Result<()> {
    let start = cursor.position();
    span.skip(cursor)
        .map_err(|err| DecodeError::corrupt(context, start, err))
}

fn field_error(err: FieldError, context: ReadContext, start: usize) -> DecodeError {
    match err {
        FieldError::OutOfBounds(err) => DecodeError::corrupt(context, start, err),
        FieldError::TooLong { length, capacity } => {
            DecodeError::new(DecodeErrorKind::FieldTooLong { length, capacity }).at_offset(start)
        }
        FieldError::InvalidTimestamp => {
            DecodeError::new(DecodeErrorKind::InvalidTimestamp).at_offset(start)
        }
    }
}

/// 以默认配置解析三段格式串并解码。
pub fn decode_frame_rows(
    pre: &str,
    fields: &str,
    post: &str,
    source: &dyn RecordSource,
    indices: &[usize],
    dst: &mut FrameBuffer,
) -> Result<DecodeReport> {
    let format = FrameFormat::new(pre, fields, post)?;
    FrameDecoder::default().decode(&format, source, indices, dst)
}
