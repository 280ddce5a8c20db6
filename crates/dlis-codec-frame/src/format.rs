//! 帧格式串。
//!
//! # 教案定位（Why）
//! - 一个帧的每一行是若干通道值的拼接，通道的表示码由上游的 FRAME/CHANNEL 对象集合确定，
//!   以「一个字符一个表示码」的格式串交给解码器；
//! - 调用方可能只关心部分通道，因此格式被拆成三段：`pre`（跳过）、`fields`（解码）、`post`（跳过）。
//!
//! # 契约说明（What）
//! - [`FormatSpan::parse`] 拒绝任何未知符号；空串是合法的空段；
//! - [`FrameFormat::new`] 额外要求 `fields` 非空；
//! - [`FormatSpan::source_width`] 计算一段格式在给定字节上消费的源宽度，变长编码逐个读取长度前缀。

use dlis_core::{ByteCursor, OutOfBounds, RepresentationCode};

use crate::error::{DecodeError, DecodeErrorKind, Result};

/// 一段格式串解析后的表示码序列。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatSpan {
    codes: Vec<RepresentationCode>,
}

impl FormatSpan {
    /// 解析格式串。
    pub fn parse(text: &str) -> Result<Self> {
        let codes = text
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                RepresentationCode::from_symbol(symbol).ok_or_else(|| {
                    DecodeError::new(DecodeErrorKind::InvalidFormat { symbol, position })
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { codes })
    }

    /// 由表示码序列直接构造。
    #[must_use]
    pub fn from_codes(codes: Vec<RepresentationCode>) -> Self {
        Self { codes }
    }

    /// 表示码序列。
    #[must_use]
    pub fn codes(&self) -> &[RepresentationCode] {
        &self.codes
    }

    /// 表示码个数。
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// 是否为空段。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// 还原为格式串。
    #[must_use]
    pub fn to_format_string(&self) -> String {
        self.codes.iter().map(|code| code.symbol()).collect()
    }

    /// 计算本段在 `bytes` 开头消费的源字节数。
    ///
    /// 越界时返回的偏移相对 `bytes` 起点。
    pub fn source_width(&self, bytes: &[u8]) -> core::result::Result<usize, OutOfBounds> {
        let mut cursor = ByteCursor::new(bytes);
        self.skip(&mut cursor)?;
        Ok(cursor.position())
    }

    /// 在游标上跳过本段；失败时游标回到段首。
    pub fn skip(&self, cursor: &mut ByteCursor<'_>) -> core::result::Result<(), OutOfBounds> {
        let start = *cursor;
        for &code in &self.codes {
            if let Err(err) = cursor.skip(code) {
                *cursor = start;
                return Err(err);
            }
        }
        Ok(())
    }
}

/// 帧的三段格式：跳过段、解码段、跳过段。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFormat {
    pre: FormatSpan,
    fields: FormatSpan,
    post: FormatSpan,
}

impl FrameFormat {
    /// 解析三段格式串；`fields` 不得为空。
    pub fn new(pre: &str, fields: &str, post: &str) -> Result<Self> {
        Self::from_spans(
            FormatSpan::parse(pre)?,
            FormatSpan::parse(fields)?,
            FormatSpan::parse(post)?,
        )
    }

    /// 只解码、不跳过任何字段的格式。
    pub fn fields_only(fields: &str) -> Result<Self> {
        Self::new("", fields, "")
    }

    /// 由已解析的三段构造。
    pub fn from_spans(pre: FormatSpan, fields: FormatSpan, post: FormatSpan) -> Result<Self> {
        if fields.is_empty() {
            return Err(DecodeErrorKind::EmptyFieldFormat.into());
        }
        Ok(Self { pre, fields, post })
    }

    /// 选中字段之前的跳过段。
    #[must_use]
    pub fn pre(&self) -> &FormatSpan {
        &self.pre
    }

    /// 需要解码的字段。
    #[must_use]
    pub fn fields(&self) -> &FormatSpan {
        &self.fields
    }

    /// 选中字段之后的跳过段。
    #[must_use]
    pub fn post(&self) -> &FormatSpan {
        &self.post
    }
}
