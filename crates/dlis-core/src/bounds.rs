//! 边界守卫与只进游标。
//!
//! # 教案定位（Why）
//! - 逻辑记录没有校验和，也没有重同步机制：唯一的损坏检测手段是在每次读取前确认
//!   `cursor + n <= end`。把这条规则收敛到 [`check`] 与 [`ByteCursor`]，所有读取路径共享同一实现。
//!
//! # 契约说明（What）
//! - 游标只前进不后退；
//! - 任何读取在越界时返回 [`OutOfBounds`]，且游标保持原位；
//! - 变长编码先检查前缀宽度，再检查正文宽度。

use crate::{error::OutOfBounds, primitive, repcode::RepresentationCode};

/// 边界守卫：确认从 `cursor` 起读取 `n` 字节不会越过 `end`。
///
/// 加法溢出同样视为越界。
pub fn check(cursor: usize, end: usize, n: usize) -> Result<(), OutOfBounds> {
    match cursor.checked_add(n) {
        Some(stop) if stop <= end => Ok(()),
        _ => Err(OutOfBounds {
            offset: cursor,
            needed: n,
            available: end.saturating_sub(cursor),
        }),
    }
}

/// 记录字节区间上的只进游标。
#[derive(Clone, Copy, Debug)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// 在记录字节上创建游标，起点为 0。
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// 当前偏移。
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// 记录末尾（开区间）。
    #[must_use]
    pub const fn end(&self) -> usize {
        self.bytes.len()
    }

    /// 剩余字节数。
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// 游标是否恰好位于记录末尾。
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.position == self.bytes.len()
    }

    /// 剩余字节的只读视图。
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }

    /// 边界守卫：确认还能读取 `n` 字节。
    pub fn ensure(&self, n: usize) -> Result<(), OutOfBounds> {
        check(self.position, self.bytes.len(), n)
    }

    /// 跳过 `n` 字节。
    pub fn advance(&mut self, n: usize) -> Result<(), OutOfBounds> {
        self.ensure(n)?;
        self.position += n;
        Ok(())
    }

    /// 读取 `n` 字节切片。
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], OutOfBounds> {
        self.ensure(n)?;
        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    /// 读取定长数组，供定长原语使用。
    pub fn array<const N: usize>(&mut self) -> Result<&'a [u8; N], OutOfBounds> {
        self.ensure(N)?;
        let chunk = self.rest().first_chunk::<N>().ok_or(OutOfBounds {
            offset: self.position,
            needed: N,
            available: self.remaining(),
        })?;
        self.position += N;
        Ok(chunk)
    }

    /// 读取 UVARI（ORIGIN 同此编码）。
    pub fn uvari(&mut self) -> Result<u32, OutOfBounds> {
        self.ensure(1)?;
        let width = primitive::uvari_width(self.bytes[self.position]);
        self.ensure(width)?;
        let (value, consumed) = primitive::uvari(self.rest()).ok_or(OutOfBounds {
            offset: self.position,
            needed: width,
            available: self.remaining(),
        })?;
        self.position += consumed;
        Ok(value)
    }

    /// 读取 IDENT / UNITS 正文。
    pub fn ident(&mut self) -> Result<&'a [u8], OutOfBounds> {
        self.ensure(1)?;
        let len = usize::from(self.bytes[self.position]);
        self.ensure(1 + len)?;
        self.position += 1;
        self.take(len)
    }

    /// 读取 ASCII 正文：UVARI 长度 + 原始字节。
    pub fn ascii(&mut self) -> Result<&'a [u8], OutOfBounds> {
        let start = self.position;
        let len = self.uvari()?;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        match self.take(len) {
            Ok(body) => Ok(body),
            Err(err) => {
                self.position = start;
                Err(err)
            }
        }
    }

    /// 跳过一个按 `code` 编码的值，不产生输出。
    pub fn skip(&mut self, code: RepresentationCode) -> Result<(), OutOfBounds> {
        if let Some(width) = code.fixed_width() {
            return self.advance(width);
        }

        let start = self.position;
        let outcome = match code {
            RepresentationCode::Uvari | RepresentationCode::Origin => self.uvari().map(|_| ()),
            RepresentationCode::Ident | RepresentationCode::Units => self.ident().map(|_| ()),
            RepresentationCode::Ascii => self.ascii().map(|_| ()),
            RepresentationCode::Obname => self.skip_obname(),
            RepresentationCode::Objref => self.ident().and_then(|_| self.skip_obname()),
            RepresentationCode::Attref => self
                .ident()
                .and_then(|_| self.skip_obname())
                .and_then(|_| self.ident().map(|_| ())),
            // 定长编码已在上方处理。
            _ => Ok(()),
        };
        if outcome.is_err() {
            self.position = start;
        }
        outcome
    }

    fn skip_obname(&mut self) -> Result<(), OutOfBounds> {
        self.uvari()?;
        self.advance(1)?;
        self.ident().map(|_| ())
    }
}
