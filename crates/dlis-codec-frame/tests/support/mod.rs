//! 集成测试共用的 FDATA 记录构造器。
//!
//! 所有编码均为 RP66 v1 大端布局；构造器只负责拼字节，不做合法性检查，
//! 以便测试刻意制造截断与残留。

#![allow(dead_code)]

use dlis_core::{MemoryRecordSource, Record, RecordFlags};

/// 逐字段拼接一条记录正文。
#[derive(Clone, Debug, Default)]
pub struct RecordBuilder {
    bytes: Vec<u8>,
}

impl RecordBuilder {
    /// 以 OBNAME 前缀开始一条记录。
    pub fn frame(origin: u32, copy: u8, id: &str) -> Self {
        Self::default().obname(origin, copy, id)
    }

    /// 当前长度，便于断言偏移。
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn uvari(mut self, value: u32) -> Self {
        if value < 0x80 {
            self.bytes.push(value as u8);
        } else if value < 0x4000 {
            self.bytes
                .extend_from_slice(&(value as u16 | 0x8000).to_be_bytes());
        } else {
            self.bytes
                .extend_from_slice(&(value | 0xc000_0000).to_be_bytes());
        }
        self
    }

    pub fn fsingl(mut self, value: f32) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn fdoubl(mut self, value: f64) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn slong(mut self, value: i32) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn ushort(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn ident(mut self, text: &str) -> Self {
        self.bytes.push(text.len() as u8);
        self.bytes.extend_from_slice(text.as_bytes());
        self
    }

    pub fn ascii(self, bytes: &[u8]) -> Self {
        let mut this = self.uvari(bytes.len() as u32);
        this.bytes.extend_from_slice(bytes);
        this
    }

    pub fn obname(self, origin: u32, copy: u8, id: &str) -> Self {
        self.uvari(origin).ushort(copy).ident(id)
    }

    pub fn objref(self, object_type: &str, origin: u32, copy: u8, id: &str) -> Self {
        self.ident(object_type).obname(origin, copy, id)
    }

    /// DTIME：年份为相对 1900 的偏移。
    #[allow(clippy::too_many_arguments)]
    pub fn dtime(
        mut self,
        year: u8,
        tz: u8,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millis: u16,
    ) -> Self {
        self.bytes
            .extend_from_slice(&[year, (tz << 4) | month, day, hour, minute, second]);
        self.bytes.extend_from_slice(&millis.to_be_bytes());
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// 截掉末尾 `n` 字节。
    pub fn truncate(mut self, n: usize) -> Self {
        let keep = self.bytes.len().saturating_sub(n);
        self.bytes.truncate(keep);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn build(self) -> Record {
        Record::fdata(self.bytes)
    }

    pub fn build_encrypted(self) -> Record {
        let flags = RecordFlags {
            encrypted: true,
            ..RecordFlags::indirect()
        };
        Record::new(0, flags, self.bytes)
    }
}

/// 把若干记录装入内存来源，并返回顺序索引。
pub fn source(records: Vec<Record>) -> (MemoryRecordSource, Vec<usize>) {
    let indices = (0..records.len()).collect();
    (MemoryRecordSource::new(records), indices)
}
