//! 原语编解码目录：每个 RP66 v1 表示码一个纯函数。
//!
//! # 教案定位（Why）
//! - 帧数据与对象集合都建立在同一组字节原语之上，集中实现可单独测试、可被多个解析路径复用；
//! - 原语本身不做边界检查：定长原语以 `&[u8; N]` 为入参，由类型保证输入宽度，调用方须先经过
//!   [`ByteCursor`](crate::ByteCursor) 的边界守卫取得数组引用。
//!
//! # 契约说明（What）
//! - 所有多字节数值均为大端序；
//! - 定长原语消费的字节数即数组长度 `N`，与 [`RepresentationCode::fixed_width`](crate::RepresentationCode::fixed_width) 一致；
//! - 变长原语（UVARI/IDENT/ASCII）返回 `Option<(value, consumed)>`，输入不足时返回 `None`，绝不越界；
//! - 任何原语都不分配内存，文本原语返回借用切片。
//!
//! # 实现策略（How）
//! - IEEE 浮点直接使用 `from_be_bytes`；
//! - FSHORT / ISINGL / VSINGL 按各自的尾数/指数布局换算，经 `f64` 中间值后收窄为 `f32`。

use chrono::{NaiveDate, NaiveDateTime};

/// DTIME 年份字段的纪元偏移（年份以 1900 为零点存储）。
pub const YEAR_ORIGIN: i32 = 1900;

/// 从定长数组中截取子数组。
fn sub<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

/// FSHORT：12 bit 二进制补码尾数（含符号）+ 4 bit 无符号指数。
///
/// 数值 = `mantissa / 2^11 * 2^exponent`。
#[must_use]
pub fn fshort(bytes: &[u8; 2]) -> f32 {
    let raw = u16::from_be_bytes(*bytes);
    let exponent = i32::from(raw & 0x000f);
    // 算术右移保留尾数符号。
    let mantissa = f32::from((raw as i16) >> 4);
    mantissa / 2048.0 * 2f32.powi(exponent)
}

/// FSINGL：IEEE 754 单精度。
#[must_use]
pub fn fsingl(bytes: &[u8; 4]) -> f32 {
    f32::from_be_bytes(*bytes)
}

/// FSING1：`(value, bound)`。
#[must_use]
pub fn fsing1(bytes: &[u8; 8]) -> (f32, f32) {
    (fsingl(&sub(bytes, 0)), fsingl(&sub(bytes, 4)))
}

/// FSING2：`(value, lower, upper)`。
#[must_use]
pub fn fsing2(bytes: &[u8; 12]) -> (f32, f32, f32) {
    (
        fsingl(&sub(bytes, 0)),
        fsingl(&sub(bytes, 4)),
        fsingl(&sub(bytes, 8)),
    )
}

/// ISINGL：IBM System/360 单精度（1 bit 符号、7 bit 16 进制偏移 64 指数、24 bit 小数）。
#[must_use]
pub fn isingl(bytes: &[u8; 4]) -> f32 {
    let raw = u32::from_be_bytes(*bytes);
    let sign = if raw & 0x8000_0000 != 0 { -1.0 } else { 1.0 };
    let exponent = ((raw >> 24) & 0x7f) as i32;
    let fraction = f64::from(raw & 0x00ff_ffff) / 16_777_216.0;
    (sign * fraction * 16f64.powi(exponent - 64)) as f32
}

/// VSINGL：VAX F-floating，字节在 16 bit 字内交换存放。
///
/// 指数为 0 且符号位为 0 表示零；指数为 0 且符号位为 1 属保留操作数，返回 NaN。
#[must_use]
pub fn vsingl(bytes: &[u8; 4]) -> f32 {
    let raw = u32::from_be_bytes([bytes[1], bytes[0], bytes[3], bytes[2]]);
    let negative = raw & 0x8000_0000 != 0;
    let exponent = ((raw >> 23) & 0xff) as i32;
    let fraction = f64::from(raw & 0x007f_ffff);

    if exponent == 0 {
        return if negative { f32::NAN } else { 0.0 };
    }

    let magnitude = (0.5 + fraction / 16_777_216.0) * 2f64.powi(exponent - 128);
    if negative {
        -magnitude as f32
    } else {
        magnitude as f32
    }
}

/// FDOUBL：IEEE 754 双精度。
#[must_use]
pub fn fdoubl(bytes: &[u8; 8]) -> f64 {
    f64::from_be_bytes(*bytes)
}

/// FDOUB1：`(value, bound)`。
#[must_use]
pub fn fdoub1(bytes: &[u8; 16]) -> (f64, f64) {
    (fdoubl(&sub(bytes, 0)), fdoubl(&sub(bytes, 8)))
}

/// FDOUB2：`(value, lower, upper)`。
#[must_use]
pub fn fdoub2(bytes: &[u8; 24]) -> (f64, f64, f64) {
    (
        fdoubl(&sub(bytes, 0)),
        fdoubl(&sub(bytes, 8)),
        fdoubl(&sub(bytes, 16)),
    )
}

/// CSINGL：`(real, imaginary)`。
#[must_use]
pub fn csingl(bytes: &[u8; 8]) -> (f32, f32) {
    fsing1(bytes)
}

/// CDOUBL：`(real, imaginary)`。
#[must_use]
pub fn cdoubl(bytes: &[u8; 16]) -> (f64, f64) {
    fdoub1(bytes)
}

/// SSHORT。
#[must_use]
pub fn sshort(bytes: &[u8; 1]) -> i8 {
    i8::from_be_bytes(*bytes)
}

/// SNORM。
#[must_use]
pub fn snorm(bytes: &[u8; 2]) -> i16 {
    i16::from_be_bytes(*bytes)
}

/// SLONG。
#[must_use]
pub fn slong(bytes: &[u8; 4]) -> i32 {
    i32::from_be_bytes(*bytes)
}

/// USHORT。
#[must_use]
pub fn ushort(bytes: &[u8; 1]) -> u8 {
    bytes[0]
}

/// UNORM。
#[must_use]
pub fn unorm(bytes: &[u8; 2]) -> u16 {
    u16::from_be_bytes(*bytes)
}

/// ULONG。
#[must_use]
pub fn ulong(bytes: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*bytes)
}

/// STATUS：单字节状态位，原样返回。
#[must_use]
pub fn status(bytes: &[u8; 1]) -> u8 {
    bytes[0]
}

/// 根据 UVARI 首字节判断编码宽度：`0xxxxxxx` → 1，`10xxxxxx` → 2，`11xxxxxx` → 4。
#[must_use]
pub const fn uvari_width(first: u8) -> usize {
    if first & 0x80 == 0 {
        1
    } else if first & 0x40 == 0 {
        2
    } else {
        4
    }
}

/// UVARI / ORIGIN：返回 `(value, consumed)`，输入不足时返回 `None`。
#[must_use]
pub fn uvari(bytes: &[u8]) -> Option<(u32, usize)> {
    let first = *bytes.first()?;
    let width = uvari_width(first);
    let body = bytes.get(..width)?;
    let value = match width {
        1 => u32::from(first),
        2 => u32::from(u16::from_be_bytes([body[0], body[1]]) & 0x3fff),
        _ => u32::from_be_bytes([body[0], body[1], body[2], body[3]]) & 0x3fff_ffff,
    };
    Some((value, width))
}

/// IDENT / UNITS：单字节长度前缀 + 正文，返回 `(body, consumed)`。
#[must_use]
pub fn ident(bytes: &[u8]) -> Option<(&[u8], usize)> {
    let len = usize::from(*bytes.first()?);
    let body = bytes.get(1..1 + len)?;
    Some((body, 1 + len))
}

/// ASCII：UVARI 长度前缀 + 正文，返回 `(body, consumed)`。
#[must_use]
pub fn ascii(bytes: &[u8]) -> Option<(&[u8], usize)> {
    let (len, prefix) = uvari(bytes)?;
    let len = usize::try_from(len).ok()?;
    let end = prefix.checked_add(len)?;
    let body = bytes.get(prefix..end)?;
    Some((body, end))
}

/// DTIME 的原始分量。
///
/// - `year` 为相对 [`YEAR_ORIGIN`] 的偏移，需经 [`normalize_year`] 换算；
/// - `time_zone` 与 `month` 共享一个字节（高 4 bit 时区，低 4 bit 月份）；
/// - `millisecond` 为 UNORM。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DTime {
    /// 距 1900 年的年数。
    pub year: u8,
    /// 时区代码（0 本地标准时、1 本地夏令时、2 GMT）。
    pub time_zone: u8,
    /// 月份（1..=12）。
    pub month: u8,
    /// 日。
    pub day: u8,
    /// 时。
    pub hour: u8,
    /// 分。
    pub minute: u8,
    /// 秒。
    pub second: u8,
    /// 毫秒。
    pub millisecond: u16,
}

/// DTIME 时区代码的语义化视图。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeZone {
    /// 本地标准时间。
    LocalStandard,
    /// 本地夏令时。
    LocalDaylight,
    /// 格林尼治时间。
    Greenwich,
    /// 未定义的代码。
    Unknown(u8),
}

impl DTime {
    /// 换算后的公历年份。
    #[must_use]
    pub fn calendar_year(&self) -> i32 {
        normalize_year(self.year)
    }

    /// 时区代码的语义化视图。
    #[must_use]
    pub fn time_zone(&self) -> TimeZone {
        match self.time_zone {
            0 => TimeZone::LocalStandard,
            1 => TimeZone::LocalDaylight,
            2 => TimeZone::Greenwich,
            other => TimeZone::Unknown(other),
        }
    }

    /// 转换为不带时区的日期时间，精度为微秒；分量不构成合法日历时间时返回 `None`。
    ///
    /// 时区代码在此处被丢弃。
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            self.calendar_year(),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_micro_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
            millis_to_micros(self.millisecond),
        )
    }
}

/// DTIME：8 字节日期时间。
#[must_use]
pub fn dtime(bytes: &[u8; 8]) -> DTime {
    DTime {
        year: bytes[0],
        time_zone: bytes[1] >> 4,
        month: bytes[1] & 0x0f,
        day: bytes[2],
        hour: bytes[3],
        minute: bytes[4],
        second: bytes[5],
        millisecond: u16::from_be_bytes([bytes[6], bytes[7]]),
    }
}

/// 将 DTIME 年份偏移换算为公历年份。
#[must_use]
pub const fn normalize_year(raw: u8) -> i32 {
    raw as i32 + YEAR_ORIGIN
}

/// 毫秒换算为微秒。
#[must_use]
pub const fn millis_to_micros(millis: u16) -> u32 {
    millis as u32 * 1000
}
