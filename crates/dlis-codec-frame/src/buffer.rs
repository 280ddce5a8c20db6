//! 目标缓冲与对象槽位。
//!
//! # 教案定位（Why）
//! - 行数据一次性按 `rows × stride` 预分配，解码过程中只覆写，不扩容；
//! - 堆对象（文本、身份值、时间戳）单独存放在 [`ObjectCell`] 中：槽位总是持有一个值（初始为
//!   [`FieldObject::Null`]），覆写时先释放旧值再安装新值，对象槽位从不被当作原始字节处理。
//!
//! # 契约说明（What）
//! - 内联标量以原生字节序存放，[`FrameBuffer::value`] 负责类型化读回；
//! - IDENT/UNITS 槽位为 `capacity` 个 `u32` 码元，未使用部分为 0；
//! - [`ObjectCell::handle`] 返回共享引用，便于调用方在不复制对象的情况下持有结果。

use std::sync::Arc;

use chrono::NaiveDateTime;
use dlis_core::{AttRef, DecoderConfig, ObName, ObjRef, RepresentationCode};

use crate::{
    format::FrameFormat,
    layout::{RowLayout, Storage},
};

/// ASCII 字段的文本内容。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextValue {
    /// 可解释为 UTF-8 的文本。
    Utf8(String),
    /// 无法解释为文本的原始字节。
    Bytes(Vec<u8>),
}

/// Latin-1 度数符号。
const LATIN1_DEGREE: u8 = 0xb0;

impl TextValue {
    /// 解释 ASCII 字段正文。
    ///
    /// 先按 UTF-8 解释；失败时把游离的 Latin-1 度数符号（`0xB0`）改写为 UTF-8 后重试；
    /// 仍失败则保留原始字节。
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        if let Ok(text) = core::str::from_utf8(bytes) {
            return Self::Utf8(text.to_owned());
        }
        let mut repaired = Vec::with_capacity(bytes.len() + 4);
        for &byte in bytes {
            if byte == LATIN1_DEGREE {
                repaired.extend_from_slice("°".as_bytes());
            } else {
                repaired.push(byte);
            }
        }
        match String::from_utf8(repaired) {
            Ok(text) => Self::Utf8(text),
            Err(_) => Self::Bytes(bytes.to_vec()),
        }
    }

    /// 文本视图；原始字节返回 `None`。
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }
}

/// 对象槽位中的值。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldObject {
    /// 尚未写入。
    #[default]
    Null,
    /// ASCII 文本。
    Text(TextValue),
    /// 对象名。
    ObName(ObName),
    /// 对象引用。
    ObjRef(ObjRef),
    /// 属性引用。
    AttRef(AttRef),
    /// 日期时间（时区已丢弃）。
    DateTime(NaiveDateTime),
}

/// 持有一个堆对象的槽位。
#[derive(Clone, Debug, Default)]
pub struct ObjectCell {
    value: Arc<FieldObject>,
}

impl ObjectCell {
    /// 持有 `Null` 的新槽位。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前值。
    #[must_use]
    pub fn get(&self) -> &FieldObject {
        &self.value
    }

    /// 当前值的共享句柄。
    #[must_use]
    pub fn handle(&self) -> Arc<FieldObject> {
        Arc::clone(&self.value)
    }

    /// 替换槽位内容：旧值的引用在安装新值之前释放。
    pub fn replace(&mut self, object: FieldObject) {
        let previous = core::mem::replace(&mut self.value, Arc::new(object));
        drop(previous);
    }
}

/// 类型化读回的单元格值。
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// FSHORT / FSINGL / ISINGL / VSINGL。
    F32(f32),
    /// FSING1。
    F32Pair(f32, f32),
    /// FSING2。
    F32Triple(f32, f32, f32),
    /// FDOUBL。
    F64(f64),
    /// FDOUB1。
    F64Pair(f64, f64),
    /// FDOUB2。
    F64Triple(f64, f64, f64),
    /// CSINGL。
    ComplexF32 {
        /// 实部。
        re: f32,
        /// 虚部。
        im: f32,
    },
    /// CDOUBL。
    ComplexF64 {
        /// 实部。
        re: f64,
        /// 虚部。
        im: f64,
    },
    /// SSHORT。
    I8(i8),
    /// SNORM。
    I16(i16),
    /// SLONG / UVARI / ORIGIN。
    I32(i32),
    /// USHORT / STATUS。
    U8(u8),
    /// UNORM。
    U16(u16),
    /// ULONG。
    U32(u32),
    /// IDENT / UNITS。
    Ident(String),
    /// 对象列。
    Object(Arc<FieldObject>),
}

/// 按行组织的目标缓冲。
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    layout: RowLayout,
    rows: usize,
    inline: Vec<u8>,
    objects: Vec<ObjectCell>,
}

impl FrameBuffer {
    /// 以给定布局预分配 `rows` 行，内联区清零，对象槽位为 `Null`。
    #[must_use]
    pub fn new(layout: RowLayout, rows: usize) -> Self {
        let inline = vec![0; layout.inline_stride() * rows];
        let objects = vec![ObjectCell::new(); layout.object_stride() * rows];
        Self {
            layout,
            rows,
            inline,
            objects,
        }
    }

    /// 按帧格式与配置分配缓冲。
    #[must_use]
    pub fn for_format(format: &FrameFormat, config: &DecoderConfig, rows: usize) -> Self {
        Self::new(RowLayout::for_format(format, config), rows)
    }

    /// 行布局。
    #[must_use]
    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    /// 行数。
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 第 `row` 行的内联区字节。
    #[must_use]
    pub fn row_bytes(&self, row: usize) -> Option<&[u8]> {
        let stride = self.layout.inline_stride();
        (row < self.rows).then(|| &self.inline[row * stride..(row + 1) * stride])
    }

    /// 第 `row` 行的对象槽位。
    #[must_use]
    pub fn row_objects(&self, row: usize) -> Option<&[ObjectCell]> {
        let stride = self.layout.object_stride();
        (row < self.rows).then(|| &self.objects[row * stride..(row + 1) * stride])
    }

    /// 第 `row` 行第 `column` 列的对象槽位；内联列返回 `None`。
    #[must_use]
    pub fn object(&self, row: usize, column: usize) -> Option<&ObjectCell> {
        match self.layout.column(column)?.storage() {
            Storage::Object { slot } => self.row_objects(row)?.get(slot),
            Storage::Inline { .. } => None,
        }
    }

    /// 类型化读回第 `row` 行第 `column` 列。
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> Option<FieldValue> {
        let column = self.layout.column(column)?;
        match column.storage() {
            Storage::Object { slot } => {
                let cell = self.row_objects(row)?.get(slot)?;
                Some(FieldValue::Object(cell.handle()))
            }
            Storage::Inline { offset, width } => {
                let bytes = self.row_bytes(row)?.get(offset..offset + width)?;
                read_inline(column.code(), bytes)
            }
        }
    }

    /// 类型化读回整行。
    #[must_use]
    pub fn row(&self, row: usize) -> Option<Vec<FieldValue>> {
        (0..self.layout.columns().len())
            .map(|column| self.value(row, column))
            .collect()
    }

    /// 第 `row` 行的可写视图：布局、内联区与对象槽位。
    pub(crate) fn row_mut(
        &mut self,
        row: usize,
    ) -> Option<(&RowLayout, &mut [u8], &mut [ObjectCell])> {
        if row >= self.rows {
            return None;
        }
        let Self {
            layout,
            inline,
            objects,
            ..
        } = self;
        let inline_stride = layout.inline_stride();
        let object_stride = layout.object_stride();
        Some((
            &*layout,
            &mut inline[row * inline_stride..(row + 1) * inline_stride],
            &mut objects[row * object_stride..(row + 1) * object_stride],
        ))
    }
}

fn read_inline(code: RepresentationCode, bytes: &[u8]) -> Option<FieldValue> {
    use RepresentationCode as Rc;
    let value = match code {
        Rc::Fshort | Rc::Fsingl | Rc::Isingl | Rc::Vsingl => FieldValue::F32(f32_at(bytes, 0)?),
        Rc::Fsing1 => FieldValue::F32Pair(f32_at(bytes, 0)?, f32_at(bytes, 4)?),
        Rc::Fsing2 => {
            FieldValue::F32Triple(f32_at(bytes, 0)?, f32_at(bytes, 4)?, f32_at(bytes, 8)?)
        }
        Rc::Csingl => FieldValue::ComplexF32 {
            re: f32_at(bytes, 0)?,
            im: f32_at(bytes, 4)?,
        },
        Rc::Fdoubl => FieldValue::F64(f64_at(bytes, 0)?),
        Rc::Fdoub1 => FieldValue::F64Pair(f64_at(bytes, 0)?, f64_at(bytes, 8)?),
        Rc::Fdoub2 => {
            FieldValue::F64Triple(f64_at(bytes, 0)?, f64_at(bytes, 8)?, f64_at(bytes, 16)?)
        }
        Rc::Cdoubl => FieldValue::ComplexF64 {
            re: f64_at(bytes, 0)?,
            im: f64_at(bytes, 8)?,
        },
        Rc::Sshort => FieldValue::I8(i8::from_ne_bytes(*bytes.first_chunk()?)),
        Rc::Snorm => FieldValue::I16(i16::from_ne_bytes(*bytes.first_chunk()?)),
        Rc::Slong | Rc::Uvari | Rc::Origin => {
            FieldValue::I32(i32::from_ne_bytes(*bytes.first_chunk()?))
        }
        Rc::Ushort | Rc::Status => FieldValue::U8(*bytes.first()?),
        Rc::Unorm => FieldValue::U16(u16::from_ne_bytes(*bytes.first_chunk()?)),
        Rc::Ulong => FieldValue::U32(u32::from_ne_bytes(*bytes.first_chunk()?)),
        Rc::Ident | Rc::Units => FieldValue::Ident(read_code_units(bytes)),
        Rc::Ascii | Rc::Dtime | Rc::Obname | Rc::Objref | Rc::Attref => return None,
    };
    Some(value)
}

fn f32_at(bytes: &[u8], at: usize) -> Option<f32> {
    Some(f32::from_ne_bytes(*bytes.get(at..)?.first_chunk()?))
}

fn f64_at(bytes: &[u8], at: usize) -> Option<f64> {
    Some(f64::from_ne_bytes(*bytes.get(at..)?.first_chunk()?))
}

/// 读取以 0 结尾（或占满槽位）的 `u32` 码元序列。
fn read_code_units(bytes: &[u8]) -> String {
    bytes
        .chunks_exact(4)
        .map(|unit| u32::from_ne_bytes([unit[0], unit[1], unit[2], unit[3]]))
        .take_while(|&unit| unit != 0)
        .filter_map(char::from_u32)
        .collect()
}
