//! 目标行布局。
//!
//! # 教案定位（Why）
//! - 目标缓冲按定长行组织。数值类字段以原生字节序内联在行内，文本对象、身份值与时间戳
//!   需要堆分配，放在独立的对象槽位中。布局由字段格式唯一确定，解码器据此校验调用方提供的缓冲。
//!
//! # 契约说明（What）
//! - 内联宽度：浮点/整数按解码后的 Rust 标量宽度，元组与复数按分量紧密排列；
//!   UVARI/ORIGIN 为 `i32`；IDENT/UNITS 为 `capacity` 个 `u32` 码元；
//! - 对象列：ASCII、DTIME、OBNAME、OBJREF、ATTREF。

use dlis_core::{DecoderConfig, RepresentationCode};

use crate::format::{FormatSpan, FrameFormat};

/// 一列数据的存放位置。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Storage {
    /// 行内字节区间。
    Inline {
        /// 距行首的字节偏移。
        offset: usize,
        /// 字节宽度。
        width: usize,
    },
    /// 对象槽位。
    Object {
        /// 行内对象槽位序号。
        slot: usize,
    },
}

/// 一列的表示码与存放位置。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    code: RepresentationCode,
    storage: Storage,
}

impl Column {
    /// 表示码。
    #[must_use]
    pub fn code(&self) -> RepresentationCode {
        self.code
    }

    /// 存放位置。
    #[must_use]
    pub fn storage(&self) -> Storage {
        self.storage
    }
}

/// 由字段格式导出的行布局。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowLayout {
    columns: Vec<Column>,
    inline_stride: usize,
    object_stride: usize,
    ident_capacity: usize,
}

impl RowLayout {
    /// 按字段段与标识符容量构造布局。
    #[must_use]
    pub fn new(fields: &FormatSpan, ident_capacity: usize) -> Self {
        let mut columns = Vec::with_capacity(fields.len());
        let mut inline_stride = 0;
        let mut object_stride = 0;
        for &code in fields.codes() {
            let storage = match inline_width(code, ident_capacity) {
                Some(width) => {
                    let storage = Storage::Inline {
                        offset: inline_stride,
                        width,
                    };
                    inline_stride += width;
                    storage
                }
                None => {
                    let storage = Storage::Object {
                        slot: object_stride,
                    };
                    object_stride += 1;
                    storage
                }
            };
            columns.push(Column { code, storage });
        }
        Self {
            columns,
            inline_stride,
            object_stride,
            ident_capacity,
        }
    }

    /// 按帧格式与解码器配置构造布局。
    #[must_use]
    pub fn for_format(format: &FrameFormat, config: &DecoderConfig) -> Self {
        Self::new(format.fields(), config.ident_capacity)
    }

    /// 所有列。
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// 第 `index` 列。
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// 每行内联区的字节数。
    #[must_use]
    pub fn inline_stride(&self) -> usize {
        self.inline_stride
    }

    /// 每行的对象槽位数。
    #[must_use]
    pub fn object_stride(&self) -> usize {
        self.object_stride
    }

    /// IDENT / UNITS 槽位容量（码元）。
    #[must_use]
    pub fn ident_capacity(&self) -> usize {
        self.ident_capacity
    }
}

/// 表示码在目标行中的内联宽度；对象列返回 `None`。
#[must_use]
pub fn inline_width(code: RepresentationCode, ident_capacity: usize) -> Option<usize> {
    use RepresentationCode as Rc;
    let width = match code {
        Rc::Sshort | Rc::Ushort | Rc::Status => 1,
        Rc::Snorm | Rc::Unorm => 2,
        Rc::Fshort
        | Rc::Fsingl
        | Rc::Isingl
        | Rc::Vsingl
        | Rc::Slong
        | Rc::Ulong
        | Rc::Uvari
        | Rc::Origin => 4,
        Rc::Fsing1 | Rc::Fdoubl | Rc::Csingl => 8,
        Rc::Fsing2 => 12,
        Rc::Fdoub1 | Rc::Cdoubl => 16,
        Rc::Fdoub2 => 24,
        Rc::Ident | Rc::Units => ident_capacity * 4,
        Rc::Ascii | Rc::Dtime | Rc::Obname | Rc::Objref | Rc::Attref => return None,
    };
    Some(width)
}
