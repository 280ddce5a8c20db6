//! 行字段分派：按表示码读取一个字段，产出内联标量或堆对象。
//!
//! # 教案定位（Why）
//! - 27 个表示码在目标行中只有两种去向：内联字节或对象槽位。分派层把「读源字节」与
//!   「写目标槽位」隔开，先完整读出一行，再由 [`crate::slot`] 统一提交。
//!
//! # 契约说明（What）
//! - 每个字段恰好消费其表示码的源宽度；任何越界都在产生值之前返回；
//! - 内联值已经按原生字节序打包，宽度与 [`crate::layout::inline_width`] 一致；
//! - IDENT/UNITS 以借用切片返回，由槽位写入器负责加宽与补零。
//!
//! # 风险提示（Trade-offs）
//! - DTIME 的时区在此处被丢弃，目标中只保留本地时间。

use dlis_core::{
    AttRef, ByteCursor, ObName, ObjRef, OutOfBounds, RepresentationCode, primitive,
};
use smallvec::SmallVec;

use crate::buffer::{FieldObject, TextValue};

/// 打包后的内联标量，最宽为 FDOUB2 的 24 字节。
pub type Packed = SmallVec<[u8; 24]>;

/// 内联值。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InlineValue<'a> {
    /// 原生字节序的定宽标量。
    Packed(Packed),
    /// IDENT/UNITS 正文（每字节一个 Latin-1 码元）。
    Ident(&'a [u8]),
}

/// 一个字段的解码结果。
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnValue<'a> {
    /// 写入行内字节区。
    Inline(InlineValue<'a>),
    /// 写入对象槽位。
    Object(FieldObject),
}

/// 字段级失败，由解码器补充上下文后转换为 `DecodeError`。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// 读取越界。
    OutOfBounds(OutOfBounds),
    /// 标识符超出槽位容量。
    TooLong {
        /// 标识符长度。
        length: usize,
        /// 槽位容量。
        capacity: usize,
    },
    /// DTIME 分量非法。
    InvalidTimestamp,
}

impl From<OutOfBounds> for FieldError {
    fn from(err: OutOfBounds) -> Self {
        Self::OutOfBounds(err)
    }
}

/// 从游标读取一个 `code` 编码的字段。
pub fn read_field<'a>(
    cursor: &mut ByteCursor<'a>,
    code: RepresentationCode,
    ident_capacity: usize,
) -> Result<ColumnValue<'a>, FieldError> {
    use RepresentationCode as Rc;
    let value = match code {
        Rc::Ident | Rc::Units => {
            let body = cursor.ident()?;
            if body.len() > ident_capacity {
                return Err(FieldError::TooLong {
                    length: body.len(),
                    capacity: ident_capacity,
                });
            }
            ColumnValue::Inline(InlineValue::Ident(body))
        }
        Rc::Ascii => ColumnValue::Object(FieldObject::Text(TextValue::decode(cursor.ascii()?))),
        Rc::Dtime => {
            let stamp = primitive::dtime(cursor.array()?);
            let naive = stamp.to_naive().ok_or(FieldError::InvalidTimestamp)?;
            ColumnValue::Object(FieldObject::DateTime(naive))
        }
        Rc::Obname => ColumnValue::Object(FieldObject::ObName(ObName::read(cursor)?)),
        Rc::Objref => ColumnValue::Object(FieldObject::ObjRef(ObjRef::read(cursor)?)),
        Rc::Attref => ColumnValue::Object(FieldObject::AttRef(AttRef::read(cursor)?)),
        _ => ColumnValue::Inline(InlineValue::Packed(pack_scalar(cursor, code)?)),
    };
    Ok(value)
}

/// 通用定宽路径：解码源字节并按目标宽度打包。
fn pack_scalar(
    cursor: &mut ByteCursor<'_>,
    code: RepresentationCode,
) -> Result<Packed, OutOfBounds> {
    use RepresentationCode as Rc;
    let mut out = Packed::new();
    match code {
        Rc::Fshort => out.extend_from_slice(&primitive::fshort(cursor.array()?).to_ne_bytes()),
        Rc::Fsingl => out.extend_from_slice(&primitive::fsingl(cursor.array()?).to_ne_bytes()),
        Rc::Isingl => out.extend_from_slice(&primitive::isingl(cursor.array()?).to_ne_bytes()),
        Rc::Vsingl => out.extend_from_slice(&primitive::vsingl(cursor.array()?).to_ne_bytes()),
        Rc::Fsing1 => {
            let (value, bound) = primitive::fsing1(cursor.array()?);
            push_f32(&mut out, &[value, bound]);
        }
        Rc::Fsing2 => {
            let (value, lower, upper) = primitive::fsing2(cursor.array()?);
            push_f32(&mut out, &[value, lower, upper]);
        }
        Rc::Csingl => {
            let (re, im) = primitive::csingl(cursor.array()?);
            push_f32(&mut out, &[re, im]);
        }
        Rc::Fdoubl => out.extend_from_slice(&primitive::fdoubl(cursor.array()?).to_ne_bytes()),
        Rc::Fdoub1 => {
            let (value, bound) = primitive::fdoub1(cursor.array()?);
            push_f64(&mut out, &[value, bound]);
        }
        Rc::Fdoub2 => {
            let (value, lower, upper) = primitive::fdoub2(cursor.array()?);
            push_f64(&mut out, &[value, lower, upper]);
        }
        Rc::Cdoubl => {
            let (re, im) = primitive::cdoubl(cursor.array()?);
            push_f64(&mut out, &[re, im]);
        }
        Rc::Sshort => out.extend_from_slice(&primitive::sshort(cursor.array()?).to_ne_bytes()),
        Rc::Snorm => out.extend_from_slice(&primitive::snorm(cursor.array()?).to_ne_bytes()),
        Rc::Slong => out.extend_from_slice(&primitive::slong(cursor.array()?).to_ne_bytes()),
        Rc::Ushort => out.push(primitive::ushort(cursor.array()?)),
        Rc::Status => out.push(primitive::status(cursor.array()?)),
        Rc::Unorm => out.extend_from_slice(&primitive::unorm(cursor.array()?).to_ne_bytes()),
        Rc::Ulong => out.extend_from_slice(&primitive::ulong(cursor.array()?).to_ne_bytes()),
        Rc::Uvari | Rc::Origin => {
            // UVARI 最多 30 bit，落在 i32 范围内。
            let value = cursor.uvari()? as i32;
            out.extend_from_slice(&value.to_ne_bytes());
        }
        // 文本与对象类编码由 `read_field` 处理，不会进入定宽路径。
        Rc::Ident | Rc::Units | Rc::Ascii | Rc::Dtime | Rc::Obname | Rc::Objref | Rc::Attref => {
            cursor.skip(code)?;
        }
    }
    Ok(out)
}

fn push_f32(out: &mut Packed, parts: &[f32]) {
    for part in parts {
        out.extend_from_slice(&part.to_ne_bytes());
    }
}

fn push_f64(out: &mut Packed, parts: &[f64]) {
    for part in parts {
        out.extend_from_slice(&part.to_ne_bytes());
    }
}
