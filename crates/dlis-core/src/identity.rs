//! 身份值：`OBNAME` / `OBJREF` / `ATTREF`。
//!
//! # 教案定位（Why）
//! - 帧数据中的身份字段与记录前缀都以 OBNAME 为核心，需要一套结构化表示以支持比较与指纹；
//! - 指纹是跨记录、跨对象集合定位同一对象的规范字符串。
//!
//! # 契约说明（What）
//! - 相等性为结构相等：OBNAME 比较 (origin, copy, id)，OBJREF 比较 (type, name)，ATTREF 比较 (type, name, label)；
//! - 指纹格式为 `type-origin-copy-id`，ATTREF 复用 OBJREF 的指纹（忽略 label）；
//! - IDENT 按 Latin-1 逐字节映射为字符，保证无损。
//!
//! # 风险提示（Trade-offs）
//! - 指纹使用 `-` 分隔，而 IDENT 允许出现 `-`，因此指纹不保证可逆解析，仅用于等值比较。

use core::fmt;

use crate::{bounds::ByteCursor, error::IdentityError, error::OutOfBounds};

/// 将 IDENT 字节按 Latin-1 映射为字符串。
#[must_use]
pub fn decode_ident(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// 对象名。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObName {
    /// 数据源编号。
    pub origin: i32,
    /// 副本编号。
    pub copy: u8,
    /// 标识符。
    pub id: String,
}

impl ObName {
    /// 构造对象名。
    #[must_use]
    pub fn new(origin: i32, copy: u8, id: impl Into<String>) -> Self {
        Self {
            origin,
            copy,
            id: id.into(),
        }
    }

    /// 以给定对象类型计算指纹。
    #[must_use]
    pub fn fingerprint(&self, object_type: &str) -> String {
        format!("{object_type}-{}-{}-{}", self.origin, self.copy, self.id)
    }

    /// 从游标读取完整 OBNAME。
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, OutOfBounds> {
        let start = *cursor;
        let outcome = (|| -> Result<Self, OutOfBounds> {
            let (origin, copy) = read_origin_copy(cursor)?;
            let id = decode_ident(cursor.ident()?);
            Ok(Self { origin, copy, id })
        })();
        if outcome.is_err() {
            *cursor = start;
        }
        outcome
    }

    /// 读取 OBNAME 的 origin 与 copy，跳过标识符正文（帧记录前缀只需要这两项）。
    pub fn read_without_id(cursor: &mut ByteCursor<'_>) -> Result<(i32, u8), OutOfBounds> {
        let start = *cursor;
        let outcome = read_origin_copy(cursor).and_then(|pair| cursor.ident().map(|_| pair));
        if outcome.is_err() {
            *cursor = start;
        }
        outcome
    }
}

fn read_origin_copy(cursor: &mut ByteCursor<'_>) -> Result<(i32, u8), OutOfBounds> {
    // UVARI 最多 30 bit，转换为 i32 不会溢出。
    let origin = cursor.uvari()? as i32;
    let copy = cursor.array::<1>()?[0];
    Ok((origin, copy))
}

impl PartialEq<(i32, u8, &str)> for ObName {
    fn eq(&self, other: &(i32, u8, &str)) -> bool {
        self.origin == other.0 && self.copy == other.1 && self.id == other.2
    }
}

impl fmt::Display for ObName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "obname(id='{}', origin={}, copynum={})",
            self.id, self.origin, self.copy
        )
    }
}

/// 对象引用：对象类型 + 对象名。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef {
    /// 对象类型（如 `FRAME`、`CHANNEL`）。
    pub object_type: String,
    /// 被引用对象的名称。
    pub name: ObName,
}

impl ObjRef {
    /// 构造对象引用。
    #[must_use]
    pub fn new(object_type: impl Into<String>, name: ObName) -> Self {
        Self {
            object_type: object_type.into(),
            name,
        }
    }

    /// 规范指纹：`type-origin-copy-id`。
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.name.fingerprint(&self.object_type)
    }

    /// 从游标读取 OBJREF。
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, OutOfBounds> {
        let start = *cursor;
        let outcome = cursor
            .ident()
            .map(decode_ident)
            .and_then(|object_type| ObName::read(cursor).map(|name| Self { object_type, name }));
        if outcome.is_err() {
            *cursor = start;
        }
        outcome
    }
}

impl PartialEq<(&str, (i32, u8, &str))> for ObjRef {
    fn eq(&self, other: &(&str, (i32, u8, &str))) -> bool {
        self.object_type == other.0 && self.name == other.1
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "objref(fingerprint={})", self.fingerprint())
    }
}

/// 属性引用：对象类型 + 对象名 + 属性标签。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttRef {
    /// 对象类型。
    pub object_type: String,
    /// 对象名。
    pub name: ObName,
    /// 属性标签。
    pub label: String,
}

impl AttRef {
    /// 构造属性引用。
    #[must_use]
    pub fn new(object_type: impl Into<String>, name: ObName, label: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            name,
            label: label.into(),
        }
    }

    /// 指纹与同类型、同名称的 OBJREF 一致，不包含标签。
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.name.fingerprint(&self.object_type)
    }

    /// 从游标读取 ATTREF。
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, OutOfBounds> {
        let start = *cursor;
        let outcome = (|| -> Result<Self, OutOfBounds> {
            let reference = ObjRef::read(cursor)?;
            let label = decode_ident(cursor.ident()?);
            Ok(Self {
                object_type: reference.object_type,
                name: reference.name,
                label,
            })
        })();
        if outcome.is_err() {
            *cursor = start;
        }
        outcome
    }
}

impl PartialEq<(&str, (i32, u8, &str), &str)> for AttRef {
    fn eq(&self, other: &(&str, (i32, u8, &str), &str)) -> bool {
        self.object_type == other.0 && self.name == other.1 && self.label == other.2
    }
}

impl fmt::Display for AttRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attref(id='{}', origin={}, copynum={}, type={})",
            self.name.id, self.name.origin, self.name.copy, self.object_type
        )
    }
}

/// 由松散参数计算 OBJREF 指纹，`copy` 必须落在 USHORT 范围内。
pub fn fingerprint(
    object_type: &str,
    id: &str,
    origin: i32,
    copy: i32,
) -> Result<String, IdentityError> {
    let copy = u8::try_from(copy).map_err(|_| IdentityError::CopyOutOfRange { copy })?;
    Ok(ObjRef::new(object_type, ObName::new(origin, copy, id)).fingerprint())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obname_reads_origin_copy_and_id() {
        let bytes = [0x80, 0x02, 0x01, 4, b'2', b'0', b'0', b'0', 0xaa];
        let mut cursor = ByteCursor::new(&bytes);
        let name = ObName::read(&mut cursor).expect("完整 OBNAME");
        assert_eq!(name, (2, 1, "2000"));
        assert_eq!(cursor.position(), 8);
        assert_eq!(name.to_string(), "obname(id='2000', origin=2, copynum=1)");
    }

    #[test]
    fn truncated_obname_restores_cursor() {
        let bytes = [0x02, 0x01, 4, b'2', b'0'];
        let mut cursor = ByteCursor::new(&bytes);
        assert!(ObName::read(&mut cursor).is_err());
        assert_eq!(cursor.position(), 0);
        assert!(ObName::read_without_id(&mut cursor).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn objref_and_attref_share_fingerprint() {
        let bytes = [
            5, b'F', b'R', b'A', b'M', b'E', 0x02, 0x00, 4, b'8', b'0', b'0', b'T', 3, b'R',
            b'E', b'F',
        ];
        let mut cursor = ByteCursor::new(&bytes);
        let attref = AttRef::read(&mut cursor).expect("完整 ATTREF");
        assert!(cursor.is_exhausted());
        assert_eq!(attref, ("FRAME", (2, 0, "800T"), "REF"));

        let mut cursor = ByteCursor::new(&bytes[..13]);
        let objref = ObjRef::read(&mut cursor).expect("完整 OBJREF");
        assert_eq!(objref.fingerprint(), "FRAME-2-0-800T");
        assert_eq!(attref.fingerprint(), objref.fingerprint());
        assert_eq!(objref.to_string(), "objref(fingerprint=FRAME-2-0-800T)");
    }

    #[test]
    fn loose_fingerprint_validates_copy() {
        assert_eq!(
            fingerprint("CHANNEL", "TDEP", 10, 2).as_deref(),
            Ok("CHANNEL-10-2-TDEP")
        );
        assert_eq!(
            fingerprint("CHANNEL", "TDEP", 10, 256),
            Err(IdentityError::CopyOutOfRange { copy: 256 })
        );
        assert!(fingerprint("CHANNEL", "TDEP", 10, -1).is_err());
    }

    #[test]
    fn ident_bytes_map_through_latin1() {
        assert_eq!(decode_ident(&[b'D', 0xb0, b'C']), "D°C");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn obname() -> impl Strategy<Value = ObName> {
            (0i32..1 << 30, any::<u8>(), "[A-Z0-9_-]{0,12}")
                .prop_map(|(origin, copy, id)| ObName::new(origin, copy, id))
        }

        proptest! {
            #[test]
            fn prop_obname_equality_is_structural(a in obname(), b in obname()) {
                prop_assert_eq!(&a, &a.clone());
                prop_assert_eq!(a == b, b == a);
                let same = a.origin == b.origin && a.copy == b.copy && a.id == b.id;
                prop_assert_eq!(a == b, same);
                prop_assert!(a == (a.origin, a.copy, a.id.as_str()));
            }

            #[test]
            fn prop_objref_fingerprint_is_deterministic(name in obname(), object_type in "[A-Z]{1,8}") {
                let first = ObjRef::new(object_type.clone(), name.clone());
                let second = ObjRef::new(object_type.clone(), name.clone());
                prop_assert_eq!(first.fingerprint(), second.fingerprint());
                prop_assert_eq!(
                    first.fingerprint(),
                    format!("{object_type}-{}-{}-{}", name.origin, name.copy, name.id)
                );
            }
        }
    }
}
