//! RP66 v1 表示码（Representation Code）目录。
//!
//! # 教案定位（Why）
//! - 帧格式串中的每个字符对应一个表示码，解码器需要据此决定读取宽度、输出形态与目标槽位类型；
//! - 将编号、名称、格式符号集中维护在一张表里，避免散落的魔法字符。
//!
//! # 契约说明（What）
//! - 编号与 RP66 v1 附录 B 保持一致（1..=27）；
//! - 格式符号沿用既有格式串生产方的约定（例如 `f` = FSINGL，`F` = FDOUBL，`d` = SSHORT），不得随意调整；
//! - [`RepresentationCode::fixed_width`] 仅对定长编码返回 `Some`。

use core::fmt;

/// RP66 v1 表示码。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepresentationCode {
    /// 低精度浮点（12 bit 尾数 + 4 bit 指数）。
    Fshort,
    /// IEEE 754 单精度。
    Fsingl,
    /// 单精度值 + 单侧误差。
    Fsing1,
    /// 单精度值 + 双侧误差。
    Fsing2,
    /// IBM System/360 单精度。
    Isingl,
    /// VAX F-floating 单精度。
    Vsingl,
    /// IEEE 754 双精度。
    Fdoubl,
    /// 双精度值 + 单侧误差。
    Fdoub1,
    /// 双精度值 + 双侧误差。
    Fdoub2,
    /// 单精度复数。
    Csingl,
    /// 双精度复数。
    Cdoubl,
    /// 8 bit 有符号整数。
    Sshort,
    /// 16 bit 有符号整数。
    Snorm,
    /// 32 bit 有符号整数。
    Slong,
    /// 8 bit 无符号整数。
    Ushort,
    /// 16 bit 无符号整数。
    Unorm,
    /// 32 bit 无符号整数。
    Ulong,
    /// 1/2/4 字节变长无符号整数。
    Uvari,
    /// 长度前缀（≤255）的标识符。
    Ident,
    /// UVARI 长度前缀的自由文本。
    Ascii,
    /// 日期时间。
    Dtime,
    /// 数据源编号（UVARI）。
    Origin,
    /// 对象名：origin + copy + ident。
    Obname,
    /// 对象引用：type + obname。
    Objref,
    /// 属性引用：type + obname + label。
    Attref,
    /// 状态位（1 字节）。
    Status,
    /// 单位标识符（编码同 IDENT）。
    Units,
}

/// 按编号顺序排列的全部表示码。
pub const ALL_CODES: [RepresentationCode; 27] = [
    RepresentationCode::Fshort,
    RepresentationCode::Fsingl,
    RepresentationCode::Fsing1,
    RepresentationCode::Fsing2,
    RepresentationCode::Isingl,
    RepresentationCode::Vsingl,
    RepresentationCode::Fdoubl,
    RepresentationCode::Fdoub1,
    RepresentationCode::Fdoub2,
    RepresentationCode::Csingl,
    RepresentationCode::Cdoubl,
    RepresentationCode::Sshort,
    RepresentationCode::Snorm,
    RepresentationCode::Slong,
    RepresentationCode::Ushort,
    RepresentationCode::Unorm,
    RepresentationCode::Ulong,
    RepresentationCode::Uvari,
    RepresentationCode::Ident,
    RepresentationCode::Ascii,
    RepresentationCode::Dtime,
    RepresentationCode::Origin,
    RepresentationCode::Obname,
    RepresentationCode::Objref,
    RepresentationCode::Attref,
    RepresentationCode::Status,
    RepresentationCode::Units,
];

impl RepresentationCode {
    /// 返回 RP66 v1 规定的数值编号（1..=27）。
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    /// 按数值编号查找表示码。
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        let index = usize::from(code).checked_sub(1)?;
        ALL_CODES.get(index).copied()
    }

    /// 返回格式串中使用的单字符符号。
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Fshort => 'r',
            Self::Fsingl => 'f',
            Self::Fsing1 => 'b',
            Self::Fsing2 => 'B',
            Self::Isingl => 'x',
            Self::Vsingl => 'V',
            Self::Fdoubl => 'F',
            Self::Fdoub1 => 'z',
            Self::Fdoub2 => 'Z',
            Self::Csingl => 'c',
            Self::Cdoubl => 'C',
            Self::Sshort => 'd',
            Self::Snorm => 'D',
            Self::Slong => 'l',
            Self::Ushort => 'u',
            Self::Unorm => 'U',
            Self::Ulong => 'L',
            Self::Uvari => 'i',
            Self::Ident => 's',
            Self::Ascii => 'S',
            Self::Dtime => 'j',
            Self::Origin => 'J',
            Self::Obname => 'o',
            Self::Objref => 'O',
            Self::Attref => 'A',
            Self::Status => 'q',
            Self::Units => 'Q',
        }
    }

    /// 按格式符号查找表示码；未知符号返回 `None`。
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        ALL_CODES.iter().copied().find(|code| code.symbol() == symbol)
    }

    /// 返回小写规范名称（如 `fsingl`）。
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fshort => "fshort",
            Self::Fsingl => "fsingl",
            Self::Fsing1 => "fsing1",
            Self::Fsing2 => "fsing2",
            Self::Isingl => "isingl",
            Self::Vsingl => "vsingl",
            Self::Fdoubl => "fdoubl",
            Self::Fdoub1 => "fdoub1",
            Self::Fdoub2 => "fdoub2",
            Self::Csingl => "csingl",
            Self::Cdoubl => "cdoubl",
            Self::Sshort => "sshort",
            Self::Snorm => "snorm",
            Self::Slong => "slong",
            Self::Ushort => "ushort",
            Self::Unorm => "unorm",
            Self::Ulong => "ulong",
            Self::Uvari => "uvari",
            Self::Ident => "ident",
            Self::Ascii => "ascii",
            Self::Dtime => "dtime",
            Self::Origin => "origin",
            Self::Obname => "obname",
            Self::Objref => "objref",
            Self::Attref => "attref",
            Self::Status => "status",
            Self::Units => "units",
        }
    }

    /// 按规范名称查找表示码（大小写不敏感）。
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_CODES
            .iter()
            .copied()
            .find(|code| code.name().eq_ignore_ascii_case(name))
    }

    /// 定长编码在源字节流中的宽度；变长编码返回 `None`。
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Sshort | Self::Ushort | Self::Status => Some(1),
            Self::Fshort | Self::Snorm | Self::Unorm => Some(2),
            Self::Fsingl | Self::Isingl | Self::Vsingl | Self::Slong | Self::Ulong => Some(4),
            Self::Fsing1 | Self::Fdoubl | Self::Csingl | Self::Dtime => Some(8),
            Self::Fsing2 => Some(12),
            Self::Fdoub1 | Self::Cdoubl => Some(16),
            Self::Fdoub2 => Some(24),
            Self::Uvari
            | Self::Origin
            | Self::Ident
            | Self::Ascii
            | Self::Obname
            | Self::Objref
            | Self::Attref
            | Self::Units => None,
        }
    }
}

impl fmt::Display for RepresentationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
