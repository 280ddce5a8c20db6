//! 槽位写入：把一行已解码的值提交到目标缓冲。
//!
//! - 内联值逐字节复制；IDENT/UNITS 按 Latin-1 加宽为 `u32` 码元，剩余部分补零；
//! - 对象值通过 [`ObjectCell::replace`](crate::buffer::ObjectCell::replace) 安装，旧值随之释放。

use crate::{
    buffer::FrameBuffer,
    dispatch::{ColumnValue, InlineValue},
    error::{DecodeErrorKind, Result},
    layout::{RowLayout, Storage},
};

/// 将 `values`（按列顺序）写入第 `row` 行。
///
/// 列数或存放位置与布局不符时返回 `LayoutMismatch`，此时目标行不会被修改。
pub fn commit_row(
    buffer: &mut FrameBuffer,
    row: usize,
    values: Vec<ColumnValue<'_>>,
) -> Result<()> {
    let (layout, inline, objects) = buffer
        .row_mut(row)
        .ok_or(DecodeErrorKind::LayoutMismatch)?;
    if !matches_layout(layout, &values) {
        return Err(DecodeErrorKind::LayoutMismatch.into());
    }

    for (column, value) in layout.columns().iter().zip(values) {
        match (column.storage(), value) {
            (Storage::Inline { offset, width }, ColumnValue::Inline(value)) => {
                write_inline(&mut inline[offset..offset + width], &value);
            }
            (Storage::Object { slot }, ColumnValue::Object(object)) => {
                objects[slot].replace(object);
            }
            // 已由 `matches_layout` 排除。
            _ => return Err(DecodeErrorKind::LayoutMismatch.into()),
        }
    }
    Ok(())
}

fn matches_layout(layout: &RowLayout, values: &[ColumnValue<'_>]) -> bool {
    layout.columns().len() == values.len()
        && layout
            .columns()
            .iter()
            .zip(values)
            .all(|(column, value)| match (column.storage(), value) {
                (Storage::Inline { width, .. }, ColumnValue::Inline(InlineValue::Packed(bytes))) => {
                    bytes.len() == width
                }
                (Storage::Inline { width, .. }, ColumnValue::Inline(InlineValue::Ident(body))) => {
                    body.len() * 4 <= width
                }
                (Storage::Object { .. }, ColumnValue::Object(_)) => true,
                _ => false,
            })
}

fn write_inline(slot: &mut [u8], value: &InlineValue<'_>) {
    match value {
        InlineValue::Packed(bytes) => slot.copy_from_slice(bytes),
        InlineValue::Ident(body) => {
            let (used, padding) = slot.split_at_mut(body.len() * 4);
            for (unit, &byte) in used.chunks_exact_mut(4).zip(body.iter()) {
                unit.copy_from_slice(&u32::from(byte).to_ne_bytes());
            }
            padding.fill(0);
        }
    }
}
