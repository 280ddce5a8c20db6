//! 帧行解码的端到端行为。
//!
//! # 覆盖面 (What)
//! - 正常路径：多条记录逐行写入、跳过段、全部列类型的读回；
//! - 失败路径：截断、多行记录、加密、索引无效、标识符超长、格式非法、目标缓冲不匹配；
//! - 对象槽位覆写时旧值被释放；
//! - 帧号不连续只产生报告，不中止解码。

mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use dlis_codec_frame::{
    DecodeErrorKind, FieldObject, FieldValue, FrameBuffer, FrameDecoder, FrameFormat,
    ReadContext, SequenceAnomaly, TextValue, decode_frame_rows,
};
use dlis_core::{
    DecoderConfig, MemoryRecordSource, ObName, ObjRef, RecordError, RepresentationCode,
};
use proptest::prelude::*;
use support::{RecordBuilder, source};

fn float_row(row: u32, single: f32, double: f64) -> RecordBuilder {
    RecordBuilder::frame(1, 0, "F")
        .uvari(row)
        .fsingl(single)
        .fdoubl(double)
}

fn float_buffer(rows: usize) -> (FrameFormat, FrameBuffer) {
    let format = FrameFormat::fields_only("fF").expect("合法格式");
    let dst = FrameBuffer::for_format(&format, &DecoderConfig::default(), rows);
    (format, dst)
}

#[test]
fn clean_records_fill_one_row_each() {
    let (records, indices) = source(vec![
        float_row(1, 3.5, 2.0).build(),
        float_row(2, -1.25, 1e-3).build(),
        float_row(3, 0.0, -7.5).build(),
    ]);
    let (_, mut dst) = float_buffer(3);

    let report = decode_frame_rows("", "fF", "", &records, &indices, &mut dst).expect("记录完整");

    assert_eq!(report.rows_written, 3);
    assert_eq!(report.next_expected, 4);
    assert!(report.anomalies.is_empty());
    assert_eq!(
        dst.row(0),
        Some(vec![FieldValue::F32(3.5), FieldValue::F64(2.0)])
    );
    assert_eq!(
        dst.row(1),
        Some(vec![FieldValue::F32(-1.25), FieldValue::F64(1e-3)])
    );
    assert_eq!(
        dst.row(2),
        Some(vec![FieldValue::F32(0.0), FieldValue::F64(-7.5)])
    );
}

#[test]
fn truncated_double_reports_its_offset_and_keeps_earlier_rows() {
    let intact = float_row(1, 3.5, 2.0);
    let truncated = float_row(2, 1.0, 9.0).truncate(2);
    // 前缀 4 字节 + 帧号 1 字节 + FSINGL 4 字节。
    let double_offset = RecordBuilder::frame(1, 0, "F").len() + 1 + 4;
    let (records, indices) = source(vec![intact.build(), truncated.build()]);
    let (_, mut dst) = float_buffer(2);

    let err = decode_frame_rows("", "fF", "", &records, &indices, &mut dst)
        .expect_err("第二条记录缺两字节");

    assert_eq!(
        err.kind(),
        &DecodeErrorKind::CorruptRecord {
            context: ReadContext::Field {
                column: 1,
                code: RepresentationCode::Fdoubl
            },
            needed: 8,
            available: 6,
        }
    );
    assert_eq!(err.record_index(), Some(1));
    assert_eq!(err.offset(), Some(double_offset));
    assert_eq!(
        dst.row(0),
        Some(vec![FieldValue::F32(3.5), FieldValue::F64(2.0)])
    );
    assert_eq!(
        dst.row(1),
        Some(vec![FieldValue::F32(0.0), FieldValue::F64(0.0)])
    );
}

#[test]
fn residue_after_a_row_is_not_implemented() {
    let record = float_row(1, 3.5, 2.0).raw(&[0x02, 0xaa]);
    let row_end = record.len() - 2;
    let (records, indices) = source(vec![record.build()]);
    let (_, mut dst) = float_buffer(1);

    let err = decode_frame_rows("", "fF", "", &records, &indices, &mut dst)
        .expect_err("一条记录两行");

    assert_eq!(err.kind(), &DecodeErrorKind::NotImplemented { trailing: 2 });
    assert_eq!(err.offset(), Some(row_end));
    assert_eq!(dst.value(0, 0), Some(FieldValue::F32(0.0)));
}

#[test]
fn gap_in_row_index_is_reported_not_fatal() {
    let (records, indices) = source(vec![float_row(5, 1.0, 1.0).build()]);
    let (_, mut dst) = float_buffer(1);

    let report = decode_frame_rows("", "fF", "", &records, &indices, &mut dst)
        .expect("帧号异常不致命");

    assert_eq!(report.rows_written, 1);
    assert_eq!(report.next_expected, 6);
    assert_eq!(
        report.anomalies.as_slice(),
        &[SequenceAnomaly {
            record_index: 0,
            expected: 1,
            found: 5
        }]
    );
}

#[test]
fn redecoding_an_object_column_releases_the_previous_value() {
    let format = FrameFormat::fields_only("S").expect("合法格式");
    let decoder = FrameDecoder::default();
    let mut dst = decoder.buffer_for(&format, 1);

    let (first, indices) = source(vec![
        RecordBuilder::frame(1, 0, "F").uvari(1).ascii(b"first").build(),
    ]);
    decoder
        .decode(&format, &first, &indices, &mut dst)
        .expect("记录完整");
    let held = dst.object(0, 0).expect("对象列").handle();
    assert_eq!(*held, FieldObject::Text(TextValue::Utf8("first".into())));
    assert_eq!(Arc::strong_count(&held), 2);

    let (second, indices) = source(vec![
        RecordBuilder::frame(1, 0, "F").uvari(1).ascii(b"second").build(),
    ]);
    decoder
        .decode(&format, &second, &indices, &mut dst)
        .expect("记录完整");

    assert_eq!(Arc::strong_count(&held), 1);
    let current = dst.object(0, 0).expect("对象列").handle();
    assert_eq!(Arc::strong_count(&current), 2);
    assert_eq!(*current, FieldObject::Text(TextValue::Utf8("second".into())));
}

#[test]
fn encrypted_record_is_rejected_before_decoding() {
    let (records, indices) = source(vec![float_row(1, 3.5, 2.0).build_encrypted()]);
    let (_, mut dst) = float_buffer(1);

    let err = decode_frame_rows("", "fF", "", &records, &indices, &mut dst)
        .expect_err("加密记录");

    assert_eq!(err.kind(), &DecodeErrorKind::EncryptedRecord);
    assert_eq!(err.record_index(), Some(0));
    assert_eq!(err.offset(), None);
    assert_eq!(dst.value(0, 0), Some(FieldValue::F32(0.0)));
}

#[test]
fn missing_record_stops_the_call_after_earlier_rows() {
    let records = MemoryRecordSource::new(vec![float_row(1, 3.5, 2.0).build()]);
    let (_, mut dst) = float_buffer(2);

    let err = decode_frame_rows("", "fF", "", &records, &[0, 5], &mut dst)
        .expect_err("索引 5 不存在");

    assert_eq!(
        err.kind(),
        &DecodeErrorKind::RecordUnavailable(RecordError::NotFound { index: 5 })
    );
    assert_eq!(err.record_index(), Some(5));
    assert_eq!(dst.value(0, 0), Some(FieldValue::F32(3.5)));
}

#[test]
fn identifier_longer_than_slot_capacity_is_rejected() {
    let config = DecoderConfig::builder()
        .ident_capacity(4)
        .build()
        .expect("合法配置");
    let decoder = FrameDecoder::new(config).expect("合法配置");
    let format = FrameFormat::fields_only("ls").expect("合法格式");
    let mut dst = decoder.buffer_for(&format, 1);
    let record = RecordBuilder::frame(1, 0, "F")
        .uvari(1)
        .slong(7)
        .ident("TOOLONG");
    let ident_offset = record.len() - 8;
    let (records, indices) = source(vec![record.build()]);

    let err = decoder
        .decode(&format, &records, &indices, &mut dst)
        .expect_err("标识符超长");

    assert_eq!(
        err.kind(),
        &DecodeErrorKind::FieldTooLong {
            length: 7,
            capacity: 4
        }
    );
    assert_eq!(err.offset(), Some(ident_offset));
    assert_eq!(dst.value(0, 0), Some(FieldValue::I32(0)));
}

#[test]
fn precondition_violations_touch_no_record() {
    let (records, indices) = source(vec![float_row(1, 3.5, 2.0).build()]);

    let (_, mut dst) = float_buffer(1);
    let err = decode_frame_rows("", "fX", "", &records, &indices, &mut dst)
        .expect_err("X 不是表示码");
    assert_eq!(
        err.kind(),
        &DecodeErrorKind::InvalidFormat {
            symbol: 'X',
            position: 1
        }
    );
    assert_eq!(err.record_index(), None);

    let err = decode_frame_rows("", "", "", &records, &indices, &mut dst)
        .expect_err("字段段为空");
    assert_eq!(err.kind(), &DecodeErrorKind::EmptyFieldFormat);

    let (_, mut wrong_rows) = float_buffer(2);
    let err = decode_frame_rows("", "fF", "", &records, &indices, &mut wrong_rows)
        .expect_err("行数不符");
    assert_eq!(
        err.kind(),
        &DecodeErrorKind::RowCountMismatch {
            capacity: 2,
            requested: 1
        }
    );

    let err = decode_frame_rows("", "Ff", "", &records, &indices, &mut dst)
        .expect_err("列布局不符");
    assert_eq!(err.kind(), &DecodeErrorKind::LayoutMismatch);
    assert_eq!(dst.value(0, 0), Some(FieldValue::F32(0.0)));
}

#[test]
fn prefix_only_record_counts_as_empty() {
    let (records, indices) = source(vec![
        RecordBuilder::frame(1, 0, "F").build(),
        float_row(1, 3.5, 2.0).build(),
    ]);
    let (_, mut dst) = float_buffer(2);

    let report = decode_frame_rows("", "fF", "", &records, &indices, &mut dst).expect("记录完整");

    assert_eq!(report.empty_records, 1);
    assert_eq!(report.rows_written, 1);
    assert_eq!(dst.value(0, 0), Some(FieldValue::F32(3.5)));
    assert_eq!(dst.value(1, 0), Some(FieldValue::F32(0.0)));
}

#[test]
fn truncated_prefix_is_corrupt() {
    let (records, indices) = source(vec![RecordBuilder::frame(1, 0, "FRAME").truncate(3).build()]);
    let (_, mut dst) = float_buffer(1);

    let err = decode_frame_rows("", "fF", "", &records, &indices, &mut dst)
        .expect_err("前缀不完整");

    assert!(matches!(
        err.kind(),
        DecodeErrorKind::CorruptRecord {
            context: ReadContext::FramePrefix,
            ..
        }
    ));
    assert_eq!(err.offset(), Some(0));
}

#[test]
fn pre_and_post_spans_are_skipped_around_selected_fields() {
    let record = RecordBuilder::frame(1, 0, "F")
        .uvari(1)
        .fdoubl(1.0)
        .ident("SKIP")
        .slong(42)
        .ascii(b"tail");
    let post_offset = record.len() - 5;
    let (records, indices) = source(vec![record.clone().build()]);
    let format = FrameFormat::new("Fs", "l", "S").expect("合法格式");
    let decoder = FrameDecoder::default();
    let mut dst = decoder.buffer_for(&format, 1);

    decoder
        .decode(&format, &records, &indices, &mut dst)
        .expect("记录完整");
    assert_eq!(dst.row(0), Some(vec![FieldValue::I32(42)]));

    let (records, indices) = source(vec![record.truncate(1).build()]);
    let err = decoder
        .decode(&format, &records, &indices, &mut dst)
        .expect_err("跳过段被截断");
    assert!(matches!(
        err.kind(),
        DecodeErrorKind::CorruptRecord {
            context: ReadContext::PostSpan,
            ..
        }
    ));
    assert_eq!(err.offset(), Some(post_offset));
}

#[test]
fn every_column_kind_reads_back() {
    let record = RecordBuilder::frame(2, 1, "800T")
        .uvari(1)
        .raw(&[0xfd])
        .raw(&0x1234u16.to_be_bytes())
        .uvari(300)
        .ident("DEPT")
        .ascii(b"DEG\xb0C")
        .dtime(87, 2, 4, 19, 21, 20, 15, 620)
        .obname(2, 0, "TDEP")
        .objref("CHANNEL", 2, 0, "TDEP")
        .ushort(1);
    let (records, indices) = source(vec![record.build()]);
    let format = FrameFormat::fields_only("dUisSjoOq").expect("合法格式");
    let decoder = FrameDecoder::default();
    let mut dst = decoder.buffer_for(&format, 1);

    decoder
        .decode(&format, &records, &indices, &mut dst)
        .expect("记录完整");

    let stamp = NaiveDate::from_ymd_opt(1987, 4, 19)
        .and_then(|date| date.and_hms_micro_opt(21, 20, 15, 620_000))
        .expect("合法日期");
    let object = |column| dst.object(0, column).map(|cell| cell.get().clone());

    assert_eq!(dst.value(0, 0), Some(FieldValue::I8(-3)));
    assert_eq!(dst.value(0, 1), Some(FieldValue::U16(0x1234)));
    assert_eq!(dst.value(0, 2), Some(FieldValue::I32(300)));
    assert_eq!(dst.value(0, 3), Some(FieldValue::Ident("DEPT".into())));
    assert_eq!(
        object(4),
        Some(FieldObject::Text(TextValue::Utf8("DEG°C".into())))
    );
    assert_eq!(object(5), Some(FieldObject::DateTime(stamp)));
    assert_eq!(
        object(6),
        Some(FieldObject::ObName(ObName::new(2, 0, "TDEP")))
    );
    assert_eq!(
        object(7),
        Some(FieldObject::ObjRef(ObjRef::new(
            "CHANNEL",
            ObName::new(2, 0, "TDEP")
        )))
    );
    assert_eq!(dst.value(0, 8), Some(FieldValue::U8(1)));
}

#[test]
fn invalid_timestamp_is_fatal() {
    let record = RecordBuilder::frame(1, 0, "F")
        .uvari(1)
        .dtime(87, 0, 2, 30, 0, 0, 0, 0);
    let (records, indices) = source(vec![record.build()]);
    let format = FrameFormat::fields_only("j").expect("合法格式");
    let decoder = FrameDecoder::default();
    let mut dst = decoder.buffer_for(&format, 1);

    let err = decoder
        .decode(&format, &records, &indices, &mut dst)
        .expect_err("2 月 30 日");

    assert_eq!(err.kind(), &DecodeErrorKind::InvalidTimestamp);
    assert_eq!(dst.object(0, 0).map(|cell| cell.get().clone()), Some(FieldObject::Null));
}

proptest! {
    #[test]
    fn prop_float_rows_round_trip(
        rows in prop::collection::vec((-1.0e6f32..1.0e6f32, -1.0e12f64..1.0e12f64), 1..24)
    ) {
        let records: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(n, &(single, double))| float_row(n as u32 + 1, single, double).build())
            .collect();
        let (records, indices) = source(records);
        let (_, mut dst) = float_buffer(rows.len());

        let report = decode_frame_rows("", "fF", "", &records, &indices, &mut dst)
            .expect("记录完整");

        prop_assert_eq!(report.rows_written, rows.len());
        prop_assert!(report.anomalies.is_empty());
        for (n, &(single, double)) in rows.iter().enumerate() {
            prop_assert_eq!(
                dst.row(n),
                Some(vec![FieldValue::F32(single), FieldValue::F64(double)])
            );
        }
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(body in prop::collection::vec(any::<u8>(), 0..96)) {
        let (records, indices) = source(vec![RecordBuilder::frame(1, 0, "F").raw(&body).build()]);
        let format = FrameFormat::fields_only("fsSOj").expect("合法格式");
        let decoder = FrameDecoder::default();
        let mut dst = decoder.buffer_for(&format, 1);

        if let Ok(report) = decoder.decode(&format, &records, &indices, &mut dst) {
            prop_assert!(report.rows_written + report.empty_records == 1);
        }
    }
}
