//! Decoding tests on SM4 images built in memory.

mod common;

use common::*;
use sm4::prelude::*;
use sm4::sm4::{ObjectOutcome, SkipReason};
use std::io::Write;

fn ts(date: &str, time: &str) -> chrono::NaiveDateTime {
    parse_sm4_datetime(date, time).expect("valid timestamp")
}

#[test]
fn test_ten_channel_set() {
    let data = build(&ten_channel_set());
    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");

    assert_eq!(sm4.len(), 10);
    assert_eq!(sm4.topography_channels().len(), 2);
    assert_eq!(sm4.current_channels().len(), 2);
    assert_eq!(sm4.channels_of(PageType::Aux).len(), 2);

    for ch in &sm4 {
        assert!((ch.current * 1e10 - 1.997).abs() < 1e-3);
        assert!((ch.bias + 0.171).abs() < 1e-3);
        assert!((ch.xsize * 1e9 - 300.0).abs() < 1e-3);
        assert!((ch.ysize * 1e9 - 300.0).abs() < 1e-3);
        assert_eq!((ch.xres, ch.yres), (4, 2));
        assert!((ch.period - 0.0003).abs() < 1e-6);
        assert_eq!(ch.angle, 116.0);
        assert_eq!(ch.timestamp, Some(ts("1/8/20", "14:13:11")));
        assert_eq!(ch.data, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }
    assert_eq!(sm4[0].page_type, PageType::Topographic);
    assert_eq!(sm4[1].page_type, PageType::Current);
}

#[test]
fn test_iv_set() {
    let data = build(&iv_set());
    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");

    assert_eq!(sm4.len(), 5);
    assert!(sm4.topography_channels().is_empty());
    assert!(sm4.current_channels().is_empty());
    for ch in sm4.iter() {
        assert_eq!(ch.page_type, PageType::RampSpectroscopyRp);
        assert_eq!(ch.line_type, LineType::IvSpectrum);
        assert_eq!(ch.scan_type, ScanType::Right);
        assert_eq!((ch.xres, ch.yres), (299, 5));
        assert_eq!(ch.len(), 299 * 5);
        assert!((ch.period - 0.0025).abs() < 1e-6);
        assert!((ch.bias - 0.99411).abs() < 1e-5);
        assert!((ch.current * 1e11 - 4.31244).abs() < 1e-4);
        assert_eq!(ch.angle, 0.0);
        assert_eq!(ch.timestamp, Some(ts("6/17/23", "11:12:42")));
    }
}

#[test]
fn test_decode_is_deterministic() {
    let data = build(&ten_channel_set());
    let a = Sm4::from_bytes(&data).expect("first decode");
    let b = Sm4::from_bytes(&data).expect("second decode");
    assert_eq!(a.channels(), b.channels());
}

#[test]
fn test_walked_objects_match_declared_count() {
    let mut spec = ten_channel_set();
    spec.pages[3].objects.push(Obj::Raw(99, 40, 8));
    spec.pages[3].objects.push(Obj::Raw(TAG_STRING_DATA, 0, 0));
    let data = build(&spec);
    let container = Container::from_bytes(&data).expect("Failed to decode");

    for (page, declared) in container.pages().iter().zip(&spec.pages) {
        assert_eq!(page.walked_objects(), declared.objects.len());
        assert_eq!(page.walked_objects(), page.objects.len());
    }
}

#[test]
fn test_empty_records_are_skipped() {
    let header = HeaderSpec::default();
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.objects.push(Obj::Raw(TAG_STRING_DATA, 0, 100));
    page.objects.push(Obj::Raw(TAG_TIP_TRACK_DATA, 500, 0));
    page.objects.push(Obj::Raw(TAG_PAGE_DATA, 0, 0));
    page.objects.push(Obj::Raw(77, 64, 4));
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let container = Container::from_bytes(&data).expect("Failed to decode");
    let entries = &container.pages()[0].entries;
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0].outcome, ObjectOutcome::Header);
    assert!(entries[1].object().is_some());
    assert!(entries[2].object().is_some());
    for entry in &entries[3..6] {
        assert_eq!(entry.outcome, ObjectOutcome::Skipped(SkipReason::Empty));
    }
    assert_eq!(entries[6].outcome, ObjectOutcome::Skipped(SkipReason::NoDecoder));
    assert_eq!(entries[6].record.object_type, ObjectType::Unknown(77));
}

#[test]
fn test_missing_page_index_header() {
    let mut spec = ten_channel_set();
    spec.omit_page_index = true;
    let data = build(&spec);

    match Container::from_bytes(&data) {
        Err(Error::MissingRequiredObject { object, .. }) => assert_eq!(object, ObjectType::PageIndexHeader),
        other => panic!("expected MissingRequiredObject, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_page_index_array() {
    let mut spec = ten_channel_set();
    spec.omit_page_array = true;
    let data = build(&spec);

    // container header + 3 records, then the page index header
    let index_records = 58 + 3 * 12 + 16;
    match Container::from_bytes(&data) {
        Err(Error::MissingRequiredObject { object, offset, .. }) => {
            assert_eq!(object, ObjectType::PageIndexArray);
            assert_eq!(offset, index_records as u64);
        }
        other => panic!("expected MissingRequiredObject, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_object_count_overrun() {
    let header = HeaderSpec::default();
    let spec = ContainerSpec { pages: vec![image_page(1, &header, "1/8/20", "14:13:11")], ..Default::default() };
    let mut data = build(&spec);

    // container header + 1 record, page index header + 1 record
    let table_pos = 58 + 12 + 16 + 12;
    data[table_pos + 24..table_pos + 28].copy_from_slice(&1_000_000u32.to_le_bytes());

    let first_record = table_pos + 32;
    let expected = first_record + 4 * ((data.len() - first_record) / 4);

    match Container::from_bytes(&data) {
        Err(Error::TruncatedInput { offset, wanted, context }) => {
            assert_eq!(offset, expected as u64);
            assert_eq!(wanted, 4);
            assert_eq!(context.page, Some(0));
        }
        other => panic!("expected TruncatedInput, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_page_data_type() {
    let header = HeaderSpec::default();
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.data_type = 42;
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let err = Container::from_bytes(&data).err();
    assert!(matches!(err, Some(Error::UnrecognizedTag { value: 42, .. })));
}

#[test]
fn test_tip_track_dependency() {
    let header = HeaderSpec::default();
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.objects.push(Obj::Blob(TAG_TIP_TRACK_DATA, tip_track_data(2)));
    page.objects.push(Obj::Blob(TAG_TIP_TRACK_HEADER, tip_track_header(3)));
    page.objects.push(Obj::Blob(TAG_TIP_TRACK_DATA, tip_track_data(3)));
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4.len(), 1);

    let entries = &sm4.container().pages()[0].entries;
    assert!(matches!(entries[3].outcome, ObjectOutcome::DependencyMissing { .. }));
    match entries[4].object() {
        Some(PageObject::TipTrackHeader(h)) => assert_eq!(h.info_count, 3),
        other => panic!("expected tip-track header, got {:?}", other),
    }
    match entries[5].object() {
        Some(PageObject::TipTrackData(d)) => {
            assert_eq!(d.records.len(), 3);
            assert_eq!(d.records[1].cumulative_time, 4.0);
        }
        other => panic!("expected tip-track data, got {:?}", other),
    }
}

#[test]
fn test_page_prm() {
    let header = HeaderSpec::default();
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.objects.push(Obj::Blob(TAG_PRM_HEADER, page_prm(1, &[])));
    page.objects.push(Obj::Blob(TAG_PRM_HEADER, page_prm(0, &[7, 8, 9])));
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let container = Container::from_bytes(&data).expect("Failed to decode");
    let page = &container.pages()[0];
    assert!(matches!(page.entries[3].outcome, ObjectOutcome::Unsupported { .. }));
    match page.entries[4].object() {
        Some(PageObject::PrmHeader(prm)) => assert_eq!(prm.data, vec![7, 8, 9]),
        other => panic!("expected PRM header, got {:?}", other),
    }
    // siblings unaffected
    assert!(page.data().is_some());
    assert!(page.string_data().is_some());
}

#[test]
fn test_page_prm_ignores_empty_prm_record() {
    let header = HeaderSpec::default();
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.objects.push(Obj::Raw(TAG_PRM, 0, 12));
    page.objects.push(Obj::Blob(TAG_PRM_HEADER, page_prm(0, &[7, 8, 9])));
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let container = Container::from_bytes(&data).expect("Failed to decode");
    let page = &container.pages()[0];
    assert_eq!(page.entries[3].outcome, ObjectOutcome::Skipped(SkipReason::Empty));
    match page.entries[4].object() {
        Some(PageObject::PrmHeader(prm)) => assert_eq!(prm.data, vec![7, 8, 9]),
        other => panic!("expected PRM header, got {:?}", other),
    }
}

#[test]
fn test_container_prm() {
    let data = build(&ten_channel_set());
    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4.prm_text().as_deref(), Some("[Scan]\r\nRate=1\r\n"));

    let mut out = Vec::new();
    let written = sm4.write_prm(&mut out).expect("write_prm");
    assert_eq!(written, out.len());
    assert_eq!(out, b"[Scan]\r\nRate=1\r\n");
}

#[test]
fn test_container_prm_compressed() {
    let mut spec = ten_channel_set();
    spec.prm = Some((1, vec![0x78, 0x9c, 0x03, 0x00]));
    let data = build(&spec);

    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4.len(), 10);
    assert!(sm4.prm_text().is_none());
    assert!(matches!(
        sm4.container().prm().map(|p| &p.payload),
        Some(PrmPayload::Compressed { compressed_size: 4 })
    ));
    let mut out = Vec::new();
    assert_eq!(sm4.write_prm(&mut out).expect("write_prm"), 0);
    assert!(out.is_empty());
}

#[test]
fn test_sequential_page_has_no_channel() {
    let mut spec = ten_channel_set();
    spec.pages.insert(
        1,
        PageSpec {
            id: 99,
            data_type: DATA_TYPE_SEQUENTIAL,
            objects: vec![
                Obj::Blob(TAG_PAGE_HEADER, sequential_header(&[(2.0, "Bias", "V"), (1.0, "Time", "s")])),
                Obj::Blob(TAG_PAGE_DATA, samples(&[1, 2, 3])),
            ],
        },
    );
    let data = build(&spec);

    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4.container().num_pages(), 11);
    assert_eq!(sm4.len(), 10);

    let page = &sm4.container().pages()[1];
    let seq = page.header.as_sequential().expect("sequential header");
    assert_eq!(seq.params.len(), 2);
    assert_eq!(seq.params[0].label, "Bias");
    assert_eq!(page.entries[1].outcome, ObjectOutcome::Skipped(SkipReason::SequentialPage));
}

#[test]
fn test_line_page_is_projected() {
    let header = HeaderSpec { page_type: 10, line_type: 7, ..HeaderSpec::default() };
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.data_type = DATA_TYPE_LINE;
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4.len(), 1);
    assert_eq!(sm4[0].page_type, PageType::IvSpectra);
}

#[test]
fn test_calibration() {
    let header = HeaderSpec { z_scale: 0.5, z_offset: -1.0, ..HeaderSpec::default() };
    let data = build(&ContainerSpec {
        pages: vec![image_page(1, &header, "1/8/20", "14:13:11")],
        ..Default::default()
    });

    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4[0].data, vec![-1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
    assert_eq!(sm4[0].row(1), Some(&[1.0f32, 1.5, 2.0, 2.5][..]));
}

#[test]
fn test_first_string_bundle_sets_timestamp() {
    let header = HeaderSpec::default();
    let mut page = image_page(1, &header, "1/8/20", "14:13:11");
    page.objects.push(Obj::Blob(TAG_STRING_DATA, string_data("6/17/23", "11:12:42")));
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4[0].timestamp, Some(ts("1/8/20", "14:13:11")));
}

#[test]
fn test_timestamp_fallback() {
    let header = HeaderSpec::default();
    let page = PageSpec {
        id: 1,
        data_type: DATA_TYPE_IMAGE,
        objects: vec![
            Obj::Blob(TAG_PAGE_HEADER, default_header(&header)),
            Obj::Blob(TAG_PAGE_DATA, samples(&[0; 8])),
            Obj::Blob(TAG_STRING_DATA, string_data("not a date", "")),
        ],
    };
    let data = build(&ContainerSpec { pages: vec![page], ..Default::default() });

    // In memory there is nothing to fall back on.
    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert_eq!(sm4[0].timestamp, None);

    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(&data).expect("write");
    file.flush().expect("flush");

    let sm4 = Sm4::open(file.path()).expect("Failed to open");
    let created = sm4.container().source_created();
    assert!(created.is_some());
    assert_eq!(sm4[0].timestamp, created);
}

#[test]
fn test_open_mmap_and_buffered_agree() {
    let data = build(&ten_channel_set());
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(&data).expect("write");
    file.flush().expect("flush");

    let mapped = Sm4::open_with(file.path(), OpenOptions::new().mmap(true)).expect("mmap open");
    let buffered = Sm4::open_with(file.path(), OpenOptions::new().mmap(false)).expect("buffered open");
    assert_eq!(mapped.channels(), buffered.channels());
    assert_eq!(mapped.len(), 10);
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Sm4::open(dir.path().join("missing.SM4")).err();
    assert!(matches!(err, Some(Error::FileNotFound(_))));
}

#[test]
fn test_channel_out_of_bounds() {
    let data = build(&iv_set());
    let sm4 = Sm4::from_bytes(&data).expect("Failed to decode");
    assert!(sm4.channel(4).is_ok());
    assert!(sm4.get(5).is_none());
    assert!(matches!(sm4.channel(5), Err(Error::ChannelOutOfBounds { index: 5, count: 5 })));
}

#[test]
fn test_truncated_file() {
    let data = build(&ten_channel_set());
    for len in [10, 100, data.len() - 1] {
        let err = Container::from_bytes(&data[..len]).err();
        assert!(
            matches!(err, Some(Error::TruncatedInput { .. })),
            "length {} gave {:?}",
            len,
            err
        );
    }
}
