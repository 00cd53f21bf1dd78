//! Codec-level tests: cursor accounting, varints, versioned decoders.

mod common;

use calltree_studio::codec::{ByteReader, CallDecoder, CancelToken, StreamHeader};
use calltree_studio::model::CallEvent;
use calltree_studio::utils::error::DecodeError;
use common::{encode_stream, RecordSpec};
use pretty_assertions::assert_eq;

fn reader(bytes: &[u8]) -> ByteReader<&[u8]> {
    ByteReader::new(bytes)
}

fn parse_var_int(bytes: &[u8]) -> u32 {
    reader(bytes).read_var_int().unwrap()
}

#[test]
fn fixed_width_reads_track_position() {
    let mut r = reader(&[0, 0x63, 0, 0x61]);
    assert_eq!(r.position(), 0);
    assert_eq!(r.read_char().unwrap(), 'c' as u16);
    assert_eq!(r.position(), 2);
    assert_eq!(r.read_char().unwrap(), 'a' as u16);
    assert_eq!(r.position(), 4);

    let mut r = reader(&[0, 11, 0, 0, 1, 114]);
    assert_eq!(r.read_short().unwrap(), 11);
    assert_eq!(r.position(), 2);

    let mut r = reader(&[0, 0, 0, 11, 0, 0, 1, 114]);
    assert_eq!(r.read_int().unwrap(), 11);
    assert_eq!(r.position(), 4);

    let mut r = reader(&[0, 0, 0, 11, 0, 0, 1, 114]);
    assert_eq!(r.read_long().unwrap(), 47_244_640_626);
    assert_eq!(r.position(), 8);
}

#[test]
fn var_int_byte_fixtures() {
    assert_eq!(parse_var_int(&[0x03, 0x00]), 3);
    assert_eq!(parse_var_int(&[0x09, 0x00]), 9);
    assert_eq!(parse_var_int(&[0x0A, 0x00]), 10);
    assert_eq!(parse_var_int(&[0x11, 0x00]), 17);
    assert_eq!(parse_var_int(&[0x19, 0x00]), 25);
    assert_eq!(parse_var_int(&[0xA7, 0x01]), 167);
    assert_eq!(parse_var_int(&[0xF4, 0x01]), 244);
    assert_eq!(parse_var_int(&[0xFE, 0x01]), 254);
    assert_eq!(parse_var_int(&[0x80, 0x02]), 256);
    assert_eq!(parse_var_int(&[0xB1, 0x01]), 177);
    assert_eq!(parse_var_int(&[0, 0, 39, 18]), 0);
}

#[test]
fn var_int_consumes_single_byte_for_small_values() {
    let mut r = reader(&[0x03, 0x00, 0x03, 0x00]);
    assert_eq!(r.read_var_int().unwrap(), 3);
    assert_eq!(r.position(), 1);

    let mut r = reader(&[0x03, 0x00, 0x03, 0x00]);
    assert_eq!(r.read_var_long().unwrap(), 3);
    assert_eq!(r.position(), 1);
}

#[test]
fn string_read_and_skip_advance_identically() {
    let bytes = [0x05, 0, 0x63, 0, 0x61, 0, 0x6c, 0, 0x2e, 0, 0x6c, 1];
    let mut r = reader(&bytes);
    assert_eq!(r.read_string().unwrap(), "cal.l");
    assert_eq!(r.position(), 11);

    let mut r = reader(&bytes);
    r.skip_string().unwrap();
    assert_eq!(r.position(), 11);
}

#[test]
fn exhausted_source_is_end_of_stream() {
    let mut r = reader(&[0x80]); // continuation bit with nothing after
    let err = r.read_var_int().unwrap_err();
    assert!(err.is_end_of_stream());

    let mut r = reader(&[0, 0, 1]); // int needs four bytes
    let err = r.read_int().unwrap_err();
    assert!(err.is_end_of_stream());
}

#[test]
fn cancellation_is_distinct_from_data_errors() {
    let token = CancelToken::new();
    let mut r = ByteReader::new(&[1u8, 2, 3][..]).with_cancel(token.clone());
    assert_eq!(r.read_u8().unwrap(), 1);

    token.cancel();
    let err = r.read_u8().unwrap_err();
    assert!(matches!(err, DecodeError::Interrupted));
    assert!(!err.is_end_of_stream());
}

#[test]
fn header_selects_format_and_start_time() {
    let bytes = encode_stream(4, 1_700_000_000_000, &[]);
    let mut r = reader(&bytes);
    let header = StreamHeader::read(&mut r).unwrap();
    assert_eq!(header.format, 4);
    assert_eq!(header.start_time, 1_700_000_000_000);
}

#[test]
fn decoder_exists_only_for_known_formats() {
    assert!(CallDecoder::for_format(0).is_none());
    for format in 1..=4 {
        assert!(CallDecoder::for_format(format).is_some());
    }
    assert!(CallDecoder::for_format(5).is_none());
}

fn decode_one(format: u32, bytes: &[u8]) -> Result<CallEvent, DecodeError> {
    let mut r = reader(bytes);
    StreamHeader::read(&mut r)?;
    let mut decoder = CallDecoder::for_format(format).expect("known format");
    let mut call = CallEvent::default();
    decoder.read(&mut call, &mut r)?;
    decoder.read_params(&mut call, &mut r)?;
    Ok(call)
}

#[test]
fn v1_decoder_reproduces_v1_fields() {
    let mut record = RecordSpec::call(42, 7, 1_500, "worker-1");
    record.logs_written = 3;
    record.logs_generated_delta = 2;
    record.file_index = 1;
    record.buffer_offset = 200;
    record.record_index = 5;
    let bytes = encode_stream(1, 0, &[record]);

    let call = decode_one(1, &bytes).unwrap();
    assert_eq!(call.time, 42);
    assert_eq!(call.method, 7);
    assert_eq!(call.duration, 1_500);
    assert_eq!(call.thread_name, "worker-1");
    assert_eq!(call.logs_written, 3);
    // generated travels as a delta above written
    assert_eq!(call.logs_generated, 5);
    assert_eq!(
        (call.trace_file_index, call.buffer_offset, call.record_index),
        (1, 200, 5)
    );
    // fields of later formats stay zero
    assert_eq!(call.cpu_time, 0);
    assert_eq!(call.net_read, 0);
    assert_eq!(call.transactions, 0);
}

#[test]
fn v4_decoder_reads_all_cumulative_fields() {
    let mut record = RecordSpec::call(10, 2, 300, "main");
    record.cpu_time = 120;
    record.wait_time = 40;
    record.memory_used = 1 << 36; // exercises the long varint tail
    record.file_read = 512;
    record.file_written = 256;
    record.net_read = 1_024;
    record.net_written = 2_048;
    record.transactions = 3;
    record.queue_wait = 17;
    let bytes = encode_stream(4, 0, &[record]);

    let call = decode_one(4, &bytes).unwrap();
    assert_eq!(call.cpu_time, 120);
    assert_eq!(call.wait_time, 40);
    assert_eq!(call.memory_used, 1 << 36);
    assert_eq!(call.file_read, 512);
    assert_eq!(call.net_written, 2_048);
    assert_eq!(call.transactions, 3);
    assert_eq!(call.queue_wait_duration, 17);
}

#[test]
fn v4_decoder_rejects_v1_shaped_payload() {
    let record = RecordSpec::call(10, 2, 300, "main");
    let bytes = encode_stream(1, 0, &[record]);
    // reading v2+ fields runs off the end of the single v1 record
    let err = decode_one(4, &bytes).unwrap_err();
    assert!(err.is_end_of_stream());
}

#[test]
fn params_decode_with_zero_one_and_many_values() {
    let record = RecordSpec::call(0, 1, 10, "t")
        .with_param(4, &[])
        .with_param(5, &["only"])
        .with_param(6, &["first", "second", "third"]);
    let bytes = encode_stream(1, 0, &[record]);

    let call = decode_one(1, &bytes).unwrap();
    assert_eq!(call.params[&4], Vec::<String>::new());
    assert_eq!(call.params[&5], vec!["only"]);
    assert_eq!(call.params[&6], vec!["first", "second", "third"]);
}

#[test]
fn thread_name_table_is_incremental() {
    let records = vec![
        RecordSpec::call(0, 1, 10, "alpha"),
        RecordSpec::call(1, 1, 10, "beta"),
        RecordSpec::call(1, 1, 10, "alpha"),
    ];
    let bytes = encode_stream(1, 0, &records);

    let mut r = reader(&bytes);
    StreamHeader::read(&mut r).unwrap();
    let mut decoder = CallDecoder::for_format(1).unwrap();
    let mut names = Vec::new();
    for _ in 0..3 {
        let mut call = CallEvent::default();
        decoder.read(&mut call, &mut r).unwrap();
        decoder.read_params(&mut call, &mut r).unwrap();
        names.push(call.thread_name);
    }
    assert_eq!(names, vec!["alpha", "beta", "alpha"]);
}

#[test]
fn corrupt_thread_index_gets_a_placeholder() {
    use calltree_studio::codec::ByteWriter;
    use calltree_studio::utils::config::CALL_HEADER_MAGIC;

    let mut w = ByteWriter::new();
    w.write_long(((CALL_HEADER_MAGIC as i64) << 32) | 1);
    w.write_long(0);
    w.write_var_long_zigzag(0); // time delta
    w.write_var_int(1); // method
    w.write_var_int(10); // duration
    w.write_var_int(1); // calls
    w.write_var_int(9); // thread index far past the (empty) table
    w.write_var_int(0); // logs written
    w.write_var_int(0); // logs generated delta
    w.write_var_int(0); // file
    w.write_var_int(0); // offset
    w.write_var_int(0); // record
    w.write_var_int(0); // params
    let bytes = w.into_bytes();

    let call = decode_one(1, &bytes).unwrap();
    assert_eq!(call.thread_name, "unknown # 9");
}
