// File: crates/chart-core/tests/codec.rs
// Purpose: Schema registry decoding, request identity and transport reply correlation.

mod common;

use chart_core::codec::Schema;
use chart_core::transport::{Inbound, Topic};
use chart_core::{CodecError, CodecRegistry, DataRequest, IndicatorOptions, Record, TransportError};
use common::{ScriptedChannel, HOUR};

#[test]
fn decodes_rows_with_line_breaks_in_payload() {
    let schema = Schema::new("MACD", &["macd", "signal", "histogram"]);
    let payload = schema
        .encode_rows(&[(HOUR, vec![1.5, 1.0, 0.5]), (2 * HOUR, vec![-0.25, 0.0, -0.25])])
        .expect("field count matches");
    let wrapped = format!("{}\r\n{}\n", &payload[..20], &payload[20..]);

    let records = schema.decode(&wrapped).expect("decodes");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, HOUR);
    assert_eq!(records[0].get("signal"), Some(1.0));
    assert_eq!(records[1].get("histogram"), Some(-0.25));
}

#[test]
fn partial_row_is_rejected() {
    // Ten zero bytes: not a whole 16-byte row.
    let err = Schema::new("SMA", &["value"]).decode("AAAAAAAAAAAAAA==").expect_err("truncated");
    assert!(matches!(err, CodecError::Truncated { len: 10, row: 16 }));
}

#[test]
fn missing_field_encodes_as_nan() {
    let schema = Schema::new("BBands", &["upper", "middle", "lower"]);
    let payload = schema.encode(&[Record::new(0).with("upper", 3.0).with("lower", 1.0)]);
    let rec = &schema.decode(&payload).expect("decodes")[0];
    assert!(rec.get("middle").is_some_and(f64::is_nan));
    assert_eq!(rec.get("lower"), Some(1.0));
}

#[test]
fn encode_rows_checks_field_count() {
    let err = Schema::new("SMA", &["value"]).encode_rows(&[(0, vec![1.0, 2.0])]).expect_err("too many");
    assert!(matches!(err, CodecError::FieldCount { got: 2, want: 1, .. }));
}

#[test]
fn registry_resolves_known_and_strategy_names() {
    let reg = CodecRegistry::with_defaults();
    assert_eq!(reg.schema("OHLCV").map(|s| s.fields.len()).ok(), Some(5));
    assert_eq!(reg.schema("HilbertTrendline").map(|s| s.fields.clone()).ok(), Some(vec!["value".to_string()]));
    assert_eq!(reg.schema("MeanReversionStrategy").map(|s| s.name.as_str()).ok(), Some("Strategy"));
    assert!(matches!(reg.schema("Nope"), Err(CodecError::UnknownIndicator(name)) if name == "Nope"));
}

#[test]
fn options_key_ignores_insertion_order() {
    let a = IndicatorOptions::new().with("fastPeriod", 12).with("slowPeriod", 26);
    let b = IndicatorOptions::new().with("slowPeriod", 26).with("fastPeriod", 12);
    assert_eq!(a.canonical(), b.canonical());
    assert_eq!(a.fingerprint(), b.fingerprint());

    let ra = DataRequest::new("X", "MACD", HOUR, 0, 10 * HOUR).with_options(a);
    let rb = DataRequest::new("X", "MACD", HOUR, 5 * HOUR, 20 * HOUR).with_options(b);
    assert_eq!(ra.key(), rb.key());

    let other = DataRequest::new("X", "MACD", 60, 0, 10 * HOUR);
    assert_ne!(ra.key(), other.key());
}

#[test]
fn request_orders_its_range() {
    let req = DataRequest::new("X", "Y", HOUR, 10 * HOUR, 4 * HOUR);
    assert_eq!((req.start_time, req.end_time), (4 * HOUR, 10 * HOUR));
    assert_eq!(req.periods(), 6);
}

#[test]
fn data_envelope_carries_the_request_as_json() {
    let ch = ScriptedChannel::new();
    let mut adapter = ch.adapter();
    let req = DataRequest::new("BTCUSD", "SMA", HOUR, 0, 4 * HOUR).with_options(IndicatorOptions::new().with("period", 9));
    adapter.request_data(&req).expect("sent");

    let sent = ch.sent();
    assert_eq!(sent[0].topic, Topic::Data);
    let body: serde_json::Value = serde_json::from_str(&sent[0].body).expect("json");
    assert_eq!(body["startTime"], 0);
    assert_eq!(body["endTime"], 4 * HOUR);
    assert_eq!(body["options"]["period"], 9);
    assert_eq!(adapter.in_flight(), 1);
}

#[test]
fn replies_are_decoded_by_their_request() {
    let ch = ScriptedChannel::new();
    let mut adapter = ch.adapter();
    let sma = adapter.request_data(&DataRequest::new("X", "SMA", HOUR, 0, HOUR)).expect("sent");
    let tick = adapter.request_tick(1).expect("sent");
    let max = adapter.request_max_time().expect("sent");

    // Out of order, plus one reply nobody asked for.
    ch.reply(999, "stray");
    ch.reply(max, "7200");
    ch.fail(tick, TransportError::Remote("clock stopped".into()));
    ch.answer(sma, "SMA", &[Record::new(HOUR).with("value", 2.0)]);

    assert_eq!(adapter.poll().map(|(id, r)| (id, r.ok())), Some((max, Some(Inbound::MaxTime(7200)))));
    assert_eq!(
        adapter.poll().map(|(id, r)| (id, r.ok())),
        Some((tick, Some(Inbound::Failed(TransportError::Remote("clock stopped".into())))))
    );
    assert_eq!(
        adapter.poll().map(|(id, r)| (id, r.ok())),
        Some((sma, Some(Inbound::Series(vec![Record::new(HOUR).with("value", 2.0)]))))
    );
    assert!(adapter.poll().is_none());
    assert_eq!(adapter.in_flight(), 0);
}

#[test]
fn unparseable_max_time_is_a_failed_reply() {
    let ch = ScriptedChannel::new();
    let mut adapter = ch.adapter();
    let id = adapter.request_max_time().expect("sent");
    ch.reply(id, "later");
    let (_, inbound) = adapter.poll().expect("reply");
    assert!(matches!(inbound, Ok(Inbound::Failed(TransportError::UnexpectedReply { topic: "maxTime", .. }))));
}
