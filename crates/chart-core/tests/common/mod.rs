// File: crates/chart-core/tests/common/mod.rs
// Purpose: Scripted in-memory channel shared by the integration tests.
// Behavior:
// - Records every outbound envelope; replies are queued by the test and handed out on poll.
// - Handles are cheap clones over one shared script, so a test keeps one after the
//   adapter has taken its own.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use chart_core::axis::SharedTimeAxis;
use chart_core::chart::SharedCache;
use chart_core::codec::Schema;
use chart_core::transport::{Channel, Envelope, MessageId, Reply, Topic};
use chart_core::{
    CacheConfig, CodecRegistry, DataRequest, Record, SeriesCache, TimeAxis, TimeAxisConfig, TransportAdapter,
    TransportError,
};

pub const HOUR: i64 = 3600;

#[derive(Default)]
pub struct Script {
    pub sent: Vec<Envelope>,
    pub replies: VecDeque<Reply>,
    pub answered: HashSet<MessageId>,
    pub closed: bool,
}

#[derive(Clone, Default)]
pub struct ScriptedChannel(pub Rc<RefCell<Script>>);

impl Channel for ScriptedChannel {
    fn send(&mut self, envelope: Envelope) -> Result<(), TransportError> {
        let mut script = self.0.borrow_mut();
        if script.closed {
            return Err(TransportError::Closed);
        }
        script.sent.push(envelope);
        Ok(())
    }

    fn poll(&mut self) -> Option<Reply> {
        self.0.borrow_mut().replies.pop_front()
    }
}

/// Default schemas plus the single-field `Y` indicator the tests request.
pub fn test_codecs() -> CodecRegistry {
    let mut codecs = CodecRegistry::with_defaults();
    codecs.register(Schema::new("Y", &["value"]));
    codecs
}

impl ScriptedChannel {
    pub fn new() -> Self { Self::default() }

    pub fn adapter(&self) -> TransportAdapter {
        TransportAdapter::new(self.clone(), test_codecs())
    }

    pub fn cache(&self) -> SeriesCache {
        SeriesCache::new(self.adapter(), CacheConfig::default())
    }

    pub fn close(&self) {
        self.0.borrow_mut().closed = true;
    }

    pub fn sent(&self) -> Vec<Envelope> {
        self.0.borrow().sent.clone()
    }

    pub fn sent_count(&self, topic: Topic) -> usize {
        self.0.borrow().sent.iter().filter(|e| e.topic == topic).count()
    }

    /// Every `data` message sent so far, decoded back into its request.
    pub fn data_requests(&self) -> Vec<(MessageId, DataRequest)> {
        self.0
            .borrow()
            .sent
            .iter()
            .filter(|e| e.topic == Topic::Data)
            .map(|e| (e.id, serde_json::from_str(&e.body).expect("request body is JSON")))
            .collect()
    }

    pub fn last_data_request(&self) -> (MessageId, DataRequest) {
        self.data_requests().pop().expect("a data request was sent")
    }

    pub fn reply(&self, id: MessageId, body: impl Into<String>) {
        let mut script = self.0.borrow_mut();
        script.answered.insert(id);
        script.replies.push_back(Reply { id, body: Ok(body.into()) });
    }

    pub fn fail(&self, id: MessageId, error: TransportError) {
        let mut script = self.0.borrow_mut();
        script.answered.insert(id);
        script.replies.push_back(Reply { id, body: Err(error) });
    }

    pub fn answer(&self, id: MessageId, indicator: &str, records: &[Record]) {
        let body = test_codecs().encode(indicator, records).expect("indicator is registered");
        self.reply(id, body);
    }

    /// Answer every unanswered `data` message with whatever `serve` returns for it.
    pub fn serve_pending(&self, serve: impl Fn(&DataRequest) -> Vec<Record>) -> usize {
        let pending: Vec<(MessageId, DataRequest)> = self
            .data_requests()
            .into_iter()
            .filter(|(id, _)| !self.0.borrow().answered.contains(id))
            .collect();
        for (id, req) in &pending {
            self.answer(*id, &req.indicator, &serve(req));
        }
        pending.len()
    }
}

/// Single-field records on the `period` grid between `start` and `end`, value = bucket index.
pub fn ramp(start: i64, end: i64, period: i64) -> Vec<Record> {
    (start..=end)
        .step_by(period as usize)
        .map(|t| Record::new(t).with("value", ((t - start) / period) as f64))
        .collect()
}

/// Candles on the grid of the request: rising on even buckets, falling on odd ones.
pub fn candles(req: &DataRequest) -> Vec<Record> {
    (req.start_time..=req.end_time)
        .step_by(req.period as usize)
        .map(|t| {
            let i = (t / req.period) as f64;
            let base = 100.0 + (i % 10.0);
            let (o, c) = if (t / req.period) % 2 == 0 { (base, base + 2.0) } else { (base + 2.0, base) };
            Record::try_ohlcv(t, o, base + 3.0, base - 1.0, c, 1000.0 + i % 7.0 * 100.0).expect("valid candle")
        })
        .collect()
}

/// A 400 px wide hourly time axis anchored at bucket 1000, and a cache on `channel`.
pub fn fixture(channel: &ScriptedChannel) -> (SharedTimeAxis, SharedCache) {
    let mut time = TimeAxis::new(400.0, HOUR, &TimeAxisConfig::default());
    time.set_period(HOUR, Some(1000 * HOUR));
    (Rc::new(RefCell::new(time)), Rc::new(RefCell::new(channel.cache())))
}
