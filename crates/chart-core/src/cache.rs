// File: crates/chart-core/src/cache.rs
// Summary: Windowed series cache: coverage checks, fetch-window expansion, merge-on-response,
//          tail refresh and extrema scans over timestamp-keyed stores.
// Notes:
// - `get_data` never blocks; it returns the current view and queues a fetch on a miss.
//   Replies are applied by `pump`, which fires the redraw callback given with the request.
// - Store bounds record what has been *asked for*, not what came back, and only grow.
// - Fetches for one key are not coalesced: overlapping in-flight requests are allowed,
//   merges are idempotent per timestamp.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::config::CacheConfig;
use crate::error::{Result, TransportError};
use crate::record::Record;
use crate::request::{DataRequest, SeriesKey};
use crate::transport::{Inbound, MessageId, TransportAdapter};
use crate::types::{Period, Timestamp, UNFETCHED_MAX, UNFETCHED_MIN};

/// Callback fired after a fetch for the requesting chart has been merged.
pub type Redraw = Rc<dyn Fn()>;

/// A requested range whose fetch failed and may be asked for again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gap {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Failed attempts so far.
    pub attempts: u32,
}

impl Gap {
    fn intersects(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start <= end && start <= self.end
    }
}

/// Records of one series keyed by bucket timestamp, plus the requested bounds.
#[derive(Clone, Debug)]
pub struct SeriesStore {
    records: BTreeMap<Timestamp, Record>,
    min: Timestamp,
    max: Timestamp,
    gaps: Vec<Gap>,
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self { records: BTreeMap::new(), min: UNFETCHED_MIN, max: UNFETCHED_MAX, gaps: Vec::new() }
    }
}

impl SeriesStore {
    pub fn new() -> Self { Self::default() }

    /// Lower requested bound; `Timestamp::MAX` until the first fetch.
    pub fn min(&self) -> Timestamp { self.min }
    /// Upper requested bound; `Timestamp::MIN` until the first fetch.
    pub fn max(&self) -> Timestamp { self.max }

    pub fn is_fetched(&self) -> bool { self.min <= self.max }

    /// Whether `[start, end]` lies inside the requested bounds.
    pub fn covers(&self, start: Timestamp, end: Timestamp) -> bool {
        start >= self.min && end <= self.max
    }

    pub fn get(&self, timestamp: Timestamp) -> Option<&Record> { self.records.get(&timestamp) }

    pub fn records(&self) -> &BTreeMap<Timestamp, Record> { &self.records }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn gaps(&self) -> &[Gap] { &self.gaps }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.records.keys().next_back().copied()
    }

    /// Present records on the `period` grid anchored at `start`, in `[start, end]`.
    pub fn window(
        &self,
        start: Timestamp,
        end: Timestamp,
        period: Period,
    ) -> impl Iterator<Item = &Record> + '_ {
        let period = period.max(1);
        let range = if start <= end {
            self.records.range(start..=end)
        } else {
            self.records.range(start..start)
        };
        range
            .filter(move |(t, _)| (**t - start).rem_euclid(period) == 0)
            .map(|(_, r)| r)
    }

    /// Overwrite records by timestamp and widen the bounds to cover them.
    /// Returns the number of records applied.
    pub fn merge(&mut self, records: Vec<Record>) -> usize {
        let n = records.len();
        for rec in records {
            self.min = self.min.min(rec.timestamp);
            self.max = self.max.max(rec.timestamp);
            self.records.insert(rec.timestamp, rec);
        }
        n
    }

    fn widen(&mut self, start: Timestamp, end: Timestamp) {
        self.min = self.min.min(start);
        self.max = self.max.max(end);
    }

    fn take_gaps_within(&mut self, start: Timestamp, end: Timestamp) -> Vec<Gap> {
        let (hit, keep): (Vec<Gap>, Vec<Gap>) =
            self.gaps.drain(..).partition(|g| g.intersects(start, end));
        self.gaps = keep;
        hit
    }
}

/// What `pump` applied.
#[derive(Clone, Debug, PartialEq)]
pub enum CacheEvent {
    Merged { key: SeriesKey, records: usize },
    FetchFailed { key: SeriesKey, error: TransportError },
    TickAck,
    MaxTime(Timestamp),
    /// A `tick` or `maxTime` message failed.
    ControlFailed(TransportError),
}

struct InFlight {
    key: SeriesKey,
    start: Timestamp,
    end: Timestamp,
    attempts: u32,
    notify: Option<Redraw>,
}

pub struct SeriesCache {
    transport: TransportAdapter,
    stores: HashMap<SeriesKey, SeriesStore>,
    in_flight: HashMap<MessageId, InFlight>,
    config: CacheConfig,
    fetches_issued: u64,
}

impl SeriesCache {
    pub fn new(transport: TransportAdapter, config: CacheConfig) -> Self {
        Self {
            transport,
            stores: HashMap::new(),
            in_flight: HashMap::new(),
            config,
            fetches_issued: 0,
        }
    }

    pub fn transport(&self) -> &TransportAdapter { &self.transport }

    pub fn store(&self, key: &SeriesKey) -> Option<&SeriesStore> { self.stores.get(key) }

    /// Data fetches sent over the lifetime of the cache.
    pub fn fetches_issued(&self) -> u64 { self.fetches_issued }

    /// Data fetches sent and not yet answered.
    pub fn in_flight(&self) -> usize { self.in_flight.len() }

    /// Current view of the request's series. On a coverage miss a single fetch for an
    /// expanded window is queued; `notify` fires once its reply has been merged.
    pub fn get_data(&mut self, request: &DataRequest, notify: Option<Redraw>) -> &SeriesStore {
        let key = request.key();
        let period = request.period.max(1);
        let buffer = (request.periods() / 2) * period;
        let mut start = request.start_time - buffer;
        let mut end = request.end_time + buffer;

        let mut fetches: Vec<(Timestamp, Timestamp, u32)> = Vec::new();
        {
            let store = self.stores.entry(key.clone()).or_default();

            for gap in store.take_gaps_within(start, end) {
                log::debug!("retrying {} [{}, {}] after {} failure(s)", key, gap.start, gap.end, gap.attempts);
                fetches.push((gap.start, gap.end, gap.attempts));
            }

            if store.covers(start, end) {
                log::trace!("cache hit {} [{}, {}]", key, start, end);
            } else {
                if start < store.min {
                    start -= buffer;
                } else {
                    start = store.max + period;
                }
                if end > store.max {
                    end += buffer;
                } else {
                    end = store.min - period;
                }
                store.widen(start, end);
                fetches.push((start, end, 0));
            }
        }

        for (from, to, attempts) in fetches {
            self.issue(&key, request, from, to, attempts, notify.clone());
        }

        self.stores.entry(key).or_default()
    }

    /// Re-fetch from one period before the newest cached bucket through the store's upper
    /// bound, ignoring coverage. Picks up amendments to the latest bucket and new buckets.
    pub fn refresh_last_tick(&mut self, request: &DataRequest, notify: Option<Redraw>) {
        let key = request.key();
        let (from, to) = match self.stores.get(&key) {
            Some(store) if store.is_fetched() => {
                // An empty store still only asks for its newest bucket.
                let from = store.last_timestamp().unwrap_or(store.max) - request.period;
                (from, store.max)
            }
            _ => {
                self.get_data(request, notify);
                return;
            }
        };
        self.issue(&key, request, from, to, 0, notify);
    }

    fn issue(
        &mut self,
        key: &SeriesKey,
        request: &DataRequest,
        start: Timestamp,
        end: Timestamp,
        attempts: u32,
        notify: Option<Redraw>,
    ) {
        match self.transport.request_tail(request, start, end) {
            Ok(id) => {
                self.fetches_issued += 1;
                log::debug!("fetch #{id} {key} [{start}, {end}]");
                self.in_flight.insert(id, InFlight { key: key.clone(), start, end, attempts, notify });
            }
            Err(error) => {
                log::warn!("fetch {key} [{start}, {end}] not sent: {error}");
                self.record_failure(key.clone(), start, end, attempts);
            }
        }
    }

    fn record_failure(&mut self, key: SeriesKey, start: Timestamp, end: Timestamp, attempts: u32) {
        let attempts = attempts + 1;
        if attempts > self.config.max_retries {
            log::warn!("giving up on {key} [{start}, {end}] after {attempts} attempt(s)");
            return;
        }
        self.stores.entry(key).or_default().gaps.push(Gap { start, end, attempts });
    }

    /// Merge records into a series directly, as a fetch reply would.
    pub fn merge(&mut self, key: &SeriesKey, records: Vec<Record>) -> usize {
        self.stores.entry(key.clone()).or_default().merge(records)
    }

    pub fn request_tick(&mut self, steps: u32) -> Result<MessageId, TransportError> {
        self.transport.request_tick(steps)
    }

    pub fn request_max_time(&mut self) -> Result<MessageId, TransportError> {
        self.transport.request_max_time()
    }

    /// Apply every reply the channel has ready. Series replies are merged and their
    /// redraw callbacks fired. A malformed payload aborts with `Err`.
    pub fn pump(&mut self) -> Result<Vec<CacheEvent>> {
        let mut events = Vec::new();
        while let Some((id, inbound)) = self.transport.poll() {
            let flight = self.in_flight.remove(&id);
            match inbound? {
                Inbound::Series(records) => {
                    let Some(flight) = flight else {
                        log::warn!("series reply {id} has no pending fetch");
                        continue;
                    };
                    let n = self.merge(&flight.key, records);
                    log::debug!("merged {n} record(s) into {}", flight.key);
                    if let Some(notify) = &flight.notify {
                        notify();
                    }
                    events.push(CacheEvent::Merged { key: flight.key, records: n });
                }
                Inbound::Failed(error) => match flight {
                    Some(flight) => {
                        log::warn!("fetch {} [{}, {}] failed: {error}", flight.key, flight.start, flight.end);
                        self.record_failure(flight.key.clone(), flight.start, flight.end, flight.attempts);
                        events.push(CacheEvent::FetchFailed { key: flight.key, error });
                    }
                    None => {
                        log::warn!("control message {id} failed: {error}");
                        events.push(CacheEvent::ControlFailed(error));
                    }
                },
                Inbound::TickAck => events.push(CacheEvent::TickAck),
                Inbound::MaxTime(ts) => events.push(CacheEvent::MaxTime(ts)),
            }
        }
        Ok(events)
    }

    /// Smallest value of `fields` over the request window; `+inf` when nothing is cached.
    pub fn get_min<S: AsRef<str>>(&self, request: &DataRequest, fields: &[S]) -> f64 {
        self.extremum(request, fields, f64::INFINITY, f64::min)
    }

    /// Largest value of `fields` over the request window; `-inf` when nothing is cached.
    pub fn get_max<S: AsRef<str>>(&self, request: &DataRequest, fields: &[S]) -> f64 {
        self.extremum(request, fields, f64::NEG_INFINITY, f64::max)
    }

    fn extremum<S: AsRef<str>>(
        &self,
        request: &DataRequest,
        fields: &[S],
        init: f64,
        pick: fn(f64, f64) -> f64,
    ) -> f64 {
        let Some(store) = self.stores.get(&request.key()) else { return init };
        store
            .window(request.start_time, request.end_time, request.period)
            .flat_map(|rec| fields.iter().filter_map(move |f| rec.get(f.as_ref())))
            .filter(|v| v.is_finite())
            .fold(init, pick)
    }
}
