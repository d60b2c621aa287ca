// File: crates/chart-core/src/transport.rs
// Summary: Transport adapter over the external request/response message channel.
// Notes:
// - The channel is duplex and non-blocking: `send` queues, replies surface later via `poll`.
// - The adapter owns message ids and remembers which topic (and indicator) each id was for,
//   so replies can be decoded with the right schema.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::codec::CodecRegistry;
use crate::error::{CodecError, TransportError};
use crate::record::Record;
use crate::request::DataRequest;
use crate::types::Timestamp;

pub type MessageId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// DataRequest -> encoded series blob.
    Data,
    /// Advance the service's simulated clock by N steps -> ack.
    Tick,
    /// Latest available timestamp.
    MaxTime,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Data => "data",
            Topic::Tick => "tick",
            Topic::MaxTime => "maxTime",
        }
    }
}

/// Outbound message.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub id: MessageId,
    pub topic: Topic,
    pub body: String,
}

/// Inbound reply correlated to an [`Envelope`] by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub id: MessageId,
    pub body: Result<String, TransportError>,
}

/// The external message channel to the series service.
pub trait Channel {
    fn send(&mut self, envelope: Envelope) -> Result<(), TransportError>;
    fn poll(&mut self) -> Option<Reply>;
}

/// A decoded reply.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    Series(Vec<Record>),
    TickAck,
    MaxTime(Timestamp),
    Failed(TransportError),
}

#[derive(Clone, Debug)]
enum Pending {
    Data { indicator: String },
    Tick,
    MaxTime,
}

pub struct TransportAdapter {
    channel: Box<dyn Channel>,
    codecs: CodecRegistry,
    next_id: MessageId,
    pending: HashMap<MessageId, Pending>,
}

impl TransportAdapter {
    pub fn new(channel: impl Channel + 'static, codecs: CodecRegistry) -> Self {
        Self { channel: Box::new(channel), codecs, next_id: 1, pending: HashMap::new() }
    }

    pub fn codecs(&self) -> &CodecRegistry { &self.codecs }

    /// Messages sent and not yet answered.
    pub fn in_flight(&self) -> usize { self.pending.len() }

    pub fn request_data(&mut self, request: &DataRequest) -> Result<MessageId, TransportError> {
        let body = serde_json::to_string(request).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.send(Topic::Data, body, Pending::Data { indicator: request.indicator.clone() })
    }

    /// Fetch `[from, to]` of the request's series regardless of what is cached.
    pub fn request_tail(
        &mut self,
        request: &DataRequest,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<MessageId, TransportError> {
        self.request_data(&request.with_range(from, to.max(from)))
    }

    pub fn request_tick(&mut self, steps: u32) -> Result<MessageId, TransportError> {
        self.send(Topic::Tick, json!({ "steps": steps }).to_string(), Pending::Tick)
    }

    pub fn request_max_time(&mut self) -> Result<MessageId, TransportError> {
        self.send(Topic::MaxTime, json!({}).to_string(), Pending::MaxTime)
    }

    fn send(&mut self, topic: Topic, body: String, pending: Pending) -> Result<MessageId, TransportError> {
        let id = self.next_id;
        self.next_id += 1;
        self.channel.send(Envelope { id, topic, body })?;
        self.pending.insert(id, pending);
        Ok(id)
    }

    /// Next decoded reply, if any. A malformed series payload is returned as `Err`.
    pub fn poll(&mut self) -> Option<(MessageId, Result<Inbound, CodecError>)> {
        loop {
            let reply = self.channel.poll()?;
            let Some(pending) = self.pending.remove(&reply.id) else {
                log::warn!("dropping reply to unknown message {}", reply.id);
                continue;
            };
            let body = match reply.body {
                Ok(body) => body,
                Err(e) => return Some((reply.id, Ok(Inbound::Failed(e)))),
            };
            let inbound = match pending {
                Pending::Data { indicator } => {
                    self.codecs.decode(&indicator, &body).map(Inbound::Series)
                }
                Pending::Tick => Ok(Inbound::TickAck),
                Pending::MaxTime => Ok(parse_max_time(&body)),
            };
            return Some((reply.id, inbound));
        }
    }
}

/// Accepts `{"timestamp": n}` or a bare number.
fn parse_max_time(body: &str) -> Inbound {
    let parsed: Option<Timestamp> = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("timestamp").and_then(Value::as_i64).or_else(|| v.as_i64())
    });
    match parsed {
        Some(ts) => Inbound::MaxTime(ts),
        None => Inbound::Failed(TransportError::UnexpectedReply {
            topic: Topic::MaxTime.as_str(),
            detail: body.chars().take(64).collect(),
        }),
    }
}
