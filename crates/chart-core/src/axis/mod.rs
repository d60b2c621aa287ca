// File: crates/chart-core/src/axis/mod.rs
// Summary: Axis model. One shared TimeAxis per manager; ValueAxis instances per value-type group.

pub mod time;
pub mod value;

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use time::TimeAxis;
pub use value::ValueAxis;

pub type SharedTimeAxis = Rc<RefCell<TimeAxis>>;
pub type SharedValueAxis = Rc<RefCell<ValueAxis>>;

/// Value-domain tag. Charts with equal tags can share one vertical scale.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueType(Cow<'static, str>);

impl ValueType {
    pub const PRICE: ValueType = ValueType(Cow::Borrowed("price"));
    pub const VOLUME: ValueType = ValueType(Cow::Borrowed("volume"));
    pub const RSI: ValueType = ValueType(Cow::Borrowed("RSI"));
    pub const MACD: ValueType = ValueType(Cow::Borrowed("MACD"));

    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self { Self(tag.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for ValueType {
    fn default() -> Self { Self::PRICE }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// How a chart relates to the value axis it was handed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisGroup {
    /// Part of the stack's primary group; the stack sets the range.
    Shared,
    /// Own axis; the chart rescales it from its own low/high on every draw.
    Independent,
}

/// A value axis handle plus the group decision made when the chart was added.
#[derive(Clone)]
pub struct AxisBinding {
    pub axis: SharedValueAxis,
    pub group: AxisGroup,
}

impl AxisBinding {
    pub fn shared(axis: SharedValueAxis) -> Self { Self { axis, group: AxisGroup::Shared } }
    pub fn independent(axis: SharedValueAxis) -> Self { Self { axis, group: AxisGroup::Independent } }
    pub fn is_independent(&self) -> bool { self.group == AxisGroup::Independent }
}
