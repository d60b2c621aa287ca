// File: crates/chart-core/src/lib.rs
// Summary: Core library entry point: series cache, transport adapter, axis model,
//          chart variants and the stack manager, drawing into backend-neutral scenes.

pub mod axis;
pub mod cache;
pub mod chart;
pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod manager;
pub mod record;
pub mod request;
pub mod scene;
pub mod stack;
pub mod theme;
pub mod transport;
pub mod types;

pub use axis::{AxisBinding, AxisGroup, TimeAxis, ValueAxis, ValueType};
pub use cache::{CacheEvent, Redraw, SeriesCache, SeriesStore};
pub use chart::{Bounds, ChartBase, ChartContext, Plottable};
pub use codec::{CodecRegistry, Schema};
pub use config::{CacheConfig, ManagerConfig, TimeAxisConfig, ValueAxisConfig};
pub use error::{CodecError, ConfigError, Error, Result, TransportError};
pub use manager::ChartStackManager;
pub use record::Record;
pub use request::{DataRequest, IndicatorOptions, SeriesKey};
pub use scene::{Color, Primitive, Scene, Surface};
pub use stack::ChartStack;
pub use theme::Theme;
pub use transport::{Channel, Envelope, Inbound, Reply, Topic, TransportAdapter};
pub use types::{Period, Timestamp};
