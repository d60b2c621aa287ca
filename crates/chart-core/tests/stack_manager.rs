// File: crates/chart-core/tests/stack_manager.rs
// Purpose: Axis sharing inside a stack, and manager layout, event fan-out and pump cycle.

mod common;

use std::rc::Rc;

use chart_core::chart::presets::{self, RsiChart};
use chart_core::chart::OhlcChart;
use chart_core::geometry::Rect;
use chart_core::transport::Topic;
use chart_core::{
    CacheEvent, ChartStack, ChartStackManager, ManagerConfig, Primitive, Record, Theme, ValueAxisConfig,
    ValueType,
};
use common::{candles, fixture, ScriptedChannel, HOUR};

fn price_stack(channel: &ScriptedChannel) -> ChartStack {
    let (time, cache) = fixture(channel);
    let mut stack = ChartStack::new(
        "price",
        time,
        cache,
        Rect::from_ltwh(0.0, 0.0, 400.0, 300.0),
        Theme::dark(),
        &ValueAxisConfig::default(),
        60.0,
    );
    stack.add_chart(Box::new(OhlcChart::new("ohlc", "X")));
    stack.add_chart(Box::new(presets::ma("ma", "X")));
    stack.add_chart(Box::new(presets::volume("volume", "X")));
    stack
}

fn manager(channel: &ScriptedChannel) -> ChartStackManager {
    let mut m = ChartStackManager::new(channel.adapter(), 800.0, 600.0, ManagerConfig::default());
    m.add_chart("price", Box::new(OhlcChart::new("ohlc", "X")));
    m.add_chart("price", Box::new(presets::volume("volume", "X")));
    m.add_chart("rsi", Box::new(RsiChart::new("rsi", "X")));
    m
}

/// Candles for OHLCV requests, a flat 50 for anything else.
fn serve(req: &chart_core::DataRequest) -> Vec<Record> {
    if req.indicator == "OHLCV" {
        candles(req)
    } else {
        (req.start_time..=req.end_time)
            .step_by(req.period as usize)
            .map(|t| Record::new(t).with("value", 50.0))
            .collect()
    }
}

#[test]
fn same_type_shares_the_panel_axis() {
    let ch = ScriptedChannel::new();
    let stack = price_stack(&ch);
    assert_eq!(stack.primary_value_type(), Some(&ValueType::PRICE));

    let ma = stack.charts()[1].base().binding().expect("bound");
    assert!(!ma.is_independent());
    assert!(Rc::ptr_eq(&ma.axis, stack.value_axis()));

    let vol = stack.charts()[2].base().binding().expect("bound");
    assert!(vol.is_independent());
    assert!(!Rc::ptr_eq(&vol.axis, stack.value_axis()));
    assert_eq!(vol.axis.borrow().parent_value_type(), &ValueType::PRICE);
    assert_eq!(vol.axis.borrow().padding(), 0.0);
    assert_eq!(stack.value_axis().borrow().padding(), 20.0);
}

#[test]
fn other_types_never_distort_the_shared_scale() {
    let ch = ScriptedChannel::new();
    let mut stack = price_stack(&ch);
    let req = stack.charts()[0].request().expect("attached");
    let cache = stack.charts()[0].base().context().expect("attached").cache.clone();
    cache.borrow_mut().merge(
        &req.key(),
        vec![
            Record::try_ohlcv(req.start_time, 100.0, 110.0, 90.0, 105.0, 5000.0).expect("candle"),
            Record::try_ohlcv(req.start_time + HOUR, 105.0, 108.0, 95.0, 96.0, 2500.0).expect("candle"),
        ],
    );

    assert_eq!((stack.low(), stack.high()), (90.0, 110.0));
    stack.draw();

    let shared = stack.value_axis().borrow();
    assert_eq!((shared.min(), shared.max()), (90.0, 110.0));
    let vol = stack.charts()[2].base().binding().expect("bound").axis.clone();
    assert_eq!((vol.borrow().min(), vol.borrow().max()), (0.0, 50_000.0));
}

#[test]
fn redraw_callback_marks_the_panel_dirty() {
    let ch = ScriptedChannel::new();
    let mut stack = price_stack(&ch);
    assert!(stack.is_dirty());
    stack.draw();
    assert!(!stack.is_dirty());
    (stack.redraw_handle())();
    assert!(stack.is_dirty());
}

#[test]
fn panels_divide_the_plot_height() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    assert_eq!(m.stacks().len(), 2);
    let heights: Vec<f64> = m.stacks().iter().map(|s| s.height()).collect();
    assert_eq!(heights, vec![290.0, 290.0]);
    assert_eq!(m.stack("rsi").map(|s| s.top()), Some(290.0));

    m.set_stack_size_ratios([("price", 3.0), ("rsi", 1.0), ("missing", 9.0)]);
    assert_eq!(m.stack("price").map(|s| s.height()), Some(435.0));
    assert_eq!(m.stack("rsi").map(|s| (s.top(), s.height())), Some((435.0, 145.0)));
}

#[test]
fn divider_drag_respects_minimum_height() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    m.set_stack_size_ratios([("price", 3.0), ("rsi", 1.0)]);

    m.drag_divider(0, 1000.0);
    assert_eq!(m.stack("price").map(|s| s.height()), Some(540.0));
    assert_eq!(m.stack("rsi").map(|s| s.height()), Some(40.0));

    m.drag_divider(0, -10_000.0);
    assert_eq!(m.stack("price").map(|s| s.height()), Some(40.0));
    assert_eq!(m.stack("rsi").map(|s| s.height()), Some(540.0));

    // No panel below the last one.
    m.drag_divider(1, 50.0);
    assert_eq!(m.stack("rsi").map(|s| s.height()), Some(540.0));
}

#[test]
fn pump_merges_replies_and_redraws_dirty_panels() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    m.draw();
    let fetches = ch.data_requests().len();
    assert!(fetches >= 2);

    assert_eq!(ch.serve_pending(serve), fetches);
    let events = m.pump().expect("pump");
    assert_eq!(events.iter().filter(|e| matches!(e, CacheEvent::Merged { .. })).count(), fetches);
    assert!(m.stacks().iter().all(|s| !s.is_dirty()));

    let price = m.stack("price").expect("price stack");
    assert!(price.low().is_finite() && price.high().is_finite());
    assert!(!price.charts()[0].base().scene().is_empty());

    // Same window again: everything is cached.
    m.draw();
    assert_eq!(ch.data_requests().len(), fetches);
}

#[test]
fn tick_ack_tail_refreshes_every_chart() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    m.draw();
    ch.serve_pending(serve);
    m.pump().expect("pump");
    let before = ch.data_requests().len();

    let id = m.tick(2).expect("tick sent");
    assert_eq!(ch.sent_count(Topic::Tick), 1);
    ch.reply(id, "ok");
    let events = m.pump().expect("pump");
    assert_eq!(events, vec![CacheEvent::TickAck]);
    assert_eq!(ch.data_requests().len(), before + 3);
}

#[test]
fn max_time_anchors_the_time_axis() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    let anchor = 500_000 * HOUR;
    let id = m.request_max_time().expect("sent");
    ch.reply(id, format!(r#"{{"timestamp": {}}}"#, anchor + 100));
    m.pump().expect("pump");

    let time = m.time_axis().borrow();
    assert_eq!(time.anchor(), Some(anchor));
    // 800 px at 4 px per bar, 15 bars under the gutter.
    assert_eq!(time.bars(), 200);
    assert_eq!(time.min(), anchor - 185 * HOUR);
}

#[test]
fn scroll_and_period_fan_out_to_the_shared_axis() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    let min = m.time_axis().borrow().min();
    m.scroll(100.0, 0.0);
    assert_eq!(m.time_axis().borrow().min(), min + 20 * HOUR);

    m.set_period(60);
    assert_eq!(m.period(), 60);
    for stack in m.stacks() {
        assert_eq!(stack.requests().first().map(|r| r.period), Some(60));
    }
}

#[test]
fn crosshair_spans_panels_but_labels_only_the_hovered_one() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    m.draw();
    m.draw_crosshair(100.0, 300.0);

    let texts = |name: &str| {
        m.stack(name)
            .map(|s| s.crosshair().primitives().filter(|p| matches!(p, Primitive::Text { .. })).count())
    };
    assert_eq!(texts("price"), Some(0));
    assert_eq!(texts("rsi"), Some(2));
    assert!(m.stack("price").is_some_and(|s| !s.crosshair().is_empty()));

    m.clear_crosshair();
    assert!(m.stacks().iter().all(|s| s.crosshair().is_empty()));
}

#[test]
fn resize_and_theme_reach_every_panel() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    m.resize(1000.0, 420.0);
    assert_eq!(m.time_axis().borrow().width(), 1000.0);
    assert_eq!(m.stack("price").map(|s| s.bounds().width()), Some(1000.0));
    assert_eq!(m.stack("rsi").map(|s| s.height()), Some(200.0));

    m.set_theme("light");
    assert_eq!(m.theme().name, "light");
    m.set_theme("no-such-theme");
    assert_eq!(m.theme().name, "dark");
}

#[test]
fn layers_stack_panels_above_the_time_strip() {
    let ch = ScriptedChannel::new();
    let mut m = manager(&ch);
    m.draw();
    let layers = m.layers();
    assert_eq!(layers.last().map(|(y, _)| *y), Some(580.0));
    assert!(layers.iter().any(|(y, _)| *y == 290.0));
}

#[test]
fn config_file_only_lists_overrides() {
    let cfg = ManagerConfig::from_json(r#"{"initial_period": 60, "time_axis": {"bar_size": 5}}"#).expect("parses");
    assert_eq!(cfg.initial_period, 60);
    assert_eq!(cfg.time_axis.bar_size, 5.0);
    assert_eq!(cfg.time_axis.bar_spacing, 1.0);
    assert_eq!(cfg.cache.max_retries, 2);
    assert!(ManagerConfig::from_json("{ nope").is_err());
}
