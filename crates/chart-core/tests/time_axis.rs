// File: crates/chart-core/tests/time_axis.rs
// Purpose: Time axis window, bucket geometry, pan/zoom and label formatting.

use chart_core::axis::time::format_time;
use chart_core::{TimeAxis, TimeAxisConfig};

const HOUR: i64 = 3600;

/// 400 px at 4 px per bar: 100 bars, 15 of them under the 60 px gutter.
fn axis() -> TimeAxis {
    let mut t = TimeAxis::new(400.0, HOUR, &TimeAxisConfig::default());
    t.set_period(HOUR, Some(1000 * HOUR));
    t
}

fn assert_window(t: &TimeAxis) {
    assert_eq!(t.max(), t.min() + t.bars() * t.period());
    assert_eq!(t.min().rem_euclid(t.period()), 0);
}

#[test]
fn anchored_window_keeps_last_bar_clear_of_gutter() {
    let t = axis();
    assert_eq!(t.bars(), 100);
    assert_eq!(t.anchor(), Some(1000 * HOUR));
    assert_eq!(t.min(), 915 * HOUR);
    assert_eq!(t.max(), 1015 * HOUR);
    assert_window(&t);
}

#[test]
fn first_anchor_wins() {
    let mut t = axis();
    t.set_period(60, Some(5 * HOUR));
    assert_eq!(t.anchor(), Some(1000 * HOUR));
    assert_eq!(t.min(), 1000 * HOUR - 85 * 60);
    assert_window(&t);
}

#[test]
fn unanchored_window_is_on_the_period_grid() {
    let t = TimeAxis::new(400.0, 300, &TimeAxisConfig::default());
    assert_eq!(t.anchor(), None);
    assert_window(&t);
}

#[test]
fn pan_moves_by_a_fraction_of_visible_bars() {
    let mut t = axis();
    let min = t.min();
    t.scroll(100.0, 0.0);
    assert_eq!(t.min(), min + 10 * HOUR);
    assert_window(&t);

    t.scroll(-100.0, 20.0);
    assert_eq!(t.min(), min);
}

#[test]
fn pan_is_never_zero_and_at_most_half_the_window() {
    let mut t = axis();
    let min = t.min();
    t.scroll(1.0, 0.0);
    assert_eq!(t.min(), min + HOUR);

    t.scroll(-1_000_000.0, 0.0);
    assert_eq!(t.min(), min + HOUR - 50 * HOUR);
    assert_window(&t);
}

#[test]
fn zoom_in_recenters_on_the_midpoint() {
    let mut t = axis();
    let mid = t.periodize(t.min() + (t.max() - t.min()) / 2);
    t.scroll(0.0, 1000.0);

    assert_eq!(t.bar_size(), 6.0);
    assert_eq!(t.delta(), 7.0);
    assert_eq!(t.bars(), 57);
    assert_eq!(t.min(), mid - 29 * HOUR);
    assert_window(&t);
}

#[test]
fn zoom_out_floors_bar_size_at_one_pixel() {
    let mut t = axis();
    t.scroll(0.0, -5000.0);
    assert_eq!(t.bar_size(), 1.0);
    assert_eq!(t.bars(), 200);
    assert_window(&t);
}

#[test]
fn bucket_positions() {
    let t = axis();
    let at = t.min() + 2 * HOUR;
    assert_eq!(t.period_offset(at), 2.0);
    assert_eq!(t.min_position(at), 8.0);
    assert_eq!(t.max_position(at), 11.0);
    assert_eq!(t.position(at), 9.0);
    assert_eq!(t.time_at(9.0), at);
    assert_eq!(t.time_at(t.position(t.max())), t.max());
}

#[test]
fn resize_keeps_the_window_start() {
    let mut t = axis();
    let min = t.min();
    t.resize(800.0, 20.0);
    assert_eq!(t.min(), min);
    assert_eq!(t.bars(), 200);
    assert_eq!(t.timestamps().count(), 201);
    assert_window(&t);
}

#[test]
fn label_strip_has_a_label_per_hundred_pixels() {
    use chart_core::{Primitive, Theme};
    let mut t = axis();
    t.draw(&Theme::dark(), 11.0);
    let labels = t.scene().primitives().filter(|p| matches!(p, Primitive::Text { .. })).count();
    // Every 25th bucket over 101 buckets.
    assert!((4..=5).contains(&labels), "{labels} labels");
}

#[test]
fn labels_drop_clock_time_for_daily_buckets() {
    assert_eq!(format_time(HOUR, HOUR), "01-01 01:00");
    assert_eq!(format_time(86_400 * 31, 86_400), "1970-02-01");
}
