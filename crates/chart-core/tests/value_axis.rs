// File: crates/chart-core/tests/value_axis.rs
// Purpose: Value axis mapping, degenerate ranges and tick increment selection.

use chart_core::grid::{format_value, increments, select_increment, ticks};
use chart_core::{Primitive, Theme, ValueAxis, ValueAxisConfig, ValueType};

fn axis(height: f64, padding: f64) -> ValueAxis {
    ValueAxis::new(400.0, height, padding, ValueType::PRICE, &ValueAxisConfig::default())
}

#[test]
fn linear_mapping_respects_padding() {
    let mut a = axis(400.0, 20.0);
    a.set_min_max(0.0, 100.0);
    assert!((a.scale() - 3.6).abs() < 1e-12);
    assert_eq!(a.position(0.0), 380.0);
    assert!((a.position(100.0) - 20.0).abs() < 1e-9);
    assert!((a.value_at(a.position(42.0)) - 42.0).abs() < 1e-9);
}

#[test]
fn delta_is_never_above_minus_a_tenth() {
    let mut a = axis(400.0, 20.0);
    a.set_min_max(0.0, 100.0);
    assert!((a.delta(10.0, 20.0) + 36.0).abs() < 1e-9);
    assert!((a.delta(20.0, 10.0) + 36.0).abs() < 1e-9);
    assert_eq!(a.delta(5.0, 5.0), -0.1);
    assert_eq!(a.delta(5.0, 5.0 + 1e-9), -0.1);
}

#[test]
fn no_data_keeps_the_previous_range() {
    let mut a = axis(400.0, 20.0);
    a.set_min_max(f64::INFINITY, f64::NEG_INFINITY);
    assert!(!a.has_range());

    a.set_min_max(10.0, 20.0);
    a.set_min_max(f64::NAN, 30.0);
    assert!(a.has_range());
    assert_eq!((a.min(), a.max()), (10.0, 20.0));
}

#[test]
fn flat_range_gets_a_unit_span() {
    let mut a = axis(400.0, 20.0);
    a.set_min_max(5.0, 5.0);
    assert_eq!((a.min(), a.max()), (5.0, 6.0));
    assert!(a.scale().is_finite() && a.scale() > 0.0);
}

#[test]
fn reversed_bounds_are_swapped() {
    let mut a = axis(400.0, 0.0);
    a.set_min_max(9.0, 3.0);
    assert_eq!((a.min(), a.max()), (3.0, 9.0));
}

#[test]
fn scale_stays_positive_when_padding_exceeds_height() {
    let mut a = axis(30.0, 20.0);
    a.set_min_max(0.0, 10.0);
    assert!(a.scale() > 0.0);
}

#[test]
fn picks_finest_increment_under_the_tick_budget() {
    // 400 px / 20 px allows fewer than 20 ticks: 50 gives exactly 20, so 100.
    let inc = select_increment(0.0, 1000.0, 400.0, 20.0);
    assert_eq!(inc.step, 100.0);
    assert_eq!(inc.precision, 0);

    let mut a = axis(400.0, 20.0);
    a.set_min_max(0.0, 1000.0);
    assert_eq!(a.increment().step, 100.0);
    assert_eq!(a.ticks().len(), 10);
}

#[test]
fn fractional_and_large_spans() {
    let inc = select_increment(0.0, 1.0, 400.0, 20.0);
    assert_eq!((inc.step, inc.precision), (0.1, 1));

    let inc = select_increment(0.0, 2_000_000.0, 400.0, 20.0);
    assert_eq!(inc.step, 200_000.0);

    let inc = select_increment(0.0, 0.001, 400.0, 20.0);
    assert!(inc.step > 0.0 && 0.001 / inc.step < 20.0);
    assert!(inc.precision >= 4);
}

#[test]
fn increment_table_runs_coarse_to_fine() {
    let table = increments(1000.0);
    assert!(table.windows(2).all(|w| w[0].step > w[1].step));
    assert!(table.iter().any(|i| i.step == 25.0));
}

#[test]
fn ticks_start_at_the_first_multiple() {
    assert_eq!(ticks(-15.0, 15.0, 10.0), vec![-10.0, 0.0, 10.0]);
    assert_eq!(ticks(0.0, 300.0, 100.0), vec![0.0, 100.0, 200.0]);
    assert!(ticks(0.0, 1.0, 0.0).is_empty());
}

#[test]
fn labels_use_increment_precision() {
    assert_eq!(format_value(0.25, 2), "0.25");
    assert_eq!(format_value(1234.0, 0), "1234");

    let mut a = axis(400.0, 20.0);
    a.set_min_max(0.0, 1.0);
    assert_eq!(a.format(0.5), "0.5");
}

#[test]
fn draw_emits_a_label_per_visible_tick() {
    let mut a = axis(400.0, 20.0);
    a.draw(&Theme::dark(), 60.0);
    assert!(a.scene().is_empty(), "nothing to draw without a range");

    a.set_min_max(0.0, 1000.0);
    a.draw(&Theme::dark(), 60.0);
    let labels: Vec<String> = a
        .scene()
        .primitives()
        .filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(labels.first().map(String::as_str), Some("0"));
    assert_eq!(labels.len(), 10);
}
