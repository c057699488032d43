//! Drives aggregators the way a host engine drives them over a length
//! window: every arriving event is added, and once the window is full the
//! oldest event is removed first.

use pretty_assertions::assert_eq;
use stats_median::{
    AttributeType, Median, MedianConfig, MedianError, MedianFactory, MissingValuePolicy,
    NumericKind, StoreBackend, Value,
};
use std::collections::VecDeque;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn configs() -> Vec<MedianConfig> {
    vec![
        MedianConfig::default(),
        MedianConfig::default().with_branching_factor(4),
        MedianConfig::default().with_store(StoreBackend::Sorted),
    ]
}

struct LengthWindow {
    length: usize,
    events: VecDeque<Value>,
    median: Median,
}

impl LengthWindow {
    fn new(median: Median, length: usize) -> Self {
        Self {
            length,
            events: VecDeque::new(),
            median,
        }
    }

    fn push(&mut self, value: impl Into<Value>) -> Result<f64, MedianError> {
        if self.events.len() == self.length {
            if let Some(expired) = self.events.pop_front() {
                self.median.remove(expired)?;
            }
        }
        let value = value.into();
        self.events.push_back(value);
        self.median.add(value)
    }
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-9, "output {i}: {a} != {e}");
    }
}

#[test]
fn double_window_of_five() {
    init_logging();

    let input = [
        8.94775, 8.68211, 8.44443, 8.23472, 10.9959, 10.3738, 9.76563, 9.17144, 8.19278, 7.49374,
    ];
    let expected = [
        8.94775, 8.81493, 8.68211, 8.56327, 8.68211, 8.68211, 9.76563, 9.76563, 9.76563, 9.17144,
    ];

    for config in configs() {
        let factory = MedianFactory::new(config);
        let mut window = LengthWindow::new(factory.create(AttributeType::Double).unwrap(), 5);
        let outputs: Vec<f64> = input.iter().map(|v| window.push(*v).unwrap()).collect();
        assert_close(&outputs, &expected);
        assert_eq!(window.median.count(), 5);
    }
}

#[test]
fn int_window_of_three() {
    init_logging();

    for config in configs() {
        let factory = MedianFactory::new(config);
        let mut window = LengthWindow::new(factory.create(AttributeType::Int).unwrap(), 3);
        let outputs: Vec<f64> = [5, 1, 4, 4, 9, 2, 2]
            .into_iter()
            .map(|v: i32| window.push(v).unwrap())
            .collect();
        assert_eq!(outputs, vec![5.0, 3.0, 4.0, 4.0, 4.0, 4.0, 2.0]);
        assert_eq!(
            window.median.values(),
            vec![Value::Int32(2), Value::Int32(2), Value::Int32(9)]
        );
    }
}

#[test]
fn memory_follows_window_not_history() {
    init_logging();

    let mut window = LengthWindow::new(
        MedianFactory::default().create(AttributeType::Long).unwrap(),
        100,
    );

    let mut warmup_peak = 0;
    for ts in 0..20_000i64 {
        window.push(ts).unwrap();
        warmup_peak = warmup_peak.max(window.median.size_bytes());
    }
    for ts in 20_000..200_000i64 {
        let median = window.push(ts).unwrap();
        assert_eq!(median, (ts - 50) as f64 + 0.5);
        assert!(
            window.median.size_bytes() <= 2 * warmup_peak,
            "after {ts}: {} bytes, warm-up peak {warmup_peak}",
            window.median.size_bytes()
        );
    }
    assert_eq!(window.median.len(), 100);
}

#[test]
fn long_values_near_the_limits() {
    let mut median = MedianFactory::default().create_kind(NumericKind::Int64);
    median.add(i64::MAX).unwrap();
    assert_eq!(median.add(i64::MAX).unwrap(), i64::MAX as f64);
    median.reset();
    median.add(i64::MIN).unwrap();
    assert_eq!(median.add(i64::MAX).unwrap(), -0.5);
}

#[test]
fn float_window_grows_and_drains() {
    let mut median = MedianFactory::default().create(AttributeType::Float).unwrap();
    let grow: Vec<f64> = [1.0f32, 2.0, 3.0, 4.0, 5.0]
        .into_iter()
        .map(|v| median.add(v).unwrap())
        .collect();
    assert_eq!(grow, vec![1.0, 1.5, 2.0, 2.5, 3.0]);

    let drain: Vec<f64> = [1.0f32, 2.0, 3.0, 4.0, 5.0]
        .into_iter()
        .map(|v| median.remove(v).unwrap())
        .collect();
    assert_eq!(drain, vec![3.5, 4.0, 4.5, 5.0, 0.0]);
    assert!(median.is_quiescent());
}

#[test]
fn aggregators_are_independent() {
    let factory = MedianFactory::default();
    let mut ints = factory.create(AttributeType::Int).unwrap();
    let mut doubles = factory.create(AttributeType::Double).unwrap();

    ints.add(10i32).unwrap();
    doubles.add(0.25f64).unwrap();
    ints.add(20i32).unwrap();

    assert_eq!(ints.median(), 15.0);
    assert_eq!(doubles.median(), 0.25);
    assert_eq!(doubles.count(), 1);
}

#[test]
fn checkpoint_between_windows() {
    init_logging();

    let factory = MedianFactory::default();
    let mut median = factory.create(AttributeType::Long).unwrap();
    for v in [7i64, 3, 5] {
        median.add(v).unwrap();
    }

    let state = median.snapshot().to_state_map();
    let bytes = median.snapshot().to_bytes();

    let mut from_state = factory.create(AttributeType::Long).unwrap();
    from_state.restore_state_map(&state).unwrap();
    assert_eq!(from_state.snapshot(), median.snapshot());

    let mut from_bytes = factory.create(AttributeType::Long).unwrap();
    from_bytes.restore(&stats_median::Checkpoint::from_bytes(&bytes).unwrap());
    assert_eq!(from_bytes.count(), 3);
    assert_eq!(from_bytes.median(), 5.0);
}

#[test]
fn config_from_json() {
    let config =
        MedianConfig::from_json(r#"{"store": "sorted", "missing_value": "ignore"}"#).unwrap();
    assert_eq!(config.store, StoreBackend::Sorted);
    assert_eq!(config.missing_value, MissingValuePolicy::Ignore);

    let mut median = MedianFactory::new(config).create_kind(NumericKind::Int32);
    median.add(1i32).unwrap();
    assert_eq!(median.remove(2i32), Ok(1.0));

    let err = MedianConfig::from_json(r#"{"stor": "tree"}"#).unwrap_err();
    assert_eq!(err.error_code(), "InvalidConfig");
}
