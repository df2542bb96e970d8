//! Process-wide collection of named, typed measurement series.
//!
//! Each series owns a `DashMap` from label-value tuple to an atomic cell, so
//! concurrent increments from request tasks and the uptime ticker never lose
//! updates and never hold a lock across an await point. Floating point sums are
//! kept as `f64` bits in an `AtomicU64` and updated with a CAS loop.

use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::{MeterError, Result};

/// Default Prometheus histogram buckets (seconds).
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Kind of a declared series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
    Summary,
}

impl MetricKind {
    /// Name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to a declared series.
///
/// Stamped with the owning registry so a handle from one registry cannot
/// silently update another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesHandle {
    registry: u64,
    index: usize,
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn add_f64(cell: &AtomicU64, v: f64) {
    let mut cur = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(cur) + v).to_bits();
        match cell.compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => cur = actual,
        }
    }
}

fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Relaxed))
}

struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; DEFAULT_BUCKETS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl AtomicHistogram {
    fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        add_f64(&self.sum, v);

        // Cumulative buckets: every bucket whose bound covers the value.
        for (i, &le) in DEFAULT_BUCKETS.iter().enumerate() {
            if v <= le {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Summary without quantile objectives: `_sum` and `_count` only.
struct AtomicSummary {
    count: AtomicU64,
    sum: AtomicU64,
}

impl Default for AtomicSummary {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
        }
    }
}

impl AtomicSummary {
    fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        add_f64(&self.sum, v);
    }
}

enum Cells {
    Counter(DashMap<Vec<String>, AtomicU64>),
    Histogram(DashMap<Vec<String>, AtomicHistogram>),
    Summary(DashMap<Vec<String>, AtomicSummary>),
}

impl Cells {
    fn new(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Counter => Cells::Counter(DashMap::new()),
            MetricKind::Histogram => Cells::Histogram(DashMap::new()),
            MetricKind::Summary => Cells::Summary(DashMap::new()),
        }
    }
}

struct Series {
    name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
    cells: Cells,
}

impl Series {
    fn key(&self, label_values: &[&str]) -> Result<Vec<String>> {
        if label_values.len() != self.label_names.len() {
            return Err(MeterError::LabelArity {
                name: self.name.clone(),
                expected: self.label_names.len(),
                got: label_values.len(),
            });
        }
        Ok(label_values.iter().map(|v| v.to_string()).collect())
    }

    fn label_str(&self, values: &[String]) -> String {
        self.label_names
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn render(&self, out: &mut String) {
        let name = &self.name;
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", name, self.kind);

        match &self.cells {
            Cells::Counter(map) => {
                let mut rows: Vec<(Vec<String>, u64)> = map
                    .iter()
                    .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
                    .collect();
                rows.sort_by(|a, b| a.0.cmp(&b.0));
                for (key, val) in rows {
                    let _ = writeln!(out, "{}{} {}", name, braced(&self.label_str(&key)), val);
                }
            }
            Cells::Histogram(map) => {
                let mut keys: Vec<Vec<String>> = map.iter().map(|r| r.key().clone()).collect();
                keys.sort();
                for key in keys {
                    let Some(hist) = map.get(&key) else { continue };
                    let label_str = self.label_str(&key);
                    let prefix = if label_str.is_empty() {
                        String::new()
                    } else {
                        format!("{},", label_str)
                    };

                    for (i, le) in DEFAULT_BUCKETS.iter().enumerate() {
                        let count = hist.buckets[i].load(Ordering::Relaxed);
                        let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
                    }
                    let count = hist.count.load(Ordering::Relaxed);
                    let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
                    let _ = writeln!(out, "{}_sum{} {}", name, braced(&label_str), load_f64(&hist.sum));
                    let _ = writeln!(out, "{}_count{} {}", name, braced(&label_str), count);
                }
            }
            Cells::Summary(map) => {
                let mut rows: Vec<(Vec<String>, f64, u64)> = map
                    .iter()
                    .map(|r| {
                        let s = r.value();
                        (r.key().clone(), load_f64(&s.sum), s.count.load(Ordering::Relaxed))
                    })
                    .collect();
                rows.sort_by(|a, b| a.0.cmp(&b.0));
                for (key, sum, count) in rows {
                    let label_str = self.label_str(&key);
                    let _ = writeln!(out, "{}_sum{} {}", name, braced(&label_str), sum);
                    let _ = writeln!(out, "{}_count{} {}", name, braced(&label_str), count);
                }
            }
        }
    }
}

fn braced(label_str: &str) -> String {
    if label_str.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", label_str)
    }
}

fn valid_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn valid_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !s.starts_with("__") && s != "le" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Registry of declared series.
///
/// Declaration takes `&mut self` and happens once at startup; updates and
/// exposition take `&self` and are safe under unbounded concurrency.
pub struct MetricRegistry {
    id: u64,
    series: Vec<Series>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            series: Vec::new(),
        }
    }

    /// Declare a series.
    ///
    /// Re-declaring the same (name, kind, labels) returns the existing handle.
    /// Same name with a different kind or label set is a `ConflictingSeries`.
    pub fn declare(
        &mut self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<SeriesHandle> {
        if !valid_metric_name(name) {
            return Err(MeterError::InvalidName { what: "metric", name: name.to_string() });
        }
        for (i, l) in label_names.iter().enumerate() {
            if !valid_label_name(l) || label_names[..i].contains(l) {
                return Err(MeterError::InvalidName { what: "label", name: l.to_string() });
            }
        }

        if let Some(index) = self.series.iter().position(|s| s.name == name) {
            let existing = &self.series[index];
            let same_labels = existing.label_names.iter().map(String::as_str).eq(label_names.iter().copied());
            if existing.kind != kind || !same_labels {
                return Err(MeterError::ConflictingSeries { name: name.to_string() });
            }
            return Ok(SeriesHandle { registry: self.id, index });
        }

        self.series.push(Series {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            cells: Cells::new(kind),
        });
        tracing::debug!(series = %name, %kind, "metric series declared");

        Ok(SeriesHandle { registry: self.id, index: self.series.len() - 1 })
    }

    fn series(&self, handle: SeriesHandle) -> Result<&Series> {
        if handle.registry != self.id {
            return Err(MeterError::UnknownSeries(format!(
                "handle belongs to registry {} (this is {})",
                handle.registry, self.id
            )));
        }
        self.series
            .get(handle.index)
            .ok_or_else(|| MeterError::UnknownSeries(format!("index {}", handle.index)))
    }

    /// Increment a counter by 1.
    pub fn increment(&self, handle: SeriesHandle, label_values: &[&str]) -> Result<()> {
        self.add(handle, label_values, 1)
    }

    /// Increment a counter by an arbitrary value.
    pub fn add(&self, handle: SeriesHandle, label_values: &[&str], v: u64) -> Result<()> {
        let series = self.series(handle)?;
        let Cells::Counter(map) = &series.cells else {
            return Err(MeterError::KindMismatch { name: series.name.clone(), kind: series.kind });
        };
        let key = series.key(label_values)?;
        map.entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Record one observation into a histogram or summary.
    pub fn observe(&self, handle: SeriesHandle, label_values: &[&str], value: f64) -> Result<()> {
        let series = self.series(handle)?;
        let key = series.key(label_values)?;
        match &series.cells {
            Cells::Histogram(map) => map.entry(key).or_insert_with(Default::default).observe(value),
            Cells::Summary(map) => map.entry(key).or_insert_with(Default::default).observe(value),
            Cells::Counter(_) => {
                return Err(MeterError::KindMismatch { name: series.name.clone(), kind: series.kind })
            }
        }
        Ok(())
    }

    /// Current counter value for a label tuple (`None` if never touched).
    pub fn counter_value(&self, handle: SeriesHandle, label_values: &[&str]) -> Option<u64> {
        let series = self.series(handle).ok()?;
        let key = series.key(label_values).ok()?;
        match &series.cells {
            Cells::Counter(map) => map.get(&key).map(|c| c.load(Ordering::Relaxed)),
            _ => None,
        }
    }

    /// Observation count and sum of a histogram/summary label tuple.
    pub fn sample_stats(&self, handle: SeriesHandle, label_values: &[&str]) -> Option<(u64, f64)> {
        let series = self.series(handle).ok()?;
        let key = series.key(label_values).ok()?;
        match &series.cells {
            Cells::Histogram(map) => map
                .get(&key)
                .map(|h| (h.count.load(Ordering::Relaxed), load_f64(&h.sum))),
            Cells::Summary(map) => map
                .get(&key)
                .map(|s| (s.count.load(Ordering::Relaxed), load_f64(&s.sum))),
            Cells::Counter(_) => None,
        }
    }

    /// Names of all declared series, in declaration order.
    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render every declared series in Prometheus text exposition format.
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        for s in &self.series {
            s.render(&mut out);
        }
        out
    }
}
