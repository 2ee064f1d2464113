use log::{debug, trace};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::config::CalculatorConfig;
use crate::metric::{MetricId, MetricValue};
use crate::rules::RULES;

/// Flat mapping of every metric to its current value.
///
/// All 23 metrics are always present; a fresh set holds the seed values
/// the calculator page opens with.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSet {
    values: BTreeMap<MetricId, MetricValue>,
}

/// Seed values. Every invariant between them holds exactly.
const SEED: [(MetricId, f64); 23] = [
    (MetricId::Impressions, 10000.0),
    (MetricId::Clicks, 300.0),
    (MetricId::Ctr, 3.0),
    (MetricId::Cpc, 10.0),
    (MetricId::AdCost, 3000.0),
    (MetricId::Cr1, 10.0),
    (MetricId::Leads, 30.0),
    (MetricId::Cpl, 100.0),
    (MetricId::Cr2, 20.0),
    (MetricId::Sales, 6.0),
    (MetricId::Cpo, 500.0),
    (MetricId::Aov, 5000.0),
    (MetricId::Revenue, 30000.0),
    (MetricId::MarginPercent, 40.0),
    (MetricId::MarginPerUnit, 2000.0),
    (MetricId::TotalMargin, 12000.0),
    (MetricId::NetProfit, 9000.0),
    (MetricId::NetProfitPerUnit, 1500.0),
    (MetricId::Romi, 300.0),
    (MetricId::Roas, 10.0),
    (MetricId::Drr, 10.0),
    (MetricId::Iccr, 25.0),
    (MetricId::Cpm, 300.0),
];

impl MetricSet {
    pub fn seeded() -> Self {
        Self::from_pairs(SEED)
    }

    pub fn zeroed() -> Self {
        Self::from_pairs(MetricId::ALL.map(|id| (id, 0.0)))
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (MetricId, f64)>) -> Self {
        MetricSet {
            values: pairs
                .into_iter()
                .map(|(id, v)| (id, MetricValue::Parsed(v)))
                .collect(),
        }
    }

    /// Builder-style override, handy for setting up a particular state.
    pub fn with(mut self, id: MetricId, value: f64) -> Self {
        self.insert(id, MetricValue::Parsed(value));
        self
    }

    /// Numeric reading of a metric; raw text reads as its parsed value or 0.
    pub fn get(&self, id: MetricId) -> f64 {
        self.values.get(&id).map_or(0.0, MetricValue::as_f64)
    }

    pub fn value(&self, id: MetricId) -> &MetricValue {
        // Every id is inserted at construction and never removed.
        &self.values[&id]
    }

    pub fn insert(&mut self, id: MetricId, value: MetricValue) {
        self.values.insert(id, value);
    }

    /// Rendering of a metric as the input box shows it: raw text verbatim,
    /// committed numbers with one decimal or none depending on kind.
    pub fn display(&self, id: MetricId) -> String {
        self.value(id).display(id.kind())
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, &MetricValue)> {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    /// Converts a raw value to a committed number. Returns whether
    /// anything changed.
    pub fn normalize(&mut self, id: MetricId) -> bool {
        let value = self.value(id);
        if !value.is_raw() {
            return false;
        }
        let normalized = value.normalize(id.kind());
        self.insert(id, normalized);
        true
    }

    /// Metrics laid out one per line in page order.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        for id in MetricId::ALL {
            out.push_str(&format!("{:<18}{:>14}\n", id.name(), self.display(id)));
        }
        out
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Serialize for MetricSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (id, value) in &self.values {
            map.serialize_entry(id, &value.as_f64())?;
        }
        map.end()
    }
}

/// Outcome of one recalculation.
#[derive(Clone, Debug)]
pub struct Recalculation {
    pub metrics: MetricSet,
    /// Metrics rewritten by the cascade, in the order they were written.
    /// The edited metric itself is not listed.
    pub changed: Vec<MetricId>,
}

/// Applies an edit to `current` and recomputes everything that depends on
/// it.
///
/// The edited metric is stored exactly as given, raw text included, and
/// read through its numeric value (0 when the text does not parse); a
/// non-finite number is stored as 0. The rule table then runs in order: a
/// rule fires when its trigger matches, never overwrites the edited metric,
/// and leaves its target alone when a guarded denominator is not positive. Written values are rounded per
/// metric kind before later rules read them.
pub fn recalculate(current: &MetricSet, edited: MetricId, value: MetricValue) -> Recalculation {
    let mut metrics = current.clone();
    metrics.insert(edited, value.finite_or_zero());

    let mut touched = BTreeSet::from([edited]);
    let mut changed = Vec::new();

    for rule in RULES.iter() {
        if rule.target == edited || !rule.trigger.fires(edited, &touched) {
            continue;
        }
        match rule.evaluate(&metrics) {
            Some(raw) => {
                let value = rule.target.kind().round(raw);
                trace!("{} rule set {} = {}", rule.stage, rule.target, value);
                metrics.insert(rule.target, MetricValue::Parsed(value));
                touched.insert(rule.target);
                if !changed.contains(&rule.target) {
                    changed.push(rule.target);
                }
            }
            None => trace!("{} rule skipped {}", rule.stage, rule.target),
        }
    }

    debug!(
        "recalculated after {} = {}: {} metric(s) updated",
        edited,
        metrics.display(edited),
        changed.len()
    );

    Recalculation { metrics, changed }
}

/// One calculator page's worth of state: the live metric set, the seed it
/// resets to and an undo history of previous sets.
#[derive(Clone, Debug)]
pub struct Calculator {
    metrics: MetricSet,
    seed: MetricSet,
    undo_stack: VecDeque<MetricSet>,
    undo_limit: usize,
}

impl Calculator {
    pub fn new(config: &CalculatorConfig) -> Self {
        let seed = config.seed_metrics();
        Calculator {
            metrics: seed.clone(),
            seed,
            undo_stack: VecDeque::new(),
            undo_limit: config.undo_limit,
        }
    }

    pub fn from_metrics(metrics: MetricSet) -> Self {
        Calculator {
            seed: metrics.clone(),
            metrics,
            undo_stack: VecDeque::new(),
            undo_limit: CalculatorConfig::default().undo_limit,
        }
    }

    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Keystroke path: keeps `text` verbatim on the edited metric and
    /// recalculates from its numeric reading.
    pub fn edit(&mut self, id: MetricId, text: &str) -> Vec<MetricId> {
        self.apply(id, MetricValue::Raw(text.to_string()))
    }

    /// Slider path: stores a number directly. NaN and infinities become 0.
    pub fn set(&mut self, id: MetricId, value: f64) -> Vec<MetricId> {
        self.apply(id, MetricValue::Parsed(value))
    }

    fn apply(&mut self, id: MetricId, value: MetricValue) -> Vec<MetricId> {
        let Recalculation { metrics, changed } = recalculate(&self.metrics, id, value);
        let previous = std::mem::replace(&mut self.metrics, metrics);
        self.push_undo(previous);
        changed
    }

    fn push_undo(&mut self, previous: MetricSet) {
        if self.undo_limit == 0 {
            return;
        }
        if self.undo_stack.len() >= self.undo_limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(previous);
    }

    /// Blur path: commits raw text on one metric without recalculating.
    pub fn commit(&mut self, id: MetricId) -> bool {
        self.metrics.normalize(id)
    }

    pub fn commit_all(&mut self) {
        for id in MetricId::ALL {
            self.metrics.normalize(id);
        }
    }

    /// Restores the set as it was before the last edit.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop_back() {
            Some(previous) => {
                self.metrics = previous;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn reset(&mut self) {
        self.metrics = self.seed.clone();
        self.undo_stack.clear();
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Calculator::new(&CalculatorConfig::default())
    }
}
