use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// Identifier of a single marketing metric.
///
/// The wire and display name of every variant is its camelCase form
/// (`adCost`, `marginPercent`, ...), which is also what [`FromStr`]
/// accepts, ignoring ASCII case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricId {
    Clicks,
    Impressions,
    Ctr,
    Cpc,
    AdCost,
    Cr1,
    Leads,
    Cpl,
    Cr2,
    Sales,
    Cpo,
    Aov,
    Revenue,
    MarginPercent,
    MarginPerUnit,
    TotalMargin,
    NetProfit,
    NetProfitPerUnit,
    Romi,
    Roas,
    Drr,
    Iccr,
    Cpm,
}

/// How a metric is rounded and rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    /// Percentages and ratios, kept to exactly one decimal place.
    Decimal,
    /// Currency amounts and counts, rounded to the nearest integer.
    Whole,
}

impl MetricId {
    /// Every metric, in the order the calculator page lays them out.
    pub const ALL: [MetricId; 23] = [
        MetricId::Impressions,
        MetricId::Clicks,
        MetricId::Ctr,
        MetricId::Cpc,
        MetricId::AdCost,
        MetricId::Cr1,
        MetricId::Leads,
        MetricId::Cpl,
        MetricId::Cr2,
        MetricId::Sales,
        MetricId::Cpo,
        MetricId::Aov,
        MetricId::Revenue,
        MetricId::MarginPercent,
        MetricId::MarginPerUnit,
        MetricId::TotalMargin,
        MetricId::NetProfit,
        MetricId::NetProfitPerUnit,
        MetricId::Romi,
        MetricId::Roas,
        MetricId::Drr,
        MetricId::Iccr,
        MetricId::Cpm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricId::Clicks => "clicks",
            MetricId::Impressions => "impressions",
            MetricId::Ctr => "ctr",
            MetricId::Cpc => "cpc",
            MetricId::AdCost => "adCost",
            MetricId::Cr1 => "cr1",
            MetricId::Leads => "leads",
            MetricId::Cpl => "cpl",
            MetricId::Cr2 => "cr2",
            MetricId::Sales => "sales",
            MetricId::Cpo => "cpo",
            MetricId::Aov => "aov",
            MetricId::Revenue => "revenue",
            MetricId::MarginPercent => "marginPercent",
            MetricId::MarginPerUnit => "marginPerUnit",
            MetricId::TotalMargin => "totalMargin",
            MetricId::NetProfit => "netProfit",
            MetricId::NetProfitPerUnit => "netProfitPerUnit",
            MetricId::Romi => "romi",
            MetricId::Roas => "roas",
            MetricId::Drr => "drr",
            MetricId::Iccr => "iccr",
            MetricId::Cpm => "cpm",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            MetricId::Ctr
            | MetricId::Cpc
            | MetricId::Cr1
            | MetricId::Leads
            | MetricId::Cr2
            | MetricId::Sales
            | MetricId::MarginPercent
            | MetricId::Romi
            | MetricId::Roas
            | MetricId::Drr
            | MetricId::Iccr => MetricKind::Decimal,
            _ => MetricKind::Whole,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| CalcError::UnknownMetric(s.trim().to_string()))
    }
}

impl MetricKind {
    /// Rounds a computed value the way the kind is stored.
    pub fn round(self, value: f64) -> f64 {
        match self {
            MetricKind::Decimal => (value * 10.0).round() / 10.0,
            MetricKind::Whole => value.round(),
        }
    }

    pub fn format(self, value: f64) -> String {
        let rounded = self.round(value);
        // -0.0 would otherwise print with a sign
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        match self {
            MetricKind::Decimal => format!("{:.1}", rounded),
            MetricKind::Whole => format!("{:.0}", rounded),
        }
    }
}

/// Value of one metric while the page is live.
///
/// `Raw` keeps exactly what the user typed so partial entries such as
/// `"10."` survive between keystrokes; `Parsed` is a committed number.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Raw(String),
    Parsed(f64),
}

impl MetricValue {
    /// Numeric reading of the value. Text that does not parse, and any
    /// non-finite number, reads as 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Parsed(v) if v.is_finite() => *v,
            MetricValue::Parsed(_) => 0.0,
            MetricValue::Raw(text) => parse_lenient(text),
        }
    }

    /// NaN and infinities become `Parsed(0.0)`; everything else is kept.
    pub fn finite_or_zero(self) -> MetricValue {
        match self {
            MetricValue::Parsed(v) if !v.is_finite() => MetricValue::Parsed(0.0),
            other => other,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, MetricValue::Raw(_))
    }

    /// Commits the value: raw text becomes a number rounded for `kind`.
    pub fn normalize(&self, kind: MetricKind) -> MetricValue {
        MetricValue::Parsed(kind.round(self.as_f64()))
    }

    /// Rendering shown in an input box. Raw text is shown verbatim.
    pub fn display(&self, kind: MetricKind) -> String {
        match self {
            MetricValue::Raw(text) => text.clone(),
            MetricValue::Parsed(v) => kind.format(*v),
        }
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Parsed(0.0)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Parsed(value)
    }
}

/// Parses numeric text typed into a field, falling back to 0.
///
/// A trailing decimal point and a comma used as decimal separator are
/// accepted, since both appear mid-typing.
pub fn parse_lenient(text: &str) -> f64 {
    let cleaned = text.trim().replace(',', ".");
    let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned);
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_name() {
        for id in MetricId::ALL {
            assert_eq!(MetricId::from_name(id.name()), Some(id));
        }
        assert_eq!(MetricId::from_name("ADCOST"), Some(MetricId::AdCost));
        assert_eq!(MetricId::from_name("bogus"), None);
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&MetricId::NetProfitPerUnit).unwrap();
        assert_eq!(json, "\"netProfitPerUnit\"");
        let id: MetricId = serde_json::from_str("\"marginPercent\"").unwrap();
        assert_eq!(id, MetricId::MarginPercent);
    }

    #[test]
    fn lenient_parse_falls_back_to_zero() {
        assert_eq!(parse_lenient("12.5"), 12.5);
        assert_eq!(parse_lenient(" 10. "), 10.0);
        assert_eq!(parse_lenient("3,5"), 3.5);
        assert_eq!(parse_lenient("abc"), 0.0);
        assert_eq!(parse_lenient(""), 0.0);
        assert_eq!(parse_lenient("inf"), 0.0);
    }

    #[test]
    fn kinds_round_and_format() {
        assert_eq!(MetricKind::Decimal.format(10.0), "10.0");
        assert_eq!(MetricKind::Decimal.format(7.46), "7.5");
        assert_eq!(MetricKind::Whole.format(2999.6), "3000");
        assert_eq!(MetricKind::Whole.format(-0.2), "0");
        assert_eq!(MetricId::Cpc.kind(), MetricKind::Decimal);
        assert_eq!(MetricId::AdCost.kind(), MetricKind::Whole);
    }

    #[test]
    fn raw_values_display_verbatim_until_normalized() {
        let value = MetricValue::Raw("10.".to_string());
        assert_eq!(value.display(MetricKind::Decimal), "10.");
        assert_eq!(value.as_f64(), 10.0);
        let committed = value.normalize(MetricKind::Decimal);
        assert_eq!(committed, MetricValue::Parsed(10.0));
        assert_eq!(committed.display(MetricKind::Decimal), "10.0");
    }
}
