//! Ordered rule table driving the recalculation cascade.
//!
//! Each [`Rule`] computes one target metric from the current set. Rules are
//! evaluated strictly in table order, so a rule sees every value written by
//! the rules above it during the same recalculation.

use std::collections::BTreeSet;
use std::fmt;

use crate::calculator::MetricSet;
use crate::metric::MetricId;
use crate::metric::MetricId::*;

/// Cascade stage a rule belongs to. Stages only label the table for
/// logging; ordering comes from the table itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// cpc/adCost, cr1/leads, cr2/sales and clicks/impressions/ctr.
    Direct,
    /// cpl and cpo.
    Acquisition,
    /// revenue and aov.
    Revenue,
    /// marginPercent, marginPerUnit, totalMargin.
    Margin,
    /// netProfit family, romi, roas.
    Profit,
    /// drr, cpm, iccr.
    Efficiency,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Direct => "direct",
            Stage::Acquisition => "acquisition",
            Stage::Revenue => "revenue",
            Stage::Margin => "margin",
            Stage::Profit => "profit",
            Stage::Efficiency => "efficiency",
        };
        f.write_str(name)
    }
}

/// When a rule fires.
#[derive(Clone, Copy, Debug)]
pub enum Trigger {
    /// Only when the user edited one of these metrics. Used by the
    /// inverse rules, which must not react to cascaded writes.
    Edited(&'static [MetricId]),
    /// When one of these metrics was edited or written earlier in the
    /// same recalculation.
    Touched(&'static [MetricId]),
}

impl Trigger {
    pub fn fires(&self, edited: MetricId, touched: &BTreeSet<MetricId>) -> bool {
        match self {
            Trigger::Edited(ids) => ids.contains(&edited),
            Trigger::Touched(ids) => ids.iter().any(|id| touched.contains(id)),
        }
    }
}

pub struct Rule {
    pub stage: Stage,
    pub target: MetricId,
    pub trigger: Trigger,
    formula: fn(&MetricSet) -> Option<f64>,
}

impl Rule {
    /// Computes the target, or `None` when a guarded denominator is not
    /// positive or the result is not finite.
    pub fn evaluate(&self, metrics: &MetricSet) -> Option<f64> {
        (self.formula)(metrics).filter(|v| v.is_finite())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("stage", &self.stage)
            .field("target", &self.target)
            .field("trigger", &self.trigger)
            .finish()
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

fn clicks_from_ctr(m: &MetricSet) -> Option<f64> {
    let impressions = m.get(Impressions);
    (impressions > 0.0).then(|| impressions * m.get(Ctr) / 100.0)
}

fn cpc_from_ad_cost(m: &MetricSet) -> Option<f64> {
    ratio(m.get(AdCost), m.get(Clicks))
}

fn ad_cost(m: &MetricSet) -> Option<f64> {
    Some(m.get(Clicks) * m.get(Cpc))
}

fn ctr(m: &MetricSet) -> Option<f64> {
    ratio(m.get(Clicks), m.get(Impressions)).map(|r| r * 100.0)
}

fn cr1_from_leads(m: &MetricSet) -> Option<f64> {
    ratio(m.get(Leads), m.get(Clicks)).map(|r| r * 100.0)
}

fn leads(m: &MetricSet) -> Option<f64> {
    Some(m.get(Clicks) * m.get(Cr1) / 100.0)
}

fn cr2_from_sales(m: &MetricSet) -> Option<f64> {
    ratio(m.get(Sales), m.get(Leads)).map(|r| r * 100.0)
}

fn sales(m: &MetricSet) -> Option<f64> {
    Some(m.get(Leads) * m.get(Cr2) / 100.0)
}

fn cpl(m: &MetricSet) -> Option<f64> {
    ratio(m.get(AdCost), m.get(Leads))
}

fn cpo(m: &MetricSet) -> Option<f64> {
    ratio(m.get(AdCost), m.get(Sales))
}

fn aov_from_revenue(m: &MetricSet) -> Option<f64> {
    ratio(m.get(Revenue), m.get(Sales))
}

fn revenue(m: &MetricSet) -> Option<f64> {
    Some(m.get(Aov) * m.get(Sales))
}

fn margin_percent_from_unit(m: &MetricSet) -> Option<f64> {
    ratio(m.get(MarginPerUnit), m.get(Aov)).map(|r| r * 100.0)
}

fn margin_percent_from_total(m: &MetricSet) -> Option<f64> {
    ratio(m.get(TotalMargin), m.get(Revenue)).map(|r| r * 100.0)
}

// netProfit = revenue * margin% / 100 - adCost
fn margin_percent_from_net_profit(m: &MetricSet) -> Option<f64> {
    ratio(m.get(NetProfit) + m.get(AdCost), m.get(Revenue)).map(|r| r * 100.0)
}

// netProfitPerUnit = aov * margin% / 100 - adCost / sales
fn margin_percent_from_net_profit_per_unit(m: &MetricSet) -> Option<f64> {
    let cost_per_sale = ratio(m.get(AdCost), m.get(Sales))?;
    ratio(m.get(NetProfitPerUnit) + cost_per_sale, m.get(Aov)).map(|r| r * 100.0)
}

fn margin_per_unit(m: &MetricSet) -> Option<f64> {
    Some(m.get(Aov) * m.get(MarginPercent) / 100.0)
}

fn total_margin(m: &MetricSet) -> Option<f64> {
    Some(m.get(Revenue) * m.get(MarginPercent) / 100.0)
}

fn net_profit(m: &MetricSet) -> Option<f64> {
    Some(m.get(TotalMargin) - m.get(AdCost))
}

fn net_profit_per_unit(m: &MetricSet) -> Option<f64> {
    ratio(m.get(NetProfit), m.get(Sales))
}

fn romi(m: &MetricSet) -> Option<f64> {
    ratio(m.get(NetProfit), m.get(AdCost)).map(|r| r * 100.0)
}

fn roas(m: &MetricSet) -> Option<f64> {
    ratio(m.get(Revenue), m.get(AdCost))
}

fn drr(m: &MetricSet) -> Option<f64> {
    ratio(m.get(AdCost), m.get(Revenue)).map(|r| r * 100.0)
}

fn cpm(m: &MetricSet) -> Option<f64> {
    ratio(m.get(AdCost), m.get(Impressions)).map(|r| r * 1000.0)
}

fn iccr(m: &MetricSet) -> Option<f64> {
    ratio(m.get(AdCost), m.get(TotalMargin)).map(|r| r * 100.0)
}

const fn rule(
    stage: Stage,
    target: MetricId,
    trigger: Trigger,
    formula: fn(&MetricSet) -> Option<f64>,
) -> Rule {
    Rule {
        stage,
        target,
        trigger,
        formula,
    }
}

/// The cascade, in evaluation order.
pub static RULES: [Rule; 25] = [
    rule(Stage::Direct, Clicks, Trigger::Edited(&[Ctr]), clicks_from_ctr),
    rule(Stage::Direct, Cpc, Trigger::Edited(&[AdCost]), cpc_from_ad_cost),
    rule(Stage::Direct, AdCost, Trigger::Touched(&[Clicks, Cpc]), ad_cost),
    rule(Stage::Direct, Ctr, Trigger::Touched(&[Clicks, Impressions]), ctr),
    rule(Stage::Direct, Cr1, Trigger::Edited(&[Leads]), cr1_from_leads),
    rule(Stage::Direct, Leads, Trigger::Touched(&[Clicks, Cr1]), leads),
    rule(Stage::Direct, Cr2, Trigger::Edited(&[Sales]), cr2_from_sales),
    rule(Stage::Direct, Sales, Trigger::Touched(&[Leads, Cr2]), sales),
    rule(Stage::Acquisition, Cpl, Trigger::Touched(&[AdCost, Leads]), cpl),
    rule(Stage::Acquisition, Cpo, Trigger::Touched(&[AdCost, Sales]), cpo),
    rule(Stage::Revenue, Aov, Trigger::Edited(&[Revenue]), aov_from_revenue),
    rule(Stage::Revenue, Revenue, Trigger::Touched(&[Aov, Sales]), revenue),
    rule(
        Stage::Margin,
        MarginPercent,
        Trigger::Edited(&[MarginPerUnit]),
        margin_percent_from_unit,
    ),
    rule(
        Stage::Margin,
        MarginPercent,
        Trigger::Edited(&[TotalMargin]),
        margin_percent_from_total,
    ),
    rule(
        Stage::Margin,
        MarginPercent,
        Trigger::Edited(&[NetProfit]),
        margin_percent_from_net_profit,
    ),
    rule(
        Stage::Margin,
        MarginPercent,
        Trigger::Edited(&[NetProfitPerUnit]),
        margin_percent_from_net_profit_per_unit,
    ),
    rule(
        Stage::Margin,
        MarginPerUnit,
        Trigger::Touched(&[Aov, MarginPercent]),
        margin_per_unit,
    ),
    rule(
        Stage::Margin,
        TotalMargin,
        Trigger::Touched(&[Revenue, MarginPercent]),
        total_margin,
    ),
    rule(Stage::Profit, NetProfit, Trigger::Touched(&[TotalMargin, AdCost]), net_profit),
    rule(
        Stage::Profit,
        NetProfitPerUnit,
        Trigger::Touched(&[NetProfit, Sales]),
        net_profit_per_unit,
    ),
    rule(Stage::Profit, Romi, Trigger::Touched(&[NetProfit, AdCost]), romi),
    rule(Stage::Profit, Roas, Trigger::Touched(&[Revenue, AdCost]), roas),
    rule(Stage::Efficiency, Drr, Trigger::Touched(&[AdCost, Revenue]), drr),
    rule(Stage::Efficiency, Cpm, Trigger::Touched(&[AdCost, Impressions]), cpm),
    rule(Stage::Efficiency, Iccr, Trigger::Touched(&[AdCost, TotalMargin]), iccr),
];
