use metricalc::{MetricId, MetricSet, MetricValue, recalculate};

// Helper function to check a metric as the page would render it
fn assert_metric(metrics: &MetricSet, id: MetricId, expected: &str) {
    assert_eq!(
        metrics.display(id),
        expected,
        "{} should render as {}",
        id,
        expected
    );
}

fn edit(metrics: &MetricSet, id: MetricId, text: &str) -> MetricSet {
    recalculate(metrics, id, MetricValue::Raw(text.to_string())).metrics
}

#[test]
fn clicks_update_ctr_when_impressions_positive() {
    let after = edit(&MetricSet::seeded(), MetricId::Clicks, "450");
    assert_metric(&after, MetricId::Ctr, "4.5");

    let no_impressions = MetricSet::seeded().with(MetricId::Impressions, 0.0);
    let after = edit(&no_impressions, MetricId::Clicks, "450");
    assert_metric(&after, MetricId::Ctr, "3.0");
}

#[test]
fn cpc_edit_recomputes_ad_cost() {
    let before = MetricSet::seeded()
        .with(MetricId::Cpc, 5.0)
        .with(MetricId::AdCost, 1500.0);
    let after = edit(&before, MetricId::Cpc, "10");
    assert_metric(&after, MetricId::AdCost, "3000");
}

#[test]
fn ad_cost_edit_recomputes_cpc() {
    let before = MetricSet::seeded()
        .with(MetricId::Cpc, 4.0)
        .with(MetricId::AdCost, 1200.0);
    let after = edit(&before, MetricId::AdCost, "3000");
    assert_metric(&after, MetricId::Cpc, "10.0");
    assert_metric(&after, MetricId::AdCost, "3000");
}

#[test]
fn cr1_edit_cascades_to_leads_and_sales() {
    let before = MetricSet::seeded().with(MetricId::Cr2, 50.0);
    let after = edit(&before, MetricId::Cr1, "5");
    assert_metric(&after, MetricId::Leads, "15.0");
    assert_metric(&after, MetricId::Sales, "7.5");
    // Later stages read the rounded values written above.
    assert_metric(&after, MetricId::Cpl, "200");
    assert_metric(&after, MetricId::Cpo, "400");
    assert_metric(&after, MetricId::Revenue, "37500");
}

#[test]
fn revenue_edit_recomputes_aov() {
    let before = MetricSet::seeded().with(MetricId::Sales, 10.0);
    let after = edit(&before, MetricId::Revenue, "10000");
    assert_metric(&after, MetricId::Aov, "1000");
    assert_metric(&after, MetricId::Revenue, "10000");
}

#[test]
fn total_margin_edit_recomputes_margin_percent() {
    let before = MetricSet::seeded()
        .with(MetricId::Revenue, 10000.0)
        .with(MetricId::Aov, 1000.0)
        .with(MetricId::Sales, 10.0);
    let after = edit(&before, MetricId::TotalMargin, "3000");

    assert_metric(&after, MetricId::MarginPercent, "30.0");
    assert_metric(&after, MetricId::MarginPerUnit, "300");
    let implied = after.get(MetricId::MarginPerUnit) / after.get(MetricId::Aov) * 100.0;
    assert!((implied - after.get(MetricId::MarginPercent)).abs() < 1e-9);
    assert_metric(&after, MetricId::NetProfit, "0");
    assert_metric(&after, MetricId::Iccr, "100.0");
}

#[test]
fn zero_leads_leaves_cpl_untouched() {
    let before = MetricSet::seeded()
        .with(MetricId::Leads, 0.0)
        .with(MetricId::Cpl, 123.0);
    let result = recalculate(&before, MetricId::AdCost, MetricValue::Parsed(5000.0));

    assert_metric(&result.metrics, MetricId::Cpl, "123");
    assert!(!result.changed.contains(&MetricId::Cpl));
    assert_metric(&result.metrics, MetricId::Cpc, "16.7");
    assert_metric(&result.metrics, MetricId::Cpo, "833");
}

#[test]
fn unparseable_text_recalculates_as_zero() {
    let after = edit(&MetricSet::seeded(), MetricId::Clicks, "abc");

    assert_metric(&after, MetricId::Clicks, "abc");
    assert_eq!(after.get(MetricId::Clicks), 0.0);
    assert_metric(&after, MetricId::AdCost, "0");
    assert_metric(&after, MetricId::Ctr, "0.0");
    // Every guarded ratio keeps its previous value.
    assert_metric(&after, MetricId::Cpl, "100");
    assert_metric(&after, MetricId::Drr, "10.0");
    assert_metric(&after, MetricId::Romi, "300.0");
    for (_, value) in after.iter() {
        assert!(value.as_f64().is_finite());
    }
}

#[test]
fn unrelated_metrics_are_left_alone() {
    let seed = MetricSet::seeded();
    let result = recalculate(&seed, MetricId::Impressions, MetricValue::Parsed(20000.0));

    assert_eq!(result.changed, vec![MetricId::Ctr, MetricId::Cpm]);
    assert_metric(&result.metrics, MetricId::Ctr, "1.5");
    assert_metric(&result.metrics, MetricId::Cpm, "150");
    for id in MetricId::ALL {
        if !matches!(id, MetricId::Impressions | MetricId::Ctr | MetricId::Cpm) {
            assert_eq!(result.metrics.value(id), seed.value(id), "{} moved", id);
        }
    }
}

#[test]
fn ctr_edit_drives_clicks() {
    let after = edit(&MetricSet::seeded(), MetricId::Ctr, "6");
    assert_metric(&after, MetricId::Ctr, "6");
    assert_metric(&after, MetricId::Clicks, "600");
    assert_metric(&after, MetricId::AdCost, "6000");
    assert_metric(&after, MetricId::Leads, "60.0");
    assert_metric(&after, MetricId::Sales, "12.0");
}

#[test]
fn leads_edit_back_computes_cr1() {
    let after = edit(&MetricSet::seeded(), MetricId::Leads, "45");
    assert_metric(&after, MetricId::Cr1, "15.0");
    assert_metric(&after, MetricId::Leads, "45");
    assert_metric(&after, MetricId::Sales, "9.0");
    assert_metric(&after, MetricId::Cpl, "67");
}

#[test]
fn margin_per_unit_edit_back_computes_margin_percent() {
    let after = edit(&MetricSet::seeded(), MetricId::MarginPerUnit, "2500");
    assert_metric(&after, MetricId::MarginPercent, "50.0");
    assert_metric(&after, MetricId::TotalMargin, "15000");
    assert_metric(&after, MetricId::NetProfit, "12000");
    assert_metric(&after, MetricId::NetProfitPerUnit, "2000");
    assert_metric(&after, MetricId::Romi, "400.0");
    assert_metric(&after, MetricId::Iccr, "20.0");
}

#[test]
fn net_profit_edits_back_compute_margin_percent() {
    let after = edit(&MetricSet::seeded(), MetricId::NetProfit, "6000");
    assert_metric(&after, MetricId::MarginPercent, "30.0");
    assert_metric(&after, MetricId::TotalMargin, "9000");
    assert_metric(&after, MetricId::NetProfit, "6000");
    assert_metric(&after, MetricId::NetProfitPerUnit, "1000");
    assert_metric(&after, MetricId::Iccr, "33.3");

    let after = edit(&MetricSet::seeded(), MetricId::NetProfitPerUnit, "1000");
    assert_metric(&after, MetricId::MarginPercent, "30.0");
    assert_metric(&after, MetricId::MarginPerUnit, "1500");
    assert_metric(&after, MetricId::NetProfit, "6000");
    assert_metric(&after, MetricId::NetProfitPerUnit, "1000");
    assert_metric(&after, MetricId::Romi, "200.0");
}

#[test]
fn edited_metric_is_never_overwritten() {
    for id in MetricId::ALL {
        let result = recalculate(&MetricSet::seeded(), id, MetricValue::Raw("7.25".to_string()));
        assert_eq!(
            result.metrics.value(id),
            &MetricValue::Raw("7.25".to_string()),
            "{} was overwritten",
            id
        );
        assert!(!result.changed.contains(&id));
    }
}
