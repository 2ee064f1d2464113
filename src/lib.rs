/*!
# Marketing Metric Calculator

A marketing analytics calculator: a flat set of advertising and sales metrics
where editing any one of them recomputes every metric that depends on it.

## Overview

The calculator holds 23 metrics covering the whole funnel, from impressions
and clicks through leads and sales to revenue, margin and return on ad spend.
Editing a metric applies an ordered table of formulas so that the rest of the
set stays consistent with the change.

## Architecture

### Core Layer
- **metric**: metric identifiers, rounding kinds and the raw/parsed value type
- **rules**: the ordered formula table, grouped into cascade stages
- **calculator**: the metric set, the recalculation engine and the
  `Calculator` session with undo and reset

### Surface Layer
- **command**: parser for the interactive session's command lines
- **app** (feature `web`): JSON endpoints driving a shared session

### Support
- **config**: optional JSON configuration for seeds and undo history
- **error**: structural errors (unknown metrics, bad commands, bad config)

## Recalculation Order

1. Direct pairs: cpc/adCost, cr1/leads, cr2/sales, clicks and impressions to ctr
2. Acquisition cost: cpl and cpo
3. Revenue and average order value
4. Margin percent, margin per unit, total margin
5. Net profit, net profit per unit, ROMI, ROAS
6. DRR, CPM, ICCR

Percentages and ratios keep one decimal place; money and counts are rounded
to whole numbers. A formula whose denominator is not positive is skipped and
its target keeps the previous value.

## Usage

```
use metricalc::{Calculator, MetricId};

let mut calc = Calculator::default();
calc.edit(MetricId::Cpc, "12");
assert_eq!(calc.metrics().display(MetricId::AdCost), "3600");
```

## REST API Endpoints

- `GET /api/metrics` - Current metric set
- `POST /api/metrics/edit` - Edit one metric and recalculate
- `POST /api/metrics/commit` - Normalize typed text
- `POST /api/metrics/undo` - Revert the last edit
- `POST /api/metrics/reset` - Restore the seed values
*/

pub mod calculator;
pub mod command;
pub mod config;
pub mod error;
pub mod metric;
pub mod rules;

#[cfg(feature = "web")]
pub mod app;

pub use calculator::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use metric::*;
