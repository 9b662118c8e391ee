#![deny(warnings)]

//! Pricing math for the subscription calculator.
//!
//! This module provides pure, total functions for:
//! - Psychological and fixed-ending price rounding
//! - Final plan prices under global discount/adjustment and rounding policy
//! - Annualized price equivalents
//! - Revenue projection and profitability
//! - A heuristic price recommendation with a human-readable rationale
//!
//! Every function is total over its input domain: unparsable or out-of-band
//! inputs fall back to defined values instead of signaling errors.

use pricing_core::{
    BillingPeriod, CostBreakdown, CostCategory, GlobalPricing, Plan, RoundingKind, Segment,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical psychologically attractive price points, ascending.
/// Correctness of the rounding scan depends only on this ordering.
pub const PSYCHOLOGICAL_PRICES: [i64; 50] = [
    9, 19, 29, 39, 49, 59, 69, 79, 89, 99, 109, 119, 129, 139, 149, 159, 169, 179, 189, 199, 209,
    219, 229, 239, 249, 259, 269, 279, 289, 299, 349, 399, 449, 499, 549, 599, 649, 699, 749, 799,
    849, 899, 949, 999, 1499, 1999, 2499, 2999, 4999, 9999,
];

/// Direction for psychological rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundDirection {
    /// Smallest attractive price point at or above the value.
    Up,
    /// Largest attractive price point at or below the value.
    Down,
}

/// Round to a psychologically attractive price point.
///
/// Upward rounding past the top of the table falls back to `floor(value) + 9`;
/// downward rounding below the table falls back to `floor(value) - 1`.
///
/// Example:
/// let p = round_psychological(Decimal::new(70, 0), RoundDirection::Up);
/// assert_eq!(p, Decimal::new(79, 0));
pub fn round_psychological(value: Decimal, direction: RoundDirection) -> Decimal {
    match direction {
        RoundDirection::Up => {
            for point in PSYCHOLOGICAL_PRICES {
                let candidate = Decimal::from(point);
                if candidate >= value {
                    return candidate;
                }
            }
            value.floor() + Decimal::new(9, 0)
        }
        RoundDirection::Down => {
            for point in PSYCHOLOGICAL_PRICES.iter().rev() {
                let candidate = Decimal::from(*point);
                if candidate <= value {
                    return candidate;
                }
            }
            value.floor() - Decimal::ONE
        }
    }
}

// Most recent value ending in `fraction` that is <= the input: stay within
// the current integer part if the ending has been reached, otherwise step
// one integer back.
fn latest_with_fraction(value: Decimal, fraction: Decimal) -> Decimal {
    let candidate = value.floor() + fraction;
    if value >= candidate {
        candidate
    } else {
        candidate - Decimal::ONE
    }
}

/// Round to the nearest value with a fixed price ending, never upward for
/// the fractional endings. `"0"` rounds to the nearest integer and `"5"` to
/// the nearest multiple of 5. Unknown ending tokens leave the value
/// unchanged; that is a defined fallback, not an error.
///
/// Idempotent for every supported ending.
pub fn round_to_ending(value: Decimal, ending: &str) -> Decimal {
    match ending {
        "9" | "90" => latest_with_fraction(value, Decimal::new(9, 1)),
        "99" => latest_with_fraction(value, Decimal::new(99, 2)),
        "95" => latest_with_fraction(value, Decimal::new(95, 2)),
        "0" => value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        "5" => {
            let five = Decimal::new(5, 0);
            (value / five).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * five
        }
        _ => value,
    }
}

/// A resolved rounding policy, borrowed from plan or global settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingPolicy<'a> {
    /// Round to the psychological price table.
    Psychological(RoundDirection),
    /// Round down to a fixed ending token.
    FixedEnding(&'a str),
}

fn policy_for<'a>(kind: RoundingKind, ending: &'a str) -> RoundingPolicy<'a> {
    match kind {
        RoundingKind::RoundUp => RoundingPolicy::Psychological(RoundDirection::Up),
        RoundingKind::RoundDown => RoundingPolicy::Psychological(RoundDirection::Down),
        RoundingKind::FixedEnding => RoundingPolicy::FixedEnding(ending),
    }
}

/// Resolve the rounding policy for a plan: an active per-plan override wins,
/// otherwise the global policy applies, otherwise `None` (unrounded).
pub fn effective_policy<'a>(plan: &'a Plan, global: &'a GlobalPricing) -> Option<RoundingPolicy<'a>> {
    if plan.rounding.active {
        Some(policy_for(plan.rounding.kind, &plan.rounding.ending))
    } else {
        global.rounding.map(|kind| policy_for(kind, &global.ending))
    }
}

/// Apply a resolved rounding policy; `None` returns the value unchanged.
pub fn apply_rounding(value: Decimal, policy: Option<RoundingPolicy<'_>>) -> Decimal {
    match policy {
        Some(RoundingPolicy::Psychological(direction)) => round_psychological(value, direction),
        Some(RoundingPolicy::FixedEnding(ending)) => round_to_ending(value, ending),
        None => value,
    }
}

/// Compute a plan's effective price.
///
/// The global discount applies only to quarterly/annual periods; the global
/// adjustment applies to every period; the effective rounding policy (plan
/// override first, then global) is applied last.
///
/// Example:
/// // base 100, quarterly, 20% discount, no adjustment, no rounding -> 80
pub fn compute_final_price(plan: &Plan, global: &GlobalPricing) -> Decimal {
    let mut price = plan.base_price;
    if plan.period.discount_eligible() {
        price *= Decimal::ONE - global.discount_pct / Decimal::ONE_HUNDRED;
    }
    price *= Decimal::ONE + global.adjustment_pct / Decimal::ONE_HUNDRED;
    apply_rounding(price, effective_policy(plan, global))
}

/// Annual cost of a monthly plan if the customer switched to annual billing.
///
/// Deliberately re-applies the non-monthly discount as an incentive framing
/// ("what you'd pay per year if you switched"), even though the monthly
/// price itself is never discounted.
pub fn monthly_to_annual(monthly_price: Decimal, discount_pct: Decimal) -> Decimal {
    monthly_price * Decimal::new(12, 0) * (Decimal::ONE - discount_pct / Decimal::ONE_HUNDRED)
}

/// Annualized equivalent of a plan's final price: annual plans as-is,
/// quarterly plans over four cycles, monthly plans via [`monthly_to_annual`].
pub fn annualized_equivalent(
    final_price: Decimal,
    period: BillingPeriod,
    discount_pct: Decimal,
) -> Decimal {
    match period {
        BillingPeriod::Annual => final_price,
        BillingPeriod::Quarterly => final_price * Decimal::from(period.cycles_per_year()),
        BillingPeriod::Monthly => monthly_to_annual(final_price, discount_pct),
    }
}

/// Outcome of the profitability calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    /// Sum of all cost-category amounts.
    pub total_cost: Decimal,
    /// Revenue minus total cost.
    pub profit: Decimal,
    /// Profit as a percentage of revenue; 0 when revenue is 0.
    pub margin_pct: Decimal,
}

/// Compute profit and margin from revenue and absolute per-category costs.
/// Margin is defined as 0 for zero revenue rather than a division error.
pub fn compute_profitability(
    revenue: Decimal,
    costs: &BTreeMap<CostCategory, Decimal>,
) -> Profitability {
    let total_cost: Decimal = costs.values().copied().sum();
    let profit = revenue - total_cost;
    let margin_pct = if revenue > Decimal::ZERO {
        profit / revenue * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    Profitability {
        total_cost,
        profit,
        margin_pct,
    }
}

/// Projected revenue for the configured customer base.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueProjection {
    /// Revenue per month.
    pub monthly: Decimal,
    /// Revenue per year.
    pub annual: Decimal,
    /// Monthly revenue per customer; 0 when there are no customers.
    pub avg_per_customer: Decimal,
}

/// Project revenue assuming customers are split evenly across plans.
///
/// Each plan contributes its base price normalized to a monthly amount.
/// With no plans the projection is all zeros.
pub fn project_revenue(plans: &[Plan], customer_count: u64) -> RevenueProjection {
    if plans.is_empty() {
        return RevenueProjection {
            monthly: Decimal::ZERO,
            annual: Decimal::ZERO,
            avg_per_customer: Decimal::ZERO,
        };
    }
    let customers_per_plan = Decimal::from(customer_count) / Decimal::from(plans.len() as u64);
    let mut monthly = Decimal::ZERO;
    for plan in plans {
        let monthly_price = plan.base_price / Decimal::from(plan.period.months_per_cycle());
        monthly += monthly_price * customers_per_plan;
    }
    let avg_per_customer = if customer_count > 0 {
        monthly / Decimal::from(customer_count)
    } else {
        Decimal::ZERO
    };
    RevenueProjection {
        monthly,
        annual: monthly * Decimal::new(12, 0),
        avg_per_customer,
    }
}

/// Convert a percent-of-revenue cost breakdown into absolute monthly
/// amounts, the shape [`compute_profitability`] consumes.
pub fn cost_outlay(
    monthly_revenue: Decimal,
    costs: &CostBreakdown,
) -> BTreeMap<CostCategory, Decimal> {
    costs
        .entries()
        .iter()
        .map(|(category, pct)| (*category, monthly_revenue * *pct / Decimal::ONE_HUNDRED))
        .collect()
}

/// A recommended price with the reasoning that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Suggested price, already rounded up to an attractive price point.
    pub price: Decimal,
    /// Human-readable justification assembled from the branches that fired.
    pub rationale: String,
}

/// Heuristic price recommendation from questionnaire inputs.
///
/// Positions against the competitor mean by segment (0.7x / 1.0x / 1.5x,
/// with an unanswered segment following the mid rule), shifts by ±10% per
/// perceived-value point away from neutral 3, clamps to the cost floor
/// `unit_cost / (1 - margin/100)` when unit cost is known, and rounds up to
/// a psychological price point.
pub fn recommend_price(
    segment: Option<Segment>,
    competitor_prices: &[Decimal],
    unit_cost: Decimal,
    perceived_value: i32,
    target_margin_pct: Decimal,
) -> Recommendation {
    let competitor_mean = if competitor_prices.is_empty() {
        Decimal::ZERO
    } else {
        competitor_prices.iter().copied().sum::<Decimal>()
            / Decimal::from(competitor_prices.len() as u64)
    };

    let cost_floor = if unit_cost > Decimal::ZERO {
        let divisor = Decimal::ONE - target_margin_pct / Decimal::ONE_HUNDRED;
        if divisor > Decimal::ZERO {
            unit_cost / divisor
        } else {
            // Margin at or above 100% has no finite floor; degrade to cost.
            unit_cost
        }
    } else {
        Decimal::ZERO
    };

    let (mut price, mut rationale) = match segment {
        Some(Segment::Basic) => (
            cost_floor.max(competitor_mean * Decimal::new(7, 1)),
            "Competitive price for the basic segment, positioned below the competitor average."
                .to_string(),
        ),
        Some(Segment::Mid) => (
            cost_floor.max(competitor_mean),
            "Price aligned with the market average for the mid tier.".to_string(),
        ),
        Some(Segment::Premium) => (
            cost_floor.max(competitor_mean * Decimal::new(15, 1)),
            "Premium price positioned above the competitor average to signal superior quality."
                .to_string(),
        ),
        None => (
            cost_floor.max(competitor_mean),
            "Price based on the market average.".to_string(),
        ),
    };

    // Perceived value 3 is neutral; each point shifts the price by 10%.
    let value_shift = Decimal::from(perceived_value - 3) * Decimal::TEN;
    price *= Decimal::ONE + value_shift / Decimal::ONE_HUNDRED;

    if price < cost_floor && unit_cost > Decimal::ZERO {
        price = cost_floor;
        rationale.push_str(" Raised to protect the minimum profit margin.");
    }

    let rounded = round_psychological(price, RoundDirection::Up);
    if rounded > price {
        rationale.push_str(" Rounded up to a psychologically attractive price point.");
    }

    tracing::debug!(%rounded, "price recommendation computed");
    Recommendation {
        price: rounded,
        rationale,
    }
}

/// Render an amount as Brazilian Real for display: `R$ `, dot thousands
/// separator, comma decimal separator, exactly two fraction digits.
/// Formatting never alters the stored numeric precision.
///
/// Example:
/// assert_eq!(format_currency(Decimal::new(12345, 1)), "R$ 1.234,50");
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs().to_string();
    let (units, fraction) = match abs.split_once('.') {
        Some((units, fraction)) => (units.to_string(), format!("{fraction:0<2}")),
        None => (abs, "00".to_string()),
    };
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction}")
}
