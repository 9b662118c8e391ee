#![deny(warnings)]

//! Core domain models and invariants for the pricing calculator.
//!
//! This crate defines the serializable types shared by the pricing engine
//! and the state container, with validation helpers to guarantee basic
//! invariants. Validation is opt-in: the engine itself is total over its
//! inputs and never rejects a value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque unique identifier for a subscription plan.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlanId(pub u64);

/// Cadence at which a plan is charged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    /// Charged every month.
    Monthly,
    /// Charged every three months.
    Quarterly,
    /// Charged once a year.
    Annual,
}

impl BillingPeriod {
    /// Months covered by a single billing cycle.
    pub fn months_per_cycle(self) -> u32 {
        match self {
            BillingPeriod::Monthly => 1,
            BillingPeriod::Quarterly => 3,
            BillingPeriod::Annual => 12,
        }
    }

    /// Billing cycles in a calendar year.
    pub fn cycles_per_year(self) -> u32 {
        match self {
            BillingPeriod::Monthly => 12,
            BillingPeriod::Quarterly => 4,
            BillingPeriod::Annual => 1,
        }
    }

    /// Whether the global discount applies to this period.
    /// Only non-monthly plans are discounted.
    pub fn discount_eligible(self) -> bool {
        !matches!(self, BillingPeriod::Monthly)
    }
}

/// Rounding policy kinds shared by per-plan overrides and the global policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingKind {
    /// Round up to the next psychological price point.
    RoundUp,
    /// Round down to the previous psychological price point.
    RoundDown,
    /// Round down to a fixed price ending (e.g. ".99").
    FixedEnding,
}

/// Price-ending tokens the fixed-ending rounder understands.
/// Unknown tokens are tolerated downstream and leave the price unchanged.
pub const PRICE_ENDINGS: [&str; 6] = ["9", "99", "95", "90", "0", "5"];

/// Per-plan rounding override. Takes precedence over the global policy
/// while `active` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRounding {
    /// Whether this override is in effect.
    pub active: bool,
    /// Which rounding family to apply.
    pub kind: RoundingKind,
    /// Target ending token for `RoundingKind::FixedEnding`.
    pub ending: String,
}

impl Default for PlanRounding {
    fn default() -> Self {
        Self {
            active: false,
            kind: RoundingKind::RoundUp,
            ending: "9".to_string(),
        }
    }
}

/// A subscription plan as configured by the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique id, generated by the store.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Base price per billing cycle, before discount/adjustment/rounding.
    pub base_price: Decimal,
    /// Billing cadence.
    pub period: BillingPeriod,
    /// Optional rounding override.
    pub rounding: PlanRounding,
}

/// Global pricing settings applied across all plans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalPricing {
    /// Discount percentage applied to quarterly/annual plans.
    pub discount_pct: Decimal,
    /// Adjustment percentage applied to every plan; may be negative.
    pub adjustment_pct: Decimal,
    /// Global rounding policy; `None` leaves prices unrounded.
    pub rounding: Option<RoundingKind>,
    /// Global ending token for `RoundingKind::FixedEnding`.
    pub ending: String,
}

impl Default for GlobalPricing {
    fn default() -> Self {
        Self {
            discount_pct: Decimal::new(20, 0),
            adjustment_pct: Decimal::ZERO,
            rounding: None,
            ending: "9".to_string(),
        }
    }
}

/// Market segment the product is positioned in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    /// Price-sensitive entry tier.
    Basic,
    /// Mid-market tier.
    Mid,
    /// Premium tier.
    Premium,
}

impl Segment {
    /// Parse a segment token. Unknown tokens yield `None`; the
    /// recommendation heuristic treats that as the mid-tier rule.
    pub fn parse(token: &str) -> Option<Segment> {
        match token {
            "basic" => Some(Segment::Basic),
            "mid" => Some(Segment::Mid),
            "premium" => Some(Segment::Premium),
            _ => None,
        }
    }
}

/// Answers collected by the price-recommendation questionnaire.
/// Built incrementally; every field has a usable default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswers {
    /// Target market segment; `None` until answered.
    pub segment: Option<Segment>,
    /// Competitor prices in insertion order.
    pub competitor_prices: Vec<Decimal>,
    /// Unit cost of serving one customer.
    pub unit_cost: Decimal,
    /// Target profit margin in percent.
    pub target_margin_pct: Decimal,
    /// Perceived value on a 1-5 scale; 3 is neutral.
    pub perceived_value: i32,
    /// Names of the product's selected key features. Carried state only;
    /// never influences the recommended price.
    pub key_features: Vec<String>,
}

impl Default for QuizAnswers {
    fn default() -> Self {
        Self {
            segment: None,
            competitor_prices: Vec::new(),
            unit_cost: Decimal::ZERO,
            target_margin_pct: Decimal::new(30, 0),
            perceived_value: 3,
            key_features: Vec::new(),
        }
    }
}

/// Fixed, closed set of cost categories for the revenue simulation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    /// Operations and support.
    Operations,
    /// Infrastructure and tooling.
    Technology,
    /// Acquisition and campaigns.
    Marketing,
    /// Payroll.
    Salaries,
    /// Taxes and fees.
    Taxes,
    /// Everything else.
    Other,
}

impl CostCategory {
    /// All categories, in display order.
    pub const ALL: [CostCategory; 6] = [
        CostCategory::Operations,
        CostCategory::Technology,
        CostCategory::Marketing,
        CostCategory::Salaries,
        CostCategory::Taxes,
        CostCategory::Other,
    ];
}

/// Cost structure as percent-of-revenue per category.
///
/// Percentages are independently adjustable and may sum above 100; that is
/// tolerated and surfaced via [`CostBreakdown::exceeds_revenue`], never
/// rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Operations, % of revenue.
    pub operations: Decimal,
    /// Technology, % of revenue.
    pub technology: Decimal,
    /// Marketing, % of revenue.
    pub marketing: Decimal,
    /// Salaries, % of revenue.
    pub salaries: Decimal,
    /// Taxes, % of revenue.
    pub taxes: Decimal,
    /// Other, % of revenue.
    pub other: Decimal,
}

impl Default for CostBreakdown {
    fn default() -> Self {
        Self {
            operations: Decimal::new(10, 0),
            technology: Decimal::new(15, 0),
            marketing: Decimal::new(20, 0),
            salaries: Decimal::new(25, 0),
            taxes: Decimal::new(15, 0),
            other: Decimal::new(5, 0),
        }
    }
}

impl CostBreakdown {
    /// Percentage for a single category.
    pub fn get(&self, category: CostCategory) -> Decimal {
        match category {
            CostCategory::Operations => self.operations,
            CostCategory::Technology => self.technology,
            CostCategory::Marketing => self.marketing,
            CostCategory::Salaries => self.salaries,
            CostCategory::Taxes => self.taxes,
            CostCategory::Other => self.other,
        }
    }

    /// Set the percentage for a single category.
    pub fn set(&mut self, category: CostCategory, pct: Decimal) {
        match category {
            CostCategory::Operations => self.operations = pct,
            CostCategory::Technology => self.technology = pct,
            CostCategory::Marketing => self.marketing = pct,
            CostCategory::Salaries => self.salaries = pct,
            CostCategory::Taxes => self.taxes = pct,
            CostCategory::Other => self.other = pct,
        }
    }

    /// All (category, percentage) pairs in display order.
    pub fn entries(&self) -> [(CostCategory, Decimal); 6] {
        [
            (CostCategory::Operations, self.operations),
            (CostCategory::Technology, self.technology),
            (CostCategory::Marketing, self.marketing),
            (CostCategory::Salaries, self.salaries),
            (CostCategory::Taxes, self.taxes),
            (CostCategory::Other, self.other),
        ]
    }

    /// Sum of all category percentages.
    pub fn total_pct(&self) -> Decimal {
        self.entries().iter().map(|(_, p)| *p).sum()
    }

    /// Whether the configured costs exceed revenue (total above 100%).
    /// Flagged to the user, not rejected.
    pub fn exceeds_revenue(&self) -> bool {
        self.total_pct() > Decimal::ONE_HUNDRED
    }
}

/// Settings for the revenue/profitability simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Number of paying customers.
    pub customer_count: u64,
    /// Cost structure as percent of revenue.
    pub costs: CostBreakdown,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            customer_count: 100,
            costs: CostBreakdown::default(),
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Plan names must be non-empty.
    #[error("plan name must not be empty")]
    EmptyName,
    /// Perceived value is a 1-5 score.
    #[error("perceived value {0} is outside [1, 5]")]
    PerceivedValueOutOfRange(i32),
}

/// Validate a plan's basic invariants.
pub fn validate_plan(plan: &Plan) -> Result<(), ValidationError> {
    if plan.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if plan.base_price < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Validate questionnaire answers.
pub fn validate_quiz_answers(quiz: &QuizAnswers) -> Result<(), ValidationError> {
    if quiz.unit_cost < Decimal::ZERO || quiz.target_margin_pct < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if quiz.competitor_prices.iter().any(|p| *p < Decimal::ZERO) {
        return Err(ValidationError::NegativeMoney);
    }
    if !(1..=5).contains(&quiz.perceived_value) {
        return Err(ValidationError::PerceivedValueOutOfRange(
            quiz.perceived_value,
        ));
    }
    Ok(())
}

/// Validate simulation settings.
pub fn validate_simulation(sim: &SimulationSettings) -> Result<(), ValidationError> {
    if sim.costs.entries().iter().any(|(_, p)| *p < Decimal::ZERO) {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}
