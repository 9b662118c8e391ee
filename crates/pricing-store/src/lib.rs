#![deny(warnings)]

//! In-memory state container for the pricing calculator.
//!
//! [`PricingStore`] owns the plan list, global pricing settings, simulation
//! settings, questionnaire answers, and display preferences. Every action is
//! a total method: invalid numeric text is coerced to zero, out-of-band
//! scores are clamped, and mutations against unknown plan ids are no-ops.
//! The pricing math itself lives in `pricing-engine`; the store only wires
//! current state into it on the read side.

use pricing_core::{
    BillingPeriod, CostCategory, GlobalPricing, Plan, PlanId, PlanRounding, QuizAnswers,
    RoundingKind, Segment, SimulationSettings,
};
use pricing_engine::{
    annualized_equivalent, compute_final_price, compute_profitability, cost_outlay,
    project_revenue, recommend_price, Profitability, Recommendation, RevenueProjection,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Coerce user-entered money text to a decimal; unparsable input becomes 0.
pub fn parse_money(input: &str) -> Decimal {
    Decimal::from_str(input.trim()).unwrap_or(Decimal::ZERO)
}

/// Coerce user-entered count text to an integer; unparsable input becomes 0.
pub fn parse_count(input: &str) -> u64 {
    input.trim().parse().unwrap_or(0)
}

/// The single mutable state container behind the calculator UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingStore {
    plans: Vec<Plan>,
    global: GlobalPricing,
    simulation: SimulationSettings,
    quiz: QuizAnswers,
    dark_mode: bool,
    show_annual_equivalent: bool,
    active_tab: String,
    next_plan_id: u64,
}

impl Default for PricingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingStore {
    /// Fresh store seeded with the starter plan and default settings.
    pub fn new() -> Self {
        Self {
            plans: vec![Plan {
                id: PlanId(1),
                name: "Example".to_string(),
                base_price: Decimal::new(149, 0),
                period: BillingPeriod::Monthly,
                rounding: PlanRounding::default(),
            }],
            global: GlobalPricing::default(),
            simulation: SimulationSettings::default(),
            quiz: QuizAnswers::default(),
            dark_mode: false,
            show_annual_equivalent: true,
            active_tab: "simulator".to_string(),
            next_plan_id: 2,
        }
    }

    // ---- accessors -------------------------------------------------------

    /// All plans, in insertion order.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Look up a single plan.
    pub fn plan(&self, id: PlanId) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Global pricing settings.
    pub fn global(&self) -> &GlobalPricing {
        &self.global
    }

    /// Revenue-simulation settings.
    pub fn simulation(&self) -> &SimulationSettings {
        &self.simulation
    }

    /// Questionnaire answers collected so far.
    pub fn quiz(&self) -> &QuizAnswers {
        &self.quiz
    }

    /// Dark-mode display preference.
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Whether plan cards show the annual equivalent price.
    pub fn show_annual_equivalent(&self) -> bool {
        self.show_annual_equivalent
    }

    /// Currently selected tab.
    pub fn active_tab(&self) -> &str {
        &self.active_tab
    }

    fn plan_mut(&mut self, id: PlanId) -> Option<&mut Plan> {
        self.plans.iter_mut().find(|p| p.id == id)
    }

    // ---- plan actions ----------------------------------------------------

    /// Add a plan with a freshly generated id and default (inactive)
    /// rounding. Returns the new id.
    pub fn add_plan(&mut self, name: &str, base_price: Decimal, period: BillingPeriod) -> PlanId {
        let id = PlanId(self.next_plan_id);
        self.next_plan_id += 1;
        self.plans.push(Plan {
            id,
            name: name.to_string(),
            base_price,
            period,
            rounding: PlanRounding::default(),
        });
        tracing::debug!(?id, name, "plan added");
        id
    }

    /// Remove a plan; unknown ids are a no-op.
    pub fn remove_plan(&mut self, id: PlanId) {
        self.plans.retain(|p| p.id != id);
        tracing::debug!(?id, "plan removed");
    }

    /// Rename a plan.
    pub fn set_plan_name(&mut self, id: PlanId, name: &str) {
        if let Some(plan) = self.plan_mut(id) {
            plan.name = name.to_string();
        }
    }

    /// Change a plan's base price.
    pub fn set_plan_base_price(&mut self, id: PlanId, base_price: Decimal) {
        if let Some(plan) = self.plan_mut(id) {
            plan.base_price = base_price;
        }
    }

    /// Change a plan's billing period.
    pub fn set_plan_period(&mut self, id: PlanId, period: BillingPeriod) {
        if let Some(plan) = self.plan_mut(id) {
            plan.period = period;
        }
    }

    /// Enable or disable a plan's rounding override.
    pub fn set_plan_rounding_active(&mut self, id: PlanId, active: bool) {
        if let Some(plan) = self.plan_mut(id) {
            plan.rounding.active = active;
        }
    }

    /// Change the kind of a plan's rounding override.
    pub fn set_plan_rounding_kind(&mut self, id: PlanId, kind: RoundingKind) {
        if let Some(plan) = self.plan_mut(id) {
            plan.rounding.kind = kind;
        }
    }

    /// Change the ending token of a plan's rounding override. Unknown
    /// tokens are kept; the engine treats them as "leave unrounded".
    pub fn set_plan_rounding_ending(&mut self, id: PlanId, ending: &str) {
        if let Some(plan) = self.plan_mut(id) {
            plan.rounding.ending = ending.to_string();
        }
    }

    // ---- global pricing actions -----------------------------------------

    /// Set the discount percentage for quarterly/annual plans.
    pub fn set_discount_pct(&mut self, discount_pct: Decimal) {
        self.global.discount_pct = discount_pct;
        tracing::debug!(%discount_pct, "global discount changed");
    }

    /// Set the universal adjustment percentage; may be negative.
    pub fn set_adjustment_pct(&mut self, adjustment_pct: Decimal) {
        self.global.adjustment_pct = adjustment_pct;
        tracing::debug!(%adjustment_pct, "global adjustment changed");
    }

    /// Set or clear the global rounding policy.
    pub fn set_global_rounding(&mut self, rounding: Option<RoundingKind>) {
        self.global.rounding = rounding;
    }

    /// Set the global fixed-ending token.
    pub fn set_global_ending(&mut self, ending: &str) {
        self.global.ending = ending.to_string();
    }

    // ---- simulation actions ---------------------------------------------

    /// Set the simulated customer count.
    pub fn set_customer_count(&mut self, customer_count: u64) {
        self.simulation.customer_count = customer_count;
    }

    /// Set one cost category's percent-of-revenue share. Totals above 100%
    /// are tolerated; the UI surfaces them via `CostBreakdown::exceeds_revenue`.
    pub fn set_cost_pct(&mut self, category: CostCategory, pct: Decimal) {
        self.simulation.costs.set(category, pct);
    }

    // ---- questionnaire actions ------------------------------------------

    /// Record the target market segment.
    pub fn set_segment(&mut self, segment: Option<Segment>) {
        self.quiz.segment = segment;
    }

    /// Replace the competitor price list.
    pub fn set_competitor_prices(&mut self, prices: Vec<Decimal>) {
        self.quiz.competitor_prices = prices;
    }

    /// Append a competitor price.
    pub fn add_competitor_price(&mut self, price: Decimal) {
        self.quiz.competitor_prices.push(price);
    }

    /// Record the unit cost.
    pub fn set_unit_cost(&mut self, unit_cost: Decimal) {
        self.quiz.unit_cost = unit_cost;
    }

    /// Record the target profit margin percentage.
    pub fn set_target_margin_pct(&mut self, target_margin_pct: Decimal) {
        self.quiz.target_margin_pct = target_margin_pct;
    }

    /// Record the perceived-value score, clamped into the 1-5 band.
    pub fn set_perceived_value(&mut self, perceived_value: i32) {
        self.quiz.perceived_value = perceived_value.clamp(1, 5);
    }

    /// Toggle a key feature in the questionnaire's selection.
    pub fn toggle_feature(&mut self, feature: &str) {
        if let Some(pos) = self.quiz.key_features.iter().position(|f| f == feature) {
            self.quiz.key_features.remove(pos);
        } else {
            self.quiz.key_features.push(feature.to_string());
        }
    }

    // ---- display preferences --------------------------------------------

    /// Flip dark mode.
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Flip the annual-equivalent price display.
    pub fn toggle_show_annual_equivalent(&mut self) {
        self.show_annual_equivalent = !self.show_annual_equivalent;
    }

    /// Select the active tab.
    pub fn set_active_tab(&mut self, tab: &str) {
        self.active_tab = tab.to_string();
    }

    // ---- read side: engine views ----------------------------------------

    /// Effective price of a plan under current global settings.
    pub fn final_price(&self, id: PlanId) -> Option<Decimal> {
        self.plan(id).map(|p| compute_final_price(p, &self.global))
    }

    /// Annualized equivalent of a plan's effective price.
    pub fn annualized_price(&self, id: PlanId) -> Option<Decimal> {
        self.plan(id).map(|p| {
            let final_price = compute_final_price(p, &self.global);
            annualized_equivalent(final_price, p.period, self.global.discount_pct)
        })
    }

    /// Revenue projection for the configured customer base.
    pub fn revenue_projection(&self) -> RevenueProjection {
        project_revenue(&self.plans, self.simulation.customer_count)
    }

    /// Absolute monthly cost per category under the projected revenue.
    pub fn monthly_cost_outlay(&self) -> BTreeMap<CostCategory, Decimal> {
        cost_outlay(self.revenue_projection().monthly, &self.simulation.costs)
    }

    /// Profitability of the projected month.
    pub fn profitability(&self) -> Profitability {
        let projection = self.revenue_projection();
        compute_profitability(projection.monthly, &self.monthly_cost_outlay())
    }

    /// Price recommendation from the current questionnaire answers.
    pub fn recommendation(&self) -> Recommendation {
        recommend_price(
            self.quiz.segment,
            &self.quiz.competitor_prices,
            self.quiz.unit_cost,
            self.quiz.perceived_value,
            self.quiz.target_margin_pct,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    #[test]
    fn seed_state() {
        let store = PricingStore::new();
        assert_eq!(store.plans().len(), 1);
        let seed = &store.plans()[0];
        assert_eq!(seed.name, "Example");
        assert_eq!(seed.base_price, Decimal::new(149, 0));
        assert_eq!(seed.period, BillingPeriod::Monthly);
        assert!(!seed.rounding.active);
        assert_eq!(store.global().discount_pct, Decimal::new(20, 0));
        assert!(store.show_annual_equivalent());
        assert!(!store.dark_mode());
        assert_eq!(store.active_tab(), "simulator");
    }

    #[test]
    fn add_plan_generates_fresh_ids() {
        let mut store = PricingStore::new();
        let a = store.add_plan("Pro", Decimal::new(299, 0), BillingPeriod::Annual);
        let b = store.add_plan("Team", Decimal::new(499, 0), BillingPeriod::Quarterly);
        assert_ne!(a, b);
        assert_eq!(store.plans().len(), 3);
        assert!(!store.plan(a).unwrap().rounding.active);

        store.remove_plan(a);
        let c = store.add_plan("Again", Decimal::new(99, 0), BillingPeriod::Monthly);
        // Ids are never reused after removal.
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn remove_unknown_plan_is_noop() {
        let mut store = PricingStore::new();
        store.remove_plan(PlanId(777));
        assert_eq!(store.plans().len(), 1);
    }

    #[test]
    fn field_setters_mutate_in_place() {
        let mut store = PricingStore::new();
        let id = store.plans()[0].id;
        store.set_plan_name(id, "Starter");
        store.set_plan_base_price(id, Decimal::new(199, 0));
        store.set_plan_period(id, BillingPeriod::Annual);
        let plan = store.plan(id).unwrap();
        assert_eq!(plan.name, "Starter");
        assert_eq!(plan.base_price, Decimal::new(199, 0));
        assert_eq!(plan.period, BillingPeriod::Annual);

        // Unknown ids fall through silently.
        store.set_plan_base_price(PlanId(777), Decimal::ONE);
        assert_eq!(store.plan(id).unwrap().base_price, Decimal::new(199, 0));
    }

    #[test]
    fn plan_rounding_override_beats_global() {
        let mut store = PricingStore::new();
        let id = store.plans()[0].id;
        store.set_plan_base_price(id, Decimal::new(100, 0));
        store.set_discount_pct(Decimal::ZERO);
        store.set_global_rounding(Some(RoundingKind::RoundDown));
        assert_eq!(store.final_price(id), Some(Decimal::new(99, 0)));

        store.set_plan_rounding_active(id, true);
        store.set_plan_rounding_kind(id, RoundingKind::RoundUp);
        assert_eq!(store.final_price(id), Some(Decimal::new(109, 0)));

        store.set_plan_rounding_kind(id, RoundingKind::FixedEnding);
        store.set_plan_rounding_ending(id, "95");
        assert_eq!(store.final_price(id), Some(Decimal::new(9_995, 2)));
    }

    #[test]
    fn annualized_price_reapplies_discount_for_monthly() {
        let mut store = PricingStore::new();
        let id = store.plans()[0].id;
        store.set_plan_base_price(id, Decimal::new(100, 0));
        // Seed discount is 20%; monthly price stays 100 but the annual
        // equivalent advertises the switch incentive.
        assert_eq!(store.final_price(id), Some(Decimal::new(100, 0)));
        assert_eq!(store.annualized_price(id), Some(Decimal::new(960, 0)));
    }

    #[test]
    fn coercion_helpers() {
        assert_eq!(parse_money("12.5"), Decimal::new(125, 1));
        assert_eq!(parse_money(" 149 "), Decimal::new(149, 0));
        assert_eq!(parse_money("abc"), Decimal::ZERO);
        assert_eq!(parse_money(""), Decimal::ZERO);
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("many"), 0);
    }

    #[test]
    fn perceived_value_is_clamped() {
        let mut store = PricingStore::new();
        store.set_perceived_value(9);
        assert_eq!(store.quiz().perceived_value, 5);
        store.set_perceived_value(-2);
        assert_eq!(store.quiz().perceived_value, 1);
        store.set_perceived_value(4);
        assert_eq!(store.quiz().perceived_value, 4);
    }

    #[test]
    fn toggle_feature_adds_then_removes() {
        let mut store = PricingStore::new();
        store.toggle_feature("api");
        store.toggle_feature("sso");
        assert_eq!(store.quiz().key_features, vec!["api", "sso"]);
        store.toggle_feature("api");
        assert_eq!(store.quiz().key_features, vec!["sso"]);
    }

    #[test]
    fn display_toggles() {
        let mut store = PricingStore::new();
        store.toggle_dark_mode();
        assert!(store.dark_mode());
        store.toggle_show_annual_equivalent();
        assert!(!store.show_annual_equivalent());
        store.set_active_tab("quiz");
        assert_eq!(store.active_tab(), "quiz");
    }

    #[test]
    fn profitability_through_store() {
        let mut store = PricingStore::new();
        let id = store.plans()[0].id;
        store.set_plan_base_price(id, Decimal::new(149, 0));
        store.set_customer_count(100);

        let projection = store.revenue_projection();
        assert_eq!(projection.monthly, Decimal::new(14_900, 0));
        assert_eq!(projection.annual, Decimal::new(178_800, 0));
        assert_eq!(projection.avg_per_customer, Decimal::new(149, 0));

        // Default cost breakdown totals 90% of revenue.
        let profitability = store.profitability();
        assert_eq!(profitability.total_cost, Decimal::new(13_410, 0));
        assert_eq!(profitability.profit, Decimal::new(1_490, 0));
        assert_eq!(profitability.margin_pct, Decimal::new(10, 0));
    }

    #[test]
    fn recommendation_through_store() {
        let mut store = PricingStore::new();
        store.set_segment(Some(Segment::Premium));
        store.set_competitor_prices(vec![Decimal::new(100, 0)]);
        store.set_unit_cost(Decimal::new(50, 0));
        store.set_target_margin_pct(Decimal::new(50, 0));
        store.set_perceived_value(3);
        let rec = store.recommendation();
        assert_eq!(rec.price, Decimal::new(159, 0));
        assert!(rec.rationale.contains("Premium"));
    }

    #[test]
    fn serde_roundtrip_store() {
        let mut store = PricingStore::new();
        store.add_plan("Pro", Decimal::new(299, 0), BillingPeriod::Annual);
        store.set_cost_pct(CostCategory::Marketing, Decimal::new(35, 0));
        let s = serde_json::to_string(&store).unwrap();
        let back: PricingStore = serde_json::from_str(&s).unwrap();
        assert_eq!(back, store);
    }

    proptest! {
        #[test]
        fn ids_stay_unique(removals in proptest::collection::vec(0usize..8, 0..8)) {
            let mut store = PricingStore::new();
            for i in 0..8u32 {
                store.add_plan(&format!("p{i}"), Decimal::new(i64::from(i), 0), BillingPeriod::Monthly);
            }
            for r in removals {
                let ids: Vec<PlanId> = store.plans().iter().map(|p| p.id).collect();
                if let Some(id) = ids.get(r % ids.len().max(1)) {
                    store.remove_plan(*id);
                }
                store.add_plan("fresh", Decimal::ONE, BillingPeriod::Annual);
            }
            let mut ids: Vec<PlanId> = store.plans().iter().map(|p| p.id).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), before);
        }
    }
}
