use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::{
    Canteen, Meal, MealCategory, MealNutrition, MealType, Plan, Prices,
};
use crate::date_range::iso_week;

/// Everything a parser knows about a meal before date and canteen are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct MealFragment {
    pub name: String,
    pub category: MealCategory,
    pub prices: Prices,
    pub price_note: Option<String>,
    pub allergy_ids: BTreeSet<String>,
    pub types: Vec<MealType>,
    pub co2: Option<String>,
    pub nutrition: Option<MealNutrition>,
}

impl MealFragment {
    pub fn new(name: String, category: MealCategory, prices: Prices) -> Self {
        MealFragment {
            name,
            category,
            prices,
            price_note: None,
            allergy_ids: BTreeSet::new(),
            types: Vec::new(),
            co2: None,
            nutrition: None,
        }
    }

    /// Stamps date, week number and canteen. Fragments without a name are
    /// not meals and yield `None`.
    pub fn finalize(self, date: NaiveDate, canteen: Canteen) -> Option<Meal> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            log::debug!("dropping unnamed {} fragment on {}", self.category, date);
            return None;
        }

        Some(Meal {
            name,
            category: self.category,
            date,
            week_number: iso_week(date),
            prices: self.prices,
            price_note: self.price_note,
            canteen,
            allergy_ids: self.allergy_ids,
            types: self.types,
            co2: self.co2,
            nutrition: self.nutrition,
        })
    }
}

/// Builds a plan from per-day results.
///
/// `days` maps every date of the week to `None` when the day is closed and
/// to its meals otherwise. An open day without meals ends up closed, and
/// meals dated on a closed or unknown day are dropped.
pub fn assemble_plan(
    canteen: Canteen,
    week: &str,
    source: &str,
    days: BTreeMap<NaiveDate, Option<Vec<Meal>>>,
) -> Plan {
    let mut opened_days = BTreeMap::new();
    let mut meals = Vec::new();

    for (date, day_meals) in days {
        let day_meals: Vec<Meal> = day_meals
            .unwrap_or_default()
            .into_iter()
            .filter(|m| {
                if m.date != date {
                    log::warn!("{} dated {} was listed under {}", m.name, m.date, date);
                }
                if m.canteen != canteen {
                    log::warn!(
                        "{} of {} was listed under {}",
                        m.name,
                        m.canteen.display_name(),
                        canteen.display_name()
                    );
                }
                m.date == date && m.canteen == canteen
            })
            .collect();

        opened_days.insert(date, !day_meals.is_empty());
        meals.extend(day_meals);
    }

    Plan {
        canteen,
        week: week.to_string(),
        source: source.to_string(),
        opened_days,
        meals,
    }
}

/// Meals of one plan date, sorted by the canteen's display order.
pub fn meals_in_display_order(plan: &Plan, date: NaiveDate) -> Vec<&Meal> {
    let mut meals: Vec<&Meal> = plan.meals_on(date).collect();
    // stable, so meals of the same category keep their parse order
    meals.sort_by_key(|m| plan.canteen.category_rank(&m.category));
    meals
}
