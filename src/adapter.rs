use serde_json::{json, Map, Value};

use crate::assembler::meals_in_display_order;
use crate::data_types::{Meal, Plan};

/// Flattens plans into `{canteen: {date: [meal, ..]}}`.
pub struct SimpleAdapter;

impl SimpleAdapter {
    pub fn convert_plans(plans: &[Plan]) -> Value {
        let mut result = Map::new();

        for plan in plans {
            let canteen = result
                .entry(plan.canteen.key())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(days) = canteen else {
                continue;
            };

            for &date in plan.opened_days.keys() {
                let meals: Vec<Value> = meals_in_display_order(plan, date)
                    .into_iter()
                    .map(Self::convert_meal)
                    .collect();
                days.insert(date.format("%Y-%m-%d").to_string(), Value::Array(meals));
            }
        }

        Value::Object(result)
    }

    fn convert_meal(meal: &Meal) -> Value {
        let nutrition = meal.nutrition.clone().unwrap_or_default();
        json!({
            "name": meal.name,
            "category": meal.category.label(),
            "prices": {
                "students": meal.prices.students,
                "employees": meal.prices.employees,
                "others": meal.prices.others,
            },
            "price_note": meal.price_note,
            "types": meal.types,
            "allergy": meal.allergy_ids,
            "co2": meal.co2,
            "nutrition": {
                "calories": nutrition.calories,
                "protein": nutrition.protein,
                "carbohydrates": nutrition.carbohydrates,
                "sugar": nutrition.sugar,
                "fat": nutrition.fat,
                "saturated_fat": nutrition.saturated_fat,
                "salt": nutrition.salt,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{assemble_plan, MealFragment};
    use crate::data_types::{Canteen, MealCategory, MealType, Prices, StandardCategory};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sued_plan() -> Plan {
        let mon = ymd(2022, 10, 31);
        let tue = ymd(2022, 11, 1);

        let mut pasta = MealFragment::new(
            "Pasta mit Tomatensoße".to_string(),
            MealCategory::Standard(StandardCategory::PrimaKlima),
            Prices::new("3,10 €", "4,80 €", "6,80 €"),
        );
        pasta.types = vec![MealType::Vegan];
        pasta.allergy_ids = ["1".to_string(), "23".to_string()].into();

        let fish = MealFragment::new(
            "Seelachs".to_string(),
            MealCategory::Standard(StandardCategory::FleischUndFisch),
            Prices::not_available(),
        );

        let days = BTreeMap::from([
            (
                mon,
                Some(vec![
                    pasta.finalize(mon, Canteen::UlUniSued).unwrap(),
                    fish.finalize(mon, Canteen::UlUniSued).unwrap(),
                ]),
            ),
            (tue, None),
        ]);
        assemble_plan(Canteen::UlUniSued, "KW44", "test", days)
    }

    #[test]
    fn shape_and_order() {
        let value = SimpleAdapter::convert_plans(&[sued_plan()]);
        let monday = &value["ul_uni_sued"]["2022-10-31"];

        assert_eq!(monday[0]["name"], "Seelachs");
        assert_eq!(monday[0]["category"], "Fleisch und Fisch");
        assert_eq!(monday[0]["prices"]["students"], "n/a");
        assert_eq!(monday[1]["category"], "Prima Klima");
        assert_eq!(monday[1]["types"], json!(["vegan"]));
        assert_eq!(monday[1]["allergy"], json!(["1", "23"]));
        assert_eq!(monday[1]["price_note"], Value::Null);
        assert_eq!(monday[1]["nutrition"]["calories"], "");
    }

    #[test]
    fn closed_days_are_empty_lists() {
        let value = SimpleAdapter::convert_plans(&[sued_plan()]);
        assert_eq!(value["ul_uni_sued"]["2022-11-01"], json!([]));
    }

    #[test]
    fn weeks_of_one_canteen_are_merged() {
        let mut next_week = sued_plan();
        next_week.opened_days = BTreeMap::from([(ymd(2022, 11, 7), false)]);
        next_week.meals.clear();

        let value = SimpleAdapter::convert_plans(&[sued_plan(), next_week]);
        let days = value["ul_uni_sued"].as_object().unwrap();
        assert_eq!(days.len(), 3);
    }
}
