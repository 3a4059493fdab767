pub mod canteen;
pub mod category;

pub use canteen::{Canteen, CategoryFamily, ColumnLayout};
pub use category::{BistroCategory, MealCategory, StandardCategory};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::PRICE_NOT_AVAILABLE;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Days since monday.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Dietary tag, taken from the icon shown next to a meal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Vegan,
    Vegetarian,
    Pork,
    Beef,
    Poultry,
    Fish,
    Lamb,
    Game,
    Bio,
}

impl MealType {
    /// `filename` is the icon name without directory and extension, e.g. "veg".
    pub fn from_icon_name(filename: &str) -> Option<MealType> {
        match filename.trim().to_lowercase().as_str() {
            "van" => Some(MealType::Vegan),
            "veg" => Some(MealType::Vegetarian),
            "s" => Some(MealType::Pork),
            "r" => Some(MealType::Beef),
            "g" => Some(MealType::Poultry),
            "f" => Some(MealType::Fish),
            "l" => Some(MealType::Lamb),
            "w" => Some(MealType::Game),
            "bio" => Some(MealType::Bio),
            _ => None,
        }
    }
}

/// Nutrition facts as printed by the source, e.g. "565,0 kcal".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealNutrition {
    pub calories: String,
    pub protein: String,
    pub carbohydrates: String,
    pub sugar: String,
    pub fat: String,
    pub saturated_fat: String,
    pub salt: String,
}

/// Prices keep the source formatting ("4,30 €"), they are never parsed to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub students: String,
    pub employees: String,
    pub others: String,
}

impl Prices {
    pub fn new(students: &str, employees: &str, others: &str) -> Self {
        Prices {
            students: students.to_string(),
            employees: employees.to_string(),
            others: others.to_string(),
        }
    }

    pub fn not_available() -> Self {
        Prices::new(PRICE_NOT_AVAILABLE, PRICE_NOT_AVAILABLE, PRICE_NOT_AVAILABLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meal {
    pub name: String,
    pub category: MealCategory,
    pub date: NaiveDate,
    /// ISO week of `date`
    pub week_number: u32,
    pub prices: Prices,
    pub price_note: Option<String>,
    pub canteen: Canteen,
    pub allergy_ids: BTreeSet<String>,
    pub types: Vec<MealType>,
    pub co2: Option<String>,
    pub nutrition: Option<MealNutrition>,
}

/// One canteen's offering for one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub canteen: Canteen,
    /// e.g. "KW44"
    pub week: String,
    /// URL or file name the plan was read from
    pub source: String,
    pub opened_days: BTreeMap<NaiveDate, bool>,
    pub meals: Vec<Meal>,
}

impl Plan {
    pub fn is_open(&self, date: NaiveDate) -> bool {
        self.opened_days.get(&date).copied().unwrap_or(false)
    }

    pub fn meals_on(&self, date: NaiveDate) -> impl Iterator<Item = &Meal> {
        self.meals.iter().filter(move |m| m.date == date)
    }
}
