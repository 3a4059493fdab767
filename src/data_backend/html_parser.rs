//! Parser for the MaxManager day markup.
//!
//! The markup is one container whose children alternate between category
//! headers (`.gruppenkopf`) and the meals of that category.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Node, Selector};
use selectors::attr::CaseSensitivity;
use static_init::dynamic;
use std::collections::BTreeSet;
use std::time::Instant;

use crate::assembler::MealFragment;
use crate::data_types::{Canteen, Meal, MealCategory, MealNutrition, MealType, Prices};
use crate::errors::ParseError;
use crate::text_utils::{build_meal_name, normalize, normalize_nbsp};

const HEADER_CLASS: &str = "gruppenkopf";

#[dynamic]
static NO_DATA_SEL: Selector = Selector::parse("div.nodata").unwrap();
#[dynamic]
static CONTAINER_SEL: Selector = Selector::parse("div").unwrap();
#[dynamic]
static CATEGORY_NAME_SEL: Selector = Selector::parse(".gruppenname").unwrap();
#[dynamic]
static VISIBLE_BLOCK_SEL: Selector = Selector::parse("div.visible-xs-block").unwrap();
#[dynamic]
static SUB_BLOCK_SEL: Selector = Selector::parse("div.fltl").unwrap();
#[dynamic]
static IMG_SEL: Selector = Selector::parse("img").unwrap();
#[dynamic]
static PRICE_MARKER_SEL: Selector = Selector::parse("span.preisgramm").unwrap();
#[dynamic]
static INFO_PANEL_SEL: Selector = Selector::parse("div.naehrwerte").unwrap();
#[dynamic]
static TABLE_ROW_SEL: Selector = Selector::parse("tr").unwrap();
#[dynamic]
static TABLE_CELL_SEL: Selector = Selector::parse("td").unwrap();

/// Row positions in the nutrition table, header row excluded.
const CALORIES_ROW: usize = 0;
const PROTEIN_ROW: usize = 1;
const FAT_ROW: usize = 2;
const CARBOHYDRATES_ROW: usize = 3;
const SALT_ROW: usize = 4;

/// One category header and the meal elements up to the next header.
struct CategoryGroup<'a> {
    header: ElementRef<'a>,
    meals: Vec<ElementRef<'a>>,
}

/// Parses the markup of one day. A day without data is an empty list, not
/// an error.
pub fn parse_plan(source: &str, date: NaiveDate, canteen: Canteen) -> Result<Vec<Meal>, ParseError> {
    let now = Instant::now();
    let document = Html::parse_fragment(source);

    if document.select(&NO_DATA_SEL).next().is_some() {
        log::debug!("no data for {} on {}", canteen.key(), date);
        return Ok(Vec::new());
    }

    let container = document
        .select(&CONTAINER_SEL)
        .next()
        .ok_or(ParseError::MissingContainer)?;

    let children: Vec<ElementRef> = container.children().filter_map(ElementRef::wrap).collect();
    let groups = split_categories(children)?;

    let meals: Vec<Meal> = groups
        .iter()
        .flat_map(parse_category)
        .filter_map(|fragment| fragment.finalize(date, canteen))
        .collect();

    log::debug!("parsing html: {:.2?}", now.elapsed());
    Ok(meals)
}

fn is_category_header(element: &ElementRef) -> bool {
    element
        .value()
        .has_class(HEADER_CLASS, CaseSensitivity::CaseSensitive)
}

fn split_categories(children: Vec<ElementRef>) -> Result<Vec<CategoryGroup>, ParseError> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for child in children {
        if is_category_header(&child) {
            groups.push(CategoryGroup {
                header: child,
                meals: Vec::new(),
            });
            continue;
        }

        match groups.last_mut() {
            Some(group) => group.meals.push(child),
            None => return Err(ParseError::HeaderExpected(child.value().name().to_string())),
        }
    }

    Ok(groups)
}

fn category_label(header: &ElementRef) -> String {
    let label_element = header.select(&CATEGORY_NAME_SEL).next().unwrap_or(*header);
    // the first text node is the label, hints follow in nested spans
    let label = label_element
        .children()
        .find_map(|node| match node.value() {
            Node::Text(text) if !text.trim().is_empty() => Some(text.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| label_element.text().collect::<String>());
    normalize(&label)
}

fn parse_category(group: &CategoryGroup) -> Vec<MealFragment> {
    let label = category_label(&group.header);
    let Some(category) = MealCategory::from_label(&label) else {
        log::warn!("unknown category '{}', skipping {} meals", label, group.meals.len());
        return Vec::new();
    };

    group
        .meals
        .iter()
        .filter_map(|meal| parse_meal(meal, category))
        .collect()
}

fn parse_meal(meal: &ElementRef, category: MealCategory) -> Option<MealFragment> {
    let Some(block) = meal.select(&VISIBLE_BLOCK_SEL).next() else {
        log::warn!("{} meal without info block", category);
        return None;
    };

    let sub_blocks: Vec<ElementRef> = block.select(&SUB_BLOCK_SEL).collect();
    let name_lines: Vec<String> = sub_blocks
        .get(1)
        .map(direct_text_nodes)
        .unwrap_or_default();

    let (prices, price_note) = match block.select(&PRICE_MARKER_SEL).next() {
        Some(marker) => {
            let price_text = marker
                .parent()
                .and_then(ElementRef::wrap)
                .map(|p| p.text().collect::<String>())
                .unwrap_or_default();
            parse_prices(&price_text)
        }
        None => (Prices::not_available(), None),
    };

    let mut fragment = MealFragment::new(build_meal_name(&name_lines), category, prices);
    fragment.price_note = price_note;
    fragment.allergy_ids = parse_allergy_ids(meal.value().attr("lang").unwrap_or_default());
    fragment.types = parse_meal_types(&block);

    if let Some(panel) = meal.select(&INFO_PANEL_SEL).next() {
        fragment.co2 = parse_co2(&panel);
        fragment.nutrition = Some(parse_nutrition(&panel));
    }

    Some(fragment)
}

/// Text nodes directly below `element`, nested tags (allergen `<sup>`s) excluded.
fn direct_text_nodes(element: &ElementRef) -> Vec<String> {
    element
        .children()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(text.to_string()),
            _ => None,
        })
        .collect()
}

fn parse_allergy_ids(attr: &str) -> BTreeSet<String> {
    attr.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Icon file name without directory, query and extension, e.g. "veg".
fn icon_name(src: &str) -> &str {
    let file = src.split('?').next().unwrap_or(src);
    let file = file.rsplit('/').next().unwrap_or(file);
    file.split('.').next().unwrap_or(file)
}

fn parse_meal_types(block: &ElementRef) -> Vec<MealType> {
    let mut types = Vec::new();
    for img in block.select(&IMG_SEL) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if let Some(meal_type) = MealType::from_icon_name(icon_name(src)) {
            if !types.contains(&meal_type) {
                types.push(meal_type);
            }
        }
    }
    types
}

/// Splits "(pro 100 g) 0,95 | 1,25 | 1,55 €" into prices and the leading note.
pub fn parse_prices(text: &str) -> (Prices, Option<String>) {
    let cleaned = normalize(&normalize_nbsp(text));

    let (note, rest) = match cleaned.strip_prefix('(').and_then(|s| s.split_once(')')) {
        Some((note, rest)) => (Some(note.trim().to_string()), rest),
        None => (None, cleaned.as_str()),
    };

    let is_padding = |c: char| c.is_whitespace() || c == '€';
    let fields: Vec<&str> = rest
        .trim_matches(is_padding)
        .split('|')
        .map(|f| f.trim_matches(is_padding))
        .collect();

    let prices = match fields.as_slice() {
        [students, employees, others] => Prices {
            students: format!("{} €", students),
            employees: format!("{} €", employees),
            others: format!("{} €", others),
        },
        _ => {
            log::debug!("price text '{}' has no three fields", cleaned);
            Prices::not_available()
        }
    };

    (prices, note)
}

fn is_amount(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

/// Free text of the panel: everything except the nutrition table.
fn panel_free_text(panel: &ElementRef) -> String {
    let mut text = String::new();
    for node in panel.children() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() != "table" => {
                if let Some(element) = ElementRef::wrap(node) {
                    text.extend(element.text());
                }
            }
            _ => {}
        }
        text.push(' ');
    }
    text
}

/// Last "<amount> g" in the panel text, e.g. "744 g".
fn parse_co2(panel: &ElementRef) -> Option<String> {
    let free_text = panel_free_text(panel);
    let tokens: Vec<&str> = free_text.split_whitespace().collect();

    tokens.iter().enumerate().rev().find_map(|(i, token)| {
        if let Some(amount) = token.strip_suffix('g').filter(|a| is_amount(a)) {
            return Some(format!("{} g", amount));
        }
        if is_amount(token) && tokens.get(i + 1) == Some(&"g") {
            return Some(format!("{} g", token));
        }
        None
    })
}

/// "18,6 g (davon gesättigt 8,5 g)" -> ("18,6 g", "davon gesättigt 8,5 g")
fn split_sub_value(value: &str) -> (String, String) {
    let open = value.find('(');
    // the unit marker may only be searched before the parenthesis
    let head = &value[..open.unwrap_or(value.len())];
    let main = match head.find(" g") {
        Some(idx) => &head[..idx + 2],
        None => head,
    };

    let sub = match (open, value.rfind(')')) {
        (Some(open), Some(close)) if open < close => &value[open + 1..close],
        _ => "",
    };

    (main.trim().to_string(), sub.trim().to_string())
}

fn parse_nutrition(panel: &ElementRef) -> MealNutrition {
    // skip the header row
    let values: Vec<String> = panel
        .select(&TABLE_ROW_SEL)
        .skip(1)
        .map(|row| {
            row.select(&TABLE_CELL_SEL)
                .last()
                .map(|cell| normalize(&normalize_nbsp(&cell.text().collect::<String>())))
                .unwrap_or_default()
        })
        .collect();
    let row = |i: usize| values.get(i).cloned().unwrap_or_default();

    let (fat, saturated_fat) = split_sub_value(&row(FAT_ROW));
    let (carbohydrates, sugar) = split_sub_value(&row(CARBOHYDRATES_ROW));

    MealNutrition {
        calories: row(CALORIES_ROW),
        protein: row(PROTEIN_ROW),
        carbohydrates,
        sugar,
        fat,
        saturated_fat,
        salt: row(SALT_ROW),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::StandardCategory;

    const NUTRITION_HTML: &str = include_str!("../../tests/fixtures/nutrition.html");
    const NODATA_HTML: &str = include_str!("../../tests/fixtures/nodata.html");
    const LEGACY_HTML: &str = include_str!("../../tests/fixtures/legacy.html");

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn find(meals: &[Meal], category: StandardCategory) -> &Meal {
        meals
            .iter()
            .find(|m| m.category == MealCategory::Standard(category))
            .unwrap()
    }

    #[test]
    fn multiple_types() {
        let meals = parse_plan(NUTRITION_HTML, ymd(2024, 5, 21), Canteen::UlUniSued).unwrap();
        let meal = find(&meals, StandardCategory::FleischUndFisch);
        assert_eq!(meal.types, vec![MealType::Fish, MealType::Poultry]);
        assert_eq!(
            meal.name,
            "Seelachsfilet mit Hähnchenspießchen und Kräuter-Reis"
        );
        assert_eq!(
            meal.allergy_ids,
            BTreeSet::from(["23".to_string(), "34W".to_string(), "35".to_string()])
        );
        assert_eq!(meal.prices, Prices::new("4,30 €", "6,20 €", "8,20 €"));
        assert_eq!(meal.price_note, None);
    }

    #[test]
    fn extra_category_with_price_note() {
        let meals = parse_plan(NUTRITION_HTML, ymd(2024, 5, 21), Canteen::UlUniSued).unwrap();
        let meal = find(&meals, StandardCategory::Extra);
        assert_eq!(meal.name, "1 Wienerle");
        assert_eq!(meal.price_note.as_deref(), Some("pro Stück"));
        assert_eq!(meal.prices, Prices::new("1,10 €", "1,60 €", "2,10 €"));
    }

    #[test]
    fn nutrition_and_co2() {
        let meals = parse_plan(NUTRITION_HTML, ymd(2024, 5, 21), Canteen::UlUniSued).unwrap();
        let meal = find(&meals, StandardCategory::TopfUndPfanne);
        assert_eq!(meal.co2.as_deref(), Some("744 g"));
        assert_eq!(
            meal.nutrition,
            Some(MealNutrition {
                calories: "565,0 kcal".to_string(),
                protein: "25,0 g".to_string(),
                fat: "18,6 g".to_string(),
                saturated_fat: "davon gesättigt 8,5 g".to_string(),
                carbohydrates: "76,1 g".to_string(),
                sugar: "davon Zucker 12,0 g".to_string(),
                salt: "2,5 g".to_string(),
            })
        );

        let prima = find(&meals, StandardCategory::PrimaKlima);
        assert_eq!(prima.name, "Farfalle in Käsesahne, mit Kirschtomaten");
        assert_eq!(prima.nutrition, None);
        assert_eq!(prima.co2, None);
    }

    #[test]
    fn every_category_is_found() {
        let meals = parse_plan(NUTRITION_HTML, ymd(2024, 5, 21), Canteen::UlUniSued).unwrap();
        assert_eq!(meals.len(), 8);
        for category in StandardCategory::ALL {
            if category != StandardCategory::Sattmacher {
                find(&meals, category);
            }
        }

        let beilagen: Vec<&Meal> = meals
            .iter()
            .filter(|m| m.category == MealCategory::Standard(StandardCategory::Beilagen))
            .collect();
        assert_eq!(beilagen.len(), 2);
        assert_eq!(beilagen[1].types, vec![MealType::Vegetarian, MealType::Bio]);
        assert!(beilagen[0].allergy_ids.is_empty());

        let salat = find(&meals, StandardCategory::Salat);
        assert_eq!(salat.price_note.as_deref(), Some("pro 100 g"));
        assert_eq!(salat.prices, Prices::new("0,95 €", "1,25 €", "1,55 €"));

        let dessert = find(&meals, StandardCategory::Desserts);
        assert_eq!(dessert.prices, Prices::not_available());
        assert!(dessert.types.is_empty());
    }

    #[test]
    fn meals_are_stamped() {
        let date = ymd(2024, 5, 21);
        let meals = parse_plan(NUTRITION_HTML, date, Canteen::UlUniWest).unwrap();
        assert!(meals
            .iter()
            .all(|m| m.date == date && m.week_number == 21 && m.canteen == Canteen::UlUniWest));
    }

    #[test]
    fn nodata_is_an_empty_day() {
        let meals = parse_plan(NODATA_HTML, ymd(2024, 5, 20), Canteen::UlUniSued).unwrap();
        assert!(meals.is_empty());
    }

    #[test]
    fn legacy_markup_degrades_per_field() {
        let meals = parse_plan(LEGACY_HTML, ymd(2023, 12, 19), Canteen::UlUniSued).unwrap();
        // the unknown breakfast group is skipped
        assert_eq!(meals.len(), 2);

        let spaetzle = find(&meals, StandardCategory::Sattmacher);
        assert_eq!(spaetzle.name, "Käsespätzle mit Röstzwiebeln");
        assert_eq!(spaetzle.nutrition, None);
        assert_eq!(spaetzle.co2, None);

        let braten = find(&meals, StandardCategory::FleischUndFisch);
        assert_eq!(braten.prices, Prices::not_available());
        assert!(braten.types.is_empty());
    }

    #[test]
    fn first_child_must_be_header() {
        let source = r#"<div><div class="row splMeal" lang="1"><div class="visible-xs-block"></div></div></div>"#;
        assert_eq!(
            parse_plan(source, ymd(2024, 5, 21), Canteen::UlUniSued),
            Err(ParseError::HeaderExpected("div".to_string()))
        );
    }

    #[test]
    fn empty_markup_has_no_container() {
        assert_eq!(
            parse_plan("", ymd(2024, 5, 21), Canteen::UlUniSued),
            Err(ParseError::MissingContainer)
        );
    }

    #[test]
    fn reparsing_is_identical() {
        let date = ymd(2024, 5, 21);
        let first = parse_plan(NUTRITION_HTML, date, Canteen::UlUniSued).unwrap();
        let second = parse_plan(NUTRITION_HTML, date, Canteen::UlUniSued).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn price_text_variants() {
        assert_eq!(
            parse_prices("4,30 € | 6,20 € | 8,20 €"),
            (Prices::new("4,30 €", "6,20 €", "8,20 €"), None)
        );
        assert_eq!(
            parse_prices("\u{a0}(pro 100g)\u{a0}0,95 | 1,25 | 1,55 €"),
            (
                Prices::new("0,95 €", "1,25 €", "1,55 €"),
                Some("pro 100g".to_string())
            )
        );
        assert_eq!(parse_prices("1,00 | 2,00").0, Prices::not_available());
    }

    #[test]
    fn sub_values() {
        assert_eq!(
            split_sub_value("76,1 g (davon Zucker 12,0 g)"),
            ("76,1 g".to_string(), "davon Zucker 12,0 g".to_string())
        );
        assert_eq!(
            split_sub_value("18,6g (davon gesättigt 8,5 g)"),
            ("18,6g".to_string(), "davon gesättigt 8,5 g".to_string())
        );
        assert_eq!(split_sub_value("2,5 g"), ("2,5 g".to_string(), String::new()));
        assert_eq!(split_sub_value(""), (String::new(), String::new()));
    }

    #[test]
    fn icon_names_from_sources() {
        assert_eq!(icon_name("/assets/icons/veg.png"), "veg");
        assert_eq!(icon_name("/assets/icons/f.png?v=3"), "f");
        assert_eq!(icon_name("van.svg"), "van");
    }
}
