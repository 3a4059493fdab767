//! Parser for the legacy fixed-layout PDF plans.
//!
//! A page has one text column per weekday. Columns are clipped out by fixed
//! rectangles, and inside a column every price line closes the meal whose
//! name lines came before it. The n-th price line of a column belongs to the
//! n-th category of the canteen's family.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::assembler::{assemble_plan, MealFragment};
use crate::data_backend::pdf_page::PositionalPage;
use crate::data_types::{
    Canteen, CategoryFamily, ColumnLayout, Meal, MealCategory, Plan, Prices, Weekday,
};
use crate::date_range::{find_date_header, parse_date_range, week_label};
use crate::errors::ParseError;
use crate::text_utils::{build_meal_name, normalize};

/// Meals of one PDF week plus the open/closed state of each weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedWeek {
    pub meals: Vec<Meal>,
    pub opened_days: BTreeMap<NaiveDate, bool>,
}

impl ParsedWeek {
    /// Per-date view as consumed by [`crate::assembler::assemble_plan`].
    pub fn into_days(self) -> BTreeMap<NaiveDate, Option<Vec<Meal>>> {
        let mut days: BTreeMap<NaiveDate, Option<Vec<Meal>>> = self
            .opened_days
            .iter()
            .map(|(date, open)| (*date, open.then(Vec::new)))
            .collect();

        for meal in self.meals {
            if let Some(Some(day)) = days.get_mut(&meal.date) {
                day.push(meal);
            }
        }
        days
    }

    /// Weekly plan of `canteen`. Open days are the ones the column extractor
    /// saw as open, even if no meal could be segmented from them.
    pub fn into_plan(self, canteen: Canteen, source: &str) -> Plan {
        let week = self
            .opened_days
            .keys()
            .next()
            .map(|monday| week_label(*monday))
            .unwrap_or_default();
        let opened_days = self.opened_days.clone();

        let mut plan = assemble_plan(canteen, &week, source, self.into_days());
        plan.opened_days = opened_days;
        plan
    }
}

pub trait MensaParser: Send + Sync {
    fn canteen(&self) -> Canteen;

    /// Parses the first page of a weekly plan. Parsers keep no state between
    /// calls, one instance can parse any number of pages.
    fn parse_plan(&self, page: &dyn PositionalPage) -> Result<ParsedWeek, ParseError>;

    /// Parses a page into the plan of this parser's canteen. `source` names
    /// the document, e.g. its file name.
    fn parse_week_plan(
        &self,
        page: &dyn PositionalPage,
        source: &str,
    ) -> Result<Plan, ParseError> {
        Ok(self.parse_plan(page)?.into_plan(self.canteen(), source))
    }
}

/// Picks the column strategy for a canteen.
pub fn create_parser(canteen: Canteen) -> Box<dyn MensaParser> {
    match canteen.category_family() {
        CategoryFamily::Standard => Box::new(StandardParser::new(canteen)),
        CategoryFamily::Bistro => Box::new(BistroParser::new(canteen)),
    }
}

/// Clips the five weekday columns. Columns with less text than the layout's
/// threshold count as closed and map to `None`.
pub fn extract_columns(
    page: &dyn PositionalPage,
    layout: &ColumnLayout,
) -> BTreeMap<Weekday, Option<String>> {
    Weekday::ALL
        .into_iter()
        .map(|day| {
            let text = page.text(Some(&layout.rect(day)));
            if text.chars().count() < layout.closed_threshold {
                log::debug!("{:?} column has {} chars, closed", day, text.chars().count());
                (day, None)
            } else {
                (day, Some(text))
            }
        })
        .collect()
}

/// Shared driver: resolves the week's dates, then lets `segment` cut every
/// open column into meal fragments.
fn parse_week<F>(
    canteen: Canteen,
    layout: &ColumnLayout,
    page: &dyn PositionalPage,
    segment: F,
) -> Result<ParsedWeek, ParseError>
where
    F: Fn(&str) -> Vec<MealFragment>,
{
    let now = Instant::now();

    let columns = extract_columns(page, layout);
    let page_text = page.text(None);
    let header = find_date_header(&page_text).ok_or(ParseError::MissingDateHeader)?;
    let dates = parse_date_range(header)?;

    let mut meals = Vec::new();
    let mut opened_days = BTreeMap::new();

    for (weekday, column) in columns {
        let date = dates[&weekday];
        opened_days.insert(date, column.is_some());

        if let Some(text) = column {
            meals.extend(
                segment(&text)
                    .into_iter()
                    .filter_map(|fragment| fragment.finalize(date, canteen)),
            );
        }
    }

    log::debug!("parsing pdf page: {:.2?}", now.elapsed());
    Ok(ParsedWeek { meals, opened_days })
}

/// Accumulator for one column: name lines of the pending meal and the
/// 1-based category slot the next price line closes.
struct ColumnState {
    family: CategoryFamily,
    meal_lines: Vec<String>,
    price_lines: Vec<String>,
    slot: usize,
    fragments: Vec<MealFragment>,
}

impl ColumnState {
    fn new(family: CategoryFamily) -> Self {
        ColumnState {
            family,
            meal_lines: Vec::new(),
            price_lines: Vec::new(),
            slot: 1,
            fragments: Vec::new(),
        }
    }

    /// Closes the pending meal with `prices` and advances to the next slot.
    fn finish_meal(&mut self, prices: Prices) {
        let lines = std::mem::take(&mut self.meal_lines);
        self.price_lines.clear();
        let slot = self.slot;
        self.slot += 1;

        let Some(category) = MealCategory::from_ordinal(self.family, slot) else {
            log::warn!("price line for slot {} exceeds the {:?} categories", slot, self.family);
            return;
        };

        let name = build_meal_name(&lines);
        if name.is_empty() {
            log::debug!("price line without meal name for {}", category);
            return;
        }
        self.fragments.push(MealFragment::new(name, category, prices));
    }
}

fn is_co2_line(line: &str) -> bool {
    line.to_lowercase().contains("co2 pro")
}

pub struct StandardParser {
    canteen: Canteen,
    layout: ColumnLayout,
}

impl StandardParser {
    pub fn new(canteen: Canteen) -> Self {
        StandardParser {
            canteen,
            layout: canteen.column_layout(),
        }
    }

    pub fn with_layout(canteen: Canteen, layout: ColumnLayout) -> Self {
        StandardParser { canteen, layout }
    }
}

impl MensaParser for StandardParser {
    fn canteen(&self) -> Canteen {
        self.canteen
    }

    fn parse_plan(&self, page: &dyn PositionalPage) -> Result<ParsedWeek, ParseError> {
        let family = self.canteen.category_family();
        parse_week(self.canteen, &self.layout, page, |text| {
            segment_standard_column(text, family)
        })
    }
}

/// Only price lines contain a pipe.
fn is_standard_price_line(line: &str) -> bool {
    line.contains('|')
}

/// "4,30 € | 6,20 € | 8,20 €"
fn parse_standard_prices(line: &str) -> Prices {
    let fields: Vec<&str> = line.split(" | ").map(str::trim).collect();
    match fields.as_slice() {
        [students, employees, others] => Prices::new(students, employees, others),
        _ => {
            log::warn!("price line '{}' has {} fields", line, fields.len());
            Prices::not_available()
        }
    }
}

pub fn segment_standard_column(column_text: &str, family: CategoryFamily) -> Vec<MealFragment> {
    let mut state = ColumnState::new(family);

    for raw in column_text.split('\n') {
        let line = normalize(raw);
        if line.is_empty() || is_co2_line(&line) {
            continue;
        }

        if is_standard_price_line(&line) {
            state.finish_meal(parse_standard_prices(&line));
            continue;
        }

        state.meal_lines.push(line);
    }

    state.fragments
}

/// The bistro layout: its first meal ("Pizza I") has no price in the column,
/// the price is printed once next to the row label and shared by all days.
pub struct BistroParser {
    canteen: Canteen,
    layout: ColumnLayout,
}

impl BistroParser {
    pub fn new(canteen: Canteen) -> Self {
        BistroParser {
            canteen,
            layout: canteen.column_layout(),
        }
    }

    pub fn with_layout(canteen: Canteen, layout: ColumnLayout) -> Self {
        BistroParser { canteen, layout }
    }
}

impl MensaParser for BistroParser {
    fn canteen(&self) -> Canteen {
        self.canteen
    }

    fn parse_plan(&self, page: &dyn PositionalPage) -> Result<ParsedWeek, ParseError> {
        let first_meal_prices = scrape_first_meal_prices(&page.text(None));
        parse_week(self.canteen, &self.layout, page, |text| {
            segment_bistro_column(text, &first_meal_prices)
        })
    }
}

fn is_bistro_price_line(line: &str) -> bool {
    line.contains('€')
}

/// Collects the price lines right below the "Pizza I" label.
pub fn scrape_first_meal_prices(page_text: &str) -> Prices {
    let price_lines: Vec<String> = page_text
        .split('\n')
        .map(normalize)
        .filter(|l| !l.is_empty())
        .skip_while(|l| !l.contains("Pizza I"))
        .skip(1)
        .take_while(|l| is_bistro_price_line(l))
        .collect();

    if price_lines.is_empty() {
        log::warn!("no shared price found below 'Pizza I'");
        return Prices::not_available();
    }
    parse_bistro_prices(&price_lines.join(" "))
}

/// "Stud. € 3,50 Bed. € 4,50 Gäste € 5,50"; the amounts sit at token 2, 5 and 8.
pub fn parse_bistro_prices(text: &str) -> Prices {
    // the pdf carries a stray code point next to the amounts, so allow-list
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ',' | '€' | ' '))
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    match (tokens.get(2), tokens.get(5), tokens.get(8)) {
        (Some(students), Some(employees), Some(others)) => Prices {
            students: format!("{} €", students),
            employees: format!("{} €", employees),
            others: format!("{} €", others),
        },
        _ => {
            log::warn!("bistro price '{}' has only {} tokens", text, tokens.len());
            Prices::not_available()
        }
    }
}

pub fn segment_bistro_column(column_text: &str, first_meal_prices: &Prices) -> Vec<MealFragment> {
    let lines: Vec<String> = column_text.split('\n').map(normalize).collect();

    // everything above the first dish is table header
    let Some(start) = lines.iter().position(|l| l.contains("Pizza")) else {
        log::warn!("bistro column without pizza line, skipping");
        return Vec::new();
    };

    let mut state = ColumnState::new(CategoryFamily::Bistro);
    let mut first_meal = true;

    for line in lines.into_iter().skip(start) {
        if line.is_empty() {
            continue;
        }

        if first_meal {
            // the allergen line is the last line of the first meal
            let closes = line.contains('(');
            state.meal_lines.push(line);
            if closes {
                state.finish_meal(first_meal_prices.clone());
                first_meal = false;
            }
            continue;
        }

        if is_bistro_price_line(&line) {
            // prices may wrap, keep collecting until a name line shows up
            state.price_lines.push(line);
            continue;
        }

        if !state.price_lines.is_empty() {
            let prices = parse_bistro_prices(&state.price_lines.join(" "));
            state.finish_meal(prices);
        }
        state.meal_lines.push(line);
    }

    // end of column closes the last meal
    if !state.price_lines.is_empty() {
        let prices = parse_bistro_prices(&state.price_lines.join(" "));
        state.finish_meal(prices);
    }

    state.fragments
}
