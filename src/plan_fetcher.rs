use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Instant;
use tokio::task::JoinSet;

use crate::assembler::assemble_plan;
use crate::constants::maxmanager_url;
use crate::data_backend::maxmanager::{get_day_meals, Language};
use crate::data_types::{Canteen, Meal, Plan};
use crate::date_range::{monday_of, week_dates_with_lookahead, week_label};

pub type DayResult = (Canteen, NaiveDate, Vec<Meal>);

/// Fetches `weeks` weeks of plans starting with the week of `reference_date`.
///
/// Every (canteen, day) pair is fetched in its own task. A day whose fetch or
/// parse fails is logged and ends up closed, the other days are unaffected.
pub async fn fetch_plans(
    client: &reqwest::Client,
    canteens: &[Canteen],
    reference_date: NaiveDate,
    weeks: u32,
    lang: Language,
) -> Vec<Plan> {
    let now = Instant::now();
    let dates = week_dates_with_lookahead(reference_date, weeks);

    let canteens: Vec<Canteen> = canteens
        .iter()
        .copied()
        .filter(|c| {
            if c.maxmanager_id().is_none() {
                log::warn!("{} only publishes pdf plans, skipping", c.display_name());
            }
            c.maxmanager_id().is_some()
        })
        .collect();

    let mut tasks = JoinSet::new();
    for &canteen in &canteens {
        for &date in &dates {
            // reqwest clients share their pool on clone
            let client = client.clone();
            tasks.spawn(async move {
                match get_day_meals(&client, canteen, date, lang).await {
                    Ok(meals) => (canteen, date, meals),
                    Err(e) => {
                        log::error!("{} on {}: {}", canteen.display_name(), date, e);
                        (canteen, date, Vec::new())
                    }
                }
            });
        }
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(day) => results.push(day),
            Err(e) => log::error!("day task failed: {}", e),
        }
    }
    log::debug!("fetching {} days: {:.2?}", results.len(), now.elapsed());

    group_into_plans(&canteens, &dates, results, maxmanager_url())
}

/// Groups day results into one plan per canteen and week. Requested days
/// without a result are closed.
pub fn group_into_plans(
    canteens: &[Canteen],
    dates: &[NaiveDate],
    results: Vec<DayResult>,
    source: &str,
) -> Vec<Plan> {
    let mut weeks: BTreeMap<(Canteen, NaiveDate), BTreeMap<NaiveDate, Option<Vec<Meal>>>> =
        BTreeMap::new();

    for &canteen in canteens {
        for &date in dates {
            weeks
                .entry((canteen, monday_of(date)))
                .or_default()
                .insert(date, None);
        }
    }

    for (canteen, date, meals) in results {
        match weeks.get_mut(&(canteen, monday_of(date))) {
            Some(days) => {
                days.insert(date, Some(meals));
            }
            None => log::warn!("unrequested day {} for {}", date, canteen.display_name()),
        }
    }

    weeks
        .into_iter()
        .map(|((canteen, monday), days)| assemble_plan(canteen, &week_label(monday), source, days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::MealFragment;
    use crate::data_types::{MealCategory, Prices, StandardCategory};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal(canteen: Canteen, date: NaiveDate) -> Meal {
        MealFragment::new(
            "Gemüselasagne".to_string(),
            MealCategory::Standard(StandardCategory::PrimaKlima),
            Prices::new("3,50 €", "5,20 €", "7,00 €"),
        )
        .finalize(date, canteen)
        .unwrap()
    }

    #[test]
    fn plans_per_canteen_and_week() {
        let dates = week_dates_with_lookahead(ymd(2024, 5, 22), 2);
        let canteens = [Canteen::UlUniSued, Canteen::UlUniWest];
        let tue = ymd(2024, 5, 21);
        let next_mon = ymd(2024, 5, 27);

        let results = vec![
            (Canteen::UlUniSued, tue, vec![meal(Canteen::UlUniSued, tue)]),
            (
                Canteen::UlUniWest,
                next_mon,
                vec![meal(Canteen::UlUniWest, next_mon)],
            ),
            // failed days arrive as empty lists
            (Canteen::UlUniWest, tue, vec![]),
        ];
        let plans = group_into_plans(&canteens, &dates, results, "test");

        assert_eq!(plans.len(), 4);
        let labels: Vec<(Canteen, &str)> = plans
            .iter()
            .map(|p| (p.canteen, p.week.as_str()))
            .collect();
        assert_eq!(
            labels,
            [
                (Canteen::UlUniSued, "KW21"),
                (Canteen::UlUniSued, "KW22"),
                (Canteen::UlUniWest, "KW21"),
                (Canteen::UlUniWest, "KW22"),
            ]
        );

        let sued = &plans[0];
        assert_eq!(sued.opened_days.len(), 5);
        assert!(sued.is_open(tue));
        assert!(!sued.is_open(ymd(2024, 5, 20)));

        assert!(!plans[2].is_open(tue));
        assert!(plans[3].is_open(next_mon));
        assert_eq!(plans[3].meals.len(), 1);
    }

    #[test]
    fn unrequested_results_are_ignored() {
        let dates = week_dates_with_lookahead(ymd(2024, 5, 22), 1);
        let far = ymd(2024, 7, 1);
        let plans = group_into_plans(
            &[Canteen::UlUniSued],
            &dates,
            vec![(Canteen::UlUniSued, far, vec![meal(Canteen::UlUniSued, far)])],
            "test",
        );
        assert_eq!(plans.len(), 1);
        assert!(plans[0].meals.is_empty());
    }

    #[tokio::test]
    async fn pdf_only_canteens_are_skipped() {
        let client = reqwest::Client::new();
        let plans = fetch_plans(
            &client,
            &[Canteen::UlUniNord],
            ymd(2024, 5, 22),
            2,
            Language::De,
        )
        .await;
        assert!(plans.is_empty());
    }
}
