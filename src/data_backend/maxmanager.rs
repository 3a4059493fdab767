use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use std::time::Instant;

use crate::constants::maxmanager_url;
use crate::data_types::{Canteen, Meal};
use crate::date_range::monday_of;
use crate::errors::FetchError;

use super::html_parser;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn as_param(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }
}

/// Form data of a `make_spl` request, the plan of one location and day.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxManagerRequest {
    pub loc_id: u8,
    pub date: NaiveDate,
    pub lang: Language,
}

impl MaxManagerRequest {
    pub fn new(canteen: Canteen, date: NaiveDate, lang: Language) -> Result<Self, FetchError> {
        let loc_id = canteen
            .maxmanager_id()
            .ok_or_else(|| FetchError::NoMaxManagerSource(canteen.display_name().to_string()))?;

        Ok(MaxManagerRequest {
            loc_id,
            date,
            lang,
        })
    }

    pub fn form(&self) -> [(&'static str, String); 6] {
        let this_week = monday_of(self.date);
        let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();

        [
            ("func", "make_spl".to_string()),
            ("locId", self.loc_id.to_string()),
            ("date", fmt(self.date)),
            ("lang", self.lang.as_param().to_string()),
            ("startThisWeek", fmt(this_week)),
            ("startNextWeek", fmt(this_week + Duration::weeks(1))),
        ]
    }
}

/// Raw markup for one location and day.
pub async fn get_day_html(
    client: &reqwest::Client,
    request: &MaxManagerRequest,
) -> Result<String, FetchError> {
    let now = Instant::now();
    let html = client
        .post(maxmanager_url())
        .form(&request.form())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    log::debug!(
        "fetching locId {} on {}: {:.2?}",
        request.loc_id,
        request.date,
        now.elapsed()
    );

    Ok(html)
}

/// Fetches and parses the meals of one canteen and day.
pub async fn get_day_meals(
    client: &reqwest::Client,
    canteen: Canteen,
    date: NaiveDate,
    lang: Language,
) -> Result<Vec<Meal>, FetchError> {
    let request = MaxManagerRequest::new(canteen, date, lang)?;
    let html = get_day_html(client, &request).await?;
    Ok(html_parser::parse_plan(&html, date, canteen)?)
}
