use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Langue d'affichage des noms de jours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
    Es,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            "es" => Ok(Self::Es),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

// Indexées par jour depuis dimanche (0 = dimanche).
const DAY_NAMES_EN: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const DAY_NAMES_FR: [&str; 7] = [
    "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
];
const DAY_NAMES_ES: [&str; 7] = [
    "domingo", "lunes", "martes", "miércoles", "jueves", "viernes", "sábado",
];

impl Locale {
    fn table(self) -> &'static [&'static str; 7] {
        match self {
            Self::En => &DAY_NAMES_EN,
            Self::Fr => &DAY_NAMES_FR,
            Self::Es => &DAY_NAMES_ES,
        }
    }
}

pub fn day_name(weekday: Weekday, locale: Locale) -> &'static str {
    locale.table()[weekday.num_days_from_sunday() as usize]
}

/// Lundi et dimanche de la semaine contenant `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// Nombre de jours de l'intervalle fermé `[start, end]` (0 si vide).
pub fn inclusive_len(start: NaiveDate, end: NaiveDate) -> u64 {
    let days = end.signed_duration_since(start).num_days();
    if days < 0 {
        0
    } else {
        days as u64 + 1
    }
}

/// Itère chaque date de `[start, end]`, bornes incluses.
pub fn each_day(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.succ_opt()).take_while(move |d| *d <= end)
}
