//! Position d'une date dans le cycle d'un gabarit.
//!
//! Un cycle de 7 jours ou moins suit le calendrier (0 = dimanche) ; un cycle
//! plus long tourne à partir de la date d'ancrage de l'affectation.

use crate::model::{ShiftAssignment, ShiftTemplate};
use chrono::{Datelike, NaiveDate};

/// Indice du jour `date` dans le cycle de `template`, ancré sur l'affectation.
pub fn day_index(date: NaiveDate, assignment: &ShiftAssignment, template: &ShiftTemplate) -> u32 {
    day_index_anchored(date, assignment.start_date, template.cycle_length_days)
}

/// Variante bas niveau : `anchor` n'est utilisé que pour les cycles rotatifs.
///
/// Pour un cycle hebdomadaire l'indice est le jour de la semaine (0..=6),
/// même si le cycle déclaré est plus court ; sinon la valeur est dans
/// `[0, cycle_length_days)`.
pub fn day_index_anchored(date: NaiveDate, anchor: NaiveDate, cycle_length_days: u32) -> u32 {
    if cycle_length_days <= 7 {
        return date.weekday().num_days_from_sunday();
    }
    days_between(anchor, date).rem_euclid(i64::from(cycle_length_days)) as u32
}

fn days_between(start: NaiveDate, current: NaiveDate) -> i64 {
    current.signed_duration_since(start).num_days()
}
