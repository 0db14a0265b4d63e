use crate::cycle::day_index_anchored;
use crate::model::{ExceptionId, ExceptionRule, ScheduleException};
use chrono::NaiveDate;

/// Contexte de cycle nécessaire aux exceptions récurrentes.
#[derive(Debug, Clone, Copy)]
pub struct CycleContext {
    pub cycle_length_days: u32,
    /// Ancre par défaut quand la fenêtre de validité n'a pas de début.
    pub assignment_start: NaiveDate,
}

/// Exception retenue pour une date, avec les concurrentes du même mode écartées.
#[derive(Debug, Clone)]
pub struct ExceptionHit<'a> {
    pub exception: &'a ScheduleException,
    /// Non vide = anomalie (plusieurs exceptions actives du même mode).
    pub shadowed: Vec<ExceptionId>,
}

impl<'a> ExceptionHit<'a> {
    pub fn is_ambiguous(&self) -> bool {
        !self.shadowed.is_empty()
    }
}

/// Vrai si `exception` s'applique à `date` (hors statut actif).
pub fn matches(exception: &ScheduleException, date: NaiveDate, ctx: CycleContext) -> bool {
    match exception.rule {
        ExceptionRule::OnDate { date: on } => on == date,
        ExceptionRule::Recurring { day_index } => {
            if !exception.within_window(date) {
                return false;
            }
            let anchor = exception.valid_from.unwrap_or(ctx.assignment_start);
            day_index_anchored(date, anchor, ctx.cycle_length_days) == day_index
        }
    }
}

/// Choisit l'exception applicable à `date` parmi `candidates`.
///
/// Une exception datée l'emporte sur une exception récurrente. À mode égal,
/// le plus petit identifiant gagne et les autres sont rapportés dans
/// [`ExceptionHit::shadowed`]. Les exceptions inactives sont ignorées.
pub fn resolve_exception<'a, I>(
    date: NaiveDate,
    candidates: I,
    ctx: CycleContext,
) -> Option<ExceptionHit<'a>>
where
    I: IntoIterator<Item = &'a ScheduleException>,
{
    let mut dated: Vec<&'a ScheduleException> = Vec::new();
    let mut recurring: Vec<&'a ScheduleException> = Vec::new();

    for exception in candidates {
        if !exception.active || !matches(exception, date, ctx) {
            continue;
        }
        match exception.rule {
            ExceptionRule::OnDate { .. } => dated.push(exception),
            ExceptionRule::Recurring { .. } => recurring.push(exception),
        }
    }

    let mut winners = if dated.is_empty() { recurring } else { dated };
    if winners.is_empty() {
        return None;
    }
    winners.sort_by_key(|e| e.id);
    winners.dedup_by_key(|e| e.id);
    let exception = winners[0];
    let shadowed = winners[1..].iter().map(|e| e.id).collect();
    Some(ExceptionHit {
        exception,
        shadowed,
    })
}
