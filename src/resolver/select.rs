use crate::model::{AssignmentId, ShiftAssignment};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub assignment: &'a ShiftAssignment,
    pub shadowed: Vec<AssignmentId>,
}

/// Affectation en vigueur à `date` : la plus récente (date de début) gagne,
/// puis l'identifiant le plus élevé.
pub fn select_assignment<'a, I>(date: NaiveDate, assignments: I) -> Option<Selection<'a>>
where
    I: IntoIterator<Item = &'a ShiftAssignment>,
{
    let mut covering: Vec<&'a ShiftAssignment> =
        assignments.into_iter().filter(|a| a.covers(date)).collect();
    if covering.is_empty() {
        return None;
    }
    covering.sort_by(|a, b| (b.start_date, b.id).cmp(&(a.start_date, a.id)));
    covering.dedup_by_key(|a| a.id);

    let assignment = covering[0];
    let mut shadowed: Vec<AssignmentId> = covering[1..].iter().map(|a| a.id).collect();
    shadowed.sort();
    Some(Selection {
        assignment,
        shadowed,
    })
}
