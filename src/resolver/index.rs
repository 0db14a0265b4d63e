use super::types::ResolveError;
use crate::model::{
    AssignmentId, ExceptionRule, ScheduleException, ShiftAssignment, ShiftTemplate, TemplateId,
    TimeInterval,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Tables de correspondance construites une fois par appel, puis en lecture seule.
#[derive(Debug)]
pub(super) struct ResolutionIndex<'a> {
    pub(super) assignments: Vec<&'a ShiftAssignment>,
    templates: HashMap<TemplateId, &'a ShiftTemplate>,
    day_schedules: HashMap<(TemplateId, u32), &'a TimeInterval>,
    dated: HashMap<(AssignmentId, NaiveDate), Vec<&'a ScheduleException>>,
    recurring: HashMap<AssignmentId, Vec<&'a ScheduleException>>,
}

impl<'a> ResolutionIndex<'a> {
    pub(super) fn build(
        assignments: Vec<&'a ShiftAssignment>,
        templates: &'a HashMap<TemplateId, ShiftTemplate>,
        exceptions: &'a [ScheduleException],
    ) -> Result<Self, ResolveError> {
        let mut by_id = HashMap::new();
        let mut day_schedules = HashMap::new();

        for assignment in &assignments {
            let template = templates.get(&assignment.template_id).ok_or(
                ResolveError::UnknownTemplate {
                    assignment: assignment.id,
                    template: assignment.template_id,
                },
            )?;
            if by_id.insert(template.id, template).is_some() {
                continue;
            }
            template.validate()?;
            for day in &template.days {
                day_schedules.insert((template.id, day.day_index), &day.interval);
            }
        }

        let mut dated: HashMap<_, Vec<_>> = HashMap::new();
        let mut recurring: HashMap<_, Vec<_>> = HashMap::new();
        for exception in exceptions.iter().filter(|e| e.active) {
            match exception.rule {
                ExceptionRule::OnDate { date } => dated
                    .entry((exception.assignment_id, date))
                    .or_default()
                    .push(exception),
                ExceptionRule::Recurring { .. } => recurring
                    .entry(exception.assignment_id)
                    .or_default()
                    .push(exception),
            }
        }

        Ok(Self {
            assignments,
            templates: by_id,
            day_schedules,
            dated,
            recurring,
        })
    }

    /// Gabarit indexé ; `None` si absent de la table fournie à la construction.
    pub(super) fn template(&self, id: TemplateId) -> Option<&'a ShiftTemplate> {
        self.templates.get(&id).copied()
    }

    pub(super) fn day_schedule(&self, template: TemplateId, day_index: u32) -> Option<&'a TimeInterval> {
        self.day_schedules.get(&(template, day_index)).copied()
    }

    /// Exceptions candidates (datées pour `date`, puis récurrentes) d'une affectation.
    pub(super) fn exceptions_for(
        &self,
        assignment: AssignmentId,
        date: NaiveDate,
    ) -> impl Iterator<Item = &'a ScheduleException> + '_ {
        let dated = self
            .dated
            .get(&(assignment, date))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let recurring = self
            .recurring
            .get(&assignment)
            .map(Vec::as_slice)
            .unwrap_or_default();
        dated.iter().chain(recurring.iter()).copied()
    }
}
