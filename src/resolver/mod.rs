mod index;
mod select;
mod types;

pub use select::{select_assignment, Selection};
pub use types::{
    Anomaly, AnomalyKind, AssignmentSummary, DaySource, Resolution, ResolveError, ResolveOptions,
    ResolvedDay,
};

use crate::calendar::{day_name, each_day, inclusive_len, week_bounds};
use crate::cycle::day_index;
use crate::exception::{resolve_exception, CycleContext};
use crate::model::{
    EmployeeId, ScheduleException, ShiftAssignment, ShiftTemplate, TemplateId, TimeInterval,
};
use crate::source::{AssignmentSource, ExceptionSource, TemplateSource};
use chrono::{Datelike, Local, NaiveDate};
use index::ResolutionIndex;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// ScheduleResolver : résout l'horaire effectif d'un employé jour par jour.
///
/// Chaque appel lit les trois sources une seule fois (par lot), puis travaille
/// uniquement en mémoire. Aucun état n'est conservé entre deux appels.
pub struct ScheduleResolver<'s> {
    assignments: &'s dyn AssignmentSource,
    templates: &'s dyn TemplateSource,
    exceptions: &'s dyn ExceptionSource,
    opts: ResolveOptions,
}

impl<'s> ScheduleResolver<'s> {
    pub fn new(
        assignments: &'s dyn AssignmentSource,
        templates: &'s dyn TemplateSource,
        exceptions: &'s dyn ExceptionSource,
    ) -> Self {
        Self {
            assignments,
            templates,
            exceptions,
            opts: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: ResolveOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn resolve(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ResolvedDay>, ResolveError> {
        self.resolve_with_report(employee, start, end)
            .map(|resolution| resolution.days)
    }

    /// Comme [`resolve`](Self::resolve), en conservant anomalies et résumé.
    pub fn resolve_with_report(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Resolution, ResolveError> {
        check_range(start, end, self.opts)?;

        let assignments = self.assignments.assignments(employee, start, end)?;
        let template_ids: BTreeSet<TemplateId> =
            assignments.iter().map(|a| a.template_id).collect();
        let templates = if template_ids.is_empty() {
            HashMap::new()
        } else {
            self.templates.templates(&template_ids)?
        };
        let assignment_ids = assignments.iter().map(|a| a.id).collect::<BTreeSet<_>>();
        let exceptions = if assignment_ids.is_empty() {
            Vec::new()
        } else {
            self.exceptions.exceptions(&assignment_ids, start, end)?
        };
        debug!(
            employee = %employee,
            assignments = assignments.len(),
            templates = templates.len(),
            exceptions = exceptions.len(),
            "batched schedule sources"
        );

        resolve_days(
            employee,
            start,
            end,
            &assignments,
            &templates,
            &exceptions,
            self.opts,
        )
    }

    /// Semaine (lundi..dimanche) contenant `day`.
    pub fn resolve_week_of(
        &self,
        employee: EmployeeId,
        day: NaiveDate,
    ) -> Result<Vec<ResolvedDay>, ResolveError> {
        let (monday, sunday) = week_bounds(day);
        self.resolve(employee, monday, sunday)
    }

    /// Semaine courante selon l'horloge locale.
    pub fn resolve_current_week(&self, employee: EmployeeId) -> Result<Vec<ResolvedDay>, ResolveError> {
        self.resolve_week_of(employee, Local::now().date_naive())
    }
}

fn check_range(start: NaiveDate, end: NaiveDate, opts: ResolveOptions) -> Result<(), ResolveError> {
    if start > end {
        return Err(ResolveError::InvalidRange { start, end });
    }
    if let Some(max) = opts.max_range_days {
        let days = inclusive_len(start, end);
        if days > u64::from(max) {
            return Err(ResolveError::RangeTooLarge { days, max });
        }
    }
    Ok(())
}

/// Cœur pur de la résolution : même entrée, même sortie.
///
/// Les affectations d'autres employés ou hors intervalle sont ignorées ;
/// l'ordre des collections d'entrée n'influe pas sur le résultat.
pub fn resolve_days(
    employee: EmployeeId,
    start: NaiveDate,
    end: NaiveDate,
    assignments: &[ShiftAssignment],
    templates: &HashMap<TemplateId, ShiftTemplate>,
    exceptions: &[ScheduleException],
    opts: ResolveOptions,
) -> Result<Resolution, ResolveError> {
    check_range(start, end, opts)?;

    let relevant: Vec<&ShiftAssignment> = assignments
        .iter()
        .filter(|a| a.employee_id == employee && a.intersects(start, end))
        .collect();
    let index = ResolutionIndex::build(relevant, templates, exceptions)?;

    let mut days = Vec::with_capacity(inclusive_len(start, end) as usize);
    let mut anomalies = Vec::new();

    for date in each_day(start, end) {
        let name = day_name(date.weekday(), opts.locale);
        let Some(selection) = select_assignment(date, index.assignments.iter().copied()) else {
            days.push(unassigned(date, name));
            continue;
        };
        let assignment = selection.assignment;
        if !selection.shadowed.is_empty() {
            warn!(
                employee = %employee,
                %date,
                kept = %assignment.id,
                shadowed = ?selection.shadowed,
                "overlapping assignments"
            );
            anomalies.push(Anomaly {
                date,
                kind: AnomalyKind::OverlappingAssignment {
                    kept: assignment.id,
                    shadowed: selection.shadowed,
                },
            });
        }

        let template = index
            .template(assignment.template_id)
            .ok_or(ResolveError::UnknownTemplate {
                assignment: assignment.id,
                template: assignment.template_id,
            })?;

        let ctx = CycleContext {
            cycle_length_days: template.cycle_length_days,
            assignment_start: assignment.start_date,
        };
        if let Some(hit) = resolve_exception(date, index.exceptions_for(assignment.id, date), ctx) {
            if hit.is_ambiguous() {
                warn!(
                    employee = %employee,
                    %date,
                    kept = %hit.exception.id,
                    shadowed = ?hit.shadowed,
                    "ambiguous schedule exceptions"
                );
                anomalies.push(Anomaly {
                    date,
                    kind: AnomalyKind::AmbiguousException {
                        kept: hit.exception.id,
                        shadowed: hit.shadowed.clone(),
                    },
                });
            }
            let mut day = working(date, name, assignment, &hit.exception.interval);
            day.source = DaySource::Exception;
            day.exception_id = Some(hit.exception.id);
            days.push(day);
            continue;
        }

        let index_in_cycle = day_index(date, assignment, template);
        let day = match index.day_schedule(template.id, index_in_cycle) {
            Some(interval) => working(date, name, assignment, interval),
            None => ResolvedDay {
                source: DaySource::RestDay,
                assignment_id: Some(assignment.id),
                ..unassigned(date, name)
            },
        };
        days.push(ResolvedDay {
            day_index: Some(index_in_cycle),
            ..day
        });
    }

    let representative = select_assignment(start, index.assignments.iter().copied()).and_then(|s| {
        index.template(s.assignment.template_id).map(|t| AssignmentSummary {
            assignment_id: s.assignment.id,
            template_id: t.id,
            template_alias: t.alias.clone(),
            cycle_length_days: t.cycle_length_days,
            start_date: s.assignment.start_date,
            end_date: s.assignment.end_date,
        })
    });

    Ok(Resolution {
        days,
        anomalies,
        representative,
    })
}

fn unassigned(date: NaiveDate, day_name: &'static str) -> ResolvedDay {
    ResolvedDay {
        date,
        day_name,
        source: DaySource::Unassigned,
        assignment_id: None,
        day_index: None,
        alias: None,
        in_time: None,
        out_time: None,
        net_minutes: None,
        interval_id: None,
        exception_id: None,
    }
}

fn working(
    date: NaiveDate,
    day_name: &'static str,
    assignment: &ShiftAssignment,
    interval: &TimeInterval,
) -> ResolvedDay {
    let (in_time, out_time) = interval.bounds_on(date);
    ResolvedDay {
        date,
        day_name,
        source: DaySource::ScheduledWork,
        assignment_id: Some(assignment.id),
        day_index: None,
        alias: Some(interval.alias.clone()),
        in_time: Some(in_time),
        out_time: Some(out_time),
        net_minutes: Some(interval.net_minutes),
        interval_id: Some(interval.id),
        exception_id: None,
    }
}
