use crate::model::EmployeeId;
use crate::resolver::{
    Anomaly, AssignmentSummary, Resolution, ResolveError, ResolvedDay, ScheduleResolver,
};
use crate::source::Snapshot;
use chrono::NaiveDate;
use serde::Serialize;

/// Annuaire des employés (nom d'affichage uniquement).
pub trait EmployeeDirectory {
    fn display_name(&self, employee: EmployeeId) -> anyhow::Result<Option<String>>;
}

impl EmployeeDirectory for Snapshot {
    fn display_name(&self, employee: EmployeeId) -> anyhow::Result<Option<String>> {
        Ok(self.find_employee(employee).map(|e| e.display_name.clone()))
    }
}

/// Horaire résolu prêt à être présenté.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub employee_id: EmployeeId,
    pub display_name: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub assignment: Option<AssignmentSummary>,
    pub days: Vec<ResolvedDay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
}

impl ScheduleView {
    pub fn working_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_working()).count()
    }

    pub fn net_minutes(&self) -> u64 {
        self.days
            .iter()
            .filter_map(|d| d.net_minutes)
            .map(u64::from)
            .sum()
    }
}

pub fn assemble(
    employee: EmployeeId,
    display_name: Option<String>,
    start: NaiveDate,
    end: NaiveDate,
    resolution: Resolution,
) -> ScheduleView {
    ScheduleView {
        employee_id: employee,
        display_name,
        start,
        end,
        assignment: resolution.representative,
        days: resolution.days,
        anomalies: resolution.anomalies,
    }
}

/// Résout puis assemble la vue d'un employé.
pub fn resolve_view(
    resolver: &ScheduleResolver<'_>,
    directory: &dyn EmployeeDirectory,
    employee: EmployeeId,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ScheduleView, ResolveError> {
    let resolution = resolver.resolve_with_report(employee, start, end)?;
    let display_name = directory.display_name(employee)?;
    Ok(assemble(employee, display_name, start, end, resolution))
}
