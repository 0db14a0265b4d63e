use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(
    /// Identifiant fort pour un employé
    EmployeeId
);
id_type!(
    /// Identifiant fort pour une affectation d'horaire
    AssignmentId
);
id_type!(
    /// Identifiant fort pour un gabarit d'horaire
    TemplateId
);
id_type!(
    /// Identifiant fort pour une plage horaire
    IntervalId
);
id_type!(
    /// Identifiant fort pour une exception
    ExceptionId
);

/// Erreur de validation d'une donnée d'entrée.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{what}: {reason}")]
pub struct ValidationError {
    pub what: String,
    pub reason: &'static str,
}

impl ValidationError {
    fn new(what: impl Into<String>, reason: &'static str) -> Self {
        Self {
            what: what.into(),
            reason,
        }
    }
}

/// Champs d'audit portés par les enregistrements (lecture seule ici).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditStamp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Employé, réduit à ce dont l'assembleur a besoin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub display_name: String,
}

/// Plage horaire : début, durée totale (pauses comprises) et temps net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub id: IntervalId,
    pub alias: String,
    pub start_time: NaiveTime,
    pub total_minutes: u32,
    pub net_minutes: u32,
}

impl TimeInterval {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.total_minutes == 0 {
            return Err(ValidationError::new(
                format!("interval {}", self.id),
                "total duration must be > 0",
            ));
        }
        if self.net_minutes > self.total_minutes {
            return Err(ValidationError::new(
                format!("interval {}", self.id),
                "net minutes cannot exceed total duration",
            ));
        }
        Ok(())
    }

    /// Début et fin concrets pour une date donnée (la fin peut tomber le lendemain).
    /// Saturée à `NaiveDateTime::MAX` en fin de calendrier.
    pub fn bounds_on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = NaiveDateTime::new(date, self.start_time);
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(self.total_minutes)))
            .unwrap_or(NaiveDateTime::MAX);
        (start, end)
    }
}

/// Lien borné dans le temps entre un employé et un gabarit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub template_id: TemplateId,
    pub start_date: NaiveDate,
    /// Inclusif ; `None` = sans fin.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub audit: AuditStamp,
}

impl ShiftAssignment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::new(
                    format!("assignment {}", self.id),
                    "end_date must not precede start_date",
                ));
            }
        }
        Ok(())
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }

    /// Vrai si l'affectation croise l'intervalle fermé `[start, end]`.
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date.map_or(true, |e| e >= start)
    }
}

/// Entrée d'un gabarit pour un indice de jour du cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day_index: u32,
    pub interval: TimeInterval,
}

/// Gabarit cyclique : les indices absents sont des jours de repos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub id: TemplateId,
    pub alias: String,
    pub cycle_length_days: u32,
    #[serde(default)]
    pub days: Vec<DaySchedule>,
}

impl ShiftTemplate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let what = || format!("template {}", self.id);
        if self.cycle_length_days == 0 {
            return Err(ValidationError::new(what(), "cycle_length_days must be > 0"));
        }
        // un gabarit hebdomadaire est indexé par jour de semaine
        let bound = if self.is_weekly() { 7 } else { self.cycle_length_days };
        let mut seen = HashSet::with_capacity(self.days.len());
        for day in &self.days {
            if day.day_index >= bound {
                return Err(ValidationError::new(what(), "day_index outside of cycle"));
            }
            if !seen.insert(day.day_index) {
                return Err(ValidationError::new(what(), "duplicate day_index"));
            }
            day.interval.validate()?;
        }
        Ok(())
    }

    /// Cycle hebdomadaire : aligné sur le calendrier plutôt que sur l'affectation.
    pub fn is_weekly(&self) -> bool {
        self.cycle_length_days <= 7
    }
}

/// Mode de correspondance d'une exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ExceptionRule {
    /// Une date calendaire précise.
    OnDate { date: NaiveDate },
    /// Un indice de jour récurrent dans le cycle.
    Recurring { day_index: u32 },
}

/// Surcharge ciblée de l'horaire issu du gabarit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    pub id: ExceptionId,
    pub assignment_id: AssignmentId,
    pub rule: ExceptionRule,
    pub interval: TimeInterval,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Fenêtre de validité bornant la récurrence.
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

fn default_active() -> bool {
    true
}

impl ScheduleException {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if until < from {
                return Err(ValidationError::new(
                    format!("exception {}", self.id),
                    "valid_until must not precede valid_from",
                ));
            }
        }
        self.interval.validate()
    }

    pub fn within_window(&self, date: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| from <= date)
            && self.valid_until.map_or(true, |until| until >= date)
    }

    /// Vrai si l'exception peut s'appliquer à au moins une date de `[start, end]`.
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match self.rule {
            ExceptionRule::OnDate { date } => start <= date && date <= end,
            ExceptionRule::Recurring { .. } => {
                self.valid_from.map_or(true, |from| from <= end)
                    && self.valid_until.map_or(true, |until| until >= start)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(total: u32, net: u32) -> TimeInterval {
        TimeInterval {
            id: IntervalId::new(1),
            alias: "jour".into(),
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            total_minutes: total,
            net_minutes: net,
        }
    }

    #[test]
    fn interval_rolls_over_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = interval(480, 420).bounds_on(date);
        assert_eq!(start.date(), date);
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn interval_end_saturates_at_calendar_end() {
        let (start, end) = interval(480, 420).bounds_on(NaiveDate::MAX);
        assert_eq!(start.date(), NaiveDate::MAX);
        assert_eq!(end, NaiveDateTime::MAX);
    }

    #[test]
    fn template_rejects_index_outside_cycle() {
        let template = ShiftTemplate {
            id: TemplateId::new(3),
            alias: "semaine".into(),
            cycle_length_days: 7,
            days: vec![DaySchedule {
                day_index: 7,
                interval: interval(60, 60),
            }],
        };
        let err = template.validate().unwrap_err();
        assert_eq!(err.reason, "day_index outside of cycle");
    }

    #[test]
    fn net_minutes_bounded_by_total() {
        assert!(interval(60, 90).validate().is_err());
        assert!(interval(60, 60).validate().is_ok());
    }

    #[test]
    fn open_ended_assignment_covers_future() {
        let a = ShiftAssignment {
            id: AssignmentId::new(1),
            employee_id: EmployeeId::new(1),
            template_id: TemplateId::new(1),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            end_date: None,
            remarks: None,
            audit: AuditStamp::default(),
        };
        assert!(!a.covers(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()));
        assert!(a.covers(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }
}
