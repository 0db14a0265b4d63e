use crate::calendar::Locale;
use crate::model::{AssignmentId, ExceptionId, IntervalId, TemplateId, ValidationError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// Options de résolution
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub locale: Locale,
    /// Taille maximale de l'intervalle demandé, en jours (bornes incluses).
    /// `None` = pas de limite.
    pub max_range_days: Option<u32>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            max_range_days: None,
        }
    }
}

/// Origine d'un jour résolu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySource {
    Exception,
    ScheduledWork,
    RestDay,
    Unassigned,
}

impl DaySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exception => "exception",
            Self::ScheduledWork => "scheduled_work",
            Self::RestDay => "rest_day",
            Self::Unassigned => "unassigned",
        }
    }
}

/// Horaire effectif d'une date (calculé à chaque appel, jamais persisté).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub source: DaySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<AssignmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_id: Option<IntervalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_id: Option<ExceptionId>,
}

impl ResolvedDay {
    pub fn is_working(&self) -> bool {
        matches!(self.source, DaySource::Exception | DaySource::ScheduledWork)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnomalyKind {
    /// Plusieurs exceptions actives du même mode pour une date.
    AmbiguousException {
        kept: ExceptionId,
        shadowed: Vec<ExceptionId>,
    },
    /// Plusieurs affectations couvrent la même date.
    OverlappingAssignment {
        kept: AssignmentId,
        shadowed: Vec<AssignmentId>,
    },
}

/// Condition récupérée localement : signalée, jamais fatale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: AnomalyKind,
}

/// Résumé de l'affectation représentative d'un intervalle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentSummary {
    pub assignment_id: AssignmentId,
    pub template_id: TemplateId,
    pub template_alias: String,
    pub cycle_length_days: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Résultat complet d'une résolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub days: Vec<ResolvedDay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
    pub representative: Option<AssignmentSummary>,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("date range of {days} days exceeds the limit of {max} days")]
    RangeTooLarge { days: u64, max: u32 },
    #[error("assignment {assignment} references unknown template {template}")]
    UnknownTemplate {
        assignment: AssignmentId,
        template: TemplateId,
    },
    #[error("invalid template: {0}")]
    InvalidTemplate(#[from] ValidationError),
    #[error("source read failed: {0:#}")]
    Source(#[from] anyhow::Error),
}

impl ResolveError {
    /// Erreur imputable à la requête (et non aux données).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRange { .. } | Self::RangeTooLarge { .. })
    }
}
