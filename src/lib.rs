#![forbid(unsafe_code)]
//! Pointage : résolution de l'horaire effectif des employés.
//!
//! - Gabarits cycliques hebdomadaires ou rotatifs.
//! - Exceptions datées ou récurrentes, avec priorité déterministe.
//! - Lectures par lot, calcul pur en mémoire, aucun cache.
//! - Instantanés JSON, import/export CSV.

pub mod assembler;
pub mod calendar;
pub mod cycle;
pub mod exception;
pub mod io;
pub mod model;
pub mod resolver;
pub mod source;
pub mod storage;

pub use assembler::{assemble, resolve_view, EmployeeDirectory, ScheduleView};
pub use calendar::{day_name, week_bounds, Locale};
pub use cycle::{day_index, day_index_anchored};
pub use exception::{resolve_exception, CycleContext, ExceptionHit};
pub use model::{
    AssignmentId, AuditStamp, DaySchedule, Employee, EmployeeId, ExceptionId, ExceptionRule,
    IntervalId, ScheduleException, ShiftAssignment, ShiftTemplate, TemplateId, TimeInterval,
    ValidationError,
};
pub use resolver::{
    resolve_days, Anomaly, AnomalyKind, AssignmentSummary, DaySource, Resolution, ResolveError,
    ResolveOptions, ResolvedDay, ScheduleResolver,
};
pub use source::{AssignmentSource, ExceptionSource, Snapshot, TemplateSource};
pub use storage::{JsonSnapshotStore, SnapshotStore};
