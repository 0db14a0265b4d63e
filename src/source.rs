//! Sources de données en lecture seule consultées par le résolveur.
//!
//! Chaque méthode est appelée au plus une fois par résolution et couvre tout
//! l'intervalle demandé.

use crate::model::{
    AssignmentId, Employee, EmployeeId, ScheduleException, ShiftAssignment, ShiftTemplate,
    TemplateId,
};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub trait AssignmentSource: Send + Sync {
    /// Affectations de `employee` croisant `[start, end]`.
    fn assignments(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ShiftAssignment>>;
}

pub trait TemplateSource: Send + Sync {
    /// Gabarits (avec leurs jours) pour les identifiants demandés ; les
    /// identifiants inconnus sont simplement absents du résultat.
    fn templates(
        &self,
        ids: &BTreeSet<TemplateId>,
    ) -> anyhow::Result<HashMap<TemplateId, ShiftTemplate>>;
}

pub trait ExceptionSource: Send + Sync {
    /// Exceptions actives des affectations données, pertinentes pour `[start, end]`.
    fn exceptions(
        &self,
        assignments: &BTreeSet<AssignmentId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleException>>;
}

/// Instantané complet en mémoire, sérialisable en JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub assignments: Vec<ShiftAssignment>,
    #[serde(default)]
    pub templates: Vec<ShiftTemplate>,
    #[serde(default)]
    pub exceptions: Vec<ScheduleException>,
}

impl Snapshot {
    /// Valide chaque enregistrement et les identifiants en double.
    pub fn validate(&self) -> anyhow::Result<()> {
        for a in &self.assignments {
            a.validate()?;
        }
        for t in &self.templates {
            t.validate()?;
        }
        for e in &self.exceptions {
            e.validate()?;
        }
        ensure_unique("assignment", self.assignments.iter().map(|a| a.id.get()))?;
        ensure_unique("template", self.templates.iter().map(|t| t.id.get()))?;
        ensure_unique("exception", self.exceptions.iter().map(|e| e.id.get()))?;
        Ok(())
    }

    pub fn find_assignment(&self, id: AssignmentId) -> Option<&ShiftAssignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn find_template(&self, id: TemplateId) -> Option<&ShiftTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn find_employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// Ajoute ou remplace (même identifiant) des affectations.
    pub fn upsert_assignments(&mut self, incoming: Vec<ShiftAssignment>) {
        for a in incoming {
            match self.assignments.iter_mut().find(|x| x.id == a.id) {
                Some(slot) => *slot = a,
                None => self.assignments.push(a),
            }
        }
    }

    /// Ajoute ou remplace (même identifiant) des exceptions.
    pub fn upsert_exceptions(&mut self, incoming: Vec<ScheduleException>) {
        for e in incoming {
            match self.exceptions.iter_mut().find(|x| x.id == e.id) {
                Some(slot) => *slot = e,
                None => self.exceptions.push(e),
            }
        }
    }
}

fn ensure_unique(kind: &str, ids: impl Iterator<Item = i64>) -> anyhow::Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            anyhow::bail!("duplicate {kind} id {id}");
        }
    }
    Ok(())
}

impl AssignmentSource for Snapshot {
    fn assignments(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ShiftAssignment>> {
        Ok(self
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee && a.intersects(start, end))
            .cloned()
            .collect())
    }
}

impl TemplateSource for Snapshot {
    fn templates(
        &self,
        ids: &BTreeSet<TemplateId>,
    ) -> anyhow::Result<HashMap<TemplateId, ShiftTemplate>> {
        Ok(self
            .templates
            .iter()
            .filter(|t| ids.contains(&t.id))
            .map(|t| (t.id, t.clone()))
            .collect())
    }
}

impl ExceptionSource for Snapshot {
    fn exceptions(
        &self,
        assignments: &BTreeSet<AssignmentId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleException>> {
        Ok(self
            .exceptions
            .iter()
            .filter(|e| e.active && assignments.contains(&e.assignment_id))
            .filter(|e| e.intersects(start, end))
            .cloned()
            .collect())
    }
}

/// Charge un instantané depuis une chaîne JSON, puis le valide.
pub fn snapshot_from_json(data: &[u8]) -> anyhow::Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_slice(data).context("parsing snapshot JSON")?;
    snapshot.validate()?;
    Ok(snapshot)
}
