use crate::assembler::ScheduleView;
use crate::model::{
    AssignmentId, AuditStamp, EmployeeId, ExceptionId, ExceptionRule, IntervalId,
    ScheduleException, ShiftAssignment, TemplateId, TimeInterval,
};
use crate::resolver::ResolvedDay;
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Import d'affectations: header `id,employee_id,template_id,start_date,end_date,remarks`
pub fn import_assignments_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftAssignment>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let assignment = parse_assignment(&rec)
            .with_context(|| format!("invalid assignment row {}", line + 1))?;
        assignment.validate()?;
        out.push(assignment);
    }
    Ok(out)
}

fn parse_assignment(rec: &StringRecord) -> anyhow::Result<ShiftAssignment> {
    Ok(ShiftAssignment {
        id: AssignmentId::new(parse_i64(field(rec, 0, "id")?)?),
        employee_id: EmployeeId::new(parse_i64(field(rec, 1, "employee_id")?)?),
        template_id: TemplateId::new(parse_i64(field(rec, 2, "template_id")?)?),
        start_date: parse_date(field(rec, 3, "start_date")?)?,
        end_date: optional(rec, 4).map(parse_date).transpose()?,
        remarks: optional(rec, 5).map(str::to_owned),
        audit: AuditStamp::default(),
    })
}

/// Import d'exceptions: header
/// `id,assignment_id,exception_date,day_index,valid_from,valid_until,interval_id,alias,start_time,total_minutes,net_minutes,active,remarks`
///
/// Exactement une des colonnes `exception_date` / `day_index` doit être renseignée.
pub fn import_exceptions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ScheduleException>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let exception = parse_exception(&rec)
            .with_context(|| format!("invalid exception row {}", line + 1))?;
        exception.validate()?;
        out.push(exception);
    }
    Ok(out)
}

fn parse_exception(rec: &StringRecord) -> anyhow::Result<ScheduleException> {
    let rule = match (optional(rec, 2), optional(rec, 3)) {
        (Some(date), None) => ExceptionRule::OnDate {
            date: parse_date(date)?,
        },
        (None, Some(idx)) => ExceptionRule::Recurring {
            day_index: idx.parse().with_context(|| format!("invalid day_index: {idx}"))?,
        },
        (Some(_), Some(_)) => bail!("exception_date and day_index are mutually exclusive"),
        (None, None) => bail!("one of exception_date or day_index is required"),
    };
    let start_raw = field(rec, 8, "start_time")?;
    let start_time = NaiveTime::parse_from_str(start_raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(start_raw, "%H:%M:%S"))
        .with_context(|| format!("invalid start_time: {start_raw}"))?;
    Ok(ScheduleException {
        id: ExceptionId::new(parse_i64(field(rec, 0, "id")?)?),
        assignment_id: AssignmentId::new(parse_i64(field(rec, 1, "assignment_id")?)?),
        rule,
        interval: TimeInterval {
            id: IntervalId::new(parse_i64(field(rec, 6, "interval_id")?)?),
            alias: field(rec, 7, "alias")?.to_owned(),
            start_time,
            total_minutes: parse_minutes(field(rec, 9, "total_minutes")?)?,
            net_minutes: parse_minutes(field(rec, 10, "net_minutes")?)?,
        },
        active: optional(rec, 11).map(parse_bool).transpose()?.unwrap_or(true),
        valid_from: optional(rec, 4).map(parse_date).transpose()?,
        valid_until: optional(rec, 5).map(parse_date).transpose()?,
        remarks: optional(rec, 12).map(str::to_owned),
    })
}

fn field<'r>(rec: &'r StringRecord, idx: usize, name: &str) -> anyhow::Result<&'r str> {
    match optional(rec, idx) {
        Some(v) => Ok(v),
        None => bail!("missing {name}"),
    }
}

fn optional(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_i64(s: &str) -> anyhow::Result<i64> {
    s.parse().with_context(|| format!("invalid integer: {s}"))
}

fn parse_minutes(s: &str) -> anyhow::Result<u32> {
    s.parse().with_context(|| format!("invalid minutes: {s}"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" | "si" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean, got {s}"),
    }
}

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M";

/// Écrit les jours résolus en CSV:
/// header `date,day_name,source,alias,in_time,out_time,net_minutes,interval_id,exception_id`
pub fn write_days_csv<W: std::io::Write>(writer: W, days: &[ResolvedDay]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record([
        "date",
        "day_name",
        "source",
        "alias",
        "in_time",
        "out_time",
        "net_minutes",
        "interval_id",
        "exception_id",
    ])?;
    let mut net_buf = itoa::Buffer::new();
    let mut interval_buf = itoa::Buffer::new();
    let mut exception_buf = itoa::Buffer::new();
    for day in days {
        let date = day.date.to_string();
        let in_time = format_datetime(day.in_time);
        let out_time = format_datetime(day.out_time);
        let net = match day.net_minutes {
            Some(m) => net_buf.format(m),
            None => "",
        };
        let interval = match day.interval_id {
            Some(id) => interval_buf.format(id.get()),
            None => "",
        };
        let exception = match day.exception_id {
            Some(id) => exception_buf.format(id.get()),
            None => "",
        };
        w.write_record([
            date.as_str(),
            day.day_name,
            day.source.as_str(),
            day.alias.as_deref().unwrap_or(""),
            in_time.as_str(),
            out_time.as_str(),
            net,
            interval,
            exception,
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn format_datetime(dt: Option<NaiveDateTime>) -> String {
    dt.map(|d| d.format(DATETIME_FMT).to_string())
        .unwrap_or_default()
}

/// Export CSV des jours résolus vers un fichier.
pub fn export_days_csv<P: AsRef<Path>>(path: P, days: &[ResolvedDay]) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_days_csv(file, days)
}

/// Export JSON de la vue assemblée (jolie mise en forme)
pub fn export_view_json<P: AsRef<Path>>(path: P, view: &ScheduleView) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(view)?;
    fs::write(path, s)?;
    Ok(())
}

/// Rendu texte compact, une ligne par jour.
pub fn render_days_table(days: &[ResolvedDay]) -> String {
    let mut out = String::new();
    for day in days {
        let mut line = format!(
            "{} {:<9} {:<14}",
            day.date,
            day.day_name,
            day.source.as_str()
        );
        if let (Some(start), Some(end)) = (day.in_time, day.out_time) {
            let _ = write!(line, " {}-{}", start.format("%H:%M"), end.format("%H:%M"));
            if end.date() > day.date {
                line.push_str("+1");
            }
        }
        if let Some(alias) = &day.alias {
            let _ = write!(line, " {alias}");
        }
        if let Some(id) = day.exception_id {
            let _ = write!(line, " #{id}");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
