use anyhow::Context;
use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    NewService, NewVisit, Service, User, Visit, VisitKind, Weekday, WorkHour, WorkHourBlock,
};

/// Fixed-width UTC timestamps, so text ordering matches time ordering.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
const TIME_FORMAT: &str = "%H:%M:%S";

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid stored timestamp: {s}"))?;
    Ok(dt.with_timezone(&Utc))
}

// ── Appointments & Jobs ──

const VISIT_COLUMNS: &str =
    "id, customer_name, customer_phone, address, description, scheduled_time, created_at";

pub fn create_visit(conn: &Connection, kind: VisitKind, new: &NewVisit) -> anyhow::Result<Visit> {
    let scheduled_time = format_timestamp(&new.scheduled_time);
    let created_at = format_timestamp(&Utc::now());

    conn.execute(
        &format!(
            "INSERT INTO {} (customer_name, customer_phone, address, description, scheduled_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            kind.table()
        ),
        params![
            new.customer_name,
            new.customer_phone,
            new.address,
            new.description.as_deref().unwrap_or(""),
            scheduled_time,
            created_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_visit(conn, kind, id)?.with_context(|| format!("{} {id} missing after insert", kind.label()))
}

pub fn list_visits(conn: &Connection, kind: VisitKind) -> anyhow::Result<Vec<Visit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VISIT_COLUMNS} FROM {} ORDER BY scheduled_time DESC, id DESC",
        kind.table()
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_visit_row(row)))?;

    let mut visits = vec![];
    for row in rows {
        visits.push(row??);
    }
    Ok(visits)
}

pub fn get_visit(conn: &Connection, kind: VisitKind, id: i64) -> anyhow::Result<Option<Visit>> {
    let result = conn.query_row(
        &format!("SELECT {VISIT_COLUMNS} FROM {} WHERE id = ?1", kind.table()),
        params![id],
        |row| Ok(parse_visit_row(row)),
    );

    match result {
        Ok(visit) => Ok(Some(visit?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes every mutable column; `created_at` is never touched.
pub fn update_visit(conn: &Connection, kind: VisitKind, visit: &Visit) -> anyhow::Result<bool> {
    let count = conn.execute(
        &format!(
            "UPDATE {} SET customer_name = ?1, customer_phone = ?2, address = ?3, description = ?4, scheduled_time = ?5
             WHERE id = ?6",
            kind.table()
        ),
        params![
            visit.customer_name,
            visit.customer_phone,
            visit.address,
            visit.description,
            format_timestamp(&visit.scheduled_time),
            visit.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_visit(conn: &Connection, kind: VisitKind, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
        params![id],
    )?;
    Ok(count > 0)
}

pub fn count_visits(conn: &Connection, kind: VisitKind) -> anyhow::Result<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", kind.table()),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_visit_row(row: &rusqlite::Row) -> anyhow::Result<Visit> {
    let scheduled_time_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;

    Ok(Visit {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        customer_phone: row.get(2)?,
        address: row.get(3)?,
        description: row.get(4)?,
        scheduled_time: parse_timestamp(&scheduled_time_str)?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

// ── Services ──

pub fn create_service(
    conn: &Connection,
    owner_id: i64,
    new: &NewService,
) -> anyhow::Result<Service> {
    conn.execute(
        "INSERT INTO services (owner_id, name, duration_minutes) VALUES (?1, ?2, ?3)",
        params![owner_id, new.name, new.duration_minutes],
    )?;

    Ok(Service {
        id: conn.last_insert_rowid(),
        owner: owner_id,
        name: new.name.clone(),
        duration_minutes: new.duration_minutes,
    })
}

pub fn list_services(conn: &Connection, owner_id: i64) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, duration_minutes FROM services WHERE owner_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![owner_id], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

/// Only returns the service when it belongs to `owner_id`.
pub fn get_service(conn: &Connection, owner_id: i64, id: i64) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, owner_id, name, duration_minutes FROM services WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
        parse_service_row,
    );

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_service(conn: &Connection, service: &Service) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE services SET name = ?1, duration_minutes = ?2 WHERE id = ?3 AND owner_id = ?4",
        params![service.name, service.duration_minutes, service.id, service.owner],
    )?;
    Ok(count > 0)
}

pub fn delete_service(conn: &Connection, owner_id: i64, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM services WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(count > 0)
}

pub fn count_services(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
    Ok(count)
}

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        duration_minutes: row.get(3)?,
    })
}

// ── Work Hours ──

pub fn list_work_hours(conn: &Connection, owner_id: i64) -> anyhow::Result<Vec<WorkHour>> {
    let mut stmt = conn.prepare(
        "SELECT id, day, start_time, end_time FROM work_hours WHERE owner_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![owner_id], |row| Ok(parse_work_hour_row(row)))?;

    let mut hours = vec![];
    for row in rows {
        hours.push(row??);
    }
    Ok(hours)
}

/// Swaps the owner's whole set in one transaction. Any failure rolls back to
/// the previous set.
pub fn replace_work_hours(
    conn: &mut Connection,
    owner_id: i64,
    blocks: &[WorkHourBlock],
) -> anyhow::Result<usize> {
    let tx = conn.transaction()?;

    let removed = tx.execute("DELETE FROM work_hours WHERE owner_id = ?1", params![owner_id])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO work_hours (owner_id, day, start_time, end_time) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for block in blocks {
            stmt.execute(params![
                owner_id,
                block.day.as_str(),
                block.start_time.format(TIME_FORMAT).to_string(),
                block.end_time.format(TIME_FORMAT).to_string(),
            ])?;
        }
    }

    tx.commit()?;
    Ok(removed)
}

pub fn delete_work_hours(conn: &Connection, owner_id: i64) -> anyhow::Result<usize> {
    let count = conn.execute("DELETE FROM work_hours WHERE owner_id = ?1", params![owner_id])?;
    Ok(count)
}

fn parse_work_hour_row(row: &rusqlite::Row) -> anyhow::Result<WorkHour> {
    let day_str: String = row.get(1)?;
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;

    Ok(WorkHour {
        id: row.get(0)?,
        day: Weekday::parse(&day_str).with_context(|| format!("invalid stored day: {day_str}"))?,
        start_time: NaiveTime::parse_from_str(&start_str, TIME_FORMAT)
            .with_context(|| format!("invalid stored time: {start_str}"))?,
        end_time: NaiveTime::parse_from_str(&end_str, TIME_FORMAT)
            .with_context(|| format!("invalid stored time: {end_str}"))?,
    })
}

// ── Users ──

pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> anyhow::Result<User> {
    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, password_hash],
    )?;

    let id = conn.last_insert_rowid();
    get_user(conn, id)?.with_context(|| format!("user {id} missing after insert"))
}

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, password_hash, date_joined FROM users WHERE id = ?1",
        params![id],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, password_hash, date_joined FROM users WHERE username = ?1",
        params![username],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        date_joined: row.get(3)?,
    })
}
