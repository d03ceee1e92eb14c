//! Row mapping for the dashboard tables.
//!
//! Only raw inputs are stored; derived fields are recomputed by
//! [`Entity::derive`] when records are loaded. Every `load_*` returns
//! records newest-first, matching in-memory enumeration order.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::DatabaseError;
use crate::models::enums::{AlertSeverity, AlertType};
use crate::models::*;
use crate::seed;
use crate::store::{EntityStore, Entity};

fn to_u32(field: &'static str, value: i64) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|_| DatabaseError::OutOfRange { field, value })
}

// ── Writes ─────────────────────────────────────────────────

pub fn save_case(conn: &Connection, case: &CaseRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO cases (ward, disease, new_cases, total_cases, status, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(ward, disease) DO UPDATE SET
            new_cases = excluded.new_cases,
            total_cases = excluded.total_cases,
            status = excluded.status,
            updated_at = excluded.updated_at",
        params![
            case.ward,
            case.disease,
            case.new_cases,
            case.total_cases,
            case.status.as_str(),
            case.updated_at,
        ],
    )?;
    Ok(())
}

/// Upsert a hospital row and replace its medicine rows.
pub fn save_hospital(conn: &Connection, hospital: &HospitalRecord) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO hospitals (id, name, ward, total_beds, occupied_beds, icu_beds,
                                occupied_icu, ventilators, available_ventilators,
                                latitude, longitude, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            ward = excluded.ward,
            total_beds = excluded.total_beds,
            occupied_beds = excluded.occupied_beds,
            icu_beds = excluded.icu_beds,
            occupied_icu = excluded.occupied_icu,
            ventilators = excluded.ventilators,
            available_ventilators = excluded.available_ventilators,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            updated_at = excluded.updated_at",
        params![
            hospital.id,
            hospital.name,
            hospital.ward,
            hospital.total_beds,
            hospital.occupied_beds,
            hospital.icu_beds,
            hospital.occupied_icu,
            hospital.ventilators,
            hospital.available_ventilators,
            hospital.latitude,
            hospital.longitude,
            hospital.updated_at,
        ],
    )?;
    tx.execute(
        "DELETE FROM hospital_medicines WHERE hospital_id = ?1",
        params![hospital.id],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO hospital_medicines (hospital_id, name, stock, required)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (name, medicine) in &hospital.medicines {
            stmt.execute(params![hospital.id, name, medicine.stock, medicine.required])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_vaccination(
    conn: &Connection,
    vaccination: &VaccinationRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vaccinations (ward, name, total_population, vaccinated,
                                   target_population, last_campaign, next_campaign, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(ward) DO UPDATE SET
            name = excluded.name,
            total_population = excluded.total_population,
            vaccinated = excluded.vaccinated,
            target_population = excluded.target_population,
            last_campaign = excluded.last_campaign,
            next_campaign = excluded.next_campaign,
            updated_at = excluded.updated_at",
        params![
            vaccination.ward,
            vaccination.name,
            vaccination.total_population,
            vaccination.vaccinated,
            vaccination.target_population,
            vaccination.last_campaign,
            vaccination.next_campaign,
            vaccination.updated_at,
        ],
    )?;
    Ok(())
}

pub fn insert_alert(conn: &Connection, alert: &AlertRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO alerts (id, type, title, message, ward, severity, created_at, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            alert.id,
            alert.alert_type.as_str(),
            alert.title,
            alert.message,
            alert.ward,
            alert.severity.as_str(),
            alert.created_at,
            alert.is_active,
        ],
    )?;
    Ok(())
}

// ── Reads ──────────────────────────────────────────────────

pub fn load_cases(conn: &Connection) -> Result<Vec<CaseRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT ward, disease, new_cases, total_cases, updated_at
         FROM cases ORDER BY rowid DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, DateTime<Utc>>(4)?,
        ))
    })?;

    let mut cases = Vec::new();
    for row in rows {
        let (ward, disease, new_cases, total_cases, updated_at) = row?;
        let mut case = CaseRecord::new(
            &ward,
            &disease,
            to_u32("new_cases", new_cases)?,
            to_u32("total_cases", total_cases)?,
        );
        case.updated_at = updated_at;
        cases.push(case);
    }
    Ok(cases)
}

fn load_medicines(
    conn: &Connection,
) -> Result<BTreeMap<i64, BTreeMap<String, MedicineStock>>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT hospital_id, name, stock, required FROM hospital_medicines")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut by_hospital: BTreeMap<i64, BTreeMap<String, MedicineStock>> = BTreeMap::new();
    for row in rows {
        let (hospital_id, name, stock, required) = row?;
        by_hospital.entry(hospital_id).or_default().insert(
            name,
            MedicineStock::new(to_u32("stock", stock)?, to_u32("required", required)?),
        );
    }
    Ok(by_hospital)
}

pub fn load_hospitals(conn: &Connection) -> Result<Vec<HospitalRecord>, DatabaseError> {
    let mut medicines = load_medicines(conn)?;
    let mut stmt = conn.prepare(
        "SELECT id, name, ward, total_beds, occupied_beds, icu_beds, occupied_icu,
                ventilators, available_ventilators, latitude, longitude, updated_at
         FROM hospitals ORDER BY id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            [
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, i64>(8)?,
            ],
            row.get::<_, Option<f64>>(9)?,
            row.get::<_, Option<f64>>(10)?,
            row.get::<_, DateTime<Utc>>(11)?,
        ))
    })?;

    let mut hospitals = Vec::new();
    for row in rows {
        let (id, name, ward, counts, latitude, longitude, updated_at) = row?;
        let [total_beds, occupied_beds, icu_beds, occupied_icu, ventilators, available_ventilators] =
            counts;
        let mut hospital = HospitalRecord {
            id,
            name,
            ward,
            total_beds: to_u32("total_beds", total_beds)?,
            occupied_beds: to_u32("occupied_beds", occupied_beds)?,
            available_beds: 0,
            icu_beds: to_u32("icu_beds", icu_beds)?,
            occupied_icu: to_u32("occupied_icu", occupied_icu)?,
            available_icu: 0,
            ventilators: to_u32("ventilators", ventilators)?,
            available_ventilators: to_u32("available_ventilators", available_ventilators)?,
            occupancy_rate: 0.0,
            occupancy_status: Default::default(),
            over_capacity: false,
            medicines: medicines.remove(&id).unwrap_or_default(),
            latitude,
            longitude,
            updated_at,
        };
        hospital.derive();
        hospitals.push(hospital);
    }
    Ok(hospitals)
}

pub fn load_vaccinations(conn: &Connection) -> Result<Vec<VaccinationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT ward, name, total_population, vaccinated, target_population,
                last_campaign, next_campaign, updated_at
         FROM vaccinations ORDER BY rowid DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, Option<NaiveDate>>(5)?,
            row.get::<_, Option<NaiveDate>>(6)?,
            row.get::<_, DateTime<Utc>>(7)?,
        ))
    })?;

    let mut vaccinations = Vec::new();
    for row in rows {
        let (ward, name, population, vaccinated, target, last_campaign, next_campaign, updated_at) =
            row?;
        let mut record = VaccinationRecord {
            ward,
            name,
            total_population: to_u32("total_population", population)?,
            vaccinated: to_u32("vaccinated", vaccinated)?,
            vaccination_rate: 0.0,
            target_population: to_u32("target_population", target)?,
            remaining_target: 0,
            status: Default::default(),
            priority: Default::default(),
            last_campaign,
            next_campaign,
            updated_at,
        };
        record.derive();
        vaccinations.push(record);
    }
    Ok(vaccinations)
}

pub fn load_alerts(conn: &Connection) -> Result<Vec<AlertRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, title, message, ward, severity, created_at, is_active
         FROM alerts ORDER BY seq DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, DateTime<Utc>>(6)?,
            row.get::<_, bool>(7)?,
        ))
    })?;

    let mut alerts = Vec::new();
    for row in rows {
        let (id, alert_type, title, message, ward, severity, created_at, is_active) = row?;
        alerts.push(AlertRecord {
            id,
            alert_type: AlertType::from_str(&alert_type)?,
            title,
            message,
            ward,
            severity: AlertSeverity::from_str(&severity)?,
            created_at,
            is_active,
        });
    }
    Ok(alerts)
}

/// Everything persisted, as a bulk-load payload with stats computed.
pub fn load_snapshot(conn: &Connection) -> Result<Snapshot, DatabaseError> {
    let snapshot = Snapshot {
        cases: load_cases(conn)?,
        hospitals: load_hospitals(conn)?,
        vaccinations: load_vaccinations(conn)?,
        alerts: load_alerts(conn)?,
        stats: AggregateStats::default(),
    };
    Ok(EntityStore::from_snapshot(snapshot).snapshot())
}

fn is_empty(conn: &Connection) -> Result<bool, DatabaseError> {
    let rows: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM cases) + (SELECT COUNT(*) FROM hospitals)
              + (SELECT COUNT(*) FROM vaccinations) + (SELECT COUNT(*) FROM alerts)",
        [],
        |row| row.get(0),
    )?;
    Ok(rows == 0)
}

/// Insert the sample fixtures into an empty database. Returns whether
/// anything was written.
pub fn seed_if_empty(conn: &Connection) -> Result<bool, DatabaseError> {
    if !is_empty(conn)? {
        return Ok(false);
    }
    for case in seed::cases() {
        save_case(conn, &case)?;
    }
    for hospital in seed::hospitals() {
        save_hospital(conn, &hospital)?;
    }
    for vaccination in seed::vaccinations() {
        save_vaccination(conn, &vaccination)?;
    }
    for alert in seed::alerts() {
        insert_alert(conn, &alert)?;
    }
    tracing::info!("Seeded empty database with sample ward data");
    Ok(true)
}
