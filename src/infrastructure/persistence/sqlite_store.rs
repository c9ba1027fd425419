//! SQLite IStorage implementation
//!
//! Grounded in the teacher's `SqliteExporter`: same WAL pragma block, same
//! "open connection, then create_schema()" constructor shape, same
//! prepared-statement-per-collection bulk write style. Nested value objects
//! (routing, capabilities, work schedules) are stored as JSON text columns
//! rather than further normalized — the core's data model treats them as
//! opaque value objects, not separately queried entities.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::entities::{
    Job, JobId, Machine, MachineId, MaterialOrder, OutsourcedOperation, Resource, ResourceId,
    ResourceUnavailability, ScheduleEntry, UnavailabilityId,
};
use crate::domain::repositories::IStorage;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("failed to open scheduler database")?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = 10000;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            "#,
        )?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory scheduler database")?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id              TEXT PRIMARY KEY,
                job_number      TEXT NOT NULL,
                part_number     TEXT NOT NULL,
                customer        TEXT NOT NULL,
                quantity        INTEGER NOT NULL,
                promised_date   TEXT NOT NULL,
                due_date        TEXT NOT NULL,
                order_date      TEXT NOT NULL,
                created_date    TEXT NOT NULL,
                lead_days       INTEGER NOT NULL,
                requires_material INTEGER NOT NULL,
                outsource_vendor TEXT,
                priority        TEXT,
                status          TEXT NOT NULL,
                routing_json    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS machines (
                id              TEXT PRIMARY KEY,
                human_id        TEXT NOT NULL,
                display_name    TEXT NOT NULL,
                machine_type    TEXT NOT NULL,
                category        TEXT NOT NULL,
                subcategory     TEXT,
                tier            TEXT NOT NULL,
                capabilities_json TEXT NOT NULL,
                availability    TEXT NOT NULL,
                shifts_json     TEXT NOT NULL,
                efficiency_factor REAL NOT NULL,
                substitution_group TEXT,
                lathe_json      TEXT,
                mill_json       TEXT,
                utilization_pct REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS resources (
                id              TEXT PRIMARY KEY,
                employee_id     TEXT NOT NULL,
                display_name    TEXT NOT NULL,
                role            TEXT NOT NULL,
                work_centers_json TEXT NOT NULL,
                skills_json     TEXT NOT NULL,
                shift_schedule_json TEXT NOT NULL,
                active          INTEGER NOT NULL,
                work_schedule_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS unavailabilities (
                id              TEXT PRIMARY KEY,
                resource_id     TEXT NOT NULL,
                start_date      TEXT NOT NULL,
                end_date        TEXT NOT NULL,
                is_partial_day  INTEGER NOT NULL,
                start_time_json TEXT,
                end_time_json   TEXT,
                reason          TEXT NOT NULL,
                affected_shifts_json TEXT NOT NULL,
                notes           TEXT
            );

            CREATE TABLE IF NOT EXISTS schedule_entries (
                id              TEXT PRIMARY KEY,
                job_id          TEXT NOT NULL,
                machine_id      TEXT,
                resource_id     TEXT,
                operation_sequence INTEGER NOT NULL,
                start           TEXT NOT NULL,
                end             TEXT NOT NULL,
                shift           INTEGER NOT NULL,
                status          TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_schedule_entries_job ON schedule_entries(job_id);
            CREATE INDEX IF NOT EXISTS idx_schedule_entries_window ON schedule_entries(start, end);

            CREATE TABLE IF NOT EXISTS material_orders (
                job_id          TEXT PRIMARY KEY,
                ready           INTEGER NOT NULL,
                expected_date   TEXT
            );

            CREATE TABLE IF NOT EXISTS outsourced_operations (
                job_id          TEXT NOT NULL,
                operation_sequence INTEGER NOT NULL,
                vendor          TEXT NOT NULL,
                description     TEXT NOT NULL,
                lead_days       INTEGER NOT NULL,
                PRIMARY KEY (job_id, operation_sequence)
            );
            "#,
        )?;
        Ok(())
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: String = row.get("id")?;
        let routing_json: String = row.get("routing_json")?;
        let priority: Option<String> = row.get("priority")?;
        let status: String = row.get("status")?;
        let quantity: u32 = row.get("quantity")?;
        let lead_days: u32 = row.get("lead_days")?;

        Ok(Job {
            id: JobId::from_uuid(parse_uuid(&id)?),
            job_number: row.get("job_number")?,
            part_number: row.get("part_number")?,
            customer: row.get("customer")?,
            quantity,
            promised_date: row.get("promised_date")?,
            due_date: row.get("due_date")?,
            order_date: row.get("order_date")?,
            created_date: row.get("created_date")?,
            lead_days,
            requires_material: row.get("requires_material")?,
            outsource_vendor: row.get("outsource_vendor")?,
            priority: priority.and_then(|p| serde_json::from_str(&p).ok()),
            status: serde_json::from_str(&status).unwrap_or(crate::domain::entities::JobStatus::Unscheduled),
            routing: serde_json::from_str(&routing_json).unwrap_or_default(),
        })
    }
}

fn parse_uuid(s: &str) -> rusqlite::Result<uuid::Uuid> {
    s.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "id".to_string(), rusqlite::types::Type::Text)
    })
}

impl IStorage for SqliteStore {
    fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let job = self
            .conn
            .query_row("SELECT * FROM jobs WHERE id = ?1", params![id.to_string()], Self::row_to_job)
            .optional()?;
        Ok(job)
    }

    fn list_jobs(&self, include_completed: bool) -> Result<Vec<Job>> {
        let mut stmt = if include_completed {
            self.conn.prepare("SELECT * FROM jobs")?
        } else {
            self.conn.prepare("SELECT * FROM jobs WHERE status <> '\"Complete\"'")?
        };
        let rows = stmt.query_map([], Self::row_to_job)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn put_job(&mut self, job: Job) -> Result<()> {
        let routing_json = serde_json::to_string(&job.routing)?;
        let priority_json = job.priority.map(|p| serde_json::to_string(&p)).transpose()?;
        let status = serde_json::to_string(&job.status)?;
        self.conn.execute(
            r#"INSERT INTO jobs (id, job_number, part_number, customer, quantity, promised_date, due_date,
                order_date, created_date, lead_days, requires_material, outsource_vendor, priority, status, routing_json)
               VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)
               ON CONFLICT(id) DO UPDATE SET job_number=excluded.job_number, part_number=excluded.part_number,
                customer=excluded.customer, quantity=excluded.quantity, promised_date=excluded.promised_date,
                due_date=excluded.due_date, order_date=excluded.order_date, created_date=excluded.created_date,
                lead_days=excluded.lead_days, requires_material=excluded.requires_material,
                outsource_vendor=excluded.outsource_vendor, priority=excluded.priority, status=excluded.status,
                routing_json=excluded.routing_json"#,
            params![
                job.id.to_string(),
                job.job_number,
                job.part_number,
                job.customer,
                job.quantity,
                job.promised_date,
                job.due_date,
                job.order_date,
                job.created_date,
                job.lead_days,
                job.requires_material,
                job.outsource_vendor,
                priority_json,
                status,
                routing_json,
            ],
        )?;
        Ok(())
    }

    fn delete_job(&mut self, id: JobId) -> Result<()> {
        self.conn.execute("DELETE FROM jobs WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn get_machine(&self, id: MachineId) -> Result<Option<Machine>> {
        let machine = self
            .conn
            .query_row("SELECT * FROM machines WHERE id = ?1", params![id.to_string()], row_to_machine)
            .optional()?;
        Ok(machine)
    }

    fn list_machines(&self) -> Result<Vec<Machine>> {
        let mut stmt = self.conn.prepare("SELECT * FROM machines")?;
        let rows = stmt.query_map([], row_to_machine)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn put_machine(&mut self, machine: Machine) -> Result<()> {
        let capabilities_json = serde_json::to_string(&machine.capabilities)?;
        let shifts_json = serde_json::to_string(&machine.shifts)?;
        let lathe_json = machine.lathe.map(|l| serde_json::to_string(&l)).transpose()?;
        let mill_json = machine.mill.map(|m| serde_json::to_string(&m)).transpose()?;
        let machine_type = serde_json::to_string(&machine.machine_type)?;
        let tier = serde_json::to_string(&machine.tier)?;
        let availability = serde_json::to_string(&machine.availability)?;
        self.conn.execute(
            r#"INSERT INTO machines (id, human_id, display_name, machine_type, category, subcategory, tier,
                capabilities_json, availability, shifts_json, efficiency_factor, substitution_group, lathe_json,
                mill_json, utilization_pct)
               VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)
               ON CONFLICT(id) DO UPDATE SET human_id=excluded.human_id, display_name=excluded.display_name,
                machine_type=excluded.machine_type, category=excluded.category, subcategory=excluded.subcategory,
                tier=excluded.tier, capabilities_json=excluded.capabilities_json, availability=excluded.availability,
                shifts_json=excluded.shifts_json, efficiency_factor=excluded.efficiency_factor,
                substitution_group=excluded.substitution_group, lathe_json=excluded.lathe_json,
                mill_json=excluded.mill_json, utilization_pct=excluded.utilization_pct"#,
            params![
                machine.id.to_string(),
                machine.human_id,
                machine.display_name,
                machine_type,
                machine.category,
                machine.subcategory,
                tier,
                capabilities_json,
                availability,
                shifts_json,
                machine.efficiency_factor,
                machine.substitution_group,
                lathe_json,
                mill_json,
                machine.utilization_pct,
            ],
        )?;
        Ok(())
    }

    fn list_resources(&self) -> Result<Vec<Resource>> {
        let mut stmt = self.conn.prepare("SELECT * FROM resources")?;
        let rows = stmt.query_map([], row_to_resource)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        let resource = self
            .conn
            .query_row("SELECT * FROM resources WHERE id = ?1", params![id.to_string()], row_to_resource)
            .optional()?;
        Ok(resource)
    }

    fn put_resource(&mut self, resource: Resource) -> Result<()> {
        let work_centers_json = serde_json::to_string(&resource.work_centers)?;
        let skills_json = serde_json::to_string(&resource.skills)?;
        let shift_schedule_json = serde_json::to_string(&resource.shift_schedule)?;
        let work_schedule_json = serde_json::to_string(&resource.work_schedule)?;
        let role = serde_json::to_string(&resource.role)?;
        self.conn.execute(
            r#"INSERT INTO resources (id, employee_id, display_name, role, work_centers_json, skills_json,
                shift_schedule_json, active, work_schedule_json)
               VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)
               ON CONFLICT(id) DO UPDATE SET employee_id=excluded.employee_id, display_name=excluded.display_name,
                role=excluded.role, work_centers_json=excluded.work_centers_json, skills_json=excluded.skills_json,
                shift_schedule_json=excluded.shift_schedule_json, active=excluded.active,
                work_schedule_json=excluded.work_schedule_json"#,
            params![
                resource.id.to_string(),
                resource.employee_id,
                resource.display_name,
                role,
                work_centers_json,
                skills_json,
                shift_schedule_json,
                resource.active,
                work_schedule_json,
            ],
        )?;
        Ok(())
    }

    fn list_unavailabilities(&self) -> Result<Vec<ResourceUnavailability>> {
        let mut stmt = self.conn.prepare("SELECT * FROM unavailabilities")?;
        let rows = stmt.query_map([], row_to_unavailability)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn put_unavailability(&mut self, unavailability: ResourceUnavailability) -> Result<()> {
        let start_time_json = unavailability.start_time.map(|t| serde_json::to_string(&t)).transpose()?;
        let end_time_json = unavailability.end_time.map(|t| serde_json::to_string(&t)).transpose()?;
        let affected_shifts_json = serde_json::to_string(&unavailability.affected_shifts)?;
        self.conn.execute(
            r#"INSERT INTO unavailabilities (id, resource_id, start_date, end_date, is_partial_day,
                start_time_json, end_time_json, reason, affected_shifts_json, notes)
               VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
               ON CONFLICT(id) DO UPDATE SET resource_id=excluded.resource_id, start_date=excluded.start_date,
                end_date=excluded.end_date, is_partial_day=excluded.is_partial_day,
                start_time_json=excluded.start_time_json, end_time_json=excluded.end_time_json,
                reason=excluded.reason, affected_shifts_json=excluded.affected_shifts_json, notes=excluded.notes"#,
            params![
                unavailability.id.to_string(),
                unavailability.resource_id.to_string(),
                unavailability.start_date,
                unavailability.end_date,
                unavailability.is_partial_day,
                start_time_json,
                end_time_json,
                unavailability.reason,
                affected_shifts_json,
                unavailability.notes,
            ],
        )?;
        Ok(())
    }

    fn delete_unavailability(&mut self, id: UnavailabilityId) -> Result<()> {
        self.conn
            .execute("DELETE FROM unavailabilities WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn list_schedule_entries_for_job(&self, job_id: JobId) -> Result<Vec<ScheduleEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM schedule_entries WHERE job_id = ?1 ORDER BY start")?;
        let rows = stmt.query_map(params![job_id.to_string()], row_to_schedule_entry)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn put_schedule_entries(&mut self, entries: Vec<ScheduleEntry>) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                r#"INSERT INTO schedule_entries (id, job_id, machine_id, resource_id, operation_sequence,
                    start, end, shift, status)
                   VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)"#,
            )?;
            for entry in &entries {
                let status = serde_json::to_string(&entry.status)?;
                stmt.execute(params![
                    entry.id.to_string(),
                    entry.job_id.to_string(),
                    entry.machine_id.map(|m| m.to_string()),
                    entry.resource_id.map(|r| r.to_string()),
                    entry.operation_sequence,
                    entry.start,
                    entry.end,
                    entry.shift,
                    status,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_schedule_entries_for_job_from(&mut self, job_id: JobId, from: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "DELETE FROM schedule_entries WHERE job_id = ?1 AND start >= ?2",
            params![job_id.to_string(), from],
        )?;
        Ok(())
    }

    fn clear_all_schedule_entries(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM schedule_entries", [])?;
        Ok(())
    }

    fn schedule_entries_in_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<ScheduleEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM schedule_entries WHERE start < ?2 AND ?1 < end ORDER BY start")?;
        let rows = stmt.query_map(params![start, end], row_to_schedule_entry)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn get_material_order(&self, job_id: JobId) -> Result<Option<MaterialOrder>> {
        let order = self
            .conn
            .query_row(
                "SELECT job_id, ready, expected_date FROM material_orders WHERE job_id = ?1",
                params![job_id.to_string()],
                |row| {
                    let id: String = row.get(0)?;
                    Ok(MaterialOrder {
                        job_id: JobId::from_uuid(parse_uuid(&id)?),
                        ready: row.get(1)?,
                        expected_date: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(order)
    }

    fn list_outsourced_operations(&self) -> Result<Vec<OutsourcedOperation>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, operation_sequence, vendor, description, lead_days FROM outsourced_operations",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            Ok(OutsourcedOperation {
                job_id: JobId::from_uuid(parse_uuid(&id)?),
                operation_sequence: row.get(1)?,
                vendor: row.get(2)?,
                description: row.get(3)?,
                lead_days: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn jobs_requiring_rescheduling(
        &self,
        resource_ids: &[ResourceId],
        machine_ids: &[MachineId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        shifts: &[u8],
    ) -> Result<Vec<JobId>> {
        let entries = self.schedule_entries_in_date_range(start, end)?;
        let mut ids: Vec<JobId> = entries
            .into_iter()
            .filter(|e| shifts.is_empty() || shifts.contains(&e.shift))
            .filter(|e| {
                e.resource_id.map(|r| resource_ids.contains(&r)).unwrap_or(false)
                    || e.machine_id.map(|m| machine_ids.contains(&m)).unwrap_or(false)
            })
            .map(|e| e.job_id)
            .collect();
        ids.sort_by_key(|id| id.as_uuid());
        ids.dedup();
        Ok(ids)
    }
}

fn row_to_machine(row: &rusqlite::Row) -> rusqlite::Result<Machine> {
    let id: String = row.get("id")?;
    let machine_type: String = row.get("machine_type")?;
    let tier: String = row.get("tier")?;
    let availability: String = row.get("availability")?;
    let capabilities_json: String = row.get("capabilities_json")?;
    let shifts_json: String = row.get("shifts_json")?;
    let lathe_json: Option<String> = row.get("lathe_json")?;
    let mill_json: Option<String> = row.get("mill_json")?;

    Ok(Machine {
        id: MachineId::from_uuid(parse_uuid(&id)?),
        human_id: row.get("human_id")?,
        display_name: row.get("display_name")?,
        machine_type: serde_json::from_str(&machine_type).unwrap_or(crate::domain::entities::MachineType::Other),
        category: row.get("category")?,
        subcategory: row.get("subcategory")?,
        tier: serde_json::from_str(&tier).unwrap_or(crate::domain::entities::MachineTier::Standard),
        capabilities: serde_json::from_str(&capabilities_json).unwrap_or_default(),
        availability: serde_json::from_str(&availability)
            .unwrap_or(crate::domain::entities::MachineAvailabilityState::Offline),
        shifts: serde_json::from_str(&shifts_json).unwrap_or_default(),
        efficiency_factor: row.get("efficiency_factor")?,
        substitution_group: row.get("substitution_group")?,
        lathe: lathe_json.and_then(|s| serde_json::from_str(&s).ok()),
        mill: mill_json.and_then(|s| serde_json::from_str(&s).ok()),
        utilization_pct: row.get("utilization_pct")?,
    })
}

fn row_to_resource(row: &rusqlite::Row) -> rusqlite::Result<Resource> {
    let id: String = row.get("id")?;
    let role: String = row.get("role")?;
    let work_centers_json: String = row.get("work_centers_json")?;
    let skills_json: String = row.get("skills_json")?;
    let shift_schedule_json: String = row.get("shift_schedule_json")?;
    let work_schedule_json: String = row.get("work_schedule_json")?;

    Ok(Resource {
        id: ResourceId::from_uuid(parse_uuid(&id)?),
        employee_id: row.get("employee_id")?,
        display_name: row.get("display_name")?,
        role: serde_json::from_str(&role).unwrap_or(crate::domain::entities::ResourceRole::Operator),
        work_centers: serde_json::from_str(&work_centers_json).unwrap_or_default(),
        skills: serde_json::from_str(&skills_json).unwrap_or_default(),
        shift_schedule: serde_json::from_str(&shift_schedule_json).unwrap_or_default(),
        active: row.get("active")?,
        work_schedule: serde_json::from_str(&work_schedule_json).unwrap_or_default(),
    })
}

fn row_to_unavailability(row: &rusqlite::Row) -> rusqlite::Result<ResourceUnavailability> {
    let id: String = row.get("id")?;
    let resource_id: String = row.get("resource_id")?;
    let start_time_json: Option<String> = row.get("start_time_json")?;
    let end_time_json: Option<String> = row.get("end_time_json")?;
    let affected_shifts_json: String = row.get("affected_shifts_json")?;

    Ok(ResourceUnavailability {
        id: UnavailabilityId::from_uuid(parse_uuid(&id)?),
        resource_id: ResourceId::from_uuid(parse_uuid(&resource_id)?),
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_partial_day: row.get("is_partial_day")?,
        start_time: start_time_json.and_then(|s| serde_json::from_str(&s).ok()),
        end_time: end_time_json.and_then(|s| serde_json::from_str(&s).ok()),
        reason: row.get("reason")?,
        affected_shifts: serde_json::from_str(&affected_shifts_json).unwrap_or_default(),
        notes: row.get("notes")?,
    })
}

fn row_to_schedule_entry(row: &rusqlite::Row) -> rusqlite::Result<ScheduleEntry> {
    let id: String = row.get("id")?;
    let job_id: String = row.get("job_id")?;
    let machine_id: Option<String> = row.get("machine_id")?;
    let resource_id: Option<String> = row.get("resource_id")?;
    let status: String = row.get("status")?;

    Ok(ScheduleEntry {
        id: crate::domain::entities::ScheduleEntryId::from_uuid(parse_uuid(&id)?),
        job_id: JobId::from_uuid(parse_uuid(&job_id)?),
        machine_id: machine_id.map(|s| parse_uuid(&s)).transpose()?.map(MachineId::from_uuid),
        resource_id: resource_id.map(|s| parse_uuid(&s)).transpose()?.map(ResourceId::from_uuid),
        operation_sequence: row.get("operation_sequence")?,
        start: row.get("start")?,
        end: row.get("end")?,
        shift: row.get("shift")?,
        status: serde_json::from_str(&status).unwrap_or(crate::domain::entities::ScheduleEntryStatus::Planned),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ScheduleEntryId, ScheduleEntryStatus};

    #[test]
    fn put_then_get_round_trips_a_job() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), Utc::now());
        let id = job.id;
        store.put_job(job).unwrap();
        let fetched = store.get_job(id).unwrap().unwrap();
        assert_eq!(fetched.job_number, "J1");
    }

    #[test]
    fn schedule_entries_in_date_range_finds_overlap() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let job_id = JobId::new();
        let start = Utc::now();
        let entry = ScheduleEntry {
            id: ScheduleEntryId::new(),
            job_id,
            machine_id: Some(MachineId::new()),
            resource_id: Some(ResourceId::new()),
            operation_sequence: 10,
            start,
            end: start + chrono::Duration::hours(4),
            shift: 1,
            status: ScheduleEntryStatus::Planned,
        };
        store.put_schedule_entries(vec![entry]).unwrap();
        let found = store
            .schedule_entries_in_date_range(start, start + chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn outsource_placeholder_round_trips_with_null_machine() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let job_id = JobId::new();
        let start = Utc::now();
        let entry = ScheduleEntry {
            id: ScheduleEntryId::new(),
            job_id,
            machine_id: None,
            resource_id: None,
            operation_sequence: 20,
            start,
            end: start + chrono::Duration::days(5),
            shift: 1,
            status: ScheduleEntryStatus::Planned,
        };
        store.put_schedule_entries(vec![entry]).unwrap();
        let entries = store.list_schedule_entries_for_job(job_id).unwrap();
        assert!(entries[0].is_outsource_placeholder());
    }
}
