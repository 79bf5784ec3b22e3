//! SQLite-backed graph store
//!
//! Adapter that realizes every [`GraphStore`] operation as SQL against a
//! SQLite database, the relational counterpart of the in-memory arena.
//! Ordering guarantees of the trait are enforced with explicit `ORDER BY`
//! clauses so both realizations stay observably identical.

use super::{GraphStore, StoreError, StoreResult};
use crate::models::{ContactRecord, Day, EdgeId, Employee, EmployeeId, InfectionEdge};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::path::Path;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    PRAGMA synchronous = NORMAL;

    CREATE TABLE IF NOT EXISTS employees (
        id          INTEGER PRIMARY KEY,
        first_name  TEXT NOT NULL,
        last_name   TEXT NOT NULL,
        is_infected INTEGER NOT NULL DEFAULT 0,
        iteration   INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_employees_infected ON employees(is_infected);
    CREATE INDEX IF NOT EXISTS idx_employees_iteration ON employees(iteration);

    CREATE TABLE IF NOT EXISTS contacts (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_a INTEGER NOT NULL REFERENCES employees(id),
        employee_b INTEGER NOT NULL REFERENCES employees(id),
        day        INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_contacts_a ON contacts(employee_a, day);
    CREATE INDEX IF NOT EXISTS idx_contacts_b ON contacts(employee_b, day);

    CREATE TABLE IF NOT EXISTS infections (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        source INTEGER NOT NULL REFERENCES employees(id),
        target INTEGER NOT NULL REFERENCES employees(id),
        day    INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_infections_source ON infections(source);
    CREATE INDEX IF NOT EXISTS idx_infections_target ON infections(target, day, source);
";

const SELECT_EMPLOYEE: &str =
    "SELECT id, first_name, last_name, is_infected, iteration FROM employees";

const SELECT_CONTACTS: &str = "
    SELECT employee_b AS neighbor, day FROM contacts
     WHERE employee_a = ?1 AND employee_b <> ?1 AND day BETWEEN ?2 AND ?3
    UNION ALL
    SELECT employee_a AS neighbor, day FROM contacts
     WHERE employee_b = ?1 AND employee_a <> ?1 AND day BETWEEN ?2 AND ?3
    ORDER BY neighbor, day";

const SELECT_DUPLICATES: &str = "
    SELECT id, source, target, day FROM infections
     WHERE target IN (SELECT target FROM infections GROUP BY target HAVING COUNT(*) > 1)
     ORDER BY target, day, source, id";

const SELECT_OUT_DEGREE: &str = "
    SELECT e.iteration, COUNT(i.id), COUNT(DISTINCT e.id)
      FROM employees e
      LEFT JOIN infections i ON i.source = e.id
     WHERE e.is_infected = 1 AND e.iteration >= 1
     GROUP BY e.iteration
     ORDER BY e.iteration";

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let first_name: String = row.get(1)?;
    let last_name: String = row.get(2)?;
    let employee = Employee::new(row.get(0)?, first_name, last_name, row.get(3)?);
    Ok(employee.with_iteration(row.get(4)?))
}

fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<InfectionEdge> {
    Ok(InfectionEdge {
        id: EdgeId(row.get(0)?),
        source: row.get(1)?,
        target: row.get(2)?,
        day: row.get(3)?,
    })
}

fn employee_exists(conn: &Connection, id: EmployeeId) -> StoreResult<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?)
}

fn ensure_employee(conn: &Connection, id: EmployeeId) -> StoreResult<()> {
    if employee_exists(conn, id)? {
        Ok(())
    } else {
        Err(StoreError::UnknownEmployee(id))
    }
}

/// [`GraphStore`] realized on a SQLite connection
///
/// # Example
///
/// ```rust
/// use outbreak_simulator_core_rs::{Employee, GraphStore, SqliteGraphStore};
///
/// let mut store = SqliteGraphStore::open_in_memory().unwrap();
/// store.load_employees(&[Employee::new(1, "A", "A", true)]).unwrap();
/// assert_eq!(store.infected_nodes().unwrap().len(), 1);
/// ```
pub struct SqliteGraphStore {
    conn: Connection,
}

impl SqliteGraphStore {
    /// Open a private in-memory database with the schema applied
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Open (or create) a database file with the schema applied
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn ids(&self, sql: &str, params: impl rusqlite::Params) -> StoreResult<Vec<EmployeeId>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<EmployeeId>>>()?;
        Ok(ids)
    }
}

impl GraphStore for SqliteGraphStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(
            "
            DELETE FROM infections;
            DELETE FROM contacts;
            DELETE FROM employees;
            DELETE FROM sqlite_sequence;
            ",
        )?;
        Ok(())
    }

    fn load_employees(&mut self, records: &[Employee]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO employees (id, first_name, last_name, is_infected, iteration)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for employee in records {
                if employee_exists(&tx, employee.id())? {
                    return Err(StoreError::DuplicateEmployee(employee.id()));
                }
                insert.execute(params![
                    employee.id(),
                    employee.first_name(),
                    employee.last_name(),
                    employee.is_infected(),
                    employee.iteration(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_contacts(&mut self, records: &[ContactRecord]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO contacts (employee_a, employee_b, day) VALUES (?1, ?2, ?3)",
            )?;
            for contact in records {
                ensure_employee(&tx, contact.employee_a)?;
                ensure_employee(&tx, contact.employee_b)?;
                insert.execute(params![contact.employee_a, contact.employee_b, contact.day])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn employees(&self) -> StoreResult<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_EMPLOYEE} ORDER BY id"))?;
        let employees = stmt
            .query_map([], employee_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(employees)
    }

    fn employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(self
            .conn
            .query_row(
                &format!("{SELECT_EMPLOYEE} WHERE id = ?1"),
                params![id],
                employee_from_row,
            )
            .optional()?)
    }

    fn max_employee_id(&self) -> StoreResult<Option<EmployeeId>> {
        Ok(self
            .conn
            .query_row("SELECT MAX(id) FROM employees", [], |row| row.get(0))?)
    }

    fn infected_nodes(&self) -> StoreResult<BTreeSet<EmployeeId>> {
        Ok(self
            .ids("SELECT id FROM employees WHERE is_infected = 1", [])?
            .into_iter()
            .collect())
    }

    fn nodes_at_iteration(&self, iteration: u32) -> StoreResult<Vec<EmployeeId>> {
        self.ids(
            "SELECT id FROM employees WHERE is_infected = 1 AND iteration = ?1 ORDER BY id",
            params![iteration],
        )
    }

    fn contacts_of(
        &self,
        id: EmployeeId,
        days: RangeInclusive<Day>,
    ) -> StoreResult<Vec<(EmployeeId, Day)>> {
        ensure_employee(&self.conn, id)?;
        let mut stmt = self.conn.prepare_cached(SELECT_CONTACTS)?;
        let contacts = stmt
            .query_map(params![id, days.start(), days.end()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contacts)
    }

    fn parent_edge_of(&self, id: EmployeeId) -> StoreResult<Option<(EmployeeId, Day)>> {
        ensure_employee(&self.conn, id)?;
        Ok(self
            .conn
            .query_row(
                "SELECT source, day FROM infections WHERE target = ?1
                 ORDER BY day, source, id LIMIT 1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }

    fn mark_infected(&mut self, id: EmployeeId, iteration: u32) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees SET is_infected = 1, iteration = ?2 WHERE id = ?1",
            params![id, iteration],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownEmployee(id));
        }
        Ok(())
    }

    fn create_infection_edge(
        &mut self,
        source: EmployeeId,
        target: EmployeeId,
        day: Day,
    ) -> StoreResult<EdgeId> {
        ensure_employee(&self.conn, source)?;
        ensure_employee(&self.conn, target)?;
        self.conn.execute(
            "INSERT INTO infections (source, target, day) VALUES (?1, ?2, ?3)",
            params![source, target, day],
        )?;
        Ok(EdgeId(self.conn.last_insert_rowid()))
    }

    fn infection_edges(&self) -> StoreResult<Vec<InfectionEdge>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, source, target, day FROM infections ORDER BY id")?;
        let edges = stmt
            .query_map([], edge_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    fn duplicate_infection_edges_by_target(
        &self,
    ) -> StoreResult<BTreeMap<EmployeeId, Vec<InfectionEdge>>> {
        let mut stmt = self.conn.prepare_cached(SELECT_DUPLICATES)?;
        let mut groups: BTreeMap<EmployeeId, Vec<InfectionEdge>> = BTreeMap::new();
        for edge in stmt.query_map([], edge_from_row)? {
            let edge = edge?;
            groups.entry(edge.target).or_default().push(edge);
        }
        Ok(groups)
    }

    fn delete_edges(&mut self, ids: &[EdgeId]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut exists =
                tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM infections WHERE id = ?1)")?;
            for id in ids {
                if !exists.query_row(params![id.0], |row| row.get::<_, bool>(0))? {
                    return Err(StoreError::UnknownEdge(*id));
                }
            }
            let mut delete = tx.prepare_cached("DELETE FROM infections WHERE id = ?1")?;
            for id in ids {
                delete.execute(params![id.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn count_distinct_infected_targets(&self) -> StoreResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT target) FROM infections", [], |row| {
                    row.get(0)
                })?;
        usize::try_from(count).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn max_iteration(&self) -> StoreResult<Option<u32>> {
        Ok(self.conn.query_row(
            "SELECT MAX(iteration) FROM employees WHERE is_infected = 1",
            [],
            |row| row.get(0),
        )?)
    }

    fn average_out_degree_by_generation(&self) -> StoreResult<BTreeMap<u32, f64>> {
        let mut stmt = self.conn.prepare_cached(SELECT_OUT_DEGREE)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|(iteration, edges, nodes)| (iteration, edges as f64 / nodes as f64))
            .collect())
    }
}
