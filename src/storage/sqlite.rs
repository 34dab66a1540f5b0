//! SQLite-backed job store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, ErrorCode, Row, params, params_from_iter};

use crate::error::{AppError, Result};
use crate::models::{Category, Level, Posting, SalaryRange, StoredPosting};
use crate::storage::schema::migrate;
use crate::storage::{BROAD_LOCATIONS, BoardStats, InsertOutcome, JobFilter, JobStore};

const SELECT_COLUMNS: &str = "id, identity_key, title, company, location, salary_min, salary_max,
     salary_currency, salary_interval, job_url, source, description, level, category,
     date_posted, created_at";

/// SQLite job store.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// Any failure here means the store is unavailable for the run.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::storage_unavailable(format!("{}: {e}", parent.display()))
                })?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| AppError::storage_unavailable(format!("{}: {e}", path.display())))?;
        Self::from_connection(conn)
    }

    /// Fresh private database, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::storage_unavailable)?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        register_functions(&conn).map_err(AppError::storage_unavailable)?;
        migrate(&mut conn).map_err(AppError::storage_unavailable)?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))
            .map_err(AppError::storage_unavailable)?;
        log::debug!("Job store ready with {} postings", count);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::storage_unavailable("connection lock poisoned"))
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredPosting> {
        let level: Option<String> = row.get(12)?;
        let category: String = row.get(13)?;
        let date_posted: Option<String> = row.get(14)?;
        let created_at: String = row.get(15)?;

        let posted = date_posted
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| conversion_error(14, e))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| conversion_error(15, e))?
            .with_timezone(&Utc);

        Ok(StoredPosting {
            id: row.get(0)?,
            identity_key: row.get(1)?,
            created_at,
            posting: Posting {
                title: row.get(2)?,
                company: row.get(3)?,
                location: row.get(4)?,
                salary: SalaryRange::new(row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?),
                url: row.get(9)?,
                source: row.get(10)?,
                description: row.get(11)?,
                level: level.and_then(|l| l.parse().ok()),
                category: category.parse().unwrap_or(Category::GeneralLd),
                posted,
            },
        })
    }

    fn collect_strings(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn count_where(conn: &Connection, condition: &str, args: &[&dyn ToSql]) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM jobs WHERE {condition}");
        let n: i64 = conn.query_row(&sql, args, |r| r.get(0))?;
        Ok(n as usize)
    }

    fn group_counts(conn: &Connection, column: &str) -> Result<Vec<(String, usize)>> {
        let sql = format!(
            "SELECT COALESCE({column}, 'unspecified'), COUNT(*) FROM jobs GROUP BY 1 ORDER BY 1"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        let mut counts = Vec::new();
        for row in rows {
            let (key, n) = row?;
            counts.push((key, n as usize));
        }
        Ok(counts)
    }
}

/// SQLite's `lower()` folds ASCII only; filters need full Unicode case folding.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

/// Two-letter state suffix of a "City, ST" location, lowercased.
fn state_suffix(location: &str) -> Option<String> {
    let (_, tail) = location.rsplit_once(',')?;
    let state = tail.split_whitespace().next()?;
    if state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(format!(", {}", state.to_ascii_lowercase()))
    } else {
        None
    }
}

impl JobStore for SqliteJobStore {
    fn insert(&self, posting: &Posting) -> Result<InsertOutcome> {
        let conn = self.conn()?;
        let salary = posting.salary.clone().unwrap_or_default();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = conn.execute(
            "INSERT INTO jobs
             (identity_key, title, company, location, salary_min, salary_max, salary_currency,
              salary_interval, job_url, source, description, level, category, date_posted,
              created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                posting.identity_key(),
                posting.title,
                posting.company,
                posting.location,
                salary.min,
                salary.max,
                salary.currency,
                salary.interval,
                posting.url,
                posting.source,
                posting.description,
                posting.level.map(|l| l.as_str()),
                posting.category.as_str(),
                posting.posted.map(|d| d.format("%Y-%m-%d").to_string()),
                created_at,
            ],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(conn.last_insert_rowid())),
            Err(e) if is_constraint_violation(&e) => Ok(InsertOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    fn query(&self, filter: &JobFilter) -> Result<Vec<StoredPosting>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(keyword) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            clauses.push(
                "(instr(unicode_lower(title), ?) > 0 OR instr(unicode_lower(company), ?) > 0)"
                    .into(),
            );
            let keyword = keyword.to_lowercase();
            args.push(Box::new(keyword.clone()));
            args.push(Box::new(keyword));
        }

        if let Some(level) = filter.level {
            clauses.push("level = ?".into());
            args.push(Box::new(level.as_str()));
        }

        if let Some(location) = filter.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            let mut needles = vec![location.to_lowercase()];
            if filter.include_broad_locations {
                needles.extend(BROAD_LOCATIONS.iter().map(|s| s.to_string()));
                needles.extend(state_suffix(location));
            }
            let alternatives =
                vec!["instr(unicode_lower(location), ?) > 0"; needles.len()].join(" OR ");
            clauses.push(format!("({alternatives})"));
            for needle in needles {
                args.push(Box::new(needle));
            }
        }

        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM jobs");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), Self::read_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn identity_keys(&self) -> Result<HashSet<String>> {
        Ok(self
            .collect_strings("SELECT identity_key FROM jobs")?
            .into_iter()
            .collect())
    }

    fn urls(&self) -> Result<HashSet<String>> {
        Ok(self
            .collect_strings("SELECT job_url FROM jobs")?
            .into_iter()
            .collect())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        Self::count_where(&conn, "1", &[])
    }

    fn stats(&self, today: NaiveDate) -> Result<BoardStats> {
        let conn = self.conn()?;
        let today = today.format("%Y-%m-%d").to_string();

        let companies: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT unicode_lower(company)) FROM jobs WHERE company != ''",
            [],
            |r| r.get(0),
        )?;

        Ok(BoardStats {
            total_jobs: Self::count_where(&conn, "1", &[])?,
            companies: companies as usize,
            remote_jobs: Self::count_where(&conn, "instr(unicode_lower(location), 'remote') > 0", &[])?,
            new_today: Self::count_where(&conn, "created_at >= ?1", &[&today])?,
            with_salary: Self::count_where(
                &conn,
                "salary_min IS NOT NULL OR salary_max IS NOT NULL",
                &[],
            )?,
            by_level: Self::group_counts(&conn, "level")?.into_iter().collect(),
            by_category: Self::group_counts(&conn, "category")?.into_iter().collect(),
        })
    }

    fn locations(&self) -> Result<Vec<String>> {
        self.collect_strings("SELECT DISTINCT location FROM jobs WHERE location != '' ORDER BY location")
    }

    fn clear(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM jobs", [])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn posting(title: &str, company: &str, location: &str, url: &str) -> Posting {
        Posting {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            salary: None,
            url: url.to_string(),
            source: "indeed".to_string(),
            description: String::new(),
            level: Level::infer(title),
            category: Category::infer(title),
            posted: NaiveDate::from_ymd_opt(2026, 10, 1),
        }
    }

    fn seeded_store() -> SqliteJobStore {
        let store = SqliteJobStore::open_in_memory().unwrap();
        for p in [
            posting("Instructional Designer", "Acme", "Orlando, FL", "https://x.io/1"),
            posting("Training Manager", "Globex", "Tampa, FL", "https://x.io/2"),
            posting("Corporate Trainer", "Initech", "Remote", "https://x.io/3"),
            posting("L&D Coordinator", "Acme", "Austin, TX", "https://x.io/4"),
            posting("Learning Consultant", "Umbrella", "United States", "https://x.io/5"),
        ] {
            store.insert(&p).unwrap();
        }
        store
    }

    fn titles(rows: &[StoredPosting]) -> Vec<&str> {
        rows.iter().map(|r| r.posting.title.as_str()).collect()
    }

    #[test]
    fn test_insert_and_read_back() {
        let store = SqliteJobStore::open_in_memory().unwrap();
        let mut p = posting("Instructional Designer", "Acme", "Orlando, FL", "https://x.io/1");
        p.salary = SalaryRange::new(Some(60000.0), Some(75000.0), Some("USD".into()), None);
        p.description = "Build courses".to_string();

        let outcome = store.insert(&p).unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));

        let rows = store.query(&JobFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].posting, p);
        assert_eq!(rows[0].identity_key, p.identity_key());
    }

    #[test]
    fn test_duplicate_identity_key_is_already_exists() {
        let store = SqliteJobStore::open_in_memory().unwrap();
        let first = posting("Corporate Trainer", "Acme", "Remote", "https://x.io/1");
        let mut same_key = first.clone();
        same_key.url = "https://x.io/other".to_string();
        let mut same_url = posting("Other Title", "Other", "Elsewhere", "https://x.io/1");
        same_url.category = Category::GeneralLd;

        assert!(matches!(store.insert(&first).unwrap(), InsertOutcome::Inserted(_)));
        assert_eq!(store.insert(&same_key).unwrap(), InsertOutcome::AlreadyExists);
        assert_eq!(store.insert(&same_url).unwrap(), InsertOutcome::AlreadyExists);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_query_by_keyword_matches_title_or_company() {
        let store = seeded_store();
        let rows = store.query(&JobFilter::default().keyword("ACME")).unwrap();
        assert_eq!(rows.len(), 2);
        let rows = store.query(&JobFilter::default().keyword("trainer")).unwrap();
        assert_eq!(titles(&rows), vec!["Corporate Trainer"]);
    }

    #[test]
    fn test_query_by_level() {
        let store = seeded_store();
        let rows = store.query(&JobFilter::default().level(Level::Senior)).unwrap();
        assert_eq!(titles(&rows), vec!["Training Manager"]);
        let rows = store.query(&JobFilter::default().level(Level::Junior)).unwrap();
        assert_eq!(titles(&rows), vec!["L&D Coordinator"]);
    }

    #[test]
    fn test_query_by_location_substring() {
        let store = seeded_store();
        let rows = store.query(&JobFilter::default().location("orlando")).unwrap();
        assert_eq!(titles(&rows), vec!["Instructional Designer"]);
    }

    #[test]
    fn test_query_broad_locations_include_remote_and_same_state() {
        let store = seeded_store();
        let rows = store
            .query(&JobFilter::default().location("Orlando, FL").broad(true))
            .unwrap();
        let mut found = titles(&rows);
        found.sort();
        assert_eq!(
            found,
            vec![
                "Corporate Trainer",
                "Instructional Designer",
                "Learning Consultant",
                "Training Manager"
            ]
        );
    }

    #[test]
    fn test_query_combines_filters_and_limits() {
        let store = seeded_store();
        let rows = store
            .query(&JobFilter::default().keyword("acme").location("TX"))
            .unwrap();
        assert_eq!(titles(&rows), vec!["L&D Coordinator"]);

        let rows = store.query(&JobFilter::default().limit(2)).unwrap();
        assert_eq!(rows.len(), 2);
        // Newest first
        assert_eq!(rows[0].posting.title, "Learning Consultant");
    }

    #[test]
    fn test_filters_fold_non_ascii_case() {
        let store = SqliteJobStore::open_in_memory().unwrap();
        store
            .insert(&posting(
                "FORMATEUR ÉLECTRIQUE",
                "ÉCOLE DU SAVOIR",
                "MONTRÉAL, QC",
                "https://x.io/fr",
            ))
            .unwrap();

        let by_title = store.query(&JobFilter::default().keyword("électrique")).unwrap();
        assert_eq!(by_title.len(), 1);
        let by_company = store.query(&JobFilter::default().keyword("école")).unwrap();
        assert_eq!(by_company.len(), 1);
        let by_location = store.query(&JobFilter::default().location("montréal")).unwrap();
        assert_eq!(by_location.len(), 1);
        let by_upper = store.query(&JobFilter::default().location("MONTRÉAL")).unwrap();
        assert_eq!(by_upper.len(), 1);
    }

    #[test]
    fn test_stats_and_locations() {
        let store = seeded_store();
        let stats = store.stats(Utc::now().date_naive()).unwrap();
        assert_eq!(stats.total_jobs, 5);
        assert_eq!(stats.companies, 4);
        assert_eq!(stats.remote_jobs, 1);
        assert_eq!(stats.new_today, 5);
        assert_eq!(stats.with_salary, 0);
        assert_eq!(stats.by_level.get("senior"), Some(&1));
        assert_eq!(stats.by_level.get("junior"), Some(&1));
        assert_eq!(stats.by_level.get("mid"), Some(&3));

        let locations = store.locations().unwrap();
        assert_eq!(locations.len(), 5);
        assert_eq!(locations[0], "Austin, TX");
    }

    #[test]
    fn test_keys_urls_and_clear() {
        let store = seeded_store();
        assert_eq!(store.identity_keys().unwrap().len(), 5);
        assert!(store.urls().unwrap().contains("https://x.io/3"));
        assert_eq!(store.clear().unwrap(), 5);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/jobs.db");
        {
            let store = SqliteJobStore::open(&path).unwrap();
            store
                .insert(&posting("Corporate Trainer", "Acme", "Remote", "https://x.io/1"))
                .unwrap();
        }
        let store = SqliteJobStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_unopenable_path_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let result = SqliteJobStore::open(tmp.path());
        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
    }

    #[test]
    fn test_state_suffix() {
        assert_eq!(state_suffix("Orlando, FL"), Some(", fl".to_string()));
        assert_eq!(state_suffix("Tampa, FL 33601"), Some(", fl".to_string()));
        assert_eq!(state_suffix("Remote"), None);
        assert_eq!(state_suffix("London, England"), None);
    }
}
