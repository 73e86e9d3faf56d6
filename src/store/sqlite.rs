//! SQLite results table, one row per trial.
//!
//! The store owns a current-thread Tokio runtime and drives sqlx from the synchronous batch
//! loop. All rows of a run go into one transaction that [`TrialSink::finish`] commits; dropping
//! an unfinished store rolls the run back.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::combat::{TrialResult, Winner};
use crate::store::{StoreError, TrialSink};

pub const DEFAULT_DB_PATH: &str = "sim.db";

const DROP_TABLE: &str = "DROP TABLE IF EXISTS simulations";

const CREATE_TABLE: &str = r#"
    CREATE TABLE simulations (
        winner      TEXT,
        rounds      INTEGER,
        pcs         INTEGER,
        pchp        INTEGER,
        pcdam       INTEGER,
        monsters    INTEGER,
        monsterhp   INTEGER,
        monsterdam  INTEGER
    )
"#;

const INSERT_TRIAL: &str = r#"
    INSERT INTO simulations (winner, rounds, pcs, pchp, pcdam, monsters, monsterhp, monsterdam)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_TRIALS: &str = r#"
    SELECT winner, rounds, pcs, pchp, pcdam, monsters, monsterhp, monsterdam
    FROM simulations
    ORDER BY rowid
"#;

type TrialRow = (String, i64, i64, i64, i64, i64, i64, i64);

fn runtime() -> Result<Runtime, StoreError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

pub struct SqliteStore {
    runtime: Runtime,
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    rows: u64,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and start a fresh `simulations` table. Results
    /// of any earlier run are discarded.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let runtime = runtime()?;
        let (pool, tx) = runtime.block_on(async {
            let pool = connect(path, true).await?;
            sqlx::query(DROP_TABLE).execute(&pool).await?;
            sqlx::query(CREATE_TABLE).execute(&pool).await?;
            let tx = pool.begin().await?;
            Ok::<_, sqlx::Error>((pool, tx))
        })?;
        info!(path = %path.display(), "created simulations table");

        Ok(Self {
            runtime,
            pool,
            tx: Some(tx),
            rows: 0,
        })
    }

    /// Rows recorded by this store so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl TrialSink for SqliteStore {
    fn record_trial(&mut self, result: &TrialResult) -> Result<(), StoreError> {
        let tx = self.tx.as_mut().ok_or(StoreError::Closed)?;
        self.runtime.block_on(
            sqlx::query(INSERT_TRIAL)
                .bind(result.winner.as_str())
                .bind(i64::from(result.rounds))
                .bind(i64::from(result.pcs))
                .bind(result.pchp)
                .bind(result.pcdam)
                .bind(i64::from(result.monsters))
                .bind(result.monsterhp)
                .bind(result.monsterdam)
                .execute(&mut **tx),
        )?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(StoreError::Closed)?;
        self.runtime.block_on(async {
            tx.commit().await?;
            self.pool.close().await;
            Ok::<_, sqlx::Error>(())
        })?;
        debug!(rows = self.rows, "committed simulations table");
        Ok(())
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        let tx = self.tx.take();
        let pool = &self.pool;
        self.runtime.block_on(async {
            if let Some(tx) = tx {
                if let Err(err) = tx.rollback().await {
                    warn!(%err, "failed to roll back unfinished run");
                }
            }
            pool.close().await;
        });
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, column: &str, row: usize) -> Result<T, StoreError> {
    T::try_from(value).map_err(|_| StoreError::InvalidRow {
        row,
        reason: format!("{column} out of range: {value}"),
    })
}

fn row_to_trial(index: usize, row: TrialRow) -> Result<TrialResult, StoreError> {
    let (winner, rounds, pcs, pchp, pcdam, monsters, monsterhp, monsterdam) = row;
    let winner: Winner = winner
        .parse()
        .map_err(|reason| StoreError::InvalidRow { row: index, reason })?;
    Ok(TrialResult {
        winner,
        rounds: narrow(rounds, "rounds", index)?,
        pcs: narrow(pcs, "pcs", index)?,
        pchp: narrow(pchp, "pchp", index)?,
        pcdam: narrow(pcdam, "pcdam", index)?,
        monsters: narrow(monsters, "monsters", index)?,
        monsterhp: narrow(monsterhp, "monsterhp", index)?,
        monsterdam: narrow(monsterdam, "monsterdam", index)?,
    })
}

/// Read every stored trial back, in insertion order.
pub fn load_trials(path: impl AsRef<Path>) -> Result<Vec<TrialResult>, StoreError> {
    let path = path.as_ref();
    let runtime = runtime()?;
    let rows: Vec<TrialRow> = runtime.block_on(async {
        let pool = connect(path, false).await?;
        let rows = sqlx::query_as::<_, TrialRow>(SELECT_TRIALS)
            .fetch_all(&pool)
            .await;
        pool.close().await;
        rows
    })?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| row_to_trial(index, row))
        .collect()
}
