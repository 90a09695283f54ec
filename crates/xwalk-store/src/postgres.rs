//! # Postgres Store
//!
//! SQLx-backed implementation of all three collaborator traits. The schema
//! lives in `migrations/` and is applied on [`PgStore::connect`].
//!
//! ## Atomicity
//!
//! The manual upsert runs in one transaction: mapping row upsert on
//! `(source_control_id, target_control_id)`, delete of every existing hint,
//! insert of the new hints. A failure at any step rolls all of it back.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;
use xwalk_core::{
    Control, ControlMapping, CrosswalkResponse, EvidenceReuseHint, ManualMappingWrite,
    MappingOrigin, MappingRecord, WarmupEntry,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{FrameworkCatalog, MappingStore, WarmupCache};

const CONTROL_COLUMNS: &str = "id, framework_id, title, description, family, metadata";

const RECORD_SELECT: &str = "SELECT m.id, m.source_control_id, m.target_control_id, m.confidence,
        m.origin, m.tags, m.rationale, m.created_at, m.updated_at,
        s.framework_id AS s_framework_id, s.title AS s_title, s.description AS s_description,
        s.family AS s_family, s.metadata AS s_metadata,
        t.framework_id AS t_framework_id, t.title AS t_title, t.description AS t_description,
        t.family AS t_family, t.metadata AS t_metadata
    FROM control_mappings m
    JOIN controls s ON s.id = m.source_control_id
    JOIN controls t ON t.id = m.target_control_id";

/// Postgres-backed catalog, mapping store, and warmup cache.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool. Migrations are assumed to be applied.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and apply embedded migrations.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Round-trip a trivial query; used by readiness probes.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn record_by_id(&self, mapping_id: &str) -> StoreResult<Option<MappingRecord>> {
        let sql = format!("{RECORD_SELECT} WHERE m.id = $1");
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(mapping_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.attach_hints(rows).await?.into_iter().next())
    }

    async fn attach_hints(&self, rows: Vec<RecordRow>) -> StoreResult<Vec<MappingRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let hint_rows = sqlx::query_as::<_, HintRow>(
            "SELECT id, mapping_id, summary, rationale, score, evidence_id
             FROM evidence_reuse_hints WHERE mapping_id = ANY($1)
             ORDER BY mapping_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut hints: HashMap<String, Vec<EvidenceReuseHint>> = HashMap::new();
        for row in hint_rows {
            hints.entry(row.mapping_id.clone()).or_default().push(row.into_hint());
        }

        rows.into_iter()
            .map(|row| {
                let evidence = hints.remove(&row.id).unwrap_or_default();
                row.into_record(evidence)
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct ControlRow {
    id: String,
    framework_id: String,
    title: String,
    description: Option<String>,
    family: String,
    metadata: serde_json::Value,
}

impl ControlRow {
    fn into_control(self) -> StoreResult<Control> {
        Ok(Control {
            metadata: metadata_map(&self.id, self.metadata)?,
            id: self.id,
            framework_id: self.framework_id,
            title: self.title,
            description: self.description,
            family: self.family,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    source_control_id: String,
    target_control_id: String,
    confidence: f64,
    origin: String,
    tags: Vec<String>,
    rationale: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    s_framework_id: String,
    s_title: String,
    s_description: Option<String>,
    s_family: String,
    s_metadata: serde_json::Value,
    t_framework_id: String,
    t_title: String,
    t_description: Option<String>,
    t_family: String,
    t_metadata: serde_json::Value,
}

impl RecordRow {
    fn into_record(self, evidence_hints: Vec<EvidenceReuseHint>) -> StoreResult<MappingRecord> {
        let origin = MappingOrigin::parse(&self.origin).ok_or_else(|| {
            StoreError::CorruptRow(format!(
                "mapping {} has unknown origin {:?}",
                self.id, self.origin
            ))
        })?;
        let source = ControlRow {
            id: self.source_control_id.clone(),
            framework_id: self.s_framework_id,
            title: self.s_title,
            description: self.s_description,
            family: self.s_family,
            metadata: self.s_metadata,
        }
        .into_control()?;
        let target = ControlRow {
            id: self.target_control_id.clone(),
            framework_id: self.t_framework_id,
            title: self.t_title,
            description: self.t_description,
            family: self.t_family,
            metadata: self.t_metadata,
        }
        .into_control()?;

        Ok(MappingRecord {
            mapping: ControlMapping {
                id: self.id,
                source_control_id: self.source_control_id,
                target_control_id: self.target_control_id,
                confidence: self.confidence,
                origin,
                tags: self.tags,
                rationale: self.rationale,
                evidence_hints,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            source,
            target,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HintRow {
    id: String,
    mapping_id: String,
    summary: String,
    rationale: Option<String>,
    score: f64,
    evidence_id: Option<String>,
}

impl HintRow {
    fn into_hint(self) -> EvidenceReuseHint {
        EvidenceReuseHint {
            id: self.id,
            summary: self.summary,
            rationale: self.rationale,
            score: self.score,
            evidence_id: self.evidence_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WarmupRow {
    framework_id: String,
    payload: serde_json::Value,
    generated_at: DateTime<Utc>,
}

fn metadata_map(
    control_id: &str,
    value: serde_json::Value,
) -> StoreResult<BTreeMap<String, serde_json::Value>> {
    match value {
        serde_json::Value::Null => Ok(BTreeMap::new()),
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(StoreError::CorruptRow(format!(
            "control {control_id} metadata is not an object: {other}"
        ))),
    }
}

#[async_trait]
impl FrameworkCatalog for PgStore {
    async fn framework_exists(&self, framework_id: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM frameworks WHERE id = $1)")
                .bind(framework_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn controls_in(&self, framework_id: &str) -> StoreResult<Vec<Control>> {
        let sql = format!(
            "SELECT {CONTROL_COLUMNS} FROM controls WHERE framework_id = $1 ORDER BY position"
        );
        let rows = sqlx::query_as::<_, ControlRow>(&sql)
            .bind(framework_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ControlRow::into_control).collect()
    }

    async fn controls_outside(&self, framework_id: &str) -> StoreResult<Vec<Control>> {
        let sql = format!(
            "SELECT {CONTROL_COLUMNS} FROM controls WHERE framework_id <> $1 ORDER BY position"
        );
        let rows = sqlx::query_as::<_, ControlRow>(&sql)
            .bind(framework_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ControlRow::into_control).collect()
    }

    async fn control(&self, control_id: &str) -> StoreResult<Option<Control>> {
        let sql = format!("SELECT {CONTROL_COLUMNS} FROM controls WHERE id = $1");
        let row = sqlx::query_as::<_, ControlRow>(&sql)
            .bind(control_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ControlRow::into_control).transpose()
    }
}

#[async_trait]
impl MappingStore for PgStore {
    async fn mappings_from(
        &self,
        source_framework_id: &str,
        target_framework_id: Option<&str>,
    ) -> StoreResult<Vec<MappingRecord>> {
        let sql = format!(
            "{RECORD_SELECT} WHERE s.framework_id = $1
             AND ($2::text IS NULL OR t.framework_id = $2)
             ORDER BY m.created_at, m.id"
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(source_framework_id)
            .bind(target_framework_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_hints(rows).await
    }

    async fn upsert_manual(&self, write: ManualMappingWrite) -> StoreResult<MappingRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mapping_id: String = sqlx::query_scalar(
            "INSERT INTO control_mappings (id, source_control_id, target_control_id, confidence,
             origin, tags, rationale, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             ON CONFLICT (source_control_id, target_control_id) DO UPDATE SET
                confidence = EXCLUDED.confidence,
                tags = EXCLUDED.tags,
                rationale = EXCLUDED.rationale,
                updated_at = EXCLUDED.updated_at
             RETURNING id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&write.source_control_id)
        .bind(&write.target_control_id)
        .bind(write.confidence)
        .bind(MappingOrigin::Manual.as_str())
        .bind(&write.tags)
        .bind(&write.rationale)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM evidence_reuse_hints WHERE mapping_id = $1")
            .bind(&mapping_id)
            .execute(&mut *tx)
            .await?;

        for (position, hint) in write.evidence_hints.iter().enumerate() {
            sqlx::query(
                "INSERT INTO evidence_reuse_hints (id, mapping_id, position, summary, rationale,
                 score, evidence_id) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&mapping_id)
            .bind(position as i32)
            .bind(&hint.summary)
            .bind(&hint.rationale)
            .bind(hint.score)
            .bind(&hint.evidence_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.record_by_id(&mapping_id).await?.ok_or_else(|| {
            StoreError::Integrity(format!("mapping {mapping_id} missing after upsert"))
        })
    }

    async fn delete_mapping(
        &self,
        source_control_id: &str,
        target_control_id: &str,
    ) -> StoreResult<bool> {
        // Hints go with the mapping via ON DELETE CASCADE.
        let result = sqlx::query(
            "DELETE FROM control_mappings WHERE source_control_id = $1 AND target_control_id = $2",
        )
        .bind(source_control_id)
        .bind(target_control_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WarmupCache for PgStore {
    async fn warmup(&self, framework_id: &str) -> StoreResult<Option<WarmupEntry>> {
        let row = sqlx::query_as::<_, WarmupRow>(
            "SELECT framework_id, payload, generated_at FROM crosswalk_warmup
             WHERE framework_id = $1",
        )
        .bind(framework_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: CrosswalkResponse = serde_json::from_value(row.payload).map_err(|e| {
            StoreError::CorruptRow(format!(
                "warmup payload for {} is not a crosswalk response: {e}",
                row.framework_id
            ))
        })?;
        Ok(Some(WarmupEntry {
            framework_id: row.framework_id,
            crosswalk_payload: payload,
            generated_at: row.generated_at,
        }))
    }

    async fn invalidate(&self, framework_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM crosswalk_warmup WHERE framework_id = $1")
            .bind(framework_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
