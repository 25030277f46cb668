// ==========================================
// 통합 주문 발주 시스템 - 매핑 규칙/동의어 저장소
// ==========================================
// 담당 테이블: mapping_rule_set (payload JSON) / synonym_entry
// 규칙 본문은 JSON 직렬화로 보관한다. 규칙 구조가 바뀌어도
// 테이블 마이그레이션 없이 payload 포맷만 관리하면 된다.
// ==========================================

use crate::domain::mapping::{MappingRuleSet, SynonymEntry};
use crate::domain::types::CanonicalField;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct MappingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MappingRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 매핑 규칙
    // ==========================================

    /// 규칙 저장 (destination_key 기준 전체 교체)
    pub fn save_rule_set(&self, rule_set: &MappingRuleSet) -> RepositoryResult<()> {
        let payload = serde_json::to_string(rule_set)?;
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO mapping_rule_set (destination_key, payload, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(destination_key)
             DO UPDATE SET payload = excluded.payload, updated_at = datetime('now')",
            params![rule_set.destination_key, payload],
        )?;
        Ok(())
    }

    pub fn find_rule_set(&self, destination_key: &str) -> RepositoryResult<Option<MappingRuleSet>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM mapping_rule_set WHERE destination_key = ?1",
                params![destination_key],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            None => Ok(None),
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        }
    }

    pub fn list_rule_sets(&self) -> RepositoryResult<Vec<MappingRuleSet>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT payload FROM mapping_rule_set ORDER BY destination_key")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        payloads
            .iter()
            .map(|json| serde_json::from_str(json).map_err(RepositoryError::from))
            .collect()
    }

    pub fn delete_rule_set(&self, destination_key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "DELETE FROM mapping_rule_set WHERE destination_key = ?1",
            params![destination_key],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "mapping_rule_set".to_string(),
                id: destination_key.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 동의어 사전
    // ==========================================

    /// 동의어 등록
    ///
    /// 활성 항목끼리 같은 synonym 텍스트가 다른 필드를 가리키면
    /// 해석이 모호해지므로 등록을 거부한다.
    pub fn insert_synonym(&self, entry: &SynonymEntry) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        if entry.enabled {
            let conflict: Option<String> = conn
                .query_row(
                    "SELECT field_key FROM synonym_entry
                     WHERE synonym = ?1 AND enabled = 1 AND field_key != ?2
                     LIMIT 1",
                    params![entry.synonym, entry.field.key()],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(other) = conflict {
                return Err(RepositoryError::ValidationError(format!(
                    "동의어 '{}' 는 이미 다른 필드({})에 등록되어 있습니다",
                    entry.synonym, other
                )));
            }
        }

        conn.execute(
            "INSERT INTO synonym_entry (field_key, synonym, enabled) VALUES (?1, ?2, ?3)",
            params![entry.field.key(), entry.synonym, entry.enabled as i64],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 활성화/비활성화 전환
    ///
    /// 재활성화도 등록과 같은 모호성 검사를 통과해야 한다.
    /// 비활성 상태에서 같은 텍스트가 다른 필드에 활성으로 등록됐을 수
    /// 있기 때문이다.
    pub fn set_synonym_enabled(&self, id: i64, enabled: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let entry: Option<(String, String)> = conn
            .query_row(
                "SELECT field_key, synonym FROM synonym_entry WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (field_key, synonym) = entry.ok_or_else(|| RepositoryError::NotFound {
            entity: "synonym_entry".to_string(),
            id: id.to_string(),
        })?;

        if enabled {
            let conflict: Option<String> = conn
                .query_row(
                    "SELECT field_key FROM synonym_entry
                     WHERE synonym = ?1 AND enabled = 1 AND field_key != ?2
                     LIMIT 1",
                    params![synonym, field_key],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(other) = conflict {
                return Err(RepositoryError::ValidationError(format!(
                    "동의어 '{}' 는 이미 다른 필드({})에 등록되어 있습니다",
                    synonym, other
                )));
            }
        }

        conn.execute(
            "UPDATE synonym_entry SET enabled = ?2 WHERE id = ?1",
            params![id, enabled as i64],
        )?;
        Ok(())
    }

    pub fn delete_synonym(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute("DELETE FROM synonym_entry WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "synonym_entry".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 전체 동의어 목록 (비활성 포함, 관리 화면용)
    pub fn list_synonyms(&self) -> RepositoryResult<Vec<SynonymEntry>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, field_key, synonym, enabled FROM synonym_entry ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)? != 0,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, field_key, synonym, enabled) = row?;
            let field = CanonicalField::from_key(&field_key).ok_or_else(|| {
                RepositoryError::DeserializationError(format!(
                    "알 수 없는 표준 필드 키: {}",
                    field_key
                ))
            })?;
            entries.push(SynonymEntry {
                id: Some(id),
                field,
                synonym,
                enabled,
            });
        }
        Ok(entries)
    }
}
