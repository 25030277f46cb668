// ==========================================
// 통합 주문 발주 시스템 - 설정 저장소
// ==========================================
// 담당 테이블: exclusion_pattern
// 중복 발송 확인 설정은 config_kv 를 쓰는 ConfigManager 담당.
// ==========================================

use crate::domain::mapping::ExclusionPattern;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsRepository {
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
    // 발송 제외 패턴
    // ==========================================

    /// 제외 패턴 등록
    ///
    /// 정규식 패턴은 저장 전에 컴파일 검증한다.
    /// 수집 시점에 깨진 패턴을 만나 경고만 남기는 일을 줄이기 위함.
    pub fn insert_pattern(&self, pattern: &ExclusionPattern) -> RepositoryResult<i64> {
        if pattern.is_regex {
            regex::Regex::new(&pattern.pattern).map_err(|e| {
                RepositoryError::ValidationError(format!(
                    "정규식 패턴이 올바르지 않습니다: {}",
                    e
                ))
            })?;
        }

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO exclusion_pattern (pattern, is_regex, description, enabled)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                pattern.pattern,
                pattern.is_regex as i64,
                pattern.description,
                pattern.enabled as i64
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_pattern_enabled(&self, id: i64, enabled: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "UPDATE exclusion_pattern SET enabled = ?2 WHERE id = ?1",
            params![id, enabled as i64],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "exclusion_pattern".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete_pattern(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute("DELETE FROM exclusion_pattern WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "exclusion_pattern".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 전체 패턴 목록 (비활성 포함, 관리 화면용)
    pub fn list_patterns(&self) -> RepositoryResult<Vec<ExclusionPattern>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, pattern, is_regex, description, enabled
             FROM exclusion_pattern ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ExclusionPattern {
                id: Some(row.get(0)?),
                pattern: row.get(1)?,
                is_regex: row.get::<_, i64>(2)? != 0,
                description: row.get(3)?,
                enabled: row.get::<_, i64>(4)? != 0,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> SettingsRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        SettingsRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn literal(pattern: &str) -> ExclusionPattern {
        ExclusionPattern {
            id: None,
            pattern: pattern.to_string(),
            is_regex: false,
            description: None,
            enabled: true,
        }
    }

    #[test]
    fn test_pattern_crud() {
        let repo = test_repo();
        let id = repo.insert_pattern(&literal("센터택배")).unwrap();

        let patterns = repo.list_patterns().unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern, "센터택배");

        repo.set_pattern_enabled(id, false).unwrap();
        assert!(!repo.list_patterns().unwrap()[0].enabled);

        repo.delete_pattern(id).unwrap();
        assert!(repo.list_patterns().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_regex_rejected_at_save() {
        let repo = test_repo();
        let result = repo.insert_pattern(&ExclusionPattern {
            id: None,
            pattern: "[미완성".to_string(),
            is_regex: true,
            description: None,
            enabled: true,
        });
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));

        // 같은 텍스트라도 리터럴이면 허용
        repo.insert_pattern(&literal("[미완성")).unwrap();
    }
}
