// ==========================================
// 통합 주문 발주 시스템 - 설정 관리자
// ==========================================
// 담당 테이블: config_scope / config_kv
// 전역 설정은 'global' 스코프의 key-value 로 보관한다.
// 값 포맷: JSON (구조 설정) 또는 평문 (단순 값)
// ==========================================

use crate::domain::mapping::DuplicateCheckSettings;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 전역 스코프 식별자 (init_schema 가 시드)
pub const GLOBAL_SCOPE: &str = "global";

/// 중복 발송 확인 설정 키
pub const KEY_DUPLICATE_CHECK: &str = "duplicate_check";

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
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
    // key-value 기본 연산
    // ==========================================

    pub fn get_value(&self, scope_id: &str, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, scope_id: &str, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key)
             DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            params![scope_id, key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // 중복 발송 확인 설정
    // ==========================================

    /// 중복 발송 확인 설정 조회 (미설정이면 기본값)
    pub fn get_duplicate_check_settings(&self) -> RepositoryResult<DuplicateCheckSettings> {
        match self.get_value(GLOBAL_SCOPE, KEY_DUPLICATE_CHECK)? {
            None => Ok(DuplicateCheckSettings::default()),
            Some(json) => Ok(serde_json::from_str(&json)?),
        }
    }

    /// 중복 발송 확인 설정 저장
    ///
    /// 확인 기간은 허용 값({10, 15, 20, 30}일)만 받는다.
    pub fn set_duplicate_check_settings(
        &self,
        settings: DuplicateCheckSettings,
    ) -> RepositoryResult<()> {
        if !DuplicateCheckSettings::is_valid_period(settings.period_days) {
            return Err(RepositoryError::ValidationError(format!(
                "허용되지 않는 중복 확인 기간: {}일 (허용: {:?})",
                settings.period_days,
                DuplicateCheckSettings::ALLOWED_PERIODS
            )));
        }

        let json = serde_json::to_string(&settings)?;
        self.set_value(GLOBAL_SCOPE, KEY_DUPLICATE_CHECK, &json)
    }
}
