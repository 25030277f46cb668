// ==========================================
// 통합 주문 발주 시스템 - 발송 이력 저장소
// ==========================================
// 담당 테이블: send_log (append-only)
// 발송 성공 1회당 1건 생성, 이후 수정/삭제 없음.
// addresses 는 정규화 주소 목록의 JSON 배열로 보관한다.
// ==========================================

use crate::domain::mapping::SendRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub struct SendLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SendLogRepository {
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

    /// 발송 이력 추가 (send_id 는 여기서 발급)
    pub fn append(
        &self,
        manufacturer_id: i64,
        addresses: &[String],
        reason: Option<&str>,
        sent_at: DateTime<Utc>,
    ) -> RepositoryResult<SendRecord> {
        let record = SendRecord {
            send_id: Uuid::new_v4().to_string(),
            manufacturer_id,
            addresses: addresses.to_vec(),
            reason: reason.map(|r| r.to_string()),
            sent_at,
        };

        let addresses_json = serde_json::to_string(&record.addresses)?;
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO send_log (send_id, manufacturer_id, addresses, reason, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.send_id,
                record.manufacturer_id,
                addresses_json,
                record.reason,
                record.sent_at
            ],
        )?;
        Ok(record)
    }

    /// 특정 제조사의 최근 발송 이력 (since 이후, 최신순)
    ///
    /// 중복 발송 탐지 엔진의 입력이 된다.
    pub fn find_recent(
        &self,
        manufacturer_id: i64,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<SendRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT send_id, manufacturer_id, addresses, reason, sent_at
             FROM send_log
             WHERE manufacturer_id = ?1 AND sent_at >= ?2
             ORDER BY sent_at DESC",
        )?;
        let rows = stmt.query_map(params![manufacturer_id, since], map_send_row)?;

        let mut records = Vec::new();
        for row in rows {
            let (send_id, manufacturer_id, addresses_json, reason, sent_at) = row?;
            records.push(SendRecord {
                send_id,
                manufacturer_id,
                addresses: serde_json::from_str(&addresses_json)?,
                reason,
                sent_at,
            });
        }
        Ok(records)
    }
}

type SendRow = (String, i64, String, Option<String>, DateTime<Utc>);

fn map_send_row(row: &Row<'_>) -> rusqlite::Result<SendRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_repo() -> SendLogRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        SendLogRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_append_and_window_query() {
        let repo = test_repo();
        let now = Utc::now();

        repo.append(1, &["서울시 강남구 1".to_string()], None, now - Duration::days(20))
            .unwrap();
        repo.append(
            1,
            &["서울시 강남구 2".to_string()],
            Some("고객 요청 재발송".to_string()).as_deref(),
            now - Duration::days(5),
        )
        .unwrap();
        repo.append(2, &["부산시 해운대구".to_string()], None, now - Duration::days(1))
            .unwrap();

        // 10일 창: 제조사 1 은 5일 전 건만 잡힌다
        let recent = repo.find_recent(1, now - Duration::days(10)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].addresses, vec!["서울시 강남구 2".to_string()]);
        assert_eq!(recent[0].reason, Some("고객 요청 재발송".to_string()));

        // 30일 창: 두 건 모두, 최신순
        let recent = repo.find_recent(1, now - Duration::days(30)).unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].sent_at > recent[1].sent_at);

        // 다른 제조사 이력은 섞이지 않는다
        assert_eq!(repo.find_recent(2, now - Duration::days(30)).unwrap().len(), 1);
    }

    #[test]
    fn test_send_id_is_unique() {
        let repo = test_repo();
        let now = Utc::now();
        let a = repo.append(1, &["주소 A".to_string()], None, now).unwrap();
        let b = repo.append(1, &["주소 A".to_string()], None, now).unwrap();
        assert_ne!(a.send_id, b.send_id);
    }
}
