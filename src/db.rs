// ==========================================
// 통합 주문 발주 시스템 - SQLite 연결 초기화
// ==========================================
// 목표:
// - 모든 Connection::open 의 PRAGMA 동작 통일 (외래키 일부만 켜지는 상황 방지)
// - busy_timeout 통일로 동시 기록 시 간헐적 busy 오류 완화
// - 스키마 생성을 한 곳에서 관리
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 기본 busy_timeout (밀리초)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 현재 코드가 기대하는 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// SQLite 연결의 통일 PRAGMA 설정
///
/// 설명:
/// - foreign_keys 는 연결마다 따로 켜야 한다
/// - busy_timeout 도 연결마다 따로 설정해야 한다
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// SQLite 연결을 열고 통일 설정 적용
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// schema_version 조회 (테이블이 없으면 None)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 전체 스키마 초기화 (존재하면 건너뜀)
///
/// 테이블 구성:
/// - order_record: 정규화 주문 레코드
/// - manufacturer / product_code_map / option_name_map: 제조사 분류 기준
/// - mapping_rule_set: 목적지별 매핑 규칙 (JSON payload)
/// - synonym_entry: 헤더 동의어 사전
/// - exclusion_pattern: 발송 제외 패턴
/// - send_log: 발송 이력 (append-only)
/// - config_scope / config_kv: 시스템 설정 (key-value)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS manufacturer (
            manufacturer_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            order_email TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS product_code_map (
            product_code TEXT PRIMARY KEY,
            manufacturer_id INTEGER NOT NULL REFERENCES manufacturer(manufacturer_id)
        );

        CREATE TABLE IF NOT EXISTS option_name_map (
            product_name TEXT NOT NULL,
            option_name TEXT NOT NULL,
            manufacturer_id INTEGER NOT NULL REFERENCES manufacturer(manufacturer_id),
            PRIMARY KEY (product_name, option_name)
        );

        CREATE TABLE IF NOT EXISTS order_record (
            order_no TEXT PRIMARY KEY,
            sub_order_no TEXT,
            mall_order_no TEXT,
            product_name TEXT,
            option_name TEXT,
            quantity INTEGER,
            product_code TEXT,
            orderer_name TEXT,
            recipient_name TEXT,
            phone TEXT,
            mobile TEXT,
            postal_code TEXT,
            address TEXT,
            payment_amount INTEGER,
            cost INTEGER,
            shipping_cost INTEGER,
            manufacturer_id INTEGER REFERENCES manufacturer(manufacturer_id),
            mall_name TEXT,
            fulfillment_type TEXT,
            excluded INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            ordered_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mapping_rule_set (
            destination_key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS synonym_entry (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            field_key TEXT NOT NULL,
            synonym TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS exclusion_pattern (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pattern TEXT NOT NULL,
            is_regex INTEGER NOT NULL DEFAULT 0,
            description TEXT,
            enabled INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS send_log (
            send_id TEXT PRIMARY KEY,
            manufacturer_id INTEGER NOT NULL,
            addresses TEXT NOT NULL,
            reason TEXT,
            sent_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
