// ==========================================
// 통합 주문 발주 시스템 - 통합 테스트 헬퍼
// ==========================================

use order_bridge::db;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 스키마가 초기화된 공유 인메모리 연결 생성
///
/// 모든 저장소가 같은 연결을 공유해야 하나의 시나리오를 구성할 수 있다
#[allow(dead_code)]
pub fn create_test_conn() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().expect("인메모리 DB 열기 실패");
    db::configure_sqlite_connection(&conn).expect("PRAGMA 설정 실패");
    db::init_schema(&conn).expect("스키마 초기화 실패");
    Arc::new(Mutex::new(conn))
}
