// ==========================================
// 통합 주문 발주 시스템 - 주문 저장소
// ==========================================
// 담당 테이블: order_record
// 불변 규칙: order_no 는 생성 후 변경 불가.
//            같은 주문번호 재수집은 INSERT OR IGNORE 로 무시된다.
// ==========================================

use crate::domain::order::CanonicalOrderRecord;
use crate::domain::types::OrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
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
    // 수집
    // ==========================================

    /// 정규화 주문 레코드 일괄 삽입
    ///
    /// 이미 존재하는 order_no 는 건드리지 않는다 (재수집 멱등성).
    /// 반환값은 실제로 새로 삽입된 건수.
    pub fn insert_orders_ignore_existing(
        &self,
        records: &[CanonicalOrderRecord],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO order_record (
                    order_no, sub_order_no, mall_order_no,
                    product_name, option_name, quantity, product_code,
                    orderer_name, recipient_name, phone, mobile, postal_code, address,
                    payment_amount, cost, shipping_cost,
                    manufacturer_id, mall_name, fulfillment_type,
                    excluded, status, ordered_at, created_at, updated_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                    ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
                )",
            )?;

            for record in records {
                let n = stmt.execute(params![
                    record.order_no,
                    record.sub_order_no,
                    record.mall_order_no,
                    record.product_name,
                    record.option_name,
                    record.quantity,
                    record.product_code,
                    record.orderer_name,
                    record.recipient_name,
                    record.phone,
                    record.mobile,
                    record.postal_code,
                    record.address,
                    record.payment_amount,
                    record.cost,
                    record.shipping_cost,
                    record.manufacturer_id,
                    record.mall_name,
                    record.fulfillment_type,
                    record.excluded as i64,
                    record.status.to_string(),
                    record.ordered_at,
                    record.created_at,
                    record.updated_at,
                ])?;
                inserted += n;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!("주문 일괄 삽입: 요청 {} 건, 신규 {} 건", records.len(), inserted);
        Ok(inserted)
    }

    // ==========================================
    // 조회
    // ==========================================

    pub fn find_by_order_no(
        &self,
        order_no: &str,
    ) -> RepositoryResult<Option<CanonicalOrderRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                &format!("{} WHERE order_no = ?1", SELECT_BASE),
                params![order_no],
                map_order_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<CanonicalOrderRecord>> {
        self.query_orders(&format!("{} ORDER BY order_no", SELECT_BASE), &[])
    }

    /// 미분류 주문 (manufacturer_id IS NULL) 조회
    pub fn list_unclassified(&self) -> RepositoryResult<Vec<CanonicalOrderRecord>> {
        self.query_orders(
            &format!("{} WHERE manufacturer_id IS NULL ORDER BY order_no", SELECT_BASE),
            &[],
        )
    }

    /// 특정 제조사의 발송 가능 주문 조회 (제외 플래그 제외)
    pub fn list_sendable_by_manufacturer(
        &self,
        manufacturer_id: i64,
    ) -> RepositoryResult<Vec<CanonicalOrderRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE manufacturer_id = ?1 AND excluded = 0 ORDER BY order_no",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![manufacturer_id], map_order_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)
    }

    pub fn list_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<CanonicalOrderRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE status = ?1 ORDER BY order_no",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![status.to_string()], map_order_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)
    }

    fn query_orders(
        &self,
        sql: &str,
        params_slice: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<CanonicalOrderRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_slice, map_order_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)
    }

    // ==========================================
    // 갱신
    // ==========================================

    /// 제조사 분류 결과 반영
    ///
    /// (order_no, manufacturer_id) 쌍을 하나의 트랜잭션으로 갱신한다.
    /// 재분류(사후 보정)에도 같은 경로를 쓴다.
    pub fn update_manufacturer_bulk(
        &self,
        assignments: &[(String, i64)],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut updated = 0usize;
        {
            let mut stmt = tx.prepare(
                "UPDATE order_record
                 SET manufacturer_id = ?2, updated_at = ?3
                 WHERE order_no = ?1",
            )?;
            let now = Utc::now();
            for (order_no, manufacturer_id) in assignments {
                updated += stmt.execute(params![order_no, manufacturer_id, now])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(updated)
    }

    /// 발송 상태 일괄 전이
    pub fn update_status_bulk(
        &self,
        order_nos: &[String],
        status: OrderStatus,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut updated = 0usize;
        {
            let mut stmt = tx.prepare(
                "UPDATE order_record SET status = ?2, updated_at = ?3 WHERE order_no = ?1",
            )?;
            let now = Utc::now();
            for order_no in order_nos {
                updated += stmt.execute(params![order_no, status.to_string(), now])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(updated)
    }

    /// 제외 플래그 갱신 (제외 패턴 변경 후 재평가용)
    pub fn update_excluded(&self, order_no: &str, excluded: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "UPDATE order_record SET excluded = ?2, updated_at = ?3 WHERE order_no = ?1",
            params![order_no, excluded as i64, Utc::now()],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "order_record".to_string(),
                id: order_no.to_string(),
            });
        }
        Ok(())
    }
}

const SELECT_BASE: &str = "SELECT
    order_no, sub_order_no, mall_order_no,
    product_name, option_name, quantity, product_code,
    orderer_name, recipient_name, phone, mobile, postal_code, address,
    payment_amount, cost, shipping_cost,
    manufacturer_id, mall_name, fulfillment_type,
    excluded, status, ordered_at, created_at, updated_at
 FROM order_record";

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<CanonicalOrderRecord> {
    let status_str: String = row.get(20)?;
    let status = OrderStatus::from_db_str(&status_str).unwrap_or(OrderStatus::Pending);

    Ok(CanonicalOrderRecord {
        order_no: row.get(0)?,
        sub_order_no: row.get(1)?,
        mall_order_no: row.get(2)?,
        product_name: row.get(3)?,
        option_name: row.get(4)?,
        quantity: row.get(5)?,
        product_code: row.get(6)?,
        orderer_name: row.get(7)?,
        recipient_name: row.get(8)?,
        phone: row.get(9)?,
        mobile: row.get(10)?,
        postal_code: row.get(11)?,
        address: row.get(12)?,
        payment_amount: row.get(13)?,
        cost: row.get(14)?,
        shipping_cost: row.get(15)?,
        manufacturer_id: row.get(16)?,
        mall_name: row.get(17)?,
        fulfillment_type: row.get(18)?,
        excluded: row.get::<_, i64>(19)? != 0,
        status,
        ordered_at: row.get(21)?,
        created_at: row.get(22)?,
        updated_at: row.get(23)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::RawOrderRecord;

    fn test_repo() -> OrderRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        OrderRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn sample(order_no: &str) -> CanonicalOrderRecord {
        let raw = RawOrderRecord {
            order_no: Some(order_no.to_string()),
            sub_order_no: None,
            mall_order_no: None,
            product_name: Some("유리컵 2P".to_string()),
            option_name: Some("400ml".to_string()),
            quantity: Some(2),
            product_code: None,
            orderer_name: None,
            recipient_name: Some("이수취".to_string()),
            phone: None,
            mobile: None,
            postal_code: None,
            address: Some("서울시 강남구".to_string()),
            payment_amount: Some(15900),
            cost: None,
            shipping_cost: None,
            mall_name: None,
            fulfillment_type: None,
            ordered_at: None,
            row_number: 2,
        };
        raw.into_canonical(Utc::now()).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        let repo = test_repo();
        let inserted = repo.insert_orders_ignore_existing(&[sample("ORD-1")]).unwrap();
        assert_eq!(inserted, 1);

        let found = repo.find_by_order_no("ORD-1").unwrap().unwrap();
        assert_eq!(found.recipient_name, Some("이수취".to_string()));
        assert_eq!(found.status, OrderStatus::Pending);
        assert!(repo.find_by_order_no("ORD-2").unwrap().is_none());
    }

    #[test]
    fn test_reimport_does_not_overwrite() {
        let repo = test_repo();
        repo.insert_orders_ignore_existing(&[sample("ORD-1")]).unwrap();

        // 같은 주문번호로 내용이 다른 레코드 재수집
        let mut changed = sample("ORD-1");
        changed.recipient_name = Some("다른사람".to_string());
        let inserted = repo.insert_orders_ignore_existing(&[changed]).unwrap();
        assert_eq!(inserted, 0);

        let found = repo.find_by_order_no("ORD-1").unwrap().unwrap();
        assert_eq!(found.recipient_name, Some("이수취".to_string()));
    }

    #[test]
    fn test_classification_update_and_unclassified_list() {
        let repo = test_repo();
        repo.insert_orders_ignore_existing(&[sample("ORD-1"), sample("ORD-2")])
            .unwrap();
        assert_eq!(repo.list_unclassified().unwrap().len(), 2);

        let conn = repo.get_conn().unwrap();
        conn.execute(
            "INSERT INTO manufacturer (name) VALUES ('한빛유리')",
            [],
        )
        .unwrap();
        drop(conn);

        let updated = repo
            .update_manufacturer_bulk(&[("ORD-1".to_string(), 1)])
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(repo.list_unclassified().unwrap().len(), 1);
        assert_eq!(repo.list_sendable_by_manufacturer(1).unwrap().len(), 1);
    }

    #[test]
    fn test_status_bulk_transition() {
        let repo = test_repo();
        repo.insert_orders_ignore_existing(&[sample("ORD-1"), sample("ORD-2")])
            .unwrap();

        let updated = repo
            .update_status_bulk(&["ORD-1".to_string(), "ORD-2".to_string()], OrderStatus::Sent)
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(repo.list_by_status(OrderStatus::Sent).unwrap().len(), 2);
        assert!(repo.list_by_status(OrderStatus::Pending).unwrap().is_empty());
    }

    #[test]
    fn test_update_excluded_missing_order() {
        let repo = test_repo();
        let result = repo.update_excluded("NOPE", true);
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}
