// ==========================================
// 통합 주문 발주 시스템 - 제조사 저장소
// ==========================================
// 담당 테이블: manufacturer / product_code_map / option_name_map
// 분류 엔진이 쓰는 두 매핑 테이블의 적재도 여기서 담당한다.
// ==========================================

use crate::domain::mapping::Manufacturer;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ManufacturerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ManufacturerRepository {
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
    // 제조사
    // ==========================================

    pub fn insert_manufacturer(
        &self,
        name: &str,
        order_email: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO manufacturer (name, order_email) VALUES (?1, ?2)",
            params![name, order_email],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_order_email(
        &self,
        manufacturer_id: i64,
        order_email: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "UPDATE manufacturer SET order_email = ?2 WHERE manufacturer_id = ?1",
            params![manufacturer_id, order_email],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "manufacturer".to_string(),
                id: manufacturer_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, manufacturer_id: i64) -> RepositoryResult<Option<Manufacturer>> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT manufacturer_id, name, order_email, created_at
                 FROM manufacturer WHERE manufacturer_id = ?1",
                params![manufacturer_id],
                map_manufacturer_row,
            )
            .optional()?;
        Ok(found)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Manufacturer>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT manufacturer_id, name, order_email, created_at
             FROM manufacturer ORDER BY manufacturer_id",
        )?;
        let rows = stmt.query_map([], map_manufacturer_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)
    }

    // ==========================================
    // 분류 매핑 테이블
    // ==========================================

    /// 상품코드 → 제조사 매핑 등록 (같은 코드는 덮어씀)
    pub fn upsert_product_code(
        &self,
        product_code: &str,
        manufacturer_id: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO product_code_map (product_code, manufacturer_id)
             VALUES (?1, ?2)
             ON CONFLICT(product_code) DO UPDATE SET manufacturer_id = excluded.manufacturer_id",
            params![product_code, manufacturer_id],
        )?;
        Ok(())
    }

    /// (상품명, 옵션명) → 제조사 매핑 등록
    pub fn upsert_option_mapping(
        &self,
        product_name: &str,
        option_name: &str,
        manufacturer_id: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO option_name_map (product_name, option_name, manufacturer_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(product_name, option_name)
             DO UPDATE SET manufacturer_id = excluded.manufacturer_id",
            params![product_name, option_name, manufacturer_id],
        )?;
        Ok(())
    }

    /// 분류 엔진 입력용 상품코드 매핑 전체 적재
    pub fn load_product_code_map(&self) -> RepositoryResult<HashMap<String, i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT product_code, manufacturer_id FROM product_code_map")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        rows.collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(RepositoryError::from)
    }

    /// 분류 엔진 입력용 (상품명, 옵션명) 매핑 전체 적재
    pub fn load_option_name_map(&self) -> RepositoryResult<HashMap<(String, String), i64>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT product_name, option_name, manufacturer_id FROM option_name_map")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                (row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                row.get::<_, i64>(2)?,
            ))
        })?;
        rows.collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(RepositoryError::from)
    }
}

fn map_manufacturer_row(row: &Row<'_>) -> rusqlite::Result<Manufacturer> {
    Ok(Manufacturer {
        manufacturer_id: row.get(0)?,
        name: row.get(1)?,
        order_email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> ManufacturerRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ManufacturerRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_and_find() {
        let repo = test_repo();
        let id = repo
            .insert_manufacturer("한빛유리", Some("order@hanbit.kr"))
            .unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.name, "한빛유리");
        assert_eq!(found.order_email, Some("order@hanbit.kr".to_string()));
        assert!(repo.find_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_classification_maps() {
        let repo = test_repo();
        let a = repo.insert_manufacturer("한빛유리", None).unwrap();
        let b = repo.insert_manufacturer("서울도자", None).unwrap();

        repo.upsert_product_code("GC-400", a).unwrap();
        repo.upsert_option_mapping("유리컵 2P", "400ml", b).unwrap();
        // 같은 코드 재등록은 덮어쓴다
        repo.upsert_product_code("GC-400", b).unwrap();

        let codes = repo.load_product_code_map().unwrap();
        assert_eq!(codes.get("GC-400"), Some(&b));

        let options = repo.load_option_name_map().unwrap();
        assert_eq!(
            options.get(&("유리컵 2P".to_string(), "400ml".to_string())),
            Some(&b)
        );
    }

    #[test]
    fn test_update_email_missing_manufacturer() {
        let repo = test_repo();
        let result = repo.update_order_email(42, Some("x@y.kr"));
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}
