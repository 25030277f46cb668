// ==========================================
// 통합 주문 발주 시스템 - 주문 분류 엔진
// ==========================================
// 역할: 주문 행의 담당 제조사 판정
// 판정 순서 (고정): 상품코드 정확 일치 → (상품명, 옵션명) 조합 → 미분류
// 원칙:
// - 멱등 / 재실행 가능: 매핑 보강 후 재분류하면 기존 미분류 레코드에만
//   소급 적용, 이미 분류된 레코드는 force 없이는 건드리지 않는다
// - 미분류(None)는 오류가 아니라 수동 매핑을 기다리는 정상 종결 상태
// ==========================================

use crate::domain::order::CanonicalOrderRecord;
use std::collections::HashMap;

// ==========================================
// ClassificationEngine - 분류 엔진
// ==========================================
// 분류 기준 테이블을 명시적으로 주입받는 순수 구조 (전역 상태 아님)
pub struct ClassificationEngine {
    /// 상품코드 → 제조사
    product_code_map: HashMap<String, i64>,
    /// (상품명, 옵션명) → 제조사
    option_name_map: HashMap<(String, String), i64>,
}

impl ClassificationEngine {
    pub fn new(
        product_code_map: HashMap<String, i64>,
        option_name_map: HashMap<(String, String), i64>,
    ) -> Self {
        Self {
            product_code_map,
            option_name_map,
        }
    }

    /// 레코드 하나의 제조사 판정
    ///
    /// # 판정 순서
    /// 1. 상품코드 정확 일치
    /// 2. (상품명, 옵션명) 조합 일치
    /// 3. 미분류 (None)
    pub fn classify(&self, record: &CanonicalOrderRecord) -> Option<i64> {
        if let Some(code) = record.product_code.as_deref() {
            let code = code.trim();
            if !code.is_empty() {
                if let Some(id) = self.product_code_map.get(code) {
                    return Some(*id);
                }
            }
        }

        if let (Some(product), Some(option)) = (
            record.product_name.as_deref(),
            record.option_name.as_deref(),
        ) {
            let key = (product.trim().to_string(), option.trim().to_string());
            if let Some(id) = self.option_name_map.get(&key) {
                return Some(*id);
            }
        }

        None
    }

    /// 레코드 목록 재분류
    ///
    /// # 매개변수
    /// - force: true 면 이미 분류된 레코드도 재판정 (명시적 요청 시에만)
    ///
    /// # 반환
    /// - 제조사가 새로 부여되거나 변경된 레코드 수
    pub fn reclassify(&self, records: &mut [CanonicalOrderRecord], force: bool) -> usize {
        let mut changed = 0;
        for record in records.iter_mut() {
            if record.manufacturer_id.is_some() && !force {
                continue;
            }
            if let Some(id) = self.classify(record) {
                if record.manufacturer_id != Some(id) {
                    record.manufacturer_id = Some(id);
                    changed += 1;
                }
            }
        }
        changed
    }
}
