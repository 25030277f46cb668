// ==========================================
// 통합 주문 발주 시스템 - 주문 도메인 모델
// ==========================================
// CanonicalOrderRecord: 정규화 주문 1건 (수집 시 생성)
// RawOrderRecord: 수집 파이프라인 중간 산물
// ==========================================

use crate::domain::types::{CanonicalField, OrderStatus};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CanonicalOrderRecord - 정규화 주문 레코드
// ==========================================
// 불변 규칙: order_no 는 생성 후 변경 불가 / 고유
// manufacturer_id 는 미분류(None) 허용, 매핑 보강 시 갱신 가능
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalOrderRecord {
    // ===== 식별자 =====
    pub order_no: String,              // 원본 주문번호 (고유, 불변)
    pub sub_order_no: Option<String>,  // 부주문번호
    pub mall_order_no: Option<String>, // 몰 주문번호

    // ===== 상품 정보 =====
    pub product_name: Option<String>, // 상품명
    pub option_name: Option<String>,  // 옵션명
    pub quantity: Option<i64>,        // 수량
    pub product_code: Option<String>, // 상품코드

    // ===== 당사자 정보 =====
    pub orderer_name: Option<String>,   // 주문자명
    pub recipient_name: Option<String>, // 수취인명
    pub phone: Option<String>,          // 전화번호
    pub mobile: Option<String>,         // 휴대폰번호
    pub postal_code: Option<String>,    // 우편번호
    pub address: Option<String>,        // 주소

    // ===== 금액 (KRW, 정수) =====
    pub payment_amount: Option<i64>, // 결제금액
    pub cost: Option<i64>,           // 원가
    pub shipping_cost: Option<i64>,  // 배송비

    // ===== 분류 =====
    pub manufacturer_id: Option<i64>,     // 제조사 (None = 미분류)
    pub mall_name: Option<String>,        // 쇼핑몰명
    pub fulfillment_type: Option<String>, // 배송구분 (제외 필터 대상)
    pub excluded: bool,                   // 발송 제외 여부 (수집 시 판정)
    pub status: OrderStatus,              // 발송 상태

    // ===== 시각 =====
    pub ordered_at: Option<NaiveDateTime>, // 주문일시
    pub created_at: DateTime<Utc>,         // 레코드 생성 시각
    pub updated_at: DateTime<Utc>,         // 레코드 갱신 시각
}

impl CanonicalOrderRecord {
    /// 표준 필드 값을 목적지 표시용 문자열로 변환
    ///
    /// 규칙:
    /// - 값이 없으면 빈 문자열 (렌더링은 토큰 하나 때문에 실패하지 않는다)
    /// - 날짜 → `YYYY-MM-DD HH:MM:SS`
    /// - 금액 → 천 단위 구분 기호
    pub fn field_value(&self, field: CanonicalField) -> String {
        match field {
            CanonicalField::OrderNo => self.order_no.clone(),
            CanonicalField::SubOrderNo => opt_str(&self.sub_order_no),
            CanonicalField::MallOrderNo => opt_str(&self.mall_order_no),
            CanonicalField::ProductName => opt_str(&self.product_name),
            CanonicalField::OptionName => opt_str(&self.option_name),
            CanonicalField::Quantity => self.quantity.map(|q| q.to_string()).unwrap_or_default(),
            CanonicalField::ProductCode => opt_str(&self.product_code),
            CanonicalField::OrdererName => opt_str(&self.orderer_name),
            CanonicalField::RecipientName => opt_str(&self.recipient_name),
            CanonicalField::Phone => opt_str(&self.phone),
            CanonicalField::Mobile => opt_str(&self.mobile),
            CanonicalField::PostalCode => opt_str(&self.postal_code),
            CanonicalField::Address => opt_str(&self.address),
            CanonicalField::PaymentAmount => {
                self.payment_amount.map(format_currency).unwrap_or_default()
            }
            CanonicalField::Cost => self.cost.map(format_currency).unwrap_or_default(),
            CanonicalField::ShippingCost => {
                self.shipping_cost.map(format_currency).unwrap_or_default()
            }
            CanonicalField::MallName => opt_str(&self.mall_name),
            CanonicalField::FulfillmentType => opt_str(&self.fulfillment_type),
            CanonicalField::OrderedAt => self
                .ordered_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// 금액을 천 단위 구분 기호 문자열로 변환 (KRW, 소수점 없음)
pub fn format_currency(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    let bytes = digits.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }

    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

// ==========================================
// RawOrderRecord - 수집 중간 구조체
// ==========================================
// 용도: 수집 파이프라인 중간 산물 (파일 파싱 → 필드 매핑 → 이 구조)
// 생명주기: 수집 흐름 안에서만 사용
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrderRecord {
    pub order_no: Option<String>,
    pub sub_order_no: Option<String>,
    pub mall_order_no: Option<String>,
    pub product_name: Option<String>,
    pub option_name: Option<String>,
    pub quantity: Option<i64>,
    pub product_code: Option<String>,
    pub orderer_name: Option<String>,
    pub recipient_name: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub payment_amount: Option<i64>,
    pub cost: Option<i64>,
    pub shipping_cost: Option<i64>,
    pub mall_name: Option<String>,
    pub fulfillment_type: Option<String>,
    pub ordered_at: Option<NaiveDateTime>,

    // 메타 정보
    pub row_number: usize, // 원본 시트에서의 행 번호 (1-based, 오류 보고용)
}

impl RawOrderRecord {
    /// CanonicalOrderRecord 로 승격
    ///
    /// order_no 가 없으면 승격 불가 (호출 측에서 건너뜀 처리)
    pub fn into_canonical(self, now: DateTime<Utc>) -> Option<CanonicalOrderRecord> {
        let order_no = self.order_no?;

        Some(CanonicalOrderRecord {
            order_no,
            sub_order_no: self.sub_order_no,
            mall_order_no: self.mall_order_no,
            product_name: self.product_name,
            option_name: self.option_name,
            quantity: self.quantity,
            product_code: self.product_code,
            orderer_name: self.orderer_name,
            recipient_name: self.recipient_name,
            phone: self.phone,
            mobile: self.mobile,
            postal_code: self.postal_code,
            address: self.address,
            payment_amount: self.payment_amount,
            cost: self.cost,
            shipping_cost: self.shipping_cost,
            manufacturer_id: None,
            mall_name: self.mall_name,
            fulfillment_type: self.fulfillment_type,
            excluded: false,
            status: OrderStatus::Pending,
            ordered_at: self.ordered_at,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> CanonicalOrderRecord {
        CanonicalOrderRecord {
            order_no: "ORD-1001".to_string(),
            sub_order_no: None,
            mall_order_no: Some("MALL-77".to_string()),
            product_name: Some("유리컵 2P".to_string()),
            option_name: Some("400ml".to_string()),
            quantity: Some(3),
            product_code: Some("GC-400".to_string()),
            orderer_name: Some("김주문".to_string()),
            recipient_name: Some("이수취".to_string()),
            phone: None,
            mobile: Some("010-1234-5678".to_string()),
            postal_code: Some("06236".to_string()),
            address: Some("서울시 강남구".to_string()),
            payment_amount: Some(15900),
            cost: Some(8000),
            shipping_cost: Some(3000),
            manufacturer_id: None,
            mall_name: Some("스마트스토어".to_string()),
            fulfillment_type: Some("일반택배".to_string()),
            excluded: false,
            status: OrderStatus::Pending,
            ordered_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "0");
        assert_eq!(format_currency(999), "999");
        assert_eq!(format_currency(1000), "1,000");
        assert_eq!(format_currency(15900), "15,900");
        assert_eq!(format_currency(1234567), "1,234,567");
        assert_eq!(format_currency(-4500), "-4,500");
    }

    #[test]
    fn test_field_value_formatting() {
        let record = sample_record();
        assert_eq!(record.field_value(CanonicalField::OrderNo), "ORD-1001");
        assert_eq!(record.field_value(CanonicalField::PaymentAmount), "15,900");
        assert_eq!(record.field_value(CanonicalField::Quantity), "3");
        // 값이 없는 필드는 빈 문자열
        assert_eq!(record.field_value(CanonicalField::Phone), "");
        assert_eq!(record.field_value(CanonicalField::OrderedAt), "");
    }

    #[test]
    fn test_raw_into_canonical_requires_order_no() {
        let raw = RawOrderRecord {
            order_no: None,
            sub_order_no: None,
            mall_order_no: None,
            product_name: None,
            option_name: None,
            quantity: None,
            product_code: None,
            orderer_name: None,
            recipient_name: None,
            phone: None,
            mobile: None,
            postal_code: None,
            address: None,
            payment_amount: None,
            cost: None,
            shipping_cost: None,
            mall_name: None,
            fulfillment_type: None,
            ordered_at: None,
            row_number: 5,
        };
        assert!(raw.into_canonical(Utc::now()).is_none());
    }
}
