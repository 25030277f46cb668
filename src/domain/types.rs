// ==========================================
// 통합 주문 발주 시스템 - 도메인 타입 정의
// ==========================================
// 표준 필드 키 / 목적지 구분 / 주문 상태
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 표준 필드 (Canonical Field)
// ==========================================
// 모든 목적지가 공유하는 표준 주문 속성.
// key() 는 규칙 저장용 식별자, label() 은 국내 몰 시트에서
// 흔히 쓰이는 대표 헤더 표기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CanonicalField {
    OrderNo,        // 주문번호 (원본, 불변 고유키)
    SubOrderNo,     // 부주문번호
    MallOrderNo,    // 몰 주문번호
    ProductName,    // 상품명
    OptionName,     // 옵션명
    Quantity,       // 수량
    ProductCode,    // 상품코드
    OrdererName,    // 주문자명
    RecipientName,  // 수취인명
    Phone,          // 전화번호
    Mobile,         // 휴대폰번호
    PostalCode,     // 우편번호
    Address,        // 주소
    PaymentAmount,  // 결제금액
    Cost,           // 원가
    ShippingCost,   // 배송비
    MallName,       // 쇼핑몰명
    FulfillmentType, // 배송구분 (자유 텍스트)
    OrderedAt,      // 주문일시
}

impl CanonicalField {
    /// 전체 필드 목록 (구조 분석 시 순회용)
    pub const ALL: [CanonicalField; 19] = [
        CanonicalField::OrderNo,
        CanonicalField::SubOrderNo,
        CanonicalField::MallOrderNo,
        CanonicalField::ProductName,
        CanonicalField::OptionName,
        CanonicalField::Quantity,
        CanonicalField::ProductCode,
        CanonicalField::OrdererName,
        CanonicalField::RecipientName,
        CanonicalField::Phone,
        CanonicalField::Mobile,
        CanonicalField::PostalCode,
        CanonicalField::Address,
        CanonicalField::PaymentAmount,
        CanonicalField::Cost,
        CanonicalField::ShippingCost,
        CanonicalField::MallName,
        CanonicalField::FulfillmentType,
        CanonicalField::OrderedAt,
    ];

    /// 규칙 저장용 식별자 (camelCase, 영구 포맷)
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalField::OrderNo => "orderNo",
            CanonicalField::SubOrderNo => "subOrderNo",
            CanonicalField::MallOrderNo => "mallOrderNo",
            CanonicalField::ProductName => "productName",
            CanonicalField::OptionName => "optionName",
            CanonicalField::Quantity => "quantity",
            CanonicalField::ProductCode => "productCode",
            CanonicalField::OrdererName => "ordererName",
            CanonicalField::RecipientName => "recipientName",
            CanonicalField::Phone => "phone",
            CanonicalField::Mobile => "mobile",
            CanonicalField::PostalCode => "postalCode",
            CanonicalField::Address => "address",
            CanonicalField::PaymentAmount => "paymentAmount",
            CanonicalField::Cost => "cost",
            CanonicalField::ShippingCost => "shippingCost",
            CanonicalField::MallName => "mallName",
            CanonicalField::FulfillmentType => "fulfillmentType",
            CanonicalField::OrderedAt => "orderedAt",
        }
    }

    /// 대표 한글 헤더 표기
    ///
    /// 동의어 사전에 등록이 없어도 이 표기(또는 key)와 정확히
    /// 일치하는 헤더는 바로 해석된다
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::OrderNo => "주문번호",
            CanonicalField::SubOrderNo => "부주문번호",
            CanonicalField::MallOrderNo => "몰주문번호",
            CanonicalField::ProductName => "상품명",
            CanonicalField::OptionName => "옵션명",
            CanonicalField::Quantity => "수량",
            CanonicalField::ProductCode => "상품코드",
            CanonicalField::OrdererName => "주문자",
            CanonicalField::RecipientName => "수취인",
            CanonicalField::Phone => "전화번호",
            CanonicalField::Mobile => "휴대폰",
            CanonicalField::PostalCode => "우편번호",
            CanonicalField::Address => "주소",
            CanonicalField::PaymentAmount => "결제금액",
            CanonicalField::Cost => "원가",
            CanonicalField::ShippingCost => "배송비",
            CanonicalField::MallName => "쇼핑몰",
            CanonicalField::FulfillmentType => "배송구분",
            CanonicalField::OrderedAt => "주문일시",
        }
    }

    /// key 문자열에서 역변환
    pub fn from_key(key: &str) -> Option<CanonicalField> {
        CanonicalField::ALL.iter().copied().find(|f| f.key() == key)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// serde: key 문자열로 직렬화 (mapping_rule_set payload 와 일치)
impl From<CanonicalField> for String {
    fn from(field: CanonicalField) -> Self {
        field.key().to_string()
    }
}

impl TryFrom<String> for CanonicalField {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CanonicalField::from_key(&value).ok_or_else(|| format!("알 수 없는 표준 필드: {}", value))
    }
}

// ==========================================
// 목적지 구분 (Destination Kind)
// ==========================================
// 발주서 레이아웃 소비자의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationKind {
    Manufacturer, // 제조사 발주서
    ShoppingMall, // 쇼핑몰 채널 재출력 (export pipeline 사용)
    Common,       // 공통 폴백 양식
    Invoice,      // 송장 입력 양식
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationKind::Manufacturer => write!(f, "MANUFACTURER"),
            DestinationKind::ShoppingMall => write!(f, "SHOPPING_MALL"),
            DestinationKind::Common => write!(f, "COMMON"),
            DestinationKind::Invoice => write!(f, "INVOICE"),
        }
    }
}

// ==========================================
// 주문 상태 (Order Status)
// ==========================================
// 전이: PENDING→SENT, PENDING→ERROR, SENT→SENT(재발송), ERROR→SENT(재시도)
// 직렬화 포맷: SCREAMING_SNAKE_CASE (데이터베이스와 일치)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending, // 발송 대기
    Sent,    // 발송 완료
    Error,   // 발송 실패 (재시도 가능)
}

impl OrderStatus {
    /// 데이터베이스 문자열에서 역변환
    pub fn from_db_str(s: &str) -> Option<OrderStatus> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "SENT" => Some(OrderStatus::Sent),
            "ERROR" => Some(OrderStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Sent => write!(f, "SENT"),
            OrderStatus::Error => write!(f, "ERROR"),
        }
    }
}
