// ==========================================
// 통합 주문 발주 시스템 - 토큰 템플릿 엔진
// ==========================================
// 문법: "{{tokenA || tokenB || '리터럴'}}"
// - 대안을 왼쪽부터 평가, trim 후 비어 있지 않은 첫 값을 치환
// - 해석 불가 토큰은 빈 문자열 (부분 데이터로도 렌더링 가능해야 함)
// 구현: 토크나이저 + 평가기. 정규식 치환 체인이 아님
//       (첫 비어있지 않은 대안에서의 단락 평가와 연산자 확장을 위해)
// ==========================================

use crate::domain::order::CanonicalOrderRecord;
use crate::domain::types::CanonicalField;
use std::collections::HashMap;
use thiserror::Error;

// ==========================================
// TemplateError - 템플릿 문법 오류
// ==========================================
// 렌더 시점이 아니라 규칙 저장/검증 시점에 보고된다
#[derive(Error, Debug, PartialEq)]
pub enum TemplateError {
    #[error("닫히지 않은 토큰: 위치 {0} 의 '{{{{' 에 대응하는 '}}}}' 가 없습니다")]
    UnclosedToken(usize),
}

// ==========================================
// 템플릿 구문 요소
// ==========================================

/// 템플릿 조각: 고정 텍스트 또는 토큰 그룹
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Text(String),
    /// `{{a || b || 'x'}}` 의 대안 목록
    Tokens(Vec<TokenAlt>),
}

/// 토큰 대안: 필드/변수 참조 또는 따옴표 리터럴
#[derive(Debug, Clone, PartialEq)]
pub enum TokenAlt {
    Ident(String),
    Literal(String),
}

// ==========================================
// RenderContext - 토큰 해석 문맥
// ==========================================
// 레코드 필드 + 계산 변수(현재 날짜 / 배치 합계 / 제조사명)
#[derive(Default)]
pub struct RenderContext<'a> {
    record: Option<&'a CanonicalOrderRecord>,
    extras: HashMap<String, String>,
}

impl<'a> RenderContext<'a> {
    /// 계산 변수명: 현재 날짜
    pub const VAR_TODAY: &'static str = "today";
    /// 계산 변수명: 배치 수량 합계
    pub const VAR_TOTAL_QUANTITY: &'static str = "totalQuantity";
    /// 계산 변수명: 배치 결제금액 합계
    pub const VAR_TOTAL_PAYMENT: &'static str = "totalPayment";
    /// 계산 변수명: 제조사 표시명
    pub const VAR_MANUFACTURER_NAME: &'static str = "manufacturerName";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: &'a CanonicalOrderRecord) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.extras.insert(name.to_string(), value.into());
        self
    }

    /// 토큰 이름 해석: 레코드 필드 → 계산 변수 → 빈 문자열
    pub fn resolve(&self, name: &str) -> String {
        if let Some(field) = CanonicalField::from_key(name) {
            if let Some(record) = self.record {
                return record.field_value(field);
            }
        }
        self.extras.get(name).cloned().unwrap_or_default()
    }
}

// ==========================================
// TemplateEngine - 토크나이저 + 평가기
// ==========================================
pub struct TemplateEngine;

impl TemplateEngine {
    /// 템플릿 문자열 파싱
    ///
    /// 문법 오류(닫히지 않은 토큰)는 검증 시점에 호출 측으로 보고된다
    pub fn parse(template: &str) -> Result<Vec<TemplateSegment>, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = template;
        let mut offset = 0usize;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(TemplateSegment::Text(rest[..open].to_string()));
            }

            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::UnclosedToken(offset + open))?;

            let inner = &after_open[..close];
            segments.push(TemplateSegment::Tokens(Self::parse_alternatives(inner)));

            offset += open + 2 + close + 2;
            rest = &after_open[close + 2..];
        }

        if !rest.is_empty() {
            segments.push(TemplateSegment::Text(rest.to_string()));
        }

        Ok(segments)
    }

    /// `a || b || 'x'` 파싱
    fn parse_alternatives(inner: &str) -> Vec<TokenAlt> {
        inner
            .split("||")
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(|alt| {
                if alt.len() >= 2 && alt.starts_with('\'') && alt.ends_with('\'') {
                    TokenAlt::Literal(alt[1..alt.len() - 1].to_string())
                } else {
                    TokenAlt::Ident(alt.to_string())
                }
            })
            .collect()
    }

    /// 템플릿 렌더링
    ///
    /// 토큰 해석 실패는 빈 문자열로 대체될 뿐 오류가 아니다.
    /// 셀 간 의존성이 없으므로 행 안에서 순서 무관하게 호출해도 된다.
    pub fn render(template: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
        let segments = Self::parse(template)?;
        let mut out = String::new();

        for segment in segments {
            match segment {
                TemplateSegment::Text(text) => out.push_str(&text),
                TemplateSegment::Tokens(alts) => out.push_str(&Self::evaluate(&alts, ctx)),
            }
        }

        Ok(out)
    }

    /// 대안 목록 평가: trim 후 비어 있지 않은 첫 값
    fn evaluate(alts: &[TokenAlt], ctx: &RenderContext) -> String {
        for alt in alts {
            let value = match alt {
                TokenAlt::Ident(name) => ctx.resolve(name),
                TokenAlt::Literal(lit) => lit.clone(),
            };
            if !value.trim().is_empty() {
                return value;
            }
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(vars: &[(&str, &str)]) -> RenderContext<'static> {
        let mut ctx = RenderContext::new();
        for (k, v) in vars {
            ctx = ctx.with_var(k, *v);
        }
        ctx
    }

    #[test]
    fn test_fallback_first_nonempty_wins() {
        let ctx = ctx_with(&[("a", ""), ("b", "y")]);
        assert_eq!(TemplateEngine::render("{{a||b||'x'}}", &ctx).unwrap(), "y");
    }

    #[test]
    fn test_all_alternatives_empty() {
        let ctx = ctx_with(&[("a", ""), ("b", "")]);
        assert_eq!(TemplateEngine::render("{{a||b}}", &ctx).unwrap(), "");
    }

    #[test]
    fn test_literal_final_fallback() {
        let ctx = ctx_with(&[("a", ""), ("b", "  ")]);
        assert_eq!(
            TemplateEngine::render("{{a || b || '직접주문'}}", &ctx).unwrap(),
            "직접주문"
        );
    }

    #[test]
    fn test_unresolvable_token_renders_empty() {
        let ctx = RenderContext::new();
        assert_eq!(
            TemplateEngine::render("배송: {{없는토큰}}끝", &ctx).unwrap(),
            "배송: 끝"
        );
    }

    #[test]
    fn test_mixed_text_and_tokens() {
        let ctx = ctx_with(&[("mallName", "스마트스토어"), ("today", "2026-08-27")]);
        assert_eq!(
            TemplateEngine::render("[{{mallName}}] {{today}} 발주", &ctx).unwrap(),
            "[스마트스토어] 2026-08-27 발주"
        );
    }

    #[test]
    fn test_unclosed_token_is_error() {
        let ctx = RenderContext::new();
        assert_eq!(
            TemplateEngine::render("{{a || b", &ctx),
            Err(TemplateError::UnclosedToken(0))
        );
    }

    #[test]
    fn test_record_field_token() {
        use crate::domain::types::OrderStatus;
        use chrono::Utc;

        let record = crate::domain::order::CanonicalOrderRecord {
            order_no: "ORD-1".to_string(),
            sub_order_no: None,
            mall_order_no: None,
            product_name: Some("유리컵".to_string()),
            option_name: None,
            quantity: Some(2),
            product_code: None,
            orderer_name: None,
            recipient_name: Some("이수취".to_string()),
            phone: None,
            mobile: None,
            postal_code: None,
            address: None,
            payment_amount: Some(12000),
            cost: None,
            shipping_cost: None,
            manufacturer_id: None,
            mall_name: None,
            fulfillment_type: None,
            excluded: false,
            status: OrderStatus::Pending,
            ordered_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let ctx = RenderContext::new().with_record(&record);
        assert_eq!(
            TemplateEngine::render("{{recipientName}} / {{paymentAmount}}", &ctx).unwrap(),
            "이수취 / 12,000"
        );
        // 필드 값이 비면 몰명 → 리터럴 순서로 폴백
        assert_eq!(
            TemplateEngine::render("{{mallName || '직접'}}", &ctx).unwrap(),
            "직접"
        );
    }
}
