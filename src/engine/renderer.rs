// ==========================================
// 통합 주문 발주 시스템 - 발주서 행 렌더러
// ==========================================
// 역할: 정규화 주문 레코드 + 매핑 규칙 → 출력 행 생성
// 원칙:
// - 토큰 하나의 해석 실패는 빈 문자열 (배치 전체를 막지 않는다)
// - 규칙 자체가 구조적으로 잘못되면(중복 바인딩) 오류
//   (출력 결정성이 깨지므로)
// - 한 목적지의 오류는 다른 목적지 렌더링에 영향을 주지 않는다
// ==========================================

use crate::domain::mapping::{column_index, ColumnRule, MappingRuleSet};
use crate::domain::order::CanonicalOrderRecord;
use crate::engine::template::{RenderContext, TemplateEngine, TemplateError};
use chrono::NaiveDate;
use thiserror::Error;

// ==========================================
// RenderError - 렌더링 구조 오류
// ==========================================
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("중복 필드 바인딩: {field} 가 열 {columns:?} 에 모두 바인딩되어 있습니다")]
    DuplicateFieldBinding { field: String, columns: Vec<String> },

    #[error("열 {column} 템플릿 오류: {source}")]
    Template {
        column: String,
        source: TemplateError,
    },

    #[error("잘못된 출력 열 문자: {0}")]
    InvalidColumnLetter(String),
}

// ==========================================
// RenderedSheet - 렌더링 결과
// ==========================================
#[derive(Debug, Clone)]
pub struct RenderedSheet {
    /// 출력 열 문자 (열 인덱스 순)
    pub columns: Vec<String>,
    /// 헤더 행 (열 문자에 대응하는 필드 표기 / 템플릿 열은 빈 문자열)
    pub header: Vec<String>,
    /// 데이터 행 (columns 와 같은 순서)
    pub rows: Vec<Vec<String>>,
}

// ==========================================
// SheetRenderer - 행 렌더러
// ==========================================
pub struct SheetRenderer;

impl SheetRenderer {
    /// 목적지 발주서 행 렌더링
    ///
    /// # 매개변수
    /// - rule_set: 목적지 매핑 규칙
    /// - records: 렌더링 대상 레코드 (이미 분류/제외 처리된 배치)
    /// - manufacturer_name: 계산 변수 manufacturerName 값
    /// - today: 계산 변수 today 값 (테스트 주입용)
    ///
    /// 셀 평가는 순수하고 행 안에서 순서 독립적이다 (셀 간 의존성 없음)
    pub fn render(
        rule_set: &MappingRuleSet,
        records: &[CanonicalOrderRecord],
        manufacturer_name: Option<&str>,
        today: NaiveDate,
    ) -> Result<RenderedSheet, RenderError> {
        // ===== 중복 바인딩은 렌더링 차단 (결정성 보장) =====
        Self::ensure_no_duplicate_bindings(rule_set)?;

        // ===== 출력 열 순서: 열 문자의 실제 인덱스 기준 =====
        let mut columns: Vec<String> = rule_set.rules.keys().cloned().collect();
        for column in &columns {
            if column_index(column).is_none() {
                return Err(RenderError::InvalidColumnLetter(column.clone()));
            }
        }
        columns.sort_by_key(|c| column_index(c).unwrap_or(usize::MAX));

        // ===== 배치 계산 변수 =====
        let total_quantity: i64 = records.iter().filter_map(|r| r.quantity).sum();
        let total_payment: i64 = records.iter().filter_map(|r| r.payment_amount).sum();

        let header: Vec<String> = columns
            .iter()
            .map(|column| match &rule_set.rules[column] {
                ColumnRule::Field { field, .. } => field.label().to_string(),
                ColumnRule::Template { .. } => String::new(),
            })
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut ctx = RenderContext::new()
                .with_record(record)
                .with_var(RenderContext::VAR_TODAY, today.format("%Y-%m-%d").to_string())
                .with_var(RenderContext::VAR_TOTAL_QUANTITY, total_quantity.to_string())
                .with_var(RenderContext::VAR_TOTAL_PAYMENT, total_payment.to_string());
            if let Some(name) = manufacturer_name {
                ctx = ctx.with_var(RenderContext::VAR_MANUFACTURER_NAME, name);
            }

            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                row.push(Self::render_cell(column, &rule_set.rules[column], record, &ctx)?);
            }
            rows.push(row);
        }

        Ok(RenderedSheet {
            columns,
            header,
            rows,
        })
    }

    /// 출력 셀 하나 평가
    ///
    /// Field 규칙: 레코드 값 → 비어 있으면 fallback 템플릿 (있을 때만)
    /// Template 규칙: 토큰 치환
    fn render_cell(
        column: &str,
        rule: &ColumnRule,
        record: &CanonicalOrderRecord,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        match rule {
            ColumnRule::Field { field, fallback } => {
                let value = record.field_value(*field);
                if !value.trim().is_empty() {
                    return Ok(value);
                }
                match fallback {
                    Some(template) => {
                        TemplateEngine::render(template, ctx).map_err(|source| {
                            RenderError::Template {
                                column: column.to_string(),
                                source,
                            }
                        })
                    }
                    None => Ok(String::new()),
                }
            }
            ColumnRule::Template { value } => {
                TemplateEngine::render(value, ctx).map_err(|source| RenderError::Template {
                    column: column.to_string(),
                    source,
                })
            }
        }
    }

    fn ensure_no_duplicate_bindings(rule_set: &MappingRuleSet) -> Result<(), RenderError> {
        let bindings = rule_set.field_bindings();
        for (i, (field, _)) in bindings.iter().enumerate() {
            let columns: Vec<String> = bindings
                .iter()
                .filter(|(f, _)| f == field)
                .map(|(_, c)| c.clone())
                .collect();
            if columns.len() > 1 {
                // 첫 등장에서만 보고
                if bindings.iter().position(|(f, _)| f == field) == Some(i) {
                    return Err(RenderError::DuplicateFieldBinding {
                        field: field.key().to_string(),
                        columns,
                    });
                }
            }
        }
        Ok(())
    }
}
