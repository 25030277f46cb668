// ==========================================
// 통합 주문 발주 시스템 - 매핑 규칙 검증기
// ==========================================
// 역할: MappingRuleSet 저장 전 검증
// - 필수 필드 누락 (필드 바인딩도, 비어 있지 않은 템플릿도 없음)
// - 같은 표준 필드의 다중 바인딩 (soft: 보고하되 force 저장 허용)
// - 템플릿 문법 오류 / 행 번호 불변 규칙 위반
// 원칙: 절대 자동 수정하지 않는다. 보고만 한다.
// ==========================================

use crate::domain::mapping::{ColumnRule, MappingRuleSet};
use crate::domain::types::CanonicalField;
use crate::engine::template::{TemplateEngine, TemplateError};
use std::collections::BTreeMap;

// ==========================================
// ValidationReport - 검증 결과
// ==========================================
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 필수 필드 중 충족되지 않은 것
    pub missing_required: Vec<CanonicalField>,
    /// 같은 필드가 바인딩된 출력 열 목록 (2개 이상인 필드만)
    pub duplicate_field_bindings: Vec<(CanonicalField, Vec<String>)>,
    /// 출력 열별 템플릿 문법 오류
    pub template_errors: Vec<(String, TemplateError)>,
    /// 행 번호 불변 규칙 위반 등 구조 문제
    pub structural_errors: Vec<String>,
}

impl ValidationReport {
    /// 보고할 문제가 하나도 없는지 여부
    pub fn is_clean(&self) -> bool {
        self.missing_required.is_empty()
            && self.duplicate_field_bindings.is_empty()
            && self.template_errors.is_empty()
            && self.structural_errors.is_empty()
    }

    /// force 저장으로도 통과할 수 없는 문제가 있는지 여부
    ///
    /// 중복 바인딩은 soft (force 로 통과 가능),
    /// 템플릿 문법 오류와 행 번호 위반은 hard
    pub fn has_hard_errors(&self) -> bool {
        !self.template_errors.is_empty() || !self.structural_errors.is_empty()
    }
}

// ==========================================
// RuleSetValidator - 규칙 검증기
// ==========================================
pub struct RuleSetValidator;

impl RuleSetValidator {
    pub fn validate(rule_set: &MappingRuleSet) -> ValidationReport {
        let mut report = ValidationReport::default();

        // ===== 행 번호 불변 규칙 =====
        if rule_set.header_row < 1 {
            report
                .structural_errors
                .push("헤더 행은 1 이상이어야 합니다".to_string());
        }
        if rule_set.data_start_row <= rule_set.header_row {
            report.structural_errors.push(format!(
                "데이터 시작 행({})은 헤더 행({})보다 커야 합니다",
                rule_set.data_start_row, rule_set.header_row
            ));
        }

        // ===== 필수 필드 충족 =====
        for field in &rule_set.required_fields {
            if !rule_set.is_field_satisfied(*field) {
                report.missing_required.push(*field);
            }
        }

        // ===== 중복 필드 바인딩 =====
        let mut bindings_by_field: BTreeMap<CanonicalField, Vec<String>> = BTreeMap::new();
        for (field, column) in rule_set.field_bindings() {
            bindings_by_field.entry(field).or_default().push(column);
        }
        for (field, columns) in bindings_by_field {
            if columns.len() > 1 {
                report.duplicate_field_bindings.push((field, columns));
            }
        }

        // ===== 템플릿 문법 =====
        for (column, rule) in &rule_set.rules {
            let template = match rule {
                ColumnRule::Template { value } => Some(value.as_str()),
                ColumnRule::Field {
                    fallback: Some(fb), ..
                } => Some(fb.as_str()),
                ColumnRule::Field { fallback: None, .. } => None,
            };
            if let Some(template) = template {
                if let Err(err) = TemplateEngine::parse(template) {
                    report.template_errors.push((column.clone(), err));
                }
            }
        }

        report
    }
}
