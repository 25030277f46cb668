// ==========================================
// 통합 주문 발주 시스템 - 매핑/설정 도메인 모델
// ==========================================
// MappingRuleSet: 목적지별 선언적 매핑 규칙 (영속)
// ColumnRule: 출력 열 하나의 규칙 (태그드 합 타입)
// ExportPipelineConfig: 채널 재출력용 열 재배치 설정
// SynonymEntry / ExclusionPattern / DuplicateCheckSettings / SendRecord
// ==========================================

use crate::domain::types::{CanonicalField, DestinationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// ColumnRule - 출력 열 규칙
// ==========================================
// 불변 규칙: 한 출력 열에는 규칙이 정확히 하나 (kind 로 구분)
// Field 규칙의 fallback 은 레코드 값이 비어 있을 때만 적용되는
// 고정/템플릿 문자열이다
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnRule {
    /// 표준 필드 바인딩
    Field {
        field: CanonicalField,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
    /// 고정값 / 토큰 템플릿
    Template { value: String },
}

// ==========================================
// MappingRuleSet - 목적지별 매핑 규칙
// ==========================================
// 영속 포맷: mapping_rule_set.payload (JSON)
// 불변 규칙:
// - header_row >= 1, data_start_row > header_row
// - rules 는 열 문자 기준 map 이므로 "열당 규칙 하나"가 구조적으로 보장됨
// - 같은 표준 필드가 여러 열에 바인딩되면 검증 오류 (저장 시 force 로만 통과)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRuleSet {
    /// 목적지 식별자 (제조사 코드 / 몰 코드 / "common" / "invoice")
    pub destination_key: String,
    pub kind: DestinationKind,

    /// 헤더 행 (1-based)
    pub header_row: u32,
    /// 데이터 시작 행 (1-based, header_row 초과)
    pub data_start_row: u32,

    /// 출력 열 문자 → 규칙
    pub rules: BTreeMap<String, ColumnRule>,

    /// 필수 필드 집합 (검증 대상)
    #[serde(default)]
    pub required_fields: BTreeSet<CanonicalField>,

    /// 채널 재출력 파이프라인 (쇼핑몰 목적지 전용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_pipeline: Option<ExportPipelineConfig>,
}

impl MappingRuleSet {
    /// 필드 바인딩 전체 목록 (필드, 출력 열) - 중복 포함
    ///
    /// 검증기가 같은 필드의 다중 바인딩을 찾을 수 있도록
    /// 중복을 거르지 않고 그대로 돌려준다
    pub fn field_bindings(&self) -> Vec<(CanonicalField, String)> {
        self.rules
            .iter()
            .filter_map(|(column, rule)| match rule {
                ColumnRule::Field { field, .. } => Some((*field, column.clone())),
                ColumnRule::Template { .. } => None,
            })
            .collect()
    }

    /// 특정 필드가 바인딩 또는 비어 있지 않은 템플릿으로 충족되는지 여부
    pub fn is_field_satisfied(&self, field: CanonicalField) -> bool {
        self.rules.values().any(|rule| match rule {
            ColumnRule::Field { field: bound, .. } => *bound == field,
            ColumnRule::Template { value } => {
                // 템플릿이 해당 필드 토큰을 참조하고 내용이 비어 있지 않으면 충족
                !value.trim().is_empty() && value.contains(field.key())
            }
        })
    }
}

// ==========================================
// ExportPipelineConfig - 열 재배치 파이프라인 설정
// ==========================================
// 불변 규칙: columns 순서가 곧 출력 순서 / 나열되지 않은 입력 열은
// 절대 통과되지 않는다 (골든 파일 재현성의 전제)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPipelineConfig {
    /// 헤더 행 위의 행(표지/제목)을 출력에 그대로 복사할지 여부
    #[serde(default)]
    pub copy_prefix_rows: bool,

    /// 출력 열 서술자 목록 (순서 = 출력 순서)
    pub columns: Vec<ExportColumn>,
}

/// 출력 열 서술자: 입력 열 복사 또는 상수
///
/// 영속 포맷 (untagged): `{"from": 3}` 또는 `{"const": "Z"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportColumn {
    /// 입력 열 복사 (1-based)
    From { from: usize },
    /// 모든 행에 상수 출력
    Const {
        #[serde(rename = "const")]
        value: String,
    },
}

// ==========================================
// SynonymEntry - 헤더 동의어 항목
// ==========================================
// 불변 규칙: 활성 항목끼리 synonym 텍스트 중복 금지 (해석 모호성 방지)
// 비활성 항목은 보존하되 해석에서 제외
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub id: Option<i64>,
    pub field: CanonicalField,
    pub synonym: String,
    pub enabled: bool,
}

// ==========================================
// ExclusionPattern - 발송 제외 패턴
// ==========================================
// 평가 의미: 활성 패턴 중 하나라도 일치하면 제외 (first-match 아님)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionPattern {
    pub id: Option<i64>,
    /// 리터럴(부분 문자열) 또는 정규식 패턴
    pub pattern: String,
    pub is_regex: bool,
    pub description: Option<String>,
    pub enabled: bool,
}

// ==========================================
// DuplicateCheckSettings - 중복 발송 확인 설정
// ==========================================
// 전역 싱글턴: 설정 변경으로만 수정, 발송 시점에 읽음
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DuplicateCheckSettings {
    pub enabled: bool,
    /// 확인 기간 (일). {10, 15, 20, 30} 중 하나
    pub period_days: i64,
}

impl DuplicateCheckSettings {
    /// 허용되는 확인 기간 값
    pub const ALLOWED_PERIODS: [i64; 4] = [10, 15, 20, 30];

    pub fn is_valid_period(days: i64) -> bool {
        Self::ALLOWED_PERIODS.contains(&days)
    }
}

impl Default for DuplicateCheckSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            period_days: 10,
        }
    }
}

// ==========================================
// SendRecord - 발송 이력
// ==========================================
// append-only: 발송/재발송 성공 1회당 1건 생성, 이후 불변
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRecord {
    pub send_id: String,
    pub manufacturer_id: i64,
    /// 발송 대상 수취인 주소 목록 (정규화 문자열)
    pub addresses: Vec<String>,
    /// 재발송/중복 경고 통과 시 필수 사유
    pub reason: Option<String>,
    pub sent_at: DateTime<Utc>,
}

// ==========================================
// Manufacturer - 제조사
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manufacturer {
    pub manufacturer_id: i64,
    pub name: String,
    /// 발주서 수신 이메일 (없으면 발송 불가)
    pub order_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// 열 문자 변환 유틸
// ==========================================

/// 1-based 열 인덱스 → 엑셀 열 문자 (1→A, 27→AA)
pub fn column_letter(index: usize) -> String {
    debug_assert!(index >= 1);
    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 엑셀 열 문자 → 1-based 열 인덱스 (A→1, AA→27)
///
/// 빈 문자열이거나 A-Z 이외가 섞이면 None
pub fn column_index(letter: &str) -> Option<usize> {
    let letter = letter.trim();
    if letter.is_empty() {
        return None;
    }

    let mut index = 0usize;
    for ch in letter.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        index = index * 26 + (ch as usize - 'A' as usize + 1);
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter_roundtrip() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");

        for i in [1usize, 5, 26, 27, 100, 702, 703] {
            assert_eq!(column_index(&column_letter(i)), Some(i));
        }
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_column_rule_serde_kind_tag() {
        let rule = ColumnRule::Field {
            field: CanonicalField::RecipientName,
            fallback: None,
        };
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""kind":"field""#));
        assert!(json.contains(r#""field":"recipientName""#));

        let rule = ColumnRule::Template {
            value: "{{mallName || '직접주문'}}".to_string(),
        };
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""kind":"template""#));

        let parsed: ColumnRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn test_export_column_untagged_serde() {
        let from: ExportColumn = serde_json::from_str(r#"{"from": 3}"#).unwrap();
        assert_eq!(from, ExportColumn::From { from: 3 });

        let constant: ExportColumn = serde_json::from_str(r#"{"const": "Z"}"#).unwrap();
        assert_eq!(
            constant,
            ExportColumn::Const {
                value: "Z".to_string()
            }
        );

        assert_eq!(serde_json::to_string(&from).unwrap(), r#"{"from":3}"#);
        assert_eq!(
            serde_json::to_string(&constant).unwrap(),
            r#"{"const":"Z"}"#
        );
    }

    #[test]
    fn test_duplicate_check_period_validation() {
        assert!(DuplicateCheckSettings::is_valid_period(10));
        assert!(DuplicateCheckSettings::is_valid_period(30));
        assert!(!DuplicateCheckSettings::is_valid_period(7));
    }
}
