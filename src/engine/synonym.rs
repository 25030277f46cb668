// ==========================================
// 통합 주문 발주 시스템 - 헤더 동의어 사전
// ==========================================
// 역할: 원본 헤더 텍스트 → 표준 필드 키 해석 (다대일)
// 원칙: trim 후 정확 일치만 허용. 대소문자 구분 유지.
//       (금액 데이터 특성상 퍼지 매칭의 오탐 위험이 더 크다)
// ==========================================

use crate::domain::mapping::SynonymEntry;
use crate::domain::types::CanonicalField;

// ==========================================
// SynonymDictionary - 동의어 사전
// ==========================================
// 설정 객체로 명시적으로 전달된다 (전역 상태 아님)
pub struct SynonymDictionary {
    entries: Vec<SynonymEntry>,
}

impl SynonymDictionary {
    pub fn new(entries: Vec<SynonymEntry>) -> Self {
        Self { entries }
    }

    /// 동의어 항목 없이 기본 키/표기만으로 해석하는 빈 사전
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 원본 헤더 → 표준 필드 해석
    ///
    /// 해석 순서:
    /// 1. 표준 필드의 key / 한글 표기와 정확 일치 → 동의어 등록 없이 바로 해석
    /// 2. 활성 동의어 항목 중 첫 번째 정확 일치
    /// 3. 없으면 None
    pub fn resolve(&self, raw_header: &str) -> Option<CanonicalField> {
        let header = raw_header.trim();
        if header.is_empty() {
            return None;
        }

        // 1) 표준 키/표기 직접 일치
        for field in CanonicalField::ALL {
            if header == field.key() || header == field.label() {
                return Some(field);
            }
        }

        // 2) 활성 동의어 일치 (첫 항목 우선)
        self.entries
            .iter()
            .find(|e| e.enabled && e.synonym.trim() == header)
            .map(|e| e.field)
    }

    /// 새 동의어가 기존 활성 항목과 충돌하는지 확인
    ///
    /// 같은 텍스트가 이미 다른 필드의 활성 동의어이면
    /// 충돌 대상 필드를 돌려준다 (해석 모호성 방지)
    pub fn conflicting_field(&self, synonym: &str, field: CanonicalField) -> Option<CanonicalField> {
        let synonym = synonym.trim();
        self.entries
            .iter()
            .find(|e| e.enabled && e.synonym.trim() == synonym && e.field != field)
            .map(|e| e.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(field: CanonicalField, synonym: &str, enabled: bool) -> SynonymEntry {
        SynonymEntry {
            id: None,
            field,
            synonym: synonym.to_string(),
            enabled,
        }
    }

    #[test]
    fn test_resolve_direct_label_without_entry() {
        let dict = SynonymDictionary::empty();
        assert_eq!(dict.resolve("수취인"), Some(CanonicalField::RecipientName));
        assert_eq!(dict.resolve("recipientName"), Some(CanonicalField::RecipientName));
        assert_eq!(dict.resolve(" 수취인 "), Some(CanonicalField::RecipientName));
    }

    #[test]
    fn test_resolve_synonym_exact_match() {
        let dict = SynonymDictionary::new(vec![
            entry(CanonicalField::RecipientName, "받는분", true),
            entry(CanonicalField::Address, "받는분주소", true),
        ]);

        assert_eq!(dict.resolve("받는분"), Some(CanonicalField::RecipientName));
        assert_eq!(dict.resolve("받는분주소"), Some(CanonicalField::Address));
        // 부분 일치는 해석하지 않는다
        assert_eq!(dict.resolve("받는"), None);
    }

    #[test]
    fn test_resolve_ignores_disabled_entries() {
        let dict = SynonymDictionary::new(vec![entry(
            CanonicalField::RecipientName,
            "받는분",
            false,
        )]);
        assert_eq!(dict.resolve("받는분"), None);
    }

    #[test]
    fn test_resolve_is_deterministic_first_enabled_wins() {
        // 비활성 항목 뒤의 활성 항목이 이긴다
        let dict = SynonymDictionary::new(vec![
            entry(CanonicalField::Phone, "연락처", false),
            entry(CanonicalField::Mobile, "연락처", true),
        ]);
        assert_eq!(dict.resolve("연락처"), Some(CanonicalField::Mobile));
        assert_eq!(dict.resolve("연락처"), Some(CanonicalField::Mobile));
    }

    #[test]
    fn test_conflicting_field() {
        let dict = SynonymDictionary::new(vec![entry(CanonicalField::Phone, "연락처", true)]);
        assert_eq!(
            dict.conflicting_field("연락처", CanonicalField::Mobile),
            Some(CanonicalField::Phone)
        );
        assert_eq!(dict.conflicting_field("연락처", CanonicalField::Phone), None);
        assert_eq!(dict.conflicting_field("새동의어", CanonicalField::Mobile), None);
    }
}
