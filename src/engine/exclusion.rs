// ==========================================
// 통합 주문 발주 시스템 - 발송 제외 필터
// ==========================================
// 역할: 배송구분 자유 텍스트에 대한 패턴 기반 발송 제외 판정
// 의미: 활성 패턴 중 하나라도 일치하면 제외 (집합 일치, first-match 아님)
// 제외 주문은 감사를 위해 계속 조회되지만 발송 배치에는 절대 포함되지 않는다
// ==========================================

use crate::domain::mapping::ExclusionPattern;
use regex::Regex;
use tracing::warn;

// ==========================================
// ExclusionFilter - 제외 필터
// ==========================================
// 생성 시 정규식을 미리 컴파일한다.
// 잘못된 정규식 패턴은 경고 후 무시 (수집 전체를 막지 않는다)
pub struct ExclusionFilter {
    literals: Vec<String>,
    regexes: Vec<Regex>,
}

impl ExclusionFilter {
    pub fn new(patterns: &[ExclusionPattern]) -> Self {
        let mut literals = Vec::new();
        let mut regexes = Vec::new();

        for pattern in patterns.iter().filter(|p| p.enabled) {
            if pattern.is_regex {
                match Regex::new(&pattern.pattern) {
                    Ok(re) => regexes.push(re),
                    Err(e) => {
                        warn!(pattern = %pattern.pattern, error = %e, "잘못된 제외 정규식, 무시함");
                    }
                }
            } else {
                literals.push(pattern.pattern.clone());
            }
        }

        Self { literals, regexes }
    }

    /// 배송구분 텍스트가 발송 제외 대상인지 판정
    ///
    /// 리터럴 패턴은 부분 문자열 일치, 정규식 패턴은 정규식 일치
    pub fn is_excluded(&self, fulfillment_type: &str) -> bool {
        if self.literals.iter().any(|lit| fulfillment_type.contains(lit.as_str())) {
            return true;
        }
        self.regexes.iter().any(|re| re.is_match(fulfillment_type))
    }
}
