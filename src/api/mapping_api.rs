// ==========================================
// 통합 주문 발주 시스템 - 매핑 규칙 관리 API
// ==========================================
// 저장 정책:
// - hard 오류(템플릿 문법 / 행 번호 위반)는 force 로도 저장 불가
// - soft 오류(중복 필드 바인딩)는 기본 거부, force 지정 시 저장
// - 검증기는 보고만 하고 규칙을 자동 수정하지 않는다
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::mapping::{
    DuplicateCheckSettings, ExclusionPattern, MappingRuleSet, SynonymEntry,
};
use crate::engine::validation::{RuleSetValidator, ValidationReport};
use crate::repository::mapping_repo::MappingRepository;
use crate::repository::settings_repo::SettingsRepository;
use tracing::{info, warn};

pub struct MappingApi<'a> {
    pub mapping_repo: &'a MappingRepository,
    pub settings_repo: &'a SettingsRepository,
    pub config: &'a ConfigManager,
}

impl<'a> MappingApi<'a> {
    // ==========================================
    // 매핑 규칙
    // ==========================================

    /// 저장 없이 검증만 수행 (편집 화면 피드백용)
    pub fn validate_rule_set(&self, rule_set: &MappingRuleSet) -> ValidationReport {
        RuleSetValidator::validate(rule_set)
    }

    /// 규칙 저장
    ///
    /// force: 중복 필드 바인딩 경고를 무시하고 저장
    pub fn save_rule_set(&self, rule_set: &MappingRuleSet, force: bool) -> ApiResult<()> {
        let report = RuleSetValidator::validate(rule_set);

        if report.has_hard_errors() {
            let mut messages: Vec<String> = report
                .template_errors
                .iter()
                .map(|(column, err)| format!("열 {}: {}", column, err))
                .collect();
            messages.extend(report.structural_errors.iter().cloned());
            return Err(ApiError::RuleValidationFailed(messages.join(" / ")));
        }

        if !report.duplicate_field_bindings.is_empty() && !force {
            let described: Vec<String> = report
                .duplicate_field_bindings
                .iter()
                .map(|(field, columns)| format!("{} → {:?}", field.key(), columns))
                .collect();
            return Err(ApiError::RuleValidationFailed(format!(
                "중복 필드 바인딩: {} (무시하려면 강제 저장)",
                described.join(", ")
            )));
        }

        if !report.duplicate_field_bindings.is_empty() {
            warn!(
                destination = %rule_set.destination_key,
                "중복 필드 바인딩을 무시하고 강제 저장"
            );
        }

        self.mapping_repo.save_rule_set(rule_set)?;
        info!(destination = %rule_set.destination_key, "매핑 규칙 저장 완료");
        Ok(())
    }

    pub fn get_rule_set(&self, destination_key: &str) -> ApiResult<MappingRuleSet> {
        self.mapping_repo
            .find_rule_set(destination_key)?
            .ok_or_else(|| ApiError::NotFound(format!("매핑 규칙: {}", destination_key)))
    }

    pub fn list_rule_sets(&self) -> ApiResult<Vec<MappingRuleSet>> {
        Ok(self.mapping_repo.list_rule_sets()?)
    }

    pub fn delete_rule_set(&self, destination_key: &str) -> ApiResult<()> {
        Ok(self.mapping_repo.delete_rule_set(destination_key)?)
    }

    // ==========================================
    // 동의어 사전
    // ==========================================

    pub fn add_synonym(&self, entry: &SynonymEntry) -> ApiResult<i64> {
        Ok(self.mapping_repo.insert_synonym(entry)?)
    }

    pub fn set_synonym_enabled(&self, id: i64, enabled: bool) -> ApiResult<()> {
        Ok(self.mapping_repo.set_synonym_enabled(id, enabled)?)
    }

    pub fn delete_synonym(&self, id: i64) -> ApiResult<()> {
        Ok(self.mapping_repo.delete_synonym(id)?)
    }

    pub fn list_synonyms(&self) -> ApiResult<Vec<SynonymEntry>> {
        Ok(self.mapping_repo.list_synonyms()?)
    }

    // ==========================================
    // 발송 제외 패턴
    // ==========================================

    pub fn add_exclusion_pattern(&self, pattern: &ExclusionPattern) -> ApiResult<i64> {
        Ok(self.settings_repo.insert_pattern(pattern)?)
    }

    pub fn set_exclusion_enabled(&self, id: i64, enabled: bool) -> ApiResult<()> {
        Ok(self.settings_repo.set_pattern_enabled(id, enabled)?)
    }

    pub fn delete_exclusion_pattern(&self, id: i64) -> ApiResult<()> {
        Ok(self.settings_repo.delete_pattern(id)?)
    }

    pub fn list_exclusion_patterns(&self) -> ApiResult<Vec<ExclusionPattern>> {
        Ok(self.settings_repo.list_patterns()?)
    }

    // ==========================================
    // 중복 발송 확인 설정
    // ==========================================

    pub fn get_duplicate_check_settings(&self) -> ApiResult<DuplicateCheckSettings> {
        Ok(self.config.get_duplicate_check_settings()?)
    }

    pub fn set_duplicate_check_settings(&self, settings: DuplicateCheckSettings) -> ApiResult<()> {
        Ok(self.config.set_duplicate_check_settings(settings)?)
    }
}
