// ==========================================
// 통합 주문 발주 시스템 - 수집 API
// ==========================================
// 역할: 파일 미리보기 / 수집 실행 / 재분류의 진입점
// 엔진 입력(사전/분류 기준/제외 패턴)은 매 호출 시점의
// 저장 상태로 새로 적재한다 (설정 변경 즉시 반영)
// ==========================================

use crate::api::error::ApiResult;
use crate::engine::classify::ClassificationEngine;
use crate::engine::exclusion::ExclusionFilter;
use crate::engine::structure::StructureReport;
use crate::engine::synonym::SynonymDictionary;
use crate::importer::order_importer::{ImportSummary, OrderImporter};
use crate::repository::manufacturer_repo::ManufacturerRepository;
use crate::repository::mapping_repo::MappingRepository;
use crate::repository::order_repo::OrderRepository;
use crate::repository::settings_repo::SettingsRepository;
use std::path::Path;
use tracing::info;

pub struct UploadApi<'a> {
    pub order_repo: &'a OrderRepository,
    pub manufacturer_repo: &'a ManufacturerRepository,
    pub mapping_repo: &'a MappingRepository,
    pub settings_repo: &'a SettingsRepository,
}

impl<'a> UploadApi<'a> {
    /// 파일 구조 미리보기 (저장 없음)
    pub fn analyze_file(
        &self,
        file_path: &Path,
        forced_header_row: Option<u32>,
    ) -> ApiResult<StructureReport> {
        let dictionary = self.load_dictionary()?;
        let classifier = self.load_classifier()?;
        let exclusion = self.load_exclusion()?;
        let importer = OrderImporter::new(&dictionary, &classifier, &exclusion);
        Ok(importer.analyze_file(file_path, forced_header_row)?)
    }

    /// 주문 파일 수집 실행
    pub fn import_file(
        &self,
        file_path: &Path,
        forced_header_row: Option<u32>,
    ) -> ApiResult<ImportSummary> {
        let dictionary = self.load_dictionary()?;
        let classifier = self.load_classifier()?;
        let exclusion = self.load_exclusion()?;
        let importer = OrderImporter::new(&dictionary, &classifier, &exclusion);
        Ok(importer.import_file(file_path, forced_header_row, self.order_repo)?)
    }

    /// 미분류 주문 재분류 (매핑 보강 후 소급 적용)
    ///
    /// force 가 아니면 미분류 레코드만 재판정한다.
    /// 반환값은 제조사가 새로 부여/변경된 건수.
    pub fn reclassify(&self, force: bool) -> ApiResult<usize> {
        let classifier = self.load_classifier()?;

        let mut records = if force {
            self.order_repo.list_all()?
        } else {
            self.order_repo.list_unclassified()?
        };

        let changed = classifier.reclassify(&mut records, force);
        if changed > 0 {
            let assignments: Vec<(String, i64)> = records
                .iter()
                .filter_map(|r| r.manufacturer_id.map(|id| (r.order_no.clone(), id)))
                .collect();
            self.order_repo.update_manufacturer_bulk(&assignments)?;
        }

        info!(changed, force, "재분류 완료");
        Ok(changed)
    }

    fn load_dictionary(&self) -> ApiResult<SynonymDictionary> {
        Ok(SynonymDictionary::new(self.mapping_repo.list_synonyms()?))
    }

    fn load_classifier(&self) -> ApiResult<ClassificationEngine> {
        Ok(ClassificationEngine::new(
            self.manufacturer_repo.load_product_code_map()?,
            self.manufacturer_repo.load_option_name_map()?,
        ))
    }

    fn load_exclusion(&self) -> ApiResult<ExclusionFilter> {
        Ok(ExclusionFilter::new(&self.settings_repo.list_patterns()?))
    }
}
