// ==========================================
// 통합 주문 발주 시스템 - 렌더링/출력 API
// ==========================================
// 두 출력 경로:
// - 제조사 발주서: 정규화 레코드 + 매핑 규칙 → 렌더러 → xlsx
// - 쇼핑몰 채널 재출력: 원본 그리드 → 열 재배치 파이프라인 → xlsx
// 한 목적지의 실패는 다른 목적지 출력에 영향을 주지 않는다
// (호출 측이 목적지 단위로 호출)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::engine::export_pipeline::ExportColumnPipeline;
use crate::engine::renderer::{RenderedSheet, SheetRenderer};
use crate::export::xlsx_writer::XlsxWriter;
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::manufacturer_repo::ManufacturerRepository;
use crate::repository::mapping_repo::MappingRepository;
use crate::repository::order_repo::OrderRepository;
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

pub struct RenderApi<'a> {
    pub order_repo: &'a OrderRepository,
    pub manufacturer_repo: &'a ManufacturerRepository,
    pub mapping_repo: &'a MappingRepository,
}

impl<'a> RenderApi<'a> {
    /// 제조사 발주서 렌더링 (파일 기록 없음, 미리보기 겸용)
    ///
    /// 발송 제외 플래그가 붙은 주문은 배치에 포함되지 않는다.
    pub fn render_manufacturer_sheet(
        &self,
        destination_key: &str,
        manufacturer_id: i64,
        today: NaiveDate,
    ) -> ApiResult<RenderedSheet> {
        let rule_set = self
            .mapping_repo
            .find_rule_set(destination_key)?
            .ok_or_else(|| ApiError::NotFound(format!("매핑 규칙: {}", destination_key)))?;

        let manufacturer = self
            .manufacturer_repo
            .find_by_id(manufacturer_id)?
            .ok_or_else(|| ApiError::NotFound(format!("제조사: {}", manufacturer_id)))?;

        let records = self.order_repo.list_sendable_by_manufacturer(manufacturer_id)?;

        let sheet = SheetRenderer::render(&rule_set, &records, Some(&manufacturer.name), today)?;
        info!(
            destination = destination_key,
            manufacturer = %manufacturer.name,
            rows = sheet.rows.len(),
            "발주서 렌더링 완료"
        );
        Ok(sheet)
    }

    /// 제조사 발주서를 xlsx 파일로 출력
    pub fn export_manufacturer_sheet(
        &self,
        destination_key: &str,
        manufacturer_id: i64,
        today: NaiveDate,
        output_path: &Path,
    ) -> ApiResult<RenderedSheet> {
        let rule_set = self
            .mapping_repo
            .find_rule_set(destination_key)?
            .ok_or_else(|| ApiError::NotFound(format!("매핑 규칙: {}", destination_key)))?;

        let sheet = self.render_manufacturer_sheet(destination_key, manufacturer_id, today)?;
        XlsxWriter::write_rendered_sheet(
            &sheet,
            rule_set.header_row,
            rule_set.data_start_row,
            output_path,
        )?;
        Ok(sheet)
    }

    /// 쇼핑몰 채널 그리드 재배치
    ///
    /// 헤더 행은 규칙에 저장된 명시적 정수를 쓴다. 출력 시점에
    /// 밀도 탐지로 다시 추정하지 않는다 (탐지는 규칙 편집 시에만).
    /// forced_header_row 는 호출자가 명시적으로 지정한 경우에만 우선한다.
    pub fn reshape_channel_grid(
        &self,
        destination_key: &str,
        grid: &[Vec<String>],
        forced_header_row: Option<u32>,
    ) -> ApiResult<Vec<Vec<String>>> {
        let rule_set = self
            .mapping_repo
            .find_rule_set(destination_key)?
            .ok_or_else(|| ApiError::NotFound(format!("매핑 규칙: {}", destination_key)))?;

        let pipeline_config = rule_set.export_pipeline.as_ref().ok_or_else(|| {
            ApiError::BadRequest(format!(
                "목적지 {} 에 재출력 파이프라인이 설정되어 있지 않습니다",
                destination_key
            ))
        })?;

        let header_row = forced_header_row.unwrap_or(rule_set.header_row);
        if header_row as usize > grid.len() {
            return Err(ApiError::BadRequest(format!(
                "헤더 행 {} 이 입력 범위({}행)를 벗어났습니다",
                header_row,
                grid.len()
            )));
        }

        Ok(ExportColumnPipeline::apply(pipeline_config, grid, header_row))
    }

    /// 쇼핑몰 채널 파일 재출력
    ///
    /// 입력 파일을 파싱해 규칙의 열 재배치 파이프라인을 적용하고
    /// 결과 그리드를 xlsx 로 기록한다.
    pub fn reexport_channel_file(
        &self,
        destination_key: &str,
        input_path: &Path,
        output_path: &Path,
        forced_header_row: Option<u32>,
    ) -> ApiResult<usize> {
        let grid = UniversalFileParser
            .parse(input_path)
            .map_err(ApiError::Import)?;

        let output = self.reshape_channel_grid(destination_key, &grid, forced_header_row)?;
        XlsxWriter::write_grid(&output, output_path)?;

        info!(
            destination = destination_key,
            rows = output.len(),
            path = %output_path.display(),
            "채널 재출력 완료"
        );
        Ok(output.len())
    }
}
