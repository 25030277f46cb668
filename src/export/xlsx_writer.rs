// ==========================================
// 통합 주문 발주 시스템 - XLSX 출력기
// ==========================================
// 역할: 렌더링 결과 / 재배치 그리드 → .xlsx 파일 기록
// 규칙 배치: 헤더는 header_row, 데이터는 data_start_row 에 쓴다.
//            그 위의 행은 비워 둔다 (표지 행 자리 보존)
// ==========================================

use crate::domain::mapping::column_index;
use crate::engine::renderer::RenderedSheet;
use crate::export::error::{ExportError, ExportResult};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::info;

pub struct XlsxWriter;

impl XlsxWriter {
    /// 렌더링된 발주서를 xlsx 로 기록
    ///
    /// 각 열은 규칙의 열 문자 위치에 그대로 배치된다.
    /// (열 문자는 렌더러가 이미 검증했다)
    pub fn write_rendered_sheet(
        sheet: &RenderedSheet,
        header_row: u32,
        data_start_row: u32,
        output_path: &Path,
    ) -> ExportResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let col_indices: Vec<u16> = sheet
            .columns
            .iter()
            .map(|c| {
                column_index(c)
                    .map(|i| (i - 1) as u16)
                    .ok_or_else(|| ExportError::InvalidLayout(format!("잘못된 열 문자: {}", c)))
            })
            .collect::<ExportResult<Vec<_>>>()?;

        for (pos, &col) in col_indices.iter().enumerate() {
            worksheet.write_string(header_row.saturating_sub(1), col, &sheet.header[pos])?;
        }

        for (row_offset, row) in sheet.rows.iter().enumerate() {
            let out_row = data_start_row.saturating_sub(1) + row_offset as u32;
            for (pos, &col) in col_indices.iter().enumerate() {
                worksheet.write_string(out_row, col, &row[pos])?;
            }
        }

        workbook.save(output_path)?;
        info!(
            path = %output_path.display(),
            rows = sheet.rows.len(),
            "발주서 xlsx 기록 완료"
        );
        Ok(())
    }

    /// 재배치 파이프라인 출력 그리드를 xlsx 로 기록 (1행부터 순서대로)
    pub fn write_grid(grid: &[Vec<String>], output_path: &Path) -> ExportResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (row_idx, row) in grid.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string(row_idx as u32, col_idx as u16, cell)?;
            }
        }

        workbook.save(output_path)?;
        info!(path = %output_path.display(), rows = grid.len(), "재출력 xlsx 기록 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_rendered_sheet_creates_file() {
        let sheet = RenderedSheet {
            columns: vec!["B".to_string(), "D".to_string()],
            header: vec!["수취인".to_string(), "주소".to_string()],
            rows: vec![vec!["이수취".to_string(), "서울시".to_string()]],
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        XlsxWriter::write_rendered_sheet(&sheet, 2, 3, &path).unwrap();

        assert!(path.exists());
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_write_grid_creates_file() {
        let grid = vec![
            vec!["r".to_string(), "Z".to_string(), "p".to_string()],
            vec!["1".to_string(), "Z".to_string(), "2".to_string()],
        ];

        let dir = tempdir().unwrap();
        let path = dir.path().join("channel.xlsx");
        XlsxWriter::write_grid(&grid, &path).unwrap();

        assert!(path.exists());
    }
}
