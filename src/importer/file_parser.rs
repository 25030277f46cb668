// ==========================================
// 통합 주문 발주 시스템 - 파일 파서
// ==========================================
// 지원: Excel (.xlsx/.xls) / CSV (.csv)
// 출력: 위치 그대로의 원본 그리드 (Vec<Vec<String>>)
// 주의: 헤더 행이 1행이라고 가정하지 않는다.
//       헤더 탐지는 구조 분석 엔진의 몫이므로 행 위치를 보존해야 한다.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    pub fn parse_to_grid(&self, file_path: &Path) -> ImportResult<Vec<Vec<String>>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 헤더 행 위치는 구조 분석이 결정
            .flexible(true) // 행 길이 불일치 허용
            .from_reader(file);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(grid)
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    pub fn parse_to_grid(&self, file_path: &Path) -> ImportResult<Vec<Vec<String>>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // xls/xlsx 는 포맷이 다르다. 파일 내용으로 리더를 고른다
        let mut workbook = open_workbook_auto(file_path)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 첫 번째 시트 사용
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("워크시트가 없습니다".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // calamine 범위는 사용 영역의 좌상단에서 시작한다.
        // 행/열 번호를 A1 기준으로 유지하기 위해 앞쪽을 빈 값으로 채운다
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut grid: Vec<Vec<String>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut row: Vec<String> = vec![String::new(); col_offset];
            row.extend(data_row.iter().map(|cell| cell.to_string()));
            grid.push(row);
        }

        Ok(grid)
    }
}

// ==========================================
// 통합 파일 파서 (확장자 자동 판별)
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<Vec<String>>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_grid(path),
            "xlsx" | "xls" => ExcelParser.parse_to_grid(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_preserves_row_positions() {
        // 헤더가 3행에 있는 파일: 앞의 행도 그대로 보존되어야 한다
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "주문서 제목,,").unwrap();
        writeln!(temp_file, ",,").unwrap();
        writeln!(temp_file, "주문번호,수취인,주소").unwrap();
        writeln!(temp_file, "ORD-1,이수취,서울시").unwrap();

        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();

        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0][0], "주문서 제목");
        assert_eq!(grid[2], vec!["주문번호", "수취인", "주소"]);
        assert_eq!(grid[3], vec!["ORD-1", "이수취", "서울시"]);
    }

    #[test]
    fn test_excel_parser_reads_workbook() {
        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "주문번호").unwrap();
        sheet.write_string(0, 1, "수취인").unwrap();
        sheet.write_string(1, 0, "ORD-1").unwrap();
        sheet.write_string(1, 1, "이수취").unwrap();
        workbook.save(temp_file.path()).unwrap();

        let grid = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], vec!["주문번호", "수취인"]);
        assert_eq!(grid[1], vec!["ORD-1", "이수취"]);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_grid(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let result = UniversalFileParser.parse("orders.pdf");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
