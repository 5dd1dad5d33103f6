//! 명령 결과(`Output`)를 콘솔 줄 단위 텍스트로 변환.

use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use crate::domain::value::Output;

const COLUMN_GAP: &str = "  ";

/// 출력할 줄 목록을 만든다. `Nothing`이면 빈 목록.
pub fn render_output(output: &Output) -> Vec<String> {
    match output {
        Output::Nothing => Vec::new(),
        Output::Text(text) => vec![text.clone()],
        Output::Lines(lines) => lines.clone(),
        Output::Records(records) => render_table(records),
        Output::Value(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            pretty.lines().map(ToString::to_string).collect()
        }
    }
}

/// 레코드를 헤더 + 구분선 + 행으로 정렬한다. 열은 처음 나타난 순서의 키 합집합.
pub fn render_table(records: &[Map<String, Value>]) -> Vec<String> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(*column).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .map(|row| row[idx].width())
                .chain(std::iter::once(column.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(join_row(columns.iter().copied(), &widths));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    for row in &rows {
        out.push(join_row(row.iter().map(String::as_str), &widths));
    }
    out
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 표시 폭 기준으로 채운다(전각 문자 고려). 마지막 열은 채우지 않는다.
fn join_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells: Vec<&str> = cells.collect();
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        if idx < last {
            let pad = widths[idx].saturating_sub(cell.width());
            line.push_str(&" ".repeat(pad));
        }
    }
    line
}
