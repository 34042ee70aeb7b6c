// ==========================================
// SAP 成本核算批处理 - HTML 表格解析
// ==========================================
// 用途: 解析 SAP Web GUI 屏幕上抓取的结果表
// 规则:
// - 表头取 <th> 文本（去空白，丢弃空表头）
// - 数据行取 <tr>，跳过前 skip_rows 行
// - <td> 数量少于表头数的行丢弃
// ==========================================

use crate::domain::table::RawTable;
use crate::importer::error::{ImportError, ImportResult};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> ImportResult<Selector> {
    Selector::parse(css).map_err(|e| ImportError::HtmlParseError(format!("{css}: {e:?}")))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 解析文档中第一个带表头的表格
pub fn parse_html_table(html: &str, skip_rows: usize) -> ImportResult<RawTable> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let th_sel = selector("th")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .find(|t| t.select(&th_sel).next().is_some())
        .ok_or_else(|| ImportError::HtmlParseError("未找到带表头的表格".to_string()))?;

    let headers: Vec<String> = table
        .select(&th_sel)
        .map(|th| element_text(&th))
        .filter(|h| !h.is_empty())
        .collect();

    let rows = table
        .select(&tr_sel)
        .skip(skip_rows)
        .map(|tr| tr.select(&td_sel).map(|td| element_text(&td)).collect::<Vec<_>>())
        .filter(|cells| cells.len() >= headers.len() && !cells.is_empty())
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// 提取文档中第一个非空文本元素（单字段屏幕，如库存评估均价）
pub fn extract_field_text(html: &str, css: &str) -> ImportResult<Option<String>> {
    let document = Html::parse_document(html);
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .map(|e| element_text(&e))
        .find(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_HISTORY: &str = r#"
        <html><body><table>
          <tr><th>Order Quantity</th><th></th><th>Net Order Value</th></tr>
          <tr><td>10</td><td>1,000.00</td></tr>
          <tr><td>20</td><td>2,000.00</td></tr>
          <tr><td>5</td><td>short</td></tr>
          <tr><td>40</td><td>4,400.00</td></tr>
        </table></body></html>
    "#;

    #[test]
    fn test_headers_drop_blank_cells() {
        let table = parse_html_table(ORDER_HISTORY, 1).unwrap();
        assert_eq!(table.headers, vec!["Order Quantity", "Net Order Value"]);
    }

    #[test]
    fn test_skip_rows_and_short_rows() {
        let html = r#"<table>
            <tr><th>A</th><th>B</th><th>C</th></tr>
            <tr><td>1</td><td>2</td><td>3</td></tr>
            <tr><td>4</td><td>5</td></tr>
            <tr><td>6</td><td>7</td><td>8</td></tr>
        </table>"#;
        let table = parse_html_table(html, 1).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(1, 2), "8");

        let skipped = parse_html_table(html, 2).unwrap();
        assert_eq!(skipped.rows.len(), 1);
        assert_eq!(skipped.cell(0, 0), "6");
    }

    #[test]
    fn test_no_table_is_error() {
        let result = parse_html_table("<html><body><p>nothing</p></body></html>", 1);
        assert!(matches!(result, Err(ImportError::HtmlParseError(_))));
    }

    #[test]
    fn test_extract_field_text() {
        let html = r#"<div><span class="val"> </span><span class="val">1,234.56</span></div>"#;
        assert_eq!(
            extract_field_text(html, "span.val").unwrap(),
            Some("1,234.56".to_string())
        );
        assert_eq!(extract_field_text(html, "span.none").unwrap(), None);
    }
}
