// ==========================================
// SAP 成本核算批处理 - 屏幕抓取目录数据源
// ==========================================
// 浏览器自动化在进程外完成，抓取结果按事务码落盘:
//
//   <capture_dir>/<plant>/<material>/<YB>.csv|.xlsx|.xls   成本分解
//   <capture_dir>/<plant>/<material>/<Z2>.html             条件价格
//   <capture_dir>/<plant>/<material>/<ZM>_<from>_<to>.html 期间评估
//   <capture_dir>/<plant>/<material>/<ME>.html             采购订单历史
//   <capture_dir>/<plant>/<material>/<MM>.html|.txt        库存评估均价
//   <capture_dir>/<ZC>_<from>_<to>.html（或 <ZC>.html）     汇率
//
// 日期为 YYYYMMDD；文件缺失视为数据缺失（DataShape），读取失败视为 Io
// ==========================================

use crate::config::job_config::CaptureSettings;
use crate::domain::run::PlantMaterial;
use crate::domain::table::RawTable;
use crate::error::{JobError, JobResult};
use crate::importer::cost_breakdown::COST_BREAKDOWN_HEADER_ROW;
use crate::importer::data_cleaner::format_yyyymmdd;
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::importer::html_table::{extract_field_text, parse_html_table};
use crate::sources::ScreenSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

// ===== HTML 表格跳过的前导行数（表头行 / 汇总行）=====
pub const SPOT_SKIP_ROWS: usize = 1;
pub const PERIOD_SKIP_ROWS: usize = 0;
pub const ORDER_HISTORY_SKIP_ROWS: usize = 1;
pub const EXCHANGE_RATE_SKIP_ROWS: usize = 2;

// 库存评估屏幕的取值字段
pub const INVENTORY_FIELD_SELECTOR: &str = "span.value, td";

const COST_BREAKDOWN_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

pub struct CaptureDirSource {
    settings: CaptureSettings,
}

impl CaptureDirSource {
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings }
    }

    fn item_dir(&self, item: &PlantMaterial) -> PathBuf {
        self.settings
            .capture_dir
            .join(&item.plant)
            .join(&item.material)
    }

    fn windowed_name(t_code: &str, from: NaiveDate, to: NaiveDate, ext: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            t_code,
            format_yyyymmdd(from),
            format_yyyymmdd(to),
            ext
        )
    }

    async fn read_text(path: &Path) -> JobResult<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(JobError::DataShape(format!(
                "抓取文件不存在: {}",
                path.display()
            ))),
            Err(e) => Err(JobError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    async fn read_html_table(path: &Path, skip_rows: usize) -> JobResult<RawTable> {
        let html = Self::read_text(path).await?;
        let table = parse_html_table(&html, skip_rows)?;
        debug!(
            path = %path.display(),
            headers = table.headers.len(),
            rows = table.rows.len(),
            "屏幕表格读取完成"
        );
        Ok(table)
    }
}

#[async_trait]
impl ScreenSource for CaptureDirSource {
    async fn cost_breakdown(&self, item: &PlantMaterial) -> JobResult<RawTable> {
        let dir = self.item_dir(item);
        let path = COST_BREAKDOWN_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", self.settings.t_code_yb, ext)))
            .find(|p| p.exists())
            .ok_or_else(|| {
                JobError::DataShape(format!(
                    "成本分解抓取文件不存在: {}/{}.*",
                    dir.display(),
                    self.settings.t_code_yb
                ))
            })?;
        Ok(UniversalFileParser.parse_table(&path, COST_BREAKDOWN_HEADER_ROW)?)
    }

    async fn spot_conditions(&self, item: &PlantMaterial) -> JobResult<RawTable> {
        let path = self
            .item_dir(item)
            .join(format!("{}.html", self.settings.t_code_z2));
        Self::read_html_table(&path, SPOT_SKIP_ROWS).await
    }

    async fn period_valuation(
        &self,
        item: &PlantMaterial,
        from: NaiveDate,
        to: NaiveDate,
    ) -> JobResult<RawTable> {
        let path = self
            .item_dir(item)
            .join(Self::windowed_name(&self.settings.t_code_zm, from, to, "html"));
        Self::read_html_table(&path, PERIOD_SKIP_ROWS).await
    }

    async fn order_history(&self, item: &PlantMaterial) -> JobResult<RawTable> {
        let path = self
            .item_dir(item)
            .join(format!("{}.html", self.settings.t_code_me));
        Self::read_html_table(&path, ORDER_HISTORY_SKIP_ROWS).await
    }

    async fn inventory_valuation(&self, item: &PlantMaterial) -> JobResult<Option<String>> {
        let dir = self.item_dir(item);
        let html_path = dir.join(format!("{}.html", self.settings.t_code_mm));
        if html_path.exists() {
            let html = Self::read_text(&html_path).await?;
            return Ok(extract_field_text(&html, INVENTORY_FIELD_SELECTOR)?);
        }

        let text = Self::read_text(&dir.join(format!("{}.txt", self.settings.t_code_mm))).await?;
        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    async fn exchange_rates(&self, from: NaiveDate, to: NaiveDate) -> JobResult<RawTable> {
        let dir = &self.settings.capture_dir;
        let windowed = dir.join(Self::windowed_name(&self.settings.t_code_zc, from, to, "html"));
        let path = if windowed.exists() {
            windowed
        } else {
            dir.join(format!("{}.html", self.settings.t_code_zc))
        };
        Self::read_html_table(&path, EXCHANGE_RATE_SKIP_ROWS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings(dir: &Path) -> CaptureSettings {
        CaptureSettings {
            capture_dir: dir.to_path_buf(),
            t_code_yb: "YBOM".to_string(),
            t_code_zm: "ZMPOVAL".to_string(),
            t_code_me: "ME2M".to_string(),
            t_code_mm: "MM60".to_string(),
            t_code_z2: "Z2PRICE".to_string(),
            t_code_zc: "ZCUR".to_string(),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_reads_item_screens() {
        let tmp = TempDir::new().unwrap();
        let item_dir = tmp.path().join("1100").join("M-001");
        fs::create_dir_all(&item_dir).unwrap();
        fs::write(
            item_dir.join("Z2PRICE.html"),
            "<table><tr><th>Price</th><th>Valid To</th></tr>\
             <tr><td>1,250.00</td><td>31.03.2024</td></tr></table>",
        )
        .unwrap();
        fs::write(item_dir.join("MM60.txt"), " 98.40 \n").unwrap();
        fs::write(
            item_dir.join("ZMPOVAL_20260101_20261031.html"),
            "<table><tr><th>Total Value</th><th>Total Quantity</th></tr>\
             <tr><td>1,000</td><td>10</td></tr></table>",
        )
        .unwrap();

        let source = CaptureDirSource::new(settings(tmp.path()));
        let item = PlantMaterial::new("1100", "M-001");

        let spot = source.spot_conditions(&item).await.unwrap();
        assert_eq!(spot.rows, vec![vec!["1,250.00".to_string(), "31.03.2024".to_string()]]);

        let mm = source.inventory_valuation(&item).await.unwrap();
        assert_eq!(mm.as_deref(), Some("98.40"));

        let zm = source
            .period_valuation(&item, ymd(2026, 1, 1), ymd(2026, 10, 31))
            .await
            .unwrap();
        assert_eq!(zm.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_inventory_valuation_prefers_html_capture() {
        let tmp = TempDir::new().unwrap();
        let item_dir = tmp.path().join("2650").join("M-002");
        fs::create_dir_all(&item_dir).unwrap();
        fs::write(item_dir.join("MM60.txt"), "1.00").unwrap();
        fs::write(
            item_dir.join("MM60.html"),
            "<div><span class=\"value\"> </span><span class=\"value\">1,234.50</span></div>",
        )
        .unwrap();

        let source = CaptureDirSource::new(settings(tmp.path()));
        let mm = source
            .inventory_valuation(&PlantMaterial::new("2650", "M-002"))
            .await
            .unwrap();
        assert_eq!(mm.as_deref(), Some("1,234.50"));
    }

    #[tokio::test]
    async fn test_missing_capture_is_data_shape() {
        let tmp = TempDir::new().unwrap();
        let source = CaptureDirSource::new(settings(tmp.path()));
        let item = PlantMaterial::new("1100", "NOPE");

        let err = source.order_history(&item).await.unwrap_err();
        assert!(matches!(err, JobError::DataShape(_)));
        let err = source.cost_breakdown(&item).await.unwrap_err();
        assert!(matches!(err, JobError::DataShape(_)));
    }

    #[tokio::test]
    async fn test_exchange_rate_fallback_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("ZCUR.html"),
            "<table>\
             <tr><th>EXCHANGE RATE TYPE</th><th>FROM CURRENCY</th><th>TO CURRENCY</th><th>DATE</th><th>EXCHANGE-RATE</th></tr>\
             <tr><td></td><td></td><td></td><td></td><td></td></tr>\
             <tr><td>M</td><td>USD</td><td>INR</td><td>05.01.2024</td><td>82.10</td></tr>\
             </table>",
        )
        .unwrap();
        let source = CaptureDirSource::new(settings(tmp.path()));

        let table = source
            .exchange_rates(ymd(2024, 1, 1), ymd(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 1), "USD");
    }
}
