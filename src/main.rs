// ==========================================
// SAP 成本核算批处理 - 命令行入口
// ==========================================
// 用法:
//   sap-costing [--env-file PATH] [--json-logs] <reconcile|costing|all>
// 退出码: 仅致命错误（配置 / 认证 / 数据库打开）非零
// ==========================================

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use sap_costing::config::{apply_overrides, load_env_file, JobConfig};
use sap_costing::db::{ensure_schema, open_sqlite_connection};
use sap_costing::engine::{CostingJob, ReconcileJob, ReconcileParams};
use sap_costing::importer::read_material_list;
use sap_costing::logging;
use sap_costing::repository::{OrderRepository, WarehouseRepository};
use sap_costing::sources::{CaptureDirSource, RestBridgeClient};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sap-costing")]
#[command(version, about = "SAP 成本核算批处理: 拉料对账 / 原材料成本 / 报表输出")]
struct Cli {
    /// .env 文件路径（缺省时查找当前目录及上级目录）
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// 拉料 / 库存对账，回写叫料订单
    Reconcile,
    /// 原材料成本核算，输出工作簿
    Costing,
    /// 依次执行对账与成本核算
    All,
}

async fn run_reconcile(
    config: &JobConfig,
    conn: Arc<Mutex<Connection>>,
    today: NaiveDate,
) -> Result<()> {
    let bridge = config.bridge_settings()?;
    let params = ReconcileParams {
        buyer_id: config.buyer_id.clone(),
        customer_code: bridge.customer_code.clone(),
        from_date: bridge.from_date.clone(),
    };
    let client = RestBridgeClient::new(bridge, config.request_timeout)?;

    let job = ReconcileJob::new(
        Arc::new(client),
        OrderRepository::from_connection(conn.clone()),
        WarehouseRepository::from_connection(conn),
        params,
    );
    let summary = job.run(today).await?;
    info!(
        run_id = %summary.run_id,
        orders = summary.orders,
        updated = summary.updated,
        failed = summary.failed.len(),
        "对账作业结束"
    );
    Ok(())
}

async fn run_costing(config: &JobConfig, today: NaiveDate) -> Result<()> {
    let capture = config.capture_settings()?;
    let list_path = config.material_list_path()?;
    let items = read_material_list(list_path, &config.plant_filter)
        .with_context(|| format!("物料清单读取失败: {}", list_path.display()))?;

    let job = CostingJob::new(Arc::new(CaptureDirSource::new(capture)), config);
    let summary = job.run(&items, today).await?;
    info!(
        run_id = %summary.run_id,
        processed = summary.processed,
        failed = summary.failed.len(),
        workbooks = summary.workbooks.len(),
        "成本核算作业结束"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    info!("==================================================");
    info!("{} v{}", sap_costing::APP_NAME, sap_costing::VERSION);
    info!("==================================================");

    load_env_file(cli.env_file.as_deref())?;
    let mut config = JobConfig::from_env()?;

    info!("使用数据库: {}", config.db_path);
    let conn = open_sqlite_connection(&config.db_path)
        .with_context(|| format!("无法打开数据库: {}", config.db_path))?;
    ensure_schema(&conn).context("数据库结构初始化失败")?;
    apply_overrides(&conn, &mut config)?;
    let conn = Arc::new(Mutex::new(conn));

    let today = Local::now().date_naive();
    match cli.command {
        Command::Reconcile => run_reconcile(&config, conn, today).await?,
        Command::Costing => run_costing(&config, today).await?,
        Command::All => {
            run_reconcile(&config, conn, today).await?;
            run_costing(&config, today).await?;
        }
    }
    Ok(())
}
