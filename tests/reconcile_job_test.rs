// ==========================================
// 拉料对账作业集成测试
// ==========================================
// 测试目标: 订单读取 → 拉料记录 → 对账 → 回写 的完整流程
// ==========================================

mod test_helpers;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sap_costing::domain::PulloutRecord;
use sap_costing::engine::{ReconcileJob, ReconcileParams};
use sap_costing::error::{JobError, JobResult};
use sap_costing::logging;
use sap_costing::repository::{OrderRepository, WarehouseRepository};
use sap_costing::sources::{PulloutQuery, PulloutSource};
use std::sync::{Arc, Mutex};
use test_helpers::{create_test_db, insert_order, insert_stock, read_computed, shared_conn};

// ==========================================
// 测试替身
// ==========================================

struct FakePulloutSource {
    records: Vec<PulloutRecord>,
    fail_auth: bool,
    queries: Mutex<Vec<PulloutQuery>>,
}

impl FakePulloutSource {
    fn new(records: Vec<PulloutRecord>) -> Self {
        Self {
            records,
            fail_auth: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail_auth: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl PulloutSource for FakePulloutSource {
    async fn fetch_pullouts(&self, query: &PulloutQuery) -> JobResult<Vec<PulloutRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail_auth {
            return Err(JobError::Auth("token rejected".to_string()));
        }
        Ok(self.records.clone())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn params() -> ReconcileParams {
    ReconcileParams {
        buyer_id: "BMW".to_string(),
        customer_code: "C100".to_string(),
        from_date: "20260101".to_string(),
    }
}

fn build_job(db_path: &str, source: Arc<FakePulloutSource>) -> ReconcileJob {
    let conn = shared_conn(db_path);
    ReconcileJob::new(
        source,
        OrderRepository::from_connection(conn.clone()),
        WarehouseRepository::from_connection(conn),
        params(),
    )
}

// ==========================================
// 测试用例
// ==========================================

#[tokio::test]
async fn test_reconcile_run_updates_current_week_orders() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let iso = today().iso_week();
    {
        let conn = shared_conn(&db_path);
        let c = conn.lock().unwrap();
        insert_order(&c, 1, "BMW", iso.year(), iso.week(), "A-100", "50", Some("2026-10-12"));
        insert_order(&c, 2, "BMW", iso.year(), iso.week(), "B-200", "5", None);
        insert_order(&c, 3, "BMW", iso.year(), iso.week() - 1, "A-100", "99", None);
        insert_stock(&c, "A-100", "100");
    }

    let source = Arc::new(FakePulloutSource::new(vec![
        PulloutRecord::new("A-100")
            .with_balance_qty(30.0)
            .with_pull_qty(10.0)
            .with_open_qty(0.0)
            .with_received_flag("")
            .with_ship_date("2026-11-03")
            .with_eta("2026-11-20"),
        PulloutRecord::new("Z-999").with_balance_qty(7.0),
    ]));
    let job = build_job(&db_path, source.clone());

    let summary = job.run(today()).await.unwrap();
    assert!(!summary.run_id.is_empty());
    assert_eq!(summary.orders, 2);
    assert_eq!(summary.pullouts, 2);
    assert_eq!(summary.updated, 2);
    assert!(summary.failed.is_empty());

    // 查询参数
    let queries = source.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].from_date, "20260101");
    assert_eq!(queries[0].to_date, "20261016");
    assert_eq!(queries[0].customer_code, "C100");
    drop(queries);

    let conn = shared_conn(&db_path);
    let c = conn.lock().unwrap();

    let first = read_computed(&c, 1);
    assert_eq!(first.warehouse_stock, Some(100.0));
    assert_eq!(first.blg_warehouse_stock, Some(30.0));
    assert_eq!(first.git_qty, Some(10.0));
    assert_eq!(first.next_git_wh_qty, Some(10.0));
    assert_eq!(first.next_git_wh_date.as_deref(), Some("2026-11-20"));
    assert_eq!(first.safety_stock_alarm, Some(80));
    assert_eq!(first.short_fall_demand_qty, Some(20));
    assert_eq!(first.tot_demand_qty_raise, Some(100));
    assert_eq!(first.demand_dt_prod.as_deref(), Some("2026-07-04"));
    assert_eq!(first.dem_sea.as_deref(), Some("2026-08-03"));
    assert_eq!(first.dem_air.as_deref(), Some("2026-09-17"));
    assert_eq!(first.mat_pos.as_deref(), Some("Unknown"));

    let second = read_computed(&c, 2);
    assert_eq!(second.warehouse_stock, Some(0.0));
    assert_eq!(second.safety_stock_alarm, Some(0));
    assert_eq!(second.short_fall_demand_qty, Some(5));
    assert_eq!(second.tot_demand_qty_raise, Some(5));
    assert_eq!(second.demand_dt_prod, None);
    assert_eq!(
        second.mat_pos.as_deref(),
        Some("Stock not available - Plan for dispatch")
    );

    // 上周订单不处理
    assert_eq!(read_computed(&c, 3).mat_pos, None);
}

#[tokio::test]
async fn test_reconcile_rerun_overwrites_same_columns() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let iso = today().iso_week();
    {
        let conn = shared_conn(&db_path);
        let c = conn.lock().unwrap();
        insert_order(&c, 1, "BMW", iso.year(), iso.week(), "A-100", "50", None);
        insert_stock(&c, "A-100", "40");
    }

    let source = Arc::new(FakePulloutSource::new(vec![
        PulloutRecord::new("A-100").with_balance_qty(40.0)
    ]));
    let job = build_job(&db_path, source);

    let first = job.run(today()).await.unwrap();
    let second = job.run(today()).await.unwrap();
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(second.updated, 1);

    let conn = shared_conn(&db_path);
    let stored = read_computed(&conn.lock().unwrap(), 1);
    assert_eq!(stored.safety_stock_alarm, Some(0));
    assert_eq!(stored.short_fall_demand_qty, Some(10));
    assert_eq!(
        stored.mat_pos.as_deref(),
        Some("Sufficient stock available in warehouse against call-off")
    );
}

#[tokio::test]
async fn test_reconcile_auth_failure_is_fatal_and_writes_nothing() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let iso = today().iso_week();
    {
        let conn = shared_conn(&db_path);
        insert_order(
            &conn.lock().unwrap(),
            1,
            "BMW",
            iso.year(),
            iso.week(),
            "A-100",
            "50",
            None,
        );
    }

    let job = build_job(&db_path, Arc::new(FakePulloutSource::failing()));
    let err = job.run(today()).await.unwrap_err();
    assert!(err.is_fatal());

    let conn = shared_conn(&db_path);
    assert_eq!(read_computed(&conn.lock().unwrap(), 1).mat_pos, None);
}
