//! The four jobs over the real stack, writing to log files in a temp dir

mod common;

use chrono::NaiveDateTime;
use common::{now, read_lines, start_stack};
use crm_core::application::{
    DirectStoreStrategy, HeartbeatJob, JobOutcome, QueryLayerStrategy, ReminderJob, ReportJob,
    RestockJob, ScheduledJob,
};
use crm_core::port::time_provider::FixedTimeProvider;
use crm_core::port::CrmApi;
use crm_infra_system::FileLogSink;
use crm_sdk::CrmClient;
use std::sync::Arc;
use std::time::Duration;

fn clock() -> Arc<FixedTimeProvider> {
    Arc::new(FixedTimeProvider::new(now()))
}

async fn unreachable_api() -> Arc<dyn CrmApi> {
    // Nothing listens on port 1
    Arc::new(
        CrmClient::connect_with_timeout("http://127.0.0.1:1", Duration::from_secs(2))
            .await
            .unwrap(),
    )
}

#[tokio::test]
async fn test_heartbeat_appends_one_parseable_line() {
    let stack = start_stack().await;
    let path = stack.log_path("heartbeat.txt");
    let api: Arc<dyn CrmApi> = Arc::new(stack.client().await);
    let job = HeartbeatJob::new(Some(api), Arc::new(FileLogSink::new(&path)), clock());

    assert!(job.run().await.is_success());
    assert!(job.run().await.is_success());

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    let (ts, rest) = lines[0].split_once(' ').unwrap();
    assert!(NaiveDateTime::parse_from_str(ts, "%d/%m/%Y-%H:%M:%S").is_ok());
    assert_eq!(
        rest,
        "CRM is alive - query endpoint responsive: Hello World!"
    );
}

#[tokio::test]
async fn test_heartbeat_survives_dead_endpoint() {
    let stack = start_stack().await;
    let path = stack.log_path("heartbeat.txt");
    let job = HeartbeatJob::new(
        Some(unreachable_api().await),
        Arc::new(FileLogSink::new(&path)),
        clock(),
    );

    assert!(job.run().await.is_success());
    assert_eq!(
        read_lines(&path),
        vec!["10/06/2025-08:00:00 CRM is alive - query endpoint not responsive".to_string()]
    );
}

#[tokio::test]
async fn test_restock_job_logs_each_product() {
    let stack = start_stack().await;
    let path = stack.log_path("restock.txt");
    let job = RestockJob::new(
        stack.restock.clone(),
        Arc::new(FileLogSink::new(&path)),
        clock(),
    );

    let outcome = job.run().await;

    assert_eq!(
        outcome,
        JobOutcome::Completed("Successfully updated 2 low-stock products".to_string())
    );
    assert_eq!(
        read_lines(&path),
        vec![
            "2025-06-10 08:00:00 - Restocked Laptop: stock now 13".to_string(),
            "2025-06-10 08:00:00 - Restocked Mouse: stock now 19".to_string(),
            "2025-06-10 08:00:00 - Successfully updated 2 low-stock products".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_report_through_query_layer() {
    let stack = start_stack().await;
    let path = stack.log_path("report.txt");
    let job = ReportJob::new(
        Arc::new(QueryLayerStrategy::new(Arc::new(stack.client().await))),
        None,
        Arc::new(FileLogSink::new(&path)),
        clock(),
    );

    let summary = job.generate().await.unwrap();
    assert_eq!(summary.source, "query-layer");

    job.run().await;
    assert_eq!(
        read_lines(&path),
        vec!["2025-06-10 08:00:00 - Report: 2 customers, 3 orders, 10.50 revenue.".to_string()]
    );
}

#[tokio::test]
async fn test_report_falls_back_to_direct_store() {
    let stack = start_stack().await;
    let path = stack.log_path("report.txt");
    let job = ReportJob::new(
        Arc::new(QueryLayerStrategy::new(unreachable_api().await)),
        Some(Arc::new(DirectStoreStrategy::new(
            stack.customers.clone(),
            stack.orders.clone(),
        ))),
        Arc::new(FileLogSink::new(&path)),
        clock(),
    );

    let summary = job.generate().await.unwrap();
    assert_eq!(summary.source, "direct-store");

    assert!(job.run().await.is_success());
    assert_eq!(
        read_lines(&path),
        vec!["2025-06-10 08:00:00 - Report: 2 customers, 3 orders, 10.50 revenue.".to_string()]
    );
}

#[tokio::test]
async fn test_report_error_line_when_everything_fails() {
    let stack = start_stack().await;
    let path = stack.log_path("report.txt");
    let job = ReportJob::new(
        Arc::new(QueryLayerStrategy::new(unreachable_api().await)),
        None,
        Arc::new(FileLogSink::new(&path)),
        clock(),
    );

    assert!(!job.run().await.is_success());

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("2025-06-10 08:00:00 - ERROR: Error generating CRM report:"));
}

#[tokio::test]
async fn test_reminders_cover_the_last_seven_days() {
    let stack = start_stack().await;
    let path = stack.log_path("reminders.txt");
    let job = ReminderJob::new(
        Arc::new(stack.client().await),
        Arc::new(FileLogSink::new(&path)),
        clock(),
        7,
    );

    let run = job.process().await.unwrap();

    assert_eq!(run.found, 2);
    assert_eq!(run.logged, 2);
    assert!(run.skipped.is_empty());
    assert_eq!(
        read_lines(&path),
        vec![
            "[2025-06-10 08:00:00] Order ID: 2, Customer Email: bob@example.com".to_string(),
            "[2025-06-10 08:00:00] Order ID: 1, Customer Email: alice@example.com".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_reminders_fail_when_query_fails() {
    let stack = start_stack().await;
    let path = stack.log_path("reminders.txt");
    let job = ReminderJob::new(
        unreachable_api().await,
        Arc::new(FileLogSink::new(&path)),
        clock(),
        7,
    );

    let outcome = job.run().await;

    assert!(!outcome.is_success());
    assert!(outcome.message().starts_with("Error querying orders:"));
    assert!(read_lines(&path).is_empty());
}

#[tokio::test]
async fn test_log_files_are_appended_not_truncated() {
    let stack = start_stack().await;
    let path = stack.log_path("nested/dir/heartbeat.txt");
    let sink = Arc::new(FileLogSink::new(&path));

    for _ in 0..3 {
        HeartbeatJob::new(None, sink.clone(), clock()).run().await;
    }

    assert_eq!(
        read_lines(&path),
        vec!["10/06/2025-08:00:00 CRM is alive".to_string(); 3]
    );
}
