//! Batch runner for the leave ledger jobs.
//!
//! Loads a ledger snapshot (employees, overtime, leave requests, summaries)
//! from JSON, runs the recomputation job — and the carry-over job when
//! `CARRY_OVER_FROM_YEAR` is set — then writes the corrected summaries back
//! out. Intended to run from a scheduler, not interactively.

use std::fs;
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use tracing::info;
use tracing_appender::rolling;

use hrm_leave::config::Config;
use hrm_leave::engine::LeaveEngine;
use hrm_leave::model::employee::Employee;
use hrm_leave::model::leave_request::LeaveRequest;
use hrm_leave::model::leave_summary::LeaveSummary;
use hrm_leave::model::overtime::OvertimeRequest;
use hrm_leave::store::{LeaveSummaryStore, MemoryStore};

#[derive(Deserialize)]
struct LedgerSnapshot {
    employees: Vec<Employee>,
    #[serde(default)]
    overtime_requests: Vec<OvertimeRequest>,
    #[serde(default)]
    leave_requests: Vec<LeaveRequest>,
    #[serde(default)]
    leave_summaries: Vec<LeaveSummary>,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "leave-jobs.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    info!(snapshot = %config.snapshot_path, "leave batch runner starting");

    let raw = fs::read_to_string(&config.snapshot_path)
        .with_context(|| format!("failed to read snapshot {}", config.snapshot_path))?;
    let snapshot: LedgerSnapshot =
        serde_json::from_str(&raw).context("failed to parse ledger snapshot")?;

    let store = Arc::new(MemoryStore::new());
    for employee in snapshot.employees {
        store.insert_employee(employee);
    }
    for overtime in snapshot.overtime_requests {
        store.insert_overtime_request(overtime);
    }
    for request in snapshot.leave_requests {
        store.put_request(request);
    }
    for summary in snapshot.leave_summaries {
        store.put_summary(summary);
    }

    let engine = LeaveEngine::new(store.clone(), config.policy.clone());

    let recomputation = engine.run_recomputation()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&recomputation).context("failed to encode report")?
    );

    if let Some(previous_year) = config.carry_over_from_year {
        let carry_over = engine.run_carry_over(Some(previous_year), Some(previous_year + 1))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&carry_over).context("failed to encode report")?
        );
    }

    if let Some(output_path) = &config.output_path {
        let summaries = store.list_summaries(None)?;
        fs::write(output_path, serde_json::to_string_pretty(&summaries)?)
            .with_context(|| format!("failed to write summaries to {output_path}"))?;
        info!(output = %output_path, count = summaries.len(), "corrected summaries written");
    }

    Ok(())
}
