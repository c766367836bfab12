use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunReport> {
        let name = self.pipeline.name();
        let started_at = Utc::now();
        tracing::info!("🚀 Starting {}", name);
        self.monitor.log_stats("Start");

        let plan = self.pipeline.prepare().await?;
        self.monitor.log_stats("Prepared");

        let mut report = self.pipeline.execute(plan).await?;
        self.monitor.log_stats("Executed");

        let finished_at = Utc::now();
        report.finished_at = Some(finished_at);
        tracing::info!(
            "✅ {} finished in {}ms: {} collections, {}/{} records succeeded",
            name,
            (finished_at - started_at).num_milliseconds(),
            report.collections.len(),
            report.total_succeeded(),
            report.total_records()
        );
        self.monitor.log_final_stats();

        Ok(report)
    }
}
