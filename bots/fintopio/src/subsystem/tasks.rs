use super::{Subsystem, SubsystemContext, SubsystemReport};
use crate::api::models::{TaskItem, TaskStatus};
use crate::config::FintopioConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::success;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Start,
    Claim,
    Skip,
    Verifying,
    Excluded,
}

pub fn classify(task: &TaskItem, config: &FintopioConfig) -> TaskAction {
    if config.is_excluded_task(&task.slug) {
        return TaskAction::Excluded;
    }
    match task.status() {
        TaskStatus::Available => TaskAction::Start,
        TaskStatus::Verified => TaskAction::Claim,
        TaskStatus::InProgress => TaskAction::Skip,
        TaskStatus::Other(_) => TaskAction::Verifying,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub started: usize,
    pub claimed: usize,
    pub verifying: usize,
    pub skipped: usize,
    pub excluded: usize,
    pub failed: usize,
}

impl std::fmt::Display for TaskCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "started {} | claimed {} | verifying {} | skipped {} | excluded {} | failed {}",
            self.started, self.claimed, self.verifying, self.skipped, self.excluded, self.failed
        )
    }
}

pub struct TaskHandler;

impl TaskHandler {
    async fn handle(&self, ctx: &SubsystemContext, task: &TaskItem, counts: &mut TaskCounts) {
        let id = task.id.to_string();
        match classify(task, &ctx.config) {
            TaskAction::Excluded => {
                debug!("Skipping excluded task {}", task.slug);
                counts.excluded += 1;
            }
            TaskAction::Start => match ctx.api.start_task(&id).await {
                Ok(_) => {
                    info!("Starting task {}", task.slug);
                    counts.started += 1;
                }
                Err(e) => {
                    error!("Error starting task {}: {}", task.slug, e);
                    counts.failed += 1;
                }
            },
            TaskAction::Claim => match ctx.api.claim_task(&id).await {
                Ok(_) => {
                    let reward = task
                        .reward_amount
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "0".to_string());
                    success!("Task {} complete, reward {} diamonds!", task.slug, reward);
                    counts.claimed += 1;
                }
                Err(e) => {
                    error!("Error claiming task {}: {}", task.slug, e);
                    counts.failed += 1;
                }
            },
            TaskAction::Skip => counts.skipped += 1,
            TaskAction::Verifying => {
                info!("Verifying task {}!", task.slug);
                counts.verifying += 1;
            }
        }
    }
}

#[async_trait]
impl Subsystem<SubsystemContext> for TaskHandler {
    async fn run(&self, ctx: &SubsystemContext) -> Result<SubsystemReport> {
        let list = ctx
            .api
            .tasks()
            .await
            .context("Error fetching tasks")?;

        let mut counts = TaskCounts::default();
        for item in list.items() {
            match item {
                Ok(task) => self.handle(ctx, &task, &mut counts).await,
                Err(e) => {
                    warn!("Skipping malformed task entry: {}", e);
                    counts.failed += 1;
                }
            }
        }

        debug!("Tasks: {}", counts);
        Ok(SubsystemReport::new(counts.to_string()))
    }

    fn name(&self) -> &str {
        "tasks"
    }
}
