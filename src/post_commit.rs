//! # Post-Commit Tasks
//!
//! The provisioning flows return their side effects as an explicit task
//! list alongside the primary result. The caller hands that list to the
//! executor after the transaction commits; each task runs in its own error
//! boundary so a failing notification can never affect the audit entry next
//! to it, and no failure ever reaches the API response.

use metrics::counter;
use sea_orm::DatabaseConnection;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::TenantViewCache;
use crate::notify::{AssignmentNotice, Notifier, WelcomeNotice};
use crate::repositories::AuditLogRepository;

/// A deferred side effect of a committed provisioning mutation.
#[derive(Debug, Clone)]
pub enum PostCommitTask {
    /// Append an audit log entry
    Audit {
        tenant_id: Uuid,
        action: String,
        entity_type: String,
        entity_id: Uuid,
        changes: JsonValue,
    },
    /// Notify about a provisioning assignment
    NotifyAssignment(AssignmentNotice),
    /// Welcome a freshly imported employee
    NotifyWelcome(WelcomeNotice),
    /// Drop cached tenant views whose keys match the given prefixes
    InvalidateViews {
        tenant_id: Uuid,
        prefixes: Vec<&'static str>,
    },
}

/// Executes post-commit task lists in the background.
#[derive(Clone)]
pub struct PostCommitExecutor {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    views: Arc<TenantViewCache>,
}

impl PostCommitExecutor {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn Notifier>,
        views: Arc<TenantViewCache>,
    ) -> Self {
        Self {
            db,
            notifier,
            views,
        }
    }

    /// Fire-and-forget: run the task list on a background task. The request
    /// that produced the tasks does not wait for them.
    pub fn spawn(&self, tasks: Vec<PostCommitTask>) {
        if tasks.is_empty() {
            return;
        }

        let executor = self.clone();
        tokio::spawn(async move {
            executor.run_all(tasks).await;
        });
    }

    /// Run every task, logging and counting failures without propagating.
    pub async fn run_all(&self, tasks: Vec<PostCommitTask>) {
        for task in tasks {
            let label = task.label();
            if let Err(err) = self.run_one(task).await {
                counter!("post_commit_task_failures_total", "task" => label).increment(1);
                tracing::warn!(task = label, error = ?err, "Post-commit task failed");
            } else {
                counter!("post_commit_tasks_total", "task" => label).increment(1);
            }
        }
    }

    async fn run_one(&self, task: PostCommitTask) -> anyhow::Result<()> {
        match task {
            PostCommitTask::Audit {
                tenant_id,
                action,
                entity_type,
                entity_id,
                changes,
            } => {
                AuditLogRepository::new(&self.db)
                    .append(tenant_id, &action, &entity_type, entity_id, Some(changes))
                    .await
                    .map_err(|err| anyhow::anyhow!("audit append failed: {}", err.message))?;
                Ok(())
            }
            PostCommitTask::NotifyAssignment(notice) => self.notifier.assignment(&notice).await,
            PostCommitTask::NotifyWelcome(notice) => self.notifier.welcome(&notice).await,
            PostCommitTask::InvalidateViews {
                tenant_id,
                prefixes,
            } => {
                self.views.invalidate(tenant_id, &prefixes);
                Ok(())
            }
        }
    }
}

impl PostCommitTask {
    fn label(&self) -> &'static str {
        match self {
            PostCommitTask::Audit { .. } => "audit",
            PostCommitTask::NotifyAssignment(_) => "notify_assignment",
            PostCommitTask::NotifyWelcome(_) => "notify_welcome",
            PostCommitTask::InvalidateViews { .. } => "invalidate_views",
        }
    }
}
