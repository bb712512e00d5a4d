//! Notification dispatch
//!
//! Provides the notifier abstraction used by the provisioning flows. All
//! notifications are best-effort: they run after the primary database
//! mutation has committed and their failures are logged, never propagated.

use async_trait::async_trait;

/// Parameters for an assignment notification, sent to an employee (and,
/// separately, their new manager) after provisioning.
#[derive(Debug, Clone)]
pub struct AssignmentNotice {
    /// Recipient email address
    pub recipient: String,
    /// Display name of the provisioned employee
    pub employee_name: String,
    /// Role slug of the provisioned employee
    pub role: String,
    pub job_title: String,
    pub department: String,
    /// Organization (tenant) display name
    pub organization: String,
    /// Display name of the newly assigned manager, when one was set
    pub manager_name: Option<String>,
}

/// Parameters for a welcome notification sent after a bulk import row
/// persists.
#[derive(Debug, Clone)]
pub struct WelcomeNotice {
    pub recipient: String,
    pub display_name: String,
    pub organization: String,
}

/// Trait for notification delivery implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify an employee (or manager) about a provisioning assignment
    async fn assignment(&self, notice: &AssignmentNotice) -> anyhow::Result<()>;

    /// Send a welcome notification to a freshly imported employee
    async fn welcome(&self, notice: &WelcomeNotice) -> anyhow::Result<()>;
}

/// Default notifier that records dispatches in the structured log. Stands in
/// for the mail gateway in local and test profiles.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn assignment(&self, notice: &AssignmentNotice) -> anyhow::Result<()> {
        tracing::info!(
            recipient = %notice.recipient,
            employee = %notice.employee_name,
            role = %notice.role,
            job_title = %notice.job_title,
            department = %notice.department,
            organization = %notice.organization,
            manager = notice.manager_name.as_deref().unwrap_or("-"),
            "Assignment notification dispatched"
        );
        Ok(())
    }

    async fn welcome(&self, notice: &WelcomeNotice) -> anyhow::Result<()> {
        tracing::info!(
            recipient = %notice.recipient,
            display_name = %notice.display_name,
            organization = %notice.organization,
            "Welcome notification dispatched"
        );
        Ok(())
    }
}
