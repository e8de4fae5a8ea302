use crate::models::Reminder;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; asking is allowed once.
    Prompt,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Scheduled,
    /// Permission missing; the user has to enable notifications manually.
    PermissionRequired,
    Failed,
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivery surface for reminder notifications.
pub trait Notifier {
    fn permission(&self) -> Permission;
    fn request_permission(&mut self) -> Permission;
    fn supports_scheduling(&self) -> bool;
    fn show(&mut self, title: &str, body: &str, at: Option<DateTime<Utc>>) -> Result<(), NotifyError>;
}

pub fn send(
    notifier: &mut impl Notifier,
    title: &str,
    body: &str,
    schedule_time: Option<DateTime<Utc>>,
) -> DispatchOutcome {
    let permission = match notifier.permission() {
        Permission::Prompt => notifier.request_permission(),
        other => other,
    };
    if permission != Permission::Granted {
        warn!("notifications are not permitted ({permission:?}); enable them to receive reminders");
        return DispatchOutcome::PermissionRequired;
    }

    let at = schedule_time.filter(|_| notifier.supports_scheduling());
    match notifier.show(title, body, at) {
        Ok(()) if at.is_some() => DispatchOutcome::Scheduled,
        Ok(()) => DispatchOutcome::Delivered,
        Err(err) => {
            error!("{err}");
            DispatchOutcome::Failed
        }
    }
}

pub fn dispatch_reminders(notifier: &mut impl Notifier, reminders: &[Reminder]) -> Vec<DispatchOutcome> {
    reminders
        .iter()
        .map(|reminder| send(notifier, &reminder.title, &reminder.body, None))
        .collect()
}

/// Writes notifications to the log. Always permitted, never schedules.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn supports_scheduling(&self) -> bool {
        false
    }

    fn show(&mut self, title: &str, body: &str, _at: Option<DateTime<Utc>>) -> Result<(), NotifyError> {
        info!(%title, %body, "notification");
        Ok(())
    }
}
