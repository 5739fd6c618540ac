//! Unanswered-thread detection, auto-reply dispatch, and marker labeling

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::MailClient;
use crate::error::Result;
use crate::labels::LabelStore;
use crate::models::ThreadSummary;

/// Reply settings for one responder instance
#[derive(Debug, Clone)]
pub struct ReplySettings {
    /// Marker label attached to every auto-replied thread
    pub label_name: String,
    /// Canned body sent into unanswered threads
    pub body: String,
    /// Log what would happen without sending or labeling
    pub dry_run: bool,
}

/// Summary of one polling tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub threads_seen: usize,
    pub answered: usize,
    pub replies_sent: usize,
    pub labels_applied: usize,
    pub would_reply: usize,
    pub skipped: usize,
    pub failures: usize,
}

impl TickReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            threads_seen: 0,
            answered: 0,
            replies_sent: 0,
            labels_applied: 0,
            would_reply: 0,
            skipped: 0,
            failures: 0,
        }
    }
}

/// The auto-reply workflow
///
/// Invoked once per timer tick. Thread iteration is strictly sequential and
/// each thread's check/reply/label sequence is fully awaited before the next
/// thread is touched. A failure inside one thread's processing is logged with
/// the thread id and the tick moves on; it never aborts the batch.
pub struct Responder {
    client: Box<dyn MailClient>,
    labels: LabelStore,
    settings: ReplySettings,
    owner: Option<String>,
}

impl Responder {
    pub fn new(client: Box<dyn MailClient>, settings: ReplySettings) -> Self {
        Self {
            client,
            labels: LabelStore::new(),
            settings,
            owner: None,
        }
    }

    /// Resolve and cache the authenticated account's address
    async fn owner(&mut self) -> Result<String> {
        if let Some(owner) = &self.owner {
            return Ok(owner.clone());
        }
        let owner = self.client.owner_address().await?;
        info!("Responding on behalf of {}", owner);
        self.owner = Some(owner.clone());
        Ok(owner)
    }

    /// Run one polling tick over the inbox
    pub async fn run_once(&mut self) -> Result<TickReport> {
        let mut report = TickReport::new();

        let owner = self.owner().await?;
        let threads = self.client.list_inbox_threads().await?;
        report.threads_seen = threads.len();

        if threads.is_empty() {
            debug!("Inbox has no threads, nothing to do");
            return Ok(report);
        }

        for thread in &threads {
            if let Err(e) = self.process_thread(thread, &owner, &mut report).await {
                // Uniform per-thread boundary: log and continue
                report.failures += 1;
                if e.is_transient() {
                    warn!("Thread {}: transient failure, will retry next tick: {}", thread.id, e);
                } else {
                    warn!("Thread {}: failed: {}", thread.id, e);
                }
            }
        }

        info!(
            "Tick complete: {} threads, {} answered, {} replied, {} failed",
            report.threads_seen, report.answered, report.replies_sent, report.failures
        );
        Ok(report)
    }

    /// Check one thread and reply/label it if the owner has not answered
    ///
    /// A thread is ANSWERED iff at least one of its messages was sent by the
    /// owner. There is no memory across ticks: a thread still unanswered on
    /// the next tick receives another reply.
    ///
    /// Counters are bumped as each step lands, so a reply that went out stays
    /// counted even when the label step after it fails.
    async fn process_thread(
        &mut self,
        thread: &ThreadSummary,
        owner: &str,
        report: &mut TickReport,
    ) -> Result<()> {
        let messages = self.client.list_thread_messages(&thread.id).await?;

        if messages.iter().any(|m| m.is_from(owner)) {
            debug!("Thread {} already answered by {}", thread.id, owner);
            report.answered += 1;
            return Ok(());
        }

        // Reply to whoever spoke last; a thread with no addressable sender
        // cannot be replied to
        let last = match messages.iter().rev().find(|m| !m.sender_email.is_empty()) {
            Some(msg) => msg,
            None => {
                warn!("Thread {} has no addressable sender, skipping", thread.id);
                report.skipped += 1;
                return Ok(());
            }
        };

        let subject = reply_subject(&last.subject);

        if self.settings.dry_run {
            info!(
                "[dry run] Would reply to {} in thread {} and apply label '{}'",
                last.sender_email, thread.id, self.settings.label_name
            );
            report.would_reply += 1;
            return Ok(());
        }

        // Strict ordering: check, then reply, then label. If the send fails
        // the error propagates to the per-thread boundary and the label step
        // never runs.
        let message_id = self
            .client
            .send_reply(&thread.id, &last.sender_email, &subject, &self.settings.body)
            .await?;
        report.replies_sent += 1;
        info!(
            "Sent auto-reply {} to {} in thread {}",
            message_id, last.sender_email, thread.id
        );

        let label_name = self.settings.label_name.clone();
        let label_id = self
            .labels
            .ensure_label(self.client.as_ref(), &label_name)
            .await?;
        self.client.add_thread_label(&thread.id, &label_id).await?;
        report.labels_applied += 1;
        debug!("Applied label '{}' to thread {}", label_name, thread.id);

        Ok(())
    }
}

/// Build a reply subject, avoiding "Re: Re:" stacking
fn reply_subject(original: &str) -> String {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        "Re: your message".to_string()
    } else if trimmed.to_lowercase().starts_with("re:") {
        trimmed.to_string()
    } else {
        format!("Re: {}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_subject_prefixes() {
        assert_eq!(reply_subject("Project update"), "Re: Project update");
    }

    #[test]
    fn test_reply_subject_keeps_existing_re() {
        assert_eq!(reply_subject("Re: Project update"), "Re: Project update");
        assert_eq!(reply_subject("RE: Project update"), "RE: Project update");
    }

    #[test]
    fn test_reply_subject_empty() {
        assert_eq!(reply_subject(""), "Re: your message");
        assert_eq!(reply_subject("   "), "Re: your message");
    }
}
