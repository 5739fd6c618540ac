//! Common test utilities and fixtures

use mockall::mock;
use vacation_responder::client::{LabelInfo, MailClient};
use vacation_responder::error::Result;
use vacation_responder::models::{MessageSummary, ThreadSummary};
use vacation_responder::responder::ReplySettings;

/// Owner address used across the workflow tests
pub const OWNER: &str = "me@example.com";

/// Create a test thread summary
pub fn thread(id: &str) -> ThreadSummary {
    ThreadSummary {
        id: id.to_string(),
        snippet: format!("snippet for {}", id),
    }
}

/// Create a test message with the given sender
pub fn message(id: &str, thread_id: &str, sender: &str, subject: &str) -> MessageSummary {
    MessageSummary {
        id: id.to_string(),
        thread_id: thread_id.to_string(),
        sender_email: sender.to_string(),
        sender_name: "Test Sender".to_string(),
        subject: subject.to_string(),
    }
}

/// Create a test LabelInfo
pub fn label(id: &str, name: &str) -> LabelInfo {
    LabelInfo {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// Default reply settings for tests
pub fn settings() -> ReplySettings {
    ReplySettings {
        label_name: "Vacation Reply".to_string(),
        body: "I am currently out of office.".to_string(),
        dry_run: false,
    }
}

// Mock implementation of MailClient for testing
mock! {
    pub MailClient {}

    #[async_trait::async_trait]
    impl MailClient for MailClient {
        async fn list_inbox_threads(&self) -> Result<Vec<ThreadSummary>>;
        async fn list_thread_messages(&self, thread_id: &str) -> Result<Vec<MessageSummary>>;
        async fn send_reply(
            &self,
            thread_id: &str,
            to: &str,
            subject: &str,
            body: &str,
        ) -> Result<String>;
        async fn list_labels(&self) -> Result<Vec<LabelInfo>>;
        async fn create_label(&self, name: &str) -> Result<LabelInfo>;
        async fn add_thread_label(&self, thread_id: &str, label_id: &str) -> Result<()>;
        async fn owner_address(&self) -> Result<String>;
    }
}
