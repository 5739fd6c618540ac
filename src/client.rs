//! Gmail API client behind the `MailClient` seam

use async_trait::async_trait;
use google_gmail1::{
    api::{Label, Message, ModifyThreadRequest},
    hyper_rustls, hyper_util, Gmail,
};
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ResponderError, Result};
use crate::models::{parse_email_header, sender_address, MessageSummary, ThreadSummary};

/// Label info returned from the Gmail API
#[derive(Debug, Clone)]
pub struct LabelInfo {
    pub id: String,
    pub name: String,
}

/// Trait defining the mail operations the responder needs
///
/// The auto-reply workflow is written against this seam so the whole
/// check/reply/label sequence can be exercised with a mock client.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// List inbox threads
    ///
    /// Deliberately fetches only the first page the API returns; a mailbox
    /// with more unanswered threads than one page catches up on later ticks.
    async fn list_inbox_threads(&self) -> Result<Vec<ThreadSummary>>;

    /// List header-level summaries of every message in a thread
    async fn list_thread_messages(&self, thread_id: &str) -> Result<Vec<MessageSummary>>;

    /// Send a reply into an existing thread, returning the sent message id
    async fn send_reply(
        &self,
        thread_id: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String>;

    /// List all labels in the account
    async fn list_labels(&self) -> Result<Vec<LabelInfo>>;

    /// Create a new label
    async fn create_label(&self, name: &str) -> Result<LabelInfo>;

    /// Add a label to a thread
    async fn add_thread_label(&self, thread_id: &str, label_id: &str) -> Result<()>;

    /// Email address of the authenticated account
    async fn owner_address(&self) -> Result<String>;
}

/// Production client over the Gmail hub
///
/// One blocking remote call per operation, no retries (deliberate: the task
/// is bounded and non-critical, and the next tick covers a failed one). Every
/// call is wrapped in a timeout so a stalled connection cannot wedge the
/// polling loop.
pub struct GmailApiClient {
    hub: Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>,
}

const API_TIMEOUT: Duration = Duration::from_secs(30);
const GMAIL_MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

impl GmailApiClient {
    pub fn new(
        hub: Gmail<
            hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
        >,
    ) -> Self {
        Self { hub }
    }

    /// Assemble the raw RFC822 payload for a threaded reply
    fn build_raw_reply(to: &str, subject: &str, body: &str) -> Vec<u8> {
        let mut content = format!("To: {}\r\n", to);
        content.push_str(&format!("Subject: {}\r\n", subject));
        content.push_str("Content-Type: text/plain; charset=UTF-8\r\n\r\n");
        content.push_str(body);
        content.into_bytes()
    }

    /// Run a Gmail API call under the standard timeout
    async fn with_timeout<T, E, F>(operation: &str, fut: F) -> Result<T>
    where
        E: Into<ResponderError>,
        F: std::future::Future<Output = std::result::Result<T, E>>,
    {
        Self::with_timeout_at(API_TIMEOUT, operation, fut).await
    }

    async fn with_timeout_at<T, E, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
    where
        E: Into<ResponderError>,
        F: std::future::Future<Output = std::result::Result<T, E>>,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                warn!("Gmail API {} call timed out after {:?}", operation, limit);
                Err(ResponderError::NetworkError(format!(
                    "{} timed out after {:?}",
                    operation, limit
                )))
            }
        }
    }
}

#[async_trait]
impl MailClient for GmailApiClient {
    async fn list_inbox_threads(&self) -> Result<Vec<ThreadSummary>> {
        debug!("Calling Gmail API to list inbox threads...");
        let (_, response) = Self::with_timeout(
            "threads_list",
            self.hub
                .users()
                .threads_list("me")
                .q("in:inbox")
                .add_scope(GMAIL_MODIFY_SCOPE)
                .doit(),
        )
        .await?;

        let threads: Vec<ThreadSummary> = response
            .threads
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| {
                t.id.map(|id| ThreadSummary {
                    id,
                    snippet: t.snippet.unwrap_or_default(),
                })
            })
            .collect();

        debug!("Listed {} inbox threads", threads.len());
        Ok(threads)
    }

    async fn list_thread_messages(&self, thread_id: &str) -> Result<Vec<MessageSummary>> {
        let (_, thread) = Self::with_timeout(
            "threads_get",
            self.hub
                .users()
                .threads_get("me", thread_id)
                .format("metadata")
                .add_metadata_headers("From")
                .add_metadata_headers("Subject")
                .add_scope(GMAIL_MODIFY_SCOPE)
                .doit(),
        )
        .await?;

        let mut summaries = Vec::new();
        for msg in thread.messages.unwrap_or_default() {
            let id = match msg.id {
                Some(id) => id,
                None => continue,
            };

            let mut from_header = String::new();
            let mut subject = String::new();
            if let Some(headers) = msg.payload.as_ref().and_then(|p| p.headers.as_ref()) {
                for header in headers {
                    if let (Some(name), Some(value)) = (&header.name, &header.value) {
                        match name.to_lowercase().as_str() {
                            "from" => from_header = value.clone(),
                            "subject" => subject = value.clone(),
                            _ => {}
                        }
                    }
                }
            }

            let (sender_name, sender_email) = match parse_email_header(&from_header) {
                Some((name, email)) => (name, email),
                None => (String::new(), sender_address(&from_header)),
            };

            summaries.push(MessageSummary {
                id,
                thread_id: thread_id.to_string(),
                sender_email,
                sender_name,
                subject,
            });
        }

        Ok(summaries)
    }

    async fn send_reply(
        &self,
        thread_id: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String> {
        let raw = Self::build_raw_reply(to, subject, body);
        let reader = Cursor::new(raw);

        // Setting threadId makes Gmail append the message to the thread
        let message = Message {
            thread_id: Some(thread_id.to_string()),
            ..Default::default()
        };

        let mime_type = "message/rfc822"
            .parse()
            .map_err(|_| ResponderError::SendError("Invalid MIME type".to_string()))?;

        let (_, sent) = Self::with_timeout(
            "messages_send",
            self.hub
                .users()
                .messages_send(message, "me")
                .add_scope(GMAIL_MODIFY_SCOPE)
                .upload(reader, mime_type),
        )
        .await?;

        sent.id
            .ok_or_else(|| ResponderError::SendError("Sent message has no ID".to_string()))
    }

    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        debug!("Calling Gmail API to list labels...");
        let (_, response) = Self::with_timeout(
            "labels_list",
            self.hub
                .users()
                .labels_list("me")
                .add_scope(GMAIL_MODIFY_SCOPE)
                .doit(),
        )
        .await?;

        let labels: Vec<LabelInfo> = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| match (label.id, label.name) {
                (Some(id), Some(name)) => Some(LabelInfo { id, name }),
                _ => None,
            })
            .collect();

        debug!("Listed {} labels", labels.len());
        Ok(labels)
    }

    async fn create_label(&self, name: &str) -> Result<LabelInfo> {
        let label = Label {
            name: Some(name.to_string()),
            message_list_visibility: Some("show".to_string()),
            label_list_visibility: Some("labelShow".to_string()),
            ..Default::default()
        };

        let (_, created) = Self::with_timeout(
            "labels_create",
            self.hub
                .users()
                .labels_create(label, "me")
                .add_scope(GMAIL_MODIFY_SCOPE)
                .doit(),
        )
        .await?;

        match (created.id, created.name) {
            (Some(id), Some(name)) => Ok(LabelInfo { id, name }),
            _ => Err(ResponderError::LabelError(
                "Created label has no ID".to_string(),
            )),
        }
    }

    async fn add_thread_label(&self, thread_id: &str, label_id: &str) -> Result<()> {
        let request = ModifyThreadRequest {
            add_label_ids: Some(vec![label_id.to_string()]),
            remove_label_ids: None,
        };

        Self::with_timeout(
            "threads_modify",
            self.hub
                .users()
                .threads_modify(request, "me", thread_id)
                .add_scope(GMAIL_MODIFY_SCOPE)
                .doit(),
        )
        .await?;

        Ok(())
    }

    async fn owner_address(&self) -> Result<String> {
        let (_, profile) = Self::with_timeout(
            "get_profile",
            self.hub
                .users()
                .get_profile("me")
                .add_scope(GMAIL_MODIFY_SCOPE)
                .doit(),
        )
        .await?;

        profile
            .email_address
            .ok_or_else(|| ResponderError::ApiError("Profile has no email address".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    #[test]
    fn test_build_raw_reply_headers() {
        let raw = GmailApiClient::build_raw_reply(
            "alice@example.com",
            "Re: Project update",
            "I am currently away.",
        );
        let text = String::from_utf8(raw).unwrap();

        assert!(text.starts_with("To: alice@example.com\r\n"));
        assert!(text.contains("Subject: Re: Project update\r\n"));
        assert!(text.contains("Content-Type: text/plain; charset=UTF-8\r\n\r\n"));
        assert!(text.ends_with("I am currently away."));
    }

    #[test]
    fn test_build_raw_reply_separates_headers_from_body() {
        let raw = GmailApiClient::build_raw_reply("a@b.c", "Hi", "Body line");
        let text = String::from_utf8(raw).unwrap();
        let parts: Vec<&str> = text.splitn(2, "\r\n\r\n").collect();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], "Body line");
    }

    #[test]
    fn test_raw_reply_is_base64url_safe() {
        // Gmail transports the raw payload base64url-encoded; make sure ours
        // round-trips
        let raw = GmailApiClient::build_raw_reply("a@b.c", "Hi", "Line one\r\nLine two");
        let encoded = URL_SAFE_NO_PAD.encode(&raw);
        let decoded = URL_SAFE_NO_PAD.decode(encoded).unwrap();
        assert_eq!(raw, decoded);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through_success() {
        let result = GmailApiClient::with_timeout("threads_get", async {
            Ok::<_, ResponderError>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through_error() {
        let result: Result<u8> = GmailApiClient::with_timeout("labels_create", async {
            Err(ResponderError::NotFound("label".to_string()))
        })
        .await;
        assert!(matches!(result, Err(ResponderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stalled_call_becomes_network_error() {
        let stalled = std::future::pending::<std::result::Result<u8, ResponderError>>();
        let result =
            GmailApiClient::with_timeout_at(Duration::from_millis(10), "messages_send", stalled)
                .await;

        match result {
            Err(ResponderError::NetworkError(msg)) => {
                assert!(msg.contains("messages_send"));
                assert!(msg.contains("timed out"));
            }
            other => panic!("expected NetworkError, got {:?}", other),
        }
    }
}
