use serde::{Deserialize, Serialize};

/// A conversation grouping as returned by a thread listing
///
/// Only the id is load-bearing; the snippet is carried for log readability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: String,
    pub snippet: String,
}

/// Header-level view of a single message within a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub thread_id: String,
    pub sender_email: String,
    pub sender_name: String,
    pub subject: String,
}

impl MessageSummary {
    /// Check whether this message was authored by the given account
    ///
    /// Comparison is on the addr-spec only, case-insensitive, so
    /// `"Jane <JANE@example.com>"` matches an owner of `jane@example.com`.
    pub fn is_from(&self, owner_address: &str) -> bool {
        !self.sender_email.is_empty()
            && self.sender_email.eq_ignore_ascii_case(owner_address.trim())
    }
}

/// Parse an email header in "Name <email@example.com>" format
///
/// Returns (display name, addr-spec) when the angle-bracket form is present,
/// None for a bare address or malformed brackets. The closing bracket is
/// searched only after the opening one: a quoted display name may itself
/// contain '>' and the header comes straight from an external sender.
pub fn parse_email_header(header: &str) -> Option<(String, String)> {
    let start = header.find('<')?;
    let end = start + header[start..].find('>')?;
    let name = header[..start].trim().trim_matches('"').to_string();
    let email = header[start + 1..end].trim().to_string();
    Some((name, email))
}

/// Extract the bare addr-spec from a From header value
pub fn sender_address(header: &str) -> String {
    match parse_email_header(header) {
        Some((_, email)) => email,
        None => header.trim().to_string(),
    }
}
