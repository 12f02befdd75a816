//! Application constants

/// Maximum accepted request body size (64 KB); contact messages and video
/// metadata are both small JSON documents
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Sentinel subject value that marks a contact submission as an emergency
pub const EMERGENCY_SUBJECT: &str = "emergency";

/// Response-time promise quoted in the visitor acknowledgment
pub const RESPONSE_TIME_PROMISE: &str = "24 hours";

/// Crisis hotline number quoted in emergency acknowledgments
pub const CRISIS_HOTLINE: &str = "988";

/// Emergency services number quoted in emergency acknowledgments
pub const EMERGENCY_SERVICES: &str = "911";

/// Display name of the practice, used in email subjects and footers
pub const PRACTICE_NAME: &str = "Mind Mastery Psychology";
