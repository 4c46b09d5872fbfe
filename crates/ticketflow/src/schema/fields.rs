//! Well-known column names in the unified dataset.

pub const TICKET_ID: &str = "ticket_id";
pub const AGENT_ID: &str = "agent_id";
pub const STATUS: &str = "status";
pub const CREATED_AT: &str = "created_at";
pub const RESOLVED_AT: &str = "resolved_at";
pub const FIRST_RESPONSE_AT: &str = "first_response_at";

/// Free-text or nested sentiment label from the ticket log.
pub const SENTIMENT: &str = "sentiment";
pub const SENTIMENT_LABEL: &str = "sentiment_label";
pub const SENTIMENT_SCORE: &str = "sentiment_score";

// Derived by the cleaner
pub const RESPONSE_TIME_MINUTES: &str = "response_time_minutes";
pub const QUALITY_FLAGS: &str = "quality_flags";

// Gold table columns
pub const TICKETS_COUNT: &str = "tickets_count";
pub const AVG_RESPONSE_TIME_MINUTES: &str = "avg_response_time_minutes";
