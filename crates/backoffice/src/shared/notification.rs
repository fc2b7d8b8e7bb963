use chrono::{DateTime, Duration, Utc};

/// Сколько секунд живет всплывающее уведомление
pub const NOTIFICATION_TTL_SECONDS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Уведомление админ-панели с явным моментом истечения
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_kind(message.into(), NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_kind(message.into(), NotificationKind::Error)
    }

    fn with_kind(message: String, kind: NotificationKind) -> Self {
        Self {
            message,
            kind,
            expires_at: Utc::now() + Duration::seconds(NOTIFICATION_TTL_SECONDS),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
