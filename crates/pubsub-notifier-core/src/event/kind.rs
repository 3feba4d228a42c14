//! Authentication/protocol log event kinds.

use std::borrow::Cow;
use std::fmt;

/// The closed set of log event kinds the host emits.
///
/// Envelopes carry the raw integer so that kinds added by newer hosts pass
/// through untouched; this enum is only used to render diagnostic labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LogEventKind {
    LoginFailed = 1,
    LoginNoUser = 2,
    NoLoginTried = 3,
    NotNegotiated = 4,
}

impl LogEventKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoginFailed => "Login failed",
            Self::LoginNoUser => "Login with non-existent user",
            Self::NoLoginTried => "No login tried",
            Self::NotNegotiated => "Algorithm negotiation failed",
        }
    }
}

impl TryFrom<i32> for LogEventKind {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::LoginFailed),
            2 => Ok(Self::LoginNoUser),
            3 => Ok(Self::NoLoginTried),
            4 => Ok(Self::NotNegotiated),
            other => Err(other),
        }
    }
}

impl fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable label for a raw log event kind.
///
/// Unknown values never fail; they render as `unknown type: N`.
pub fn log_event_label(raw: i32) -> Cow<'static, str> {
    LogEventKind::try_from(raw).map_or_else(
        |n| Cow::Owned(format!("unknown type: {n}")),
        |kind| Cow::Borrowed(kind.label()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_have_labels() {
        assert_eq!(log_event_label(1), "Login failed");
        assert_eq!(log_event_label(2), "Login with non-existent user");
        assert_eq!(log_event_label(3), "No login tried");
        assert_eq!(log_event_label(4), "Algorithm negotiation failed");
    }

    #[test]
    fn unknown_kinds_fall_back_to_labeled_number() {
        assert_eq!(log_event_label(99), "unknown type: 99");
        assert_eq!(log_event_label(0), "unknown type: 0");
        assert_eq!(log_event_label(-7), "unknown type: -7");
    }

    #[test]
    fn try_from_round_trips_discriminant() {
        for kind in [
            LogEventKind::LoginFailed,
            LogEventKind::LoginNoUser,
            LogEventKind::NoLoginTried,
            LogEventKind::NotNegotiated,
        ] {
            assert_eq!(LogEventKind::try_from(kind as i32), Ok(kind));
        }
        assert_eq!(LogEventKind::try_from(5), Err(5));
    }
}
