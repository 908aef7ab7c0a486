use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time truncated to microseconds (PostgreSQL `TIMESTAMPTZ` precision)
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
