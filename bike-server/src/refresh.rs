//! Refresh scheduling for station data.
//!
//! Every page view is a "tick". A tick asks [`RefreshState::should_refresh`]
//! whether the session's data is stale; a `true` answer stamps the clock
//! immediately, before the fetch runs. A failed fetch therefore waits a full
//! interval before the next attempt, giving a steady polling cadence rather
//! than retrying on every tick.

use chrono::{DateTime, TimeDelta, Utc};

/// How long fetched data is considered fresh.
pub const REFRESH_INTERVAL: TimeDelta = TimeDelta::minutes(5);

/// Per-session refresh bookkeeping.
#[derive(Debug, Clone)]
pub struct RefreshState {
    last_fetch_time: Option<DateTime<Utc>>,
    refresh_interval: TimeDelta,
}

impl RefreshState {
    /// A state that has never fetched, so the first tick refreshes.
    pub fn new() -> Self {
        Self {
            last_fetch_time: None,
            refresh_interval: REFRESH_INTERVAL,
        }
    }

    /// Check staleness at `now`, stamping the clock when stale.
    ///
    /// Returns `true` on the first call and whenever at least one refresh
    /// interval has elapsed since the last stamp. Returns `false` without
    /// side effects otherwise.
    pub fn should_refresh(&mut self, now: DateTime<Utc>) -> bool {
        let stale = match self.last_fetch_time {
            None => true,
            Some(last) => now - last >= self.refresh_interval,
        };

        if stale {
            self.last_fetch_time = Some(now);
        }
        stale
    }

    /// [`should_refresh`](Self::should_refresh) against the wall clock.
    pub fn should_refresh_now(&mut self) -> bool {
        self.should_refresh(Utc::now())
    }

    /// When the clock was last stamped, for display.
    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.last_fetch_time
    }

    pub fn refresh_interval(&self) -> TimeDelta {
        self.refresh_interval
    }

    /// When the next tick will refresh, if a fetch has happened.
    pub fn next_refresh_time(&self) -> Option<DateTime<Utc>> {
        self.last_fetch_time.map(|t| t + self.refresh_interval)
    }
}

impl Default for RefreshState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_tick_refreshes_and_stamps() {
        let mut state = RefreshState::new();
        assert_eq!(state.last_fetch_time(), None);

        assert!(state.should_refresh(t0()));
        assert_eq!(state.last_fetch_time(), Some(t0()));
    }

    #[test]
    fn first_tick_against_wall_clock() {
        let mut state = RefreshState::new();
        let before = Utc::now();
        assert!(state.should_refresh_now());
        let stamped = state.last_fetch_time().unwrap();
        assert!(stamped >= before && stamped <= Utc::now());
    }

    #[test]
    fn fresh_within_interval() {
        let mut state = RefreshState::new();
        assert!(state.should_refresh(t0()));

        assert!(!state.should_refresh(t0()));
        assert!(!state.should_refresh(t0() + TimeDelta::seconds(1)));
        assert!(!state.should_refresh(t0() + TimeDelta::seconds(299)));
        assert_eq!(state.last_fetch_time(), Some(t0()));
    }

    #[test]
    fn stale_at_exactly_interval() {
        let mut state = RefreshState::new();
        assert!(state.should_refresh(t0()));

        let later = t0() + REFRESH_INTERVAL;
        assert!(state.should_refresh(later));
        assert_eq!(state.last_fetch_time(), Some(later));
    }

    #[test]
    fn expiry_restamps_clock() {
        let mut state = RefreshState::new();
        assert!(state.should_refresh(t0()));

        let later = t0() + TimeDelta::minutes(12);
        assert!(state.should_refresh(later));
        assert!(!state.should_refresh(later + TimeDelta::minutes(4)));
        assert!(state.should_refresh(later + TimeDelta::minutes(5)));
    }

    #[test]
    fn clock_going_backwards_is_fresh() {
        let mut state = RefreshState::new();
        assert!(state.should_refresh(t0()));
        assert!(!state.should_refresh(t0() - TimeDelta::minutes(30)));
        assert_eq!(state.last_fetch_time(), Some(t0()));
    }

    #[test]
    fn next_refresh_time() {
        let mut state = RefreshState::default();
        assert_eq!(state.next_refresh_time(), None);
        state.should_refresh(t0());
        assert_eq!(state.next_refresh_time(), Some(t0() + TimeDelta::minutes(5)));
        assert_eq!(state.refresh_interval(), REFRESH_INTERVAL);
    }
}
