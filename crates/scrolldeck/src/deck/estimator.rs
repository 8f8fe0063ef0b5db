use num_format::{Locale, ToFormattedString};

pub const MIN_USERS: u32 = 10;
pub const MAX_USERS: u32 = 1000;
pub const USERS_STEP: u32 = 10;
pub const DEFAULT_USERS: u32 = 100;
/// Monthly price per member company.
pub const UNIT_PRICE: u64 = 30;

/// The member-count input behind the revenue widget. Always within
/// `[MIN_USERS, MAX_USERS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimator {
    users: u32,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS,
        }
    }
}

impl Estimator {
    pub fn users(&self) -> u32 {
        self.users
    }

    pub fn monthly(&self) -> u64 {
        self.users as u64 * UNIT_PRICE
    }

    /// Set from the range control. Returns whether the value changed.
    pub fn set_users(&mut self, users: i64) -> bool {
        let clamped = users.clamp(MIN_USERS as i64, MAX_USERS as i64) as u32;
        let changed = clamped != self.users;
        self.users = clamped;
        changed
    }

    pub fn increment(&mut self) -> bool {
        self.set_users(self.users as i64 + USERS_STEP as i64)
    }

    pub fn decrement(&mut self) -> bool {
        self.set_users(self.users as i64 - USERS_STEP as i64)
    }
}

pub fn yearly(monthly: u64) -> u64 {
    monthly * 12
}

/// Group digits in threes: `36000` -> `36,000`.
pub fn format_thousands(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_monthly() {
        let est = Estimator::default();
        assert_eq!(est.users(), 100);
        assert_eq!(est.monthly(), 3000);
        assert_eq!(yearly(est.monthly()), 36000);
    }

    #[test]
    fn test_increment_saturates_at_max() {
        let mut est = Estimator::default();
        est.set_users(1000);
        assert!(!est.increment());
        assert_eq!(est.users(), 1000);
    }

    #[test]
    fn test_decrement_saturates_at_min() {
        let mut est = Estimator::default();
        est.set_users(15);
        assert!(est.decrement());
        assert_eq!(est.users(), 10);
        assert!(!est.decrement());
        assert_eq!(est.users(), 10);
    }

    #[test]
    fn test_steps_stay_in_bounds() {
        let mut est = Estimator::default();
        for i in 0..300 {
            let before = est.users();
            if i % 7 < 4 {
                est.increment();
                assert_eq!(est.users(), (before + USERS_STEP).min(MAX_USERS));
            } else {
                est.decrement();
                assert_eq!(est.users(), before.saturating_sub(USERS_STEP).max(MIN_USERS));
            }
            assert!((MIN_USERS..=MAX_USERS).contains(&est.users()));
        }
    }

    #[test]
    fn test_range_input_clamped() {
        let mut est = Estimator::default();
        est.set_users(-5);
        assert_eq!(est.users(), MIN_USERS);
        est.set_users(50_000);
        assert_eq!(est.users(), MAX_USERS);
        est.set_users(437);
        assert_eq!(est.users(), 437);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(300), "300");
        assert_eq!(format_thousands(3000), "3,000");
        assert_eq!(format_thousands(36000), "36,000");
        assert_eq!(format_thousands(360000), "360,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }
}
