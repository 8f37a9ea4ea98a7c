use chrono::NaiveDate;

use crate::models::Learner;

/// Result of advancing a learner's streak for one activity day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: NaiveDate,
}

/// Advance the streak for a day on which the learner had qualifying activity
/// (a quiz attempt or a completed focus session). Callers invoke this only
/// when recording such activity.
///
/// Re-invoking for a day already marked as the last activity date is a
/// no-op, so two submissions in the same day cannot double-increment.
/// A consecutive day extends the streak; any gap restarts it at 1 rather
/// than chaining from the old value. Stale streaks are not zeroed by a
/// background job; the stored value simply goes stale until the next
/// activity day corrects it.
pub fn advance(snapshot: &Learner, today: NaiveDate, had_activity_yesterday: bool) -> StreakUpdate {
    if snapshot.last_activity_date == Some(today) {
        return StreakUpdate {
            current_streak: snapshot.current_streak,
            longest_streak: snapshot.longest_streak.max(snapshot.current_streak),
            last_activity_date: today,
        };
    }

    let current_streak = if had_activity_yesterday {
        snapshot.current_streak + 1
    } else {
        1
    };

    StreakUpdate {
        current_streak,
        longest_streak: snapshot.longest_streak.max(current_streak),
        last_activity_date: today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    fn learner(current: u32, longest: u32, last: Option<NaiveDate>) -> Learner {
        let mut l = Learner::new("learner-1");
        l.current_streak = current;
        l.longest_streak = longest;
        l.last_activity_date = last;
        l
    }

    #[test]
    fn first_ever_activity_starts_at_one() {
        let update = advance(&learner(0, 0, None), day(1), false);
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 1);
    }

    #[test]
    fn consecutive_day_extends_the_streak() {
        let update = advance(&learner(1, 1, Some(day(1))), day(2), true);
        assert_eq!(update.current_streak, 2);
        assert_eq!(update.longest_streak, 2);
    }

    #[test]
    fn gap_resets_to_one_and_keeps_longest() {
        // Activity on days 1 and 2, nothing on day 3, activity again on day 4.
        let update = advance(&learner(2, 2, Some(day(2))), day(4), false);
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 2);
    }

    #[test]
    fn same_day_reinvocation_is_a_no_op() {
        let snapshot = learner(3, 5, Some(day(10)));
        let update = advance(&snapshot, day(10), true);
        assert_eq!(update.current_streak, 3);
        assert_eq!(update.longest_streak, 5);
        assert_eq!(update.last_activity_date, day(10));
    }

    #[test]
    fn longest_streak_never_falls_behind_current() {
        let update = advance(&learner(4, 4, Some(day(20))), day(21), true);
        assert_eq!(update.current_streak, 5);
        assert_eq!(update.longest_streak, 5);
    }
}
