//! Weekly completion leaderboard

use chrono::{Datelike, Duration, NaiveDateTime, Weekday};
use indexmap::IndexMap;
use serde::Serialize;
use suivi_model::date::{end_of_day, start_of_day};
use suivi_model::{CompletionEvent, Matricule, User};

/// Inclusive time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    /// Monday 00:00:00.000
    pub start: NaiveDateTime,
    /// Sunday 23:59:59.999
    pub end: NaiveDateTime,
}

impl WeekWindow {
    /// Monday-to-Sunday week containing `now`.
    ///
    /// Sunday belongs to the week that started six days earlier.
    #[must_use]
    pub fn containing(now: NaiveDateTime) -> Self {
        let today = now.date();
        let back = match today.weekday() {
            Weekday::Sun => 6,
            other => i64::from(other.num_days_from_monday()),
        };
        let monday = today - Duration::days(back);
        let sunday = monday + Duration::days(6);
        Self {
            start: start_of_day(monday),
            end: end_of_day(sunday),
        }
    }

    /// Whether `at` falls inside the window, bounds included
    #[inline]
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformerEntry {
    /// User
    pub matricule: Matricule,
    /// Family name
    pub nom: String,
    /// Given name
    pub prenom: String,
    /// Tasks completed inside the window
    pub completed: u32,
}

/// Rank known users by completions inside `[window_start, window_end]`.
///
/// Every user starts at zero in the order given, so idle users still appear
/// at the bottom. Events outside the window, without a parsable timestamp,
/// or from an unknown user are ignored. Equal counts keep user order.
#[must_use]
pub fn top_performers(
    events: &[CompletionEvent],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    users: &[User],
) -> Vec<PerformerEntry> {
    let mut board: IndexMap<&Matricule, PerformerEntry> = IndexMap::with_capacity(users.len());
    for user in users {
        board.entry(&user.matricule).or_insert_with(|| PerformerEntry {
            matricule: user.matricule.clone(),
            nom: user.nom.clone(),
            prenom: user.prenom.clone(),
            completed: 0,
        });
    }

    let window = WeekWindow {
        start: window_start,
        end: window_end,
    };
    let mut ignored = 0usize;
    for event in events {
        let Some(matricule) = event.matricule.as_ref() else {
            ignored += 1;
            continue;
        };
        let at = match event.completed_at() {
            Ok(at) => at,
            Err(e) => {
                tracing::warn!(
                    matricule = %matricule,
                    error = %e,
                    "completion event without usable timestamp"
                );
                ignored += 1;
                continue;
            }
        };
        match board.get_mut(matricule) {
            Some(entry) if window.contains(at) => entry.completed += 1,
            _ => ignored += 1,
        }
    }
    tracing::debug!(users = board.len(), ignored, "computed leaderboard");

    let mut ranked: Vec<PerformerEntry> = board.into_values().collect();
    ranked.sort_by(|a, b| b.completed.cmp(&a.completed));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap())
    }

    #[test]
    fn week_of_a_wednesday() {
        // 2024-06-12 is a Wednesday
        let w = WeekWindow::containing(at(ymd(2024, 6, 12), 15));
        assert_eq!(w.start, start_of_day(ymd(2024, 6, 10)));
        assert_eq!(w.end, end_of_day(ymd(2024, 6, 16)));
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        let w = WeekWindow::containing(at(ymd(2024, 6, 16), 20));
        assert_eq!(w.start.date(), ymd(2024, 6, 10));
        assert_eq!(w.end.date(), ymd(2024, 6, 16));
    }

    #[test]
    fn monday_starts_its_own_week() {
        let w = WeekWindow::containing(at(ymd(2024, 6, 17), 0));
        assert_eq!(w.start.date(), ymd(2024, 6, 17));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = WeekWindow::containing(at(ymd(2024, 6, 12), 15));
        assert!(w.contains(w.start));
        assert!(w.contains(w.end));
        assert!(!w.contains(w.end + Duration::milliseconds(1)));
    }

    #[test]
    fn ranks_by_count_and_keeps_idle_users() {
        let users = vec![
            User::new("A", "Durand", "Alice"),
            User::new("B", "Martin", "Bob"),
            User::new("C", "Petit", "Chloe"),
        ];
        let week = WeekWindow::containing(at(ymd(2024, 6, 12), 12));
        let events = vec![
            CompletionEvent::new("A", at(ymd(2024, 6, 10), 9)),
            CompletionEvent::new("C", at(ymd(2024, 6, 11), 9)),
            CompletionEvent::new("A", at(ymd(2024, 6, 14), 9)),
            CompletionEvent::new("A", at(ymd(2024, 6, 3), 9)),
        ];

        let ranked = top_performers(&events, week.start, week.end, &users);
        let summary: Vec<(&str, u32)> = ranked
            .iter()
            .map(|e| (e.matricule.as_str(), e.completed))
            .collect();
        assert_eq!(summary, vec![("A", 2), ("C", 1), ("B", 0)]);
    }

    #[test]
    fn ties_keep_user_order() {
        let users = vec![
            User::new("Z", "", ""),
            User::new("Y", "", ""),
            User::new("X", "", ""),
        ];
        let week = WeekWindow::containing(at(ymd(2024, 6, 12), 12));
        let events = vec![
            CompletionEvent::new("X", at(ymd(2024, 6, 12), 9)),
            CompletionEvent::new("Y", at(ymd(2024, 6, 12), 10)),
        ];
        let ranked = top_performers(&events, week.start, week.end, &users);
        let order: Vec<&str> = ranked.iter().map(|e| e.matricule.as_str()).collect();
        assert_eq!(order, vec!["Y", "X", "Z"]);
    }

    #[test]
    fn unknown_and_anonymous_events_are_ignored() {
        let users = vec![User::new("A", "", "")];
        let week = WeekWindow::containing(at(ymd(2024, 6, 12), 12));
        let mut anonymous = CompletionEvent::new("A", at(ymd(2024, 6, 12), 9));
        anonymous.matricule = None;
        let mut undated = CompletionEvent::new("A", at(ymd(2024, 6, 12), 9));
        undated.date_fin = Some("yesterday".into());
        let events = vec![
            CompletionEvent::new("GHOST", at(ymd(2024, 6, 12), 9)),
            anonymous,
            undated,
        ];
        let ranked = top_performers(&events, week.start, week.end, &users);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].completed, 0);
    }
}
