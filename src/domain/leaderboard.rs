// Weekly top-kills ranking rules.

use serde::{Deserialize, Serialize};

/// Entries kept per week.
pub const RANKING_SIZE: usize = 10;

const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub kills: u32,
    /// Calendar day of the record, `YYYY-MM-DD` (UTC).
    pub date: String,
}

/// Ranking for one calendar week, keyed by the week's Monday 00:00 UTC.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRanking {
    pub week_start: u64,
    pub entries: Vec<RankingEntry>,
}

impl WeeklyRanking {
    pub fn new(week_start: u64) -> Self {
        Self {
            week_start,
            entries: Vec::new(),
        }
    }

    /// Returns this ranking, or a fresh one if it belongs to another week.
    pub fn for_week(self, week_start: u64) -> Self {
        if self.week_start == week_start {
            self
        } else {
            Self::new(week_start)
        }
    }

    /// Records a departing player's kills. Returns true when the ranking changed.
    ///
    /// An existing entry for the same name is only replaced by a strictly better score.
    pub fn record(&mut self, name: &str, kills: u32, date: String) -> bool {
        if kills == 0 {
            return false;
        }

        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) if kills > existing.kills => {
                existing.kills = kills;
                existing.date = date;
            }
            Some(_) => return false,
            None => {
                // Full board and not better than the last place: nothing to do.
                if self.entries.len() >= RANKING_SIZE
                    && self.entries.iter().all(|e| e.kills >= kills)
                {
                    return false;
                }
                self.entries.push(RankingEntry {
                    name: name.to_string(),
                    kills,
                    date,
                });
            }
        }

        // Stable sort keeps earlier records ahead of later ties.
        self.entries.sort_by(|a, b| b.kills.cmp(&a.kills));
        self.entries.truncate(RANKING_SIZE);
        true
    }
}

/// Monday 00:00 UTC of the week containing `epoch_seconds`.
pub fn week_start(epoch_seconds: u64) -> u64 {
    let days = epoch_seconds / SECONDS_PER_DAY;
    // 1970-01-01 was a Thursday, three days after a Monday.
    let since_monday = (days + 3) % 7;
    days.saturating_sub(since_monday) * SECONDS_PER_DAY
}

/// Formats the UTC calendar day of `epoch_seconds` as `YYYY-MM-DD`.
pub fn format_date(epoch_seconds: u64) -> String {
    let (year, month, day) = civil_from_days((epoch_seconds / SECONDS_PER_DAY) as i64);
    format!("{year:04}-{month:02}-{day:02}")
}

// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-13 12:00:00 UTC, a Wednesday.
    const WEDNESDAY_NOON: u64 = 1_710_331_200;
    // 2024-03-11 00:00:00 UTC, the Monday before.
    const MONDAY: u64 = 1_710_115_200;

    #[test]
    fn when_time_is_midweek_then_week_starts_on_monday_midnight() {
        assert_eq!(week_start(WEDNESDAY_NOON), MONDAY);
        assert_eq!(week_start(MONDAY), MONDAY);
        assert_eq!(week_start(MONDAY - 1), MONDAY - 7 * SECONDS_PER_DAY);
    }

    #[test]
    fn when_formatting_a_timestamp_then_date_is_iso_day() {
        assert_eq!(format_date(WEDNESDAY_NOON), "2024-03-13");
        assert_eq!(format_date(0), "1970-01-01");
        // Leap day.
        assert_eq!(format_date(1_709_208_000), "2024-02-29");
    }

    #[test]
    fn when_kills_are_zero_then_ranking_is_unchanged() {
        let mut ranking = WeeklyRanking::new(MONDAY);
        assert!(!ranking.record("Ana", 0, "2024-03-13".to_string()));
        assert!(ranking.entries.is_empty());
    }

    #[test]
    fn when_same_name_scores_lower_then_entry_is_kept() {
        let mut ranking = WeeklyRanking::new(MONDAY);
        ranking.record("Ana", 5, "2024-03-11".to_string());

        assert!(!ranking.record("Ana", 5, "2024-03-12".to_string()));
        assert!(!ranking.record("Ana", 3, "2024-03-12".to_string()));
        assert_eq!(ranking.entries[0].kills, 5);
        assert_eq!(ranking.entries[0].date, "2024-03-11");
    }

    #[test]
    fn when_same_name_improves_then_entry_is_replaced() {
        let mut ranking = WeeklyRanking::new(MONDAY);
        ranking.record("Ana", 5, "2024-03-11".to_string());

        assert!(ranking.record("Ana", 8, "2024-03-13".to_string()));
        assert_eq!(ranking.entries.len(), 1);
        assert_eq!(ranking.entries[0].kills, 8);
        assert_eq!(ranking.entries[0].date, "2024-03-13");
    }

    #[test]
    fn when_board_is_full_then_only_top_ten_are_kept_in_order() {
        let mut ranking = WeeklyRanking::new(MONDAY);
        for kills in 1..=12 {
            ranking.record(&format!("p{kills}"), kills, "2024-03-13".to_string());
        }

        assert_eq!(ranking.entries.len(), RANKING_SIZE);
        assert_eq!(ranking.entries[0].kills, 12);
        assert_eq!(ranking.entries[RANKING_SIZE - 1].kills, 3);
        assert!(!ranking.record("late", 2, "2024-03-13".to_string()));
    }

    #[test]
    fn when_week_changes_then_ranking_resets() {
        let mut ranking = WeeklyRanking::new(MONDAY);
        ranking.record("Ana", 5, "2024-03-13".to_string());

        let next_week = MONDAY + 7 * SECONDS_PER_DAY;
        let same = ranking.clone().for_week(MONDAY);
        let reset = ranking.for_week(next_week);

        assert_eq!(same.entries.len(), 1);
        assert!(reset.entries.is_empty());
        assert_eq!(reset.week_start, next_week);
    }
}
