use chrono::{Datelike, NaiveDate};

const SHORT_MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthKey {
    pub year: i32,
    // 1-based
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn offset(self, months: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn label(self) -> String {
        format!("{} {}", SHORT_MONTHS_ES[(self.month - 1) as usize], self.year)
    }
}

/// Inclusive day count between two dates, `0` when `end` precedes `start`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u64 {
    if end < start {
        return 0;
    }
    (end - start).num_days() as u64 + 1
}

pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn offset_rolls_over_year_boundary() {
        let key = MonthKey::of(date(2024, 11, 15));
        assert_eq!(key.offset(0), MonthKey { year: 2024, month: 11 });
        assert_eq!(key.offset(1), MonthKey { year: 2024, month: 12 });
        assert_eq!(key.offset(2), MonthKey { year: 2025, month: 1 });
        assert_eq!(key.offset(26), MonthKey { year: 2027, month: 1 });
    }

    #[test]
    fn label_uses_short_spanish_month_names() {
        assert_eq!(MonthKey { year: 2025, month: 1 }.label(), "ene 2025");
        assert_eq!(MonthKey { year: 2025, month: 9 }.label(), "sept 2025");
        assert_eq!(MonthKey { year: 2026, month: 12 }.label(), "dic 2026");
    }

    #[test]
    fn inclusive_days_counts_both_boundaries() {
        assert_eq!(inclusive_days(date(2025, 3, 1), date(2025, 3, 1)), 1);
        assert_eq!(inclusive_days(date(2025, 2, 27), date(2025, 3, 1)), 3);
        assert_eq!(inclusive_days(date(2024, 2, 27), date(2024, 3, 1)), 4);
        assert_eq!(inclusive_days(date(2025, 3, 2), date(2025, 3, 1)), 0);
    }

    #[test]
    fn days_inclusive_walks_every_calendar_day() {
        let days: Vec<_> = days_inclusive(date(2024, 12, 30), date(2025, 1, 2)).collect();
        assert_eq!(
            days,
            vec![
                date(2024, 12, 30),
                date(2024, 12, 31),
                date(2025, 1, 1),
                date(2025, 1, 2),
            ]
        );
        assert_eq!(days_inclusive(date(2025, 1, 2), date(2025, 1, 1)).count(), 0);
    }
}
