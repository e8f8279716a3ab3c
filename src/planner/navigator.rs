use crate::planner::day_key::{
    WeekendKey, anchor_saturday, saturday_on_or_after, saturday_on_or_before,
    within_planning_window,
};
use crate::planner::ranges::{DateRange, RangeRegistry};
use chrono::{Duration, NaiveDate};

const WEEK_DAYS: i64 = 7;

pub struct WeekendNavigator<'a> {
    registry: &'a RangeRegistry,
}

impl<'a> WeekendNavigator<'a> {
    pub fn new(registry: &'a RangeRegistry) -> Self {
        Self { registry }
    }

    pub fn configuration_for(&self, date: NaiveDate) -> DateRange {
        self.registry
            .resolve(&WeekendKey::of(date))
            .unwrap_or_else(|| DateRange::weekend(anchor_saturday(date)))
    }

    pub fn upcoming(&self, today: NaiveDate) -> DateRange {
        self.configuration_for(saturday_on_or_after(today))
    }

    pub fn previous(&self, current: Option<&DateRange>) -> Option<DateRange> {
        let current = current?;
        let reference = saturday_on_or_before(current.start() - Duration::days(1));
        Some(self.step(current, reference, -WEEK_DAYS)).filter(plannable)
    }

    pub fn next(&self, current: Option<&DateRange>) -> Option<DateRange> {
        let current = current?;
        let reference = saturday_on_or_after(current.end() + Duration::days(1));
        Some(self.step(current, reference, WEEK_DAYS)).filter(plannable)
    }

    // A stored multi-weekend span can resolve back to the current range; skip
    // one more week in that case or navigation never leaves the span.
    fn step(&self, current: &DateRange, reference: NaiveDate, skip_days: i64) -> DateRange {
        match self.registry.resolve(&WeekendKey::of(reference)) {
            Some(saved) if saved != *current => saved,
            Some(_) => self.configuration_for(reference + Duration::days(skip_days)),
            None => self.configuration_for(reference),
        }
    }
}

fn plannable(range: &DateRange) -> bool {
    within_planning_window(range.start()) && within_planning_window(range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).expect("ordered range")
    }

    #[test]
    fn configuration_defaults_to_saturday_and_sunday() {
        let registry = RangeRegistry::default();
        let navigator = WeekendNavigator::new(&registry);

        assert_eq!(
            navigator.configuration_for(date(2024, 6, 5)),
            range(date(2024, 6, 8), date(2024, 6, 9))
        );
        assert_eq!(
            navigator.configuration_for(date(2024, 6, 2)),
            range(date(2024, 6, 1), date(2024, 6, 2))
        );
    }

    #[test]
    fn configuration_prefers_stored_range() {
        let long = range(date(2024, 6, 1), date(2024, 6, 3));
        let registry = RangeRegistry::default().define_range(long);
        let navigator = WeekendNavigator::new(&registry);

        assert_eq!(navigator.configuration_for(date(2024, 6, 2)), long);
    }

    #[test]
    fn upcoming_from_sunday_looks_ahead() {
        let registry = RangeRegistry::default();
        let navigator = WeekendNavigator::new(&registry);

        assert_eq!(
            navigator.upcoming(date(2024, 6, 2)),
            range(date(2024, 6, 8), date(2024, 6, 9))
        );
        assert_eq!(
            navigator.upcoming(date(2024, 6, 1)),
            range(date(2024, 6, 1), date(2024, 6, 2))
        );
    }

    #[test]
    fn next_stops_at_the_end_of_the_calendar() {
        let registry = RangeRegistry::default();
        let navigator = WeekendNavigator::new(&registry);
        let last = NaiveDate::MAX
            .checked_sub_days(Days::new(29))
            .expect("representable");
        let edge = range(last, last);

        assert_eq!(navigator.next(Some(&edge)), None);
        assert!(navigator.previous(Some(&edge)).is_some());
    }

    #[test]
    fn navigation_without_selection_is_a_no_op() {
        let registry = RangeRegistry::default();
        let navigator = WeekendNavigator::new(&registry);

        assert_eq!(navigator.previous(None), None);
        assert_eq!(navigator.next(None), None);
    }

    #[test]
    fn previous_then_next_round_trips_default_weekends() {
        let registry = RangeRegistry::default();
        let navigator = WeekendNavigator::new(&registry);
        let current = range(date(2024, 6, 8), date(2024, 6, 9));

        let previous = navigator.previous(Some(&current)).expect("previous");
        assert_eq!(previous, range(date(2024, 6, 1), date(2024, 6, 2)));
        assert_eq!(navigator.next(Some(&previous)), Some(current));
    }

    #[test]
    fn next_lands_on_stored_long_weekend() {
        let long = range(date(2024, 6, 7), date(2024, 6, 10));
        let registry = RangeRegistry::default().define_range(long);
        let navigator = WeekendNavigator::new(&registry);

        let current = range(date(2024, 6, 1), date(2024, 6, 2));
        assert_eq!(navigator.next(Some(&current)), Some(long));
        assert_eq!(navigator.previous(Some(&long)), Some(current));
    }

    #[test]
    fn skips_past_multi_weekend_span_in_both_directions() {
        // Sunday Jun 2 through Saturday Jun 15 spans the Saturdays of Jun 1, 8 and 15.
        let span = range(date(2024, 6, 2), date(2024, 6, 15));
        let registry = RangeRegistry::default().define_range(span);
        let navigator = WeekendNavigator::new(&registry);

        let previous = navigator.previous(Some(&span)).expect("previous");
        assert_ne!(previous, span);
        assert_eq!(previous, range(date(2024, 5, 25), date(2024, 5, 26)));

        let next = navigator.next(Some(&span)).expect("next");
        assert_ne!(next, span);
        assert_eq!(next, range(date(2024, 6, 22), date(2024, 6, 23)));
    }

    #[test]
    fn weekday_range_indexed_behind_itself_does_not_trap_previous() {
        let midweek = range(date(2024, 6, 4), date(2024, 6, 5));
        let registry = RangeRegistry::default().define_range(midweek);
        let navigator = WeekendNavigator::new(&registry);

        assert_eq!(
            navigator.previous(Some(&midweek)),
            Some(range(date(2024, 5, 25), date(2024, 5, 26)))
        );
    }

    #[test]
    fn round_trip_is_asymmetric_when_previous_span_covers_origin() {
        // The span Jun 1-9 is stored under Jun 1 and Jun 8. From Jun 15 the
        // round trip holds, but from Jun 8-9 going back lands on the span
        // that covers it and going forward leaves the span entirely.
        let span = range(date(2024, 6, 1), date(2024, 6, 9));
        let registry = RangeRegistry::default().define_range(span);
        let navigator = WeekendNavigator::new(&registry);
        let origin = range(date(2024, 6, 15), date(2024, 6, 16));

        let previous = navigator.previous(Some(&origin)).expect("previous");
        assert_eq!(previous, span);
        assert_eq!(navigator.next(Some(&previous)), Some(origin));

        let inside = range(date(2024, 6, 8), date(2024, 6, 9));
        let back = navigator.previous(Some(&inside)).expect("previous");
        assert_eq!(back, span);
        assert_ne!(navigator.next(Some(&back)), Some(inside));
    }
}
