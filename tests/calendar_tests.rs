use chrono::{Duration, NaiveDate, TimeZone, Utc};

use hockey_schedule_web::calendar::{
    self, StartDateError, convert_event_start_date, current_week_in_year_at, group_events_by_week,
    is_valid_year, is_valid_year_and_week, start_and_end_of_week,
};
use hockey_schedule_web::model::event::Event;

fn event(id: i64, start_date: Option<&str>, tz: Option<&str>) -> Event {
    Event {
        id,
        division_location_id: None,
        is_canceled: None,
        is_game: None,
        is_tbd: None,
        location_id: None,
        name: Some(format!("Event {}", id)),
        opponent_id: None,
        points_for_opponent: None,
        points_for_team: None,
        start_date: start_date.map(str::to_string),
        team_id: None,
        time_zone_iana_name: tz.map(str::to_string),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn year_must_have_four_digits() {
    assert!(!is_valid_year(999));
    assert!(!is_valid_year(10000));
    assert!(!is_valid_year(-2024));
    assert!(is_valid_year(1000));
    assert!(is_valid_year(9999));
    assert!(is_valid_year(2024));
}

#[test]
fn week_outside_one_to_fifty_three_is_rejected() {
    assert!(!is_valid_year_and_week(2024, 0));
    assert!(!is_valid_year_and_week(2024, 54));
    assert!(is_valid_year_and_week(2024, 1));
    assert!(is_valid_year_and_week(2024, 52));
    // a bad year fails regardless of the week
    assert!(!is_valid_year_and_week(999, 10));
}

#[test]
fn week_fifty_three_only_exists_in_long_iso_years() {
    assert!(is_valid_year_and_week(2015, 53));
    assert!(!is_valid_year_and_week(2016, 53));
    assert!(is_valid_year_and_week(2020, 53));
    assert!(!is_valid_year_and_week(2024, 53));
    assert!(is_valid_year_and_week(2026, 53));
}

#[test]
fn first_week_of_2024_runs_monday_to_sunday() {
    let window = start_and_end_of_week(2024, 1).expect("2024 week 1 is valid");

    assert_eq!(window.start, date(2024, 1, 1).and_hms_milli_opt(0, 0, 0, 0).unwrap());
    assert_eq!(window.end, date(2024, 1, 7).and_hms_milli_opt(23, 59, 59, 999).unwrap());
    assert_eq!(
        window.end - window.start,
        Duration::days(6) + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59) + Duration::milliseconds(999)
    );
}

#[test]
fn week_window_can_straddle_new_year() {
    let w53 = start_and_end_of_week(2015, 53).unwrap();
    assert_eq!(w53.start.date(), date(2015, 12, 28));
    assert_eq!(w53.end.date(), date(2016, 1, 3));

    // 2021-01-01 is a Friday that still belongs to 2020's last week
    let w1 = start_and_end_of_week(2021, 1).unwrap();
    assert_eq!(w1.start.date(), date(2021, 1, 4));
    assert_eq!(w1.end.date(), date(2021, 1, 10));
}

#[test]
fn invalid_week_has_no_window() {
    assert!(start_and_end_of_week(2016, 53).is_none());
    assert!(start_and_end_of_week(2024, 0).is_none());
    assert!(start_and_end_of_week(10000, 1).is_none());
}

#[test]
fn week_window_converts_to_utc_in_site_zone() {
    let window = start_and_end_of_week(2024, 1).unwrap();
    let (start, end) = window.to_utc(chrono_tz::America::Moncton);

    assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap());
    assert_eq!(
        end,
        Utc.with_ymd_and_hms(2024, 1, 8, 3, 59, 59).unwrap() + Duration::milliseconds(999)
    );
}

#[test]
fn current_week_ignores_requested_year() {
    let today = date(2024, 1, 10);
    assert_eq!(current_week_in_year_at(2024, today), 2);
    assert_eq!(current_week_in_year_at(2020, today), 2);
    assert_eq!(current_week_in_year_at(2030, today), 2);

    // New Year's Day 2027 falls in the 53rd week of 2026
    assert_eq!(current_week_in_year_at(2027, date(2027, 1, 1)), 53);
}

#[test]
fn start_date_without_zone_keeps_utc_fields() {
    let e = event(1, Some("2024-01-10T23:00:00Z"), None);
    let local = convert_event_start_date(&e).unwrap().unwrap();
    assert_eq!(local, date(2024, 1, 10).and_hms_opt(23, 0, 0).unwrap());
}

#[test]
fn start_date_with_zone_is_shifted() {
    let e = event(1, Some("2024-01-10T23:00:00Z"), Some("America/Moncton"));
    let local = convert_event_start_date(&e).unwrap().unwrap();
    assert_eq!(local, date(2024, 1, 10).and_hms_opt(19, 0, 0).unwrap());
}

#[test]
fn start_date_errors_are_reported() {
    assert_eq!(convert_event_start_date(&event(1, None, None)), Ok(None));
    assert_eq!(
        convert_event_start_date(&event(1, Some("next tuesday"), None)),
        Err(StartDateError::InvalidTimestamp("next tuesday".to_string()))
    );
    assert_eq!(
        convert_event_start_date(&event(1, Some("2024-01-10T23:00:00Z"), Some("Mars/Olympus"))),
        Err(StartDateError::UnknownTimeZone("Mars/Olympus".to_string()))
    );
}

#[test]
fn single_event_fills_its_whole_week() {
    // Wednesday
    let events = vec![event(7, Some("2024-01-10T15:00:00Z"), None)];
    let grouped = group_events_by_week(&events);

    assert_eq!(grouped.len(), 1);
    let days = grouped.get("2024-01-08T00:00:00.000Z").expect("week of Jan 8");
    let keys: Vec<&str> = days.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["2024-01-08", "2024-01-09", "2024-01-10", "2024-01-11", "2024-01-12", "2024-01-13", "2024-01-14"]
    );
    for (day, events_on_day) in days {
        if day == "2024-01-10" {
            assert_eq!(events_on_day.len(), 1);
            assert_eq!(events_on_day[0].id, 7);
        } else {
            assert!(events_on_day.is_empty(), "day {} should be empty", day);
        }
    }
}

#[test]
fn same_instant_lands_on_each_zones_own_day() {
    let events = vec![
        event(1, Some("2024-03-10T02:30:00Z"), Some("America/Vancouver")),
        event(2, Some("2024-03-10T02:30:00Z"), Some("Asia/Tokyo")),
    ];
    let grouped = group_events_by_week(&events);
    let days = grouped.get("2024-03-04T00:00:00.000Z").expect("week of Mar 4");

    let saturday: Vec<i64> = days["2024-03-09"].iter().map(|e| e.id).collect();
    let sunday: Vec<i64> = days["2024-03-10"].iter().map(|e| e.id).collect();
    assert_eq!(saturday, vec![1]);
    assert_eq!(sunday, vec![2]);
}

#[test]
fn sunday_belongs_to_the_week_before() {
    // Sunday Jan 14, 23:30 in Moncton
    let events = vec![event(1, Some("2024-01-15T03:30:00Z"), Some("America/Moncton"))];
    let grouped = group_events_by_week(&events);
    let keys: Vec<&String> = grouped.keys().collect();
    assert_eq!(keys, vec!["2024-01-08T00:00:00.000Z"]);
    assert_eq!(grouped["2024-01-08T00:00:00.000Z"]["2024-01-14"].len(), 1);
}

#[test]
fn grouping_is_repeatable() {
    let events = vec![
        event(1, Some("2024-01-10T15:00:00Z"), None),
        event(2, Some("2024-01-16T15:00:00Z"), Some("America/Moncton")),
        event(3, None, None),
    ];
    let copy = events.clone();

    let first = group_events_by_week(&events);
    let second = group_events_by_week(&copy);
    assert_eq!(first, second);
}

#[test]
fn unscheduled_and_unreadable_events_are_left_out() {
    let events = vec![
        event(1, None, None),
        event(2, Some("not a date"), None),
        event(3, Some("2024-01-10T15:00:00Z"), Some("Nowhere/Special")),
        event(4, Some("2024-01-10T15:00:00Z"), None),
    ];
    let grouped = group_events_by_week(&events);

    let placed: Vec<i64> = grouped
        .values()
        .flat_map(|days| days.values())
        .flat_map(|evs| evs.iter().map(|e| e.id))
        .collect();
    assert_eq!(placed, vec![4]);
}

#[test]
fn weeks_come_out_in_chronological_order_and_days_keep_input_order() {
    let events = vec![
        event(1, Some("2024-02-07T18:00:00Z"), None),
        event(2, Some("2024-01-10T20:00:00Z"), None),
        event(3, Some("2024-01-10T09:00:00Z"), None),
    ];
    let grouped = group_events_by_week(&events);

    let weeks: Vec<&String> = grouped.keys().collect();
    assert_eq!(weeks, vec!["2024-01-08T00:00:00.000Z", "2024-02-05T00:00:00.000Z"]);
    let same_day: Vec<i64> = grouped["2024-01-08T00:00:00.000Z"]["2024-01-10"].iter().map(|e| e.id).collect();
    assert_eq!(same_day, vec![2, 3]);
}

#[test]
fn keys_parse_back_to_dates() {
    assert_eq!(calendar::parse_day_key("2024-01-10"), Some(date(2024, 1, 10)));
    assert_eq!(calendar::parse_week_key("2024-01-08T00:00:00.000Z"), Some(date(2024, 1, 8)));
    assert_eq!(calendar::parse_day_key("Jan 10"), None);
}

#[test]
fn today_starts_at_local_midnight() {
    // 22:00 on Jan 9 in Moncton
    let now = Utc.with_ymd_and_hms(2024, 1, 10, 2, 0, 0).unwrap();
    let start = calendar::today_start_utc(chrono_tz::America::Moncton, now);
    assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 9, 4, 0, 0).unwrap());
}
