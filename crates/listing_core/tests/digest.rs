use chrono::{DateTime, TimeZone, Utc};
use listing_core::{
    digest_due, format_digest_day, listing_date, plan_digest, DigestDay, DigestEntry, SeenListings,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn listing_date_applies_offset() {
    init_logging();
    assert_eq!(listing_date(at(2025, 1, 1, 12, 0), 3).as_deref(), Some("01.01.2025"));
    assert_eq!(listing_date(at(2025, 1, 1, 22, 30), 3).as_deref(), Some("02.01.2025"));
    assert_eq!(listing_date(at(2025, 1, 1, 1, 0), -3).as_deref(), Some("31.12.2024"));
}

#[test]
fn out_of_range_offset_yields_no_date_instead_of_panicking() {
    init_logging();
    let now = at(2025, 1, 1, 12, 0);
    assert_eq!(listing_date(now, 10_000_000_000), None);
    assert_eq!(listing_date(now, i64::MIN), None);
    assert_eq!(plan_digest(&SeenListings::new(), now, 10_000_000_000), None);
}

#[test]
fn digest_fires_once_per_day_during_the_hour() {
    init_logging();
    let digest_hour = 8;
    let mut last = at(2025, 3, 9, 15, 0);
    let mut fired = 0;

    // Poll every five minutes for a whole day.
    let mut now = at(2025, 3, 10, 0, 0);
    while now < at(2025, 3, 11, 0, 0) {
        if digest_due(now, last, digest_hour) {
            fired += 1;
            last = now;
        }
        now += chrono::Duration::minutes(5);
    }

    assert_eq!(fired, 1);
    assert_eq!(last, at(2025, 3, 10, 8, 0));
}

#[test]
fn digest_not_due_outside_hour_or_twice_same_day() {
    init_logging();
    let last = at(2025, 3, 9, 8, 0);
    assert!(!digest_due(at(2025, 3, 10, 9, 0), last, 8));
    assert!(digest_due(at(2025, 3, 10, 8, 59), last, 8));
    assert!(!digest_due(at(2025, 3, 10, 8, 30), at(2025, 3, 10, 8, 0), 8));
}

#[test]
fn digest_compares_calendar_dates_not_day_of_month() {
    init_logging();
    // Same day-of-month, different month.
    assert!(digest_due(at(2025, 4, 10, 8, 0), at(2025, 3, 10, 8, 0), 8));
}

#[test]
fn plan_groups_today_and_tomorrow_only() {
    init_logging();
    let seen = SeenListings::from_entries(vec![
        "MEXC_OLD_09.03.2025".to_string(),
        "MEXC_AAA_10.03.2025".to_string(),
        "BingX_BBB_11.03.2025".to_string(),
        "Gate.io_CCC_10.03.2025".to_string(),
        "MEXC_FAR_20.03.2025".to_string(),
        "broken".to_string(),
    ]);

    let plan = plan_digest(&seen, at(2025, 3, 10, 8, 0), 3).unwrap();

    assert_eq!(
        plan.days,
        vec![
            DigestDay {
                date: "10.03.2025".to_string(),
                entries: vec![
                    DigestEntry {
                        exchange: "MEXC".to_string(),
                        coin: "AAA".to_string(),
                    },
                    DigestEntry {
                        exchange: "Gate.io".to_string(),
                        coin: "CCC".to_string(),
                    },
                ],
            },
            DigestDay {
                date: "11.03.2025".to_string(),
                entries: vec![DigestEntry {
                    exchange: "BingX".to_string(),
                    coin: "BBB".to_string(),
                }],
            },
        ]
    );
}

#[test]
fn plan_is_empty_without_matching_keys() {
    init_logging();
    let seen = SeenListings::from_entries(vec!["MEXC_OLD_01.01.2020".to_string()]);
    assert!(plan_digest(&seen, at(2025, 3, 10, 8, 0), 3).unwrap().is_empty());
    assert!(plan_digest(&SeenListings::new(), at(2025, 3, 10, 8, 0), 3)
        .unwrap()
        .is_empty());
}

#[test]
fn plan_window_follows_the_shifted_date_late_in_the_utc_day() {
    init_logging();
    // 22:00 UTC on the 10th is already the 11th once shifted by +3h.
    let seen = SeenListings::from_entries(vec![
        "MEXC_UTCDAY_10.03.2025".to_string(),
        "MEXC_TODAY_11.03.2025".to_string(),
        "BingX_NEXT_12.03.2025".to_string(),
    ]);

    let plan = plan_digest(&seen, at(2025, 3, 10, 22, 0), 3).unwrap();

    assert_eq!(
        plan.days,
        vec![
            DigestDay {
                date: "11.03.2025".to_string(),
                entries: vec![DigestEntry {
                    exchange: "MEXC".to_string(),
                    coin: "TODAY".to_string(),
                }],
            },
            DigestDay {
                date: "12.03.2025".to_string(),
                entries: vec![DigestEntry {
                    exchange: "BingX".to_string(),
                    coin: "NEXT".to_string(),
                }],
            },
        ]
    );

    // Without the shift the UTC calendar day would be picked instead.
    let unshifted = plan_digest(&seen, at(2025, 3, 10, 22, 0), 0).unwrap();
    assert_eq!(unshifted.days[0].date, "10.03.2025");
}

#[test]
fn digest_day_message_lists_pairs_under_header() {
    init_logging();
    let day = DigestDay {
        date: "10.03.2025".to_string(),
        entries: vec![DigestEntry {
            exchange: "MEXC".to_string(),
            coin: "AAA".to_string(),
        }],
    };
    assert_eq!(
        format_digest_day(&day),
        "🌅 <b>UPCOMING LISTINGS</b>\n\n📅 <b>10.03.2025</b>\n🏦 MEXC\n🪙 $AAA"
    );
}
