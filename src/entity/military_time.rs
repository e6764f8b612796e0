use chrono::{NaiveTime, Timelike, Weekday};

// 軍用時刻: 時 * 100 + 分 (例: 130 は 1:30)
pub fn from_naive_time(time: NaiveTime) -> u32 {
    time.hour() * 100 + time.minute()
}

// 分単位で進める。時を跨ぐ場合は繰り上げる。u32に収まらない場合はNone
pub fn add_minutes(military: u32, minutes: u32) -> Option<u32> {
    let total = (military / 100 * 60 + military % 100).checked_add(minutes)?;
    (total / 60).checked_mul(100)?.checked_add(total % 60)
}

pub fn format(military: u32) -> String {
    format!("{:02}:{:02}", military / 100, military % 100)
}

// "13:30" もしくは "1330" を受け付ける。24時は "24:00" のみ
pub fn parse(s: &str) -> Option<u32> {
    let s = s.trim();
    let (hour_str, minute_str) = match s.split_once(':') {
        Some((h, m)) => (h, m),
        None if s.is_ascii() && (3..=4).contains(&s.len()) => s.split_at(s.len() - 2),
        None => return None,
    };

    if minute_str.len() != 2 {
        return None;
    }

    // "+1:30" のような符号付きの値は受け付けない
    if !is_digits(hour_str) || !is_digits(minute_str) {
        return None;
    }

    let hour: u32 = hour_str.parse().ok()?;
    let minute: u32 = minute_str.parse().ok()?;

    if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
        return None;
    }

    Some(hour * 100 + minute)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn day_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

#[test]
fn test_from_naive_time_時と分を変換する() {
    let time = NaiveTime::from_hms_opt(13, 30, 59).unwrap();
    assert_eq!(from_naive_time(time), 1330);
}

#[test]
fn test_add_minutes_時を跨ぐ場合() {
    assert_eq!(add_minutes(130, 30), Some(200));
    assert_eq!(add_minutes(145, 90), Some(315));
    assert_eq!(add_minutes(2330, 30), Some(2400));
}

#[test]
fn test_add_minutes_桁あふれする場合() {
    assert_eq!(add_minutes(2330, u32::MAX), None);
    assert_eq!(add_minutes(0, u32::MAX), None);
}

#[test]
fn test_format_ゼロ埋めされること() {
    assert_eq!(format(30), "00:30");
    assert_eq!(format(2400), "24:00");
}

#[test]
fn test_parse_正常系() {
    assert_eq!(parse("13:30"), Some(1330));
    assert_eq!(parse("1330"), Some(1330));
    assert_eq!(parse("130"), Some(130));
    assert_eq!(parse("0:00"), Some(0));
    assert_eq!(parse("24:00"), Some(2400));
}

#[test]
fn test_parse_異常系() {
    assert_eq!(parse("13:60"), None);
    assert_eq!(parse("24:30"), None);
    assert_eq!(parse("25:00"), None);
    assert_eq!(parse("1:3"), None);
    assert_eq!(parse("abc"), None);
    assert_eq!(parse("30"), None);
}

#[test]
fn test_parse_符号付きの値は受け付けない() {
    assert_eq!(parse("+1:30"), None);
    assert_eq!(parse("+130"), None);
    assert_eq!(parse("1:+3"), None);
    assert_eq!(parse("-1:30"), None);
}

#[test]
fn test_day_index_月曜日が0() {
    assert_eq!(day_index(Weekday::Mon), 0);
    assert_eq!(day_index(Weekday::Wed), 2);
    assert_eq!(day_index(Weekday::Sun), 6);
}
