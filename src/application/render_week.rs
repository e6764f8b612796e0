use crate::entity::military_time;
use crate::entity::week_schedule::WeekSchedule;
use std::collections::BTreeSet;

const AVAILABLE_MARK: char = '#';
const UNAVAILABLE_MARK: char = '.';
const MISSING_MARK: char = ' ';

/// Renders the schedule as a text grid: one row per interval start time,
/// one column per day.
pub fn render_week(schedule: &WeekSchedule) -> String {
    let days = schedule.get_days();

    // 曜日ごとに区間の長さが異なる場合もあるので、開始時刻の和集合を行とする
    let start_times: BTreeSet<u32> = days
        .iter()
        .flat_map(|day| day.get_intervals().iter().map(|i| i.get_start_time()))
        .collect();

    let mut out = String::new();
    out += "     ";
    for day in days {
        out += &format!(" {:>3}", day.get_abbrev());
    }
    out += "\n";

    for start_time in start_times {
        out += &military_time::format(start_time);
        for day in days {
            let mark = day
                .get_intervals()
                .iter()
                .find(|i| i.get_start_time() == start_time)
                .map(|i| {
                    if i.is_available() {
                        AVAILABLE_MARK
                    } else {
                        UNAVAILABLE_MARK
                    }
                })
                .unwrap_or(MISSING_MARK);
            out += &format!("   {}", mark);
        }
        out += "\n";
    }

    out
}

#[cfg(test)]
use crate::entity::week_schedule::WEEK;

#[cfg(test)]
use uuid::Uuid;

#[test]
fn test_render_week_見出しと行数() {
    let schedule = WeekSchedule::new(Uuid::new_v4(), true);
    let actual = render_week(&schedule);
    let lines: Vec<&str> = actual.lines().collect();

    assert_eq!(lines.len(), 1 + 48);
    assert_eq!(lines[0], "      Mon Tue Wed Thu Fri Sat Sun");
    assert_eq!(lines[1], "00:00   .   .   .   .   .   .   .");
    assert_eq!(lines[48], "23:30   .   .   .   .   .   .   .");
}

#[test]
fn test_render_week_空いている区間に印が付くこと() {
    let mut schedule = WeekSchedule::new_with_layout(Uuid::new_v4(), true, &WEEK, 2, 60).unwrap();
    schedule.set_availability(2, 100, 200, true).unwrap();

    let actual = render_week(&schedule);

    assert_eq!(
        actual,
        "      Mon Tue Wed Thu Fri Sat Sun\n\
         00:00   .   .   .   .   .   .   .\n\
         01:00   .   .   #   .   .   .   .\n"
    );
}
