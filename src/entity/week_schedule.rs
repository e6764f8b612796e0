use crate::entity::day_grid::{validate_range, DayGrid, HOURS_DAY, MINUTES_HALF_HOUR};
use crate::entity::error::ScheduleError;
use crate::entity::military_time;
use chrono::{NaiveTime, Weekday};
use uuid::Uuid;

#[cfg(test)]
use uuid::uuid;

pub const NUMBER_OF_DAYS: usize = 7;

// 曜日の番号と名前の対応表 (月曜日が0)
pub const WEEK: [&str; NUMBER_OF_DAYS] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A user's weekly availability.
///
/// Owns exactly one [`DayGrid`] per weekday. The schedule, its days and
/// their intervals form one aggregate that is loaded and saved as a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekSchedule {
    id: Option<Uuid>,
    owner: Uuid,
    enabled: bool,
    days: Vec<DayGrid>,
}

impl WeekSchedule {
    pub fn new(owner: Uuid, enabled: bool) -> Self {
        let days = WEEK
            .iter()
            .enumerate()
            .map(|(day, name)| DayGrid::generate(day, name, HOURS_DAY, MINUTES_HALF_HOUR))
            .collect();

        Self {
            id: None,
            owner,
            enabled,
            days,
        }
    }

    pub fn new_with_layout(
        owner: Uuid,
        enabled: bool,
        week: &[&str; NUMBER_OF_DAYS],
        hours: u32,
        interval_minutes: u32,
    ) -> Result<Self, ScheduleError> {
        let days = week
            .iter()
            .enumerate()
            .map(|(day, name)| DayGrid::new_with_layout(day, name, hours, interval_minutes))
            .collect::<Result<Vec<DayGrid>, ScheduleError>>()?;

        Ok(Self {
            id: None,
            owner,
            enabled,
            days,
        })
    }

    // 永続化された値から復元する
    pub fn from_parts(
        id: Option<Uuid>,
        owner: Uuid,
        enabled: bool,
        mut days: Vec<DayGrid>,
    ) -> Result<Self, ScheduleError> {
        if days.len() != NUMBER_OF_DAYS {
            return Err(ScheduleError::InvalidArgument(format!(
                "a schedule needs {} days, got {}",
                NUMBER_OF_DAYS,
                days.len()
            )));
        }

        days.sort_by_key(|day| day.get_day());
        for (index, day) in days.iter().enumerate() {
            if day.get_day() != index {
                return Err(ScheduleError::InvalidArgument(format!(
                    "day {} is missing",
                    index
                )));
            }
        }

        Ok(Self {
            id,
            owner,
            enabled,
            days,
        })
    }

    pub fn set_availability(
        &mut self,
        day: usize,
        start_time: u32,
        end_time: u32,
        available: bool,
    ) -> Result<&mut Self, ScheduleError> {
        validate_range(start_time, end_time)?;

        self.get_day_mut(day)?
            .set_availability(start_time, end_time, available)?;
        Ok(self)
    }

    pub fn is_available(
        &self,
        day: usize,
        start_time: u32,
        end_time: u32,
    ) -> Result<bool, ScheduleError> {
        validate_range(start_time, end_time)?;

        self.get_day(day)?.is_available(start_time, end_time)
    }

    // time から minutes 分の範囲が空いているか
    pub fn is_available_at(
        &self,
        weekday: Weekday,
        time: NaiveTime,
        minutes: u32,
    ) -> Result<bool, ScheduleError> {
        let start_time = military_time::from_naive_time(time);
        let end_time = military_time::add_minutes(start_time, minutes).ok_or_else(|| {
            ScheduleError::InvalidArgument(format!("{} minutes is too long", minutes))
        })?;

        self.is_available(military_time::day_index(weekday), start_time, end_time)
    }

    pub fn enable(&mut self) -> &mut Self {
        self.enabled = true;
        self
    }

    pub fn disable(&mut self) -> &mut Self {
        self.enabled = false;
        self
    }

    pub fn get_week(&self) -> &'static [&'static str; NUMBER_OF_DAYS] {
        &WEEK
    }

    pub fn get_number_of_days(&self) -> usize {
        NUMBER_OF_DAYS
    }

    pub fn get_id(&self) -> Option<Uuid> {
        self.id
    }

    // 一度採番されたidは変えない
    pub fn assign_id(&mut self) -> Uuid {
        *self.id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn get_owner(&self) -> Uuid {
        self.owner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_days(&self) -> &[DayGrid] {
        &self.days
    }

    pub fn get_day(&self, day: usize) -> Result<&DayGrid, ScheduleError> {
        self.days.get(day).ok_or(ScheduleError::DayOutOfRange(day))
    }

    pub fn get_day_mut(&mut self, day: usize) -> Result<&mut DayGrid, ScheduleError> {
        self.days
            .get_mut(day)
            .ok_or(ScheduleError::DayOutOfRange(day))
    }
}

#[cfg(test)]
const OWNER: Uuid = uuid!("67e55044-10b1-426f-9247-bb680e5fe0c8");

#[test]
fn test_new_全ての曜日が揃っていること() {
    let schedule = WeekSchedule::new(OWNER, true);

    assert_eq!(schedule.get_days().len(), 7);
    assert_eq!(schedule.get_number_of_days(), 7);
    assert_eq!(schedule.get_id(), None);
    assert_eq!(schedule.get_owner(), OWNER);
    assert!(schedule.is_enabled());

    for (index, name) in schedule.get_week().iter().enumerate() {
        let day = schedule.get_day(index).unwrap();
        assert_eq!(day.get_day(), index);
        assert_eq!(day.get_name(), *name);
        assert_eq!(day.get_intervals().len(), 48);
    }
}

#[test]
fn test_new_with_layout_区間数は時間数と区間の長さで決まる() {
    let schedule = WeekSchedule::new_with_layout(OWNER, false, &WEEK, 12, 15).unwrap();

    assert!(!schedule.is_enabled());
    for day in schedule.get_days() {
        assert_eq!(day.get_intervals().len(), 12 * (60 / 15));
        assert_eq!(day.get_intervals().last().unwrap().get_end_time(), 1200);
    }
}

#[test]
fn test_new_with_layout_不正な引数() {
    let mut week = WEEK;
    week[3] = "";

    assert!(WeekSchedule::new_with_layout(OWNER, true, &week, 24, 30).is_err());
    assert!(WeekSchedule::new_with_layout(OWNER, true, &WEEK, 24, 0).is_err());
}

#[test]
fn test_set_availability_設定した範囲の一部を問い合わせると真() {
    let mut schedule = WeekSchedule::new(OWNER, true);
    schedule.set_availability(2, 100, 200, true).unwrap();

    assert_eq!(schedule.is_available(2, 100, 130), Ok(true));
    assert_eq!(schedule.is_available(2, 100, 200), Ok(true));
    // 他の曜日には影響しない
    assert_eq!(schedule.is_available(3, 100, 200), Ok(false));
}

#[test]
fn test_set_availability_連鎖できること() {
    let mut schedule = WeekSchedule::new(OWNER, true);
    schedule
        .set_availability(0, 900, 1200, true)
        .unwrap()
        .set_availability(0, 1000, 1030, false)
        .unwrap();

    assert_eq!(schedule.is_available(0, 900, 1000), Ok(true));
    assert_eq!(schedule.is_available(0, 900, 1200), Ok(false));
}

#[test]
fn test_set_availability_範囲外の曜日() {
    let mut schedule = WeekSchedule::new(OWNER, true);

    assert_eq!(
        schedule.set_availability(7, 100, 200, true).unwrap_err(),
        ScheduleError::DayOutOfRange(7)
    );
    assert_eq!(
        schedule.is_available(9, 100, 200).unwrap_err(),
        ScheduleError::DayOutOfRange(9)
    );
}

#[test]
fn test_set_availability_不正な範囲は状態を変えない() {
    let mut schedule = WeekSchedule::new(OWNER, true);
    let before = schedule.clone();

    assert!(schedule
        .set_availability(1, 300, 200, true)
        .unwrap_err()
        .is_invalid_argument());
    // 範囲の検証は曜日の検証より先に行われる
    assert!(schedule
        .set_availability(8, 300, 300, true)
        .unwrap_err()
        .is_invalid_argument());
    assert!(schedule.is_available(1, 200, 200).is_err());

    assert_eq!(schedule, before);
}

#[test]
fn test_enable_冪等であること() {
    let mut schedule = WeekSchedule::new(OWNER, false);

    schedule.enable().enable();
    assert!(schedule.is_enabled());

    schedule.disable().disable();
    assert!(!schedule.is_enabled());
}

#[test]
fn test_is_available_at_曜日と時刻から問い合わせる() {
    let mut schedule = WeekSchedule::new(OWNER, true);
    schedule.set_availability(4, 1330, 1500, true).unwrap();

    let time = NaiveTime::from_hms_opt(13, 30, 0).unwrap();
    assert_eq!(schedule.is_available_at(Weekday::Fri, time, 90), Ok(true));
    assert_eq!(schedule.is_available_at(Weekday::Fri, time, 120), Ok(false));
    assert_eq!(schedule.is_available_at(Weekday::Thu, time, 30), Ok(false));
}

#[test]
fn test_is_available_at_分数が大きすぎる場合() {
    let schedule = WeekSchedule::new(OWNER, true);
    let time = NaiveTime::from_hms_opt(23, 30, 0).unwrap();

    let actual = schedule.is_available_at(Weekday::Fri, time, u32::MAX);
    assert!(matches!(actual, Err(ScheduleError::InvalidArgument(_))));
}

#[test]
fn test_assign_id_一度だけ採番されること() {
    let mut schedule = WeekSchedule::new(OWNER, true);
    let id = schedule.assign_id();

    assert_eq!(schedule.assign_id(), id);
    assert_eq!(schedule.get_id(), Some(id));
}

#[test]
fn test_from_parts_曜日が欠けている場合() {
    let mut days: Vec<DayGrid> = WeekSchedule::new(OWNER, true).get_days().to_vec();
    days.pop();

    assert!(WeekSchedule::from_parts(None, OWNER, true, days.clone()).is_err());

    days.push(DayGrid::new(5, "Saturday").unwrap());
    assert!(WeekSchedule::from_parts(None, OWNER, true, days).is_err());
}

#[test]
fn test_from_parts_順序は曜日で揃えられる() {
    let mut days: Vec<DayGrid> = WeekSchedule::new(OWNER, true).get_days().to_vec();
    days.reverse();

    let schedule = WeekSchedule::from_parts(None, OWNER, true, days).unwrap();
    assert_eq!(schedule, WeekSchedule::new(OWNER, true));
}
