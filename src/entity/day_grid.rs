use crate::entity::error::ScheduleError;
use crate::entity::interval::Interval;

// 1日の時間数
pub const HOURS_DAY: u32 = 24;

// 30分
pub const MINUTES_HALF_HOUR: u32 = 30;

pub const MINUTES_HOUR: u32 = 60;

// 時間を軍用時刻に変換する係数 (1時間 => 100)
pub const MILITARY_TIME: u32 = 100;

// 略称は名前の先頭3文字
const ABBREV_LENGTH: usize = 3;

/// One day of a week schedule, split into equally sized intervals.
///
/// The intervals are generated once at construction and tile
/// `[0, hours * 100)` in military time. Only availability flags and the
/// day's name/abbreviation change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGrid {
    day: usize,
    name: String,
    abbreviation: String,
    interval_minutes: u32,
    intervals: Vec<Interval>,
}

impl DayGrid {
    pub fn new(day: usize, name: &str) -> Result<Self, ScheduleError> {
        Self::new_with_layout(day, name, HOURS_DAY, MINUTES_HALF_HOUR)
    }

    pub fn new_with_layout(
        day: usize,
        name: &str,
        hours: u32,
        interval_minutes: u32,
    ) -> Result<Self, ScheduleError> {
        validate_name("name", name)?;
        if hours == 0 {
            return Err(ScheduleError::InvalidArgument(
                "hours must be positive".to_string(),
            ));
        }
        if interval_minutes == 0 {
            return Err(ScheduleError::InvalidArgument(
                "interval minutes must be positive".to_string(),
            ));
        }
        // 軍用時刻で表せない時間数は受け付けない
        if hours.checked_mul(MILITARY_TIME).is_none() {
            return Err(ScheduleError::InvalidArgument(format!(
                "hours must be at most {}",
                u32::MAX / MILITARY_TIME
            )));
        }

        Ok(Self::generate(day, name, hours, interval_minutes))
    }

    // 引数は検証済みであること
    pub(crate) fn generate(day: usize, name: &str, hours: u32, interval_minutes: u32) -> Self {
        // 60で割り切れない場合は切り捨てとなる (40分なら1時間に1区間)
        let intervals_per_hour = MINUTES_HOUR / interval_minutes;
        let hours_military = hours * MILITARY_TIME;

        let mut intervals = Vec::with_capacity((hours * intervals_per_hour) as usize);

        for hour in (0..hours_military).step_by(MILITARY_TIME as usize) {
            for i in 0..intervals_per_hour {
                let start_time = hour + i * interval_minutes;
                let end_minute = ((i + 1) * interval_minutes) % MINUTES_HOUR;
                let end_time = hour
                    + if end_minute == 0 {
                        MILITARY_TIME
                    } else {
                        end_minute
                    };
                intervals.push(Interval::new(start_time, end_time));
            }
        }

        Self {
            day,
            name: name.to_string(),
            abbreviation: name.chars().take(ABBREV_LENGTH).collect(),
            interval_minutes,
            intervals,
        }
    }

    // 永続化された値から復元する。区間の整合性はgateway側で検証する
    pub fn from_parts(
        day: usize,
        name: &str,
        abbreviation: &str,
        interval_minutes: u32,
        intervals: Vec<Interval>,
    ) -> Result<Self, ScheduleError> {
        validate_name("name", name)?;
        validate_name("abbreviation", abbreviation)?;
        if interval_minutes == 0 {
            return Err(ScheduleError::InvalidArgument(
                "interval minutes must be positive".to_string(),
            ));
        }

        Ok(Self {
            day,
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            interval_minutes,
            intervals,
        })
    }

    pub fn set_name(&mut self, name: &str) -> Result<&mut Self, ScheduleError> {
        validate_name("name", name)?;
        self.name = name.to_string();
        Ok(self)
    }

    pub fn set_abbrev(&mut self, abbreviation: &str) -> Result<&mut Self, ScheduleError> {
        validate_name("abbreviation", abbreviation)?;
        self.abbreviation = abbreviation.to_string();
        Ok(self)
    }

    /// Marks every interval fully inside `[start_time, end_time]`.
    ///
    /// Intervals that only partially overlap the range are left alone.
    pub fn set_availability(
        &mut self,
        start_time: u32,
        end_time: u32,
        available: bool,
    ) -> Result<&mut Self, ScheduleError> {
        validate_range(start_time, end_time)?;

        for interval in self
            .intervals
            .iter_mut()
            .filter(|interval| interval.is_within(start_time, end_time))
        {
            interval.set_availability(available);
        }

        Ok(self)
    }

    /// Returns `true` iff every interval fully inside the range is available.
    ///
    /// A range that contains no whole interval yields `true`.
    pub fn is_available(&self, start_time: u32, end_time: u32) -> Result<bool, ScheduleError> {
        validate_range(start_time, end_time)?;

        let available = self
            .intervals
            .iter()
            .filter(|interval| interval.is_within(start_time, end_time))
            .fold(true, |acc, interval| acc && interval.is_available());

        Ok(available)
    }

    pub fn get_day(&self) -> usize {
        self.day
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_abbrev(&self) -> &str {
        &self.abbreviation
    }

    pub fn get_interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn get_intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

pub(crate) fn validate_range(start_time: u32, end_time: u32) -> Result<(), ScheduleError> {
    if start_time >= end_time {
        return Err(ScheduleError::invalid_range(start_time, end_time));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), ScheduleError> {
    if value.is_empty() {
        return Err(ScheduleError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
fn wednesday() -> DayGrid {
    DayGrid::new_with_layout(2, "Wednesday", 24, 30).unwrap()
}

#[test]
fn test_new_with_layout_水曜日の区間数と境界() {
    let day = wednesday();
    let intervals = day.get_intervals();

    assert_eq!(day.get_day(), 2);
    assert_eq!(day.get_name(), "Wednesday");
    assert_eq!(day.get_abbrev(), "Wed");
    assert_eq!(day.get_interval_minutes(), 30);
    assert_eq!(intervals.len(), 48);
    assert_eq!(
        (intervals[1].get_start_time(), intervals[1].get_end_time()),
        (30, 100)
    );
    assert_eq!(
        (intervals[2].get_start_time(), intervals[2].get_end_time()),
        (100, 130)
    );
}

#[test]
fn test_new_with_layout_区間が隙間なく1日を覆うこと() {
    let day = wednesday();
    let intervals = day.get_intervals();

    assert_eq!(intervals.first().unwrap().get_start_time(), 0);
    assert_eq!(intervals.last().unwrap().get_end_time(), 2400);

    for pair in intervals.windows(2) {
        let end = pair[0].get_end_time();
        let next_start = pair[1].get_start_time();
        assert!(pair[0].get_start_time() < end);
        // 時の境界では x30 -> (x+1)00 となる
        assert_eq!(end, next_start);
    }
}

#[test]
fn test_new_with_layout_15分刻みの場合() {
    let day = DayGrid::new_with_layout(0, "Monday", 2, 15).unwrap();
    let bounds: Vec<(u32, u32)> = day
        .get_intervals()
        .iter()
        .map(|i| (i.get_start_time(), i.get_end_time()))
        .collect();

    assert_eq!(
        bounds,
        vec![
            (0, 15),
            (15, 30),
            (30, 45),
            (45, 100),
            (100, 115),
            (115, 130),
            (130, 145),
            (145, 200),
        ]
    );
}

#[test]
fn test_new_with_layout_60で割り切れない場合は切り捨てられること() {
    // 60 / 40 = 1 区間/時
    let day = DayGrid::new_with_layout(0, "Monday", 3, 40).unwrap();
    let bounds: Vec<(u32, u32)> = day
        .get_intervals()
        .iter()
        .map(|i| (i.get_start_time(), i.get_end_time()))
        .collect();

    assert_eq!(bounds, vec![(0, 40), (100, 140), (200, 240)]);
}

#[test]
fn test_new_with_layout_不正な引数() {
    assert!(DayGrid::new_with_layout(0, "", 24, 30).is_err());
    assert!(DayGrid::new_with_layout(0, "Monday", 0, 30).is_err());
    assert!(DayGrid::new_with_layout(0, "Monday", 24, 0).is_err());
}

#[test]
fn test_new_with_layout_時間数が大きすぎる場合() {
    let actual = DayGrid::new_with_layout(0, "Monday", 50_000_000, 30);
    assert!(matches!(actual, Err(ScheduleError::InvalidArgument(_))));

    let actual = DayGrid::new_with_layout(0, "Monday", u32::MAX, 60);
    assert!(matches!(actual, Err(ScheduleError::InvalidArgument(_))));
}

#[test]
fn test_set_availability_範囲内の区間だけが変わること() {
    let mut day = wednesday();
    day.set_availability(100, 200, true).unwrap();

    let available: Vec<u32> = day
        .get_intervals()
        .iter()
        .filter(|i| i.is_available())
        .map(|i| i.get_start_time())
        .collect();

    assert_eq!(available, vec![100, 130]);
}

#[test]
fn test_set_availability_はみ出す区間は含まれないこと() {
    let mut day = wednesday();
    // 130-200 は 145 を跨ぐので対象外
    day.set_availability(100, 145, true).unwrap();

    assert_eq!(day.is_available(100, 130), Ok(true));
    assert_eq!(day.is_available(130, 200), Ok(false));
}

#[test]
#[allow(non_snake_case)]
fn test_set_availability_開始が終了以上ならInvalidArgumentで状態は変わらない() {
    let mut day = wednesday();
    let before = day.clone();

    let actual = day.set_availability(200, 100, true);
    assert!(actual.unwrap_err().is_invalid_argument());

    let actual = day.set_availability(100, 100, true);
    assert!(actual.unwrap_err().is_invalid_argument());

    assert_eq!(day, before);
}

#[test]
fn test_is_available_設定した範囲を問い合わせると真() {
    let mut day = wednesday();
    day.set_availability(900, 1700, true).unwrap();

    assert_eq!(day.is_available(900, 1700), Ok(true));
    assert_eq!(day.is_available(1230, 1300), Ok(true));
    assert_eq!(day.is_available(830, 1700), Ok(false));
}

#[test]
fn test_is_available_区間の境界に揃っていない範囲は跨ぐ区間を除外する() {
    let mut day = wednesday();
    day.set_availability(100, 130, true).unwrap();

    // 100-215: 100-130 (空き), 130-200 (空きなし) が含まれ、200-230 は跨ぐので除外
    assert_eq!(day.is_available(100, 215), Ok(false));
    // 115-200: 130-200 のみ含まれる
    assert_eq!(day.is_available(115, 200), Ok(false));
    // 45-130: 100-130 のみ含まれる (30-100 は跨ぐので除外)
    assert_eq!(day.is_available(45, 130), Ok(true));
}

#[test]
fn test_is_available_含まれる区間がない場合は真() {
    let day = wednesday();

    // 110-120 は 100-130 の内側にあり、どの区間も完全には含まない
    assert_eq!(day.is_available(110, 120), Ok(true));
}

#[test]
fn test_set_name_空文字は拒否される() {
    let mut day = wednesday();

    assert!(day.set_name("").is_err());
    assert!(day.set_abbrev("").is_err());
    assert_eq!(day.get_name(), "Wednesday");

    day.set_name("Mittwoch").unwrap().set_abbrev("Mi").unwrap();
    assert_eq!(day.get_name(), "Mittwoch");
    assert_eq!(day.get_abbrev(), "Mi");
}
