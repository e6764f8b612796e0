use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    // 引数の前提条件違反は全てここに集約する
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("day {0} is out of range (expected 0..=6)")]
    DayOutOfRange(usize),
}

impl ScheduleError {
    pub fn invalid_range(start_time: u32, end_time: u32) -> Self {
        ScheduleError::InvalidArgument(format!(
            "the end time must be greater than the start time ({} >= {})",
            start_time, end_time
        ))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ScheduleError::InvalidArgument(_))
    }
}

#[test]
fn test_invalid_range_メッセージに時刻が含まれること() {
    let err = ScheduleError::invalid_range(200, 100);
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("200 >= 100"));
}

#[test]
fn test_is_invalid_argument_範囲外の曜日は含まない() {
    assert!(!ScheduleError::DayOutOfRange(7).is_invalid_argument());
}
