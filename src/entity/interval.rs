// 新しく生成された区間の初期値。予定表は「空きなし」から始まる
pub const DEFAULT_AVAILABILITY: bool = false;

/// A single slot of a day grid, bounded by military-time integers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    start_time: u32,
    end_time: u32,
    available: bool,
}

impl Interval {
    pub fn new(start_time: u32, end_time: u32) -> Self {
        Self {
            start_time,
            end_time,
            available: DEFAULT_AVAILABILITY,
        }
    }

    pub fn new_with_availability(start_time: u32, end_time: u32, available: bool) -> Self {
        Self {
            start_time,
            end_time,
            available,
        }
    }

    pub fn get_start_time(&self) -> u32 {
        self.start_time
    }

    pub fn get_end_time(&self) -> u32 {
        self.end_time
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_availability(&mut self, available: bool) -> &mut Self {
        self.available = available;
        self
    }

    // [start_time, end_time] に完全に含まれるか
    pub fn is_within(&self, start_time: u32, end_time: u32) -> bool {
        self.start_time >= start_time && self.end_time <= end_time
    }
}

#[test]
fn test_new_初期値は空きなし() {
    let interval = Interval::new(100, 130);

    assert_eq!(interval.get_start_time(), 100);
    assert_eq!(interval.get_end_time(), 130);
    assert!(!interval.is_available());
}

#[test]
fn test_set_availability_連鎖して書き換えられること() {
    let mut interval = Interval::new(0, 30);
    let actual = interval.set_availability(true).is_available();

    assert!(actual);
}

#[test]
fn test_is_within_境界が一致する場合は含まれる() {
    let interval = Interval::new(130, 200);

    assert!(interval.is_within(130, 200));
    assert!(interval.is_within(100, 200));
    assert!(!interval.is_within(145, 200));
    assert!(!interval.is_within(130, 145));
}
