use crate::entity::day_grid::{DayGrid, MILITARY_TIME};
use crate::entity::interval::Interval;
use crate::entity::location::{Location, UserLocation};
use crate::entity::user::{read_sex, PasswordDigest, User};
use crate::entity::week_schedule::WeekSchedule;
use linked_hash_map::LinkedHashMap;
use uuid::Uuid;
use yaml_rust::Yaml;

#[cfg(test)]
use yaml_rust::YamlLoader;

fn key(s: &str) -> Yaml {
    Yaml::String(String::from(s))
}

fn require_str<'a>(yaml: &'a Yaml, name: &str) -> Result<&'a str, String> {
    yaml[name]
        .as_str()
        .ok_or_else(|| format!("'{}' must be a string", name))
}

fn require_i64(yaml: &Yaml, name: &str) -> Result<i64, String> {
    yaml[name]
        .as_i64()
        .ok_or_else(|| format!("'{}' must be an integer", name))
}

fn require_u32(yaml: &Yaml, name: &str) -> Result<u32, String> {
    let value = require_i64(yaml, name)?;
    u32::try_from(value).map_err(|_| format!("'{}' is out of range: {}", name, value))
}

fn require_bool(yaml: &Yaml, name: &str) -> Result<bool, String> {
    yaml[name]
        .as_bool()
        .ok_or_else(|| format!("'{}' must be a boolean", name))
}

fn require_uuid(yaml: &Yaml, name: &str) -> Result<Uuid, String> {
    let s = require_str(yaml, name)?;
    Uuid::parse_str(s).map_err(|e| format!("'{}' is not a valid id: {}", name, e))
}

pub fn schedule_to_yaml(schedule: &WeekSchedule) -> Yaml {
    let mut schedule_hash = LinkedHashMap::new();

    if let Some(id) = schedule.get_id() {
        schedule_hash.insert(key("id"), Yaml::String(id.to_string()));
    }
    schedule_hash.insert(key("owner"), Yaml::String(schedule.get_owner().to_string()));
    schedule_hash.insert(key("enabled"), Yaml::Boolean(schedule.is_enabled()));

    let days = schedule.get_days().iter().map(day_to_yaml).collect();
    schedule_hash.insert(key("days"), Yaml::Array(days));

    Yaml::Hash(schedule_hash)
}

fn day_to_yaml(day: &DayGrid) -> Yaml {
    let mut day_hash = LinkedHashMap::new();

    day_hash.insert(key("day"), Yaml::Integer(day.get_day() as i64));
    day_hash.insert(key("name"), Yaml::String(day.get_name().to_string()));
    day_hash.insert(key("abbreviation"), Yaml::String(day.get_abbrev().to_string()));
    day_hash.insert(
        key("interval_minutes"),
        Yaml::Integer(i64::from(day.get_interval_minutes())),
    );

    let intervals = day
        .get_intervals()
        .iter()
        .map(|interval| {
            let mut interval_hash = LinkedHashMap::new();
            interval_hash.insert(
                key("start_time"),
                Yaml::Integer(i64::from(interval.get_start_time())),
            );
            interval_hash.insert(
                key("end_time"),
                Yaml::Integer(i64::from(interval.get_end_time())),
            );
            interval_hash.insert(key("available"), Yaml::Boolean(interval.is_available()));
            Yaml::Hash(interval_hash)
        })
        .collect();
    day_hash.insert(key("intervals"), Yaml::Array(intervals));

    Yaml::Hash(day_hash)
}

pub fn yaml_to_schedule(yaml: &Yaml) -> Result<WeekSchedule, String> {
    let id = match yaml["id"] {
        Yaml::BadValue | Yaml::Null => None,
        _ => Some(require_uuid(yaml, "id")?),
    };
    let owner = require_uuid(yaml, "owner")?;
    let enabled = require_bool(yaml, "enabled")?;

    let days_yaml = yaml["days"]
        .as_vec()
        .ok_or_else(|| "'days' must be a list".to_string())?;
    let days = days_yaml
        .iter()
        .map(yaml_to_day)
        .collect::<Result<Vec<DayGrid>, String>>()?;

    WeekSchedule::from_parts(id, owner, enabled, days).map_err(|e| e.to_string())
}

fn yaml_to_day(yaml: &Yaml) -> Result<DayGrid, String> {
    let day = usize::try_from(require_i64(yaml, "day")?).map_err(|_| "'day' is negative")?;
    let name = require_str(yaml, "name")?;
    let abbreviation = require_str(yaml, "abbreviation")?;
    let interval_minutes = require_u32(yaml, "interval_minutes")?;

    let mut intervals = vec![];
    for interval_yaml in yaml["intervals"].as_vec().unwrap_or(&vec![]) {
        let start_time = require_u32(interval_yaml, "start_time")?;
        let end_time = require_u32(interval_yaml, "end_time")?;
        let available = require_bool(interval_yaml, "available")?;
        intervals.push(Interval::new_with_availability(
            start_time, end_time, available,
        ));
    }
    check_tiling(day, &intervals)?;

    DayGrid::from_parts(day, name, abbreviation, interval_minutes, intervals)
        .map_err(|e| e.to_string())
}

// 生成時と同じ形をしているか: 0から始まり、昇順で重ならず、時を跨がない
fn check_tiling(day: usize, intervals: &[Interval]) -> Result<(), String> {
    if let Some(first) = intervals.first() {
        if first.get_start_time() != 0 {
            return Err(format!("day {}: the first interval must start at 0", day));
        }
    }

    for interval in intervals {
        let start_time = interval.get_start_time();
        let end_time = interval.get_end_time();
        let next_hour = (start_time / MILITARY_TIME + 1).checked_mul(MILITARY_TIME);
        if start_time >= end_time || next_hour.map_or(true, |next_hour| end_time > next_hour) {
            return Err(format!(
                "day {}: invalid interval ({}, {})",
                day, start_time, end_time
            ));
        }
    }

    for pair in intervals.windows(2) {
        if pair[1].get_start_time() < pair[0].get_end_time() {
            return Err(format!(
                "day {}: intervals overlap at {}",
                day,
                pair[1].get_start_time()
            ));
        }
    }

    Ok(())
}

pub fn user_to_yaml(user: &User, locations: &[&UserLocation]) -> Yaml {
    let mut user_hash = LinkedHashMap::new();

    user_hash.insert(key("id"), Yaml::String(user.get_id().to_string()));
    user_hash.insert(
        key("display_name"),
        Yaml::String(user.get_display_name().to_string()),
    );
    user_hash.insert(key("email"), Yaml::String(user.get_email().to_string()));
    user_hash.insert(
        key("password_salt"),
        Yaml::String(user.get_password().get_salt().to_string()),
    );
    user_hash.insert(
        key("password_digest"),
        Yaml::String(user.get_password().get_digest().to_string()),
    );
    user_hash.insert(key("therapist"), Yaml::Boolean(user.get_therapist()));
    if let Some(sex) = user.get_sex() {
        user_hash.insert(key("sex"), Yaml::String(sex.to_string()));
    }
    user_hash.insert(key("aba_course"), Yaml::Boolean(user.get_aba_course()));
    user_hash.insert(
        key("code_of_conduct"),
        Yaml::Boolean(user.get_code_of_conduct()),
    );
    user_hash.insert(key("verified"), Yaml::Boolean(user.get_verified()));
    user_hash.insert(key("moderator"), Yaml::Boolean(user.get_moderator()));
    if let Some(phone) = user.get_phone() {
        // i64に収まらない番号は存在しない前提
        user_hash.insert(key("phone"), Yaml::Integer(phone as i64));
    }

    if !locations.is_empty() {
        let locations_yaml = locations
            .iter()
            .map(|l| Yaml::String(l.get_location().get_name().to_string()))
            .collect();
        user_hash.insert(key("locations"), Yaml::Array(locations_yaml));
    }

    Yaml::Hash(user_hash)
}

pub fn yaml_to_user(yaml: &Yaml) -> Result<(User, Vec<UserLocation>), String> {
    let id = require_uuid(yaml, "id")?;
    let password = PasswordDigest::from_parts(
        require_str(yaml, "password_salt")?.to_string(),
        require_str(yaml, "password_digest")?.to_string(),
    );

    // 省略可能な項目
    let sex = yaml["sex"].as_str().and_then(read_sex);
    let phone = yaml["phone"].as_i64().and_then(|p| u64::try_from(p).ok());
    let verified = yaml["verified"].as_bool().unwrap_or(false);
    let moderator = yaml["moderator"].as_bool().unwrap_or(false);

    let user = User::from_parts(
        id,
        require_str(yaml, "display_name")?.to_string(),
        require_str(yaml, "email")?.to_string(),
        password,
        require_bool(yaml, "therapist")?,
        sex,
        require_bool(yaml, "aba_course")?,
        require_bool(yaml, "code_of_conduct")?,
        verified,
        moderator,
        phone,
    );

    let mut locations = vec![];
    for location_yaml in yaml["locations"].as_vec().unwrap_or(&vec![]) {
        let name = location_yaml
            .as_str()
            .ok_or_else(|| "'locations' must be a list of strings".to_string())?;
        let location = Location::new(name).map_err(|e| e.to_string())?;
        locations.push(UserLocation::new(id, location));
    }

    Ok((user, locations))
}

#[cfg(test)]
use crate::entity::user::Sex;

#[cfg(test)]
use yaml_rust::YamlEmitter;

#[cfg(test)]
fn reparse(yaml: &Yaml) -> Yaml {
    let mut out_str = String::new();
    YamlEmitter::new(&mut out_str).dump(yaml).unwrap();
    YamlLoader::load_from_str(&out_str).unwrap().remove(0)
}

#[test]
fn test_schedule_to_yaml_書き出して読み戻すと同じ予定表になること() {
    let mut schedule = WeekSchedule::new(Uuid::new_v4(), true);
    schedule.assign_id();
    schedule.set_availability(2, 100, 200, true).unwrap();
    schedule
        .get_day_mut(6)
        .unwrap()
        .set_abbrev("Su")
        .unwrap();

    let actual = yaml_to_schedule(&reparse(&schedule_to_yaml(&schedule))).unwrap();

    assert_eq!(actual, schedule);
    assert_eq!(actual.is_available(2, 100, 130), Ok(true));
}

#[test]
#[allow(non_snake_case)]
fn test_yaml_to_schedule_idが無い場合はNoneとなること() {
    let schedule = WeekSchedule::new(Uuid::new_v4(), false);

    let actual = yaml_to_schedule(&reparse(&schedule_to_yaml(&schedule))).unwrap();

    assert_eq!(actual.get_id(), None);
    assert!(!actual.is_enabled());
}

#[test]
fn test_yaml_to_schedule_曜日が足りない場合() {
    let s = "
owner: '67e55044-10b1-426f-9247-bb680e5fe0c8'
enabled: true
days:
  - day: 0
    name: 'Monday'
    abbreviation: 'Mon'
    interval_minutes: 30
    intervals: []
";
    let docs = YamlLoader::load_from_str(s).unwrap();

    assert!(yaml_to_schedule(&docs[0]).is_err());
}

#[test]
fn test_yaml_to_day_区間が重なっている場合() {
    let s = "
day: 0
name: 'Monday'
abbreviation: 'Mon'
interval_minutes: 30
intervals:
  - { start_time: 0, end_time: 30, available: true }
  - { start_time: 15, end_time: 100, available: false }
";
    let docs = YamlLoader::load_from_str(s).unwrap();

    let actual = yaml_to_day(&docs[0]);
    assert!(actual.unwrap_err().contains("overlap"));
}

#[test]
fn test_yaml_to_day_時を跨ぐ区間() {
    let s = "
day: 0
name: 'Monday'
abbreviation: 'Mon'
interval_minutes: 30
intervals:
  - { start_time: 0, end_time: 130, available: true }
";
    let docs = YamlLoader::load_from_str(s).unwrap();

    assert!(yaml_to_day(&docs[0]).is_err());
}

#[test]
fn test_yaml_to_day_軍用時刻で表せない区間() {
    let s = "
day: 0
name: 'Monday'
abbreviation: 'Mon'
interval_minutes: 30
intervals:
  - { start_time: 0, end_time: 30, available: true }
  - { start_time: 4294967290, end_time: 4294967295, available: false }
";
    let docs = YamlLoader::load_from_str(s).unwrap();

    let actual = yaml_to_day(&docs[0]);
    assert!(actual.unwrap_err().contains("invalid interval"));
}

#[test]
fn test_yaml_to_day_40分刻みは隙間があっても受け付ける() {
    let day = DayGrid::new_with_layout(0, "Monday", 3, 40).unwrap();

    let actual = yaml_to_day(&reparse(&day_to_yaml(&day))).unwrap();
    assert_eq!(actual, day);
}

#[test]
fn test_user_to_yaml_書き出して読み戻すと同じユーザーになること() {
    let mut user = User::new(
        "Jane",
        "jane@email.com",
        "password",
        true,
        Some(Sex::Female),
        true,
        true,
    );
    user.set_phone(Some(7095551234)).set_verified(true);
    let location = UserLocation::new(user.get_id(), Location::new("Somewhere").unwrap());

    let (actual, locations) = yaml_to_user(&reparse(&user_to_yaml(&user, &[&location]))).unwrap();

    assert_eq!(actual, user);
    assert!(actual.verify_password("password"));
    assert_eq!(locations, vec![location]);
}

#[test]
fn test_yaml_to_user_省略可能な項目が無い場合() {
    let s = "
id: '67e55044-10b1-426f-9247-bb680e5fe0c8'
display_name: 'John'
email: 'someone@email.com'
password_salt: 'abc'
password_digest: 'def'
therapist: false
aba_course: false
code_of_conduct: true
";
    let docs = YamlLoader::load_from_str(s).unwrap();

    let (user, locations) = yaml_to_user(&docs[0]).unwrap();
    assert_eq!(user.get_sex(), None);
    assert_eq!(user.get_phone(), None);
    assert!(!user.get_verified());
    assert!(!user.get_moderator());
    assert!(locations.is_empty());
}
