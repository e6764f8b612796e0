use crate::application::error::ApplicationError;
use crate::application::interface::ScheduleRepositoryTrait;
use tracing::{debug, info};
use uuid::Uuid;

// 読み込み → 変更 → 予定表ごと保存
pub fn set_user_availability(
    schedule_repository: &mut dyn ScheduleRepositoryTrait,
    owner: Uuid,
    day: usize,
    start_time: u32,
    end_time: u32,
    available: bool,
) -> Result<(), ApplicationError> {
    let schedule = schedule_repository
        .get_by_owner_mut(owner)
        .ok_or_else(|| ApplicationError::schedule_not_found(owner))?;

    schedule.set_availability(day, start_time, end_time, available)?;
    schedule_repository.save()?;

    info!(%owner, day, start_time, end_time, available, "availability updated");
    Ok(())
}

pub fn is_user_available(
    schedule_repository: &dyn ScheduleRepositoryTrait,
    owner: Uuid,
    day: usize,
    start_time: u32,
    end_time: u32,
) -> Result<bool, ApplicationError> {
    let schedule = schedule_repository
        .get_by_owner(owner)
        .ok_or_else(|| ApplicationError::schedule_not_found(owner))?;

    Ok(schedule.is_available(day, start_time, end_time)?)
}

pub fn set_schedule_enabled(
    schedule_repository: &mut dyn ScheduleRepositoryTrait,
    owner: Uuid,
    enabled: bool,
) -> Result<(), ApplicationError> {
    let schedule = schedule_repository
        .get_by_owner_mut(owner)
        .ok_or_else(|| ApplicationError::schedule_not_found(owner))?;

    if enabled {
        schedule.enable();
    } else {
        schedule.disable();
    }
    schedule_repository.save()?;

    info!(%owner, enabled, "schedule toggled");
    Ok(())
}

/// Returns the owners of every enabled schedule that is available for the
/// whole range, ordered by owner id.
pub fn find_available_users(
    schedule_repository: &dyn ScheduleRepositoryTrait,
    day: usize,
    start_time: u32,
    end_time: u32,
) -> Result<Vec<Uuid>, ApplicationError> {
    let mut owners = vec![];

    for schedule in schedule_repository.get_all() {
        if !schedule.is_enabled() {
            continue;
        }
        if schedule.is_available(day, start_time, end_time)? {
            owners.push(schedule.get_owner());
        }
    }
    owners.sort();

    debug!(day, start_time, end_time, n_matches = owners.len(), "searched availability");
    Ok(owners)
}

#[cfg(test)]
use crate::adapter::gateway::memory_repository::InMemoryScheduleRepository;

#[cfg(test)]
use crate::entity::week_schedule::WeekSchedule;

#[test]
fn test_set_user_availability_保存後に問い合わせると真() {
    let mut repository = InMemoryScheduleRepository::new();
    let owner = Uuid::new_v4();
    repository.insert(WeekSchedule::new(owner, true));

    set_user_availability(&mut repository, owner, 2, 100, 200, true).unwrap();

    assert!(is_user_available(&repository, owner, 2, 100, 130).unwrap());
    assert!(!is_user_available(&repository, owner, 2, 200, 230).unwrap());
}

#[test]
fn test_set_user_availability_予定表が無い場合() {
    let mut repository = InMemoryScheduleRepository::new();

    let actual = set_user_availability(&mut repository, Uuid::new_v4(), 2, 100, 200, true);
    assert!(matches!(actual, Err(ApplicationError::NotFound { .. })));
}

#[test]
fn test_set_user_availability_不正な範囲() {
    let mut repository = InMemoryScheduleRepository::new();
    let owner = Uuid::new_v4();
    repository.insert(WeekSchedule::new(owner, true));

    let actual = set_user_availability(&mut repository, owner, 2, 200, 100, true);
    assert!(matches!(actual, Err(ApplicationError::Schedule(_))));
}

#[test]
fn test_find_available_users_無効な予定表は対象外() {
    let mut repository = InMemoryScheduleRepository::new();
    let owners: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

    for owner in owners.iter() {
        let mut schedule = WeekSchedule::new(*owner, true);
        schedule.set_availability(0, 900, 1700, true).unwrap();
        repository.insert(schedule);
    }
    set_schedule_enabled(&mut repository, owners[1], false).unwrap();
    set_user_availability(&mut repository, owners[2], 0, 1200, 1300, false).unwrap();

    let actual = find_available_users(&repository, 0, 1000, 1100).unwrap();
    let mut expected = vec![owners[0], owners[2]];
    expected.sort();
    assert_eq!(actual, expected);

    let actual = find_available_users(&repository, 0, 1200, 1300).unwrap();
    assert_eq!(actual, vec![owners[0]]);

    // 月曜日以外は誰も空いていない
    assert!(find_available_users(&repository, 1, 1000, 1100)
        .unwrap()
        .is_empty());
}
