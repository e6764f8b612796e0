use crate::adapter::gateway::error::RepositoryError;
use crate::application::interface::{ScheduleRepositoryTrait, UserRepositoryTrait};
use crate::entity::location::UserLocation;
use crate::entity::user::User;
use crate::entity::week_schedule::WeekSchedule;
use tracing::debug;
use uuid::Uuid;

// ファイルに書き出さないリポジトリ。テストや一時的なセッション用
#[derive(Default)]
pub struct InMemoryScheduleRepository {
    schedules: Vec<WeekSchedule>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleRepositoryTrait for InMemoryScheduleRepository {
    fn load(&mut self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn save(&mut self) -> Result<(), RepositoryError> {
        debug!(n_schedules = self.schedules.len(), "nothing to persist");
        Ok(())
    }

    fn get_all(&self) -> Vec<&WeekSchedule> {
        self.schedules.iter().collect()
    }

    fn get_by_id(&self, id: Uuid) -> Option<&WeekSchedule> {
        self.schedules
            .iter()
            .find(|schedule| schedule.get_id() == Some(id))
    }

    fn get_by_owner(&self, owner: Uuid) -> Option<&WeekSchedule> {
        self.schedules
            .iter()
            .find(|schedule| schedule.get_owner() == owner)
    }

    fn get_by_owner_mut(&mut self, owner: Uuid) -> Option<&mut WeekSchedule> {
        self.schedules
            .iter_mut()
            .find(|schedule| schedule.get_owner() == owner)
    }

    fn insert(&mut self, schedule: WeekSchedule) -> Uuid {
        let (id, _replaced) = insert_schedule(&mut self.schedules, schedule);
        id
    }
}

// 所有者ごとに1つだけ保持する。既存のものは置き換え、そのidを返す
pub(crate) fn insert_schedule(
    schedules: &mut Vec<WeekSchedule>,
    mut schedule: WeekSchedule,
) -> (Uuid, Option<Uuid>) {
    let id = schedule.assign_id();
    let owner = schedule.get_owner();

    let replaced = schedules
        .iter()
        .position(|s| s.get_owner() == owner)
        .map(|index| schedules.remove(index))
        .and_then(|old| old.get_id())
        .filter(|old_id| *old_id != id);
    schedules.push(schedule);

    debug!(%id, %owner, ?replaced, "inserted schedule");
    (id, replaced)
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Vec<User>,
    user_locations: Vec<UserLocation>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepositoryTrait for InMemoryUserRepository {
    fn load(&mut self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn save(&mut self) -> Result<(), RepositoryError> {
        debug!(n_users = self.users.len(), "nothing to persist");
        Ok(())
    }

    fn get_all(&self) -> Vec<&User> {
        self.users.iter().collect()
    }

    fn get_by_id(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|user| user.get_id() == id)
    }

    fn get_by_id_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.get_id() == id)
    }

    fn get_by_email(&self, email: &str) -> Option<&User> {
        find_by_email(&self.users, email)
    }

    fn insert(&mut self, user: User) -> Uuid {
        insert_user(&mut self.users, user)
    }

    fn get_locations(&self, user: Uuid) -> Vec<&UserLocation> {
        self.user_locations
            .iter()
            .filter(|user_location| user_location.get_user() == user)
            .collect()
    }

    fn add_location(&mut self, user_location: UserLocation) {
        add_user_location(&mut self.user_locations, user_location);
    }
}

pub(crate) fn find_by_email<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
    users
        .iter()
        .find(|user| user.get_email().eq_ignore_ascii_case(email.trim()))
}

pub(crate) fn insert_user(users: &mut Vec<User>, user: User) -> Uuid {
    let id = user.get_id();
    users.retain(|u| u.get_id() != id);
    users.push(user);
    id
}

// 同じ場所は重複して登録しない
pub(crate) fn add_user_location(
    user_locations: &mut Vec<UserLocation>,
    user_location: UserLocation,
) {
    if !user_locations.contains(&user_location) {
        user_locations.push(user_location);
    }
}

#[cfg(test)]
use crate::entity::location::Location;

#[test]
fn test_insert_同じ所有者の予定表は置き換えられること() {
    let mut repository = InMemoryScheduleRepository::new();
    let owner = Uuid::new_v4();

    let first = repository.insert(WeekSchedule::new(owner, true));
    let second = repository.insert(WeekSchedule::new(owner, false));

    assert_ne!(first, second);
    assert_eq!(repository.get_all().len(), 1);
    assert!(repository.get_by_id(first).is_none());
    assert!(!repository.get_by_owner(owner).unwrap().is_enabled());
}

#[test]
fn test_get_by_email_大文字小文字を区別しない() {
    let mut repository = InMemoryUserRepository::new();
    let user = User::new("Jane", "jane@email.com", "password", true, None, true, true);
    let id = repository.insert(user);

    assert_eq!(
        repository.get_by_email("Jane@Email.com").map(|u| u.get_id()),
        Some(id)
    );
    assert!(repository.get_by_email("john@email.com").is_none());
}

#[test]
fn test_add_location_重複は登録されないこと() {
    let mut repository = InMemoryUserRepository::new();
    let user = Uuid::new_v4();
    let location = Location::new("Somewhere").unwrap();

    repository.add_location(UserLocation::new(user, location.clone()));
    repository.add_location(UserLocation::new(user, location));
    repository.add_location(UserLocation::new(Uuid::new_v4(), Location::new("Elsewhere").unwrap()));

    assert_eq!(repository.get_locations(user).len(), 1);
}
