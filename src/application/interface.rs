use crate::adapter::gateway::error::RepositoryError;
use crate::entity::location::UserLocation;
use crate::entity::user::User;
use crate::entity::week_schedule::WeekSchedule;
use uuid::Uuid;

// 予定表は曜日・区間ごと丸ごと読み書きする
pub trait ScheduleRepositoryTrait {
    fn load(&mut self) -> Result<(), RepositoryError>;
    fn save(&mut self) -> Result<(), RepositoryError>;
    fn get_all(&self) -> Vec<&WeekSchedule>;
    fn get_by_id(&self, id: Uuid) -> Option<&WeekSchedule>;
    fn get_by_owner(&self, owner: Uuid) -> Option<&WeekSchedule>;
    fn get_by_owner_mut(&mut self, owner: Uuid) -> Option<&mut WeekSchedule>;
    fn insert(&mut self, schedule: WeekSchedule) -> Uuid;
}

pub trait UserRepositoryTrait {
    fn load(&mut self) -> Result<(), RepositoryError>;
    fn save(&mut self) -> Result<(), RepositoryError>;
    fn get_all(&self) -> Vec<&User>;
    fn get_by_id(&self, id: Uuid) -> Option<&User>;
    fn get_by_id_mut(&mut self, id: Uuid) -> Option<&mut User>;
    fn get_by_email(&self, email: &str) -> Option<&User>;
    fn insert(&mut self, user: User) -> Uuid;
    fn get_locations(&self, user: Uuid) -> Vec<&UserLocation>;
    fn add_location(&mut self, user_location: UserLocation);
}
