use crate::adapter::gateway::error::RepositoryError;
use crate::adapter::gateway::memory_repository::{add_user_location, find_by_email, insert_user};
use crate::adapter::gateway::storage::{read_documents, write_document};
use crate::adapter::gateway::yaml::{user_to_yaml, yaml_to_user};
use crate::application::interface::UserRepositoryTrait;
use crate::entity::location::UserLocation;
use crate::entity::user::User;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const USER_FILE_NAME: &str = "user.yaml";
const ROOT_KEY: &str = "user";

// <storage_dir>/<user-id>/user.yaml に所在地と一緒に保存する
pub struct UserRepository {
    users: Vec<User>,
    user_locations: Vec<UserLocation>,
    storage_dir: PathBuf,
}

impl UserRepository {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            users: vec![],
            user_locations: vec![],
            storage_dir: storage_dir.to_path_buf(),
        }
    }
}

impl UserRepositoryTrait for UserRepository {
    fn load(&mut self) -> Result<(), RepositoryError> {
        let mut users = vec![];
        let mut user_locations = vec![];

        for (path, yaml) in read_documents(&self.storage_dir, USER_FILE_NAME, ROOT_KEY)? {
            let (user, locations) =
                yaml_to_user(&yaml).map_err(|reason| RepositoryError::malformed(&path, reason))?;
            insert_user(&mut users, user);
            for user_location in locations {
                add_user_location(&mut user_locations, user_location);
            }
        }

        info!(n_users = users.len(), "users loaded");
        self.users = users;
        self.user_locations = user_locations;
        Ok(())
    }

    fn save(&mut self) -> Result<(), RepositoryError> {
        for user in self.users.iter() {
            let locations = self.get_locations(user.get_id());
            let dir = self.storage_dir.join(user.get_id().to_string());
            write_document(&dir, USER_FILE_NAME, ROOT_KEY, user_to_yaml(user, &locations))?;
        }

        info!(n_users = self.users.len(), "users saved");
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

#[cfg(test)]
use crate::adapter::gateway::storage::temp_storage_dir;

#[cfg(test)]
use crate::entity::location::Location;

#[test]
fn test_save_保存したユーザーと所在地を読み込めること() {
    let dir = temp_storage_dir();

    let mut repository = UserRepository::new(&dir);
    let user = User::new("Jane", "jane@email.com", "password", true, None, true, true);
    let id = repository.insert(user);
    repository.add_location(UserLocation::new(id, Location::new("Somewhere").unwrap()));
    repository.save().unwrap();

    let mut reloaded = UserRepository::new(&dir);
    reloaded.load().unwrap();

    let actual = reloaded.get_by_email("jane@email.com").unwrap();
    assert_eq!(actual.get_id(), id);
    assert!(actual.verify_password("password"));
    assert_eq!(
        reloaded
            .get_locations(id)
            .into_iter()
            .map(|l| l.get_location().get_name())
            .collect::<Vec<_>>(),
        vec!["Somewhere"]
    );

    std::fs::remove_dir_all(&dir).unwrap();
}
