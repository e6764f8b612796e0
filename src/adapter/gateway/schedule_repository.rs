use crate::adapter::gateway::error::RepositoryError;
use crate::adapter::gateway::memory_repository::insert_schedule;
use crate::adapter::gateway::storage::{read_documents, remove_document_dir, write_document};
use crate::adapter::gateway::yaml::{schedule_to_yaml, yaml_to_schedule};
use crate::application::interface::ScheduleRepositoryTrait;
use crate::entity::week_schedule::WeekSchedule;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

const SCHEDULE_FILE_NAME: &str = "schedule.yaml";
const ROOT_KEY: &str = "schedule";

// <storage_dir>/<schedule-id>/schedule.yaml に1予定表ずつ保存する
pub struct ScheduleRepository {
    schedules: Vec<WeekSchedule>,
    storage_dir: PathBuf,
    // 置き換えられて次の save で消す予定表
    removed_ids: Vec<Uuid>,
}

impl ScheduleRepository {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            schedules: vec![],
            storage_dir: storage_dir.to_path_buf(),
            removed_ids: vec![],
        }
    }

    pub fn get_storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn schedule_dir(&self, id: Uuid) -> PathBuf {
        self.storage_dir.join(id.to_string())
    }
}

impl ScheduleRepositoryTrait for ScheduleRepository {
    fn load(&mut self) -> Result<(), RepositoryError> {
        let mut schedules = vec![];
        let mut removed_ids = vec![];

        for (path, yaml) in read_documents(&self.storage_dir, SCHEDULE_FILE_NAME, ROOT_KEY)? {
            let schedule =
                yaml_to_schedule(&yaml).map_err(|reason| RepositoryError::malformed(&path, reason))?;
            if schedule.get_id().is_none() {
                return Err(RepositoryError::malformed(&path, "missing 'id'"));
            }

            let owner = schedule.get_owner();
            let (_, replaced) = insert_schedule(&mut schedules, schedule);
            if let Some(replaced) = replaced {
                warn!(%owner, %replaced, path = %path.display(), "more than one schedule for the same owner");
                // 残さなかった方は次の save で消す
                removed_ids.push(replaced);
            }
        }

        info!(n_schedules = schedules.len(), "schedules loaded");
        self.schedules = schedules;
        self.removed_ids = removed_ids;
        Ok(())
    }

    fn save(&mut self) -> Result<(), RepositoryError> {
        for schedule in self.schedules.iter_mut() {
            let id = schedule.assign_id();
            let dir = self.storage_dir.join(id.to_string());
            write_document(&dir, SCHEDULE_FILE_NAME, ROOT_KEY, schedule_to_yaml(schedule))?;
        }

        for id in std::mem::take(&mut self.removed_ids) {
            remove_document_dir(&self.schedule_dir(id))?;
        }

        info!(n_schedules = self.schedules.len(), "schedules saved");
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
        let (id, replaced) = insert_schedule(&mut self.schedules, schedule);
        if let Some(replaced) = replaced {
            self.removed_ids.push(replaced);
        }
        id
    }
}

#[cfg(test)]
use crate::adapter::gateway::storage::temp_storage_dir;

#[test]
fn test_load_同じ所有者の予定表が複数ある場合は1つにまとめられること() {
    let dir = temp_storage_dir();
    let owner = Uuid::new_v4();

    let mut ids = vec![];
    for enabled in [true, false] {
        let mut schedule = WeekSchedule::new(owner, enabled);
        let id = schedule.assign_id();
        write_document(
            &dir.join(id.to_string()),
            SCHEDULE_FILE_NAME,
            ROOT_KEY,
            schedule_to_yaml(&schedule),
        )
        .unwrap();
        ids.push(id);
    }

    let mut repository = ScheduleRepository::new(&dir);
    repository.load().unwrap();
    assert_eq!(repository.get_all().len(), 1);
    repository.save().unwrap();

    let remaining: Vec<&Uuid> = ids
        .iter()
        .filter(|id| dir.join(id.to_string()).exists())
        .collect();
    assert_eq!(remaining.len(), 1);

    let mut reloaded = ScheduleRepository::new(&dir);
    reloaded.load().unwrap();
    assert_eq!(reloaded.get_all().len(), 1);
    assert_eq!(
        reloaded.get_by_owner(owner).unwrap().get_id(),
        Some(*remaining[0])
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_save_保存した予定表を別のリポジトリで読み込めること() {
    let dir = temp_storage_dir();
    let owner = Uuid::new_v4();

    let mut repository = ScheduleRepository::new(&dir);
    let mut schedule = WeekSchedule::new(owner, true);
    schedule.set_availability(2, 100, 200, true).unwrap();
    let id = repository.insert(schedule);
    repository.save().unwrap();

    assert!(dir.join(id.to_string()).join(SCHEDULE_FILE_NAME).exists());

    let mut reloaded = ScheduleRepository::new(&dir);
    reloaded.load().unwrap();

    let actual = reloaded.get_by_id(id).unwrap();
    assert_eq!(actual.get_owner(), owner);
    assert_eq!(actual.is_available(2, 100, 130), Ok(true));
    assert_eq!(actual.is_available(2, 200, 230), Ok(false));
    assert_eq!(reloaded.get_by_owner(owner), repository.get_by_owner(owner));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_save_置き換えた予定表のファイルは削除されること() {
    let dir = temp_storage_dir();
    let owner = Uuid::new_v4();

    let mut repository = ScheduleRepository::new(&dir);
    let old_id = repository.insert(WeekSchedule::new(owner, true));
    repository.save().unwrap();
    let new_id = repository.insert(WeekSchedule::new(owner, false));
    repository.save().unwrap();

    assert!(!dir.join(old_id.to_string()).exists());

    let mut reloaded = ScheduleRepository::new(&dir);
    reloaded.load().unwrap();
    assert_eq!(reloaded.get_all().len(), 1);
    assert_eq!(reloaded.get_by_owner(owner).unwrap().get_id(), Some(new_id));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_壊れた文書は拒否されること() {
    let dir = temp_storage_dir();
    let schedule_dir = dir.join(Uuid::new_v4().to_string());
    std::fs::create_dir_all(&schedule_dir).unwrap();
    std::fs::write(
        schedule_dir.join(SCHEDULE_FILE_NAME),
        "schedule:\n  owner: 'not-a-uuid'\n  enabled: true\n  days: []\n",
    )
    .unwrap();

    let mut repository = ScheduleRepository::new(&dir);
    let actual = repository.load();
    assert!(matches!(actual, Err(RepositoryError::Malformed { .. })));

    std::fs::remove_dir_all(&dir).unwrap();
}
