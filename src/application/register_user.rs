use crate::application::error::ApplicationError;
use crate::application::interface::{ScheduleRepositoryTrait, UserRepositoryTrait};
use crate::application::profile_edit_form::{
    is_display_name_valid, is_email_address_valid, MESSAGE_INVALID_DISPLAY_NAME,
    MESSAGE_INVALID_EMAIL_ADDRESS,
};
use crate::entity::user::{Sex, User, MINIMUM_LENGTH_PASSWORD};
use crate::entity::week_schedule::{WeekSchedule, NUMBER_OF_DAYS};
use tracing::info;
use uuid::Uuid;

pub struct Registration<'a> {
    pub display_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub therapist: bool,
    pub sex: Option<Sex>,
    pub aba_course: bool,
    pub code_of_conduct: bool,
}

// 曜日表と区間の長さは設定から注入する
pub struct ScheduleLayout<'a> {
    pub week: &'a [&'a str; NUMBER_OF_DAYS],
    pub hours: u32,
    pub interval_minutes: u32,
}

/// Creates a user together with an enabled, empty schedule and saves both.
pub fn register_user(
    user_repository: &mut dyn UserRepositoryTrait,
    schedule_repository: &mut dyn ScheduleRepositoryTrait,
    registration: &Registration,
    layout: &ScheduleLayout,
) -> Result<Uuid, ApplicationError> {
    if !is_display_name_valid(registration.display_name) {
        return Err(ApplicationError::Validation(
            MESSAGE_INVALID_DISPLAY_NAME.to_string(),
        ));
    }
    if !is_email_address_valid(registration.email) {
        return Err(ApplicationError::Validation(
            MESSAGE_INVALID_EMAIL_ADDRESS.to_string(),
        ));
    }
    if registration.password.chars().count() < MINIMUM_LENGTH_PASSWORD {
        return Err(ApplicationError::Validation(format!(
            "The password must be at least {} characters long.",
            MINIMUM_LENGTH_PASSWORD
        )));
    }
    if user_repository.get_by_email(registration.email).is_some() {
        return Err(ApplicationError::Validation(format!(
            "{} is already registered",
            registration.email.trim()
        )));
    }

    let user = User::new(
        registration.display_name.trim(),
        registration.email.trim(),
        registration.password,
        registration.therapist,
        registration.sex,
        registration.aba_course,
        registration.code_of_conduct,
    );
    let schedule = WeekSchedule::new_with_layout(
        user.get_id(),
        true,
        layout.week,
        layout.hours,
        layout.interval_minutes,
    )?;

    let user_id = user_repository.insert(user);
    let schedule_id = schedule_repository.insert(schedule);
    user_repository.save()?;
    schedule_repository.save()?;

    info!(%user_id, %schedule_id, therapist = registration.therapist, "user registered");
    Ok(user_id)
}

#[cfg(test)]
use crate::adapter::gateway::memory_repository::{
    InMemoryScheduleRepository, InMemoryUserRepository,
};

#[cfg(test)]
use crate::entity::week_schedule::WEEK;

#[cfg(test)]
fn jane<'a>() -> Registration<'a> {
    Registration {
        display_name: "Jane",
        email: "jane@email.com",
        password: "password",
        therapist: true,
        sex: Some(Sex::Female),
        aba_course: true,
        code_of_conduct: true,
    }
}

#[cfg(test)]
const LAYOUT: ScheduleLayout<'static> = ScheduleLayout {
    week: &WEEK,
    hours: 24,
    interval_minutes: 30,
};

#[test]
fn test_register_user_ユーザーと予定表が作られること() {
    let mut users = InMemoryUserRepository::new();
    let mut schedules = InMemoryScheduleRepository::new();

    let id = register_user(&mut users, &mut schedules, &jane(), &LAYOUT).unwrap();

    let user = users.get_by_id(id).unwrap();
    assert!(user.verify_password("password"));
    let schedule = schedules.get_by_owner(id).unwrap();
    assert!(schedule.is_enabled());
    assert!(schedule.get_id().is_some());
    assert_eq!(schedule.get_number_of_days(), 7);
}

#[test]
fn test_register_user_同じメールアドレスは登録できない() {
    let mut users = InMemoryUserRepository::new();
    let mut schedules = InMemoryScheduleRepository::new();
    register_user(&mut users, &mut schedules, &jane(), &LAYOUT).unwrap();

    let actual = register_user(&mut users, &mut schedules, &jane(), &LAYOUT);
    assert!(matches!(actual, Err(ApplicationError::Validation(_))));
    assert_eq!(users.get_all().len(), 1);
}

#[test]
fn test_register_user_パスワードが短い場合() {
    let mut users = InMemoryUserRepository::new();
    let mut schedules = InMemoryScheduleRepository::new();
    let registration = Registration {
        password: "secret",
        ..jane()
    };

    let actual = register_user(&mut users, &mut schedules, &registration, &LAYOUT);
    assert!(matches!(actual, Err(ApplicationError::Validation(_))));
    assert!(schedules.get_all().is_empty());
}

#[test]
fn test_register_user_区間の長さが0の場合は何も保存しない() {
    let mut users = InMemoryUserRepository::new();
    let mut schedules = InMemoryScheduleRepository::new();
    let layout = ScheduleLayout {
        interval_minutes: 0,
        ..LAYOUT
    };

    let actual = register_user(&mut users, &mut schedules, &jane(), &layout);
    assert!(matches!(actual, Err(ApplicationError::Schedule(_))));
    assert!(users.get_all().is_empty());
}
