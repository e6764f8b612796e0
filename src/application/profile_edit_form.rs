use crate::application::error::ApplicationError;
use crate::application::interface::UserRepositoryTrait;
use crate::entity::user::{User, MINIMUM_LENGTH_DISPLAY_NAME, MINIMUM_LENGTH_PHONE_NUMBER};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{error, info};
use uuid::Uuid;

pub const MESSAGE_INVALID_DISPLAY_NAME: &str = "The entered display name is invalid.";
pub const MESSAGE_INVALID_EMAIL_ADDRESS: &str = "The entered email address is not valid.";
pub const MESSAGE_INVALID_PHONE_NUMBER: &str = "The entered phone number is not valid.";

// 定数なので構築に失敗しないことはテストで確認している
fn email_pattern() -> Result<&'static Regex, &'static regex::Error> {
    static EMAIL_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    EMAIL_PATTERN
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        })
        .as_ref()
}

// 英数字と空白のみ残す
pub fn filter_display_name(display_name: &str) -> String {
    display_name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

pub fn filter_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_display_name_valid(display_name: &str) -> bool {
    let filtered = filter_display_name(display_name.trim());
    !filtered.trim().is_empty() && filtered.chars().count() >= MINIMUM_LENGTH_DISPLAY_NAME
}

pub fn is_email_address_valid(email: &str) -> bool {
    match email_pattern() {
        Ok(pattern) => pattern.is_match(email.trim()),
        Err(err) => {
            error!(%err, "email pattern is unusable");
            false
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileEditData {
    pub display_name: String,
    pub email: String,
    pub phone: String,
}

/// Form for editing a user's display name, email address and phone number.
#[derive(Clone, Debug)]
pub struct ProfileEditForm {
    data: ProfileEditData,
    message: Option<String>,
    // 検証済みならその結果
    validated: Option<bool>,
}

impl ProfileEditForm {
    pub fn new(user: &User) -> Self {
        let data = ProfileEditData {
            display_name: user.get_display_name().to_string(),
            email: user.get_email().to_string(),
            phone: user.get_phone().map(|p| p.to_string()).unwrap_or_default(),
        };

        Self {
            data,
            message: None,
            validated: None,
        }
    }

    pub fn set_data(&mut self, display_name: &str, email: &str, phone: &str) -> &mut Self {
        self.data = ProfileEditData {
            display_name: display_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };
        self.message = None;
        self.validated = None;
        self
    }

    pub fn get_data(&self) -> &ProfileEditData {
        &self.data
    }

    pub fn is_valid(&mut self) -> bool {
        if let Some(is_valid) = self.validated {
            return is_valid;
        }

        self.data.display_name = self.data.display_name.trim().to_string();
        self.data.email = self.data.email.trim().to_string();
        self.data.phone = self.data.phone.trim().to_string();

        // 最初に見つかった誤りのみ報告する
        let is_valid = self.is_display_name_valid()
            && self.is_email_address_valid()
            && self.is_phone_number_valid();

        self.validated = Some(is_valid);
        is_valid
    }

    fn is_display_name_valid(&mut self) -> bool {
        let is_valid = is_display_name_valid(&self.data.display_name);
        if !is_valid {
            self.message = Some(MESSAGE_INVALID_DISPLAY_NAME.to_string());
        }
        is_valid
    }

    fn is_email_address_valid(&mut self) -> bool {
        let is_valid = is_email_address_valid(&self.data.email);
        if !is_valid {
            self.message = Some(MESSAGE_INVALID_EMAIL_ADDRESS.to_string());
        }
        is_valid
    }

    // 数字以外は取り除く。空なら省略されたものとみなす
    fn is_phone_number_valid(&mut self) -> bool {
        let phone = filter_digits(&self.data.phone);
        self.data.phone = phone;

        if !self.data.phone.is_empty()
            && (self.data.phone.len() < MINIMUM_LENGTH_PHONE_NUMBER
                || self.data.phone.parse::<u64>().is_err())
        {
            self.message = Some(MESSAGE_INVALID_PHONE_NUMBER.to_string());
            return false;
        }
        true
    }

    pub fn get_message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn update_user(&self, user: &mut User) -> bool {
        if self.validated != Some(true) {
            return false;
        }

        user.set_display_name(&self.data.display_name)
            .set_email(&self.data.email);
        if let Ok(phone) = self.data.phone.parse::<u64>() {
            user.set_phone(Some(phone));
        }
        true
    }
}

// 検証 → 反映 → 保存。検証に失敗した場合は Ok(false)
pub fn edit_profile(
    user_repository: &mut dyn UserRepositoryTrait,
    user_id: Uuid,
    form: &mut ProfileEditForm,
) -> Result<bool, ApplicationError> {
    if !form.is_valid() {
        return Ok(false);
    }

    if let Some(other) = user_repository.get_by_email(&form.get_data().email) {
        if other.get_id() != user_id {
            return Err(ApplicationError::Validation(format!(
                "{} is already registered",
                form.get_data().email
            )));
        }
    }

    let user = user_repository
        .get_by_id_mut(user_id)
        .ok_or_else(|| ApplicationError::user_not_found(user_id))?;
    let updated = form.update_user(user);
    user_repository.save()?;

    info!(%user_id, "profile updated");
    Ok(updated)
}

#[cfg(test)]
use crate::adapter::gateway::memory_repository::InMemoryUserRepository;

#[cfg(test)]
fn jane() -> User {
    User::new("Jane", "jane@email.com", "password", true, None, true, true)
}

#[test]
fn test_email_pattern_正規表現が構築できること() {
    assert!(email_pattern().is_ok());
    assert!(is_email_address_valid("jane@email.com"));
}

#[test]
fn test_new_ユーザーの値で初期化されること() {
    let mut user = jane();
    user.set_phone(Some(7095551234));

    let form = ProfileEditForm::new(&user);
    assert_eq!(
        form.get_data(),
        &ProfileEditData {
            display_name: "Jane".to_string(),
            email: "jane@email.com".to_string(),
            phone: "7095551234".to_string(),
        }
    );
    assert_eq!(form.get_message(), "");
}

#[test]
fn test_is_valid_前後の空白は取り除かれること() {
    let mut form = ProfileEditForm::new(&jane());
    form.set_data("  Mary Jane  ", " mary@email.com ", " (709) 555-1234 ");

    assert!(form.is_valid());
    assert_eq!(form.get_data().display_name, "Mary Jane");
    assert_eq!(form.get_data().email, "mary@email.com");
    assert_eq!(form.get_data().phone, "7095551234");
}

#[test]
fn test_is_valid_表示名が記号のみの場合() {
    let mut form = ProfileEditForm::new(&jane());
    form.set_data("!!!", "not an email", "");

    assert!(!form.is_valid());
    // 最初の誤りのみ報告される
    assert_eq!(form.get_message(), MESSAGE_INVALID_DISPLAY_NAME);
}

#[test]
fn test_is_valid_メールアドレスが不正な場合() {
    let mut form = ProfileEditForm::new(&jane());

    for email in ["", "jane", "jane@", "@email.com", "jane@email", "ja ne@email.com"] {
        form.set_data("Jane", email, "");
        assert!(!form.is_valid(), "{}", email);
        assert_eq!(form.get_message(), MESSAGE_INVALID_EMAIL_ADDRESS);
    }
}

#[test]
fn test_is_valid_電話番号は省略できること() {
    let mut form = ProfileEditForm::new(&jane());
    form.set_data("Jane", "jane@email.com", "");

    assert!(form.is_valid());
}

#[test]
fn test_is_valid_電話番号が短い場合() {
    let mut form = ProfileEditForm::new(&jane());
    form.set_data("Jane", "jane@email.com", "555-1234");

    assert!(!form.is_valid());
    assert_eq!(form.get_message(), MESSAGE_INVALID_PHONE_NUMBER);
}

#[test]
fn test_is_valid_結果は新しい値が設定されるまで保持される() {
    let mut form = ProfileEditForm::new(&jane());
    form.set_data("", "jane@email.com", "");
    assert!(!form.is_valid());

    // 直接書き換えても再検証されない
    form.data.display_name = "Jane".to_string();
    assert!(!form.is_valid());

    form.set_data("Jane", "jane@email.com", "");
    assert!(form.is_valid());
    assert_eq!(form.get_message(), "");
}

#[test]
fn test_update_user_未検証の場合は更新しない() {
    let mut user = jane();
    let mut form = ProfileEditForm::new(&user);
    form.set_data("Mary", "mary@email.com", "");

    assert!(!form.update_user(&mut user));
    assert_eq!(user.get_display_name(), "Jane");
}

#[test]
fn test_update_user_電話番号が空なら元の番号を残す() {
    let mut user = jane();
    user.set_phone(Some(7095551234));
    let mut form = ProfileEditForm::new(&user);
    form.set_data("Mary", "mary@email.com", "");

    assert!(form.is_valid());
    assert!(form.update_user(&mut user));
    assert_eq!(user.get_display_name(), "Mary");
    assert_eq!(user.get_email(), "mary@email.com");
    assert_eq!(user.get_phone(), Some(7095551234));
}

#[test]
fn test_edit_profile_他のユーザーのメールアドレスは使えない() {
    let mut repository = InMemoryUserRepository::new();
    let jane_id = repository.insert(jane());
    repository.insert(User::new("John", "john@email.com", "password", false, None, false, true));

    let mut form = ProfileEditForm::new(repository.get_by_id(jane_id).unwrap());
    form.set_data("Jane", "john@email.com", "");

    let actual = edit_profile(&mut repository, jane_id, &mut form);
    assert!(matches!(actual, Err(ApplicationError::Validation(_))));

    form.set_data("Jane Doe", "jane@email.com", "7095551234");
    assert!(edit_profile(&mut repository, jane_id, &mut form).unwrap());

    let user = repository.get_by_id(jane_id).unwrap();
    assert_eq!(user.get_display_name(), "Jane Doe");
    assert_eq!(user.get_phone(), Some(7095551234));
}
