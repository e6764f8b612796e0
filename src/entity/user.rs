use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

pub const MINIMUM_LENGTH_DISPLAY_NAME: usize = 1;
pub const MINIMUM_LENGTH_PHONE_NUMBER: usize = 10;
pub const MINIMUM_LENGTH_PASSWORD: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "M"),
            Sex::Female => write!(f, "F"),
        }
    }
}

pub fn read_sex(s: &str) -> Option<Sex> {
    match s.to_uppercase().as_str() {
        "M" => Some(Sex::Male),
        "F" => Some(Sex::Female),
        _ => None,
    }
}

// パスワードは塩付きのダイジェストとしてのみ保持する
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: String,
    digest: String,
}

impl PasswordDigest {
    pub fn new(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = digest_with_salt(&salt, password);
        Self { salt, digest }
    }

    pub fn from_parts(salt: String, digest: String) -> Self {
        Self { salt, digest }
    }

    pub fn verify(&self, password: &str) -> bool {
        digest_with_salt(&self.salt, password) == self.digest
    }

    pub fn get_salt(&self) -> &str {
        &self.salt
    }

    pub fn get_digest(&self) -> &str {
        &self.digest
    }
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    display_name: String,
    email: String,
    password: PasswordDigest,
    therapist: bool,
    sex: Option<Sex>,
    aba_course: bool,
    code_of_conduct: bool,
    verified: bool,
    moderator: bool,
    phone: Option<u64>,
}

impl User {
    pub fn new(
        display_name: &str,
        email: &str,
        password: &str,
        therapist: bool,
        sex: Option<Sex>,
        aba_course: bool,
        code_of_conduct: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            password: PasswordDigest::new(password),
            therapist,
            sex,
            aba_course,
            code_of_conduct,
            verified: false,
            moderator: false,
            phone: None,
        }
    }

    // 永続化された値から復元する
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        display_name: String,
        email: String,
        password: PasswordDigest,
        therapist: bool,
        sex: Option<Sex>,
        aba_course: bool,
        code_of_conduct: bool,
        verified: bool,
        moderator: bool,
        phone: Option<u64>,
    ) -> Self {
        Self {
            id,
            display_name,
            email,
            password,
            therapist,
            sex,
            aba_course,
            code_of_conduct,
            verified,
            moderator,
            phone,
        }
    }

    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: &str) -> &mut Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn get_email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: &str) -> &mut Self {
        self.email = email.to_string();
        self
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password.verify(password)
    }

    pub fn get_password(&self) -> &PasswordDigest {
        &self.password
    }

    pub fn get_therapist(&self) -> bool {
        self.therapist
    }

    pub fn set_therapist(&mut self, therapist: bool) -> &mut Self {
        self.therapist = therapist;
        self
    }

    pub fn get_sex(&self) -> Option<Sex> {
        self.sex
    }

    pub fn set_sex(&mut self, sex: Option<Sex>) -> &mut Self {
        self.sex = sex;
        self
    }

    pub fn get_aba_course(&self) -> bool {
        self.aba_course
    }

    pub fn set_aba_course(&mut self, aba_course: bool) -> &mut Self {
        self.aba_course = aba_course;
        self
    }

    pub fn get_code_of_conduct(&self) -> bool {
        self.code_of_conduct
    }

    pub fn set_code_of_conduct(&mut self, code_of_conduct: bool) -> &mut Self {
        self.code_of_conduct = code_of_conduct;
        self
    }

    pub fn get_verified(&self) -> bool {
        self.verified
    }

    pub fn set_verified(&mut self, verified: bool) -> &mut Self {
        self.verified = verified;
        self
    }

    pub fn get_moderator(&self) -> bool {
        self.moderator
    }

    pub fn set_moderator(&mut self, moderator: bool) -> &mut Self {
        self.moderator = moderator;
        self
    }

    pub fn get_phone(&self) -> Option<u64> {
        self.phone
    }

    pub fn set_phone(&mut self, phone: Option<u64>) -> &mut Self {
        self.phone = phone;
        self
    }
}

#[cfg(test)]
fn jane() -> User {
    User::new(
        "Jane",
        "jane@email.com",
        "password",
        true,
        Some(Sex::Female),
        true,
        true,
    )
}

#[test]
fn test_new_初期値() {
    let user = jane();

    assert_eq!(user.get_display_name(), "Jane");
    assert_eq!(user.get_email(), "jane@email.com");
    assert!(user.get_therapist());
    assert_eq!(user.get_sex(), Some(Sex::Female));
    assert!(user.get_aba_course());
    assert!(user.get_code_of_conduct());
    assert!(!user.get_verified());
    assert!(!user.get_moderator());
    assert_eq!(user.get_phone(), None);
}

#[test]
fn test_setters_連鎖して書き換えられること() {
    let mut user = jane();
    user.set_display_name("Mary")
        .set_email("somebody@email.com")
        .set_therapist(false)
        .set_sex(None)
        .set_aba_course(false)
        .set_code_of_conduct(false)
        .set_verified(true)
        .set_moderator(true)
        .set_phone(Some(7095551234));

    assert_eq!(user.get_display_name(), "Mary");
    assert_eq!(user.get_email(), "somebody@email.com");
    assert!(!user.get_therapist());
    assert_eq!(user.get_sex(), None);
    assert!(!user.get_aba_course());
    assert!(!user.get_code_of_conduct());
    assert!(user.get_verified());
    assert!(user.get_moderator());
    assert_eq!(user.get_phone(), Some(7095551234));
}

#[test]
fn test_verify_password_正しいパスワードのみ通ること() {
    let user = jane();

    assert!(user.verify_password("password"));
    assert!(!user.verify_password("Password"));
    assert!(!user.verify_password(""));
}

#[test]
fn test_password_digest_平文を保持しないこと() {
    let digest = PasswordDigest::new("password");

    assert_ne!(digest.get_digest(), "password");
    assert_eq!(digest.get_digest().len(), 64);
    // 同じパスワードでも塩が異なればダイジェストも異なる
    assert_ne!(PasswordDigest::new("password"), digest);
}

#[test]
fn test_read_sex_大文字小文字を区別しない() {
    assert_eq!(read_sex("f"), Some(Sex::Female));
    assert_eq!(read_sex("M"), Some(Sex::Male));
    assert_eq!(read_sex("x"), None);
}
