use crate::entity::error::ScheduleError;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    name: String,
}

impl Location {
    pub fn new(name: &str) -> Result<Self, ScheduleError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "location name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

// ユーザーと所在地の対応
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserLocation {
    user: Uuid,
    location: Location,
}

impl UserLocation {
    pub fn new(user: Uuid, location: Location) -> Self {
        Self { user, location }
    }

    pub fn get_user(&self) -> Uuid {
        self.user
    }

    pub fn set_user(&mut self, user: Uuid) -> &mut Self {
        self.user = user;
        self
    }

    pub fn get_location(&self) -> &Location {
        &self.location
    }

    pub fn set_location(&mut self, location: Location) -> &mut Self {
        self.location = location;
        self
    }
}

#[test]
fn test_location_new_空の名前は拒否される() {
    assert!(Location::new("").is_err());
    assert!(Location::new("   ").is_err());
    assert_eq!(Location::new(" Barçelona ").unwrap().get_name(), "Barçelona");
}

#[test]
fn test_user_location_setters() {
    let jane = Uuid::new_v4();
    let john = Uuid::new_v4();
    let mut user_location = UserLocation::new(jane, Location::new("Somewhere").unwrap());

    assert_eq!(user_location.get_user(), jane);
    assert_eq!(user_location.get_location().get_name(), "Somewhere");

    let barcelona = Location::new("Barçelona").unwrap();
    let actual = user_location
        .set_user(john)
        .set_location(barcelona.clone())
        .clone();

    assert_eq!(actual.get_user(), john);
    assert_eq!(actual.get_location(), &barcelona);
}
