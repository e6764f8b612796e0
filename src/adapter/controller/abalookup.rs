use abalookup::adapter::gateway::config::AppConfig;
use abalookup::adapter::gateway::schedule_repository::ScheduleRepository;
use abalookup::adapter::gateway::user_repository::UserRepository;
use abalookup::application::availability::{
    find_available_users, is_user_available, set_schedule_enabled, set_user_availability,
};
use abalookup::application::error::ApplicationError;
use abalookup::application::interface::{ScheduleRepositoryTrait, UserRepositoryTrait};
use abalookup::application::profile_edit_form::{edit_profile, ProfileEditForm};
use abalookup::application::register_user::{register_user, Registration, ScheduleLayout};
use abalookup::application::render_week::render_week;
use abalookup::entity::location::{Location, UserLocation};
use abalookup::entity::military_time;
use abalookup::entity::week_schedule::WEEK;
use regex::Regex;
use std::io::{stdin, stdout, BufRead, Write};
use termion::style;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

const HEADER: &str = "abalookup>";

const HELP: &str = "\
register <email> <password> <therapist|client> <display name...>
login <email> <password>
avail <day> <start> <end> on|off
check <day> <start> <end>
enable | disable
week
who <day> <start> <end>
profile <email> <phone|-> <display name...>
location <name...>
save
quit";

#[derive(Default)]
struct Session {
    user: Option<Uuid>,
}

enum Reply {
    Text(String),
    Quit,
}

// 曜日は番号 (0-6) か、3文字以上の名前の先頭部分で指定する
fn parse_day(token: &str) -> Option<usize> {
    if let Ok(day) = token.parse::<usize>() {
        return if day < WEEK.len() { Some(day) } else { None };
    }

    let lc = token.to_lowercase();
    if lc.chars().count() < 3 {
        return None;
    }
    WEEK.iter()
        .position(|name| name.to_lowercase().starts_with(&lc))
}

#[test]
fn test_parse_day_正常系() {
    assert_eq!(parse_day("0"), Some(0));
    assert_eq!(parse_day("6"), Some(6));
    assert_eq!(parse_day("wed"), Some(2));
    assert_eq!(parse_day("Thursday"), Some(3));
}

#[test]
fn test_parse_day_異常系() {
    assert_eq!(parse_day("7"), None);
    assert_eq!(parse_day("t"), None);
    assert_eq!(parse_day("Monday!"), None);
}

fn parse_range(tokens: &[&str]) -> Result<(usize, u32, u32), ApplicationError> {
    if tokens.len() < 3 {
        return Err(usage("<day> <start> <end>"));
    }

    let day = parse_day(tokens[0])
        .ok_or_else(|| ApplicationError::Validation(format!("unknown day: {}", tokens[0])))?;
    let start_time = military_time::parse(tokens[1])
        .ok_or_else(|| ApplicationError::Validation(format!("invalid time: {}", tokens[1])))?;
    let end_time = military_time::parse(tokens[2])
        .ok_or_else(|| ApplicationError::Validation(format!("invalid time: {}", tokens[2])))?;

    Ok((day, start_time, end_time))
}

#[test]
fn test_parse_range_正常系() {
    let actual = parse_range(&["fri", "9:00", "1730"]).unwrap();
    assert_eq!(actual, (4, 900, 1730));
}

#[test]
fn test_parse_range_異常系() {
    assert!(parse_range(&["fri", "9:00"]).is_err());
    assert!(parse_range(&["someday", "9:00", "10:00"]).is_err());
    assert!(parse_range(&["fri", "9:75", "10:00"]).is_err());
}

fn usage(args: &str) -> ApplicationError {
    ApplicationError::Validation(format!("usage: {}", args))
}

// 全角文字を含む表示名でも列が揃うように幅で詰める
fn pad_to_width(s: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(current)))
}

#[test]
fn test_pad_to_width_全角文字() {
    assert_eq!(pad_to_width("Jane", 6), "Jane  ");
    assert_eq!(pad_to_width("山田", 6), "山田  ");
    assert_eq!(pad_to_width("Jonathan", 6), "Jonathan");
}

fn require_login(session: &Session) -> Result<Uuid, ApplicationError> {
    session
        .user
        .ok_or_else(|| ApplicationError::Validation("login first".to_string()))
}

fn execute(
    session: &mut Session,
    user_repository: &mut dyn UserRepositoryTrait,
    schedule_repository: &mut dyn ScheduleRepositoryTrait,
    config: &AppConfig,
    untrimmed_line: &str,
) -> Result<Reply, ApplicationError> {
    // 整形
    let re = Regex::new(r"\s+").map_err(|e| ApplicationError::Validation(e.to_string()))?;
    let line: String = re.replace_all(untrimmed_line, " ").trim().to_string();
    let tokens: Vec<&str> = line.split(' ').collect();

    match tokens[0] {
        "" => Ok(Reply::Text(String::new())),
        "help" | "?" => Ok(Reply::Text(HELP.to_string())),
        "quit" | "exit" | "q" => Ok(Reply::Quit),
        "register" => {
            if tokens.len() < 5 {
                return Err(usage(
                    "register <email> <password> <therapist|client> <display name...>",
                ));
            }
            let therapist = match tokens[3] {
                "therapist" => true,
                "client" => false,
                other => return Err(ApplicationError::Validation(format!("unknown role: {}", other))),
            };
            let display_name = tokens[4..].join(" ");
            let registration = Registration {
                display_name: &display_name,
                email: tokens[1],
                password: tokens[2],
                therapist,
                sex: None,
                aba_course: false,
                code_of_conduct: true,
            };
            let layout = ScheduleLayout {
                week: &WEEK,
                hours: config.get_hours(),
                interval_minutes: config.get_interval_minutes(),
            };
            let id = register_user(user_repository, schedule_repository, &registration, &layout)?;
            session.user = Some(id);
            Ok(Reply::Text(format!("registered and logged in as {}", display_name)))
        }
        "login" => {
            if tokens.len() != 3 {
                return Err(usage("login <email> <password>"));
            }
            let user = user_repository
                .get_by_email(tokens[1])
                .filter(|user| user.verify_password(tokens[2]))
                .ok_or_else(|| ApplicationError::Validation("wrong email or password".to_string()))?;
            session.user = Some(user.get_id());
            info!(user_id = %user.get_id(), "logged in");
            Ok(Reply::Text(format!("welcome back, {}", user.get_display_name())))
        }
        "avail" => {
            let owner = require_login(session)?;
            if tokens.len() != 5 {
                return Err(usage("avail <day> <start> <end> on|off"));
            }
            let (day, start_time, end_time) = parse_range(&tokens[1..4])?;
            let available = match tokens[4] {
                "on" => true,
                "off" => false,
                _ => return Err(usage("avail <day> <start> <end> on|off")),
            };
            set_user_availability(schedule_repository, owner, day, start_time, end_time, available)?;
            Ok(Reply::Text(format!(
                "{} {}-{} is now {}",
                WEEK[day],
                military_time::format(start_time),
                military_time::format(end_time),
                if available { "available" } else { "unavailable" }
            )))
        }
        "check" => {
            let owner = require_login(session)?;
            let (day, start_time, end_time) = parse_range(&tokens[1..])?;
            let available = is_user_available(schedule_repository, owner, day, start_time, end_time)?;
            Ok(Reply::Text(if available { "available" } else { "unavailable" }.to_string()))
        }
        "enable" | "disable" => {
            let owner = require_login(session)?;
            set_schedule_enabled(schedule_repository, owner, tokens[0] == "enable")?;
            Ok(Reply::Text(format!("schedule {}d", tokens[0])))
        }
        "week" => {
            let owner = require_login(session)?;
            let schedule = schedule_repository
                .get_by_owner(owner)
                .ok_or_else(|| ApplicationError::schedule_not_found(owner))?;
            let status = if schedule.is_enabled() { "enabled" } else { "disabled" };
            Ok(Reply::Text(format!(
                "{}schedule ({}){}\n{}",
                style::Bold,
                status,
                style::Reset,
                render_week(schedule)
            )))
        }
        "who" => {
            let (day, start_time, end_time) = parse_range(&tokens[1..])?;
            let owners = find_available_users(schedule_repository, day, start_time, end_time)?;

            let users: Vec<_> = owners
                .iter()
                .filter_map(|owner| user_repository.get_by_id(*owner))
                .collect();
            if users.is_empty() {
                return Ok(Reply::Text("nobody is available".to_string()));
            }

            let width = users
                .iter()
                .map(|user| UnicodeWidthStr::width(user.get_display_name()))
                .max()
                .unwrap_or(0);
            let rows: Vec<String> = users
                .iter()
                .map(|user| {
                    let role = if user.get_therapist() { "therapist" } else { "client" };
                    format!(
                        "{}  {:<9}  {}",
                        pad_to_width(user.get_display_name(), width),
                        role,
                        user.get_email()
                    )
                })
                .collect();
            Ok(Reply::Text(rows.join("\n")))
        }
        "profile" => {
            let user_id = require_login(session)?;
            if tokens.len() < 4 {
                return Err(usage("profile <email> <phone|-> <display name...>"));
            }
            let user = user_repository
                .get_by_id(user_id)
                .ok_or_else(|| ApplicationError::user_not_found(user_id))?;
            let phone = if tokens[2] == "-" { "" } else { tokens[2] };

            let mut form = ProfileEditForm::new(user);
            form.set_data(&tokens[3..].join(" "), tokens[1], phone);
            if edit_profile(user_repository, user_id, &mut form)? {
                Ok(Reply::Text("profile updated".to_string()))
            } else {
                Err(ApplicationError::Validation(form.get_message().to_string()))
            }
        }
        "location" => {
            let user_id = require_login(session)?;
            let location = Location::new(&tokens[1..].join(" "))?;
            user_repository.add_location(UserLocation::new(user_id, location));
            user_repository.save()?;

            let names: Vec<&str> = user_repository
                .get_locations(user_id)
                .into_iter()
                .map(|l| l.get_location().get_name())
                .collect();
            Ok(Reply::Text(format!("locations: {}", names.join(", "))))
        }
        "save" => {
            user_repository.save()?;
            schedule_repository.save()?;
            Ok(Reply::Text("saved".to_string()))
        }
        other => Err(ApplicationError::Validation(format!(
            "unknown command: {} (try 'help')",
            other
        ))),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    let mut user_repository = UserRepository::new(&config.get_users_dir());
    let mut schedule_repository = ScheduleRepository::new(&config.get_schedules_dir());

    // controllerで実体を見るのを避けるために、1つ関数を切る
    application(&mut user_repository, &mut schedule_repository, &config)
}

fn application(
    user_repository: &mut dyn UserRepositoryTrait,
    schedule_repository: &mut dyn ScheduleRepositoryTrait,
    config: &AppConfig,
) -> anyhow::Result<()> {
    // 初期化
    user_repository.load()?;
    schedule_repository.load()?;

    let mut session = Session::default();
    let mut stdout = stdout();

    write!(stdout, "{}{} ", style::Bold, HEADER)?;
    write!(stdout, "{}", style::Reset)?;
    stdout.flush()?;

    for line in stdin().lock().lines() {
        let line = line?;

        match execute(
            &mut session,
            user_repository,
            schedule_repository,
            config,
            &line,
        ) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) => {
                if !text.is_empty() {
                    writeln!(stdout, "{}", text)?;
                }
            }
            // 入力の誤りは表示して続ける
            Err(err) => {
                warn!(error = %err, "command failed");
                writeln!(stdout, "{}error:{} {}", style::Bold, style::Reset, err)?;
            }
        }

        write!(stdout, "{}{} {}", style::Bold, HEADER, style::Reset)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    // 保存して終わり
    user_repository.save()?;
    schedule_repository.save()?;
    Ok(())
}
