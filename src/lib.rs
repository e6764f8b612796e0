pub mod entity {
    pub mod day_grid;
    pub mod error;
    pub mod interval;
    pub mod location;
    pub mod military_time;
    pub mod user;
    pub mod week_schedule;
}

pub mod application {
    pub mod availability;
    pub mod error;
    pub mod interface;
    pub mod profile_edit_form;
    pub mod register_user;
    pub mod render_week;
}

pub mod adapter {
    pub mod gateway {
        pub mod config;
        pub mod error;
        pub mod memory_repository;
        pub mod schedule_repository;
        pub mod storage;
        pub mod user_repository;
        pub mod yaml;
    }
}
