pub mod schedules;

pub use self::schedules::ScheduleService;
