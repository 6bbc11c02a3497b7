pub mod airtable_students;
pub mod availability;
pub mod health;
pub mod homework;
pub mod schedules;
pub mod sessions;
pub mod students;
