pub mod status_codes;
pub mod users;
