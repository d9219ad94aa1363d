pub mod prelude;

pub mod images;
pub mod parkirna_mesta;
pub mod roles;
pub mod slovenska_mesta;
pub mod slovenske_ulice;
pub mod user_data;
pub mod users;
