pub mod items;
pub mod orders;
pub mod users;
