pub mod collection;
pub mod division;
pub mod division_location;
pub mod event;
pub mod team;
