pub mod collision;
pub mod patrol;
pub mod physics;
pub mod sensors;
