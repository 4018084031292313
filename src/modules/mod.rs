pub mod cv;
pub mod profile;
