pub mod ports;
pub mod view_models;
