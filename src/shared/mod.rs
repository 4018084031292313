pub mod codec;
pub mod dates;
pub mod edit_events;
pub mod identity;
pub mod store;
pub mod streams;
