pub mod profile_editing;

pub use profile_editing::ProfileEditingViewModel;
