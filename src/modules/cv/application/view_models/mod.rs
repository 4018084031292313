pub mod category_editing;
pub mod cv_edit;
pub mod home;

pub use category_editing::{CategoryEditingType, CategoryEditingViewModel};
pub use cv_edit::{CVEditViewModel, EditSessionState, EditingType};
pub use home::HomeViewModel;
