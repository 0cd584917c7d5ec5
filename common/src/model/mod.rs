pub mod layout;
pub mod placement;
pub mod recipient;
