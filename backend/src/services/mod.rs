pub mod certificates;
pub mod layout;
pub mod roster;
