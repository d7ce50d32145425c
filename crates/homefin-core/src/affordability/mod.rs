pub mod budget;
pub mod purchase;
