pub mod listings;
pub mod mortgage;
