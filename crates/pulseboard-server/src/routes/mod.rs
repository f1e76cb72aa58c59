pub mod comparison;
pub mod dashboard;
pub mod health;
pub mod periods;
