pub mod analytics;
pub mod health;
pub mod repos;
pub mod research;
pub mod teams;
