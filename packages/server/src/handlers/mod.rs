pub mod admin;
pub mod auth;
pub mod event;
pub mod hackathon;
pub mod health;
pub mod judge;
pub mod project;
