pub mod admin;
pub mod auth;
pub mod event;
pub mod hackathon;
pub mod judge;
pub mod project;
pub mod shared;
