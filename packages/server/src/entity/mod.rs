pub mod admin;
pub mod event;
pub mod event_checkin;
pub mod hackathon;
pub mod hackathon_participant;
pub mod judge;
pub mod judge_assignment;
pub mod judge_queue_entry;
pub mod judge_vote;
pub mod judging_map;
pub mod judging_project;
pub mod user;
