pub mod admin_user;
pub mod attendee;
pub mod school;
