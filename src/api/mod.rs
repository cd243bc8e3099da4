pub mod attendance;
pub mod leave_request;
pub mod master_data;
pub mod reports;
pub mod users;
