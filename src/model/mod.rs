pub mod attendance;
pub mod department;
pub mod leave_request;
pub mod location;
pub mod role;
pub mod saka;
pub mod user;
