// Public handlers: no token required. Signup and login live here because they issue tokens.
pub mod catalog;
pub mod payments;
pub mod users;
