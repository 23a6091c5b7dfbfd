//! Users subsystem: signup, login credentials and account creation.

pub mod forms;
pub mod manager;

pub use forms::{LoginForm, SignupErrors, SignupForm};
pub use manager::{UserError, UserManager};
