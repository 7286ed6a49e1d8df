pub mod error;
pub mod middleware;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};
