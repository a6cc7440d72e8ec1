mod password;
pub use password::{hash_password, verify_password};
mod error;
pub use error::{CryptError, CryptResult};
