pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod validation;

pub use code_generator::generate_coupon_code;
pub use jwt::*;
pub use password::*;
pub use validation::*;
