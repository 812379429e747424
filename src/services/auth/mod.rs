pub mod clock;
pub mod cookie;
pub mod jwt;
pub mod path_pattern;
pub mod token_service;

pub use jwt::TokenCodec;
pub use token_service::TokenService;
