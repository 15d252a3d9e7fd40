pub mod name_generator;
pub mod token_issuer;
