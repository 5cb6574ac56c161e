pub mod assembler;
pub mod conditioner;
pub mod error;
pub mod extractor;
pub mod lazy_load;
pub mod locator;
pub mod pipeline;
pub mod session;
