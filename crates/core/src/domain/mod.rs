pub mod attribution;
pub mod policy;
pub mod quote;
