pub mod device;
pub mod logger;
