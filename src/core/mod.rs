pub mod calculation;
pub mod services;
pub mod utils;
