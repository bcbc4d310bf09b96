pub mod error;
pub mod gps;
pub mod hashing;
pub mod sun;
