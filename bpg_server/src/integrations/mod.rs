pub mod bkash;
pub mod sns;
