pub mod calibration;
pub mod fusion;
pub mod hardware;
