pub(crate) mod mpu6050;

#[cfg(test)]
pub(crate) mod mock;

pub use mpu6050::Mpu6050;
