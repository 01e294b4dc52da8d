pub(crate) mod logging;

pub mod clock;
pub mod math;
