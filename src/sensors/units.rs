//! Перевод сырых отсчетов в физические единицы

use nalgebra::Vector3;

use crate::config::hardware::{ScaleFactors, STANDARD_GRAVITY};
use crate::data::{PhysicalSample, RawSample, SensorOffsets};

/// Преобразователь отсчетов АЦП с учетом смещений нуля
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitConverter {
    scales: ScaleFactors,
}

impl UnitConverter {
    pub fn new(scales: ScaleFactors) -> Self {
        Self { scales }
    }

    pub fn scales(&self) -> ScaleFactors {
        self.scales
    }

    /// Ускорение: (raw - offset) / LSB_на_g * g, м/с²
    /// Угловая скорость: (raw - offset) / LSB_на_°/с, °/с
    pub fn convert(&self, raw: &RawSample, offsets: &SensorOffsets) -> PhysicalSample {
        let accel_gain = STANDARD_GRAVITY / self.scales.accel_lsb_per_g;
        let gyro_gain = 1.0 / self.scales.gyro_lsb_per_dps;

        PhysicalSample {
            accel: corrected(&raw.accel, &offsets.accel) * accel_gain,
            gyro: corrected(&raw.gyro, &offsets.gyro) * gyro_gain,
        }
    }
}

fn corrected(raw: &Vector3<i16>, offset: &Vector3<f32>) -> Vector3<f32> {
    raw.map(f32::from) - offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::hardware::{AccelRange, GyroRange};

    #[test]
    fn test_zero_converts_to_zero() {
        let converter = UnitConverter::default();
        let sample = converter.convert(&RawSample::default(), &SensorOffsets::default());
        assert_eq!(sample.accel, Vector3::zeros());
        assert_eq!(sample.gyro, Vector3::zeros());
    }

    #[test]
    fn test_one_g_on_z() {
        let converter = UnitConverter::default();
        let raw = RawSample::new([0, 0, 16384], [655, 0, -655]);
        let sample = converter.convert(&raw, &SensorOffsets::default());
        assert!((sample.accel.z - STANDARD_GRAVITY).abs() < 1e-4);
        assert!((sample.gyro.x - 9.9945).abs() < 1e-3);
        assert!((sample.gyro.z + 9.9945).abs() < 1e-3);
    }

    #[test]
    fn test_offsets_are_subtracted_in_counts() {
        let converter = UnitConverter::new(ScaleFactors::from_ranges(AccelRange::G2, GyroRange::Deg250));
        let raw = RawSample::new([100, -50, 16484], [131, 262, 0]);
        let offsets = SensorOffsets::new([100.0, -50.0, 100.0], [131.0, 131.072, -131.072]);
        let sample = converter.convert(&raw, &offsets);

        assert!(sample.accel.x.abs() < 1e-6);
        assert!(sample.accel.y.abs() < 1e-6);
        assert!((sample.accel.z - STANDARD_GRAVITY).abs() < 1e-4);
        assert!(sample.gyro.x.abs() < 1e-6);
        assert!((sample.gyro.y - 0.99890).abs() < 1e-4);
        assert!((sample.gyro.z - 1.0).abs() < 1e-6);
    }
}
