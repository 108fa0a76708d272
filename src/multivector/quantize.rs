use crate::constants::INT8_SCALE;

/// `clip(v * 127, -127, 127)` truncated toward zero.
///
/// For `v` in `[-1, 1]`, `|dequantize(quantize(v)) - v| <= 1/127`.
#[inline]
pub fn quantize(value: f32) -> i8 {
    (value * INT8_SCALE).clamp(-INT8_SCALE, INT8_SCALE) as i8
}

#[inline]
pub fn dequantize(value: i8) -> f32 {
    value as f32 / INT8_SCALE
}
