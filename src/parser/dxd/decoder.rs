use super::{ChannelDescriptor, DxdDataType, DxdError, Result};
use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace};

/// Decode every whole sample in `bytes` as `data_type`. Trailing partial bytes are ignored.
pub fn decode_values(bytes: &[u8], data_type: DxdDataType) -> Vec<f64> {
    let width = data_type.sample_size_bytes();
    let count = bytes.len() / width;
    let bytes = &bytes[..count * width];

    macro_rules! read_into {
        ($ty:ty, $read:ident) => {{
            let mut out: Vec<$ty> = vec![<$ty>::default(); count];
            LittleEndian::$read(bytes, &mut out);
            out.into_iter().map(f64::from).collect()
        }};
    }

    match data_type {
        DxdDataType::Int16 => read_into!(i16, read_i16_into),
        DxdDataType::Int32 => read_into!(i32, read_i32_into),
        DxdDataType::UInt16 => read_into!(u16, read_u16_into),
        DxdDataType::UInt32 => read_into!(u32, read_u32_into),
        DxdDataType::Float32 => read_into!(f32, read_f32_into),
        DxdDataType::Float64 => read_into!(f64, read_f64_into),
    }
}

/// Raw (unscaled) samples of one channel from the payload.
///
/// With several channels the payload is a row-major `(samples, channels)` grid.
/// When the payload divides evenly into rows the column is sliced from the
/// grid; otherwise every `num_channels`-th value is taken starting at `index`,
/// capped at `floor(values / num_channels)`.
pub fn try_decode_raw(
    payload: &[u8],
    data_type: DxdDataType,
    num_channels: usize,
    index: usize,
) -> Result<Vec<f64>> {
    let width = data_type.sample_size_bytes();
    if payload.len() < width {
        return Err(DxdError::DecodeFailure(format!(
            "payload of {} bytes is shorter than one {} sample",
            payload.len(),
            data_type
        )));
    }
    if num_channels == 0 || index >= num_channels {
        return Err(DxdError::DecodeFailure(format!(
            "channel index {} outside 0..{}",
            index, num_channels
        )));
    }

    if num_channels == 1 {
        let values = decode_values(payload, data_type);
        trace!("Sequential decode: {} {} samples", values.len(), data_type);
        return Ok(values);
    }

    let row_bytes = width * num_channels;
    let samples_per_channel = payload.len() / row_bytes;

    if payload.len() % row_bytes == 0 {
        let grid = decode_values(&payload[..samples_per_channel * row_bytes], data_type);
        let column: Vec<f64> = grid.chunks_exact(num_channels).map(|row| row[index]).collect();
        trace!("Grid decode: column {} of {} rows", index, column.len());
        Ok(column)
    } else {
        let flat = decode_values(payload, data_type);
        let limit = flat.len() / num_channels;
        let column: Vec<f64> = flat
            .iter()
            .skip(index)
            .step_by(num_channels)
            .take(limit)
            .copied()
            .collect();
        debug!(
            "Payload of {} bytes not a multiple of {}, strided decode gave {} samples",
            payload.len(),
            row_bytes,
            column.len()
        );
        Ok(column)
    }
}

/// Number of samples `try_decode_raw` yields for a channel, without decoding.
pub fn expected_samples(payload_len: usize, data_type: DxdDataType, num_channels: usize) -> usize {
    let width = data_type.sample_size_bytes();
    if payload_len < width || num_channels == 0 {
        return 0;
    }
    payload_len / (width * num_channels)
}

/// `value = raw * scale + offset`, `t = i / sample_rate`.
pub fn to_engineering_units(raw: &[f64], channel: &ChannelDescriptor) -> (Vec<f64>, Vec<f64>) {
    let values: Vec<f64> = raw
        .iter()
        .map(|&r| r * channel.scale + channel.offset)
        .collect();
    let time = time_vector(values.len(), channel.sample_rate_hz);
    (time, values)
}

pub fn time_vector(num_samples: usize, sample_rate_hz: f64) -> Vec<f64> {
    (0..num_samples).map(|i| i as f64 / sample_rate_hz).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::dxd::LoaderConfig;

    fn interleaved_i16(samples: usize, channels: usize) -> Vec<u8> {
        (0..samples)
            .flat_map(|s| (0..channels).map(move |c| (s * 10 + c) as i16))
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    #[test]
    fn grid_column_extraction() {
        let payload = interleaved_i16(5, 3);
        let column = try_decode_raw(&payload, DxdDataType::Int16, 3, 1).unwrap();
        assert_eq!(column, vec![1.0, 11.0, 21.0, 31.0, 41.0]);
    }

    #[test]
    fn strided_fallback_caps_length() {
        let mut payload = interleaved_i16(4, 3);
        // one extra whole value plus a stray byte
        payload.extend_from_slice(&40i16.to_le_bytes());
        payload.push(0xAB);
        let column = try_decode_raw(&payload, DxdDataType::Int16, 3, 0).unwrap();
        assert_eq!(column, vec![0.0, 10.0, 20.0, 30.0]);
        let column = try_decode_raw(&payload, DxdDataType::Int16, 3, 2).unwrap();
        assert_eq!(column, vec![2.0, 12.0, 22.0, 32.0]);
    }

    #[test]
    fn unsigned_and_float_encodings() {
        let payload: Vec<u8> = [65535u16, 1].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(decode_values(&payload, DxdDataType::UInt16), vec![65535.0, 1.0]);
        assert_eq!(decode_values(&payload, DxdDataType::Int16), vec![-1.0, 1.0]);

        let payload: Vec<u8> = [1.5f32, -2.25].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(decode_values(&payload, DxdDataType::Float32), vec![1.5, -2.25]);

        let payload = 4_000_000_000u32.to_le_bytes();
        assert_eq!(decode_values(&payload, DxdDataType::UInt32), vec![4_000_000_000.0]);
    }

    #[test]
    fn short_payload_is_a_decode_failure() {
        let err = try_decode_raw(&[1, 2, 3], DxdDataType::Float64, 1, 0).unwrap_err();
        assert!(matches!(err, DxdError::DecodeFailure(_)));
        assert!(try_decode_raw(&[0; 16], DxdDataType::Int16, 2, 2).is_err());
    }

    #[test]
    fn engineering_units_and_time() {
        let mut channel = ChannelDescriptor::with_defaults(0, &LoaderConfig::default());
        channel.scale = 0.5;
        channel.offset = -1.0;
        channel.sample_rate_hz = 4.0;
        let (time, values) = to_engineering_units(&[2.0, 4.0, 6.0], &channel);
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
        assert_eq!(time, vec![0.0, 0.25, 0.5]);
    }

    #[test]
    fn expected_count_matches_decode() {
        let payload = interleaved_i16(7, 2);
        let expected = expected_samples(payload.len(), DxdDataType::Int16, 2);
        let decoded = try_decode_raw(&payload, DxdDataType::Int16, 2, 1).unwrap();
        assert_eq!(expected, decoded.len());
        assert_eq!(expected_samples(1, DxdDataType::Int16, 1), 0);
    }
}
