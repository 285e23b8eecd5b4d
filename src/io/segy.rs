//! Minimal SEG-Y trace store.
//!
//! Just enough of the SEG-Y rev-0/rev-1 layout to read and rewrite trace
//! samples in place:
//!
//! - 3200-byte textual header (opaque; preserved as-is)
//! - 400-byte big-endian binary header, from which we take samples-per-trace,
//!   the sample format code and the extended-textual-header count
//! - fixed-length traces: 240-byte header + `ns` samples of 4 bytes each
//!
//! Supported sample formats are 1 (IBM 32-bit float) and 5 (IEEE 32-bit
//! float); anything else is rejected with the offending format code in the
//! message. The store is opened read-write by a single writer, every write
//! covers one whole trace payload, and `flush` is durable (`sync_data`).
//! The file handle closes on drop on all exit paths.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const TEXT_HEADER_LEN: u64 = 3200;
pub const BINARY_HEADER_LEN: u64 = 400;
pub const TRACE_HEADER_LEN: u64 = 240;

// Byte offsets within the 400-byte binary header.
const SAMPLES_PER_TRACE_OFFSET: usize = 20;
const FORMAT_CODE_OFFSET: usize = 24;
const EXT_HEADER_COUNT_OFFSET: usize = 304;

/// Sample encoding of the trace payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Format code 1: IBM hexadecimal floating point.
    IbmFloat32,
    /// Format code 5: IEEE single-precision floating point.
    IeeeFloat32,
}

impl SampleFormat {
    fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::IbmFloat32),
            5 => Some(Self::IeeeFloat32),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Self::IbmFloat32 => 1,
            Self::IeeeFloat32 => 5,
        }
    }
}

/// An open, exclusive read-write handle on a SEG-Y file.
#[derive(Debug)]
pub struct TraceStore {
    file: File,
    path: PathBuf,
    format: SampleFormat,
    samples_per_trace: usize,
    data_start: u64,
    trace_count: usize,
}

impl TraceStore {
    /// Open a SEG-Y file for in-place trace mutation.
    pub fn open_read_write(path: &Path) -> Result<Self, AppError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                AppError::new(
                    4,
                    format!("Failed to open trace store '{}': {e}", path.display()),
                )
            })?;

        let len = file
            .metadata()
            .map_err(|e| store_error(path, format!("Failed to stat trace store: {e}")))?
            .len();
        if len < TEXT_HEADER_LEN + BINARY_HEADER_LEN {
            return Err(store_error(
                path,
                format!("File is too short ({len} bytes) to hold SEG-Y headers."),
            ));
        }

        let mut header = [0u8; BINARY_HEADER_LEN as usize];
        file.seek(SeekFrom::Start(TEXT_HEADER_LEN))
            .and_then(|_| file.read_exact(&mut header))
            .map_err(|e| store_error(path, format!("Failed to read binary header: {e}")))?;

        let ns = read_i16(&header, SAMPLES_PER_TRACE_OFFSET);
        let format_code = read_i16(&header, FORMAT_CODE_OFFSET);
        let ext_headers = read_i16(&header, EXT_HEADER_COUNT_OFFSET);

        if ns <= 0 {
            return Err(store_error(
                path,
                format!("Binary header declares {ns} samples per trace."),
            ));
        }
        let format = SampleFormat::from_code(format_code).ok_or_else(|| {
            store_error(
                path,
                format!(
                    "Unsupported sample format code {format_code} \
                     (supported: 1 = IBM float, 5 = IEEE float)."
                ),
            )
        })?;
        if ext_headers < 0 {
            return Err(store_error(
                path,
                "Variable-count extended textual headers are not supported.",
            ));
        }

        let samples_per_trace = ns as usize;
        let data_start =
            TEXT_HEADER_LEN + BINARY_HEADER_LEN + u64::from(ext_headers as u16) * TEXT_HEADER_LEN;
        if len < data_start {
            return Err(store_error(
                path,
                "File ends inside the extended textual headers.",
            ));
        }

        let trace_len = TRACE_HEADER_LEN + 4 * samples_per_trace as u64;
        let payload = len - data_start;
        if payload % trace_len != 0 {
            return Err(store_error(
                path,
                format!(
                    "Trace data ({payload} bytes) is not a whole number of \
                     {samples_per_trace}-sample traces."
                ),
            ));
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            format,
            samples_per_trace,
            data_start,
            trace_count: (payload / trace_len) as usize,
        })
    }

    pub fn trace_count(&self) -> usize {
        self.trace_count
    }

    pub fn samples_per_trace(&self) -> usize {
        self.samples_per_trace
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Read the sample payload of one trace (header bytes are skipped).
    pub fn read_trace(&mut self, index: usize) -> Result<Vec<f64>, AppError> {
        let offset = self.payload_offset(index)?;
        let mut raw = vec![0u8; 4 * self.samples_per_trace];
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.read_exact(&mut raw))
            .map_err(|e| store_error(&self.path, format!("Failed to read trace {index}: {e}")))?;

        Ok(raw
            .chunks_exact(4)
            .map(|chunk| {
                let bits = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                let value = match self.format {
                    SampleFormat::IbmFloat32 => decode_ibm_f32(bits),
                    SampleFormat::IeeeFloat32 => f32::from_bits(bits),
                };
                f64::from(value)
            })
            .collect())
    }

    /// Overwrite the sample payload of one trace in a single contiguous write.
    pub fn write_trace(&mut self, index: usize, samples: &[f64]) -> Result<(), AppError> {
        if samples.len() != self.samples_per_trace {
            return Err(store_error(
                &self.path,
                format!(
                    "Trace {index} write has {} samples, store expects {}.",
                    samples.len(),
                    self.samples_per_trace
                ),
            ));
        }

        let mut raw = Vec::with_capacity(4 * samples.len());
        for &sample in samples {
            let bits = match self.format {
                SampleFormat::IbmFloat32 => encode_ibm_f32(sample as f32),
                SampleFormat::IeeeFloat32 => (sample as f32).to_bits(),
            };
            raw.extend_from_slice(&bits.to_be_bytes());
        }

        let offset = self.payload_offset(index)?;
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.write_all(&raw))
            .map_err(|e| store_error(&self.path, format!("Failed to write trace {index}: {e}")))
    }

    /// Durably flush everything written so far.
    pub fn flush(&mut self) -> Result<(), AppError> {
        self.file
            .sync_data()
            .map_err(|e| store_error(&self.path, format!("Failed to flush trace store: {e}")))
    }

    fn payload_offset(&self, index: usize) -> Result<u64, AppError> {
        if index >= self.trace_count {
            return Err(store_error(
                &self.path,
                format!(
                    "Trace index {index} out of range (store holds {} traces).",
                    self.trace_count
                ),
            ));
        }
        let trace_len = TRACE_HEADER_LEN + 4 * self.samples_per_trace as u64;
        Ok(self.data_start + index as u64 * trace_len + TRACE_HEADER_LEN)
    }
}

fn store_error(path: &Path, message: impl std::fmt::Display) -> AppError {
    AppError::new(4, format!("Trace store '{}': {message}", path.display()))
}

fn read_i16(header: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([header[offset], header[offset + 1]])
}

/// Decode an IBM hexadecimal 32-bit float: sign bit, 7-bit excess-64 base-16
/// exponent, 24-bit fraction.
pub fn decode_ibm_f32(bits: u32) -> f32 {
    if bits & 0x7fff_ffff == 0 {
        return 0.0;
    }
    let sign = if bits >> 31 == 1 { -1.0f64 } else { 1.0f64 };
    let exponent = ((bits >> 24) & 0x7f) as i32 - 64;
    let fraction = f64::from(bits & 0x00ff_ffff) / f64::from(1u32 << 24);
    (sign * fraction * 16f64.powi(exponent)) as f32
}

/// Encode an IEEE 32-bit float as an IBM hexadecimal float.
///
/// Exponent over/underflow saturates; non-finite inputs saturate to the
/// largest representable magnitude.
pub fn encode_ibm_f32(value: f32) -> u32 {
    let sign = if value.is_sign_negative() {
        0x8000_0000u32
    } else {
        0
    };
    if value == 0.0 {
        return 0;
    }
    if !value.is_finite() {
        return sign | 0x7fff_ffff;
    }

    let mut fraction = f64::from(value.abs());
    let mut exponent = 0i32;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 0.0625 {
        fraction *= 16.0;
        exponent -= 1;
    }

    let mut mantissa = (fraction * f64::from(1u32 << 24)).round() as u32;
    if mantissa >= 1 << 24 {
        mantissa >>= 4;
        exponent += 1;
    }
    if exponent > 63 {
        return sign | 0x7fff_ffff;
    }
    if exponent < -64 {
        return 0;
    }

    sign | (((exponent + 64) as u32) << 24) | (mantissa & 0x00ff_ffff)
}

/// Assemble a small fixed-length SEG-Y file for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) fn write_test_store(
    path: &Path,
    format: SampleFormat,
    traces: &[Vec<f64>],
) -> std::io::Result<()> {
    let ns = traces.first().map_or(0, Vec::len);
    let mut bytes = vec![0u8; (TEXT_HEADER_LEN + BINARY_HEADER_LEN) as usize];

    let bin = TEXT_HEADER_LEN as usize;
    bytes[bin + 16..bin + 18].copy_from_slice(&2000i16.to_be_bytes()); // sample interval, µs
    bytes[bin + SAMPLES_PER_TRACE_OFFSET..bin + SAMPLES_PER_TRACE_OFFSET + 2]
        .copy_from_slice(&(ns as i16).to_be_bytes());
    bytes[bin + FORMAT_CODE_OFFSET..bin + FORMAT_CODE_OFFSET + 2]
        .copy_from_slice(&format.code().to_be_bytes());

    for trace in traces {
        bytes.extend_from_slice(&[0u8; TRACE_HEADER_LEN as usize]);
        for &sample in trace {
            let bits = match format {
                SampleFormat::IbmFloat32 => encode_ibm_f32(sample as f32),
                SampleFormat::IeeeFloat32 => (sample as f32).to_bits(),
            };
            bytes.extend_from_slice(&bits.to_be_bytes());
        }
    }

    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ibm_codec_round_trips() {
        for &value in &[0.0f32, 1.0, -1.0, 0.15, 0.5, -0.0078125, 3.14159, 118.625] {
            let decoded = decode_ibm_f32(encode_ibm_f32(value));
            assert!(
                (decoded - value).abs() <= value.abs() * 1e-6 + 1e-12,
                "value {value} decoded as {decoded}"
            );
        }
    }

    #[test]
    fn ibm_known_pattern() {
        // -118.625 is the classic worked example: 0xC276A000.
        assert_eq!(encode_ibm_f32(-118.625), 0xC276_A000);
        assert_eq!(decode_ibm_f32(0xC276_A000), -118.625);
    }

    #[test]
    fn ieee_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.sgy");
        let traces = vec![
            vec![5000.0, 5100.0, 5200.0, 5300.0, 5400.0],
            vec![6000.0, 6100.0, 6200.0, 6300.0, 6400.0],
            vec![7000.0, 7100.0, 7200.0, 7300.0, 7400.0],
        ];
        write_test_store(&path, SampleFormat::IeeeFloat32, &traces).unwrap();

        let mut store = TraceStore::open_read_write(&path).unwrap();
        assert_eq!(store.trace_count(), 3);
        assert_eq!(store.samples_per_trace(), 5);
        assert_eq!(store.format(), SampleFormat::IeeeFloat32);
        assert_eq!(store.read_trace(1).unwrap(), traces[1]);

        // Dyadic values survive the f32 narrowing exactly.
        let replacement = vec![0.125, 0.25, 0.375, 0.5, 0.625];
        store.write_trace(1, &replacement).unwrap();
        store.flush().unwrap();
        drop(store);

        let mut reopened = TraceStore::open_read_write(&path).unwrap();
        assert_eq!(reopened.read_trace(0).unwrap(), traces[0]);
        assert_eq!(reopened.read_trace(1).unwrap(), replacement);
        assert_eq!(reopened.read_trace(2).unwrap(), traces[2]);
    }

    #[test]
    fn ibm_store_round_trips_within_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai_ibm.sgy");
        let traces = vec![vec![5000.0, 5500.0, 6000.0], vec![0.15, 0.25, 0.35]];
        write_test_store(&path, SampleFormat::IbmFloat32, &traces).unwrap();

        let mut store = TraceStore::open_read_write(&path).unwrap();
        assert_eq!(store.format(), SampleFormat::IbmFloat32);
        for (i, expected) in traces.iter().enumerate() {
            let got = store.read_trace(i).unwrap();
            for (g, e) in got.iter().zip(expected) {
                assert!((g - e).abs() <= e.abs() * 1e-6, "{g} vs {e}");
            }
        }
    }

    #[test]
    fn unsupported_format_code_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.sgy");
        let traces = vec![vec![1.0, 2.0]];
        write_test_store(&path, SampleFormat::IeeeFloat32, &traces).unwrap();

        // Patch the format code to 2 (32-bit integer, unsupported).
        let mut bytes = std::fs::read(&path).unwrap();
        let off = TEXT_HEADER_LEN as usize + FORMAT_CODE_OFFSET;
        bytes[off..off + 2].copy_from_slice(&2i16.to_be_bytes());
        std::fs::write(&path, &bytes).unwrap();

        let err = TraceStore::open_read_write(&path).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("format code 2"));
    }

    #[test]
    fn ragged_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.sgy");
        write_test_store(&path, SampleFormat::IeeeFloat32, &[vec![1.0, 2.0, 3.0]]).unwrap();

        // Chop off the last sample so the payload no longer divides evenly.
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

        let err = TraceStore::open_read_write(&path).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn out_of_range_trace_index_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.sgy");
        write_test_store(&path, SampleFormat::IeeeFloat32, &[vec![1.0, 2.0]]).unwrap();

        let mut store = TraceStore::open_read_write(&path).unwrap();
        assert!(store.read_trace(1).is_err());
    }
}
