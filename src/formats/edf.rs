//! EDF/BDF biosignal decoder.
//!
//! European Data Format: a 256-byte fixed-width ASCII file header, then one
//! 256-byte header per signal laid out field-major (all labels, then all
//! transducer fields, and so on), then binary data records. EDF samples are
//! little-endian i16; BDF (the BioSemi 24-bit variant) uses i24.
//!
//! Header parsing is strict: every count field is an ASCII digit string at
//! a fixed offset, and a coercion failure is a [`DecodeError::MalformedHeader`].
//! A buffer shorter than the header region claims is `TruncatedInput`.
//! Zero signals is a valid, empty recording.
//!
//! Mixed-rate recordings exist in the wild; after scaling, channels are
//! clipped to the shortest channel's length to keep the equal-length
//! channel invariant.

use chrono::{NaiveDate, NaiveTime};
use log::debug;

use crate::binread::HeaderReader;
use crate::envelope::{Channel, ChannelSet, Metadata};
use crate::error::DecodeError;

/// Byte length of the fixed file header.
const FILE_HEADER_LEN: usize = 256;
/// Byte length of one per-signal header.
const SIGNAL_HEADER_LEN: usize = 256;

/// Per-signal header fields needed for decoding and scaling.
#[derive(Debug, Clone)]
struct SignalHeader {
    label: String,
    physical_min: f64,
    physical_max: f64,
    digital_min: f64,
    digital_max: f64,
    samples_per_record: usize,
}

impl SignalHeader {
    /// Annotation channels carry timestamped text, not samples.
    fn is_annotation(&self) -> bool {
        self.label == "EDF Annotations" || self.label == "BDF Annotations"
    }

    /// Digital-to-physical gain; identity when the digital range is empty.
    fn gain(&self) -> f64 {
        let digital_range = self.digital_max - self.digital_min;
        if digital_range == 0.0 {
            1.0
        } else {
            (self.physical_max - self.physical_min) / digital_range
        }
    }

    fn to_physical(&self, digital: i32) -> f32 {
        let gain = self.gain();
        ((digital as f64 - self.digital_min) * gain + self.physical_min) as f32
    }
}

/// Decode an EDF or BDF buffer into a channel set.
///
/// Derivations: `sample_rate = samples_per_record / record_duration` and
/// `duration = record_count * record_duration`. The data-record payload is
/// decoded when present; a header-only buffer with zero records is fine.
pub fn decode(bytes: &[u8], bdf: bool, meta: &mut Metadata) -> Result<ChannelSet, DecodeError> {
    let reader = HeaderReader::new(bytes);
    if bytes.len() < FILE_HEADER_LEN {
        return Err(DecodeError::truncated(FILE_HEADER_LEN, bytes.len()));
    }

    let header_bytes = reader.ascii_i64(184, 8, "header bytes")?;
    let record_count = reader.ascii_i64(236, 8, "record count")?;
    let record_duration = reader.ascii_f64(244, 8, "record duration")?;
    let signal_count = reader.ascii_i64(252, 4, "signal count")?;

    if signal_count < 0 {
        return Err(DecodeError::malformed(format!(
            "negative signal count: {signal_count}"
        )));
    }
    let signal_count = signal_count as usize;

    let declared_header = FILE_HEADER_LEN + signal_count * SIGNAL_HEADER_LEN;
    if header_bytes >= 0 && header_bytes as usize != declared_header {
        debug!(
            "EDF header-bytes field {header_bytes} disagrees with {signal_count} signals; using computed {declared_header}"
        );
    }
    if bytes.len() < declared_header {
        return Err(DecodeError::truncated(declared_header, bytes.len()));
    }

    let signals = parse_signal_headers(&reader, signal_count)?;
    let data_offset = declared_header;

    // Record size in bytes across all signals (annotations included).
    let sample_width = if bdf { 3 } else { 2 };
    let record_size: usize = signals
        .iter()
        .map(|s| s.samples_per_record * sample_width)
        .sum();

    // EDF+ allows -1 for "record count unknown": derive from what is left.
    let record_count = if record_count < 0 {
        if record_size == 0 {
            0
        } else {
            (bytes.len() - data_offset) / record_size
        }
    } else {
        record_count as usize
    };

    // Header counts are untrusted; the product can exceed usize.
    let data_needed = record_count
        .checked_mul(record_size)
        .and_then(|n| n.checked_add(data_offset))
        .ok_or_else(|| {
            DecodeError::malformed(format!(
                "data region overflows: {record_count} records of {record_size} bytes"
            ))
        })?;
    if bytes.len() < data_needed {
        return Err(DecodeError::truncated(data_needed, bytes.len()));
    }

    let mut set = decode_records(bytes, &signals, data_offset, record_count, record_size, bdf)?;
    set.truncate_to_shortest();

    // Timing metadata derives from the first signal that carries samples.
    let data_signal = signals.iter().find(|s| !s.is_annotation());
    set.sample_rate_hz = data_signal.and_then(|s| {
        (record_duration > 0.0).then(|| s.samples_per_record as f64 / record_duration)
    });
    set.duration_secs = Some(record_count as f64 * record_duration);

    meta.channel_count = Some(set.channels.len());
    meta.sample_rate_hz = set.sample_rate_hz;
    meta.duration_secs = set.duration_secs;
    meta.start_time = parse_start_timestamp(&reader);

    debug!(
        "EDF decode: {} signals, {} records of {}s, {} data channels",
        signal_count,
        record_count,
        record_duration,
        set.channels.len()
    );

    Ok(set)
}

/// Parse the field-major per-signal header block.
fn parse_signal_headers(
    reader: &HeaderReader<'_>,
    count: usize,
) -> Result<Vec<SignalHeader>, DecodeError> {
    // Field-major offsets relative to byte 256: labels (16 each), then
    // transducers (80), physical dimension (8), physical min/max (8 each),
    // digital min/max (8 each), prefiltering (80), samples per record (8).
    let base = FILE_HEADER_LEN;
    let labels = base;
    let physical_min = base + count * (16 + 80 + 8);
    let physical_max = physical_min + count * 8;
    let digital_min = physical_max + count * 8;
    let digital_max = digital_min + count * 8;
    let samples_per_record = digital_max + count * 8 + count * 80;

    let mut signals = Vec::with_capacity(count);
    for i in 0..count {
        let samples = reader.ascii_i64(samples_per_record + i * 8, 8, "samples per record")?;
        if samples < 0 {
            return Err(DecodeError::malformed(format!(
                "signal {i} declares negative samples per record: {samples}"
            )));
        }
        signals.push(SignalHeader {
            label: reader.ascii(labels + i * 16, 16),
            physical_min: reader.ascii_f64(physical_min + i * 8, 8, "physical minimum")?,
            physical_max: reader.ascii_f64(physical_max + i * 8, 8, "physical maximum")?,
            digital_min: reader.ascii_f64(digital_min + i * 8, 8, "digital minimum")?,
            digital_max: reader.ascii_f64(digital_max + i * 8, 8, "digital maximum")?,
            samples_per_record: samples as usize,
        });
    }
    Ok(signals)
}

/// Decode the data-record region into physically scaled channels.
fn decode_records(
    bytes: &[u8],
    signals: &[SignalHeader],
    data_offset: usize,
    record_count: usize,
    record_size: usize,
    bdf: bool,
) -> Result<ChannelSet, DecodeError> {
    let reader = HeaderReader::new(bytes);
    let sample_width = if bdf { 3 } else { 2 };

    let mut channels: Vec<Channel> = signals
        .iter()
        .filter(|s| !s.is_annotation())
        .map(|s| Channel {
            label: s.label.clone(),
            samples: Vec::with_capacity(s.samples_per_record.saturating_mul(record_count)),
        })
        .collect();

    for record in 0..record_count {
        let mut offset = data_offset + record * record_size;
        let mut channel_index = 0;
        for signal in signals {
            if signal.is_annotation() {
                offset += signal.samples_per_record * sample_width;
                continue;
            }
            let samples = &mut channels[channel_index].samples;
            for _ in 0..signal.samples_per_record {
                let digital = if bdf {
                    reader.i24_le_at(offset)?
                } else {
                    reader.i16_at::<byteorder::LittleEndian>(offset)? as i32
                };
                samples.push(signal.to_physical(digital));
                offset += sample_width;
            }
            channel_index += 1;
        }
    }

    Ok(ChannelSet {
        channels,
        sample_rate_hz: None,
        duration_secs: None,
    })
}

/// Combine the `dd.mm.yy` / `hh.mm.ss` header fields into an ISO timestamp.
///
/// Descriptive only, so a malformed date degrades to `None` rather than
/// failing the decode. Two-digit years follow the EDF+ clipping rule:
/// 85..=99 are 1985..1999, the rest are 2000s.
fn parse_start_timestamp(reader: &HeaderReader<'_>) -> Option<String> {
    let date_text = reader.ascii(168, 8);
    let time_text = reader.ascii(176, 8);

    let mut date_parts = date_text.split('.');
    let day: u32 = date_parts.next()?.parse().ok()?;
    let month: u32 = date_parts.next()?.parse().ok()?;
    let short_year: i32 = date_parts.next()?.parse().ok()?;
    let year = if (85..=99).contains(&short_year) {
        1900 + short_year
    } else {
        2000 + short_year
    };

    let mut time_parts = time_text.split('.');
    let hour: u32 = time_parts.next()?.parse().ok()?;
    let minute: u32 = time_parts.next()?.parse().ok()?;
    let second: u32 = time_parts.next()?.parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let timestamp = date.and_time(time);
    Some(timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Classification};

    /// Build a minimal valid EDF buffer with the given signals.
    /// `signals` is (label, samples_per_record); data records are zeroed.
    pub(crate) fn synthetic_edf(
        record_count: i64,
        record_duration: f64,
        signals: &[(&str, usize)],
        data_records: usize,
    ) -> Vec<u8> {
        fn field(buf: &mut Vec<u8>, text: &str, width: usize) {
            let mut bytes = text.as_bytes().to_vec();
            bytes.truncate(width);
            bytes.resize(width, b' ');
            buf.extend_from_slice(&bytes);
        }

        let mut buf = Vec::new();
        field(&mut buf, "0", 8); // version
        field(&mut buf, "patient X", 80);
        field(&mut buf, "recording Y", 80);
        field(&mut buf, "02.03.21", 8);
        field(&mut buf, "10.30.00", 8);
        let header_bytes = 256 + signals.len() * 256;
        field(&mut buf, &header_bytes.to_string(), 8);
        field(&mut buf, "", 44);
        field(&mut buf, &record_count.to_string(), 8);
        field(&mut buf, &format!("{record_duration}"), 8);
        field(&mut buf, &signals.len().to_string(), 4);

        for (label, _) in signals {
            field(&mut buf, label, 16);
        }
        for _ in signals {
            field(&mut buf, "transducer", 80);
        }
        for _ in signals {
            field(&mut buf, "uV", 8);
        }
        for _ in signals {
            field(&mut buf, "-100", 8); // physical min
        }
        for _ in signals {
            field(&mut buf, "100", 8); // physical max
        }
        for _ in signals {
            field(&mut buf, "-2048", 8); // digital min
        }
        for _ in signals {
            field(&mut buf, "2048", 8); // digital max
        }
        for _ in signals {
            field(&mut buf, "HP:0.1Hz", 80);
        }
        for (_, samples) in signals {
            field(&mut buf, &samples.to_string(), 8);
        }
        for _ in signals {
            field(&mut buf, "", 32);
        }

        let record_size: usize = signals.iter().map(|(_, s)| s * 2).sum();
        buf.extend(std::iter::repeat(0u8).take(data_records * record_size));
        buf
    }

    #[test]
    fn sample_rate_and_duration_derive_from_header_counts() {
        let buf = synthetic_edf(4, 2.0, &[("EEG Fpz", 512), ("EMG chin", 512)], 4);
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let set = decode(&buf, false, &mut meta).unwrap();
        assert_eq!(set.sample_rate_hz, Some(256.0));
        assert_eq!(set.duration_secs, Some(8.0));
        assert_eq!(set.channels.len(), 2);
        assert_eq!(set.samples_per_channel(), 4 * 512);
        assert_eq!(meta.start_time.as_deref(), Some("2021-03-02T10:30:00"));
    }

    #[test]
    fn zero_signals_is_a_valid_empty_recording() {
        let buf = synthetic_edf(0, 1.0, &[], 0);
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let set = decode(&buf, false, &mut meta).unwrap();
        assert!(set.channels.is_empty());
    }

    #[test]
    fn non_numeric_count_is_malformed_header() {
        let mut buf = synthetic_edf(1, 1.0, &[("C3", 8)], 1);
        buf[236..244].copy_from_slice(b"oops    ");
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let err = decode(&buf, false, &mut meta).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn buffer_shorter_than_header_claims_is_truncated() {
        let buf = synthetic_edf(1, 1.0, &[("C3", 8)], 1);
        let short = &buf[..300];
        let mut meta = Metadata::new("a.edf", short.len(), classification());
        let err = decode(short, false, &mut meta).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn unknown_record_count_derives_from_remaining_bytes() {
        let mut buf = synthetic_edf(-1, 1.0, &[("C3", 4)], 0);
        // Append 3 records by hand (4 samples * 2 bytes each).
        buf.extend_from_slice(&[0u8; 3 * 8]);
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let set = decode(&buf, false, &mut meta).unwrap();
        assert_eq!(set.duration_secs, Some(3.0));
        assert_eq!(set.samples_per_channel(), 12);
    }

    #[test]
    fn overflowing_record_arithmetic_is_malformed_not_fatal() {
        // 1000 signals of 99999999 samples over 99999999 records multiplies
        // past usize; the header parses but the data region must not.
        let signals = vec![("S", 99999999usize); 1000];
        let buf = synthetic_edf(99999999, 1.0, &signals, 0);
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let err = decode(&buf, false, &mut meta).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn samples_scale_digital_to_physical() {
        let mut buf = synthetic_edf(1, 1.0, &[("C3", 1)], 1);
        // One record, one sample: digital 2048 must map to physical max 100.
        let data_start = buf.len() - 2;
        buf[data_start..].copy_from_slice(&2048i16.to_le_bytes());
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let set = decode(&buf, false, &mut meta).unwrap();
        assert!((set.channels[0].samples[0] - 100.0).abs() < 0.1);
    }

    #[test]
    fn annotation_channels_are_excluded_from_the_set() {
        let buf = synthetic_edf(1, 1.0, &[("C3", 8), ("EDF Annotations", 8)], 1);
        let mut meta = Metadata::new("a.edf", buf.len(), classification());
        let set = decode(&buf, false, &mut meta).unwrap();
        assert_eq!(set.channels.len(), 1);
        assert_eq!(set.channels[0].label, "C3");
    }

    fn classification() -> Classification {
        classify("a.edf", "")
    }
}
