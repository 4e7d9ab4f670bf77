//! IBT capture reader
//!
//! Loads a capture into memory, decodes its headers and variable table once,
//! and hands out frames and samples on demand.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ibtrace::ibt::{IbtReader, lap_equals};
//!
//! fn print_lap_six() -> ibtrace::Result<()> {
//!     let reader = IbtReader::open("mx5.ibt")?;
//!     println!("File contains {} frames", reader.total_frames());
//!
//!     let channels = ["lap", "sessiontime", "speed", "throttle", "brake"];
//!     for row in reader.scan(&channels, lap_equals("lap", 6)) {
//!         let row = row?;
//!         let values: Vec<String> = row.iter().map(|s| s.value.to_string()).collect();
//!         println!("{}", values.join(" "));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Performance Notes
//!
//! - File data is loaded into memory at construction time for random access
//! - Frames borrow from the capture buffer; iteration does not allocate
//! - Channel lookups are O(1) through the lowercased name table

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::extract::SampleExtractor;
use super::format::{DiskSubHeader, TelemetryHeader, build_variable_table, decode_headers};
use super::frames::FrameIterator;
use crate::session_info::{extract_session_info, strip_control_characters};
use crate::types::{Frame, Sample, TypeRegistry, VariableTable};
use crate::{Result, TelemetryError};

const FALLBACK_TICK_RATE: f64 = 60.0;

/// Decoded IBT capture held in memory.
#[derive(Debug, Clone)]
pub struct IbtReader {
    data: Vec<u8>,
    path: PathBuf,
    header: TelemetryHeader,
    disk_header: DiskSubHeader,
    variables: VariableTable,
    registry: TypeRegistry,
}

impl IbtReader {
    /// Open an IBT file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file =
            File::open(&path).map_err(|e| TelemetryError::file_error(path.clone(), e))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| TelemetryError::file_error(path.clone(), e))?;

        Self::decode(data, path, TypeRegistry::standard())
    }

    /// Decode a capture already held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::decode(data, PathBuf::from("<memory>"), TypeRegistry::standard())
    }

    /// Decode a capture, resolving type codes through `registry`.
    pub fn with_registry(data: Vec<u8>, registry: TypeRegistry) -> Result<Self> {
        Self::decode(data, PathBuf::from("<memory>"), registry)
    }

    fn decode(data: Vec<u8>, path: PathBuf, registry: TypeRegistry) -> Result<Self> {
        let (header, disk_header) = decode_headers(&data)?;
        header.validate()?;

        let variables = build_variable_table(&data, &header)?;

        let reader = Self { data, path, header, disk_header, variables, registry };

        let total_frames = reader.total_frames();
        info!(
            "Opened {}: {} variables, {} frames at {}Hz",
            reader.path.display(),
            reader.variables.len(),
            total_frames,
            reader.tick_rate()
        );

        // Cross-check disk_header.record_count against the frames actually present
        let declared = reader.disk_header.record_count;
        if declared > 0 && usize::try_from(declared).ok() != Some(total_frames) {
            warn!(
                "Frame count mismatch: disk header reports {} records, found {} complete frames",
                declared, total_frames
            );
        }

        Ok(reader)
    }

    pub fn header(&self) -> &TelemetryHeader {
        &self.header
    }

    pub fn disk_header(&self) -> &DiskSubHeader {
        &self.disk_header
    }

    /// Get the variable table for this capture
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Get the file path this reader was opened from
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Get the tick rate from the header
    ///
    /// Returns the recording frequency, or 60Hz as fallback if invalid.
    pub fn tick_rate(&self) -> f64 {
        if self.header.tick_rate > 0 { f64::from(self.header.tick_rate) } else { FALLBACK_TICK_RATE }
    }

    /// Iterate complete frames from the start of the sample region.
    pub fn frames(&self) -> FrameIterator<'_> {
        // validate() guarantees both are non-negative
        let buf_offset = usize::try_from(self.header.buf_offset).unwrap_or(usize::MAX);
        let buf_len = usize::try_from(self.header.buf_len).unwrap_or(0);
        FrameIterator::new(&self.data, buf_offset, buf_len)
    }

    /// Number of complete frames present in the capture.
    pub fn total_frames(&self) -> usize {
        self.frames().total()
    }

    /// Random access to a single frame.
    pub fn frame(&self, index: usize) -> Option<Frame<'_>> {
        self.frames().get(index)
    }

    pub fn extractor(&self) -> SampleExtractor<'_> {
        SampleExtractor::new(&self.variables, &self.registry)
    }

    /// Decode one channel from one frame.
    pub fn extract(&self, frame: &Frame<'_>, name: &str) -> Result<Sample> {
        self.extractor().extract(frame, name)
    }

    /// Scan every frame, extracting `channels` and keeping rows that satisfy `predicate`.
    ///
    /// The scan ends cleanly when any channel reports end-of-data. Any other error is
    /// yielded once and ends the scan.
    pub fn scan<S, P>(&self, channels: &[S], predicate: P) -> ChannelScan<'_, P>
    where
        S: AsRef<str>,
        P: FnMut(&[Sample]) -> bool,
    {
        ChannelScan {
            frames: self.frames(),
            extractor: self.extractor(),
            channels: channels.iter().map(|c| c.as_ref().to_string()).collect(),
            predicate,
            done: false,
        }
    }

    /// Scan every frame without filtering.
    pub fn scan_all<S: AsRef<str>>(
        &self,
        channels: &[S],
    ) -> ChannelScan<'_, fn(&[Sample]) -> bool> {
        self.scan(channels, accept_all as fn(&[Sample]) -> bool)
    }

    /// Session-info text with control characters removed.
    ///
    /// Returns `None` when the capture has no session-info block.
    pub fn session_info_text(&self) -> Result<Option<String>> {
        if self.header.session_info_len <= 0 || self.header.session_info_offset <= 0 {
            return Ok(None);
        }

        let raw = extract_session_info(
            &self.data,
            self.header.session_info_offset,
            self.header.session_info_len,
        )?;

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(strip_control_characters(&raw)))
    }
}

fn accept_all(_: &[Sample]) -> bool {
    true
}

/// Row predicate selecting frames where integer channel `channel` equals `lap`.
///
/// The channel must be part of the scanned channel list.
pub fn lap_equals(channel: impl Into<String>, lap: i32) -> impl FnMut(&[Sample]) -> bool {
    let channel = channel.into();
    move |row: &[Sample]| {
        row.iter().any(|s| s.name.eq_ignore_ascii_case(&channel) && s.value.as_i32() == Some(lap))
    }
}

/// Iterator of per-frame sample rows returned by [`IbtReader::scan`].
pub struct ChannelScan<'a, P> {
    frames: FrameIterator<'a>,
    extractor: SampleExtractor<'a>,
    channels: Vec<String>,
    predicate: P,
    done: bool,
}

impl<P> ChannelScan<'_, P> {
    /// Index of the next frame the scan will read.
    pub fn frame_index(&self) -> usize {
        self.frames.index()
    }
}

impl<P> Iterator for ChannelScan<'_, P>
where
    P: FnMut(&[Sample]) -> bool,
{
    type Item = Result<Vec<Sample>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for frame in self.frames.by_ref() {
            match self.extractor.extract_row(&frame, &self.channels) {
                Ok(row) => {
                    if (self.predicate)(&row) {
                        return Some(Ok(row));
                    }
                }
                Err(e) if e.is_end_of_data() => {
                    debug!("Scan reached end of data at frame {}", frame.index);
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        self.done = true;
        None
    }
}

impl<P> std::iter::FusedIterator for ChannelScan<'_, P> where P: FnMut(&[Sample]) -> bool {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CaptureBuilder, VarSpec, Word, frame_words};
    use crate::types::{SampleValue, TYPE_CODE_DOUBLE, TYPE_CODE_FLOAT, TYPE_CODE_INT};
    use anyhow::{Context, Result, ensure};

    fn session_capture() -> CaptureBuilder {
        CaptureBuilder::new(24)
            .variable(VarSpec::new("Placeholder", TYPE_CODE_INT, 0))
            .variable(VarSpec::new("SessionTime", TYPE_CODE_DOUBLE, 0).unit("s"))
            .variable(VarSpec::new("Lap", TYPE_CODE_INT, 8))
            .variable(VarSpec::new("Speed", TYPE_CODE_FLOAT, 12).unit("m/s"))
            .variable(VarSpec::new("Throttle", TYPE_CODE_FLOAT, 16).unit("%"))
            .variable(VarSpec::new("Brake", TYPE_CODE_FLOAT, 20).unit("%"))
            .session_info("WeekendInfo:\n TrackName: okayama\n\0\0\0")
    }

    fn session_frame(time: f64, lap: i32, speed: f32, throttle: f32, brake: f32) -> Vec<u8> {
        let mut bytes = time.to_le_bytes().to_vec();
        bytes.extend(frame_words(&[Word::I(lap), Word::F(speed), Word::F(throttle), Word::F(brake)]));
        bytes
    }

    fn three_laps() -> Vec<u8> {
        session_capture()
            .frame(session_frame(0.0, 5, 10.0, 1.0, 0.0))
            .frame(session_frame(1.0 / 60.0, 6, 20.0, 0.5, 0.0))
            .frame(session_frame(2.0 / 60.0, 6, 30.0, 0.0, 0.8))
            .frame(session_frame(3.0 / 60.0, 7, 40.0, 1.0, 0.0))
            .build()
    }

    #[test]
    fn test_reader_construction() -> Result<()> {
        let reader = IbtReader::from_bytes(three_laps()).context("decoding capture")?;

        assert_eq!(reader.total_frames(), 4);
        assert_eq!(reader.variables().len(), 5);
        assert_eq!(reader.tick_rate(), 60.0);
        assert_eq!(reader.file_path(), Path::new("<memory>"));
        assert_eq!(reader.disk_header().record_count, 4);
        Ok(())
    }

    #[test]
    fn test_tick_rate_fallback() -> Result<()> {
        let reader = IbtReader::from_bytes(session_capture().tick_rate(0).build())?;
        assert_eq!(reader.tick_rate(), 60.0);
        Ok(())
    }

    #[test]
    fn test_scan_with_lap_selector() -> Result<()> {
        let reader = IbtReader::from_bytes(three_laps())?;
        let channels = ["lap", "sessiontime", "speed", "throttle", "brake"];

        let rows: Vec<Vec<Sample>> =
            reader.scan(&channels, lap_equals("lap", 6)).collect::<crate::Result<_>>()?;

        ensure!(rows.len() == 2, "expected two frames on lap 6, got {}", rows.len());
        assert_eq!(rows[0][2].value, SampleValue::Float32(20.0));
        assert_eq!(rows[1][4].value, SampleValue::Float32(0.8));
        assert_eq!(rows[1][1].value, SampleValue::Float64(2.0 / 60.0));
        Ok(())
    }

    #[test]
    fn test_scan_all_stops_at_truncated_tail() -> Result<()> {
        let data = session_capture()
            .frame(session_frame(0.0, 1, 10.0, 1.0, 0.0))
            .frame(session_frame(0.1, 1, 11.0, 1.0, 0.0))
            .trailing_bytes(&[0xAB; 23])
            .build();
        let reader = IbtReader::from_bytes(data)?;

        let mut scan = reader.scan_all(&["speed"]);
        let rows: Vec<_> = scan.by_ref().collect::<crate::Result<Vec<_>>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(scan.frame_index(), 2);
        assert!(scan.next().is_none());
        Ok(())
    }

    #[test]
    fn test_scan_surfaces_unknown_channel_once() -> Result<()> {
        let reader = IbtReader::from_bytes(three_laps())?;
        let mut scan = reader.scan_all(&["speed", "rpm"]);

        match scan.next() {
            Some(Err(TelemetryError::UnknownVariable { name })) => assert_eq!(name, "rpm"),
            other => panic!("Expected UnknownVariable, got {:?}", other),
        }
        assert!(scan.next().is_none());
        Ok(())
    }

    #[test]
    fn test_scan_reports_descriptor_outside_complete_frames() -> Result<()> {
        let data = CaptureBuilder::new(12)
            .variable(VarSpec::new("Placeholder", TYPE_CODE_INT, 0))
            .variable(VarSpec::new("Speed", TYPE_CODE_FLOAT, 100))
            .empty_frames(2)
            .build();
        let reader = IbtReader::from_bytes(data)?;
        assert_eq!(reader.total_frames(), 2);

        let frame = reader.frame(0).context("first frame")?;
        let err = reader.extract(&frame, "speed").unwrap_err();
        ensure!(!err.is_end_of_data(), "complete frame must not report end of data");

        let mut scan = reader.scan_all(&["speed"]);
        assert!(matches!(scan.next(), Some(Err(TelemetryError::MalformedHeader { .. }))));
        assert!(scan.next().is_none());
        Ok(())
    }

    #[test]
    fn test_record_count_mismatch_is_not_fatal() -> Result<()> {
        let data = session_capture().empty_frames(2).record_count(10).build();
        let reader = IbtReader::from_bytes(data)?;
        assert_eq!(reader.total_frames(), 2);
        Ok(())
    }

    #[test]
    fn test_random_frame_access() -> Result<()> {
        let reader = IbtReader::from_bytes(three_laps())?;
        let frame = reader.frame(3).context("fourth frame")?;

        assert_eq!(reader.extract(&frame, "Lap")?.value, SampleValue::Int32(7));
        assert!(reader.frame(4).is_none());
        Ok(())
    }

    #[test]
    fn test_session_info_text() -> Result<()> {
        let reader = IbtReader::from_bytes(three_laps())?;
        let text = reader.session_info_text()?.context("session info should be present")?;

        assert_eq!(text, "WeekendInfo:\n TrackName: okayama\n");
        Ok(())
    }

    #[test]
    fn test_session_info_absent() -> Result<()> {
        let data = CaptureBuilder::new(4).variable(VarSpec::new("A", TYPE_CODE_INT, 0)).build();
        let reader = IbtReader::from_bytes(data)?;
        assert!(reader.session_info_text()?.is_none());
        Ok(())
    }

    #[test]
    fn test_custom_registry_resolves_bitfields() -> Result<()> {
        let data = CaptureBuilder::new(4)
            .variable(VarSpec::new("Placeholder", TYPE_CODE_INT, 0))
            .variable(VarSpec::new("SessionFlags", crate::types::TYPE_CODE_BITFIELD, 0))
            .frame(0x0010_0004i32.to_le_bytes().to_vec())
            .build();

        let standard = IbtReader::from_bytes(data.clone())?;
        let frame = standard.frame(0).context("first frame")?;
        assert!(matches!(
            standard.extract(&frame, "SessionFlags"),
            Err(TelemetryError::UnsupportedType { code: 3 })
        ));

        let registry = TypeRegistry::standard()
            .with_type(crate::types::TYPE_CODE_BITFIELD, crate::types::VariableType::Int32);
        let extended = IbtReader::with_registry(data, registry)?;
        let frame = extended.frame(0).context("first frame")?;
        assert_eq!(extended.extract(&frame, "sessionflags")?.value, SampleValue::Int32(0x0010_0004));
        Ok(())
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = IbtReader::open("/definitely/not/here.ibt").unwrap_err();
        match err {
            TelemetryError::File { path, .. } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.ibt"))
            }
            other => panic!("Expected File error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_capture_is_malformed() {
        let err = IbtReader::from_bytes(vec![0u8; 100]).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedHeader { .. }));
    }
}
