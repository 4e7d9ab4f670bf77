//! Test utilities for building synthetic IBT captures
//!
//! Real recordings are large and tied to a specific car and track, so tests and
//! benchmarks build captures byte-for-byte with [`CaptureBuilder`] instead.
//!
//! Layout produced by [`CaptureBuilder::build`]:
//! main header (112) | disk sub-header (32) | variable records (144 each) |
//! session info text | frames

#![cfg(any(test, feature = "benchmark"))]

use crate::ibt::format::{IRSDK_DISK_SUBHEADER_SIZE, IRSDK_HEADER_SIZE, IRSDK_VAR_HEADER_SIZE};

/// One variable descriptor record to encode.
#[derive(Debug, Clone)]
pub struct VarSpec {
    name: String,
    description: String,
    unit: String,
    type_code: i32,
    offset: i32,
    count: i32,
    count_as_time: bool,
}

impl VarSpec {
    pub fn new(name: &str, type_code: i32, offset: usize) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            unit: String::new(),
            type_code,
            offset: offset as i32,
            count: 1,
            count_as_time: false,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn count(mut self, count: i32) -> Self {
        self.count = count;
        self
    }

    pub fn count_as_time(mut self, count_as_time: bool) -> Self {
        self.count_as_time = count_as_time;
        self
    }

    /// Store an arbitrary (possibly negative) offset.
    pub fn raw_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    fn encode(&self) -> [u8; IRSDK_VAR_HEADER_SIZE] {
        let mut record = [0u8; IRSDK_VAR_HEADER_SIZE];
        record[0..4].copy_from_slice(&self.type_code.to_le_bytes());
        record[4..8].copy_from_slice(&self.offset.to_le_bytes());
        record[8..12].copy_from_slice(&self.count.to_le_bytes());
        record[12] = u8::from(self.count_as_time);
        write_padded(&mut record[16..48], &self.name);
        write_padded(&mut record[48..112], &self.description);
        write_padded(&mut record[112..144], &self.unit);
        record
    }
}

/// Builder for an in-memory IBT capture.
#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    buf_len: usize,
    tick_rate: i32,
    variables: Vec<VarSpec>,
    session_info: Vec<u8>,
    frames: Vec<Vec<u8>>,
    trailing: Vec<u8>,
    disk_times: (f64, f64, f64),
    lap_count: i32,
    record_count: Option<i32>,
}

impl CaptureBuilder {
    /// Start a capture whose frames are `buf_len` bytes long.
    pub fn new(buf_len: usize) -> Self {
        Self {
            buf_len,
            tick_rate: 60,
            variables: Vec::new(),
            session_info: Vec::new(),
            frames: Vec::new(),
            trailing: Vec::new(),
            disk_times: (0.0, 0.0, 0.0),
            lap_count: 0,
            record_count: None,
        }
    }

    pub fn variable(mut self, spec: VarSpec) -> Self {
        self.variables.push(spec);
        self
    }

    pub fn tick_rate(mut self, tick_rate: i32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn session_info(mut self, text: &str) -> Self {
        self.session_info = text.as_bytes().to_vec();
        self
    }

    /// Raw session-info bytes, including any padding.
    pub fn session_info_bytes(mut self, bytes: &[u8]) -> Self {
        self.session_info = bytes.to_vec();
        self
    }

    /// Append one frame; it is resized to `buf_len`.
    pub fn frame(mut self, mut bytes: Vec<u8>) -> Self {
        bytes.resize(self.buf_len, 0);
        self.frames.push(bytes);
        self
    }

    /// Append `count` zero-filled frames.
    pub fn empty_frames(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.frames.push(vec![0u8; self.buf_len]);
        }
        self
    }

    /// Bytes appended after the last complete frame, e.g. a partial write.
    pub fn trailing_bytes(mut self, bytes: &[u8]) -> Self {
        self.trailing = bytes.to_vec();
        self
    }

    pub fn disk_times(mut self, start_date: f64, start_time: f64, end_time: f64) -> Self {
        self.disk_times = (start_date, start_time, end_time);
        self
    }

    pub fn lap_count(mut self, lap_count: i32) -> Self {
        self.lap_count = lap_count;
        self
    }

    /// Override the disk header record count (defaults to the number of frames).
    pub fn record_count(mut self, record_count: i32) -> Self {
        self.record_count = Some(record_count);
        self
    }

    /// Offset at which the first frame starts.
    pub fn buf_offset(&self) -> usize {
        self.var_table_offset()
            + self.variables.len() * IRSDK_VAR_HEADER_SIZE
            + self.session_info.len()
    }

    fn var_table_offset(&self) -> usize {
        IRSDK_HEADER_SIZE + IRSDK_DISK_SUBHEADER_SIZE
    }

    pub fn build(&self) -> Vec<u8> {
        let var_header_offset = self.var_table_offset();
        let session_info_offset = var_header_offset + self.variables.len() * IRSDK_VAR_HEADER_SIZE;
        let buf_offset = self.buf_offset();

        let mut data = vec![0u8; var_header_offset];
        let fields: [(usize, i32); 11] = [
            (0, 2),
            (4, 1),
            (8, self.tick_rate),
            (12, 0),
            (16, self.session_info.len() as i32),
            (20, session_info_offset as i32),
            (24, self.variables.len() as i32),
            (28, var_header_offset as i32),
            (32, 1),
            (36, self.buf_len as i32),
            (52, buf_offset as i32),
        ];
        for (offset, value) in fields {
            data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }

        let disk = IRSDK_HEADER_SIZE;
        let (start_date, start_time, end_time) = self.disk_times;
        data[disk..disk + 8].copy_from_slice(&start_date.to_le_bytes());
        data[disk + 8..disk + 16].copy_from_slice(&start_time.to_le_bytes());
        data[disk + 16..disk + 24].copy_from_slice(&end_time.to_le_bytes());
        data[disk + 24..disk + 28].copy_from_slice(&self.lap_count.to_le_bytes());
        let record_count = self.record_count.unwrap_or(self.frames.len() as i32);
        data[disk + 28..disk + 32].copy_from_slice(&record_count.to_le_bytes());

        for spec in &self.variables {
            data.extend_from_slice(&spec.encode());
        }
        data.extend_from_slice(&self.session_info);
        for frame in &self.frames {
            data.extend_from_slice(frame);
        }
        data.extend_from_slice(&self.trailing);
        data
    }
}

/// Frame bytes from little-endian `i32`/`f32` words.
pub fn frame_words(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// A 4-byte frame word.
#[derive(Debug, Clone, Copy)]
pub enum Word {
    I(i32),
    F(f32),
}

impl Word {
    fn to_le_bytes(self) -> [u8; 4] {
        match self {
            Word::I(v) => v.to_le_bytes(),
            Word::F(v) => v.to_le_bytes(),
        }
    }
}

fn write_padded(dest: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(dest.len());
    dest[..len].copy_from_slice(&bytes[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let builder = CaptureBuilder::new(8)
            .variable(VarSpec::new("A", 2, 0))
            .variable(VarSpec::new("B", 4, 4))
            .session_info("abc")
            .empty_frames(2)
            .trailing_bytes(&[1, 2, 3]);
        let data = builder.build();

        assert_eq!(builder.buf_offset(), 144 + 2 * 144 + 3);
        assert_eq!(data.len(), builder.buf_offset() + 2 * 8 + 3);
        assert_eq!(&data[data.len() - 3..], &[1, 2, 3]);
    }

    #[test]
    fn test_frame_is_resized_to_buf_len() {
        let data = CaptureBuilder::new(4).frame(vec![9]).build();
        assert_eq!(data.len(), 144 + 4);
        assert_eq!(&data[144..], &[9, 0, 0, 0]);
    }

    #[test]
    fn test_frame_words_encode_little_endian() {
        assert_eq!(frame_words(&[Word::I(1), Word::F(25.0)]), [1, 0, 0, 0, 0, 0, 200, 65]);
    }
}
