//! Little endian byte buffer for building binary files by hand.

#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    pub data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the next appended byte.
    pub fn get_offset(&self) -> usize {
        self.data.len()
    }

    pub fn append_u8(&mut self, i: u8) -> &mut Self {
        self.data.push(i);
        self
    }

    pub fn append_u16(&mut self, i: u16) -> &mut Self {
        self.data.extend(i.to_le_bytes());
        self
    }

    pub fn append_u32(&mut self, i: u32) -> &mut Self {
        self.data.extend(i.to_le_bytes());
        self
    }

    pub fn append_u8_slice(&mut self, i: &[u8]) -> &mut Self {
        self.data.extend_from_slice(i);
        self
    }

    pub fn replace(&mut self, start: usize, slice: &[u8]) -> &mut Self {
        self.data[start..start + slice.len()].copy_from_slice(slice);
        self
    }

    pub fn replace_with_u32(&mut self, start: usize, val: u32) -> &mut Self {
        self.replace(start, &val.to_le_bytes())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
