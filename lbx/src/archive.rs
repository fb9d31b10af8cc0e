use std::{
    ffi::OsStr,
    fs::File,
    io::{self, BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use crate::{
    constants::{ARCHIVE_HEADER_LENGTH, LBX_MAGIC, SMACKER_COUNT, SMACKER_MAGIC},
    error::{LbxError, LbxResult},
    parser::{parse_archive_header, parse_offset_table},
    types::AssetEntry,
};

/// Random access reads over the archive bytes.
pub trait ByteSource {
    fn length(&mut self) -> io::Result<u64>;
    /// Short reads are errors.
    fn read_range(&mut self, offset: u64, length: usize) -> io::Result<Vec<u8>>;
}

impl<T: Read + Seek> ByteSource for T {
    fn length(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }

    fn read_range(&mut self, offset: u64, length: usize) -> io::Result<Vec<u8>> {
        let mut res = vec![0u8; length];

        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(&mut res)?;

        Ok(res)
    }
}

pub struct Archive<S> {
    source: S,
    entries: Vec<AssetEntry>,
    /// End of the offset table.
    table_end: u64,
}

impl Archive<BufReader<File>> {
    pub fn open_from_file(path: impl AsRef<OsStr> + AsRef<Path>) -> LbxResult<Self> {
        let file = File::open(path)?;

        Self::new(BufReader::new(file))
    }
}

impl Archive<Cursor<Vec<u8>>> {
    pub fn open_from_bytes(bytes: impl Into<Vec<u8>>) -> LbxResult<Self> {
        Self::new(Cursor::new(bytes.into()))
    }
}

impl<S: ByteSource> Archive<S> {
    pub fn new(mut source: S) -> LbxResult<Self> {
        let file_length = source.length()?;

        if file_length < ARCHIVE_HEADER_LENGTH as u64 {
            return Err(LbxError::invalid_container(format!(
                "file is only {file_length} bytes"
            )));
        }

        let header_bytes = source.read_range(0, ARCHIVE_HEADER_LENGTH)?;
        let (_, header) = parse_archive_header(&header_bytes)
            .map_err(|_| LbxError::invalid_container("truncated header"))?;

        if header.asset_count == SMACKER_COUNT && header.magic == SMACKER_MAGIC {
            return Err(LbxError::SmackerVideo);
        }

        if header.magic != LBX_MAGIC {
            return Err(LbxError::invalid_container(format!(
                "bad magic {:#06x}",
                header.magic
            )));
        }

        let asset_count = header.asset_count as usize;
        let table_end = (ARCHIVE_HEADER_LENGTH + 4 * asset_count) as u64;

        if table_end > file_length {
            return Err(LbxError::invalid_container(format!(
                "offset table of {asset_count} entries exceeds file size {file_length}"
            )));
        }

        let table_bytes = source.read_range(ARCHIVE_HEADER_LENGTH as u64, 4 * asset_count)?;
        let (_, ends) = parse_offset_table(&table_bytes, asset_count)
            .map_err(|_| LbxError::invalid_container("truncated offset table"))?;

        let mut start = header.first_start;
        let mut entries = Vec::with_capacity(asset_count);

        for (index, end) in ends.into_iter().enumerate() {
            if end < start {
                return Err(LbxError::invalid_container(format!(
                    "entry {index} ends at {end} before its start {start}"
                )));
            }

            entries.push(AssetEntry {
                offset: start,
                length: end - start,
            });
            start = end;
        }

        log::debug!("archive with {asset_count} assets");

        Ok(Self {
            source,
            entries,
            table_end,
        })
    }

    pub fn asset_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> LbxResult<AssetEntry> {
        self.entries
            .get(index)
            .copied()
            .ok_or(LbxError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    /// Reads the bytes of one asset.
    pub fn load_asset(&mut self, index: usize) -> LbxResult<Vec<u8>> {
        let entry = self.entry(index)?;

        Ok(self
            .source
            .read_range(entry.offset as u64, entry.length as usize)?)
    }

    /// Position of the first non-zero byte between the offset table and the first asset.
    pub fn header_padding(&mut self) -> LbxResult<Option<u64>> {
        let Some(first) = self.entries.first() else {
            return Ok(None);
        };

        let file_length = self.source.length()?;
        let padding_end = (first.offset as u64).min(file_length);

        if padding_end <= self.table_end {
            return Ok(None);
        }

        let padding = self
            .source
            .read_range(self.table_end, (padding_end - self.table_end) as usize)?;

        Ok(padding
            .iter()
            .position(|&c| c != 0)
            .map(|position| self.table_end + position as u64))
    }
}
