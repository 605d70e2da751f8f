use std::io::{self, Read, Write};

use imgm_types::{Block, SectorIndex, SECTOR_SIZE};

use crate::error::{MergeError, MergeResult};
use crate::log::AnomalyLog;

/// One capture of the image, read sequentially from its start.
pub struct InputSource<R> {
    /// Name used in error messages (usually the file path).
    pub label: String,
    reader: R,
}

impl<R: Read> InputSource<R> {
    pub fn new(label: impl Into<String>, reader: R) -> Self {
        Self {
            label: label.into(),
            reader,
        }
    }

    /// Fill `block` from the reader. Returns how many bytes were read.
    ///
    /// Keeps reading until the block is full or the reader reports end of
    /// stream, so readers that return partial chunks are handled.
    pub fn read_block(&mut self, block: &mut Block) -> io::Result<usize> {
        let mut filled = 0;
        while filled < block.len() {
            match self.reader.read(&mut block[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

/// Everything one merge run reads from and writes to.
///
/// Invariants checked on construction: at least two inputs, and an image
/// length that is a whole number of sectors. Equal input lengths are the
/// caller's responsibility; a shorter input surfaces as
/// [`MergeError::ShortRead`].
pub struct MergeSession<R, W, L> {
    pub(crate) inputs: Vec<InputSource<R>>,
    pub(crate) output: W,
    pub(crate) log: AnomalyLog<L>,
    image_len: u64,
}

impl<R: Read, W: Write, L: Write> MergeSession<R, W, L> {
    pub fn new(
        inputs: Vec<InputSource<R>>,
        output: W,
        log: L,
        image_len: u64,
    ) -> MergeResult<Self> {
        if inputs.len() < 2 {
            return Err(MergeError::InvalidSession(format!(
                "need at least two inputs, got {}",
                inputs.len()
            )));
        }
        if image_len % SECTOR_SIZE as u64 != 0 {
            return Err(MergeError::InvalidSession(format!(
                "image length {image_len} is not a multiple of {SECTOR_SIZE} bytes"
            )));
        }
        Ok(Self {
            inputs,
            output,
            log: AnomalyLog::new(log),
            image_len,
        })
    }

    /// Number of captures being merged.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Length in bytes of every input and of the merged output.
    pub fn image_len(&self) -> u64 {
        self.image_len
    }

    /// Number of sectors to process.
    pub fn total_sectors(&self) -> u64 {
        SectorIndex::count_for_len(self.image_len)
    }

    /// Input labels in input order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.label.as_str())
    }

    /// Release the output and log sinks.
    pub fn into_sinks(self) -> (W, L) {
        (self.output, self.log.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most `chunk` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn inputs(data: &[u8], count: usize) -> Vec<InputSource<&[u8]>> {
        (0..count)
            .map(|i| InputSource::new(format!("in{i}"), data))
            .collect()
    }

    #[test]
    fn read_block_full() {
        let data = vec![9u8; SECTOR_SIZE * 2];
        let mut src = InputSource::new("a", &data[..]);
        let mut block = [0u8; SECTOR_SIZE];
        assert_eq!(src.read_block(&mut block).unwrap(), SECTOR_SIZE);
        assert_eq!(block, [9u8; SECTOR_SIZE]);
    }

    #[test]
    fn read_block_reassembles_partial_reads() {
        let data: Vec<u8> = (0..SECTOR_SIZE).map(|i| i as u8).collect();
        let mut src = InputSource::new("a", Trickle { data: &data, chunk: 100 });
        let mut block = [0u8; SECTOR_SIZE];
        assert_eq!(src.read_block(&mut block).unwrap(), SECTOR_SIZE);
        assert_eq!(&block[..], &data[..]);
    }

    #[test]
    fn read_block_reports_short_count() {
        let data = vec![1u8; 200];
        let mut src = InputSource::new("a", &data[..]);
        let mut block = [0u8; SECTOR_SIZE];
        assert_eq!(src.read_block(&mut block).unwrap(), 200);
    }

    #[test]
    fn session_requires_two_inputs() {
        let data = vec![0u8; SECTOR_SIZE];
        let err = MergeSession::new(inputs(&data, 1), Vec::<u8>::new(), Vec::<u8>::new(), SECTOR_SIZE as u64)
            .err()
            .unwrap();
        assert!(matches!(err, MergeError::InvalidSession(_)));
        assert!(err.to_string().contains("at least two"));
    }

    #[test]
    fn session_requires_whole_sectors() {
        let data = vec![0u8; SECTOR_SIZE];
        let err = MergeSession::new(inputs(&data, 2), Vec::<u8>::new(), Vec::<u8>::new(), 700)
            .err()
            .unwrap();
        assert!(err.to_string().contains("multiple of 512"));
    }

    #[test]
    fn session_counts_sectors() {
        let data = vec![0u8; SECTOR_SIZE * 3];
        let session =
            MergeSession::new(inputs(&data, 3), Vec::<u8>::new(), Vec::<u8>::new(), data.len() as u64).unwrap();
        assert_eq!(session.input_count(), 3);
        assert_eq!(session.total_sectors(), 3);
        assert_eq!(session.labels().collect::<Vec<_>>(), vec!["in0", "in1", "in2"]);
    }
}
