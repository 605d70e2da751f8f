use std::io::{Read, Write};

use tracing::{debug, info, warn};

use imgm_gate::SectorSelector;
use imgm_scan::SectorClassifier;
use imgm_types::{SectorIndex, SelectionOutcome, SECTOR_SIZE};

use crate::arena::SectorArena;
use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::progress::ProgressObserver;
use crate::report::MergeReport;
use crate::session::MergeSession;

/// Lifecycle of a merge run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing read yet.
    Init,
    /// Sectors before `next` have been written.
    Streaming { next: SectorIndex },
    /// Every sector is written; sinks still need flushing.
    Finalizing,
    /// Terminal. Further calls fail with [`MergeError::Finished`].
    Done,
    /// Terminal after a fatal I/O error. The inputs are no longer aligned
    /// on a sector boundary, so the run cannot resume.
    Failed,
}

/// Streams every sector of every input through the selector and writes the
/// merged image and anomaly log.
///
/// Sectors are processed strictly in increasing order; output and log
/// writes are append-only, so output offset `k * 512` always holds the
/// decision for sector `k`. Any read or write failure aborts the run.
pub struct MergeDriver<R, W, L> {
    session: MergeSession<R, W, L>,
    selector: SectorSelector,
    classifier: SectorClassifier,
    config: MergeConfig,
    arena: SectorArena,
    state: DriverState,
    report: MergeReport,
}

impl<R: Read, W: Write, L: Write> MergeDriver<R, W, L> {
    /// Create a driver with the default selection pipeline.
    pub fn new(session: MergeSession<R, W, L>, config: MergeConfig) -> MergeResult<Self> {
        Self::with_selector(session, config, SectorSelector::with_default_rules())
    }

    /// Create a driver with a caller-supplied selection pipeline.
    pub fn with_selector(
        session: MergeSession<R, W, L>,
        config: MergeConfig,
        selector: SectorSelector,
    ) -> MergeResult<Self> {
        config.validate()?;
        let report = MergeReport {
            inputs: session.input_count(),
            total_sectors: session.total_sectors(),
            ..Default::default()
        };
        Ok(Self {
            arena: SectorArena::new(session.input_count()),
            classifier: config.classifier(),
            session,
            selector,
            config,
            state: DriverState::Init,
            report,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Counts accumulated so far.
    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Give back the session, e.g. to recover in-memory sinks.
    pub fn into_session(self) -> MergeSession<R, W, L> {
        self.session
    }

    /// Perform one state transition and return the new state.
    pub fn advance(&mut self) -> MergeResult<DriverState> {
        let total = self.session.total_sectors();

        self.state = match self.state {
            DriverState::Init => {
                info!(
                    inputs = self.session.input_count(),
                    sectors = total,
                    bytes = self.session.image_len(),
                    "merge started"
                );
                if total == 0 {
                    DriverState::Finalizing
                } else {
                    DriverState::Streaming {
                        next: SectorIndex(0),
                    }
                }
            }
            DriverState::Streaming { next } => {
                if let Err(err) = self.process_sector(next) {
                    self.state = DriverState::Failed;
                    return Err(err);
                }
                let following = next.next();
                if following.0 < total {
                    DriverState::Streaming { next: following }
                } else {
                    DriverState::Finalizing
                }
            }
            DriverState::Finalizing => {
                if let Err(err) = self.flush_sinks() {
                    self.state = DriverState::Failed;
                    return Err(err);
                }
                info!(
                    selected = self.report.selected,
                    unresolved = self.report.unresolved,
                    anomalies = self.session.log.lines(),
                    "merge finished"
                );
                DriverState::Done
            }
            DriverState::Done | DriverState::Failed => return Err(MergeError::Finished),
        };

        Ok(self.state)
    }

    /// Drive the run to completion.
    ///
    /// `progress` is notified before every sector whose index is a multiple
    /// of the configured interval, and once more after the final flush.
    pub fn run(&mut self, progress: &mut dyn ProgressObserver) -> MergeResult<MergeReport> {
        let total = self.session.total_sectors();

        loop {
            if let DriverState::Streaming { next } = self.state {
                if next.0 % self.config.progress_interval == 0 {
                    progress.on_progress(next.0, total);
                }
            }
            if self.advance()? == DriverState::Done {
                break;
            }
        }

        progress.on_finish(total);
        Ok(self.report.clone())
    }

    fn flush_sinks(&mut self) -> MergeResult<()> {
        self.session.output.flush()?;
        self.session.log.flush()?;
        Ok(())
    }

    fn process_sector(&mut self, sector: SectorIndex) -> MergeResult<()> {
        for (slot, input) in self.session.inputs.iter_mut().enumerate() {
            let block = self.arena.clear_input(slot);
            let read = input.read_block(block).map_err(|error| MergeError::Read {
                sector,
                input: input.label.clone(),
                error,
            })?;
            if read != SECTOR_SIZE {
                return Err(MergeError::ShortRead {
                    sector,
                    input: input.label.clone(),
                    expected: SECTOR_SIZE,
                    actual: read,
                });
            }
        }

        let selection = self
            .selector
            .assess(sector, self.arena.inputs(), &self.classifier);

        let block = self.arena.stage_output(selection.outcome);
        self.session
            .output
            .write_all(block)
            .map_err(|error| MergeError::OutputWrite { sector, error })?;
        self.report.bytes_written += SECTOR_SIZE as u64;

        for entry in &selection.entries {
            self.session
                .log
                .record(entry)
                .map_err(|error| MergeError::LogWrite { sector, error })?;
            *self.report.anomalies.entry(entry.code).or_insert(0) += 1;
        }

        match selection.outcome {
            SelectionOutcome::Selected(_) => self.report.selected += 1,
            SelectionOutcome::Unresolved => {
                self.report.unresolved += 1;
                warn!(sector = %sector, offset = sector.byte_offset(), "sector unresolved, sentinel written");
            }
        }
        if !selection.entries.is_empty() {
            debug!(
                sector = %sector,
                outcome = %selection.outcome,
                anomalies = selection.entries.len(),
                "sector flagged for review"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::progress::NoProgress;
    use crate::session::InputSource;
    use imgm_types::{sentinel_block, AnomalyCode, AnomalyEntry, Block};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn plausible(seed: u64) -> Block {
        let mut block = [0u8; SECTOR_SIZE];
        StdRng::seed_from_u64(seed).fill(&mut block[..]);
        block[SECTOR_SIZE - 2] = 0x11;
        block[SECTOR_SIZE - 1] = 0x22;
        block
    }

    fn suspect(seed: u64) -> Block {
        let mut block = plausible(seed);
        block[SECTOR_SIZE - 100..].fill(0x00);
        block
    }

    fn image(blocks: &[Block]) -> Vec<u8> {
        blocks.concat()
    }

    fn sector(bytes: &[u8], index: usize) -> &[u8] {
        &bytes[index * SECTOR_SIZE..(index + 1) * SECTOR_SIZE]
    }

    /// Merge in-memory images, returning output, log text, and report.
    fn merge(images: &[Vec<u8>]) -> (Vec<u8>, String, MergeReport) {
        merge_with(images, MergeConfig::default(), &mut NoProgress)
    }

    fn merge_with(
        images: &[Vec<u8>],
        config: MergeConfig,
        progress: &mut dyn ProgressObserver,
    ) -> (Vec<u8>, String, MergeReport) {
        let inputs = images
            .iter()
            .enumerate()
            .map(|(i, img)| InputSource::new(format!("capture{i}"), &img[..]))
            .collect();
        let session =
            MergeSession::new(inputs, Vec::<u8>::new(), Vec::<u8>::new(), images[0].len() as u64)
                .unwrap();
        let mut driver = MergeDriver::new(session, config).unwrap();
        let report = driver.run(progress).unwrap();
        let (output, log) = driver.into_session().into_sinks();
        (output, String::from_utf8(log).unwrap(), report)
    }

    #[test]
    fn identical_inputs_copy_through_silently() {
        let img = image(&[plausible(1), [0u8; SECTOR_SIZE], [0xFF; SECTOR_SIZE], plausible(2)]);
        let (output, log, report) = merge(&[img.clone(), img.clone(), img.clone()]);
        assert_eq!(output, img);
        assert!(log.is_empty());
        assert_eq!(report.selected, 4);
        assert_eq!(report.unresolved, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn mixed_sectors() {
        let a = plausible(10);
        let b = plausible(20);
        let s = suspect(30);
        let zero = [0u8; SECTOR_SIZE];

        let captures = [
            image(&[zero, a, a, s]),
            image(&[zero, b, b, s]),
            image(&[zero, a, plausible(40), s]),
        ];
        let (output, log, report) = merge(&captures);

        assert_eq!(output.len(), captures[0].len());
        assert_eq!(sector(&output, 0), &zero[..]);
        assert_eq!(sector(&output, 1), &a[..]);
        assert_eq!(sector(&output, 2), &sentinel_block()[..]);
        assert_eq!(sector(&output, 3), &s[..]);

        let entries: Vec<AnomalyEntry> = log.lines().map(|l| l.parse().unwrap()).collect();
        let codes: Vec<(u64, u16)> = entries.iter().map(|e| (e.sector.0, e.code.code())).collect();
        assert_eq!(
            codes,
            vec![(1, 1300), (2, 1400), (2, 1400), (2, 1400), (2, 4000)]
        );

        assert_eq!(report.selected, 3);
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.bytes_written, output.len() as u64);
        assert_eq!(report.anomaly_count(AnomalyCode::CandidateNotPreferred), 3);
        assert_eq!(report.total_anomalies(), 5);
    }

    #[test]
    fn two_capture_tiebreak_and_mismatched_suspects() {
        let p = plausible(1);
        let (s1, s2) = (suspect(2), suspect(3));
        let captures = [image(&[p, s1]), image(&[s1, s2])];
        let (output, log, report) = merge(&captures);

        assert_eq!(sector(&output, 0), &p[..]);
        assert_eq!(sector(&output, 1), &sentinel_block()[..]);
        let codes: Vec<u16> = log
            .lines()
            .map(|l| l.parse::<AnomalyEntry>().unwrap().code.code())
            .collect();
        assert_eq!(codes, vec![1400, 2100, 3100, 4000]);
        assert_eq!(report.unresolved, 1);
    }

    #[test]
    fn short_read_is_fatal() {
        let full = image(&[plausible(1), plausible(2)]);
        let mut short = full.clone();
        short.truncate(SECTOR_SIZE + 100);

        let inputs = vec![
            InputSource::new("good", &full[..]),
            InputSource::new("truncated", &short[..]),
        ];
        let session =
            MergeSession::new(inputs, Vec::<u8>::new(), Vec::<u8>::new(), full.len() as u64).unwrap();
        let mut driver = MergeDriver::new(session, MergeConfig::default()).unwrap();

        let err = driver.run(&mut NoProgress).unwrap_err();
        match &err {
            MergeError::ShortRead {
                sector,
                input,
                expected,
                actual,
            } => {
                assert_eq!(*sector, SectorIndex(1));
                assert_eq!(input, "truncated");
                assert_eq!(*expected, SECTOR_SIZE);
                assert_eq!(*actual, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("sector 1"));

        // Only the sector before the failure was written.
        let (output, _) = driver.into_session().into_sinks();
        assert_eq!(output, full[..SECTOR_SIZE].to_vec());
    }

    #[test]
    fn read_error_names_input() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "bad sector"))
            }
        }

        let inputs: Vec<InputSource<Box<dyn Read>>> = vec![
            InputSource::new("ok", Box::new(io::repeat(0)) as Box<dyn Read>),
            InputSource::new("flaky", Box::new(Broken) as Box<dyn Read>),
        ];
        let session = MergeSession::new(
            inputs,
            Vec::<u8>::new(),
            Vec::<u8>::new(),
            SECTOR_SIZE as u64,
        )
        .unwrap();
        let mut driver = MergeDriver::new(session, MergeConfig::default()).unwrap();
        let err = driver.run(&mut NoProgress).unwrap_err();
        assert!(matches!(err, MergeError::Read { ref input, .. } if input == "flaky"));
    }

    #[test]
    fn failed_run_cannot_resume() {
        /// Fails the first read, then serves zeros.
        struct Transient {
            failed: bool,
        }
        impl Read for Transient {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.failed {
                    self.failed = true;
                    return Err(io::Error::new(io::ErrorKind::Other, "transient"));
                }
                buf.fill(0);
                Ok(buf.len())
            }
        }

        let fill = image(&[[0xFF; SECTOR_SIZE], [0xFF; SECTOR_SIZE]]);
        let inputs: Vec<InputSource<Box<dyn Read>>> = vec![
            InputSource::new("a", Box::new(io::Cursor::new(fill.clone())) as Box<dyn Read>),
            InputSource::new("b", Box::new(Transient { failed: false }) as Box<dyn Read>),
        ];
        let session =
            MergeSession::new(inputs, Vec::<u8>::new(), Vec::<u8>::new(), fill.len() as u64)
                .unwrap();
        let mut driver = MergeDriver::new(session, MergeConfig::default()).unwrap();

        let err = driver.run(&mut NoProgress).unwrap_err();
        assert!(matches!(err, MergeError::Read { sector: SectorIndex(0), .. }));
        assert_eq!(driver.state(), DriverState::Failed);

        assert!(matches!(driver.run(&mut NoProgress), Err(MergeError::Finished)));
        assert!(matches!(driver.advance(), Err(MergeError::Finished)));
        assert_eq!(driver.state(), DriverState::Failed);

        let (output, log) = driver.into_session().into_sinks();
        assert!(output.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn output_write_failure_is_fatal() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let img = image(&[plausible(1)]);
        let inputs = vec![InputSource::new("a", &img[..]), InputSource::new("b", &img[..])];
        let session = MergeSession::new(inputs, Full, Vec::<u8>::new(), img.len() as u64).unwrap();
        let mut driver = MergeDriver::new(session, MergeConfig::default()).unwrap();
        let err = driver.run(&mut NoProgress).unwrap_err();
        assert!(matches!(err, MergeError::OutputWrite { sector: SectorIndex(0), .. }));
    }

    #[test]
    fn state_machine_transitions() {
        let img = image(&[plausible(1), plausible(2)]);
        let inputs = vec![InputSource::new("a", &img[..]), InputSource::new("b", &img[..])];
        let session =
            MergeSession::new(inputs, Vec::<u8>::new(), Vec::<u8>::new(), img.len() as u64).unwrap();
        let mut driver = MergeDriver::new(session, MergeConfig::default()).unwrap();

        assert_eq!(driver.state(), DriverState::Init);
        assert_eq!(
            driver.advance().unwrap(),
            DriverState::Streaming { next: SectorIndex(0) }
        );
        assert_eq!(
            driver.advance().unwrap(),
            DriverState::Streaming { next: SectorIndex(1) }
        );
        assert_eq!(driver.report().processed(), 1);
        assert_eq!(driver.advance().unwrap(), DriverState::Finalizing);
        assert_eq!(driver.advance().unwrap(), DriverState::Done);
        assert!(matches!(driver.advance(), Err(MergeError::Finished)));
        assert!(matches!(driver.run(&mut NoProgress), Err(MergeError::Finished)));
    }

    #[test]
    fn empty_image() {
        let (output, log, report) = merge(&[Vec::new(), Vec::new()]);
        assert!(output.is_empty());
        assert!(log.is_empty());
        assert_eq!(report.total_sectors, 0);
    }

    #[test]
    fn progress_fires_on_interval() {
        let img = vec![0u8; SECTOR_SIZE * 600];
        let mut seen = Vec::new();
        let mut observer = |done: u64, total: u64| seen.push((done, total));
        let (output, _, report) =
            merge_with(&[img.clone(), img.clone()], MergeConfig::default(), &mut observer);
        assert_eq!(seen, vec![(0, 600), (256, 600), (512, 600)]);
        assert_eq!(output.len(), img.len());
        assert_eq!(report.selected, 600);
    }

    #[test]
    fn finish_notification() {
        struct Recorder {
            ticks: u64,
            finished: Option<u64>,
        }
        impl ProgressObserver for Recorder {
            fn on_progress(&mut self, _done: u64, _total: u64) {
                self.ticks += 1;
            }
            fn on_finish(&mut self, total: u64) {
                self.finished = Some(total);
            }
        }

        let img = vec![0u8; SECTOR_SIZE * 10];
        let config = MergeConfig {
            progress_interval: 3,
            ..Default::default()
        };
        let mut recorder = Recorder {
            ticks: 0,
            finished: None,
        };
        merge_with(&[img.clone(), img], config, &mut recorder);
        // Sectors 0, 3, 6, 9.
        assert_eq!(recorder.ticks, 4);
        assert_eq!(recorder.finished, Some(10));
    }

    #[test]
    fn invalid_config_rejected() {
        let img = image(&[plausible(1)]);
        let inputs = vec![InputSource::new("a", &img[..]), InputSource::new("b", &img[..])];
        let session =
            MergeSession::new(inputs, Vec::<u8>::new(), Vec::<u8>::new(), img.len() as u64).unwrap();
        let config = MergeConfig {
            progress_interval: 0,
            ..Default::default()
        };
        assert!(matches!(
            MergeDriver::new(session, config),
            Err(MergeError::Config(_))
        ));
    }

    fn palette(choice: usize) -> Block {
        match choice {
            0 => [0u8; SECTOR_SIZE],
            1 => [0xFFu8; SECTOR_SIZE],
            2 => plausible(100),
            3 => plausible(200),
            _ => suspect(300),
        }
    }

    proptest! {
        #[test]
        fn each_output_sector_depends_only_on_its_inputs(
            layout in proptest::collection::vec(proptest::collection::vec(0usize..5, 3), 1..6)
        ) {
            let captures: Vec<Vec<u8>> = (0..3)
                .map(|c| image(&layout.iter().map(|row| palette(row[c])).collect::<Vec<_>>()))
                .collect();
            let (output, _, report) = merge(&captures);
            prop_assert_eq!(output.len(), captures[0].len());
            prop_assert_eq!(report.processed(), layout.len() as u64);

            for (k, row) in layout.iter().enumerate() {
                let alone: Vec<Vec<u8>> = row.iter().map(|&c| palette(c).to_vec()).collect();
                let (single, _, _) = merge(&alone);
                prop_assert_eq!(sector(&output, k), &single[..]);
            }
        }
    }
}
