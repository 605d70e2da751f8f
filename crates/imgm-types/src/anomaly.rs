use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::sector::{SectorIndex, SECTOR_SIZE};

/// Code identifying why a sector was written to the anomaly log.
///
/// The numeric values are part of the log format and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum AnomalyCode {
    /// 1300: a plausible capture won by strict majority.
    PreferredSelection,
    /// 1400: a plausible capture was considered but lacked agreement.
    CandidateNotPreferred,
    /// 2100: two captures, file 0 plausible and file 1 suspect.
    PairFirstOverSuspect,
    /// 2200: two captures, file 1 plausible and file 0 suspect.
    PairSecondOverSuspect,
    /// 3100: every capture is suspect and they disagree.
    SuspectMismatch,
    /// 4000: nothing resolved the sector; the sentinel was written.
    NoSelection,
}

impl AnomalyCode {
    /// Every code, in ascending numeric order.
    pub const ALL: [AnomalyCode; 6] = [
        Self::PreferredSelection,
        Self::CandidateNotPreferred,
        Self::PairFirstOverSuspect,
        Self::PairSecondOverSuspect,
        Self::SuspectMismatch,
        Self::NoSelection,
    ];

    /// Numeric code as written to the log.
    pub fn code(self) -> u16 {
        match self {
            Self::PreferredSelection => 1300,
            Self::CandidateNotPreferred => 1400,
            Self::PairFirstOverSuspect => 2100,
            Self::PairSecondOverSuspect => 2200,
            Self::SuspectMismatch => 3100,
            Self::NoSelection => 4000,
        }
    }

    /// Returns `true` for codes that accompany an unresolved sector.
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::SuspectMismatch | Self::NoSelection)
    }
}

impl TryFrom<u16> for AnomalyCode {
    type Error = TypeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(TypeError::UnknownAnomalyCode(value))
    }
}

impl From<AnomalyCode> for u16 {
    fn from(code: AnomalyCode) -> Self {
        code.code()
    }
}

impl fmt::Display for AnomalyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One anomaly log record.
///
/// Rendered with [`fmt::Display`] as a single line, without terminator:
///
/// ```text
/// 1300: Sector 17      (0x00002200) File 0 matched 2 other reasonable data (preferred selection)
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyEntry {
    pub code: AnomalyCode,
    pub sector: SectorIndex,
    pub message: String,
}

impl AnomalyEntry {
    pub fn new(code: AnomalyCode, sector: SectorIndex, message: impl Into<String>) -> Self {
        Self {
            code,
            sector,
            message: message.into(),
        }
    }

    /// 1300: `source` agreed with `matches` captures (itself included).
    pub fn preferred(sector: SectorIndex, source: usize, matches: usize) -> Self {
        Self::new(
            AnomalyCode::PreferredSelection,
            sector,
            format!("File {source} matched {matches} other reasonable data (preferred selection)"),
        )
    }

    /// 1400: `source` agreed with too few captures to win.
    pub fn not_preferred(sector: SectorIndex, source: usize, matches: usize) -> Self {
        Self::new(
            AnomalyCode::CandidateNotPreferred,
            sector,
            format!("File {source} matched {matches} other reasonable data (not preferred)"),
        )
    }

    /// 2100 or 2200, depending on which of the two captures was kept.
    pub fn pair_over_suspect(sector: SectorIndex, source: usize) -> Self {
        let code = if source == 0 {
            AnomalyCode::PairFirstOverSuspect
        } else {
            AnomalyCode::PairSecondOverSuspect
        };
        Self::new(
            code,
            sector,
            format!("File {source} selected (2 files, one reasonable, one suspect)"),
        )
    }

    /// 3100: every capture is suspect and at least one differs.
    pub fn suspect_mismatch(sector: SectorIndex) -> Self {
        Self::new(
            AnomalyCode::SuspectMismatch,
            sector,
            "mismatched suspect repeated data",
        )
    }

    /// 4000: the sector is unresolved.
    pub fn no_selection(sector: SectorIndex) -> Self {
        Self::new(
            AnomalyCode::NoSelection,
            sector,
            "-- No automatically selectable data found",
        )
    }

    /// Byte offset of the sector this entry refers to.
    pub fn byte_offset(&self) -> u64 {
        self.sector.byte_offset()
    }
}

impl fmt::Display for AnomalyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Sector {:<7} ({:#010x}) {}",
            self.code,
            self.sector,
            self.byte_offset(),
            self.message
        )
    }
}

impl FromStr for AnomalyEntry {
    type Err = TypeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || TypeError::MalformedEntry(line.to_string());
        let line = line.trim_end_matches(['\r', '\n']);

        let (code, rest) = line.split_once(": Sector ").ok_or_else(malformed)?;
        let code = code.trim().parse::<u16>().map_err(|_| malformed())?;
        let code = AnomalyCode::try_from(code)?;

        let (sector, rest) = rest.split_once(" (").ok_or_else(malformed)?;
        let sector = SectorIndex(sector.trim().parse::<u64>().map_err(|_| malformed())?);

        let (offset, message) = rest.split_once(") ").ok_or_else(malformed)?;
        let offset = offset.strip_prefix("0x").ok_or_else(malformed)?;
        let offset = u64::from_str_radix(offset, 16).map_err(|_| malformed())?;
        let expected = sector.0.checked_mul(SECTOR_SIZE as u64).ok_or_else(malformed)?;
        if offset != expected {
            return Err(malformed());
        }

        Ok(Self::new(code, sector, message))
    }
}
