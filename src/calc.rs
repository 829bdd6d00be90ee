use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Percentages strictly below this are at risk.
pub const AT_RISK_PERCENT: u32 = 75;

/// Attendance fraction a recovery plan aims for.
pub const RECOVERY_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("attended ({attended}) exceeds total ({total})")]
    AttendedExceedsTotal { attended: u32, total: u32 },
    #[error("threshold must be strictly between 0 and 1, got {0}")]
    ThresholdOutOfRange(f64),
}

impl CalcError {
    pub fn code(&self) -> &'static str {
        match self {
            CalcError::AttendedExceedsTotal { .. } => "bad_params",
            CalcError::ThresholdOutOfRange(_) => "bad_params",
        }
    }
}

/// Cumulative class counts for one learner in one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct AttendanceRecord {
    attended: u32,
    total: u32,
}

#[derive(Deserialize)]
struct RawRecord {
    attended: u32,
    total: u32,
}

impl TryFrom<RawRecord> for AttendanceRecord {
    type Error = CalcError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        AttendanceRecord::new(raw.attended, raw.total)
    }
}

impl AttendanceRecord {
    pub fn new(attended: u32, total: u32) -> Result<Self, CalcError> {
        if attended > total {
            return Err(CalcError::AttendedExceedsTotal { attended, total });
        }
        Ok(Self { attended, total })
    }

    pub fn attended(&self) -> u32 {
        self.attended
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn missed(&self) -> u32 {
        self.total - self.attended
    }

    pub fn percentage(&self) -> u32 {
        percentage(self.attended, self.total)
    }

    /// Exact-ratio check used for alerts: `attended / total < 0.75`.
    /// A subject with no classes yet never falls short.
    pub fn falls_short(&self) -> bool {
        self.total > 0 && 4 * u64::from(self.attended) < 3 * u64::from(self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Risk {
    OnTrack,
    AtRisk,
}

/// Rounded attendance percentage in `0..=100`; `0` when there are no classes.
///
/// Rounds half up in integer arithmetic. An `attended` above `total` is
/// clamped so the result never exceeds 100.
pub fn percentage(attended: u32, total: u32) -> u32 {
    percent_of(u64::from(attended), u64::from(total))
}

fn percent_of(attended: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let a = u128::from(attended.min(total));
    let t = u128::from(total);
    ((200 * a + t) / (2 * t)) as u32
}

pub fn classify(percentage: u32) -> Risk {
    if percentage < AT_RISK_PERCENT {
        Risk::AtRisk
    } else {
        Risk::OnTrack
    }
}

/// Consecutive classes still to attend to reach 75%, where every extra
/// class also counts toward the total.
///
/// `ceil((0.75 * total - attended) / 0.25)` simplifies to
/// `3 * total - 4 * attended`, so the fixed policy stays in integers.
pub fn recovery_target(attended: u32, total: u32) -> u64 {
    recovery_for(u64::from(attended), u64::from(total))
}

fn recovery_for(attended: u64, total: u64) -> u64 {
    let a = u128::from(attended.min(total));
    let t = u128::from(total);
    let needed = (3 * t).saturating_sub(4 * a);
    u64::try_from(needed).unwrap_or(u64::MAX)
}

pub fn validate_threshold(threshold: f64) -> Result<f64, CalcError> {
    if threshold > 0.0 && threshold < 1.0 {
        Ok(threshold)
    } else {
        Err(CalcError::ThresholdOutOfRange(threshold))
    }
}

/// Same as [`recovery_target`] for an arbitrary threshold in `(0, 1)`.
pub fn recovery_target_with(attended: u32, total: u32, threshold: f64) -> Result<u64, CalcError> {
    recovery_for_with(u64::from(attended), u64::from(total), threshold)
}

fn recovery_for_with(attended: u64, total: u64, threshold: f64) -> Result<u64, CalcError> {
    let threshold = validate_threshold(threshold)?;
    if total == 0 {
        return Ok(0);
    }
    let a = attended.min(total) as f64;
    let t = total as f64;
    if a / t >= threshold {
        return Ok(0);
    }
    // Absorb representation error so exact integer solutions don't round up.
    let needed = ((threshold * t - a) / (1.0 - threshold) - 1e-9).ceil();
    // Saturates only for thresholds within a hair of 1.
    Ok(needed.max(0.0) as u64)
}

/// Per-subject figures shown on a dashboard card or roster row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub attended: u64,
    pub total: u64,
    pub missed: u64,
    pub percentage: u32,
    pub risk: Risk,
    pub recovery_target: u64,
}

/// Attended and total classes summed over any number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub attended: u64,
    pub total: u64,
}

impl From<&AttendanceRecord> for Tally {
    fn from(r: &AttendanceRecord) -> Self {
        Tally {
            attended: u64::from(r.attended()),
            total: u64::from(r.total()),
        }
    }
}

impl Tally {
    pub fn percentage(&self) -> u32 {
        percent_of(self.attended, self.total)
    }

    pub fn standing(&self) -> Standing {
        self.standing_using(recovery_for(self.attended, self.total))
    }

    pub fn standing_with(&self, threshold: f64) -> Result<Standing, CalcError> {
        let target = recovery_for_with(self.attended, self.total, threshold)?;
        Ok(self.standing_using(target))
    }

    fn standing_using(&self, recovery_target: u64) -> Standing {
        let pct = self.percentage();
        Standing {
            attended: self.attended,
            total: self.total,
            missed: self.total - self.attended.min(self.total),
            percentage: pct,
            risk: classify(pct),
            recovery_target,
        }
    }
}

pub fn standing(record: &AttendanceRecord) -> Standing {
    Tally::from(record).standing()
}

/// Sum of all records, e.g. a learner's attendance across every subject.
pub fn overall<'a, I>(records: I) -> Tally
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records.into_iter().fold(Tally::default(), |acc, r| Tally {
        attended: acc.attended + u64::from(r.attended()),
        total: acc.total + u64::from(r.total()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub mean: u32,
    pub median: u32,
    pub at_risk_count: usize,
}

pub fn aggregate(values: &[u32]) -> AggregateStats {
    if values.is_empty() {
        return AggregateStats::default();
    }
    let n = values.len() as u64;
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    let mean = ((2 * sum + n) / (2 * n)) as u32;

    AggregateStats {
        mean,
        median: median(values),
        at_risk_count: values.iter().filter(|v| **v < AT_RISK_PERCENT).count(),
    }
}

fn median(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        let pair = u64::from(sorted[mid - 1]) + u64::from(sorted[mid]);
        ((pair + 1) / 2) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    pub label: &'static str,
    pub count: usize,
}

const BUCKET_LABELS: [&str; 4] = ["<50%", "50-75%", "75-90%", "90%+"];

pub fn histogram(values: &[u32]) -> [HistogramBucket; 4] {
    let mut counts = [0usize; 4];
    for v in values {
        let idx = if *v < 50 {
            0
        } else if *v < 75 {
            1
        } else if *v < 90 {
            2
        } else {
            3
        };
        counts[idx] += 1;
    }
    std::array::from_fn(|i| HistogramBucket {
        label: BUCKET_LABELS[i],
        count: counts[i],
    })
}

/// Deterministic stand-in for a learner's attendance in a subject roster.
/// Always lands in `50..=100`.
pub fn mock_roster_percentage(student_id: &str, subject_code: &str) -> u32 {
    let hash: u64 = student_id
        .encode_utf16()
        .chain(subject_code.encode_utf16())
        .map(u64::from)
        .sum();
    50 + (hash % 51) as u32
}
