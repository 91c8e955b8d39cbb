use crate::model::Ms;

pub const MAX_UNITS: usize = 65_536;
pub const MAX_AGENDAS_PER_UNIT: usize = 100_000;
pub const MAX_CODE_LEN: usize = 64;
pub const MAX_OWNER_NAME_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 4_096;

pub const MINUTES_PER_DAY: u32 = 1_440;

pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
/// 2100-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;
/// 90 days — long enough for any departure, short enough to catch unit mixups.
pub const MAX_SPAN_DURATION_MS: Ms = 90 * 24 * 3_600_000;
