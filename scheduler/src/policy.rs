//! Trigger policy: when the next scan cycle should fire.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// Every `every`, counted from scheduler start.
    Fixed { every: Duration },

    /// At every multiple of `period` since the Unix epoch, plus `offset`.
    /// An hourly period with a 5 minute offset fires at HH:05, after the
    /// upstream has closed the previous hour's candle.
    Aligned { period: Duration, offset: Duration },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule period must be non-zero")]
    ZeroPeriod,

    #[error("schedule offset {offset:?} must be shorter than the period {period:?}")]
    OffsetTooLarge { offset: Duration, period: Duration },
}

impl SchedulePolicy {
    pub fn fixed(every: Duration) -> Result<Self, ScheduleError> {
        if every.is_zero() {
            return Err(ScheduleError::ZeroPeriod);
        }
        Ok(SchedulePolicy::Fixed { every })
    }

    pub fn aligned(period: Duration, offset: Duration) -> Result<Self, ScheduleError> {
        if period.as_millis() == 0 {
            return Err(ScheduleError::ZeroPeriod);
        }
        if offset >= period {
            return Err(ScheduleError::OffsetTooLarge { offset, period });
        }
        Ok(SchedulePolicy::Aligned { period, offset })
    }

    /// Wall-clock time of the next aligned trigger strictly after `now_ms`.
    /// For `Fixed` this is simply `now_ms + every`.
    pub fn next_fire_ms(&self, now_ms: i64) -> i64 {
        match *self {
            SchedulePolicy::Fixed { every } => now_ms + every.as_millis() as i64,
            SchedulePolicy::Aligned { period, offset } => {
                let p = period.as_millis() as i64;
                let o = offset.as_millis() as i64;
                (now_ms - o).div_euclid(p) * p + o + p
            }
        }
    }

    pub fn delay_until_next(&self, now_ms: i64) -> Duration {
        let wait = (self.next_fire_ms(now_ms) - now_ms).max(0);
        Duration::from_millis(wait as u64)
    }

    pub fn describe(&self) -> String {
        match *self {
            SchedulePolicy::Fixed { every } => format!("every {} min", every.as_secs() / 60),
            SchedulePolicy::Aligned { period, offset } => format!(
                "every {} min, {} min past the boundary",
                period.as_secs() / 60,
                offset.as_secs() / 60
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);
    const FIVE_MIN: Duration = Duration::from_secs(300);
    // 2024-01-01T05:30:00Z
    const NOW: i64 = 1_704_087_000_000;
    const H6: i64 = 1_704_088_800_000;

    #[test]
    fn aligned_fires_at_offset_past_next_hour() {
        let p = SchedulePolicy::aligned(HOUR, FIVE_MIN).unwrap();
        // 06:05
        assert_eq!(p.next_fire_ms(NOW), H6 + 300_000);
        assert_eq!(p.delay_until_next(NOW), Duration::from_secs(35 * 60));
    }

    #[test]
    fn aligned_before_offset_fires_same_hour() {
        let p = SchedulePolicy::aligned(HOUR, FIVE_MIN).unwrap();
        // 06:02 -> 06:05
        assert_eq!(p.next_fire_ms(H6 + 120_000), H6 + 300_000);
    }

    #[test]
    fn aligned_exactly_on_trigger_moves_to_the_next_one() {
        let p = SchedulePolicy::aligned(HOUR, FIVE_MIN).unwrap();
        let at = H6 + 300_000;
        assert_eq!(p.next_fire_ms(at), at + 3_600_000);
    }

    #[test]
    fn fixed_adds_the_period() {
        let p = SchedulePolicy::fixed(Duration::from_secs(90)).unwrap();
        assert_eq!(p.next_fire_ms(NOW), NOW + 90_000);
    }

    #[test]
    fn invalid_policies_are_rejected() {
        assert_eq!(
            SchedulePolicy::fixed(Duration::ZERO),
            Err(ScheduleError::ZeroPeriod)
        );
        assert_eq!(
            SchedulePolicy::aligned(HOUR, HOUR),
            Err(ScheduleError::OffsetTooLarge {
                offset: HOUR,
                period: HOUR
            })
        );
    }

    #[test]
    fn describe_is_human_readable() {
        let p = SchedulePolicy::aligned(HOUR, FIVE_MIN).unwrap();
        assert_eq!(p.describe(), "every 60 min, 5 min past the boundary");
    }
}
