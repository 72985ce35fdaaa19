//! Countdown to the wedding date.

/// How often a countdown banner is refreshed.
pub const TICK_INTERVAL_MS: u64 = 1000;

const SECOND_MS: u64 = 1000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Time left, split the way the banner shows it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownDisplay {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub ended: bool,
}

impl CountdownDisplay {
    pub const ENDED: CountdownDisplay = CountdownDisplay {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        ended: true,
    };

    pub fn from_remaining_ms(remaining_ms: u64) -> Self {
        if remaining_ms == 0 {
            return Self::ENDED;
        }
        Self {
            days: remaining_ms / DAY_MS,
            hours: remaining_ms % DAY_MS / HOUR_MS,
            minutes: remaining_ms % HOUR_MS / MINUTE_MS,
            seconds: remaining_ms % MINUTE_MS / SECOND_MS,
            ended: false,
        }
    }

    /// Zero-padded days, hours, minutes and seconds.
    pub fn parts(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|part| format!("{part:02}"))
    }
}

/// Countdown state of one banner.
///
/// Once the target is reached the countdown stays ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    target_ms: u64,
    ended: bool,
}

impl Countdown {
    pub fn new(target_ms: u64) -> Self {
        Self {
            target_ms,
            ended: false,
        }
    }

    pub fn target_ms(&self) -> u64 {
        self.target_ms
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn tick(&mut self, now_ms: u64) -> CountdownDisplay {
        if self.ended {
            return CountdownDisplay::ENDED;
        }
        let display = CountdownDisplay::from_remaining_ms(self.target_ms.saturating_sub(now_ms));
        self.ended = display.ended;
        display
    }
}
