use core::fmt::Display;
use core::ops::{Add, AddAssign};

/// A duration in milliseconds.
///
/// Used for timer periods, delays and block times. The inner value is public so that
/// constants can be written as `Milliseconds(1000)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Milliseconds(pub u32);

impl Display for Milliseconds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

impl Milliseconds {
    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

/// A frequency in hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hertz(pub u32);

impl Hertz {
    /// Builds a frequency from a value in megahertz.
    ///
    /// # Panics
    /// Panics if the result does not fit in `u32` (above 4294 MHz). In a `const` item the
    /// overflow is reported at compile time.
    pub const fn mhz(p_mhz: u32) -> Self {
        match p_mhz.checked_mul(1_000_000) {
            Some(l_hz) => Hertz(l_hz),
            None => panic!("frequency does not fit in u32 hertz"),
        }
    }

    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

impl Display for Hertz {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} MHz", self.0 / 1_000_000)
    }
}

/// A point in time, in milliseconds elapsed since the time source started.
///
/// The 64-bit range never wraps during the lifetime of a device, so instants can be
/// compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Instant(u64);

impl Instant {
    /// The time source origin.
    pub const ZERO: Instant = Instant(0);

    pub const fn from_millis(p_millis: u64) -> Self {
        Instant(p_millis)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the time elapsed from `p_earlier` to `self`, or zero if `p_earlier` is later.
    ///
    /// Durations longer than `u32::MAX` milliseconds saturate.
    pub fn saturating_duration_since(&self, p_earlier: Instant) -> Milliseconds {
        let l_elapsed = self.0.saturating_sub(p_earlier.0);
        Milliseconds(u32::try_from(l_elapsed).unwrap_or(u32::MAX))
    }
}

impl Add<Milliseconds> for Instant {
    type Output = Instant;

    fn add(self, p_rhs: Milliseconds) -> Instant {
        Instant(self.0 + p_rhs.0 as u64)
    }
}

impl AddAssign<Milliseconds> for Instant {
    fn add_assign(&mut self, p_rhs: Milliseconds) {
        self.0 += p_rhs.0 as u64;
    }
}

impl Display for Instant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "t={} ms", self.0)
    }
}
