//! Abilities domain: clamped meters, countdowns, and the per-ability phase.

/// Which way a [`ResourceMeter`] moves on `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterDirection {
    Drain,
    Regen,
}

/// Clamped resource (stamina) with depletion hysteresis.
///
/// Draining to zero sets `locked`; the lock only clears once regeneration
/// brings the value back to exactly `capacity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceMeter {
    value: f32,
    capacity: f32,
    locked: bool,
}

impl ResourceMeter {
    pub fn full(capacity: f32) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            value: capacity,
            capacity,
            locked: false,
        }
    }

    pub fn advance(&mut self, delta: f32, direction: MeterDirection) {
        let signed = match direction {
            MeterDirection::Drain => -delta,
            MeterDirection::Regen => delta,
        };
        self.value = (self.value + signed).clamp(0.0, self.capacity);

        match direction {
            MeterDirection::Drain if self.value <= 0.0 => self.locked = true,
            MeterDirection::Regen if self.value >= self.capacity => self.locked = false,
            _ => {}
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }
}

/// Charge accumulated while a trigger is held, bounded to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeMeter {
    value: f32,
    min: f32,
    max: f32,
}

impl ChargeMeter {
    pub fn new(min: f32, max: f32) -> Self {
        let max = max.max(min);
        Self {
            value: min,
            min,
            max,
        }
    }

    pub fn advance(&mut self, delta: f32) {
        self.value = (self.value + delta).clamp(self.min, self.max);
    }

    /// Charge as a fraction of the max bound (not of the `[min, max]` span).
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.value / self.max
    }

    /// Returns the released fraction and drops back to `min`.
    pub fn consume(&mut self) -> f32 {
        let fraction = self.fraction();
        self.value = self.min;
        fraction
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Monotonic countdown toward zero. Serves as both the active-window timer
/// and the cooldown timer of an ability.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Returns true on the tick the countdown reaches zero.
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - delta).max(0.0);
        self.remaining <= 0.0
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Lifecycle of one ability on one character.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AbilityPhase {
    #[default]
    Ready,
    /// Trigger held, charge rising. Never auto-fires.
    Charging(ChargeMeter),
    /// Duration window running.
    Active(Countdown),
    CoolingDown(Countdown),
}

/// Result of advancing a phase by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEdge {
    /// The active window just hit zero; the owner runs the exit transition.
    Expired,
    /// The cooldown just hit zero.
    Recovered,
}

impl AbilityPhase {
    pub fn charging(min: f32, max: f32) -> Self {
        Self::Charging(ChargeMeter::new(min, max))
    }

    pub fn active(seconds: f32) -> Self {
        Self::Active(Countdown::new(seconds))
    }

    /// Cooldowns of zero length skip straight back to `Ready`.
    pub fn cooling_down(seconds: f32) -> Self {
        if seconds <= 0.0 {
            Self::Ready
        } else {
            Self::CoolingDown(Countdown::new(seconds))
        }
    }

    pub fn advance(&mut self, delta: f32) -> Option<PhaseEdge> {
        match self {
            Self::Ready => None,
            Self::Charging(charge) => {
                charge.advance(delta);
                None
            }
            // A zero-length window still expires on its first tick.
            Self::Active(timer) => {
                timer.tick(delta);
                timer.ready().then_some(PhaseEdge::Expired)
            }
            Self::CoolingDown(timer) => {
                if timer.tick(delta) {
                    *self = Self::Ready;
                    Some(PhaseEdge::Recovered)
                } else {
                    None
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn is_charging(&self) -> bool {
        matches!(self, Self::Charging(_))
    }

    /// Seconds left in the active window, 0 when not active.
    pub fn timer(&self) -> f32 {
        match self {
            Self::Active(timer) => timer.remaining(),
            _ => 0.0,
        }
    }

    /// Seconds left before the ability is re-eligible, 0 when not cooling down.
    pub fn cooldown(&self) -> f32 {
        match self {
            Self::CoolingDown(timer) => timer.remaining(),
            _ => 0.0,
        }
    }

    pub fn charge(&self) -> Option<f32> {
        match self {
            Self::Charging(charge) => Some(charge.value()),
            _ => None,
        }
    }
}
