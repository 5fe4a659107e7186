//! Combat domain: the health capability embedded in every character.

/// Anything that can take damage, be healed, and die.
pub trait Hurtable {
    fn hurt(&mut self, amount: f32);
    fn heal(&mut self, amount: f32);
    fn is_alive(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    alive: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            alive: true,
        }
    }

    pub fn die(&mut self) {
        self.alive = false;
    }
}

impl Hurtable for Health {
    fn hurt(&mut self, amount: f32) {
        if !self.alive {
            return;
        }
        self.current = (self.current - amount).clamp(0.0, self.max);
        if self.current <= f32::EPSILON {
            self.current = 0.0;
            self.die();
        }
    }

    fn heal(&mut self, amount: f32) {
        if !self.alive {
            return;
        }
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}
