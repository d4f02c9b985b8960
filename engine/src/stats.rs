use serde::{Deserialize, Serialize};
use tracing::warn;

/// Authored form of a stat line, as it appears in world files.
///
/// `hit_points` defaults to `max_hit_points` when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub hit_points: Option<u32>,
    pub max_hit_points: u32,
    pub movement: u32,
    pub constitution: u32,
    pub strength: u32,
    pub magic: u32,
    pub dexterity: u32,
    pub speed: u32,
    pub luck: u32,
    pub defense: u32,
    pub resistance: u32,
}

/// Numeric attributes of a unit.
///
/// Hit points are private: [`Stats::apply_damage`] and [`Stats::heal`] are the
/// only ways to change them, which keeps `0 <= hp <= max_hp` true at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    hit_points: u32,
    max_hit_points: u32,
    pub movement: u32,
    pub constitution: u32,
    pub strength: u32,
    pub magic: u32,
    pub dexterity: u32,
    pub speed: u32,
    pub luck: u32,
    pub defense: u32,
    pub resistance: u32,
}

impl From<StatBlock> for Stats {
    fn from(block: StatBlock) -> Self {
        let max = block.max_hit_points;
        let hp = block.hit_points.unwrap_or(max);
        if hp > max {
            warn!(hp, max, "authored hit points exceed maximum; clamping");
        }
        Self {
            hit_points: hp.min(max),
            max_hit_points: max,
            movement: block.movement,
            constitution: block.constitution,
            strength: block.strength,
            magic: block.magic,
            dexterity: block.dexterity,
            speed: block.speed,
            luck: block.luck,
            defense: block.defense,
            resistance: block.resistance,
        }
    }
}

impl Stats {
    /// A unit at full health with every other attribute zero.
    pub fn new(max_hit_points: u32) -> Self {
        StatBlock { max_hit_points, ..StatBlock::default() }.into()
    }

    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> u32 {
        self.max_hit_points
    }

    pub fn is_defeated(&self) -> bool {
        self.hit_points == 0
    }

    /// Fraction of health left, for health bars.
    pub fn health_ratio(&self) -> f32 {
        if self.max_hit_points == 0 {
            return 0.0;
        }
        self.hit_points as f32 / self.max_hit_points as f32
    }

    /// Subtract `amount`, stopping at zero. Returns true if the unit dropped to 0 HP this call.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        let before = self.hit_points;
        self.hit_points = self.hit_points.saturating_sub(amount);
        before > 0 && self.hit_points == 0
    }

    /// Add `amount`, stopping at the maximum. Returns the hit points actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hit_points;
        self.hit_points = self.hit_points.saturating_add(amount).min(self.max_hit_points);
        self.hit_points - before
    }

    pub fn block(&self) -> StatBlock {
        StatBlock {
            hit_points: Some(self.hit_points),
            max_hit_points: self.max_hit_points,
            movement: self.movement,
            constitution: self.constitution,
            strength: self.strength,
            magic: self.magic,
            dexterity: self.dexterity,
            speed: self.speed,
            luck: self.luck,
            defense: self.defense,
            resistance: self.resistance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authored_hp_is_clamped_to_max() {
        let s: Stats = StatBlock { hit_points: Some(40), max_hit_points: 30, ..Default::default() }.into();
        assert_eq!(s.hit_points(), 30);
    }

    #[test]
    fn damage_reports_drop_only_once() {
        let mut s = Stats::new(5);
        assert!(s.apply_damage(7));
        assert!(!s.apply_damage(1));
        assert!(s.is_defeated());
    }
}
