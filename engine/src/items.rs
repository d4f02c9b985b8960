use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Sword,
    Axe,
    Lance,
    Bow,
    Elemental,
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorType {
    Head,
    Chest,
    Legs,
    Feet,
}

impl ArmorType {
    pub const ALL: [ArmorType; 4] = [ArmorType::Head, ArmorType::Chest, ArmorType::Legs, ArmorType::Feet];
}

/// Weapon/armor proficiency needed to wield an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Rank {
    #[default]
    E,
    D,
    C,
    B,
    A,
    S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    Potion,
    Book,
    Lockpick,
}

/// Remaining uses of a weapon or armor piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DurabilitySpec")]
pub struct Durability {
    current: u32,
    max: u32,
}

/// World files may write `durability: 45` for a fresh item.
#[derive(Deserialize)]
#[serde(untagged)]
enum DurabilitySpec {
    Fresh(u32),
    Worn { current: u32, max: u32 },
}

impl From<DurabilitySpec> for Durability {
    fn from(spec: DurabilitySpec) -> Self {
        match spec {
            DurabilitySpec::Fresh(max) => Durability::new(max),
            DurabilitySpec::Worn { current, max } => Durability::with_current(current, max),
        }
    }
}

impl Durability {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// `current` is clamped to `max`.
    pub fn with_current(current: u32, max: u32) -> Self {
        Self { current: current.min(max), max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.current == 0
    }

    /// Spend one use, never going below zero.
    pub fn wear(&mut self) -> u32 {
        self.current = self.current.saturating_sub(1);
        self.current
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub weapon_type: WeaponType,
    #[serde(default)]
    pub required_rank: Rank,
    pub might: u32,
    pub hit: u32,
    #[serde(default)]
    pub crit: u32,
    #[serde(default = "one")]
    pub range: u32,
    #[serde(default)]
    pub weight: u32,
    pub durability: Durability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_rank: Rank,
    #[serde(default)]
    pub defense: u32,
    #[serde(default)]
    pub resistance: u32,
    #[serde(default)]
    pub weight: u32,
    pub durability: Durability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ConsumableKind,
    #[serde(default = "one")]
    pub max_uses: u32,
    #[serde(default = "one")]
    pub uses_left: u32,
}

fn one() -> u32 {
    1
}

/// Every item family the engine knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Item {
    PhysicalWeapon(Weapon),
    MagicWeapon(Weapon),
    HeadArmor(Armor),
    ChestArmor(Armor),
    LegArmor(Armor),
    FeetArmor(Armor),
    Consumable(Consumable),
}

/// Where an item may be worn. Slot validation goes through this, never through the item family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    Weapon,
    Armor(ArmorType),
    Carried,
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::PhysicalWeapon(w) | Item::MagicWeapon(w) => &w.name,
            Item::HeadArmor(a) | Item::ChestArmor(a) | Item::LegArmor(a) | Item::FeetArmor(a) => &a.name,
            Item::Consumable(c) => &c.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Item::PhysicalWeapon(w) | Item::MagicWeapon(w) => &w.description,
            Item::HeadArmor(a) | Item::ChestArmor(a) | Item::LegArmor(a) | Item::FeetArmor(a) => {
                &a.description
            }
            Item::Consumable(c) => &c.description,
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            Item::PhysicalWeapon(_) | Item::MagicWeapon(_) => Capability::Weapon,
            Item::HeadArmor(_) => Capability::Armor(ArmorType::Head),
            Item::ChestArmor(_) => Capability::Armor(ArmorType::Chest),
            Item::LegArmor(_) => Capability::Armor(ArmorType::Legs),
            Item::FeetArmor(_) => Capability::Armor(ArmorType::Feet),
            Item::Consumable(_) => Capability::Carried,
        }
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        match self {
            Item::PhysicalWeapon(w) | Item::MagicWeapon(w) => Some(w),
            _ => None,
        }
    }

    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        match self {
            Item::PhysicalWeapon(w) | Item::MagicWeapon(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_magic(&self) -> bool {
        matches!(self, Item::MagicWeapon(_))
    }

    pub fn armor(&self) -> Option<&Armor> {
        match self {
            Item::HeadArmor(a) | Item::ChestArmor(a) | Item::LegArmor(a) | Item::FeetArmor(a) => Some(a),
            _ => None,
        }
    }

    pub fn consumable_mut(&mut self) -> Option<&mut Consumable> {
        match self {
            Item::Consumable(c) => Some(c),
            _ => None,
        }
    }

    pub fn durability(&self) -> Option<Durability> {
        self.weapon()
            .map(|w| w.durability)
            .or_else(|| self.armor().map(|a| a.durability))
    }
}
