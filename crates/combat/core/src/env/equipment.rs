//! Weapon/armor classification and the equipment oracle.

/// Broad weapon training category. Each category maps to one skill.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeaponCategory {
    Simple,
    Martial,
    Exotic,
    Magical,
}

impl WeaponCategory {
    /// Key of the skill that trains this category.
    pub const fn skill_key(self) -> &'static str {
        match self {
            Self::Simple => "simple_weapons",
            Self::Martial => "martial_weapons",
            Self::Exotic => "exotic_weapons",
            Self::Magical => "magical_weapons",
        }
    }
}

/// Weapon family; the finer-grained of the two weapon skills.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeaponFamily {
    Daggers,
    Clubs,
    Staves,
    Slings,
    Crossbows,
    Swords,
    Axes,
    Gauntlets,
    Bows,
    Glaives,
    Flails,
    Other,
}

impl WeaponFamily {
    pub const fn category(self) -> WeaponCategory {
        match self {
            Self::Daggers | Self::Clubs | Self::Staves | Self::Slings | Self::Crossbows => {
                WeaponCategory::Simple
            }
            Self::Swords | Self::Axes | Self::Gauntlets | Self::Bows => WeaponCategory::Martial,
            Self::Glaives | Self::Flails | Self::Other => WeaponCategory::Exotic,
        }
    }

    /// Key of the skill that trains this family.
    pub const fn skill_key(self) -> &'static str {
        match self {
            Self::Daggers => "skill_daggers",
            Self::Clubs => "skill_clubs",
            Self::Staves => "skill_staves",
            Self::Slings => "skill_slings",
            Self::Crossbows => "skill_crossbows",
            Self::Swords => "skill_swords",
            Self::Axes => "skill_axes",
            Self::Gauntlets => "skill_gauntlets",
            Self::Bows => "skill_bows",
            Self::Glaives => "skill_glaives",
            Self::Flails => "skill_flails",
            Self::Other => "skill_exotic_other",
        }
    }

    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Slings | Self::Crossbows | Self::Bows)
    }
}

/// Armor weight class. Damage absorbed while wearing a category trains it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArmorCategory {
    Cloth,
    Leather,
    Mail,
    Plate,
    Other,
}

impl ArmorCategory {
    pub const fn skill_key(self) -> &'static str {
        match self {
            Self::Cloth => "skill_cloth_armor",
            Self::Leather => "skill_leather_armor",
            Self::Mail => "skill_mail_armor",
            Self::Plate => "skill_plate_armor",
            Self::Other => "skill_other_armor",
        }
    }
}

/// Read access to what a player character is wielding and wearing.
///
/// Missing data is not an error: an empty main hand means unarmed, and no
/// worn armor means nothing to train.
pub trait EquipmentOracle: Send + Sync {
    /// Weapon family of the main-hand item, if any.
    fn main_hand(&self, character: crate::CharacterId) -> Option<WeaponFamily>;

    /// Distinct armor categories currently worn.
    fn worn_armor(&self, character: crate::CharacterId) -> Vec<ArmorCategory>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn only_missile_families_are_ranged() {
        let ranged: Vec<_> = WeaponFamily::iter().filter(|f| f.is_ranged()).collect();
        assert_eq!(
            ranged,
            vec![WeaponFamily::Slings, WeaponFamily::Crossbows, WeaponFamily::Bows]
        );
    }

    #[test]
    fn families_map_to_categories() {
        assert_eq!(WeaponFamily::Daggers.category(), WeaponCategory::Simple);
        assert_eq!(WeaponFamily::Bows.category(), WeaponCategory::Martial);
        assert_eq!(WeaponFamily::Other.category(), WeaponCategory::Exotic);
        assert_eq!(WeaponFamily::Other.skill_key(), "skill_exotic_other");
        assert_eq!(WeaponCategory::Martial.skill_key(), "martial_weapons");
    }

    #[test]
    fn names_parse_case_insensitively() {
        let family: WeaponFamily = "SWORDS".parse().expect("family");
        assert_eq!(family, WeaponFamily::Swords);
        assert_eq!(ArmorCategory::Plate.to_string(), "plate");
    }
}
