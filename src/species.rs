use bevy::prelude::*;
use std::fmt;

/// Size-banded fish species, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Clownfish,
    Guppy,
    NeonTetra,
    Angelfish,
    Butterflyfish,
    Parrotfish,
    Tuna,
    Shark,
    MantaRay,
    Dolphin,
    Orca,
    BlueWhale,
}

/// One row of the species table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesBand {
    pub species: Species,
    pub min_size: f32,
    pub max_size: f32,
    pub name: &'static str,
    pub rgb: [u8; 3],
}

/// Species bands in size order. Bands are half-open `[min, max)` and touch
/// end to end; the last band also takes everything above its minimum.
pub const SPECIES_TABLE: [SpeciesBand; 12] = [
    band(Species::Clownfish, 5.0, 12.0, "Clownfish", [0xFF, 0x6B, 0x6B]),
    band(Species::Guppy, 12.0, 18.0, "Guppy", [0xFF, 0x9F, 0xF3]),
    band(Species::NeonTetra, 18.0, 25.0, "Neon Tetra", [0x54, 0xA0, 0xFF]),
    band(Species::Angelfish, 25.0, 32.0, "Angelfish", [0x48, 0xDB, 0xFB]),
    band(Species::Butterflyfish, 32.0, 38.0, "Butterflyfish", [0xFF, 0xD9, 0x3D]),
    band(Species::Parrotfish, 38.0, 45.0, "Parrotfish", [0xFF, 0x6B, 0x9D]),
    band(Species::Tuna, 45.0, 52.0, "Tuna", [0xC8, 0xD6, 0xE5]),
    band(Species::Shark, 52.0, 60.0, "Shark", [0x57, 0x65, 0x74]),
    band(Species::MantaRay, 60.0, 65.0, "Manta Ray", [0x83, 0x95, 0xA7]),
    band(Species::Dolphin, 65.0, 72.0, "Dolphin", [0x0A, 0xBD, 0xE3]),
    band(Species::Orca, 72.0, 78.0, "Orca", [0x22, 0x2F, 0x3E]),
    band(Species::BlueWhale, 78.0, 80.0, "Blue Whale", [0x1E, 0x37, 0x99]),
];

const fn band(species: Species, min_size: f32, max_size: f32, name: &'static str, rgb: [u8; 3]) -> SpeciesBand {
    SpeciesBand {
        species,
        min_size,
        max_size,
        name,
        rgb,
    }
}

impl Species {
    /// Species for a size: the first band containing it, the first band for
    /// anything smaller than the table, the last band for anything larger.
    pub fn for_size(size: f32) -> Self {
        Self::band_for_size(size).species
    }

    pub fn band_for_size(size: f32) -> &'static SpeciesBand {
        let first = &SPECIES_TABLE[0];
        if size < first.min_size {
            return first;
        }
        SPECIES_TABLE
            .iter()
            .find(|b| size >= b.min_size && size < b.max_size)
            .unwrap_or(&SPECIES_TABLE[SPECIES_TABLE.len() - 1])
    }

    pub fn band(self) -> &'static SpeciesBand {
        &SPECIES_TABLE[self.rank()]
    }

    /// Position in the size ordering
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        self.band().name
    }

    pub fn color(self) -> Color {
        let [r, g, b] = self.band().rgb;
        Color::srgb_u8(r, g, b)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rare fish with fixed attributes that bypass the species table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    Golden,
    Rainbow,
    Ghost,
}

/// Fixed attributes of a special fish
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialProfile {
    pub name: &'static str,
    pub size: f32,
    pub speed: f32,
    pub points: u32,
    pub rgb: [u8; 3],
}

impl SpecialKind {
    pub fn profile(self) -> SpecialProfile {
        match self {
            SpecialKind::Golden => SpecialProfile {
                name: "Golden Fish",
                size: 25.0,
                speed: 4.0,
                points: 500,
                rgb: [0xFF, 0xD7, 0x00],
            },
            SpecialKind::Rainbow => SpecialProfile {
                name: "Rainbow Fish",
                size: 30.0,
                speed: 3.5,
                points: 300,
                rgb: [0xFF, 0x4F, 0xD8],
            },
            SpecialKind::Ghost => SpecialProfile {
                name: "Ghost Fish",
                size: 35.0,
                speed: 2.0,
                points: 200,
                rgb: [0xA8, 0xE6, 0xCF],
            },
        }
    }

    pub fn color(self) -> Color {
        let [r, g, b] = self.profile().rgb;
        Color::srgb_u8(r, g, b)
    }
}

impl fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.profile().name)
    }
}

/// Category a fish is drawn and scored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FishKind {
    Normal(Species),
    Special(SpecialKind),
}

impl FishKind {
    pub fn is_special(self) -> bool {
        matches!(self, FishKind::Special(_))
    }

    pub fn color(self) -> Color {
        match self {
            FishKind::Normal(species) => species.color(),
            FishKind::Special(kind) => kind.color(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FishKind::Normal(species) => species.name(),
            FishKind::Special(kind) => kind.profile().name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_touch_without_gaps_or_overlaps() {
        for pair in SPECIES_TABLE.windows(2) {
            assert_eq!(pair[0].max_size, pair[1].min_size);
            assert!(pair[0].min_size < pair[0].max_size);
        }
        for (index, band) in SPECIES_TABLE.iter().enumerate() {
            assert_eq!(band.species.rank(), index);
        }
    }

    #[test]
    fn category_is_monotonic_in_size() {
        let mut last_rank = 0;
        let mut size = 0.5;
        while size <= 90.0 {
            let rank = Species::for_size(size).rank();
            assert!(rank >= last_rank, "rank dropped at size {size}");
            last_rank = rank;
            size += 0.25;
        }
        assert_eq!(last_rank, SPECIES_TABLE.len() - 1);
    }

    #[test]
    fn band_edges_belong_to_the_upper_band() {
        assert_eq!(Species::for_size(11.99), Species::Clownfish);
        assert_eq!(Species::for_size(12.0), Species::Guppy);
        assert_eq!(Species::for_size(15.0), Species::Guppy);
        assert_eq!(Species::for_size(80.0), Species::BlueWhale);
    }

    #[test]
    fn sizes_outside_the_table_clamp_to_its_ends() {
        assert_eq!(Species::for_size(1.0), Species::Clownfish);
        assert_eq!(Species::for_size(500.0), Species::BlueWhale);
    }

    #[test]
    fn special_profiles_match_bonus_table() {
        assert_eq!(SpecialKind::Golden.profile().points, 500);
        assert_eq!(SpecialKind::Rainbow.profile().points, 300);
        assert_eq!(SpecialKind::Ghost.profile().points, 200);
        assert!(FishKind::Special(SpecialKind::Ghost).is_special());
        assert!(!FishKind::Normal(Species::Tuna).is_special());
    }
}
