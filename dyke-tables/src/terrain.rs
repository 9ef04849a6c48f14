use crate::error::{Result, TableError};
use dyke_utils::cells::normalize_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Terrain category upwind of a river dyke.
///
/// Open water, flat sand and snow cover are smooth surfaces with kl = 1.0.
/// Categories A, B and C are increasingly rough land surfaces whose kl is
/// read from the wind-speed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    OpenWater,
    FlatSand,
    SandBeach,
    SandDune,
    SnowCover,
    A,
    B,
    C,
}

impl Terrain {
    /// Categories that carry a kl column in the roughness table
    pub const ROUGH: [Terrain; 3] = [Terrain::A, Terrain::B, Terrain::C];

    /// True for the smooth surfaces where kl is fixed at 1.0
    pub fn is_smooth(&self) -> bool {
        matches!(
            self,
            Terrain::OpenWater
                | Terrain::FlatSand
                | Terrain::SandBeach
                | Terrain::SandDune
                | Terrain::SnowCover
        )
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Terrain::OpenWater => "Mặt nước",
            Terrain::FlatSand => "Cát bằng phẳng",
            Terrain::SandBeach => "Bãi cát",
            Terrain::SandDune => "Cồn cát",
            Terrain::SnowCover => "Tuyết phủ",
            Terrain::A => "A",
            Terrain::B => "B",
            Terrain::C => "C",
        };
        f.write_str(s)
    }
}

impl FromStr for Terrain {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "MẶT NƯỚC" | "OPEN WATER" => Ok(Terrain::OpenWater),
            "CÁT BẰNG PHẲNG" | "CÁT PHẲNG" | "FLAT SAND" => Ok(Terrain::FlatSand),
            "BÃI CÁT" | "SAND BEACH" => Ok(Terrain::SandBeach),
            "CỒN CÁT" | "SAND DUNE" => Ok(Terrain::SandDune),
            "TUYẾT PHỦ" | "SNOW COVER" => Ok(Terrain::SnowCover),
            "A" => Ok(Terrain::A),
            "B" => Ok(Terrain::B),
            "C" => Ok(Terrain::C),
            _ => Err(TableError::UnknownTerrain(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terrain() {
        assert_eq!("MẶT NƯỚC".parse::<Terrain>().unwrap(), Terrain::OpenWater);
        assert_eq!("mặt nước".parse::<Terrain>().unwrap(), Terrain::OpenWater);
        assert_eq!("Cát phẳng".parse::<Terrain>().unwrap(), Terrain::FlatSand);
        assert_eq!("b".parse::<Terrain>().unwrap(), Terrain::B);
        assert!(matches!(
            "Rừng".parse::<Terrain>(),
            Err(TableError::UnknownTerrain(_))
        ));
    }

    #[test]
    fn test_smooth_terrains() {
        assert!(Terrain::OpenWater.is_smooth());
        assert!(Terrain::SnowCover.is_smooth());
        for terrain in Terrain::ROUGH {
            assert!(!terrain.is_smooth());
        }
    }
}
