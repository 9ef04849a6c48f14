use crate::error::Result;
use csv::ReaderBuilder;
use dyke_utils::cells::normalize_key;
use serde::Deserialize;

/// Roughness reduction factor γ_f by revetment material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoughnessTable {
    entries: Vec<RoughnessEntry>,
}

/// One revetment material and its γ_f
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoughnessEntry {
    pub material: String,
    pub gamma_f: f64,
}

impl RoughnessTable {
    /// Parse a CSV with columns: material, gamma_f
    pub fn parse_csv(csv_object: &str) -> Result<RoughnessTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_object.as_bytes());
        let entries = rdr
            .deserialize::<RoughnessEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(RoughnessTable { entries })
    }

    /// γ_f for a material name, compared case- and spacing-insensitively.
    pub fn gamma_f(&self, material: &str) -> Option<f64> {
        let key = normalize_key(material);
        self.entries
            .iter()
            .find(|entry| normalize_key(&entry.material) == key)
            .map(|entry| entry.gamma_f)
    }

    pub fn entries(&self) -> &[RoughnessEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUGHNESS: &str = "\
material,gamma_f
\"Bê tông nhựa asphalt, bê tông, cấu kiện bê tông nhẵn, cỏ, cát - asphalt\",1.00
Kè đá đổ một lớp,0.70
Kè đá đổ hai lớp,0.55
";

    #[test]
    fn test_parse_roughness() {
        let table = RoughnessTable::parse_csv(ROUGHNESS).unwrap();
        assert_eq!(table.entries().len(), 3);
        assert_eq!(table.gamma_f("Kè đá đổ hai lớp"), Some(0.55));
        assert_eq!(table.gamma_f("  kè đá đổ  một lớp "), Some(0.70));
        assert_eq!(
            table.gamma_f("Bê tông nhựa asphalt, bê tông, cấu kiện bê tông nhẵn, cỏ, cát - asphalt"),
            Some(1.00)
        );
    }

    #[test]
    fn test_unlisted_material() {
        let table = RoughnessTable::parse_csv(ROUGHNESS).unwrap();
        assert_eq!(table.gamma_f("Gạch"), None);
    }
}
