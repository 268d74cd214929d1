//! Leaf derivation for sanctions entries and passport identities.
//!
//! Text fields are normalized, packed into field elements and hashed with
//! Poseidon under a per-list domain tag, so the same name never collides
//! across lists.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use ordered_accumulator::{Node, PoseidonHasher};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SanctionsError};

/// Bytes per packed element; 31 bytes always fit below the BN254 modulus.
pub const CHUNK_BYTES: usize = 31;

pub const NAME_DOB_TAG: u64 = 1;
pub const NAME_YOB_TAG: u64 = 2;
pub const PASSPORT_NATIONALITY_TAG: u64 = 3;

/// One row of a published sanctions list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionEntry {
    pub name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

/// Identity fields read from a passport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportIdentity {
    pub name: String,
    pub date_of_birth: String,
    pub document_number: String,
    pub nationality: String,
}

/// The leaves one entry contributes to each list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryLeaves {
    pub name_dob: Node,
    pub name_yob: Node,
    /// Only present when the entry carries both a document number and a nationality
    pub passport_nationality: Option<Node>,
}

impl SanctionEntry {
    pub fn leaves(&self, poseidon: &PoseidonHasher) -> Result<EntryLeaves> {
        let passport_nationality = match (&self.document_number, &self.nationality) {
            (Some(document), Some(nationality)) => Some(passport_nationality_leaf(
                poseidon,
                document,
                nationality,
            )?),
            _ => None,
        };

        Ok(EntryLeaves {
            name_dob: name_dob_leaf(poseidon, &self.name, &self.date_of_birth)?,
            name_yob: name_yob_leaf(poseidon, &self.name, birth_year(&self.date_of_birth)?)?,
            passport_nationality,
        })
    }
}

impl PassportIdentity {
    pub fn leaves(&self, poseidon: &PoseidonHasher) -> Result<EntryLeaves> {
        Ok(EntryLeaves {
            name_dob: name_dob_leaf(poseidon, &self.name, &self.date_of_birth)?,
            name_yob: name_yob_leaf(poseidon, &self.name, birth_year(&self.date_of_birth)?)?,
            passport_nationality: Some(passport_nationality_leaf(
                poseidon,
                &self.document_number,
                &self.nationality,
            )?),
        })
    }
}

/// Trim, uppercase and collapse internal whitespace runs to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Length-prefixed big-endian packing: `[len, chunk_0, chunk_1, ...]`.
pub fn pack_text(text: &str) -> Vec<Fr> {
    let bytes = text.as_bytes();
    let mut packed = Vec::with_capacity(1 + bytes.len().div_ceil(CHUNK_BYTES));
    packed.push(Fr::from(bytes.len() as u64));
    packed.extend(bytes.chunks(CHUNK_BYTES).map(Fr::from_be_bytes_mod_order));
    packed
}

fn tagged_hash(poseidon: &PoseidonHasher, tag: u64, fields: &[&str]) -> Result<Node> {
    let mut inputs = vec![Fr::from(tag)];
    for field in fields {
        let normalized = normalize(field);
        if normalized.is_empty() {
            return Err(SanctionsError::InvalidEntry("empty text field".to_string()));
        }
        inputs.extend(pack_text(&normalized));
    }
    Ok(poseidon.hash_many(&inputs))
}

pub fn name_dob_leaf(poseidon: &PoseidonHasher, name: &str, date_of_birth: &str) -> Result<Node> {
    validate_date(date_of_birth)?;
    tagged_hash(poseidon, NAME_DOB_TAG, &[name, date_of_birth.trim()])
}

pub fn name_yob_leaf(poseidon: &PoseidonHasher, name: &str, year_of_birth: &str) -> Result<Node> {
    let year = year_of_birth.trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SanctionsError::InvalidEntry(format!(
            "invalid year of birth {:?}",
            year_of_birth
        )));
    }
    tagged_hash(poseidon, NAME_YOB_TAG, &[name, year])
}

pub fn passport_nationality_leaf(
    poseidon: &PoseidonHasher,
    document_number: &str,
    nationality: &str,
) -> Result<Node> {
    tagged_hash(
        poseidon,
        PASSPORT_NATIONALITY_TAG,
        &[document_number, nationality],
    )
}

/// Year component of a `YYYY-MM-DD` date.
pub fn birth_year(date_of_birth: &str) -> Result<&str> {
    validate_date(date_of_birth)?;
    Ok(&date_of_birth.trim()[..4])
}

fn validate_date(date: &str) -> Result<()> {
    let invalid = || SanctionsError::InvalidEntry(format!("invalid date of birth {:?}", date));

    let bytes = date.trim().as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &bytes[range];
        part.iter().all(u8::is_ascii_digit).then(|| {
            part.iter()
                .fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'))
        })
    };

    match (digits(0..4), digits(5..7), digits(8..10)) {
        (Some(_), Some(month), Some(day)) if (1..=12).contains(&month) && (1..=31).contains(&day) => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, dob: &str) -> SanctionEntry {
        SanctionEntry {
            name: name.to_string(),
            date_of_birth: dob.to_string(),
            document_number: None,
            nationality: None,
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  john \t  q\n doe "), "JOHN Q DOE");
        assert_eq!(normalize("Ivan"), "IVAN");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_pack_text_chunking() {
        assert_eq!(pack_text("").len(), 1);
        assert_eq!(pack_text(&"A".repeat(31)).len(), 2);
        assert_eq!(pack_text(&"A".repeat(32)).len(), 3);

        let packed = pack_text("AB");
        assert_eq!(packed[0], Fr::from(2u64));
        assert_eq!(packed[1], Fr::from(0x4142u64));
    }

    #[test]
    fn test_length_prefix_separates_trailing_zero_bytes() {
        assert_ne!(pack_text("A"), pack_text("A\0"));
    }

    #[test]
    fn test_leaf_ignores_case_and_spacing() {
        let poseidon = PoseidonHasher::new();
        let a = name_dob_leaf(&poseidon, "John  Doe", "1970-01-01").unwrap();
        let b = name_dob_leaf(&poseidon, " JOHN DOE ", "1970-01-01").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_domain_tags_separate_lists() {
        let poseidon = PoseidonHasher::new();
        let by_yob = name_yob_leaf(&poseidon, "JOHN", "1970").unwrap();
        let by_passport = passport_nationality_leaf(&poseidon, "JOHN", "1970").unwrap();
        assert_ne!(by_yob, by_passport);
    }

    #[test]
    fn test_entry_and_identity_agree() {
        let poseidon = PoseidonHasher::new();
        let listed = SanctionEntry {
            document_number: Some("X1234567".to_string()),
            nationality: Some("utopia".to_string()),
            ..entry("Jane Roe", "1980-12-31")
        };
        let identity = PassportIdentity {
            name: "jane roe".to_string(),
            date_of_birth: "1980-12-31".to_string(),
            document_number: "x1234567".to_string(),
            nationality: "UTOPIA".to_string(),
        };

        assert_eq!(
            listed.leaves(&poseidon).unwrap(),
            identity.leaves(&poseidon).unwrap()
        );
    }

    #[test]
    fn test_entry_without_document_has_no_passport_leaf() {
        let poseidon = PoseidonHasher::new();
        let leaves = entry("Jane Roe", "1980-12-31").leaves(&poseidon).unwrap();
        assert!(leaves.passport_nationality.is_none());
        assert_eq!(
            leaves.name_yob,
            name_yob_leaf(&poseidon, "Jane Roe", "1980").unwrap()
        );
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let poseidon = PoseidonHasher::new();
        for dob in ["1980-13-01", "1980-01-32", "80-01-01", "1980/01/01", "abcd-01-01"] {
            assert!(
                matches!(
                    name_dob_leaf(&poseidon, "A", dob),
                    Err(SanctionsError::InvalidEntry(_))
                ),
                "{dob} should be rejected"
            );
        }
        assert!(name_yob_leaf(&poseidon, "A", "19x0").is_err());
        assert!(name_dob_leaf(&poseidon, "   ", "1980-01-01").is_err());
    }
}
