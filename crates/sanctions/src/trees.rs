//! The three sanctions accumulators and their on-disk layout.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use ordered_accumulator::{
    node_to_prefixed_hex, Node, NodeHasher, NonMembershipProof, OrderedMerkleTree, PoseidonHasher,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::circuit::CircuitInputs;
use crate::error::{Result, SanctionsError};
use crate::leaf::{PassportIdentity, SanctionEntry};

/// File holding the hex roots of all three lists.
pub const ROOTS_FILE: &str = "roots.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanctionsList {
    NameDob,
    NameYob,
    PassportNationality,
}

impl SanctionsList {
    pub const ALL: [SanctionsList; 3] = [
        SanctionsList::NameDob,
        SanctionsList::NameYob,
        SanctionsList::PassportNationality,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SanctionsList::NameDob => "name_dob.json",
            SanctionsList::NameYob => "name_yob.json",
            SanctionsList::PassportNationality => "passport_nationality.json",
        }
    }
}

impl fmt::Display for SanctionsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SanctionsList::NameDob => "name and date of birth",
            SanctionsList::NameYob => "name and year of birth",
            SanctionsList::PassportNationality => "passport and nationality",
        };
        f.write_str(name)
    }
}

/// Hex roots, as published for verifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionsRoots {
    pub name_dob: String,
    pub name_yob: String,
    pub passport_nationality: String,
}

/// Non-membership proofs for one identity against every list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionsProofs {
    pub name_dob: NonMembershipProof,
    pub name_yob: NonMembershipProof,
    pub passport_nationality: NonMembershipProof,
}

/// Circuit inputs for all three proofs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionsCircuitInputs {
    pub name_dob: CircuitInputs,
    pub name_yob: CircuitInputs,
    pub passport_nationality: CircuitInputs,
}

impl SanctionsProofs {
    pub fn circuit_inputs(&self) -> Result<SanctionsCircuitInputs> {
        Ok(SanctionsCircuitInputs {
            name_dob: CircuitInputs::from_proof(&self.name_dob)?,
            name_yob: CircuitInputs::from_proof(&self.name_yob)?,
            passport_nationality: CircuitInputs::from_proof(&self.passport_nationality)?,
        })
    }
}

/// One ordered accumulator per sanctions list.
#[derive(Clone, Debug)]
pub struct SanctionsTrees<H> {
    pub name_dob: OrderedMerkleTree<H>,
    pub name_yob: OrderedMerkleTree<H>,
    pub passport_nationality: OrderedMerkleTree<H>,
    poseidon: PoseidonHasher,
}

impl<H: NodeHasher + Clone> SanctionsTrees<H> {
    /// Derive leaves from every entry and build the three trees.
    /// Duplicate leaves collapse; entries without passport data only feed the
    /// name lists.
    pub async fn build(entries: &[SanctionEntry], depth: usize, hasher: H) -> Result<Self> {
        let poseidon = PoseidonHasher::new();

        let mut name_dob = BTreeSet::new();
        let mut name_yob = BTreeSet::new();
        let mut passport_nationality = BTreeSet::new();
        for entry in entries {
            let leaves = entry.leaves(&poseidon)?;
            name_dob.insert(leaves.name_dob);
            name_yob.insert(leaves.name_yob);
            passport_nationality.extend(leaves.passport_nationality);
        }

        let trees = Self {
            name_dob: OrderedMerkleTree::build(depth, hasher.clone(), name_dob).await?,
            name_yob: OrderedMerkleTree::build(depth, hasher.clone(), name_yob).await?,
            passport_nationality: OrderedMerkleTree::build(depth, hasher, passport_nationality).await?,
            poseidon,
        };

        info!(
            entries = entries.len(),
            name_dob = trees.name_dob.len(),
            name_yob = trees.name_yob.len(),
            passport_nationality = trees.passport_nationality.len(),
            "built sanctions trees"
        );
        Ok(trees)
    }

    /// Read the snapshots written by [`save_to_directory`](Self::save_to_directory).
    pub async fn load_from_directory(dir: &Path, hasher: H) -> Result<Self> {
        let trees = Self {
            name_dob: load_tree(dir, SanctionsList::NameDob, hasher.clone()).await?,
            name_yob: load_tree(dir, SanctionsList::NameYob, hasher.clone()).await?,
            passport_nationality: load_tree(dir, SanctionsList::PassportNationality, hasher).await?,
            poseidon: PoseidonHasher::new(),
        };
        info!(dir = %dir.display(), "loaded sanctions trees");
        Ok(trees)
    }
}

impl<H> SanctionsTrees<H> {
    pub fn tree(&self, list: SanctionsList) -> &OrderedMerkleTree<H> {
        match list {
            SanctionsList::NameDob => &self.name_dob,
            SanctionsList::NameYob => &self.name_yob,
            SanctionsList::PassportNationality => &self.passport_nationality,
        }
    }

    pub fn roots(&self) -> SanctionsRoots {
        SanctionsRoots {
            name_dob: node_to_prefixed_hex(&self.name_dob.root()),
            name_yob: node_to_prefixed_hex(&self.name_yob.root()),
            passport_nationality: node_to_prefixed_hex(&self.passport_nationality.root()),
        }
    }

    /// Prove the identity is on none of the lists.
    ///
    /// Fails with [`SanctionsError::Listed`] naming the first list that
    /// contains it.
    pub fn check(&self, identity: &PassportIdentity) -> Result<SanctionsProofs> {
        let leaves = identity.leaves(&self.poseidon)?;
        let passport_nationality = leaves
            .passport_nationality
            .ok_or_else(|| SanctionsError::InvalidEntry("identity has no passport leaf".to_string()))?;

        Ok(SanctionsProofs {
            name_dob: self.prove_absent(SanctionsList::NameDob, leaves.name_dob)?,
            name_yob: self.prove_absent(SanctionsList::NameYob, leaves.name_yob)?,
            passport_nationality: self
                .prove_absent(SanctionsList::PassportNationality, passport_nationality)?,
        })
    }

    fn prove_absent(&self, list: SanctionsList, leaf: Node) -> Result<NonMembershipProof> {
        let tree = self.tree(list);
        if tree.contains(&leaf) {
            return Err(SanctionsError::Listed(list));
        }
        Ok(tree.create_non_membership_proof(leaf)?)
    }

    /// Write one layer snapshot per list plus `roots.json`.
    pub async fn save_to_directory(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;

        for list in SanctionsList::ALL {
            let json = self.tree(list).to_json()?;
            tokio::fs::write(dir.join(list.file_name()), json).await?;
        }
        let roots = serde_json::to_string_pretty(&self.roots())?;
        tokio::fs::write(dir.join(ROOTS_FILE), roots).await?;

        info!(dir = %dir.display(), "saved sanctions trees");
        Ok(())
    }
}

async fn load_tree<H: NodeHasher>(
    dir: &Path,
    list: SanctionsList,
    hasher: H,
) -> Result<OrderedMerkleTree<H>> {
    let json = tokio::fs::read_to_string(dir.join(list.file_name())).await?;
    Ok(OrderedMerkleTree::from_json(&json, hasher).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_accumulator::{verify_non_membership_proof, AccumulatorError, Sha256Hasher};

    fn entries() -> Vec<SanctionEntry> {
        vec![
            SanctionEntry {
                name: "Ivan Petrov".to_string(),
                date_of_birth: "1965-03-14".to_string(),
                document_number: Some("P0001".to_string()),
                nationality: Some("RUS".to_string()),
            },
            SanctionEntry {
                name: "Mara Vos".to_string(),
                date_of_birth: "1971-07-02".to_string(),
                document_number: None,
                nationality: None,
            },
            // Same person listed twice
            SanctionEntry {
                name: "mara  vos".to_string(),
                date_of_birth: "1971-07-02".to_string(),
                document_number: None,
                nationality: None,
            },
        ]
    }

    fn identity(name: &str, dob: &str, document: &str) -> PassportIdentity {
        PassportIdentity {
            name: name.to_string(),
            date_of_birth: dob.to_string(),
            document_number: document.to_string(),
            nationality: "NLD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_collapses_duplicates() {
        let trees = SanctionsTrees::build(&entries(), 4, Sha256Hasher).await.unwrap();

        // Two distinct people plus the sentinel leaves
        assert_eq!(trees.name_dob.len(), 4);
        assert_eq!(trees.name_yob.len(), 4);
        assert_eq!(trees.passport_nationality.len(), 3);
    }

    #[tokio::test]
    async fn test_clean_identity_gets_verifiable_proofs() {
        let trees = SanctionsTrees::build(&entries(), 4, Sha256Hasher).await.unwrap();

        let proofs = trees
            .check(&identity("Alice Smith", "1990-05-05", "N1234"))
            .unwrap();
        for proof in [&proofs.name_dob, &proofs.name_yob, &proofs.passport_nationality] {
            assert!(verify_non_membership_proof(proof, &Sha256Hasher).await);
        }
        assert_eq!(proofs.name_dob.root, trees.name_dob.root());

        let inputs = proofs.circuit_inputs().unwrap();
        assert_eq!(inputs.name_yob.root, trees.roots().name_yob);
    }

    #[tokio::test]
    async fn test_listed_identity_rejected() {
        let trees = SanctionsTrees::build(&entries(), 4, Sha256Hasher).await.unwrap();

        let err = trees
            .check(&identity("MARA VOS", "1971-07-02", "N1"))
            .unwrap_err();
        assert!(matches!(err, SanctionsError::Listed(SanctionsList::NameDob)));

        // Same name and year, different day
        let err = trees
            .check(&identity("Mara Vos", "1971-01-01", "N1"))
            .unwrap_err();
        assert!(matches!(err, SanctionsError::Listed(SanctionsList::NameYob)));

        let mut traveller = identity("Someone Else", "2000-01-01", "P0001");
        traveller.nationality = "rus".to_string();
        let err = trees.check(&traveller).unwrap_err();
        assert!(matches!(
            err,
            SanctionsError::Listed(SanctionsList::PassportNationality)
        ));
    }

    #[tokio::test]
    async fn test_invalid_entry_fails_build() {
        let mut bad = entries();
        bad[0].date_of_birth = "14/03/1965".to_string();
        let err = SanctionsTrees::build(&bad, 4, Sha256Hasher).await.unwrap_err();
        assert!(matches!(err, SanctionsError::InvalidEntry(_)));
    }

    #[tokio::test]
    async fn test_too_many_entries_for_depth() {
        let err = SanctionsTrees::build(&entries(), 1, Sha256Hasher).await.unwrap_err();
        assert!(matches!(
            err,
            SanctionsError::Accumulator(AccumulatorError::CapacityExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_and_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let trees = SanctionsTrees::build(&entries(), 4, Sha256Hasher).await.unwrap();
        trees.save_to_directory(dir.path()).await.unwrap();

        for list in SanctionsList::ALL {
            assert!(dir.path().join(list.file_name()).exists());
        }
        let roots: SanctionsRoots = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(ROOTS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(roots, trees.roots());

        let loaded = SanctionsTrees::load_from_directory(dir.path(), Sha256Hasher)
            .await
            .unwrap();
        assert_eq!(loaded.roots(), trees.roots());
        assert_eq!(loaded.name_dob.leaves(), trees.name_dob.leaves());
        assert!(loaded.passport_nationality.verify_integrity().await.unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = SanctionsTrees::load_from_directory(&dir.path().join("absent"), Sha256Hasher)
            .await
            .unwrap_err();
        assert!(matches!(err, SanctionsError::Io(_)));
    }
}
