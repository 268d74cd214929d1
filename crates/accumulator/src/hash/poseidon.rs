//! Poseidon sponge hasher over the BN254 scalar field.

use std::future::Future;
use std::sync::Arc;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::CryptographicSponge;
use ark_ff::MontFp;

use super::NodeHasher;
use crate::field::Node;

/// Number of full rounds (beginning + end)
const FULL_ROUNDS: usize = 8;

/// Number of partial rounds
const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent
const ALPHA: u64 = 5;

/// Sponge rate: two field elements absorbed per permutation.
const RATE: usize = 2;

/// Seed for the round-constant generator ("ACCUMUL8" in ASCII).
const ARK_SEED: u64 = 0x4143_4355_4d55_4c38;

/// Poseidon configuration for the BN254 scalar field.
///
/// Width 3 (rate 2, capacity 1), 8 full and 57 partial rounds, x^5 S-box.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let mds = vec![
        vec![
            MontFp!("7511745149465107256748700652201246547602992235352608707588321460060273774987"),
            MontFp!("10370080108974718697676803824769673834027675643658433702224577712625900127200"),
            MontFp!("19705173408229649878903981084052839426532978878058043055305024233888854471533"),
        ],
        vec![
            MontFp!("18732019378264290557468133440468564866454307626475683536618613112504878618481"),
            MontFp!("20870176810702568768751421378473869562658540583882454726129544628203806653987"),
            MontFp!("7266061498423634438932006217945904744987532209093972706694887950396501989428"),
        ],
        vec![
            MontFp!("9131299761947733513298312097611845208338517739621853568979632113419485819303"),
            MontFp!("10595341252162738537912664445405114076324478519622938027420701542910180337937"),
            MontFp!("11597556804922396090267472882856054602429588299176362916247939723151043581408"),
        ],
    ];

    PoseidonConfig {
        full_rounds: FULL_ROUNDS,
        partial_rounds: PARTIAL_ROUNDS,
        alpha: ALPHA,
        ark: round_constants(RATE + 1),
        mds,
        rate: RATE,
        capacity: 1,
    }
}

/// Deterministic round constants from a quadratic recurrence over the field.
fn round_constants(width: usize) -> Vec<Vec<Fr>> {
    let mut state = Fr::from(ARK_SEED);
    (0..FULL_ROUNDS + PARTIAL_ROUNDS)
        .map(|_| {
            (0..width)
                .map(|_| {
                    state = state * state + Fr::from(7u64);
                    state
                })
                .collect()
        })
        .collect()
}

/// Poseidon two-to-one hasher. The config is built once and shared by clones.
#[derive(Clone)]
pub struct PoseidonHasher {
    config: Arc<PoseidonConfig<Fr>>,
}

impl PoseidonHasher {
    pub fn new() -> Self {
        Self {
            config: Arc::new(poseidon_config()),
        }
    }

    /// Hash two field elements.
    pub fn hash_two(&self, left: Fr, right: Fr) -> Fr {
        let mut sponge = PoseidonSponge::<Fr>::new(self.config.as_ref());
        sponge.absorb(&left);
        sponge.absorb(&right);
        sponge.squeeze_field_elements::<Fr>(1)[0]
    }

    /// Hash any number of field elements in one sponge.
    pub fn hash_many(&self, inputs: &[Fr]) -> Fr {
        let mut sponge = PoseidonSponge::<Fr>::new(self.config.as_ref());
        for input in inputs {
            sponge.absorb(input);
        }
        sponge.squeeze_field_elements::<Fr>(1)[0]
    }
}

impl std::fmt::Debug for PoseidonHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseidonHasher")
            .field("rate", &self.config.rate)
            .field("full_rounds", &self.config.full_rounds)
            .field("partial_rounds", &self.config.partial_rounds)
            .finish()
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeHasher for PoseidonHasher {
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send {
        std::future::ready(self.hash_two(left, right))
    }
}
