//! Client-side voucher codes.
//!
//! Codes generated here are previews only: the backend assigns the code
//! that is actually stored, and [`crate::assembler::OrderDraft::reconcile`]
//! adopts it.

use rand::Rng;

/// Length of a generated code.
pub const CODE_LENGTH: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate an 8-character code drawn uniformly from `[A-Z0-9]`.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// [`generate`] with a caller-supplied RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

/// Whether `code` has the shape of a generated code.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}
