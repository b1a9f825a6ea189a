//! Common types shared among all dispatch crates

#[cfg(any(test, feature = "test-utils"))]
pub use test::*;

pub mod error_code;
pub use error_code::*;

pub mod fmt;

pub mod logging;

pub mod time;

use rand::{rngs::OsRng, RngCore};

pub fn rand_array<const N: usize>() -> [u8; N] {
    let mut buffer = [0u8; N];
    OsRng.fill_bytes(&mut buffer);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_array_is_random() {
        assert_ne!(rand_array::<32>(), rand_array::<32>());
    }
}
