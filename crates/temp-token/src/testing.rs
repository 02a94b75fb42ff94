//! Randomness test doubles.

use std::num::NonZeroU32;

use rand_core::{CryptoRng, OsRng, RngCore};

/// Yields `0, 1, 2, ...` (wrapping), so sealed output is reproducible.
#[derive(Debug, Default)]
pub struct SequenceRng {
    next: u8,
}

impl RngCore for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for b in dest {
            *b = self.next;
            self.next = self.next.wrapping_add(1);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for SequenceRng {}

/// Always fails, standing in for an exhausted OS entropy source.
#[derive(Debug)]
pub struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        unreachable!("FailingRng only supports try_fill_bytes")
    }

    fn next_u64(&mut self) -> u64 {
        unreachable!("FailingRng only supports try_fill_bytes")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unreachable!("FailingRng only supports try_fill_bytes")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::from(
            NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
        ))
    }
}

impl CryptoRng for FailingRng {}

/// Delegates to [`OsRng`] and counts every draw.
#[derive(Debug, Default)]
pub struct CountingRng {
    pub draws: usize,
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        OsRng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        OsRng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += 1;
        OsRng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.draws += 1;
        OsRng.try_fill_bytes(dest)
    }
}

impl CryptoRng for CountingRng {}
