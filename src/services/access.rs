//! PIN gate for locked profiles.
//!
//! The stored PIN is plaintext and compared for equality, in constant time.
//! Retries are unlimited unless a failure limit is configured.

use std::collections::HashMap;
use std::sync::Mutex;

use subtle::ConstantTimeEq;

use crate::{
    error::{AppError, AppResult},
    models::Profile,
};

/// Digits in a numeric profile PIN
pub const PIN_LENGTH: usize = 4;

/// Checks `candidate` against the profile's PIN; profiles without one always pass
pub fn verify(profile: &Profile, candidate: &str) -> bool {
    match &profile.pin {
        None => true,
        Some(pin) => pin.as_bytes().ct_eq(candidate.as_bytes()).into(),
    }
}

/// `verify` plus a per-profile count of consecutive failures
#[derive(Debug, Default)]
pub struct AccessGate {
    max_attempts: Option<u32>,
    failures: Mutex<HashMap<String, u32>>,
}

impl AccessGate {
    pub fn new(max_attempts: Option<u32>) -> Self {
        Self {
            max_attempts,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Verifies `candidate`, returning `IncorrectPin` or `Locked` on failure
    pub fn check(&self, profile: &Profile, candidate: &str) -> AppResult<()> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| AppError::Internal("access gate lock poisoned".to_string()))?;

        if let Some(max) = self.max_attempts {
            if failures.get(&profile.id).copied().unwrap_or(0) >= max {
                return Err(AppError::Locked(profile.id.clone()));
            }
        }

        if verify(profile, candidate) {
            failures.remove(&profile.id);
            return Ok(());
        }

        let count = failures.entry(profile.id.clone()).or_insert(0);
        *count += 1;
        tracing::warn!(profile_id = %profile.id, failures = *count, "Incorrect PIN");

        match self.max_attempts {
            Some(max) if *count >= max => Err(AppError::Locked(profile.id.clone())),
            _ => Err(AppError::IncorrectPin),
        }
    }

    pub fn failures(&self, profile_id: &str) -> u32 {
        self.failures
            .lock()
            .map(|f| f.get(profile_id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Clears the failure count, unlocking the profile
    pub fn reset(&self, profile_id: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(profile_id);
        }
    }
}

/// Four-digit PIN entry that submits itself once full
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinPad {
    digits: String,
}

impl PinPad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the digits of `input`, dropping anything else.
    ///
    /// Returns the complete code, and empties the pad, the moment
    /// [`PIN_LENGTH`] digits are present.
    pub fn push(&mut self, input: &str) -> Option<String> {
        for c in input.chars().filter(char::is_ascii_digit) {
            self.digits.push(c);
            if self.digits.len() == PIN_LENGTH {
                return Some(std::mem::take(&mut self.digits));
            }
        }
        None
    }

    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn entered(&self) -> usize {
        self.digits.len()
    }
}
