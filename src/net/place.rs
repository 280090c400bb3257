//! Token reservoirs.
use crate::net::error::{NetError, NetResult};

pub type Tokens = u64;

/// Converts a caller-supplied signed amount into a token count.
pub(crate) fn non_negative(amount: i64) -> NetResult<Tokens> {
    Tokens::try_from(amount).map_err(|_| NetError::NegativeAmount(amount))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Place {
    tokens: Tokens,
}

impl Place {
    /// Negative initial counts are replaced with 0 rather than rejected.
    pub fn new(tokens: i64) -> Self {
        let tokens = Tokens::try_from(tokens).unwrap_or_else(|_| {
            log::warn!("place created with {tokens} tokens, defaulting to 0");
            0
        });
        Self { tokens }
    }

    pub fn tokens(&self) -> Tokens {
        self.tokens
    }

    pub fn add_tokens(&mut self, amount: i64) -> NetResult<()> {
        let amount = non_negative(amount)?;
        self.give(amount)
    }

    pub fn remove_tokens(&mut self, amount: i64) -> NetResult<()> {
        let amount = non_negative(amount)?;
        self.take(amount)
    }

    /// Replaces the count outright.
    pub fn set_tokens(&mut self, tokens: i64) -> NetResult<()> {
        self.tokens = non_negative(tokens)?;
        Ok(())
    }

    pub(crate) fn take(&mut self, amount: Tokens) -> NetResult<()> {
        if amount > self.tokens {
            return Err(NetError::InsufficientTokens {
                requested: amount,
                available: self.tokens,
            });
        }
        self.tokens -= amount;
        Ok(())
    }

    pub(crate) fn give(&mut self, amount: Tokens) -> NetResult<()> {
        self.tokens = self
            .tokens
            .checked_add(amount)
            .ok_or(NetError::TokenOverflow {
                current: self.tokens,
                amount,
            })?;
        Ok(())
    }

    pub(crate) fn drain(&mut self) {
        self.tokens = 0;
    }

    pub(crate) fn restore(&mut self, tokens: Tokens) {
        self.tokens = tokens;
    }
}
