//! Fungible token ledger.
//!
//! The protocol never implements an asset itself; it only moves balances
//! through the [`TokenLedger`] collaborator and trusts its failure
//! semantics. [`TokenBook`] is the in-memory ledger used by the facade and
//! the tests. All mutations are atomic: either the full transfer succeeds or
//! every balance is unchanged.

use std::collections::HashMap;

use jurisfund_types::{AccountId, Amount, Asset, JurisError, Result};

/// ERC-20 style asset operations the protocol depends on.
pub trait TokenLedger {
    /// Balance of `holder` in `asset`.
    fn balance_of(&self, asset: &str, holder: AccountId) -> Amount;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(&self, asset: &str, owner: AccountId, spender: AccountId) -> Amount;

    /// Set the allowance of `spender` over `owner`'s balance.
    fn approve(&mut self, asset: &str, owner: AccountId, spender: AccountId, amount: Amount);

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// Returns [`JurisError::InsufficientBalance`] if `from` cannot cover it.
    fn transfer(
        &mut self,
        asset: &str,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    ///
    /// # Errors
    /// Returns [`JurisError::InsufficientAllowance`] or
    /// [`JurisError::InsufficientBalance`]; nothing changes on error.
    fn transfer_from(
        &mut self,
        asset: &str,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()>;
}

/// In-memory token ledger with supply accounting.
#[derive(Debug, Clone, Default)]
pub struct TokenBook {
    /// Per-(holder, asset) balances.
    balances: HashMap<(AccountId, Asset), Amount>,
    /// Per-(asset, owner, spender) allowances.
    allowances: HashMap<(Asset, AccountId, AccountId), Amount>,
    /// Total minted per asset since genesis.
    minted: HashMap<Asset, Amount>,
}

impl TokenBook {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new units of `asset` for `to`.
    ///
    /// # Errors
    /// Returns [`JurisError::ArithmeticOverflow`] if supply would overflow.
    pub fn mint(&mut self, asset: &str, to: AccountId, amount: Amount) -> Result<()> {
        let minted = self.minted.get(asset).copied().unwrap_or(0);
        let new_minted = minted
            .checked_add(amount)
            .ok_or(JurisError::ArithmeticOverflow("mint supply"))?;
        let balance = self.balance_of(asset, to);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(JurisError::ArithmeticOverflow("mint balance"))?;
        self.minted.insert(asset.to_string(), new_minted);
        self.balances.insert((to, asset.to_string()), new_balance);
        Ok(())
    }

    /// Circulating supply of `asset`: everything ever minted.
    #[must_use]
    pub fn expected_supply(&self, asset: &str) -> Amount {
        self.minted.get(asset).copied().unwrap_or(0)
    }

    /// Verify Σ balances == minted for `asset`.
    ///
    /// # Errors
    /// Returns [`JurisError::SupplyInvariantViolation`] on mismatch.
    pub fn verify_supply(&self, asset: &str) -> Result<()> {
        let actual: Amount = self
            .balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, amount)| *amount)
            .sum();
        let expected = self.expected_supply(asset);
        if actual != expected {
            tracing::error!(asset, actual, expected, "Token supply not conserved");
            return Err(JurisError::SupplyInvariantViolation {
                reason: format!("asset {asset}: actual supply {actual} != expected {expected}"),
            });
        }
        Ok(())
    }

    fn debit(&mut self, asset: &str, holder: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(asset, holder);
        if available < amount {
            return Err(JurisError::InsufficientBalance {
                holder,
                asset: asset.to_string(),
                needed: amount,
                available,
            });
        }
        self.balances
            .insert((holder, asset.to_string()), available - amount);
        Ok(())
    }

    fn credit(&mut self, asset: &str, holder: AccountId, amount: Amount) -> Result<()> {
        let entry = self
            .balances
            .entry((holder, asset.to_string()))
            .or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(JurisError::ArithmeticOverflow("credit"))?;
        Ok(())
    }
}

impl TokenLedger for TokenBook {
    fn balance_of(&self, asset: &str, holder: AccountId) -> Amount {
        self.balances
            .get(&(holder, asset.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn allowance(&self, asset: &str, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances
            .get(&(asset.to_string(), owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, asset: &str, owner: AccountId, spender: AccountId, amount: Amount) {
        self.allowances
            .insert((asset.to_string(), owner, spender), amount);
    }

    fn transfer(
        &mut self,
        asset: &str,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        if from == to {
            // Still fail if the holder could not have covered it.
            let available = self.balance_of(asset, from);
            if available < amount {
                return Err(JurisError::InsufficientBalance {
                    holder: from,
                    asset: asset.to_string(),
                    needed: amount,
                    available,
                });
            }
            return Ok(());
        }
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &str,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        let approved = self.allowance(asset, from, spender);
        if approved < amount {
            return Err(JurisError::InsufficientAllowance {
                asset: asset.to_string(),
                needed: amount,
                approved,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.allowances
            .insert((asset.to_string(), from, spender), approved - amount);
        Ok(())
    }
}
