//! Account registry: address validation, fresh-address allocation and
//! balances.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use primitive_types::U256;
use rand::RngCore;
use shared_types::Address;
use tracing::debug;
use tx_verification::{AccountAllocator, AccountError, AddressValidator};

/// Allocation gives up after this many collisions in a row.
const MAX_ALLOCATION_ATTEMPTS: u32 = 16;

/// Known accounts and their balances.
#[derive(Debug, Default)]
pub struct AccountsManager {
    balances: DashMap<Address, U256>,
}

impl AccountsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a random unused address and reserve it with a zero balance.
    ///
    /// The check and the reservation happen under one shard lock, so
    /// concurrent callers never receive the same address.
    pub fn create_account(&self) -> Result<Address, AccountError> {
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let mut bytes = [0u8; 20];
            rng.fill_bytes(&mut bytes);
            let address = Address(bytes);
            if address.is_zero() {
                continue;
            }
            if let Entry::Vacant(slot) = self.balances.entry(address) {
                slot.insert(U256::zero());
                debug!(%address, "account allocated");
                return Ok(address);
            }
        }
        Err(AccountError::Exhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    /// Add `amount` to the balance of `address`, creating the account if
    /// needed. Returns the new balance.
    pub fn fund(&self, address: Address, amount: U256) -> U256 {
        let mut balance = self.balances.entry(address).or_insert_with(U256::zero);
        *balance = balance.saturating_add(amount);
        *balance
    }

    pub fn balance(&self, address: &Address) -> Option<U256> {
        self.balances.get(address).map(|balance| *balance)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl AddressValidator for AccountsManager {
    /// `0x` plus 40 hex digits; mixed case must match the EIP-55 checksum.
    fn is_valid(&self, address: &str) -> bool {
        address.parse::<Address>().is_ok()
    }
}

#[async_trait]
impl AccountAllocator for AccountsManager {
    async fn allocate_new_account(&self) -> Result<Address, AccountError> {
        self.create_account()
    }
}
