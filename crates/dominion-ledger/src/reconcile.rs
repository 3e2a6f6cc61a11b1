//! Balance reconciliation for the player ledger.
//!
//! Replays every logged movement on top of the opening balances and
//! compares the result against the stored wallets. Every mutation path in
//! [`PlayerLedger`] logs what it changes, so this passes by construction;
//! a failure means a wallet was changed without a log entry.

use std::collections::BTreeMap;

use dominion_types::{PlayerId, Resources};

use crate::LedgerAnomaly;
use crate::ledger::PlayerLedger;

impl PlayerLedger {
    /// Verify that replaying the log reproduces every current balance.
    ///
    /// # Errors
    ///
    /// Returns the first [`LedgerAnomaly`] found, in player-id order.
    pub fn reconcile(&self) -> Result<(), LedgerAnomaly> {
        let mut replayed: BTreeMap<PlayerId, Option<Resources>> = self
            .players()
            .map(|p| (p.id.clone(), self.opening_balance(&p.id)))
            .collect();

        for entry in self.entries() {
            let slot = replayed.entry(entry.player_id.clone()).or_insert(None);
            *slot = slot.and_then(|balance| {
                if entry.kind.is_credit() {
                    balance.checked_add(&entry.amount)
                } else {
                    balance.checked_sub(&entry.amount)
                }
            });
        }

        for player in self.players() {
            let replay = replayed.get(&player.id).copied().flatten();
            if replay != Some(player.resources) {
                return Err(LedgerAnomaly {
                    player: player.id.clone(),
                    replayed: replay,
                    recorded: player.resources,
                    message: format!(
                        "ledger replay for {} does not match recorded balance {}",
                        player.id, player.resources
                    ),
                });
            }
        }
        Ok(())
    }
}
