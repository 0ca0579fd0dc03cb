use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::FlatType;
use super::error::AllocationError;

/// Per-project unit counters keyed by flat type.
///
/// Counters are unsigned and only change through [`reserve`](Self::reserve),
/// [`release`](Self::release) and [`set_capacity`](Self::set_capacity), all of which are
/// crate-private so the engine is the single writer. Exclusive access comes from the
/// `&mut` receiver, which makes each reserve/release atomic for its (project, flat type).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryLedger {
    units: BTreeMap<FlatType, u32>,
}

impl InventoryLedger {
    /// Ledger with every known flat type initialised to zero.
    pub fn empty() -> Self {
        Self {
            units: FlatType::ALL.iter().map(|flat_type| (*flat_type, 0)).collect(),
        }
    }

    /// Hydrate a ledger from already validated counts (bulk load).
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (FlatType, u32)>,
    {
        let mut ledger = Self::empty();
        ledger.units.extend(counts);
        ledger
    }

    pub fn available(&self, flat_type: FlatType) -> u32 {
        self.units.get(&flat_type).copied().unwrap_or(0)
    }

    /// Take one unit, returning the count left afterwards.
    pub(crate) fn reserve(&mut self, flat_type: FlatType) -> Result<u32, AllocationError> {
        match self.units.get_mut(&flat_type) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(*count)
            }
            _ => Err(AllocationError::NoUnitsAvailable(flat_type)),
        }
    }

    /// Return one previously reserved unit.
    pub(crate) fn release(&mut self, flat_type: FlatType) -> u32 {
        let count = self.units.entry(flat_type).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub(crate) fn set_capacity(
        &mut self,
        flat_type: FlatType,
        count: i64,
    ) -> Result<(), AllocationError> {
        let count = u32::try_from(count).map_err(|_| {
            AllocationError::InvalidArgument(format!(
                "{flat_type} unit count must be between 0 and {}, got {count}",
                u32::MAX
            ))
        })?;
        self.units.insert(flat_type, count);
        Ok(())
    }
}
