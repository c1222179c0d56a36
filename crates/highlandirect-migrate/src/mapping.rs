//! Legacy customer number to destination address id.

use std::collections::HashMap;

/// Old customer id → new `AddressId`.
///
/// Filled by the customer phase and read by the order phase. An empty
/// mapping means no customers were migrated, and every order is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMapping {
    addresses: HashMap<i64, i64>,
}

impl KeyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the address generated for a legacy customer. Returns the
    /// previous address if the customer was already mapped.
    pub fn record(&mut self, cust_no: i64, address_id: i64) -> Option<i64> {
        self.addresses.insert(cust_no, address_id)
    }

    pub fn address_for(&self, cust_no: i64) -> Option<i64> {
        self.addresses.get(&cust_no).copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Entries sorted by legacy customer number.
    pub fn entries(&self) -> Vec<(i64, i64)> {
        let mut entries: Vec<(i64, i64)> =
            self.addresses.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let mut mapping = KeyMapping::new();
        assert!(mapping.is_empty());
        assert_eq!(mapping.record(7, 1), None);
        assert_eq!(mapping.record(3, 2), None);

        assert_eq!(mapping.address_for(7), Some(1));
        assert_eq!(mapping.address_for(99), None);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.entries(), vec![(3, 2), (7, 1)]);
    }

    #[test]
    fn test_rerecord_returns_previous() {
        let mut mapping = KeyMapping::new();
        mapping.record(7, 1);
        assert_eq!(mapping.record(7, 5), Some(1));
        assert_eq!(mapping.address_for(7), Some(5));
        assert_eq!(mapping.len(), 1);
    }
}
