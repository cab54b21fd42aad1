use crate::model::ItemId;
use uuid::Uuid;

/// Issue a fresh item id: the 32-char lowercase hex form of a random v4 UUID.
///
/// Random ids keep rapid captures from colliding without any shared counter,
/// which also means filename order carries no creation order.
pub fn new_id() -> ItemId {
    ItemId::new(Uuid::new_v4().simple().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_32_hex_chars() {
        let id = new_id();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(id.is_well_formed());
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: HashSet<ItemId> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
