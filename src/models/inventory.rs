use crate::models::instance::ItemInstance;
use crate::models::types::InstanceId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordered container of item instances. Membership is by identity (`Arc::ptr_eq`), so two
/// instances of the same blueprint are tracked individually.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    items: Vec<Arc<ItemInstance>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item. Returns false (and changes nothing) if it is already in here.
    pub fn add(&mut self, item: Arc<ItemInstance>) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove this exact instance. Returns false if it was not in here.
    pub fn remove(&mut self, item: &Arc<ItemInstance>) -> bool {
        match self.items.iter().position(|i| Arc::ptr_eq(i, item)) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &Arc<ItemInstance>) -> bool {
        self.items.iter().any(|i| Arc::ptr_eq(i, item))
    }

    pub fn get_by_id(&self, id: InstanceId) -> Option<Arc<ItemInstance>> {
        self.items.iter().find(|i| i.id == id).cloned()
    }

    /// All items whose blueprint name or tags contain `query` (case-insensitive), in order.
    pub fn search(&self, query: &str) -> Vec<Arc<ItemInstance>> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|i| i.blueprint.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn items(&self) -> &[Arc<ItemInstance>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|i| i.weight()).sum()
    }

    /// Blueprint ids of everything carried, used for key checks.
    pub fn blueprint_ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.blueprint_id.clone()).collect()
    }

    pub fn drain(&mut self) -> Vec<Arc<ItemInstance>> {
        std::mem::take(&mut self.items)
    }
}

/// How many matching items the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    All,
    Exactly(usize),
}

impl Quantity {
    fn limit(&self, available: usize) -> usize {
        match self {
            Quantity::All => available,
            Quantity::Exactly(n) => (*n).min(available),
        }
    }
}

/// Outcome of moving items between two containers.
#[derive(Debug, Default)]
pub struct TransferReport {
    /// Items that matched the query in the source
    pub matched: usize,
    /// Items the caller wanted (after clamping to `matched`)
    pub requested: usize,
    /// Items that actually changed container, in order
    pub moved: Vec<Arc<ItemInstance>>,
}

impl TransferReport {
    pub fn left_behind(&self) -> usize {
        self.requested - self.moved.len()
    }

    pub fn is_complete(&self) -> bool {
        self.left_behind() == 0
    }
}

/// Move up to `quantity` items matching `query` from `from` into `to`.
///
/// `capacity` is the weight the destination may still take (`None` = unlimited). Transfer
/// stops at the first item that would exceed it. Every item is removed from the source
/// before it is added to the destination; an item that cannot be removed is not added.
pub fn transfer_matching(
    from: &mut Inventory,
    to: &mut Inventory,
    query: &str,
    quantity: Quantity,
    capacity: Option<f64>,
) -> TransferReport {
    let matches = from.search(query);
    let requested = quantity.limit(matches.len());

    let mut report = TransferReport {
        matched: matches.len(),
        requested,
        moved: Vec::new(),
    };

    let mut remaining = capacity;
    for item in matches.into_iter().take(requested) {
        if let Some(left) = remaining {
            if item.weight() > left {
                break;
            }
            remaining = Some(left - item.weight());
        }

        if !from.remove(&item) {
            break;
        }
        to.add(item.clone());
        report.moved.push(item);
    }

    report
}

#[derive(Debug, PartialEq, Eq)]
pub enum EquipError {
    /// The item's blueprint does not list this slot
    InvalidSlot,
    /// Something is already worn there
    SlotOccupied,
}

/// Slot label to the single item worn there.
#[derive(Debug, Default, Clone)]
pub struct Equipment {
    slots: BTreeMap<String, Arc<ItemInstance>>,
}

impl Equipment {
    pub fn new() -> Self {
        Self { slots: BTreeMap::new() }
    }

    pub fn equip(&mut self, slot: &str, item: Arc<ItemInstance>) -> Result<(), EquipError> {
        if !item.blueprint.fits_slot(slot) {
            return Err(EquipError::InvalidSlot);
        }
        let slot = slot.to_ascii_lowercase();
        if self.slots.contains_key(&slot) {
            return Err(EquipError::SlotOccupied);
        }
        self.slots.insert(slot, item);
        Ok(())
    }

    pub fn unequip(&mut self, slot: &str) -> Option<Arc<ItemInstance>> {
        self.slots.remove(&slot.to_ascii_lowercase())
    }

    pub fn get(&self, slot: &str) -> Option<&Arc<ItemInstance>> {
        self.slots.get(&slot.to_ascii_lowercase())
    }

    /// Slot holding this exact instance, if it is worn.
    pub fn slot_of(&self, item: &Arc<ItemInstance>) -> Option<String> {
        self.slots
            .iter()
            .find(|(_, worn)| Arc::ptr_eq(worn, item))
            .map(|(slot, _)| slot.clone())
    }

    /// Worn items matching `query`, with the slot they occupy.
    pub fn search(&self, query: &str) -> Vec<(String, Arc<ItemInstance>)> {
        let needle = query.trim().to_lowercase();
        self.slots
            .iter()
            .filter(|(_, i)| i.blueprint.matches(&needle))
            .map(|(s, i)| (s.clone(), i.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<ItemInstance>)> {
        self.slots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.slots.values().map(|i| i.weight()).sum()
    }
}
