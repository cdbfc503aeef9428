/// Allocates and recycles dense slot indices with generation stamps.
///
/// Each culling group gives every member object a dense slot so that
/// per-object state (visibility bits, cached world boxes) lives in flat
/// arrays. Freed slots are recycled; every allocation of a slot bumps its
/// generation, so state recorded for a previous occupant can be detected
/// as stale by comparing generations.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new();
/// let a = alloc.alloc();  // index 0, generation 1
/// alloc.free(a);
/// let b = alloc.alloc();  // index 0, generation 2 (recycled)
/// ```
pub struct SlotAllocator {
    entries: Vec<SlotEntry>,
    free_list: Vec<u32>,
    len: u32,
}

/// A slot handed out by `SlotAllocator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Dense index into per-slot arrays
    pub index: u32,
    /// Incarnation of this index (never 0 for an allocated slot)
    pub generation: u32,
}

#[derive(Clone, Copy)]
struct SlotEntry {
    generation: u32,
    live: bool,
}

impl SlotAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Allocate the next available slot, recycling freed indices first
    pub fn alloc(&mut self) -> Slot {
        self.len += 1;
        let index = self.free_list.pop().unwrap_or_else(|| {
            self.entries.push(SlotEntry { generation: 0, live: false });
            (self.entries.len() - 1) as u32
        });

        let entry = &mut self.entries[index as usize];
        // Generation 0 is reserved for "never seen"
        entry.generation = entry.generation.wrapping_add(1).max(1);
        entry.live = true;

        Slot { index, generation: entry.generation }
    }

    /// Return a slot to the pool.
    ///
    /// Returns false (and does nothing) if the slot is not currently
    /// allocated with this generation.
    pub fn free(&mut self, slot: Slot) -> bool {
        if !self.is_live(slot) {
            return false;
        }
        self.entries[slot.index as usize].live = false;
        self.len -= 1;
        self.free_list.push(slot.index);
        true
    }

    /// Whether `slot` is allocated with exactly this generation
    pub fn is_live(&self, slot: Slot) -> bool {
        self.generation(slot.index) == Some(slot.generation)
    }

    /// Generation of the live occupant of `index`, `None` if free
    pub fn generation(&self, index: u32) -> Option<u32> {
        self.entries
            .get(index as usize)
            .filter(|e| e.live)
            .map(|e| e.generation)
    }

    /// Highest index ever allocated + 1.
    ///
    /// This is the minimum capacity per-slot storage must have.
    pub fn high_water_mark(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Number of currently allocated slots
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no slots are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
