// Plain data behind the SlotTable lock; no atomics here.

/// One bit per possible `u8` id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InUseBitmap {
    words: [u64; 4],
}

impl InUseBitmap {
    pub const fn new() -> Self {
        Self { words: [0; 4] }
    }

    #[inline]
    fn locate(id: u8) -> (usize, u64) {
        ((id >> 6) as usize, 1u64 << (id & 63))
    }

    pub fn contains(&self, id: u8) -> bool {
        let (word, bit) = Self::locate(id);
        self.words[word] & bit != 0
    }

    /// Returns `false` if `id` was already set.
    pub fn insert(&mut self, id: u8) -> bool {
        let (word, bit) = Self::locate(id);
        let fresh = self.words[word] & bit == 0;
        self.words[word] |= bit;
        fresh
    }

    /// Returns `false` if `id` was not set.
    pub fn remove(&mut self, id: u8) -> bool {
        let (word, bit) = Self::locate(id);
        let present = self.words[word] & bit != 0;
        self.words[word] &= !bit;
        present
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&id| self.contains(id))
    }
}

/// Values and in-use bits, guarded together by the table's RwLock.
pub(crate) struct TableState<T> {
    pub(crate) values: Box<[Option<T>]>,
    pub(crate) in_use: InUseBitmap,
}

impl<T> TableState<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            values: (0..capacity).map(|_| None).collect(),
            in_use: InUseBitmap::new(),
        }
    }
}
