pub mod Pool;
pub mod Table;

pub mod Structs {
    pub mod Table_Structs;
    pub use Table_Structs::InUseBitmap; // re-export for stable path
}

pub use Pool::{SlotPool, MAX_POOL_CAPACITY};
pub use Table::SlotTable;
