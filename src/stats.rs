use alloc::vec;
use alloc::vec::Vec;

use crate::HashMap;
use crate::neighborhood::WINDOW;

/// Distribution of entry distances from their ideal index.
///
/// `bins[d]` counts table entries stored `d` slots after their ideal index, for
/// `d` in `0..WINDOW`. Entries in the overflow store are counted separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// In-table entries per displacement distance.
    pub bins: Vec<usize>,
    /// Entries held in the overflow store.
    pub overflow: usize,
}

impl ProbeHistogram {
    /// Largest distance any in-table entry sits from its ideal index.
    pub fn max_distance(&self) -> Option<usize> {
        self.bins.iter().rposition(|&count| count > 0)
    }

    /// Pretty-prints the histogram horizontally using stdout. Each row is a
    /// distance bin, plus an "OF" row for overflow entries.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self
            .bins
            .iter()
            .copied()
            .chain(core::iter::once(self.overflow))
            .max()
            .unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        let total: usize = self.bins.iter().sum::<usize>() + self.overflow;
        println!("probe histogram ({} entries):", total);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let full = units / 8;
            let rem = units % 8;
            let mut bar = "█".repeat(full);
            if rem > 0 {
                let ch = match rem {
                    1 => '▏',
                    2 => '▎',
                    3 => '▍',
                    4 => '▌',
                    5 => '▋',
                    6 => '▊',
                    _ => '▉',
                };
                bar.push(ch);
            }
            bar
        };

        let last = self.max_distance().unwrap_or(0);
        for (i, &count) in self.bins.iter().take(last + 1).enumerate() {
            println!("{:>2} | {} ({})", i, make_bar(count), count);
        }
        println!("OF | {} ({})", make_bar(self.overflow), self.overflow);
    }
}

/// Occupancy statistics for a [`HashMap`].
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the map.
    pub len: usize,
    /// Addressable positions in the table.
    pub capacity: usize,
    /// Physical slots allocated for the table.
    pub total_slots: usize,
    /// Slots currently holding an entry.
    pub occupied_slots: usize,
    /// Number of entries in the overflow store.
    pub overflow_entries: usize,
    /// Table entries over physical slots, as used by the resize policy.
    pub load_factor: f64,
    /// Occupied slots over physical slots.
    pub slot_utilization: f64,
}

impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hopscotch Map Statistics ===");
        println!(
            "Population: {} over {} addressable positions ({:.2}% load factor)",
            self.len,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization)",
            self.occupied_slots,
            self.total_slots,
            self.slot_utilization * 100.0
        );
        println!("Overflow: {} entries", self.overflow_entries);
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Computes a histogram of how far each entry sits from its ideal index.
    ///
    /// Requires the `stats` feature.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let table = self.table();
        let mut bins = vec![0usize; WINDOW];
        for (index, bucket) in table.occupied() {
            bins[index - table.ideal(bucket.hash())] += 1;
        }

        ProbeHistogram {
            bins,
            overflow: self.overflow().len(),
        }
    }

    /// Returns occupancy statistics for the current table.
    ///
    /// Requires the `stats` feature.
    pub fn debug_stats(&self) -> DebugStats {
        let table = self.table();
        DebugStats {
            len: self.len(),
            capacity: table.capacity(),
            total_slots: table.physical_len(),
            occupied_slots: table.slots().iter().filter(|slot| slot.is_occupied()).count(),
            overflow_entries: self.overflow().len(),
            load_factor: self.load_factor(),
            slot_utilization: table.load_factor(),
        }
    }
}
