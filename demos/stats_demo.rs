use clap::Parser;
use hopscotch_map::HashMap;

#[derive(Parser, Debug)]
struct Args {
    /// Number of entries to insert.
    #[arg(short = 'n', long = "entries", default_value_t = 100_000)]
    entries: u64,

    /// Starting number of addressable positions.
    #[arg(short = 'c', long = "capacity", default_value_t = hopscotch_map::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Fraction of entries to remove after filling, between 0 and 1.
    #[arg(short = 'r', long = "remove", default_value_t = 0.0)]
    remove_fraction: f64,
}

fn main() {
    let args = Args::parse();

    println!(
        "Filling map with {} entries, starting capacity {}",
        args.entries, args.capacity
    );

    let mut map: HashMap<u64, u64> = HashMap::with_capacity(args.capacity);
    for i in 0..args.entries {
        map.insert(i, i);
    }

    println!("Inserted {} entries", map.len());
    map.probe_histogram().print();
    map.debug_stats().print();

    let to_remove = (args.entries as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    if to_remove > 0 {
        for i in 0..to_remove {
            map.remove(&i);
        }
        println!(
            "Removed {} entries; capacity stays {} until the next insert",
            to_remove,
            map.capacity()
        );

        map.insert(u64::MAX, 0);
        println!("After one more insert the capacity is {}", map.capacity());
        map.debug_stats().print();
    }
}
