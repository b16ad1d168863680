use divan::{AllocProfiler, Bencher};
use glycochem::{AtomicDatabase, Composition, ResidueDatabase};
use once_cell::sync::Lazy;
use shards::{FragmentOptions, Fragmenter};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

const COMPOSITIONS: [&str; 3] = [
    "Hex:2,HexNAc:1--redEnd",
    "Hex:3,HexNAc:2--redEnd",
    "Hex:3,HexNAc:4,NeuAc:1",
];

static ATOMIC_DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

static RESIDUE_DB: Lazy<ResidueDatabase> = Lazy::new(|| ResidueDatabase::with_defaults(&ATOMIC_DB));

fn main() {
    Lazy::force(&ATOMIC_DB);
    Lazy::force(&RESIDUE_DB);
    divan::main();
}

fn options() -> FragmentOptions {
    FragmentOptions::all()
        .with_max_cleavages(Some(2))
        .with_max_cross_ring_cleavages(Some(1))
}

#[divan::bench(args = COMPOSITIONS)]
fn cold_fragments(bencher: Bencher, text: &str) {
    let composition = Composition::new(&RESIDUE_DB, text).unwrap();
    bencher
        .with_inputs(|| Fragmenter::new(&RESIDUE_DB, options()))
        .bench_local_values(|mut fragmenter| fragmenter.fragments(&composition).unwrap().len());
}

#[divan::bench(args = COMPOSITIONS)]
fn warm_fragments(bencher: Bencher, text: &str) {
    let composition = Composition::new(&RESIDUE_DB, text).unwrap();
    let mut fragmenter = Fragmenter::new(&RESIDUE_DB, options());
    fragmenter.fragments(&composition).unwrap();
    bencher.bench_local(|| fragmenter.fragments(&composition).unwrap().len());
}
