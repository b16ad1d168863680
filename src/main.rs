use glycochem::{AtomicDatabase, Composition, MassKind, MassOptions, ResidueDatabase, Result, generation};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use rust_decimal::Decimal;
use rustyline::DefaultEditor;
use shards::{FragmentOptions, Fragmenter};
use std::{fmt::Write, sync::LazyLock};

static ATOMIC_DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);
static RESIDUE_DB: LazyLock<ResidueDatabase> =
    LazyLock::new(|| ResidueDatabase::with_defaults(&ATOMIC_DB));

fn main() {
    let mut rl = DefaultEditor::new().unwrap();
    let options = FragmentOptions::all()
        .with_max_cleavages(Some(2))
        .with_max_cross_ring_cleavages(Some(1));
    let mut fragmenter = Fragmenter::new(&RESIDUE_DB, options);
    while let Ok(composition) = rl.readline("Composition: ") {
        rl.add_history_entry(&composition).unwrap();
        match composition_info(&mut fragmenter, &composition) {
            Ok(info) => print!("{info}"),
            Err(diagnostic) => render_error(*diagnostic),
        }
    }
}

fn composition_info(fragmenter: &mut Fragmenter<'static, 'static>, text: &str) -> Result<String> {
    let mut buf = String::new();
    let mut composition = Composition::new(&RESIDUE_DB, text)?;
    writeln!(buf, "Canonical Form: {composition}").unwrap();

    let mono_mass = composition.mass();
    composition.set_mass_options(MassOptions {
        kind: MassKind::Average,
        perderivatization: None,
    });
    let avg_mass = composition.mass();
    composition.set_mass_options(MassOptions {
        kind: MassKind::Monoisotopic,
        perderivatization: RESIDUE_DB.perderivatization("perMe").ok(),
    });
    let permethylated_mass = composition.mass();
    composition.set_mass_options(MassOptions::default());

    writeln!(buf, "Monoisotopic Mass: {}", decimal_round_workaround(mono_mass, 6)).unwrap();
    writeln!(buf, "Average Mass: {}", decimal_round_workaround(avg_mass, 4)).unwrap();
    writeln!(
        buf,
        "Permethylated Mass: {}",
        decimal_round_workaround(permethylated_mass, 6)
    )
    .unwrap();
    writeln!(buf, "Valid Structure: {}", composition.is_valid_structure()).unwrap();
    writeln!(buf, "Free Linkages: {}", composition.max_linkages()).unwrap();

    if composition.is_fragment() {
        writeln!(buf, "Fragment Label: {}", composition.fragment_label()).unwrap();
    } else {
        let substructures = generation::substructures(&composition).len();
        let fragments = fragmenter.fragments(&composition)?.len();
        writeln!(buf, "Substructures: {substructures}").unwrap();
        writeln!(buf, "Fragments ({}): {fragments}", fragmenter.options()).unwrap();
    }

    writeln!(buf).unwrap();

    Ok(buf)
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref())
        .unwrap();
    println!("{buf}");
}

// FIXME: Really this should be fixed in `rust_decimal`...
fn decimal_round_workaround(value: impl Into<Decimal>, decimal_points: u32) -> String {
    let value = value.into().round_dp(decimal_points);
    format!("{value}")
}
