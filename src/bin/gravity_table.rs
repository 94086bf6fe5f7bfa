//! Print a specific gravity reference table with Brix, Baume and potential ABV
//! Usage: cargo run --bin gravity_table -- [start] [end] [step]

use meadcalc::gravity::{cross_scale_convert, GravityScale};
use meadcalc::measure::parse_input;

fn arg_or(args: &[String], index: usize, default: f64) -> Result<f64, Box<dyn std::error::Error>> {
    match args.get(index) {
        Some(raw) => Ok(parse_input(raw)?.unwrap_or(default)),
        None => Ok(default),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let start = arg_or(&args, 1, 1.000)?;
    let end = arg_or(&args, 2, 1.160)?;
    let step = arg_or(&args, 3, 0.005)?;

    if step <= 0.0 || end < start {
        return Err("Expected start <= end and a positive step".into());
    }

    println!("{:>7} {:>7} {:>7} {:>8}", "SG", "Brix", "Baume", "Pot.ABV");
    println!("{}", "-".repeat(32));

    let rows = ((end - start) / step + 1e-9).floor() as u64;
    for i in 0..=rows {
        let sg = start + step * i as f64;
        let readings = cross_scale_convert(sg, GravityScale::Sg)?;
        println!(
            "{:>7.3} {:>7.1} {:>7.1} {:>7.1}%",
            readings.sg, readings.brix, readings.baume, readings.abv
        );
    }

    Ok(())
}
