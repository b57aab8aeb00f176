//! Example: building a lexicon, saving it, and querying the loaded copy.
//!
//! Run with: cargo run --example wordlist

use std::error::Error;

use minidawg::dawg::{Automaton, DumpFormat, Encoder, Kind};

fn main() -> Result<(), Box<dyn Error>> {
    let words = [
        "greenish",
        "greenness",
        "greens",
        "greet",
        "greeting",
        "greets",
        "gregarious",
        "gregariously",
    ];

    let mut enc = Encoder::new(Kind::Numbered);
    for word in words {
        enc.add(word)?;
    }
    let dir = std::env::temp_dir();
    let path = dir.join("wordlist-lexicon.dat");
    enc.finalize().dump_file(&path)?;

    let lexicon = Automaton::load_file(&path)?;
    std::fs::remove_file(&path)?;

    println!("{} words in {} states", lexicon.size(), lexicon.state_count());

    println!("\nWord lookup:");
    for word in ["greet", "greeter", "gregarious", "green"] {
        match lexicon.locate(word)? {
            Some(rank) => println!("  {word}: #{rank}"),
            None => println!("  {word}: no"),
        }
    }

    println!("\nWords starting with \"greet\":");
    for word in lexicon.iter_prefix("greet") {
        println!("  {}", String::from_utf8_lossy(&word));
    }

    println!("\nTransitions:");
    lexicon.write_debug(std::io::stdout().lock(), DumpFormat::Tsv)?;
    Ok(())
}
