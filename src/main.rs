//! # Recto CLI
//!
//! Usage:
//!   recto job.json -o sheets.pdf
//!   echo '{ ... }' | recto -o sheets.pdf
//!   recto --example > job.json

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_job_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| recto::OUTPUT_FILE_NAME.to_string());

    // Render
    match recto::render_job_json(&input, recto::font::FontLibrary::global()) {
        Ok(pdf_bytes) => {
            fs::write(&output_path, &pdf_bytes).expect("Failed to write PDF");
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_job_json() -> &'static str {
    r##"{
  "cards": [
    { "id": "c1", "word": "mountain", "gloss": "a very tall natural rise of land", "categoryId": "nature" },
    { "id": "c2", "word": "river", "gloss": "a large natural stream of water", "categoryId": "nature" },
    { "id": "c3", "word": "猫", "gloss": "cat", "transliteration": "māo", "categoryId": "animals" },
    { "id": "c4", "word": "山", "gloss": "mountain", "transliteration": "shān", "categoryId": "nature" }
  ],
  "sets": [
    { "id": "nature-basics", "name": "Nature Basics", "cardIds": ["c1", "c2", "c4"] }
  ],
  "job": {
    "cardIds": ["c3"],
    "setIds": ["nature-basics"],
    "includeBack": true,
    "previewSide": "front"
  },
  "fonts": [
    { "kind": "cjk", "src": "https://cdn.jsdelivr.net/fontsource/fonts/noto-sans-sc@latest/chinese-simplified-400-normal.ttf" },
    { "kind": "latinExt", "src": "https://cdn.jsdelivr.net/fontsource/fonts/noto-sans@latest/latin-ext-400-normal.ttf" }
  ]
}"##
}
