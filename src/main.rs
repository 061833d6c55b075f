// coupe-display demo binary
//
// Opens a window and runs the software rendering pipeline on a demo scene.

use coupe_display::{run_display, DisplayConfig};

fn main() {
    let config = DisplayConfig::load_or_default();

    if let Err(e) = run_display(config) {
        eprintln!("Display error: {}", e);
        std::process::exit(1);
    }
}
