//! deckmix: a two-deck loop console in the terminal.
//!
//! Usage:
//!   deckmix --deck-a kick --deck-b synth --crossfade 0.3
//!   deckmix --seconds 8 --wav mix.wav

mod args;

use std::io::Write;
use std::time::{Duration, Instant};

use dm_core::DeckId;
use dm_master::{render_session, save_wav, Console, ConsoleConfig};

const BARS: usize = 16;
const LEVELS: &[u8] = b" .:-=+*#%@";

fn main() {
    env_logger::init();

    let options = args::parse(std::env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("{}\n\n{}", e, args::USAGE);
        std::process::exit(2);
    });
    log::debug!("{:?}", options);

    let result = match &options.wav {
        Some(path) => render_to_wav(&options.config, options.seconds, path),
        None => play_live(&options.config, options.seconds),
    };
    if let Err(e) = result {
        eprintln!("deckmix: {}", e);
        std::process::exit(1);
    }
}

fn play_live(config: &ConsoleConfig, seconds: f64) -> Result<(), dm_master::ConsoleError> {
    let mut console = Console::start(config)?;
    for id in DeckId::ALL {
        console.deck_mut(id).play();
    }
    println!(
        "Playing {} on A and {} on B at {} Hz",
        console.loaded(DeckId::A),
        console.loaded(DeckId::B),
        console.sample_rate()
    );

    let started = Instant::now();
    let run_for = Duration::from_secs_f64(seconds.max(0.0));
    while started.elapsed() < run_for && console.is_live() {
        print!("\r{}", status_line(&mut console));
        let _ = std::io::stdout().flush();
        std::thread::sleep(Duration::from_millis(33));
    }

    console.shutdown();
    println!("\nDone.");
    Ok(())
}

fn status_line(console: &mut Console) -> String {
    let mut line = String::new();
    for id in DeckId::ALL {
        let deck = console.deck(id);
        line.push_str(&format!(
            "{} {:<6} {:5.2}s {} | ",
            id,
            console.loaded(id),
            deck.position(),
            if deck.is_playing() { '>' } else { '|' }
        ));
    }
    line.push_str(&format!("xf {:.2} | ", console.bus().crossfade()));
    for bar in console.spectrum().bars(BARS) {
        let level = bar as usize * (LEVELS.len() - 1) / 255;
        line.push(LEVELS[level] as char);
    }
    line
}

fn render_to_wav(
    config: &ConsoleConfig,
    seconds: f64,
    path: &std::path::Path,
) -> Result<(), dm_master::ConsoleError> {
    println!(
        "Rendering {:.1}s to {} at {} Hz...",
        seconds,
        path.display(),
        config.sample_rate
    );
    let frames = render_session(config, seconds)?;
    save_wav(path, &frames, config.sample_rate)?;
    println!("Wrote {} frames.", frames.len());
    Ok(())
}
