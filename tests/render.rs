//! Offline render smoke tests through the console.

use dm_core::{DeckId, EqBand};
use dm_engine::RENDER_QUANTUM;
use dm_master::{
    frames_to_wav, render_into, render_session, Console, ConsoleConfig, Frame, MemoryOutput, Mixer,
};
use dm_synth::LoopKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn config() -> ConsoleConfig {
    ConsoleConfig {
        sample_rate: 22050,
        seed: Some(1),
        ..Default::default()
    }
}

fn peak(frames: &[Frame]) -> i16 {
    frames
        .iter()
        .map(|f| f.left.saturating_abs())
        .max()
        .unwrap_or(0)
}

fn render(mixer: &mut Mixer, frames: usize) -> Vec<Frame> {
    let mut out = MemoryOutput::new(mixer.sample_rate());
    render_into(mixer, frames, &mut out).unwrap();
    out.into_frames()
}

#[test]
fn session_renders_nonsilent_stereo() {
    let frames = render_session(&config(), 1.0).unwrap();
    assert_eq!(frames.len(), 22050);
    assert!(peak(&frames) > 1000, "peak {}", peak(&frames));
    assert!(frames.iter().all(|f| f.left == f.right));
}

#[test]
fn silent_until_a_deck_plays() {
    let (mut console, mut mixer) = Console::offline(&config()).unwrap();
    assert_eq!(peak(&render(&mut mixer, 4096)), 0);

    console.deck_mut(DeckId::A).play();
    assert!(peak(&render(&mut mixer, 4096)) > 0);
}

#[test]
fn crossfade_selects_deck() {
    let (mut console, mut mixer) = Console::offline(&config()).unwrap();
    console.deck_mut(DeckId::B).play();

    console.bus_mut().set_crossfade(0.0);
    // Skip the block in which the command lands.
    render(&mut mixer, 256);
    assert_eq!(peak(&render(&mut mixer, 8192)), 0);

    console.bus_mut().set_crossfade(1.0);
    render(&mut mixer, 256);
    assert!(peak(&render(&mut mixer, 8192)) > 0);
}

#[test]
fn master_volume_scales_output() {
    let loud = {
        let (mut console, mut mixer) = Console::offline(&config()).unwrap();
        console.bus_mut().set_master_volume(1.0);
        console.deck_mut(DeckId::A).play();
        peak(&render(&mut mixer, 22050))
    };
    let quiet = {
        let (mut console, mut mixer) = Console::offline(&config()).unwrap();
        console.bus_mut().set_master_volume(0.25);
        console.deck_mut(DeckId::A).play();
        peak(&render(&mut mixer, 22050))
    };
    assert!(quiet > 0);
    let ratio = quiet as f32 / loud as f32;
    assert!((ratio - 0.25).abs() < 0.01, "ratio {}", ratio);
}

#[test]
fn eq_cut_reduces_bass_loop() {
    let level = |gain_db: f32| {
        let (mut console, mut mixer) = Console::offline(&ConsoleConfig {
            deck_b: LoopKind::Bass,
            crossfade: 1.0,
            ..config()
        })
        .unwrap();
        console.deck_mut(DeckId::B).set_eq_named("low", gain_db);
        console.deck_mut(DeckId::B).play();
        peak(&render(&mut mixer, 22050))
    };
    assert!(level(-24.0) < level(0.0) / 2);
}

#[test]
fn wav_header_matches_render() {
    let frames = render_session(&config(), 0.5).unwrap();
    let bytes = frames_to_wav(&frames, 22050);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    let channels = u16::from_le_bytes([bytes[22], bytes[23]]);
    let rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let data_len = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
    assert_eq!(channels, 2);
    assert_eq!(rate, 22050);
    assert_eq!(data_len as usize, frames.len() * 4);
    assert_eq!(bytes.len(), 44 + frames.len() * 4);
}

#[test]
fn random_automation_stays_bounded_and_in_step() {
    let mut rng = StdRng::seed_from_u64(0x00de_c4a1);
    let (mut console, mut mixer) = Console::offline(&config()).unwrap();
    let mut block = vec![0.0f32; 4 * RENDER_QUANTUM];

    for _ in 0..300 {
        for _ in 0..rng.gen_range(0..48) {
            let id = if rng.gen_bool(0.5) { DeckId::A } else { DeckId::B };
            match rng.gen_range(0..7) {
                0 | 1 => {
                    console.deck_mut(id).toggle();
                }
                2 => console.deck_mut(id).set_volume(rng.gen_range(0.0..1.5)),
                3 => {
                    let band = EqBand::ALL[rng.gen_range(0..EqBand::ALL.len())];
                    console.deck_mut(id).set_eq(band, rng.gen_range(-24.0..12.0));
                }
                4 => console.deck_mut(id).set_pitch_percent(rng.gen_range(-50.0..50.0)),
                5 => console.bus_mut().set_crossfade(rng.gen_range(0.0..1.0)),
                _ => {
                    let kind = LoopKind::ALL[rng.gen_range(0..LoopKind::ALL.len())];
                    console.load(id, kind);
                }
            }
        }

        // Any length that crosses at least one block boundary.
        let n = rng.gen_range(RENDER_QUANTUM..block.len());
        mixer.render(&mut block[..n]);
        assert!(
            block[..n].iter().all(|s| s.is_finite() && s.abs() < 64.0),
            "runaway output"
        );
        for id in DeckId::ALL {
            assert_eq!(console.deck(id).is_playing(), mixer.strip(id).has_voice());
        }
    }
}
