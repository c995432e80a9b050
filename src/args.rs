//! Command-line flags.

use std::path::PathBuf;

use dm_master::ConsoleConfig;
use dm_synth::LoopKind;

pub const USAGE: &str = "\
Usage: deckmix [options]

  --deck-a <loop>      loop on deck A (kick, bass, hihat, synth)
  --deck-b <loop>      loop on deck B
  --crossfade <0..1>   crossfader position, 0 = all A
  --master <gain>      master volume
  --seed <n>           seed for the hi-hat noise
  --seconds <n>        how long to play or render
  --wav <path>         render offline to a WAV file instead of playing";

/// Seconds to run when `--seconds` is not given.
pub const DEFAULT_SECONDS: f64 = 30.0;

#[derive(Debug, PartialEq)]
pub struct Options {
    pub config: ConsoleConfig,
    pub seconds: f64,
    pub wav: Option<PathBuf>,
}

pub fn parse<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options {
        config: ConsoleConfig::default(),
        seconds: DEFAULT_SECONDS,
        wav: None,
    };

    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match flag.as_str() {
            "--deck-a" => options.config.deck_a = parse_loop(&value()?)?,
            "--deck-b" => options.config.deck_b = parse_loop(&value()?)?,
            "--crossfade" => options.config.crossfade = parse_num(&flag, &value()?)?,
            "--master" => options.config.master_volume = parse_num(&flag, &value()?)?,
            "--seed" => options.config.seed = Some(parse_num(&flag, &value()?)?),
            "--seconds" => options.seconds = parse_num(&flag, &value()?)?,
            "--wav" => options.wav = Some(PathBuf::from(value()?)),
            other => return Err(format!("unknown option {}", other)),
        }
    }
    Ok(options)
}

fn parse_loop(value: &str) -> Result<LoopKind, String> {
    value.parse().map_err(|e| format!("{}", e))
}

fn parse_num<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got {:?}", flag, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let options = parse(args(&[])).unwrap();
        assert_eq!(options.config, ConsoleConfig::default());
        assert_eq!(options.seconds, DEFAULT_SECONDS);
        assert_eq!(options.wav, None);
    }

    #[test]
    fn all_flags() {
        let options = parse(args(&[
            "--deck-a", "synth", "--deck-b", "hat", "--crossfade", "0.25", "--master", "1.0",
            "--seed", "42", "--seconds", "4", "--wav", "out.wav",
        ]))
        .unwrap();
        assert_eq!(options.config.deck_a, LoopKind::Pad);
        assert_eq!(options.config.deck_b, LoopKind::Hat);
        assert_eq!(options.config.crossfade, 0.25);
        assert_eq!(options.config.master_volume, 1.0);
        assert_eq!(options.config.seed, Some(42));
        assert_eq!(options.seconds, 4.0);
        assert_eq!(options.wav, Some(PathBuf::from("out.wav")));
    }

    #[test]
    fn errors_are_reported() {
        assert!(parse(args(&["--deck-a", "cowbell"])).is_err());
        assert!(parse(args(&["--crossfade"])).is_err());
        assert!(parse(args(&["--seed", "x"])).is_err());
        assert!(parse(args(&["--loud"])).is_err());
    }
}
