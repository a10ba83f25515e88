mod presets;

use std::path::PathBuf;
use std::process::exit;

use structopt::{clap::AppSettings, StructOpt};

use wled::{ApplyOptions, Controller, ControllerConfig, Ensured, OnUnresolvable};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "wled",
    about = "A CLI to keep your WLED strip on the right effect and palette."
)]
#[structopt(global_setting = AppSettings::ColoredHelp)]
struct Options {
    #[structopt(env = "WLED_ADDR", default_value = "")]
    address: String,
    #[structopt(short, long, env = "WLED_TIMEOUT", help = "Per request timeout in seconds")]
    timeout: Option<f64>,
    #[structopt(
        long,
        help = "Turn the strip off instead of failing when a name is missing"
    )]
    turn_off_on_missing: bool,
    #[structopt(short, long, parse(from_os_str), help = "YAML config file")]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    subcommand: Command,
}

#[derive(Debug, StructOpt)]
struct Effect {
    #[structopt(short, long, help = "Palette name (default: C9)")]
    palette: Option<String>,
    #[structopt(short, long, allow_hyphen_values = true, help = "Brightness, clamped to 1..255")]
    brightness: Option<i64>,
    #[structopt(short, long, help = "Segment id")]
    segment: Option<u32>,
    #[structopt(short, long, help = "Transition in milliseconds")]
    transition: Option<u32>,
    #[structopt(short, long, help = "Palette used when the requested one is missing")]
    fallback: Option<String>,
    #[structopt(short, long, help = "Effect name (default: TwinkleFox)")]
    effect: Option<String>,
}

impl Effect {
    fn merge(self, mut opts: ApplyOptions) -> ApplyOptions {
        if let Some(palette) = self.palette {
            opts.palette = palette;
        }
        if let Some(brightness) = self.brightness {
            opts.brightness = brightness;
        }
        if let Some(segment) = self.segment {
            opts.segment_id = segment;
        }
        if let Some(transition) = self.transition {
            opts.transition_ms = transition;
        }
        if let Some(fallback) = self.fallback {
            opts.fallback_palette = Some(fallback);
        }
        if let Some(effect) = self.effect {
            opts.effect = effect;
        }
        opts
    }
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(about = "Apply the effect and palette")]
    Apply(Effect),
    #[structopt(about = "Apply the effect and palette only if the strip drifted")]
    Ensure(Effect),
    #[structopt(about = "Turn the strip off")]
    Off,
    #[structopt(about = "List effects")]
    Effects,
    #[structopt(about = "List palettes")]
    Palettes,
    #[structopt(about = "Print current state")]
    State,
    #[structopt(about = "Presets")]
    Preset {
        #[structopt(possible_values = &presets::Preset::variants(), case_insensitive = true)]
        preset: presets::Preset,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opt = Options::from_args();

    let mut config = match &opt.config {
        Some(path) => ControllerConfig::load(path).await.unwrap_or_else(|e| {
            eprintln!("{}: {}", path.display(), e);
            exit(2)
        }),
        None => ControllerConfig::default(),
    };

    if !opt.address.is_empty() {
        config.host = opt.address.clone();
    }
    if let Some(timeout) = opt.timeout {
        config.timeout_secs = timeout;
    }
    if opt.turn_off_on_missing {
        config.on_unresolvable = OnUnresolvable::TurnOff;
    }

    if config.host.is_empty() {
        structopt::clap::Error::with_description(
            "No address specified (use --help for more info)",
            structopt::clap::ErrorKind::MissingRequiredArgument,
        )
        .exit();
    }

    let mut wled = Controller::from_config(&config);

    let output = match opt.subcommand {
        Command::Apply(effect) => wled
            .apply_effect(&effect.merge(config.apply))
            .await
            .map(|applied| applied.response().to_string()),
        Command::Ensure(effect) => wled
            .ensure_effect(&effect.merge(config.apply))
            .await
            .map(|ensured| match ensured {
                Ensured::Unchanged(_) => "unchanged".to_string(),
                Ensured::Updated(applied) => applied.response().to_string(),
            }),
        Command::Off => wled.turn_off().await.map(|r| r.to_string()).map_err(Into::into),
        Command::Effects => wled.effects().await.map(numbered).map_err(Into::into),
        Command::Palettes => wled.palettes().await.map(numbered).map_err(Into::into),
        Command::State => wled
            .state()
            .await
            .map_err(Into::into)
            .and_then(|state| serde_json::to_string_pretty(&state).map_err(|e| {
                wled::Error::Transport(wled::TransportError::Encode(e))
            })),
        Command::Preset { preset } => presets::apply(&mut wled, preset, config.apply)
            .await
            .map(|applied| applied.response().to_string()),
    };

    match output {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            exit(1)
        }
    }
}

fn numbered(names: Vec<String>) -> String {
    names
        .iter()
        .enumerate()
        .map(|(id, name)| format!("{:>3} {}", id, name))
        .collect::<Vec<String>>()
        .join("\n")
}
