use chrono::{DateTime, Duration, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use sipwise_core::display::gauge_bar;
use sipwise_core::engine::standard_drinks;
use sipwise_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sipwise")]
#[command(about = "Blood alcohol estimation for a drinking session", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate at this instant (RFC 3339) instead of the current time
    #[arg(long, global = true, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the current BAC (default)
    Estimate {
        #[command(flatten)]
        input: SessionArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-evaluate on a fixed interval
    Watch {
        #[command(flatten)]
        input: SessionArgs,

        /// Seconds between evaluations (defaults to refresh.interval_secs)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many evaluations
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Show the time left until the BAC reaches zero
    Countdown {
        #[command(flatten)]
        input: SessionArgs,
    },

    /// List the drink kinds usable with --drink
    Drinks,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Everything needed to build a session from the command line
#[derive(Args, Default)]
struct SessionArgs {
    /// Load profile, drinks and water from a session JSON file
    #[arg(long)]
    session: Option<PathBuf>,

    #[arg(long)]
    age: Option<u32>,

    #[arg(long)]
    weight: Option<f64>,

    /// kg or lbs
    #[arg(long)]
    weight_unit: Option<WeightUnit>,

    #[arg(long)]
    height: Option<f64>,

    /// cm or ft
    #[arg(long)]
    height_unit: Option<HeightUnit>,

    /// male, female, other or prefer-not-to-say
    #[arg(long)]
    gender: Option<Gender>,

    /// low, medium, high or a 1-10 scale
    #[arg(long)]
    tolerance: Option<Tolerance>,

    /// `<abv>,<volume>[ml|oz][,<minutes ago>]` or `<kind>[,<minutes ago>]`
    #[arg(long = "drink")]
    drinks: Vec<String>,

    /// Water drunk, in ml
    #[arg(long = "water")]
    water: Vec<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    sipwise_core::logging::init(cli.verbose);

    // Writing a config must not require a readable one
    if let Some(Commands::Config {
        action: ConfigAction::Init { force },
    }) = cli.command
    {
        return cmd_config_init(cli.config.as_deref(), force);
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Estimate { input, json }) => cmd_estimate(&input, cli.at, json, &config),
        Some(Commands::Watch {
            input,
            interval,
            ticks,
        }) => cmd_watch(&input, cli.at, interval, ticks, &config),
        Some(Commands::Countdown { input }) => cmd_countdown(&input, cli.at, &config),
        Some(Commands::Drinks) => cmd_drinks(),
        Some(Commands::Config {
            action: ConfigAction::Init { force },
        }) => cmd_config_init(cli.config.as_deref(), force),
        None => {
            // Default to "estimate" with the configured profile and no drinks
            cmd_estimate(&SessionArgs::default(), cli.at, false, &config)
        }
    }
}

fn cmd_estimate(input: &SessionArgs, at: Option<DateTime<Utc>>, json: bool, config: &Config) -> Result<()> {
    let now = at.unwrap_or_else(Utc::now);
    let session = build_session(input, now, config)?;
    let result = session.evaluate_with(now, &config.thresholds)?;

    if json {
        let report = serde_json::json!({
            "evaluated_at": now.to_rfc3339(),
            "result": result,
            "gauge_fraction": gauge_fraction(result.bac),
            "sober_at": sober_at(now, result.minutes_to_sober).to_rfc3339(),
            "drinking_pattern": drinking_pattern(result.bac, session.water_intake_ml()),
            "water_ml": session.water_intake_ml(),
            "water_goal_ml": session.water_goal_ml(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_result(&session, &result, now);
    }

    Ok(())
}

fn cmd_watch(
    input: &SessionArgs,
    at: Option<DateTime<Utc>>,
    interval: Option<u64>,
    ticks: Option<u64>,
    config: &Config,
) -> Result<()> {
    let interval = interval.unwrap_or(config.refresh.interval_secs).max(1);
    let start = at.unwrap_or_else(Utc::now);
    let session = build_session(input, start, config)?;

    // A pinned --at replays on a simulated clock instead of sleeping
    let simulated = at.is_some();
    let mut tick: u64 = 0;

    loop {
        let now = if simulated {
            simulated_instant(start, tick, interval)?
        } else {
            Utc::now()
        };

        let result = session.evaluate_with(now, &config.thresholds)?;
        println!(
            "{}  BAC {:.4}%  {}  {}  sober in {} min",
            now.format("%H:%M:%S"),
            result.bac,
            gauge_bar(gauge_fraction(result.bac), 20),
            result.recommendation,
            result.minutes_to_sober
        );

        tick += 1;
        if ticks.is_some_and(|limit| tick >= limit) {
            break;
        }

        if !simulated {
            std::thread::sleep(std::time::Duration::from_secs(interval));
        }
    }

    tracing::debug!("Watch finished after {} ticks", tick);
    Ok(())
}

/// `start` advanced by `tick` intervals, or a parse error past the end of time
fn simulated_instant(start: DateTime<Utc>, tick: u64, interval: u64) -> Result<DateTime<Utc>> {
    tick.checked_mul(interval)
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(Duration::try_seconds)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            Error::Parse(format!(
                "watch tick {} at {}s intervals is out of range",
                tick, interval
            ))
        })
}

fn cmd_countdown(input: &SessionArgs, at: Option<DateTime<Utc>>, config: &Config) -> Result<()> {
    let now = at.unwrap_or_else(Utc::now);
    let session = build_session(input, now, config)?;
    let result = session.evaluate_with(now, &config.thresholds)?;

    let countdown = Countdown::at(sober_at(now, result.minutes_to_sober), now);
    println!("{}", countdown);
    if !countdown.is_sober() {
        println!("Until you're fully sober");
    }

    Ok(())
}

fn cmd_drinks() -> Result<()> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid drink catalog".into()));
    }

    println!("{:<10} {:>12} {:>10}", "KIND", "ABV %", "SERVING");
    for kind in &catalog.kinds {
        println!(
            "{:<10} {:>12} {:>7} ml",
            kind.name,
            format!("{}-{}", kind.abv_min, kind.abv_max),
            kind.serving_ml
        );
    }

    Ok(())
}

fn cmd_config_init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path()?,
    };

    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save_to(&path)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

/// Assemble the session from a JSON file and/or flags, validated like the intake forms
fn build_session(input: &SessionArgs, now: DateTime<Utc>, config: &Config) -> Result<Session> {
    let mut session = match input.session {
        Some(ref path) => {
            let contents = std::fs::read_to_string(path)?;
            let session: Session = serde_json::from_str(&contents)?;
            tracing::info!("Loaded session from {:?} ({} drinks)", path, session.drinks.len());
            session
        }
        None => Session::new(config.profile.to_profile()),
    };

    apply_profile_overrides(&mut session.profile, input);
    session.profile.validate()?;

    for spec in &input.drinks {
        session.add_drink(parse_drink_spec(spec, now)?);
    }
    for &ml in &input.water {
        session.add_water(ml, now);
    }

    // Covers entries from the session file as well as the flags
    session.validate()?;
    Ok(session)
}

fn apply_profile_overrides(profile: &mut Profile, input: &SessionArgs) {
    if let Some(age) = input.age {
        profile.age = age;
    }
    if let Some(weight) = input.weight {
        profile.weight = weight;
    }
    if let Some(unit) = input.weight_unit {
        profile.weight_unit = unit;
    }
    if let Some(height) = input.height {
        profile.height = height;
    }
    if let Some(unit) = input.height_unit {
        profile.height_unit = unit;
    }
    if let Some(gender) = input.gender {
        profile.gender = gender;
    }
    if let Some(tolerance) = input.tolerance {
        profile.tolerance = tolerance;
    }
}

/// Parse a `--drink` value into an event timestamped relative to `now`
fn parse_drink_spec(spec: &str, now: DateTime<Utc>) -> Result<DrinkEvent> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    let first = parts.first().copied().unwrap_or_default();

    match first.trim_end_matches('%').parse::<f64>() {
        Ok(abv) => {
            let volume = parts
                .get(1)
                .ok_or_else(|| Error::Parse(format!("drink '{}' is missing a volume", spec)))?;
            let (volume, unit) = parse_volume(volume)?;
            let at = drink_time(now, parts.get(2).copied())?;
            if parts.len() > 3 {
                return Err(Error::Parse(format!("drink '{}' has too many fields", spec)));
            }
            Ok(DrinkEvent::new("Custom", abv, volume, unit, at))
        }
        Err(_) => {
            let kind = get_default_catalog().find(first).ok_or_else(|| {
                Error::Parse(format!(
                    "unknown drink '{}' (see `sipwise drinks`, or use <abv>,<volume>)",
                    first
                ))
            })?;
            if parts.len() > 2 {
                return Err(Error::Parse(format!("drink '{}' has too many fields", spec)));
            }
            let at = drink_time(now, parts.get(1).copied())?;
            Ok(kind.preset(at))
        }
    }
}

/// `330ml`, `12oz` or a bare number of ml
fn parse_volume(text: &str) -> Result<(f64, VolumeUnit)> {
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);

    let volume = number
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Parse(format!("invalid volume '{}'", text)))?;
    let unit = if unit.is_empty() {
        VolumeUnit::Ml
    } else {
        unit.parse()?
    };
    Ok((volume, unit))
}

/// `now` minus an optional `<minutes ago>` field
fn drink_time(now: DateTime<Utc>, field: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(text) = field else {
        return Ok(now);
    };
    let minutes = text
        .trim_end_matches('m')
        .parse::<f64>()
        .map_err(|_| Error::Parse(format!("invalid minutes ago '{}'", text)))?;

    let seconds = (minutes * 60.0).round();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if !(seconds.is_finite() && seconds >= i64::MIN as f64 && seconds < i64::MAX as f64) {
        return Err(Error::Parse(format!("minutes ago '{}' is out of range", text)));
    }
    Duration::try_seconds(seconds as i64)
        .and_then(|ago| now.checked_sub_signed(ago))
        .ok_or_else(|| Error::Parse(format!("minutes ago '{}' is out of range", text)))
}

fn parse_instant(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn display_result(session: &Session, result: &BacResult, now: DateTime<Utc>) {
    let standard: f64 = session.drinks.iter().map(standard_drinks).sum();
    let countdown = Countdown::at(sober_at(now, result.minutes_to_sober), now);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BAC {:.4}%", result.bac);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", gauge_bar(gauge_fraction(result.bac), 30));
    println!("  Status:        {} - {}", result.recommendation, result.message);
    println!("  Sober in:      {} min ({})", result.minutes_to_sober, countdown);
    println!(
        "  Hangover risk: {} - {}",
        result.hangover_risk,
        result.hangover_risk.message()
    );
    println!();
    println!(
        "  Drinks:        {} ({:.1} standard)",
        session.drinks.len(),
        standard
    );
    println!(
        "  Water:         {:.0} / {:.0} ml",
        session.water_intake_ml(),
        session.water_goal_ml()
    );
    println!(
        "  Pattern:       {}",
        drinking_pattern(result.bac, session.water_intake_ml())
    );
    println!();
}
