use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{arg, command, ArgMatches, Command};
use ground_track::{
    config::{DEFAULT_WRAP_THRESHOLD, MAX_PROPAGATION_DAYS, VERSION},
    freshness::StaleCheck,
    ground_track::generate,
    observer::{observation_time, utc_offset},
    pass::{look, next_pass, search_window},
    search::Catalog,
    sunlit::sun_status,
    Direction, GroundTrackPlot, GroundTrackRequest, Observer, PlotColors, Satellite, Tle,
};
use tracing::{info, warn};

fn target_args(cmd: Command) -> Command {
    cmd.allow_negative_numbers(true)
        .arg(
            arg!(-i --id <CATNR> "Target's NORAD Catalog Number (1-9 digits)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(arg!(--tle <FILE> "Read the target's TLE from a file instead of celestrak.org"))
}

fn observer_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(-x --lon <LONGITUDE> "Observer's longitude in degrees")
            .value_parser(clap::value_parser!(f64)),
    )
    .arg(
        arg!(-y --lat <LATITUDE> "Observer's latitude in degrees")
            .value_parser(clap::value_parser!(f64)),
    )
    .arg(
        arg!(-z --elev <ELEVATION> "Observer's elevation in meters MSL")
            .value_parser(clap::value_parser!(f64)),
    )
}

fn time_args(cmd: Command) -> Command {
    cmd.arg(arg!(-d --date <DATE> "Reference date YYYY-MM-DD (default now)"))
        .arg(arg!(-t --time <TIME> "Reference time HH:MM or HH:MM:SS").default_value("00:00"))
        .arg(
            arg!(--tz <HOURS> "UTC offset of the date and time, -12 to 14")
                .value_parser(clap::value_parser!(f64))
                .default_value("0"),
        )
}

fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .subcommand(
            observer_args(target_args(Command::new("look")))
                .about("Where the target is and how it looks from the observer")
                .arg(arg!(--at <TIME> "Time of observation YYYY-MM-DDTHH:mm:SS.sss+HH:mm")),
        )
        .subcommand(
            time_args(observer_args(target_args(Command::new("track"))))
                .about("Ground track over a number of orbital periods")
                .arg(
                    arg!(-p --periods <PERIODS> "Orbital periods to cover")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("1"),
                )
                .arg(arg!(--direction <DIRECTION> "forward or backward").default_value("forward"))
                .arg(
                    arg!(--samples <N> "Samples per orbital period")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--threshold <DEGREES> "Longitude jump that splits the track")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(arg!(--"path-color" <COLOR> "Ground track colour"))
                .arg(arg!(--"observer-color" <COLOR> "Observer marker colour"))
                .arg(arg!(--"ref-color" <COLOR> "Reference position marker colour"))
                .arg(arg!(--json "Print the plot as JSON")),
        )
        .subcommand(
            time_args(observer_args(target_args(Command::new("pass"))))
                .about("Next pass over the observer")
                .arg(
                    arg!(--"min-el" <DEGREES> "Minimum peak elevation")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0"),
                )
                .arg(
                    arg!(--hours <HOURS> "How far ahead to search")
                        .value_parser(clap::value_parser!(i64))
                        .default_value("72"),
                ),
        )
        .subcommand(
            time_args(target_args(Command::new("sunlit")))
                .about("Whether the target is in sunlight or Earth's shadow"),
        )
        .subcommand(target_args(Command::new("info")).about("Orbit summary and TLE age"))
        .subcommand(
            Command::new("search")
                .about("Search the TLE catalogue by name")
                .arg(arg!([TERM] "Search term").default_value("ISS"))
                .arg(
                    arg!(--page <PAGE> "Result page")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("1"),
                ),
        )
}

fn main() -> Result<()> {
    let args = cli().get_matches();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    info!("ground_track v{VERSION}");

    match args.subcommand() {
        Some(("look", sub)) => run_look(sub),
        Some(("track", sub)) => run_track(sub),
        Some(("pass", sub)) => run_pass(sub),
        Some(("sunlit", sub)) => run_sunlit(sub),
        Some(("info", sub)) => run_info(sub),
        Some(("search", sub)) => run_search(sub),
        _ => unreachable!("subcommand_required"),
    }
}

fn satellite(args: &ArgMatches) -> Result<Satellite> {
    if let Some(path) = args.get_one::<String>("tle") {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        return Ok(Satellite::from_tle(Tle::parse(&text)?)?);
    }
    let id = args.get_one("id").cloned().unwrap_or(25544);
    Satellite::from_norad_cat(id).with_context(|| format!("fetching TLE for {id}"))
}

fn observer(args: &ArgMatches) -> Result<Observer> {
    let mut observer = match (args.get_one("lat"), args.get_one("lon")) {
        (Some(lat), Some(lon)) => Observer::validated(*lat, *lon)?,
        _ => Observer::from_ip().unwrap_or_else(|e| {
            warn!("Falling back to 0, 0 for the observer: {e}");
            Observer::default()
        }),
    };
    if let Some(elev) = args.get_one("elev") {
        observer.elev = *elev;
    }
    Ok(observer)
}

fn reference_time(args: &ArgMatches) -> Result<DateTime<FixedOffset>> {
    let tz = args.get_one::<f64>("tz").copied().unwrap_or(0.0);
    match args.get_one::<String>("date") {
        Some(date) => {
            let time = args.get_one::<String>("time").map(String::as_str).unwrap_or("00:00");
            Ok(observation_time(date, time, tz)?)
        }
        None => Ok(Utc::now().with_timezone(&utc_offset(tz)?)),
    }
}

fn run_look(args: &ArgMatches) -> Result<()> {
    let sat = satellite(args)?;
    let mut observer = observer(args)?;
    if let Some(time) = args.get_one::<String>("at") {
        match DateTime::parse_from_rfc3339(time) {
            Ok(t) => observer.time = t,
            Err(e) => warn!("Failed to parse time: {e}"),
        }
    }

    let prediction = sat.predict(&observer.time)?;
    let (lon, lat, alt) = prediction.position;
    let angles = look(&sat, &observer, &observer.time)?;

    println!("{sat:?}");
    println!(
        "Prediction {{ lat: {lat:.3} deg, lon: {lon:.3} deg, alt: {alt:.3} km, speed: {:.3} km/h}}",
        prediction.speed
    );
    println!("{observer:?}");
    println!(
        "Look {{ azimuth: {:.3} deg, elevation: {:.3} deg, range: {:.3} km }}",
        angles.azimuth,
        angles.elevation,
        angles.range / 1e3
    );
    Ok(())
}

fn run_track(args: &ArgMatches) -> Result<()> {
    let sat = satellite(args)?;
    let observer = observer(args)?;
    let reference = reference_time(args)?;

    let periods = args.get_one::<f64>("periods").copied().unwrap_or(1.0);
    let direction: Direction = args
        .get_one::<String>("direction")
        .map(|d| d.parse::<Direction>())
        .transpose()?
        .unwrap_or_default();
    let mut request = GroundTrackRequest::new(reference, periods).with_direction(direction);
    if let Some(samples) = args.get_one::<usize>("samples") {
        request = request.with_samples_per_period(*samples);
    }

    let mut colors = PlotColors::default();
    for (key, slot) in [
        ("path-color", &mut colors.path),
        ("observer-color", &mut colors.observer),
        ("ref-color", &mut colors.reference),
    ] {
        if let Some(color) = args.get_one::<String>(key) {
            *slot = color.clone();
        }
    }

    let threshold = args
        .get_one::<f64>("threshold")
        .copied()
        .unwrap_or(DEFAULT_WRAP_THRESHOLD);
    let ground_track = generate(&sat, &request)?;
    let plot = GroundTrackPlot::build(&ground_track, &observer, &colors, threshold);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&plot)?);
        return Ok(());
    }

    println!("{}", plot.title);
    for line in &plot.lines {
        let end = line.lon.len() - 1;
        println!(
            "  {}: {} samples from ({:.2}, {:.2}) to ({:.2}, {:.2})",
            line.name,
            line.lon.len(),
            line.lon[0],
            line.lat[0],
            line.lon[end],
            line.lat[end],
        );
    }
    println!(
        "  {}: ({:.2}, {:.2})",
        plot.reference.name, plot.reference.lon, plot.reference.lat
    );
    println!("  {}: ({:.2}, {:.2})", plot.observer.name, plot.observer.lon, plot.observer.lat);
    Ok(())
}

fn run_pass(args: &ArgMatches) -> Result<()> {
    let sat = satellite(args)?;
    let mut observer = observer(args)?;
    observer.time = reference_time(args)?;

    let min_elevation = args.get_one::<f64>("min-el").copied().unwrap_or(0.0);
    let hours = args.get_one::<i64>("hours").copied().unwrap_or(72);
    let pass = next_pass(&sat, &observer, min_elevation, search_window(hours)?)?;
    println!("{pass}");
    Ok(())
}

fn run_sunlit(args: &ArgMatches) -> Result<()> {
    let sat = satellite(args)?;
    let time = reference_time(args)?;
    let status = sun_status(&sat, &time)?;
    println!(
        "On {} at {}, {} will {status}.",
        time.format("%Y-%m-%d"),
        time.format("%H:%M"),
        sat.name()
    );
    Ok(())
}

fn run_info(args: &ArgMatches) -> Result<()> {
    let sat = satellite(args)?;
    let summary = sat.summary();
    let age = sat.days_since_epoch(&Utc::now());
    println!("{summary:#?}");
    println!("TLE age: {age:.1} days");
    if StaleCheck::assess(age, MAX_PROPAGATION_DAYS) == StaleCheck::Pending {
        warn!(
            "TLE is older than {MAX_PROPAGATION_DAYS} days; predictions near today will be refused or inaccurate"
        );
    }
    Ok(())
}

fn run_search(args: &ArgMatches) -> Result<()> {
    let term = args.get_one::<String>("TERM").map(String::as_str).unwrap_or("ISS");
    let page = args.get_one::<u32>("page").copied().unwrap_or(1);

    let mut catalog = Catalog::new()?;
    let results = catalog.search(term, page)?;
    println!(
        "{} results found, page {} of {}",
        results.total_results, results.page, results.pages
    );
    for member in &results.members {
        println!("  {:>9}  {}", member.satellite_id, member.name);
    }
    Ok(())
}
