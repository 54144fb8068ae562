use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::PathBuf;
use std::str::FromStr;

use caudal::error::{Error, Result};

pub struct Config {
    pub mode: ProgramMode,
}

pub enum ProgramMode {
    Flow(FlowParams),
    Schemes(SchemeParams),
    Trajectory(TrajectoryParams),
}

pub struct FlowParams {
    pub data: PathBuf,
    pub window: usize,
    pub stable_start: usize,
    pub stable_end: usize,
    pub fit_start: f64,
    pub fit_end: f64,
    pub fit_count: usize,
    pub outdir: PathBuf,
}

pub struct SchemeParams {
    pub data: PathBuf,
    pub outdir: PathBuf,
}

pub struct TrajectoryParams {
    pub config: PathBuf,
    pub stride: usize,
    pub outdir: PathBuf,
}

impl Config {
    // initialize configuration from command line arguments
    pub fn new() -> Result<Config> {
        let matches = App::new("Granular flow post-processing")
            .version("0.1.0")
            .about(
                "Reads JSON artifacts of an off-lattice granular door simulation, \
                 estimates the outflow rate through the aperture and fits the \
                 Q = B*d^1.5 rate law.",
            )
            .setting(AppSettings::SubcommandRequiredElseHelp)
            .subcommand(
                SubCommand::with_name("flow")
                    .about("Estimate outflow rate per door width and fit the rate law")
                    .arg(
                        Arg::with_name("DATA")
                            .help("Round summary JSON produced by the simulator")
                            .required(true)
                            .index(1),
                    )
                    .arg(
                        Arg::with_name("WINDOW")
                            .short("w")
                            .long("window")
                            .help("Width of the rate estimation window in ticks")
                            .takes_value(true)
                            .default_value("200"),
                    )
                    .arg(
                        Arg::with_name("STABLE_START")
                            .long("stable-start")
                            .help("First rate sample of the stable sub-window")
                            .takes_value(true)
                            .default_value("250"),
                    )
                    .arg(
                        Arg::with_name("STABLE_END")
                            .long("stable-end")
                            .help("One past the last rate sample of the stable sub-window")
                            .takes_value(true)
                            .default_value("1250"),
                    )
                    .arg(
                        Arg::with_name("FIT_START")
                            .long("fit-start")
                            .help("Lower bound of the coefficient search range")
                            .takes_value(true)
                            .default_value("1.0"),
                    )
                    .arg(
                        Arg::with_name("FIT_END")
                            .long("fit-end")
                            .help("Upper bound of the coefficient search range")
                            .takes_value(true)
                            .default_value("2.0"),
                    )
                    .arg(
                        Arg::with_name("FIT_COUNT")
                            .long("fit-count")
                            .help("Number of candidate coefficients on the search grid")
                            .takes_value(true)
                            .default_value("100000"),
                    )
                    .arg(
                        Arg::with_name("OUTDIR")
                            .short("o")
                            .long("outdir")
                            .help("Directory the figures are written to")
                            .takes_value(true)
                            .default_value("plots"),
                    ),
            )
            .subcommand(
                SubCommand::with_name("schemes")
                    .about("Plot per-scheme integration error against time step")
                    .arg(
                        Arg::with_name("DATA")
                            .help("JSON array of per-scheme error rows")
                            .required(true)
                            .index(1),
                    )
                    .arg(
                        Arg::with_name("OUTDIR")
                            .short("o")
                            .long("outdir")
                            .help("Directory the figure is written to")
                            .takes_value(true)
                            .default_value("plots"),
                    ),
            )
            .subcommand(
                SubCommand::with_name("trajectory")
                    .about("Render recorded automaton states as frames")
                    .arg(
                        Arg::with_name("CONFIG")
                            .help("Trajectory config JSON naming the recorded states file")
                            .required(true)
                            .index(1),
                    )
                    .arg(
                        Arg::with_name("STRIDE")
                            .short("s")
                            .long("stride")
                            .help("Render every Nth tick")
                            .takes_value(true)
                            .default_value("10"),
                    )
                    .arg(
                        Arg::with_name("OUTDIR")
                            .short("o")
                            .long("outdir")
                            .help("Directory the frames are written to")
                            .takes_value(true)
                            .default_value("plots"),
                    ),
            )
            .get_matches();

        let mode = match matches.subcommand() {
            ("flow", Some(sub)) => ProgramMode::Flow(FlowParams {
                data: PathBuf::from(Config::raw_match(sub, "DATA")?),
                window: Config::conv_match::<usize>(sub, "WINDOW")?,
                stable_start: Config::conv_match::<usize>(sub, "STABLE_START")?,
                stable_end: Config::conv_match::<usize>(sub, "STABLE_END")?,
                fit_start: Config::conv_match::<f64>(sub, "FIT_START")?,
                fit_end: Config::conv_match::<f64>(sub, "FIT_END")?,
                fit_count: Config::conv_match::<usize>(sub, "FIT_COUNT")?,
                outdir: PathBuf::from(Config::raw_match(sub, "OUTDIR")?),
            }),
            ("schemes", Some(sub)) => ProgramMode::Schemes(SchemeParams {
                data: PathBuf::from(Config::raw_match(sub, "DATA")?),
                outdir: PathBuf::from(Config::raw_match(sub, "OUTDIR")?),
            }),
            ("trajectory", Some(sub)) => {
                let stride = Config::conv_match::<usize>(sub, "STRIDE")?;
                if stride == 0 {
                    return Err(Error::Usage("--stride must be at least 1".into()));
                }
                ProgramMode::Trajectory(TrajectoryParams {
                    config: PathBuf::from(Config::raw_match(sub, "CONFIG")?),
                    stride,
                    outdir: PathBuf::from(Config::raw_match(sub, "OUTDIR")?),
                })
            }
            _ => return Err(Error::Usage("a subcommand is required".into())),
        };

        Ok(Config { mode })
    }

    fn raw_match<'a>(matches: &'a ArgMatches, tag: &str) -> Result<&'a str> {
        matches
            .value_of(tag)
            .ok_or_else(|| Error::Usage(format!("missing value for {}", tag)))
    }

    // convert matches to corresponding generic types
    fn conv_match<T>(matches: &ArgMatches, tag: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        Config::raw_match(matches, tag)?
            .parse()
            .map_err(|err| Error::Usage(format!("invalid value for {}: {}", tag, err)))
    }
}
