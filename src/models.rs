//! Typed records for the simulator's JSON artifacts, with a
//! shape-sniffing decoder: an object is mapped to the first record type
//! whose distinguishing field it carries, applied independently at every
//! nesting level.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Display parameters for a recorded trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryConfig {
    pub output_file: String,
    pub space_width: f64,
    pub action_radius: f64,
    pub periodic_border: bool,
}

/// One particle at one simulated instant. Velocity is polar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub velocity_mod: f64,
    pub velocity_dir: f64,
    pub radius: f64,
}

/// Aperture width and particle count of one tested configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorSpec {
    pub door_distance: f64,
    pub particle_count: u64,
}

/// Repeated trials at a fixed door width: cumulative escape counts per
/// tick, one inner series per trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub dt: f64,
    pub door: DoorSpec,
    pub escapes_by_run: Vec<Vec<u64>>,
}

/// One round per tested door width.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub rounds: Vec<Round>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Summary(RoundSummary),
    Door(DoorSpec),
    Round(Round),
}

fn as_object<'a>(value: &'a Value, record: &'static str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::Decode(format!("expected a JSON object for {}", record)))
}

fn require<'a>(
    map: &'a Map<String, Value>,
    record: &'static str,
    field: &'static str,
) -> Result<&'a Value> {
    map.get(field).ok_or(Error::MissingField { record, field })
}

fn require_f64(map: &Map<String, Value>, record: &'static str, field: &'static str) -> Result<f64> {
    require(map, record, field)?
        .as_f64()
        .ok_or_else(|| Error::Decode(format!("field `{}` of {} is not a number", field, record)))
}

fn require_u64(map: &Map<String, Value>, record: &'static str, field: &'static str) -> Result<u64> {
    require(map, record, field)?
        .as_u64()
        .ok_or_else(|| {
            Error::Decode(format!(
                "field `{}` of {} is not a non-negative integer",
                field, record
            ))
        })
}

fn require_bool(
    map: &Map<String, Value>,
    record: &'static str,
    field: &'static str,
) -> Result<bool> {
    require(map, record, field)?
        .as_bool()
        .ok_or_else(|| Error::Decode(format!("field `{}` of {} is not a bool", field, record)))
}

fn require_str<'a>(
    map: &'a Map<String, Value>,
    record: &'static str,
    field: &'static str,
) -> Result<&'a str> {
    require(map, record, field)?
        .as_str()
        .ok_or_else(|| Error::Decode(format!("field `{}` of {} is not a string", field, record)))
}

/// Map a JSON object to a record by its distinguishing field, in fixed
/// priority order: `rounds`, then `doorDistance`, then a bare round.
/// Unknown keys never fail; a missing required key always does.
pub fn decode_record(value: &Value) -> Result<Record> {
    let map = as_object(value, "record")?;
    if map.contains_key("rounds") {
        Ok(Record::Summary(RoundSummary::from_object(map)?))
    } else if map.contains_key("doorDistance") {
        Ok(Record::Door(DoorSpec::from_object(map)?))
    } else {
        Ok(Record::Round(Round::from_object(map)?))
    }
}

/// Decode a top-level round summary, the shape the flow pipeline reads.
pub fn decode_round_summary(value: &Value) -> Result<RoundSummary> {
    match decode_record(value)? {
        Record::Summary(summary) => Ok(summary),
        other => Err(Error::Decode(format!(
            "top-level value is not a round summary (decoded {})",
            record_name(&other)
        ))),
    }
}

fn record_name(record: &Record) -> &'static str {
    match record {
        Record::Summary(_) => "a round summary",
        Record::Door(_) => "a door spec",
        Record::Round(_) => "a round",
    }
}

impl DoorSpec {
    fn from_object(map: &Map<String, Value>) -> Result<DoorSpec> {
        Ok(DoorSpec {
            door_distance: require_f64(map, "door spec", "doorDistance")?,
            particle_count: require_u64(map, "door spec", "particleCount")?,
        })
    }
}

impl Round {
    fn from_object(map: &Map<String, Value>) -> Result<Round> {
        let dt = require_f64(map, "round", "dt")?;

        // nested objects go back through the priority rule, so a door
        // spec nested in a round is disambiguated on its own
        let door = match decode_record(require(map, "round", "distanceParticle")?)? {
            Record::Door(door) => door,
            other => {
                return Err(Error::Decode(format!(
                    "field `distanceParticle` of round holds {}",
                    record_name(&other)
                )))
            }
        };

        let escapes = require(map, "round", "escapesByRun")?
            .as_array()
            .ok_or_else(|| Error::Decode("field `escapesByRun` of round is not an array".into()))?;
        let mut escapes_by_run = Vec::with_capacity(escapes.len());
        for trial in escapes {
            let samples = trial.as_array().ok_or_else(|| {
                Error::Decode("escapesByRun holds a trial that is not an array".into())
            })?;
            let mut counts = Vec::with_capacity(samples.len());
            for sample in samples {
                counts.push(sample.as_u64().ok_or_else(|| {
                    Error::Decode("escape count is not a non-negative integer".into())
                })?);
            }
            escapes_by_run.push(counts);
        }

        Ok(Round {
            dt,
            door,
            escapes_by_run,
        })
    }
}

impl RoundSummary {
    fn from_object(map: &Map<String, Value>) -> Result<RoundSummary> {
        let entries = require(map, "round summary", "rounds")?
            .as_array()
            .ok_or_else(|| Error::Decode("field `rounds` of round summary is not an array".into()))?;
        let mut rounds = Vec::with_capacity(entries.len());
        for entry in entries {
            match decode_record(entry)? {
                Record::Round(round) => rounds.push(round),
                other => {
                    return Err(Error::Decode(format!(
                        "`rounds` holds {}, expected a round",
                        record_name(&other)
                    )))
                }
            }
        }
        Ok(RoundSummary { rounds })
    }
}

impl TrajectoryConfig {
    fn from_object(map: &Map<String, Value>) -> Result<TrajectoryConfig> {
        Ok(TrajectoryConfig {
            output_file: require_str(map, "trajectory config", "outputFile")?.to_string(),
            space_width: require_f64(map, "trajectory config", "spaceWidth")?,
            action_radius: require_f64(map, "trajectory config", "actionRadius")?,
            periodic_border: require_bool(map, "trajectory config", "periodicBorder")?,
        })
    }
}

impl Particle {
    fn from_object(map: &Map<String, Value>) -> Result<Particle> {
        Ok(Particle {
            id: require_u64(map, "particle", "id")?,
            x: require_f64(map, "particle", "x")?,
            y: require_f64(map, "particle", "y")?,
            velocity_mod: require_f64(map, "particle", "velocityMod")?,
            velocity_dir: require_f64(map, "particle", "velocityDir")?,
            radius: require_f64(map, "particle", "radius")?,
        })
    }
}

/// Decode a viewer config; only objects carrying `outputFile` qualify.
pub fn decode_trajectory_config(value: &Value) -> Result<TrajectoryConfig> {
    let map = as_object(value, "trajectory config")?;
    if !map.contains_key("outputFile") {
        return Err(Error::Decode(
            "object carries no `outputFile` field, not a trajectory config".into(),
        ));
    }
    TrajectoryConfig::from_object(map)
}

/// Decode a full trajectory: one unordered particle collection per tick.
pub fn decode_trajectory(value: &Value) -> Result<Vec<Vec<Particle>>> {
    let ticks = value
        .as_array()
        .ok_or_else(|| Error::Decode("trajectory is not an array of ticks".into()))?;
    let mut states = Vec::with_capacity(ticks.len());
    for tick in ticks {
        let entries = tick
            .as_array()
            .ok_or_else(|| Error::Decode("trajectory tick is not an array of particles".into()))?;
        let mut particles = Vec::with_capacity(entries.len());
        for entry in entries {
            particles.push(Particle::from_object(as_object(entry, "particle")?)?);
        }
        states.push(particles);
    }
    Ok(states)
}
