//! Writes synthetic `chicago.csv`, `new_york_city.csv` and `washington.csv`
//! into the given directory (default: current directory).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

#[derive(Serialize)]
struct TripRow<'a> {
    #[serde(rename = "")]
    id: usize,
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: &'a str,
    #[serde(rename = "End Station")]
    end_station: &'a str,
    #[serde(rename = "User Type")]
    user_type: &'a str,
    // Outer `None` drops the column, inner `None` leaves the cell empty.
    #[serde(rename = "Gender", skip_serializing_if = "Option::is_none")]
    gender: Option<Option<&'a str>>,
    #[serde(rename = "Birth Year", skip_serializing_if = "Option::is_none")]
    birth_year: Option<Option<f64>>,
}

struct CityProfile {
    file: &'static str,
    stations: &'static [&'static str],
    user_types: &'static [&'static str],
    demographics: bool,
}

const CITIES: [CityProfile; 3] = [
    CityProfile {
        file: "chicago.csv",
        stations: &[
            "Streeter Dr & Grand Ave",
            "Clinton St & Washington Blvd",
            "Lake Shore Dr & Monroe St",
            "Canal St & Adams St",
            "Michigan Ave & Oak St",
        ],
        user_types: &["Subscriber", "Subscriber", "Customer"],
        demographics: true,
    },
    CityProfile {
        file: "new_york_city.csv",
        stations: &[
            "Pershing Square North",
            "E 17 St & Broadway",
            "W 21 St & 6 Ave",
            "Broadway & E 22 St",
            "West St & Chambers St",
        ],
        user_types: &["Subscriber", "Subscriber", "Subscriber", "Customer"],
        demographics: true,
    },
    CityProfile {
        file: "washington.csv",
        stations: &[
            "Columbus Circle / Union Station",
            "Lincoln Memorial",
            "Jefferson Dr & 14th St SW",
            "Massachusetts Ave & Dupont Circle NW",
            "15th & P St NW",
        ],
        user_types: &["Registered", "Registered", "Casual"],
        demographics: false,
    },
];

const ROWS_PER_CITY: usize = 2000;

fn write_city(dir: &Path, city: &CityProfile, rng: &mut SimpleRng) -> Result<PathBuf> {
    let path = dir.join(city.file);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let year_start = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    // January through June 2017
    let span_secs = 181 * 24 * 3600;

    for id in 0..ROWS_PER_CITY {
        let start: NaiveDateTime =
            year_start + Duration::seconds((rng.next_f64() * span_secs as f64) as i64);
        let duration = 120.0 + (rng.next_f64() * 2400.0 * 1000.0).round() / 1000.0;
        let end = start + Duration::milliseconds((duration * 1000.0) as i64);

        let demographics = city.demographics && rng.next_f64() > 0.1;
        writer
            .serialize(TripRow {
                id,
                start_time: start.format("%Y-%m-%d %H:%M:%S").to_string(),
                end_time: end.format("%Y-%m-%d %H:%M:%S").to_string(),
                trip_duration: duration,
                start_station: *rng.pick(city.stations),
                end_station: *rng.pick(city.stations),
                user_type: *rng.pick(city.user_types),
                gender: city
                    .demographics
                    .then(|| demographics.then(|| *rng.pick(&["Male", "Female"]))),
                birth_year: city
                    .demographics
                    .then(|| demographics.then(|| 1940.0 + rng.below(60) as f64)),
            })
            .with_context(|| format!("writing row {id} of {}", path.display()))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(path)
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut rng = SimpleRng::new(42);
    for city in &CITIES {
        let path = write_city(&dir, city, &mut rng)?;
        println!("Wrote {ROWS_PER_CITY} trips to {}", path.display());
    }
    Ok(())
}
