use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Geometry of the chart surface
///
/// The donut is centred slightly off the top-left corner and the legend sits
/// to the right of it, so the drawing surface is larger than the donut itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Width of the donut area in pixels
    pub width: u32,

    /// Height of the donut area in pixels
    pub height: u32,

    /// Outer radius of the donut; the inner radius is half of it
    pub radius: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            radius: 150.0,
        }
    }
}

impl Dimensions {
    /// Centre of the donut in surface coordinates
    pub fn center(&self) -> (f64, f64) {
        (
            self.width as f64 / 2.0 + 5.0,
            self.height as f64 / 2.0 + 5.0,
        )
    }

    /// Size of the whole drawing surface, legend included
    pub fn surface(&self) -> (u32, u32) {
        (self.width + 150, self.height + 150)
    }

    /// Top-left corner of the legend
    pub fn legend_origin(&self) -> (f64, f64) {
        (self.width as f64 + 40.0, 10.0)
    }

    pub fn inner_radius(&self) -> f64 {
        self.radius / 2.0
    }
}

/// Application configuration
///
/// Defaults can be overridden by environment variables and then by
/// positional command line arguments (`website [addr] [snapshot]`).
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the web server binds to
    pub addr: SocketAddr,

    /// Name of the collection the chart mirrors
    pub collection: String,

    /// Optional snapshot file for the in-process store
    pub snapshot: Option<PathBuf>,

    /// Chart geometry
    pub dims: Dimensions,

    /// Duration of enter, update and exit slice transitions
    pub transition: Duration,

    /// Duration of the hover fill transition
    pub hover_transition: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            collection: "expenses".to_string(),
            snapshot: None,
            dims: Dimensions::default(),
            transition: Duration::from_millis(500),
            hover_transition: Duration::from_millis(300),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment and arguments
    pub fn from_env() -> Self {
        let vars: Vec<(String, String)> = env::vars().collect();
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(&vars, &args)
    }

    /// Builds the configuration from explicit variables and arguments
    ///
    /// Values that fail to parse are ignored and the previous value is kept.
    pub fn from_sources(vars: &[(String, String)], args: &[String]) -> Self {
        let mut config = Config::default();
        let lookup = |key: &str| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        if let Some(addr) = lookup("EXPENSES_ADDR") {
            config.addr = addr.parse().unwrap_or(config.addr);
        }
        if let Some(path) = lookup("EXPENSES_SNAPSHOT") {
            if !path.is_empty() {
                config.snapshot = Some(PathBuf::from(path));
            }
        }
        if let Some(ms) = lookup("EXPENSES_TRANSITION_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                config.transition = Duration::from_millis(ms);
            }
        }

        // Positional arguments win over the environment
        if let Some(addr) = args.first() {
            config.addr = addr.parse().unwrap_or(config.addr);
        }
        if let Some(path) = args.get(1) {
            config.snapshot = Some(PathBuf::from(path));
        }

        config
    }
}
