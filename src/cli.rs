use clap::{Args, Parser, Subcommand};
use immo_estimator::config::CURRENT_YEAR_RANGE;
use immo_estimator::pricing::{
    AtticType, CellarType, LaundryType, ParkingType, PropertyInput, RenovationCategory,
    RenovationRecord,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "estimator", version, about = "Residential property price estimator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Start {
        /// Path to PID file
        #[arg(short, long)]
        pid_file: Option<PathBuf>,
    },

    /// Stop a running server
    Stop {
        /// Path to PID file
        #[arg(short, long)]
        pid_file: Option<PathBuf>,

        /// Force kill if graceful shutdown times out
        #[arg(short, long)]
        force: bool,

        /// Timeout in seconds for graceful shutdown
        #[arg(short, long, default_value = "30")]
        timeout: u64,
    },

    /// Reload the district price table without restarting (sends SIGHUP)
    Reload {
        /// Path to PID file
        #[arg(short, long)]
        pid_file: Option<PathBuf>,
    },

    /// Estimate the price of a single property
    Estimate(EstimateArgs),

    /// List districts and their base price per m²
    Districts,

    /// Test configuration and price table validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Validate configuration file
    Validate,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    /// District name, matched exactly
    #[arg(short, long)]
    pub district: String,

    /// Living area in m²
    #[arg(short, long, default_value_t = 60.0)]
    pub area: f64,

    /// Number of rooms
    #[arg(short, long, default_value_t = 2.5, allow_negative_numbers = true)]
    pub rooms: f64,

    /// Construction year
    #[arg(short = 'y', long = "year", default_value_t = 1980)]
    pub construction_year: i32,

    /// Fibre optic connection available
    #[arg(long)]
    pub fiber: bool,

    /// Number of owners in the building
    #[arg(long, default_value_t = 10)]
    pub owners: u32,

    /// Renovation fund balance
    #[arg(long, default_value_t = 0.0)]
    pub fund: f64,

    #[arg(long, value_enum, default_value_t = LaundryType::None)]
    pub laundry: LaundryType,

    #[arg(long, value_enum, default_value_t = ParkingType::None)]
    pub parking: ParkingType,

    #[arg(long, value_enum, default_value_t = CellarType::None)]
    pub cellar: CellarType,

    #[arg(long, value_enum, default_value_t = AtticType::None)]
    pub attic: AtticType,

    /// Renovation performed, e.g. `kitchen:2021` (repeatable)
    #[arg(long = "renovation", value_name = "CATEGORY:YEAR", value_parser = parse_renovation)]
    pub renovations: Vec<RenovationRecord>,

    /// Reference year (overrides config and clock)
    #[arg(long, value_parser = parse_current_year)]
    pub current_year: Option<i32>,

    /// Print the estimate as JSON
    #[arg(long)]
    pub json: bool,
}

impl EstimateArgs {
    pub fn to_input(&self) -> PropertyInput {
        PropertyInput {
            district: self.district.clone(),
            rooms: self.rooms,
            area: self.area,
            construction_year: self.construction_year,
            has_fiber_optic: self.fiber,
            owner_count: self.owners,
            renovation_fund_balance: self.fund,
            laundry_type: self.laundry,
            parking_type: self.parking,
            cellar_type: self.cellar,
            attic_type: self.attic,
            renovations: self.renovations.clone(),
        }
    }
}

fn parse_renovation(value: &str) -> Result<RenovationRecord, String> {
    let (name, year) = value
        .split_once(':')
        .ok_or_else(|| format!("expected CATEGORY:YEAR, got '{}'", value))?;

    let category = RenovationCategory::parse(name).ok_or_else(|| {
        let known: Vec<_> = RenovationCategory::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown renovation '{}' (expected one of: {})", name, known.join(", "))
    })?;

    let year = year
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid renovation year '{}'", year))?;

    Ok(RenovationRecord::performed_in(category, year))
}

fn parse_current_year(value: &str) -> Result<i32, String> {
    let year = value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid year '{}'", value))?;

    if !CURRENT_YEAR_RANGE.contains(&year) {
        return Err(format!(
            "{} is out of range ({}-{})",
            year,
            CURRENT_YEAR_RANGE.start(),
            CURRENT_YEAR_RANGE.end()
        ));
    }
    Ok(year)
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Start { pid_file: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli::try_parse_from(["estimator"]).unwrap();

        match cli.get_command() {
            Commands::Start { pid_file } => assert!(pid_file.is_none()),
            _ => panic!("Expected Start command"),
        }
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_cli_parsing_stop() {
        let cli = Cli::try_parse_from(["estimator", "stop", "--timeout", "60"]).unwrap();

        match cli.get_command() {
            Commands::Stop { timeout, force, .. } => {
                assert_eq!(timeout, 60);
                assert!(!force);
            }
            _ => panic!("Expected Stop command"),
        }
    }

    #[test]
    fn test_cli_parsing_estimate_defaults() {
        let cli = Cli::try_parse_from(["estimator", "estimate", "--district", "Basel"]).unwrap();

        match cli.get_command() {
            Commands::Estimate(args) => {
                let input = args.to_input();
                assert_eq!(input.district, "Basel");
                assert_eq!(input.area, 60.0);
                assert_eq!(input.rooms, 2.5);
                assert_eq!(input.construction_year, 1980);
                assert_eq!(input.owner_count, 10);
                assert!(input.renovations.is_empty());
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_cli_parsing_estimate_full() {
        let cli = Cli::try_parse_from([
            "estimator",
            "--config",
            "prod.toml",
            "estimate",
            "-d",
            "Bern",
            "--area",
            "85.5",
            "--year",
            "2001",
            "--fiber",
            "--laundry",
            "in-unit",
            "--parking",
            "garage",
            "--renovation",
            "kitchen:2020",
            "--renovation",
            "Bathroom:2018",
            "--current-year",
            "2024",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        match cli.get_command() {
            Commands::Estimate(args) => {
                let input = args.to_input();
                assert_eq!(input.area, 85.5);
                assert!(input.has_fiber_optic);
                assert_eq!(input.laundry_type, LaundryType::InUnit);
                assert_eq!(input.parking_type, ParkingType::Garage);
                assert_eq!(
                    input.renovations,
                    vec![
                        RenovationRecord::performed_in(RenovationCategory::Kitchen, 2020),
                        RenovationRecord::performed_in(RenovationCategory::Bathroom, 2018),
                    ]
                );
                assert_eq!(args.current_year, Some(2024));
                assert!(args.json);
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_parse_renovation_errors() {
        assert!(parse_renovation("kitchen").is_err());
        assert!(parse_renovation("garden:2020").is_err());
        assert!(parse_renovation("roof:soon").is_err());
    }

    #[test]
    fn test_current_year_range_matches_config() {
        for year in ["1700", "10000", "soon"] {
            let result =
                Cli::try_parse_from(["estimator", "estimate", "-d", "Basel", "--current-year", year]);
            assert!(result.is_err(), "{} should be rejected", year);
        }

        let cli =
            Cli::try_parse_from(["estimator", "estimate", "-d", "Basel", "--current-year", "1800"])
                .unwrap();
        match cli.get_command() {
            Commands::Estimate(args) => assert_eq!(args.current_year, Some(1800)),
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let cli = Cli::try_parse_from(["estimator", "config", "show"]).unwrap();

        match cli.get_command() {
            Commands::Config { action } => assert!(matches!(action, ConfigCommands::Show)),
            _ => panic!("Expected Config command"),
        }
    }
}
