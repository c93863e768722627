use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use briefing_core::{
    Briefing, Config, ConsoleReadiness, Location, PopStrategy, ReportField, Secrets,
    provider::provider_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::debug;

const CONSOLE_RECIPIENT: &str = "stdout";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "briefing", version, about = "Daily weather briefing CLI")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG wins when set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store QWeather credentials, default city and recipient.
    Configure,

    /// Resolve a city name and print the chosen location.
    Locate {
        /// City or district name, e.g. "南山区".
        city: String,
    },

    /// Fetch today's weather, compose the report and deliver it.
    Report {
        /// City to report on; falls back to the configured default.
        city: Option<String>,

        /// Recipient; falls back to the configured default.
        #[arg(long)]
        to: Option<String>,

        /// Always use the first template phrase.
        #[arg(long)]
        no_random: bool,

        /// How hourly precipitation chances are combined: "max" or "avg".
        #[arg(long)]
        pop_strategy: Option<String>,

        /// Comma-separated report sections, e.g. "temperature,wind,uv".
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let mut cfg = Config::load_from(&config_path)?;
        debug!(path = %config_path.display(), "Config loaded");

        match self.command {
            Command::Configure => configure(&mut cfg, &config_path)?,
            Command::Locate { city } => {
                let provider = provider_from_config(&cfg)?;
                let location = provider
                    .locate(&city)
                    .await
                    .with_context(|| format!("Failed to resolve {city:?}"))?;

                println!("{}", describe_location(&location));
            }
            Command::Report {
                city,
                to,
                no_random,
                pop_strategy,
                fields,
            } => {
                if no_random {
                    cfg.message.randomize = false;
                }
                if let Some(strategy) = pop_strategy {
                    cfg.weather.pop_strategy = PopStrategy::try_from(strategy.as_str())?;
                }
                if !fields.is_empty() {
                    cfg.message.enabled_fields = fields
                        .iter()
                        .map(|f| ReportField::try_from(f.as_str()))
                        .collect::<Result<Vec<_>>>()?;
                }

                let city = cfg.city_or(city)?;
                let recipient = to
                    .or_else(|| cfg.recipient.clone())
                    .unwrap_or_else(|| CONSOLE_RECIPIENT.to_string());

                let briefing = Briefing::from_config(&cfg)?;
                let readiness = ConsoleReadiness::new(cfg.delivery.clone());
                briefing
                    .deliver(&city, &recipient, &readiness)
                    .await
                    .with_context(|| format!("Failed to deliver the report for {city}"))?;
            }
        }

        Ok(())
    }
}

fn configure(cfg: &mut Config, config_path: &Path) -> Result<()> {
    let host = Text::new("QWeather API host:")
        .with_help_message("e.g. abc1234xyz.re.qweatherapi.com")
        .prompt()?;
    let key = Password::new("QWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let secrets =
        Secrets::new(&host, &key).context("API host and key must both be non-empty")?;

    let city = prompt_optional("Default city:", cfg.city.as_deref())?;
    let recipient = prompt_optional("Default recipient:", cfg.recipient.as_deref())?;

    let secrets_path = cfg.secrets_path();
    secrets.save(&secrets_path)?;

    cfg.city = city;
    cfg.recipient = recipient;
    cfg.save_to(config_path)?;

    println!("Secrets saved to {}", secrets_path.display());
    println!("Config saved to {}", config_path.display());
    Ok(())
}

fn prompt_optional(message: &str, current: Option<&str>) -> Result<Option<String>> {
    let mut prompt = Text::new(message);
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }

    let answer = prompt.prompt()?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

fn describe_location(location: &Location) -> String {
    let admins: Vec<&str> = [&location.adm1, &location.adm2, &location.adm3]
        .into_iter()
        .filter_map(|a| a.as_deref())
        .collect();

    let mut out = format!("{} (id {})", location.name, location.id);
    if !admins.is_empty() {
        out.push_str(&format!("\n  {}", admins.join(" / ")));
    }
    out.push_str(&format!("\n  lat {:.4}, lon {:.4}", location.lat, location.lon));
    if let Some(tz) = &location.tz {
        out.push_str(&format!("\n  tz {tz}"));
    }
    out
}
