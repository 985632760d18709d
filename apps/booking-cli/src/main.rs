//! # Dandeli Booking CLI
//!
//! Thin command-line front end over [`BookingCoordinator`].
//!
//! ## Usage
//!
//! ```bash
//! # Price a stay without booking it
//! dandeli-booking quote --room deluxe --adults 2 --children 1 --promo SUMMER25
//!
//! # Book and pay by UPI
//! dandeli-booking book --name "Jane Doe" --email jane@x.com --phone +919876543210 \
//!     --adults 2 --check-in 2026-10-18 --check-out 2026-10-20 --room deluxe \
//!     --pay upi --upi-id jane@okaxis
//!
//! # Same, with an SMS code typed at the prompt
//! dandeli-booking book ... --verify-phone
//!
//! # Write the default configuration file
//! dandeli-booking config init
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the default filter). The console
//! notifier logs every message it would send, verification codes included.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use dandeli_booking::{BookingConfig, BookingCoordinator, BookingError};
use dandeli_core::{CoreError, OtpError, PaymentMethod, StepKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Dandeli Adventures - resort booking
#[derive(Parser)]
#[command(name = "dandeli-booking")]
#[command(version)]
#[command(about = "Book a stay at Dandeli Adventures")]
struct Cli {
    /// Config file (default: platform config dir / booking.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the price of a stay
    Quote {
        #[arg(long, default_value = "standard")]
        room: String,
        #[arg(long, default_value_t = 1)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
        #[arg(long)]
        promo: Option<String>,
    },

    /// Book a stay and pay for it
    Book(BookArgs),

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration file
    Init,
}

#[derive(clap::Args)]
struct BookArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "1")]
    adults: String,
    #[arg(long, default_value = "0")]
    children: String,
    /// YYYY-MM-DD
    #[arg(long)]
    check_in: NaiveDate,
    /// YYYY-MM-DD
    #[arg(long)]
    check_out: NaiveDate,
    #[arg(long, default_value = "standard")]
    room: String,
    #[arg(long)]
    promo: Option<String>,

    /// Ask for an SMS code before payment
    #[arg(long)]
    verify_phone: bool,

    #[arg(long, value_enum, default_value_t = PayWith::Bank)]
    pay: PayWith,
    #[arg(long)]
    card_number: Option<String>,
    #[arg(long)]
    card_holder: Option<String>,
    /// MM/YY
    #[arg(long)]
    card_expiry: Option<String>,
    #[arg(long)]
    cvv: Option<String>,
    #[arg(long)]
    upi_id: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PayWith {
    Card,
    Upi,
    Bank,
}

impl BookArgs {
    fn payment_method(&self) -> PaymentMethod {
        let arg = |v: &Option<String>| v.clone().unwrap_or_default();
        match self.pay {
            PayWith::Card => PaymentMethod::Card {
                number: arg(&self.card_number),
                holder: self
                    .card_holder
                    .clone()
                    .unwrap_or_else(|| self.name.clone()),
                expiry: arg(&self.card_expiry),
                cvv: arg(&self.cvv),
            },
            PayWith::Upi => PaymentMethod::Upi {
                vpa: arg(&self.upi_id),
            },
            PayWith::Bank => PaymentMethod::BankTransfer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = BookingConfig::load(cli.config.clone()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Quote {
            room,
            adults,
            children,
            promo,
        } => {
            let base = dandeli_core::calculate_price(&room, adults, children);
            let outcome = config.promo.apply(base, promo.as_deref().unwrap_or(""));
            println!("Base price:  {base}");
            if outcome.valid {
                println!("Discount:    -{}", outcome.discount);
            } else if promo.is_some() {
                println!("Promo code not recognised");
            }
            println!("Total:       {}", outcome.discounted_amount);
        }
        Commands::Book(args) => book(config, args).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
            ConfigAction::Init => {
                config.save(cli.config).context("Failed to write configuration")?;
                println!("Configuration written");
            }
        },
    }

    Ok(())
}

async fn book(mut config: BookingConfig, args: BookArgs) -> Result<()> {
    if args.verify_phone {
        config.flow.require_phone_verification = true;
    }

    let mut booking = BookingCoordinator::simulated(config);
    info!(session_id = %booking.session_id(), "Starting booking");

    {
        let form = booking.form_mut()?;
        form.name = args.name.clone();
        form.email = args.email.clone();
        form.phone = args.phone.clone();
        form.adults = args.adults.clone();
        form.children = args.children.clone();
        form.check_in = Some(args.check_in);
        form.check_out = Some(args.check_out);
        form.room_category = args.room.clone();
        form.promo_code = args.promo.clone();
    }

    match booking.submit().await {
        Ok(_) => {}
        Err(BookingError::Flow(CoreError::Validation(errors))) => {
            eprintln!("Please correct the following:");
            for e in errors.iter() {
                eprintln!("  - {e}");
            }
            bail!("booking form is invalid");
        }
        Err(e) => return Err(e.into()),
    }

    if booking.kind() == StepKind::Verification {
        verify_interactively(&mut booking).await?;
    }

    if let Some(quote) = booking.flow().quote() {
        println!("Amount due: {}", quote.final_amount);
    }

    println!("Processing payment...");
    let outcome = match booking.pay(args.payment_method()).await {
        Ok(outcome) => outcome,
        Err(BookingError::Payment(e)) => {
            booking.cancel()?;
            bail!("Payment Failed: {e}");
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!("Booking Confirmed!");
    println!("  Booking reference: {}", outcome.confirmation.booking_reference);
    println!("  Transaction ID:    {}", outcome.confirmation.transaction_id);
    println!("  Room:              {}", outcome.request.room_display_name());
    println!(
        "  Stay:              {} to {} ({} night(s))",
        outcome.request.check_in,
        outcome.request.check_out,
        outcome.request.nights()
    );
    println!("  Paid:              {}", outcome.quote.final_amount);
    if let Some(warning) = &outcome.notification_warning {
        println!();
        println!("{warning}");
    }
    Ok(())
}

/// Reads codes from stdin until one verifies.
///
/// Typing `resend` asks for a new code; end of input cancels the booking.
async fn verify_interactively(booking: &mut BookingCoordinator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let remaining = booking.code_remaining_secs().unwrap_or(0);
        println!("Enter the verification code sent to your phone ({remaining}s left, or 'resend'):");

        let Some(line) = lines.next_line().await? else {
            booking.cancel()?;
            bail!("verification cancelled");
        };
        let input = line.trim();

        if input.eq_ignore_ascii_case("resend") {
            match booking.resend_code().await {
                Ok(()) => println!("A new code has been sent."),
                Err(e) => println!("{e}"),
            }
            continue;
        }

        match booking.verify_code(input) {
            Ok(()) => {
                println!("Phone number verified.");
                return Ok(());
            }
            Err(BookingError::Flow(CoreError::Verification(OtpError::LockedOut { .. }))) => {
                booking.cancel()?;
                bail!("too many incorrect codes");
            }
            Err(BookingError::Flow(CoreError::Verification(OtpError::Expired))) => {
                println!("That code has expired. Type 'resend' for a new one.");
            }
            Err(e) => println!("{e}"),
        }
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dandeli=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_args_parse() {
        let cli = Cli::try_parse_from([
            "dandeli-booking",
            "book",
            "--name",
            "Jane Doe",
            "--email",
            "jane@x.com",
            "--phone",
            "+919876543210",
            "--adults",
            "2",
            "--check-in",
            "2026-10-18",
            "--check-out",
            "2026-10-20",
            "--pay",
            "upi",
            "--upi-id",
            "jane@okaxis",
        ])
        .unwrap();

        let Commands::Book(args) = cli.command else {
            panic!("expected book command");
        };
        assert_eq!(args.check_in, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(args.room, "standard");
        assert_eq!(
            args.payment_method(),
            PaymentMethod::Upi {
                vpa: "jane@okaxis".to_string()
            }
        );
    }

    #[test]
    fn test_card_holder_defaults_to_guest_name() {
        let cli = Cli::try_parse_from([
            "dandeli-booking",
            "book",
            "--name",
            "Jane Doe",
            "--email",
            "jane@x.com",
            "--phone",
            "+919876543210",
            "--check-in",
            "2026-10-18",
            "--check-out",
            "2026-10-19",
            "--pay",
            "card",
            "--card-number",
            "4111111111111111",
        ])
        .unwrap();

        let Commands::Book(args) = cli.command else {
            panic!("expected book command");
        };
        let PaymentMethod::Card { holder, cvv, .. } = args.payment_method() else {
            panic!("expected card");
        };
        assert_eq!(holder, "Jane Doe");
        assert_eq!(cvv, "");
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["dandeli-booking", "quote", "--adults", "two"]).is_err());
        assert!(Cli::try_parse_from([
            "dandeli-booking",
            "book",
            "--name",
            "J",
            "--email",
            "j@x.com",
            "--phone",
            "1",
            "--check-in",
            "18/10/2026",
            "--check-out",
            "2026-10-20",
        ])
        .is_err());
    }
}
