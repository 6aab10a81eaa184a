use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use crate::application::{LedgerConfig, LedgerService};
use crate::domain::convert_to_native;
use crate::http;

/// SBP ledger - single-account balance service
#[derive(Parser)]
#[command(name = "sbp-ledger")]
#[command(about = "A single-account SBP balance ledger with deposit profit and withdrawal limits")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "myBank.db", global = true)]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Profit credited after each deposit, in percent of the balance
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_ADD_PERCENT, global = true)]
    pub add_percent: f64,

    /// Largest share of the balance one withdrawal may take, in percent
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_MAX_PERCENT, global = true)]
    pub max_percent: f64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the account
    Init,

    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        addr: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 1718)]
        port: u16,
    },

    /// Deposit funds (profit is credited afterwards)
    Deposit {
        /// Amount to deposit
        amount: f64,

        /// Currency the amount is expressed in: SBP or RUB
        #[arg(short, long, default_value = "SBP")]
        currency: String,
    },

    /// Withdraw funds
    Withdraw {
        /// Amount to withdraw
        amount: f64,

        /// Currency the amount is expressed in: SBP or RUB
        #[arg(short, long, default_value = "SBP")]
        currency: String,
    },

    /// Show the balance in a currency
    Balance {
        /// Currency to report in (defaults to SBP)
        #[arg(short, long, default_value = "")]
        currency: String,
    },

    /// Show the account currency
    Currency,

    /// Show the rate from the account currency to another one
    Rate {
        /// Target currency code
        currency: String,
    },

    /// Show the account row
    Status,
}

impl Cli {
    fn config(&self) -> LedgerConfig {
        LedgerConfig {
            add_percent: self.add_percent,
            max_percent: self.max_percent,
        }
    }

    pub async fn run(self) -> Result<()> {
        crate::logging::init(self.verbose, self.log_json);

        // Every command bootstraps the schema on first use, like `init`.
        let service = LedgerService::init(&self.database, self.config())
            .await
            .with_context(|| format!("Failed to open database {}", self.database))?;

        match &self.command {
            Commands::Init => {
                println!("Database initialized: {}", self.database);
            }
            Commands::Serve { addr, port } => {
                serve(service, addr, *port).await?;
            }
            Commands::Deposit { amount, currency } => {
                service.add_funds(convert_to_native(*amount, currency)).await?;
                println!("amount added successfully");
            }
            Commands::Withdraw { amount, currency } => {
                service.withdraw(convert_to_native(*amount, currency)).await?;
                println!("money was withdrawn from the account");
            }
            Commands::Balance { currency } => {
                let balance = service.get_balance(currency).await?;
                println!("{:.2}", balance);
            }
            Commands::Currency => {
                println!("{}", service.get_currency().await?);
            }
            Commands::Rate { currency } => {
                println!("{}", service.get_account_currency_rate(currency).await?);
            }
            Commands::Status => match service.get_account().await? {
                Some(account) => {
                    println!("Account:   {}", account.id);
                    println!("  Currency: {}", account.currency);
                    println!("  SBP:      {}", account.balance.integer_part);
                    println!("  SPF:      {}", account.balance.fractional_part);
                    println!("  Total:    {}", account.balance.total());
                }
                None => println!("No account found."),
            },
        }

        Ok(())
    }
}

async fn serve(service: LedgerService, addr: &str, port: u16) -> Result<()> {
    let app = http::router(Arc::new(service));
    let bind = format!("{}:{}", addr, port);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    tracing::info!(address = %bind, "ledger API listening");
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
