use std::error::Error;
use std::io;

use clap::{Args, Parser, Subcommand};
use rand::thread_rng;

use synth_probe::cdc::{self, Entity};
use synth_probe::config::ProbeConfig;
use synth_probe::consumer::{
    self, ConsumerSettings, DEFAULT_AUTO_OFFSET_RESET, DEFAULT_BOOTSTRAP_SERVERS,
    DEFAULT_GROUP_ID, DEFAULT_ORDERS_TOPIC, DEFAULT_USERS_TOPIC,
};
use synth_probe::preview::write_preview;
use synth_probe::probe;

/// Writes one synthetic user and one synthetic order to PostgreSQL.
///
/// Connection parameters come from POSTGRES_HOST, POSTGRES_DB, POSTGRES_USER and
/// POSTGRES_PASSWORD.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print generated records as CSV without touching the database
    Preview {
        /// How many user/order pairs to generate
        #[clap(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Log the Debezium change events read from stdin, one JSON message per line
    Watch {
        /// The table the events belong to: users or orders
        entity: Entity,
    },
    /// Log the Debezium change events of both tables as they arrive on Kafka
    Consume(ConsumeArgs),
}

#[derive(Args)]
struct ConsumeArgs {
    #[clap(long, env = "KAFKA_BOOTSTRAP_SERVERS", default_value = DEFAULT_BOOTSTRAP_SERVERS)]
    bootstrap_servers: String,
    #[clap(long, env = "KAFKA_GROUP_ID", default_value = DEFAULT_GROUP_ID)]
    group_id: String,
    /// Where to start when the group has no committed offset: earliest, latest or error
    #[clap(long, env = "KAFKA_AUTO_OFFSET_RESET", default_value = DEFAULT_AUTO_OFFSET_RESET)]
    auto_offset_reset: String,
    #[clap(long, env = "KAFKA_USERS_TOPIC", default_value = DEFAULT_USERS_TOPIC)]
    users_topic: String,
    #[clap(long, env = "KAFKA_ORDERS_TOPIC", default_value = DEFAULT_ORDERS_TOPIC)]
    orders_topic: String,
    /// Stop after this many change events instead of running until killed
    #[clap(long)]
    max_messages: Option<usize>,
}

impl From<ConsumeArgs> for ConsumerSettings {
    fn from(args: ConsumeArgs) -> Self {
        ConsumerSettings {
            bootstrap_servers: args.bootstrap_servers,
            group_id: args.group_id,
            auto_offset_reset: args.auto_offset_reset,
            users_topic: args.users_topic,
            orders_topic: args.orders_topic,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        // Failures are logged and swallowed, the process still exits successfully.
        None => {
            probe::run_logged(&ProbeConfig::from_env(), &mut thread_rng());
        }
        Some(Command::Preview { count }) => {
            write_preview(io::stdout().lock(), count, &mut thread_rng())?;
        }
        Some(Command::Watch { entity }) => {
            cdc::watch(entity, io::stdin().lock())?;
        }
        Some(Command::Consume(args)) => {
            let limit = args.max_messages;
            consumer::consume(&args.into(), limit)?;
        }
    }

    Ok(())
}
