use std::time::{Duration, Instant};

use log::{debug, error, info};
use postgres::NoTls;
use rand::Rng;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::record::{NewOrder, NewUser, OrderDraft, OrderId, UserId};
use crate::store::UnitOfWork;

/// What one successful probe cycle wrote
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub user_id: UserId,
    pub user: NewUser,
    pub order_id: OrderId,
    pub order: NewOrder,
    pub user_elapsed: Duration,
    pub order_elapsed: Duration,
}

/// Connects to the configured database and writes one user and one order in a single
/// transaction.
///
/// The connection is closed when this returns. If anything fails before the commit the
/// transaction is dropped and rolled back, so either both rows persist or neither does.
///
/// # Errors
/// Errors when the connection cannot be established, either insert is rejected or the
/// commit fails
pub fn run<R: Rng + ?Sized>(config: &ProbeConfig, rng: &mut R) -> Result<ProbeReport, ProbeError> {
    debug!("Connecting to {:?}", config);
    let mut client = config.to_pg_config().connect(NoTls)?;
    let transaction = client.transaction()?;
    insert_pair(transaction, rng)
}

/// Runs one cycle the way the command line does: a failure is logged with its full cause
/// and swallowed, and `Update complete.` is logged either way.
pub fn run_logged<R: Rng + ?Sized>(config: &ProbeConfig, rng: &mut R) -> Option<ProbeReport> {
    let report = match run(config, rng) {
        Ok(report) => Some(report),
        Err(e) => {
            error!("An error occurred: {}", e.describe());
            None
        }
    };
    info!("Update complete.");
    report
}

/// Generates a user and an order referencing it, writes both through `work` and commits.
///
/// # Errors
/// Errors as soon as any write or the commit fails; `work` is dropped uncommitted
pub fn insert_pair<W, R>(mut work: W, rng: &mut R) -> Result<ProbeReport, ProbeError>
where
    W: UnitOfWork,
    R: Rng + ?Sized,
{
    let user: NewUser = rng.gen();
    info!("Creating new user: {}, email: {}", user.name(), user.email());
    let start = Instant::now();
    let user_id = work.insert_user(&user)?;
    let user_elapsed = start.elapsed();
    info!("User with ID {} created in {:.2?}", user_id, user_elapsed);

    let draft: OrderDraft = rng.gen();
    info!(
        "Creating order for user ID {}: product '{}', quantity {}",
        user_id, draft.product_name, draft.quantity
    );
    let order = draft.for_user(user_id);
    let start = Instant::now();
    let order_id = work.insert_order(&order)?;
    let order_elapsed = start.elapsed();
    info!("Order for user ID {} created in {:.2?}", user_id, order_elapsed);

    work.commit()?;

    Ok(ProbeReport {
        user_id,
        user,
        order_id,
        order,
        user_elapsed,
        order_elapsed,
    })
}
