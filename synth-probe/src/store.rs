use postgres::Transaction;

use crate::error::ProbeError;
use crate::record::{NewOrder, NewUser, OrderId, UserId};

pub const INSERT_USER: &str = "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id";
pub const INSERT_ORDER: &str =
    "INSERT INTO orders (user_id, product_name, quantity) VALUES ($1, $2, $3) RETURNING id";

/// A batch of writes that becomes visible only once committed.
///
/// Dropping an implementor without calling [`UnitOfWork::commit`] must discard every
/// write made through it.
pub trait UnitOfWork {
    /// # Errors
    /// Errors when storage rejects the row or does not hand back its id
    fn insert_user(&mut self, user: &NewUser) -> Result<UserId, ProbeError>;

    /// # Errors
    /// Errors when storage rejects the row (e.g. `user_id` does not exist) or does not hand
    /// back its id
    fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, ProbeError>;

    /// # Errors
    /// Errors when the writes could not be made durable, in which case none of them are
    fn commit(self) -> Result<(), ProbeError>;
}

impl UnitOfWork for Transaction<'_> {
    fn insert_user(&mut self, user: &NewUser) -> Result<UserId, ProbeError> {
        let row = self
            .query_opt(INSERT_USER, &[&user.name(), &user.email()])?
            .ok_or(ProbeError::MissingId("users"))?;
        Ok(UserId(row.try_get(0)?))
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, ProbeError> {
        let row = self
            .query_opt(
                INSERT_ORDER,
                &[&order.user_id.0, &order.product_name, &order.quantity],
            )?
            .ok_or(ProbeError::MissingId("orders"))?;
        Ok(OrderId(row.try_get(0)?))
    }

    fn commit(self) -> Result<(), ProbeError> {
        Transaction::commit(self)?;
        Ok(())
    }
}
