use std::io;

use csv::WriterBuilder;
use rand::Rng;
use serde::Serialize;

use crate::error::ProbeError;
use crate::record::{NewUser, OrderDraft};

#[derive(Debug, Serialize)]
struct PreviewRow<'a> {
    name: &'a str,
    email: &'a str,
    product_name: &'a str,
    quantity: i32,
}

/// Writes `count` generated user/order pairs as CSV, header first, without touching any
/// database. Pairs are drawn in the same order a probe cycle draws them.
///
/// # Errors
/// Errors when `writer` fails
pub fn write_preview<W, R>(writer: W, count: usize, rng: &mut R) -> Result<(), ProbeError>
where
    W: io::Write,
    R: Rng + ?Sized,
{
    let mut writer = WriterBuilder::new().from_writer(writer);
    for _ in 0..count {
        let user: NewUser = rng.gen();
        let draft: OrderDraft = rng.gen();
        writer.serialize(PreviewRow {
            name: user.name(),
            email: user.email(),
            product_name: &draft.product_name,
            quantity: draft.quantity,
        })?;
    }
    writer.flush()?;
    Ok(())
}
