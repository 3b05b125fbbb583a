//! Cart Repositories

mod carts;
mod items;

pub(crate) use carts::{PgCartsRepository, try_get_address};
pub(crate) use items::PgCartItemsRepository;
