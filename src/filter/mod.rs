pub mod types;
pub mod filter;
pub mod filter_where;
pub mod page;
pub mod payments;
pub mod users;
pub mod error;

pub use error::FilterError;
pub use filter::Filter;
pub use page::{Page, Paginated};
pub use payments::PaymentFilter;
pub use types::*;
pub use users::UserFilter;
