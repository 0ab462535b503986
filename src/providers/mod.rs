pub mod http_rates;
pub mod http_transactions;
pub mod pinned;
pub mod util;
