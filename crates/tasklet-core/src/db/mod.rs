pub mod live;
pub mod local;

pub use live::{LiveQuery, Results, Sort, SortField};
pub use local::{LocalDb, WriteTxn, LOCAL_PARTITION};
