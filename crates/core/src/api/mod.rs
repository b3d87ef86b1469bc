//! Request building, execution port and pagination

pub mod paginator;
pub mod ports;
pub mod query;
pub mod request;

pub use paginator::{PageStyle, PaginationOptions, Paginator};
pub use ports::{RequestExecutor, RequestExecutorExt};
pub use query::QueryParams;
pub use request::{api_path, ApiRequest, HttpMethod, ResponseBody};
