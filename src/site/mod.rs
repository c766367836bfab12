pub mod home;
pub mod routes;

pub use home::{HomePage, NavLink};
pub use routes::route_for_page;
