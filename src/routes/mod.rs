pub mod dispatch;
pub mod operator_routes;
