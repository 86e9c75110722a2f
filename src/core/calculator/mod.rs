pub mod geofence;
pub mod violation;
pub mod window;
